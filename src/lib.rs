pub mod analyzer;
pub mod cli;
pub mod error;
pub mod http;
pub mod models;
pub mod reporter;
pub mod rules;
pub mod scanner;
pub mod wordlist;

pub use error::{ProbeError, ScanError};
pub use models::{
    ImportantPath, ProbeResult, ResultFilter, ScanConfig, ScanReport, ScanStatistics,
    filter_results,
};
pub use rules::RuleEngine;
pub use scanner::{CancellationToken, NoopObserver, ScanObserver, Scanner, scan};
pub use wordlist::{PathGenerator, WordlistSource};
