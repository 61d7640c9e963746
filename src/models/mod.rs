mod config;
mod result;

pub use config::{
    DEFAULT_EXCLUDE_STATUS_CODES, DEFAULT_EXTENSION_TAG, DEFAULT_STATUS_CODES, DEFAULT_USER_AGENT,
    ScanConfig,
};
pub use result::{
    ImportantPath, ProbeResult, ResponseInfo, ResultFilter, ScanReport, ScanStatistics,
    filter_results,
};
