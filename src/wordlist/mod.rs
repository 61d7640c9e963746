mod generator;
mod loader;

pub use generator::PathGenerator;
pub use loader::{WordlistSource, load_blacklists, load_wordlist, merge_wordlists};
