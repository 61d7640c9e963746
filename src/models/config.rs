use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use regex::Regex;
use reqwest::header::{HeaderName, HeaderValue};
use serde::{Deserialize, Serialize};

use crate::error::ScanError;
use crate::wordlist::load_blacklists;

pub const DEFAULT_STATUS_CODES: &[u16] = &[200, 204, 301, 302, 307, 401, 403];
pub const DEFAULT_EXCLUDE_STATUS_CODES: &[u16] = &[404];
pub const DEFAULT_EXTENSION_TAG: &str = "%EXT%";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; Dirsearch)";

/// Options for one scan. Cloned into the scanner and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    pub extensions: Vec<String>,
    pub exclude_extensions: Vec<String>,
    pub extension_tag: String,
    pub prefixes: Vec<String>,
    pub suffixes: Vec<String>,
    pub subdirs: Vec<String>,
    pub uppercase: bool,
    pub lowercase: bool,
    pub capitalization: bool,

    pub status_codes: Vec<u16>,
    pub exclude_status_codes: Vec<u16>,
    pub include_status_codes: Option<Vec<u16>>,
    pub exclude_sizes: Vec<usize>,
    pub exclude_texts: Vec<String>,
    pub exclude_regex: Option<String>,
    pub blacklists: HashMap<u16, Vec<String>>,

    pub threads: usize,
    pub timeout_secs: u64,
    pub delay_ms: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,

    pub recursive: bool,
    pub recursion_depth: usize,
    pub crawl: bool,
    pub detect_wildcards: bool,
    pub dynamic_wordlist: bool,

    pub headers: HashMap<String, String>,
    pub cookies: HashMap<String, String>,
    pub user_agent: String,
    pub auth: Option<(String, String)>,
    pub proxy: Option<String>,
    pub follow_redirects: bool,
    pub verify_tls: bool,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            extensions: Vec::new(),
            exclude_extensions: Vec::new(),
            extension_tag: DEFAULT_EXTENSION_TAG.to_string(),
            prefixes: Vec::new(),
            suffixes: Vec::new(),
            subdirs: Vec::new(),
            uppercase: false,
            lowercase: false,
            capitalization: false,
            status_codes: DEFAULT_STATUS_CODES.to_vec(),
            exclude_status_codes: DEFAULT_EXCLUDE_STATUS_CODES.to_vec(),
            include_status_codes: None,
            exclude_sizes: Vec::new(),
            exclude_texts: Vec::new(),
            exclude_regex: None,
            blacklists: HashMap::new(),
            threads: 30,
            timeout_secs: 7,
            delay_ms: 0,
            max_retries: 3,
            retry_backoff_ms: 1000,
            recursive: false,
            recursion_depth: 0,
            crawl: false,
            detect_wildcards: true,
            dynamic_wordlist: true,
            headers: HashMap::new(),
            cookies: HashMap::new(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            auth: None,
            proxy: None,
            follow_redirects: false,
            verify_tls: false,
        }
    }
}

impl ScanConfig {
    /// Checks everything that can be checked without touching the network.
    pub fn validate(&self) -> Result<(), ScanError> {
        self.compiled_exclude_regex()?;

        for (name, value) in &self.headers {
            HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| ScanError::InvalidHeader(name.clone()))?;
            HeaderValue::from_str(value)
                .map_err(|_| ScanError::InvalidHeader(format!("{}: {}", name, value)))?;
        }

        Ok(())
    }

    pub fn compiled_exclude_regex(&self) -> Result<Option<Regex>, ScanError> {
        match &self.exclude_regex {
            Some(pattern) => Ok(Some(Regex::new(pattern)?)),
            None => Ok(None),
        }
    }

    /// Merges `{status}_blacklist.txt` files from `dir` into the blacklist map.
    pub fn with_blacklist_dir(mut self, dir: &Path) -> Result<Self, ScanError> {
        for (status, patterns) in load_blacklists(dir)? {
            self.blacklists.entry(status).or_default().extend(patterns);
        }
        Ok(self)
    }

    /// True when the status whitelist differs from the built-in default.
    pub fn status_codes_customized(&self) -> bool {
        let mut current = self.status_codes.clone();
        current.sort_unstable();
        current.dedup();
        current != DEFAULT_STATUS_CODES
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Backoff before retry number `attempt + 1`: `base * 2^attempt`.
    pub fn backoff(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_backoff_ms.saturating_mul(1u64 << attempt.min(16)))
    }
}
