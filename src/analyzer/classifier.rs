use std::collections::HashMap;
use std::fmt;

use chrono::Utc;
use regex::Regex;
use url::Url;

use super::comparator::ContentComparator;
use super::wildcard::WildcardSignature;
use crate::error::ScanError;
use crate::models::{ProbeResult, ResponseInfo, ScanConfig};

const DIRECTORY_MARKERS: &[&str] = &["index of", "directory listing", "parent directory"];

const FILE_EXTENSIONS: &[&str] = &[
    "7z", "action", "asp", "aspx", "bak", "bz2", "cfm", "cgi", "conf", "config", "css", "csv",
    "db", "do", "doc", "docx", "env", "gif", "gz", "htm", "html", "ico", "ini", "jar", "jpeg",
    "jpg", "js", "json", "jsp", "jspx", "log", "lock", "map", "md", "mp3", "mp4", "old", "orig",
    "pdf", "php", "php3", "php4", "php5", "phtml", "pl", "png", "py", "rar", "rb", "sh", "sql",
    "sqlite", "svg", "swp", "tar", "tgz", "tmp", "toml", "ts", "txt", "war", "webp", "woff",
    "woff2", "xls", "xlsx", "xml", "yaml", "yml", "zip",
];

#[derive(Debug, Clone, PartialEq)]
pub enum FilterReason {
    ExcludedStatus(u16),
    Blacklisted { status: u16, pattern: String },
    Wildcard,
    NotWhitelisted(u16),
    ExcludedSize(usize),
    ExcludedText(String),
    ExcludedRegex,
}

impl fmt::Display for FilterReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterReason::ExcludedStatus(s) => write!(f, "status {} excluded", s),
            FilterReason::Blacklisted { status, pattern } => {
                write!(f, "blacklisted for {} by '{}'", status, pattern)
            }
            FilterReason::Wildcard => write!(f, "matches wildcard response"),
            FilterReason::NotWhitelisted(s) => write!(f, "status {} not whitelisted", s),
            FilterReason::ExcludedSize(s) => write!(f, "size {} excluded", s),
            FilterReason::ExcludedText(t) => write!(f, "body contains '{}'", t),
            FilterReason::ExcludedRegex => write!(f, "body matches exclude regex"),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Classification {
    Accepted(ProbeResult),
    Filtered(FilterReason),
}

/// Ordered accept/reject pipeline for raw responses.
pub struct ResponseClassifier {
    exclude_status: Vec<u16>,
    include_status: Option<Vec<u16>>,
    whitelist: Option<Vec<u16>>,
    blacklists: HashMap<u16, Vec<String>>,
    exclude_sizes: Vec<usize>,
    exclude_texts: Vec<String>,
    exclude_regex: Option<Regex>,
}

impl ResponseClassifier {
    pub fn new(config: &ScanConfig) -> Result<Self, ScanError> {
        let whitelist = config
            .status_codes_customized()
            .then(|| config.status_codes.clone());

        Ok(Self {
            exclude_status: config.exclude_status_codes.clone(),
            include_status: config.include_status_codes.clone(),
            whitelist,
            blacklists: Self::expand_blacklists(config),
            exclude_sizes: config.exclude_sizes.clone(),
            exclude_texts: config.exclude_texts.clone(),
            exclude_regex: config.compiled_exclude_regex()?,
        })
    }

    fn expand_blacklists(config: &ScanConfig) -> HashMap<u16, Vec<String>> {
        let tag = config.extension_tag.as_str();
        config
            .blacklists
            .iter()
            .map(|(status, patterns)| {
                let mut expanded = Vec::new();
                for pattern in patterns {
                    let pattern = pattern.trim_start_matches('/');
                    if !tag.is_empty() && pattern.contains(tag) {
                        for ext in &config.extensions {
                            expanded.push(pattern.replace(tag, ext.trim_start_matches('.')));
                        }
                    } else {
                        expanded.push(pattern.to_string());
                    }
                }
                (*status, expanded)
            })
            .collect()
    }

    pub fn classify(
        &self,
        url: &Url,
        path: &str,
        response: &ResponseInfo,
        wildcard: Option<&WildcardSignature>,
        comparator: &dyn ContentComparator,
    ) -> Classification {
        let status = response.status;

        if self.exclude_status.contains(&status) {
            return Classification::Filtered(FilterReason::ExcludedStatus(status));
        }

        if let Some(pattern) = self.blacklist_match(status, path) {
            return Classification::Filtered(FilterReason::Blacklisted {
                status,
                pattern: pattern.to_string(),
            });
        }

        if wildcard.is_some_and(|sig| sig.matches(response, comparator)) {
            return Classification::Filtered(FilterReason::Wildcard);
        }

        let allowed = match (&self.include_status, &self.whitelist) {
            (Some(include), _) => include.contains(&status),
            (None, Some(whitelist)) => whitelist.contains(&status),
            (None, None) => true,
        };
        if !allowed {
            return Classification::Filtered(FilterReason::NotWhitelisted(status));
        }

        if self.exclude_sizes.contains(&response.size) {
            return Classification::Filtered(FilterReason::ExcludedSize(response.size));
        }

        if let Some(text) = self
            .exclude_texts
            .iter()
            .find(|t| response.body.contains(t.as_str()))
        {
            return Classification::Filtered(FilterReason::ExcludedText(text.clone()));
        }

        if self
            .exclude_regex
            .as_ref()
            .is_some_and(|re| re.is_match(&response.body))
        {
            return Classification::Filtered(FilterReason::ExcludedRegex);
        }

        Classification::Accepted(ProbeResult {
            url: url.to_string(),
            path: path.to_string(),
            status,
            size: response.size,
            content_type: response.content_type.clone(),
            redirect: response.location.clone(),
            response_time_ms: response.duration_ms,
            is_directory: is_directory(url, path, response),
            timestamp: Utc::now(),
        })
    }

    fn blacklist_match(&self, status: u16, path: &str) -> Option<&str> {
        let path = path.trim_start_matches('/');
        self.blacklists
            .get(&status)?
            .iter()
            .find(|pattern| !pattern.is_empty() && path.ends_with(pattern.as_str()))
            .map(String::as_str)
    }
}

/// Directory heuristics. Extensionless HTML routes are treated as directories.
pub fn is_directory(url: &Url, path: &str, response: &ResponseInfo) -> bool {
    if path.ends_with('/') {
        return true;
    }

    let body = response.body.to_lowercase();
    if DIRECTORY_MARKERS.iter().any(|marker| body.contains(marker)) {
        return true;
    }

    if let Some(location) = &response.location {
        let with_slash = format!("{}/", url.as_str().trim_end_matches('/'));
        if let Ok(target) = url.join(location) {
            if target.as_str() == with_slash {
                return true;
            }
        }
    }

    !has_file_extension(path) && response.is_html() && matches!(response.status, 200 | 403)
}

pub fn has_file_extension(path: &str) -> bool {
    let last = path.rsplit('/').next().unwrap_or(path);
    match last.rsplit_once('.') {
        Some((_, ext)) => FILE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()),
        None => false,
    }
}
