use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ProbeError;

/// Raw response as received for a probe, before classification.
#[derive(Debug, Clone)]
pub struct ResponseInfo {
    pub status: u16,
    pub size: usize,
    pub body: String,
    pub content_type: Option<String>,
    pub location: Option<String>,
    pub duration_ms: u64,
}

impl ResponseInfo {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        Self {
            status,
            size: body.len(),
            body,
            content_type: None,
            location: None,
            duration_ms: 0,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("text/html"))
    }
}

/// An accepted discovery. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    pub url: String,
    pub path: String,
    pub status: u16,
    pub size: usize,
    pub content_type: Option<String>,
    pub redirect: Option<String>,
    pub response_time_ms: u64,
    pub is_directory: bool,
    pub timestamp: DateTime<Utc>,
}

impl ProbeResult {
    pub fn is_explorable(&self) -> bool {
        matches!(self.status, 200 | 301 | 302)
    }
}

/// A discovery that matched a high-priority rule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportantPath {
    pub url: String,
    pub path: String,
    pub status: u16,
    pub priority: u32,
    pub rules: Vec<String>,
    pub description: String,
    pub extensions: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanStatistics {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub filtered_results: usize,
    pub duration_ms: u64,
}

impl ScanStatistics {
    pub fn requests_per_second(&self) -> f64 {
        if self.duration_ms == 0 {
            return 0.0;
        }
        self.total_requests as f64 / (self.duration_ms as f64 / 1000.0)
    }
}

/// Everything a finished (or cancelled) scan hands back to its caller.
#[derive(Debug, Clone)]
pub struct ScanReport {
    pub target: String,
    pub results: Vec<ProbeResult>,
    pub important: Vec<ImportantPath>,
    pub dynamic_keywords: Vec<String>,
    pub errors: Vec<ProbeError>,
    pub statistics: ScanStatistics,
    pub cancelled: bool,
}

impl ScanReport {
    pub fn directories(&self) -> impl Iterator<Item = &ProbeResult> {
        self.results.iter().filter(|r| r.is_directory)
    }
}

/// Post-scan narrowing of a result list. Unset fields do not filter.
#[derive(Debug, Clone, Default)]
pub struct ResultFilter {
    pub status_codes: Option<Vec<u16>>,
    pub min_size: Option<usize>,
    pub max_size: Option<usize>,
    pub content_types: Option<Vec<String>>,
    pub path_pattern: Option<Regex>,
    pub max_response_time_ms: Option<u64>,
}

pub fn filter_results(results: &[ProbeResult], filter: &ResultFilter) -> Vec<ProbeResult> {
    results
        .iter()
        .filter(|r| {
            filter
                .status_codes
                .as_ref()
                .is_none_or(|codes| codes.contains(&r.status))
        })
        .filter(|r| filter.min_size.is_none_or(|min| r.size >= min))
        .filter(|r| filter.max_size.is_none_or(|max| r.size <= max))
        .filter(|r| {
            filter.content_types.as_ref().is_none_or(|types| {
                let ct = r.content_type.as_deref().unwrap_or("");
                types.iter().any(|t| ct.contains(t.as_str()))
            })
        })
        .filter(|r| {
            filter
                .path_pattern
                .as_ref()
                .is_none_or(|re| re.is_match(&r.path))
        })
        .filter(|r| {
            filter
                .max_response_time_ms
                .is_none_or(|max| r.response_time_ms <= max)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(path: &str, status: u16, size: usize, ct: &str) -> ProbeResult {
        ProbeResult {
            url: format!("http://x/{}", path),
            path: path.to_string(),
            status,
            size,
            content_type: Some(ct.to_string()),
            redirect: None,
            response_time_ms: 10,
            is_directory: false,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_filter_by_status_and_size() {
        let results = vec![
            result("a", 200, 100, "text/html"),
            result("b", 403, 100, "text/html"),
            result("c", 200, 5000, "text/html"),
        ];
        let filter = ResultFilter {
            status_codes: Some(vec![200]),
            max_size: Some(1000),
            ..Default::default()
        };
        let filtered = filter_results(&results, &filter);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].path, "a");
    }

    #[test]
    fn test_filter_by_content_type_and_pattern() {
        let results = vec![
            result("api/users", 200, 10, "application/json"),
            result("api/page", 200, 10, "text/html"),
            result("admin", 200, 10, "application/json"),
        ];
        let filter = ResultFilter {
            content_types: Some(vec!["json".to_string()]),
            path_pattern: Some(Regex::new("^api/").unwrap()),
            ..Default::default()
        };
        let filtered = filter_results(&results, &filter);
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].path, "api/users");
    }

    #[test]
    fn test_requests_per_second() {
        let stats = ScanStatistics {
            total_requests: 50,
            duration_ms: 2000,
            ..Default::default()
        };
        assert_eq!(stats.requests_per_second(), 25.0);
        assert_eq!(ScanStatistics::default().requests_per_second(), 0.0);
    }

    #[test]
    fn test_explorable_statuses() {
        assert!(result("a", 200, 1, "").is_explorable());
        assert!(result("a", 301, 1, "").is_explorable());
        assert!(!result("a", 403, 1, "").is_explorable());
    }
}
