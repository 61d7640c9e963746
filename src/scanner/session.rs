use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use crate::analyzer::WildcardSignature;
use crate::error::ProbeError;
use crate::models::{ImportantPath, ProbeResult, ScanReport, ScanStatistics};

/// Body kept for later endpoint extraction.
#[derive(Debug, Clone)]
pub struct CapturedBody {
    pub body: String,
    pub content_type: Option<String>,
}

#[derive(Default)]
struct SessionState {
    results: Vec<ProbeResult>,
    probed: HashSet<String>,
    keywords: BTreeSet<String>,
    expanded: HashSet<String>,
    analyzed: HashSet<String>,
    wildcards: HashMap<String, Option<Arc<WildcardSignature>>>,
    bodies: HashMap<String, CapturedBody>,
    important: Vec<ImportantPath>,
    stats: ScanStatistics,
    errors: Vec<ProbeError>,
}

/// Mutable state of one `scan` call. Every mutation goes through one lock.
pub struct ScanSession {
    state: Mutex<SessionState>,
    cancel: CancellationToken,
    started: Instant,
}

impl ScanSession {
    pub fn new(cancel: CancellationToken) -> Self {
        Self {
            state: Mutex::new(SessionState::default()),
            cancel,
            started: Instant::now(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Resolves once the scan is cancelled.
    pub async fn cancelled(&self) {
        self.cancel.cancelled().await
    }

    /// Marks an absolute URL as probed. False if it already was.
    pub fn claim(&self, url: &str) -> bool {
        self.state.lock().probed.insert(url.to_string())
    }

    pub fn record_request(&self) {
        self.state.lock().stats.total_requests += 1;
    }

    pub fn record_filtered(&self) {
        self.state.lock().stats.filtered_results += 1;
    }

    pub fn record_failure(&self, error: ProbeError) {
        let mut state = self.state.lock();
        state.stats.failed_requests += 1;
        state.errors.push(error);
    }

    pub fn accept(
        &self,
        result: ProbeResult,
        body: Option<CapturedBody>,
        keywords: BTreeSet<String>,
        important: Option<ImportantPath>,
    ) {
        let mut state = self.state.lock();
        state.stats.successful_requests += 1;
        if let Some(body) = body {
            state.bodies.insert(result.url.clone(), body);
        }
        state.keywords.extend(keywords);
        if let Some(important) = important {
            state.important.push(important);
        }
        state.results.push(result);
    }

    pub fn result_count(&self) -> usize {
        self.state.lock().results.len()
    }

    pub fn results(&self) -> Vec<ProbeResult> {
        self.state.lock().results.clone()
    }

    /// True the first time a directory URL is handed to the frontier.
    pub fn mark_expanded(&self, dir_url: &str) -> bool {
        self.state.lock().expanded.insert(dir_url.to_string())
    }

    /// True the first time a URL's body is handed to the extractor.
    pub fn mark_analyzed(&self, url: &str) -> bool {
        self.state.lock().analyzed.insert(url.to_string())
    }

    /// Removes and returns the stored body for `url`.
    pub fn take_body(&self, url: &str) -> Option<CapturedBody> {
        self.state.lock().bodies.remove(url)
    }

    /// `None` when the directory was never probed, `Some(None)` when it has no wildcard.
    pub fn wildcard(&self, dir_url: &str) -> Option<Option<Arc<WildcardSignature>>> {
        self.state.lock().wildcards.get(dir_url).cloned()
    }

    pub fn set_wildcard(&self, dir_url: &str, signature: Option<WildcardSignature>) {
        self.state
            .lock()
            .wildcards
            .insert(dir_url.to_string(), signature.map(Arc::new));
    }

    pub fn into_report(self, target: String) -> ScanReport {
        let cancelled = self.cancel.is_cancelled();
        let duration_ms = self.started.elapsed().as_millis() as u64;
        let state = self.state.into_inner();

        ScanReport {
            target,
            results: state.results,
            important: state.important,
            dynamic_keywords: state.keywords.into_iter().collect(),
            errors: state.errors,
            statistics: ScanStatistics {
                duration_ms,
                ..state.stats
            },
            cancelled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn result(url: &str) -> ProbeResult {
        ProbeResult {
            url: url.to_string(),
            path: "x".to_string(),
            status: 200,
            size: 0,
            content_type: None,
            redirect: None,
            response_time_ms: 0,
            is_directory: false,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn test_claim_is_keyed_by_absolute_url() {
        let session = ScanSession::new(CancellationToken::new());
        assert!(session.claim("http://x/a/admin"));
        assert!(session.claim("http://x/b/admin"));
        assert!(!session.claim("http://x/a/admin"));
    }

    #[test]
    fn test_report_carries_counters_and_keywords() {
        let session = ScanSession::new(CancellationToken::new());
        session.record_request();
        session.record_request();
        session.record_filtered();
        session.accept(
            result("http://x/admin"),
            None,
            ["login".to_string()].into(),
            None,
        );
        session.record_failure(ProbeError {
            url: "http://x/down".into(),
            attempts: 3,
            message: "refused".into(),
        });

        let report = session.into_report("http://x/".into());
        assert_eq!(report.results.len(), 1);
        assert_eq!(report.statistics.total_requests, 2);
        assert_eq!(report.statistics.successful_requests, 1);
        assert_eq!(report.statistics.filtered_results, 1);
        assert_eq!(report.statistics.failed_requests, 1);
        assert_eq!(report.dynamic_keywords, vec!["login"]);
        assert_eq!(report.errors.len(), 1);
        assert!(!report.cancelled);
    }

    #[test]
    fn test_cancellation_is_shared() {
        let token = CancellationToken::new();
        let session = ScanSession::new(token.clone());
        assert!(!session.is_cancelled());
        token.cancel();
        assert!(session.is_cancelled());
        assert!(session.into_report(String::new()).cancelled);
    }

    #[test]
    fn test_body_released_once_taken() {
        let session = ScanSession::new(CancellationToken::new());
        let body = CapturedBody {
            body: "<a href=\"/x\">x</a>".to_string(),
            content_type: Some("text/html".to_string()),
        };
        session.accept(result("http://x/page"), Some(body), BTreeSet::new(), None);

        let taken = session.take_body("http://x/page").unwrap();
        assert!(taken.body.contains("/x"));
        assert!(session.take_body("http://x/page").is_none());
    }

    #[tokio::test]
    async fn test_cancelled_resolves_after_cancel() {
        let token = CancellationToken::new();
        let session = ScanSession::new(token.clone());
        token.cancel();
        tokio::time::timeout(std::time::Duration::from_secs(1), session.cancelled())
            .await
            .unwrap();
    }

    #[test]
    fn test_mark_expanded_once() {
        let session = ScanSession::new(CancellationToken::new());
        assert!(session.mark_expanded("http://x/api/"));
        assert!(!session.mark_expanded("http://x/api/"));
        assert!(session.mark_analyzed("http://x/api/"));
    }
}
