use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{debug, warn};
use url::Url;

use super::observer::ScanObserver;
use super::session::{CapturedBody, ScanSession};
use crate::analyzer::{
    Classification, ContentComparator, ResponseClassifier, WildcardDetector, WildcardSignature,
};
use crate::error::ProbeError;
use crate::http::HttpClient;
use crate::models::{ImportantPath, ProbeResult, ResponseInfo, ScanConfig};
use crate::rules::{IMPORTANT_PRIORITY, RuleEngine};

enum FetchError {
    Cancelled,
    Exhausted(ProbeError),
}

/// Shared, read-only pieces a scheduler borrows from its scanner.
pub struct SchedulerParts<'a> {
    pub config: &'a ScanConfig,
    pub client: &'a HttpClient,
    pub classifier: &'a ResponseClassifier,
    pub comparator: &'a dyn ContentComparator,
    pub rules: &'a RuleEngine,
    pub detector: &'a WildcardDetector,
}

/// Bounded pool that probes a batch of paths under one directory.
pub struct ProbeScheduler<'a> {
    parts: SchedulerParts<'a>,
    session: &'a ScanSession,
    observer: &'a dyn ScanObserver,
    semaphore: Arc<Semaphore>,
}

impl<'a> ProbeScheduler<'a> {
    pub fn new(
        parts: SchedulerParts<'a>,
        session: &'a ScanSession,
        observer: &'a dyn ScanObserver,
    ) -> Self {
        let permits = parts.config.threads.max(1);
        Self {
            parts,
            session,
            observer,
            semaphore: Arc::new(Semaphore::new(permits)),
        }
    }

    /// Probes every path relative to `base_dir` and waits for all of them.
    pub async fn run<I>(&self, base_dir: &Url, paths: I)
    where
        I: IntoIterator<Item = String>,
    {
        if self.session.is_cancelled() {
            return;
        }

        let paths: Vec<String> = paths.into_iter().collect();
        if paths.is_empty() {
            return;
        }
        let paths = self.parts.rules.prioritize(&paths);

        let base_signature = self.wildcard_for(base_dir).await;
        let total = paths.len();
        let done = AtomicUsize::new(0);

        debug!("Probing {} paths under {}", total, base_dir);

        let futures: Vec<_> = paths
            .into_iter()
            .map(|path| self.probe(base_dir, path, base_signature.as_deref(), &done, total))
            .collect();

        join_all(futures).await;
    }

    async fn wildcard_for(&self, dir: &Url) -> Option<Arc<WildcardSignature>> {
        if !self.parts.config.detect_wildcards {
            return None;
        }
        if let Some(cached) = self.session.wildcard(dir.as_str()) {
            return cached;
        }

        let signature = self
            .parts
            .detector
            .detect(self.parts.client, dir, self.parts.comparator)
            .await;
        self.session.set_wildcard(dir.as_str(), signature);
        self.session.wildcard(dir.as_str()).flatten()
    }

    async fn probe(
        &self,
        base_dir: &Url,
        path: String,
        base_signature: Option<&WildcardSignature>,
        done: &AtomicUsize,
        total: usize,
    ) {
        self.probe_path(base_dir, &path, base_signature).await;
        let current = done.fetch_add(1, Ordering::Relaxed) + 1;
        self.observer.on_progress(current, total);
    }

    async fn probe_path(
        &self,
        base_dir: &Url,
        path: &str,
        base_signature: Option<&WildcardSignature>,
    ) {
        let Ok(_permit) = self.semaphore.acquire().await else {
            return;
        };
        if self.session.is_cancelled() {
            return;
        }

        let delay = self.parts.config.delay();
        if !delay.is_zero() && !self.pause(delay).await {
            return;
        }

        let url = match base_dir.join(path) {
            Ok(url) => url,
            Err(e) => {
                debug!("Skipping unresolvable path '{}': {}", path, e);
                return;
            }
        };

        if !self.session.claim(url.as_str()) {
            return;
        }
        self.session.record_request();

        let response = match self.fetch(&url).await {
            Ok(response) => response,
            Err(FetchError::Cancelled) => {
                debug!("Abandoned {} after cancellation", url);
                return;
            }
            Err(FetchError::Exhausted(error)) => {
                warn!("{}", error);
                self.observer.on_error(&error);
                self.session.record_failure(error);
                return;
            }
        };

        let parent_signature = self.parent_signature(&url);
        let signature = parent_signature.as_deref().or(base_signature);

        match self.parts.classifier.classify(
            &url,
            path,
            &response,
            signature,
            self.parts.comparator,
        ) {
            Classification::Accepted(result) => self.accept(result, response),
            Classification::Filtered(reason) => {
                debug!("Filtered {}: {}", url, reason);
                self.session.record_filtered();
            }
        }
    }

    /// GET with exponential backoff on transport errors. Status codes are never retried.
    async fn fetch(&self, url: &Url) -> Result<ResponseInfo, FetchError> {
        let max_attempts = self.parts.config.max_retries.max(1);
        let mut attempt = 0;

        loop {
            match self.parts.client.get(url).await {
                Ok(response) => return Ok(response),
                Err(e) => {
                    attempt += 1;
                    if self.session.is_cancelled() {
                        return Err(FetchError::Cancelled);
                    }
                    if attempt >= max_attempts {
                        return Err(FetchError::Exhausted(ProbeError {
                            url: url.to_string(),
                            attempts: attempt,
                            message: e.to_string(),
                        }));
                    }

                    let wait: Duration = self.parts.config.backoff(attempt - 1);
                    debug!(
                        "Retrying {} in {:?} (attempt {}/{}): {}",
                        url, wait, attempt, max_attempts, e
                    );
                    if !self.pause(wait).await {
                        return Err(FetchError::Cancelled);
                    }
                }
            }
        }
    }

    /// Sleeps for `duration` unless the scan is cancelled first. False on cancellation.
    async fn pause(&self, duration: Duration) -> bool {
        tokio::select! {
            _ = tokio::time::sleep(duration) => true,
            _ = self.session.cancelled() => false,
        }
    }

    fn parent_signature(&self, url: &Url) -> Option<Arc<WildcardSignature>> {
        let parent = parent_dir(url)?;
        self.session.wildcard(parent.as_str()).flatten()
    }

    fn accept(&self, result: ProbeResult, response: ResponseInfo) {
        debug!("Found {} [{}] {} bytes", result.url, result.status, result.size);
        self.observer.on_result(&result);

        if !result.is_explorable() {
            self.session.accept(result, None, Default::default(), None);
            return;
        }

        let rule_path = Url::parse(&result.url)
            .map(|u| u.path().to_string())
            .unwrap_or_else(|_| format!("/{}", result.path));
        let keywords = self.parts.rules.expansion_keywords(&rule_path);
        let important = self.important_path(&result, &rule_path);

        let body = self.parts.config.crawl.then(|| CapturedBody {
            body: response.body,
            content_type: response.content_type,
        });

        self.session.accept(result, body, keywords, important);
    }

    fn important_path(&self, result: &ProbeResult, rule_path: &str) -> Option<ImportantPath> {
        let matched = self.parts.rules.matches(rule_path);
        let top = matched.first()?;
        if top.priority < IMPORTANT_PRIORITY {
            return None;
        }

        Some(ImportantPath {
            url: result.url.clone(),
            path: result.path.clone(),
            status: result.status,
            priority: top.priority,
            rules: matched.iter().map(|r| r.name.to_string()).collect(),
            description: top.description.to_string(),
            extensions: self
                .parts
                .rules
                .recommended_extensions(rule_path)
                .into_iter()
                .map(String::from)
                .collect(),
        })
    }
}

/// Directory containing `url`: `http://x/a/b` and `http://x/a/b/` both give `http://x/a/`.
pub fn parent_dir(url: &Url) -> Option<Url> {
    let path = url.path().trim_end_matches('/');
    let idx = path.rfind('/')?;
    let mut parent = url.clone();
    parent.set_path(&path[..=idx]);
    parent.set_query(None);
    parent.set_fragment(None);
    Some(parent)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_dir() {
        let url = Url::parse("http://x/a/b").unwrap();
        assert_eq!(parent_dir(&url).unwrap().as_str(), "http://x/a/");

        let dir = Url::parse("http://x/a/b/").unwrap();
        assert_eq!(parent_dir(&dir).unwrap().as_str(), "http://x/a/");

        let top = Url::parse("http://x/admin?q=1").unwrap();
        assert_eq!(parent_dir(&top).unwrap().as_str(), "http://x/");
    }

    #[test]
    fn test_root_has_no_parent() {
        let root = Url::parse("http://x/").unwrap();
        assert!(parent_dir(&root).is_none());
    }
}
