use std::collections::BTreeSet;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use url::Url;

use super::observer::{NoopObserver, ScanObserver};
use super::scheduler::{ProbeScheduler, SchedulerParts, parent_dir};
use super::session::ScanSession;
use crate::analyzer::{
    ContentComparator, DiffComparator, EndpointExtractor, ResponseClassifier, WildcardDetector,
};
use crate::error::ScanError;
use crate::http::HttpClient;
use crate::models::{ProbeResult, ScanConfig, ScanReport};
use crate::rules::RuleEngine;
use crate::wordlist::PathGenerator;

/// Recursive discovery over one target. Reusable across scans; each scan gets its own session.
pub struct Scanner {
    config: ScanConfig,
    client: HttpClient,
    classifier: ResponseClassifier,
    comparator: Box<dyn ContentComparator>,
    rules: RuleEngine,
    extractor: EndpointExtractor,
    detector: WildcardDetector,
}

impl Scanner {
    /// Validates `config` and builds the HTTP client. Nothing is sent yet.
    pub fn new(config: ScanConfig) -> Result<Self, ScanError> {
        config.validate()?;
        let client = HttpClient::new(&config)?;
        let classifier = ResponseClassifier::new(&config)?;

        Ok(Self {
            config,
            client,
            classifier,
            comparator: Box::new(DiffComparator::new()),
            rules: RuleEngine::new(),
            extractor: EndpointExtractor::new(),
            detector: WildcardDetector::new(),
        })
    }

    pub fn with_comparator(mut self, comparator: impl ContentComparator + 'static) -> Self {
        self.comparator = Box::new(comparator);
        self
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub async fn scan<S: AsRef<str>>(
        &self,
        target: &str,
        wordlist: &[S],
        observer: &dyn ScanObserver,
        cancel: CancellationToken,
    ) -> Result<ScanReport, ScanError> {
        let base = parse_target(target)?;
        let words: Vec<String> = wordlist.iter().map(|w| w.as_ref().to_string()).collect();

        let session = ScanSession::new(cancel);
        let scheduler = ProbeScheduler::new(self.parts(), &session, observer);

        let initial = PathGenerator::new(&self.config).generate(&words);
        info!("Scanning {} with {} candidate paths", base, initial.len());
        scheduler.run(&base, initial).await;

        if self.config.recursive {
            self.expand_frontier(&scheduler, &session, &words).await;
        }

        if self.config.crawl && !session.is_cancelled() {
            self.deep_analysis(&scheduler, &session, &base).await;
        }

        drop(scheduler);
        let report = session.into_report(base.to_string());
        info!(
            "Scan of {} finished: {} results, {} requests in {} ms{}",
            report.target,
            report.results.len(),
            report.statistics.total_requests,
            report.statistics.duration_ms,
            if report.cancelled { " (cancelled)" } else { "" }
        );
        Ok(report)
    }

    fn parts(&self) -> SchedulerParts<'_> {
        SchedulerParts {
            config: &self.config,
            client: &self.client,
            classifier: &self.classifier,
            comparator: self.comparator.as_ref(),
            rules: &self.rules,
            detector: &self.detector,
        }
    }

    /// Rounds over newly found directories until a round adds nothing.
    async fn expand_frontier(
        &self,
        scheduler: &ProbeScheduler<'_>,
        session: &ScanSession,
        words: &[String],
    ) {
        let generator = PathGenerator::new(&self.config);
        let mut depth = 0;

        loop {
            if session.is_cancelled() {
                break;
            }
            let before = session.result_count();

            let directories: Vec<ProbeResult> = session
                .results()
                .into_iter()
                .filter(|r| r.is_directory && r.is_explorable())
                .collect();

            for dir in directories {
                if session.is_cancelled() {
                    break;
                }
                let Some(dir_url) = directory_url(&dir.url) else {
                    continue;
                };
                if !session.mark_expanded(dir_url.as_str()) {
                    continue;
                }

                let mut round_words = words.to_vec();
                if self.config.dynamic_wordlist && self.rules.should_deep_scan(dir_url.path()) {
                    round_words.extend(
                        self.rules
                            .directory_keywords(dir_url.path())
                            .into_iter()
                            .map(String::from),
                    );
                }

                let mut paths = generator.generate(&round_words);
                if self.config.crawl {
                    paths.extend(self.extract_from(session, &dir.url));
                }

                info!("Recursing into {} ({} paths)", dir_url, paths.len());
                scheduler.run(&dir_url, paths).await;
            }

            if self.config.crawl {
                self.crawl_new_files(scheduler, session).await;
            }

            depth += 1;
            let added = session.result_count() - before;
            debug!("Recursion round {} added {} results", depth, added);

            if added == 0 {
                break;
            }
            if self.config.recursion_depth > 0 && depth >= self.config.recursion_depth {
                break;
            }
        }
    }

    /// Extracts links from 200 files not yet analyzed and probes them under each file's parent.
    async fn crawl_new_files(&self, scheduler: &ProbeScheduler<'_>, session: &ScanSession) {
        let files: Vec<ProbeResult> = session
            .results()
            .into_iter()
            .filter(|r| r.status == 200 && !r.is_directory)
            .collect();

        for file in files {
            if session.is_cancelled() {
                break;
            }
            let paths = self.extract_from(session, &file.url);
            if paths.is_empty() {
                continue;
            }
            let Some(parent) = Url::parse(&file.url).ok().and_then(|u| parent_dir(&u)) else {
                continue;
            };
            debug!("Crawling {} extracted paths from {}", paths.len(), file.url);
            scheduler.run(&parent, paths).await;
        }
    }

    /// Final pass: every explorable result not yet analyzed, grouped by parent directory.
    async fn deep_analysis(
        &self,
        scheduler: &ProbeScheduler<'_>,
        session: &ScanSession,
        base: &Url,
    ) {
        let mut extracted = BTreeSet::new();
        for result in session.results().iter().filter(|r| r.is_explorable()) {
            extracted.extend(self.extract_from(session, &result.url));
        }
        if extracted.is_empty() {
            return;
        }

        let groups = EndpointExtractor::group_by_parent(&extracted);
        info!(
            "Deep analysis: {} extracted paths in {} directories",
            extracted.len(),
            groups.len()
        );

        for (parent, leaves) in groups {
            if session.is_cancelled() {
                break;
            }
            let Ok(dir) = base.join(&parent) else {
                continue;
            };
            scheduler.run(&dir, leaves).await;
        }
    }

    /// Root-relative paths found in a stored body, once per URL.
    fn extract_from(&self, session: &ScanSession, url: &str) -> BTreeSet<String> {
        if !session.mark_analyzed(url) {
            return BTreeSet::new();
        }
        let (Some(captured), Ok(page)) = (session.take_body(url), Url::parse(url)) else {
            return BTreeSet::new();
        };
        self.extractor
            .extract(&captured.body, captured.content_type.as_deref(), &page)
    }
}

/// Runs one scan with no observer and no external cancellation.
pub async fn scan<S: AsRef<str>>(
    target: &str,
    wordlist: &[S],
    config: ScanConfig,
) -> Result<ScanReport, ScanError> {
    Scanner::new(config)?
        .scan(target, wordlist, &NoopObserver, CancellationToken::new())
        .await
}

/// Accepts `host`, `host/path` or a full URL and returns it as a directory URL.
pub fn parse_target(target: &str) -> Result<Url, ScanError> {
    let trimmed = target.trim();
    let with_scheme = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{}", trimmed)
    };

    let mut url = Url::parse(&with_scheme).map_err(|source| ScanError::InvalidTarget {
        url: target.to_string(),
        source,
    })?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

fn directory_url(url: &str) -> Option<Url> {
    let mut url = Url::parse(url).ok()?;
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url.set_query(None);
    Some(url)
}
