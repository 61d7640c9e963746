use std::collections::BTreeMap;

use rand::Rng;
use rand::distr::Alphanumeric;
use tracing::debug;
use url::Url;

use super::comparator::ContentComparator;
use crate::http::HttpClient;
use crate::models::ResponseInfo;

pub const WILDCARD_PROBES: usize = 3;

/// Stable sets at least this large tolerate one missing token.
const LARGE_STABLE_SET: usize = 20;
const SIMILARITY_THRESHOLD: f64 = 0.75;
const RANDOM_PATH_LEN: usize = 16;

/// How a directory answers for paths that do not exist.
#[derive(Debug, Clone, PartialEq)]
pub enum WildcardSignature {
    UniformSize {
        status: u16,
        size: usize,
    },
    Tokens {
        status: u16,
        stable_tokens: Vec<String>,
        baseline: String,
        baseline_size: usize,
    },
}

impl WildcardSignature {
    /// Builds a signature from responses to synthetic paths, if they agree enough.
    pub fn from_probes(
        responses: &[ResponseInfo],
        comparator: &dyn ContentComparator,
    ) -> Option<Self> {
        let forbidden: Vec<&ResponseInfo> = responses.iter().filter(|r| r.status == 403).collect();
        for (i, a) in forbidden.iter().enumerate() {
            if forbidden[i + 1..].iter().any(|b| b.size == a.size) {
                return Some(WildcardSignature::UniformSize {
                    status: 403,
                    size: a.size,
                });
            }
        }

        let mut by_status: BTreeMap<u16, Vec<&ResponseInfo>> = BTreeMap::new();
        for response in responses {
            by_status.entry(response.status).or_default().push(response);
        }

        by_status
            .into_iter()
            .find(|(_, group)| group.len() >= 2)
            .map(|(status, group)| WildcardSignature::Tokens {
                status,
                stable_tokens: comparator.stable_tokens(&group[0].body, &group[1].body),
                baseline: group[0].body.clone(),
                baseline_size: group[0].size,
            })
    }

    pub fn status(&self) -> u16 {
        match self {
            WildcardSignature::UniformSize { status, .. } => *status,
            WildcardSignature::Tokens { status, .. } => *status,
        }
    }

    pub fn matches(&self, response: &ResponseInfo, comparator: &dyn ContentComparator) -> bool {
        match self {
            WildcardSignature::UniformSize { status, size } => {
                response.status == *status && response.size == *size
            }
            WildcardSignature::Tokens {
                status,
                stable_tokens,
                baseline,
                ..
            } => {
                response.status == *status
                    && Self::tokens_match(stable_tokens, baseline, &response.body, comparator)
            }
        }
    }

    fn tokens_match(
        stable_tokens: &[String],
        baseline: &str,
        body: &str,
        comparator: &dyn ContentComparator,
    ) -> bool {
        let tokens: Vec<&str> = body.split_whitespace().collect();
        let allowed_misses = if stable_tokens.len() >= LARGE_STABLE_SET { 1 } else { 0 };

        let mut next = 0;
        let mut misses = 0;
        for stable in stable_tokens {
            match tokens[next..].iter().position(|t| *t == stable.as_str()) {
                Some(offset) => next += offset,
                None => {
                    misses += 1;
                    if misses > allowed_misses {
                        return false;
                    }
                }
            }
        }

        if stable_tokens.len() < LARGE_STABLE_SET
            && tokens.len() > baseline.split_whitespace().count()
        {
            return comparator.similarity(baseline, body) > SIMILARITY_THRESHOLD;
        }

        true
    }
}

/// Probes random paths under a directory to learn its not-found behaviour.
#[derive(Debug, Clone)]
pub struct WildcardDetector {
    probes: usize,
}

impl WildcardDetector {
    pub fn new() -> Self {
        Self {
            probes: WILDCARD_PROBES,
        }
    }

    pub fn random_paths(&self) -> Vec<String> {
        let mut rng = rand::rng();
        (0..self.probes)
            .map(|_| {
                (&mut rng)
                    .sample_iter(&Alphanumeric)
                    .take(RANDOM_PATH_LEN)
                    .map(|c| char::from(c).to_ascii_lowercase())
                    .collect()
            })
            .collect()
    }

    pub async fn detect(
        &self,
        client: &HttpClient,
        dir_url: &Url,
        comparator: &dyn ContentComparator,
    ) -> Option<WildcardSignature> {
        let mut responses = Vec::with_capacity(self.probes);

        for path in self.random_paths() {
            let Ok(url) = dir_url.join(&path) else {
                continue;
            };
            match client.get(&url).await {
                Ok(response) => responses.push(response),
                Err(e) => debug!("Wildcard probe {} failed: {}", url, e),
            }
        }

        let signature = WildcardSignature::from_probes(&responses, comparator);
        if let Some(sig) = &signature {
            debug!("Wildcard signature for {}: status {}", dir_url, sig.status());
        }
        signature
    }
}

impl Default for WildcardDetector {
    fn default() -> Self {
        Self::new()
    }
}
