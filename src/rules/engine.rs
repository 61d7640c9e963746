use std::collections::BTreeSet;

use regex::{Regex, RegexBuilder};
use tracing::warn;

use super::catalog::{CATALOG, RuleSpec};

/// Top priority at or above which a discovery is recorded as important.
pub const IMPORTANT_PRIORITY: u32 = 70;

const FALLBACK_EXTENSIONS: &[&str] = &["php", "html", "js", "json", "txt"];

#[derive(Debug)]
pub struct Rule {
    pub name: &'static str,
    pub pattern: Regex,
    pub priority: u32,
    pub keywords: &'static [&'static str],
    pub extensions: &'static [&'static str],
    pub recursive: bool,
    pub description: &'static str,
}

impl Rule {
    fn compile(spec: &RuleSpec) -> Option<Self> {
        let pattern = match RegexBuilder::new(spec.pattern).case_insensitive(true).build() {
            Ok(re) => re,
            Err(e) => {
                warn!("Skipping rule '{}': {}", spec.name, e);
                return None;
            }
        };

        Some(Self {
            name: spec.name,
            pattern,
            priority: spec.priority,
            keywords: spec.keywords,
            extensions: spec.extensions,
            recursive: spec.recursive,
            description: spec.description,
        })
    }
}

/// Ranks discovered paths against the rule catalog and derives follow-up words.
#[derive(Debug)]
pub struct RuleEngine {
    rules: Vec<Rule>,
}

impl RuleEngine {
    pub fn new() -> Self {
        Self {
            rules: CATALOG.iter().filter_map(Rule::compile).collect(),
        }
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Matching rules, highest priority first; ties keep catalog order.
    pub fn matches(&self, path: &str) -> Vec<&Rule> {
        let path = rooted(path);
        let mut matched: Vec<&Rule> = self
            .rules
            .iter()
            .filter(|rule| rule.pattern.is_match(&path))
            .collect();
        matched.sort_by(|a, b| b.priority.cmp(&a.priority));
        matched
    }

    pub fn top_priority(&self, path: &str) -> Option<u32> {
        self.matches(path).first().map(|rule| rule.priority)
    }

    pub fn is_important(&self, path: &str) -> bool {
        self.top_priority(path)
            .is_some_and(|priority| priority >= IMPORTANT_PRIORITY)
    }

    /// Keywords of every matching rule plus variants built on the last path segment.
    pub fn expansion_keywords(&self, path: &str) -> BTreeSet<String> {
        let matched = self.matches(path);
        let mut keywords = BTreeSet::new();
        if matched.is_empty() {
            return keywords;
        }

        for rule in &matched {
            keywords.extend(rule.keywords.iter().map(|k| k.to_string()));
        }

        if let Some(base) = last_segment(path) {
            keywords.insert(format!("{}/", base));
            keywords.insert(format!("{}/index", base));
            keywords.insert(format!("{}/admin", base));
            keywords.insert(format!("{}/api", base));
        }

        keywords
    }

    /// Keywords worth probing inside a directory at `path`.
    pub fn directory_keywords(&self, path: &str) -> BTreeSet<&'static str> {
        self.matches(path)
            .into_iter()
            .filter(|rule| rule.recursive)
            .flat_map(|rule| rule.keywords.iter().copied())
            .collect()
    }

    pub fn recommended_extensions(&self, path: &str) -> BTreeSet<&'static str> {
        let extensions: BTreeSet<&'static str> = self
            .matches(path)
            .into_iter()
            .flat_map(|rule| rule.extensions.iter().copied())
            .collect();

        if extensions.is_empty() {
            FALLBACK_EXTENSIONS.iter().copied().collect()
        } else {
            extensions
        }
    }

    pub fn should_deep_scan(&self, path: &str) -> bool {
        self.matches(path)
            .iter()
            .any(|rule| rule.priority >= IMPORTANT_PRIORITY && rule.recursive)
    }

    /// Stable reorder by top priority. Unmatched paths keep their order at the end.
    pub fn prioritize<S: AsRef<str>>(&self, paths: &[S]) -> Vec<String> {
        let mut ranked: Vec<(u32, &str)> = paths
            .iter()
            .map(|p| (self.top_priority(p.as_ref()).unwrap_or(0), p.as_ref()))
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0));
        ranked.into_iter().map(|(_, p)| p.to_string()).collect()
    }
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn rooted(path: &str) -> String {
    format!("/{}", path.trim_start_matches('/'))
}

fn last_segment(path: &str) -> Option<&str> {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
}
