//! Harvests same-origin paths from response bodies.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;
use url::Url;

const MAX_PATH_LEN: usize = 200;
const ENTROPY_MIN_SEGMENT: usize = 24;
const ENTROPY_LIMIT: f64 = 4.2;

const STATIC_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "ico", "bmp", "webp", "tif", "tiff", "css", "woff",
    "woff2", "ttf", "eot", "otf", "mp3", "mp4", "webm", "avi", "mov", "wav", "ogg", "flac",
];

const IGNORED_SCHEMES: &[&str] = &["javascript:", "mailto:", "tel:", "data:", "about:", "blob:"];

struct Pattern {
    name: &'static str,
    regex: Regex,
    robots_only: bool,
}

const PATTERN_SOURCES: &[(&str, &str, bool)] = &[
    (
        "attribute",
        r#"(?i)\b(?:href|src|action|formaction|data-src|data-url|data-href|poster|background)\s*=\s*["']([^"'<>\s]+)["']"#,
        false,
    ),
    (
        "fetch",
        r#"(?i)(?:\bfetch|\baxios(?:\.(?:get|post|put|patch|delete|head))?|\$\.(?:get|post|ajax|getJSON|load)|\.open)\s*\(\s*(?:["'][A-Z]+["']\s*,\s*)?["'`]([^"'`\s]+)["'`]"#,
        false,
    ),
    ("ajax_url", r#"(?i)\burl\s*:\s*["'`]([^"'`\s]+)["'`]"#, false),
    (
        "import",
        r#"(?i)(?:\bimport\s+(?:[\w*{}\s,]+\s+from\s+)?|\brequire(?:_once)?\s*\(?\s*|\binclude(?:_once)?\s*\(?\s*)["']([^"']+)["']"#,
        false,
    ),
    (
        "comment",
        r#"(?s)(?:<!--|/\*)(.*?)(?:-->|\*/)"#,
        false,
    ),
    (
        "meta_refresh",
        r#"(?i)<meta[^>]+content\s*=\s*["'][^"']*url=([^"'>\s]+)"#,
        false,
    ),
    (
        "robots",
        r"(?im)^\s*(?:allow|disallow|sitemap)\s*:\s*(\S+)",
        true,
    ),
    ("quoted_path", r#"["'`](/[A-Za-z0-9_\-./~%]{2,})["'`]"#, false),
];

static COMMENT_PATH: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?:^|[\s(=])(/[A-Za-z0-9_\-./~%]{2,})").ok());

static PATTERNS: LazyLock<Vec<Pattern>> = LazyLock::new(|| {
    PATTERN_SOURCES
        .iter()
        .filter_map(|(name, source, robots_only)| match Regex::new(source) {
            Ok(regex) => Some(Pattern {
                name: *name,
                regex,
                robots_only: *robots_only,
            }),
            Err(e) => {
                warn!("Skipping extraction pattern '{}': {}", name, e);
                None
            }
        })
        .collect()
});

/// Pulls candidate paths out of links, scripts, comments and robots directives.
#[derive(Debug, Default, Clone, Copy)]
pub struct EndpointExtractor;

impl EndpointExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Root-relative, same-origin paths referenced by `body`, which was served from `page`.
    pub fn extract(&self, body: &str, content_type: Option<&str>, page: &Url) -> BTreeSet<String> {
        let robots = is_robots(content_type, page);
        let mut found = BTreeSet::new();

        for pattern in PATTERNS.iter() {
            if pattern.robots_only && !robots {
                continue;
            }

            for caps in pattern.regex.captures_iter(body) {
                let Some(raw) = caps.get(1).map(|m| m.as_str()) else {
                    continue;
                };

                if pattern.name == "comment" {
                    for candidate in comment_paths(raw) {
                        if let Some(path) = normalize(candidate, page) {
                            found.insert(path);
                        }
                    }
                } else if let Some(path) = normalize(raw, page) {
                    found.insert(path);
                }
            }
        }

        found
    }

    /// Groups root-relative paths by their parent directory (`/a/b/c` -> `/a/b/`).
    pub fn group_by_parent(paths: &BTreeSet<String>) -> HashMap<String, Vec<String>> {
        let mut groups: HashMap<String, Vec<String>> = HashMap::new();
        for path in paths {
            let trimmed = path.trim_end_matches('/');
            let (parent, leaf) = match trimmed.rfind('/') {
                Some(idx) => (&trimmed[..=idx], &path[idx + 1..]),
                None => ("/", path.as_str()),
            };
            if leaf.is_empty() {
                continue;
            }
            groups.entry(parent.to_string()).or_default().push(leaf.to_string());
        }
        groups
    }
}

fn is_robots(content_type: Option<&str>, page: &Url) -> bool {
    page.path().ends_with("robots.txt")
        || content_type.is_some_and(|ct| ct.to_ascii_lowercase().starts_with("text/plain"))
}

fn comment_paths(comment: &str) -> Vec<&str> {
    match COMMENT_PATH.as_ref() {
        Some(re) => re
            .captures_iter(comment)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect(),
        None => Vec::new(),
    }
}

/// Reduces a raw reference to a same-origin, query-free path starting with `/`.
fn normalize(raw: &str, page: &Url) -> Option<String> {
    let raw = raw.trim().trim_matches(|c: char| c == '\\' || c == '"' || c == '\'');
    if raw.is_empty() || raw.starts_with('#') || raw.len() > MAX_PATH_LEN {
        return None;
    }

    let lower = raw.to_ascii_lowercase();
    if IGNORED_SCHEMES.iter().any(|s| lower.starts_with(s)) {
        return None;
    }
    if raw.contains(['{', '}', '$', '<', '>', '*', ' ']) {
        return None;
    }

    let resolved = page.join(raw).ok()?;
    if !matches!(resolved.scheme(), "http" | "https") {
        return None;
    }
    if resolved.host_str() != page.host_str()
        || resolved.port_or_known_default() != page.port_or_known_default()
    {
        return None;
    }

    let decoded = urlencoding::decode(resolved.path()).ok()?;
    let path = collapse_slashes(&decoded);
    if path == "/" || path.len() > MAX_PATH_LEN {
        return None;
    }
    if is_static_asset(&path) || looks_random(&path) {
        return None;
    }

    Some(path)
}

fn collapse_slashes(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut prev_slash = false;
    for c in path.chars() {
        if c == '/' {
            if !prev_slash {
                out.push(c);
            }
            prev_slash = true;
        } else {
            out.push(c);
            prev_slash = false;
        }
    }
    out
}

fn is_static_asset(path: &str) -> bool {
    let last = path.rsplit('/').next().unwrap_or(path);
    last.rsplit_once('.')
        .is_some_and(|(_, ext)| STATIC_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

fn looks_random(path: &str) -> bool {
    path.split('/').any(|segment| {
        segment.len() >= ENTROPY_MIN_SEGMENT && shannon_entropy(segment) > ENTROPY_LIMIT
    })
}

fn shannon_entropy(s: &str) -> f64 {
    let mut counts: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *counts.entry(c).or_default() += 1;
    }
    let len = s.chars().count() as f64;
    counts
        .values()
        .map(|&n| {
            let p = n as f64 / len;
            -p * p.log2()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> Url {
        Url::parse("http://example.com/app/index.html").unwrap()
    }

    fn extract(body: &str) -> BTreeSet<String> {
        EndpointExtractor::new().extract(body, Some("text/html"), &page())
    }

    #[test]
    fn test_attributes() {
        let found = extract(
            r#"<a href="/admin/login">x</a><form action="submit.php"></form>
               <script src="/static/app.js"></script><img src="/logo.png">"#,
        );
        assert!(found.contains("/admin/login"));
        assert!(found.contains("/app/submit.php"));
        assert!(found.contains("/static/app.js"));
        assert!(!found.contains("/logo.png"));
    }

    #[test]
    fn test_fetch_and_ajax() {
        let found = extract(
            r#"fetch('/api/v1/users?page=2'); $.ajax({ url: "/api/orders#top" });
               axios.post("/api/login"); xhr.open("GET", "/internal/stats");"#,
        );
        assert!(found.contains("/api/v1/users"));
        assert!(found.contains("/api/orders"));
        assert!(found.contains("/api/login"));
        assert!(found.contains("/internal/stats"));
    }

    #[test]
    fn test_comments() {
        let found = extract("<!-- old panel at /backup/old_admin -->\n/* TODO move /legacy/api */");
        assert!(found.contains("/backup/old_admin"));
        assert!(found.contains("/legacy/api"));
    }

    #[test]
    fn test_robots_only_for_plain_text() {
        let robots = "User-agent: *\nDisallow: /private/\nAllow: /public\n";
        let url = Url::parse("http://example.com/robots.txt").unwrap();
        let found = EndpointExtractor::new().extract(robots, Some("text/plain"), &url);
        assert!(found.contains("/private/"));
        assert!(found.contains("/public"));

        let html = EndpointExtractor::new().extract(robots, Some("text/html"), &page());
        assert!(!html.contains("/private/"));
    }

    #[test]
    fn test_cross_origin_rejected() {
        let found = extract(
            r#"<a href="https://other.com/admin">x</a><a href="//cdn.other.com/lib">y</a>
               <a href="http://example.com/same">z</a><a href="mailto:a@b.c">m</a>"#,
        );
        assert!(!found.contains("/admin"));
        assert!(!found.contains("/lib"));
        assert!(found.contains("/same"));
        assert_eq!(found.len(), 1);
    }

    #[test]
    fn test_high_entropy_rejected() {
        let found = extract(r#"<script src="/assets/a8Fk29XmQz7LpR3vTy6WnB1cJd.js"></script>"#);
        assert!(found.is_empty());
    }

    #[test]
    fn test_overlong_rejected() {
        let long = format!("/{}", "a/".repeat(150));
        let found = extract(&format!(r#"<a href="{}">x</a>"#, long));
        assert!(found.is_empty());
    }

    #[test]
    fn test_template_literals_rejected() {
        let found = extract(r#"fetch(`/api/${id}/edit`)"#);
        assert!(found.is_empty());
    }

    #[test]
    fn test_group_by_parent() {
        let paths: BTreeSet<String> = ["/a/b/c.js", "/a/b/d", "/top", "/dir/"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let groups = EndpointExtractor::group_by_parent(&paths);
        let mut ab = groups["/a/b/"].clone();
        ab.sort();
        assert_eq!(ab, vec!["c.js", "d"]);
        assert_eq!(groups["/"], vec!["dir/", "top"]);
    }
}
