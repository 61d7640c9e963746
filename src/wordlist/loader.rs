use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ScanError;

/// Where words come from.
#[derive(Debug, Clone)]
pub enum WordlistSource {
    File(PathBuf),
    Inline(Vec<String>),
}

impl WordlistSource {
    /// Treats `spec` as a file if it exists, otherwise as a comma-separated list.
    pub fn parse(spec: &str) -> Self {
        let path = Path::new(spec);
        if path.is_file() {
            WordlistSource::File(path.to_path_buf())
        } else {
            WordlistSource::Inline(
                spec.split(',')
                    .map(|w| w.trim().to_string())
                    .filter(|w| !w.is_empty())
                    .collect(),
            )
        }
    }

    pub fn load(&self) -> Result<Vec<String>, ScanError> {
        match self {
            WordlistSource::File(path) => load_wordlist(path),
            WordlistSource::Inline(words) => Ok(words.clone()),
        }
    }
}

/// Reads a newline-delimited wordlist, skipping blanks and `#` comments.
pub fn load_wordlist(path: &Path) -> Result<Vec<String>, ScanError> {
    let content = fs::read(path).map_err(|source| ScanError::Wordlist {
        path: path.to_path_buf(),
        source,
    })?;
    let content = String::from_utf8_lossy(&content);
    Ok(parse_lines(&content))
}

/// Unions several sources, keeping the first occurrence of each word.
pub fn merge_wordlists(sources: &[WordlistSource]) -> Result<Vec<String>, ScanError> {
    let mut seen = HashSet::new();
    let mut merged = Vec::new();

    for source in sources {
        for word in source.load()? {
            if seen.insert(word.clone()) {
                merged.push(word);
            }
        }
    }

    Ok(merged)
}

/// Loads every `{status}_blacklist.txt` in `dir`.
pub fn load_blacklists(dir: &Path) -> Result<HashMap<u16, Vec<String>>, ScanError> {
    let entries = fs::read_dir(dir).map_err(|source| ScanError::Blacklist {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut blacklists = HashMap::new();

    for entry in entries {
        let entry = entry.map_err(|source| ScanError::Blacklist {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        let Some(status) = blacklist_status(&path) else {
            continue;
        };

        let content = fs::read_to_string(&path).map_err(|source| ScanError::Blacklist {
            path: path.clone(),
            source,
        })?;
        let patterns = parse_lines(&content);
        debug!("Loaded {} blacklist patterns for status {}", patterns.len(), status);
        blacklists.insert(status, patterns);
    }

    Ok(blacklists)
}

fn blacklist_status(path: &Path) -> Option<u16> {
    let name = path.file_name()?.to_str()?;
    let code = name.strip_suffix("_blacklist.txt")?;
    code.parse().ok()
}

fn parse_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_wordlist_skips_comments() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# comment\nadmin\n\n  api  \n#another").unwrap();

        let words = load_wordlist(file.path()).unwrap();
        assert_eq!(words, vec!["admin", "api"]);
    }

    #[test]
    fn test_missing_wordlist_is_error() {
        let result = load_wordlist(Path::new("/definitely/not/here.txt"));
        assert!(matches!(result, Err(ScanError::Wordlist { .. })));
    }

    #[test]
    fn test_inline_source() {
        let source = WordlistSource::parse("admin, api,,backup");
        assert_eq!(source.load().unwrap(), vec!["admin", "api", "backup"]);
    }

    #[test]
    fn test_merge_keeps_first_occurrence() {
        let merged = merge_wordlists(&[
            WordlistSource::Inline(vec!["a".into(), "b".into()]),
            WordlistSource::Inline(vec!["b".into(), "c".into()]),
        ])
        .unwrap();
        assert_eq!(merged, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_load_blacklists() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("403_blacklist.txt"), "server-status\n# skip\n.htaccess\n")
            .unwrap();
        fs::write(dir.path().join("500_blacklist.txt"), "cgi-bin/\n").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored\n").unwrap();

        let blacklists = load_blacklists(dir.path()).unwrap();
        assert_eq!(blacklists.len(), 2);
        assert_eq!(blacklists[&403], vec!["server-status", ".htaccess"]);
        assert_eq!(blacklists[&500], vec!["cgi-bin/"]);
    }

    #[test]
    fn test_missing_blacklist_dir_is_error() {
        let result = load_blacklists(Path::new("/definitely/not/here"));
        assert!(matches!(result, Err(ScanError::Blacklist { .. })));
    }
}
