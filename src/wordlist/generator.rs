use std::collections::BTreeSet;

use crate::models::ScanConfig;

/// Expands words into candidate paths according to the scan options.
pub struct PathGenerator<'a> {
    config: &'a ScanConfig,
}

impl<'a> PathGenerator<'a> {
    pub fn new(config: &'a ScanConfig) -> Self {
        Self { config }
    }

    pub fn generate<S: AsRef<str>>(&self, words: &[S]) -> BTreeSet<String> {
        let mut paths = BTreeSet::new();

        for word in words {
            let word = word.as_ref().trim().trim_start_matches('/');
            if word.is_empty() {
                continue;
            }

            if self.has_extension_tag(word) {
                for ext in &self.config.extensions {
                    let path =
                        word.replace(&self.config.extension_tag, ext.trim_start_matches('.'));
                    self.insert_with_variants(&mut paths, path);
                }
                continue;
            }

            for subdir in Self::or_blank(&self.config.subdirs) {
                let subdir = subdir.trim_matches('/');
                let base = if subdir.is_empty() {
                    word.to_string()
                } else {
                    format!("{}/{}", subdir, word)
                };

                for prefix in Self::or_blank(&self.config.prefixes) {
                    for suffix in Self::or_blank(&self.config.suffixes) {
                        let path = format!("{}{}{}", prefix, base, suffix);

                        if self.config.extensions.is_empty() {
                            self.insert_with_variants(&mut paths, path);
                        } else {
                            for ext in &self.config.extensions {
                                let ext = ext.trim_start_matches('.');
                                self.insert_with_variants(&mut paths, format!("{}.{}", path, ext));
                            }
                        }
                    }
                }
            }
        }

        paths
    }

    fn has_extension_tag(&self, word: &str) -> bool {
        !self.config.extension_tag.is_empty() && word.contains(&self.config.extension_tag)
    }

    fn insert_with_variants(&self, paths: &mut BTreeSet<String>, path: String) {
        if self.is_excluded(&path) {
            return;
        }

        if self.config.uppercase {
            paths.insert(path.to_uppercase());
        }
        if self.config.lowercase {
            paths.insert(path.to_lowercase());
        }
        if self.config.capitalization {
            paths.insert(capitalize(&path));
        }
        paths.insert(path);
    }

    fn is_excluded(&self, path: &str) -> bool {
        if self.config.exclude_extensions.is_empty() {
            return false;
        }
        let last = path.rsplit('/').next().unwrap_or(path);
        match last.rsplit_once('.') {
            Some((_, ext)) => self
                .config
                .exclude_extensions
                .iter()
                .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(ext)),
            None => false,
        }
    }

    fn or_blank(values: &[String]) -> Vec<&str> {
        if values.is_empty() {
            vec![""]
        } else {
            values.iter().map(String::as_str).collect()
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ScanConfig {
        ScanConfig::default()
    }

    #[test]
    fn test_plain_words() {
        let config = config();
        let paths = PathGenerator::new(&config).generate(&["admin", "api", "admin"]);
        assert_eq!(paths.len(), 2);
        assert!(paths.contains("admin"));
        assert!(paths.contains("api"));
    }

    #[test]
    fn test_empty_wordlist() {
        let config = config();
        let words: Vec<String> = Vec::new();
        assert!(PathGenerator::new(&config).generate(&words).is_empty());
    }

    #[test]
    fn test_extension_tag_substitution() {
        let config = ScanConfig {
            extensions: vec!["php".to_string(), "asp".to_string()],
            ..config()
        };
        let paths = PathGenerator::new(&config).generate(&["admin.%EXT%"]);
        let expected: BTreeSet<String> =
            ["admin.php", "admin.asp"].iter().map(|s| s.to_string()).collect();
        assert_eq!(paths, expected);
    }

    #[test]
    fn test_extension_tag_without_extensions() {
        let config = config();
        let paths = PathGenerator::new(&config).generate(&["admin.%EXT%"]);
        assert!(paths.is_empty());
    }

    #[test]
    fn test_extensions_appended() {
        let config = ScanConfig {
            extensions: vec!["php".to_string(), ".bak".to_string()],
            ..config()
        };
        let paths = PathGenerator::new(&config).generate(&["index"]);
        assert_eq!(paths.len(), 2);
        assert!(paths.contains("index.php"));
        assert!(paths.contains("index.bak"));
        assert!(!paths.contains("index"));
    }

    #[test]
    fn test_prefix_suffix_subdir_product() {
        let config = ScanConfig {
            prefixes: vec!["".to_string(), "_".to_string()],
            suffixes: vec!["".to_string(), "~".to_string()],
            subdirs: vec!["old/".to_string()],
            ..config()
        };
        let paths = PathGenerator::new(&config).generate(&["db"]);
        assert_eq!(paths.len(), 4);
        assert!(paths.contains("old/db"));
        assert!(paths.contains("_old/db"));
        assert!(paths.contains("old/db~"));
        assert!(paths.contains("_old/db~"));
    }

    #[test]
    fn test_case_variants() {
        let config = ScanConfig {
            uppercase: true,
            lowercase: true,
            capitalization: true,
            ..config()
        };
        let paths = PathGenerator::new(&config).generate(&["aDmin"]);
        assert!(paths.contains("aDmin"));
        assert!(paths.contains("ADMIN"));
        assert!(paths.contains("admin"));
        assert!(paths.contains("Admin"));
        assert_eq!(paths.len(), 4);
    }

    #[test]
    fn test_case_variants_collapse() {
        let config = ScanConfig {
            lowercase: true,
            ..config()
        };
        let paths = PathGenerator::new(&config).generate(&["admin"]);
        assert_eq!(paths.len(), 1);
    }

    #[test]
    fn test_exclude_extensions() {
        let config = ScanConfig {
            exclude_extensions: vec!["jpg".to_string()],
            ..config()
        };
        let paths = PathGenerator::new(&config).generate(&["logo.jpg", "logo.png", "logo"]);
        assert!(!paths.contains("logo.jpg"));
        assert!(paths.contains("logo.png"));
        assert!(paths.contains("logo"));
    }

    #[test]
    fn test_leading_slash_and_blank_words() {
        let config = config();
        let paths = PathGenerator::new(&config).generate(&["/admin", "  ", ""]);
        assert_eq!(paths.len(), 1);
        assert!(paths.contains("admin"));
    }
}
