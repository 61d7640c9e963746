use similar::{ChangeTag, TextDiff};

/// Content comparison used by wildcard detection.
pub trait ContentComparator: Send + Sync {
    /// Whitespace tokens of `first` left unchanged by a word diff against `second`.
    fn stable_tokens(&self, first: &str, second: &str) -> Vec<String>;

    /// Similarity ratio in `[0, 1]`.
    fn similarity(&self, a: &str, b: &str) -> f64;
}

/// Word-level diff for stable tokens, character diff ratio for similarity.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiffComparator;

impl DiffComparator {
    pub fn new() -> Self {
        Self
    }
}

impl ContentComparator for DiffComparator {
    fn stable_tokens(&self, first: &str, second: &str) -> Vec<String> {
        let old: Vec<&str> = first.split_whitespace().collect();
        let new: Vec<&str> = second.split_whitespace().collect();

        let diff = TextDiff::from_slices(old.as_slice(), new.as_slice());
        diff.iter_all_changes()
            .filter(|change| change.tag() == ChangeTag::Equal)
            .map(|change| change.value().to_string())
            .collect()
    }

    fn similarity(&self, a: &str, b: &str) -> f64 {
        if a == b {
            return 1.0;
        }
        TextDiff::from_chars(a, b).ratio() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_content_fully_stable() {
        let cmp = DiffComparator::new();
        let tokens = cmp.stable_tokens("This is static content", "This is static content");
        assert_eq!(tokens, vec!["This", "is", "static", "content"]);
    }

    #[test]
    fn test_dynamic_tokens_dropped() {
        let cmp = DiffComparator::new();
        let tokens = cmp.stable_tokens(
            "The time is 10:30 and date is Monday",
            "The time is 14:45 and date is Tuesday",
        );
        assert_eq!(tokens, vec!["The", "time", "is", "and", "date", "is"]);
    }

    #[test]
    fn test_similarity_bounds() {
        let cmp = DiffComparator::new();
        assert_eq!(cmp.similarity("abc", "abc"), 1.0);
        assert!(cmp.similarity("abcdef", "abcdxf") > 0.75);
        assert!(cmp.similarity("abcdef", "zyxwvu") < 0.2);
    }
}
