/// Case-insensitive substring filter over a DJ's banned words.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BannedWordFilter {
    words: Vec<String>,
}

impl BannedWordFilter {
    /// Builds a filter from raw user input; entries are trimmed and blank
    /// entries dropped.
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words = words
            .into_iter()
            .map(|word| word.as_ref().trim().to_lowercase())
            .filter(|word| !word.is_empty())
            .collect();
        Self { words }
    }

    /// Returns the first banned word contained in `text`.
    pub fn find_match(&self, text: &str) -> Option<&str> {
        if self.words.is_empty() {
            return None;
        }
        let haystack = text.to_lowercase();
        self.words
            .iter()
            .find(|word| haystack.contains(word.as_str()))
            .map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_substrings_case_insensitively() {
        let filter = BannedWordFilter::new(["Spam"]);
        assert_eq!(filter.find_match("no SPAMMING please"), Some("spam"));
        assert_eq!(filter.find_match("clean message"), None);
    }

    #[test]
    fn ignores_blank_entries() {
        let filter = BannedWordFilter::new(["  ", "", " rude "]);
        assert!(!filter.is_empty());
        assert_eq!(filter.find_match("anything"), None);
        assert_eq!(filter.find_match("so rude"), Some("rude"));
    }

    #[test]
    fn empty_filter_never_matches() {
        let filter = BannedWordFilter::new(Vec::<String>::new());
        assert!(filter.is_empty());
        assert_eq!(filter.find_match(""), None);
    }
}
