//! Word splitting for pre-tokenization.
//!
//! Normalized text is split on whitespace. Metaspace-style models also get
//! the replacement character (`▁` by default) in front of every word, which
//! is how their vocabularies mark word starts.

/// Text splitter for pre-tokenization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Splitter {
    /// Pattern to split on
    pattern: SplitPattern,
}

/// Splitting patterns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitPattern {
    /// Split on whitespace
    Whitespace,
    /// Split on whitespace and prefix each word with `replacement`
    Metaspace { replacement: char },
}

impl Splitter {
    /// Create a new splitter.
    pub fn new(pattern: SplitPattern) -> Self {
        Self { pattern }
    }

    /// Create a whitespace splitter.
    pub fn whitespace() -> Self {
        Self::new(SplitPattern::Whitespace)
    }

    /// Create a metaspace splitter.
    pub fn metaspace(replacement: char) -> Self {
        Self::new(SplitPattern::Metaspace { replacement })
    }

    pub fn pattern(&self) -> SplitPattern {
        self.pattern
    }

    /// Call `f` once per word, in order.
    ///
    /// Metaspace words are assembled in a reused buffer, so `f` only sees
    /// each word for the duration of the call.
    pub fn for_each_word(&self, text: &str, mut f: impl FnMut(&str)) {
        match self.pattern {
            SplitPattern::Whitespace => text.split_whitespace().for_each(f),
            SplitPattern::Metaspace { replacement } => {
                let mut word_buf = String::new();
                for word in text.split_whitespace() {
                    word_buf.clear();
                    word_buf.push(replacement);
                    word_buf.push_str(word);
                    f(&word_buf);
                }
            }
        }
    }

    /// Split text into words.
    pub fn split(&self, text: &str) -> Vec<String> {
        let mut words = Vec::new();
        self.for_each_word(text, |word| words.push(word.to_string()));
        words
    }
}

impl Default for Splitter {
    fn default() -> Self {
        Self::whitespace()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whitespace_split() {
        let splitter = Splitter::whitespace();
        let result = splitter.split("hello world  test");
        assert_eq!(result, vec!["hello", "world", "test"]);
    }

    #[test]
    fn test_metaspace_split() {
        let splitter = Splitter::metaspace('\u{2581}');
        let result = splitter.split(" hello\tworld ");
        assert_eq!(result, vec!["▁hello", "▁world"]);
    }

    #[test]
    fn test_empty_string() {
        assert_eq!(Splitter::whitespace().split(""), Vec::<String>::new());
        assert_eq!(Splitter::metaspace('_').split("   "), Vec::<String>::new());
    }
}
