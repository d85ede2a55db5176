//! Word tokenizers.
//!
//! The rewrite engine and the span locator only need a deterministic way to
//! turn text into an ordered list of words. [`Tokenizer`] is that seam;
//! [`WordTokenizer`] is the default, [`UnicodeWordTokenizer`] follows the
//! UAX #29 word boundaries.

use std::fmt;
use unicode_segmentation::UnicodeSegmentation;

/// Splits text into an ordered sequence of words.
///
/// Implementations must be stable: the same text always yields the same
/// words. Word counts of single replacements are derived from the same
/// tokenization, so `word_count(w) == 1` is expected for every `w` the
/// tokenizer itself produced.
pub trait Tokenizer: fmt::Debug + Send + Sync {
    fn words_from_text(&self, text: &str) -> Vec<String>;

    fn word_count(&self, text: &str) -> usize {
        self.words_from_text(text).len()
    }
}

/// Characters that may continue a word but never start one.
const CONTINUATION_CHARS: &[char] = &['\'', '-'];

/// Alphanumeric runs, allowing apostrophes and hyphens inside a word.
///
/// ```
/// use layered_perturb::{Tokenizer, WordTokenizer};
///
/// let words = WordTokenizer::new().words_from_text("Don't stop-start, ok?");
/// assert_eq!(words, vec!["Don't", "stop-start", "ok"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WordTokenizer {
    words_to_ignore: Vec<String>,
}

impl WordTokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop any word equal to one of `words` from the output.
    pub fn ignoring<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words_to_ignore: words.into_iter().map(Into::into).collect(),
        }
    }

    fn push_word(&self, words: &mut Vec<String>, word: &mut String) {
        if word.is_empty() {
            return;
        }
        let finished = std::mem::take(word);
        if !self.words_to_ignore.contains(&finished) {
            words.push(finished);
        }
    }
}

impl Tokenizer for WordTokenizer {
    fn words_from_text(&self, text: &str) -> Vec<String> {
        let mut words = Vec::new();
        let mut word = String::new();
        for c in text.chars() {
            if c.is_alphanumeric() || (!word.is_empty() && CONTINUATION_CHARS.contains(&c)) {
                word.push(c);
            } else {
                self.push_word(&mut words, &mut word);
            }
        }
        self.push_word(&mut words, &mut word);
        words
    }
}

/// Words according to Unicode word boundaries (UAX #29).
#[derive(Debug, Clone, Copy, Default)]
pub struct UnicodeWordTokenizer;

impl Tokenizer for UnicodeWordTokenizer {
    fn words_from_text(&self, text: &str) -> Vec<String> {
        text.unicode_words().map(str::to_string).collect()
    }

    fn word_count(&self, text: &str) -> usize {
        text.unicode_words().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_tokenizer_strips_punctuation() {
        let words = WordTokenizer::new().words_from_text("The quick fox jumps.");
        assert_eq!(words, vec!["The", "quick", "fox", "jumps"]);
    }

    #[test]
    fn test_word_tokenizer_continuation_chars() {
        let words = WordTokenizer::new().words_from_text("don't stop-gap -x 'quoted'");
        // Leading apostrophes and hyphens are dropped, trailing ones are kept.
        assert_eq!(words, vec!["don't", "stop-gap", "x", "quoted'"]);
    }

    #[test]
    fn test_word_tokenizer_separators_produce_no_words() {
        let tokenizer = WordTokenizer::new();
        assert_eq!(tokenizer.word_count(">>>>"), 0);
        assert_eq!(tokenizer.word_count(""), 0);
        assert_eq!(tokenizer.word_count("very slow"), 2);
    }

    #[test]
    fn test_word_tokenizer_ignoring() {
        let tokenizer = WordTokenizer::ignoring(vec!["the", "a"]);
        let words = tokenizer.words_from_text("the cat saw a dog");
        assert_eq!(words, vec!["cat", "saw", "dog"]);
    }

    #[test]
    fn test_word_tokenizer_unicode_letters() {
        let words = WordTokenizer::new().words_from_text("Café naïve—résumé");
        assert_eq!(words, vec!["Café", "naïve", "résumé"]);
    }

    #[test]
    fn test_unicode_word_tokenizer() {
        let words = UnicodeWordTokenizer.words_from_text("The quick (\"brown\") fox can't jump.");
        assert_eq!(words, vec!["The", "quick", "brown", "fox", "can't", "jump"]);
        assert_eq!(UnicodeWordTokenizer.word_count("very slow"), 2);
    }
}
