//! Locating words inside the text they were tokenized from.
//!
//! Tokenization throws away offsets, so a word's position in the text is
//! recovered by searching for the words in document order. Each search
//! starts where the previous match ended, which keeps repeated words
//! ("the ... the") matched left to right instead of all landing on the
//! first occurrence.

use crate::errors::{PerturbError, PerturbResult};
use crate::snapshot::TextSnapshot;

/// Byte range of a word within a snapshot's joined text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WordSpan {
    /// Offset of the first byte of the word
    pub start: usize,
    /// Offset one past the last byte of the word
    pub end: usize,
}

impl WordSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

fn chars_eq_ignore_case(a: char, b: char) -> bool {
    a == b || a.to_lowercase().eq(b.to_lowercase())
}

/// Byte length of the prefix of `haystack` matching `needle` ignoring case.
fn match_len_at(haystack: &str, needle: &str) -> Option<usize> {
    let mut hay_chars = haystack.char_indices();
    for n in needle.chars() {
        let (_, h) = hay_chars.next()?;
        if !chars_eq_ignore_case(h, n) {
            return None;
        }
    }
    Some(hay_chars.next().map_or(haystack.len(), |(idx, _)| idx))
}

/// First case-insensitive occurrence of `needle` starting at or after `from`.
///
/// `from` must lie on a char boundary. Comparison is char by char, so the
/// returned offsets always index into `haystack` itself even when case
/// folding would change a character's byte length.
pub fn find_case_insensitive(haystack: &str, needle: &str, from: usize) -> Option<WordSpan> {
    let rest = haystack.get(from..)?;
    rest.char_indices()
        .map(|(offset, _)| from + offset)
        .chain(std::iter::once(haystack.len()))
        .find_map(|start| {
            match_len_at(&haystack[start..], needle).map(|len| WordSpan::new(start, start + len))
        })
}

/// Span of `words[index]` in `text`, found by sequential search over
/// `words[..=index]`.
pub fn span_of(text: &str, words: &[String], index: usize) -> Option<WordSpan> {
    let mut cursor = 0;
    let mut span = None;
    for word in words.get(..=index)? {
        let found = find_case_insensitive(text, word, cursor)?;
        cursor = found.end;
        span = Some(found);
    }
    span
}

/// Inclusive word range of a window of `window_size` words around `index`.
///
/// Near either end of the document the window slides toward the available
/// side instead of shrinking. Returns `None` for an empty window or an empty
/// document.
pub fn window_bounds(index: usize, window_size: usize, len: usize) -> Option<(usize, usize)> {
    if window_size == 0 || len == 0 {
        return None;
    }
    // Compare against half = (window_size - 1) / 2 using doubled values.
    let doubled_half = window_size - 1;
    if 2 * index < doubled_half {
        Some((0, (window_size - 1).min(len - 1)))
    } else if 2 * index + doubled_half >= 2 * len {
        Some((len.saturating_sub(window_size), len - 1))
    } else {
        Some((index - window_size / 2, index + (window_size - 1) / 2))
    }
}

impl TextSnapshot {
    fn check_word_index(&self, index: usize) -> PerturbResult<()> {
        if index < self.num_words() {
            Ok(())
        } else {
            Err(PerturbError::IndexOutOfRange {
                index,
                len: self.num_words(),
            })
        }
    }

    /// Byte span of word `index` within [`text`](TextSnapshot::text).
    pub fn span_of_word(&self, index: usize) -> PerturbResult<WordSpan> {
        self.check_word_index(index)?;
        span_of(self.text(), self.words(), index).ok_or_else(|| PerturbError::WordNotFound {
            word: self.words()[index].clone(),
            index,
        })
    }

    /// The text covering `window_size` words centered on `index`.
    pub fn text_window_around_index(
        &self,
        index: usize,
        window_size: usize,
    ) -> PerturbResult<&str> {
        self.check_word_index(index)?;
        match window_bounds(index, window_size, self.num_words()) {
            Some((start, end)) => {
                let start = self.span_of_word(start)?.start;
                let end = self.span_of_word(end)?.end;
                Ok(&self.text()[start..end])
            }
            None => Ok(""),
        }
    }

    /// The text before the beginning of word `index`.
    pub fn text_until_word_index(&self, index: usize) -> PerturbResult<&str> {
        let span = self.span_of_word(index)?;
        Ok(&self.text()[..span.start])
    }

    /// The text after the end of word `index`.
    pub fn text_after_word_index(&self, index: usize) -> PerturbResult<&str> {
        let span = self.span_of_word(index)?;
        Ok(&self.text()[span.end..])
    }
}
