//! Producing new snapshots from word-level edits.
//!
//! All edit front-ends reduce to [`TextSnapshot::replace_new_words`], which
//! walks the original text once, left to right, swapping each word for its
//! replacement while copying the punctuation and whitespace between words
//! verbatim. Replacements may be empty (deletion) or hold several words
//! (insertion); the index map and modified indices are shifted as the walk
//! goes so that later edits see the positions produced by earlier ones.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{PerturbError, PerturbResult};
use crate::index_map::ModifiedIndices;
use crate::snapshot::{Derivation, TextSnapshot};

/// Replace the word at `index` with `replacement`.
///
/// An empty replacement deletes the word, a replacement with several words
/// inserts the extra ones.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edit {
    pub index: usize,
    pub replacement: String,
}

impl Edit {
    pub fn replace(index: usize, replacement: impl Into<String>) -> Self {
        Self {
            index,
            replacement: replacement.into(),
        }
    }

    pub fn delete(index: usize) -> Self {
        Self::replace(index, "")
    }
}

impl TextSnapshot {
    /// Apply a batch of edits, each word position at most once.
    pub fn rewrite(&self, edits: &[Edit]) -> PerturbResult<TextSnapshot> {
        let indices: Vec<usize> = edits.iter().map(|edit| edit.index).collect();
        let new_words: Vec<&str> = edits.iter().map(|edit| edit.replacement.as_str()).collect();
        self.replace_words_at_indices(&indices, &new_words)
    }

    /// Replace `words[indices[k]]` with `new_words[k]` for every `k`.
    pub fn replace_words_at_indices<S: AsRef<str>>(
        &self,
        indices: &[usize],
        new_words: &[S],
    ) -> PerturbResult<TextSnapshot> {
        if indices.len() != new_words.len() {
            return Err(PerturbError::EditCountMismatch {
                indices: indices.len(),
                words: new_words.len(),
            });
        }
        let mut words = self.words().to_vec();
        let mut seen = HashSet::with_capacity(indices.len());
        for (&index, new_word) in indices.iter().zip(new_words) {
            if index >= words.len() {
                return Err(PerturbError::IndexOutOfRange {
                    index,
                    len: words.len(),
                });
            }
            if !seen.insert(index) {
                return Err(PerturbError::DuplicateIndex { index });
            }
            words[index] = new_word.as_ref().to_string();
        }
        self.replace_new_words(&words)
    }

    pub fn replace_word_at_index(
        &self,
        index: usize,
        new_word: &str,
    ) -> PerturbResult<TextSnapshot> {
        self.replace_words_at_indices(&[index], &[new_word])
    }

    pub fn delete_word_at_index(&self, index: usize) -> PerturbResult<TextSnapshot> {
        self.replace_word_at_index(index, "")
    }

    /// Insert `text` as new words directly before word `index`.
    ///
    /// The word at `index` is re-emitted as part of the replacement, so it is
    /// reported as modified along with the inserted words.
    pub fn insert_text_before_word_index(
        &self,
        index: usize,
        text: &str,
    ) -> PerturbResult<TextSnapshot> {
        let word = self.word_at(index)?;
        self.replace_word_at_index(index, &format!("{} {}", text, word))
    }

    /// Insert `text` as new words directly after word `index`.
    pub fn insert_text_after_word_index(
        &self,
        index: usize,
        text: &str,
    ) -> PerturbResult<TextSnapshot> {
        let word = self.word_at(index)?;
        self.replace_word_at_index(index, &format!("{} {}", word, text))
    }

    fn word_at(&self, index: usize) -> PerturbResult<&str> {
        self.words()
            .get(index)
            .map(String::as_str)
            .ok_or(PerturbError::IndexOutOfRange {
                index,
                len: self.num_words(),
            })
    }

    /// Replace the words of this snapshot positionally with `new_words`.
    ///
    /// `new_words[i]` stands in for `words[i]`; unchanged words must be passed
    /// as themselves. A list shorter than the word list leaves the remaining
    /// words untouched. The original punctuation and spacing are preserved.
    pub fn replace_new_words<S: AsRef<str>>(
        &self,
        new_words: &[S],
    ) -> PerturbResult<TextSnapshot> {
        if new_words.len() > self.num_words() {
            return Err(PerturbError::EditCountMismatch {
                indices: self.num_words(),
                words: new_words.len(),
            });
        }
        let split_token = self.context().split_token();
        if let Some(bad) = new_words
            .iter()
            .map(AsRef::as_ref)
            .find(|word| word.contains(split_token))
        {
            return Err(PerturbError::invalid_input(format!(
                "replacement {:?} contains the split token",
                bad
            )));
        }
        let tokenizer = self.context().tokenizer();

        let original_text = self.joined_for_edit();
        let boundaries = Boundaries::new(&self.tokenizer_input(), split_token.len());
        let mut remaining: &str = &original_text;
        // Offset of `remaining` within `original_text`.
        let mut offset = 0;
        let mut perturbed_text = String::with_capacity(original_text.len());
        let mut separators = Vec::with_capacity(boundaries.starts.len());
        let mut next_boundary = 0;
        let mut index_map = self.index_map().clone();
        let mut modified_indices = self.modified_indices().clone();
        let mut newly_modified_indices = ModifiedIndices::new();
        let mut expected_words = Vec::with_capacity(self.num_words());
        // Position of the next emitted word in the new numbering.
        let mut new_i = 0;

        for (i, (input_word, adv_word_seq)) in self.words().iter().zip(new_words).enumerate() {
            let adv_word_seq = adv_word_seq.as_ref();
            let word_start = boundaries
                .find_word(remaining, offset, input_word, next_boundary)
                .ok_or_else(|| PerturbError::WordNotFound {
                    word: input_word.clone(),
                    index: i,
                })?;
            next_boundary = boundaries.copy_gap(
                &remaining[..word_start],
                offset,
                next_boundary,
                &mut perturbed_text,
                &mut separators,
            );
            remaining = &remaining[word_start + input_word.len()..];
            offset += word_start + input_word.len();

            let adv_words = tokenizer.words_from_text(adv_word_seq);
            let adv_num_words = adv_words.len();
            let num_words_diff = adv_num_words as isize - tokenizer.word_count(input_word) as isize;
            if num_words_diff != 0 {
                tracing::trace!(
                    "word {} ({:?}) changes word count by {} at position {}",
                    i,
                    input_word,
                    num_words_diff,
                    new_i
                );
                modified_indices.shift_for_edit(new_i, num_words_diff);
                index_map.shift_for_edit(new_i, num_words_diff, adv_num_words == 0);
            }

            if input_word != adv_word_seq {
                for slot in new_i..new_i + adv_num_words {
                    modified_indices.insert(slot);
                    newly_modified_indices.insert(slot);
                }
            }
            new_i += adv_num_words;

            if adv_num_words == 0 {
                // Avoid leaving two spaces where the word was. When every
                // earlier word of the batch was deleted as well, nothing has
                // been emitted yet and the text must not start with a space.
                if i == 0 || perturbed_text.is_empty() {
                    if remaining.starts_with(' ') {
                        remaining = &remaining[1..];
                        offset += 1;
                    }
                } else if perturbed_text.ends_with(' ') {
                    perturbed_text.pop();
                }
            }
            perturbed_text.push_str(adv_word_seq);
            expected_words.extend(adv_words);
        }
        next_boundary = boundaries.copy_gap(
            remaining,
            offset,
            next_boundary,
            &mut perturbed_text,
            &mut separators,
        );
        expected_words.extend(self.words()[new_words.len()..].iter().cloned());

        if next_boundary != boundaries.starts.len() {
            return Err(PerturbError::invalid_input(
                "an edited word overlaps a segment boundary",
            ));
        }
        let mut pieces = Vec::with_capacity(separators.len() + 1);
        let mut piece_start = 0;
        for &separator in &separators {
            pieces.push(&perturbed_text[piece_start..separator]);
            piece_start = separator + split_token.len();
        }
        pieces.push(&perturbed_text[piece_start..]);
        let segments = self
            .segment_names()
            .zip(pieces)
            .map(|(name, text)| (name.to_string(), text.to_string()))
            .collect();

        let snapshot = TextSnapshot::derived(
            segments,
            Arc::clone(self.context()),
            Derivation {
                index_map,
                modified_indices,
                newly_modified_indices,
                previous: self.clone(),
            },
        )?;

        if snapshot.words() != expected_words.as_slice() {
            tracing::debug!(
                "rejecting rewrite of {:?}: rebuilt text {:?} does not tokenize as expected",
                self.text(),
                snapshot.text()
            );
            return Err(PerturbError::TokenizationDrift {
                expected: expected_words,
                found: snapshot.words().to_vec(),
            });
        }

        tracing::debug!(
            "rewrote generation {} into {:?} ({} newly modified)",
            self.generation(),
            snapshot.text(),
            snapshot.newly_modified_indices().len()
        );
        Ok(snapshot)
    }
}

/// Where the segment separators sit in the joined text of a snapshot.
struct Boundaries {
    /// Start offset of each separator, ascending.
    starts: Vec<usize>,
    separator_len: usize,
}

impl Boundaries {
    fn new(segments: &[&str], separator_len: usize) -> Self {
        let mut starts = Vec::with_capacity(segments.len().saturating_sub(1));
        let mut position = 0;
        for (i, segment) in segments.iter().enumerate() {
            position += segment.len();
            if i + 1 < segments.len() {
                starts.push(position);
                position += separator_len;
            }
        }
        Boundaries {
            starts,
            separator_len,
        }
    }

    /// First occurrence of `word` in `remaining` that does not overlap a
    /// separator. `offset` is where `remaining` starts in the joined text.
    fn find_word(
        &self,
        remaining: &str,
        offset: usize,
        word: &str,
        next_boundary: usize,
    ) -> Option<usize> {
        let mut from = 0;
        loop {
            let found = from + remaining.get(from..)?.find(word)?;
            let (start, end) = (offset + found, offset + found + word.len());
            let overlapping = self.starts[next_boundary..]
                .iter()
                .take_while(|&&separator| separator < end)
                .find(|&&separator| separator + self.separator_len > start);
            match overlapping {
                Some(&separator) => from = separator + self.separator_len - offset,
                None => return Some(found),
            }
        }
    }

    /// Append `gap`, found at `gap_start` in the joined text, to `out` and
    /// record where each separator inside it lands in `out`. Returns the
    /// index of the first separator not yet placed.
    fn copy_gap(
        &self,
        gap: &str,
        gap_start: usize,
        mut next_boundary: usize,
        out: &mut String,
        separators: &mut Vec<usize>,
    ) -> usize {
        let gap_end = gap_start + gap.len();
        while let Some(&separator) = self.starts.get(next_boundary) {
            if separator < gap_start || separator + self.separator_len > gap_end {
                break;
            }
            separators.push(out.len() + separator - gap_start);
            next_boundary += 1;
        }
        out.push_str(gap);
        next_boundary
    }
}
