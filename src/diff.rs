//! Word-level comparisons between snapshots.

use std::collections::BTreeSet;

use crate::errors::{PerturbError, PerturbResult};
use crate::snapshot::TextSnapshot;

impl TextSnapshot {
    /// Pairs of words at the same position, up to the shorter snapshot.
    fn paired_words<'a>(
        &'a self,
        other: &'a TextSnapshot,
    ) -> impl Iterator<Item = (usize, &'a str, &'a str)> + 'a {
        self.words()
            .iter()
            .zip(other.words())
            .enumerate()
            .map(|(i, (a, b))| (i, a.as_str(), b.as_str()))
    }

    /// The first word of `self` that differs from `other` at the same
    /// position. Trailing words of the longer snapshot are not considered.
    pub fn first_word_diff(&self, other: &TextSnapshot) -> Option<&str> {
        self.first_word_diff_index(other)
            .map(|i| self.words()[i].as_str())
    }

    /// Index of the first differing word within the overlapping prefix.
    pub fn first_word_diff_index(&self, other: &TextSnapshot) -> Option<usize> {
        self.paired_words(other)
            .find(|(_, a, b)| a != b)
            .map(|(i, _, _)| i)
    }

    /// All indices within the overlapping prefix where the words differ.
    pub fn all_words_diff(&self, other: &TextSnapshot) -> BTreeSet<usize> {
        self.paired_words(other)
            .filter(|(_, a, b)| a != b)
            .map(|(i, _, _)| i)
            .collect()
    }

    /// Whether word `i` differs; an index missing from either side counts as
    /// a difference.
    pub fn ith_word_diff(&self, other: &TextSnapshot, i: usize) -> bool {
        match (self.words().get(i), other.words().get(i)) {
            (Some(a), Some(b)) => a != b,
            _ => true,
        }
    }

    /// Current positions of the given root positions.
    ///
    /// Deleted root words map to `None`. A snapshot of an empty text has no
    /// map, in which case the indices are passed through unchanged.
    pub fn convert_from_original_indices(
        &self,
        indices: &[usize],
    ) -> PerturbResult<Vec<Option<usize>>> {
        let map = self.index_map();
        if map.is_empty() {
            return Ok(indices.iter().copied().map(Some).collect());
        }
        indices
            .iter()
            .map(|&original| {
                if original < map.original_len() {
                    Ok(map.to_current(original))
                } else {
                    Err(PerturbError::IndexOutOfRange {
                        index: original,
                        len: map.original_len(),
                    })
                }
            })
            .collect()
    }
}
