//! Bookkeeping between root word positions and current word positions.
//!
//! [`IndexMap`] stores, for every word of the root snapshot, where that word
//! sits in the current snapshot (or `None` once it has been deleted). The
//! reverse view, one entry per current word, is derived on demand.
//! [`ModifiedIndices`] tracks which current positions hold a changed word.
//!
//! Both shift under the same rule when an edit changes the word count at
//! some position: entries below the position stay, entries above move by
//! the change in word count.

use std::collections::BTreeSet;
use std::iter::FromIterator;

use serde::Serialize;

fn offset(index: usize, delta: isize) -> usize {
    if delta >= 0 {
        index + delta as usize
    } else {
        index.saturating_sub(delta.unsigned_abs())
    }
}

/// Root position -> current position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct IndexMap {
    forward: Vec<Option<usize>>,
}

impl IndexMap {
    /// The map of a root snapshot with `len` words: every word maps to itself.
    pub fn identity(len: usize) -> Self {
        Self {
            forward: (0..len).map(Some).collect(),
        }
    }

    pub fn from_positions(forward: Vec<Option<usize>>) -> Self {
        Self { forward }
    }

    /// Number of words in the root snapshot.
    pub fn original_len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Entry `o` is the current position of root word `o`.
    pub fn original_to_current(&self) -> &[Option<usize>] {
        &self.forward
    }

    /// Current position of root word `original`, if it still exists.
    pub fn to_current(&self, original: usize) -> Option<usize> {
        self.forward.get(original).copied().flatten()
    }

    /// Root position of the word currently at `current`, if it has one.
    pub fn to_original(&self, current: usize) -> Option<usize> {
        self.forward.iter().position(|entry| *entry == Some(current))
    }

    /// Entry `i` is the root position of current word `i`; inserted words
    /// have no root position.
    pub fn current_to_original(&self, current_len: usize) -> Vec<Option<usize>> {
        let mut reverse = vec![None; current_len];
        for (original, current) in self.forward.iter().enumerate() {
            if let Some(slot) = (*current).and_then(|c| reverse.get_mut(c)) {
                *slot = Some(original);
            }
        }
        reverse
    }

    /// Root positions whose word has been deleted.
    pub fn deletion_indices(&self) -> Vec<usize> {
        self.forward
            .iter()
            .enumerate()
            .filter(|(_, current)| current.is_none())
            .map(|(original, _)| original)
            .collect()
    }

    /// Account for an edit at current `position` that changed the word count
    /// by `delta`. When the edit deleted the word, the root word that sat at
    /// `position` loses its current position.
    pub fn shift_for_edit(&mut self, position: usize, delta: isize, deleted: bool) {
        for entry in self.forward.iter_mut() {
            match *entry {
                Some(current) if deleted && current == position => *entry = None,
                Some(current) if current > position => *entry = Some(offset(current, delta)),
                _ => {}
            }
        }
    }
}

/// Current positions whose word differs from the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ModifiedIndices(BTreeSet<usize>);

impl ModifiedIndices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, index: usize) -> bool {
        self.0.insert(index)
    }

    pub fn contains(&self, index: usize) -> bool {
        self.0.contains(&index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Indices in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.0.iter().copied()
    }

    pub fn as_set(&self) -> &BTreeSet<usize> {
        &self.0
    }

    /// Account for an edit at `position` changing the word count by `delta`.
    ///
    /// The index at `position` itself is dropped; the rewrite re-adds the
    /// positions of the replacement words it actually changed.
    pub fn shift_for_edit(&mut self, position: usize, delta: isize) {
        self.0 = self
            .0
            .iter()
            .filter(|&&index| index != position)
            .map(|&index| {
                if index > position {
                    offset(index, delta)
                } else {
                    index
                }
            })
            .collect();
    }
}

impl FromIterator<usize> for ModifiedIndices {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
