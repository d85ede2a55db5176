use std::fmt::{self, Write};

use unicode_width::UnicodeWidthStr;

use crate::index_map::IndexMap;
use crate::snapshot::TextSnapshot;

/// Renders a snapshot's words with the modified ones underlined.
///
/// ```text
/// The  very  slow  fox  jumps
///      ╰──╯was "quick"
///            ╰──╯inserted
/// ```
pub struct SnapshotDisplay<'a> {
    snapshot: &'a TextSnapshot,
    newly_modified_only: bool,
}

impl<'a> SnapshotDisplay<'a> {
    pub fn new(snapshot: &'a TextSnapshot) -> Self {
        SnapshotDisplay {
            snapshot,
            newly_modified_only: false,
        }
    }

    /// Only underline the words changed by the most recent rewrite.
    pub fn newly_modified_only(mut self) -> Self {
        self.newly_modified_only = true;
        self
    }

    /// Words of the root snapshot, if the lineage still reaches it.
    fn origin_words(&self) -> Option<&'a [String]> {
        let root = self.snapshot.ancestors().last()?;
        let untouched = root.modified_indices().is_empty()
            && *root.index_map() == IndexMap::identity(root.num_words());
        if untouched {
            Some(root.words())
        } else {
            None
        }
    }

    fn label(&self, origin: Option<&[String]>, original: Option<usize>) -> String {
        match (origin, original) {
            (_, None) => "inserted".to_string(),
            (Some(words), Some(idx)) => match words.get(idx) {
                Some(word) => format!("was {:?}", word),
                None => "modified".to_string(),
            },
            (None, Some(_)) => "modified".to_string(),
        }
    }
}

impl<'a> fmt::Display for SnapshotDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SPACE_PADDING: usize = 2;
        let mut word_start_cols = Vec::new();
        let mut word_end_cols = Vec::new();
        let mut opening_line = String::new();
        for (i, word) in self.snapshot.words().iter().enumerate() {
            if i > 0 {
                opening_line.extend(std::iter::repeat(' ').take(SPACE_PADDING));
            }
            word_start_cols.push(UnicodeWidthStr::width(&*opening_line));
            opening_line.push_str(word);
            word_end_cols.push(UnicodeWidthStr::width(&*opening_line));
        }
        f.write_str(&opening_line)?;

        let indices = if self.newly_modified_only {
            self.snapshot.newly_modified_indices()
        } else {
            self.snapshot.modified_indices()
        };
        let origin = self.origin_words();
        let original_index_map = self.snapshot.original_index_map();

        for idx in indices.iter() {
            let (start_col, end_col) = match (word_start_cols.get(idx), word_end_cols.get(idx)) {
                (Some(&start), Some(&end)) => (start, end),
                _ => continue,
            };
            f.write_char('\n')?;
            for _ in 0..start_col {
                f.write_char(' ')?;
            }
            f.write_char('╰')?;
            for _ in (start_col + 1)..end_col.saturating_sub(1) {
                f.write_char('─')?;
            }
            if end_col - start_col > 1 {
                f.write_char('╯')?;
            }
            let original = original_index_map.get(idx).copied().flatten();
            f.write_str(&self.label(origin, original))?;
        }

        Ok(())
    }
}
