#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Versioned text snapshots for word-level perturbation.
//!
//! A search procedure that rewrites a text word by word needs to know, at
//! every step, which words of the current text correspond to which words of
//! the text it started from. This crate keeps that bookkeeping.
//!
//! ## Core Types
//!
//! - [`TextSnapshot`] - immutable text version with word bookkeeping and lineage
//! - [`Edit`] - a word position and its replacement
//! - [`IndexMap`] / [`ModifiedIndices`] - root/current position tracking
//! - [`Tokenizer`] - the word tokenizer seam
//! - [`PerturbConfig`] / [`SnapshotContext`] - split token and tokenizer choice
//! - [`SnapshotDisplay`] - underlined rendering of modified words
//!
//! ## Example
//!
//! ```
//! use layered_perturb::{Edit, TextSnapshot};
//!
//! let root = TextSnapshot::new("The quick fox jumps.").unwrap();
//! let next = root
//!     .rewrite(&[Edit::replace(1, "very slow"), Edit::delete(2)])
//!     .unwrap();
//!
//! assert_eq!(next.text(), "The very slow jumps.");
//! assert_eq!(next.original_to_current(), &[Some(0), Some(1), None, Some(3)]);
//! assert_eq!(next.original_index_map(), vec![Some(0), Some(1), None, Some(3)]);
//! ```

mod config;
mod diff;
mod display;
mod errors;
mod index_map;
mod rewrite;
mod snapshot;
mod span;
mod tokenizer;

pub use config::{PerturbConfig, SnapshotContext, TokenizerKind, DEFAULT_SPLIT_TOKEN};
pub use display::SnapshotDisplay;
pub use errors::{ErrorKind, PerturbError, PerturbResult};
pub use index_map::{IndexMap, ModifiedIndices};
pub use rewrite::Edit;
pub use snapshot::{Ancestors, Payload, TextInput, TextSnapshot, DEFAULT_SEGMENT};
pub use span::{find_case_insensitive, span_of, window_bounds, WordSpan};
pub use tokenizer::{Tokenizer, UnicodeWordTokenizer, WordTokenizer};

#[cfg(test)]
mod tests;
