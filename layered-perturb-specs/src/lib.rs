#![doc(
    html_logo_url = "https://raw.githubusercontent.com/storyscript/layered-nlp/main/assets/layered-nlp.svg",
    issue_tracker_base_url = "https://github.com/storyscript/layered-nlp/issues/"
)]

//! Fixture-driven testing infrastructure for layered-perturb.
//!
//! A fixture is a TOML file describing an input text, an optional
//! [`PerturbConfig`](layered_perturb::PerturbConfig), and a sequence of
//! rewrite steps. Each step applies its edits to the snapshot produced by the
//! step before it and checks the result against an `expect` table.
//!
//! ```toml
//! title = "Deleting a word"
//! text = "The quick fox jumps."
//!
//! [[steps]]
//! edits = [{ index = 1, replacement = "" }]
//!
//! [steps.expect]
//! text = "The fox jumps."
//! original_to_current = [0, -1, 1, 2]
//! ```
//!
//! In `original_to_current` and `original_index_map`, `-1` marks a position
//! with no counterpart.
//!
//! ## Modules
//!
//! - [`fixture`] - Fixture, step and expectation types
//! - [`parser`] - Parses fixture TOML
//! - [`loader`] - Loads fixture files from disk
//! - [`runner`] - Runs fixture steps and collects mismatches
//! - [`errors`] - Error types for the harness

pub mod errors;
pub mod fixture;
pub mod loader;
pub mod parser;
pub mod runner;

pub use errors::{SpecError, SpecResult};
pub use fixture::{ExpectedError, Expectation, FixtureStep, PerturbFixture, SegmentSpec};
pub use loader::{load_all_fixtures, load_fixture};
pub use parser::parse_fixture;
pub use runner::{check_fixture, format_failure, run_fixture, FixtureReport, Mismatch, StepReport};

#[cfg(test)]
mod tests;
