//! Fixture types.

use layered_perturb::{Edit, ErrorKind, PerturbConfig, TextInput};
use serde::{Deserialize, Serialize};

use crate::{SpecError, SpecResult};

/// A parsed fixture file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PerturbFixture {
    /// Optional title describing the fixture.
    #[serde(default)]
    pub title: Option<String>,
    /// Single-segment input.
    #[serde(default)]
    pub text: Option<String>,
    /// Named segments, in order. Mutually exclusive with `text`.
    #[serde(default)]
    pub segments: Vec<SegmentSpec>,
    /// Context configuration; the default context when absent.
    #[serde(default)]
    pub config: Option<PerturbConfig>,
    /// Rewrite steps, each applied to the previous step's snapshot.
    #[serde(default)]
    pub steps: Vec<FixtureStep>,
}

/// One named input segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmentSpec {
    pub name: String,
    pub text: String,
}

/// A batch of edits and what the resulting snapshot should look like.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureStep {
    #[serde(default)]
    pub edits: Vec<Edit>,
    #[serde(default)]
    pub expect: Expectation,
}

/// Expected properties of a step's result. Absent fields are not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Expectation {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub words: Option<Vec<String>>,
    #[serde(default)]
    pub modified: Option<Vec<usize>>,
    #[serde(default)]
    pub newly_modified: Option<Vec<usize>>,
    /// Current position of every root word, `-1` for deleted.
    #[serde(default)]
    pub original_to_current: Option<Vec<i64>>,
    /// Root position of every current word, `-1` for inserted.
    #[serde(default)]
    pub original_index_map: Option<Vec<i64>>,
    #[serde(default)]
    pub deletion_indices: Option<Vec<usize>>,
    /// The step must fail with an error of this kind.
    #[serde(default)]
    pub error: Option<ExpectedError>,
}

/// Error class a failing step is expected to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpectedError {
    Type,
    Value,
}

impl ExpectedError {
    pub fn matches(self, kind: ErrorKind) -> bool {
        match (self, kind) {
            (ExpectedError::Type, ErrorKind::Type) => true,
            (ExpectedError::Value, ErrorKind::Value) => true,
            _ => false,
        }
    }
}

impl PerturbFixture {
    /// The engine input described by `text` or `segments`.
    pub fn input(&self) -> SpecResult<TextInput> {
        match (&self.text, self.segments.is_empty()) {
            (Some(text), true) => Ok(TextInput::single(text.as_str())),
            (None, false) => Ok(self
                .segments
                .iter()
                .map(|segment| (segment.name.as_str(), segment.text.as_str()))
                .collect()),
            (Some(_), false) => Err(SpecError::Parse {
                line: 0,
                message: "fixture has both `text` and `segments`".to_string(),
            }),
            (None, true) => Err(SpecError::Parse {
                line: 0,
                message: "fixture needs `text` or `segments`".to_string(),
            }),
        }
    }

    /// The fixture title, or a placeholder.
    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(untitled)")
    }
}

/// Encode an optional position the way fixtures write it.
pub fn encode_position(position: Option<usize>) -> i64 {
    position.map_or(-1, |position| position as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture(text: Option<&str>, segments: Vec<SegmentSpec>) -> PerturbFixture {
        PerturbFixture {
            title: None,
            text: text.map(str::to_string),
            segments,
            config: None,
            steps: Vec::new(),
        }
    }

    #[test]
    fn test_single_text_input() {
        let input = fixture(Some("A cat."), Vec::new()).input().unwrap();
        assert_eq!(input, TextInput::single("A cat."));
    }

    #[test]
    fn test_segment_input_keeps_order() {
        let input = fixture(
            None,
            vec![
                SegmentSpec {
                    name: "premise".to_string(),
                    text: "A cat.".to_string(),
                },
                SegmentSpec {
                    name: "hypothesis".to_string(),
                    text: "An animal.".to_string(),
                },
            ],
        )
        .input()
        .unwrap();
        assert_eq!(
            input.segments(),
            &[
                ("premise".to_string(), "A cat.".to_string()),
                ("hypothesis".to_string(), "An animal.".to_string()),
            ]
        );
    }

    #[test]
    fn test_input_requires_exactly_one_source() {
        assert!(fixture(None, Vec::new()).input().is_err());
        let both = fixture(
            Some("A cat."),
            vec![SegmentSpec {
                name: "premise".to_string(),
                text: "A cat.".to_string(),
            }],
        );
        assert!(both.input().is_err());
    }

    #[test]
    fn test_expected_error_matches_kind() {
        assert!(ExpectedError::Value.matches(ErrorKind::Value));
        assert!(!ExpectedError::Type.matches(ErrorKind::Value));
    }

    #[test]
    fn test_encode_position() {
        assert_eq!(encode_position(Some(3)), 3);
        assert_eq!(encode_position(None), -1);
    }
}
