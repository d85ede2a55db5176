//! Fixture runner: applies each step's edits and compares the results.

use std::fmt;

use layered_perturb::{SnapshotContext, SnapshotDisplay, TextSnapshot};

use crate::fixture::{encode_position, Expectation};
use crate::{PerturbFixture, SpecError, SpecResult};

/// One expectation field that did not hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    pub field: &'static str,
    pub expected: String,
    pub found: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, found {}",
            self.field, self.expected, self.found
        )
    }
}

/// Outcome of a single step.
#[derive(Debug, Clone)]
pub struct StepReport {
    /// Zero-based step number.
    pub step: usize,
    pub mismatches: Vec<Mismatch>,
    /// Rendered snapshot, kept only when the step failed.
    pub rendered: Option<String>,
}

impl StepReport {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

/// Outcome of running every step of a fixture.
#[derive(Debug, Clone)]
pub struct FixtureReport {
    pub title: String,
    pub steps: Vec<StepReport>,
    /// Text of the snapshot after the last step.
    pub final_text: String,
}

impl FixtureReport {
    pub fn passed(&self) -> bool {
        self.steps.iter().all(StepReport::passed)
    }

    pub fn failed_steps(&self) -> impl Iterator<Item = &StepReport> {
        self.steps.iter().filter(|step| !step.passed())
    }
}

/// Run a fixture's steps in order, each against the previous step's result.
///
/// A step that expects an error leaves the snapshot unchanged for the next
/// step. An engine error the fixture did not expect aborts the run.
pub fn run_fixture(fixture: &PerturbFixture) -> SpecResult<FixtureReport> {
    let context = match &fixture.config {
        Some(config) => config.build_context()?,
        None => SnapshotContext::shared_default(),
    };
    let mut snapshot = TextSnapshot::with_context(fixture.input()?, context)?;
    let mut steps = Vec::with_capacity(fixture.steps.len());

    for (i, step) in fixture.steps.iter().enumerate() {
        let report = match snapshot.rewrite(&step.edits) {
            Ok(next) => {
                let mut mismatches = check_expectation(&step.expect, &next);
                if let Some(expected) = step.expect.error {
                    mismatches.push(Mismatch {
                        field: "error",
                        expected: format!("{:?} error", expected),
                        found: "success".to_string(),
                    });
                }
                let rendered = if mismatches.is_empty() {
                    None
                } else {
                    Some(SnapshotDisplay::new(&next).to_string())
                };
                snapshot = next;
                StepReport {
                    step: i,
                    mismatches,
                    rendered,
                }
            }
            Err(err) => match step.expect.error {
                Some(expected) => {
                    let mut mismatches = Vec::new();
                    if !expected.matches(err.kind()) {
                        mismatches.push(Mismatch {
                            field: "error",
                            expected: format!("{:?} error", expected),
                            found: err.to_string(),
                        });
                    }
                    StepReport {
                        step: i,
                        mismatches,
                        rendered: None,
                    }
                }
                None => return Err(SpecError::Engine(err)),
            },
        };
        steps.push(report);
    }

    Ok(FixtureReport {
        title: fixture.display_title().to_string(),
        steps,
        final_text: snapshot.text().to_string(),
    })
}

/// Run a fixture and turn any mismatch into [`SpecError::Assertion`].
pub fn check_fixture(fixture: &PerturbFixture) -> SpecResult<FixtureReport> {
    let report = run_fixture(fixture)?;
    if report.passed() {
        Ok(report)
    } else {
        Err(SpecError::Assertion {
            message: format_failure(&report),
        })
    }
}

fn check_expectation(expect: &Expectation, snapshot: &TextSnapshot) -> Vec<Mismatch> {
    let mut mismatches = Vec::new();
    let mut check = |field: &'static str, expected: String, found: String| {
        if expected != found {
            mismatches.push(Mismatch {
                field,
                expected,
                found,
            });
        }
    };

    if let Some(text) = &expect.text {
        check("text", format!("{:?}", text), format!("{:?}", snapshot.text()));
    }
    if let Some(words) = &expect.words {
        check("words", format!("{:?}", words), format!("{:?}", snapshot.words()));
    }
    if let Some(modified) = &expect.modified {
        let found: Vec<usize> = snapshot.modified_indices().iter().collect();
        check("modified", format!("{:?}", modified), format!("{:?}", found));
    }
    if let Some(newly_modified) = &expect.newly_modified {
        let found: Vec<usize> = snapshot.newly_modified_indices().iter().collect();
        check(
            "newly_modified",
            format!("{:?}", newly_modified),
            format!("{:?}", found),
        );
    }
    if let Some(forward) = &expect.original_to_current {
        let found: Vec<i64> = snapshot
            .original_to_current()
            .iter()
            .map(|&position| encode_position(position))
            .collect();
        check(
            "original_to_current",
            format!("{:?}", forward),
            format!("{:?}", found),
        );
    }
    if let Some(reverse) = &expect.original_index_map {
        let found: Vec<i64> = snapshot
            .original_index_map()
            .into_iter()
            .map(encode_position)
            .collect();
        check(
            "original_index_map",
            format!("{:?}", reverse),
            format!("{:?}", found),
        );
    }
    if let Some(deleted) = &expect.deletion_indices {
        check(
            "deletion_indices",
            format!("{:?}", deleted),
            format!("{:?}", snapshot.deletion_indices()),
        );
    }

    mismatches
}

/// Format every failed step of a report.
pub fn format_failure(report: &FixtureReport) -> String {
    let mut output = format!("\nFAIL: {}\n", report.title);
    for step in report.failed_steps() {
        output.push_str(&format!("\n  step {}:\n", step.step));
        for mismatch in &step.mismatches {
            output.push_str(&format!("    {}\n", mismatch));
        }
        if let Some(rendered) = &step.rendered {
            output.push('\n');
            for line in rendered.lines() {
                output.push_str(&format!("    {}\n", line));
            }
        }
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_fixture;

    #[test]
    fn test_passing_fixture() {
        let fixture = parse_fixture(
            r#"
text = "The quick fox jumps."

[[steps]]
edits = [{ index = 1, replacement = "very slow" }]

[steps.expect]
text = "The very slow fox jumps."
modified = [1, 2]
original_to_current = [0, 1, 3, 4]
original_index_map = [0, 1, -1, 2, 3]
"#,
        )
        .unwrap();

        let report = check_fixture(&fixture).unwrap();
        assert_eq!(report.steps.len(), 1);
        assert_eq!(report.final_text, "The very slow fox jumps.");
    }

    #[test]
    fn test_mismatch_is_reported_with_rendering() {
        let fixture = parse_fixture(
            r#"
title = "Wrong expectation"
text = "a cat sat"

[[steps]]
edits = [{ index = 1, replacement = "dog" }]

[steps.expect]
text = "a dog sat"
modified = [2]
"#,
        )
        .unwrap();

        let report = run_fixture(&fixture).unwrap();
        assert!(!report.passed());
        assert_eq!(
            report.steps[0].mismatches,
            vec![Mismatch {
                field: "modified",
                expected: "[2]".to_string(),
                found: "[1]".to_string(),
            }]
        );

        insta::assert_snapshot!(format_failure(&report).trim(), @r###"
        FAIL: Wrong expectation

          step 0:
            modified: expected [2], found [1]

            a  dog  sat
               ╰─╯was "cat"
        "###);
    }

    #[test]
    fn test_expected_error_keeps_snapshot() {
        let fixture = parse_fixture(
            r#"
text = "a cat sat"

[[steps]]
edits = [{ index = 7, replacement = "dog" }]
expect = { error = "value" }

[[steps]]
edits = [{ index = 0, replacement = "one" }]
expect = { text = "one cat sat", modified = [0] }
"#,
        )
        .unwrap();

        let report = check_fixture(&fixture).unwrap();
        assert_eq!(report.final_text, "one cat sat");
    }

    #[test]
    fn test_wrong_error_kind() {
        let fixture = parse_fixture(
            r#"
text = "a cat sat"

[[steps]]
edits = [{ index = 7, replacement = "dog" }]
expect = { error = "type" }
"#,
        )
        .unwrap();

        let report = run_fixture(&fixture).unwrap();
        assert_eq!(report.steps[0].mismatches[0].field, "error");
        assert!(matches!(
            check_fixture(&fixture),
            Err(SpecError::Assertion { .. })
        ));
    }

    #[test]
    fn test_unexpected_engine_error() {
        let fixture = parse_fixture(
            r#"
text = "a cat sat"

[[steps]]
edits = [{ index = 0, replacement = "x" }, { index = 0, replacement = "y" }]
"#,
        )
        .unwrap();

        assert!(matches!(run_fixture(&fixture), Err(SpecError::Engine(_))));
    }

    #[test]
    fn test_invalid_config_is_engine_error() {
        let fixture = parse_fixture(
            r#"
text = "a cat sat"

[config]
split_token = "a b"
"#,
        )
        .unwrap();

        assert!(matches!(run_fixture(&fixture), Err(SpecError::Engine(_))));
    }
}
