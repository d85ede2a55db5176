use crate::{check_fixture, load_all_fixtures, run_fixture, PerturbFixture};
use std::fs;
use std::path::Path;

/// Load and parse a fixture file from the fixtures directory.
fn load_fixture(name: &str) -> PerturbFixture {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("fixtures")
        .join(name);
    let content = fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", name, e));
    crate::parse_fixture(&content)
        .unwrap_or_else(|e| panic!("Failed to parse fixture {}: {}", name, e))
}

#[test]
fn test_all_fixtures_pass() {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
    let fixtures = load_all_fixtures(&dir).unwrap();
    assert!(!fixtures.is_empty());

    let failures: Vec<String> = fixtures
        .iter()
        .filter_map(|(name, fixture)| match check_fixture(fixture) {
            Ok(_) => None,
            Err(e) => Some(format!("{}: {}", name, e)),
        })
        .collect();
    assert!(failures.is_empty(), "{}", failures.join("\n"));
}

#[test]
fn test_substitution_fixture() {
    let fixture = load_fixture("substitution.toml");
    assert_eq!(fixture.display_title(), "Substituting a single word");
    assert_eq!(fixture.steps.len(), 2);

    let report = run_fixture(&fixture).unwrap();
    assert_eq!(report.final_text, "The slow fox leaps.");
}

#[test]
fn test_deletion_fixture() {
    let report = run_fixture(&load_fixture("deletion.toml")).unwrap();
    assert!(report.passed());
    assert_eq!(report.final_text, "fox.");
}

#[test]
fn test_insertion_fixture_ends_with_expected_error() {
    let fixture = load_fixture("insertion.toml");
    let report = run_fixture(&fixture).unwrap();
    assert_eq!(report.steps.len(), 3);
    assert!(report.passed());
    assert_eq!(report.final_text, "A very slow fox jumps high.");
}

#[test]
fn test_segments_fixture_uses_its_config() {
    let fixture = load_fixture("segments.toml");
    let config = fixture.config.as_ref().unwrap();
    assert_eq!(config.split_token, "||");

    let report = run_fixture(&fixture).unwrap();
    assert!(report.passed());
    assert_eq!(report.final_text, "A man is napping.\nsleeps.");
}
