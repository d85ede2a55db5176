//! Fixture parsing.

use crate::{PerturbFixture, SpecError, SpecResult};

/// Parse fixture TOML and check that it describes an input.
pub fn parse_fixture(content: &str) -> SpecResult<PerturbFixture> {
    let fixture: PerturbFixture = toml::from_str(content).map_err(|e| SpecError::Parse {
        line: e
            .span()
            .map_or(0, |span| line_of_offset(content, span.start)),
        message: e.message().to_string(),
    })?;
    fixture.input()?;
    Ok(fixture)
}

/// One-based line containing byte `offset`.
fn line_of_offset(content: &str, offset: usize) -> usize {
    let offset = offset.min(content.len());
    content.as_bytes()[..offset]
        .iter()
        .filter(|&&b| b == b'\n')
        .count()
        + 1
}
