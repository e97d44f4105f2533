//! Safety checks for the JSON output path.
//!
//! The report is written next to the library database, so a mistyped
//! argument must never overwrite the database itself.

use anyhow::{bail, Result};
use std::path::Path;

/// Validates that an output path is safe to overwrite.
///
/// Checks:
/// - Output filename must end in `.json`
/// - Output cannot be the source database
pub fn validate_output_path(output: &Path, source: &Path) -> Result<()> {
    let is_json = output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if !is_json {
        bail!(
            "Safety check failed: output file '{}' must have a .json extension",
            output.display()
        );
    }

    let same_file = match (output.canonicalize(), source.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => output == source,
    };
    if same_file {
        bail!(
            "Safety check failed: output '{}' cannot be the same as source '{}'",
            output.display(),
            source.display()
        );
    }

    Ok(())
}
