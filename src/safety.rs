//! Output path checks so a command never overwrites one of its own inputs.

use anyhow::{bail, Result};
use std::path::Path;

/// Validates that an output path is safe to write.
///
/// Checks:
/// - The output extension must be one of `allowed_extensions` (case-insensitive)
/// - The output cannot be any of the input paths
pub fn validate_output_path(
    output: &Path,
    allowed_extensions: &[&str],
    inputs: &[&Path],
) -> Result<()> {
    let extension = output
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    if !allowed_extensions.iter().any(|allowed| *allowed == extension) {
        bail!(
            "Safety check failed: output '{}' must have one of the extensions: {}",
            output.display(),
            allowed_extensions.join(", ")
        );
    }

    for input in inputs {
        if same_file(output, input) {
            bail!(
                "Safety check failed: output '{}' cannot be the same as input '{}'",
                output.display(),
                input.display()
            );
        }
    }

    Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_valid_output() {
        let output = PathBuf::from("/tmp/merged.msgpack");
        let input = PathBuf::from("/data/library.xml");
        assert!(validate_output_path(&output, &["msgpack", "mpk"], &[&input]).is_ok());
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        let output = PathBuf::from("/tmp/merged.CSV");
        assert!(validate_output_path(&output, &["csv"], &[]).is_ok());
    }

    #[test]
    fn test_wrong_extension() {
        let output = PathBuf::from("/tmp/library.xml");
        let result = validate_output_path(&output, &["msgpack"], &[]);
        assert!(result.unwrap_err().to_string().contains("must have one of the extensions"));
    }

    #[test]
    fn test_output_equals_input() {
        let path = PathBuf::from("/data/library.msgpack");
        let result = validate_output_path(&path, &["msgpack"], &[&path]);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("cannot be the same as input"));
    }

    #[test]
    fn test_same_file_through_relative_path() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("library.msgpack");
        std::fs::write(&input, b"").unwrap();
        let output = dir.path().join(".").join("library.msgpack");
        assert!(validate_output_path(&output, &["msgpack"], &[&input]).is_err());
    }
}
