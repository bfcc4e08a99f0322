//! Security verification for package-manager inputs.
//!
//! Projects may pin critical backend files (vendored CPM.cmake, lock
//! files) with a SHA-256 digest under `.bosun/<name>.sha256`. A backend
//! whose pinned file no longer matches is demoted, not silently used.
//! Absence of a pin is not a failure: verification gates what is
//! declared, it does not require declarations.

use std::path::Path;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

/// Outcome of checking one file against its optional pin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinStatus {
    /// No pin is declared for this file
    Unpinned,
    /// A pin is declared and the file matches it
    Verified,
    /// A pin is declared and the file does not match it
    Mismatch { expected: String, actual: String },
}

impl PinStatus {
    /// Whether this status passes the verification gate.
    pub fn passes(&self) -> bool {
        !matches!(self, PinStatus::Mismatch { .. })
    }
}

/// Hex SHA-256 digest of a file's contents.
pub fn file_sha256(path: &Path) -> Result<String> {
    let contents = std::fs::read(path)
        .with_context(|| format!("failed to read {} for hashing", path.display()))?;
    let mut hasher = Sha256::new();
    hasher.update(&contents);
    Ok(hex::encode(hasher.finalize()))
}

/// Check `file` against the pin named `name` in the project's `.bosun`
/// directory.
pub fn check_pin(project_dir: &Path, name: &str, file: &Path) -> Result<PinStatus> {
    let pin_path = project_dir.join(".bosun").join(format!("{name}.sha256"));
    if !pin_path.exists() {
        return Ok(PinStatus::Unpinned);
    }

    let pin_contents = std::fs::read_to_string(&pin_path)
        .with_context(|| format!("failed to read pin {}", pin_path.display()))?;
    // sha256sum format: digest, whitespace, optional filename
    let expected = pin_contents
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_lowercase();

    let actual = file_sha256(file)?;
    if actual == expected {
        Ok(PinStatus::Verified)
    } else {
        Ok(PinStatus::Mismatch { expected, actual })
    }
}

/// Whether a string looks like a full SHA-1/SHA-256 style hex digest of
/// the given length.
pub fn is_hex_digest(s: &str, len: usize) -> bool {
    s.len() == len && s.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_file_sha256_known_digest() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("empty");
        fs::write(&file, b"").unwrap();
        assert_eq!(
            file_sha256(&file).unwrap(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_absent_pin_passes() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("CPM.cmake");
        fs::write(&file, "include_guard()").unwrap();

        let status = check_pin(dir.path(), "cpm", &file).unwrap();
        assert_eq!(status, PinStatus::Unpinned);
        assert!(status.passes());
    }

    #[test]
    fn test_matching_pin_verifies() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("CPM.cmake");
        fs::write(&file, "include_guard()").unwrap();

        let digest = file_sha256(&file).unwrap();
        let pin_dir = dir.path().join(".bosun");
        fs::create_dir_all(&pin_dir).unwrap();
        fs::write(pin_dir.join("cpm.sha256"), format!("{digest}  CPM.cmake\n")).unwrap();

        assert_eq!(check_pin(dir.path(), "cpm", &file).unwrap(), PinStatus::Verified);
    }

    #[test]
    fn test_stale_pin_fails_gate() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("CPM.cmake");
        fs::write(&file, "include_guard()").unwrap();

        let pin_dir = dir.path().join(".bosun");
        fs::create_dir_all(&pin_dir).unwrap();
        fs::write(pin_dir.join("cpm.sha256"), format!("{}\n", "0".repeat(64))).unwrap();

        let status = check_pin(dir.path(), "cpm", &file).unwrap();
        assert!(matches!(status, PinStatus::Mismatch { .. }));
        assert!(!status.passes());
    }

    #[test]
    fn test_is_hex_digest() {
        assert!(is_hex_digest(&"a".repeat(40), 40));
        assert!(!is_hex_digest(&"a".repeat(39), 40));
        assert!(!is_hex_digest(&"g".repeat(40), 40));
    }
}
