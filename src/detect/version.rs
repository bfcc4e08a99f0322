//! Compiler version extraction.
//!
//! Compilers disagree on where and how they print their version: gcc and
//! clang answer `--version` on stdout, `cl.exe` prints a banner on
//! stderr when invoked bare. We parse the first dotted version number
//! out of whichever stream has one.

use std::path::Path;
use std::sync::LazyLock;
use std::time::Duration;

use anyhow::{bail, Result};
use regex::Regex;
use semver::Version;

use crate::util::process::ProcessBuilder;

static VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\.(\d+)(?:\.(\d+))?").expect("static regex"));

/// Extract the first dotted version from a version banner.
pub fn parse_version_banner(text: &str) -> Option<Version> {
    let caps = VERSION_RE.captures(text)?;
    let major = caps.get(1)?.as_str().parse().ok()?;
    let minor = caps.get(2)?.as_str().parse().ok()?;
    let patch = caps
        .get(3)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0);
    Some(Version::new(major, minor, patch))
}

/// Run a compiler's version query under a bounded timeout and parse the
/// banner.
///
/// Tries `--version` first; falls back to a bare invocation for drivers
/// like `cl.exe` that only print their banner to stderr.
pub fn query_version(exe: &Path, timeout: Duration) -> Result<(Version, String)> {
    for args in [&["--version"][..], &[][..]] {
        let output = match ProcessBuilder::new(exe).args(args).timeout(timeout).exec() {
            Ok(output) => output,
            Err(e) => bail!("failed to run `{}`: {}", exe.display(), e),
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let text = if stdout.trim().is_empty() {
            stderr
        } else {
            stdout
        };

        if let Some(version) = parse_version_banner(&text) {
            let banner = text.lines().next().unwrap_or("").trim().to_string();
            return Ok((version, banner));
        }
    }

    bail!("`{}` produced no parseable version banner", exe.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_gcc_banner() {
        let banner = "gcc (Ubuntu 13.2.0-4ubuntu3) 13.2.0\nCopyright (C) 2023";
        assert_eq!(
            parse_version_banner(banner),
            Some(Version::new(13, 2, 0))
        );
    }

    #[test]
    fn test_parse_clang_banner() {
        let banner = "Ubuntu clang version 14.0.6\nTarget: x86_64-pc-linux-gnu";
        assert_eq!(
            parse_version_banner(banner),
            Some(Version::new(14, 0, 6))
        );
    }

    #[test]
    fn test_parse_cl_banner() {
        let banner =
            "Microsoft (R) C/C++ Optimizing Compiler Version 19.38.33130 for x64";
        assert_eq!(
            parse_version_banner(banner),
            Some(Version::new(19, 38, 33130))
        );
    }

    #[test]
    fn test_parse_emcc_banner() {
        let banner = "emcc (Emscripten gcc/clang-like replacement + linker) 3.1.50";
        assert_eq!(parse_version_banner(banner), Some(Version::new(3, 1, 50)));
    }

    #[test]
    fn test_two_component_version() {
        assert_eq!(parse_version_banner("foo 4.8"), Some(Version::new(4, 8, 0)));
    }

    #[test]
    fn test_no_version() {
        assert_eq!(parse_version_banner("no digits here"), None);
    }
}
