//! Emscripten locator.
//!
//! emcc is found through the EMSDK root (configured or from the
//! environment) or directly on PATH.

use std::path::PathBuf;
use std::time::Duration;

use super::cache::ProbeResult;
use super::version::query_version;
use crate::util::config::OrchestratorConfig;
use crate::util::process::find_executable;

/// Locate emcc installations.
pub fn locate(config: &OrchestratorConfig, timeout: Duration) -> ProbeResult {
    let mut paths: Vec<PathBuf> = Vec::new();

    if let Some(root) = &config.roots.emsdk {
        let name = if cfg!(windows) { "emcc.bat" } else { "emcc" };
        let sdk_emcc = root.join("upstream").join("emscripten").join(name);
        if sdk_emcc.is_file() {
            paths.push(sdk_emcc);
        }
    }

    if let Some(path) = find_executable("emcc") {
        if !paths.contains(&path) {
            paths.push(path);
        }
    }

    if paths.is_empty() {
        return ProbeResult::not_found(
            "emcc not found (no EMSDK root configured and not in PATH)",
        );
    }

    let mut result = ProbeResult::default();
    for path in paths {
        match query_version(&path, timeout) {
            Ok((version, _)) => {
                tracing::debug!("located emscripten: {} ({})", path.display(), version);
                result.installs.push((path, version));
            }
            Err(e) => result.failures.push(e.to_string()),
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bogus_emsdk_root_falls_back_to_path() {
        let mut config = OrchestratorConfig::default();
        config.roots.emsdk = Some(PathBuf::from("/nonexistent/emsdk"));
        let result = locate(&config, Duration::from_secs(1));
        // either emcc is on PATH (installs) or the probe records why not
        assert!(result.installs.len() + result.failures.len() >= 1);
    }
}
