//! Emscripten SDK activation.
//!
//! Sources emsdk_env from the SDK root and harvests the variables it
//! exports (EMSDK, EMSDK_NODE, EMSDK_PYTHON, EM_CONFIG, PATH).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::compiler::{CompilerCandidate, TerminalStrategy};
use crate::errors::EnvironmentActivationError;
use crate::util::config::OrchestratorConfig;

use super::capture::{baseline_env, capture_script_env, diff_env};

const KEEP: [&str; 5] = ["PATH", "EMSDK", "EMSDK_NODE", "EMSDK_PYTHON", "EM_CONFIG"];

/// Activate the Emscripten SDK environment for an emcc candidate.
pub fn activate(
    candidate: &CompilerCandidate,
    config: &OrchestratorConfig,
    timeout: Duration,
) -> Result<BTreeMap<String, String>, EnvironmentActivationError> {
    let strategy = TerminalStrategy::EmsdkEnv;

    let Some(script) = find_emsdk_env(config, &candidate.executable_path) else {
        return Err(EnvironmentActivationError::ScriptNotFound {
            strategy,
            what: "emsdk_env script".to_string(),
            hint: "Set EMSDK or [roots].emsdk to an installed Emscripten SDK".to_string(),
        });
    };

    tracing::debug!("sourcing {}", script.display());
    let captured = capture_script_env(&script, &[], timeout).map_err(|e| {
        EnvironmentActivationError::ScriptFailed {
            strategy,
            script: script.clone(),
            reason: e.to_string(),
        }
    })?;

    let env = diff_env(&baseline_env(), &captured, &KEEP);

    if !env.contains_key("EMSDK") {
        return Err(EnvironmentActivationError::ScriptFailed {
            strategy,
            script,
            reason: "script ran but did not define EMSDK".to_string(),
        });
    }

    Ok(env)
}

/// Locate emsdk_env next to the configured root or above the emcc the
/// detector found (`<emsdk>/upstream/emscripten/emcc`).
pub fn find_emsdk_env(config: &OrchestratorConfig, emcc_path: &Path) -> Option<PathBuf> {
    let name = if cfg!(windows) {
        "emsdk_env.bat"
    } else {
        "emsdk_env.sh"
    };

    if let Some(root) = &config.roots.emsdk {
        let script = root.join(name);
        if script.is_file() {
            return Some(script);
        }
    }

    for ancestor in emcc_path.ancestors() {
        let script = ancestor.join(name);
        if script.is_file() {
            return Some(script);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_find_emsdk_env_above_emcc() {
        let sdk = tempfile::tempdir().unwrap();
        let name = if cfg!(windows) {
            "emsdk_env.bat"
        } else {
            "emsdk_env.sh"
        };
        fs::write(sdk.path().join(name), "").unwrap();
        let emcc_dir = sdk.path().join("upstream").join("emscripten");
        fs::create_dir_all(&emcc_dir).unwrap();

        let found = find_emsdk_env(&OrchestratorConfig::default(), &emcc_dir.join("emcc"));
        assert_eq!(found, Some(sdk.path().join(name)));
    }

    #[test]
    fn test_find_emsdk_env_prefers_configured_root() {
        let sdk = tempfile::tempdir().unwrap();
        let name = if cfg!(windows) {
            "emsdk_env.bat"
        } else {
            "emsdk_env.sh"
        };
        fs::write(sdk.path().join(name), "").unwrap();

        let mut config = OrchestratorConfig::default();
        config.roots.emsdk = Some(sdk.path().to_path_buf());

        let found = find_emsdk_env(&config, Path::new("/nonexistent/emcc"));
        assert_eq!(found, Some(sdk.path().join(name)));
    }
}
