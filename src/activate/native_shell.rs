//! Native shell activation.
//!
//! Unix toolchains need no activation script. The environment is the
//! current one, with the directory of an explicitly configured compiler
//! prepended to PATH so the override wins lookup.

use std::collections::BTreeMap;

use crate::util::config::OrchestratorConfig;

use super::capture::baseline_env;
use super::prepend_path;

/// Activate the native shell environment. Infallible.
pub fn activate(config: &OrchestratorConfig) -> BTreeMap<String, String> {
    let mut env = baseline_env();

    if let Some(cc) = &config.overrides.cc {
        if let Some(dir) = cc.parent() {
            let existing = env.get("PATH").cloned().unwrap_or_default();
            env.insert(
                "PATH".to_string(),
                prepend_path(&existing, &[dir.to_path_buf()]),
            );
        }
    }

    if !config.overrides.cflags.is_empty() {
        env.insert("CFLAGS".to_string(), config.overrides.cflags.join(" "));
    }

    env
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_without_overrides_is_passthrough() {
        let env = activate(&OrchestratorConfig::default());
        for (key, value) in std::env::vars() {
            let key = if cfg!(windows) { key.to_uppercase() } else { key };
            assert_eq!(env.get(&key), Some(&value));
        }
    }

    #[test]
    fn test_cc_override_prepends_path() {
        let mut config = OrchestratorConfig::default();
        config.overrides.cc = Some(PathBuf::from("/opt/llvm/bin/clang"));

        let env = activate(&config);
        assert!(env.get("PATH").is_some_and(|p| p.starts_with("/opt/llvm/bin")));
    }

    #[test]
    fn test_activation_is_idempotent() {
        let mut config = OrchestratorConfig::default();
        config.overrides.cflags = vec!["-O2".to_string(), "-g".to_string()];

        assert_eq!(activate(&config), activate(&config));
    }
}
