//! Configuration file support for the orchestrator.
//!
//! Two locations are honored:
//! - Global: `~/.bosun/orchestrator.toml` - user-wide defaults
//! - Project: `.bosun/orchestrator.toml` - project-specific overrides
//!
//! Project config takes precedence over global config, and environment
//! variables take precedence over both: an override set through the
//! environment skips detection for that role entirely, the override is
//! validated instead of searched for.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Orchestrator configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Compiler override settings
    pub overrides: OverrideSettings,

    /// Tool installation roots
    pub roots: ToolRoots,

    /// Package manager preferences
    pub package_manager: PackageManagerSettings,
}

/// Explicit compiler overrides.
///
/// An explicit override that fails validation is always fatal; silently
/// substituting a different compiler would violate user intent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OverrideSettings {
    /// Requested compiler id (e.g. "msvc", "clang")
    pub compiler: Option<String>,

    /// Path to the C/C++ compiler driver, bypassing the locator search
    pub cc: Option<PathBuf>,

    /// Additional compiler flags
    pub cflags: Vec<String>,
}

/// Installation roots for external tooling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolRoots {
    /// MSYS2 installation root (e.g. C:\msys64)
    pub msys2: Option<PathBuf>,

    /// Emscripten SDK root
    pub emsdk: Option<PathBuf>,

    /// vcpkg root
    pub vcpkg: Option<PathBuf>,

    /// Cross-compilation sysroot
    pub sysroot: Option<PathBuf>,
}

/// Package manager preferences.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PackageManagerSettings {
    /// Backend preference order, overriding the default conan > vcpkg > cpm
    pub preference: Vec<String>,
}

impl OrchestratorConfig {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config: {}", path.display()))
    }

    /// Load with fallback to defaults if the file doesn't exist or is broken.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("failed to load config from {}: {}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Load global config, layer project config over it, then apply
    /// environment variable overrides.
    pub fn load_layered(project_dir: &Path) -> Self {
        let mut config = match global_config_path() {
            Some(global) => Self::load_or_default(&global),
            None => Self::default(),
        };
        config.merge(Self::load_or_default(&project_config_path(project_dir)));
        config.apply_env_overrides();
        config
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create config directory: {}", parent.display()))?;
        }

        let contents =
            toml::to_string_pretty(self).context("failed to serialize orchestrator config")?;

        std::fs::write(path, contents)
            .with_context(|| format!("failed to write config: {}", path.display()))?;

        Ok(())
    }

    /// Check if any compiler override is configured.
    pub fn has_compiler_override(&self) -> bool {
        self.overrides.compiler.is_some() || self.overrides.cc.is_some()
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: OrchestratorConfig) {
        if other.overrides.compiler.is_some() {
            self.overrides.compiler = other.overrides.compiler;
        }
        if other.overrides.cc.is_some() {
            self.overrides.cc = other.overrides.cc;
        }
        if !other.overrides.cflags.is_empty() {
            self.overrides.cflags = other.overrides.cflags;
        }
        if other.roots.msys2.is_some() {
            self.roots.msys2 = other.roots.msys2;
        }
        if other.roots.emsdk.is_some() {
            self.roots.emsdk = other.roots.emsdk;
        }
        if other.roots.vcpkg.is_some() {
            self.roots.vcpkg = other.roots.vcpkg;
        }
        if other.roots.sysroot.is_some() {
            self.roots.sysroot = other.roots.sysroot;
        }
        if !other.package_manager.preference.is_empty() {
            self.package_manager.preference = other.package_manager.preference;
        }
    }

    /// Apply environment variable overrides (highest precedence).
    pub fn apply_env_overrides(&mut self) {
        if let Ok(cc) = std::env::var("BOSUN_CC") {
            self.overrides.cc = Some(PathBuf::from(cc));
        }
        if let Ok(compiler) = std::env::var("BOSUN_COMPILER") {
            self.overrides.compiler = Some(compiler);
        }
        if let Ok(cflags) = std::env::var("BOSUN_CFLAGS") {
            self.overrides.cflags = cflags.split_whitespace().map(String::from).collect();
        }
        if let Some(root) = std::env::var_os("MSYS2_ROOT") {
            self.roots.msys2 = Some(PathBuf::from(root));
        }
        if let Some(root) = std::env::var_os("EMSDK") {
            self.roots.emsdk = Some(PathBuf::from(root));
        }
        if let Some(root) = std::env::var_os("VCPKG_ROOT") {
            self.roots.vcpkg = Some(PathBuf::from(root));
        }
        if let Some(sysroot) = std::env::var_os("BOSUN_SYSROOT") {
            self.roots.sysroot = Some(PathBuf::from(sysroot));
        }
    }
}

/// Path to the project-local config file.
pub fn project_config_path(project_dir: &Path) -> PathBuf {
    project_dir.join(".bosun").join("orchestrator.toml")
}

/// Path to the global config file, if a home directory exists.
pub fn global_config_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(".bosun").join("orchestrator.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_has_no_overrides() {
        let config = OrchestratorConfig::default();
        assert!(!config.has_compiler_override());
    }

    #[test]
    fn test_merge_project_over_global() {
        let mut global = OrchestratorConfig::default();
        global.overrides.compiler = Some("gcc".to_string());
        global.roots.msys2 = Some(PathBuf::from("C:/msys64"));

        let mut project = OrchestratorConfig::default();
        project.overrides.compiler = Some("clang".to_string());

        global.merge(project);
        assert_eq!(global.overrides.compiler.as_deref(), Some("clang"));
        // untouched fields survive the merge
        assert_eq!(global.roots.msys2, Some(PathBuf::from("C:/msys64")));
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".bosun").join("orchestrator.toml");

        let mut config = OrchestratorConfig::default();
        config.overrides.compiler = Some("msvc".to_string());
        config.overrides.cflags = vec!["-O2".to_string()];
        config.save(&path).unwrap();

        let loaded = OrchestratorConfig::load(&path).unwrap();
        assert_eq!(loaded.overrides.compiler.as_deref(), Some("msvc"));
        assert_eq!(loaded.overrides.cflags, vec!["-O2".to_string()]);
    }

    #[test]
    fn test_load_or_default_on_missing_file() {
        let config = OrchestratorConfig::load_or_default(Path::new("/nonexistent/x.toml"));
        assert!(config.overrides.cc.is_none());
    }
}
