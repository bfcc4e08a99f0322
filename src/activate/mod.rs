//! Terminal environment activation.
//!
//! Each compiler family works inside a particular terminal environment
//! (VS developer prompt, MSYS2 subsystem, native shell, Emscripten SDK).
//! Activation produces the environment-variable map a build process
//! needs, without mutating the orchestrator's own environment.
//! Activating the same candidate twice yields byte-identical maps.

pub mod capture;
pub mod emsdk;
pub mod msys2;
pub mod native_shell;
pub mod vs_dev_prompt;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::core::compiler::{CompilerCandidate, TerminalStrategy};
use crate::core::platform::Arch;
use crate::errors::EnvironmentActivationError;
use crate::util::config::OrchestratorConfig;

/// Default timeout for activation scripts. vcvarsall is the slow one.
pub const DEFAULT_ACTIVATION_TIMEOUT: Duration = Duration::from_secs(8);

/// Dispatches a candidate to its terminal activation strategy.
pub struct TerminalActivator<'a> {
    config: &'a OrchestratorConfig,
    timeout: Duration,
}

impl<'a> TerminalActivator<'a> {
    pub fn new(config: &'a OrchestratorConfig) -> Self {
        TerminalActivator {
            config,
            timeout: DEFAULT_ACTIVATION_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Produce the activated environment for a candidate.
    pub fn activate(
        &self,
        candidate: &CompilerCandidate,
        target_arch: Arch,
    ) -> Result<BTreeMap<String, String>, EnvironmentActivationError> {
        match candidate.terminal_strategy {
            TerminalStrategy::VsDevPrompt => {
                if !cfg!(windows) {
                    return Err(EnvironmentActivationError::UnsupportedHost {
                        strategy: TerminalStrategy::VsDevPrompt,
                    });
                }
                vs_dev_prompt::activate(candidate, target_arch, self.timeout)
            }
            TerminalStrategy::Msys2 => {
                if !cfg!(windows) {
                    return Err(EnvironmentActivationError::UnsupportedHost {
                        strategy: TerminalStrategy::Msys2,
                    });
                }
                msys2::activate(candidate, target_arch, self.config)
            }
            TerminalStrategy::NativeShell => Ok(native_shell::activate(self.config)),
            TerminalStrategy::EmsdkEnv => emsdk::activate(candidate, self.config, self.timeout),
        }
    }
}

/// Prepend directories to a PATH-style value using the host separator.
pub(crate) fn prepend_path(existing: &str, dirs: &[PathBuf]) -> String {
    let sep = if cfg!(windows) { ';' } else { ':' };
    let mut parts: Vec<String> = dirs.iter().map(|d| d.display().to_string()).collect();
    if !existing.is_empty() {
        parts.push(existing.to_string());
    }
    parts.join(&sep.to_string())
}
