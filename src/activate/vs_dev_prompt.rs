//! Visual Studio developer prompt activation.
//!
//! Locates vcvarsall.bat relative to the selected cl.exe, runs it in a
//! capture subprocess, and harvests the variables it sets (PATH,
//! INCLUDE, LIB, LIBPATH and friends).

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::compiler::{CompilerCandidate, TerminalStrategy};
use crate::core::platform::Arch;
use crate::errors::EnvironmentActivationError;

use super::capture::{baseline_env, capture_script_env, diff_env};

/// Variables the developer prompt is expected to define.
const KEEP: [&str; 4] = ["PATH", "INCLUDE", "LIB", "LIBPATH"];

/// Activate the developer prompt for an MSVC-family candidate.
pub fn activate(
    candidate: &CompilerCandidate,
    target_arch: Arch,
    timeout: Duration,
) -> Result<BTreeMap<String, String>, EnvironmentActivationError> {
    let strategy = TerminalStrategy::VsDevPrompt;

    let Some(vcvarsall) = find_vcvarsall(&candidate.executable_path) else {
        return Err(EnvironmentActivationError::ScriptNotFound {
            strategy,
            what: format!(
                "vcvarsall.bat (searched ancestors of {})",
                candidate.executable_path.display()
            ),
            hint: "Install the `Desktop development with C++` workload in Visual Studio"
                .to_string(),
        });
    };

    let arch_arg = vcvars_arch(host_arch(), target_arch);
    tracing::debug!("running {} {}", vcvarsall.display(), arch_arg);

    let captured = capture_script_env(&vcvarsall, &[arch_arg], timeout).map_err(|e| {
        EnvironmentActivationError::ScriptFailed {
            strategy,
            script: vcvarsall.clone(),
            reason: e.to_string(),
        }
    })?;

    let env = diff_env(&baseline_env(), &captured, &KEEP);

    // vcvarsall reports some failures on stdout and still exits zero;
    // an activation that did not define the toolset variables is a
    // failure, not a partial success.
    if !env.contains_key("INCLUDE") || !env.contains_key("LIB") {
        return Err(EnvironmentActivationError::ScriptFailed {
            strategy,
            script: vcvarsall,
            reason: "script ran but did not define INCLUDE/LIB".to_string(),
        });
    }

    if let Some(path) = env.get("PATH") {
        for (tool, location) in harvest_tools(path, &["cl.exe", "lib.exe", "link.exe"]) {
            tracing::debug!("dev prompt provides {}: {}", tool, location.display());
        }
    }

    Ok(env)
}

/// Locate build tools along a captured PATH value, first hit per tool.
pub fn harvest_tools(path_value: &str, tools: &[&str]) -> Vec<(String, PathBuf)> {
    let sep = if cfg!(windows) { ';' } else { ':' };
    let dirs: Vec<&str> = path_value.split(sep).filter(|d| !d.is_empty()).collect();

    let mut found = Vec::new();
    for tool in tools {
        if let Some(hit) = dirs
            .iter()
            .map(|dir| Path::new(dir).join(tool))
            .find(|p| p.is_file())
        {
            found.push((tool.to_string(), hit));
        }
    }
    found
}

/// Walk up from cl.exe (or clang-cl.exe) to the `VC` directory and look
/// for `Auxiliary/Build/vcvarsall.bat`.
pub fn find_vcvarsall(compiler_path: &Path) -> Option<PathBuf> {
    for ancestor in compiler_path.ancestors() {
        let candidate = ancestor
            .join("Auxiliary")
            .join("Build")
            .join("vcvarsall.bat");
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    None
}

/// vcvarsall argument for a host/target architecture pair.
///
/// Every valid pair is spelled out; a catch-all here would silently
/// activate the wrong hosted toolset for cross pairs.
pub fn vcvars_arch(host: Arch, target: Arch) -> &'static str {
    match (host, target) {
        (Arch::X64, Arch::X64) => "x64",
        (Arch::X64, Arch::X86) => "x64_x86",
        (Arch::X64, Arch::Arm64) => "x64_arm64",
        (Arch::X86, Arch::X86) => "x86",
        (Arch::X86, Arch::X64) => "x86_amd64",
        (Arch::X86, Arch::Arm64) => "x86_arm64",
        (Arch::Arm64, Arch::Arm64) => "arm64",
        (Arch::Arm64, Arch::X64) => "arm64_amd64",
        (Arch::Arm64, Arch::X86) => "arm64_x86",
        // unrecognized arch on either side: the 64-bit default toolset
        (Arch::Unknown, _) | (_, Arch::Unknown) => "x64",
    }
}

fn host_arch() -> Arch {
    match std::env::consts::ARCH {
        "x86" => Arch::X86,
        "aarch64" => Arch::Arm64,
        _ => Arch::X64,
    }
}
