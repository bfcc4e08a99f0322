//! Subprocess environment capture.
//!
//! Activation scripts (vcvarsall.bat, emsdk_env.sh) configure a shell
//! by mutating its environment. We run the script in a throwaway
//! subprocess, dump the resulting environment, and diff it against a
//! baseline snapshot to harvest only the variables the script added or
//! changed. The orchestrator's own process environment is never touched.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::util::process::ProcessBuilder;

/// Snapshot the current process environment.
///
/// Keys are uppercased on Windows, where variable names are
/// case-insensitive, so diffs compare like with like.
pub fn baseline_env() -> BTreeMap<String, String> {
    std::env::vars()
        .map(|(k, v)| (normalize_key(&k), v))
        .collect()
}

/// Run an activation script in a throwaway subprocess and return the
/// full environment it produced.
///
/// The wrapper is chosen by script extension: `.bat`/`.cmd` scripts run
/// under `cmd.exe`, everything else is sourced by `sh`.
pub fn capture_script_env(
    script: &Path,
    args: &[&str],
    timeout: Duration,
) -> Result<BTreeMap<String, String>> {
    if !script.exists() {
        bail!("activation script `{}` does not exist", script.display());
    }

    let ext = script
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let output = if ext == "bat" || ext == "cmd" {
        run_batch_wrapper(script, args, timeout)?
    } else {
        run_shell_wrapper(script, args, timeout)?
    };

    if !output.status.success() {
        bail!(
            "activation script `{}` exited with {:?}: {}",
            script.display(),
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    Ok(parse_env_dump(&String::from_utf8_lossy(&output.stdout)))
}

/// Extract the variables `captured` added or changed relative to
/// `baseline`. Variables named in `always_keep` are included whenever
/// the script defined them, changed or not.
pub fn diff_env(
    baseline: &BTreeMap<String, String>,
    captured: &BTreeMap<String, String>,
    always_keep: &[&str],
) -> BTreeMap<String, String> {
    let mut diff = BTreeMap::new();
    for (key, value) in captured {
        let keep = always_keep.iter().any(|k| normalize_key(k) == *key)
            || baseline.get(key) != Some(value);
        if keep {
            diff.insert(key.clone(), value.clone());
        }
    }
    diff
}

fn normalize_key(key: &str) -> String {
    if cfg!(windows) {
        key.to_uppercase()
    } else {
        key.to_string()
    }
}

/// Windows: a temp batch file avoids cmd.exe quoting issues around
/// `call` arguments.
fn run_batch_wrapper(
    script: &Path,
    args: &[&str],
    timeout: Duration,
) -> Result<std::process::Output> {
    let mut wrapper = tempfile::Builder::new()
        .prefix("bosun_activate")
        .suffix(".bat")
        .tempfile()
        .context("failed to create activation wrapper")?;

    write!(
        wrapper,
        "@echo off\r\ncall \"{}\" {} >nul 2>&1\r\nif errorlevel 1 exit /b 1\r\nset\r\n",
        script.display(),
        args.join(" ")
    )
    .context("failed to write activation wrapper")?;
    wrapper.flush()?;

    ProcessBuilder::new("cmd")
        .arg("/c")
        .arg(wrapper.path())
        .timeout(timeout)
        .exec()
}

// Passing arguments directly to `.` is unspecified POSIX; set the
// positional parameters in the outer shell instead so the sourced
// script inherits them in every /bin/sh.
fn run_shell_wrapper(
    script: &Path,
    args: &[&str],
    timeout: Duration,
) -> Result<std::process::Output> {
    let mut builder = ProcessBuilder::new("sh")
        .arg("-c")
        .arg(r#"script="$1"; shift; . "$script" >/dev/null 2>&1 && env"#)
        .arg("--")
        .arg(script);
    for arg in args {
        builder = builder.arg(arg);
    }
    builder.timeout(timeout).exec()
}

fn parse_env_dump(dump: &str) -> BTreeMap<String, String> {
    let mut env = BTreeMap::new();
    for line in dump.lines() {
        if let Some((key, value)) = line.split_once('=') {
            if key.is_empty() {
                continue;
            }
            env.insert(normalize_key(key), value.to_string());
        }
    }
    env
}
