//! Environment health checks.
//!
//! `bosun doctor` runs the same probes the orchestrator uses and
//! reports what it found without failing the process, so users can see
//! at a glance why a later `bosun env` might refuse.

use std::fmt::Write as _;
use std::path::Path;

use crate::core::compiler::CppStandard;
use crate::core::platform::{Arch, OsFamily, PlatformInfo};
use crate::detect::{CompilerDetector, DetectionCache};
use crate::resolver::PackageManagerResolver;
use crate::util::config::{global_config_path, project_config_path, OrchestratorConfig};

/// Outcome of one health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pass,
    Warn,
    Fail,
}

impl CheckStatus {
    fn label(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "ok",
            CheckStatus::Warn => "warn",
            CheckStatus::Fail => "fail",
        }
    }
}

/// One named health check with its outcome.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub detail: String,
}

impl CheckResult {
    fn new(name: impl Into<String>, status: CheckStatus, detail: impl Into<String>) -> Self {
        CheckResult {
            name: name.into(),
            status,
            detail: detail.into(),
        }
    }
}

/// The full doctor report.
#[derive(Debug, Clone)]
pub struct DoctorReport {
    pub checks: Vec<CheckResult>,
}

impl DoctorReport {
    /// Run every health check.
    pub fn run(config: &OrchestratorConfig, project_dir: &Path) -> Self {
        let mut checks = Vec::new();

        let host = PlatformInfo::host();
        checks.push(platform_check(&host));
        checks.push(compiler_check(config, &host));
        checks.extend(package_manager_checks(config, project_dir));
        checks.push(config_check(project_dir));

        DoctorReport { checks }
    }

    /// Whether any check failed outright.
    pub fn has_failures(&self) -> bool {
        self.checks.iter().any(|c| c.status == CheckStatus::Fail)
    }

    /// Render the report as aligned text.
    pub fn format(&self) -> String {
        let width = self
            .checks
            .iter()
            .map(|c| c.name.len())
            .max()
            .unwrap_or(0);

        let mut out = String::new();
        for check in &self.checks {
            let _ = writeln!(
                out,
                "[{:>4}] {:<width$}  {}",
                check.status.label(),
                check.name,
                check.detail,
                width = width
            );
        }
        out
    }
}

fn platform_check(host: &PlatformInfo) -> CheckResult {
    if host.os_family == OsFamily::Unknown || host.arch == Arch::Unknown {
        CheckResult::new(
            "platform",
            CheckStatus::Warn,
            format!("{host} (partially unrecognized, detection will be limited)"),
        )
    } else {
        CheckResult::new("platform", CheckStatus::Pass, host.to_string())
    }
}

fn compiler_check(config: &OrchestratorConfig, host: &PlatformInfo) -> CheckResult {
    let cache = DetectionCache::new();
    let detector = CompilerDetector::new(&cache, config);
    let outcome = detector.detect_all(host, CppStandard::Cpp17, false);

    if outcome.candidates.is_empty() {
        let detail = outcome
            .rejections
            .first()
            .map(|r| format!("none found ({}: {})", r.id, r.reason))
            .unwrap_or_else(|| "none found".to_string());
        return CheckResult::new("compilers", CheckStatus::Fail, detail);
    }

    let listed: Vec<String> = outcome
        .candidates
        .iter()
        .map(|c| format!("{} {}", c.id, c.version))
        .collect();
    CheckResult::new(
        "compilers",
        CheckStatus::Pass,
        format!("{} found: {}", listed.len(), listed.join(", ")),
    )
}

fn package_manager_checks(config: &OrchestratorConfig, project_dir: &Path) -> Vec<CheckResult> {
    let resolver = PackageManagerResolver::new(config);
    match resolver.resolve(project_dir, &[]) {
        Ok(outcome) => {
            let mut checks = vec![CheckResult::new(
                "package manager",
                CheckStatus::Pass,
                format!("{} resolved", outcome.selected.kind),
            )];
            for (kind, reason) in outcome.rejected {
                checks.push(CheckResult::new(
                    format!("package manager ({kind})"),
                    CheckStatus::Warn,
                    reason,
                ));
            }
            checks
        }
        Err(e) => vec![CheckResult::new(
            "package manager",
            CheckStatus::Fail,
            e.to_string(),
        )],
    }
}

fn config_check(project_dir: &Path) -> CheckResult {
    let project = project_config_path(project_dir);
    if project.exists() {
        return CheckResult::new(
            "config",
            CheckStatus::Pass,
            format!("project config at {}", project.display()),
        );
    }
    if let Some(global) = global_config_path() {
        if global.exists() {
            return CheckResult::new(
                "config",
                CheckStatus::Pass,
                format!("global config at {}", global.display()),
            );
        }
    }
    CheckResult::new("config", CheckStatus::Pass, "no config file, using defaults")
}
