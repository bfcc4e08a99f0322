//! `bosun env` command
//!
//! Runs the full orchestration pipeline and prints the assembled build
//! environment, as text or JSON.

use anyhow::{anyhow, Result};

use bosun::errors::ToolchainError;
use bosun::util::config::OrchestratorConfig;
use bosun::{
    orchestrate, CompilerId, OrchestrateError, OrchestrationReport, OrchestrationRequest,
    PackageManagerKind, PlatformInfo,
};

use crate::cli::EnvArgs;

pub fn execute(args: EnvArgs) -> Result<()> {
    let config = OrchestratorConfig::load_layered(&args.project_dir);

    let requested_compiler = match &args.compiler {
        Some(name) => Some(CompilerId::parse(name).ok_or_else(|| {
            anyhow!(
                "unknown compiler `{name}` (valid: msvc, msvc-clang, mingw-gcc, \
                 mingw-clang, gcc, clang, emscripten)"
            )
        })?),
        None => None,
    };

    let target = match &args.target {
        Some(spec) => match PlatformInfo::parse_target(spec) {
            Some(target) => Some(target),
            None => {
                return Err(OrchestrateError::from(ToolchainError::UnsupportedTarget {
                    target: spec.clone(),
                })
                .into());
            }
        },
        None => None,
    };

    let package_manager_preferences = args
        .package_manager
        .iter()
        .map(|name| {
            PackageManagerKind::parse(name)
                .ok_or_else(|| anyhow!("unknown package manager `{name}` (valid: conan, vcpkg, cpm)"))
        })
        .collect::<Result<Vec<_>>>()?;

    let request = OrchestrationRequest {
        requested_compiler,
        target,
        standard: args.standard.parse()?,
        package_manager_preferences,
        project_dir: args.project_dir.clone(),
    };

    let report = orchestrate(&request, &config).map_err(anyhow::Error::new)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &OrchestrationReport) {
    let env = &report.environment;

    println!("platform:         {}", env.platform);
    println!(
        "compiler:         {} {} ({})",
        env.compiler.id,
        env.compiler.version,
        env.compiler.executable_path.display()
    );
    println!("terminal:         {}", env.compiler.terminal_strategy);
    println!("package manager:  {}", env.package_manager.kind);

    if let Some(toolchain) = &env.toolchain {
        println!(
            "target:           {} (toolchain file {})",
            toolchain.target_platform,
            toolchain.toolchain_file.display()
        );
        if let Some(sysroot) = &toolchain.sysroot {
            println!("sysroot:          {}", sysroot.display());
        }
    }

    println!("env vars:         {} activated", env.activated_env_vars.len());

    if !report.rejected_compilers.is_empty() {
        println!();
        println!("rejected compilers:");
        for rejection in &report.rejected_compilers {
            match &rejection.location {
                Some(path) => {
                    println!("  {} at {}: {}", rejection.id, path.display(), rejection.reason)
                }
                None => println!("  {}: {}", rejection.id, rejection.reason),
            }
        }
    }

    if !report.rejected_package_managers.is_empty() {
        println!();
        println!("rejected package managers:");
        for (kind, reason) in &report.rejected_package_managers {
            println!("  {kind}: {reason}");
        }
    }
}
