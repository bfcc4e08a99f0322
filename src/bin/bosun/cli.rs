//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Bosun - build environment orchestration for C/C++
#[derive(Parser)]
#[command(name = "bosun")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Assemble the build environment for this host and project
    Env(EnvArgs),

    /// Check the health of the build tooling on this host
    Doctor(DoctorArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Args)]
pub struct EnvArgs {
    /// Compiler to use (msvc, msvc-clang, mingw-gcc, mingw-clang, gcc,
    /// clang, emscripten); detection picks the platform default otherwise
    #[arg(long)]
    pub compiler: Option<String>,

    /// Cross-compilation target (linux-arm64, windows-arm64, wasm)
    #[arg(long)]
    pub target: Option<String>,

    /// Required C++ standard
    #[arg(long = "std", default_value = "17")]
    pub standard: String,

    /// Package manager preference order (conan, vcpkg, cpm); repeatable
    #[arg(long = "pm")]
    pub package_manager: Vec<String>,

    /// Emit the report as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Project directory (defaults to the current directory)
    #[arg(long, default_value = ".")]
    pub project_dir: PathBuf,
}

#[derive(Args)]
pub struct DoctorArgs {
    /// Project directory (defaults to the current directory)
    #[arg(long, default_value = ".")]
    pub project_dir: PathBuf,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
