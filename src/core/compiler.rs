//! Compiler identities, candidates, and language-standard support.

use std::fmt;
use std::path::PathBuf;

use semver::Version;
use serde::{Deserialize, Serialize};

use super::platform::{OsFamily, PlatformInfo};

/// A compiler toolchain variant.
///
/// This is an open-but-small variant set: each id carries its own locate,
/// validate, and activate logic, dispatched by `match` so exhaustiveness
/// stays compile-checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompilerId {
    /// Microsoft Visual C++ (cl.exe)
    Msvc,
    /// clang-cl shipped with Visual Studio
    MsvcClang,
    /// GCC under an MSYS2/MinGW subsystem
    MingwGcc,
    /// Clang under an MSYS2/MinGW subsystem
    MingwClang,
    /// GCC on Unix-like systems
    Gcc,
    /// Clang/LLVM on Unix-like systems
    Clang,
    /// Emscripten (emcc), wasm cross targets only
    Emscripten,
}

impl CompilerId {
    /// Get the compiler id as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompilerId::Msvc => "msvc",
            CompilerId::MsvcClang => "msvc-clang",
            CompilerId::MingwGcc => "mingw-gcc",
            CompilerId::MingwClang => "mingw-clang",
            CompilerId::Gcc => "gcc",
            CompilerId::Clang => "clang",
            CompilerId::Emscripten => "emscripten",
        }
    }

    /// Parse a compiler id from its string form.
    pub fn parse(s: &str) -> Option<CompilerId> {
        match s {
            "msvc" | "cl" => Some(CompilerId::Msvc),
            "msvc-clang" | "clang-cl" => Some(CompilerId::MsvcClang),
            "mingw-gcc" | "mingw" => Some(CompilerId::MingwGcc),
            "mingw-clang" => Some(CompilerId::MingwClang),
            "gcc" => Some(CompilerId::Gcc),
            "clang" => Some(CompilerId::Clang),
            "emscripten" | "emcc" => Some(CompilerId::Emscripten),
            _ => None,
        }
    }

    /// The compiler ids applicable to a platform, in platform-default
    /// priority order (auto-selection falls back through this order).
    ///
    /// Emscripten is appended for any host when the build targets wasm.
    pub fn applicable(platform: &PlatformInfo, targets_wasm: bool) -> Vec<CompilerId> {
        let mut ids = match platform.os_family {
            OsFamily::Windows => vec![
                CompilerId::Msvc,
                CompilerId::MsvcClang,
                CompilerId::MingwGcc,
                CompilerId::MingwClang,
            ],
            OsFamily::Linux => vec![CompilerId::Gcc, CompilerId::Clang],
            OsFamily::Macos => vec![CompilerId::Clang, CompilerId::Gcc],
            OsFamily::Wasm => vec![CompilerId::Emscripten],
            OsFamily::Unknown => Vec::new(),
        };

        if targets_wasm && !ids.contains(&CompilerId::Emscripten) {
            ids.push(CompilerId::Emscripten);
        }

        ids
    }

    /// The terminal activation strategy for this compiler.
    pub fn terminal_strategy(&self) -> TerminalStrategy {
        match self {
            CompilerId::Msvc | CompilerId::MsvcClang => TerminalStrategy::VsDevPrompt,
            CompilerId::MingwGcc | CompilerId::MingwClang => TerminalStrategy::Msys2,
            CompilerId::Gcc | CompilerId::Clang => TerminalStrategy::NativeShell,
            CompilerId::Emscripten => TerminalStrategy::EmsdkEnv,
        }
    }

    /// Minimum compiler version known to support a C++ standard.
    ///
    /// MSVC versions are cl.exe versions (19.x), not toolset versions.
    pub fn minimum_version(&self, standard: CppStandard) -> Version {
        use CppStandard::*;

        let (major, minor) = match self {
            CompilerId::Gcc | CompilerId::MingwGcc => match standard {
                Cpp11 => (4, 8),
                Cpp14 => (5, 0),
                Cpp17 => (7, 0),
                Cpp20 => (10, 0),
                Cpp23 => (12, 0),
            },
            CompilerId::Clang | CompilerId::MingwClang | CompilerId::MsvcClang => match standard {
                Cpp11 => (3, 3),
                Cpp14 => (3, 4),
                Cpp17 => (5, 0),
                Cpp20 => (11, 0),
                Cpp23 => (15, 0),
            },
            CompilerId::Msvc => match standard {
                Cpp11 | Cpp14 => (19, 0),
                Cpp17 => (19, 14),
                Cpp20 => (19, 29),
                Cpp23 => (19, 35),
            },
            CompilerId::Emscripten => match standard {
                Cpp11 | Cpp14 | Cpp17 => (1, 38),
                Cpp20 => (2, 0),
                Cpp23 => (3, 1),
            },
        };

        Version::new(major, minor, 0)
    }

    /// Whether a given version of this compiler supports a standard.
    pub fn supports(&self, version: &Version, standard: CppStandard) -> bool {
        *version >= self.minimum_version(standard)
    }

    /// Hint on how this compiler is normally installed, for diagnostics.
    pub fn install_hint(&self) -> &'static str {
        match self {
            CompilerId::Msvc => {
                "Install Visual Studio Build Tools with the 'Desktop development with C++' workload"
            }
            CompilerId::MsvcClang => {
                "Install the 'C++ Clang tools for Windows' component in the Visual Studio installer"
            }
            CompilerId::MingwGcc => {
                "Install MSYS2 (https://www.msys2.org) and run `pacman -S mingw-w64-ucrt-x86_64-gcc`"
            }
            CompilerId::MingwClang => {
                "Install MSYS2 (https://www.msys2.org) and run `pacman -S mingw-w64-clang-x86_64-clang`"
            }
            CompilerId::Gcc => "Install gcc from your distribution (e.g. `apt install build-essential`)",
            CompilerId::Clang => "Install clang from your distribution (e.g. `apt install clang`)",
            CompilerId::Emscripten => {
                "Install the Emscripten SDK (https://emscripten.org) and run `emsdk activate latest`"
            }
        }
    }
}

impl fmt::Display for CompilerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How the environment for invoking a compiler is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminalStrategy {
    /// Run vcvarsall.bat in a throwaway subprocess and harvest the diff
    VsDevPrompt,
    /// Select an MSYS2 subsystem and prepend its tool directories
    Msys2,
    /// Pass the current process environment through unmodified
    NativeShell,
    /// Run emsdk_env and harvest the diff
    EmsdkEnv,
}

impl TerminalStrategy {
    /// Get the strategy name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminalStrategy::VsDevPrompt => "vs-dev-prompt",
            TerminalStrategy::Msys2 => "msys2",
            TerminalStrategy::NativeShell => "native-shell",
            TerminalStrategy::EmsdkEnv => "emsdk-env",
        }
    }
}

impl fmt::Display for TerminalStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A detected-but-not-yet-selected compiler installation.
///
/// Multiple candidates may exist for the same id (several GCC versions);
/// each is independently valid or invalid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerCandidate {
    /// Which compiler variant this is
    pub id: CompilerId,
    /// Path to the compiler driver executable
    pub executable_path: PathBuf,
    /// Parsed compiler version
    pub version: Version,
    /// Whether this version supports the required language standard
    pub supports_required_standard: bool,
    /// How to derive the environment for invoking this compiler
    pub terminal_strategy: TerminalStrategy,
}

impl CompilerCandidate {
    /// Create a candidate, deriving the strategy and standard support
    /// from the id and version.
    pub fn new(
        id: CompilerId,
        executable_path: PathBuf,
        version: Version,
        standard: CppStandard,
    ) -> Self {
        let supports_required_standard = id.supports(&version, standard);
        CompilerCandidate {
            id,
            executable_path,
            version,
            supports_required_standard,
            terminal_strategy: id.terminal_strategy(),
        }
    }
}

impl fmt::Display for CompilerCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.id,
            self.version,
            self.executable_path.display()
        )
    }
}

/// C++ standard version required for the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CppStandard {
    /// C++11
    #[serde(rename = "11", alias = "c++11", alias = "cpp11")]
    Cpp11,
    /// C++14
    #[serde(rename = "14", alias = "c++14", alias = "cpp14")]
    Cpp14,
    /// C++17
    #[serde(rename = "17", alias = "c++17", alias = "cpp17")]
    Cpp17,
    /// C++20
    #[serde(rename = "20", alias = "c++20", alias = "cpp20")]
    Cpp20,
    /// C++23
    #[serde(rename = "23", alias = "c++23", alias = "cpp23")]
    Cpp23,
}

impl CppStandard {
    /// Get the standard as a compiler flag value (e.g., "c++17").
    pub fn as_flag_value(&self) -> &'static str {
        match self {
            CppStandard::Cpp11 => "c++11",
            CppStandard::Cpp14 => "c++14",
            CppStandard::Cpp17 => "c++17",
            CppStandard::Cpp20 => "c++20",
            CppStandard::Cpp23 => "c++23",
        }
    }
}

impl std::str::FromStr for CppStandard {
    type Err = CppStandardParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "11" | "c++11" | "cpp11" => Ok(CppStandard::Cpp11),
            "14" | "c++14" | "cpp14" => Ok(CppStandard::Cpp14),
            "17" | "c++17" | "cpp17" => Ok(CppStandard::Cpp17),
            "20" | "c++20" | "cpp20" => Ok(CppStandard::Cpp20),
            "23" | "c++23" | "cpp23" => Ok(CppStandard::Cpp23),
            _ => Err(CppStandardParseError(s.to_string())),
        }
    }
}

/// Error returned when parsing an invalid C++ standard string.
#[derive(Debug, Clone)]
pub struct CppStandardParseError(pub String);

impl fmt::Display for CppStandardParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid C++ standard '{}', valid values: 11, 14, 17, 20, 23",
            self.0
        )
    }
}

impl std::error::Error for CppStandardParseError {}

impl fmt::Display for CppStandard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "C++{}",
            match self {
                CppStandard::Cpp11 => "11",
                CppStandard::Cpp14 => "14",
                CppStandard::Cpp17 => "17",
                CppStandard::Cpp20 => "20",
                CppStandard::Cpp23 => "23",
            }
        )
    }
}
