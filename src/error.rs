//! Error types and helpers for user-friendly error messages
//!
//! Every failure that ends a run is either a [`DepBuildError`] (with an
//! optional hint and a well-defined exit status) or a plain `anyhow` chain
//! carrying I/O context.

use std::fmt;
use std::path::PathBuf;
use std::process::ExitCode;

use thiserror::Error;

/// Exit status for a usage error (`-1` as an 8-bit status)
pub const USAGE_EXIT_CODE: u8 = 255;

/// Exit status when the build tool cannot be found
pub const MISSING_TOOL_EXIT_CODE: u8 = 127;

/// One of the two external build-tool phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Configure,
    Build,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Configure => write!(f, "configure"),
            Step::Build => write!(f, "build"),
        }
    }
}

/// Custom error types with helpful context and suggestions
#[derive(Error, Debug)]
pub enum DepBuildError {
    /// Not enough positional arguments
    #[error("Usage: {program} <source_dir> <destination_dir> <build_type>")]
    Usage { program: String },

    /// Build tool not found or not executable
    #[error("Missing tool: {tool}")]
    MissingTool {
        tool: String,
        required_for: String,
        hint: String,
    },

    /// An external build-tool step finished unsuccessfully
    #[error("CMake {step} step failed{}", describe_code(.code))]
    StepFailed {
        step: Step,
        code: Option<i32>,
        hint: Option<String>,
    },

    /// Destination tree cannot be prepared
    #[error("Cannot prepare {}: {message}", .path.display())]
    Layout {
        path: PathBuf,
        message: String,
        hint: String,
    },

    /// Configuration file errors
    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
        hint: Option<String>,
    },
}

fn describe_code(code: &Option<i32>) -> String {
    match *code {
        Some(code) => format!(" with exit code {}", code),
        None => " (terminated by signal)".to_string(),
    }
}

impl DepBuildError {
    /// Create a usage error for the given program name
    pub fn usage(program: impl Into<String>) -> Self {
        Self::Usage {
            program: program.into(),
        }
    }

    /// Create a missing tool error
    pub fn missing_tool(
        tool: impl Into<String>,
        required_for: impl Into<String>,
        hint: impl Into<String>,
    ) -> Self {
        Self::MissingTool {
            tool: tool.into(),
            required_for: required_for.into(),
            hint: hint.into(),
        }
    }

    /// Create a step failure error
    pub fn step_failed(step: Step, code: Option<i32>) -> Self {
        let hint = match step {
            Step::Configure => Some(hints::configure_failed().to_string()),
            Step::Build => None,
        };
        Self::StepFailed { step, code, hint }
    }

    /// Create a layout error
    pub fn layout(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Layout {
            path: path.into(),
            message: message.into(),
            hint: hints::destination_not_dir().to_string(),
        }
    }

    /// Create a layout error for a symlink whose target is missing
    pub fn dangling_symlink(path: impl Into<PathBuf>) -> Self {
        Self::Layout {
            path: path.into(),
            message: "symlink points to a missing target".to_string(),
            hint: hints::dangling_symlink().to_string(),
        }
    }

    /// Create a configuration error
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
            source: None,
            hint: None,
        }
    }

    /// Create a configuration error with source and hint
    pub fn config_error_with_hint(
        message: impl Into<String>,
        source: Option<anyhow::Error>,
        hint: impl Into<String>,
    ) -> Self {
        Self::Config {
            message: message.into(),
            source,
            hint: Some(hint.into()),
        }
    }

    /// Process exit status this error should end the run with
    pub fn exit_code(&self) -> u8 {
        match self {
            DepBuildError::Usage { .. } => USAGE_EXIT_CODE,
            DepBuildError::MissingTool { .. } => MISSING_TOOL_EXIT_CODE,
            DepBuildError::StepFailed { code, .. } => exit_code_from_tool(*code),
            DepBuildError::Layout { .. } | DepBuildError::Config { .. } => 1,
        }
    }

    /// Display error with formatting and hints
    pub fn display_with_hints(&self) {
        use console::style;

        eprintln!("\n{} {}", style("ERROR:").red().bold(), self);

        match self {
            DepBuildError::Usage { .. } => {}
            DepBuildError::MissingTool {
                required_for, hint, ..
            } => {
                eprintln!("Required for: {}", required_for);
                eprintln!("\n{} {}", style("HINT:").yellow().bold(), hint);
            }
            DepBuildError::Layout { hint, .. } => {
                eprintln!("\n{} {}", style("HINT:").yellow().bold(), hint);
            }
            DepBuildError::StepFailed { hint, .. } | DepBuildError::Config { hint, .. } => {
                if let Some(h) = hint {
                    eprintln!("\n{} {}", style("HINT:").yellow().bold(), h);
                }
            }
        }

        eprintln!();
    }
}

/// Map a child exit code onto a process exit status
///
/// Codes in `1..=255` pass through; anything else (including a signal
/// termination) becomes 1.
pub fn exit_code_from_tool(code: Option<i32>) -> u8 {
    match code {
        Some(c) if (1..=255).contains(&c) => c as u8,
        _ => 1,
    }
}

/// Convert a run error into the process exit code, printing it on the way
pub fn report(err: &anyhow::Error) -> ExitCode {
    match err.downcast_ref::<DepBuildError>() {
        Some(e) => {
            e.display_with_hints();
            ExitCode::from(e.exit_code())
        }
        None => {
            crate::utils::terminal::print_error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}

/// Common error hints
pub mod hints {
    /// Get hint for missing CMake
    pub fn cmake() -> &'static str {
        "Install CMake from https://cmake.org/ or use your package manager:\n\
         • macOS: brew install cmake\n\
         • Ubuntu: sudo apt install cmake\n\
         • Windows: winget install Kitware.CMake\n\
         \n\
         Or point --cmake / DEPBUILD_CMAKE at an existing cmake executable."
    }

    /// Get hint for a failed configure step
    pub fn configure_failed() -> &'static str {
        "Check the CMake output above, then:\n\
         • Verify the source directory contains a CMakeLists.txt\n\
         • Remove a stale CMakeCache.txt from the destination directory\n\
         • Re-run with --keep-going to attempt the build step anyway"
    }

    /// Get hint for a destination path that is not a directory
    pub fn destination_not_dir() -> &'static str {
        "The destination must be a directory (or not exist yet).\n\
         Choose another destination or remove the conflicting file."
    }

    /// Get hint for a symlink with a missing target
    pub fn dangling_symlink() -> &'static str {
        "Create the link target, or remove the symlink so it can be created\n\
         as a directory."
    }

    /// Get hint for invalid depbuild.toml
    pub fn invalid_config() -> &'static str {
        "depbuild.toml is invalid. Common issues:\n\
         • Invalid TOML syntax (check quotes, brackets, commas)\n\
         • Unknown key (allowed sections: [cmake], [build], [defines])\n\
         • jobs must be at least 1\n\
         • CMAKE_BUILD_TYPE cannot be set in [defines]; set [build] default_type\n\
           or pass the build type as the third positional argument"
    }
}
