//! Tool detection with actionable errors
//!
//! The build tool is looked up once, before any subprocess runs, so that a
//! missing executable is reported with an install hint instead of a bare
//! spawn error.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::Result;
use which::which;

use crate::error::{hints, DepBuildError};

/// Tool detection result
#[derive(Debug, Clone)]
pub struct ToolInfo {
    /// Tool name as requested (bare name or path)
    pub name: String,
    /// Path to the tool executable
    pub path: PathBuf,
}

impl ToolInfo {
    /// Tool version string, probed by running `tool --version`
    pub fn version(&self) -> Option<String> {
        get_tool_version(&self.path)
    }
}

/// Check if a tool exists and return its information
///
/// `tool` may be a bare name searched on PATH or a path to an executable.
pub fn check_tool(tool: &OsStr) -> Option<ToolInfo> {
    which(tool).ok().map(|path| ToolInfo {
        name: tool.to_string_lossy().into_owned(),
        path,
    })
}

/// Get tool version from the first line of `tool --version`
fn get_tool_version(path: &Path) -> Option<String> {
    let output = Command::new(path).arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    let line = stdout.lines().next()?.trim();
    if line.is_empty() {
        return None;
    }
    // "cmake version X.Y.Z"
    Some(
        line.strip_prefix("cmake version ")
            .unwrap_or(line)
            .to_string(),
    )
}

/// Require a tool to exist, return error with hint if missing
pub fn require_tool(tool: &OsStr, required_for: &str) -> Result<ToolInfo> {
    match check_tool(tool) {
        Some(info) => Ok(info),
        None => Err(DepBuildError::missing_tool(
            tool.to_string_lossy(),
            required_for,
            get_tool_hint(tool),
        )
        .into()),
    }
}

/// Get installation hint for a tool
fn get_tool_hint(tool: &OsStr) -> &'static str {
    let stem = Path::new(tool)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    if stem.starts_with("cmake") {
        hints::cmake()
    } else {
        "Install this tool and ensure it's in your PATH"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool_is_reported_with_hint() {
        let err = require_tool(OsStr::new("cmake-definitely-not-installed-here"), "configure")
            .unwrap_err();
        let err = err.downcast::<DepBuildError>().unwrap();
        match err {
            DepBuildError::MissingTool { tool, hint, .. } => {
                assert_eq!(tool, "cmake-definitely-not-installed-here");
                assert!(hint.contains("cmake.org"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_generic_hint_for_other_tools() {
        assert_eq!(
            get_tool_hint(OsStr::new("ninja")),
            "Install this tool and ensure it's in your PATH"
        );
        assert_eq!(get_tool_hint(OsStr::new("/opt/bin/cmake3")), hints::cmake());
    }

    #[cfg(unix)]
    #[test]
    fn test_check_tool_on_path() {
        // sh exists on every unix system
        let info = check_tool(OsStr::new("sh")).unwrap();
        assert_eq!(info.name, "sh");
        assert!(info.path.is_absolute());
    }
}
