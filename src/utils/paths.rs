//! Path utilities

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

/// Resolve `path` against the current working directory
///
/// Absolute paths are returned unchanged. The path is not canonicalized,
/// so it does not need to exist.
pub fn absolutize(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    Ok(absolutize_from(&current_dir, path))
}

/// Resolve `path` against `base`, dropping `.` components
pub fn absolutize_from(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    let mut resolved = base.to_path_buf();
    for component in path.components() {
        match component {
            std::path::Component::CurDir => {}
            other => resolved.push(other.as_os_str()),
        }
    }
    resolved
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn test_absolute_path_unchanged() {
        let base = Path::new("/work");
        assert_eq!(
            absolutize_from(base, Path::new("/opt/src")),
            PathBuf::from("/opt/src")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_relative_path_joined() {
        let base = Path::new("/work");
        assert_eq!(
            absolutize_from(base, Path::new("./deps/../build")),
            PathBuf::from("/work/deps/../build")
        );
        assert_eq!(absolutize_from(base, Path::new(".")), PathBuf::from("/work"));
    }

    #[test]
    fn test_absolutize_uses_current_dir() {
        let resolved = absolutize(Path::new("build")).unwrap();
        assert!(resolved.is_absolute());
        assert!(resolved.ends_with("build"));
    }
}
