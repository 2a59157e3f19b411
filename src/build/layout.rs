//! Destination directory and `install` tree preparation

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::error::DepBuildError;

/// Name of the install directory inside the destination
pub const INSTALL_DIR: &str = "install";

/// Subdirectories created under a fresh install directory
pub const INSTALL_SUBDIRS: [&str; 3] = ["include", "lib", "bin"];

/// Layout of a destination (build) directory
#[derive(Debug, Clone)]
pub struct InstallLayout {
    root: PathBuf,
}

impl InstallLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<root>/install`
    pub fn install_dir(&self) -> PathBuf {
        self.root.join(INSTALL_DIR)
    }

    /// Directories that `prepare` would create, in creation order
    ///
    /// Fails if the destination exists and is not a directory.
    pub fn planned(&self) -> Result<Vec<PathBuf>> {
        let mut dirs = Vec::new();

        if is_dangling_symlink(&self.root) {
            return Err(DepBuildError::dangling_symlink(&self.root).into());
        }
        if self.root.exists() && !self.root.is_dir() {
            return Err(DepBuildError::layout(&self.root, "path exists and is not a directory").into());
        }
        if !self.root.is_dir() {
            dirs.push(self.root.clone());
        }

        // An existing install entry is left alone, whatever it contains.
        let install = self.install_dir();
        if is_dangling_symlink(&install) {
            return Err(DepBuildError::dangling_symlink(&install).into());
        }
        if !install.exists() {
            dirs.push(install.clone());
            dirs.extend(INSTALL_SUBDIRS.iter().map(|sub| install.join(sub)));
        }

        Ok(dirs)
    }

    /// Create the destination and the install tree where missing
    ///
    /// Returns the directories actually created. Safe to call repeatedly.
    pub fn prepare(&self) -> Result<Vec<PathBuf>> {
        let dirs = self.planned()?;
        for dir in &dirs {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
        }
        Ok(dirs)
    }
}

/// A symlink entry exists but its target does not
fn is_dangling_symlink(path: &Path) -> bool {
    std::fs::symlink_metadata(path)
        .map(|meta| meta.file_type().is_symlink())
        .unwrap_or(false)
        && !path.exists()
}
