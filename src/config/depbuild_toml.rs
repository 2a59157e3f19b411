//! depbuild.toml configuration parsing
//!
//! The file is optional. When present it supplies defaults that command-line
//! flags override.
//!
//! ```toml
//! [cmake]
//! program = "cmake3"
//! generator = "Ninja"
//! jobs = 8
//!
//! [build]
//! default_type = "Release"
//! keep_going = false
//!
//! [defines]
//! BUILD_SHARED_LIBS = "OFF"
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Deserialize;

use super::validation::validate_config;
use crate::error::{hints, DepBuildError};

/// File name looked up in the source directory
pub const CONFIG_FILE_NAME: &str = "depbuild.toml";

/// Root configuration from depbuild.toml
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DepBuildConfig {
    /// CMake executable and invocation settings
    #[serde(default)]
    pub cmake: CMakeSection,

    /// Build defaults
    #[serde(default)]
    pub build: BuildSection,

    /// Extra cache definitions passed at configure time (-DNAME=VALUE)
    #[serde(default)]
    pub defines: BTreeMap<String, String>,
}

/// `[cmake]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CMakeSection {
    /// Executable name on PATH or path to it
    pub program: Option<PathBuf>,

    /// Generator (e.g., "Ninja", "Unix Makefiles")
    pub generator: Option<String>,

    /// Parallel jobs for the build step
    pub jobs: Option<usize>,
}

/// `[build]` section
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuildSection {
    /// Build type used when none is given on the command line
    pub default_type: Option<String>,

    /// Run the build step even if configure failed
    #[serde(default)]
    pub keep_going: bool,
}

impl DepBuildConfig {
    /// Load configuration from a specific path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DepBuildError::config_error_with_hint(
                format!("Failed to read {}", path.display()),
                Some(e.into()),
                "Check that the --config path exists and is readable",
            )
        })?;

        let mut config = Self::parse(&content).map_err(|e| match e.downcast::<DepBuildError>() {
            Ok(DepBuildError::Config {
                message,
                source,
                hint,
            }) => DepBuildError::Config {
                message: format!("{}: {}", path.display(), message),
                source,
                hint,
            }
            .into(),
            Ok(other) => other.into(),
            Err(other) => other,
        })?;

        if let Some(dir) = path.parent() {
            config.resolve_paths(dir);
        }
        Ok(config)
    }

    /// Anchor a relative `cmake.program` path to the file's directory
    ///
    /// Bare names such as `cmake3` stay as they are and are searched on PATH.
    fn resolve_paths(&mut self, config_dir: &Path) {
        if let Some(program) = &self.cmake.program {
            if program.is_relative() && program.components().count() > 1 {
                self.cmake.program = Some(config_dir.join(program));
            }
        }
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| {
            DepBuildError::config_error_with_hint(
                format!("Failed to parse {}: {}", CONFIG_FILE_NAME, e.message()),
                None,
                hints::invalid_config(),
            )
        })?;

        validate_config(&config)?;

        Ok(config)
    }

    /// Resolve which configuration applies to a run
    ///
    /// An explicit path must exist. Otherwise `depbuild.toml` in the source
    /// directory is used when present, and built-in defaults when not.
    pub fn discover(explicit: Option<&Path>, source_dir: &Path) -> Result<(Self, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load_from_path(path)?, Some(path.to_path_buf())));
        }

        let candidate = source_dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            let config = Self::load_from_path(&candidate)?;
            return Ok((config, Some(candidate)));
        }

        Ok((Self::default(), None))
    }

    /// Definitions as ordered (name, value) pairs
    pub fn define_pairs(&self) -> Vec<(String, String)> {
        self.defines
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}
