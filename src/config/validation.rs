//! Configuration validation with helpful error messages

use anyhow::Result;

use super::DepBuildConfig;
use crate::error::{hints, DepBuildError};

/// Cache variable owned by the build-type label
pub const RESERVED_DEFINE: &str = "CMAKE_BUILD_TYPE";

/// Validate the entire depbuild configuration
pub fn validate_config(config: &DepBuildConfig) -> Result<()> {
    if let Some(program) = &config.cmake.program {
        if program.as_os_str().is_empty() {
            return Err(invalid("cmake.program cannot be empty").into());
        }
    }

    if let Some(generator) = &config.cmake.generator {
        validate_generator(generator)?;
    }

    if let Some(jobs) = config.cmake.jobs {
        validate_jobs(jobs)?;
    }

    if let Some(default_type) = &config.build.default_type {
        if default_type.trim().is_empty() {
            return Err(invalid("build.default_type cannot be empty").into());
        }
    }

    for name in config.defines.keys() {
        validate_define_name(name)?;
    }

    Ok(())
}

/// Validate a CMake generator name
pub fn validate_generator(generator: &str) -> Result<()> {
    if generator.trim().is_empty() {
        return Err(invalid("cmake.generator cannot be empty").into());
    }
    Ok(())
}

/// Validate the parallel job count
pub fn validate_jobs(jobs: usize) -> Result<()> {
    if jobs == 0 {
        return Err(invalid("jobs must be at least 1").into());
    }
    Ok(())
}

/// Validate a cache variable name used in a -D definition
pub fn validate_define_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(invalid("Definition name cannot be empty").into());
    }

    if name.contains('=') || name.chars().any(char::is_whitespace) {
        return Err(invalid(format!(
            "Invalid definition name '{}': must not contain '=' or whitespace",
            name
        ))
        .into());
    }

    if name == RESERVED_DEFINE {
        return Err(invalid(format!(
            "{} is set from the build type and cannot be defined directly",
            RESERVED_DEFINE
        ))
        .into());
    }

    Ok(())
}

fn invalid(message: impl Into<String>) -> DepBuildError {
    DepBuildError::config_error_with_hint(message, None, hints::invalid_config())
}
