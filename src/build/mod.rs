//! Dependency build orchestration
//!
//! ```text
//! layout (destination + install tree) → cmake configure → cmake build
//! ```
//!
//! Steps run strictly one after the other. A failed configure stops the
//! run unless `keep_going` is set, and the first failing step decides the
//! exit status.
//!
//! ## Modules
//!
//! - `layout` - destination and `install/{include,lib,bin}` preparation
//! - `cmake` - CMake command construction and execution

pub mod cmake;
pub mod layout;

use std::path::PathBuf;

use anyhow::Result;

use crate::error::{DepBuildError, Step};
use crate::exec::subprocess::StepOutcome;
use crate::utils::{terminal, tools};

use cmake::{BuildType, CMakeConfig};
use layout::InstallLayout;

/// Fully resolved options for one run
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Absolute source directory (where CMakeLists.txt is located)
    pub source_dir: PathBuf,
    /// Absolute destination (build) directory
    pub destination_dir: PathBuf,
    /// Build-configuration label
    pub build_type: BuildType,
    /// CMake executable, bare name or path
    pub cmake: PathBuf,
    /// Generator passed at configure time
    pub generator: Option<String>,
    /// Extra -D definitions, in command-line order
    pub defines: Vec<(String, String)>,
    /// Number of parallel jobs for the build step
    pub jobs: Option<usize>,
    /// Run the build step even when configure fails
    pub keep_going: bool,
    /// Print the plan without executing anything
    pub dry_run: bool,
    /// Verbose output
    pub verbose: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::new(),
            destination_dir: PathBuf::new(),
            build_type: BuildType::Debug,
            cmake: PathBuf::from("cmake"),
            generator: None,
            defines: Vec::new(),
            jobs: None,
            keep_going: false,
            dry_run: false,
            verbose: false,
        }
    }
}

/// What a run did
#[derive(Debug)]
pub struct BuildReport {
    /// Directories created (or, in a dry run, that would be created)
    pub created_dirs: Vec<PathBuf>,
    /// Configure step result, `None` in a dry run
    pub configure: Option<StepOutcome>,
    /// Build step result, `None` when skipped or in a dry run
    pub build: Option<StepOutcome>,
}

impl BuildReport {
    /// First failing step, if any
    pub fn first_failure(&self) -> Option<&StepOutcome> {
        [self.configure.as_ref(), self.build.as_ref()]
            .into_iter()
            .flatten()
            .find(|outcome| !outcome.success)
    }

    /// Turn the report into an error when a step failed
    pub fn into_result(self) -> Result<Self> {
        if let Some(failed) = self.first_failure() {
            return Err(DepBuildError::step_failed(failed.step, failed.exit_code).into());
        }
        Ok(self)
    }
}

/// Dependency project builder
pub struct DependencyBuilder {
    options: BuildOptions,
    layout: InstallLayout,
}

impl DependencyBuilder {
    pub fn new(options: BuildOptions) -> Self {
        let layout = InstallLayout::new(&options.destination_dir);
        Self { options, layout }
    }

    fn cmake_config(&self, program: PathBuf) -> CMakeConfig {
        CMakeConfig::new(
            program,
            self.options.source_dir.clone(),
            self.options.destination_dir.clone(),
        )
        .build_type(self.options.build_type.clone())
        .generator(self.options.generator.clone())
        .variables(self.options.defines.clone())
        .jobs(self.options.jobs)
        .verbose(self.options.verbose)
    }

    /// Prepare the destination, then configure and build
    ///
    /// Step failures are recorded in the report, not returned as errors;
    /// use [`BuildReport::into_result`] to turn them into one.
    pub fn run(&self) -> Result<BuildReport> {
        if self.options.dry_run {
            return self.dry_run();
        }

        let created_dirs = self.layout.prepare()?;
        if self.options.verbose {
            for dir in &created_dirs {
                terminal::print_info(&format!("Created {}", dir.display()));
            }
        }

        let tool = tools::require_tool(self.options.cmake.as_os_str(), "configuring and building")?;
        if self.options.verbose {
            match tool.version() {
                Some(version) => terminal::print_info(&format!(
                    "Using CMake {} ({})",
                    version,
                    tool.path.display()
                )),
                None => terminal::print_info(&format!("Using {} ({})", tool.name, tool.path.display())),
            }
        }

        let cmake = self.cmake_config(tool.path);

        let configure = cmake.configure()?;
        if !configure.success && !self.options.keep_going {
            return Ok(BuildReport {
                created_dirs,
                configure: Some(configure),
                build: None,
            });
        }
        if !configure.success {
            terminal::print_warning(&format!(
                "{}; continuing with the build step (--keep-going)",
                DepBuildError::step_failed(Step::Configure, configure.exit_code)
            ));
        }

        let build = cmake.build()?;

        Ok(BuildReport {
            created_dirs,
            configure: Some(configure),
            build: Some(build),
        })
    }

    fn dry_run(&self) -> Result<BuildReport> {
        let created_dirs = self.layout.planned()?;
        for dir in &created_dirs {
            terminal::print_info(&format!("Would create {}", dir.display()));
        }

        let cmake = self.cmake_config(self.options.cmake.clone());
        terminal::print_command(&cmake.configure_command());
        terminal::print_command(&cmake.build_command());

        Ok(BuildReport {
            created_dirs,
            configure: None,
            build: None,
        })
    }
}
