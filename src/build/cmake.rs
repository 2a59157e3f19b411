//! CMake configuration and execution
//!
//! This module builds the configure and build command lines and runs them
//! one at a time.

use std::fmt;
use std::path::PathBuf;
use std::process::Command;
use std::str::FromStr;

use anyhow::Result;

use crate::error::Step;
use crate::exec::subprocess::{run_step, StepOutcome};
use crate::utils::terminal;

/// CMake build type
///
/// The four standard labels get their own variants. Any other label is
/// passed through untouched, since projects may define their own.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BuildType {
    #[default]
    Debug,
    Release,
    RelWithDebInfo,
    MinSizeRel,
    Custom(String),
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildType::Debug => write!(f, "Debug"),
            BuildType::Release => write!(f, "Release"),
            BuildType::RelWithDebInfo => write!(f, "RelWithDebInfo"),
            BuildType::MinSizeRel => write!(f, "MinSizeRel"),
            BuildType::Custom(label) => write!(f, "{}", label),
        }
    }
}

impl FromStr for BuildType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" => Err("build type cannot be empty".to_string()),
            "Debug" => Ok(BuildType::Debug),
            "Release" => Ok(BuildType::Release),
            "RelWithDebInfo" => Ok(BuildType::RelWithDebInfo),
            "MinSizeRel" => Ok(BuildType::MinSizeRel),
            other => Ok(BuildType::Custom(other.to_string())),
        }
    }
}

/// CMake configuration builder
#[derive(Debug)]
pub struct CMakeConfig {
    /// CMake executable
    program: PathBuf,
    /// Source directory (where CMakeLists.txt is located)
    source_dir: PathBuf,
    /// Build directory, also the configure step's working directory
    build_dir: PathBuf,
    /// Build type
    build_type: BuildType,
    /// CMake variables (-D options)
    variables: Vec<(String, String)>,
    /// Generator (e.g., "Ninja", "Unix Makefiles")
    generator: Option<String>,
    /// Number of parallel jobs
    jobs: Option<usize>,
    /// Verbose output
    verbose: bool,
}

impl CMakeConfig {
    /// Create a new CMake configuration
    pub fn new(program: PathBuf, source_dir: PathBuf, build_dir: PathBuf) -> Self {
        Self {
            program,
            source_dir,
            build_dir,
            build_type: BuildType::default(),
            variables: Vec::new(),
            generator: None,
            jobs: None,
            verbose: false,
        }
    }

    /// Set the build type
    pub fn build_type(mut self, build_type: BuildType) -> Self {
        self.build_type = build_type;
        self
    }

    /// Set multiple CMake variables
    pub fn variables(mut self, vars: Vec<(String, String)>) -> Self {
        self.variables.extend(vars);
        self
    }

    /// Set the generator
    pub fn generator(mut self, generator: Option<String>) -> Self {
        self.generator = generator;
        self
    }

    /// Set number of parallel jobs
    pub fn jobs(mut self, jobs: Option<usize>) -> Self {
        self.jobs = jobs;
        self
    }

    /// Enable verbose output
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Command for the configure step
    ///
    /// `cmake <source> -DCMAKE_BUILD_TYPE=<type> [-G <gen>] [-D<name>=<value>...]`,
    /// run from the build directory so the tree lands out of source.
    pub fn configure_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.current_dir(&self.build_dir);

        cmd.arg(&self.source_dir);
        cmd.arg(format!("-DCMAKE_BUILD_TYPE={}", self.build_type));

        if let Some(generator) = &self.generator {
            cmd.arg("-G").arg(generator);
        }

        for (name, value) in &self.variables {
            cmd.arg(format!("-D{}={}", name, value));
        }

        cmd
    }

    /// Command for the build step
    ///
    /// `cmake --build <build_dir> --config <type> [-j <n>] [--verbose]`
    pub fn build_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--build").arg(&self.build_dir);
        cmd.arg("--config").arg(self.build_type.to_string());

        if let Some(jobs) = self.jobs {
            cmd.arg("-j").arg(jobs.to_string());
        }

        if self.verbose {
            cmd.arg("--verbose");
        }

        cmd
    }

    /// Run CMake configure step
    pub fn configure(&self) -> Result<StepOutcome> {
        self.run(Step::Configure, self.configure_command())
    }

    /// Run CMake build step
    pub fn build(&self) -> Result<StepOutcome> {
        self.run(Step::Build, self.build_command())
    }

    fn run(&self, step: Step, mut cmd: Command) -> Result<StepOutcome> {
        if self.verbose {
            terminal::print_command(&cmd);
        }
        let outcome = run_step(step, &mut cmd)?;
        if self.verbose {
            terminal::print_info(&format!(
                "CMake {} step finished in {:.1}s",
                step,
                outcome.duration.as_secs_f64()
            ));
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn args(cmd: &Command) -> Vec<String> {
        cmd.get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    fn config() -> CMakeConfig {
        CMakeConfig::new(
            PathBuf::from("cmake"),
            PathBuf::from("/src"),
            PathBuf::from("/build"),
        )
    }

    #[test]
    fn test_build_type_parse_and_display() {
        assert_eq!("Debug".parse::<BuildType>().unwrap(), BuildType::Debug);
        assert_eq!("Release".parse::<BuildType>().unwrap(), BuildType::Release);
        assert_eq!(
            "release".parse::<BuildType>().unwrap(),
            BuildType::Custom("release".to_string())
        );
        assert_eq!("Profile".parse::<BuildType>().unwrap().to_string(), "Profile");
        assert!("".parse::<BuildType>().is_err());
        assert_eq!(BuildType::default().to_string(), "Debug");
    }

    #[test]
    fn test_configure_command_defaults() {
        let cmd = config().configure_command();
        assert_eq!(cmd.get_program(), "cmake");
        assert_eq!(args(&cmd), vec!["/src", "-DCMAKE_BUILD_TYPE=Debug"]);
        assert_eq!(cmd.get_current_dir(), Some(Path::new("/build")));
    }

    #[test]
    fn test_build_command_defaults() {
        let cmd = config().build_command();
        assert_eq!(args(&cmd), vec!["--build", "/build", "--config", "Debug"]);
        assert_eq!(cmd.get_current_dir(), None);
    }

    #[test]
    fn test_build_type_used_in_both_steps() {
        let cmake = config().build_type(BuildType::Release);
        assert_eq!(
            args(&cmake.configure_command()),
            vec!["/src", "-DCMAKE_BUILD_TYPE=Release"]
        );
        assert_eq!(
            args(&cmake.build_command()),
            vec!["--build", "/build", "--config", "Release"]
        );
    }

    #[test]
    fn test_optional_arguments() {
        let cmake = config()
            .build_type(BuildType::MinSizeRel)
            .generator(Some("Ninja".to_string()))
            .variables(vec![("BUILD_SHARED_LIBS".to_string(), "OFF".to_string())])
            .jobs(Some(4))
            .verbose(true);

        assert_eq!(
            args(&cmake.configure_command()),
            vec![
                "/src",
                "-DCMAKE_BUILD_TYPE=MinSizeRel",
                "-G",
                "Ninja",
                "-DBUILD_SHARED_LIBS=OFF",
            ]
        );
        assert_eq!(
            args(&cmake.build_command()),
            vec!["--build", "/build", "--config", "MinSizeRel", "-j", "4", "--verbose"]
        );
    }
}
