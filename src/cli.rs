//! CLI argument parsing using clap derive macros

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::build::cmake::BuildType;
use crate::build::{BuildOptions, DependencyBuilder};
use crate::config::{validation, DepBuildConfig};
use crate::error::DepBuildError;
use crate::utils::{paths, terminal};

/// depbuild - configure and build a CMake dependency project
///
/// Creates DESTINATION_DIR and its install/{include,lib,bin} tree, then runs
/// the CMake configure and build steps for SOURCE_DIR inside it.
#[derive(Parser, Debug)]
#[command(name = "depbuild")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Source directory of the dependency project (contains CMakeLists.txt)
    pub source_dir: PathBuf,

    /// Destination directory for the out-of-source build
    pub destination_dir: PathBuf,

    /// Build configuration label (Debug, Release, RelWithDebInfo, MinSizeRel, ...)
    pub build_type: Option<BuildType>,

    /// CMake executable (name on PATH or path)
    #[arg(long, env = "DEPBUILD_CMAKE", value_name = "PATH")]
    pub cmake: Option<PathBuf>,

    /// CMake generator used at configure time
    #[arg(short = 'G', long)]
    pub generator: Option<String>,

    /// Extra cache definition for the configure step (repeatable)
    #[arg(short = 'D', value_name = "NAME=VALUE", value_parser = parse_define)]
    pub defines: Vec<(String, String)>,

    /// Number of parallel build jobs
    #[arg(short, long)]
    pub jobs: Option<usize>,

    /// Configuration file (default: <SOURCE_DIR>/depbuild.toml if present)
    #[arg(long, env = "DEPBUILD_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Run the build step even if the configure step fails
    #[arg(long)]
    pub keep_going: bool,

    /// Print what would be created and run, without doing it
    #[arg(long)]
    pub dry_run: bool,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

/// Parse a `NAME=VALUE` definition
fn parse_define(s: &str) -> Result<(String, String), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid NAME=VALUE: no `=` found in `{}`", s))?;
    validation::validate_define_name(name).map_err(|e| e.to_string())?;
    Ok((name.to_string(), value.to_string()))
}

impl Cli {
    /// Merge arguments with the configuration file into the options for a run
    ///
    /// Command-line values win over file values, which win over defaults.
    pub fn resolve(&self, config: &DepBuildConfig) -> Result<BuildOptions> {
        let build_type = match (&self.build_type, &config.build.default_type) {
            (Some(build_type), _) => build_type.clone(),
            (None, Some(label)) => label
                .parse::<BuildType>()
                .map_err(|e: String| DepBuildError::config_error(format!("build.default_type: {}", e)))?,
            (None, None) => BuildType::default(),
        };

        let jobs = self.jobs.or(config.cmake.jobs);
        if let Some(jobs) = jobs {
            validation::validate_jobs(jobs)?;
        }

        let generator = self.generator.clone().or_else(|| config.cmake.generator.clone());
        if let Some(generator) = &generator {
            validation::validate_generator(generator)?;
        }

        // File definitions first so a repeated name on the command line wins
        let mut defines = config.define_pairs();
        defines.extend(self.defines.iter().cloned());

        Ok(BuildOptions {
            source_dir: paths::absolutize(&self.source_dir)?,
            destination_dir: paths::absolutize(&self.destination_dir)?,
            build_type,
            cmake: self
                .cmake
                .clone()
                .or_else(|| config.cmake.program.clone())
                .unwrap_or_else(|| PathBuf::from("cmake")),
            generator,
            defines,
            jobs,
            keep_going: self.keep_going || config.build.keep_going,
            dry_run: self.dry_run,
            verbose: self.verbose,
        })
    }

    /// Execute the CLI command
    pub fn execute(self) -> Result<()> {
        // Set up terminal colors
        if self.no_color {
            terminal::set_colors(false);
        }

        if self.verbose {
            let argv: Vec<String> = std::env::args_os()
                .map(|a| a.to_string_lossy().into_owned())
                .collect();
            terminal::print_info(&format!("received {}", argv.join(" ")));
        }

        let source_dir = paths::absolutize(&self.source_dir)?;
        let explicit_config = match &self.config {
            Some(path) => Some(paths::absolutize(path)?),
            None => None,
        };
        let (config, config_path) = DepBuildConfig::discover(explicit_config.as_deref(), &source_dir)?;
        if self.verbose {
            if let Some(path) = &config_path {
                terminal::print_info(&format!("Using configuration {}", path.display()));
            }
        }

        let options = self.resolve(&config)?;
        if self.verbose {
            terminal::print_info(&format!(
                "Building {} into {} ({})",
                options.source_dir.display(),
                options.destination_dir.display(),
                options.build_type
            ));
        }

        let dry_run = options.dry_run;
        let summary = format!(
            "Built {} ({})",
            options.destination_dir.display(),
            options.build_type
        );

        let report = DependencyBuilder::new(options).run()?.into_result()?;

        if !dry_run {
            if report.created_dirs.is_empty() {
                terminal::print_success(&summary);
            } else {
                terminal::print_success(&format!("{}, install tree created", summary));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use serial_test::serial;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("depbuild").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_positional_arguments() {
        let cli = parse(&["/src", "/build", "Release"]);
        assert_eq!(cli.source_dir, PathBuf::from("/src"));
        assert_eq!(cli.destination_dir, PathBuf::from("/build"));
        assert_eq!(cli.build_type, Some(BuildType::Release));

        let cli = parse(&["/src", "/build"]);
        assert_eq!(cli.build_type, None);
    }

    #[test]
    fn test_missing_arguments() {
        for args in [vec!["depbuild"], vec!["depbuild", "/src"]] {
            let err = Cli::try_parse_from(args).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
        }
    }

    #[test]
    fn test_empty_build_type_rejected() {
        let err = Cli::try_parse_from(["depbuild", "/src", "/build", ""]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_parse_define() {
        assert_eq!(
            parse_define("BUILD_SHARED_LIBS=OFF").unwrap(),
            ("BUILD_SHARED_LIBS".to_string(), "OFF".to_string())
        );
        assert_eq!(
            parse_define("FLAGS=-O2 -g=3").unwrap(),
            ("FLAGS".to_string(), "-O2 -g=3".to_string())
        );
        assert_eq!(parse_define("EMPTY=").unwrap().1, "");
        assert!(parse_define("NOVALUE").is_err());
        assert!(parse_define("=value").is_err());
        assert!(parse_define("CMAKE_BUILD_TYPE=Release").is_err());
    }

    #[test]
    fn test_resolve_defaults() {
        let cli = parse(&["/src", "/build"]);
        let options = cli.resolve(&DepBuildConfig::default()).unwrap();
        assert_eq!(options.build_type, BuildType::Debug);
        assert_eq!(options.cmake, PathBuf::from("cmake"));
        assert!(options.generator.is_none());
        assert!(options.jobs.is_none());
        assert!(options.defines.is_empty());
        assert!(!options.keep_going);
    }

    #[test]
    fn test_resolve_config_then_cli_precedence() {
        let config = DepBuildConfig::parse(
            r#"
[cmake]
program = "cmake3"
generator = "Ninja"
jobs = 2

[build]
default_type = "MinSizeRel"
keep_going = true

[defines]
BUILD_TESTING = "OFF"
"#,
        )
        .unwrap();

        let options = parse(&["/src", "/build"]).resolve(&config).unwrap();
        assert_eq!(options.build_type, BuildType::MinSizeRel);
        assert_eq!(options.cmake, PathBuf::from("cmake3"));
        assert_eq!(options.generator.as_deref(), Some("Ninja"));
        assert_eq!(options.jobs, Some(2));
        assert!(options.keep_going);

        let options = parse(&[
            "/src",
            "/build",
            "Release",
            "-G",
            "Unix Makefiles",
            "-j",
            "8",
            "-D",
            "BUILD_TESTING=ON",
        ])
        .resolve(&config)
        .unwrap();
        assert_eq!(options.build_type, BuildType::Release);
        assert_eq!(options.generator.as_deref(), Some("Unix Makefiles"));
        assert_eq!(options.jobs, Some(8));
        assert_eq!(
            options.defines,
            vec![
                ("BUILD_TESTING".to_string(), "OFF".to_string()),
                ("BUILD_TESTING".to_string(), "ON".to_string()),
            ]
        );
    }

    #[test]
    fn test_resolve_rejects_zero_jobs() {
        let cli = parse(&["/src", "/build", "-j", "0"]);
        assert!(cli.resolve(&DepBuildConfig::default()).is_err());
    }

    #[test]
    fn test_resolve_relative_paths() {
        let cli = parse(&["deps/src", "deps/build"]);
        let options = cli.resolve(&DepBuildConfig::default()).unwrap();
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(options.source_dir, cwd.join("deps/src"));
        assert_eq!(options.destination_dir, cwd.join("deps/build"));
    }

    #[test]
    #[serial]
    fn test_cmake_from_environment() {
        std::env::set_var("DEPBUILD_CMAKE", "/opt/cmake/bin/cmake");
        let cli = Cli::try_parse_from(["depbuild", "/src", "/build"]);
        std::env::remove_var("DEPBUILD_CMAKE");

        assert_eq!(cli.unwrap().cmake, Some(PathBuf::from("/opt/cmake/bin/cmake")));

        std::env::set_var("DEPBUILD_CMAKE", "/opt/cmake/bin/cmake");
        let cli = Cli::try_parse_from(["depbuild", "/src", "/build", "--cmake", "cmake3"]);
        std::env::remove_var("DEPBUILD_CMAKE");

        assert_eq!(cli.unwrap().cmake, Some(PathBuf::from("cmake3")));
    }
}
