//! depbuild - configure and build a CMake dependency project
//!
//! ```text
//! depbuild <source_dir> <destination_dir> [<build_type>]
//!   → <destination_dir>/install/{include,lib,bin}
//!   → cmake <source_dir> -DCMAKE_BUILD_TYPE=<build_type>
//!   → cmake --build <destination_dir> --config <build_type>
//! ```

mod build;
mod cli;
mod config;
mod error;
mod exec;
mod utils;

use std::process::ExitCode;

use clap::error::ErrorKind;
use clap::Parser;

use cli::Cli;
use error::DepBuildError;

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if err.kind() == ErrorKind::MissingRequiredArgument => {
            let program = std::env::args_os()
                .next()
                .map(|a| a.to_string_lossy().into_owned())
                .unwrap_or_else(|| "depbuild".to_string());
            let usage = DepBuildError::usage(program);
            println!("{}", usage);
            return ExitCode::from(usage.exit_code());
        }
        Err(err) => err.exit(),
    };

    match cli.execute() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => error::report(&err),
    }
}
