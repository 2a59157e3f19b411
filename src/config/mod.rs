//! depbuild.toml configuration

mod depbuild_toml;
pub mod validation;

pub use depbuild_toml::DepBuildConfig;
