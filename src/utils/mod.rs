//! Shared helpers: terminal output, tool detection, paths

pub mod paths;
pub mod terminal;
pub mod tools;
