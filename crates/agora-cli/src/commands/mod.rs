//! CLI subcommands

pub mod debate;
pub mod info;
