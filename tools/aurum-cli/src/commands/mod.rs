//! CLI command implementations.

pub mod clear;
pub mod init_config;
pub mod show;
pub mod validate;

use clap::Args;

/// Arguments for the init-config command.
#[derive(Args)]
pub struct InitConfigArgs {
    /// Where to write the file (`.toml` or `.json`).
    #[arg(default_value = "aurum.toml")]
    pub path: String,

    /// Force overwrite existing config.
    #[arg(short, long)]
    pub force: bool,
}
