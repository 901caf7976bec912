//! Aurum CLI - operator tool for persisted storefront carts.
//!
//! Commands:
//! - `aurum show` - Print the stored cart and each line's ring build
//! - `aurum validate` - Check every configured line against the step rules
//! - `aurum clear` - Empty the stored cart
//! - `aurum init-config` - Write a default configuration file

mod commands;
mod context;
mod output;
mod telemetry;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::InitConfigArgs;

/// Aurum CLI - Inspect and maintain persisted storefront carts
#[derive(Parser)]
#[command(name = "aurum")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the stored cart
    Show,

    /// Validate the ring build of every configured line
    Validate,

    /// Empty the stored cart
    Clear,

    /// Write a default configuration file
    InitConfig(InitConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = context::Context::load(config_path, output)?;

    telemetry::init(&ctx.config.logging, cli.verbose)?;

    // Execute command
    let result = match cli.command {
        Commands::Show => commands::show::run(&ctx).await,
        Commands::Validate => commands::validate::run(&ctx).await,
        Commands::Clear => commands::clear::run(&ctx).await,
        Commands::InitConfig(args) => commands::init_config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
