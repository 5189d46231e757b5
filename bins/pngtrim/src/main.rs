//! pngtrim: trim transparent borders from images.
//!
//! `pngtrim serve` runs the HTTP upload service; `pngtrim trim` applies the
//! same trimming to files on disk.

use clap::{Parser, Subcommand};
use pngtrim_cli::output::Status;
use pngtrim_core::error::exit_codes;
use std::path::PathBuf;
use std::process::ExitCode;

mod commands;

/// Trim fully transparent borders from images
#[derive(Parser)]
#[command(name = "pngtrim")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file (defaults to ./pngtrim.toml when present)
    #[arg(short, long, global = true, env = "PNGTRIM_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP upload service
    #[cfg(feature = "serve")]
    Serve {
        /// Interface to bind, overriding the configuration
        #[arg(long)]
        host: Option<String>,

        /// Port to bind, overriding the configuration
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Trim image files on disk
    Trim {
        /// Files or directories to trim
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Directory for trimmed files (defaults to next to each source)
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Print a JSON report instead of status lines
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    let result = match cli.command {
        #[cfg(feature = "serve")]
        Commands::Serve { host, port } => commands::serve::run(config_path, host, port).await,
        Commands::Trim { paths, out, json } => commands::trim::run(
            config_path,
            &commands::trim::TrimArgs { paths, out, json },
        ),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            Status::error(&format!("{:#}", e));
            ExitCode::from(exit_code_for(&e) as u8)
        }
    }
}

fn exit_code_for(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<pngtrim_core::Error>() {
        Some(e) if e.code.is_config() => exit_codes::CONFIG_ERROR,
        _ => exit_codes::FAILURE,
    }
}
