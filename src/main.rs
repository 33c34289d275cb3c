//! outpost - Shadowsocks proxy client CLI
//!
//! A command-line tool for connecting to configured proxy servers through a
//! native tunnel engine.

use clap::{Parser, Subcommand};
use outpost_core::{error::OutpostError, init_logging, LevelFilter};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "outpost")]
#[command(about = "Shadowsocks proxy client with native tunnel management")]
struct Cli {
    /// Configuration file (defaults to ~/.config/outpost/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the supported ciphers
    Ciphers,
    /// List configured servers
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Check whether a server is reachable
    Check {
        /// Server id
        id: String,
    },
    /// Connect to a server and stay connected until interrupted
    Connect {
        /// Server id
        id: String,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    if let Err(e) = init_logging(level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(2);
    }

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Ciphers => cli::servers::run_ciphers(),
        Commands::List { json } => cli::servers::run_list(config, json),
        Commands::Check { id } => cli::servers::run_check(config, &id),
        Commands::Connect { id } => cli::connect::run_connect(config, &id),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            let exit_code = match e {
                // Configuration errors (exit code 2)
                OutpostError::Config(ref config_error) => {
                    eprintln!("[{}]", config_error.message_key());
                    2
                }
                OutpostError::Toml(_) | OutpostError::TomlSerialize(_) => 2,
                // Server errors carry a stable message key for support
                OutpostError::Server(ref server_error) => {
                    eprintln!("[{}]", server_error.message_key());
                    1
                }
                // IO errors (exit code 1 - runtime)
                OutpostError::Io(_) => 1,
            };

            eprintln!("{}", e);
            std::process::exit(exit_code);
        }
    }
}
