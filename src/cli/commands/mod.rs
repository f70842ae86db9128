//! CLI commands implementation.
//!
//! This module contains the CLI parser and dispatches to command-specific modules.

mod scan;
mod serve;
mod sheet;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::load_settings;

#[derive(Parser)]
#[command(name = "cardscan")]
#[command(about = "Extract contacts from business card photos into a Google Sheet")]
#[command(version)]
pub struct Cli {
    /// Config file path (defaults to ./cardscan.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Check if verbose mode is enabled (for early logging setup).
pub fn is_verbose() -> bool {
    std::env::args().any(|arg| arg == "-v" || arg == "--verbose")
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web server
    Serve {
        /// Address to bind: "PORT", "HOST" or "HOST:PORT" (default from config)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Scan local card images and print the extracted contacts as JSON
    Scan {
        /// Image files to process, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Manage the contacts sheet
    Sheet {
        #[command(subcommand)]
        command: SheetCommands,
    },
}

#[derive(Subcommand)]
enum SheetCommands {
    /// Write the header row if the sheet has none
    Init,

    /// List stored contacts
    List {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

/// Run the CLI.
pub async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref()).await?;

    match cli.command {
        Commands::Serve { bind } => serve::cmd_serve(&settings, bind.as_deref()).await,
        Commands::Scan { files } => scan::cmd_scan(&settings, &files).await,
        Commands::Sheet { command } => match command {
            SheetCommands::Init => sheet::cmd_sheet_init(&settings).await,
            SheetCommands::List { json } => sheet::cmd_sheet_list(&settings, json).await,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scan_files() {
        let cli = Cli::try_parse_from(["cardscan", "-v", "scan", "a.jpg", "b.png"]).unwrap();
        assert!(cli.verbose);
        match cli.command {
            Commands::Scan { files } => {
                assert_eq!(files, vec![PathBuf::from("a.jpg"), PathBuf::from("b.png")])
            }
            _ => panic!("expected scan"),
        }
    }

    #[test]
    fn test_scan_requires_files() {
        assert!(Cli::try_parse_from(["cardscan", "scan"]).is_err());
    }

    #[test]
    fn test_parse_sheet_list_with_global_config() {
        let cli =
            Cli::try_parse_from(["cardscan", "sheet", "list", "--json", "--config", "x.toml"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        assert!(matches!(
            cli.command,
            Commands::Sheet {
                command: SheetCommands::List { json: true }
            }
        ));
    }
}
