use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "csv-batch-api")]
#[command(about = "Stream CSV files into filtered, batched JSON over HTTP")]
pub struct Cli {
    /// Path to TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve {
        /// Override the configured bind address
        #[arg(long)]
        host: Option<String>,

        /// Override the configured port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Process one CSV file and print the result as JSON
    Process {
        /// CSV file to process
        file: PathBuf,

        /// Override the configured filter window
        #[arg(long)]
        window_days: Option<u32>,

        /// Pretty-print the JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Check whether a date string falls inside the recency window
    TestDate {
        date: String,

        /// Window in days (defaults to the configured filter window, or 7)
        #[arg(long)]
        window_days: Option<u32>,
    },
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve {
            host: None,
            port: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_serve() {
        let cli = Cli::parse_from(["csv-batch-api"]);
        assert!(matches!(cli.command(), Command::Serve { port: None, .. }));
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_process_subcommand() {
        let cli = Cli::parse_from([
            "csv-batch-api",
            "--config",
            "config/building-permits.toml",
            "process",
            "permits.csv",
            "--window-days",
            "365",
        ]);

        match cli.command() {
            Command::Process {
                file, window_days, ..
            } => {
                assert_eq!(file, PathBuf::from("permits.csv"));
                assert_eq!(window_days, Some(365));
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(
            cli.config,
            Some(PathBuf::from("config/building-permits.toml"))
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["csv-batch-api", "serve", "--port", "8080", "-v"]);
        assert!(cli.verbose);
        assert!(matches!(cli.command(), Command::Serve { port: Some(8080), .. }));
    }
}
