//! Command-line interface for the holiday API.

use clap::{Parser, Subcommand};

/// Holiday API - easy access to holiday data
#[derive(Parser)]
#[command(name = "holiday-api")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// Write a default config.toml to the working directory
    Init,
}

impl Cli {
    #[must_use]
    pub fn command(&self) -> Commands {
        self.command.unwrap_or(Commands::Serve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serve_is_default() {
        let cli = Cli::try_parse_from(["holiday-api"]).unwrap();
        assert_eq!(cli.command(), Commands::Serve);
    }

    #[test]
    fn test_init_subcommand() {
        let cli = Cli::try_parse_from(["holiday-api", "init"]).unwrap();
        assert_eq!(cli.command(), Commands::Init);
        assert!(Cli::try_parse_from(["holiday-api", "bogus"]).is_err());
    }
}
