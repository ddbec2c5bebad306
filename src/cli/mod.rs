//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "finrag",
    version,
    author = "neur0map",
    about = "Question answering over three financial news articles",
    long_about = "finrag fetches exactly three articles, splits them into overlapping passages, \
                  embeds and indexes them, and answers questions grounded in the most similar \
                  passages. Answers fall back to verbatim excerpts when no generative backend \
                  is available."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/finrag/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Profile to apply on top of the config file
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the HTTP service (/ingest, /query, /status)
    Serve {
        /// Address to bind (overrides server.bind)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Ingest three URLs and answer a single question
    Ask {
        /// Article URL; pass exactly three times
        #[arg(short, long = "url", required = true, num_args = 1)]
        urls: Vec<String>,

        /// Question to ask
        question: String,

        /// Number of passages to retrieve
        #[arg(short = 'k', long)]
        top_k: Option<usize>,

        /// Skip the generative backend and answer extractively
        #[arg(long)]
        offline: bool,

        /// Print the response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Split a text file into passages and print them
    Split {
        /// Text file to split
        file: PathBuf,

        /// Maximum passage length in characters
        #[arg(long)]
        chunk_size: Option<usize>,

        /// Characters shared between consecutive passages
        #[arg(long)]
        overlap: Option<usize>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_ask_collects_urls() {
        let cli = Cli::try_parse_from([
            "finrag",
            "ask",
            "--url",
            "https://a.test",
            "--url",
            "https://b.test",
            "-u",
            "https://c.test",
            "-k",
            "3",
            "What happened?",
        ])
        .unwrap();

        match cli.command {
            Commands::Ask {
                urls,
                question,
                top_k,
                offline,
                ..
            } => {
                assert_eq!(urls.len(), 3);
                assert_eq!(question, "What happened?");
                assert_eq!(top_k, Some(3));
                assert!(!offline);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["finrag", "config", "show", "--verbose", "-p", "offline"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.profile.as_deref(), Some("offline"));
    }
}
