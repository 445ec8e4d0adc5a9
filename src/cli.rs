//! Command-line surface: `analyze`, `check` and `create-sample`.
//!
//! `--config` is global; `--api-key` and `--model` override the settings
//! file for the commands that call the LLM.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub const DEFAULT_SAMPLE_PATH: &str = "sample_features.csv";

#[derive(Parser, Debug)]
#[command(
    name = "geo-compliance",
    version,
    about = "Flag product features that need geo-specific compliance logic"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        help = "Settings file (defaults to the platform config dir)"
    )]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Analyze every feature in a CSV file.
    Analyze {
        /// CSV with Title, Description and optional Documents columns.
        input: PathBuf,
        #[arg(short, long, help = "Write results to this CSV file")]
        output: Option<PathBuf>,
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
        #[arg(long, help = "Override the configured model")]
        model: Option<String>,
        #[arg(short, long, help = "Print per-feature detail and debug logs")]
        verbose: bool,
    },
    /// Analyze a single feature given on the command line.
    Check {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "", help = "Document path or inline text")]
        documents: String,
        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
        #[arg(long)]
        model: Option<String>,
        #[arg(short, long)]
        verbose: bool,
    },
    /// Write a sample input CSV.
    CreateSample {
        #[arg(short, long, default_value = DEFAULT_SAMPLE_PATH)]
        output: PathBuf,
    },
}

impl Commands {
    pub fn verbose(&self) -> bool {
        match self {
            Commands::Analyze { verbose, .. } | Commands::Check { verbose, .. } => *verbose,
            Commands::CreateSample { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_analyze() {
        let cli = Cli::try_parse_from([
            "geo-compliance",
            "analyze",
            "features.csv",
            "-o",
            "results.csv",
            "--model",
            "gpt-4o",
            "-v",
        ])
        .unwrap();

        match cli.command {
            Commands::Analyze {
                input,
                output,
                model,
                verbose,
                ..
            } => {
                assert_eq!(input, PathBuf::from("features.csv"));
                assert_eq!(output, Some(PathBuf::from("results.csv")));
                assert_eq!(model.as_deref(), Some("gpt-4o"));
                assert!(verbose);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn create_sample_has_default_path() {
        let cli = Cli::try_parse_from(["geo-compliance", "create-sample"]).unwrap();
        match cli.command {
            Commands::CreateSample { output } => {
                assert_eq!(output, PathBuf::from(DEFAULT_SAMPLE_PATH))
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn check_requires_title_and_description() {
        assert!(Cli::try_parse_from(["geo-compliance", "check", "--title", "x"]).is_err());

        let cli = Cli::try_parse_from([
            "geo-compliance",
            "--config",
            "custom.toml",
            "check",
            "--title",
            "Dark Mode",
            "--description",
            "Theme toggle",
        ])
        .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        assert!(!cli.command.verbose());
    }
}
