use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "ytmeta",
    about = "ytmeta - Generate YouTube titles, descriptions, tags and chapters from video files",
    version,
    long_about = "Extracts audio from video files with ffmpeg, transcribes it with Whisper and asks the Perplexity API to write YouTube metadata. Several files can be queued and processed as one batch."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Process one or more video files as a batch
    Process {
        /// Video files to process (mp4, avi, mov, mkv, ...)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Directory for exported files (defaults to the configured export directory or the current directory)
        #[arg(short, long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Summary format printed once the batch completes
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Export generated content of every successful file
        #[arg(short, long)]
        export: bool,
    },

    /// Show or change configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,

        /// Store the Perplexity API key in the config file
        #[arg(long, value_name = "KEY")]
        set_api_key: Option<String>,
    },

    /// List the content kinds that are generated for each video
    Kinds,
}

#[derive(ValueEnum, Clone, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable summary
    Text,
    /// JSON array of per-file results
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_process_command() {
        let cli = Cli::try_parse_from(["ytmeta", "process", "a.mp4", "b.mp4", "--export"]).unwrap();
        match cli.command {
            Commands::Process { files, export, format, .. } => {
                assert_eq!(files, vec![PathBuf::from("a.mp4"), PathBuf::from("b.mp4")]);
                assert!(export);
                assert_eq!(format, OutputFormat::Text);
            }
            _ => panic!("expected process command"),
        }
    }

    #[test]
    fn test_process_requires_files() {
        assert!(Cli::try_parse_from(["ytmeta", "process"]).is_err());
    }

    #[test]
    fn test_parse_config_set_key() {
        let cli = Cli::try_parse_from(["ytmeta", "config", "--set-api-key", "pplx-123"]).unwrap();
        match cli.command {
            Commands::Config { show, set_api_key } => {
                assert!(!show);
                assert_eq!(set_api_key.as_deref(), Some("pplx-123"));
            }
            _ => panic!("expected config command"),
        }
    }
}
