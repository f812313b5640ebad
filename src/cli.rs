use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "Translate text with an online translation service", long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Translation service to use (yandex, deeplx)
    #[arg(short, long)]
    pub provider: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List source languages, or the targets available for one source
    Languages {
        /// Source language code; an empty string means autodetect
        #[arg(short, long)]
        source: Option<String>,
    },

    /// Translate text and print the result
    Translate {
        /// Source language code; an empty string means autodetect
        #[arg(short, long)]
        from: Option<String>,

        /// Target language code
        #[arg(short, long)]
        to: Option<String>,

        /// Text to translate
        #[arg(required = true)]
        text: Vec<String>,
    },

    /// Write a configuration file with default values
    InitConfig {
        /// Output path
        #[arg(default_value = "taot.toml")]
        path: PathBuf,
    },
}
