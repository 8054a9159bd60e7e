use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "tygia")]
#[command(version, about = "Vietcombank exchange rate fetcher and server")]
#[command(
    long_about = "Fetch the exchange rates published by Vietcombank (XML API or rendered-page scrape), cache one snapshot to a local CSV file, and serve it from a small web interface."
)]
pub struct Cli {
    /// Directory for the cached snapshot (defaults to the user cache dir)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch fresh rates and replace the cached snapshot
    Crawl {
        /// Acquisition strategy
        #[arg(long, value_enum, default_value = "api")]
        source: SourceKind,
    },

    /// Show the cached rates
    List,

    /// Show the sell rate for one currency code
    Get {
        /// Currency code, e.g. USD
        code: String,
    },

    /// Run the web server
    Serve {
        /// Address to listen on (overrides the config file)
        #[arg(long)]
        bind: Option<String>,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SourceKind {
    /// Direct call to the XML rate feed
    Api,
    /// Headless-browser scrape of the rendered rates page
    Scrape,
}
