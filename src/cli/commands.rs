//! CLI commands and argument parsing

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Browse paginated JSON:API collections
#[derive(Parser, Debug)]
#[command(name = "jsonapi-pager")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Client configuration file (YAML)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Base URL, used when no config file is given
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Record store snapshot (JSON)
    #[arg(short, long, global = true)]
    pub store: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, default_value = "json")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch pages of a collection and print its records
    Fetch(FetchArgs),

    /// Evict stale records from the store snapshot
    Sweep {
        /// Maximum record age in seconds (defaults to cache.ttl_secs)
        #[arg(long)]
        ttl_secs: Option<u64>,
    },

    /// Validate the configuration file
    Validate,
}

/// Arguments of `fetch`
#[derive(Args, Debug, Clone)]
pub struct FetchArgs {
    /// Collection path relative to the base URL
    pub path: String,

    /// Resource types to keep (others are skipped)
    #[arg(short = 't', long = "type", required = true, value_delimiter = ',')]
    pub kinds: Vec<String>,

    /// Relationships to include
    #[arg(short, long, value_delimiter = ',')]
    pub include: Vec<String>,

    /// Filters as key=value
    #[arg(long, value_parser = parse_key_value)]
    pub filter: Vec<(String, String)>,

    /// Sort fields, `-field` for descending
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub sort: Vec<String>,

    /// Page size (defaults to pagination.default_limit)
    #[arg(long)]
    pub limit: Option<u32>,

    /// Offset of the first page
    #[arg(long, default_value = "0")]
    pub offset: u32,

    /// Number of pages to fetch
    #[arg(long, default_value = "1")]
    pub pages: usize,

    /// Send credentials with the requests
    #[arg(long)]
    pub auth: bool,
}

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON output (one record per line)
    Json,
    /// Human-readable output
    Pretty,
}

/// Parse a `key=value` argument
pub fn parse_key_value(s: &str) -> std::result::Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{s}'")),
    }
}
