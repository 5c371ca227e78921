//! CLI module
//!
//! Command-line interface for browsing collections.
//!
//! # Commands
//!
//! - `fetch` - Fetch pages of a collection and print the records
//! - `sweep` - Evict stale records from a store snapshot
//! - `validate` - Check a configuration file

mod commands;
mod runner;

pub use commands::{parse_key_value, Cli, Commands, FetchArgs, OutputFormat};
pub use runner::{build_template, Runner};
