//! Command-line argument parsing.

use clap::{Parser, Subcommand};
use lookout_core::QueryType;
use std::path::PathBuf;

/// Lookout OSINT aggregator
#[derive(Debug, Parser)]
#[command(name = "lookout")]
#[command(about = "Look up usernames, phone numbers, emails and domains across public sources")]
#[command(long_about = None)]
#[command(version)]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Skip the result cache entirely
    #[arg(long, global = true)]
    pub no_cache: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Resolve one identifier and print the aggregate result as JSON
    Lookup {
        /// username, phone, email or domain
        query_type: QueryType,

        /// Identifier to look up
        query: String,

        /// Ignore any cached result and probe again
        #[arg(long)]
        refresh: bool,

        /// Print only the image URLs found in the result
        #[arg(long)]
        images: bool,
    },

    /// Drop cached results
    Clear {
        /// Only drop results of this query type
        #[arg(long = "type")]
        query_type: Option<QueryType>,
    },

    /// Print the effective configuration as TOML
    Config,
}
