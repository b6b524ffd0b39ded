//! Command-line arguments for `genre-harvest`.

use clap::Parser;

/// Harvest genre listing pages into the local catalog.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// First genre id to visit.
    #[arg(default_value_t = 0, value_parser = clap::value_parser!(i64).range(0..))]
    pub start_id: i64,

    /// Exclusive upper bound of the id range (overrides HARVEST_END_ID).
    #[arg(long, value_parser = clap::value_parser!(i64).range(0..))]
    pub end_id: Option<i64>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    pub log_json: bool,
}
