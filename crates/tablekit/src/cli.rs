//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tablekit_core::key::PrimaryKey;
use tablekit_core::movies::{SAMPLE_TITLE, SAMPLE_YEAR};
use tablekit_core::value::Number;

/// Demonstration routines against a DynamoDB table of movies.
#[derive(Debug, Parser)]
#[command(name = "tablekit")]
#[command(version, about = "Demonstration routines against a DynamoDB table", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: Global,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Args)]
pub struct Global {
    /// Custom endpoint URL (e.g. DynamoDB Local at http://localhost:8000).
    #[arg(long, env = "AWS_ENDPOINT_URL", global = true)]
    pub endpoint_url: Option<String>,

    /// AWS region.
    #[arg(long, env = "AWS_REGION", default_value = "us-east-1", global = true)]
    pub region: String,

    /// Table to operate on.
    #[arg(long, env = "TABLEKIT_TABLE", default_value = "Movies", global = true)]
    pub table_name: String,

    /// Storage backend. `memory` starts empty on every run.
    #[arg(long, value_enum, default_value_t = Backend::Dynamodb, global = true)]
    pub backend: Backend,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Pretty, global = true)]
    pub format: OutputFormat,

    /// Silence status output
    #[arg(long, global = true)]
    pub silent: bool,

    /// Enable verbose logging
    #[arg(long, global = true)]
    pub verbose: bool,
}

impl Global {
    pub fn is_silent(&self) -> bool {
        self.silent
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Storage backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// AWS DynamoDB (or DynamoDB Local).
    Dynamodb,
    /// Process-local in-memory table store.
    Memory,
}

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Raw JSON output.
    Json,
    /// Human-readable output with colors.
    #[default]
    Pretty,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the movies table (year N partition key, title S sort key).
    CreateTable(CreateTableArgs),

    /// Delete the table and all of its items.
    DeleteTable(ConfirmArgs),

    /// Put the sample movie with a plot and a zero rating.
    PutItem(MovieKeyArgs),

    /// Set the rating, plot and actors of a movie.
    UpdateItem(MovieKeyArgs),

    /// Remove the first actor, only if the movie lists at least three.
    RemoveActor(MovieKeyArgs),

    /// Get a movie by year and title.
    GetItem(MovieKeyArgs),

    /// Delete a movie, only if its rating is at most the given value.
    DeleteItem(DeleteItemArgs),

    /// Bulk load movies from a JSON file.
    Load(LoadArgs),

    /// Query movies of one year, optionally restricted to a title range.
    Query(QueryArgs),

    /// Scan the table for movies within a range of years.
    Scan(ScanArgs),

    /// Run every operation in order against the selected backend.
    Walkthrough(WalkthroughArgs),
}

#[derive(Debug, Clone, Args)]
pub struct ConfirmArgs {
    /// Skip confirmation prompts.
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Clone, Args)]
pub struct CreateTableArgs {
    /// Wait until the table is ACTIVE.
    #[arg(long)]
    pub wait: bool,

    #[command(flatten)]
    pub confirm: ConfirmArgs,
}

/// Selects one movie. Defaults to the sample movie.
#[derive(Debug, Clone, Args)]
pub struct MovieKeyArgs {
    /// Release year (partition key).
    #[arg(long, default_value_t = SAMPLE_YEAR)]
    pub year: i64,

    /// Title (sort key).
    #[arg(long, default_value = SAMPLE_TITLE)]
    pub title: String,
}

impl MovieKeyArgs {
    pub fn key(&self) -> PrimaryKey {
        PrimaryKey::partition("year", self.year).with_sort("title", self.title.clone())
    }
}

#[derive(Debug, Clone, Args)]
pub struct DeleteItemArgs {
    #[command(flatten)]
    pub movie: MovieKeyArgs,

    /// Delete only when `info.rating` is at most this value.
    #[arg(long, default_value = "2")]
    pub max_rating: Number,
}

#[derive(Debug, Clone, Args)]
pub struct LoadArgs {
    /// JSON array of {year, title, info} records.
    #[arg(default_value = "moviedata.json")]
    pub file: PathBuf,

    /// Continue past failed records and report them at the end.
    #[arg(long)]
    pub keep_going: bool,
}

/// Pagination controls shared by query and scan.
#[derive(Debug, Clone, Args)]
pub struct PageArgs {
    /// Maximum number of items to read per page.
    #[arg(long)]
    pub limit: Option<u32>,

    /// Keep fetching pages until the store reports no continuation key.
    #[arg(long)]
    pub all_pages: bool,
}

#[derive(Debug, Clone, Args)]
pub struct QueryArgs {
    /// Release year to query.
    #[arg(long, default_value_t = 2013)]
    pub year: i64,

    /// First title of the range (inclusive).
    #[arg(long, requires = "to")]
    pub from: Option<String>,

    /// Last title of the range (inclusive).
    #[arg(long, requires = "from")]
    pub to: Option<String>,

    /// Return titles in descending order.
    #[arg(long)]
    pub descending: bool,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Debug, Clone, Args)]
pub struct ScanArgs {
    /// First year of the range (inclusive).
    #[arg(long, default_value_t = 1980)]
    pub from: i64,

    /// Last year of the range (inclusive).
    #[arg(long, default_value_t = 1982)]
    pub to: i64,

    /// Scan only this segment (requires --total-segments).
    #[arg(long, requires = "total_segments")]
    pub segment: Option<u32>,

    /// Number of parallel scan segments.
    #[arg(long, requires = "segment")]
    pub total_segments: Option<u32>,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Debug, Clone, Args)]
pub struct WalkthroughArgs {
    /// Movie data to bulk load during the walkthrough.
    #[arg(long)]
    pub data: Option<PathBuf>,

    /// Delete the table when done.
    #[arg(long)]
    pub cleanup: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_item_commands_default_to_sample_movie() {
        let cli = Cli::parse_from(["tablekit", "get-item"]);
        let Commands::GetItem(args) = cli.command else {
            panic!("expected get-item");
        };
        assert_eq!(args.year, 2015);
        assert_eq!(args.title, "Waddup the movie time");
    }

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::parse_from([
            "tablekit",
            "scan",
            "--backend",
            "memory",
            "--table-name",
            "Films",
            "--format",
            "json",
        ]);
        assert_eq!(cli.global.backend, Backend::Memory);
        assert_eq!(cli.global.table_name, "Films");
        assert_eq!(cli.global.format, OutputFormat::Json);
    }

    #[test]
    fn test_query_title_range_requires_both_bounds() {
        assert!(Cli::try_parse_from(["tablekit", "query", "--from", "A"]).is_err());
        let cli = Cli::try_parse_from(["tablekit", "query", "--year", "1985", "--from", "A", "--to", "L"])
            .unwrap();
        let Commands::Query(args) = cli.command else {
            panic!("expected query");
        };
        assert_eq!(args.year, 1985);
        assert_eq!(args.from.as_deref(), Some("A"));
        assert_eq!(args.to.as_deref(), Some("L"));
    }

    #[test]
    fn test_delete_item_max_rating_is_exact() {
        let cli = Cli::parse_from(["tablekit", "delete-item", "--max-rating", "2.50"]);
        let Commands::DeleteItem(args) = cli.command else {
            panic!("expected delete-item");
        };
        assert_eq!(args.max_rating.to_string(), "2.5");
    }

    #[test]
    fn test_load_defaults() {
        let cli = Cli::parse_from(["tablekit", "load"]);
        let Commands::Load(args) = cli.command else {
            panic!("expected load");
        };
        assert_eq!(args.file, PathBuf::from("moviedata.json"));
        assert!(!args.keep_going);
    }
}
