//! Command dispatch (Imperative Shell).
//!
//! Opens the selected store once and hands it to the named operations.

use dialoguer::Confirm;
use tablekit_core::movies::{sample_movie, sample_movie_key, SAMPLE_TITLE, SAMPLE_YEAR};
use tablekit_core::storage::{TableStore, WriteOutcome};
use tablekit_core::table::{format_table_definition, movies_table_definition};
use tablekit_core::value::Number;

use crate::cli::{
    Backend, Cli, Commands, ConfirmArgs, CreateTableArgs, Global, LoadArgs, QueryArgs, ScanArgs,
    WalkthroughArgs,
};
use crate::config::{create_client, AwsConfig};
use crate::error::{AppError, Result};
use crate::loader::{self, LoadPolicy};
use crate::operations::{self, WaitPolicy};
use crate::output::Printer;
use crate::prelude::*;
use crate::storage::{DynamoDbStore, InMemoryStore};

/// Runs one parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let out = Printer::from_global(&cli.global);
    let store = open_store(&cli.global, &out).await;
    execute(store.as_ref(), &cli.global, cli.command).await
}

/// Builds the store for the selected backend.
pub async fn open_store(global: &Global, out: &Printer) -> Box<dyn TableStore> {
    match global.backend {
        Backend::Dynamodb => {
            let config = AwsConfig::from_global(global);
            out.status(&format!("{} {}", p_b("Target:"), config.target_display()));
            Box::new(DynamoDbStore::new(create_client(&config).await))
        }
        Backend::Memory => {
            out.status(&format!("{} In-memory table store", p_b("Target:")));
            Box::new(InMemoryStore::new())
        }
    }
}

/// Runs a command against an already opened store.
pub async fn execute(store: &dyn TableStore, global: &Global, command: Commands) -> Result<()> {
    let out = Printer::from_global(global);
    let table = global.table_name.as_str();
    out.status(&format!("{} {}", p_b("Table:"), table));

    match command {
        Commands::CreateTable(args) => run_create_table(store, table, args, &out).await,
        Commands::DeleteTable(args) => run_delete_table(store, table, args, &out).await,
        Commands::PutItem(args) => {
            operations::put_movie(store, table, sample_movie(args.year, &args.title)).await?;
            out.outcome("PutItem", &WriteOutcome::Applied(None));
            Ok(())
        }
        Commands::UpdateItem(args) => {
            let updated = operations::update_movie_details(store, table, &args.key()).await?;
            out.outcome("UpdateItem", &WriteOutcome::Applied(updated));
            Ok(())
        }
        Commands::RemoveActor(args) => {
            let outcome = operations::remove_first_actor(store, table, &args.key()).await?;
            out.outcome("UpdateItem", &outcome);
            Ok(())
        }
        Commands::GetItem(args) => {
            let item = operations::get_movie(store, table, &args.key()).await?;
            out.item(item.as_ref());
            Ok(())
        }
        Commands::DeleteItem(args) => {
            let outcome = operations::delete_movie_if_rated_at_most(
                store,
                table,
                &args.movie.key(),
                args.max_rating,
            )
            .await?;
            out.outcome("DeleteItem", &outcome);
            Ok(())
        }
        Commands::Load(args) => run_load(store, table, args, &out).await,
        Commands::Query(args) => run_query(store, table, args, &out).await,
        Commands::Scan(args) => run_scan(store, table, args, &out).await,
        Commands::Walkthrough(args) => run_walkthrough(store, table, args, &out).await,
    }
}

fn confirm(prompt: &str, default: bool) -> Result<()> {
    let confirmed = Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(|e| AppError::Prompt(e.to_string()))?;

    if confirmed {
        Ok(())
    } else {
        Err(AppError::UserCancelled)
    }
}

async fn run_create_table(
    store: &dyn TableStore,
    table: &str,
    args: CreateTableArgs,
    out: &Printer,
) -> Result<()> {
    let definition = movies_table_definition().with_table_name(table);
    out.status(&p_y("Plan:"));
    for line in format_table_definition(&definition) {
        out.status(&format!("  {}", p_g(&line)));
    }

    if !args.confirm.force {
        confirm("Create this table?", true)?;
    }

    let mut description = operations::create_table(store, &definition).await?;
    if args.wait {
        out.status(&p_b("Waiting for table to become active..."));
        description = operations::wait_for_table_active(store, table, WaitPolicy::default()).await?;
    }

    out.table(&description);
    Ok(())
}

async fn run_delete_table(
    store: &dyn TableStore,
    table: &str,
    args: ConfirmArgs,
    out: &Printer,
) -> Result<()> {
    if store.describe_table(table).await?.is_none() {
        out.status(&p_g("Nothing to delete."));
        return Ok(());
    }

    out.status(&p_y("Plan:"));
    out.status(&format!("  {}", p_r(&format!("- Delete table: {table}"))));

    if !args.force {
        confirm(
            "Are you sure you want to delete this table? ALL DATA WILL BE LOST",
            false,
        )?;
    }

    operations::delete_table(store, table).await?;
    out.status(&p_g("Table deleted."));
    Ok(())
}

async fn run_load(store: &dyn TableStore, table: &str, args: LoadArgs, out: &Printer) -> Result<()> {
    let movies = loader::read_movies(&args.file)?;
    out.status(&format!(
        "{} {} movie(s) from {}",
        p_b("Loading"),
        movies.len(),
        args.file.display()
    ));

    let policy = LoadPolicy::from_keep_going(args.keep_going);
    let summary = loader::load_movies(store, table, &movies, policy, |movie| {
        out.status(&format!("  {} {} : {}", p_g("+"), movie.year, movie.title));
    })
    .await?;

    out.load_summary(&summary);
    Ok(())
}

async fn run_query(store: &dyn TableStore, table: &str, args: QueryArgs, out: &Printer) -> Result<()> {
    let mut request = match (&args.from, &args.to) {
        (Some(from), Some(to)) => operations::movies_of_year_in_title_range(args.year, from, to),
        _ => operations::movies_of_year(args.year),
    };
    if args.descending {
        request = request.descending();
    }
    if let Some(limit) = args.page.limit {
        request = request.with_limit(limit);
    }

    let page = operations::query(store, table, request, args.page.all_pages).await?;
    out.page(&page);
    Ok(())
}

async fn run_scan(store: &dyn TableStore, table: &str, args: ScanArgs, out: &Printer) -> Result<()> {
    let mut request = operations::movies_released_between(args.from, args.to);
    if let (Some(segment), Some(total)) = (args.segment, args.total_segments) {
        request = request.with_segment(segment, total);
    }
    if let Some(limit) = args.page.limit {
        request = request.with_limit(limit);
    }

    let page = operations::scan(store, table, request, args.page.all_pages).await?;
    out.page(&page);
    Ok(())
}

/// Create, put, get, update, remove an actor, attempt a conditional delete,
/// then optionally load a data file, query, scan and drop the table.
async fn run_walkthrough(
    store: &dyn TableStore,
    table: &str,
    args: WalkthroughArgs,
    out: &Printer,
) -> Result<()> {
    out.section("Create table");
    if store.describe_table(table).await?.is_none() {
        let definition = movies_table_definition().with_table_name(table);
        operations::create_table(store, &definition).await?;
    }
    let description = operations::wait_for_table_active(store, table, WaitPolicy::default()).await?;
    out.table(&description);

    let key = sample_movie_key();

    out.section("Put item");
    operations::put_movie(store, table, sample_movie(SAMPLE_YEAR, SAMPLE_TITLE)).await?;
    out.item(operations::get_movie(store, table, &key).await?.as_ref());

    out.section("Update item");
    let updated = operations::update_movie_details(store, table, &key).await?;
    out.outcome("UpdateItem", &WriteOutcome::Applied(updated));

    out.section("Remove first actor");
    let outcome = operations::remove_first_actor(store, table, &key).await?;
    out.outcome("UpdateItem", &outcome);

    out.section("Delete if rating <= 2");
    let outcome =
        operations::delete_movie_if_rated_at_most(store, table, &key, Number::from(2)).await?;
    out.outcome("DeleteItem", &outcome);
    out.item(operations::get_movie(store, table, &key).await?.as_ref());

    if let Some(path) = &args.data {
        out.section("Load");
        let movies = loader::read_movies(path)?;
        let summary =
            loader::load_movies(store, table, &movies, LoadPolicy::AbortOnError, |_| {}).await?;
        out.load_summary(&summary);

        out.section("Query 1985, titles A to L");
        let request = operations::movies_of_year_in_title_range(1985, "A", "L");
        out.page(&operations::query(store, table, request, true).await?);

        out.section("Scan 1980 to 1982");
        let request = operations::movies_released_between(1980, 1982);
        out.page(&operations::scan(store, table, request, true).await?);
    }

    if args.cleanup {
        out.section("Delete table");
        operations::delete_table(store, table).await?;
    }

    Ok(())
}
