//! pitchside - football leagues, teams and fixtures in the terminal
//!
//! Runs one query per invocation and prints the records, one per line or as
//! JSON. Failures print the normalized message on stderr and exit with status 1.

use std::process;

use clap::Parser;
use futures::future::join_all;
use serde::Serialize;

use pitchside::cli::{CacheAction, Cli, CliError, Command, TeamsArgs, TeamsSource};
use pitchside::data::{Fixture, League, Team};
use pitchside::repository::FootballRepository;

fn print_records<T: Serialize>(
    records: &[T],
    json: bool,
    empty: &str,
    summary: fn(&T) -> String,
) -> Result<(), CliError> {
    if json {
        println!("{}", serde_json::to_string_pretty(records)?);
    } else if records.is_empty() {
        println!("{}", empty);
    } else {
        for record in records {
            println!("{}", summary(record));
        }
    }
    Ok(())
}

async fn run_teams(repository: &FootballRepository, args: TeamsArgs, json: bool) -> Result<(), CliError> {
    let (league_ids, season) = match args.source() {
        TeamsSource::Search(query) => {
            let teams = repository.search_teams(&query).await?;
            return print_records(&teams, json, "No teams found.", Team::summary);
        }
        TeamsSource::Leagues { ids, season } => (ids, season),
    };

    // Leagues are fetched concurrently; each one is cached independently
    let results = join_all(
        league_ids
            .iter()
            .map(|&league_id| repository.get_teams_by_league(league_id, season)),
    )
    .await;

    let mut teams = Vec::new();
    let mut first_failure = None;
    for (league_id, result) in league_ids.iter().zip(results) {
        match result {
            Ok(mut records) => teams.append(&mut records),
            Err(reason) => {
                eprintln!("League {}: {}", league_id, reason);
                first_failure.get_or_insert(reason);
            }
        }
    }

    print_records(&teams, json, "No teams found.", Team::summary)?;
    match first_failure {
        Some(reason) => Err(reason.into()),
        None => Ok(()),
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let repository = cli.config().build_repository()?;

    match cli.command {
        Command::Leagues { search } => {
            let leagues = match search.as_deref().map(str::trim) {
                Some(query) if !query.is_empty() => repository.search_leagues(query).await?,
                _ => repository.get_all_leagues().await?,
            };
            print_records(&leagues, cli.json, "No leagues found.", League::summary)
        }
        Command::Teams(args) => run_teams(&repository, args, cli.json).await,
        Command::Fixtures(args) => {
            let fixtures = repository.get_fixtures(&args.filter()).await?;
            print_records(&fixtures, cli.json, "No fixtures found.", Fixture::summary)
        }
        Command::Cache {
            action: CacheAction::Clear,
        } => {
            repository.clear_cache().await;
            println!("Cache cleared.");
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for records and JSON
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log_level())),
        )
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
