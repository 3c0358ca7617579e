//! Command-line interface parsing for pitchside
//!
//! Global flags configure the API key, host and cache; subcommands pick the
//! query. Every flag with an environment fallback is documented in `--help`.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand};
use thiserror::Error;

use crate::api::{FixtureFilter, API_FOOTBALL_BASE_URL, DATE_FORMAT};
use crate::config::{Config, Credential, API_KEY_ENV};
use crate::error::FailureReason;
use crate::session::DEFAULT_LEAGUE_ID;

/// Environment variable overriding the API host
pub const BASE_URL_ENV: &str = "API_FOOTBALL_URL";

/// Error types surfaced by the command line
#[derive(Debug, Error)]
pub enum CliError {
    /// A `--date` value is not a calendar date
    #[error("Invalid date: '{0}'. Expected YYYY-MM-DD")]
    InvalidDate(String),

    /// The HTTP client could not be built
    #[error("Failed to initialize HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    /// A query failed; the message is already user-facing
    #[error("{0}")]
    Query(#[from] FailureReason),

    #[error("Failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}

/// pitchside - browse football leagues, teams and fixtures from API-Football
#[derive(Parser, Debug)]
#[command(name = "pitchside")]
#[command(about = "Football leagues, teams and fixtures from API-Football")]
#[command(version)]
pub struct Cli {
    /// API-Football key
    #[arg(long, global = true, env = API_KEY_ENV, hide_env_values = true)]
    pub api_key: Option<String>,

    /// API host
    #[arg(long, global = true, env = BASE_URL_ENV, default_value = API_FOOTBALL_BASE_URL)]
    pub base_url: String,

    /// Cache directory (defaults to the platform cache dir)
    #[arg(long, global = true, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Keep responses in memory only; nothing is written to disk
    #[arg(long, global = true, conflicts_with = "cache_dir")]
    pub memory_cache: bool,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECS", default_value_t = 30)]
    pub timeout: u64,

    /// Print records as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List leagues, or search them by name
    Leagues {
        /// Name to search for; blank lists every league
        #[arg(long)]
        search: Option<String>,
    },

    /// Search teams by name, or list the teams of one or more leagues
    Teams(TeamsArgs),

    /// List fixtures matching the filters
    Fixtures(FixturesArgs),

    /// Manage the response cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct TeamsArgs {
    /// Team name to search for
    #[arg(long, required_unless_present = "league", conflicts_with = "league")]
    pub search: Option<String>,

    /// League id; repeat to fetch several leagues at once
    #[arg(long, value_name = "ID")]
    pub league: Vec<i64>,

    /// Season start year (defaults to the current season)
    #[arg(long, requires = "league", conflicts_with = "search")]
    pub season: Option<i32>,
}

/// Where the teams of a `teams` invocation come from
#[derive(Debug, Clone, PartialEq)]
pub enum TeamsSource {
    Search(String),
    Leagues { ids: Vec<i64>, season: Option<i32> },
}

impl TeamsArgs {
    /// Resolves the flags; a blank search lists the default league instead
    pub fn source(&self) -> TeamsSource {
        match self.search.as_deref().map(str::trim) {
            Some(query) if !query.is_empty() => TeamsSource::Search(query.to_string()),
            Some(_) => TeamsSource::Leagues {
                ids: vec![DEFAULT_LEAGUE_ID],
                season: None,
            },
            None => TeamsSource::Leagues {
                ids: self.league.clone(),
                season: self.season,
            },
        }
    }
}

#[derive(Args, Debug, Clone, PartialEq)]
pub struct FixturesArgs {
    #[arg(long, value_name = "ID")]
    pub league: Option<i64>,

    /// Season start year (defaults to the current season when --league is set)
    #[arg(long)]
    pub season: Option<i32>,

    #[arg(long, value_name = "ID")]
    pub team: Option<i64>,

    /// Match date as YYYY-MM-DD
    #[arg(long, value_parser = parse_date_arg)]
    pub date: Option<NaiveDate>,
}

impl FixturesArgs {
    pub fn filter(&self) -> FixtureFilter {
        FixtureFilter {
            league_id: self.league,
            season: self.season,
            team_id: self.team,
            date: self.date,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum CacheAction {
    /// Delete every cached response
    Clear,
}

/// Parses a `--date` argument
pub fn parse_date_arg(s: &str) -> Result<NaiveDate, CliError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|_| CliError::InvalidDate(s.to_string()))
}

impl Cli {
    /// Runtime configuration described by the flags
    pub fn config(&self) -> Config {
        Config {
            credential: Credential::new(self.api_key.clone().unwrap_or_default()),
            base_url: self.base_url.clone(),
            cache_dir: self.cache_dir.clone(),
            memory_cache: self.memory_cache,
            request_timeout: Duration::from_secs(self.timeout),
        }
    }

    /// Default log filter when RUST_LOG is unset
    pub fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "pitchside=debug",
            _ => "pitchside=trace",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).expect("Arguments should parse")
    }

    #[test]
    fn test_parse_date_arg_valid() {
        assert_eq!(
            parse_date_arg("2024-08-16").unwrap(),
            NaiveDate::from_ymd_opt(2024, 8, 16).unwrap()
        );
    }

    #[test]
    fn test_parse_date_arg_invalid() {
        let err = parse_date_arg("16/08/2024").unwrap_err();
        assert!(err.to_string().contains("Invalid date"));
        assert!(err.to_string().contains("16/08/2024"));
        assert!(parse_date_arg("2024-02-30").is_err());
    }

    #[test]
    fn test_leagues_without_search() {
        let cli = parse(&["pitchside", "leagues"]);
        assert_eq!(cli.command, Command::Leagues { search: None });
    }

    #[test]
    fn test_leagues_with_search() {
        let cli = parse(&["pitchside", "leagues", "--search", "premier"]);
        assert_eq!(
            cli.command,
            Command::Leagues {
                search: Some("premier".to_string())
            }
        );
    }

    #[test]
    fn test_teams_requires_search_or_league() {
        assert!(Cli::try_parse_from(["pitchside", "teams"]).is_err());
        assert!(Cli::try_parse_from(["pitchside", "teams", "--search", "x", "--league", "39"]).is_err());
    }

    #[test]
    fn test_teams_season_requires_league() {
        assert!(Cli::try_parse_from(["pitchside", "teams", "--search", "x", "--season", "2023"]).is_err());
    }

    #[test]
    fn test_teams_source_trims_search() {
        let cli = parse(&["pitchside", "teams", "--search", "  arsenal "]);
        match cli.command {
            Command::Teams(args) => assert_eq!(args.source(), TeamsSource::Search("arsenal".to_string())),
            other => panic!("Expected teams command, got {:?}", other),
        }
    }

    #[test]
    fn test_teams_blank_search_lists_default_league() {
        let cli = parse(&["pitchside", "teams", "--search", "  "]);
        match cli.command {
            Command::Teams(args) => assert_eq!(
                args.source(),
                TeamsSource::Leagues {
                    ids: vec![DEFAULT_LEAGUE_ID],
                    season: None
                }
            ),
            other => panic!("Expected teams command, got {:?}", other),
        }
    }

    #[test]
    fn test_teams_multiple_leagues() {
        let cli = parse(&["pitchside", "teams", "--league", "39", "--league", "140", "--season", "2023"]);
        match cli.command {
            Command::Teams(args) => {
                assert_eq!(args.league, vec![39, 140]);
                assert_eq!(args.season, Some(2023));
                assert!(args.search.is_none());
                assert_eq!(
                    args.source(),
                    TeamsSource::Leagues {
                        ids: vec![39, 140],
                        season: Some(2023)
                    }
                );
            }
            other => panic!("Expected teams command, got {:?}", other),
        }
    }

    #[test]
    fn test_fixtures_filter() {
        let cli = parse(&["pitchside", "fixtures", "--league", "39", "--date", "2024-08-16"]);
        match cli.command {
            Command::Fixtures(args) => {
                let filter = args.filter();
                assert_eq!(filter.league_id, Some(39));
                assert_eq!(filter.season, None);
                assert_eq!(filter.team_id, None);
                assert_eq!(filter.date, NaiveDate::from_ymd_opt(2024, 8, 16));
            }
            other => panic!("Expected fixtures command, got {:?}", other),
        }
    }

    #[test]
    fn test_fixtures_rejects_bad_date() {
        assert!(Cli::try_parse_from(["pitchside", "fixtures", "--date", "tomorrow"]).is_err());
    }

    #[test]
    fn test_cache_clear() {
        let cli = parse(&["pitchside", "cache", "clear"]);
        assert_eq!(
            cli.command,
            Command::Cache {
                action: CacheAction::Clear
            }
        );
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = parse(&[
            "pitchside",
            "leagues",
            "--api-key",
            "abc",
            "--memory-cache",
            "--json",
            "-vv",
        ]);
        assert_eq!(cli.api_key.as_deref(), Some("abc"));
        assert!(cli.memory_cache);
        assert!(cli.json);
        assert_eq!(cli.log_level(), "pitchside=trace");
    }

    #[test]
    fn test_memory_cache_conflicts_with_cache_dir() {
        assert!(Cli::try_parse_from([
            "pitchside",
            "leagues",
            "--memory-cache",
            "--cache-dir",
            "/tmp/x"
        ])
        .is_err());
    }

    #[test]
    fn test_config_from_flags() {
        let cli = parse(&[
            "pitchside",
            "--api-key",
            "abc",
            "--base-url",
            "http://127.0.0.1:8080",
            "--cache-dir",
            "/tmp/pitchside",
            "--timeout",
            "5",
            "leagues",
        ]);
        let config = cli.config();
        assert_eq!(config.credential.validate(), Ok("abc"));
        assert_eq!(config.base_url, "http://127.0.0.1:8080");
        assert_eq!(config.cache_dir, Some(PathBuf::from("/tmp/pitchside")));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert!(!config.memory_cache);
    }
}
