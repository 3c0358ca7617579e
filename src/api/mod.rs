//! Remote API seam
//!
//! `FootballApi` is what the repository talks to. `ApiFootballClient` implements it
//! over HTTP; tests substitute their own implementations.

mod client;

pub use client::{ApiFootballClient, API_FOOTBALL_BASE_URL, API_KEY_HEADER};

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::data::{FixtureResponse, LeagueResponse, TeamResponse};

/// Date format used by the `date` query parameter
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A failure raised by the transport before a usable body was decoded
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiFault {
    /// The server answered with a non-success status
    #[error("HTTP {code}")]
    Status { code: u16, body: Option<String> },

    /// Name resolution or connection establishment failed
    #[error("{0}")]
    Connectivity(String),

    /// The request or response stream failed mid-flight
    #[error("{0}")]
    Io(String),

    /// The body could not be decoded into the expected shape
    #[error("{0}")]
    Decode(String),

    /// Anything else, carried as its message
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for ApiFault {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            ApiFault::Connectivity(err.to_string())
        } else if err.is_decode() {
            ApiFault::Decode(err.to_string())
        } else if err.is_timeout() || err.is_request() || err.is_body() {
            ApiFault::Io(err.to_string())
        } else {
            ApiFault::Other(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiFault {
    fn from(err: serde_json::Error) -> Self {
        ApiFault::Decode(err.to_string())
    }
}

/// Status code and body of a response, before any decoding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Filters accepted by the fixtures endpoint; every field is optional
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FixtureFilter {
    pub league_id: Option<i64>,
    pub season: Option<i32>,
    pub team_id: Option<i64>,
    pub date: Option<NaiveDate>,
}

impl FixtureFilter {
    /// The filter as query parameters, skipping absent fields
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(league) = self.league_id {
            pairs.push(("league", league.to_string()));
        }
        if let Some(season) = self.season {
            pairs.push(("season", season.to_string()));
        }
        if let Some(team) = self.team_id {
            pairs.push(("team", team.to_string()));
        }
        if let Some(date) = self.date {
            pairs.push(("date", date.format(DATE_FORMAT).to_string()));
        }
        pairs
    }
}

/// Operations offered by API-Football
///
/// Typed operations decode the envelope themselves; `get_teams_by_league` hands
/// back the raw status and body so the caller can classify failures from both.
#[async_trait]
pub trait FootballApi: Send + Sync {
    async fn get_leagues(
        &self,
        api_key: &str,
        search: Option<&str>,
        country: Option<&str>,
    ) -> Result<LeagueResponse, ApiFault>;

    async fn search_teams(&self, api_key: &str, name: &str) -> Result<TeamResponse, ApiFault>;

    async fn get_teams_by_league(
        &self,
        api_key: &str,
        league_id: i64,
        season: i32,
    ) -> Result<RawResponse, ApiFault>;

    async fn get_fixtures(
        &self,
        api_key: &str,
        filter: &FixtureFilter,
    ) -> Result<FixtureResponse, ApiFault>;
}
