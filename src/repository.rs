//! Fetch orchestration for leagues, teams and fixtures
//!
//! Every query follows the same path: validate the API key, resolve the season,
//! derive the cache key, serve a cache hit, or call the API, classify the result
//! and cache successes. Failures come back as `FailureReason`; nothing panics or
//! escapes as a raw error.

use std::future::Future;
use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, info};

use crate::api::{ApiFault, FixtureFilter, FootballApi, DATE_FORMAT};
use crate::cache::{derive_key, get_json, put_json, CacheCategory, CacheStore, KeyParam};
use crate::config::Credential;
use crate::data::{ApiResponse, Fixture, League, Team, TeamResponse};
use crate::error::{FailureReason, QueryResult};
use crate::normalize;
use crate::season::SeasonCalculator;

/// Reported when the API sent neither errors nor records
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";

/// Reported when the teams-by-league body carries no records
pub const NO_TEAMS_MESSAGE: &str = "No teams found for this league and season";

/// Reported when the teams-by-league call succeeded with an empty body
pub const EMPTY_RESPONSE_MESSAGE: &str = "Empty response from API";

const PARSE_HINT: &str = "API returned an unexpected response format. This usually means your API subscription doesn't include access to this endpoint. Please check your subscription at https://dashboard.api-football.com.";

const TEAMS_BY_LEAGUE_PARSE_HINT: &str = "API returned an unexpected response format. This usually means: 1) your API subscription doesn't include this endpoint, 2) the season is not available, or 3) the API response structure changed. Check your subscription at https://dashboard.api-football.com.";

/// Reads leagues, teams and fixtures through the response cache
pub struct FootballRepository {
    api: Arc<dyn FootballApi>,
    cache: Arc<dyn CacheStore>,
    credential: Credential,
    seasons: SeasonCalculator,
}

impl FootballRepository {
    pub fn new(
        api: Arc<dyn FootballApi>,
        cache: Arc<dyn CacheStore>,
        credential: Credential,
        seasons: SeasonCalculator,
    ) -> Self {
        Self {
            api,
            cache,
            credential,
            seasons,
        }
    }

    /// Leagues whose name matches `query`
    pub async fn search_leagues(&self, query: &str) -> QueryResult<League> {
        let api_key = self.credential.validate()?;
        let key = derive_key(CacheCategory::Leagues, &["search".into(), query.into()]);

        self.fetch_cached(&key, UNKNOWN_ERROR_MESSAGE, async {
            self.api
                .get_leagues(api_key, Some(query), None)
                .await
                .map_err(|fault| failure_from_fault(&fault, PARSE_HINT))
        })
        .await
    }

    /// Every league the API knows about
    pub async fn get_all_leagues(&self) -> QueryResult<League> {
        let api_key = self.credential.validate()?;
        let key = derive_key(CacheCategory::Leagues, &["all".into()]);

        self.fetch_cached(&key, UNKNOWN_ERROR_MESSAGE, async {
            self.api
                .get_leagues(api_key, None, None)
                .await
                .map_err(|fault| failure_from_fault(&fault, PARSE_HINT))
        })
        .await
    }

    /// Teams whose name matches `query`
    pub async fn search_teams(&self, query: &str) -> QueryResult<Team> {
        let api_key = self.credential.validate()?;
        let key = derive_key(CacheCategory::Teams, &["search".into(), query.into()]);

        self.fetch_cached(&key, UNKNOWN_ERROR_MESSAGE, async {
            self.api
                .search_teams(api_key, query)
                .await
                .map_err(|fault| failure_from_fault(&fault, PARSE_HINT))
        })
        .await
    }

    /// Teams playing in a league for a season (the current one when `None`)
    pub async fn get_teams_by_league(&self, league_id: i64, season: Option<i32>) -> QueryResult<Team> {
        let api_key = self.credential.validate()?;
        let season = season.unwrap_or_else(|| self.seasons.current_season());
        let key = derive_key(
            CacheCategory::Teams,
            &["league".into(), league_id.into(), season.into()],
        );

        self.fetch_cached(&key, NO_TEAMS_MESSAGE, async {
            let raw = self
                .api
                .get_teams_by_league(api_key, league_id, season)
                .await
                .map_err(|fault| failure_from_fault(&fault, TEAMS_BY_LEAGUE_PARSE_HINT))?;

            if !raw.is_success() {
                return Err(FailureReason::Transport(normalize::status_message(
                    raw.status,
                    Some(&raw.body),
                )));
            }
            if raw.body.trim().is_empty() {
                return Err(FailureReason::Api(EMPTY_RESPONSE_MESSAGE.to_string()));
            }
            serde_json::from_str::<TeamResponse>(&raw.body)
                .map_err(|e| parse_failure(TEAMS_BY_LEAGUE_PARSE_HINT, &e.to_string()))
        })
        .await
    }

    /// Fixtures matching the filter
    ///
    /// When a league is given without a season, the current season is used.
    pub async fn get_fixtures(&self, filter: &FixtureFilter) -> QueryResult<Fixture> {
        let api_key = self.credential.validate()?;
        let filter = FixtureFilter {
            season: filter
                .season
                .or_else(|| filter.league_id.map(|_| self.seasons.current_season())),
            ..filter.clone()
        };
        let key = derive_key(
            CacheCategory::Fixtures,
            &[
                filter.league_id.into(),
                filter.season.into(),
                filter.team_id.into(),
                KeyParam::from(filter.date.map(|d| d.format(DATE_FORMAT).to_string())),
            ],
        );

        self.fetch_cached(&key, UNKNOWN_ERROR_MESSAGE, async {
            self.api
                .get_fixtures(api_key, &filter)
                .await
                .map_err(|fault| failure_from_fault(&fault, PARSE_HINT))
        })
        .await
    }

    /// Drops every cached response
    pub async fn clear_cache(&self) {
        info!("clearing response cache");
        self.cache.clear().await;
    }

    /// Serves `key` from the cache, or runs `fetch` and caches what it returns
    ///
    /// `fetch` is only polled on a miss.
    async fn fetch_cached<T, F>(&self, key: &str, missing_message: &str, fetch: F) -> QueryResult<T>
    where
        T: Serialize + DeserializeOwned,
        F: Future<Output = Result<ApiResponse<T>, FailureReason>>,
    {
        if let Some(records) = get_json::<Vec<T>>(self.cache.as_ref(), key).await {
            debug!(key, count = records.len(), "serving from cache");
            return Ok(records);
        }

        debug!(key, "cache miss, calling API");
        let outcome = fetch.await.and_then(|response| classify(response, missing_message));

        match &outcome {
            Ok(records) => {
                put_json(self.cache.as_ref(), key, records).await;
                debug!(key, count = records.len(), "cached API response");
            }
            Err(reason) => info!(key, error = %reason, "query failed"),
        }
        outcome
    }
}

/// Splits a decoded envelope into records or a failure
///
/// Reported errors win over records; a body with neither is a failure too.
fn classify<T>(response: ApiResponse<T>, missing_message: &str) -> QueryResult<T> {
    if let Some(errors) = response.errors.filter(|e| !e.is_empty()) {
        let joined = errors.join(", ");
        return Err(FailureReason::Api(normalize::error_message(&ApiFault::Other(
            joined,
        ))));
    }

    response
        .response
        .ok_or_else(|| FailureReason::Api(missing_message.to_string()))
}

fn failure_from_fault(fault: &ApiFault, parse_hint: &str) -> FailureReason {
    match fault {
        ApiFault::Decode(detail) => parse_failure(parse_hint, detail),
        other => FailureReason::Transport(normalize::error_message(other)),
    }
}

fn parse_failure(hint: &str, detail: &str) -> FailureReason {
    FailureReason::Parse(format!("{} Error details: {}", hint, detail))
}
