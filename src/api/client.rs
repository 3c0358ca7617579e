//! API-Football HTTP client
//!
//! Sends authenticated GET requests and decodes the JSON envelopes into our data
//! structures. Transport problems come back as `ApiFault`.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{ApiFault, FixtureFilter, FootballApi, RawResponse};
use crate::data::{ApiResponse, FixtureResponse, LeagueResponse, TeamResponse};

/// Base URL for the API-Football v3 API
pub const API_FOOTBALL_BASE_URL: &str = "https://v3.football.api-sports.io";

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-apisports-key";

/// Client for API-Football
#[derive(Debug, Clone)]
pub struct ApiFootballClient {
    client: Client,
    base_url: String,
}

impl Default for ApiFootballClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ApiFootballClient {
    /// Create a new client against the public API
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    /// Create a new client with a custom HTTP client
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: API_FOOTBALL_BASE_URL.to_string(),
        }
    }

    /// Point the client at another host (mirrors, proxies, tests)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue a GET and return the status and body untouched
    async fn fetch_raw(
        &self,
        api_key: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<RawResponse, ApiFault> {
        let url = format!("{}/{}", self.base_url, path);
        debug!(%url, ?query, "sending request");

        let response = self
            .client
            .get(&url)
            .header(API_KEY_HEADER, api_key)
            .query(query)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        debug!(%url, status, bytes = body.len(), "received response");
        Ok(RawResponse { status, body })
    }

    /// Issue a GET and decode the envelope, turning non-2xx into a status fault
    async fn fetch<T: DeserializeOwned>(
        &self,
        api_key: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<ApiResponse<T>, ApiFault> {
        let raw = self.fetch_raw(api_key, path, query).await?;
        if !raw.is_success() {
            return Err(ApiFault::Status {
                code: raw.status,
                body: Some(raw.body),
            });
        }
        Ok(serde_json::from_str(&raw.body)?)
    }
}

#[async_trait]
impl FootballApi for ApiFootballClient {
    async fn get_leagues(
        &self,
        api_key: &str,
        search: Option<&str>,
        country: Option<&str>,
    ) -> Result<LeagueResponse, ApiFault> {
        let mut query = Vec::new();
        if let Some(search) = search {
            query.push(("search", search.to_string()));
        }
        if let Some(country) = country {
            query.push(("country", country.to_string()));
        }
        self.fetch(api_key, "leagues", &query).await
    }

    async fn search_teams(&self, api_key: &str, name: &str) -> Result<TeamResponse, ApiFault> {
        self.fetch(api_key, "teams", &[("name", name.to_string())])
            .await
    }

    async fn get_teams_by_league(
        &self,
        api_key: &str,
        league_id: i64,
        season: i32,
    ) -> Result<RawResponse, ApiFault> {
        let query = [
            ("league", league_id.to_string()),
            ("season", season.to_string()),
        ];
        self.fetch_raw(api_key, "teams", &query).await
    }

    async fn get_fixtures(
        &self,
        api_key: &str,
        filter: &FixtureFilter,
    ) -> Result<FixtureResponse, ApiFault> {
        self.fetch(api_key, "fixtures", &filter.query_pairs()).await
    }
}
