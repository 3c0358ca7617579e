//! Query slots with cancellation and state publishing
//!
//! A `QuerySlot` represents one logical request stream, such as "the current
//! league search". Launching a new query cancels the one in flight, and a
//! cancelled query never publishes its result. Observers follow the slot through
//! a `watch` channel.

use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::api::FixtureFilter;
use crate::data::{Fixture, League, Team};
use crate::error::QueryResult;
use crate::repository::FootballRepository;

/// Delay applied to free-text searches so typing does not fire a request per key
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(300);

/// League shown when the team search box is empty (Premier League)
pub const DEFAULT_LEAGUE_ID: i64 = 39;

/// What an observer of a slot currently sees
#[derive(Debug, Clone, PartialEq)]
pub enum QueryState<T> {
    Idle,
    Loading,
    Success(Vec<T>),
    Error(String),
}

impl<T> QueryState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, QueryState::Loading)
    }
}

struct SlotInner<T> {
    state: watch::Sender<QueryState<T>>,
    /// Token of the query allowed to publish; guarded so cancel and publish never interleave
    current: Mutex<Option<CancellationToken>>,
}

impl<T> SlotInner<T> {
    /// Publishes `state` unless `token` has been superseded
    fn publish(&self, token: &CancellationToken, state: QueryState<T>) -> bool {
        let _current = self.current.lock().unwrap_or_else(|e| e.into_inner());
        if token.is_cancelled() {
            return false;
        }
        self.state.send_replace(state);
        true
    }
}

/// A single-occupancy query runner
pub struct QuerySlot<T> {
    inner: Arc<SlotInner<T>>,
}

impl<T: Clone + Send + Sync + 'static> Default for QuerySlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone + Send + Sync + 'static> QuerySlot<T> {
    pub fn new() -> Self {
        let (state, _) = watch::channel(QueryState::Idle);
        Self {
            inner: Arc::new(SlotInner {
                state,
                current: Mutex::new(None),
            }),
        }
    }

    /// Follows state changes of this slot
    pub fn subscribe(&self) -> watch::Receiver<QueryState<T>> {
        self.inner.state.subscribe()
    }

    /// The latest published state
    pub fn state(&self) -> QueryState<T> {
        self.inner.state.borrow().clone()
    }

    /// Cancels the query in flight, if any; the published state is left as is
    pub fn cancel(&self) {
        let mut current = self.inner.current.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(token) = current.take() {
            token.cancel();
        }
    }

    /// Cancels the previous query and runs `query` in its place
    ///
    /// With a `delay`, the query starts only if it has not been superseded by the
    /// time the delay elapses. Cancellation is checked after the delay, before
    /// `Loading` is published, and before the outcome is published.
    pub fn launch<F>(&self, delay: Option<Duration>, query: F) -> JoinHandle<()>
    where
        F: Future<Output = QueryResult<T>> + Send + 'static,
    {
        let token = CancellationToken::new();
        {
            let mut current = self.inner.current.lock().unwrap_or_else(|e| e.into_inner());
            if let Some(previous) = current.replace(token.clone()) {
                previous.cancel();
            }
        }

        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            if let Some(delay) = delay {
                tokio::select! {
                    _ = token.cancelled() => {
                        debug!("query superseded during debounce");
                        return;
                    }
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            if !inner.publish(&token, QueryState::Loading) {
                return;
            }

            let outcome = tokio::select! {
                _ = token.cancelled() => {
                    debug!("query cancelled in flight");
                    return;
                }
                outcome = query => outcome,
            };

            let state = match outcome {
                Ok(records) => QueryState::Success(records),
                Err(reason) => QueryState::Error(reason.to_string()),
            };
            if !inner.publish(&token, state) {
                debug!("dropping result of superseded query");
            }
        })
    }
}

/// The query slots of a browsing session
pub struct Session {
    repository: Arc<FootballRepository>,
    pub leagues: QuerySlot<League>,
    pub teams: QuerySlot<Team>,
    pub fixtures: QuerySlot<Fixture>,
}

impl Session {
    pub fn new(repository: Arc<FootballRepository>) -> Self {
        Self {
            repository,
            leagues: QuerySlot::new(),
            teams: QuerySlot::new(),
            fixtures: QuerySlot::new(),
        }
    }

    /// Searches leagues by name; a blank query lists all leagues instead
    pub fn search_leagues(&self, query: &str) -> JoinHandle<()> {
        let query = query.trim();
        if query.is_empty() {
            return self.load_all_leagues();
        }
        let repository = Arc::clone(&self.repository);
        let query = query.to_string();
        self.leagues.launch(Some(SEARCH_DEBOUNCE), async move {
            repository.search_leagues(&query).await
        })
    }

    pub fn load_all_leagues(&self) -> JoinHandle<()> {
        let repository = Arc::clone(&self.repository);
        self.leagues
            .launch(None, async move { repository.get_all_leagues().await })
    }

    /// Searches teams by name; a blank query shows the default league's teams
    pub fn search_teams(&self, query: &str) -> JoinHandle<()> {
        let query = query.trim();
        if query.is_empty() {
            return self.load_teams_by_league(DEFAULT_LEAGUE_ID, None);
        }
        let repository = Arc::clone(&self.repository);
        let query = query.to_string();
        self.teams.launch(Some(SEARCH_DEBOUNCE), async move {
            repository.search_teams(&query).await
        })
    }

    pub fn load_teams_by_league(&self, league_id: i64, season: Option<i32>) -> JoinHandle<()> {
        let repository = Arc::clone(&self.repository);
        self.teams.launch(None, async move {
            repository.get_teams_by_league(league_id, season).await
        })
    }

    pub fn load_fixtures(&self, filter: FixtureFilter) -> JoinHandle<()> {
        let repository = Arc::clone(&self.repository);
        self.fixtures
            .launch(None, async move { repository.get_fixtures(&filter).await })
    }
}
