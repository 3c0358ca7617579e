//! Football season resolution
//!
//! European seasons straddle two calendar years and are named after the year
//! they start in. The free API plan only serves a fixed window of seasons.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};

use crate::clock::{Clock, SystemClock};

/// First month (1-based) that belongs to the season starting this year
pub const SEASON_START_MONTH: u32 = 7;

/// Oldest season the API serves
pub const MIN_SUPPORTED_SEASON: i32 = 2022;

/// Newest season the API serves
pub const MAX_SUPPORTED_SEASON: i32 = 2024;

/// Returns the season a date falls in, limited to the supported window
///
/// Dates from July onwards belong to the season starting that year, earlier
/// dates to the previous one. Seasons outside the window resolve to the newest
/// supported season.
pub fn season_for(date: NaiveDate) -> i32 {
    let season = if date.month() >= SEASON_START_MONTH {
        date.year()
    } else {
        date.year() - 1
    };

    if (MIN_SUPPORTED_SEASON..=MAX_SUPPORTED_SEASON).contains(&season) {
        season
    } else {
        MAX_SUPPORTED_SEASON
    }
}

/// Resolves the current season from a clock
#[derive(Debug, Clone)]
pub struct SeasonCalculator {
    clock: Arc<dyn Clock>,
}

impl Default for SeasonCalculator {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl SeasonCalculator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// The season in progress according to the clock
    pub fn current_season(&self) -> i32 {
        season_for(self.clock.now().date_naive())
    }
}
