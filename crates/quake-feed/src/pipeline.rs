//! Fetch, filter and transform in one call.
//!
//! The pipeline keeps no data between runs: every run re-fetches the whole
//! batch, so a filter is never applied to stale events.

use crate::filter::apply_filters;
use crate::traits::EventSource;
use crate::transformer::{distinct_places, to_display_list_in};
use chrono::{Local, NaiveDate, TimeZone, Utc};
use quake_common::{DisplayEvent, FilterState, PlaceSet, Result};
use tracing::{debug, instrument};

/// Fetch-filter-transform pipeline over an [`EventSource`].
pub struct FeedPipeline<S, Tz: TimeZone = Local> {
    source: S,
    tz: Tz,
    fixed_today: Option<NaiveDate>,
}

impl<S: EventSource> FeedPipeline<S, Local> {
    /// Pipeline formatting times in the system time zone.
    pub fn new(source: S) -> Self {
        Self::with_timezone(source, Local)
    }
}

impl<S, Tz> FeedPipeline<S, Tz>
where
    S: EventSource,
    Tz: TimeZone + Send + Sync,
    Tz::Offset: std::fmt::Display + Send + Sync,
{
    /// Pipeline formatting times and evaluating date ranges in `tz`.
    pub fn with_timezone(source: S, tz: Tz) -> Self {
        Self {
            source,
            tz,
            fixed_today: None,
        }
    }

    /// Pins the end of every date range to `today` instead of the wall clock.
    #[must_use]
    pub fn with_fixed_today(mut self, today: NaiveDate) -> Self {
        self.fixed_today = Some(today);
        self
    }

    /// The underlying source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// End of the filter window: today in the pipeline's time zone.
    pub fn today(&self) -> NaiveDate {
        self.fixed_today
            .unwrap_or_else(|| Utc::now().with_timezone(&self.tz).date_naive())
    }

    /// Fetches a fresh batch, applies `filter` and builds the display list.
    #[instrument(skip(self), fields(source = self.source.name(), filter = %filter))]
    pub async fn run(&self, filter: &FilterState) -> Result<Vec<DisplayEvent>> {
        let batch = self.source.fetch().await?;
        let fetched = batch.len();

        let filtered = apply_filters(batch, filter, self.today(), &self.tz);
        debug!(fetched, kept = filtered.len(), "Applied filters");

        Ok(to_display_list_in(&filtered, &self.tz))
    }

    /// Fetches a fresh batch and returns its distinct regions.
    #[instrument(skip(self), fields(source = self.source.name()))]
    pub async fn places(&self) -> Result<PlaceSet> {
        let batch = self.source.fetch().await?;
        Ok(distinct_places(&batch))
    }
}
