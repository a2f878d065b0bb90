use chrono::{Duration, NaiveDate};
use thiserror::Error;

use crate::models::NormalizedRecord;

pub const ALL_PLAYERS: &str = "All";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("a date range needs both a start and an end date ({0} given)")]
    MissingBound(usize),
    #[error("date range starts on {start} but ends earlier on {end}")]
    InvertedRange { start: NaiveDate, end: NaiveDate },
}

/// Inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, FilterError> {
        if start > end {
            return Err(FilterError::InvertedRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Exactly two bounds, as picked in a date-range widget.
    pub fn from_bounds(bounds: &[NaiveDate]) -> Result<Self, FilterError> {
        match bounds {
            [start, end] => Self::new(*start, *end),
            other => Err(FilterError::MissingBound(other.len())),
        }
    }

    pub fn day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    /// `[end - days, end]`, clamped to the earliest representable date.
    pub fn trailing(end: NaiveDate, days: i64) -> Self {
        let start = Duration::try_days(days.max(0))
            .and_then(|span| end.checked_sub_signed(span))
            .unwrap_or(NaiveDate::MIN);
        Self { start, end }
    }

    /// Uses the given bounds when both are present, the trailing window
    /// ending on the latest record when neither is. A single bound is an
    /// input error. `None` means there are no records to anchor a window on.
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        records: &[NormalizedRecord],
        default_days: i64,
    ) -> Result<Option<Self>, FilterError> {
        match (start, end) {
            (Some(start), Some(end)) => Self::new(start, end).map(Some),
            (None, None) => {
                let latest = latest_date(records);
                Ok(latest.map(|last| Self::trailing(last, default_days)))
            }
            (Some(_), None) | (None, Some(_)) => Err(FilterError::MissingBound(1)),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerFilter {
    All,
    Only(String),
    AnyOf(Vec<String>),
}

impl PlayerFilter {
    /// `"All"` (any case) or no name selects everyone; anything else is an
    /// exact player name.
    pub fn parse(name: Option<&str>) -> Self {
        match name {
            None => PlayerFilter::All,
            Some(name) if name.eq_ignore_ascii_case(ALL_PLAYERS) => PlayerFilter::All,
            Some(name) => PlayerFilter::Only(name.to_string()),
        }
    }

    pub fn matches(&self, player: &str) -> bool {
        match self {
            PlayerFilter::All => true,
            PlayerFilter::Only(name) => name == player,
            PlayerFilter::AnyOf(names) => names.iter().any(|name| name == player),
        }
    }

    pub fn label(&self) -> String {
        match self {
            PlayerFilter::All => ALL_PLAYERS.to_string(),
            PlayerFilter::Only(name) => name.clone(),
            PlayerFilter::AnyOf(names) => names.join(", "),
        }
    }
}

pub fn latest_date(records: &[NormalizedRecord]) -> Option<NaiveDate> {
    records.iter().map(|record| record.date).max()
}

pub fn filter(
    records: &[NormalizedRecord],
    range: &DateRange,
    players: &PlayerFilter,
) -> Vec<NormalizedRecord> {
    records
        .iter()
        .filter(|record| range.contains(record.date) && players.matches(&record.player))
        .cloned()
        .collect()
}

/// Sorted distinct player names, for populating a selector.
pub fn players(records: &[NormalizedRecord]) -> Vec<String> {
    let mut names: Vec<String> = records.iter().map(|record| record.player.clone()).collect();
    names.sort();
    names.dedup();
    names
}
