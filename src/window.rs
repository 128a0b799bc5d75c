// src/window.rs
use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

use crate::error::TagError;

/// Half-open time interval `[start, end)`. A missing bound is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Window {
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
}

impl Window {
    /// Bounded window; fails fast when `start >= end`.
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Result<Self, TagError> {
        if start >= end {
            return Err(TagError::MalformedWindow { start, end });
        }
        Ok(Self {
            start: Some(start),
            end: Some(end),
        })
    }

    /// No date filter at all.
    pub fn all_time() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// `[midnight(day), midnight(day) + 1 day)`.
    pub fn for_day(day: NaiveDate) -> Self {
        let start = midnight(day);
        Self {
            start: Some(start),
            end: Some(midnight(day.succ_opt().unwrap_or(NaiveDate::MAX))),
        }
    }

    /// The `days` whole calendar days before `today`:
    /// `[midnight(today - days), midnight(today))`. `days` is clamped to 1.
    pub fn trailing_days(today: NaiveDate, days: u32) -> Self {
        let first = today
            .checked_sub_days(Days::new(u64::from(days.max(1))))
            .unwrap_or(NaiveDate::MIN);
        Self {
            start: Some(midnight(first)),
            end: Some(midnight(today)),
        }
    }

    pub fn start(&self) -> Option<NaiveDateTime> {
        self.start
    }

    pub fn end(&self) -> Option<NaiveDateTime> {
        self.end
    }

    pub fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Membership test for a record date. An undated record only belongs to
    /// the all-time window.
    pub fn contains(&self, date: Option<NaiveDateTime>) -> bool {
        match date {
            Some(ts) => {
                self.start.map_or(true, |s| ts >= s) && self.end.map_or(true, |e| ts < e)
            }
            None => self.is_unbounded(),
        }
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.start, self.end) {
            (None, None) => write!(f, "[all time)"),
            (s, e) => write!(
                f,
                "[{}, {})",
                s.map_or_else(|| "-inf".to_string(), |t| t.to_string()),
                e.map_or_else(|| "+inf".to_string(), |t| t.to_string())
            ),
        }
    }
}

fn midnight(day: NaiveDate) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN)
}
