//! Human-readable order numbers.
//!
//! Format: `<PREFIX>-<YYYYMMDD>-<NNNN>`
//!
//! - `YYYYMMDD` is the UTC calendar date of the order's creation time
//! - `NNNN` is the 1-based position of the order within that UTC day,
//!   zero-padded to four digits (it widens past 9999 rather than wrapping)
//!
//! Generation is pure arithmetic over a timestamp and the number of orders
//! already recorded that day. Uniqueness depends on the caller reading that
//! count and inserting under one lock; see the order stores in
//! `storefront-checkout`.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Prefix used when none is configured.
pub const DEFAULT_ORDER_PREFIX: &str = "AUD";

/// Minimum width of the sequence segment.
pub const SEQUENCE_WIDTH: usize = 4;

const DATE_FORMAT: &str = "%Y%m%d";

/// Errors from parsing an order number.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OrderNumberError {
    /// The string does not have three `-`-separated segments.
    #[error("Malformed order number: {0}")]
    Malformed(String),

    /// The date segment is not a real `YYYYMMDD` date.
    #[error("Invalid date segment in order number: {0}")]
    InvalidDate(String),

    /// The sequence segment is not a positive number of at least four digits.
    #[error("Invalid sequence segment in order number: {0}")]
    InvalidSequence(String),
}

/// Date-scoped sequential order identifier, e.g. `AUD-20240301-0004`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderNumber(String);

impl OrderNumber {
    /// Derive the order number for an order created at `created_at` when
    /// `orders_so_far_today` orders already exist on the same UTC day.
    #[must_use]
    pub fn generate(prefix: &str, created_at: DateTime<Utc>, orders_so_far_today: u64) -> Self {
        let sequence = orders_so_far_today.saturating_add(1);
        Self(format!(
            "{prefix}-{}-{sequence:0width$}",
            created_at.format(DATE_FORMAT),
            width = SEQUENCE_WIDTH,
        ))
    }

    /// Parse and check an order number read back from storage.
    ///
    /// The prefix may itself contain `-`; the date and sequence are taken from
    /// the right.
    ///
    /// # Errors
    ///
    /// Returns [`OrderNumberError`] if any segment is missing or malformed.
    pub fn parse(value: &str) -> Result<Self, OrderNumberError> {
        let mut segments = value.rsplitn(3, '-');
        let (Some(sequence), Some(date), Some(prefix)) =
            (segments.next(), segments.next(), segments.next())
        else {
            return Err(OrderNumberError::Malformed(value.to_string()));
        };

        if prefix.is_empty() {
            return Err(OrderNumberError::Malformed(value.to_string()));
        }

        if date.len() != 8 || NaiveDate::parse_from_str(date, DATE_FORMAT).is_err() {
            return Err(OrderNumberError::InvalidDate(value.to_string()));
        }

        let sequence_ok = sequence.len() >= SEQUENCE_WIDTH
            && sequence.bytes().all(|b| b.is_ascii_digit())
            && sequence.parse::<u64>().is_ok_and(|n| n > 0);
        if !sequence_ok {
            return Err(OrderNumberError::InvalidSequence(value.to_string()));
        }

        Ok(Self(value.to_string()))
    }

    /// The number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The prefix segment.
    #[must_use]
    pub fn prefix(&self) -> &str {
        self.0
            .rsplitn(3, '-')
            .nth(2)
            .unwrap_or_default()
    }

    /// The UTC date segment.
    #[must_use]
    pub fn date(&self) -> Option<NaiveDate> {
        self.0
            .rsplitn(3, '-')
            .nth(1)
            .and_then(|d| NaiveDate::parse_from_str(d, DATE_FORMAT).ok())
    }

    /// The 1-based sequence within the day.
    #[must_use]
    pub fn sequence(&self) -> Option<u64> {
        self.0.rsplit('-').next().and_then(|s| s.parse().ok())
    }
}

impl fmt::Display for OrderNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OrderNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Half-open `[start, end)` bounds of the UTC calendar day containing `ts`.
#[must_use]
pub fn utc_day_bounds(ts: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = ts.date_naive().and_time(NaiveTime::MIN).and_utc();
    (start, start + Duration::days(1))
}
