//! Conversion of epoch-relative wire values into calendar types.
//!
//! Every temporal wire value is an offset from 2000-01-01T00:00:00Z. Durations
//! (timespan, minute, second, time) are always representable. Instants and
//! dates carry q's null and infinity sentinels as [`Temporal`] variants; the
//! conversion functions return `None` only for an ordinary offset that falls
//! outside chrono's calendar.

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, TimeZone, Utc};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// A calendar value, or one of q's null/infinity sentinels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Temporal<T> {
    Value(T),
    /// `0N`: the minimum integer, or NaN for datetimes.
    Null,
    /// `0W`: the maximum integer, or +inf for datetimes.
    Infinity,
    /// `-0W`: the negated maximum integer, or -inf for datetimes.
    NegInfinity,
}

impl<T> Temporal<T> {
    pub fn value(&self) -> Option<&T> {
        match self {
            Temporal::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Temporal::Null)
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, Temporal::Infinity | Temporal::NegInfinity)
    }
}

/// A calendar month (year and 1-based month number).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Month {
    pub year: i32,
    /// 1 = January.
    pub month: u32,
}

impl std::fmt::Display for Month {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}.{:02}m", self.year, self.month)
    }
}

fn int_sentinel<T>(raw: i32) -> Option<Temporal<T>> {
    match raw {
        i32::MIN => Some(Temporal::Null),
        i32::MAX => Some(Temporal::Infinity),
        raw if raw == -i32::MAX => Some(Temporal::NegInfinity),
        _ => None,
    }
}

fn long_sentinel<T>(raw: i64) -> Option<Temporal<T>> {
    match raw {
        i64::MIN => Some(Temporal::Null),
        i64::MAX => Some(Temporal::Infinity),
        raw if raw == -i64::MAX => Some(Temporal::NegInfinity),
        _ => None,
    }
}

fn float_sentinel<T>(raw: f64) -> Option<Temporal<T>> {
    if raw.is_nan() {
        Some(Temporal::Null)
    } else if raw == f64::INFINITY {
        Some(Temporal::Infinity)
    } else if raw == f64::NEG_INFINITY {
        Some(Temporal::NegInfinity)
    } else {
        None
    }
}

/// Calendar date of the epoch.
pub fn epoch_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).unwrap_or_default()
}

/// The epoch instant, 2000-01-01T00:00:00Z.
pub fn epoch() -> DateTime<Utc> {
    Utc.from_utc_datetime(&epoch_date().and_time(NaiveTime::default()))
}

/// Nanoseconds since the epoch.
pub fn timestamp(nanos: i64) -> Option<Temporal<DateTime<Utc>>> {
    if let Some(sentinel) = long_sentinel(nanos) {
        return Some(sentinel);
    }
    epoch()
        .checked_add_signed(TimeDelta::nanoseconds(nanos))
        .map(Temporal::Value)
}

/// Whole months since 2000.01.
pub fn month(months: i32) -> Month {
    Month {
        year: 2000 + months.div_euclid(12),
        month: months.rem_euclid(12) as u32 + 1,
    }
}

/// Whole days since 2000.01.01.
pub fn date(days: i32) -> Option<Temporal<NaiveDate>> {
    if let Some(sentinel) = int_sentinel(days) {
        return Some(sentinel);
    }
    epoch_date()
        .checked_add_signed(TimeDelta::days(i64::from(days)))
        .map(Temporal::Value)
}

/// Fractional days since the epoch, resolved to the nearest millisecond.
pub fn datetime(days: f64) -> Option<Temporal<DateTime<Utc>>> {
    if let Some(sentinel) = float_sentinel(days) {
        return Some(sentinel);
    }
    let millis = (days * MILLIS_PER_DAY).round();
    if !millis.is_finite() || millis.abs() >= i64::MAX as f64 {
        return None;
    }
    let delta = TimeDelta::try_milliseconds(millis as i64)?;
    epoch().checked_add_signed(delta).map(Temporal::Value)
}

pub fn timespan(nanos: i64) -> TimeDelta {
    TimeDelta::nanoseconds(nanos)
}

pub fn minute(minutes: i32) -> TimeDelta {
    TimeDelta::minutes(i64::from(minutes))
}

pub fn second(seconds: i32) -> TimeDelta {
    TimeDelta::seconds(i64::from(seconds))
}

/// Milliseconds since midnight.
pub fn time(millis: i32) -> TimeDelta {
    TimeDelta::milliseconds(i64::from(millis))
}
