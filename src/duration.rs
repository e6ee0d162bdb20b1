//! A signed duration with service-friendly text forms (`42ms`, `2mins`).
//!
//! Flag values arrive as text, so [`Duration`] defines both directions of the
//! conversion: parsing accepts a decimal scalar followed by a unit suffix,
//! and [`Display`](std::fmt::Display) renders the canonical form using the
//! largest unit that divides the nanosecond count evenly. Parsing the
//! rendered form always reproduces the original value.

use std::fmt;
use std::str::FromStr;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValueError;

const NS_PER_US: i64 = 1_000;
const NS_PER_MS: i64 = 1_000_000;
const NS_PER_SEC: i64 = 1_000_000_000;
const NS_PER_MIN: i64 = 60 * NS_PER_SEC;
const NS_PER_HR: i64 = 60 * NS_PER_MIN;
const NS_PER_DAY: i64 = 24 * NS_PER_HR;
const NS_PER_WEEK: i64 = 7 * NS_PER_DAY;

/// Unit suffixes in ascending order of magnitude.
const UNITS: [(&str, i64); 8] = [
    ("ns", 1),
    ("us", NS_PER_US),
    ("ms", NS_PER_MS),
    ("secs", NS_PER_SEC),
    ("mins", NS_PER_MIN),
    ("hrs", NS_PER_HR),
    ("days", NS_PER_DAY),
    ("weeks", NS_PER_WEEK),
];

/// A signed span of time with nanosecond resolution.
///
/// Stored as an `i64` nanosecond count, which spans roughly ±292 years.
/// Constructors saturate instead of overflowing. Negative durations can be
/// represented and rendered but not parsed; flag input is non-negative.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Duration {
    ns: i64,
}

impl Duration {
    pub const fn nanoseconds(ns: i64) -> Self {
        Self { ns }
    }

    pub const fn microseconds(us: i64) -> Self {
        Self { ns: us.saturating_mul(NS_PER_US) }
    }

    pub const fn milliseconds(ms: i64) -> Self {
        Self { ns: ms.saturating_mul(NS_PER_MS) }
    }

    pub const fn seconds(secs: i64) -> Self {
        Self { ns: secs.saturating_mul(NS_PER_SEC) }
    }

    pub const fn minutes(mins: i64) -> Self {
        Self { ns: mins.saturating_mul(NS_PER_MIN) }
    }

    pub const fn hours(hrs: i64) -> Self {
        Self { ns: hrs.saturating_mul(NS_PER_HR) }
    }

    pub const fn days(days: i64) -> Self {
        Self { ns: days.saturating_mul(NS_PER_DAY) }
    }

    pub const fn weeks(weeks: i64) -> Self {
        Self { ns: weeks.saturating_mul(NS_PER_WEEK) }
    }

    /// The raw nanosecond count.
    pub const fn as_nanos(self) -> i64 {
        self.ns
    }

    /// Converts to [`std::time::Duration`]. `None` for negative durations.
    pub const fn to_std(self) -> Option<std::time::Duration> {
        if self.ns < 0 {
            None
        } else {
            Some(std::time::Duration::from_nanos(self.ns as u64))
        }
    }

    /// Parses text like `10secs` or `1.5mins`: a decimal scalar followed by
    /// one of `ns`, `us`, `ms`, `secs`, `mins`, `hrs`, `days`, `weeks`.
    pub fn parse(text: &str) -> Result<Self, ValueError> {
        // The scalar is the longest leading run of digits and '.'; whatever
        // follows must be a known unit suffix.
        let unit_start = text
            .find(|c: char| !c.is_ascii_digit() && c != '.')
            .ok_or_else(|| ValueError::new(format!("Invalid duration '{text}': missing unit")))?;

        let (scalar, unit) = text.split_at(unit_start);
        if scalar.is_empty() {
            return Err(ValueError::new(format!(
                "Invalid duration '{text}': expected a leading number"
            )));
        }

        let value: f64 = scalar
            .parse()
            .map_err(|_| ValueError::new(format!("Invalid duration scalar '{scalar}'")))?;

        let Some((_, factor)) = UNITS.iter().find(|(suffix, _)| *suffix == unit) else {
            return Err(ValueError::new(format!("Unknown duration unit '{unit}'")));
        };

        let ns = value * *factor as f64;
        if !ns.is_finite() || ns < i64::MIN as f64 || ns > i64::MAX as f64 {
            return Err(ValueError::new(format!(
                "Duration '{text}' exceeds the representable range"
            )));
        }

        Ok(Self { ns: ns as i64 })
    }
}

impl fmt::Display for Duration {
    /// Renders using the largest unit that divides the count evenly, so
    /// `Duration::minutes(2)` is `2mins` and `Duration::milliseconds(42)` is
    /// `42ms`. Zero is `0ns`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let magnitude = self.ns.unsigned_abs();
        if magnitude == 0 {
            return write!(f, "0ns");
        }

        let sign = if self.ns < 0 { "-" } else { "" };
        let (suffix, factor) = UNITS
            .iter()
            .rev()
            .find(|(_, factor)| magnitude % factor.unsigned_abs() == 0)
            .unwrap_or(&UNITS[0]);

        write!(f, "{sign}{}{suffix}", magnitude / factor.unsigned_abs())
    }
}

impl FromStr for Duration {
    type Err = ValueError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Self::parse(text)
    }
}

impl Serialize for Duration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Duration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(D::Error::custom)
    }
}
