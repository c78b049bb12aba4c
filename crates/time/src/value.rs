//! The time value consumed by decision contexts.

use serde_json::{json, Map, Value};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{OffsetDateTime, UtcOffset};

use crate::error::TimeError;
use crate::offset::{format_offset, parse_offset};

/// The fixed record of calendar fields derived from a [`TimeValue`].
///
/// Field names match the property types a tree configuration can declare,
/// so a generated property is looked up here by its type name.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeFields {
    /// Seconds since the UNIX epoch.
    pub timestamp: i64,
    /// UTC offset as `+HH:MM`.
    pub timezone: String,
    /// Hours since local midnight, in `[0, 24)`.
    pub time_of_day: f64,
    /// Monday is 0, Sunday is 6.
    pub day_of_week: u8,
    /// In `[1, 31]`.
    pub day_of_month: u8,
    /// In `[1, 12]`.
    pub month_of_year: u8,
    /// ISO 8601 rendering in the value's own offset.
    pub utc_iso: String,
}

impl TimeFields {
    /// Render the fields as a JSON object, ready to be merged into a
    /// context mapping.
    pub fn to_json_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("timestamp".to_string(), json!(self.timestamp));
        map.insert("timezone".to_string(), json!(self.timezone));
        map.insert("time_of_day".to_string(), json!(self.time_of_day));
        map.insert("day_of_week".to_string(), json!(self.day_of_week));
        map.insert("day_of_month".to_string(), json!(self.day_of_month));
        map.insert("month_of_year".to_string(), json!(self.month_of_year));
        map.insert("utc_iso".to_string(), json!(self.utc_iso));
        map
    }
}

/// An instant pinned to a UTC offset. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeValue {
    datetime: OffsetDateTime,
}

impl TimeValue {
    /// Build from a UNIX timestamp.
    ///
    /// Without an explicit offset the host's local offset is used, or UTC
    /// when the local offset cannot be determined.
    pub fn from_timestamp(timestamp: i64, offset: Option<&str>) -> Result<TimeValue, TimeError> {
        let invalid = |message: String| TimeError::InvalidTimestamp { timestamp, message };

        let utc = OffsetDateTime::from_unix_timestamp(timestamp)
            .map_err(|e| invalid(e.to_string()))?;
        let target = match offset {
            Some(raw) => parse_offset(raw)?,
            None => local_offset(),
        };
        let datetime = utc
            .checked_to_offset(target)
            .ok_or_else(|| invalid("date out of range once shifted to offset".to_string()))?;
        Ok(TimeValue { datetime })
    }

    /// Parse an ISO 8601 date-time carrying its own offset.
    ///
    /// Accepts RFC 3339 (`2017-01-01T10:00:00+01:00`, `...Z`) as well as
    /// the compact `+HHMM` offset form. When `offset` is given the instant
    /// is converted to it; otherwise the parsed offset is kept.
    pub fn parse(input: &str, offset: Option<&str>) -> Result<TimeValue, TimeError> {
        let compact = format_description!(
            "[year]-[month]-[day]T[hour]:[minute]:[second][offset_hour sign:mandatory][offset_minute]"
        );
        let parsed = OffsetDateTime::parse(input, &Rfc3339)
            .or_else(|_| OffsetDateTime::parse(input, compact))
            .map_err(|e| TimeError::InvalidIso {
                input: input.to_string(),
                message: e.to_string(),
            })?;

        let datetime = match offset {
            Some(raw) => {
                let target = parse_offset(raw)?;
                parsed
                    .checked_to_offset(target)
                    .ok_or_else(|| TimeError::InvalidIso {
                        input: input.to_string(),
                        message: format!("date out of range once shifted to {}", raw),
                    })?
            }
            None => parsed,
        };
        Ok(TimeValue { datetime })
    }

    /// The current instant, in the given offset or the host's local one.
    pub fn now(offset: Option<&str>) -> Result<TimeValue, TimeError> {
        let now = OffsetDateTime::now_utc();
        let target = match offset {
            Some(raw) => parse_offset(raw)?,
            None => local_offset(),
        };
        Ok(TimeValue {
            datetime: now.to_offset(target),
        })
    }

    pub fn datetime(&self) -> OffsetDateTime {
        self.datetime
    }

    pub fn offset(&self) -> UtcOffset {
        self.datetime.offset()
    }

    pub fn timestamp(&self) -> i64 {
        self.datetime.unix_timestamp()
    }

    pub fn time_of_day(&self) -> f64 {
        f64::from(self.datetime.hour())
            + f64::from(self.datetime.minute()) / 60.0
            + f64::from(self.datetime.second()) / 3600.0
    }

    pub fn day_of_week(&self) -> u8 {
        self.datetime.weekday().number_days_from_monday()
    }

    pub fn day_of_month(&self) -> u8 {
        self.datetime.day()
    }

    pub fn month_of_year(&self) -> u8 {
        u8::from(self.datetime.month())
    }

    pub fn timezone(&self) -> String {
        format_offset(self.datetime.offset())
    }

    /// ISO 8601 rendering with a `+HH:MM` offset, never `Z`.
    pub fn utc_iso(&self) -> String {
        format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}{}",
            self.datetime.year(),
            u8::from(self.datetime.month()),
            self.datetime.day(),
            self.datetime.hour(),
            self.datetime.minute(),
            self.datetime.second(),
            self.timezone()
        )
    }

    pub fn fields(&self) -> TimeFields {
        TimeFields {
            timestamp: self.timestamp(),
            timezone: self.timezone(),
            time_of_day: self.time_of_day(),
            day_of_week: self.day_of_week(),
            day_of_month: self.day_of_month(),
            month_of_year: self.month_of_year(),
            utc_iso: self.utc_iso(),
        }
    }

    pub fn to_json_map(&self) -> Map<String, Value> {
        self.fields().to_json_map()
    }
}

fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}
