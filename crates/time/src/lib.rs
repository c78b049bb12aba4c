//! sylva-time: calendar-derived context values.
//!
//! A [`TimeValue`] pins an instant to a UTC offset and exposes the fixed
//! set of calendar fields that decision trees can branch on (time of day,
//! day of week, day of month, month of year, offset string). The
//! interpreter only ever reads these fields; it never builds a
//! `TimeValue` itself.

pub mod error;
pub mod offset;
pub mod value;

pub use error::TimeError;
pub use offset::{format_offset, parse_offset};
pub use value::{TimeFields, TimeValue};
