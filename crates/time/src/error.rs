/// Errors raised while constructing a [`TimeValue`](crate::TimeValue).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TimeError {
    /// The UNIX timestamp cannot be represented as a calendar date.
    #[error("unable to instantiate time from timestamp {timestamp}: {message}")]
    InvalidTimestamp { timestamp: i64, message: String },

    /// The string is not an ISO 8601 date-time with a UTC offset.
    #[error("unable to instantiate time from '{input}': {message}")]
    InvalidIso { input: String, message: String },

    /// The offset is not of the form `+HH:MM` or `+HHMM`.
    #[error("'{input}' is not a valid UTC offset, expected +HH:MM or +HHMM")]
    InvalidOffset { input: String },
}
