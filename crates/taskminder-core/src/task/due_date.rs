//! Due-date normalization at the store boundary.
//!
//! Every due date entering the core goes through [`parse`] exactly once.
//! Fully-qualified RFC 3339 strings are converted to UTC. Strings without an
//! offset are matched by explicit format and either read as UTC or rejected,
//! depending on [`NaivePolicy`].

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Minute-precision local form, e.g. `2025-06-01T09:30`.
const NAIVE_MINUTES: &str = "%Y-%m-%dT%H:%M";
/// Second-precision local form, e.g. `2025-06-01T09:30:15`.
const NAIVE_SECONDS: &str = "%Y-%m-%dT%H:%M:%S";

/// How to treat due dates that carry no timezone offset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum NaivePolicy {
    /// Read the wall-clock value as UTC.
    #[default]
    AssumeUtc,
    /// Refuse the value with [`ValidationError::AmbiguousDueDate`].
    Reject,
}

/// Parse and normalize a due-date string into a UTC instant.
pub fn parse(input: &str, policy: NaivePolicy) -> Result<DateTime<Utc>, ValidationError> {
    let trimmed = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(trimmed, NAIVE_SECONDS)
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, NAIVE_MINUTES))
        .map_err(|_| ValidationError::MalformedDueDate {
            input: input.to_string(),
        })?;

    match policy {
        NaivePolicy::AssumeUtc => Ok(naive.and_utc()),
        NaivePolicy::Reject => Err(ValidationError::AmbiguousDueDate {
            input: input.to_string(),
        }),
    }
}

/// Render an instant in the canonical wire form (`2025-06-01T09:30:00Z`).
///
/// Sub-second precision is kept when present, so a parse of the output
/// gives back the same instant.
pub fn format(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}
