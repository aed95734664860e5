//! Unified error hierarchy for the fitness trend engine
//!
//! Precondition violations are never recovered from inside the engine: they
//! propagate to the caller with enough context to locate the offending day or
//! activity. Presentation-level failures (unknown column, export) are kept
//! separate so consumers can report them without aborting a view.

use chrono::NaiveDate;
use thiserror::Error;

use crate::export::ExportError;

/// Top-level error type for all fitness trend operations
#[derive(Debug, Error)]
pub enum TrendError {
    /// Input data violates an ordering or shape precondition
    #[error("Precondition violation: {0}")]
    Precondition(#[from] PreconditionError),

    /// Table column or sort key that is not part of the column mapping
    #[error("Unknown column: {0}")]
    UnknownColumn(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),
}

/// Precondition violations detected while building a trend
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PreconditionError {
    /// A day appears before a day it should follow
    #[error("days out of order: {current} follows {previous}")]
    Unsorted {
        previous: NaiveDate,
        current: NaiveDate,
    },

    /// The same calendar day appears twice
    #[error("duplicate day: {date}")]
    DuplicateDate { date: NaiveDate },

    /// Calendar days are missing between two consecutive records
    #[error("missing day(s) between {previous} and {current}")]
    Gap {
        previous: NaiveDate,
        current: NaiveDate,
    },

    /// Activity cannot be placed on a calendar day
    #[error("activity {activity_id} has no start time")]
    MissingStartTime { activity_id: String },

    /// Day record breaks the shape invariants of a daily stress record
    #[error("invalid day record {date}: {reason}")]
    InvalidDay { date: NaiveDate, reason: String },

    /// Date arithmetic left the supported calendar range
    #[error("date out of range after {date}")]
    DateOutOfRange { date: NaiveDate },
}

/// Result type alias for fitness trend operations
pub type Result<T> = std::result::Result<T, TrendError>;

impl TrendError {
    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            TrendError::Precondition(PreconditionError::MissingStartTime { activity_id }) => {
                format!(
                    "Activity {} has no start time and cannot be placed in the fitness trend.",
                    activity_id
                )
            }
            TrendError::Precondition(PreconditionError::Unsorted { .. })
            | TrendError::Precondition(PreconditionError::DuplicateDate { .. })
            | TrendError::Precondition(PreconditionError::Gap { .. }) => {
                format!("Daily records must cover consecutive days in ascending order ({})", self)
            }
            TrendError::UnknownColumn(column) => {
                format!("Column '{}' is not available in the fitness trend table.", column)
            }
            TrendError::Export(err) => format!("Unable to export fitness trend: {}", err),
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_violations_share_message() {
        let err = TrendError::from(PreconditionError::DuplicateDate {
            date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        });
        let message = err.user_message();
        assert!(message.starts_with("Daily records must cover consecutive days"));
        assert!(message.contains("duplicate day: 2024-03-01"));

        let err = TrendError::Configuration("bad horizon".to_string());
        assert_eq!(err.user_message(), "Configuration error: bad horizon");
    }

    #[test]
    fn test_user_messages() {
        let err = TrendError::Precondition(PreconditionError::MissingStartTime {
            activity_id: "a1".to_string(),
        });
        assert!(err.user_message().contains("a1"));
        assert!(err.user_message().contains("no start time"));

        let err = TrendError::UnknownColumn("pace".to_string());
        assert!(err.user_message().contains("'pace'"));
    }

    #[test]
    fn test_precondition_display() {
        let err = PreconditionError::Gap {
            previous: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            current: NaiveDate::from_ymd_opt(2024, 3, 4).unwrap(),
        };
        assert_eq!(err.to_string(), "missing day(s) between 2024-03-01 and 2024-03-04");
    }
}
