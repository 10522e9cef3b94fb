//! Error types for the planner.

use thiserror::Error;

use super::models::Day;

/// Errors that can occur while loading the lecture catalog.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CatalogError {
    /// Request could not be sent or the body could not be read
    #[error("Network error fetching {url}: {message}")]
    Network { url: String, message: String },

    /// Server answered with a non-success status
    #[error("Catalog request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    /// Body was not a JSON array of lectures
    #[error("Malformed catalog at {url}: {message}")]
    Decode { url: String, message: String },
}

impl CatalogError {
    /// Returns true if asking again may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            CatalogError::Network { .. } => true,
            CatalogError::Status { status, .. } => *status >= 500 || *status == 429,
            CatalogError::Decode { .. } => false,
        }
    }

    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            CatalogError::Status {
                url: url.to_owned(),
                status: status.as_u16(),
            }
        } else if err.is_decode() {
            CatalogError::Decode {
                url: url.to_owned(),
                message: err.to_string(),
            }
        } else {
            CatalogError::Network {
                url: url.to_owned(),
                message: err.to_string(),
            }
        }
    }
}

/// Rejected timetable operations. The store is left untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("Unknown table {0}")]
    UnknownTable(String),

    #[error("Cannot remove {0}: at least one table must remain")]
    LastTable(String),

    #[error("Table {table} has {len} slot(s), no slot at index {index}")]
    SlotIndexOutOfRange {
        table: String,
        index: usize,
        len: usize,
    },

    #[error("Slot {index} of table {table} has periods {range:?}, not a run of consecutive valid periods")]
    InvalidSlot {
        table: String,
        index: usize,
        range: Vec<u8>,
    },

    #[error("Moving {day} by {delta} day(s) leaves the week")]
    DayOutOfRange { day: Day, delta: i32 },

    #[error("Moving by {delta} period(s) puts the slot outside periods 1..={last}")]
    PeriodOutOfRange { delta: i32, last: u8 },
}

impl StoreError {
    /// Returns true if the caller referenced state that does not exist,
    /// as opposed to asking for a move or removal the rules forbid.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(
            self,
            StoreError::UnknownTable(_)
                | StoreError::SlotIndexOutOfRange { .. }
                | StoreError::InvalidSlot { .. }
        )
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Unknown day {0:?}, expected one of 월 화 수 목 금 or Mon..Fri")]
pub struct ParseDayError(pub String);
