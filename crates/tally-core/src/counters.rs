//! Counters document model.
//!
//! A single shared document holds every global counter. Counters are only
//! ever changed through signed deltas; the absolute value is owned by the
//! store.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{Result, TallyError};

/// Document that holds the global counters unless configured otherwise.
pub const DEFAULT_COUNTERS_DOCUMENT: &str = "metrics/global";

/// Field stamped with the store's clock on every successful merge.
pub const LAST_UPDATED_FIELD: &str = "lastUpdated";

/// Named counter inside the counters document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterField {
    TotalUsers,
    TotalReceipts,
}

impl CounterField {
    pub const ALL: [CounterField; 2] = [CounterField::TotalUsers, CounterField::TotalReceipts];

    /// Field name as stored in the document.
    pub fn as_str(self) -> &'static str {
        match self {
            CounterField::TotalUsers => "totalUsers",
            CounterField::TotalReceipts => "totalReceipts",
        }
    }
}

impl fmt::Display for CounterField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CounterField {
    type Err = TallyError;

    fn from_str(s: &str) -> Result<Self> {
        CounterField::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| TallyError::BadRequest(format!("unknown counter: {s}")))
    }
}

/// Signed change to one counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Delta {
    pub field: CounterField,
    pub amount: i64,
}

impl Delta {
    pub fn new(field: CounterField, amount: i64) -> Self {
        Self { field, amount }
    }

    pub fn increment(field: CounterField) -> Self {
        Self::new(field, 1)
    }

    pub fn decrement(field: CounterField) -> Self {
        Self::new(field, -1)
    }
}

/// Read view of the counters document.
///
/// Counters are not clamped: a decrement delivered before its matching
/// increment (or a duplicated decrement) can push a value below zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CountersDocument {
    pub total_users: i64,
    pub total_receipts: i64,
    pub last_updated: Option<DateTime<Utc>>,
}

impl CountersDocument {
    /// Build the view from raw stored fields. Missing counters read as 0.
    pub fn from_fields(
        numbers: &BTreeMap<String, i64>,
        timestamps: &BTreeMap<String, DateTime<Utc>>,
    ) -> Self {
        let get = |f: CounterField| numbers.get(f.as_str()).copied().unwrap_or(0);
        Self {
            total_users: get(CounterField::TotalUsers),
            total_receipts: get(CounterField::TotalReceipts),
            last_updated: timestamps.get(LAST_UPDATED_FIELD).copied(),
        }
    }

    pub fn get(&self, field: CounterField) -> i64 {
        match field {
            CounterField::TotalUsers => self.total_users,
            CounterField::TotalReceipts => self.total_receipts,
        }
    }
}
