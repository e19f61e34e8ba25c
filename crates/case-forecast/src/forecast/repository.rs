use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::domain::{CaseInput, Prediction};

/// Store-assigned, monotonically increasing record identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PredictionId(pub i64);

impl fmt::Display for PredictionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Immutable history entry: the scored case, its forecast, and store metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    pub id: PredictionId,
    #[serde(flatten)]
    pub case: CaseInput,
    #[serde(flatten)]
    pub prediction: Prediction,
    pub created_at: DateTime<Utc>,
    /// Reconciliation slot for the real verdict; never written by this crate.
    pub actual_outcome: Option<String>,
    pub resolved_at: Option<DateTime<Utc>>,
}

/// Per-category sums read from one snapshot of the store.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTotals {
    pub category: String,
    pub count: u64,
    pub probability_sum: f64,
    pub months_sum: u64,
}

/// Storage abstraction so the service can be exercised against fakes.
///
/// Implementations serialize `append` so identifiers stay unique and follow
/// commit order, and persist the record before returning it.
pub trait PredictionRepository: Send + Sync {
    fn append(
        &self,
        case: &CaseInput,
        prediction: &Prediction,
    ) -> Result<PredictionRecord, RepositoryError>;
    /// Most recent first, at most `limit` records.
    fn list_recent(&self, limit: usize) -> Result<Vec<PredictionRecord>, RepositoryError>;
    fn category_totals(&self) -> Result<Vec<CategoryTotals>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
    #[error("stored record is corrupt: {0}")]
    Corrupt(String),
}
