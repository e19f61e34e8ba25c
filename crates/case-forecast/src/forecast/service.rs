use std::num::NonZeroUsize;
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use super::catalog::{CategoryProfile, CategoryTable};
use super::domain::{CaseInput, InputError, Prediction};
use super::repository::{PredictionRecord, PredictionRepository, RepositoryError};
use super::scoring::ScoringEngine;
use super::stats::PredictionStatistics;
use crate::config::DEFAULT_HISTORY_LIMIT;

/// Service composing the category table, scoring engine, and prediction store.
pub struct CaseForecastService<R> {
    engine: Arc<ScoringEngine>,
    repository: Arc<R>,
    history_limit: NonZeroUsize,
}

impl<R> CaseForecastService<R>
where
    R: PredictionRepository + 'static,
{
    pub fn new(repository: Arc<R>, table: Arc<CategoryTable>) -> Self {
        Self {
            engine: Arc::new(ScoringEngine::new(table)),
            repository,
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Limit applied when history callers do not pass one.
    pub fn with_history_limit(mut self, limit: NonZeroUsize) -> Self {
        self.history_limit = limit;
        self
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    /// Score a case, append it to the history, and return the forecast.
    ///
    /// Nothing is recorded when validation fails; a store failure is returned
    /// without retrying.
    pub fn score_and_record(&self, mut case: CaseInput) -> Result<Prediction, ForecastServiceError> {
        case.validate()?;
        case.category = self.engine.table().canonical_name(&case.category);

        let prediction = self.engine.score(&case);
        let record = self
            .repository
            .append(&case, &prediction)
            .map_err(|err| {
                error!(category = %case.category, %err, "failed to record prediction");
                err
            })?;

        info!(
            id = %record.id,
            category = %record.case.category,
            outcome = prediction.outcome_label.label(),
            probability = prediction.success_probability,
            "recorded prediction"
        );

        Ok(prediction)
    }

    /// Most recent records first; `None` uses the configured default limit.
    pub fn recent_history(
        &self,
        limit: Option<usize>,
    ) -> Result<Vec<PredictionRecord>, ForecastServiceError> {
        let limit = match limit {
            Some(0) => return Err(InputError::InvalidLimit.into()),
            Some(limit) => limit,
            None => self.history_limit.get(),
        };
        Ok(self.repository.list_recent(limit)?)
    }

    pub fn category_statistics(&self) -> Result<PredictionStatistics, ForecastServiceError> {
        let totals = self.repository.category_totals()?;
        Ok(PredictionStatistics::aggregate(self.engine.table(), totals))
    }

    pub fn total_predictions(&self) -> Result<u64, ForecastServiceError> {
        Ok(self.category_statistics()?.total_predictions())
    }

    pub fn category_catalog(&self) -> CategoryCatalog {
        CategoryCatalog::from_table(self.engine.table())
    }
}

/// Known category names together with their reference profiles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCatalog {
    pub categories: Vec<String>,
    pub details: Vec<CategoryProfile>,
}

impl CategoryCatalog {
    pub fn from_table(table: &CategoryTable) -> Self {
        Self {
            categories: table
                .category_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            details: table.profiles().to_vec(),
        }
    }
}

/// Error raised by the forecast service.
#[derive(Debug, thiserror::Error)]
pub enum ForecastServiceError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}
