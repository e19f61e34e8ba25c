//! Case outcome forecasting: category table, scoring engine, prediction
//! history, and statistics.

pub mod catalog;
pub mod domain;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod sqlite;
pub mod stats;

#[cfg(test)]
mod tests;

pub use catalog::{CatalogError, CategoryProfile, CategoryTable, FALLBACK_CATEGORY};
pub use domain::{
    AdjustmentFactor, AdjustmentTerm, CaseInput, ComplexityTier, InputError, OutcomeLabel,
    Prediction,
};
pub use repository::{
    CategoryTotals, PredictionId, PredictionRecord, PredictionRepository, RepositoryError,
};
pub use router::forecast_router;
pub use scoring::ScoringEngine;
pub use service::{CaseForecastService, CategoryCatalog, ForecastServiceError};
pub use sqlite::SqlitePredictionRepository;
pub use stats::{CategoryStatistics, PredictionStatistics};
