use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::Utc;
use serde_json::Value;

use crate::forecast::catalog::CategoryTable;
use crate::forecast::domain::{CaseInput, Prediction};
use crate::forecast::repository::{
    CategoryTotals, PredictionId, PredictionRecord, PredictionRepository, RepositoryError,
};
use crate::forecast::scoring::ScoringEngine;
use crate::forecast::service::CaseForecastService;

pub(super) fn table() -> Arc<CategoryTable> {
    Arc::new(CategoryTable::standard().expect("standard table is valid"))
}

pub(super) fn engine() -> ScoringEngine {
    ScoringEngine::new(table())
}

pub(super) fn case(category: &str, amount: f64, complexity: &str, evidence: &[&str]) -> CaseInput {
    CaseInput {
        category: category.to_string(),
        description: "Demanda por incumplimiento de contrato de arrendamiento".to_string(),
        disputed_amount: amount,
        complexity: complexity.to_string(),
        evidence_items: evidence.iter().map(|item| item.to_string()).collect(),
        background: String::new(),
        jurisdiction: "civil".to_string(),
    }
}

/// Civil, 50 000 in dispute, medium complexity, two evidence items.
pub(super) fn contract_dispute() -> CaseInput {
    case("civil", 50_000.0, "media", &["contrato", "correspondencia"])
}

#[derive(Default)]
pub(super) struct MemoryRepository {
    records: Mutex<Vec<PredictionRecord>>,
}

impl MemoryRepository {
    pub(super) fn records(&self) -> Vec<PredictionRecord> {
        self.records.lock().expect("repository mutex poisoned").clone()
    }
}

impl PredictionRepository for MemoryRepository {
    fn append(
        &self,
        case: &CaseInput,
        prediction: &Prediction,
    ) -> Result<PredictionRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        let record = PredictionRecord {
            id: PredictionId(guard.len() as i64 + 1),
            case: case.clone(),
            prediction: prediction.clone(),
            created_at: Utc::now(),
            actual_outcome: None,
            resolved_at: None,
        };
        guard.push(record.clone());
        Ok(record)
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<PredictionRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.iter().rev().take(limit).cloned().collect())
    }

    fn category_totals(&self) -> Result<Vec<CategoryTotals>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        let mut totals: Vec<CategoryTotals> = Vec::new();
        for record in guard.iter() {
            match totals
                .iter_mut()
                .find(|entry| entry.category == record.case.category)
            {
                Some(entry) => {
                    entry.count += 1;
                    entry.probability_sum += record.prediction.success_probability;
                    entry.months_sum += u64::from(record.prediction.estimated_months);
                }
                None => totals.push(CategoryTotals {
                    category: record.case.category.clone(),
                    count: 1,
                    probability_sum: record.prediction.success_probability,
                    months_sum: u64::from(record.prediction.estimated_months),
                }),
            }
        }
        Ok(totals)
    }
}

pub(super) struct UnavailableRepository;

impl PredictionRepository for UnavailableRepository {
    fn append(
        &self,
        _case: &CaseInput,
        _prediction: &Prediction,
    ) -> Result<PredictionRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn list_recent(&self, _limit: usize) -> Result<Vec<PredictionRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn category_totals(&self) -> Result<Vec<CategoryTotals>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn build_service() -> (CaseForecastService<MemoryRepository>, Arc<MemoryRepository>) {
    let repository = Arc::new(MemoryRepository::default());
    let service = CaseForecastService::new(repository.clone(), table());
    (service, repository)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
