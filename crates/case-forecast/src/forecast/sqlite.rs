//! SQLite-backed prediction history.
//!
//! One connection behind a mutex: the lock is the single-writer point for the
//! id counter, and reads take it too so they never observe a torn row.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use tracing::{debug, info};

use super::domain::{CaseInput, OutcomeLabel, Prediction};
use super::repository::{
    CategoryTotals, PredictionId, PredictionRecord, PredictionRepository, RepositoryError,
};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS case_predictions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    category TEXT NOT NULL,
    description TEXT NOT NULL,
    disputed_amount REAL NOT NULL,
    complexity TEXT NOT NULL,
    evidence TEXT NOT NULL,
    background TEXT NOT NULL,
    jurisdiction TEXT NOT NULL,
    success_probability REAL NOT NULL,
    outcome_label TEXT NOT NULL,
    risk_factors TEXT NOT NULL,
    recommendations TEXT NOT NULL,
    adjustments TEXT NOT NULL,
    estimated_months INTEGER NOT NULL,
    confidence REAL NOT NULL,
    created_at TEXT NOT NULL,
    actual_outcome TEXT DEFAULT NULL,
    resolved_at TEXT DEFAULT NULL
);
CREATE INDEX IF NOT EXISTS idx_case_predictions_category ON case_predictions (category);
";

const SELECT_COLUMNS: &str = "id, category, description, disputed_amount, complexity, evidence, \
     background, jurisdiction, success_probability, outcome_label, risk_factors, \
     recommendations, adjustments, estimated_months, confidence, created_at, \
     actual_outcome, resolved_at";

pub struct SqlitePredictionRepository {
    conn: Mutex<Connection>,
}

impl SqlitePredictionRepository {
    /// Open or create the history database at `path`.
    pub fn open(path: &Path) -> Result<Self, RepositoryError> {
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|err| {
                RepositoryError::Unavailable(format!(
                    "creating {}: {err}",
                    parent.display()
                ))
            })?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=FULL;")?;
        info!(path = %path.display(), "opened prediction history");

        Self::with_connection(conn)
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        debug!("opening in-memory prediction history");
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, RepositoryError> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, RepositoryError> {
        self.conn
            .lock()
            .map_err(|err| RepositoryError::Unavailable(format!("lock poisoned: {err}")))
    }
}

impl PredictionRepository for SqlitePredictionRepository {
    fn append(
        &self,
        case: &CaseInput,
        prediction: &Prediction,
    ) -> Result<PredictionRecord, RepositoryError> {
        let evidence = encode_json(&case.evidence_items)?;
        let risk_factors = encode_json(&prediction.risk_factors)?;
        let recommendations = encode_json(&prediction.recommendations)?;
        let adjustments = encode_json(&prediction.adjustments)?;

        let conn = self.lock()?;
        let created_at = Utc::now();
        conn.execute(
            "INSERT INTO case_predictions (
                category, description, disputed_amount, complexity, evidence,
                background, jurisdiction, success_probability, outcome_label,
                risk_factors, recommendations, adjustments, estimated_months,
                confidence, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)",
            params![
                case.category,
                case.description,
                case.disputed_amount,
                case.complexity,
                evidence,
                case.background,
                case.jurisdiction,
                prediction.success_probability,
                prediction.outcome_label.label(),
                risk_factors,
                recommendations,
                adjustments,
                prediction.estimated_months,
                prediction.confidence,
                created_at.to_rfc3339(),
            ],
        )?;
        let id = PredictionId(conn.last_insert_rowid());
        drop(conn);

        debug!(%id, "appended prediction record");

        Ok(PredictionRecord {
            id,
            case: case.clone(),
            prediction: prediction.clone(),
            created_at,
            actual_outcome: None,
            resolved_at: None,
        })
    }

    fn list_recent(&self, limit: usize) -> Result<Vec<PredictionRecord>, RepositoryError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(&format!(
            "SELECT {SELECT_COLUMNS} FROM case_predictions ORDER BY id DESC LIMIT ?1"
        ))?;
        let rows = stmt
            .query_map([limit], StoredRow::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        drop(stmt);
        drop(conn);

        rows.into_iter().map(StoredRow::into_record).collect()
    }

    fn category_totals(&self) -> Result<Vec<CategoryTotals>, RepositoryError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare_cached(
            "SELECT category, COUNT(*), SUM(success_probability), SUM(estimated_months)
             FROM case_predictions
             GROUP BY category
             ORDER BY category",
        )?;
        let totals = stmt
            .query_map([], |row| {
                let count: i64 = row.get(1)?;
                let months_sum: i64 = row.get(3)?;
                Ok(CategoryTotals {
                    category: row.get(0)?,
                    count: u64::try_from(count).unwrap_or_default(),
                    probability_sum: row.get(2)?,
                    months_sum: u64::try_from(months_sum).unwrap_or_default(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(totals)
    }
}

/// Raw column values; decoding JSON and timestamps happens outside the lock.
struct StoredRow {
    id: i64,
    category: String,
    description: String,
    disputed_amount: f64,
    complexity: String,
    evidence: String,
    background: String,
    jurisdiction: String,
    success_probability: f64,
    outcome_label: String,
    risk_factors: String,
    recommendations: String,
    adjustments: String,
    estimated_months: i64,
    confidence: f64,
    created_at: String,
    actual_outcome: Option<String>,
    resolved_at: Option<String>,
}

impl StoredRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            category: row.get(1)?,
            description: row.get(2)?,
            disputed_amount: row.get(3)?,
            complexity: row.get(4)?,
            evidence: row.get(5)?,
            background: row.get(6)?,
            jurisdiction: row.get(7)?,
            success_probability: row.get(8)?,
            outcome_label: row.get(9)?,
            risk_factors: row.get(10)?,
            recommendations: row.get(11)?,
            adjustments: row.get(12)?,
            estimated_months: row.get(13)?,
            confidence: row.get(14)?,
            created_at: row.get(15)?,
            actual_outcome: row.get(16)?,
            resolved_at: row.get(17)?,
        })
    }

    fn into_record(self) -> Result<PredictionRecord, RepositoryError> {
        let id = self.id;
        let outcome_label = OutcomeLabel::from_label(&self.outcome_label).ok_or_else(|| {
            RepositoryError::Corrupt(format!(
                "record {id}: unknown outcome label '{}'",
                self.outcome_label
            ))
        })?;
        let estimated_months = u32::try_from(self.estimated_months).map_err(|_| {
            RepositoryError::Corrupt(format!(
                "record {id}: estimated months {} out of range",
                self.estimated_months
            ))
        })?;

        Ok(PredictionRecord {
            id: PredictionId(id),
            case: CaseInput {
                category: self.category,
                description: self.description,
                disputed_amount: self.disputed_amount,
                complexity: self.complexity,
                evidence_items: decode_json(id, &self.evidence)?,
                background: self.background,
                jurisdiction: self.jurisdiction,
            },
            prediction: Prediction {
                success_probability: self.success_probability,
                outcome_label,
                risk_factors: decode_json(id, &self.risk_factors)?,
                recommendations: decode_json(id, &self.recommendations)?,
                estimated_months,
                confidence: self.confidence,
                adjustments: decode_json(id, &self.adjustments)?,
            },
            created_at: parse_timestamp(id, &self.created_at)?,
            actual_outcome: self.actual_outcome,
            resolved_at: self
                .resolved_at
                .as_deref()
                .map(|raw| parse_timestamp(id, raw))
                .transpose()?,
        })
    }
}

fn encode_json<T: serde::Serialize>(value: &T) -> Result<String, RepositoryError> {
    serde_json::to_string(value).map_err(|err| RepositoryError::Corrupt(err.to_string()))
}

fn decode_json<T: serde::de::DeserializeOwned>(id: i64, raw: &str) -> Result<T, RepositoryError> {
    serde_json::from_str(raw)
        .map_err(|err| RepositoryError::Corrupt(format!("record {id}: {err}")))
}

fn parse_timestamp(id: i64, raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|timestamp| timestamp.with_timezone(&Utc))
        .map_err(|err| RepositoryError::Corrupt(format!("record {id}: timestamp {raw}: {err}")))
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(value: rusqlite::Error) -> Self {
        RepositoryError::Unavailable(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::domain::AdjustmentFactor;
    use crate::forecast::{CategoryTable, ScoringEngine};
    use std::sync::Arc;

    fn case(category: &str, evidence: &[&str]) -> CaseInput {
        CaseInput {
            category: category.to_string(),
            description: "Incumplimiento de contrato".to_string(),
            disputed_amount: 50_000.0,
            complexity: "media".to_string(),
            evidence_items: evidence.iter().map(|item| item.to_string()).collect(),
            background: String::new(),
            jurisdiction: "civil".to_string(),
        }
    }

    fn engine() -> ScoringEngine {
        ScoringEngine::new(Arc::new(
            CategoryTable::standard().expect("standard table is valid"),
        ))
    }

    #[test]
    fn append_assigns_increasing_ids_and_round_trips_fields() {
        let repository = SqlitePredictionRepository::open_in_memory().expect("db opens");
        let engine = engine();
        let first_case = case("civil", &["contrato", "correspondencia"]);
        let first_prediction = engine.score(&first_case);

        let first = repository
            .append(&first_case, &first_prediction)
            .expect("append succeeds");
        let second = repository
            .append(&case("labor", &[]), &engine.score(&case("labor", &[])))
            .expect("append succeeds");

        assert!(second.id > first.id);

        let recent = repository.list_recent(10).expect("history loads");
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, second.id);
        assert_eq!(recent[1].case, first_case);
        assert_eq!(recent[1].prediction, first_prediction);
        assert_eq!(recent[1].created_at, first.created_at);
        assert!(recent[1].actual_outcome.is_none());
        assert!(recent[1]
            .prediction
            .adjustments
            .iter()
            .any(|term| term.factor == AdjustmentFactor::Evidence && term.delta == 0.1));
    }

    #[test]
    fn list_recent_honours_limit() {
        let repository = SqlitePredictionRepository::open_in_memory().expect("db opens");
        let engine = engine();
        for _ in 0..5 {
            let input = case("family", &["acta"]);
            repository
                .append(&input, &engine.score(&input))
                .expect("append succeeds");
        }

        let recent = repository.list_recent(3).expect("history loads");
        assert_eq!(recent.len(), 3);
        assert!(recent.windows(2).all(|pair| pair[0].id > pair[1].id));
    }

    #[test]
    fn category_totals_group_by_stored_category() {
        let repository = SqlitePredictionRepository::open_in_memory().expect("db opens");
        let engine = engine();
        for input in [
            case("civil", &["contrato", "correspondencia"]),
            case("civil", &[]),
            case("penal", &[]),
        ] {
            repository
                .append(&input, &engine.score(&input))
                .expect("append succeeds");
        }

        let totals = repository.category_totals().expect("totals load");
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].category, "civil");
        assert_eq!(totals[0].count, 2);
        assert_eq!(totals[0].months_sum, 16);
        assert!((totals[0].probability_sum - 1.40).abs() < 1e-9);
        assert_eq!(totals[1].category, "penal");
        assert_eq!(totals[1].count, 1);
    }
}
