use std::collections::HashSet;
use std::sync::Arc;
use std::thread;

use case_forecast::forecast::{
    CaseForecastService, CaseInput, CategoryTable, OutcomeLabel, PredictionRepository,
    SqlitePredictionRepository,
};

fn case(category: &str, amount: f64, complexity: &str, evidence: &[&str]) -> CaseInput {
    CaseInput {
        category: category.to_string(),
        description: "Despido injustificado".to_string(),
        disputed_amount: amount,
        complexity: complexity.to_string(),
        evidence_items: evidence.iter().map(|item| item.to_string()).collect(),
        background: "Sin antecedentes".to_string(),
        jurisdiction: "laboral".to_string(),
    }
}

fn service(
    repository: Arc<SqlitePredictionRepository>,
) -> CaseForecastService<SqlitePredictionRepository> {
    let table = Arc::new(CategoryTable::standard().expect("standard table is valid"));
    CaseForecastService::new(repository, table)
}

#[test]
fn recorded_predictions_survive_reopening_the_store() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("history").join("predictions.db");

    let first_id = {
        let repository = Arc::new(SqlitePredictionRepository::open(&path).expect("db opens"));
        let service = service(repository.clone());
        let prediction = service
            .score_and_record(case("labor", 15_000.0, "baja", &["planillas", "horarios"]))
            .expect("prediction recorded");
        assert_eq!(prediction.success_probability, 0.90);
        assert_eq!(prediction.outcome_label, OutcomeLabel::Favorable);

        repository.list_recent(1).expect("history loads")[0].id
    };

    let repository = Arc::new(SqlitePredictionRepository::open(&path).expect("db reopens"));
    let service = service(repository);

    let history = service.recent_history(None).expect("history loads");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].id, first_id);
    assert_eq!(history[0].case.evidence_items, vec!["planillas", "horarios"]);
    assert_eq!(history[0].prediction.estimated_months, 6);

    service
        .score_and_record(case("family", 0.0, "alta", &["informe"]))
        .expect("prediction recorded");
    let history = service.recent_history(None).expect("history loads");
    assert!(history[0].id > first_id);

    let stats = service.category_statistics().expect("stats computed");
    assert_eq!(stats.total_predictions(), 2);
    let family = stats.category("family").expect("family reported");
    assert_eq!(family.count, 1);
    assert_eq!(family.average_success_probability, 0.45);
    assert_eq!(family.average_estimated_months, 12.0);
}

#[test]
fn concurrent_appends_receive_distinct_increasing_ids() {
    let dir = tempfile::tempdir().expect("temp dir");
    let repository = Arc::new(
        SqlitePredictionRepository::open(&dir.path().join("predictions.db")).expect("db opens"),
    );
    let service = Arc::new(service(repository.clone()));

    let workers: Vec<_> = (0..8)
        .map(|worker| {
            let service = service.clone();
            thread::spawn(move || {
                for item in 0..10 {
                    let evidence = vec!["doc"; (worker + item) % 5];
                    service
                        .score_and_record(case("civil", 1_000.0 * item as f64, "media", &evidence))
                        .expect("prediction recorded");
                }
            })
        })
        .collect();
    for worker in workers {
        worker.join().expect("worker finished");
    }

    let history = repository.list_recent(1_000).expect("history loads");
    assert_eq!(history.len(), 80);

    let ids: HashSet<i64> = history.iter().map(|record| record.id.0).collect();
    assert_eq!(ids.len(), 80);
    assert!(history.windows(2).all(|pair| pair[0].id > pair[1].id));

    let stats = service.category_statistics().expect("stats computed");
    assert_eq!(stats.total_predictions(), 80);
}

#[test]
fn unknown_category_is_recorded_under_its_own_name() {
    let repository =
        Arc::new(SqlitePredictionRepository::open_in_memory().expect("in-memory db opens"));
    let service = service(repository);

    let prediction = service
        .score_and_record(case("Tributario", 50_000.0, "media", &["contrato", "correspondencia"]))
        .expect("prediction recorded");
    assert_eq!(prediction.success_probability, 0.75);

    let stats = service.category_statistics().expect("stats computed");
    assert_eq!(stats.categories.len(), 6);
    let unknown = stats.category("tributario").expect("unknown category reported");
    assert_eq!(unknown.count, 1);
    assert_eq!(stats.category("civil").map(|entry| entry.count), Some(0));
}
