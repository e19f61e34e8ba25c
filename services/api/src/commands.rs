use crate::infra::{open_service, SqliteForecastService};
use case_forecast::config::AppConfig;
use case_forecast::error::AppError;
use case_forecast::forecast::{
    CaseInput, CategoryCatalog, CategoryTable, ForecastServiceError, ScoringEngine,
};
use case_forecast::telemetry::{self, LogSink};
use clap::Args;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct StoreArgs {
    /// Override the configured prediction history database
    #[arg(long)]
    pub(crate) database: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    /// Legal category (civil, penal, labor, family, commercial)
    #[arg(long)]
    pub(crate) category: String,
    /// Amount in dispute
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub(crate) amount: f64,
    /// Complexity tier (low, medium, high)
    #[arg(long, default_value = "medium")]
    pub(crate) complexity: String,
    /// Evidence item label; repeat for each item
    #[arg(long = "evidence")]
    pub(crate) evidence: Vec<String>,
    /// Free-text case description
    #[arg(long, default_value = "")]
    pub(crate) description: String,
    /// Score without writing to the history
    #[arg(long)]
    pub(crate) dry_run: bool,
    #[command(flatten)]
    pub(crate) store: StoreArgs,
}

#[derive(Args, Debug)]
pub(crate) struct HistoryArgs {
    /// Number of records to print (defaults to APP_HISTORY_LIMIT)
    #[arg(long)]
    pub(crate) limit: Option<usize>,
    #[command(flatten)]
    pub(crate) store: StoreArgs,
}

pub(crate) fn run_predict(args: PredictArgs) -> Result<(), AppError> {
    let PredictArgs {
        category,
        amount,
        complexity,
        evidence,
        description,
        dry_run,
        store,
    } = args;

    let case = CaseInput {
        category,
        description,
        disputed_amount: amount,
        complexity,
        evidence_items: evidence,
        background: String::new(),
        jurisdiction: String::new(),
    };

    let prediction = if dry_run {
        load_config()?;
        case.validate().map_err(ForecastServiceError::from)?;
        let table = Arc::new(CategoryTable::standard()?);
        ScoringEngine::new(table).score(&case)
    } else {
        load_service(store)?.score_and_record(case)?
    };

    print_json(&prediction)
}

pub(crate) fn run_history(args: HistoryArgs) -> Result<(), AppError> {
    let records = load_service(args.store)?.recent_history(args.limit)?;
    print_json(&records)
}

pub(crate) fn run_stats(args: StoreArgs) -> Result<(), AppError> {
    let stats = load_service(args)?.category_statistics()?;
    print_json(&stats)
}

pub(crate) fn run_case_types() -> Result<(), AppError> {
    let table = CategoryTable::standard()?;
    print_json(&CategoryCatalog::from_table(&table))
}

/// Load configuration and route log events to stderr, keeping stdout for JSON.
fn load_config() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init_with_sink(&config.telemetry, LogSink::Stderr)?;
    Ok(config)
}

fn load_service(store: StoreArgs) -> Result<SqliteForecastService, AppError> {
    let config = load_config()?;
    open_service(&config.storage, store.database)
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let rendered = serde_json::to_string_pretty(value).map_err(std::io::Error::from)?;
    println!("{rendered}");
    Ok(())
}
