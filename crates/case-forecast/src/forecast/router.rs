use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{CaseInput, InputError};
use super::repository::PredictionRepository;
use super::service::{CaseForecastService, ForecastServiceError};
use crate::error::AppError;

/// Router builder exposing the forecast service over HTTP.
pub fn forecast_router<R>(service: Arc<CaseForecastService<R>>) -> Router
where
    R: PredictionRepository + 'static,
{
    Router::new()
        .route("/api/v1/predict", post(predict_handler::<R>))
        .route("/api/v1/case-types", get(catalog_handler::<R>))
        .route("/api/v1/predictions/history", get(history_handler::<R>))
        .route("/api/v1/predictions/stats", get(stats_handler::<R>))
        .with_state(service)
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct HistoryQuery {
    pub(crate) limit: Option<usize>,
}

pub(crate) async fn predict_handler<R>(
    State(service): State<Arc<CaseForecastService<R>>>,
    payload: Result<axum::Json<CaseInput>, JsonRejection>,
) -> Response
where
    R: PredictionRepository + 'static,
{
    let case = match payload {
        Ok(axum::Json(case)) => case,
        Err(rejection) => {
            let err = InputError::MalformedCase(rejection.body_text());
            return error_response(err.into());
        }
    };

    match service.score_and_record(case) {
        Ok(prediction) => (StatusCode::OK, axum::Json(prediction)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn catalog_handler<R>(
    State(service): State<Arc<CaseForecastService<R>>>,
) -> Response
where
    R: PredictionRepository + 'static,
{
    (StatusCode::OK, axum::Json(service.category_catalog())).into_response()
}

pub(crate) async fn history_handler<R>(
    State(service): State<Arc<CaseForecastService<R>>>,
    Query(query): Query<HistoryQuery>,
) -> Response
where
    R: PredictionRepository + 'static,
{
    match service.recent_history(query.limit) {
        Ok(records) => {
            let payload = json!({ "predictions": records });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => error_response(err),
    }
}

pub(crate) async fn stats_handler<R>(
    State(service): State<Arc<CaseForecastService<R>>>,
) -> Response
where
    R: PredictionRepository + 'static,
{
    match service.category_statistics() {
        Ok(stats) => (StatusCode::OK, axum::Json(stats)).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: ForecastServiceError) -> Response {
    AppError::from(err).into_response()
}
