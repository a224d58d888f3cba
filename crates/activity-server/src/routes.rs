use crate::state::AppState;
use activity_analytics::{category_totals, Field};
use activity_core::config::ReportVariant;
use activity_core::{ActivityError, Category};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::get;
use axum::Router;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

type ApiError = (StatusCode, String);

/// Bad data is the caller's problem (422); anything else is ours.
fn api_error(err: ActivityError) -> ApiError {
    let status = if err.is_data_error() {
        StatusCode::UNPROCESSABLE_ENTITY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, err.to_string())
}

// ── Health ──────────────────────────────────────────────────────────────

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

// ── Persons ─────────────────────────────────────────────────────────────

pub fn person_routes() -> Router<AppState> {
    Router::new().route("/v1/persons", get(list_persons))
}

#[derive(Debug, Serialize)]
struct PersonsResponse<'a> {
    persons: Vec<&'a str>,
    records: usize,
}

async fn list_persons(State(state): State<AppState>) -> impl IntoResponse {
    Json(PersonsResponse {
        persons: state.dataset.persons(),
        records: state.dataset.len(),
    })
    .into_response()
}

// ── Reports ─────────────────────────────────────────────────────────────

pub fn report_routes() -> Router<AppState> {
    Router::new()
        .route("/v1/report", get(full_report))
        .route("/v1/report/{person}", get(person_report))
}

#[derive(Debug, Default, Deserialize)]
struct ReportQuery {
    #[serde(default)]
    variant: Option<ReportVariant>,
}

async fn full_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> impl IntoResponse {
    let report = match query.variant {
        Some(variant) => state.generator.with_variant(variant).report(&state.dataset),
        None => state.generator.report(&state.dataset),
    };
    Json(report)
}

async fn person_report(
    State(state): State<AppState>,
    Path(person): Path<String>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let report = match query.variant {
        Some(variant) => state
            .generator
            .with_variant(variant)
            .person_report(&state.dataset, &person),
        None => state.generator.person_report(&state.dataset, &person),
    };
    report
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, format!("Unknown person: {}", person)))
}

// ── Aggregates ──────────────────────────────────────────────────────────

pub fn aggregate_routes() -> Router<AppState> {
    Router::new().route("/v1/aggregates/category-totals", get(category_totals_handler))
}

#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
enum FieldParam {
    #[default]
    Duration,
    Value,
}

#[derive(Debug, Default, Deserialize)]
struct TotalsQuery {
    #[serde(default)]
    person: Option<String>,
    #[serde(default)]
    field: FieldParam,
}

#[derive(Debug, Serialize)]
struct TotalsResponse {
    person: Option<String>,
    field: FieldParam,
    totals: BTreeMap<Category, f64>,
}

async fn category_totals_handler(
    State(state): State<AppState>,
    Query(query): Query<TotalsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut records = state.dataset.view();
    if let Some(person) = &query.person {
        records = records.for_person(person);
        if records.is_empty() {
            return Err((StatusCode::NOT_FOUND, format!("Unknown person: {}", person)));
        }
    }

    let field = match query.field {
        FieldParam::Duration => Field::DurationMinutes,
        FieldParam::Value => Field::ValueToPerson(state.generator.scale()),
    };
    let totals = category_totals(&records, field).map_err(api_error)?;

    Ok(Json(TotalsResponse {
        person: query.person,
        field: query.field,
        totals,
    }))
}
