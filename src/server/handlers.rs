use crate::aggregate::{self, FilteredView};
use crate::args::DEFAULT_EXPORT_FILE;
use crate::commands::to_csv;
use crate::config::Preferences;
use crate::error::bad_request;
use crate::model::{FilterCriteria, NewTransaction, Transaction, TransactionId};
use crate::server::{ApiError, AppState};
use crate::Result;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::{debug, info};

type ApiResult<T> = std::result::Result<T, ApiError>;

/// The query string accepted by every endpoint that filters. Empty values mean "no constraint", as
/// a form with an unset select box sends `month=&year=`.
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    month: Option<String>,
    year: Option<String>,
    search: Option<String>,
}

impl FilterQuery {
    fn criteria(self) -> Result<FilterCriteria> {
        let month = parse_param::<u32>("month", self.month)?;
        let year = parse_param::<i32>("year", self.year)?;
        FilterCriteria::new(month, year, self.search)
    }
}

fn parse_param<T: std::str::FromStr>(name: &str, value: Option<String>) -> Result<Option<T>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s
            .parse()
            .map(Some)
            .map_err(|_| bad_request(format!("Invalid {name} '{s}'"))),
    }
}

fn criteria(query: std::result::Result<Query<FilterQuery>, QueryRejection>) -> Result<FilterCriteria> {
    let Query(query) = query.map_err(|e| bad_request(e.body_text()))?;
    query.criteria()
}

fn body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| bad_request(e.body_text()))
}

fn transaction_id(raw: &str) -> Result<TransactionId> {
    raw.parse()
        .map_err(|e: anyhow::Error| bad_request(e.to_string()))
}

/// `GET /transactions`
pub async fn list_transactions(
    State(state): State<AppState>,
    query: std::result::Result<Query<FilterQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Transaction>>> {
    let criteria = criteria(query)?;
    let all = state.store().list().await?;
    let filtered = aggregate::filter(&all, &criteria);
    debug!("Returning {} of {} transactions", filtered.len(), all.len());
    Ok(Json(filtered))
}

/// `POST /transactions`
pub async fn create_transaction(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NewTransaction>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Transaction>)> {
    let fields = body(payload)?;
    let created = state.store().insert(fields).await?;
    info!("Created transaction {}", created.id());
    Ok((StatusCode::CREATED, Json(created)))
}

/// `PUT /transactions/{id}`
pub async fn update_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<NewTransaction>, JsonRejection>,
) -> ApiResult<Json<Transaction>> {
    let id = transaction_id(&id)?;
    let fields = body(payload)?;
    let updated = state.store().update(&id, fields).await?;
    info!("Updated transaction {}", updated.id());
    Ok(Json(updated))
}

/// `DELETE /transactions/{id}`
pub async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    let id = transaction_id(&id)?;
    let deleted = state.store().delete(&id).await?;
    info!("Deleted transaction {}", deleted.id());
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /summary`
pub async fn summary(
    State(state): State<AppState>,
    query: std::result::Result<Query<FilterQuery>, QueryRejection>,
) -> ApiResult<Json<FilteredView>> {
    let criteria = criteria(query)?;
    let all = state.store().list().await?;
    Ok(Json(FilteredView::compute(&all, &criteria)))
}

/// `GET /export`
pub async fn export(
    State(state): State<AppState>,
    query: std::result::Result<Query<FilterQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let criteria = criteria(query)?;
    let all = state.store().list().await?;
    let csv = to_csv(&aggregate::filter(&all, &criteria))?;
    let disposition = format!("attachment; filename=\"{DEFAULT_EXPORT_FILE}\"");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv,
    ))
}

/// `GET /preferences`
pub async fn get_preferences(State(state): State<AppState>) -> Json<Preferences> {
    Json(state.preferences().await)
}

/// `PUT /preferences`
pub async fn put_preferences(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Preferences>, JsonRejection>,
) -> ApiResult<Json<Preferences>> {
    let preferences = body(payload)?;
    state.set_preferences(preferences.clone()).await?;
    Ok(Json(preferences))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_query_empty_values() {
        let query = FilterQuery {
            month: Some(String::new()),
            year: Some(" ".to_string()),
            search: Some(String::new()),
        };
        assert!(query.criteria().unwrap().is_empty());
    }

    #[test]
    fn test_filter_query_invalid() {
        let query = FilterQuery {
            month: Some("march".to_string()),
            ..FilterQuery::default()
        };
        let err = query.criteria().unwrap_err();
        assert_eq!(err.to_string(), "Invalid month 'march'");
    }
}
