//! REST handlers and their OpenAPI description.

use crate::error::ApiError;
use crate::AppState;
use api_shared::{
    ErrorRes, HealthRes, HealthService, HpiReq, HpiRes, Medication, PreferenceSet, ProviderSummary,
    SuggestionPair,
};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    response::Json,
};
use serde::Deserialize;
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_providers,
        provider_preferences,
        medication_details,
        suggestions,
        generate_hpi,
    ),
    components(schemas(
        HealthRes,
        ErrorRes,
        ProviderSummary,
        PreferenceSet,
        Medication,
        HpiReq,
        HpiRes,
    ))
)]
pub struct ApiDoc;

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
pub async fn health(State(_state): State<AppState>) -> Json<HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/providers",
    responses(
        (status = 200, description = "All providers in list form", body = [ProviderSummary])
    )
)]
/// List every provider as `{id, name}`, in store order.
///
/// Sorting and filtering happen on the client.
#[axum::debug_handler]
pub async fn list_providers(State(state): State<AppState>) -> Json<Vec<ProviderSummary>> {
    Json(state.reference.providers())
}

#[utoipa::path(
    get,
    path = "/provider/{id}",
    params(("id" = String, Path, description = "Provider identifier")),
    responses(
        (status = 200, description = "Provider preference set", body = PreferenceSet),
        (status = 404, description = "Provider not found", body = ErrorRes)
    )
)]
/// Preference set of one provider
///
/// # Errors
/// Returns `404 Not Found` with `{"error": "Provider not found"}` for an unknown id.
#[axum::debug_handler]
pub async fn provider_preferences(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PreferenceSet>, ApiError> {
    match state.reference.provider_preferences(&id) {
        Some(prefs) => Ok(Json(prefs.clone())),
        None => {
            tracing::debug!("unknown provider requested: {}", id);
            Err(ApiError::NotFound("Provider not found"))
        }
    }
}

#[utoipa::path(
    get,
    path = "/medication/{name}",
    params(("name" = String, Path, description = "Medication name, any case")),
    responses(
        (status = 200, description = "Medication record", body = Medication),
        (status = 404, description = "Medication not found", body = ErrorRes)
    )
)]
/// Medication record by name
///
/// The lookup ignores case; the record is returned exactly as stored.
///
/// # Errors
/// Returns `404 Not Found` with `{"error": "Medication not found"}` when no record matches.
#[axum::debug_handler]
pub async fn medication_details(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<Medication>, ApiError> {
    state
        .reference
        .medication(&name)
        .cloned()
        .map(Json)
        .ok_or(ApiError::NotFound("Medication not found"))
}

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    q: Option<String>,
}

#[utoipa::path(
    get,
    path = "/suggestions",
    params(("q" = Option<String>, Query, description = "Search term")),
    responses(
        (status = 200, description = "Ordered [name, matchedName] pairs", body = Vec<Vec<String>>)
    )
)]
/// Autocomplete suggestions for a medication search term
///
/// A missing or blank `q` yields an empty list.
#[axum::debug_handler]
pub async fn suggestions(
    State(state): State<AppState>,
    Query(query): Query<SuggestionQuery>,
) -> Json<Vec<SuggestionPair>> {
    let q = query.q.unwrap_or_default();
    Json(state.reference.suggestions(&q))
}

#[utoipa::path(
    post,
    path = "/generate-hpi",
    request_body = HpiReq,
    responses(
        (status = 200, description = "Generated HPI", body = HpiRes),
        (status = 400, description = "No input data provided", body = ErrorRes),
        (status = 502, description = "HPI generation failed", body = ErrorRes)
    )
)]
/// Draft an HPI from the assistant form
///
/// The body is read as raw JSON so that malformed or empty input still produces the JSON
/// error body the client expects.
///
/// # Errors
/// Returns `400 Bad Request` if the body is not a non-empty JSON object, and
/// `502 Bad Gateway` if the configured engine fails.
#[axum::debug_handler]
pub async fn generate_hpi(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<HpiRes>, ApiError> {
    let value: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|_| ApiError::BadRequest("No input data provided"))?;

    match value.as_object() {
        Some(fields) if !fields.is_empty() => {}
        _ => return Err(ApiError::BadRequest("No input data provided")),
    }

    let req: HpiReq = serde_json::from_value(value)
        .map_err(|_| ApiError::BadRequest("Invalid input data"))?;

    let res = state
        .hpi
        .generate(&req)
        .await
        .map_err(ApiError::Generation)?;
    Ok(Json(res))
}
