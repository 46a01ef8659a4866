use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::JsonRejection, http::StatusCode};

use crate::AppState;
use crate::models::{
    ChangeLanguageRequest, CurrentLanguageResponse, HealthResponse, LanguagesResponse,
};
use crate::utils::{ApiError, ApiResult, CurrentLanguage};

/// Get the language resolved for this request
#[utoipa::path(
    get,
    path = "/api/language",
    responses(
        (status = 200, description = "Current language", body = CurrentLanguageResponse)
    ),
    tag = "Language"
)]
pub async fn get_language(language: CurrentLanguage) -> Json<CurrentLanguageResponse> {
    tracing::debug!("Current language: {}", language);
    Json(CurrentLanguageResponse { language })
}

/// Change the language of this request, and of the language cookie
#[utoipa::path(
    post,
    path = "/api/language",
    request_body = ChangeLanguageRequest,
    responses(
        (status = 201, description = "Language after the change", body = CurrentLanguageResponse),
        (status = 400, description = "Malformed request body"),
        (status = 500, description = "Language resolver misconfigured"),
    ),
    tag = "Language"
)]
pub async fn change_language(
    State(state): State<Arc<AppState>>,
    language: CurrentLanguage,
    payload: Result<Json<ChangeLanguageRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CurrentLanguageResponse>)> {
    let Json(payload) = payload.map_err(|e| ApiError::invalid_data(e.body_text()))?;

    match payload.language.as_deref() {
        Some(requested) => {
            tracing::info!("Changing language from '{}' to '{}'", language, requested);
            if !state.resolver.change_language(requested)? {
                tracing::info!("Language '{}' is not allowed, keeping '{}'", requested, language);
            }
        },
        None => tracing::debug!("Change language request without language"),
    }

    Ok((StatusCode::CREATED, Json(CurrentLanguageResponse { language })))
}

/// List the allowed and default languages
#[utoipa::path(
    get,
    path = "/api/languages",
    responses(
        (status = 200, description = "Language settings", body = LanguagesResponse)
    ),
    tag = "Language"
)]
pub async fn list_languages(
    State(state): State<Arc<AppState>>,
    current: CurrentLanguage,
) -> ApiResult<Json<LanguagesResponse>> {
    let allowed = state.resolver.allowed_languages()?;
    let default = state.resolver.default_language()?;
    tracing::debug!("Allowed languages: {:?} (default: {})", allowed, default);
    Ok(Json(LanguagesResponse { allowed, default, current }))
}

/// Health check
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    ),
    tag = "System"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok".to_string() })
}
