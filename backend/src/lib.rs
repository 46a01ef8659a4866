//! Cookie backed request language resolution for axum services
//!
//! Each request resolves its language from the `lang` cookie, then the
//! `Accept-Language` header, then a configured default. Handlers read it via
//! [`CurrentLanguage`] and may switch it with
//! [`LanguageResolver::change_language`]. The result is written back to the
//! cookie on the way out.

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{Router, routing::get};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub use config::{Config, CookieConfig};
pub use services::LanguageResolver;
pub use utils::{ApiError, ApiResult, CurrentLanguage, current_language};

/// Shared application state
pub struct AppState {
    pub resolver: Arc<LanguageResolver>,
}

impl AppState {
    pub fn new(resolver: LanguageResolver) -> Self {
        Self { resolver: Arc::new(resolver) }
    }

    /// Build the state from configuration, serving the configured languages
    pub fn from_config(config: &Config) -> Self {
        let mut resolver = LanguageResolver::new(config.language.cookie.clone());

        let allowed = config.language.allowed.clone();
        let default = config.language.default.clone();
        resolver
            .register_allowed_languages(move || allowed.clone())
            .register_default_language(move || default.clone());

        Self::new(resolver)
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::language::get_language,
        handlers::language::change_language,
        handlers::language::list_languages,
        handlers::language::health_check,
    ),
    components(schemas(
        models::CurrentLanguageResponse,
        models::ChangeLanguageRequest,
        models::LanguagesResponse,
        models::HealthResponse,
    )),
    tags(
        (name = "Language", description = "Request language resolution"),
        (name = "System", description = "Service status"),
    )
)]
pub struct ApiDoc;

/// Build the application router
///
/// Every `/api` route runs inside the language middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route(
            "/api/language",
            get(handlers::language::get_language).post(handlers::language::change_language),
        )
        .route("/api/languages", get(handlers::language::list_languages))
        .route("/api/health", get(handlers::language::health_check))
        .layer(axum::middleware::from_fn_with_state(
            Arc::clone(&state.resolver),
            middleware::language_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(api_routes)
        .layer(TraceLayer::new_for_http())
}
