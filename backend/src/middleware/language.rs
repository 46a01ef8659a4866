//! Language resolution middleware
//!
//! Opens the request language scope, resolves the language before the
//! handler runs and writes the language cookie once it returns.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::services::LanguageResolver;
use crate::utils::{ApiResult, language_context};

/// Middleware wrapping every request in its own language scope
pub async fn language_middleware(
    State(resolver): State<Arc<LanguageResolver>>,
    req: Request,
    next: Next,
) -> ApiResult<Response> {
    language_context::scope(async move {
        resolver.resolve(&req)?;

        let response = next.run(req).await;

        resolver.persist(response)
    })
    .await
}
