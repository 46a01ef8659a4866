//! Request-scoped storage for the resolved language
//!
//! Every request runs inside its own task-local cell, opened by the language
//! middleware. Code running on the request's task can read and update the
//! value without it being threaded through call signatures. Tasks spawned
//! from a handler do not inherit the cell.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;

use axum::{extract::FromRequestParts, http::request::Parts};
use serde::{Serialize, Serializer};

use super::error::{ApiError, ApiResult};

tokio::task_local! {
    static REQUEST_LANGUAGE: RefCell<Option<String>>;
}

const NO_SCOPE: &str = "request language accessed outside of a request scope";

/// Run `future` inside a fresh, empty request language cell
pub async fn scope<F>(future: F) -> F::Output
where
    F: Future,
{
    REQUEST_LANGUAGE.scope(RefCell::new(None), future).await
}

/// Synchronous counterpart of [`scope`]
pub fn sync_scope<R>(f: impl FnOnce() -> R) -> R {
    REQUEST_LANGUAGE.sync_scope(RefCell::new(None), f)
}

/// Store the language for the current request
pub fn set_language(language: impl Into<String>) -> ApiResult<()> {
    let language = language.into();
    REQUEST_LANGUAGE
        .try_with(|cell| {
            *cell.borrow_mut() = Some(language);
        })
        .map_err(|_| ApiError::configuration(NO_SCOPE))
}

/// Get the language for the current request
///
/// `Ok(None)` means the scope is active but nothing was resolved yet.
pub fn get_language() -> ApiResult<Option<String>> {
    REQUEST_LANGUAGE
        .try_with(|cell| cell.borrow().clone())
        .map_err(|_| ApiError::configuration(NO_SCOPE))
}

/// Read-only view of the current request's language
///
/// Every read looks the value up again, so a `CurrentLanguage` held across a
/// `change_language` call reflects the change. Displays as the language tag,
/// or as an empty string when nothing is resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CurrentLanguage;

pub const fn current_language() -> CurrentLanguage {
    CurrentLanguage
}

impl CurrentLanguage {
    pub fn get(&self) -> Option<String> {
        get_language().ok().flatten()
    }

    pub fn is_resolved(&self) -> bool {
        self.get().is_some()
    }
}

impl fmt::Display for CurrentLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(language) => f.write_str(&language),
            None => Ok(()),
        }
    }
}

impl Serialize for CurrentLanguage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for CurrentLanguage
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(_parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(CurrentLanguage)
    }
}
