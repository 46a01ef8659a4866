//! Language resolution and persistence
//!
//! Before each request the resolver picks the current language:
//! 1. the language cookie, if the client sent one
//! 2. otherwise the best match between `Accept-Language` and the allowed
//!    languages
//! 3. otherwise the default language
//!
//! After each request the resolved language is written back to the cookie.

use std::sync::Arc;

use axum::http::{
    HeaderMap, HeaderValue, Request, Response,
    header::{ACCEPT_LANGUAGE, SET_COOKIE},
    request::Parts,
};
use axum_extra::extract::cookie::CookieJar;
use cookie::{Cookie, time::Duration};

use crate::config::CookieConfig;
use crate::utils::accept_language::{LanguageRange, best_match, parse_accept_language};
use crate::utils::language_context::{get_language, set_language};
use crate::utils::{ApiError, ApiResult};

pub type AllowedLanguagesProvider = Arc<dyn Fn() -> Vec<String> + Send + Sync>;
pub type DefaultLanguageProvider = Arc<dyn Fn() -> String + Send + Sync>;

/// What the resolver needs to read from an incoming request
pub trait LanguageRequest {
    fn cookie(&self, name: &str) -> Option<String>;

    /// Client preferences, most preferred first
    fn accept_languages(&self) -> Vec<LanguageRange>;
}

/// What the resolver needs to write on an outgoing response
pub trait LanguageResponse {
    fn set_cookie(&mut self, cookie: &Cookie<'_>) -> ApiResult<()>;
}

impl LanguageRequest for HeaderMap {
    fn cookie(&self, name: &str) -> Option<String> {
        CookieJar::from_headers(self).get(name).map(|c| c.value().to_string())
    }

    fn accept_languages(&self) -> Vec<LanguageRange> {
        let header = self
            .get_all(ACCEPT_LANGUAGE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .collect::<Vec<_>>()
            .join(",");
        parse_accept_language(&header)
    }
}

impl LanguageRequest for Parts {
    fn cookie(&self, name: &str) -> Option<String> {
        self.headers.cookie(name)
    }

    fn accept_languages(&self) -> Vec<LanguageRange> {
        self.headers.accept_languages()
    }
}

impl<B> LanguageRequest for Request<B> {
    fn cookie(&self, name: &str) -> Option<String> {
        self.headers().cookie(name)
    }

    fn accept_languages(&self) -> Vec<LanguageRange> {
        self.headers().accept_languages()
    }
}

impl LanguageResponse for HeaderMap {
    fn set_cookie(&mut self, cookie: &Cookie<'_>) -> ApiResult<()> {
        let value = HeaderValue::from_str(&cookie.encoded().to_string()).map_err(|e| {
            ApiError::internal_error(format!("Invalid language cookie header: {}", e))
        })?;
        self.append(SET_COOKIE, value);
        Ok(())
    }
}

impl<B> LanguageResponse for Response<B> {
    fn set_cookie(&mut self, cookie: &Cookie<'_>) -> ApiResult<()> {
        self.headers_mut().set_cookie(cookie)
    }
}

/// Resolves the request language and keeps the language cookie up to date
///
/// Providers are registered once during setup and called again on every
/// request, so they may return different sets over time.
#[derive(Clone, Default)]
pub struct LanguageResolver {
    allowed_languages: Option<AllowedLanguagesProvider>,
    default_language: Option<DefaultLanguageProvider>,
    cookie: CookieConfig,
}

impl std::fmt::Debug for LanguageResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageResolver")
            .field("allowed_languages", &self.allowed_languages.is_some())
            .field("default_language", &self.default_language.is_some())
            .field("cookie", &self.cookie)
            .finish()
    }
}

impl LanguageResolver {
    pub fn new(cookie: CookieConfig) -> Self {
        Self { allowed_languages: None, default_language: None, cookie }
    }

    /// Register the callback returning the allowed languages
    pub fn register_allowed_languages<F>(&mut self, provider: F) -> &mut Self
    where
        F: Fn() -> Vec<String> + Send + Sync + 'static,
    {
        self.allowed_languages = Some(Arc::new(provider));
        self
    }

    /// Register the callback returning the default language
    pub fn register_default_language<F>(&mut self, provider: F) -> &mut Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.default_language = Some(Arc::new(provider));
        self
    }

    pub fn cookie_config(&self) -> &CookieConfig {
        &self.cookie
    }

    pub fn allowed_languages(&self) -> ApiResult<Vec<String>> {
        let provider = self.allowed_languages.as_ref().ok_or_else(|| {
            ApiError::configuration(
                "no allowed languages provider registered, call register_allowed_languages",
            )
        })?;
        Ok(provider())
    }

    pub fn default_language(&self) -> ApiResult<String> {
        let provider = self.default_language.as_ref().ok_or_else(|| {
            ApiError::configuration(
                "no default language provider registered, call register_default_language",
            )
        })?;
        Ok(provider())
    }

    /// Resolve the language of `request` and store it for the current request
    ///
    /// A cookie value is trusted as is, even when it is no longer part of the
    /// allowed languages. An empty cookie counts as no cookie.
    pub fn resolve<R>(&self, request: &R) -> ApiResult<String>
    where
        R: LanguageRequest + ?Sized,
    {
        let allowed = self.allowed_languages()?;
        let default = self.default_language()?;

        let cookie_language =
            request.cookie(&self.cookie.name).filter(|language| !language.is_empty());

        let language = if let Some(language) = cookie_language {
            tracing::debug!("Language '{}' resolved from cookie '{}'", language, self.cookie.name);
            language
        } else if let Some(language) = best_match(&request.accept_languages(), &allowed) {
            tracing::debug!("Language '{}' resolved from Accept-Language", language);
            language
        } else {
            tracing::debug!("Language '{}' resolved from default", default);
            default
        };

        set_language(language.clone())?;
        Ok(language)
    }

    /// Write the current request's language into the language cookie
    ///
    /// The response is returned untouched when no language was resolved.
    pub fn persist<R>(&self, mut response: R) -> ApiResult<R>
    where
        R: LanguageResponse,
    {
        if let Some(language) = get_language()? {
            response.set_cookie(&self.build_cookie(language))?;
        }
        Ok(response)
    }

    /// Switch the current request's language
    ///
    /// Returns `false` and leaves the current language untouched when
    /// `language` is not allowed.
    pub fn change_language(&self, language: &str) -> ApiResult<bool> {
        let allowed = self.allowed_languages()?;
        if !allowed.iter().any(|candidate| candidate == language) {
            tracing::debug!("Ignoring change to disallowed language '{}'", language);
            return Ok(false);
        }

        set_language(language)?;
        tracing::debug!("Language changed to '{}'", language);
        Ok(true)
    }

    fn build_cookie(&self, language: String) -> Cookie<'static> {
        let max_age = i64::try_from(self.cookie.timeout_secs).unwrap_or(i64::MAX);
        let mut builder = Cookie::build((self.cookie.name.clone(), language))
            .path("/")
            .max_age(Duration::seconds(max_age))
            .secure(self.cookie.secure)
            .http_only(self.cookie.http_only);
        if let Some(domain) = &self.cookie.domain {
            builder = builder.domain(domain.clone());
        }
        builder.build()
    }
}
