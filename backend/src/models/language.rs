use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::utils::CurrentLanguage;

/// Current request language
#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentLanguageResponse {
    #[schema(value_type = String, example = "en")]
    pub language: CurrentLanguage,
}

/// Change language request
#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeLanguageRequest {
    /// Ignored when missing or not an allowed language
    #[schema(example = "fr")]
    pub language: Option<String>,
}

/// Language settings as seen by the current request
#[derive(Debug, Serialize, ToSchema)]
pub struct LanguagesResponse {
    pub allowed: Vec<String>,
    pub default: String,
    #[schema(value_type = String, example = "en")]
    pub current: CurrentLanguage,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}
