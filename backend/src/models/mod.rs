pub mod language;

pub use language::{
    ChangeLanguageRequest, CurrentLanguageResponse, HealthResponse, LanguagesResponse,
};
