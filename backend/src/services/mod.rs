pub mod language_resolver;

pub use language_resolver::{LanguageRequest, LanguageResolver, LanguageResponse};
