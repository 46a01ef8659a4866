pub mod accept_language;
pub mod error;
pub mod language_context;

pub use accept_language::{LanguageRange, best_match, parse_accept_language};
pub use error::{ApiError, ApiResult};
pub use language_context::{CurrentLanguage, current_language, get_language, set_language};
