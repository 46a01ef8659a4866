pub mod language;

pub use language::language_middleware;
