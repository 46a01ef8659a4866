mod common;
mod language_api_test;
