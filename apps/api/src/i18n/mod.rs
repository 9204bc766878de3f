// Supported-language configuration and per-request active language selection.

pub mod active;
pub mod handlers;
pub mod languages;

pub use active::ActiveLanguage;
pub use languages::{LanguageChoice, SupportedLanguages};
