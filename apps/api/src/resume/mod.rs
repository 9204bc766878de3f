// Work experiences with per-language translations, and portfolio projects.
// Multilingual reads go through `multilingual`; writes are validated in
// `validation` and persisted through the `TranslationStore` seam.

pub mod coverage;
pub mod experiences;
pub mod handlers;
pub mod multilingual;
pub mod projects;
pub mod service;
pub mod store;
pub mod validation;

#[cfg(test)]
pub mod test_support;
