//! Multilingual field resolution.
//!
//! A translatable parent (e.g. a work experience) declares which of its
//! fields live in per-language translation rows. Reading such a field picks,
//! in order:
//!
//! 1. the translation in the active language,
//! 2. otherwise the first translation by storage order (language ascending),
//! 3. otherwise the parent's own stored value, or an empty string.
//!
//! Resolution never fails for a declared field. Asking for an undeclared
//! field is an error rather than a silent empty string.

use std::collections::BTreeMap;

use thiserror::Error;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{WorkExperienceRow, WorkExperienceTranslationRow};
use crate::resume::store::{StoreError, TranslationStore};

/// Suffix accepted on requested names, so `position_translated` reads `position`.
const TRANSLATED_SUFFIX: &str = "_translated";

/// Field names whose values are resolved through translations.
pub type MultilingualFields = &'static [&'static str];

/// A record whose declared fields are resolved through its translations.
pub trait Multilingual {
    const MULTILINGUAL_FIELDS: MultilingualFields;

    fn id(&self) -> Uuid;

    /// The value stored on the record itself, used when no translation exists.
    fn stored_value(&self, field: &str) -> Option<&str>;
}

/// One language variant of a [`Multilingual`] record.
pub trait Translation {
    fn language(&self) -> &str;

    fn field_value(&self, field: &str) -> Option<&str>;
}

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("'{0}' is not a multilingual field")]
    NotMultilingual(String),

    #[error("translation lookup failed: {0}")]
    Store(#[from] StoreError),
}

impl From<ResolveError> for AppError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NotMultilingual(name) => {
                AppError::NotFound(format!("Unknown multilingual field '{name}'"))
            }
            ResolveError::Store(e) => e.into(),
        }
    }
}

/// Maps a requested name onto a declared multilingual field.
pub fn declared_field<P: Multilingual>(requested: &str) -> Result<&'static str, ResolveError> {
    let name = requested
        .strip_suffix(TRANSLATED_SUFFIX)
        .unwrap_or(requested);
    P::MULTILINGUAL_FIELDS
        .iter()
        .copied()
        .find(|f| *f == name)
        .ok_or_else(|| ResolveError::NotMultilingual(requested.to_string()))
}

/// Chooses the translation a read should use: the active language if
/// present, otherwise the lowest language code.
pub fn select_translation<'a, T: Translation>(
    translations: &'a [T],
    active_language: &str,
) -> Option<&'a T> {
    translations
        .iter()
        .find(|t| t.language().eq_ignore_ascii_case(active_language))
        .or_else(|| translations.iter().min_by(|a, b| a.language().cmp(b.language())))
}

/// Resolves one field from already-loaded translations of `parent`.
pub fn resolve<P: Multilingual, T: Translation>(
    parent: &P,
    translations: &[T],
    field: &str,
    active_language: &str,
) -> Result<String, ResolveError> {
    let name = declared_field::<P>(field)?;
    Ok(value_from(parent, select_translation(translations, active_language), name))
}

/// Resolves every declared field of `parent` at once.
pub fn resolve_all<P: Multilingual, T: Translation>(
    parent: &P,
    translations: &[T],
    active_language: &str,
) -> BTreeMap<&'static str, String> {
    let chosen = select_translation(translations, active_language);
    P::MULTILINGUAL_FIELDS
        .iter()
        .map(|name| (*name, value_from(parent, chosen, name)))
        .collect()
}

/// Resolves one field by querying the store: first the active language,
/// then the first translation in storage order.
pub async fn resolve_with_store<P, S>(
    store: &S,
    parent: &P,
    field: &str,
    active_language: &str,
) -> Result<String, ResolveError>
where
    P: Multilingual + Sync,
    S: TranslationStore + ?Sized,
{
    let name = declared_field::<P>(field)?;

    let translation = match store.find_by_language(parent.id(), active_language).await? {
        Some(t) => Some(t),
        None => store.first(parent.id()).await?,
    };
    Ok(value_from(parent, translation.as_ref(), name))
}

fn value_from<P: Multilingual, T: Translation>(
    parent: &P,
    translation: Option<&T>,
    name: &str,
) -> String {
    match translation {
        Some(t) => t.field_value(name).unwrap_or_default().to_string(),
        None => parent.stored_value(name).unwrap_or_default().to_string(),
    }
}

impl Multilingual for WorkExperienceRow {
    const MULTILINGUAL_FIELDS: MultilingualFields =
        &["position", "company", "location", "contribution"];

    fn id(&self) -> Uuid {
        self.id
    }

    fn stored_value(&self, field: &str) -> Option<&str> {
        match field {
            "position" => self.position.as_deref(),
            "company" => self.company.as_deref(),
            "location" => self.location.as_deref(),
            "contribution" => self.contribution.as_deref(),
            _ => None,
        }
    }
}

impl Translation for WorkExperienceTranslationRow {
    fn language(&self) -> &str {
        &self.language
    }

    fn field_value(&self, field: &str) -> Option<&str> {
        match field {
            "position" => Some(&self.position),
            "company" => Some(&self.company),
            "location" => Some(&self.location),
            "contribution" => Some(&self.contribution),
            "keywords" => Some(&self.keywords),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::store::memory::MemoryTranslationStore;
    use crate::resume::test_support::{experience, translation};

    #[test]
    fn test_active_language_translation_wins() {
        let parent = experience();
        let rows = vec![
            translation(parent.id, "en", "software engineer"),
            translation(parent.id, "zh-hans", "软件工程师"),
        ];
        assert_eq!(
            resolve(&parent, &rows, "position", "en").unwrap(),
            "software engineer"
        );
        assert_eq!(
            resolve(&parent, &rows, "position", "zh-hans").unwrap(),
            "软件工程师"
        );
    }

    #[test]
    fn test_unmatched_language_falls_back_to_existing_translation() {
        let parent = experience();
        let rows = vec![
            translation(parent.id, "zh-hans", "软件工程师"),
            translation(parent.id, "en", "software engineer"),
        ];
        let value = resolve(&parent, &rows, "position", "fr-fr").unwrap();
        assert!(!value.is_empty());
        // Storage order is language ascending, so "en" comes first.
        assert_eq!(value, "software engineer");
    }

    #[test]
    fn test_no_translations_uses_stored_value() {
        let mut parent = experience();
        parent.position = Some("legacy title".to_string());
        let rows: Vec<WorkExperienceTranslationRow> = vec![];
        assert_eq!(
            resolve(&parent, &rows, "position", "en").unwrap(),
            "legacy title"
        );
    }

    #[test]
    fn test_no_translations_and_no_stored_value_is_empty() {
        let parent = experience();
        let rows: Vec<WorkExperienceTranslationRow> = vec![];
        assert_eq!(resolve(&parent, &rows, "company", "en").unwrap(), "");
    }

    #[test]
    fn test_language_match_is_case_insensitive() {
        let parent = experience();
        let rows = vec![
            translation(parent.id, "en", "engineer"),
            translation(parent.id, "zh-hans", "工程师"),
        ];
        assert_eq!(resolve(&parent, &rows, "position", "ZH-Hans").unwrap(), "工程师");
    }

    #[test]
    fn test_translated_suffix_is_accepted() {
        let parent = experience();
        let rows = vec![translation(parent.id, "en", "engineer")];
        assert_eq!(
            resolve(&parent, &rows, "position_translated", "en").unwrap(),
            "engineer"
        );
    }

    #[test]
    fn test_undeclared_field_is_an_error() {
        let parent = experience();
        let rows = vec![translation(parent.id, "en", "engineer")];
        assert!(matches!(
            resolve(&parent, &rows, "keywords", "en"),
            Err(ResolveError::NotMultilingual(name)) if name == "keywords"
        ));
        assert!(resolve(&parent, &rows, "is_public", "en").is_err());
    }

    #[test]
    fn test_resolve_all_uses_one_translation() {
        let parent = experience();
        let mut en = translation(parent.id, "en", "engineer");
        en.company = "Acme".to_string();
        en.location = "Berlin".to_string();
        let rows = vec![en];
        let values = resolve_all(&parent, &rows, "en");
        assert_eq!(values["position"], "engineer");
        assert_eq!(values["company"], "Acme");
        assert_eq!(values["location"], "Berlin");
        assert_eq!(values["contribution"], "");
        assert_eq!(values.len(), WorkExperienceRow::MULTILINGUAL_FIELDS.len());
    }

    #[tokio::test]
    async fn test_store_resolution_follows_active_language() {
        let parent = experience();
        let store = MemoryTranslationStore::with_rows(vec![
            translation(parent.id, "en", "software engineer"),
            translation(parent.id, "zh-hans", "软件工程师"),
        ]);

        let en = resolve_with_store(&store, &parent, "position", "en").await;
        assert_eq!(en.unwrap(), "software engineer");

        let zh = resolve_with_store(&store, &parent, "position", "zh-hans").await;
        assert_eq!(zh.unwrap(), "软件工程师");

        let fr = resolve_with_store(&store, &parent, "position", "fr-fr").await;
        assert_eq!(fr.unwrap(), "software engineer");
    }

    #[tokio::test]
    async fn test_fallback_uses_byte_order_on_both_paths() {
        // Locale collations skip punctuation and would put "zha" first.
        let parent = experience();
        let rows = vec![
            translation(parent.id, "zha", "zhuang"),
            translation(parent.id, "zh-tw", "traditional"),
        ];
        assert_eq!(select_translation(&rows, "en").unwrap().language, "zh-tw");

        let store = MemoryTranslationStore::with_rows(rows);
        let value = resolve_with_store(&store, &parent, "position", "en").await;
        assert_eq!(value.unwrap(), "traditional");
    }

    #[tokio::test]
    async fn test_store_resolution_without_translations() {
        let mut parent = experience();
        parent.location = Some("Shanghai".to_string());
        let store = MemoryTranslationStore::default();
        let value = resolve_with_store(&store, &parent, "location", "en").await;
        assert_eq!(value.unwrap(), "Shanghai");
    }
}
