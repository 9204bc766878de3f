use std::collections::BTreeSet;

use serde::Serialize;
use uuid::Uuid;

use crate::i18n::languages::normalize_code;
use crate::i18n::{LanguageChoice, SupportedLanguages};
use crate::resume::store::{StoreError, TranslationStore};

/// Which configured languages a parent already has translations for.
///
/// `filled` and `unfilled` always partition the configured languages.
/// Translations in languages that were later removed from the
/// configuration are reported separately as `legacy`.
#[derive(Debug, Clone)]
pub struct LanguageCoverage<'a> {
    languages: &'a SupportedLanguages,
    filled: BTreeSet<String>,
    legacy: BTreeSet<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CoverageSummary {
    pub filled_languages: Vec<String>,
    pub unfilled_languages: Vec<LanguageChoice>,
    pub legacy_languages: Vec<String>,
    pub are_all_languages_created: bool,
}

impl<'a> LanguageCoverage<'a> {
    pub fn new<I, S>(languages: &'a SupportedLanguages, existing: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filled = BTreeSet::new();
        let mut legacy = BTreeSet::new();
        for code in existing {
            match languages.canonical(code.as_ref()) {
                Some(configured) => {
                    filled.insert(configured.to_string());
                }
                None => {
                    legacy.insert(normalize_code(code.as_ref()));
                }
            }
        }
        Self {
            languages,
            filled,
            legacy,
        }
    }

    pub fn filled_languages(&self) -> &BTreeSet<String> {
        &self.filled
    }

    pub fn unfilled_languages(&self) -> BTreeSet<String> {
        self.languages
            .codes()
            .filter(|code| !self.filled.contains(*code))
            .map(String::from)
            .collect()
    }

    /// Unfilled languages as selector choices, in configured display order.
    pub fn unfilled_language_choices(&self) -> Vec<LanguageChoice> {
        self.languages
            .choices()
            .iter()
            .filter(|choice| !self.filled.contains(&choice.code))
            .cloned()
            .collect()
    }

    pub fn legacy_languages(&self) -> &BTreeSet<String> {
        &self.legacy
    }

    pub fn is_filled(&self, code: &str) -> bool {
        self.languages
            .canonical(code)
            .is_some_and(|c| self.filled.contains(c))
    }

    /// True once no configured language is left to add.
    pub fn all_filled(&self) -> bool {
        self.filled.len() == self.languages.len()
    }

    pub fn summary(&self) -> CoverageSummary {
        CoverageSummary {
            filled_languages: self.filled.iter().cloned().collect(),
            unfilled_languages: self.unfilled_language_choices(),
            legacy_languages: self.legacy.iter().cloned().collect(),
            are_all_languages_created: self.all_filled(),
        }
    }
}

/// The only choice offered when editing an existing translation: its own language.
pub fn update_language_choices(
    languages: &SupportedLanguages,
    current_language: &str,
) -> Vec<LanguageChoice> {
    let current = normalize_code(current_language);
    languages
        .choices()
        .iter()
        .filter(|choice| choice.code == current)
        .cloned()
        .collect()
}

/// Loads the coverage of one parent from the store.
pub async fn coverage_for<'a, S>(
    store: &S,
    languages: &'a SupportedLanguages,
    parent_id: Uuid,
) -> Result<LanguageCoverage<'a>, StoreError>
where
    S: TranslationStore + ?Sized,
{
    let existing = store.languages(parent_id).await?;
    Ok(LanguageCoverage::new(languages, existing))
}
