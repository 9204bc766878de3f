use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::FieldErrors;
use crate::i18n::languages::normalize_code;
use crate::i18n::SupportedLanguages;
use crate::resume::coverage::LanguageCoverage;

pub const END_BEFORE_START: &str = "End date should not be earlier than start date!";
pub const REQUIRED: &str = "This field is required.";
pub const DUPLICATE_LANGUAGE: &str = "A translation in this language already exists.";

const MAX_TEXT_LEN: usize = 255;
const MAX_LANGUAGE_LEN: usize = 30;

/// A submitted translation form: the translated fields plus the parent's dates,
/// which are edited on the same form.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranslationForm {
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub position: String,
    #[serde(default)]
    pub company: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub contribution: String,
    #[serde(default)]
    pub keywords: String,
    pub date_start: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
}

/// A translation form that passed validation, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationDraft {
    /// Configured spelling of the language code.
    pub language: String,
    pub position: String,
    pub company: String,
    pub location: String,
    pub contribution: String,
    pub keywords: String,
    pub date_start: NaiveDate,
    pub date_end: Option<NaiveDate>,
}

/// Validates a form creating a new translation for a parent with `coverage`.
pub fn validate_create(
    form: &TranslationForm,
    languages: &SupportedLanguages,
    coverage: &LanguageCoverage<'_>,
) -> Result<TranslationDraft, FieldErrors> {
    let mut errors = FieldErrors::new();

    let language = form.language.trim();
    let canonical = if language.is_empty() {
        errors.add("language", REQUIRED);
        None
    } else {
        match languages.canonical(language) {
            Some(code) if coverage.is_filled(code) => {
                errors.add("language", DUPLICATE_LANGUAGE);
                None
            }
            Some(code) => Some(code.to_string()),
            None => {
                errors.add("language", invalid_choice(language));
                None
            }
        }
    };

    check_fields(form, &mut errors);
    finish(form, canonical, errors)
}

/// Validates a form updating the translation currently in `current_language`.
/// The language itself cannot change.
pub fn validate_update(
    form: &TranslationForm,
    current_language: &str,
) -> Result<TranslationDraft, FieldErrors> {
    let mut errors = FieldErrors::new();

    let language = form.language.trim();
    let canonical = if language.is_empty() {
        errors.add("language", REQUIRED);
        None
    } else if normalize_code(language) != normalize_code(current_language) {
        errors.add("language", invalid_choice(language));
        None
    } else {
        Some(current_language.to_string())
    };

    check_fields(form, &mut errors);
    finish(form, canonical, errors)
}

/// Adds an error on `date_end` when it is strictly earlier than `date_start`.
pub fn check_date_order(
    date_start: Option<NaiveDate>,
    date_end: Option<NaiveDate>,
    errors: &mut FieldErrors,
) {
    if let (Some(start), Some(end)) = (date_start, date_end) {
        if end < start {
            errors.add("date_end", END_BEFORE_START);
        }
    }
}

fn check_fields(form: &TranslationForm, errors: &mut FieldErrors) {
    if form.language.trim().chars().count() > MAX_LANGUAGE_LEN {
        errors.add("language", too_long(MAX_LANGUAGE_LEN));
    }
    for (field, value) in [
        ("position", &form.position),
        ("company", &form.company),
        ("location", &form.location),
    ] {
        let value = value.trim();
        if value.is_empty() {
            errors.add(field, REQUIRED);
        } else if value.chars().count() > MAX_TEXT_LEN {
            errors.add(field, too_long(MAX_TEXT_LEN));
        }
    }

    if form.date_start.is_none() {
        errors.add("date_start", REQUIRED);
    }
    check_date_order(form.date_start, form.date_end, errors);
}

fn finish(
    form: &TranslationForm,
    language: Option<String>,
    errors: FieldErrors,
) -> Result<TranslationDraft, FieldErrors> {
    errors.into_result()?;
    match (language, form.date_start) {
        (Some(language), Some(date_start)) => Ok(TranslationDraft {
            language,
            position: form.position.trim().to_string(),
            company: form.company.trim().to_string(),
            location: form.location.trim().to_string(),
            contribution: form.contribution.clone(),
            keywords: form.keywords.trim().to_string(),
            date_start,
            date_end: form.date_end,
        }),
        // Both are recorded as errors above when missing.
        _ => Err(FieldErrors::single("language", REQUIRED)),
    }
}

fn invalid_choice(value: &str) -> String {
    format!("Select a valid choice. {value} is not one of the available choices.")
}

fn too_long(max: usize) -> String {
    format!("Ensure this value has at most {max} characters.")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn languages() -> SupportedLanguages {
        SupportedLanguages::parse("en:English,fr:French,zh-hans:Chinese", "en").unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn form(language: &str) -> TranslationForm {
        TranslationForm {
            language: language.to_string(),
            position: "software engineer".to_string(),
            company: "Acme".to_string(),
            location: "Berlin".to_string(),
            contribution: "<p>Shipped things</p>".to_string(),
            keywords: "rust".to_string(),
            date_start: Some(date(2018, 3, 1)),
            date_end: Some(date(2020, 6, 30)),
        }
    }

    #[test]
    fn test_valid_create() {
        let langs = languages();
        let coverage = LanguageCoverage::new(&langs, ["en"]);
        let draft = validate_create(&form("ZH-Hans"), &langs, &coverage).unwrap();
        assert_eq!(draft.language, "zh-hans");
        assert_eq!(draft.position, "software engineer");
        assert_eq!(draft.date_end, Some(date(2020, 6, 30)));
    }

    #[test]
    fn test_duplicate_language_rejected_on_language_field() {
        let langs = languages();
        let coverage = LanguageCoverage::new(&langs, ["en", "zh-hans"]);
        let errors = validate_create(&form("en"), &langs, &coverage).unwrap_err();
        assert_eq!(errors.get("language").unwrap(), [DUPLICATE_LANGUAGE.to_string()]);
    }

    #[test]
    fn test_unknown_language_rejected() {
        let langs = languages();
        let coverage = LanguageCoverage::new(&langs, Vec::<String>::new());
        let errors = validate_create(&form("fr-fr"), &langs, &coverage).unwrap_err();
        assert!(errors.get("language").unwrap()[0].contains("fr-fr"));

        let errors = validate_create(&form(""), &langs, &coverage).unwrap_err();
        assert_eq!(errors.get("language").unwrap(), [REQUIRED.to_string()]);
    }

    #[test]
    fn test_end_before_start_rejected_with_exact_message() {
        let langs = languages();
        let coverage = LanguageCoverage::new(&langs, Vec::<String>::new());
        let mut f = form("en");
        f.date_start = Some(date(2020, 1, 10));
        f.date_end = Some(date(2020, 1, 1));
        let errors = validate_create(&f, &langs, &coverage).unwrap_err();
        assert_eq!(
            errors.get("date_end").unwrap(),
            ["End date should not be earlier than start date!".to_string()]
        );
    }

    #[test]
    fn test_same_start_and_end_is_allowed() {
        let langs = languages();
        let coverage = LanguageCoverage::new(&langs, Vec::<String>::new());
        let mut f = form("en");
        f.date_start = Some(date(2020, 1, 1));
        f.date_end = Some(date(2020, 1, 1));
        assert!(validate_create(&f, &langs, &coverage).is_ok());
    }

    #[test]
    fn test_open_ended_experience_is_allowed() {
        let langs = languages();
        let coverage = LanguageCoverage::new(&langs, Vec::<String>::new());
        let mut f = form("fr");
        f.date_end = None;
        assert_eq!(validate_create(&f, &langs, &coverage).unwrap().date_end, None);
    }

    #[test]
    fn test_required_fields_collected_together() {
        let langs = languages();
        let coverage = LanguageCoverage::new(&langs, Vec::<String>::new());
        let f = TranslationForm {
            language: "en".to_string(),
            ..Default::default()
        };
        let errors = validate_create(&f, &langs, &coverage).unwrap_err();
        for field in ["position", "company", "location", "date_start"] {
            assert_eq!(errors.get(field).unwrap(), [REQUIRED.to_string()], "{field}");
        }
        assert!(errors.get("language").is_none());
    }

    #[test]
    fn test_overlong_position_rejected() {
        let langs = languages();
        let coverage = LanguageCoverage::new(&langs, Vec::<String>::new());
        let mut f = form("en");
        f.position = "x".repeat(256);
        let errors = validate_create(&f, &langs, &coverage).unwrap_err();
        assert!(errors.get("position").unwrap()[0].contains("255"));
    }

    #[test]
    fn test_update_keeps_current_language() {
        let draft = validate_update(&form("EN"), "en").unwrap();
        assert_eq!(draft.language, "en");

        let errors = validate_update(&form("fr"), "en").unwrap_err();
        assert!(errors.get("language").is_some());
    }

    #[test]
    fn test_update_accepts_same_spellings_as_create() {
        let langs = SupportedLanguages::parse("en:English,zh-hans:Chinese", "en").unwrap();
        let coverage = LanguageCoverage::new(&langs, Vec::<String>::new());
        let created = validate_create(&form("zh_hans"), &langs, &coverage).unwrap();
        assert_eq!(created.language, "zh-hans");

        let updated = validate_update(&form("zh_hans"), &created.language).unwrap();
        assert_eq!(updated.language, "zh-hans");
        assert!(validate_update(&form(" ZH-Hans "), "zh-hans").is_ok());
    }

    #[test]
    fn test_update_rejects_bad_dates() {
        let mut f = form("en");
        f.date_end = Some(date(2017, 12, 31));
        let errors = validate_update(&f, "en").unwrap_err();
        assert_eq!(errors.get("date_end").unwrap(), [END_BEFORE_START.to_string()]);
    }
}
