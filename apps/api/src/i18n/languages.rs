use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// A configured language: its code and the label shown in selectors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LanguageChoice {
    pub code: String,
    pub label: String,
}

impl LanguageChoice {
    pub fn new(code: &str, label: &str) -> Self {
        Self {
            code: normalize_code(code),
            label: label.trim().to_string(),
        }
    }
}

/// The ordered set of languages translations may be written in.
///
/// Order is the display order used for selector choices. Codes are stored
/// lower-cased; all lookups are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedLanguages {
    choices: Vec<LanguageChoice>,
    default_code: String,
}

impl SupportedLanguages {
    pub fn new(choices: Vec<LanguageChoice>, default_code: &str) -> Result<Self> {
        if choices.is_empty() {
            bail!("At least one language must be configured");
        }
        for (i, choice) in choices.iter().enumerate() {
            if choice.code.is_empty() {
                bail!("Language codes cannot be empty");
            }
            if choices[..i].iter().any(|c| c.code == choice.code) {
                bail!("Language '{}' is configured twice", choice.code);
            }
        }
        let default_code = normalize_code(default_code);
        if !choices.iter().any(|c| c.code == default_code) {
            bail!("Default language '{default_code}' is not among the configured languages");
        }
        Ok(Self {
            choices,
            default_code,
        })
    }

    /// Parses `code:Label` pairs separated by commas, e.g. `en:English,fr:French`.
    /// A pair without a label uses the code as its label.
    pub fn parse(raw: &str, default_code: &str) -> Result<Self> {
        let choices = raw
            .split(',')
            .map(str::trim)
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once(':') {
                Some((code, label)) => LanguageChoice::new(code, label),
                None => LanguageChoice::new(pair, pair),
            })
            .collect();
        Self::new(choices, default_code)
    }

    pub fn choices(&self) -> &[LanguageChoice] {
        &self.choices
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.choices.iter().map(|c| c.code.as_str())
    }

    pub fn default_code(&self) -> &str {
        &self.default_code
    }

    /// Returns the configured spelling of `code`, if it is configured.
    pub fn canonical(&self, code: &str) -> Option<&str> {
        let code = normalize_code(code);
        self.codes().find(|c| *c == code)
    }

    pub fn label(&self, code: &str) -> Option<&str> {
        let code = normalize_code(code);
        self.choices
            .iter()
            .find(|c| c.code == code)
            .map(|c| c.label.as_str())
    }

    pub fn len(&self) -> usize {
        self.choices.len()
    }
}

pub fn normalize_code(code: &str) -> String {
    code.trim().replace('_', "-").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn languages() -> SupportedLanguages {
        SupportedLanguages::parse("en:English, fr:French, zh-hans:Chinese", "en").unwrap()
    }

    #[test]
    fn test_parse_preserves_display_order() {
        let langs = languages();
        assert_eq!(langs.codes().collect::<Vec<_>>(), vec!["en", "fr", "zh-hans"]);
        assert_eq!(langs.label("fr"), Some("French"));
        assert_eq!(langs.len(), 3);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let langs = languages();
        assert_eq!(langs.canonical("zh-Hans"), Some("zh-hans"));
        assert_eq!(langs.canonical("ZH_HANS"), Some("zh-hans"));
        assert_eq!(langs.canonical("EN"), Some("en"));
        assert_eq!(langs.canonical("fr-fr"), None);
    }

    #[test]
    fn test_code_without_label_uses_code() {
        let langs = SupportedLanguages::parse("en,de", "de").unwrap();
        assert_eq!(langs.label("de"), Some("de"));
        assert_eq!(langs.default_code(), "de");
    }

    #[test]
    fn test_rejects_unknown_default() {
        assert!(SupportedLanguages::parse("en:English", "fr").is_err());
    }

    #[test]
    fn test_rejects_duplicates_and_empty() {
        assert!(SupportedLanguages::parse("en:English,EN:Again", "en").is_err());
        assert!(SupportedLanguages::parse(" , ", "en").is_err());
    }
}
