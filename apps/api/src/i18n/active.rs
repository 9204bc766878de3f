use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRequestParts, Query},
    http::{header::ACCEPT_LANGUAGE, request::Parts, Uri},
};
use serde::Deserialize;

use crate::i18n::languages::{normalize_code, SupportedLanguages};
use crate::state::AppState;

/// The language in effect for the current request.
///
/// Taken from the `lang` query parameter, then the `Accept-Language` header,
/// then the configured default. Only configured languages are ever selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveLanguage(pub String);

#[derive(Debug, Deserialize)]
struct LangQuery {
    lang: Option<String>,
}

impl ActiveLanguage {
    pub fn code(&self) -> &str {
        &self.0
    }
}

#[async_trait]
impl FromRequestParts<AppState> for ActiveLanguage {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let requested = lang_from_uri(&parts.uri);
        let accept = parts
            .headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok());
        Ok(ActiveLanguage(negotiate(
            &state.config.languages,
            requested.as_deref(),
            accept,
        )))
    }
}

/// Picks the active language code for a request.
pub fn negotiate(
    languages: &SupportedLanguages,
    requested: Option<&str>,
    accept_language: Option<&str>,
) -> String {
    if let Some(code) = requested.and_then(|r| match_language(languages, r)) {
        return code.to_string();
    }

    if let Some(header) = accept_language {
        for tag in parse_accept_language(header) {
            if let Some(code) = match_language(languages, &tag) {
                return code.to_string();
            }
        }
    }

    languages.default_code().to_string()
}

/// Maps a language tag onto a configured code.
///
/// Tries the exact tag, then the tag with trailing subtags removed
/// (`en-us` -> `en`), then any configured code sharing the primary subtag
/// (`zh-cn` -> `zh-hans`).
pub fn match_language<'a>(languages: &'a SupportedLanguages, tag: &str) -> Option<&'a str> {
    let tag = normalize_code(tag);
    if tag.is_empty() || tag == "*" {
        return None;
    }

    let mut candidate = tag.as_str();
    loop {
        if let Some(code) = languages.canonical(candidate) {
            return Some(code);
        }
        match candidate.rsplit_once('-') {
            Some((head, _)) => candidate = head,
            None => break,
        }
    }

    let primary = tag.split('-').next().unwrap_or_default();
    languages
        .codes()
        .find(|code| code.split('-').next() == Some(primary))
}

/// Returns the tags of an `Accept-Language` header ordered by quality.
/// Tags with `q=0` are dropped.
fn parse_accept_language(header: &str) -> Vec<String> {
    let mut weighted: Vec<(String, f32)> = header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let tag = parts.next()?.trim();
            if tag.is_empty() {
                return None;
            }
            let quality = parts
                .filter_map(|p| p.trim().strip_prefix("q="))
                .find_map(|q| q.trim().parse::<f32>().ok())
                .unwrap_or(1.0);
            (quality > 0.0).then(|| (tag.to_string(), quality))
        })
        .collect();

    // Stable sort keeps header order among equal weights.
    weighted.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    weighted.into_iter().map(|(tag, _)| tag).collect()
}

/// The decoded `lang` query parameter. A malformed query counts as absent.
fn lang_from_uri(uri: &Uri) -> Option<String> {
    Query::<LangQuery>::try_from_uri(uri)
        .ok()
        .and_then(|Query(q)| q.lang)
        .filter(|value| !value.trim().is_empty())
}
