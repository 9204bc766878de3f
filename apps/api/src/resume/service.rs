use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::i18n::SupportedLanguages;
use crate::models::resume::WorkExperienceTranslationRow;
use crate::resume::coverage::coverage_for;
use crate::resume::store::TranslationStore;
use crate::resume::validation::{validate_create, validate_update, TranslationForm};

/// Adds a translation to an existing work experience.
///
/// The duplicate-language pre-check reports on the `language` field; a
/// concurrent writer that slips past it is caught by the unique constraint
/// and reported the same way.
pub async fn create_translation<S>(
    store: &S,
    languages: &SupportedLanguages,
    parent_id: Uuid,
    form: &TranslationForm,
) -> Result<WorkExperienceTranslationRow, AppError>
where
    S: TranslationStore + ?Sized,
{
    let coverage = coverage_for(store, languages, parent_id).await?;
    let draft = validate_create(form, languages, &coverage)?;
    let row = store.insert(parent_id, &draft).await?;

    info!(
        "Created {} translation {} for work experience {parent_id}",
        row.language, row.id
    );
    Ok(row)
}

/// Rewrites an existing translation and its parent's dates.
pub async fn update_translation<S>(
    store: &S,
    current: &WorkExperienceTranslationRow,
    form: &TranslationForm,
) -> Result<WorkExperienceTranslationRow, AppError>
where
    S: TranslationStore + ?Sized,
{
    let draft = validate_update(form, &current.language)?;
    let row = store.update(current.id, &draft).await?;

    info!("Updated {} translation {}", row.language, row.id);
    Ok(row)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::resume::store::memory::MemoryTranslationStore;
    use crate::resume::validation::END_BEFORE_START;

    fn languages() -> SupportedLanguages {
        SupportedLanguages::parse("en:English,zh-hans:Chinese", "en").unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn form(language: &str, position: &str) -> TranslationForm {
        TranslationForm {
            language: language.to_string(),
            position: position.to_string(),
            company: "Acme".to_string(),
            location: "Shanghai".to_string(),
            date_start: Some(date(2019, 1, 1)),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_second_translation_in_same_language_is_rejected() {
        let store = MemoryTranslationStore::default();
        let langs = languages();
        let parent = Uuid::new_v4();

        create_translation(&store, &langs, parent, &form("en", "engineer"))
            .await
            .unwrap();
        let err = create_translation(&store, &langs, parent, &form("en", "again"))
            .await
            .unwrap_err();

        match err {
            AppError::Form(errors) => assert!(errors.get("language").is_some()),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.count(parent, "en"), 1);
    }

    #[tokio::test]
    async fn test_invalid_dates_persist_nothing() {
        let store = MemoryTranslationStore::default();
        let langs = languages();
        let parent = Uuid::new_v4();

        let mut f = form("en", "engineer");
        f.date_start = Some(date(2020, 5, 1));
        f.date_end = Some(date(2020, 4, 1));
        let err = create_translation(&store, &langs, parent, &f)
            .await
            .unwrap_err();

        match err {
            AppError::Form(errors) => {
                assert_eq!(errors.get("date_end").unwrap(), [END_BEFORE_START.to_string()])
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.count(parent, "en"), 0);
        assert!(store.parent_dates(parent).is_none());
    }

    #[tokio::test]
    async fn test_create_writes_parent_dates() {
        let store = MemoryTranslationStore::default();
        let langs = languages();
        let parent = Uuid::new_v4();

        let mut f = form("zh-hans", "软件工程师");
        f.date_end = Some(date(2021, 2, 1));
        let row = create_translation(&store, &langs, parent, &f).await.unwrap();

        assert_eq!(row.language, "zh-hans");
        assert_eq!(
            store.parent_dates(parent),
            Some((date(2019, 1, 1), Some(date(2021, 2, 1))))
        );
    }

    #[tokio::test]
    async fn test_update_rejects_bad_dates_and_keeps_row() {
        let store = MemoryTranslationStore::default();
        let langs = languages();
        let parent = Uuid::new_v4();
        let row = create_translation(&store, &langs, parent, &form("en", "engineer"))
            .await
            .unwrap();

        let mut f = form("en", "staff engineer");
        f.date_end = Some(date(2018, 1, 1));
        assert!(update_translation(&store, &row, &f).await.is_err());

        let stored = store.get(row.id).await.unwrap().unwrap();
        assert_eq!(stored.position, "engineer");
        assert_eq!(store.parent_dates(parent), Some((date(2019, 1, 1), None)));
    }

    #[tokio::test]
    async fn test_update_changes_fields_not_language() {
        let store = MemoryTranslationStore::default();
        let langs = languages();
        let parent = Uuid::new_v4();
        let row = create_translation(&store, &langs, parent, &form("en", "engineer"))
            .await
            .unwrap();

        let updated = update_translation(&store, &row, &form("en", "staff engineer"))
            .await
            .unwrap();
        assert_eq!(updated.position, "staff engineer");
        assert_eq!(updated.language, "en");

        assert!(update_translation(&store, &row, &form("zh-hans", "x"))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_storage_conflict_maps_to_language_error() {
        let store = MemoryTranslationStore::default();
        let parent = Uuid::new_v4();
        let draft = validate_update(&form("en", "engineer"), "en").unwrap();

        // A concurrent writer inserted directly, bypassing the pre-check.
        store.insert(parent, &draft).await.unwrap();
        let err: AppError = store.insert(parent, &draft).await.unwrap_err().into();
        match err {
            AppError::Conflict(errors) => assert!(errors.get("language").is_some()),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(store.count(parent, "en"), 1);
    }
}
