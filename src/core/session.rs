//! Per-session "current project" selection.
//!
//! The selection is keyed by the client's session key, so concurrent clients
//! each keep their own current project.

use crate::{
    core::lookup,
    entities::{Project, Session, project, session},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use tracing::info;

fn check_key(session_key: &str) -> Result<&str> {
    let key = session_key.trim();
    if key.is_empty() {
        return Err(Error::validation("session key cannot be empty"));
    }
    Ok(key)
}

async fn find_session<C>(db: &C, key: &str) -> Result<Option<session::Model>>
where
    C: ConnectionTrait,
{
    Session::find()
        .filter(session::Column::SessionKey.eq(key))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Makes `project_id` the current project of `session_key`.
pub async fn select_project<C>(db: &C, session_key: &str, project_id: i64) -> Result<project::Model>
where
    C: ConnectionTrait,
{
    let key = check_key(session_key)?;
    let project = lookup::require::<Project, _>(db, "Project", project_id).await?;
    let now = chrono::Utc::now();

    match find_session(db, key).await? {
        Some(existing) => {
            let mut model: session::ActiveModel = existing.into();
            model.selected_project_id = Set(Some(project.id));
            model.updated_at = Set(now);
            model.update(db).await?;
        }
        None => {
            session::ActiveModel {
                session_key: Set(key.to_string()),
                selected_project_id: Set(Some(project.id)),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }
    }

    info!(session = key, project_id, "Project selected");
    Ok(project)
}

/// The current project of `session_key`, if one is selected.
pub async fn selected_project<C>(db: &C, session_key: &str) -> Result<Option<project::Model>>
where
    C: ConnectionTrait,
{
    let key = check_key(session_key)?;
    let Some(selected_id) = find_session(db, key)
        .await?
        .and_then(|s| s.selected_project_id)
    else {
        return Ok(None);
    };

    Project::find_by_id(selected_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Like [`selected_project`], but a missing selection is an error.
pub async fn require_selected_project<C>(db: &C, session_key: &str) -> Result<project::Model>
where
    C: ConnectionTrait,
{
    selected_project(db, session_key)
        .await?
        .ok_or_else(|| Error::not_found("Selected project for session", session_key.trim()))
}

/// Forgets the current project of `session_key`. A no-op for unknown keys.
pub async fn clear_selection<C>(db: &C, session_key: &str) -> Result<()>
where
    C: ConnectionTrait,
{
    let key = check_key(session_key)?;
    if let Some(existing) = find_session(db, key).await? {
        let mut model: session::ActiveModel = existing.into();
        model.selected_project_id = Set(None);
        model.updated_at = Set(chrono::Utc::now());
        model.update(db).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;
    use sea_orm::PaginatorTrait;

    #[tokio::test]
    async fn test_selection_is_per_session() -> Result<()> {
        let (db, first) = setup_with_project().await?;
        let second = create_test_project(&db, "Second").await?;

        select_project(&db, "tablet", first.id).await?;
        select_project(&db, "laptop", second.id).await?;

        let tablet = selected_project(&db, "tablet").await?;
        let laptop = selected_project(&db, "laptop").await?;
        assert_eq!(tablet.map(|p| p.id), Some(first.id));
        assert_eq!(laptop.map(|p| p.id), Some(second.id));

        // Re-selecting overwrites the same row
        select_project(&db, "tablet", second.id).await?;
        assert_eq!(Session::find().count(&db).await?, 2);
        let tablet = require_selected_project(&db, "tablet").await?;
        assert_eq!(tablet.id, second.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_select_missing_project_fails() -> Result<()> {
        let db = setup_test_db().await?;
        let result = select_project(&db, "tablet", 999).await;
        assert!(matches!(result, Err(Error::NotFound { .. })));
        assert!(selected_project(&db, "tablet").await?.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_clear_selection() -> Result<()> {
        let (db, project) = setup_with_project().await?;
        select_project(&db, "tablet", project.id).await?;
        clear_selection(&db, "tablet").await?;

        assert!(selected_project(&db, "tablet").await?.is_none());
        assert!(matches!(
            require_selected_project(&db, "tablet").await,
            Err(Error::NotFound { .. })
        ));
        clear_selection(&db, "never-seen").await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_blank_session_key_rejected() -> Result<()> {
        let (db, project) = setup_with_project().await?;
        let result = select_project(&db, "  ", project.id).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        Ok(())
    }
}
