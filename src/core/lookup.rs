//! Primary-key lookups that turn a missing row into `Error::NotFound`.

use crate::errors::{Error, Result};
use sea_orm::{ConnectionTrait, EntityTrait, PrimaryKeyTrait};

/// Loads the row with `id` or fails with `Error::NotFound` naming `label`.
pub(crate) async fn require<E, C>(db: &C, label: &'static str, id: i64) -> Result<E::Model>
where
    E: EntityTrait,
    C: ConnectionTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i64>,
{
    E::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found(label, id))
}

/// Like [`require`] for an optional reference; `None` always passes.
pub(crate) async fn require_optional<E, C>(
    db: &C,
    label: &'static str,
    id: Option<i64>,
) -> Result<Option<E::Model>>
where
    E: EntityTrait,
    C: ConnectionTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i64>,
{
    match id {
        Some(id) => require::<E, C>(db, label, id).await.map(Some),
        None => Ok(None),
    }
}
