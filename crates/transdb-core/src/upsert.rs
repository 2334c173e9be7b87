//! Translation create-or-update.

use tracing::trace;

use crate::error::{Error, Result};
use crate::model::{RowId, Upserted};
use crate::store::Store;

/// Write `content` as the translation of `string_id` in `language_id`.
///
/// Updates the existing row in place when there is one (its id is kept),
/// inserts otherwise. When the caller already knows the row id it can pass
/// it as `existing_id`; an id that does not belong to this string/language
/// pair is rejected with [`Error::Conflict`] instead of being re-linked.
pub fn upsert_translation(
    store: &Store,
    string_id: RowId,
    language_id: RowId,
    content: &str,
    existing_id: Option<RowId>,
) -> Result<Upserted> {
    if let Some(id) = existing_id {
        check_association(store, id, string_id, language_id)?;
    }

    match store.find_translation(string_id, language_id)? {
        Some(found) => {
            if let Some(id) = existing_id.filter(|id| *id != found.id) {
                return Err(Error::Conflict(format!(
                    "translation {id} does not match translation {} of string {string_id} \
                     in language {language_id}",
                    found.id
                )));
            }
            if found.content != content {
                store.update_translation_content(found.id, content)?;
            }
            trace!(id = found.id, string_id, language_id, "translation updated");
            Ok(Upserted {
                id: found.id,
                created: false,
            })
        }
        None => {
            let (id, created) = store.insert_translation_if_absent(string_id, language_id, content)?;
            if created {
                trace!(id, string_id, language_id, "translation inserted");
            } else {
                // Created by another writer since the lookup.
                store.update_translation_content(id, content)?;
                trace!(id, string_id, language_id, "translation updated");
            }
            Ok(Upserted { id, created })
        }
    }
}

/// Overwrite an existing translation. Fails with [`Error::NotFound`] when the
/// string has no translation in `language_id` yet.
pub fn update_existing_translation(
    store: &Store,
    string_id: RowId,
    language_id: RowId,
    content: &str,
) -> Result<Upserted> {
    let found = store
        .find_translation(string_id, language_id)?
        .ok_or_else(|| {
            Error::NotFound(format!(
                "translation of string {string_id} in language {language_id}"
            ))
        })?;
    upsert_translation(store, string_id, language_id, content, Some(found.id))
}

fn check_association(
    store: &Store,
    id: RowId,
    string_id: RowId,
    language_id: RowId,
) -> Result<()> {
    let Some(row) = store.get_translation(id)? else {
        return Err(Error::NotFound(format!("translation {id}")));
    };
    if row.string_id != string_id || row.language_id != language_id {
        return Err(Error::Conflict(format!(
            "translation {id} belongs to string {} in language {}, not string {string_id} \
             in language {language_id}",
            row.string_id, row.language_id
        )));
    }
    Ok(())
}
