use tracing::{debug, warn};

use crate::error::StoreError;
use crate::model::{Document, Question};
use crate::store::KeyValueStore;

pub const DOCUMENT_KEY: &str = "@QuestionBanks_v2";
/// Flat question list written by the single-list layout.
pub const LEGACY_KEY: &str = "@MyQuestionBank_v1";

/// Reads the whole document. Missing, unreadable or corrupt data all read as
/// an empty document.
pub fn load_document<S: KeyValueStore + ?Sized>(store: &S) -> Document {
    match try_load_document(store) {
        Ok(Some(doc)) => doc,
        Ok(None) => {
            debug!("no document stored yet");
            Document::default()
        }
        Err(e) => {
            warn!(error = %e, "cannot load document, starting empty");
            Document::default()
        }
    }
}

/// Reads the whole document, reporting unreadable or corrupt data.
pub fn try_load_document<S: KeyValueStore + ?Sized>(store: &S) -> Result<Option<Document>, StoreError> {
    let Some(content) = store.get(DOCUMENT_KEY)? else {
        return Ok(None);
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| StoreError::Decode {
            key: DOCUMENT_KEY.to_string(),
            source,
        })
}

/// Replaces the stored document with `doc`.
pub fn save_document<S: KeyValueStore + ?Sized>(store: &mut S, doc: &Document) -> Result<(), StoreError> {
    let json = serde_json::to_string(doc)?;
    store.set(DOCUMENT_KEY, &json)?;
    debug!(banks = doc.question_banks.len(), bytes = json.len(), "document saved");
    Ok(())
}

pub fn clear_document<S: KeyValueStore + ?Sized>(store: &mut S) -> Result<(), StoreError> {
    store.remove(DOCUMENT_KEY)
}

pub fn load_legacy<S: KeyValueStore + ?Sized>(store: &S) -> Result<Option<Vec<Question>>, StoreError> {
    let Some(content) = store.get(LEGACY_KEY)? else {
        return Ok(None);
    };
    serde_json::from_str(&content)
        .map(Some)
        .map_err(|source| StoreError::Decode {
            key: LEGACY_KEY.to_string(),
            source,
        })
}

pub fn remove_legacy<S: KeyValueStore + ?Sized>(store: &mut S) -> Result<(), StoreError> {
    store.remove(LEGACY_KEY)
}
