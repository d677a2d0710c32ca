use tracing::{error, info};

use crate::error::StoreError;
use crate::persist;
use crate::store::KeyValueStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationOutcome {
    /// No legacy list is stored.
    NothingToMigrate,
    /// The legacy list was moved into the default bank.
    Migrated(usize),
    /// The default bank already has questions; the legacy list is left alone.
    Skipped,
    /// Logged and ignored; whatever the current document holds stays in use.
    Failed,
}

/// Moves the flat legacy question list into the default bank.
///
/// Must run before anything else reads the document. Never fails: errors are
/// logged and reported as [`MigrationOutcome::Failed`].
pub fn migrate_legacy<S: KeyValueStore + ?Sized>(store: &mut S) -> MigrationOutcome {
    match try_migrate(store) {
        Ok(outcome) => outcome,
        Err(e) => {
            error!(error = %e, "legacy migration failed, continuing with current data");
            MigrationOutcome::Failed
        }
    }
}

fn try_migrate<S: KeyValueStore + ?Sized>(store: &mut S) -> Result<MigrationOutcome, StoreError> {
    let Some(legacy) = persist::load_legacy(store)? else {
        return Ok(MigrationOutcome::NothingToMigrate);
    };

    // an unreadable document must not be replaced by one holding only the legacy list
    let mut doc = persist::try_load_document(store)?.unwrap_or_default();
    let bank = doc.ensure_default_bank();
    if !bank.questions.is_empty() {
        info!(
            existing = bank.questions.len(),
            legacy = legacy.len(),
            "default bank already populated, skipping legacy migration"
        );
        return Ok(MigrationOutcome::Skipped);
    }

    let count = legacy.len();
    bank.questions = legacy;
    bank.touch();

    persist::save_document(store, &doc)?;
    persist::remove_legacy(store)?;
    info!(questions = count, "migrated legacy questions into the default bank");
    Ok(MigrationOutcome::Migrated(count))
}
