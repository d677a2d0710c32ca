use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::IdPolicy;
use crate::error::{Error, Result, StoreError, ValidationError};
use crate::migrate::{self, MigrationOutcome};
use crate::model::{new_id, Document, Question, QuestionBank, QuestionDraft};
use crate::persist;
use crate::store::KeyValueStore;

/// Bank and question operations over one stored document.
///
/// Every operation holds the store lock for its whole load, mutate, save
/// cycle, so concurrent callers are serialized and no write is lost.
pub struct Repository<S: KeyValueStore> {
    store: Mutex<S>,
    policy: IdPolicy,
    migration: MigrationOutcome,
}

impl<S: KeyValueStore> Repository<S> {
    /// Takes ownership of the backend and runs the legacy migration once.
    pub fn open(mut store: S, policy: IdPolicy) -> Self {
        let migration = migrate::migrate_legacy(&mut store);
        debug!(?migration, ?policy, "repository opened");
        Self {
            store: Mutex::new(store),
            policy,
            migration,
        }
    }

    /// Hands the backend back.
    pub fn close(self) -> S {
        match self.store.into_inner() {
            Ok(store) => store,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn migration(&self) -> MigrationOutcome {
        self.migration
    }

    /// All banks in storage order. Seeds the default bank into an empty store.
    pub fn list_banks(&self) -> Result<Vec<QuestionBank>> {
        let mut store = self.lock()?;
        let mut doc = persist::load_document(&*store);
        if doc.seed_default() {
            info!("seeding default bank");
            if let Err(e) = persist::save_document(&mut *store, &doc) {
                warn!(error = %e, "cannot persist seeded default bank");
            }
        }
        Ok(doc.question_banks)
    }

    pub fn get_bank(&self, id: &str) -> Result<Option<QuestionBank>> {
        Ok(self.read(|doc| doc.bank(id).cloned())?)
    }

    pub fn create_bank(&self, name: &str, description: &str) -> Result<QuestionBank> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyBankName.into());
        }
        let bank = QuestionBank::new(name, description.trim());
        self.update(|doc| {
            doc.question_banks.push(bank.clone());
            Ok(())
        })?;
        info!(id = %bank.id, name = %bank.name, "bank created");
        Ok(bank)
    }

    /// Renames a bank; `description: None` keeps the current one.
    pub fn update_bank(&self, id: &str, name: &str, description: Option<&str>) -> Result<QuestionBank> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyBankName.into());
        }
        self.update(|doc| {
            let bank = doc.bank_mut(id).ok_or_else(|| bank_not_found(id))?;
            bank.name = name.to_string();
            if let Some(description) = description {
                bank.description = description.trim().to_string();
            }
            bank.touch();
            Ok(bank.clone())
        })
    }

    /// Removes a bank with all of its questions. The default bank is refused
    /// before anything is written.
    pub fn delete_bank(&self, id: &str) -> Result<()> {
        let policy = self.policy;
        self.update(|doc| {
            match doc.bank(id) {
                Some(bank) if bank.is_default => {
                    return Err(Error::ProtectedResource {
                        bank_id: id.to_string(),
                    })
                }
                Some(_) => {}
                None if policy == IdPolicy::Strict => return Err(bank_not_found(id)),
                None => {
                    debug!(id, "delete of unknown bank ignored");
                    return Ok(());
                }
            }
            doc.question_banks.retain(|b| b.id != id);
            info!(id, "bank deleted");
            Ok(())
        })
    }

    /// Questions of a bank in insertion order. An unknown bank lists as empty
    /// unless ids are strict.
    pub fn list_questions(&self, bank_id: &str) -> Result<Vec<Question>> {
        let found = self.read(|doc| doc.bank(bank_id).map(|b| b.questions.clone()))?;
        match found {
            Some(questions) => Ok(questions),
            None if self.policy == IdPolicy::Strict => Err(bank_not_found(bank_id)),
            None => {
                debug!(bank_id, "listing unknown bank");
                Ok(Vec::new())
            }
        }
    }

    pub fn get_question(&self, bank_id: &str, question_id: &str) -> Result<Option<Question>> {
        Ok(self.read(|doc| {
            doc.bank(bank_id)
                .and_then(|b| b.question(question_id))
                .cloned()
        })?)
    }

    /// Creates the question when `draft.id` is unset, otherwise replaces the
    /// question with that id in place.
    pub fn upsert_question(&self, bank_id: &str, draft: QuestionDraft) -> Result<Question> {
        let draft = draft.prepare()?;
        let policy = self.policy;
        self.update(|doc| {
            let bank = doc.bank_mut(bank_id).ok_or_else(|| bank_not_found(bank_id))?;

            let saved = match draft.id.clone() {
                None => {
                    let question = draft.into_question(new_id(), Utc::now());
                    bank.questions.push(question.clone());
                    question
                }
                Some(id) => match bank.questions.iter().position(|q| q.id == id) {
                    Some(pos) => {
                        let created_at = bank.questions[pos].created_at;
                        let question = draft.into_question(id, created_at);
                        bank.questions[pos] = question.clone();
                        question
                    }
                    None if policy == IdPolicy::Strict => {
                        return Err(Error::NotFound {
                            what: "question",
                            id,
                        })
                    }
                    None => {
                        debug!(%id, bank_id, "update of unknown question appends it");
                        let question = draft.into_question(id, Utc::now());
                        bank.questions.push(question.clone());
                        question
                    }
                },
            };

            bank.touch();
            Ok(saved)
        })
    }

    /// Removing a question that is not there is not an error.
    pub fn delete_question(&self, bank_id: &str, question_id: &str) -> Result<()> {
        let policy = self.policy;
        self.update(|doc| {
            let Some(bank) = doc.bank_mut(bank_id) else {
                return match policy {
                    IdPolicy::Strict => Err(bank_not_found(bank_id)),
                    IdPolicy::Tolerant => Ok(()),
                };
            };
            let before = bank.questions.len();
            bank.questions.retain(|q| q.id != question_id);
            if bank.questions.len() != before {
                bank.touch();
            }
            Ok(())
        })
    }

    /// Drops every bank and question. The next listing seeds a fresh default bank.
    pub fn reset(&self) -> Result<()> {
        let mut store = self.lock()?;
        persist::clear_document(&mut *store)?;
        info!("all banks removed");
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, S>, StoreError> {
        self.store.lock().map_err(|_| StoreError::LockPoisoned)
    }

    fn read<T>(&self, f: impl FnOnce(&Document) -> T) -> Result<T, StoreError> {
        let store = self.lock()?;
        let mut doc = persist::load_document(&*store);
        doc.seed_default();
        Ok(f(&doc))
    }

    /// Load, mutate and save under one lock. Nothing is written when `f` fails.
    fn update<T>(&self, f: impl FnOnce(&mut Document) -> Result<T>) -> Result<T> {
        let mut store = self.lock()?;
        let mut doc = persist::load_document(&*store);
        doc.seed_default();
        let out = f(&mut doc)?;
        persist::save_document(&mut *store, &doc)?;
        Ok(out)
    }
}

fn bank_not_found(id: &str) -> Error {
    Error::NotFound {
        what: "bank",
        id: id.to_string(),
    }
}
