use std::collections::HashSet;
use std::io;

use qbank::config::IdPolicy;
use qbank::error::{Error, StoreError, ValidationError};
use qbank::model::{QuestionDraft, QuestionType, DEFAULT_BANK_ID};
use qbank::persist;
use qbank::session::{Outcome, QuizSession};
use qbank::store::{KeyValueStore, MemoryStore};
use qbank::Repository;

fn open() -> Repository<MemoryStore> {
    Repository::open(MemoryStore::new(), IdPolicy::Tolerant)
}

fn choice(title: &str, answer: &str) -> QuestionDraft {
    QuestionDraft {
        id: None,
        title: title.to_string(),
        kind: QuestionType::SingleChoice,
        options: vec!["one".into(), "two".into(), "three".into()],
        answer: answer.to_string(),
        analysis: String::new(),
    }
}

/// Accepts reads, refuses every write.
struct ReadOnlyStore(MemoryStore);

impl KeyValueStore for ReadOnlyStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.0.get(key)
    }

    fn set(&mut self, key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Write {
            key: key.to_string(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "read-only"),
        })
    }

    fn remove(&mut self, _key: &str) -> Result<(), StoreError> {
        Ok(())
    }
}

#[test]
fn test_list_banks_seeds_default_once() {
    let repo = open();

    let banks = repo.list_banks().unwrap();
    assert_eq!(banks.len(), 1);
    assert_eq!(banks[0].id, DEFAULT_BANK_ID);
    assert!(banks[0].is_default);
    assert!(banks[0].questions.is_empty());

    let again = repo.list_banks().unwrap();
    assert_eq!(again, banks);
}

#[test]
fn test_create_bank() {
    let repo = open();
    let bank = repo.create_bank("  Rust  ", "ownership drills").unwrap();

    assert_eq!(bank.name, "Rust");
    assert_eq!(bank.description, "ownership drills");
    assert!(!bank.is_default);
    assert!(bank.questions.is_empty());
    assert_eq!(bank.created_at, bank.updated_at);

    let banks = repo.list_banks().unwrap();
    assert_eq!(banks.len(), 2);
    assert!(banks[0].is_default);
    assert_eq!(banks[1], bank);
}

#[test]
fn test_create_bank_rejects_blank_name() {
    let repo = open();
    let err = repo.create_bank("   ", "").unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::EmptyBankName)));

    let store = repo.close();
    assert!(!store.contains(persist::DOCUMENT_KEY));
}

#[test]
fn test_update_bank_keeps_questions() {
    let repo = open();
    let bank = repo.create_bank("Draft", "").unwrap();
    repo.upsert_question(&bank.id, choice("q", "A")).unwrap();

    let renamed = repo.update_bank(&bank.id, "Final", Some("now with text")).unwrap();
    assert_eq!(renamed.name, "Final");
    assert_eq!(renamed.description, "now with text");
    assert_eq!(renamed.questions.len(), 1);
    assert!(renamed.updated_at >= bank.updated_at);

    let kept = repo.update_bank(&bank.id, "Final 2", None).unwrap();
    assert_eq!(kept.description, "now with text");

    let err = repo.update_bank("missing", "x", None).unwrap_err();
    assert!(matches!(err, Error::NotFound { what: "bank", .. }));
}

#[test]
fn test_delete_bank_removes_its_questions() {
    let repo = open();
    let bank = repo.create_bank("Temp", "").unwrap();
    repo.upsert_question(&bank.id, choice("q", "0")).unwrap();

    repo.delete_bank(&bank.id).unwrap();

    let banks = repo.list_banks().unwrap();
    assert_eq!(banks.len(), 1);
    assert!(repo.get_bank(&bank.id).unwrap().is_none());
    assert!(repo.list_questions(&bank.id).unwrap().is_empty());
}

#[test]
fn test_delete_default_bank_is_refused() {
    let repo = open();
    repo.upsert_question(DEFAULT_BANK_ID, choice("keep me", "B")).unwrap();
    let before = repo.list_banks().unwrap();

    let err = repo.delete_bank(DEFAULT_BANK_ID).unwrap_err();
    assert!(matches!(err, Error::ProtectedResource { ref bank_id } if bank_id == DEFAULT_BANK_ID));

    assert_eq!(repo.list_banks().unwrap(), before);
}

#[test]
fn test_delete_default_bank_refused_before_first_listing() {
    let repo = open();
    let err = repo.delete_bank(DEFAULT_BANK_ID).unwrap_err();
    assert!(matches!(err, Error::ProtectedResource { .. }));

    let store = repo.close();
    assert!(!store.contains(persist::DOCUMENT_KEY));
}

#[test]
fn test_fresh_ids_append_one_each() {
    let repo = open();
    let mut ids = HashSet::new();

    for n in 0..20 {
        let q = repo
            .upsert_question(DEFAULT_BANK_ID, choice(&format!("question {}", n), "A"))
            .unwrap();
        assert!(ids.insert(q.id.clone()), "duplicate id {}", q.id);
        assert_eq!(repo.list_questions(DEFAULT_BANK_ID).unwrap().len(), n + 1);
    }
}

#[test]
fn test_blank_id_counts_as_unset() {
    let repo = Repository::open(MemoryStore::new(), IdPolicy::Strict);
    let first = repo.upsert_question(DEFAULT_BANK_ID, choice("first", "0")).unwrap();

    for blank in ["", "   "] {
        let draft = QuestionDraft {
            id: Some(blank.to_string()),
            ..choice("blank id", "1")
        };
        let q = repo.upsert_question(DEFAULT_BANK_ID, draft).unwrap();
        assert!(!q.id.trim().is_empty());
        assert_ne!(q.id, first.id);
    }

    let questions = repo.list_questions(DEFAULT_BANK_ID).unwrap();
    assert_eq!(questions.len(), 3);
    assert_eq!(questions[0], first);
    assert_ne!(questions[1].id, questions[2].id);
}

#[test]
fn test_signed_index_answer_scores_in_quiz() {
    let repo = open();
    let saved = repo.upsert_question(DEFAULT_BANK_ID, choice("signed", "+1")).unwrap();
    assert_eq!(saved.answer, "1");

    let mut session = QuizSession::new(repo.list_questions(DEFAULT_BANK_ID).unwrap());
    session.select(1).unwrap();
    assert_eq!(session.submit().unwrap(), Outcome::Correct);
}

#[test]
fn test_questions_keep_insertion_order() {
    let repo = open();
    for title in ["zeta", "alpha", "mid"] {
        repo.upsert_question(DEFAULT_BANK_ID, choice(title, "0")).unwrap();
    }
    let titles: Vec<String> = repo
        .list_questions(DEFAULT_BANK_ID)
        .unwrap()
        .into_iter()
        .map(|q| q.title)
        .collect();
    assert_eq!(titles, ["zeta", "alpha", "mid"]);
}

#[test]
fn test_upsert_existing_id_replaces_in_place() {
    let repo = open();
    let first = repo.upsert_question(DEFAULT_BANK_ID, choice("first", "A")).unwrap();
    let second = repo.upsert_question(DEFAULT_BANK_ID, choice("second", "B")).unwrap();
    let third = repo.upsert_question(DEFAULT_BANK_ID, choice("third", "C")).unwrap();

    let mut edit = QuestionDraft::from(&second);
    edit.title = "second, edited".to_string();
    edit.answer = "c".to_string();
    let updated = repo.upsert_question(DEFAULT_BANK_ID, edit).unwrap();

    assert_eq!(updated.id, second.id);
    assert_eq!(updated.answer, "2");
    assert_eq!(updated.created_at, second.created_at);

    let questions = repo.list_questions(DEFAULT_BANK_ID).unwrap();
    let ids: Vec<&str> = questions.iter().map(|q| q.id.as_str()).collect();
    assert_eq!(ids, [first.id.as_str(), second.id.as_str(), third.id.as_str()]);
    assert_eq!(questions[1].title, "second, edited");
}

#[test]
fn test_upsert_refreshes_bank_updated_at() {
    let repo = open();
    let bank = repo.create_bank("Timing", "").unwrap();
    repo.upsert_question(&bank.id, choice("q", "A")).unwrap();

    let after = repo.get_bank(&bank.id).unwrap().unwrap();
    assert!(after.updated_at >= bank.updated_at);
    assert_eq!(after.created_at, bank.created_at);
}

#[test]
fn test_upsert_unknown_question_id_appends_when_tolerant() {
    let repo = open();
    repo.upsert_question(DEFAULT_BANK_ID, choice("existing", "A")).unwrap();

    let mut draft = choice("orphan", "B");
    draft.id = Some("gone-123".to_string());
    let saved = repo.upsert_question(DEFAULT_BANK_ID, draft).unwrap();

    assert_eq!(saved.id, "gone-123");
    let questions = repo.list_questions(DEFAULT_BANK_ID).unwrap();
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[1].id, "gone-123");
}

#[test]
fn test_invalid_draft_never_reaches_storage() {
    let repo = open();

    let err = repo
        .upsert_question(DEFAULT_BANK_ID, choice("out of range", "D"))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::AnswerOutOfRange { options: 3, .. })
    ));

    let err = repo.upsert_question(DEFAULT_BANK_ID, choice("  ", "A")).unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::EmptyTitle)));

    let store = repo.close();
    assert!(!store.contains(persist::DOCUMENT_KEY));
}

#[test]
fn test_upsert_into_unknown_bank_is_not_found() {
    let repo = open();
    let err = repo.upsert_question("nope", choice("q", "A")).unwrap_err();
    assert!(matches!(err, Error::NotFound { what: "bank", .. }));
}

#[test]
fn test_delete_question_is_idempotent() {
    let repo = open();
    let a = repo.upsert_question(DEFAULT_BANK_ID, choice("a", "A")).unwrap();
    let b = repo.upsert_question(DEFAULT_BANK_ID, choice("b", "B")).unwrap();

    repo.delete_question(DEFAULT_BANK_ID, &a.id).unwrap();
    let once = repo.list_questions(DEFAULT_BANK_ID).unwrap();

    repo.delete_question(DEFAULT_BANK_ID, &a.id).unwrap();
    let twice = repo.list_questions(DEFAULT_BANK_ID).unwrap();

    assert_eq!(once, twice);
    assert_eq!(twice.len(), 1);
    assert_eq!(twice[0].id, b.id);
}

#[test]
fn test_unknown_ids_are_tolerated_by_default() {
    let repo = open();
    assert!(repo.list_questions("missing").unwrap().is_empty());
    repo.delete_question("missing", "q").unwrap();
    repo.delete_bank("missing").unwrap();
    assert!(repo.get_question(DEFAULT_BANK_ID, "missing").unwrap().is_none());
}

#[test]
fn test_strict_policy_reports_unknown_ids() {
    let repo = Repository::open(MemoryStore::new(), IdPolicy::Strict);

    assert!(matches!(
        repo.list_questions("missing"),
        Err(Error::NotFound { what: "bank", .. })
    ));
    assert!(matches!(
        repo.delete_bank("missing"),
        Err(Error::NotFound { what: "bank", .. })
    ));
    assert!(matches!(
        repo.delete_question("missing", "q"),
        Err(Error::NotFound { what: "bank", .. })
    ));

    let mut draft = choice("orphan", "A");
    draft.id = Some("gone".to_string());
    assert!(matches!(
        repo.upsert_question(DEFAULT_BANK_ID, draft),
        Err(Error::NotFound { what: "question", .. })
    ));
}

#[test]
fn test_write_failure_is_reported() {
    let repo = Repository::open(ReadOnlyStore(MemoryStore::new()), IdPolicy::Tolerant);

    let err = repo.create_bank("Unsaved", "").unwrap_err();
    assert!(matches!(err, Error::StorageWrite(StoreError::Write { .. })));

    // the failed create left nothing behind
    let banks = repo.list_banks().unwrap();
    assert_eq!(banks.len(), 1);
    assert!(banks[0].is_default);
}

#[test]
fn test_reset_reseeds_default() {
    let repo = open();
    repo.create_bank("Gone soon", "").unwrap();
    repo.upsert_question(DEFAULT_BANK_ID, choice("q", "A")).unwrap();

    repo.reset().unwrap();

    let banks = repo.list_banks().unwrap();
    assert_eq!(banks.len(), 1);
    assert!(banks[0].is_default);
    assert!(banks[0].questions.is_empty());
}
