use thiserror::Error;

/// Failures of a key-value backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot read {key}: {source}")]
    Read {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {key}: {source}")]
    Write {
        key: String,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot encode document: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("corrupt value under {key}: {source}")]
    Decode {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage lock poisoned")]
    LockPoisoned,
}

/// Input rejected before anything is written.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("question title is empty")]
    EmptyTitle,

    #[error("bank name is empty")]
    EmptyBankName,

    #[error("answer {answer:?} is not a valid option (have {options} options)")]
    AnswerOutOfRange { answer: String, options: usize },

    #[error("no option selected")]
    MissingSelection,

    #[error("question has no options to select")]
    NotSelectable,

    #[error("option {index} is out of range (have {options} options)")]
    OptionOutOfRange { index: usize, options: usize },

    #[error("no question is being presented")]
    NotPresenting,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("save failed, nothing was changed: {0}")]
    StorageWrite(#[from] StoreError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("bank {bank_id} is the default bank and cannot be deleted")]
    ProtectedResource { bank_id: String },

    #[error("{what} {id} not found")]
    NotFound { what: &'static str, id: String },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
