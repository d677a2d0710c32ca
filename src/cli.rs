use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use qbank::model::QuestionType;

#[derive(Parser, Debug)]
#[command(name = "qbank", version, about = "Question banks and quizzes")]
pub struct Cli {
    /// Directory holding the stored banks [default: platform data dir]
    #[arg(long, global = true, value_name = "dir", env = "QBANK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Treat unknown bank and question ids as errors
    #[arg(long, global = true)]
    pub strict_ids: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List all banks
    Banks,

    /// Create, rename or delete a bank
    #[command(subcommand)]
    Bank(BankCommand),

    /// Show a bank and its questions
    Show {
        bank_id: String,
    },

    /// Add, edit or delete a question
    #[command(subcommand)]
    Question(QuestionCommand),

    /// Run a quiz over a bank's questions
    Quiz {
        bank_id: String,

        /// Do not pause after each answer
        #[arg(long)]
        no_delay: bool,
    },

    /// Remove every bank and question
    Reset {
        /// Required; there is no undo
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum BankCommand {
    Create {
        name: String,
        #[arg(long, default_value = "")]
        description: String,
    },
    Rename {
        id: String,
        name: String,
        #[arg(long)]
        description: Option<String>,
    },
    Delete {
        id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum QuestionCommand {
    Add {
        bank_id: String,
        #[command(flatten)]
        fields: QuestionFields,
    },
    /// Replace a question; fields not given keep their stored value
    Edit {
        bank_id: String,
        id: String,
        #[command(flatten)]
        fields: EditFields,
    },
    /// Show one question as stored
    Show {
        bank_id: String,
        id: String,
    },
    Delete {
        bank_id: String,
        id: String,
    },
}

#[derive(Args, Debug)]
pub struct QuestionFields {
    #[arg(long)]
    pub title: String,

    /// singleChoice, multipleChoice, fillBlank or shortAnswer
    #[arg(long = "type", default_value = "singleChoice")]
    pub kind: QuestionType,

    /// Repeat for each option, in order
    #[arg(long = "option", value_name = "text")]
    pub options: Vec<String>,

    /// Option letter (A) or index (0) for choice questions, text otherwise
    #[arg(long, default_value = "")]
    pub answer: String,

    #[arg(long, default_value = "")]
    pub analysis: String,
}

#[derive(Args, Debug)]
pub struct EditFields {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long = "type")]
    pub kind: Option<QuestionType>,

    /// Replaces all options when given
    #[arg(long = "option", value_name = "text")]
    pub options: Vec<String>,

    #[arg(long)]
    pub answer: Option<String>,

    #[arg(long)]
    pub analysis: Option<String>,
}
