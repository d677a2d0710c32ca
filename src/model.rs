use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::answer::letter_index;
use crate::error::ValidationError;

pub const DEFAULT_BANK_ID: &str = "default_bank";
pub const DEFAULT_BANK_NAME: &str = "Default bank";
pub const DEFAULT_BANK_DESCRIPTION: &str = "Questions that do not belong to any other bank";

/// Persisted root: the unit of every read and write.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    #[serde(default)]
    pub question_banks: Vec<QuestionBank>,
}

impl Document {
    pub fn bank(&self, id: &str) -> Option<&QuestionBank> {
        self.question_banks.iter().find(|b| b.id == id)
    }

    pub fn bank_mut(&mut self, id: &str) -> Option<&mut QuestionBank> {
        self.question_banks.iter_mut().find(|b| b.id == id)
    }

    /// Adds the default bank when the document has no banks at all.
    /// Returns true if the document changed.
    pub fn seed_default(&mut self) -> bool {
        if !self.question_banks.is_empty() {
            return false;
        }
        self.question_banks.push(QuestionBank::default_bank());
        true
    }

    /// The default bank, inserted first if a document lost it.
    pub fn ensure_default_bank(&mut self) -> &mut QuestionBank {
        let idx = match self.question_banks.iter().position(|b| b.is_default) {
            Some(idx) => idx,
            None => {
                self.question_banks.insert(0, QuestionBank::default_bank());
                0
            }
        };
        &mut self.question_banks[idx]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionBank {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_default: bool,
}

impl QuestionBank {
    pub fn new(name: &str, description: &str) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            name: name.to_string(),
            description: description.to_string(),
            questions: Vec::new(),
            created_at: now,
            updated_at: now,
            is_default: false,
        }
    }

    pub fn default_bank() -> Self {
        Self {
            id: DEFAULT_BANK_ID.to_string(),
            is_default: true,
            ..Self::new(DEFAULT_BANK_NAME, DEFAULT_BANK_DESCRIPTION)
        }
    }

    pub fn question(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StoredQuestion")]
pub struct Question {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    pub options: Vec<String>,
    pub answer: String,
    pub analysis: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Every shape a question has been stored in. Fields may be missing or null,
/// and older records used other names for the title and options.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredQuestion {
    id: Option<String>,
    title: Option<String>,
    question: Option<String>,
    content: Option<String>,
    #[serde(rename = "type")]
    kind: Option<QuestionType>,
    options: Option<Vec<String>>,
    choices: Option<Vec<String>>,
    selections: Option<Vec<String>>,
    #[serde(default, deserialize_with = "text_or_number")]
    answer: String,
    analysis: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<StoredQuestion> for Question {
    fn from(raw: StoredQuestion) -> Self {
        let title = [raw.title, raw.question, raw.content]
            .into_iter()
            .flatten()
            .find(|t| !t.is_empty())
            .unwrap_or_default();
        let now = Utc::now();
        Self {
            id: raw.id.filter(|id| !id.is_empty()).unwrap_or_else(new_id),
            title,
            kind: raw.kind.unwrap_or_default(),
            options: raw
                .options
                .or(raw.choices)
                .or(raw.selections)
                .unwrap_or_default(),
            answer: raw.answer,
            analysis: raw.analysis.unwrap_or_default(),
            created_at: raw.created_at.unwrap_or(now),
            updated_at: raw.updated_at.unwrap_or(now),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum QuestionType {
    #[default]
    SingleChoice,
    MultipleChoice,
    FillBlank,
    ShortAnswer,
}

impl QuestionType {
    pub fn is_choice(self) -> bool {
        matches!(self, QuestionType::SingleChoice | QuestionType::MultipleChoice)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionType::SingleChoice => "singleChoice",
            QuestionType::MultipleChoice => "multipleChoice",
            QuestionType::FillBlank => "fillBlank",
            QuestionType::ShortAnswer => "shortAnswer",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            QuestionType::SingleChoice => "single choice",
            QuestionType::MultipleChoice => "multiple choice",
            QuestionType::FillBlank => "fill in the blank",
            QuestionType::ShortAnswer => "short answer",
        };
        f.write_str(label)
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "singleChoice" | "single" => Ok(QuestionType::SingleChoice),
            "multipleChoice" | "multi" => Ok(QuestionType::MultipleChoice),
            "fillBlank" | "blank" => Ok(QuestionType::FillBlank),
            "shortAnswer" | "short" => Ok(QuestionType::ShortAnswer),
            other => Err(format!(
                "unknown question type {:?} (expected singleChoice, multipleChoice, fillBlank or shortAnswer)",
                other
            )),
        }
    }
}

/// What the question editor hands to the repository. `id: None` creates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestionDraft {
    pub id: Option<String>,
    pub title: String,
    pub kind: QuestionType,
    pub options: Vec<String>,
    pub answer: String,
    pub analysis: String,
}

impl QuestionDraft {
    /// Applies the save-time normalization and checks the draft can be stored.
    pub fn prepare(self) -> Result<QuestionDraft, ValidationError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(ValidationError::EmptyTitle);
        }

        let mut answer = self.answer.trim().to_string();
        let options: Vec<String> = if self.kind.is_choice() {
            self.options
                .into_iter()
                .filter(|o| !o.trim().is_empty())
                .collect()
        } else {
            Vec::new()
        };

        match self.kind {
            QuestionType::SingleChoice => {
                if let Some(idx) = letter_index(&answer) {
                    answer = idx.to_string();
                }
                match answer.parse::<usize>() {
                    Ok(idx) if idx < options.len() => answer = idx.to_string(),
                    _ => {
                        return Err(ValidationError::AnswerOutOfRange {
                            answer,
                            options: options.len(),
                        })
                    }
                }
            }
            QuestionType::MultipleChoice => {
                answer = answer
                    .split(',')
                    .map(|part| match letter_index(part) {
                        Some(idx) => idx.to_string(),
                        None => part.trim().to_string(),
                    })
                    .collect::<Vec<_>>()
                    .join(",");
            }
            QuestionType::FillBlank | QuestionType::ShortAnswer => {}
        }

        Ok(QuestionDraft {
            id: self.id.filter(|id| !id.trim().is_empty()),
            title,
            kind: self.kind,
            options,
            answer,
            analysis: self.analysis.trim().to_string(),
        })
    }

    pub(crate) fn into_question(self, id: String, created_at: DateTime<Utc>) -> Question {
        Question {
            id,
            title: self.title,
            kind: self.kind,
            options: self.options,
            answer: self.answer,
            analysis: self.analysis,
            created_at,
            updated_at: Utc::now(),
        }
    }
}

impl From<&Question> for QuestionDraft {
    fn from(q: &Question) -> Self {
        Self {
            id: Some(q.id.clone()),
            title: q.title.clone(),
            kind: q.kind,
            options: q.options.clone(),
            answer: q.answer.clone(),
            analysis: q.analysis.clone(),
        }
    }
}

pub fn new_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Older records stored the answer index as a JSON number.
fn text_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) => s,
        Some(Raw::Number(n)) => n.to_string(),
        None => String::new(),
    })
}
