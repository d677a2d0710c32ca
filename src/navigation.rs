use crate::model::Question;

/// Destinations a front end can open, with the parameters each one needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    /// The list of banks.
    QuestionBank,
    BankDetail {
        bank_id: String,
        bank_name: String,
    },
    /// `question_id: None` opens an empty editor for a new question.
    EditQuestion {
        bank_id: String,
        question_id: Option<String>,
    },
    /// Carries the questions themselves, not a bank id.
    Quiz {
        questions: Vec<Question>,
        bank_name: Option<String>,
    },
}

impl Route {
    pub fn title(&self) -> String {
        match self {
            Route::QuestionBank => "Question banks".to_string(),
            Route::BankDetail { bank_name, .. } => bank_name.clone(),
            Route::EditQuestion {
                question_id: None, ..
            } => "New question".to_string(),
            Route::EditQuestion { .. } => "Edit question".to_string(),
            Route::Quiz {
                bank_name: Some(name),
                ..
            } => format!("Quiz: {}", name),
            Route::Quiz { .. } => "Quiz".to_string(),
        }
    }
}
