use std::fmt;
use std::time::Duration;

use tracing::debug;

use crate::answer::normalize_answer;
use crate::error::ValidationError;
use crate::model::Question;

/// How long the outcome of a submitted answer stays up before moving on.
pub const ADVANCE_DELAY: Duration = Duration::from_millis(1500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Presenting(usize),
    Submitted(usize),
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect { correct: usize },
    /// The stored answer cannot be read as an option, so nothing is marked.
    NoAnswerSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Excellent,
    Good,
    Passing,
    NeedsImprovement,
}

impl Band {
    pub fn from_percentage(percentage: u32) -> Self {
        if percentage >= 90 {
            Band::Excellent
        } else if percentage >= 80 {
            Band::Good
        } else if percentage >= 60 {
            Band::Passing
        } else {
            Band::NeedsImprovement
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Band::Excellent => "excellent",
            Band::Good => "good",
            Band::Passing => "passing",
            Band::NeedsImprovement => "needs improvement",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizResult {
    pub correct: usize,
    pub total: usize,
    pub percentage: u32,
    pub band: Band,
}

impl QuizResult {
    pub fn new(correct: usize, total: usize) -> Self {
        let percentage = if total == 0 {
            0
        } else {
            (correct as f64 / total as f64 * 100.0).round() as u32
        };
        Self {
            correct,
            total,
            percentage,
            band: Band::from_percentage(percentage),
        }
    }

    pub fn wrong(&self) -> usize {
        self.total - self.correct
    }
}

/// One run through a fixed question sequence.
#[derive(Debug, Clone)]
pub struct QuizSession {
    questions: Vec<Question>,
    phase: Phase,
    selected: Option<usize>,
    correct: usize,
    last_outcome: Option<Outcome>,
}

impl QuizSession {
    pub fn new(questions: Vec<Question>) -> Self {
        let phase = first_phase(&questions);
        Self {
            questions,
            phase,
            selected: None,
            correct: 0,
            last_outcome: None,
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    /// Index of the question on screen, if any.
    pub fn index(&self) -> Option<usize> {
        match self.phase {
            Phase::Presenting(i) | Phase::Submitted(i) => Some(i),
            Phase::Finished => None,
        }
    }

    pub fn current(&self) -> Option<&Question> {
        self.index().and_then(|i| self.questions.get(i))
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn score(&self) -> usize {
        self.correct
    }

    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    /// Picks an option of the current question. Picking again replaces it.
    pub fn select(&mut self, option: usize) -> Result<(), ValidationError> {
        let Phase::Presenting(i) = self.phase else {
            return Err(ValidationError::NotPresenting);
        };
        let question = &self.questions[i];
        if !question.kind.is_choice() || question.options.is_empty() {
            return Err(ValidationError::NotSelectable);
        }
        if option >= question.options.len() {
            return Err(ValidationError::OptionOutOfRange {
                index: option,
                options: question.options.len(),
            });
        }
        self.selected = Some(option);
        Ok(())
    }

    pub fn submit(&mut self) -> Result<Outcome, ValidationError> {
        let Phase::Presenting(i) = self.phase else {
            return Err(ValidationError::NotPresenting);
        };
        let selected = self.selected.ok_or(ValidationError::MissingSelection)?;

        let outcome = match normalize_answer(&self.questions[i].answer) {
            Some(correct) if correct == selected => Outcome::Correct,
            Some(correct) => Outcome::Incorrect { correct },
            None => Outcome::NoAnswerSet,
        };
        if outcome == Outcome::Correct {
            self.correct += 1;
        }
        debug!(question = i, selected, ?outcome, score = self.correct, "answer submitted");

        self.last_outcome = Some(outcome);
        self.phase = Phase::Submitted(i);
        Ok(outcome)
    }

    /// Leaves a submitted question for the next one, or finishes.
    pub fn advance(&mut self) {
        if let Phase::Submitted(i) = self.phase {
            self.move_past(i);
        }
    }

    /// Moves on without answering; the score is untouched.
    pub fn skip(&mut self) -> Result<(), ValidationError> {
        let Phase::Presenting(i) = self.phase else {
            return Err(ValidationError::NotPresenting);
        };
        debug!(question = i, "question skipped");
        self.move_past(i);
        Ok(())
    }

    /// Starts over on the same questions.
    pub fn restart(&mut self) {
        self.phase = first_phase(&self.questions);
        self.selected = None;
        self.correct = 0;
        self.last_outcome = None;
    }

    pub fn result(&self) -> Option<QuizResult> {
        self.is_finished()
            .then(|| QuizResult::new(self.correct, self.questions.len()))
    }

    fn move_past(&mut self, i: usize) {
        self.selected = None;
        self.last_outcome = None;
        self.phase = if i + 1 < self.questions.len() {
            Phase::Presenting(i + 1)
        } else {
            Phase::Finished
        };
    }
}

fn first_phase(questions: &[Question]) -> Phase {
    if questions.is_empty() {
        Phase::Finished
    } else {
        Phase::Presenting(0)
    }
}
