use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::bank::{BankId, Choice, Question, QuestionId};

pub const MIN_QUESTIONS: usize = 5;
pub const MAX_QUESTIONS: usize = 30;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizMode {
    /// Feedback right after each answer.
    Practice,
    /// No feedback until the end, then a review of missed questions.
    Exam,
}

impl QuizMode {
    pub fn as_str(self) -> &'static str {
        match self {
            QuizMode::Practice => "practice",
            QuizMode::Exam => "exam",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            QuizMode::Practice => "Practice",
            QuizMode::Exam => "Exam",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "practice" => Some(QuizMode::Practice),
            "exam" => Some(QuizMode::Exam),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            QuizMode::Practice => QuizMode::Exam,
            QuizMode::Exam => QuizMode::Practice,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderMode {
    Sequential,
    #[serde(alias = "random")]
    Randomized,
}

impl OrderMode {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderMode::Sequential => "sequential",
            OrderMode::Randomized => "randomized",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OrderMode::Sequential => "In order",
            OrderMode::Randomized => "Random",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "sequential" | "in-order" => Some(OrderMode::Sequential),
            "randomized" | "random" => Some(OrderMode::Randomized),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            OrderMode::Sequential => OrderMode::Randomized,
            OrderMode::Randomized => OrderMode::Sequential,
        }
    }
}

/// Run parameters, fixed from one start/reset to the next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pub bank: BankId,
    pub chapter: u32,
    pub mode: QuizMode,
    pub order: OrderMode,
    pub question_count: usize,
    pub lock_next_until_answered: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            bank: BankId::Generated,
            chapter: 1,
            mode: QuizMode::Practice,
            order: OrderMode::Sequential,
            question_count: MAX_QUESTIONS,
            lock_next_until_answered: true,
        }
    }
}

impl SessionConfig {
    /// Requested count clamped into `[MIN_QUESTIONS, MAX_QUESTIONS]`.
    pub fn requested_count(&self) -> usize {
        self.question_count.clamp(MIN_QUESTIONS, MAX_QUESTIONS)
    }

    /// Number of questions a session over `available` loaded questions holds.
    pub fn effective_count(&self, available: usize) -> usize {
        self.requested_count().min(available)
    }
}

/// Scopes an answer to its chapter so ids from different chapters never collide.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct QuestionKey {
    pub chapter: u32,
    pub id: QuestionId,
}

impl QuestionKey {
    pub fn new(chapter: u32, question: &Question) -> Self {
        Self {
            chapter,
            id: question.id.clone(),
        }
    }
}

/// Mutable state of one run. Only `SessionController` writes to it.
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    pub(crate) chapter: u32,
    pub(crate) questions: Vec<Question>,
    pub(crate) position: usize,
    pub(crate) answers: HashMap<QuestionKey, Choice>,
    pub(crate) active_key: Option<QuestionKey>,
    pub(crate) current_choice: Choice,
    pub(crate) last_outcome: Option<bool>,
}

impl SessionState {
    pub(crate) fn new(chapter: u32, questions: Vec<Question>) -> Self {
        Self {
            chapter,
            questions,
            ..Self::default()
        }
    }

    pub fn chapter(&self) -> u32 {
        self.chapter
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.position)
    }

    pub fn key_for(&self, question: &Question) -> QuestionKey {
        QuestionKey::new(self.chapter, question)
    }

    pub fn answer_for(&self, question: &Question) -> Option<Choice> {
        self.answers.get(&self.key_for(question)).copied()
    }

    pub fn answers(&self) -> &HashMap<QuestionKey, Choice> {
        &self.answers
    }

    pub fn active_key(&self) -> Option<&QuestionKey> {
        self.active_key.as_ref()
    }

    pub fn current_choice(&self) -> Choice {
        self.current_choice
    }

    pub fn last_outcome(&self) -> Option<bool> {
        self.last_outcome
    }

    /// Whether the question at `position` has an entry in `answers`.
    pub fn is_current_answered(&self) -> bool {
        self.current_question()
            .is_some_and(|q| self.answers.contains_key(&self.key_for(q)))
    }
}
