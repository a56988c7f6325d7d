pub mod controller;
pub mod scoring;
pub mod session;

use thiserror::Error;

use crate::bank::{BankError, BankId};

pub use controller::{SessionController, SessionStatus};
pub use scoring::{MissedQuestion, Score};
pub use session::{OrderMode, QuestionKey, QuizMode, SessionConfig, SessionState};

#[derive(Debug, Error)]
pub enum QuizError {
    #[error(transparent)]
    Bank(#[from] BankError),
    #[error("bank \"{bank}\" chapter {chapter} has no questions")]
    NoQuestions { bank: BankId, chapter: u32 },
}
