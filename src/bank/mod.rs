pub mod loader;
pub mod schema;

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use loader::BankLoader;

/// One of the three fixed answer labels.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Choice {
    #[default]
    A,
    B,
    C,
}

impl Choice {
    pub const ALL: [Choice; 3] = [Choice::A, Choice::B, Choice::C];

    pub fn as_str(self) -> &'static str {
        match self {
            Choice::A => "A",
            Choice::B => "B",
            Choice::C => "C",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Choice::A => 0,
            Choice::B => 1,
            Choice::C => 2,
        }
    }

    /// Exact match only, the same rule option keys follow.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "A" => Some(Choice::A),
            "B" => Some(Choice::B),
            "C" => Some(Choice::C),
            _ => None,
        }
    }

    /// Cycles A -> B -> C -> A.
    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named question sources.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BankId {
    Generated,
    Book,
}

impl BankId {
    pub const ALL: [BankId; 2] = [BankId::Generated, BankId::Book];

    /// Directory name under a bank root.
    pub fn as_str(self) -> &'static str {
        match self {
            BankId::Generated => "generated",
            BankId::Book => "book",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            BankId::Generated => "Generated questions",
            BankId::Book => "Book questions",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|b| b.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl fmt::Display for BankId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Question ids are numbers in most banks, but some use strings.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum QuestionId {
    Num(u64),
    Text(String),
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionId::Num(n) => write!(f, "{n}"),
            QuestionId::Text(s) => f.write_str(s),
        }
    }
}

/// A validated question. `answer` is always one of the three option labels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    options: [String; 3],
    pub answer: Choice,
}

impl Question {
    pub fn new(id: QuestionId, text: impl Into<String>, options: [String; 3], answer: Choice) -> Self {
        Self {
            id,
            text: text.into(),
            options,
            answer,
        }
    }

    pub fn option(&self, choice: Choice) -> &str {
        &self.options[choice.index()]
    }

    pub fn options(&self) -> impl Iterator<Item = (Choice, &str)> {
        Choice::ALL.into_iter().map(move |c| (c, self.option(c)))
    }

    pub fn is_correct(&self, choice: Choice) -> bool {
        self.answer == choice
    }
}

#[derive(Debug, Error)]
pub enum BankError {
    #[error("{file} not found in bank \"{bank}\"")]
    NotFound { bank: BankId, chapter: u32, file: String },
    #[error("bank \"{bank}\" chapter {chapter}: {reason}")]
    Malformed {
        bank: BankId,
        chapter: u32,
        reason: String,
    },
    #[error("bank \"{bank}\" chapter {chapter}: invalid JSON: {source}")]
    Parse {
        bank: BankId,
        chapter: u32,
        #[source]
        source: serde_json::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Anything that can produce the ordered questions of one chapter.
pub trait QuestionSource {
    fn load_chapter(&self, bank: BankId, chapter: u32) -> Result<Vec<Question>, BankError>;
}
