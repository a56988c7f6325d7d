use std::collections::{BTreeMap, HashSet};

use serde::Deserialize;

use crate::bank::{BankError, BankId, Choice, Question, QuestionId};

/// On-disk shape of one question record.
#[derive(Clone, Debug, Deserialize)]
pub struct QuestionRecord {
    pub id: QuestionId,
    pub question: String,
    #[serde(default)]
    pub options: BTreeMap<String, String>,
    #[serde(default)]
    pub answer: Option<String>,
}

/// A chapter file is either a bare array of records or `{ "questions": [...] }`.
#[derive(Clone, Debug, Deserialize)]
#[serde(untagged)]
pub enum ChapterFile {
    List(Vec<QuestionRecord>),
    Wrapped { questions: Vec<QuestionRecord> },
}

impl ChapterFile {
    pub fn into_records(self) -> Vec<QuestionRecord> {
        match self {
            ChapterFile::List(records) => records,
            ChapterFile::Wrapped { questions } => questions,
        }
    }
}

impl QuestionRecord {
    fn validate(self) -> Result<Question, String> {
        let id = self.id;
        if self.question.trim().is_empty() {
            return Err(format!("question {id} has no text"));
        }

        let answer_label = self
            .answer
            .ok_or_else(|| format!("question {id} has no answer"))?;
        let answer = Choice::from_label(&answer_label)
            .ok_or_else(|| format!("question {id} has invalid answer {answer_label:?}"))?;

        if self.options.len() != Choice::ALL.len() {
            return Err(format!(
                "question {id} has {} options, expected A, B and C",
                self.options.len()
            ));
        }
        let mut options: [String; 3] = Default::default();
        for choice in Choice::ALL {
            options[choice.index()] = self
                .options
                .get(choice.as_str())
                .cloned()
                .ok_or_else(|| format!("question {id} is missing option {choice}"))?;
        }

        Ok(Question::new(id, self.question, options, answer))
    }
}

/// Parse and validate one chapter. Any bad record rejects the whole chapter.
pub fn parse_chapter(bank: BankId, chapter: u32, content: &str) -> Result<Vec<Question>, BankError> {
    let file: ChapterFile = serde_json::from_str(content).map_err(|source| BankError::Parse {
        bank,
        chapter,
        source,
    })?;

    let malformed = |reason: String| BankError::Malformed {
        bank,
        chapter,
        reason,
    };

    let mut seen = HashSet::new();
    let mut questions = Vec::new();
    for record in file.into_records() {
        if !seen.insert(record.id.clone()) {
            return Err(malformed(format!("duplicate question id {}", record.id)));
        }
        questions.push(record.validate().map_err(malformed)?);
    }
    Ok(questions)
}
