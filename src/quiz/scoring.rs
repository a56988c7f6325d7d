use crate::bank::{Choice, Question};
use crate::quiz::session::SessionState;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Score {
    pub correct: usize,
    pub answered: usize,
    pub total: usize,
}

impl Score {
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.correct as f64 / self.total as f64 * 100.0
    }
}

/// An answered question whose stored answer is wrong.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissedQuestion<'a> {
    pub question: &'a Question,
    pub chosen: Choice,
}

impl MissedQuestion<'_> {
    pub fn correct(&self) -> Choice {
        self.question.answer
    }
}

pub fn live_score(state: &SessionState) -> Score {
    let mut score = Score {
        total: state.len(),
        ..Score::default()
    };
    for question in state.questions() {
        if let Some(chosen) = state.answer_for(question) {
            score.answered += 1;
            if question.is_correct(chosen) {
                score.correct += 1;
            }
        }
    }
    score
}

/// Same tally as `live_score`, read once the session is complete.
pub fn final_score(state: &SessionState) -> Score {
    live_score(state)
}

/// Wrong answers in session order. Unanswered questions are omissions, not misses.
pub fn missed_questions(state: &SessionState) -> Vec<MissedQuestion<'_>> {
    state
        .questions()
        .iter()
        .filter_map(|question| {
            let chosen = state.answer_for(question)?;
            (!question.is_correct(chosen)).then_some(MissedQuestion { question, chosen })
        })
        .collect()
}
