use log::{debug, info, warn};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::bank::{Choice, Question, QuestionSource};
use crate::quiz::QuizError;
use crate::quiz::scoring::{self, MissedQuestion, Score};
use crate::quiz::session::{OrderMode, QuizMode, SessionConfig, SessionState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    /// Never started, failed to load, or the chapter had no questions.
    NoSession,
    InProgress { position: usize },
    Complete,
}

/// What practice mode shows for the question at `position` once it has an answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Feedback {
    pub chosen: Choice,
    pub correct: Choice,
}

impl Feedback {
    pub fn is_correct(&self) -> bool {
        self.chosen == self.correct
    }
}

/// Owns the session state and every transition on it.
///
/// Out-of-bounds actions are ignored rather than reported: the presentation
/// layer disables those controls, but a stray call must not corrupt state.
#[derive(Debug, Default)]
pub struct SessionController {
    config: Option<SessionConfig>,
    state: SessionState,
    load_error: Option<String>,
}

impl SessionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(&self) -> Option<&SessionConfig> {
        self.config.as_ref()
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    /// Start or restart a run. The question order is decided here and never
    /// changes until the next call.
    pub fn start<S, R>(
        &mut self,
        config: SessionConfig,
        source: &S,
        rng: &mut R,
    ) -> Result<usize, QuizError>
    where
        S: QuestionSource + ?Sized,
        R: Rng + ?Sized,
    {
        self.state = SessionState::default();
        self.load_error = None;
        let (bank, chapter, mode, order) = (config.bank, config.chapter, config.mode, config.order);
        let config = self.config.insert(config).clone();

        let loaded = match source.load_chapter(bank, chapter) {
            Ok(qs) if qs.is_empty() => Err(QuizError::NoQuestions { bank, chapter }),
            Ok(qs) => Ok(qs),
            Err(e) => Err(QuizError::from(e)),
        };
        let mut questions = match loaded {
            Ok(qs) => qs,
            Err(e) => {
                warn!("failed to start {bank} chapter {chapter}: {e}");
                self.load_error = Some(e.to_string());
                return Err(e);
            }
        };

        if order == OrderMode::Randomized {
            questions.shuffle(rng);
        }
        questions.truncate(config.effective_count(questions.len()));

        info!(
            "started {bank} chapter {chapter}: {} questions, {} mode, {}",
            questions.len(),
            mode.as_str(),
            order.as_str()
        );
        self.state = SessionState::new(chapter, questions);
        Ok(self.state.len())
    }

    pub fn status(&self) -> SessionStatus {
        if self.state.is_empty() {
            SessionStatus::NoSession
        } else if self.state.position >= self.state.len() {
            SessionStatus::Complete
        } else {
            SessionStatus::InProgress {
                position: self.state.position,
            }
        }
    }

    /// True only for a non-empty session whose position is past the last question.
    pub fn is_complete(&self) -> bool {
        self.status() == SessionStatus::Complete
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.state.current_question()
    }

    /// Bind the transient selection to the question at `position`. Safe to call
    /// on every render: does nothing once bound.
    pub fn sync_active_question(&mut self) {
        let Some(question) = self.state.current_question() else {
            return;
        };
        let key = self.state.key_for(question);
        if self.state.active_key.as_ref() == Some(&key) {
            return;
        }
        self.state.current_choice = self.state.answers.get(&key).copied().unwrap_or_default();
        self.state.active_key = Some(key);
        self.state.last_outcome = None;
    }

    pub fn select_choice(&mut self, choice: Choice) {
        if self.state.current_question().is_none() {
            debug!("select ignored: no active question");
            return;
        }
        self.sync_active_question();
        self.state.current_choice = choice;
    }

    /// Record `current_choice` for the active question. Returns whether it was
    /// correct, or `None` when there is no active question.
    pub fn answer(&mut self) -> Option<bool> {
        self.sync_active_question();
        let question = self.state.current_question()?;
        let correct = question.is_correct(self.state.current_choice);
        let key = self.state.active_key.clone()?;
        self.state.answers.insert(key, self.state.current_choice);
        self.state.last_outcome = Some(correct);
        Some(correct)
    }

    /// Advance one question; the step past the last question completes the run.
    pub fn next(&mut self) -> bool {
        if self.state.position >= self.state.len() {
            debug!("next ignored at position {}", self.state.position);
            return false;
        }
        self.state.position += 1;
        self.unbind();
        true
    }

    pub fn previous(&mut self) -> bool {
        if self.state.position == 0 || self.state.is_empty() {
            debug!("previous ignored at position {}", self.state.position);
            return false;
        }
        self.state.position -= 1;
        self.unbind();
        true
    }

    fn unbind(&mut self) {
        self.state.last_outcome = None;
        self.state.active_key = None;
    }

    pub fn is_current_answered(&self) -> bool {
        self.state.is_current_answered()
    }

    pub fn live_score(&self) -> Score {
        scoring::live_score(&self.state)
    }

    pub fn final_score(&self) -> Score {
        scoring::final_score(&self.state)
    }

    /// Missed questions, exposed only for a completed exam.
    pub fn review(&self) -> Option<Vec<MissedQuestion<'_>>> {
        let exam = self.config.as_ref().is_some_and(|c| c.mode == QuizMode::Exam);
        (exam && self.is_complete()).then(|| scoring::missed_questions(&self.state))
    }

    /// Practice-mode feedback for the active question, if it has been answered.
    pub fn feedback(&self) -> Option<Feedback> {
        let practice = self
            .config
            .as_ref()
            .is_some_and(|c| c.mode == QuizMode::Practice);
        if !practice {
            return None;
        }
        let question = self.state.current_question()?;
        let chosen = self.state.answer_for(question)?;
        Some(Feedback {
            chosen,
            correct: question.answer,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;
    use crate::bank::{BankError, BankId, QuestionId};

    #[derive(Default)]
    struct MemorySource {
        chapters: HashMap<(BankId, u32), Vec<Question>>,
    }

    impl MemorySource {
        fn with_chapter(mut self, chapter: u32, questions: Vec<Question>) -> Self {
            self.chapters.insert((BankId::Generated, chapter), questions);
            self
        }
    }

    impl QuestionSource for MemorySource {
        fn load_chapter(&self, bank: BankId, chapter: u32) -> Result<Vec<Question>, BankError> {
            self.chapters
                .get(&(bank, chapter))
                .cloned()
                .ok_or_else(|| BankError::NotFound {
                    bank,
                    chapter,
                    file: format!("chapter_{chapter}.json"),
                })
        }
    }

    fn question(id: u64, answer: Choice) -> Question {
        Question::new(
            QuestionId::Num(id),
            format!("Question {id}"),
            ["first".into(), "second".into(), "third".into()],
            answer,
        )
    }

    fn numbered(n: u64) -> Vec<Question> {
        (1..=n).map(|id| question(id, Choice::ALL[(id % 3) as usize])).collect()
    }

    fn config(count: usize, mode: QuizMode, order: OrderMode) -> SessionConfig {
        SessionConfig {
            bank: BankId::Generated,
            chapter: 1,
            mode,
            order,
            question_count: count,
            lock_next_until_answered: false,
        }
    }

    fn started(questions: Vec<Question>, cfg: SessionConfig) -> SessionController {
        let source = MemorySource::default().with_chapter(1, questions);
        let mut rng = SmallRng::seed_from_u64(7);
        let mut controller = SessionController::new();
        controller.start(cfg, &source, &mut rng).unwrap();
        controller
    }

    fn three_question_exam() -> SessionController {
        started(
            vec![question(1, Choice::A), question(2, Choice::B), question(3, Choice::C)],
            config(3, QuizMode::Exam, OrderMode::Sequential),
        )
    }

    fn ids(controller: &SessionController) -> Vec<String> {
        controller
            .state()
            .questions()
            .iter()
            .map(|q| q.id.to_string())
            .collect()
    }

    #[test]
    fn new_controller_has_no_session() {
        let controller = SessionController::new();
        assert_eq!(controller.status(), SessionStatus::NoSession);
        assert!(!controller.is_complete());
        assert!(controller.load_error().is_none());
    }

    #[test]
    fn start_loads_and_truncates() {
        let controller = started(numbered(12), config(5, QuizMode::Practice, OrderMode::Sequential));
        assert_eq!(controller.state().len(), 5);
        assert_eq!(ids(&controller), vec!["1", "2", "3", "4", "5"]);
        assert_eq!(controller.status(), SessionStatus::InProgress { position: 0 });
    }

    #[test]
    fn start_clamps_count_to_minimum_and_available() {
        let controller = started(numbered(12), config(2, QuizMode::Practice, OrderMode::Sequential));
        assert_eq!(controller.state().len(), 5);

        let controller = started(numbered(3), config(30, QuizMode::Practice, OrderMode::Sequential));
        assert_eq!(controller.state().len(), 3);
    }

    #[test]
    fn missing_chapter_records_error_and_no_session() {
        let source = MemorySource::default();
        let mut rng = SmallRng::seed_from_u64(1);
        let mut controller = SessionController::new();
        let err = controller
            .start(config(5, QuizMode::Practice, OrderMode::Sequential), &source, &mut rng)
            .unwrap_err();
        assert!(matches!(err, QuizError::Bank(BankError::NotFound { .. })));
        assert_eq!(controller.status(), SessionStatus::NoSession);
        assert!(controller.load_error().unwrap().contains("chapter_1.json"));
        assert!(controller.state().is_empty());
    }

    #[test]
    fn failed_start_clears_previous_session() {
        let mut controller = three_question_exam();
        controller.answer();
        let source = MemorySource::default();
        let mut rng = SmallRng::seed_from_u64(1);
        let mut cfg = config(5, QuizMode::Exam, OrderMode::Sequential);
        cfg.chapter = 9;
        assert!(controller.start(cfg, &source, &mut rng).is_err());
        assert!(controller.state().is_empty());
        assert!(controller.state().answers().is_empty());
        assert_eq!(controller.status(), SessionStatus::NoSession);
    }

    #[test]
    fn empty_chapter_is_no_session_not_complete() {
        let source = MemorySource::default().with_chapter(1, Vec::new());
        let mut rng = SmallRng::seed_from_u64(1);
        let mut controller = SessionController::new();
        let err = controller
            .start(config(5, QuizMode::Exam, OrderMode::Sequential), &source, &mut rng)
            .unwrap_err();
        assert!(matches!(err, QuizError::NoQuestions { chapter: 1, .. }));
        assert!(!controller.is_complete());
        assert_eq!(controller.status(), SessionStatus::NoSession);
        assert!(controller.load_error().is_some());
    }

    #[test]
    fn successful_start_clears_load_error() {
        let source = MemorySource::default().with_chapter(1, numbered(6));
        let mut rng = SmallRng::seed_from_u64(1);
        let mut controller = SessionController::new();
        let mut missing = config(5, QuizMode::Practice, OrderMode::Sequential);
        missing.chapter = 2;
        assert!(controller.start(missing, &source, &mut rng).is_err());
        assert!(controller.load_error().is_some());

        controller
            .start(config(5, QuizMode::Practice, OrderMode::Sequential), &source, &mut rng)
            .unwrap();
        assert!(controller.load_error().is_none());
    }

    #[test]
    fn sync_defaults_choice_to_a() {
        let mut controller = three_question_exam();
        controller.sync_active_question();
        assert_eq!(controller.state().current_choice(), Choice::A);
        assert!(controller.state().active_key().is_some());
        assert!(!controller.is_current_answered());
    }

    #[test]
    fn sync_is_idempotent() {
        let mut controller = three_question_exam();
        controller.sync_active_question();
        controller.select_choice(Choice::C);
        controller.sync_active_question();
        assert_eq!(controller.state().current_choice(), Choice::C);
    }

    #[test]
    fn sync_restores_stored_answer_after_navigation() {
        let mut controller = three_question_exam();
        controller.select_choice(Choice::B);
        controller.answer();
        controller.next();
        controller.sync_active_question();
        assert_eq!(controller.state().current_choice(), Choice::A);
        controller.previous();
        controller.sync_active_question();
        assert_eq!(controller.state().current_choice(), Choice::B);
        assert!(controller.is_current_answered());
        assert_eq!(controller.state().last_outcome(), None);
    }

    #[test]
    fn select_does_not_record_answer() {
        let mut controller = three_question_exam();
        controller.select_choice(Choice::C);
        assert!(controller.state().answers().is_empty());
        assert_eq!(controller.live_score().answered, 0);
    }

    #[test]
    fn answer_keeps_position_and_sets_outcome() {
        let mut controller = three_question_exam();
        controller.sync_active_question();
        assert_eq!(controller.answer(), Some(true));
        assert_eq!(controller.state().position(), 0);
        assert_eq!(controller.state().last_outcome(), Some(true));
        assert!(controller.is_current_answered());
    }

    #[test]
    fn reanswer_overwrites_previous_choice() {
        let mut controller = three_question_exam();
        controller.select_choice(Choice::A);
        assert_eq!(controller.answer(), Some(true));
        controller.select_choice(Choice::C);
        assert_eq!(controller.answer(), Some(false));

        let state = controller.state();
        assert_eq!(state.answers().len(), 1);
        assert_eq!(state.answer_for(&state.questions()[0]), Some(Choice::C));
        assert_eq!(state.last_outcome(), Some(false));
    }

    #[test]
    fn answer_without_sync_binds_current_question() {
        let mut controller = three_question_exam();
        controller.next();
        assert_eq!(controller.answer(), Some(false));
        let state = controller.state();
        assert_eq!(state.answer_for(&state.questions()[1]), Some(Choice::A));
    }

    #[test]
    fn navigation_clears_outcome_and_unbinds() {
        let mut controller = three_question_exam();
        controller.answer();
        assert!(controller.next());
        assert_eq!(controller.state().last_outcome(), None);
        assert!(controller.state().active_key().is_none());
        controller.answer();
        assert!(controller.previous());
        assert_eq!(controller.state().last_outcome(), None);
        assert!(controller.state().active_key().is_none());
    }

    #[test]
    fn previous_at_start_is_ignored() {
        let mut controller = three_question_exam();
        assert!(!controller.previous());
        assert_eq!(controller.state().position(), 0);
    }

    #[test]
    fn completion_boundary() {
        let mut controller = started(numbered(8), config(5, QuizMode::Practice, OrderMode::Sequential));
        for _ in 0..5 {
            assert!(!controller.is_complete());
            assert!(controller.next());
        }
        assert!(controller.is_complete());
        assert_eq!(controller.status(), SessionStatus::Complete);
        assert!(!controller.next());
        assert_eq!(controller.state().position(), 5);
    }

    #[test]
    fn answer_after_completion_is_ignored() {
        let mut controller = three_question_exam();
        for _ in 0..3 {
            controller.next();
        }
        assert_eq!(controller.answer(), None);
        controller.select_choice(Choice::B);
        assert!(controller.state().answers().is_empty());
    }

    #[test]
    fn actions_without_session_are_ignored() {
        let mut controller = SessionController::new();
        controller.sync_active_question();
        controller.select_choice(Choice::B);
        assert_eq!(controller.answer(), None);
        assert!(!controller.next());
        assert!(!controller.previous());
        assert_eq!(controller.status(), SessionStatus::NoSession);
    }

    #[test]
    fn next_ignores_lock_policy() {
        let mut cfg = config(5, QuizMode::Practice, OrderMode::Sequential);
        cfg.lock_next_until_answered = true;
        let mut controller = started(numbered(5), cfg);
        assert!(controller.next());
        assert_eq!(controller.state().position(), 1);
    }

    #[test]
    fn navigation_is_score_neutral() {
        let mut controller = three_question_exam();
        controller.answer();
        controller.next();
        controller.select_choice(Choice::B);
        controller.answer();
        let before = controller.live_score();
        controller.previous();
        controller.next();
        controller.next();
        controller.previous();
        assert_eq!(controller.live_score(), before);
    }

    #[test]
    fn randomized_order_is_frozen_for_the_session() {
        let mut controller =
            started(numbered(20), config(20, QuizMode::Practice, OrderMode::Randomized));
        let order = ids(&controller);
        assert_eq!(order.len(), 20);
        for _ in 0..7 {
            controller.next();
        }
        controller.previous();
        assert_eq!(ids(&controller), order);

        let mut sorted = order.clone();
        sorted.sort_by_key(|id| id.parse::<u64>().unwrap());
        let expected: Vec<String> = (1..=20).map(|n| n.to_string()).collect();
        assert_eq!(sorted, expected);
    }

    #[test]
    fn same_seed_gives_same_order() {
        let a = started(numbered(20), config(10, QuizMode::Practice, OrderMode::Randomized));
        let b = started(numbered(20), config(10, QuizMode::Practice, OrderMode::Randomized));
        assert_eq!(ids(&a), ids(&b));
    }

    #[test]
    fn shuffle_happens_before_truncation() {
        let source = MemorySource::default().with_chapter(1, numbered(30));
        let mut controller = SessionController::new();
        let cfg = config(5, QuizMode::Practice, OrderMode::Randomized);
        let first_five: Vec<String> = (1..=5).map(|n| n.to_string()).collect();
        let mut saw_other = false;
        for seed in 0..10 {
            let mut rng = SmallRng::seed_from_u64(seed);
            controller.start(cfg.clone(), &source, &mut rng).unwrap();
            if ids(&controller) != first_five {
                saw_other = true;
            }
        }
        assert!(saw_other);
    }

    #[test]
    fn reset_clears_state() {
        let mut controller = three_question_exam();
        for _ in 0..3 {
            controller.answer();
            controller.next();
        }
        assert!(controller.is_complete());

        let source = MemorySource::default().with_chapter(1, numbered(6));
        let mut rng = SmallRng::seed_from_u64(3);
        controller
            .start(config(5, QuizMode::Practice, OrderMode::Sequential), &source, &mut rng)
            .unwrap();
        let state = controller.state();
        assert_eq!(state.position(), 0);
        assert!(state.answers().is_empty());
        assert_eq!(state.last_outcome(), None);
        assert!(state.active_key().is_none());
        assert_eq!(state.current_choice(), Choice::A);
        assert_eq!(state.len(), 5);
    }

    #[test]
    fn three_question_scenario() {
        let mut controller = three_question_exam();

        controller.sync_active_question();
        controller.select_choice(Choice::A);
        controller.answer();
        assert_eq!(controller.live_score(), Score { correct: 1, answered: 1, total: 3 });

        controller.next();
        assert_eq!(controller.state().position(), 1);
        controller.sync_active_question();
        controller.select_choice(Choice::C);
        controller.answer();
        assert_eq!(controller.live_score(), Score { correct: 1, answered: 2, total: 3 });

        controller.next();
        controller.next();
        assert_eq!(controller.state().position(), 3);
        assert!(controller.is_complete());
        assert_eq!(controller.final_score(), Score { correct: 1, answered: 2, total: 3 });

        let review = controller.review().unwrap();
        assert_eq!(review.len(), 1);
        assert_eq!(review[0].question.id, QuestionId::Num(2));
        assert_eq!(review[0].chosen, Choice::C);
        assert_eq!(review[0].correct(), Choice::B);
    }

    #[test]
    fn review_only_for_completed_exam() {
        let mut exam = three_question_exam();
        exam.select_choice(Choice::B);
        exam.answer();
        assert!(exam.review().is_none());

        let mut practice = started(
            vec![question(1, Choice::A), question(2, Choice::B), question(3, Choice::C)],
            config(3, QuizMode::Practice, OrderMode::Sequential),
        );
        for _ in 0..3 {
            practice.next();
        }
        assert!(practice.is_complete());
        assert!(practice.review().is_none());
    }

    #[test]
    fn feedback_only_in_practice_after_answer() {
        let mut practice = started(
            vec![question(1, Choice::B), question(2, Choice::B), question(3, Choice::C)],
            config(3, QuizMode::Practice, OrderMode::Sequential),
        );
        assert!(practice.feedback().is_none());
        practice.answer();
        let feedback = practice.feedback().unwrap();
        assert_eq!(feedback.chosen, Choice::A);
        assert_eq!(feedback.correct, Choice::B);
        assert!(!feedback.is_correct());

        let mut exam = three_question_exam();
        exam.answer();
        assert!(exam.feedback().is_none());
    }
}
