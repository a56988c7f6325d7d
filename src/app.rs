use log::info;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::bank::{BankLoader, Choice};
use crate::config::Config;
use crate::quiz::{SessionController, SessionStatus};
use crate::ui::components::setup::{SetupField, SetupForm};
use crate::ui::components::summary::review_lines;
use crate::ui::theme::Theme;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AppScreen {
    Setup,
    Quiz,
    Summary,
}

/// Binds key presses to controller actions and decides which controls are
/// enabled. The controller itself never sees the UI.
pub struct App {
    pub screen: AppScreen,
    pub setup: SetupForm,
    pub controller: SessionController,
    pub theme: &'static Theme,
    pub should_quit: bool,
    pub summary_scroll: u16,
    loader: BankLoader,
    rng: SmallRng,
}

impl App {
    pub fn new(config: &Config, theme: Theme, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };
        let loader = BankLoader::new(config.bank_dir());
        if let Some(dir) = loader.user_dir() {
            info!("reading banks from {} before the bundled ones", dir.display());
        }
        Self::with_loader(config, theme, loader, rng)
    }

    pub fn with_loader(config: &Config, theme: Theme, loader: BankLoader, rng: SmallRng) -> Self {
        let theme: &'static Theme = Box::leak(Box::new(theme));
        Self {
            screen: AppScreen::Setup,
            setup: SetupForm::new(config.session_config()),
            controller: SessionController::new(),
            theme,
            should_quit: false,
            summary_scroll: 0,
            loader,
            rng,
        }
    }

    /// Start (or restart) with the parameters currently in the setup form.
    pub fn start_session(&mut self) {
        let config = self.setup.draft.clone();
        self.summary_scroll = 0;
        match self.controller.start(config, &self.loader, &mut self.rng) {
            Ok(count) => {
                info!("session ready with {count} questions");
                self.controller.sync_active_question();
                self.screen = AppScreen::Quiz;
            }
            Err(_) => {
                // Message is kept on the controller for the setup screen
                self.screen = AppScreen::Setup;
            }
        }
    }

    /// Restart with the running session's own parameters.
    pub fn restart(&mut self) {
        if let Some(config) = self.controller.config() {
            self.setup.draft = config.clone();
        }
        self.start_session();
    }

    pub fn go_to_setup(&mut self) {
        self.setup.selected = SetupField::ALL.len() - 1;
        self.screen = AppScreen::Setup;
    }

    /// A run left with Esc can be picked up where it was.
    pub fn can_resume(&self) -> bool {
        matches!(self.controller.status(), SessionStatus::InProgress { .. })
    }

    pub fn resume(&mut self) {
        if !self.can_resume() {
            return;
        }
        self.controller.sync_active_question();
        self.screen = AppScreen::Quiz;
    }

    pub fn setup_activate(&mut self) {
        if self.setup.field() == SetupField::Start {
            self.start_session();
        } else {
            self.setup.cycle_forward();
        }
    }

    pub fn choose(&mut self, choice: Choice) {
        self.controller.select_choice(choice);
    }

    pub fn cycle_choice(&mut self, forward: bool) {
        self.controller.sync_active_question();
        let current = self.controller.state().current_choice();
        let next = if forward { current.next() } else { current.prev() };
        self.controller.select_choice(next);
    }

    pub fn answer(&mut self) {
        self.controller.answer();
    }

    pub fn can_go_previous(&self) -> bool {
        matches!(self.controller.status(), SessionStatus::InProgress { position } if position > 0)
    }

    /// Forward navigation, honouring the lock-until-answered setting.
    pub fn can_go_next(&self) -> bool {
        if !matches!(self.controller.status(), SessionStatus::InProgress { .. }) {
            return false;
        }
        let locked = self
            .controller
            .config()
            .is_some_and(|c| c.lock_next_until_answered);
        !locked || self.controller.is_current_answered()
    }

    pub fn go_next(&mut self) {
        if !self.can_go_next() {
            return;
        }
        self.controller.next();
        if self.controller.is_complete() {
            info!("session complete: {:?}", self.controller.final_score());
            self.summary_scroll = 0;
            self.screen = AppScreen::Summary;
        } else {
            self.controller.sync_active_question();
        }
    }

    pub fn go_previous(&mut self) {
        if !self.can_go_previous() {
            return;
        }
        self.controller.previous();
        self.controller.sync_active_question();
    }

    pub fn scroll_summary(&mut self, down: bool) {
        let max_scroll = self
            .controller
            .review()
            .map_or(0, |missed| review_lines(&missed, self.theme).len().saturating_sub(1));
        let max_scroll = u16::try_from(max_scroll).unwrap_or(u16::MAX);
        self.summary_scroll = if down {
            self.summary_scroll.saturating_add(1).min(max_scroll)
        } else {
            self.summary_scroll.saturating_sub(1)
        };
    }
}
