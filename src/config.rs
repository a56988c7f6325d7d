use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::bank::BankId;
use crate::quiz::session::{MAX_QUESTIONS, MIN_QUESTIONS};
use crate::quiz::{OrderMode, QuizMode, SessionConfig};

/// Highest chapter offered by the setup screen.
pub const MAX_CHAPTER: u32 = 9;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_bank")]
    pub bank: BankId,
    #[serde(default = "default_chapter")]
    pub chapter: u32,
    #[serde(default = "default_mode")]
    pub mode: QuizMode,
    #[serde(default = "default_order")]
    pub order: OrderMode,
    #[serde(default = "default_question_count")]
    pub question_count: usize,
    #[serde(default = "default_lock_next")]
    pub lock_next_until_answered: bool,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub bank_dir: Option<String>,
}

fn default_bank() -> BankId {
    BankId::Generated
}
fn default_chapter() -> u32 {
    1
}
fn default_mode() -> QuizMode {
    QuizMode::Practice
}
fn default_order() -> OrderMode {
    OrderMode::Sequential
}
fn default_question_count() -> usize {
    MAX_QUESTIONS
}
fn default_lock_next() -> bool {
    true
}
fn default_theme() -> String {
    "catppuccin-mocha".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bank: default_bank(),
            chapter: default_chapter(),
            mode: default_mode(),
            order: default_order(),
            question_count: default_question_count(),
            lock_next_until_answered: default_lock_next(),
            theme: default_theme(),
            bank_dir: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        let mut config: Config =
            toml::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;
        config.validate();
        Ok(config)
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("chapquiz")
            .join("config.toml")
    }

    /// Clamp values a hand-edited file may have pushed out of range.
    pub fn validate(&mut self) {
        self.chapter = self.chapter.max(1);
        self.question_count = self.question_count.clamp(MIN_QUESTIONS, MAX_QUESTIONS);
    }

    pub fn bank_dir(&self) -> Option<PathBuf> {
        self.bank_dir
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            bank: self.bank,
            chapter: self.chapter,
            mode: self.mode,
            order: self.order,
            question_count: self.question_count,
            lock_next_until_answered: self.lock_next_until_answered,
        }
    }
}
