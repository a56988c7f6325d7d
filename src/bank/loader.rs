use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::debug;
use rust_embed::Embed;

use crate::bank::schema::parse_chapter;
use crate::bank::{BankError, BankId, Question, QuestionSource};

#[derive(Embed)]
#[folder = "assets/banks/"]
struct BankAssets;

pub fn chapter_file_name(chapter: u32) -> String {
    format!("chapter_{chapter}.json")
}

/// Reads chapters from an optional user bank directory, falling back to the
/// banks compiled into the binary.
#[derive(Clone, Debug)]
pub struct BankLoader {
    user_dir: Option<PathBuf>,
    bundled: bool,
}

impl BankLoader {
    pub fn new(user_dir: Option<PathBuf>) -> Self {
        Self {
            user_dir,
            bundled: true,
        }
    }

    /// Only look in `dir`; bundled banks are ignored.
    pub fn with_base_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            user_dir: Some(dir.into()),
            bundled: false,
        }
    }

    pub fn user_dir(&self) -> Option<&Path> {
        self.user_dir.as_deref()
    }

    fn read_user_file(&self, bank: BankId, chapter: u32) -> Result<Option<String>, BankError> {
        let Some(ref dir) = self.user_dir else {
            return Ok(None);
        };
        let path = dir.join(bank.as_str()).join(chapter_file_name(chapter));
        match fs::read_to_string(&path) {
            Ok(content) => {
                debug!("loading {}", path.display());
                Ok(Some(content))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn read_bundled_file(&self, bank: BankId, chapter: u32) -> Result<Option<String>, BankError> {
        if !self.bundled {
            return Ok(None);
        }
        let name = format!("{}/{}", bank.as_str(), chapter_file_name(chapter));
        let Some(file) = BankAssets::get(&name) else {
            return Ok(None);
        };
        let content = std::str::from_utf8(file.data.as_ref()).map_err(|e| BankError::Malformed {
            bank,
            chapter,
            reason: format!("not UTF-8: {e}"),
        })?;
        debug!("loading bundled {name}");
        Ok(Some(content.to_string()))
    }
}

impl QuestionSource for BankLoader {
    fn load_chapter(&self, bank: BankId, chapter: u32) -> Result<Vec<Question>, BankError> {
        let content = match self.read_user_file(bank, chapter)? {
            Some(content) => content,
            None => self
                .read_bundled_file(bank, chapter)?
                .ok_or_else(|| BankError::NotFound {
                    bank,
                    chapter,
                    file: chapter_file_name(chapter),
                })?,
        };
        parse_chapter(bank, chapter, &content)
    }
}
