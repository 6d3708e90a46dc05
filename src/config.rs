use std::path::PathBuf;

use crate::quiz::sampler::DEFAULT_EXHAUSTION_RATIO;
use crate::quiz::service::QuizOptions;
use crate::quiz::usage::DEFAULT_STORAGE_KEY;
use crate::quiz::{QuizError, Result};

/// Runtime settings, read from the environment (and `.env` if present).
#[derive(Debug, Clone, PartialEq)]
pub struct QuizConfig {
    pub data_path: PathBuf,
    pub storage_dir: PathBuf,
    pub storage_key: String,
    pub exhaustion_ratio: f64,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("questions.csv"),
            storage_dir: PathBuf::from(".brainbites"),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            exhaustion_ratio: DEFAULT_EXHAUSTION_RATIO,
        }
    }
}

impl QuizConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let exhaustion_ratio = match lookup("QUIZ_EXHAUSTION_RATIO") {
            Some(raw) => {
                let ratio: f64 = raw.trim().parse().map_err(|_| {
                    QuizError::Config(format!("QUIZ_EXHAUSTION_RATIO '{}' is not a number", raw))
                })?;
                if !(0.0..=1.0).contains(&ratio) {
                    return Err(QuizError::Config(format!(
                        "QUIZ_EXHAUSTION_RATIO must be between 0 and 1, got {}",
                        ratio
                    )));
                }
                ratio
            }
            None => defaults.exhaustion_ratio,
        };

        Ok(Self {
            data_path: lookup("QUIZ_DATA_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_path),
            storage_dir: lookup("QUIZ_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.storage_dir),
            storage_key: lookup("QUIZ_STORAGE_KEY").unwrap_or(defaults.storage_key),
            exhaustion_ratio,
        })
    }

    pub fn options(&self) -> QuizOptions {
        QuizOptions {
            storage_key: self.storage_key.clone(),
            exhaustion_ratio: self.exhaustion_ratio,
            seed: None,
        }
    }
}
