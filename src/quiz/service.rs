use std::sync::Arc;

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{Mutex, RwLock};

use crate::quiz::bank::QuestionBank;
use crate::quiz::fallback::fallback_for;
use crate::quiz::sampler::{self, category_prefix, DEFAULT_EXHAUSTION_RATIO};
use crate::quiz::source::QuestionSource;
use crate::quiz::storage::Storage;
use crate::quiz::usage::{UsageTracker, DEFAULT_STORAGE_KEY};
use crate::quiz::{QuestionView, Result};

#[derive(Debug, Clone)]
pub struct QuizOptions {
    pub storage_key: String,
    pub exhaustion_ratio: f64,
    /// Fixed seed for reproducible selection; entropy when `None`.
    pub seed: Option<u64>,
}

impl Default for QuizOptions {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            exhaustion_ratio: DEFAULT_EXHAUSTION_RATIO,
            seed: None,
        }
    }
}

/// How much of a category the user has already seen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct CategoryProgress {
    pub total: usize,
    pub used: usize,
}

/// Keeps the exhaustion ratio within `[0, 1]`; NaN gets the default.
fn sanitize_ratio(ratio: f64) -> f64 {
    if ratio.is_nan() {
        log::warn!("Exhaustion ratio is NaN, using {}", DEFAULT_EXHAUSTION_RATIO);
        return DEFAULT_EXHAUSTION_RATIO;
    }
    let clamped = ratio.clamp(0.0, 1.0);
    if clamped != ratio {
        log::warn!("Exhaustion ratio {} out of range, using {}", ratio, clamped);
    }
    clamped
}

/// Serves quiz questions without repeats, falling back to built-in questions
/// whenever the data layer can't deliver.
pub struct QuizService<S> {
    bank: RwLock<Arc<QuestionBank>>,
    usage: UsageTracker<S>,
    rng: Mutex<StdRng>,
    exhaustion_ratio: f64,
}

impl<S: Storage> QuizService<S> {
    /// Loads the bank and the usage record. Never fails; broken sources or
    /// stores degrade to the built-in bank and an empty usage set.
    pub async fn initialize(
        source: &impl QuestionSource,
        storage: S,
        options: QuizOptions,
    ) -> Self {
        let bank = QuestionBank::load(source).into_bank();
        let usage = UsageTracker::load(storage, options.storage_key).await;
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        log::info!(
            "Quiz service ready: {} questions, {} categories",
            bank.len(),
            bank.list_categories().len()
        );

        Self {
            bank: RwLock::new(Arc::new(bank)),
            usage,
            rng: Mutex::new(rng),
            exhaustion_ratio: sanitize_ratio(options.exhaustion_ratio),
        }
    }

    /// Always returns a question: a fresh one from `category` when possible,
    /// the category's fallback otherwise.
    pub async fn select_question(&self, category: &str) -> QuestionView {
        let bank = self.bank().await;
        let mut rng = self.rng.lock().await;
        let selected = sampler::select_question(
            &bank,
            &self.usage,
            category,
            self.exhaustion_ratio,
            &mut *rng,
        )
        .await;
        match selected {
            Ok(question) => question.view(),
            Err(err) => {
                log::warn!("Serving fallback for '{}': {}", category, err);
                fallback_for(category).view()
            }
        }
    }

    pub async fn list_categories(&self) -> Vec<String> {
        self.bank().await.list_categories()
    }

    pub async fn progress(&self, category: &str) -> CategoryProgress {
        let bank = self.bank().await;
        let usage = self.usage.lock().await;
        let pool = bank.pool(category);
        CategoryProgress {
            total: pool.len(),
            used: pool.iter().filter(|q| usage.is_used(&q.id)).count(),
        }
    }

    /// Clears usage for every id starting with the category's first letter.
    pub async fn reset_category(&self, category: &str) {
        let Some(prefix) = category_prefix(category) else {
            return;
        };
        if let Err(err) = self.usage.reset_category(prefix).await {
            log::warn!("Could not persist reset of '{}': {}", category, err);
        }
    }

    pub async fn reset_all(&self) {
        if let Err(err) = self.usage.reset_all().await {
            log::warn!("Could not persist usage reset: {}", err);
        }
    }

    /// Swaps in a bank freshly loaded from `source`. Usage is kept as is, so
    /// ids that vanished from the new bank just linger unused.
    pub async fn reload(&self, source: &impl QuestionSource) {
        let bank = QuestionBank::load(source).into_bank();
        log::info!("Reloaded question bank with {} questions", bank.len());
        *self.bank.write().await = Arc::new(bank);
    }

    pub fn usage(&self) -> &UsageTracker<S> {
        &self.usage
    }

    /// Persists the usage state one last time.
    pub async fn shutdown(self) -> Result<()> {
        log::info!("Shutting down quiz service");
        self.usage.flush().await
    }

    async fn bank(&self) -> Arc<QuestionBank> {
        self.bank.read().await.clone()
    }
}
