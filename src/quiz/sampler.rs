use rand::seq::SliceRandom;
use rand::Rng;

use crate::quiz::bank::QuestionBank;
use crate::quiz::storage::Storage;
use crate::quiz::usage::{UsageGuard, UsageTracker};
use crate::quiz::{Question, QuizError, Result};

/// Share of a category that may remain unused before its usage is cleared.
pub const DEFAULT_EXHAUSTION_RATIO: f64 = 0.2;

const MAX_RESETS: usize = 1;

/// The letter a category's question ids start with, e.g. `F` for `funfacts`.
pub fn category_prefix(category: &str) -> Option<char> {
    category.chars().next().and_then(|c| c.to_uppercase().next())
}

fn available<'q, S: Storage>(
    pool: &[&'q Question],
    usage: &UsageGuard<'_, S>,
) -> Vec<&'q Question> {
    pool.iter()
        .copied()
        .filter(|q| !usage.is_used(&q.id))
        .collect()
}

/// Picks an unused question from `category` and marks it used.
///
/// When fewer than `exhaustion_ratio` of the category's questions remain
/// unused, every tracked id sharing the category's first letter is cleared
/// first. That is at most once per call. The usage lock is held from the first
/// read to the final persist.
pub async fn select_question<S, R>(
    bank: &QuestionBank,
    tracker: &UsageTracker<S>,
    category: &str,
    exhaustion_ratio: f64,
    rng: &mut R,
) -> Result<Question>
where
    S: Storage,
    R: Rng + ?Sized,
{
    let pool = bank.pool(category);
    if pool.is_empty() {
        return Err(QuizError::NoSuchCategory(category.to_string()));
    }
    let threshold = exhaustion_ratio * bank.count_of(category) as f64;

    let mut usage = tracker.lock().await;
    let mut resets = 0;
    let candidates = loop {
        let candidates = available(&pool, &usage);
        let exhausted = (candidates.len() as f64) < threshold;
        if !exhausted || resets == MAX_RESETS {
            break candidates;
        }

        let Some(prefix) = category_prefix(category) else {
            break candidates;
        };
        log::info!(
            "Category '{}' exhausted ({} of {} left), resetting ids starting with '{}'",
            category,
            candidates.len(),
            pool.len(),
            prefix
        );
        if let Err(err) = usage.reset_category(prefix).await {
            log::warn!("Could not persist reset of '{}': {}", category, err);
        }
        resets += 1;
    };

    let question = match candidates.choose(rng) {
        Some(question) => (*question).clone(),
        None => return Err(QuizError::PoolExhausted(category.to_string())),
    };

    if let Err(err) = usage.mark_used(&question.id).await {
        log::warn!("Could not persist usage of '{}': {}", question.id, err);
    }
    log::debug!(
        "Selected '{}' from '{}' ({} candidates)",
        question.id,
        category,
        candidates.len()
    );
    Ok(question)
}
