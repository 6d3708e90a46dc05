use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, MutexGuard};

use crate::quiz::storage::Storage;
use crate::quiz::Result;

pub const DEFAULT_STORAGE_KEY: &str = "brainbites_quiz_data";

/// Ids already shown to the user, plus when that set last changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageState {
    pub used: BTreeSet<String>,
    pub last_updated: DateTime<Utc>,
}

impl Default for UsageState {
    fn default() -> Self {
        Self {
            used: BTreeSet::new(),
            last_updated: Utc::now(),
        }
    }
}

/// On-disk shape of the usage record.
#[derive(Debug, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageRecord {
    used_question_ids: Vec<String>,
    last_updated: DateTime<Utc>,
}

/// Owns the usage state and keeps the store in sync with it.
///
/// Every mutation persists the whole set before returning. The state sits
/// behind an async mutex held across the write, so overlapping callers can't
/// lose each other's updates.
pub struct UsageTracker<S> {
    storage: S,
    key: String,
    state: Mutex<UsageState>,
}

impl<S: Storage> UsageTracker<S> {
    /// Reads the persisted record. Missing, unreadable or undecodable records
    /// all start the tracker empty.
    pub async fn load(storage: S, key: impl Into<String>) -> Self {
        let key = key.into();
        let state = match storage.get(&key).await {
            Ok(Some(raw)) => match serde_json::from_str::<UsageRecord>(&raw) {
                Ok(record) => UsageState {
                    used: record.used_question_ids.into_iter().collect(),
                    last_updated: record.last_updated,
                },
                Err(err) => {
                    log::warn!("Ignoring undecodable usage record '{}': {}", key, err);
                    UsageState::default()
                }
            },
            Ok(None) => {
                log::debug!("No usage record under '{}', starting fresh", key);
                UsageState::default()
            }
            Err(err) => {
                log::warn!("Could not read usage record '{}': {}", key, err);
                UsageState::default()
            }
        };
        log::info!("Usage tracker loaded with {} used ids", state.used.len());

        Self {
            storage,
            key,
            state: Mutex::new(state),
        }
    }

    /// Exclusive access for multi-step read-modify-persist sequences.
    pub async fn lock(&self) -> UsageGuard<'_, S> {
        UsageGuard {
            tracker: self,
            state: self.state.lock().await,
        }
    }

    pub async fn mark_used(&self, id: &str) -> Result<()> {
        self.lock().await.mark_used(id).await
    }

    pub async fn reset_category(&self, prefix: char) -> Result<()> {
        self.lock().await.reset_category(prefix).await
    }

    pub async fn reset_all(&self) -> Result<()> {
        self.lock().await.reset_all().await
    }

    /// Writes the current state again, e.g. before shutting down.
    pub async fn flush(&self) -> Result<()> {
        self.lock().await.persist().await
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.state.lock().await.used.contains(id)
    }

    pub async fn used_ids(&self) -> BTreeSet<String> {
        self.state.lock().await.used.clone()
    }

    pub async fn last_updated(&self) -> DateTime<Utc> {
        self.state.lock().await.last_updated
    }
}

/// Held lock on the tracker's state.
pub struct UsageGuard<'a, S> {
    tracker: &'a UsageTracker<S>,
    state: MutexGuard<'a, UsageState>,
}

impl<'a, S: Storage> UsageGuard<'a, S> {
    pub fn is_used(&self, id: &str) -> bool {
        self.state.used.contains(id)
    }

    pub async fn mark_used(&mut self, id: &str) -> Result<()> {
        self.state.used.insert(id.to_string());
        self.touch_and_persist().await
    }

    /// Forgets every id whose first character is `prefix`.
    pub async fn reset_category(&mut self, prefix: char) -> Result<()> {
        let before = self.state.used.len();
        self.state
            .used
            .retain(|id| id.chars().next() != Some(prefix));
        log::debug!(
            "Reset prefix '{}': cleared {} of {} used ids",
            prefix,
            before - self.state.used.len(),
            before
        );
        self.touch_and_persist().await
    }

    pub async fn reset_all(&mut self) -> Result<()> {
        self.state.used.clear();
        self.touch_and_persist().await
    }

    async fn touch_and_persist(&mut self) -> Result<()> {
        self.state.last_updated = Utc::now();
        self.persist().await
    }

    async fn persist(&self) -> Result<()> {
        let record = UsageRecord {
            used_question_ids: self.state.used.iter().cloned().collect(),
            last_updated: self.state.last_updated,
        };
        let raw = serde_json::to_string(&record)?;
        self.tracker.storage.set(&self.tracker.key, raw).await
    }
}
