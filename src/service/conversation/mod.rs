mod homework;
mod model;

pub use homework::HomeworkFlow;
pub use model::{ConversationState, Flow, HomeworkStep};

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;

use crate::storage::MemberKey;

/// In-progress flows keyed by chat member. At most one flow per member.
///
/// Callers serialize access per key through `KeyedLocks`; the store itself only
/// guarantees that each single operation is atomic.
#[derive(Clone)]
pub struct ConversationStore {
    entries: Arc<DashMap<MemberKey, ConversationState>>,
    ttl: Duration,
}

impl ConversationStore {
    pub fn new(ttl_secs: i64) -> Self {
        info!("Initializing ConversationStore with a {}s idle timeout", ttl_secs);
        Self {
            entries: Arc::new(DashMap::new()),
            ttl: Duration::seconds(ttl_secs),
        }
    }

    /// Installs `flow` for the member, replacing whatever was there.
    pub fn begin(&self, key: MemberKey, flow: Flow, now: DateTime<Utc>) {
        let state = ConversationState {
            flow,
            started_at: now,
            updated_at: now,
        };
        if let Some(previous) = self.entries.insert(key, state) {
            debug!("Replaced {} flow of {:?}", previous.flow.name(), key);
        }
    }

    /// The member's flow, unless it has been idle longer than the TTL. Expired
    /// entries are removed on the way.
    pub fn active(&self, key: MemberKey, now: DateTime<Utc>) -> Option<ConversationState> {
        let ttl = self.ttl;
        if let Some((_, expired)) = self.entries.remove_if(&key, |_, state| now - state.updated_at > ttl) {
            debug!("Dropped idle {} flow of {:?}", expired.flow.name(), key);
            return None;
        }
        self.entries.get(&key).map(|state| state.value().clone())
    }

    /// Moves an existing flow to its next step. Returns `false` when there is none.
    pub fn advance(&self, key: MemberKey, flow: Flow, now: DateTime<Utc>) -> bool {
        match self.entries.get_mut(&key) {
            Some(mut state) => {
                state.flow = flow;
                state.updated_at = now;
                true
            }
            None => false,
        }
    }

    pub fn finish(&self, key: MemberKey) -> Option<ConversationState> {
        self.entries.remove(&key).map(|(_, state)| state)
    }

    pub fn cleanup_expired(&self, now: DateTime<Utc>) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, state| now - state.updated_at <= self.ttl);
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            info!("Cleaned up {} idle conversation(s)", removed);
        }
        removed
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
