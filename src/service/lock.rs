use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::storage::MemberKey;

const PRUNE_THRESHOLD: usize = 1024;

/// Serializes every mutation of one chat member's records.
#[derive(Clone, Default)]
pub struct KeyedLocks {
    locks: Arc<DashMap<MemberKey, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn lock(&self, key: MemberKey) -> OwnedMutexGuard<()> {
        self.slot(key).lock_owned().await
    }

    /// Locks two members in a fixed order so that crossing pairs cannot deadlock.
    pub async fn lock_pair(&self, a: MemberKey, b: MemberKey) -> Vec<OwnedMutexGuard<()>> {
        if a == b {
            return vec![self.lock(a).await];
        }

        let (first, second) = if sort_key(a) <= sort_key(b) { (a, b) } else { (b, a) };
        let first_guard = self.lock(first).await;
        let second_guard = self.lock(second).await;
        vec![first_guard, second_guard]
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    fn slot(&self, key: MemberKey) -> Arc<Mutex<()>> {
        if self.locks.len() > PRUNE_THRESHOLD {
            self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }
        self.locks.entry(key).or_default().value().clone()
    }
}

fn sort_key((chat_id, user_id): MemberKey) -> (i64, u64) {
    (chat_id.0, user_id.0)
}
