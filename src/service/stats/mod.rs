use std::sync::Arc;

use teloxide::types::ChatId;

use crate::{
    service::game::DuelOutcome,
    storage::{MemberKey, StatCounters, StorageError, Store, UserStats},
};

/// Per member counters. Every write is best effort: failures are logged and swallowed.
#[derive(Clone)]
pub struct StatsService {
    store: Arc<dyn Store>,
}

impl StatsService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Current counters of a member, empty when the store cannot be read.
    pub async fn snapshot(&self, (chat_id, user_id): MemberKey) -> UserStats {
        self.store.get_stats(user_id, chat_id).await.unwrap_or_else(|e| {
            warn!("Failed to load stats of {} in {}: {}", user_id, chat_id, e);
            UserStats::new(user_id, chat_id)
        })
    }

    pub async fn record_message(&self, key: MemberKey) {
        self.bump(key, |c| c.messages += 1).await;
    }

    pub async fn record_growth(&self, key: MemberKey, delta: i64) {
        if delta > 0 {
            self.bump(key, |c| c.growth_up += 1).await;
        } else {
            self.bump(key, |c| c.growth_down += 1).await;
        }
    }

    pub async fn record_vote(&self, key: MemberKey, yes: bool) {
        if yes {
            self.bump(key, |c| c.yes_votes += 1).await;
        } else {
            self.bump(key, |c| c.no_votes += 1).await;
        }
    }

    pub async fn record_duel(&self, chat_id: ChatId, outcome: &DuelOutcome) {
        let knocked_out = outcome.knocked_out;

        self.bump((chat_id, outcome.attacker), |c| {
            c.duels += 1;
            if knocked_out {
                c.duels_won += 1;
                c.kills += 1;
            }
        })
        .await;

        self.bump((chat_id, outcome.defender), |c| {
            c.duels += 1;
            if knocked_out {
                c.duels_lost += 1;
                c.deaths += 1;
            }
        })
        .await;
    }

    /// Sum of every member's counters in the chat.
    pub async fn chat_totals(&self, chat_id: ChatId) -> Result<StatCounters, StorageError> {
        let mut totals = StatCounters::default();
        for stats in self.store.stats_by_chat(chat_id).await? {
            totals += stats.counters;
        }
        Ok(totals)
    }

    async fn bump<F>(&self, (chat_id, user_id): MemberKey, apply: F)
    where
        F: FnOnce(&mut StatCounters),
    {
        let mut stats = match self.store.get_stats(user_id, chat_id).await {
            Ok(stats) => stats,
            Err(e) => {
                warn!("Failed to load stats of {} in {}: {}", user_id, chat_id, e);
                return;
            }
        };

        apply(&mut stats.counters);

        if let Err(e) = self.store.save_stats(&stats).await {
            warn!("Failed to save stats of {} in {}: {}", user_id, chat_id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{MemoryStore, UserDefaults};
    use teloxide::types::UserId;

    const CHAT: ChatId = ChatId(-9);

    fn service() -> StatsService {
        StatsService::new(Arc::new(MemoryStore::new(UserDefaults {
            max_attempts: 1,
            max_health: 100,
        })))
    }

    #[tokio::test]
    async fn test_counters_accumulate() {
        let stats = service();
        let key = (CHAT, UserId(1));

        stats.record_message(key).await;
        stats.record_message(key).await;
        stats.record_growth(key, 4).await;
        stats.record_growth(key, -2).await;
        stats.record_vote(key, true).await;

        let counters = stats.snapshot(key).await.counters;
        assert_eq!(counters.messages, 2);
        assert_eq!(counters.growth_up, 1);
        assert_eq!(counters.growth_down, 1);
        assert_eq!(counters.yes_votes, 1);
        assert_eq!(counters.no_votes, 0);
    }

    #[tokio::test]
    async fn test_knockout_updates_both_sides() {
        let stats = service();
        let outcome = DuelOutcome {
            attacker: UserId(1),
            defender: UserId(2),
            damage: 35,
            remaining_health: -5,
            knocked_out: true,
        };

        stats.record_duel(CHAT, &outcome).await;

        let attacker = stats.snapshot((CHAT, UserId(1))).await.counters;
        let defender = stats.snapshot((CHAT, UserId(2))).await.counters;
        assert_eq!((attacker.duels, attacker.duels_won, attacker.kills), (1, 1, 1));
        assert_eq!((attacker.duels_lost, attacker.deaths), (0, 0));
        assert_eq!((defender.duels, defender.duels_lost, defender.deaths), (1, 1, 1));
        assert_eq!((defender.duels_won, defender.kills), (0, 0));
    }

    #[tokio::test]
    async fn test_plain_hit_only_counts_duels() {
        let stats = service();
        let outcome = DuelOutcome {
            attacker: UserId(1),
            defender: UserId(2),
            damage: 10,
            remaining_health: 90,
            knocked_out: false,
        };

        stats.record_duel(CHAT, &outcome).await;

        let attacker = stats.snapshot((CHAT, UserId(1))).await.counters;
        assert_eq!(attacker.duels, 1);
        assert_eq!(attacker.duels_won, 0);
    }

    #[tokio::test]
    async fn test_chat_totals_sum_members() {
        let stats = service();
        stats.record_message((CHAT, UserId(1))).await;
        stats.record_message((CHAT, UserId(2))).await;
        stats.record_message((ChatId(-10), UserId(3))).await;

        let totals = stats.chat_totals(CHAT).await.unwrap();
        assert_eq!(totals.messages, 2);
    }
}
