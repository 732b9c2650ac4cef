use std::sync::Arc;

use teloxide::types::UserId;

use super::Dice;
use crate::{config::DuelConfig, storage::User};

/// Result of one exchange. Never persisted on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DuelOutcome {
    pub attacker: UserId,
    pub defender: UserId,
    pub damage: i64,
    /// Defender health right after the hit, before any respawn.
    pub remaining_health: i64,
    pub knocked_out: bool,
}

#[derive(Clone)]
pub struct DuelEngine {
    config: DuelConfig,
    dice: Arc<dyn Dice>,
}

impl DuelEngine {
    pub fn new(config: DuelConfig, dice: Arc<dyn Dice>) -> Self {
        Self { config, dice }
    }

    pub fn max_health(&self) -> i64 {
        self.config.max_health
    }

    /// Resolves a single hit from `attacker` on `defender`. A knocked out defender
    /// respawns at full health.
    pub fn strike(&self, attacker: &User, defender: &mut User) -> DuelOutcome {
        let damage = self.dice.roll(self.config.min_damage..=self.config.max_damage);
        let remaining_health = defender.health.saturating_sub(damage);
        let knocked_out = remaining_health <= 0;

        defender.health = if knocked_out {
            self.config.max_health
        } else {
            remaining_health
        };

        DuelOutcome {
            attacker: attacker.user_id,
            defender: defender.user_id,
            damage,
            remaining_health,
            knocked_out,
        }
    }
}
