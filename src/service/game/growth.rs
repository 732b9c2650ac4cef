use std::sync::Arc;

use chrono::{DateTime, Utc};

use super::Dice;
use crate::{config::GrowthConfig, storage::User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthOutcome {
    /// No attempts left for today; the user record is untouched.
    AlreadyPlayed,
    Changed {
        old: i64,
        new: i64,
        delta: i64,
        jackpot: bool,
    },
}

#[derive(Clone)]
pub struct GrowthEngine {
    config: GrowthConfig,
    dice: Arc<dyn Dice>,
}

impl GrowthEngine {
    pub fn new(config: GrowthConfig, dice: Arc<dyn Dice>) -> Self {
        Self { config, dice }
    }

    /// Restores the daily quota when the last change happened on an earlier UTC day.
    /// Returns whether a reset took place.
    pub fn refresh_attempts(&self, user: &mut User, now: DateTime<Utc>) -> bool {
        if user.changed_at.date_naive() < now.date_naive() {
            user.attempts_left = user.max_attempts;
            return true;
        }
        false
    }

    /// Draws a delta for a user currently at `current`.
    ///
    /// Draws repeat until `current + delta > 0`. If that does not happen within
    /// `max_rerolls` draws the delta is forced to `1 - current`. The jackpot check runs
    /// after the draw and replaces the delta with the fixed bonus.
    pub fn draw_delta(&self, current: i64) -> (i64, bool) {
        let mut delta = None;

        for attempt in 0..self.config.max_rerolls.max(1) {
            let magnitude = self.dice.roll(1..=self.config.max_magnitude);
            let candidate = if self.dice.chance(self.config.positive_weight, 10) {
                magnitude
            } else {
                -magnitude
            };

            if current.saturating_add(candidate) > 0 {
                delta = Some(candidate);
                break;
            }
            debug!("Rerolling growth delta {} for total {} (draw {})", candidate, current, attempt + 1);
        }

        let delta = delta.unwrap_or_else(|| {
            warn!("Growth reroll cap reached for total {}, forcing recovery", current);
            1 - current
        });

        if self.dice.chance(1, self.config.jackpot_odds) {
            return (self.config.jackpot_bonus, true);
        }

        (delta, false)
    }

    /// Plays one round for `user`. The caller persists the record.
    pub fn play(&self, user: &mut User, now: DateTime<Utc>) -> GrowthOutcome {
        self.refresh_attempts(user, now);

        if user.attempts_left == 0 {
            return GrowthOutcome::AlreadyPlayed;
        }

        let old = user.growth;
        let (delta, jackpot) = self.draw_delta(old);

        user.growth = old.saturating_add(delta);
        user.changed_at = now;
        user.attempts_left = user.attempts_left.saturating_sub(1);

        GrowthOutcome::Changed {
            old,
            new: user.growth,
            delta,
            jackpot,
        }
    }
}
