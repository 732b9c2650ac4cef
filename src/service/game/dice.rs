use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{
    ops::RangeInclusive,
    sync::{Mutex, PoisonError},
};

/// Source of every random decision the games make.
pub trait Dice: Send + Sync + 'static {
    /// Uniform draw from an inclusive range.
    fn roll(&self, range: RangeInclusive<i64>) -> i64;

    /// `true` with probability `numerator / denominator`.
    fn chance(&self, numerator: u32, denominator: u32) -> bool;
}

pub struct RandomDice {
    rng: Mutex<StdRng>,
}

impl RandomDice {
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl Dice for RandomDice {
    fn roll(&self, range: RangeInclusive<i64>) -> i64 {
        if range.start() >= range.end() {
            return *range.start();
        }
        self.rng.lock().unwrap_or_else(PoisonError::into_inner).gen_range(range)
    }

    fn chance(&self, numerator: u32, denominator: u32) -> bool {
        if denominator == 0 {
            return false;
        }
        if numerator >= denominator {
            return true;
        }
        self.rng
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .gen_ratio(numerator, denominator)
    }
}
