mod dice;
mod duel;
mod growth;

pub use dice::{Dice, RandomDice};
pub use duel::{DuelEngine, DuelOutcome};
pub use growth::{GrowthEngine, GrowthOutcome};
