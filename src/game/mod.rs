//! Game engine: round sequencing, event selection and player matching.

mod logic;
mod matcher;
mod rng;
mod types;

pub use logic::Game;
pub use matcher::{match_players, MatchOutcome};
pub use rng::{random_seed, rng_from_seed};
pub use types::{EventResult, RoundReport, RoundType};
