//! Size Royale - a size-themed elimination tournament simulator.
//!
//! A spec file describes players, event templates and arenas. The
//! [`spec::SpecParser`] turns it into a [`royale::Royale`], and a
//! [`game::Game`] plays it round by round from a seed string.

pub mod build_info;
pub mod config;
pub mod constants;
pub mod error;
pub mod game;
pub mod royale;
pub mod spec;
pub mod units;

pub use config::GameConfig;
pub use error::{GameError, ParseError};
pub use game::{Game, RoundReport, RoundType};
pub use royale::{Royale, Winner};
pub use spec::{ParsedSpec, SpecParser};
