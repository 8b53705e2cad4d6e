use crate::royale::Winner;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Round types of the state machine. `FatalDay`/`FatalNight` only appear as
/// event types: a day or night round promotes single events to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoundType {
    Bloodbath,
    Day,
    Night,
    FatalDay,
    FatalNight,
    Arena,
    Feast,
}

impl RoundType {
    /// Types backed by one of the royale's six event pools.
    pub const EVENT_POOLS: [RoundType; 6] = [
        RoundType::Bloodbath,
        RoundType::Day,
        RoundType::Night,
        RoundType::FatalDay,
        RoundType::FatalNight,
        RoundType::Feast,
    ];

    /// Section name in a spec file (`[fatalday]`).
    pub fn name(self) -> &'static str {
        match self {
            RoundType::Bloodbath => "bloodbath",
            RoundType::Day => "day",
            RoundType::Night => "night",
            RoundType::FatalDay => "fatalday",
            RoundType::FatalNight => "fatalnight",
            RoundType::Arena => "arena",
            RoundType::Feast => "feast",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            RoundType::Bloodbath => "Bloodbath",
            RoundType::Day => "Day",
            RoundType::Night => "Night",
            RoundType::FatalDay => "Fatal Day",
            RoundType::FatalNight => "Fatal Night",
            RoundType::Arena => "Arena",
            RoundType::Feast => "Feast",
        }
    }

    pub fn from_pool_name(name: &str) -> Option<Self> {
        Self::EVENT_POOLS.into_iter().find(|r| r.name() == name)
    }

    /// The lethal counterpart of a day or night.
    pub fn fatal(self) -> Option<Self> {
        match self {
            RoundType::Day => Some(RoundType::FatalDay),
            RoundType::Night => Some(RoundType::FatalNight),
            _ => None,
        }
    }
}

impl fmt::Display for RoundType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One resolved event: its rendered text and who took part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventResult {
    pub event_type: RoundType,
    pub text: String,
    /// Participants, in slot order.
    pub players: Vec<String>,
    /// Participants no longer alive after the event's effects.
    pub eliminated: Vec<String>,
}

/// Everything one call to [`crate::game::Game::advance`] produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoundReport {
    pub day: u32,
    pub round: RoundType,
    /// Name of the arena for arena rounds.
    pub arena: Option<String>,
    pub events: Vec<EventResult>,
    /// Set when the game ended during (or right at the end of) this round.
    pub game_over: Option<Winner>,
}

impl RoundReport {
    pub fn heading(&self) -> String {
        match (&self.round, &self.arena) {
            (RoundType::Arena, Some(name)) => format!("Day {}: {} ({})", self.day, self.round.title(), name),
            _ => format!("Day {}: {}", self.day, self.round.title()),
        }
    }
}
