//! Error types for spec loading and simulation.

use crate::game::RoundType;

/// Errors raised while turning spec text into entities.
///
/// Most of these are recorded per line by the [`crate::spec::SpecParser`]
/// and do not stop parsing. Only [`ParseError::EmptySpec`] and
/// [`ParseError::Io`] abort a load.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// A metadata item without a `key:value` shape.
    #[error("Metatag {0:?} has no value.")]
    MalformedTag(String),

    /// An entity type with no metadata schema.
    #[error("Type {0} does not define valid metadata.")]
    UnknownEntity(&'static str),

    /// A value that does not fit its key (bad number, unit, gender...).
    #[error("Invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// A line that fits no shape of the active section.
    #[error("{0}")]
    Syntax(String),

    /// The same slot id used with two different constraint suffixes.
    #[error("Multiple definitions for player {0}!")]
    ConflictingDefinition(usize),

    #[error("Tribute amount mismatch. ({declared} != {found})")]
    TributeMismatch { declared: usize, found: usize },

    /// Slot ids that are not exactly `1..=N`.
    #[error("Out of order player IDs! (found {found:?})")]
    SlotGap { found: Vec<usize> },

    #[error("{0} is not a URL.")]
    InvalidUrl(String),

    #[error("Duplicate player name {0:?}.")]
    DuplicatePlayer(String),

    #[error("Spec file is empty.")]
    EmptySpec,

    #[error("Could not read spec file: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    pub fn invalid(key: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        ParseError::InvalidValue {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    pub fn syntax(msg: impl Into<String>) -> Self {
        ParseError::Syntax(msg.into())
    }
}

/// Fatal errors raised while the simulation runs.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Every candidate event of a round failed to find players.
    #[error("Out of events for a {round} round with {pool} player(s) left to place.")]
    OutOfEvents { round: RoundType, pool: usize },

    /// An unreachable round transition or similar internal inconsistency.
    #[error("Internal invariant violated: {0}")]
    InvariantViolation(String),

    /// `advance` was called after the game already ended.
    #[error("The game is already over.")]
    GameOver,
}

impl GameError {
    /// True for errors caused by the engine rather than by the spec file.
    pub fn is_engine_bug(&self) -> bool {
        matches!(self, GameError::InvariantViolation(_))
    }
}
