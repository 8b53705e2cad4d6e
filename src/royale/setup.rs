use super::metaparser::{parse_meta, Metadata, Shape};
use crate::constants::{
    DEFAULT_ARENA_FREQUENCY, DEFAULT_AUTOELIM, DEFAULT_DEATH_RATE, DEFAULT_MAX_SIZE,
    DEFAULT_MIN_SIZE, METERS_PER_MILE, METERS_PER_MILLIMETER,
};
use crate::error::ParseError;
use crate::units::Quantity;

/// Overrides collected from the `[setup]` section. `None` means "use the default".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SetupOverrides {
    pub autoelim: Option<bool>,
    pub death_rate: Option<u32>,
    pub min_size: Option<Quantity>,
    pub max_size: Option<Quantity>,
    pub arena_frequency: Option<u32>,
}

impl Metadata for SetupOverrides {
    const ENTITY: &'static str = "Setup";
    const SCHEMA: &'static [(&'static str, Shape)] = &[
        ("autoelim", Shape::Single),
        ("deathrate", Shape::Single),
        ("maxsize", Shape::Single),
        ("minsize", Shape::Single),
        ("arenafreq", Shape::Single),
    ];
}

impl SetupOverrides {
    /// Builds overrides from one setup line.
    pub fn from_meta(meta: &str) -> Result<Self, ParseError> {
        let tags = parse_meta::<Self>(meta)?;
        Ok(Self {
            autoelim: tags.single("autoelim").map(parse_bool).transpose()?,
            death_rate: tags
                .single("deathrate")
                .map(|v| parse_positive("deathrate", v))
                .transpose()?,
            min_size: tags.single("minsize").map(Quantity::parse).transpose()?,
            max_size: tags.single("maxsize").map(Quantity::parse).transpose()?,
            arena_frequency: tags
                .single("arenafreq")
                .map(|v| parse_positive("arenafreq", v))
                .transpose()?,
        })
    }

    /// Later lines win over earlier ones, key by key.
    pub fn merge(&mut self, later: SetupOverrides) {
        self.autoelim = later.autoelim.or(self.autoelim);
        self.death_rate = later.death_rate.or(self.death_rate);
        self.min_size = later.min_size.or(self.min_size);
        self.max_size = later.max_size.or(self.max_size);
        self.arena_frequency = later.arena_frequency.or(self.arena_frequency);
    }
}

/// Game rules with defaults applied. Immutable once the spec is loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Setup {
    pub autoelim: bool,
    /// 1-in-N chance that a day/night event is drawn from the fatal pool.
    pub death_rate: u32,
    pub min_size: Quantity,
    pub max_size: Quantity,
    /// 1-in-N chance that a round is an arena round.
    pub arena_frequency: u32,
}

impl Setup {
    pub fn from_overrides(overrides: &SetupOverrides) -> Result<Self, ParseError> {
        let min_size = match overrides.min_size {
            Some(q) => q,
            None => Quantity::parse(DEFAULT_MIN_SIZE)?,
        };
        let max_size = match overrides.max_size {
            Some(q) => q,
            None => Quantity::parse(DEFAULT_MAX_SIZE)?,
        };
        if min_size >= max_size {
            return Err(ParseError::invalid(
                "minsize",
                min_size.to_string(),
                format!("must be below maxsize {max_size}"),
            ));
        }

        Ok(Self {
            autoelim: overrides.autoelim.unwrap_or(DEFAULT_AUTOELIM),
            death_rate: overrides.death_rate.unwrap_or(DEFAULT_DEATH_RATE),
            min_size,
            max_size,
            arena_frequency: overrides.arena_frequency.unwrap_or(DEFAULT_ARENA_FREQUENCY),
        })
    }

    /// True when `height` is strictly inside the survivable range.
    pub fn in_bounds(&self, height: Quantity) -> bool {
        height > self.min_size && height < self.max_size
    }
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            autoelim: DEFAULT_AUTOELIM,
            death_rate: DEFAULT_DEATH_RATE,
            // Same values as DEFAULT_MIN_SIZE / DEFAULT_MAX_SIZE
            min_size: Quantity::from_meters(METERS_PER_MILLIMETER),
            max_size: Quantity::from_meters(4.0 * METERS_PER_MILE),
            arena_frequency: DEFAULT_ARENA_FREQUENCY,
        }
    }
}

fn parse_bool(value: &str) -> Result<bool, ParseError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(ParseError::invalid("autoelim", value, "expected true or false")),
    }
}

pub(crate) fn parse_positive(key: &str, value: &str) -> Result<u32, ParseError> {
    match value.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ParseError::invalid(key, value, "expected a positive integer")),
    }
}
