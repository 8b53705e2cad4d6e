// Setup defaults (used when a spec leaves the key unset)
pub const DEFAULT_AUTOELIM: bool = true;
pub const DEFAULT_DEATH_RATE: u32 = 10; // 1-in-N fatal day/night events
pub const DEFAULT_ARENA_FREQUENCY: u32 = 10; // 1-in-N arena rounds
pub const DEFAULT_MIN_SIZE: &str = "1mm";
pub const DEFAULT_MAX_SIZE: &str = "4mi";

// Event defaults
pub const DEFAULT_RARITY: f64 = 1.0;

// Length units, in metres
pub const METERS_PER_MILLIMETER: f64 = 0.001;
pub const METERS_PER_CENTIMETER: f64 = 0.01;
pub const METERS_PER_KILOMETER: f64 = 1000.0;
pub const METERS_PER_INCH: f64 = 0.0254;
pub const METERS_PER_FOOT: f64 = 0.3048;
pub const METERS_PER_YARD: f64 = 0.9144;
pub const METERS_PER_MILE: f64 = 1609.344;

// Generated seeds are this many alphanumeric characters
pub const GENERATED_SEED_LEN: usize = 8;

// Log target for the round narrative (rendered event text)
pub const NARRATIVE_LOG_TARGET: &str = "narrative";
