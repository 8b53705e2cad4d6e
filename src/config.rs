//! Run configuration for the console runner.

use std::path::PathBuf;

/// Configuration for one game run.
#[derive(Debug, Clone)]
pub struct GameConfig {
    /// Spec file to load
    pub spec_path: PathBuf,

    /// Seed string for reproducibility (None = generated)
    pub seed: Option<String>,

    /// Rounds to play before giving up on a game that never ends
    pub max_rounds: u32,

    /// Abort when the spec produced any parse errors
    pub strict: bool,

    /// Write the transcript as JSON
    pub json: bool,

    /// Log verbosity (0 = warnings only, 1 = round info, 2 = engine debug)
    pub verbosity: u8,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            spec_path: PathBuf::from("data/royale-spec.txt"),
            seed: None,
            max_rounds: 500,
            strict: false,
            json: false,
            verbosity: 1,
        }
    }
}

impl GameConfig {
    /// `env_logger` filter matching `verbosity`. The runner prints the
    /// narrative itself, so its log target stays quiet below debug.
    pub fn log_filter(&self) -> &'static str {
        match self.verbosity {
            0 => "warn",
            1 => "info,narrative=off",
            _ => "debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert!(config.seed.is_none());
        assert!(!config.strict);
        assert_eq!(config.log_filter(), "info,narrative=off");
    }

    #[test]
    fn test_log_filter_levels() {
        let quiet = GameConfig { verbosity: 0, ..Default::default() };
        let loud = GameConfig { verbosity: 5, ..Default::default() };
        assert_eq!(quiet.log_filter(), "warn");
        assert_eq!(loud.log_filter(), "debug");
    }
}
