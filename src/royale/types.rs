use super::arena::Arena;
use super::event::Event;
use super::player::{Player, PlayerId};
use super::setup::Setup;
use crate::game::RoundType;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The six non-arena event pools.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPools {
    pub bloodbath: Vec<Event>,
    pub day: Vec<Event>,
    pub night: Vec<Event>,
    pub fatal_day: Vec<Event>,
    pub fatal_night: Vec<Event>,
    pub feast: Vec<Event>,
}

impl EventPools {
    /// Pool for an event type. Arena events live on the arenas themselves.
    pub fn for_round(&self, round: RoundType) -> Option<&[Event]> {
        match round {
            RoundType::Bloodbath => Some(&self.bloodbath),
            RoundType::Day => Some(&self.day),
            RoundType::Night => Some(&self.night),
            RoundType::FatalDay => Some(&self.fatal_day),
            RoundType::FatalNight => Some(&self.fatal_night),
            RoundType::Feast => Some(&self.feast),
            RoundType::Arena => None,
        }
    }

    pub fn for_round_mut(&mut self, round: RoundType) -> Option<&mut Vec<Event>> {
        match round {
            RoundType::Bloodbath => Some(&mut self.bloodbath),
            RoundType::Day => Some(&mut self.day),
            RoundType::Night => Some(&mut self.night),
            RoundType::FatalDay => Some(&mut self.fatal_day),
            RoundType::FatalNight => Some(&mut self.fatal_night),
            RoundType::Feast => Some(&mut self.feast),
            RoundType::Arena => None,
        }
    }
}

/// Who won, once fewer than two sides remain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Team(char),
    Player(String),
    /// Everyone was eliminated.
    Nobody,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Winner::Team(t) => write!(f, "Team {t}"),
            Winner::Player(name) => f.write_str(name),
            Winner::Nobody => f.write_str("Nobody"),
        }
    }
}

/// One side of the contest: a team, or a teamless player on their own.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
enum Side<'a> {
    Team(char),
    Solo(&'a str),
}

/// Everything a spec file defines.
#[derive(Debug, Clone, PartialEq)]
pub struct Royale {
    pub setup: Setup,
    /// Registry in spec order, keyed by player name.
    pub players: IndexMap<String, Player>,
    pub arenas: Vec<Arena>,
    pub events: EventPools,
}

impl Royale {
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get_index(id.0).map(|(_, p)| p)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.get_index_mut(id.0).map(|(_, p)| p)
    }

    pub fn player_id(&self, name: &str) -> Option<PlayerId> {
        self.players.get_index_of(name).map(PlayerId)
    }

    /// Not dead, and inside the size bounds when autoelim is on.
    pub fn is_player_alive(&self, player: &Player) -> bool {
        !player.dead && (!self.setup.autoelim || self.setup.in_bounds(player.height))
    }

    pub fn alive_ids(&self) -> Vec<PlayerId> {
        self.players
            .values()
            .enumerate()
            .filter(|(_, p)| self.is_player_alive(p))
            .map(|(idx, _)| PlayerId(idx))
            .collect()
    }

    pub fn alive_players(&self) -> impl Iterator<Item = &Player> + '_ {
        self.players.values().filter(|p| self.is_player_alive(p))
    }

    pub fn dead_players(&self) -> impl Iterator<Item = &Player> + '_ {
        self.players.values().filter(|p| !self.is_player_alive(p))
    }

    pub fn remaining(&self) -> usize {
        self.alive_players().count()
    }

    /// Sorted distinct teams among alive players.
    pub fn alive_teams(&self) -> Vec<char> {
        self.alive_players()
            .filter_map(|p| p.team)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// `Some` once fewer than two sides remain. Recomputed on every call.
    pub fn winner(&self) -> Option<Winner> {
        let sides: BTreeSet<Side<'_>> = self
            .alive_players()
            .map(|p| match p.team {
                Some(t) => Side::Team(t),
                None => Side::Solo(&p.name),
            })
            .collect();

        let mut iter = sides.into_iter();
        match (iter.next(), iter.next()) {
            (None, _) => Some(Winner::Nobody),
            (Some(Side::Team(t)), None) => Some(Winner::Team(t)),
            (Some(Side::Solo(name)), None) => Some(Winner::Player(name.to_string())),
            _ => None,
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.winner().is_some()
    }

    /// One status line per alive player.
    pub fn current_players(&self) -> String {
        self.alive_players()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Royale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = &self.setup;
        writeln!(
            f,
            "Autoelim: {}, Death Rate: {}, Arena Frequency: {}, Max Size: {}, Min Size: {}",
            s.autoelim, s.death_rate, s.arena_frequency, s.max_size, s.min_size
        )?;
        writeln!(f, "Players:")?;
        for p in self.players.values() {
            writeln!(f, "  {p}")?;
        }
        writeln!(f, "Arenas:")?;
        for arena in &self.arenas {
            writeln!(f, "  {}: {}", arena.name, arena.description)?;
            for e in &arena.events {
                writeln!(f, "    {e}")?;
            }
        }
        writeln!(f, "Events:")?;
        for round in RoundType::EVENT_POOLS {
            writeln!(f, "  {}:", round.title())?;
            for e in self.events.for_round(round).unwrap_or_default() {
                writeln!(f, "    {e}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::royale::SetupOverrides;

    fn royale(players: &[(&str, &str)], setup: &str) -> Royale {
        let overrides = SetupOverrides::from_meta(setup).unwrap();
        Royale {
            setup: Setup::from_overrides(&overrides).unwrap(),
            players: players
                .iter()
                .map(|(name, meta)| (name.to_string(), Player::new(name, meta).unwrap()))
                .collect(),
            arenas: Vec::new(),
            events: EventPools::default(),
        }
    }

    #[test]
    fn test_out_of_bounds_player_is_not_alive() {
        let r = royale(
            &[("Tiny", "gender:F, height:0.5m"), ("Mid", "gender:M, height:2m")],
            "minsize:1m, maxsize:10m",
        );
        let tiny = &r.players["Tiny"];
        assert!(!tiny.dead);
        assert!(!r.is_player_alive(tiny));
        assert_eq!(r.remaining(), 1);
        assert_eq!(r.alive_ids(), vec![PlayerId(1)]);
    }

    #[test]
    fn test_autoelim_off_ignores_bounds() {
        let r = royale(
            &[("Tiny", "gender:F, height:0.5m"), ("Mid", "gender:M, height:2m")],
            "autoelim:false, minsize:1m, maxsize:10m",
        );
        assert_eq!(r.remaining(), 2);
    }

    #[test]
    fn test_winner_by_team() {
        let mut r = royale(
            &[
                ("A1", "team:A, gender:F, height:2m"),
                ("A2", "team:A, gender:F, height:2m"),
                ("B1", "team:B, gender:M, height:2m"),
            ],
            "",
        );
        assert_eq!(r.winner(), None);
        r.players["B1"].dead = true;
        assert_eq!(r.winner(), Some(Winner::Team('A')));
        assert_eq!(r.alive_teams(), vec!['A']);
    }

    #[test]
    fn test_winner_solo_and_nobody() {
        let mut r = royale(
            &[("X", "gender:X, height:2m"), ("Y", "gender:X, height:2m")],
            "",
        );
        assert!(!r.is_game_over());
        r.players["X"].dead = true;
        assert_eq!(r.winner(), Some(Winner::Player("Y".to_string())));
        r.players["Y"].dead = true;
        assert_eq!(r.winner(), Some(Winner::Nobody));
    }

    #[test]
    fn test_teamless_player_is_own_side() {
        let mut r = royale(
            &[("A1", "team:A, gender:F, height:2m"), ("Lone", "gender:M, height:2m")],
            "",
        );
        assert_eq!(r.winner(), None);
        r.players["A1"].dead = true;
        assert_eq!(r.winner(), Some(Winner::Player("Lone".to_string())));
    }
}
