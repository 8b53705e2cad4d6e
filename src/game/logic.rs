//! The round state machine.
//!
//! Each [`Game::advance`] call plays one full round: it picks the round type,
//! then keeps drawing events for the players not yet placed this round until
//! everyone has taken part or the game is over.

use super::matcher::{match_players, MatchOutcome};
use super::rng::{random_seed, rng_from_seed};
use super::types::{EventResult, RoundReport, RoundType};
use crate::constants::NARRATIVE_LOG_TARGET;
use crate::error::GameError;
use crate::royale::{Event, PlayerId, Royale, Winner};
use rand::distributions::WeightedError;
use rand::seq::SliceRandom;
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use std::collections::HashSet;

/// Identifies an event within the source it was drawn from.
type EventKey = (RoundType, usize);

pub struct Game {
    royale: Royale,
    seed: String,
    rng: ChaCha8Rng,
    day: u32,
    /// Type of the last round played (`None` before the first).
    round_type: Option<RoundType>,
    running_arena: bool,
    /// Index into `royale.arenas` while an arena round runs.
    arena: Option<usize>,
    feast_used: bool,
    original_players: usize,
}

impl Game {
    /// Starts a game. Without a seed, one is generated and kept for replay.
    pub fn new(royale: Royale, seed: Option<&str>) -> Self {
        let seed = seed.map(str::to_string).unwrap_or_else(random_seed);
        log::info!(target: NARRATIVE_LOG_TARGET, "seed = {seed}");
        let original_players = royale.players.len();
        Self {
            rng: rng_from_seed(&seed),
            royale,
            seed,
            day: 0,
            round_type: None,
            running_arena: false,
            arena: None,
            feast_used: false,
            original_players,
        }
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }

    pub fn royale(&self) -> &Royale {
        &self.royale
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn round_type(&self) -> Option<RoundType> {
        self.round_type
    }

    pub fn feast_used(&self) -> bool {
        self.feast_used
    }

    /// Recomputed from the current players on every call.
    pub fn game_over(&self) -> Option<Winner> {
        self.royale.winner()
    }

    /// Plays the next round.
    pub fn advance(&mut self) -> Result<RoundReport, GameError> {
        if self.royale.is_game_over() {
            return Err(GameError::GameOver);
        }

        let round = self.next_round_type()?;
        if round == RoundType::Arena && !self.running_arena {
            let idx = self.rng.gen_range(0..self.royale.arenas.len());
            self.arena = Some(idx);
            self.running_arena = true;
        }
        let arena_name = self
            .arena
            .and_then(|idx| self.royale.arenas.get(idx))
            .map(|a| a.name.clone());
        log::info!("Day {}: {} round ({} alive)", self.day, round.title(), self.royale.remaining());
        if let Some(arena) = self.arena.and_then(|idx| self.royale.arenas.get(idx)) {
            log::info!(target: NARRATIVE_LOG_TARGET, "{}", arena.description);
        }

        let mut pool = self.royale.alive_ids();
        let mut rejected: HashSet<EventKey> = HashSet::new();
        let mut events = Vec::new();
        while !pool.is_empty() {
            if self.royale.is_game_over() {
                log::debug!("game over with {} player(s) unplaced", pool.len());
                break;
            }
            let event_type = self.event_type_for(round);
            events.push(self.run_event(round, event_type, &mut pool, &mut rejected)?);
        }

        if round == RoundType::Arena {
            self.running_arena = false;
            self.arena = None;
        }

        let game_over = self.royale.winner();
        if let Some(winner) = &game_over {
            log::info!(target: NARRATIVE_LOG_TARGET, "The winner is {winner}!");
        }

        Ok(RoundReport {
            day: self.day,
            round,
            arena: arena_name,
            events,
            game_over,
        })
    }

    /// Plays rounds until the game ends or `max_rounds` rounds were played.
    pub fn run_to_end(&mut self, max_rounds: u32) -> Result<Vec<RoundReport>, GameError> {
        let mut reports = Vec::new();
        for _ in 0..max_rounds {
            if self.royale.is_game_over() {
                break;
            }
            reports.push(self.advance()?);
        }
        Ok(reports)
    }

    pub(crate) fn next_round_type(&mut self) -> Result<RoundType, GameError> {
        let next = match self.round_type {
            None if self.day == 0 => {
                self.day = 1;
                RoundType::Bloodbath
            }
            None => {
                return Err(GameError::InvariantViolation(format!(
                    "no previous round on day {}",
                    self.day
                )))
            }
            Some(RoundType::Bloodbath) => RoundType::Day,
            Some(prev) => {
                if self.feast_due() {
                    self.feast_used = true;
                    RoundType::Feast
                } else if self.roll_arena() {
                    RoundType::Arena
                } else {
                    match prev {
                        RoundType::Day => RoundType::Night,
                        RoundType::Night | RoundType::Arena | RoundType::Feast => {
                            self.day += 1;
                            RoundType::Day
                        }
                        other => {
                            return Err(GameError::InvariantViolation(format!(
                                "no round follows a {other} round"
                            )))
                        }
                    }
                }
            }
        };
        self.round_type = Some(next);
        Ok(next)
    }

    fn feast_due(&self) -> bool {
        !self.feast_used
            && !self.royale.events.feast.is_empty()
            && self.royale.remaining() * 2 <= self.original_players
    }

    /// Always consumes one draw; only hits when the spec has arenas.
    fn roll_arena(&mut self) -> bool {
        let roll = self.rng.gen_range(1..=self.royale.setup.arena_frequency);
        roll == 1 && !self.royale.arenas.is_empty()
    }

    /// Day and night events are promoted to their fatal pool 1 in `death_rate` times.
    fn event_type_for(&mut self, round: RoundType) -> RoundType {
        let Some(fatal) = round.fatal() else {
            return round;
        };
        let roll = self.rng.gen_range(1..=self.royale.setup.death_rate);
        let has_fatal_events = self
            .royale
            .events
            .for_round(fatal)
            .is_some_and(|pool| !pool.is_empty());
        if roll == 1 && has_fatal_events {
            fatal
        } else {
            round
        }
    }

    fn run_event(
        &mut self,
        round: RoundType,
        event_type: RoundType,
        pool: &mut Vec<PlayerId>,
        rejected: &mut HashSet<EventKey>,
    ) -> Result<EventResult, GameError> {
        let (event, ids) = loop {
            let source = event_source(&self.royale, event_type, self.arena)?;
            let candidates: Vec<usize> = (0..source.len())
                .filter(|idx| !rejected.contains(&(event_type, *idx)))
                .collect();
            let idx = choose_event(&candidates, source, &mut self.rng).map_err(|e| match e {
                WeightedError::NoItem => GameError::OutOfEvents {
                    round,
                    pool: pool.len(),
                },
                other => GameError::InvariantViolation(format!("bad event weights: {other}")),
            })?;

            match match_players(&source[idx], &self.royale, pool, &mut self.rng) {
                MatchOutcome::Matched(ids) => break (source[idx].clone(), ids),
                MatchOutcome::NoPlayers => {
                    log::debug!("no players for {event_type} event {idx}, dropping it this round");
                    rejected.insert((event_type, idx));
                }
            }
        };

        let text = {
            let players: Vec<_> = ids.iter().filter_map(|id| self.royale.player(*id)).collect();
            event.render(&players)
        };
        let names: Vec<String> = ids
            .iter()
            .filter_map(|id| self.royale.player(*id))
            .map(|p| p.name.clone())
            .collect();

        self.apply_effects(&event, &ids);
        pool.retain(|id| !ids.contains(id));

        let eliminated = ids
            .iter()
            .filter_map(|id| self.royale.player(*id))
            .filter(|p| !self.royale.is_player_alive(p))
            .map(|p| p.name.clone())
            .collect();

        log::info!(target: NARRATIVE_LOG_TARGET, "{text}");
        Ok(EventResult {
            event_type,
            text,
            players: names,
            eliminated,
        })
    }

    /// Sizes, eliminations, perpetrator credit, gives, removes, in that order.
    fn apply_effects(&mut self, event: &Event, ids: &[PlayerId]) {
        let slot = |s: usize| s.checked_sub(1).and_then(|i| ids.get(i)).copied();

        for (s, diff) in &event.sizes {
            if let Some(player) = slot(*s).and_then(|id| self.royale.player_mut(id)) {
                player.change_height(*diff);
            }
        }
        for s in &event.elims {
            if let Some(player) = slot(*s).and_then(|id| self.royale.player_mut(id)) {
                player.dead = true;
            }
        }
        let credit = event.elims.len() as u32;
        for s in &event.perps {
            if let Some(player) = slot(*s).and_then(|id| self.royale.player_mut(id)) {
                player.elims += credit;
            }
        }
        for (s, item) in &event.gives {
            if let Some(player) = slot(*s).and_then(|id| self.royale.player_mut(id)) {
                player.give_item(item);
            }
        }
        for (s, item) in &event.removes {
            if let Some(player) = slot(*s).and_then(|id| self.royale.player_mut(id)) {
                if !player.remove_item(item) {
                    log::warn!("{} has no item {:?} to remove", player.name, item);
                }
            }
        }
    }
}

/// Events an event type draws from: the running arena's, or a pool.
fn event_source(
    royale: &Royale,
    event_type: RoundType,
    arena: Option<usize>,
) -> Result<&[Event], GameError> {
    if event_type == RoundType::Arena {
        return arena
            .and_then(|idx| royale.arenas.get(idx))
            .map(|a| a.events.as_slice())
            .ok_or_else(|| GameError::InvariantViolation("arena round without an arena".into()));
    }
    royale
        .events
        .for_round(event_type)
        .ok_or_else(|| GameError::InvariantViolation(format!("no pool for {event_type}")))
}

/// Rarity-weighted pick among `candidates` (indices into `events`).
pub(crate) fn choose_event<R: Rng>(
    candidates: &[usize],
    events: &[Event],
    rng: &mut R,
) -> Result<usize, WeightedError> {
    candidates
        .choose_weighted(rng, |&idx| events[idx].rarity)
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::SpecParser;
    use rand::SeedableRng;

    fn game(spec: &str, seed: &str) -> Game {
        let parsed = SpecParser::new().parse(spec).unwrap();
        assert!(parsed.errors.is_empty(), "{:?}", parsed.errors);
        Game::new(parsed.royale, Some(seed))
    }

    const FOUR_PLAYERS: &str = "\
[players]
\"A1\"
team:A, gender:F, height:1.7m
\"A2\"
team:A, gender:M, height:1.8m
\"B1\"
team:B, gender:X, height:1.6m
\"B2\"
team:B, gender:F, height:1.5m
[bloodbath]
\"%1% and %2% split up.\"
tributes:2
[day]
\"%1% explores.\"
tributes:1
[night]
\"%1% sleeps.\"
tributes:1
[feast]
\"%1% feasts.\"
tributes:1
";

    #[test]
    fn test_first_round_is_bloodbath_then_day() {
        let mut g = game(FOUR_PLAYERS, "t");
        assert_eq!(g.day(), 0);
        assert_eq!(g.next_round_type().unwrap(), RoundType::Bloodbath);
        assert_eq!(g.day(), 1);
        assert_eq!(g.next_round_type().unwrap(), RoundType::Day);
        assert_eq!(g.day(), 1);
    }

    #[test]
    fn test_day_night_alternation_without_arenas() {
        let mut g = game(FOUR_PLAYERS, "t");
        g.next_round_type().unwrap();
        g.next_round_type().unwrap();
        assert_eq!(g.next_round_type().unwrap(), RoundType::Night);
        assert_eq!(g.day(), 1);
        assert_eq!(g.next_round_type().unwrap(), RoundType::Day);
        assert_eq!(g.day(), 2);
    }

    #[test]
    fn test_feast_triggers_once_at_half() {
        let mut g = game(FOUR_PLAYERS, "t");
        g.next_round_type().unwrap();
        g.next_round_type().unwrap();
        g.royale.players["A1"].dead = true;
        g.royale.players["B1"].dead = true;
        assert_eq!(g.next_round_type().unwrap(), RoundType::Feast);
        assert!(g.feast_used());
        assert_eq!(g.next_round_type().unwrap(), RoundType::Day);
        assert_ne!(g.next_round_type().unwrap(), RoundType::Feast);
    }

    #[test]
    fn test_fatal_previous_round_is_invariant_violation() {
        let mut g = game(FOUR_PLAYERS, "t");
        g.day = 1;
        g.round_type = Some(RoundType::FatalDay);
        let err = g.next_round_type().unwrap_err();
        assert!(err.is_engine_bug());
    }

    #[test]
    fn test_bloodbath_round_consumes_whole_pool() {
        let mut g = game(FOUR_PLAYERS, "seed-1");
        let report = g.advance().unwrap();
        assert_eq!(report.round, RoundType::Bloodbath);
        assert_eq!(report.events.len(), 2);
        let mut seen: Vec<_> = report.events.iter().flat_map(|e| e.players.clone()).collect();
        for e in &report.events {
            assert_eq!(e.players.len(), 2);
            assert_eq!(e.text, format!("{} and {} split up.", e.players[0], e.players[1]));
        }
        seen.sort();
        assert_eq!(seen, vec!["A1", "A2", "B1", "B2"]);
    }

    #[test]
    fn test_out_of_events_is_fatal() {
        let spec = "[players]\n\"A\"\ngender:F, height:1m\n\"B\"\ngender:M, height:1m\n[bloodbath]\n\"%1% hides.\"\ntributes:1\n[day]\n\"%1<1cm% shrinks.\"\ntributes:1\n";
        let mut g = game(spec, "x");
        g.advance().unwrap();
        let err = g.advance().unwrap_err();
        assert!(matches!(err, GameError::OutOfEvents { round: RoundType::Day, .. }));
        assert!(!err.is_engine_bug());
    }

    #[test]
    fn test_effects_are_applied() {
        let spec = "\
[players]
\"Big\"
gender:M, height:2m, inv:club
\"Small\"
gender:F, height:1m
[bloodbath]
\"%1>1.5m% squashes %2<1.5m%.\"
tributes:2, elim:2, perp:1, size:1:x2, give:1:trophy, remove:1:club
";
        let mut g = game(spec, "fx");
        let report = g.advance().unwrap();
        assert_eq!(report.events[0].text, "Big squashes Small.");
        assert_eq!(report.events[0].eliminated, vec!["Small"]);
        assert_eq!(report.game_over, Some(Winner::Player("Big".to_string())));

        let big = &g.royale().players["Big"];
        assert_eq!(big.height.meters(), 4.0);
        assert_eq!(big.elims, 1);
        assert_eq!(big.inventory, vec!["trophy"]);
        assert!(g.royale().players["Small"].dead);
        assert!(matches!(g.advance(), Err(GameError::GameOver)));
    }

    #[test]
    fn test_weighted_draw_follows_rarity() {
        let events = vec![
            Event::new("%1% rare.", "tributes:1, rarity:1").unwrap(),
            Event::new("%1% common.", "tributes:1, rarity:3").unwrap(),
        ];
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let mut counts = [0u32; 2];
        for _ in 0..8000 {
            counts[choose_event(&[0, 1], &events, &mut rng).unwrap()] += 1;
        }
        let ratio = counts[1] as f64 / counts[0] as f64;
        assert!((2.6..3.4).contains(&ratio), "ratio was {ratio}");
    }

    #[test]
    fn test_empty_candidates_is_no_item() {
        let events: Vec<Event> = Vec::new();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        assert!(matches!(
            choose_event(&[], &events, &mut rng),
            Err(WeightedError::NoItem)
        ));
    }

    #[test]
    fn test_same_seed_same_game() {
        let mut a = game(FOUR_PLAYERS, "replay");
        let mut b = game(FOUR_PLAYERS, "replay");
        for _ in 0..4 {
            assert_eq!(a.advance().unwrap(), b.advance().unwrap());
        }
    }
}
