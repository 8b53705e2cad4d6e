//! Binds an event's dummy slots to concrete players.

use crate::royale::{Event, PlayerId, Royale};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

/// Result of one matching attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// One player per slot, index-aligned to slot id (`ids[0]` is slot 1).
    Matched(Vec<PlayerId>),
    /// Some slot had no satisfying player; the caller should try another event.
    NoPlayers,
}

/// Tries to fill every slot of `event` from `pool`.
///
/// Works on a shuffled copy, so `pool` is never touched; on
/// [`MatchOutcome::Matched`] the caller removes the returned ids itself.
///
/// Draws, in order: one shuffle of the pool, then one team pick per distinct
/// abstract team letter in slot order.
pub fn match_players<R: Rng>(
    event: &Event,
    royale: &Royale,
    pool: &[PlayerId],
    rng: &mut R,
) -> MatchOutcome {
    let mut candidates = pool.to_vec();
    candidates.shuffle(rng);

    // Distinct letters never share a real team within one event.
    let mut available = royale.alive_teams();
    let mut resolved: BTreeMap<char, char> = BTreeMap::new();
    for dummy in event.dummies.values() {
        let Some(letter) = dummy.team else {
            continue;
        };
        if resolved.contains_key(&letter) {
            continue;
        }
        if available.is_empty() {
            log::debug!("no team left for abstract team {letter}");
            return MatchOutcome::NoPlayers;
        }
        let real = available.remove(rng.gen_range(0..available.len()));
        resolved.insert(letter, real);
    }

    let mut chosen = Vec::with_capacity(event.tributes);
    for dummy in event.dummies.values() {
        let team = dummy.team.and_then(|letter| resolved.get(&letter).copied());
        let found = candidates.iter().position(|id| {
            royale
                .player(*id)
                .is_some_and(|player| dummy.matches(player, team))
        });
        match found {
            Some(idx) => chosen.push(candidates.remove(idx)),
            None => return MatchOutcome::NoPlayers,
        }
    }

    MatchOutcome::Matched(chosen)
}
