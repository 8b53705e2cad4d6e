//! Event templates: slot scanning, validation and text rendering.
//!
//! Event text references players through `%`-delimited tokens:
//!
//! - `%1%`, `%2<3m&:A%`: slot tokens. The leading number is the slot id,
//!   the rest is the slot's constraint suffix (see [`DummyPlayer`]).
//! - `%p:1%`, `%p:1o%`, `%p:1s%`, `%p:1self%`: subject, object, possessive
//!   and reflexive pronoun of the player in slot 1. `%P:` capitalises.

use super::dummy::DummyPlayer;
use super::metaparser::{parse_meta, Metadata, Shape};
use super::player::Player;
use crate::constants::DEFAULT_RARITY;
use crate::error::ParseError;
use crate::units::Diff;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::LazyLock;

static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"%(?:(\d+)([^%]*)|([pP]):([^%]*))%").expect("token regex is valid")
});

static PRONOUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)(o|s|self)?$").expect("pronoun regex is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PronounCase {
    Subject,
    Object,
    Possessive,
    Reflexive,
}

impl PronounCase {
    fn from_suffix(s: Option<&str>) -> Self {
        match s {
            Some("o") => PronounCase::Object,
            Some("s") => PronounCase::Possessive,
            Some("self") => PronounCase::Reflexive,
            _ => PronounCase::Subject,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub text: String,
    pub tributes: usize,
    /// Height changes, `(slot, diff)`.
    pub sizes: Vec<(usize, Diff)>,
    /// Slots eliminated by this event.
    pub elims: Vec<usize>,
    /// Slots credited with the eliminations.
    pub perps: Vec<usize>,
    pub gives: Vec<(usize, String)>,
    pub removes: Vec<(usize, String)>,
    /// Relative draw weight within a pool.
    pub rarity: f64,
    /// Slot id (1-based) to constraints. Keys are exactly `1..=tributes`.
    pub dummies: BTreeMap<usize, DummyPlayer>,
}

impl Metadata for Event {
    const ENTITY: &'static str = "Event";
    const SCHEMA: &'static [(&'static str, Shape)] = &[
        ("tributes", Shape::Single),
        ("size", Shape::Compound),
        ("elim", Shape::List),
        ("perp", Shape::List),
        ("give", Shape::Compound),
        ("remove", Shape::Compound),
        ("rarity", Shape::Single),
    ];
}

impl Event {
    pub fn new(text: &str, meta: &str) -> Result<Self, ParseError> {
        let tags = parse_meta::<Self>(meta)?;

        let tributes = match tags.single("tributes") {
            None => return Err(ParseError::syntax("Tribute amount not defined.")),
            Some(v) => match v.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => return Err(ParseError::invalid("tributes", v, "expected a positive integer")),
            },
        };

        let rarity = match tags.single("rarity") {
            None => DEFAULT_RARITY,
            Some(v) => match v.parse::<f64>() {
                Ok(r) if r.is_finite() && r > 0.0 => r,
                _ => return Err(ParseError::invalid("rarity", v, "expected a positive number")),
            },
        };

        let sizes = tags
            .compound("size")
            .unwrap_or_default()
            .iter()
            .map(|(slot, diff)| Ok((parse_slot("size", slot)?, Diff::parse(diff)?)))
            .collect::<Result<Vec<_>, ParseError>>()?;
        let elims = parse_slot_list("elim", tags.list("elim").unwrap_or_default())?;
        let perps = parse_slot_list("perp", tags.list("perp").unwrap_or_default())?;
        let gives = parse_item_pairs("give", tags.compound("give").unwrap_or_default())?;
        let removes = parse_item_pairs("remove", tags.compound("remove").unwrap_or_default())?;

        let (dummies, pronoun_slots) = scan_slots(text)?;

        let ids: Vec<usize> = dummies.keys().copied().collect();
        if ids.iter().copied().ne(1..=ids.len()) {
            return Err(ParseError::SlotGap { found: ids });
        }
        if tributes != dummies.len() {
            return Err(ParseError::TributeMismatch {
                declared: tributes,
                found: dummies.len(),
            });
        }

        let referenced = sizes
            .iter()
            .map(|(s, _)| ("size", *s))
            .chain(elims.iter().map(|s| ("elim", *s)))
            .chain(perps.iter().map(|s| ("perp", *s)))
            .chain(gives.iter().map(|(s, _)| ("give", *s)))
            .chain(removes.iter().map(|(s, _)| ("remove", *s)))
            .chain(pronoun_slots.iter().map(|s| ("pronoun", *s)));
        for (key, slot) in referenced {
            if slot > tributes {
                return Err(ParseError::invalid(
                    key,
                    slot.to_string(),
                    format!("event only has {tributes} tribute(s)"),
                ));
            }
        }

        Ok(Self {
            text: text.to_string(),
            tributes,
            sizes,
            elims,
            perps,
            gives,
            removes,
            rarity,
            dummies,
        })
    }

    /// True when this event can eliminate players.
    pub fn is_lethal(&self) -> bool {
        !self.elims.is_empty()
    }

    /// Substitutes names and pronouns. `players[i]` fills slot `i + 1`.
    pub fn render(&self, players: &[&Player]) -> String {
        TOKEN_RE
            .replace_all(&self.text, |caps: &Captures| {
                render_token(caps, players).unwrap_or_else(|| caps[0].to_string())
            })
            .into_owned()
    }
}

fn render_token(caps: &Captures, players: &[&Player]) -> Option<String> {
    if let Some(slot) = caps.get(1) {
        let player = slot_player(slot.as_str(), players)?;
        return Some(player.name.clone());
    }

    let capital = caps.get(3)?.as_str() == "P";
    let pronoun = PRONOUN_RE.captures(caps.get(4)?.as_str())?;
    let player = slot_player(&pronoun[1], players)?;
    let word = match PronounCase::from_suffix(pronoun.get(2).map(|m| m.as_str())) {
        PronounCase::Subject => player.gender.subject(),
        PronounCase::Object => player.gender.object(),
        PronounCase::Possessive => player.gender.possessive(),
        PronounCase::Reflexive => player.gender.reflexive(),
    };
    Some(if capital { capitalize(word) } else { word.to_string() })
}

fn slot_player<'a>(slot: &str, players: &[&'a Player]) -> Option<&'a Player> {
    let idx: usize = slot.parse().ok()?;
    players.get(idx.checked_sub(1)?).copied()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Collects one [`DummyPlayer`] per slot id, plus the slots named by pronouns.
fn scan_slots(text: &str) -> Result<(BTreeMap<usize, DummyPlayer>, Vec<usize>), ParseError> {
    let mut suffixes: BTreeMap<usize, &str> = BTreeMap::new();
    let mut pronoun_slots = Vec::new();

    for caps in TOKEN_RE.captures_iter(text) {
        if let (Some(id), Some(suffix)) = (caps.get(1), caps.get(2)) {
            let id = parse_slot("slot", id.as_str())?;
            match suffixes.get(&id) {
                Some(existing) if *existing != suffix.as_str() => {
                    return Err(ParseError::ConflictingDefinition(id));
                }
                Some(_) => {}
                None => {
                    suffixes.insert(id, suffix.as_str());
                }
            }
        } else if let Some(inner) = caps.get(4) {
            let pronoun = PRONOUN_RE.captures(inner.as_str()).ok_or_else(|| {
                ParseError::syntax(format!(
                    "Pronoun string in incorrect format: {:?}",
                    &caps[0]
                ))
            })?;
            pronoun_slots.push(parse_slot("pronoun", &pronoun[1])?);
        }
    }

    let dummies = suffixes
        .into_iter()
        .map(|(id, suffix)| Ok((id, DummyPlayer::from_suffix(suffix)?)))
        .collect::<Result<BTreeMap<_, _>, ParseError>>()?;
    Ok((dummies, pronoun_slots))
}

fn parse_slot(key: &str, value: &str) -> Result<usize, ParseError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(ParseError::invalid(key, value, "expected a slot number")),
    }
}

fn parse_slot_list(key: &str, values: &[String]) -> Result<Vec<usize>, ParseError> {
    values.iter().map(|v| parse_slot(key, v)).collect()
}

fn parse_item_pairs(key: &str, pairs: &[(String, String)]) -> Result<Vec<(usize, String)>, ParseError> {
    pairs
        .iter()
        .map(|(slot, item)| Ok((parse_slot(key, slot)?, item.clone())))
        .collect()
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [tributes: {}", self.text, self.tributes)?;
        if !self.sizes.is_empty() {
            let sizes: Vec<String> = self.sizes.iter().map(|(s, d)| format!("{s}:{d}")).collect();
            write!(f, ", sizes: {}", sizes.join(" "))?;
        }
        if !self.elims.is_empty() {
            write!(f, ", elims: {:?}", self.elims)?;
        }
        if !self.perps.is_empty() {
            write!(f, ", perps: {:?}", self.perps)?;
        }
        if !self.gives.is_empty() {
            write!(f, ", gives: {:?}", self.gives)?;
        }
        if !self.removes.is_empty() {
            write!(f, ", removes: {:?}", self.removes)?;
        }
        write!(f, ", rarity: {}]", self.rarity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Quantity;

    fn player(name: &str, gender: &str) -> Player {
        Player::new(name, &format!("gender:{gender}, height:1.7m")).unwrap()
    }

    #[test]
    fn test_new_event_collects_dummies() {
        let e = Event::new(
            "%1<2m% ambushes %2:A%, and %1<2m% laughs.",
            "tributes:2, elim:2, perp:1, size:1:x2, give:1:trophy, rarity:3",
        )
        .unwrap();
        assert_eq!(e.tributes, 2);
        assert_eq!(e.dummies.len(), 2);
        assert_eq!(e.dummies[&1].less_than, Some(Quantity::from_meters(2.0)));
        assert_eq!(e.dummies[&2].team, Some('A'));
        assert_eq!(e.elims, vec![2]);
        assert_eq!(e.perps, vec![1]);
        assert_eq!(e.sizes, vec![(1, Diff::Multiply(2.0))]);
        assert_eq!(e.gives, vec![(1, "trophy".to_string())]);
        assert_eq!(e.rarity, 3.0);
        assert!(e.is_lethal());
    }

    #[test]
    fn test_default_rarity() {
        let e = Event::new("%1% naps.", "tributes:1").unwrap();
        assert_eq!(e.rarity, 1.0);
        assert!(!e.is_lethal());
    }

    #[test]
    fn test_tribute_mismatch_fails() {
        let err = Event::new("%1% and %2% dance.", "tributes:3").unwrap_err();
        assert!(matches!(err, ParseError::TributeMismatch { declared: 3, found: 2 }));
        assert!(Event::new("Nobody is here.", "tributes:1").is_err());
        assert!(Event::new("%1% naps.", "rarity:2").is_err());
        assert!(Event::new("%1% naps.", "tributes:0").is_err());
    }

    #[test]
    fn test_slot_gap_fails() {
        let err = Event::new("%1% waves at %3%.", "tributes:2").unwrap_err();
        assert!(matches!(err, ParseError::SlotGap { .. }));
        assert!(Event::new("%2% waves.", "tributes:1").is_err());
    }

    #[test]
    fn test_conflicting_definition_fails() {
        let err = Event::new("%1<2m% and %1>3m%", "tributes:1").unwrap_err();
        assert!(matches!(err, ParseError::ConflictingDefinition(1)));
    }

    #[test]
    fn test_directive_slots_must_exist() {
        assert!(Event::new("%1% naps.", "tributes:1, elim:2").is_err());
        assert!(Event::new("%1% naps.", "tributes:1, give:3:rock").is_err());
        assert!(Event::new("%1% hugs %p:2o%.", "tributes:1").is_err());
        assert!(Event::new("%1% hugs %p:1x%.", "tributes:1").is_err());
    }

    #[test]
    fn test_render_names_and_pronouns() {
        let e = Event::new(
            "%1% trips %2>1m%. %P:2% picks %p:2self% up and %p:1% thanks %p:2o% for %p:2s% help.",
            "tributes:2",
        )
        .unwrap();
        let a = player("Ann", "F");
        let b = player("Bo", "M");
        assert_eq!(
            e.render(&[&a, &b]),
            "Ann trips Bo. He picks himself up and she thanks him for his help."
        );
    }

    #[test]
    fn test_render_does_not_rescan_names() {
        let e = Event::new("%1% meets %2%.", "tributes:2").unwrap();
        let a = player("%2%", "X");
        let b = player("Cy", "X");
        assert_eq!(e.render(&[&a, &b]), "%2% meets Cy.");
    }

    #[test]
    fn test_literal_percent_is_kept() {
        let e = Event::new("%1% is 100% sure.", "tributes:1").unwrap();
        let a = player("Di", "F");
        assert_eq!(e.render(&[&a]), "Di is 100% sure.");
    }
}
