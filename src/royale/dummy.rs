//! Constraint records for the player slots referenced in event text.

use super::player::{Gender, Player};
use crate::error::ParseError;
use crate::units::Quantity;

/// Everything a slot like `%1<2m&:A&:inv:rope%` demands of its player.
///
/// All fields are optional and combine with logical AND.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DummyPlayer {
    /// Player must be shorter than this.
    pub less_than: Option<Quantity>,
    /// Player must be taller than this.
    pub greater_than: Option<Quantity>,
    pub elims_less_than: Option<u32>,
    pub elims_greater_than: Option<u32>,
    pub elims_equal: Option<u32>,
    /// Abstract team letter, mapped to a real team each time the event runs.
    pub team: Option<char>,
    /// Player's gender must be one of these.
    pub genders: Vec<Gender>,
    pub items: Vec<String>,
    pub attributes: Vec<String>,
}

impl DummyPlayer {
    /// Builds a dummy from the constraint suffix following the slot id
    /// (`""`, `"<2m&:A"`, ...).
    pub fn from_suffix(suffix: &str) -> Result<Self, ParseError> {
        let mut dummy = DummyPlayer::default();
        for clause in suffix.split('&') {
            dummy.apply_clause(clause)?;
        }
        Ok(dummy)
    }

    fn apply_clause(&mut self, clause: &str) -> Result<(), ParseError> {
        let invalid = || ParseError::syntax(format!("Invalid format tag: {clause:?}"));

        if clause.is_empty() {
            return Ok(());
        }
        if let Some(height) = clause.strip_prefix('<') {
            self.less_than = Some(Quantity::parse(height)?);
            return Ok(());
        }
        if let Some(height) = clause.strip_prefix('>') {
            self.greater_than = Some(Quantity::parse(height)?);
            return Ok(());
        }

        let body = clause.strip_prefix(':').ok_or_else(invalid)?;
        match body.split_once(':') {
            None => {
                let mut chars = body.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_uppercase() => self.team = Some(c),
                    _ => return Err(ParseError::invalid("team", body, "expected one letter A-Z")),
                }
            }
            Some(("g", letters)) => {
                if letters.is_empty() {
                    return Err(invalid());
                }
                for c in letters.chars() {
                    let gender = Gender::from_letter(c).ok_or_else(|| {
                        ParseError::invalid("gender", letters, "expected M, F or X")
                    })?;
                    if !self.genders.contains(&gender) {
                        self.genders.push(gender);
                    }
                }
            }
            Some(("inv", item)) if !item.is_empty() => self.items.push(item.to_string()),
            Some(("attr", attr)) if !attr.is_empty() => self.attributes.push(attr.to_string()),
            Some(("e", bound)) => {
                let (op, n) = bound.split_at(bound.chars().next().map_or(0, char::len_utf8));
                let n: u32 = n
                    .parse()
                    .map_err(|_| ParseError::invalid("elims", bound, "expected <N, >N or =N"))?;
                match op {
                    "<" => self.elims_less_than = Some(n),
                    ">" => self.elims_greater_than = Some(n),
                    "=" => self.elims_equal = Some(n),
                    _ => return Err(ParseError::invalid("elims", bound, "expected <N, >N or =N")),
                }
            }
            _ => return Err(invalid()),
        }
        Ok(())
    }

    /// Pure check of every active constraint. `resolved_team` is the real team
    /// bound to this dummy's abstract letter for the current event, if any.
    pub fn matches(&self, player: &Player, resolved_team: Option<char>) -> bool {
        if self.less_than.is_some_and(|max| player.height >= max) {
            return false;
        }
        if self.greater_than.is_some_and(|min| player.height <= min) {
            return false;
        }
        if self.elims_less_than.is_some_and(|n| player.elims >= n) {
            return false;
        }
        if self.elims_greater_than.is_some_and(|n| player.elims <= n) {
            return false;
        }
        if self.elims_equal.is_some_and(|n| player.elims != n) {
            return false;
        }
        if !self.genders.is_empty() && !self.genders.contains(&player.gender) {
            return false;
        }
        if !self.items.iter().all(|item| player.has_item(item)) {
            return false;
        }
        if !self.attributes.iter().all(|attr| player.has_attribute(attr)) {
            return false;
        }
        if resolved_team.is_some() && player.team != resolved_team {
            return false;
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(meta: &str) -> Player {
        Player::new("P", meta).unwrap()
    }

    fn baseline() -> Player {
        let mut p = player("team:A, gender:F, height:2m, inv:rope, attr:fast");
        p.elims = 2;
        p
    }

    #[test]
    fn test_suffix_grammar() {
        let d = DummyPlayer::from_suffix("<3m&>1m&:A&:g:MF&:inv:rope&:attr:fast&:e:>1").unwrap();
        assert_eq!(d.less_than, Some(Quantity::from_meters(3.0)));
        assert_eq!(d.greater_than, Some(Quantity::from_meters(1.0)));
        assert_eq!(d.team, Some('A'));
        assert_eq!(d.genders, vec![Gender::Male, Gender::Female]);
        assert_eq!(d.items, vec!["rope"]);
        assert_eq!(d.attributes, vec!["fast"]);
        assert_eq!(d.elims_greater_than, Some(1));
    }

    #[test]
    fn test_empty_suffix_has_no_constraints() {
        assert_eq!(DummyPlayer::from_suffix("").unwrap(), DummyPlayer::default());
    }

    #[test]
    fn test_unrecognized_clauses_fail() {
        assert!(DummyPlayer::from_suffix("?2m").is_err());
        assert!(DummyPlayer::from_suffix(":a").is_err());
        assert!(DummyPlayer::from_suffix(":g:Q").is_err());
        assert!(DummyPlayer::from_suffix(":hat:red").is_err());
        assert!(DummyPlayer::from_suffix(":e:~2").is_err());
        assert!(DummyPlayer::from_suffix("<tall").is_err());
    }

    #[test]
    fn test_matches_is_pure() {
        let d = DummyPlayer::from_suffix("<3m&:inv:rope").unwrap();
        let p = baseline();
        assert_eq!(d.matches(&p, None), d.matches(&p, None));
        assert!(d.matches(&p, None));
    }

    #[test]
    fn test_each_constraint_rejects_its_violation() {
        let p = baseline();
        let cases = [
            "<2m",       // height bounds are strict
            ">2m",
            ":e:<2",
            ":e:>2",
            ":e:=1",
            ":g:M",
            ":inv:map",
            ":attr:slow",
        ];
        for suffix in cases {
            let d = DummyPlayer::from_suffix(suffix).unwrap();
            assert!(!d.matches(&p, None), "{suffix} should reject");
        }

        let satisfied = ["<2.1m", ">1.9m", ":e:<3", ":e:>1", ":e:=2", ":g:FX", ":inv:rope", ":attr:fast"];
        for suffix in satisfied {
            let d = DummyPlayer::from_suffix(suffix).unwrap();
            assert!(d.matches(&p, None), "{suffix} should accept");
        }
    }

    #[test]
    fn test_resolved_team_must_equal() {
        let d = DummyPlayer::from_suffix(":A").unwrap();
        let p = baseline();
        assert!(d.matches(&p, Some('A')));
        assert!(!d.matches(&p, Some('B')));
        let loner = player("gender:M, height:1m");
        assert!(!d.matches(&loner, Some('A')));
    }
}
