use super::metaparser::{parse_meta, Metadata, Shape};
use crate::error::ParseError;
use crate::units::{Diff, Quantity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a player in the royale's registry. Stable for the whole game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
    Nonbinary,
}

impl Gender {
    pub fn from_letter(c: char) -> Option<Self> {
        match c {
            'M' => Some(Gender::Male),
            'F' => Some(Gender::Female),
            'X' => Some(Gender::Nonbinary),
            _ => None,
        }
    }

    pub fn letter(self) -> char {
        match self {
            Gender::Male => 'M',
            Gender::Female => 'F',
            Gender::Nonbinary => 'X',
        }
    }

    pub fn subject(self) -> &'static str {
        match self {
            Gender::Male => "he",
            Gender::Female => "she",
            Gender::Nonbinary => "they",
        }
    }

    pub fn object(self) -> &'static str {
        match self {
            Gender::Male => "him",
            Gender::Female => "her",
            Gender::Nonbinary => "them",
        }
    }

    /// Possessive determiner ("her sword").
    pub fn possessive(self) -> &'static str {
        match self {
            Gender::Male => "his",
            Gender::Female => "her",
            Gender::Nonbinary => "their",
        }
    }

    /// Independent possessive ("the sword is hers").
    pub fn possessive_pronoun(self) -> &'static str {
        match self {
            Gender::Male => "his",
            Gender::Female => "hers",
            Gender::Nonbinary => "theirs",
        }
    }

    pub fn reflexive(self) -> &'static str {
        match self {
            Gender::Male => "himself",
            Gender::Female => "herself",
            Gender::Nonbinary => "themself",
        }
    }
}

/// A contestant. Only event effects mutate a player after parsing.
#[derive(Debug, Clone, PartialEq)]
pub struct Player {
    pub name: String,
    /// Single uppercase letter, or `None` when the royale has no teams.
    pub team: Option<char>,
    pub gender: Gender,
    pub height: Quantity,
    pub url: Option<String>,
    pub inventory: Vec<String>,
    pub attributes: Vec<String>,
    pub elims: u32,
    /// Sticky: once set it is never cleared.
    pub dead: bool,
}

impl Metadata for Player {
    const ENTITY: &'static str = "Player";
    const SCHEMA: &'static [(&'static str, Shape)] = &[
        ("team", Shape::Single),
        ("gender", Shape::Single),
        ("height", Shape::Single),
        ("url", Shape::Single),
        ("attr", Shape::List),
        ("inv", Shape::List),
    ];
}

impl Player {
    pub fn new(name: &str, meta: &str) -> Result<Self, ParseError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ParseError::syntax("Player name is empty."));
        }
        let tags = parse_meta::<Self>(meta)?;

        let team = tags.single("team").map(parse_team).transpose()?;
        let gender = tags
            .single("gender")
            .ok_or_else(|| ParseError::syntax(format!("Player {name:?} has no gender.")))
            .and_then(parse_gender)?;
        let height = tags
            .single("height")
            .ok_or_else(|| ParseError::syntax(format!("Player {name:?} has no height.")))
            .and_then(Quantity::parse)?;

        let url = match tags.single("url") {
            Some(raw) => {
                url::Url::parse(raw).map_err(|_| ParseError::InvalidUrl(raw.to_string()))?;
                Some(raw.to_string())
            }
            None => None,
        };

        Ok(Self {
            name: name.to_string(),
            team,
            gender,
            height,
            url,
            inventory: tags.list("inv").map(<[_]>::to_vec).unwrap_or_default(),
            attributes: tags.list("attr").map(<[_]>::to_vec).unwrap_or_default(),
            elims: 0,
            dead: false,
        })
    }

    pub fn give_item(&mut self, item: &str) {
        self.inventory.push(item.to_string());
    }

    /// Removes one copy of `item`. Returns false if the player has none.
    pub fn remove_item(&mut self, item: &str) -> bool {
        match self.inventory.iter().position(|i| i == item) {
            Some(idx) => {
                self.inventory.remove(idx);
                true
            }
            None => false,
        }
    }

    pub fn change_height(&mut self, diff: Diff) {
        self.height = diff.apply(self.height);
    }

    pub fn has_item(&self, item: &str) -> bool {
        self.inventory.iter().any(|i| i == item)
    }

    pub fn has_attribute(&self, attr: &str) -> bool {
        self.attributes.iter().any(|a| a == attr)
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let team = self.team.map(String::from).unwrap_or_else(|| "None".to_string());
        let inventory = if self.inventory.is_empty() {
            "Empty".to_string()
        } else {
            self.inventory.join(", ")
        };
        write!(
            f,
            "**{}**: Team {}, Gender {}, Height {}, Eliminations: {}, Inventory: {}. *{}*",
            self.name,
            team,
            self.gender.letter(),
            self.height,
            self.elims,
            inventory,
            if self.dead { "Dead." } else { "Alive." }
        )
    }
}

fn parse_team(value: &str) -> Result<char, ParseError> {
    let mut chars = value.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_uppercase() => Ok(c),
        _ => Err(ParseError::invalid("team", value, "expected one letter A-Z")),
    }
}

fn parse_gender(value: &str) -> Result<Gender, ParseError> {
    let mut chars = value.chars();
    let gender = match (chars.next(), chars.next()) {
        (Some(c), None) => Gender::from_letter(c),
        _ => None,
    };
    gender.ok_or_else(|| ParseError::invalid("gender", value, "expected M, F or X"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_from_metadata() {
        let p = Player::new(
            "Alice",
            "team:A, gender:F, height:1.7m, url:https://example.com/a.png, inv:rope rope, attr:fast",
        )
        .unwrap();
        assert_eq!(p.name, "Alice");
        assert_eq!(p.team, Some('A'));
        assert_eq!(p.gender, Gender::Female);
        assert_eq!(p.height, Quantity::from_meters(1.7));
        assert_eq!(p.url.as_deref(), Some("https://example.com/a.png"));
        assert_eq!(p.inventory, vec!["rope", "rope"]);
        assert!(p.has_attribute("fast"));
        assert_eq!(p.elims, 0);
        assert!(!p.dead);
    }

    #[test]
    fn test_required_fields() {
        assert!(Player::new("A", "height:1m").is_err());
        assert!(Player::new("A", "gender:M").is_err());
        assert!(Player::new("", "gender:M, height:1m").is_err());
    }

    #[test]
    fn test_invalid_fields() {
        assert!(Player::new("A", "gender:Q, height:1m").is_err());
        assert!(Player::new("A", "gender:M, height:1m, team:ab").is_err());
        assert!(Player::new("A", "gender:M, height:1m, team:a").is_err());
        assert!(matches!(
            Player::new("A", "gender:M, height:1m, url:not a url"),
            Err(ParseError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_remove_item_removes_one_copy() {
        let mut p = Player::new("A", "gender:X, height:1m, inv:gem gem").unwrap();
        assert!(p.remove_item("gem"));
        assert_eq!(p.inventory, vec!["gem"]);
        assert!(p.remove_item("gem"));
        assert!(!p.remove_item("gem"));
    }

    #[test]
    fn test_pronouns() {
        assert_eq!(Gender::Female.possessive(), "her");
        assert_eq!(Gender::Female.possessive_pronoun(), "hers");
        assert_eq!(Gender::Nonbinary.reflexive(), "themself");
        assert_eq!(Gender::Male.object(), "him");
    }

    #[test]
    fn test_display_line() {
        let p = Player::new("Bob", "team:B, gender:M, height:2m").unwrap();
        assert_eq!(
            p.to_string(),
            "**Bob**: Team B, Gender M, Height 2m, Eliminations: 0, Inventory: Empty. *Alive.*"
        );
    }
}
