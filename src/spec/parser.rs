//! Line-oriented parser for royale spec files.
//!
//! ```text
//! [setup]
//! deathrate:5, arenafreq:8
//!
//! [players]
//! "Alice"
//! team:A, gender:F, height:1.7m
//!
//! [bloodbath]
//! "%1% grabs a backpack."
//! tributes:1, give:1:backpack
//!
//! [arena]
//! The Flood "Water pours into the arena."
//! "%1% is swept away."
//! tributes:1, elim:1
//! ```

use crate::error::ParseError;
use crate::game::RoundType;
use crate::royale::{Arena, Event, EventPools, Player, Royale, Setup, SetupOverrides};
use indexmap::IndexMap;
use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

static ARENA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^([^"]+?)\s*"(.*)"$"#).expect("arena regex is valid"));

/// Result of parsing a spec: whatever could be built, plus per-line errors.
#[derive(Debug, Clone)]
pub struct ParsedSpec {
    pub royale: Royale,
    /// `"line <n>: <message>"`, in file order.
    pub errors: Vec<String>,
}

impl ParsedSpec {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    /// 1-based line number in the original file.
    number: usize,
    text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Section {
    None,
    Setup,
    Players,
    Events(RoundType),
    Arena,
    Other,
}

impl Section {
    fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "setup" => Section::Setup,
            "players" => Section::Players,
            "arena" => Section::Arena,
            other => match RoundType::from_pool_name(other) {
                Some(round) => Section::Events(round),
                None => {
                    log::warn!("ignoring unknown section [{name}]");
                    Section::Other
                }
            },
        }
    }

    fn has_entries(&self) -> bool {
        matches!(self, Section::Players | Section::Events(_) | Section::Arena)
    }
}

/// Single forward pass over the spec with one line of lookahead.
pub struct SpecParser {
    section: Section,
    open_arena: Option<Arena>,
    overrides: SetupOverrides,
    last_setup_line: Option<usize>,
    players: IndexMap<String, Player>,
    arenas: Vec<Arena>,
    events: EventPools,
    errors: Vec<String>,
}

impl Default for SpecParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SpecParser {
    pub fn new() -> Self {
        Self {
            section: Section::None,
            open_arena: None,
            overrides: SetupOverrides::default(),
            last_setup_line: None,
            players: IndexMap::new(),
            arenas: Vec::new(),
            events: EventPools::default(),
            errors: Vec::new(),
        }
    }

    pub fn parse_file(path: impl AsRef<Path>) -> Result<ParsedSpec, ParseError> {
        let input = std::fs::read_to_string(path.as_ref())?;
        log::info!("Loaded spec from {}", path.as_ref().display());
        Self::new().parse(&input)
    }

    /// Parses a whole spec. Only an empty input is fatal.
    pub fn parse(mut self, input: &str) -> Result<ParsedSpec, ParseError> {
        let lines = preprocess(input);
        if lines.is_empty() {
            return Err(ParseError::EmptySpec);
        }

        let mut i = 0;
        while i < lines.len() {
            let line = &lines[i];
            let next = lines.get(i + 1);

            let takes_next = self.section.has_entries()
                && is_quoted(&line.text)
                && next.is_some_and(|n| !is_header(&n.text) && !is_comment(&n.text));

            let result = if takes_next {
                let meta = next.map(|n| n.text.as_str()).unwrap_or_default();
                self.parse_entry(unquote(&line.text), meta)
            } else {
                self.parse_line(line)
            };

            if let Err(e) = result {
                log::debug!("spec error at line {}: {}", line.number, e);
                self.errors.push(format!("line {}: {}", line.number, e));
            }
            i += if takes_next { 2 } else { 1 };
        }

        Ok(self.finish())
    }

    fn parse_line(&mut self, line: &Line) -> Result<(), ParseError> {
        let text = line.text.as_str();
        if is_comment(text) {
            return Ok(());
        }
        if let Some(name) = header_name(text) {
            self.section = Section::from_name(name);
            return Ok(());
        }

        match &self.section {
            Section::Setup => {
                let overrides = SetupOverrides::from_meta(text)?;
                self.overrides.merge(overrides);
                self.last_setup_line = Some(line.number);
                Ok(())
            }
            Section::Arena if !is_quoted(text) => {
                let caps = ARENA_RE.captures(text).ok_or_else(|| {
                    ParseError::syntax(format!("Expected `Name \"Description\"`, got {text:?}"))
                })?;
                if let Some(done) = self.open_arena.take() {
                    self.arenas.push(done);
                }
                self.open_arena = Some(Arena::new(&caps[1], &caps[2]));
                Ok(())
            }
            Section::Players | Section::Events(_) | Section::Arena => {
                if is_quoted(text) {
                    Err(ParseError::syntax(format!("Missing metadata line after {text}")))
                } else {
                    Err(ParseError::syntax(format!("Expected a quoted string, got {text:?}")))
                }
            }
            Section::None => Err(ParseError::syntax(format!(
                "Line outside of any section: {text:?}"
            ))),
            Section::Other => Ok(()),
        }
    }

    /// Builds the entity for a quoted line and its metadata line.
    fn parse_entry(&mut self, quoted: &str, meta: &str) -> Result<(), ParseError> {
        match &self.section {
            Section::Players => {
                let player = Player::new(quoted, meta)?;
                if self.players.contains_key(&player.name) {
                    return Err(ParseError::DuplicatePlayer(player.name));
                }
                self.players.insert(player.name.clone(), player);
            }
            Section::Events(round) => {
                let event = Event::new(quoted, meta)?;
                self.events
                    .for_round_mut(*round)
                    .ok_or_else(|| ParseError::syntax(format!("No event pool for {round}")))?
                    .push(event);
            }
            Section::Arena => {
                let event = Event::new(quoted, meta)?;
                self.open_arena
                    .as_mut()
                    .ok_or_else(|| ParseError::syntax("Event outside of an arena."))?
                    .events
                    .push(event);
            }
            _ => {}
        }
        Ok(())
    }

    fn finish(mut self) -> ParsedSpec {
        if let Some(done) = self.open_arena.take() {
            self.arenas.push(done);
        }

        let setup = match Setup::from_overrides(&self.overrides) {
            Ok(setup) => setup,
            Err(e) => {
                self.errors
                    .push(format!("line {}: {}", self.last_setup_line.unwrap_or(0), e));
                Setup::default()
            }
        };

        log::debug!(
            "parsed {} player(s), {} arena(s), {} error(s)",
            self.players.len(),
            self.arenas.len(),
            self.errors.len()
        );

        ParsedSpec {
            royale: Royale {
                setup,
                players: self.players,
                arenas: self.arenas,
                events: self.events,
            },
            errors: self.errors,
        }
    }
}

fn preprocess(input: &str) -> Vec<Line> {
    input
        .lines()
        .enumerate()
        .filter_map(|(idx, raw)| {
            let text = normalize_quotes(raw.trim());
            (!text.is_empty()).then(|| Line {
                number: idx + 1,
                text,
            })
        })
        .collect()
}

fn normalize_quotes(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{201C}' | '\u{201D}' | '\u{201E}' => '"',
            '\u{2018}' | '\u{2019}' => '\'',
            other => other,
        })
        .collect()
}

fn is_comment(text: &str) -> bool {
    text.starts_with('#')
}

fn header_name(text: &str) -> Option<&str> {
    let name = text.strip_prefix('[')?.strip_suffix(']')?;
    (!name.is_empty() && !name.contains(['[', ']'])).then_some(name)
}

fn is_header(text: &str) -> bool {
    header_name(text).is_some()
}

fn is_quoted(text: &str) -> bool {
    text.len() >= 2 && text.starts_with('"') && text.ends_with('"')
}

fn unquote(text: &str) -> &str {
    &text[1..text.len() - 1]
}
