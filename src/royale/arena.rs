use super::event::Event;

/// A named set of events that replaces the normal pools for a whole round.
#[derive(Debug, Clone, PartialEq)]
pub struct Arena {
    pub name: String,
    pub description: String,
    pub events: Vec<Event>,
}

impl Arena {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.trim().to_string(),
            description: description.to_string(),
            events: Vec::new(),
        }
    }
}
