//! Schema-driven decoder for `key:value, key:value` metadata strings.

use crate::error::ParseError;
use indexmap::IndexMap;

/// How a metadata value is shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Passed through unchanged.
    Single,
    /// Whitespace-separated values, order and duplicates kept.
    List,
    /// `subkey:subvalue`; the key may repeat, each occurrence adds a pair.
    Compound,
}

/// One decoded value. Keys missing from the input are [`MetaValue::Unset`].
#[derive(Debug, Clone, PartialEq)]
pub enum MetaValue {
    Unset,
    Single(String),
    List(Vec<String>),
    Compound(Vec<(String, String)>),
}

/// An entity that is built from a metadata string.
pub trait Metadata {
    /// Name used in error messages.
    const ENTITY: &'static str;
    /// Recognized keys, in order.
    const SCHEMA: &'static [(&'static str, Shape)];
}

/// Decoded metadata: exactly the schema's keys, in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct MetaTags {
    values: IndexMap<&'static str, MetaValue>,
}

impl MetaTags {
    pub fn get(&self, key: &str) -> &MetaValue {
        self.values.get(key).unwrap_or(&MetaValue::Unset)
    }

    pub fn single(&self, key: &str) -> Option<&str> {
        match self.get(key) {
            MetaValue::Single(v) => Some(v),
            _ => None,
        }
    }

    pub fn list(&self, key: &str) -> Option<&[String]> {
        match self.get(key) {
            MetaValue::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn compound(&self, key: &str) -> Option<&[(String, String)]> {
        match self.get(key) {
            MetaValue::Compound(v) => Some(v),
            _ => None,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.values.keys().copied()
    }
}

/// Decodes metadata for `T` according to `T::SCHEMA`.
pub fn parse_meta<T: Metadata>(s: &str) -> Result<MetaTags, ParseError> {
    if T::SCHEMA.is_empty() {
        return Err(ParseError::UnknownEntity(T::ENTITY));
    }

    let mut values: IndexMap<&'static str, MetaValue> = T::SCHEMA
        .iter()
        .map(|(key, _)| (*key, MetaValue::Unset))
        .collect();

    for item in s.split(',').map(str::trim).filter(|item| !item.is_empty()) {
        let (key, value) = item
            .split_once(':')
            .map(|(k, v)| (k.trim(), v.trim()))
            .ok_or_else(|| ParseError::MalformedTag(item.to_string()))?;
        if value.is_empty() {
            return Err(ParseError::MalformedTag(key.to_string()));
        }

        let Some(&(schema_key, shape)) = T::SCHEMA.iter().find(|(k, _)| *k == key) else {
            log::warn!("{}: ignoring unknown metatag {:?}", T::ENTITY, key);
            continue;
        };

        let slot = values
            .get_mut(schema_key)
            .ok_or(ParseError::UnknownEntity(T::ENTITY))?;
        if let MetaValue::Compound(pairs) = slot {
            pairs.push(split_compound(value)?);
            continue;
        }
        if *slot != MetaValue::Unset {
            return Err(ParseError::MalformedTag(format!("{key} (defined twice)")));
        }
        *slot = match shape {
            Shape::Single => MetaValue::Single(value.to_string()),
            Shape::List => MetaValue::List(value.split_whitespace().map(str::to_string).collect()),
            Shape::Compound => MetaValue::Compound(vec![split_compound(value)?]),
        };
    }

    Ok(MetaTags { values })
}

fn split_compound(value: &str) -> Result<(String, String), ParseError> {
    match value.split_once(':') {
        Some((k, v)) if !v.trim().is_empty() => Ok((k.trim().to_string(), v.trim().to_string())),
        _ => Err(ParseError::MalformedTag(value.to_string())),
    }
}
