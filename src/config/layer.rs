//! Layers, canonical keys and raw values

use std::collections::BTreeMap;
use std::fmt;

/// Sections a canonical key may belong to.
pub const SECTIONS: [&str; 4] = ["server", "database", "app", "security"];

/// Identity of a configuration source.
///
/// Variant order is precedence order, lowest first: a later source wins a
/// key collision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LayerSource {
    Defaults,
    File,
    Dotenv,
    Environment,
    Flags,
}

impl LayerSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            LayerSource::Defaults => "defaults",
            LayerSource::File => "file",
            LayerSource::Dotenv => "dotenv",
            LayerSource::Environment => "environment",
            LayerSource::Flags => "flags",
        }
    }
}

impl fmt::Display for LayerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `section.field` key with `section` in [`SECTIONS`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalKey(String);

impl CanonicalKey {
    /// Validate an already-dotted key. Returns `None` unless the key has
    /// exactly two non-empty segments and a known section.
    pub fn parse(key: &str) -> Option<Self> {
        let (section, field) = key.split_once('.')?;
        if field.is_empty() || field.contains('.') {
            return None;
        }
        Self::from_parts(section, field)
    }

    pub fn from_parts(section: &str, field: &str) -> Option<Self> {
        if field.is_empty() || !SECTIONS.contains(&section) {
            return None;
        }
        Some(Self(format!("{section}.{field}")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn section(&self) -> &str {
        self.0.split_once('.').map(|(s, _)| s).unwrap_or_default()
    }

    pub fn field(&self) -> &str {
        self.0.split_once('.').map(|(_, f)| f).unwrap_or_default()
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Untyped value as supplied by a source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawValue {
    Scalar(String),
    List(Vec<String>),
}

impl RawValue {
    pub fn scalar(value: impl Into<String>) -> Self {
        RawValue::Scalar(value.into())
    }

    /// The scalar text, or `None` for lists.
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            RawValue::Scalar(s) => Some(s),
            RawValue::List(_) => None,
        }
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Scalar(s) => f.write_str(s),
            RawValue::List(items) => write!(f, "[{}]", items.join(", ")),
        }
    }
}

/// One source's contribution, keyed canonically. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layer {
    source: LayerSource,
    values: BTreeMap<CanonicalKey, RawValue>,
}

impl Layer {
    pub fn new(source: LayerSource, values: BTreeMap<CanonicalKey, RawValue>) -> Self {
        Self { source, values }
    }

    pub fn source(&self) -> LayerSource {
        self.source
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        let key = CanonicalKey::parse(key)?;
        self.values.get(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalKey, &RawValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precedence_follows_variant_order() {
        assert!(LayerSource::Defaults < LayerSource::File);
        assert!(LayerSource::File < LayerSource::Dotenv);
        assert!(LayerSource::Dotenv < LayerSource::Environment);
        assert!(LayerSource::Environment < LayerSource::Flags);
    }

    #[test]
    fn canonical_key_requires_known_section_and_two_segments() {
        assert!(CanonicalKey::parse("server.port").is_some());
        assert!(CanonicalKey::parse("database.max_connections").is_some());
        assert!(CanonicalKey::parse("cache.size").is_none());
        assert!(CanonicalKey::parse("server").is_none());
        assert!(CanonicalKey::parse("server.").is_none());
        assert!(CanonicalKey::parse("database.pool.size").is_none());
    }

    #[test]
    fn canonical_key_splits_section_and_field() {
        let key = CanonicalKey::parse("app.log_level").expect("canonical");
        assert_eq!(key.section(), "app");
        assert_eq!(key.field(), "log_level");
    }

    #[test]
    fn list_values_display_bracketed() {
        assert_eq!(RawValue::List(vec!["a".into(), "b".into()]).to_string(), "[a, b]");
        assert_eq!(RawValue::scalar("x").as_scalar(), Some("x"));
        assert_eq!(RawValue::List(vec![]).as_scalar(), None);
    }
}
