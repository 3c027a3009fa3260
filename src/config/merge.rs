//! Layer merging into one flat canonical store
//!
//! Layers apply in precedence order (Defaults < File < Dotenv < Environment <
//! Flags), last writer wins per key. The order the layers were loaded in
//! does not matter.

use super::layer::{CanonicalKey, Layer, LayerSource, RawValue};
use std::collections::BTreeMap;
use std::fmt;

/// What produced a key's final value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Layer(LayerSource),
    Derived,
    ProductionLockdown,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Layer(source) => write!(f, "{source}"),
            Origin::Derived => f.write_str("derived"),
            Origin::ProductionLockdown => f.write_str("production lockdown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreEntry {
    pub value: RawValue,
    pub origin: Origin,
}

/// Flat merged view of every layer. Each later pipeline stage returns a new
/// store rather than mutating one in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CanonicalStore {
    entries: BTreeMap<CanonicalKey, StoreEntry>,
}

impl CanonicalStore {
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.entry(key).map(|e| &e.value)
    }

    pub fn entry(&self, key: &str) -> Option<&StoreEntry> {
        let key = CanonicalKey::parse(key)?;
        self.entries.get(&key)
    }

    /// Scalar value, treating lists and missing keys as absent.
    pub fn scalar(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(RawValue::as_scalar)
    }

    /// Non-blank scalar value.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.scalar(key).map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CanonicalKey, &StoreEntry)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Copy of this store with `key` set. Keys outside the canonical
    /// namespace are ignored.
    pub(crate) fn with(mut self, key: &str, value: RawValue, origin: Origin) -> Self {
        if let Some(key) = CanonicalKey::parse(key) {
            self.entries.insert(key, StoreEntry { value, origin });
        }
        self
    }
}

/// Merge layers into a new store.
pub fn merge<'a, I>(layers: I) -> CanonicalStore
where
    I: IntoIterator<Item = &'a Layer>,
{
    let mut ordered: Vec<&Layer> = layers.into_iter().collect();
    ordered.sort_by_key(|layer| layer.source());

    let mut entries = BTreeMap::new();
    for layer in ordered {
        for (key, value) in layer.iter() {
            entries.insert(
                key.clone(),
                StoreEntry { value: value.clone(), origin: Origin::Layer(layer.source()) },
            );
        }
    }

    CanonicalStore { entries }
}
