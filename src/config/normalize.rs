//! Key normalization into the canonical `section.field` namespace
//!
//! Structured files, the defaults table and flags already speak canonical
//! dotted keys. Dotenv files and the process environment use upper-snake
//! names, which split on the first underscore only so multi-word field names
//! survive: `DATABASE_MAX_CONNECTIONS` becomes `database.max_connections`.

use super::layer::{CanonicalKey, Layer, LayerSource, RawValue};
use std::collections::BTreeMap;

/// Normalize a source-native key. Returns `None` for keys outside the
/// canonical namespace (unknown section, no separator).
///
/// Dotted keys are validated as-is, so normalizing a canonical key is a
/// no-op.
pub fn normalize_key(raw: &str) -> Option<CanonicalKey> {
    let raw = raw.trim();
    if raw.contains('.') {
        return CanonicalKey::parse(raw);
    }
    let (section, field) = raw.split_once('_')?;
    CanonicalKey::from_parts(&section.to_ascii_lowercase(), &field.to_ascii_lowercase())
}

/// Build a layer from upper-snake (or dotted) key/value pairs.
///
/// A key spelled canonically in the input is never replaced by an
/// upper-snake spelling of the same key, regardless of input order.
pub fn layer_from_pairs<I, K, V>(source: LayerSource, pairs: I) -> Layer
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    let mut canonical: BTreeMap<CanonicalKey, RawValue> = BTreeMap::new();
    let mut transformed: BTreeMap<CanonicalKey, RawValue> = BTreeMap::new();

    for (key, value) in pairs {
        let key = key.as_ref();
        let Some(normalized) = normalize_key(key) else {
            tracing::trace!(source = %source, key, "ignoring key outside the config namespace");
            continue;
        };
        let value = RawValue::Scalar(value.into());
        if normalized.as_str() == key.trim() {
            canonical.insert(normalized, value);
        } else {
            transformed.insert(normalized, value);
        }
    }

    for (key, value) in transformed {
        canonical.entry(key).or_insert(value);
    }

    Layer::new(source, canonical)
}
