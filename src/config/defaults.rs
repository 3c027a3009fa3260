//! Built-in defaults, the lowest-precedence layer

use super::layer::{CanonicalKey, Layer, LayerSource, RawValue};
use std::collections::BTreeMap;

const SCALAR_DEFAULTS: &[(&str, &str)] = &[
    ("server.port", "8080"),
    ("server.host", "localhost"),
    ("server.read_timeout", "5s"),
    ("server.write_timeout", "5s"),
    ("server.idle_timeout", "60s"),
    ("server.shutdown_timeout", "30s"),
    ("database.url", ""),
    ("database.max_connections", "25"),
    ("database.min_connections", "5"),
    ("database.timeout", "30s"),
    ("database.max_conn_lifetime", "1h"),
    ("database.max_conn_idle_time", "30m"),
    ("database.run_migrations", "true"),
    ("database.ssl_mode", "disable"),
    ("app.environment", "development"),
    ("app.debug", "false"),
    ("app.log_level", "info"),
    ("app.log_format", "text"),
    ("security.enable_cors", "false"),
];

const LIST_DEFAULTS: &[&str] = &["security.trusted_proxies", "security.allowed_origins"];

pub fn defaults_layer() -> Layer {
    let mut values = BTreeMap::new();
    for (key, value) in SCALAR_DEFAULTS {
        if let Some(key) = CanonicalKey::parse(key) {
            values.insert(key, RawValue::scalar(*value));
        }
    }
    for key in LIST_DEFAULTS {
        if let Some(key) = CanonicalKey::parse(key) {
            values.insert(key, RawValue::List(Vec::new()));
        }
    }
    Layer::new(LayerSource::Defaults, values)
}
