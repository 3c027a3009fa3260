//! Source loading: config files, dotenv files and the process environment

use super::layer::{CanonicalKey, Layer, LayerSource, RawValue, SECTIONS};
use super::normalize::layer_from_pairs;
use anyhow::{Context, Result};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

/// Conventional config file locations, probed in this order.
pub const CONFIG_CANDIDATES: [&str; 6] = [
    "config.toml",
    "config.yaml",
    "config.yml",
    "config/config.toml",
    "config/config.yaml",
    "config/config.yml",
];

/// Default dotenv location.
pub const DOTENV_FILE: &str = ".env";

/// Result of probing one optional source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// Nothing to load; not an error.
    Absent,
    /// The source exists but could not be parsed.
    ParseError { path: PathBuf, message: String },
    Loaded { path: Option<PathBuf>, layer: Layer },
}

impl SourceOutcome {
    pub fn layer(&self) -> Option<&Layer> {
        match self {
            SourceOutcome::Loaded { layer, .. } => Some(layer),
            _ => None,
        }
    }
}

pub fn discover_candidates(base_dir: &Path) -> Vec<PathBuf> {
    CONFIG_CANDIDATES.iter().map(|candidate| base_dir.join(candidate)).collect()
}

/// Load the first candidate that exists and parses.
///
/// Malformed candidates are skipped with a warning. When none loads, the
/// outcome is the last parse failure seen, or `Absent` if every candidate
/// was missing.
pub fn load_file_layer(candidates: &[PathBuf]) -> SourceOutcome {
    let mut last_failure = None;

    for candidate in candidates {
        match load_file(candidate) {
            SourceOutcome::Absent => continue,
            SourceOutcome::ParseError { path, message } => {
                tracing::warn!("Skipping unreadable config file {}: {}", path.display(), message);
                last_failure = Some(SourceOutcome::ParseError { path, message });
            }
            loaded @ SourceOutcome::Loaded { .. } => {
                tracing::info!(file = %candidate.display(), "loaded configuration from file");
                return loaded;
            }
        }
    }

    match last_failure {
        Some(failure) => failure,
        None => {
            tracing::debug!("no config file found, using defaults and environment variables");
            SourceOutcome::Absent
        }
    }
}

/// Load a single structured config file, dispatching on its extension.
pub fn load_file(path: &Path) -> SourceOutcome {
    if !path.is_file() {
        return SourceOutcome::Absent;
    }

    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
    let parsed = fs::read_to_string(path)
        .with_context(|| format!("Failed reading config file: {}", path.display()))
        .and_then(|content| match ext.as_str() {
            "toml" => parse_toml_layer(&content, path),
            "yaml" | "yml" => parse_yaml_layer(&content, path),
            other => Err(anyhow::anyhow!(
                "Unsupported config extension '.{}' for file {}",
                other,
                path.display()
            )),
        });

    match parsed {
        Ok(layer) => SourceOutcome::Loaded { path: Some(path.to_path_buf()), layer },
        Err(e) => SourceOutcome::ParseError { path: path.to_path_buf(), message: format!("{e:#}") },
    }
}

/// Parse TOML into a File layer. Top-level tables are sections.
fn parse_toml_layer(content: &str, config_file: &Path) -> Result<Layer> {
    let raw: toml::Table = toml::from_str(content)
        .with_context(|| format!("Invalid TOML syntax: {}", config_file.display()))?;

    let mut values = BTreeMap::new();
    for (section, value) in &raw {
        match value {
            toml::Value::Table(fields) => {
                for (field, value) in fields {
                    let raw = toml_raw_value(value)
                        .with_context(|| format!("Invalid value for {section}.{field}"))?;
                    insert_field(&mut values, section, field, raw);
                }
            }
            _ => tracing::warn!(
                "Ignoring top-level key '{}' in {}: expected a section table",
                section,
                config_file.display()
            ),
        }
    }

    Ok(Layer::new(LayerSource::File, values))
}

fn toml_raw_value(value: &toml::Value) -> Result<Option<RawValue>> {
    let raw = match value {
        toml::Value::Array(items) => {
            let items = items
                .iter()
                .map(toml_scalar)
                .collect::<Option<Vec<_>>>()
                .context("list entries must be scalars")?;
            Some(RawValue::List(items))
        }
        toml::Value::Table(_) => None,
        scalar => toml_scalar(scalar).map(RawValue::Scalar),
    };
    Ok(raw)
}

fn toml_scalar(value: &toml::Value) -> Option<String> {
    match value {
        toml::Value::String(s) => Some(s.clone()),
        toml::Value::Integer(i) => Some(i.to_string()),
        toml::Value::Float(f) => Some(f.to_string()),
        toml::Value::Boolean(b) => Some(b.to_string()),
        toml::Value::Datetime(d) => Some(d.to_string()),
        toml::Value::Array(_) | toml::Value::Table(_) => None,
    }
}

/// Parse YAML into a File layer. Top-level mappings are sections; a
/// top-level key already in `section.field` form is accepted as well.
fn parse_yaml_layer(content: &str, config_file: &Path) -> Result<Layer> {
    let raw: serde_yaml::Value = serde_yaml::from_str(content)
        .with_context(|| format!("Invalid YAML syntax: {}", config_file.display()))?;

    let mut values = BTreeMap::new();
    let root = match raw {
        serde_yaml::Value::Mapping(root) => root,
        serde_yaml::Value::Null => return Ok(Layer::new(LayerSource::File, values)),
        _ => anyhow::bail!("Invalid YAML config: {}: expected a mapping", config_file.display()),
    };

    for (section, value) in &root {
        let Some(section) = section.as_str() else {
            tracing::warn!("Ignoring non-string top-level key in {}", config_file.display());
            continue;
        };
        match value {
            serde_yaml::Value::Mapping(fields) => {
                for (field, value) in fields {
                    let Some(field) = field.as_str() else { continue };
                    let raw = yaml_raw_value(value)
                        .with_context(|| format!("Invalid value for {section}.{field}"))?;
                    insert_field(&mut values, section, field, raw);
                }
            }
            other => match (CanonicalKey::parse(section), yaml_raw_value(other)?) {
                (Some(key), Some(raw)) => {
                    values.insert(key, raw);
                }
                _ => tracing::warn!(
                    "Ignoring top-level key '{}' in {}: expected a section mapping",
                    section,
                    config_file.display()
                ),
            },
        }
    }

    Ok(Layer::new(LayerSource::File, values))
}

fn yaml_raw_value(value: &serde_yaml::Value) -> Result<Option<RawValue>> {
    let raw = match value {
        serde_yaml::Value::Sequence(items) => {
            let items = items
                .iter()
                .map(yaml_scalar)
                .collect::<Option<Vec<_>>>()
                .context("list entries must be scalars")?;
            Some(RawValue::List(items))
        }
        serde_yaml::Value::Mapping(_) | serde_yaml::Value::Tagged(_) => None,
        scalar => yaml_scalar(scalar).map(RawValue::Scalar),
    };
    Ok(raw)
}

fn yaml_scalar(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::Null => Some(String::new()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::String(s) => Some(s.clone()),
        _ => None,
    }
}

fn insert_field(
    values: &mut BTreeMap<CanonicalKey, RawValue>,
    section: &str,
    field: &str,
    raw: Option<RawValue>,
) {
    if !SECTIONS.contains(&section) {
        tracing::debug!("Ignoring unknown config section '{}'", section);
        return;
    }
    let (Some(key), Some(raw)) = (CanonicalKey::from_parts(section, field), raw) else {
        tracing::warn!("Ignoring nested config key '{}.{}'", section, field);
        return;
    };
    values.insert(key, raw);
}

/// Load a dotenv file without touching the process environment.
pub fn load_dotenv_layer(path: &Path) -> SourceOutcome {
    if !path.is_file() {
        tracing::debug!(file = %path.display(), "no dotenv file found");
        return SourceOutcome::Absent;
    }

    let pairs = dotenvy::from_path_iter(path)
        .and_then(|iter| iter.collect::<std::result::Result<Vec<(String, String)>, _>>());

    match pairs {
        Ok(pairs) => {
            tracing::debug!(file = %path.display(), "loaded dotenv file");
            SourceOutcome::Loaded {
                path: Some(path.to_path_buf()),
                layer: layer_from_pairs(LayerSource::Dotenv, pairs),
            }
        }
        Err(e) => SourceOutcome::ParseError { path: path.to_path_buf(), message: e.to_string() },
    }
}

/// Process environment entries that are valid UTF-8. Anything else cannot
/// name a config key and is skipped.
pub fn process_env_vars() -> Vec<(String, String)> {
    utf8_vars(std::env::vars_os())
}

fn utf8_vars<I>(vars: I) -> Vec<(String, String)>
where
    I: IntoIterator<Item = (OsString, OsString)>,
{
    vars.into_iter()
        .filter_map(|(key, value)| match (key.into_string(), value.into_string()) {
            (Ok(key), Ok(value)) => Some((key, value)),
            (key, _) => {
                tracing::trace!(key = ?key, "ignoring non-UTF-8 environment variable");
                None
            }
        })
        .collect()
}

/// Build the Environment layer from an explicit variable list.
pub fn env_layer<I, K, V>(vars: I) -> Layer
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<String>,
{
    layer_from_pairs(LayerSource::Environment, vars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn absent_when_no_candidate_exists() {
        let tmp = TempDir::new().expect("tmp");
        let outcome = load_file_layer(&discover_candidates(tmp.path()));
        assert_eq!(outcome, SourceOutcome::Absent);
    }

    #[test]
    fn loads_toml_sections_as_canonical_keys() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(
            tmp.path().join("config.toml"),
            "[server]\nport = 9090\n\n[database]\nmax_connections = 50\nrun_migrations = false\n\n[security]\nallowed_origins = [\"https://a.example\", \"https://b.example\"]\n",
        )
        .expect("write");

        let outcome = load_file_layer(&discover_candidates(tmp.path()));
        let layer = outcome.layer().expect("loaded");
        assert_eq!(layer.source(), LayerSource::File);
        assert_eq!(layer.get("server.port"), Some(&RawValue::scalar("9090")));
        assert_eq!(layer.get("database.max_connections"), Some(&RawValue::scalar("50")));
        assert_eq!(layer.get("database.run_migrations"), Some(&RawValue::scalar("false")));
        assert_eq!(
            layer.get("security.allowed_origins"),
            Some(&RawValue::List(vec!["https://a.example".into(), "https://b.example".into()]))
        );
    }

    #[test]
    fn loads_yaml_from_config_directory() {
        let tmp = TempDir::new().expect("tmp");
        fs::create_dir(tmp.path().join("config")).expect("mkdir");
        fs::write(
            tmp.path().join("config/config.yaml"),
            "app:\n  environment: staging\n  log_level: debug\nsecurity.trusted_proxies: [10.0.0.1]\n",
        )
        .expect("write");

        let outcome = load_file_layer(&discover_candidates(tmp.path()));
        let layer = outcome.layer().expect("loaded");
        assert_eq!(layer.get("app.environment"), Some(&RawValue::scalar("staging")));
        assert_eq!(layer.get("app.log_level"), Some(&RawValue::scalar("debug")));
        assert_eq!(
            layer.get("security.trusted_proxies"),
            Some(&RawValue::List(vec!["10.0.0.1".into()]))
        );
    }

    #[test]
    fn first_existing_candidate_wins() {
        let tmp = TempDir::new().expect("tmp");
        fs::create_dir(tmp.path().join("config")).expect("mkdir");
        fs::write(tmp.path().join("config.toml"), "[server]\nport = 1111\n").expect("write");
        fs::write(tmp.path().join("config/config.toml"), "[server]\nport = 2222\n")
            .expect("write");

        let outcome = load_file_layer(&discover_candidates(tmp.path()));
        assert_eq!(
            outcome.layer().and_then(|l| l.get("server.port")),
            Some(&RawValue::scalar("1111"))
        );
    }

    #[test]
    fn malformed_candidate_is_skipped_for_next_one() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("config.toml"), "[server\nport = ").expect("write");
        fs::write(tmp.path().join("config.yaml"), "server:\n  port: 3333\n").expect("write");

        let outcome = load_file_layer(&discover_candidates(tmp.path()));
        assert_eq!(
            outcome.layer().and_then(|l| l.get("server.port")),
            Some(&RawValue::scalar("3333"))
        );
    }

    #[test]
    fn malformed_only_candidate_is_parse_error_not_absent() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("config.toml"), "[server\nport = ").expect("write");

        match load_file_layer(&discover_candidates(tmp.path())) {
            SourceOutcome::ParseError { path, message } => {
                assert!(path.ends_with("config.toml"));
                assert!(message.contains("Invalid TOML syntax"), "message: {message}");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn unknown_sections_and_nested_tables_are_skipped() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("config.toml");
        fs::write(&path, "title = 'x'\n[cache]\nsize = 1\n[database]\nname = 'db'\n[database.pool]\nsize = 3\n")
            .expect("write");

        let outcome = load_file(&path);
        let layer = outcome.layer().expect("loaded");
        assert_eq!(layer.len(), 1);
        assert_eq!(layer.get("database.name"), Some(&RawValue::scalar("db")));
    }

    #[test]
    fn dotenv_keys_are_normalized() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join(".env");
        fs::write(&path, "DATABASE_USER=foo\nDATABASE_MAX_CONNECTIONS=40\n# comment\nOTHER=1\n")
            .expect("write");

        let outcome = load_dotenv_layer(&path);
        let layer = outcome.layer().expect("loaded");
        assert_eq!(layer.source(), LayerSource::Dotenv);
        assert_eq!(layer.get("database.user"), Some(&RawValue::scalar("foo")));
        assert_eq!(layer.get("database.max_connections"), Some(&RawValue::scalar("40")));
        assert_eq!(layer.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn non_utf8_environment_entries_are_skipped() {
        use std::os::unix::ffi::OsStringExt;

        let vars = utf8_vars([
            (OsString::from("JUNK"), OsString::from_vec(vec![0xff, 0xfe])),
            (OsString::from_vec(vec![0xff]), OsString::from("x")),
            (OsString::from("SERVER_PORT"), OsString::from("9000")),
        ]);
        assert_eq!(vars, vec![("SERVER_PORT".to_string(), "9000".to_string())]);

        let layer = env_layer(vars);
        assert_eq!(layer.get("server.port"), Some(&RawValue::scalar("9000")));
    }

    #[test]
    fn missing_dotenv_is_absent() {
        let tmp = TempDir::new().expect("tmp");
        assert_eq!(load_dotenv_layer(&tmp.path().join(".env")), SourceOutcome::Absent);
    }
}
