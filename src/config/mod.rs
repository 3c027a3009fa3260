//! Configuration resolution
//!
//! Sources load into layers, merge with precedence Flags > Env > Dotenv >
//! File > Defaults, then the database URL is derived, production lockdown is
//! applied and the result is bound into a typed [`ResolvedConfig`].

pub mod bind;
pub mod defaults;
pub mod derive;
pub mod flags;
pub mod layer;
pub mod loader;
pub mod merge;
pub mod normalize;
pub mod production;

pub use flags::OverrideFlags;
pub use layer::{CanonicalKey, Layer, LayerSource, RawValue};
pub use loader::SourceOutcome;
pub use merge::{merge, CanonicalStore, Origin};

use crate::domain::ResolvedConfig;
use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Where the Environment layer comes from.
#[derive(Debug, Clone, Default)]
enum EnvSource {
    #[default]
    Process,
    Vars(Vec<(String, String)>),
    Disabled,
}

/// Everything one resolution pass produced.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub config: ResolvedConfig,
    /// Final store after derivation and lockdown, with provenance.
    pub store: CanonicalStore,
    /// Outcome of every source in precedence order.
    pub sources: Vec<(LayerSource, SourceOutcome)>,
}

/// One-shot resolver. Holds source descriptors only; each call to
/// [`Resolver::resolve`] reads the sources afresh.
#[derive(Debug, Clone)]
pub struct Resolver {
    base_dir: PathBuf,
    config_path: Option<PathBuf>,
    dotenv_path: Option<PathBuf>,
    env: EnvSource,
    flags: OverrideFlags,
}

impl Resolver {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            config_path: None,
            dotenv_path: None,
            env: EnvSource::Process,
            flags: OverrideFlags::default(),
        }
    }

    /// Resolver whose flags come from a raw argument vector (no program
    /// name). Flag errors surface here, before any source is read.
    pub fn from_args<I, T>(base_dir: impl Into<PathBuf>, args: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Self::new(base_dir).flags(OverrideFlags::try_parse_args(args)?))
    }

    /// Use this config file instead of probing the conventional locations.
    /// A missing or malformed explicit file is fatal.
    pub fn config_file(mut self, path: Option<PathBuf>) -> Self {
        self.config_path = path;
        self
    }

    /// Use this dotenv file instead of `.env` in the base directory. A
    /// missing or malformed explicit file is fatal.
    pub fn dotenv_file(mut self, path: Option<PathBuf>) -> Self {
        self.dotenv_path = path;
        self
    }

    /// Read the Environment layer from these variables instead of the
    /// process environment.
    pub fn env_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.env = EnvSource::Vars(vars.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Skip the Environment layer entirely.
    pub fn without_env(mut self) -> Self {
        self.env = EnvSource::Disabled;
        self
    }

    pub fn flags(mut self, flags: OverrideFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        self.resolve_detailed().map(|resolution| resolution.config)
    }

    pub fn resolve_detailed(&self) -> Result<Resolution, ConfigError> {
        let sources = self.load_sources()?;
        let layers: Vec<&Layer> = sources.iter().filter_map(|(_, outcome)| outcome.layer()).collect();

        let store = merge(layers);
        let store = derive::resolve_derived(store)?;
        let store = production::apply_production_lockdown(store);
        let config = bind::bind(&store)?;

        tracing::debug!(
            environment = %config.app.environment,
            listen = %config.server.listen_addr(),
            "configuration resolved"
        );
        Ok(Resolution { config, store, sources })
    }

    fn load_sources(&self) -> Result<Vec<(LayerSource, SourceOutcome)>, ConfigError> {
        let defaults = SourceOutcome::Loaded { path: None, layer: defaults::defaults_layer() };

        let file = match &self.config_path {
            Some(path) => require(LayerSource::File, path, loader::load_file(path))?,
            None => loader::load_file_layer(&loader::discover_candidates(&self.base_dir)),
        };

        let dotenv = match &self.dotenv_path {
            Some(path) => require(LayerSource::Dotenv, path, loader::load_dotenv_layer(path))?,
            None => {
                let outcome = loader::load_dotenv_layer(&self.base_dir.join(loader::DOTENV_FILE));
                if let SourceOutcome::ParseError { path, message } = &outcome {
                    tracing::warn!("Skipping unreadable dotenv file {}: {}", path.display(), message);
                }
                outcome
            }
        };

        let environment = match &self.env {
            EnvSource::Process => env_outcome(loader::env_layer(loader::process_env_vars())),
            EnvSource::Vars(vars) => env_outcome(loader::env_layer(vars.iter().cloned())),
            EnvSource::Disabled => SourceOutcome::Absent,
        };

        let flags = SourceOutcome::Loaded { path: None, layer: self.flags.to_layer() };

        Ok(vec![
            (LayerSource::Defaults, defaults),
            (LayerSource::File, file),
            (LayerSource::Dotenv, dotenv),
            (LayerSource::Environment, environment),
            (LayerSource::Flags, flags),
        ])
    }
}

fn env_outcome(layer: Layer) -> SourceOutcome {
    tracing::debug!(keys = layer.len(), "loaded environment variables");
    SourceOutcome::Loaded { path: None, layer }
}

/// Explicitly requested sources must load.
fn require(
    source_kind: LayerSource,
    path: &Path,
    outcome: SourceOutcome,
) -> Result<SourceOutcome, ConfigError> {
    match outcome {
        SourceOutcome::Absent => Err(ConfigError::Unreadable {
            source_kind,
            path: path.to_path_buf(),
            message: "file not found".to_string(),
        }),
        SourceOutcome::ParseError { path, message } => {
            Err(ConfigError::Unreadable { source_kind, path, message })
        }
        loaded => Ok(loaded),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn isolated(dir: &Path) -> Resolver {
        Resolver::new(dir).env_vars(Vec::<(String, String)>::new())
    }

    #[test]
    fn explicit_missing_config_file_is_fatal() {
        let tmp = TempDir::new().expect("tmp");
        let err = isolated(tmp.path())
            .config_file(Some(tmp.path().join("nope.toml")))
            .resolve()
            .expect_err("missing explicit file");
        assert!(matches!(err, ConfigError::Unreadable { source_kind: LayerSource::File, .. }));
    }

    #[test]
    fn explicit_malformed_dotenv_is_fatal() {
        let tmp = TempDir::new().expect("tmp");
        let path = tmp.path().join("custom.env");
        fs::write(&path, "DATABASE_USER='unterminated\n").expect("write");

        let err = isolated(tmp.path())
            .dotenv_file(Some(path))
            .resolve()
            .expect_err("malformed explicit dotenv");
        assert!(matches!(err, ConfigError::Unreadable { source_kind: LayerSource::Dotenv, .. }));
    }

    #[test]
    fn discovered_malformed_file_is_not_fatal() {
        let tmp = TempDir::new().expect("tmp");
        fs::write(tmp.path().join("config.toml"), "[database\n").expect("write");

        let resolution = isolated(tmp.path())
            .env_vars([("DATABASE_URL", "postgres://a:b@c/d")])
            .resolve_detailed()
            .expect("resolves");
        assert!(matches!(
            resolution.sources[1],
            (LayerSource::File, SourceOutcome::ParseError { .. })
        ));
        assert_eq!(resolution.config.database.url, "postgres://a:b@c/d");
    }

    #[test]
    fn disabled_environment_is_absent() {
        let tmp = TempDir::new().expect("tmp");
        let resolver = Resolver::new(tmp.path())
            .without_env()
            .flags(OverrideFlags { database_url: Some("postgres://x".into()), ..Default::default() });
        let resolution = resolver.resolve_detailed().expect("resolves");
        assert_eq!(resolution.sources[3], (LayerSource::Environment, SourceOutcome::Absent));
    }

    #[test]
    fn flag_errors_surface_before_loading() {
        let err = Resolver::from_args("/nonexistent", ["--nope"]).expect_err("unknown flag");
        assert!(matches!(err, ConfigError::FlagParse(_)));
    }
}
