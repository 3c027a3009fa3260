//! Production lockdown
//!
//! When `app.environment` is exactly `production`, debug, CORS origins,
//! migrations and the log format are forced to safe values. Nothing earlier
//! in the pipeline, flags included, can opt out.

use super::layer::RawValue;
use super::merge::{CanonicalStore, Origin};

pub const PRODUCTION: &str = "production";

pub fn apply_production_lockdown(store: CanonicalStore) -> CanonicalStore {
    // Same trim the binder applies.
    if store.scalar("app.environment").map(str::trim) != Some(PRODUCTION) {
        return store;
    }

    tracing::debug!("production environment: locking down debug, CORS origins and migrations");
    store
        .with("app.debug", RawValue::scalar("false"), Origin::ProductionLockdown)
        .with("app.log_format", RawValue::scalar("json"), Origin::ProductionLockdown)
        .with("security.allowed_origins", RawValue::List(Vec::new()), Origin::ProductionLockdown)
        .with("database.run_migrations", RawValue::scalar("false"), Origin::ProductionLockdown)
}
