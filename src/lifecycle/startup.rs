//! Startup orchestration.
//!
//! Config is loaded and validated first, then the backend client, then the
//! guards around it. Any failure is fatal.

use std::path::Path;
use std::sync::Arc;

use crate::backend::HttpArchiveBackend;
use crate::clock::SystemClock;
use crate::config::{self, ConfigError, GateConfig};
use crate::error::BackendError;
use crate::pipeline::GatingPipeline;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("backend client: {0}")]
    Backend(#[from] BackendError),
}

/// Load config from `path`, or defaults plus environment when `None`.
pub fn load(path: Option<&Path>) -> Result<GateConfig, StartupError> {
    let config = match path {
        Some(path) => config::load_config(path)?,
        None => config::load_default()?,
    };
    Ok(config)
}

/// Wire the pipeline against the configured HTTP backend and the system clock.
pub fn build_pipeline(config: &GateConfig) -> Result<Arc<GatingPipeline>, StartupError> {
    let backend = HttpArchiveBackend::new(&config.backend)?;
    let pipeline = GatingPipeline::from_config(config, Arc::new(backend), Arc::new(SystemClock::new()));
    Ok(Arc::new(pipeline))
}
