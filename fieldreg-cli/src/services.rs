//! Backend selection for a CLI run.

use std::sync::Arc;

use anyhow::Context;
use fieldreg_backend::{
    BackendConfig, ConfigSource, HttpBackend, MemoryBackend, OptionSource, PipelineSource,
};
use tracing::debug;

use crate::cli::Cli;

/// The three backend seams, served by one backend.
#[derive(Clone)]
pub struct Services {
    pub configs: Arc<dyn ConfigSource>,
    pub pipelines: Arc<dyn PipelineSource>,
    pub options: Arc<dyn OptionSource>,
}

impl Services {
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: ConfigSource + PipelineSource + OptionSource + 'static,
    {
        Self {
            configs: Arc::clone(&backend) as Arc<dyn ConfigSource>,
            pipelines: Arc::clone(&backend) as Arc<dyn PipelineSource>,
            options: backend as Arc<dyn OptionSource>,
        }
    }

    /// In-memory registry with built-in configurations and sample data.
    pub fn offline() -> Self {
        Self::from_backend(Arc::new(MemoryBackend::seeded()))
    }

    pub fn connect(config: &BackendConfig) -> anyhow::Result<Self> {
        let backend = HttpBackend::new(config).context("failed to create HTTP client")?;
        debug!(base_url = backend.base_url(), "using HTTP backend");
        Ok(Self::from_backend(Arc::new(backend)))
    }

    /// Pick the backend the command line asks for.
    pub fn from_cli(cli: &Cli) -> anyhow::Result<Self> {
        if cli.offline {
            debug!("using in-memory backend");
            return Ok(Self::offline());
        }
        let config = BackendConfig::load(cli.config.as_deref())
            .context("failed to load backend configuration")?;
        Self::connect(&config)
    }
}
