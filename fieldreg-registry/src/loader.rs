//! Configuration loader
//!
//! Holds the configuration of the entity currently in view and publishes it,
//! with its loading flag and last error, on a watch channel. Each request is
//! tagged with a sequence number; a response is applied only if no newer
//! request has started since, so a slow fetch for a previous key can never
//! overwrite the current one.

use std::sync::Arc;

use fieldreg_backend::ConfigSource;
use fieldreg_fields::{EntityConfiguration, EntityKey, FieldDefinition, StageDefinition};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::error::ConfigLoadError;

/// What the loader currently holds.
#[derive(Debug, Clone, Default)]
pub struct ConfigState {
    /// Key of the last requested entity, `None` before the first load
    pub key: Option<EntityKey>,
    pub config: Arc<EntityConfiguration>,
    pub loading: bool,
    pub error: Option<ConfigLoadError>,
    request: u64,
}

impl ConfigState {
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.config.fields
    }

    pub fn stages(&self) -> &[StageDefinition] {
        &self.config.kanban_stages
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ConfigLoadError::message)
    }
}

/// Keyed configuration store over a [`ConfigSource`].
pub struct ConfigLoader {
    source: Arc<dyn ConfigSource>,
    state: watch::Sender<ConfigState>,
}

/// Clears the loading flag if its request is dropped before finishing.
struct LoadingGuard<'a> {
    state: &'a watch::Sender<ConfigState>,
    request: u64,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        let request = self.request;
        self.state.send_if_modified(|s| {
            if s.request == request && s.loading {
                s.loading = false;
                true
            } else {
                false
            }
        });
    }
}

impl ConfigLoader {
    pub fn new(source: Arc<dyn ConfigSource>) -> Self {
        let (state, _) = watch::channel(ConfigState::default());
        Self { source, state }
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<ConfigState> {
        self.state.subscribe()
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> ConfigState {
        self.state.borrow().clone()
    }

    /// The current configuration, empty if nothing is loaded.
    pub fn config(&self) -> Arc<EntityConfiguration> {
        Arc::clone(&self.state.borrow().config)
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().loading
    }

    /// Load the configuration for `(module, entity)`.
    ///
    /// An incomplete key yields an empty configuration without contacting the
    /// backend. On failure the held configuration is reset to empty and the
    /// error is both returned and published.
    pub async fn load(
        &self,
        module: &str,
        entity: &str,
    ) -> Result<Arc<EntityConfiguration>, ConfigLoadError> {
        self.fetch(EntityKey::new(module, entity)).await
    }

    /// Load the configuration for the current key again.
    pub async fn refetch(&self) -> Result<Arc<EntityConfiguration>, ConfigLoadError> {
        let key = self.state.borrow().key.clone();
        match key {
            Some(key) => self.fetch(key).await,
            None => Ok(self.config()),
        }
    }

    /// Forget the held configuration and key. In-flight requests are
    /// discarded when they finish.
    pub fn invalidate(&self) {
        self.state.send_modify(|s| {
            *s = ConfigState {
                request: s.request + 1,
                ..ConfigState::default()
            };
        });
        debug!("configuration invalidated");
    }

    async fn fetch(&self, key: EntityKey) -> Result<Arc<EntityConfiguration>, ConfigLoadError> {
        let complete = key.is_complete();
        let mut request = 0;
        self.state.send_modify(|s| {
            s.request += 1;
            request = s.request;
            if s.key.as_ref() != Some(&key) || !complete {
                s.config = Arc::new(EntityConfiguration::empty());
            }
            s.key = Some(key.clone());
            s.error = None;
            s.loading = complete;
        });

        if !complete {
            debug!(%key, "incomplete entity key, using empty configuration");
            return Ok(self.config());
        }

        let _guard = LoadingGuard {
            state: &self.state,
            request,
        };
        debug!(%key, request, "fetching field configuration");

        let outcome = match self.source.fetch_config(&key).await {
            Ok(mut config) => {
                if config.module.is_empty() && config.entity.is_empty() {
                    config.module = key.module.clone();
                    config.entity = key.entity.clone();
                }
                config
                    .validate()
                    .map(|()| Arc::new(config))
                    .map_err(|source| ConfigLoadError::Invalid {
                        key: key.clone(),
                        source,
                    })
            }
            Err(err) => Err(ConfigLoadError::from_backend(&key, &err)),
        };

        let applied = self.state.send_if_modified(|s| {
            if s.request != request {
                return false;
            }
            s.loading = false;
            match &outcome {
                Ok(config) => {
                    s.config = Arc::clone(config);
                    s.error = None;
                }
                Err(err) => {
                    s.config = Arc::new(EntityConfiguration::empty());
                    s.error = Some(err.clone());
                }
            }
            true
        });

        match (&outcome, applied) {
            (_, false) => debug!(%key, request, "discarding superseded configuration response"),
            (Ok(config), true) => info!(%key, fields = config.fields.len(), stages = config.kanban_stages.len(), "loaded field configuration"),
            (Err(err), true) => warn!(%key, error = %err, "failed to load field configuration"),
        }
        outcome
    }
}
