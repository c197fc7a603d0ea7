//! Backend interfaces for the field registry
//!
//! The engines in this workspace never talk to a server directly. They go
//! through three narrow traits, one per backend concern:
//!
//! - [`ConfigSource`]: `GET config(module, entity)`
//! - [`PipelineSource`]: `GET kanbanView(entity)` and `PUT moveItem(id, stage)`
//! - [`OptionSource`]: `GET`/`POST` master-data option categories
//!
//! [`HttpBackend`] implements all three against a REST registry;
//! [`MemoryBackend`] implements them in memory for offline use and tests.
//!
//! ```rust,no_run
//! use fieldreg_backend::{BackendConfig, ConfigSource, HttpBackend};
//! use fieldreg_fields::EntityKey;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let backend = HttpBackend::new(&BackendConfig::load(None)?)?;
//! let config = backend.fetch_config(&EntityKey::new("crm", "leads")).await?;
//! println!("{} fields", config.fields.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
mod error;
pub mod http;
pub mod memory;
mod traits;
mod types;

pub use config::{BackendConfig, ConfigError};
pub use error::{BackendError, Result};
pub use http::HttpBackend;
pub use memory::MemoryBackend;
pub use traits::{ConfigSource, OptionSource, PipelineSource};
pub use types::{KanbanView, PipelineItem};
