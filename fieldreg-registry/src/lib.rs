//! Configuration loading and option registries
//!
//! [`ConfigLoader`] fetches the configuration of the entity in view and
//! publishes it with its loading flag and last error. [`OptionRegistry`] lists
//! and extends master-data option categories, and [`EditableSelect`] holds the
//! state of a select control backed by one.
//!
//! Both take their backend as an `Arc<dyn ...>` so the HTTP client, the
//! in-memory backend or a test double can be swapped in.

mod error;
pub mod loader;
pub mod options;

pub use error::{
    ConfigLoadError, OptionError, GENERIC_ADD_MESSAGE, GENERIC_LIST_MESSAGE,
    GENERIC_LOAD_MESSAGE,
};
pub use loader::{ConfigLoader, ConfigState};
pub use options::{EditableSelect, OptionAdded, OptionRegistry};
