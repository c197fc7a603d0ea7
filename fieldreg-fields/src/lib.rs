//! Field registry model and form engine
//!
//! `fieldreg-fields` is a schema-only crate describing what an entity looks
//! like: its fields, its pipeline stages and which fields the list view shows.
//! It knows nothing about transport; consumers fetch an [`EntityConfiguration`]
//! from wherever they like and derive views from it.
//!
//! # Architecture
//!
//! - **Schema-only**: Owns field and stage definitions, never record values
//! - **Closed field types**: [`FieldType`] is an enum; every variant maps to a [`FormControl`]
//! - **Pure derivations**: The form engine never mutates a configuration and never
//!   fails on partial data, it returns empty defaults instead
//! - **Built-in defaults**: [`builtin_config`] serves the configurations used when an
//!   entity has not been customised

pub mod defaults;
pub mod error;
pub mod form;
pub mod types;
pub mod validation;

pub use defaults::{builtin_config, default_lead_stages};
pub use error::{FieldsError, Result};
pub use form::{section_label, FormValues, ValidationErrors, DEFAULT_SECTION};
pub use types::{
    EntityConfiguration, EntityKey, FieldDefinition, FieldType, FieldWidth, FormControl,
    SelectOption, StageDefinition,
};
