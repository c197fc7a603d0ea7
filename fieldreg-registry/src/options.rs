//! Dynamic option registry
//!
//! Master-data categories (industries, lead sources, ...) feed select fields
//! whose option sets users can extend in place. After a successful add the
//! category is fetched again so callers only ever see the server's canonical
//! form of the new option.

use std::sync::Arc;

use fieldreg_backend::{BackendError, OptionSource};
use fieldreg_fields::SelectOption;
use tracing::{debug, info, warn};

use crate::error::OptionError;

/// The outcome of a successful add.
#[derive(Debug, Clone, PartialEq)]
pub struct OptionAdded {
    /// The new option as the server lists it
    pub option: SelectOption,
    /// The category after the add, `None` when it could not be fetched
    pub options: Option<Vec<SelectOption>>,
}

/// Lists and extends option categories through an [`OptionSource`].
#[derive(Clone)]
pub struct OptionRegistry {
    source: Arc<dyn OptionSource>,
}

impl OptionRegistry {
    pub fn new(source: Arc<dyn OptionSource>) -> Self {
        Self { source }
    }

    pub async fn list_options(&self, category: &str) -> Result<Vec<SelectOption>, OptionError> {
        let options = self
            .source
            .list_options(category)
            .await
            .map_err(|e| OptionError::list_failed(category, e))?;
        debug!(category, count = options.len(), "listed options");
        Ok(options)
    }

    /// Add `value` to `category`, then refetch the category.
    ///
    /// The value is trimmed and used as both value and label. A blank value
    /// is rejected without a request. Adding a value the category already
    /// holds resolves to the existing option. When the refetch after a
    /// successful add fails, the option the server returned is reported and
    /// `options` is `None`.
    pub async fn add_option(&self, category: &str, value: &str) -> Result<OptionAdded, OptionError> {
        let value = value.trim();
        if value.is_empty() {
            return Err(OptionError::EmptyValue);
        }

        let stored = match self
            .source
            .add_option(category, &SelectOption::new(value, value))
            .await
        {
            Ok(stored) => stored,
            Err(err) if err.status() == Some(CONFLICT) => {
                return self.resolve_existing(category, value, err).await;
            }
            Err(err) => return Err(OptionError::add_failed(category, err)),
        };

        let options = match self.list_options(category).await {
            Ok(options) => options,
            Err(err) => {
                warn!(category, value = %stored.value, error = %err, "added option but refetch failed");
                return Ok(OptionAdded {
                    option: stored,
                    options: None,
                });
            }
        };
        let option = canonical(&options, &stored.value)
            .cloned()
            .unwrap_or(stored);
        info!(category, value = %option.value, "added option");
        Ok(OptionAdded {
            option,
            options: Some(options),
        })
    }

    /// The server refused the add as a duplicate: answer with the entry it
    /// already holds.
    async fn resolve_existing(
        &self,
        category: &str,
        value: &str,
        conflict: BackendError,
    ) -> Result<OptionAdded, OptionError> {
        let Ok(options) = self.list_options(category).await else {
            return Err(OptionError::add_failed(category, conflict));
        };
        match canonical(&options, value).cloned() {
            Some(option) => {
                debug!(category, value = %option.value, "option already present");
                Ok(OptionAdded {
                    option,
                    options: Some(options),
                })
            }
            None => Err(OptionError::add_failed(category, conflict)),
        }
    }
}

const CONFLICT: u16 = 409;

/// Exact match first, then case-insensitive.
fn canonical<'a>(options: &'a [SelectOption], value: &str) -> Option<&'a SelectOption> {
    options
        .iter()
        .find(|o| o.value == value)
        .or_else(|| options.iter().find(|o| o.value.eq_ignore_ascii_case(value)))
}

/// State of a select control whose options the user can extend.
///
/// Bound to a category, additions go through the registry. Unbound, they are
/// appended locally. Either way the selection only moves to the new value
/// once the add has succeeded.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditableSelect {
    category: Option<String>,
    options: Vec<SelectOption>,
    selected: Option<String>,
}

impl EditableSelect {
    /// A control backed by a master-data category.
    pub fn bound(category: impl Into<String>, initial: Vec<SelectOption>) -> Self {
        Self {
            category: Some(category.into()),
            options: initial,
            selected: None,
        }
    }

    /// A control whose options live only in the form.
    pub fn unbound(options: Vec<SelectOption>) -> Self {
        Self {
            category: None,
            options,
            selected: None,
        }
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn options(&self) -> &[SelectOption] {
        &self.options
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn select(&mut self, value: impl Into<String>) {
        self.selected = Some(value.into());
    }

    /// A bound control fetches its category when it was given no options.
    pub fn needs_fetch(&self) -> bool {
        self.category.is_some() && self.options.is_empty()
    }

    /// Replace the options with the category's current list.
    pub async fn refresh(&mut self, registry: &OptionRegistry) -> Result<(), OptionError> {
        if let Some(category) = &self.category {
            self.options = registry.list_options(category).await?;
        }
        Ok(())
    }

    /// Add a value and select it.
    ///
    /// On failure the options and the selection are left untouched.
    pub async fn add(
        &mut self,
        registry: &OptionRegistry,
        value: &str,
    ) -> Result<&SelectOption, OptionError> {
        let index = match &self.category {
            Some(category) => {
                let added = registry.add_option(category, value).await?;
                if let Some(options) = added.options {
                    self.options = options;
                }
                match self.options.iter().position(|o| o.value == added.option.value) {
                    Some(index) => index,
                    None => {
                        self.options.push(added.option);
                        self.options.len() - 1
                    }
                }
            }
            None => {
                let value = value.trim();
                if value.is_empty() {
                    return Err(OptionError::EmptyValue);
                }
                match self.options.iter().position(|o| o.value == value) {
                    Some(index) => index,
                    None => {
                        self.options.push(SelectOption::new(value, value));
                        self.options.len() - 1
                    }
                }
            }
        };
        let option = &self.options[index];
        self.selected = Some(option.value.clone());
        Ok(option)
    }
}
