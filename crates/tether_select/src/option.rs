//! Selectable options
//!
//! Options are supplied by the caller and never mutated. An [`OptionList`]
//! keeps them in caller order and guarantees each value appears once.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tether_core::error::{Result, TetherError};

/// One selectable entry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    /// The value reported through `on_change`
    pub value: String,
    /// Text shown in the panel and on the trigger
    pub label: String,
    /// Optional secondary text (e.g. a course code next to a course name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
}

impl SelectOption {
    /// Create a new option with value and label
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            secondary: None,
        }
    }

    /// Attach secondary text
    pub fn secondary(mut self, secondary: impl Into<String>) -> Self {
        self.secondary = Some(secondary.into());
        self
    }
}

/// An ordered list of options with unique values
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OptionList {
    options: IndexMap<String, SelectOption>,
}

impl OptionList {
    /// Build a list, rejecting duplicate values
    pub fn new(options: impl IntoIterator<Item = SelectOption>) -> Result<Self> {
        let mut map = IndexMap::new();
        for option in options {
            if map.contains_key(&option.value) {
                return Err(TetherError::DuplicateOptionValue(option.value));
            }
            map.insert(option.value.clone(), option);
        }
        Ok(Self { options: map })
    }

    /// Look up an option by value
    pub fn get(&self, value: &str) -> Option<&SelectOption> {
        self.options.get(value)
    }

    /// Label for a value, if it names a known option
    pub fn label_of(&self, value: &str) -> Option<&str> {
        self.get(value).map(|o| o.label.as_str())
    }

    pub fn contains(&self, value: &str) -> bool {
        self.options.contains_key(value)
    }

    /// Options in caller order
    pub fn iter(&self) -> impl Iterator<Item = &SelectOption> {
        self.options.values()
    }

    /// Option values in caller order
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.options.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}
