//! Selection models
//!
//! Both models are "controlled": the caller supplies a current value, and
//! whenever that input changes the internal state is overwritten to match it.
//! The sync is one-way; user edits never flow back except through `on_change`.

use indexmap::IndexSet;
use rustc_hash::FxHashSet;

use crate::option::OptionList;

/// Tracks the last observed external value so changes can be detected
#[derive(Clone, Debug, Default, PartialEq, Eq)]
struct Controlled<T> {
    last_external: T,
}

impl<T: PartialEq + Clone> Controlled<T> {
    fn new(initial: T) -> Self {
        Self {
            last_external: initial,
        }
    }

    /// Record an observation; true if it differs from the previous one
    fn observe(&mut self, external: &T) -> bool {
        if &self.last_external == external {
            return false;
        }
        self.last_external = external.clone();
        true
    }
}

/// Single-select state: `""` means nothing is selected
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SingleSelection {
    value: String,
    external: Controlled<String>,
}

impl SingleSelection {
    /// Start from the caller's default
    pub fn new(default_value: impl Into<String>) -> Self {
        let value = default_value.into();
        Self {
            external: Controlled::new(value.clone()),
            value,
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Set the selected value
    pub fn select(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    /// Back to the placeholder
    pub fn clear(&mut self) {
        self.value.clear();
    }

    /// Apply the caller's current value; overwrites local state if it changed
    ///
    /// Returns true when the internal value was overwritten.
    pub fn sync_external(&mut self, external: &str) -> bool {
        if !self.external.observe(&external.to_string()) {
            return false;
        }
        self.value = external.to_string();
        true
    }
}

/// Multi-select state: ordered, unique values
///
/// Insertion order drives tag display; membership alone drives "all
/// selected".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MultiSelection {
    values: IndexSet<String>,
    external: Controlled<Vec<String>>,
}

impl MultiSelection {
    /// Start from the caller's default (duplicates collapse to first occurrence)
    pub fn new(default_values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let values: IndexSet<String> = default_values.into_iter().map(Into::into).collect();
        Self {
            external: Controlled::new(values.iter().cloned().collect()),
            values,
        }
    }

    /// Selected values in insertion order
    pub fn values(&self) -> Vec<String> {
        self.values.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(String::as_str)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.contains(value)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Add `value` if absent, remove it if present
    ///
    /// Removal keeps the relative order of the remaining values. Returns true
    /// if the value is selected afterwards.
    pub fn toggle(&mut self, value: &str) -> bool {
        if self.values.shift_remove(value) {
            false
        } else {
            self.values.insert(value.to_string());
            true
        }
    }

    /// Whether every option in `options` is selected (membership only)
    pub fn is_all_selected(&self, options: &OptionList) -> bool {
        !options.is_empty() && options.values().all(|v| self.values.contains(v))
    }

    /// Select every option, or clear everything if all are already selected
    pub fn toggle_all(&mut self, options: &OptionList) {
        if self.is_all_selected(options) {
            self.values.clear();
        } else {
            self.values = options.values().map(str::to_string).collect();
        }
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }

    /// Apply the caller's current values; overwrites local state if they changed
    pub fn sync_external(&mut self, external: &[String]) -> bool {
        if !self.external.observe(&external.to_vec()) {
            return false;
        }
        self.values = external.iter().cloned().collect();
        true
    }

    /// Values that are not in `options` (kept, but rendered as raw values)
    pub fn unknown_values<'a>(&'a self, options: &OptionList) -> Vec<&'a str> {
        let known: FxHashSet<&str> = options.values().collect();
        self.iter().filter(|v| !known.contains(v)).collect()
    }
}
