//! Render models
//!
//! Components do not paint. They describe what the trigger and the panel
//! should show, and the host toolkit turns these into widgets. All view types
//! serialize so they can be shipped to a renderer or printed by the CLI.

use serde::Serialize;
use tether_overlay::OverlayGeometry;

/// Trigger chevron direction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Chevron {
    Down,
    Up,
}

/// A removable chip on a multi-select trigger
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TagView {
    pub value: String,
    pub label: String,
}

/// The always-visible control
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TriggerView {
    /// Selected label, or the placeholder
    pub label: String,
    /// Secondary text of the selected option (single select, when enabled)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    /// True when `label` is the placeholder
    pub is_placeholder: bool,
    /// Show the clear (x) button
    pub show_clear: bool,
    pub chevron: Chevron,
    pub disabled: bool,
    /// Multi select: chips for the first selected values
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<TagView>,
    /// Multi select: selected values not shown as chips ("+N")
    pub overflow: usize,
}

/// One row of an open panel
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PanelRow {
    /// Single select "nothing selected" row; picking it clears
    Placeholder { label: String, selected: bool },
    /// Multi select "select all" toggle
    SelectAll { label: String, checked: bool },
    /// A selectable option
    Item {
        value: String,
        label: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        secondary: Option<String>,
        selected: bool,
        highlighted: bool,
    },
    /// Non-interactive footer for matches that were not rendered
    MoreResults { count: usize },
    /// Nothing matched the search
    Empty { label: String },
}

impl PanelRow {
    /// Whether the row reacts to clicks
    pub fn is_interactive(&self) -> bool {
        !matches!(self, PanelRow::MoreResults { .. } | PanelRow::Empty { .. })
    }
}

/// An open select panel
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PanelView {
    pub geometry: OverlayGeometry,
    pub query: String,
    pub rows: Vec<PanelRow>,
}

impl PanelView {
    /// Option rows only
    pub fn option_values(&self) -> Vec<&str> {
        self.rows
            .iter()
            .filter_map(|row| match row {
                PanelRow::Item { value, .. } => Some(value.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Count in the "N more results" footer, if present
    pub fn more_results(&self) -> Option<usize> {
        self.rows.iter().find_map(|row| match row {
            PanelRow::MoreResults { count } => Some(*count),
            _ => None,
        })
    }
}

/// One entry of an open dropdown menu
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MenuItemView {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortcut: Option<String>,
    pub disabled: bool,
    pub separator_before: bool,
}

/// An open dropdown menu
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MenuView {
    pub geometry: OverlayGeometry,
    pub items: Vec<MenuItemView>,
}
