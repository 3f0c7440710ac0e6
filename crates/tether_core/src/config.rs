//! Tunable defaults for overlays and select components
//!
//! Every field has a default, so an empty `tether.toml` is valid:
//!
//! ```toml
//! select_gap = 4.0
//! max_display_options = 25
//! select_all_label = "Chọn tất cả"
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::geometry::{
    PlacementOptions, PlacementStyle, ESTIMATED_MENU_WIDTH, ESTIMATED_PANEL_HEIGHT, MENU_GAP,
    SELECT_GAP, VIEWPORT_MARGIN,
};

/// Configuration shared by all tether components
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TetherConfig {
    /// Gap between a select trigger and its panel
    pub select_gap: f32,
    /// Gap between a menu trigger and its menu
    pub menu_gap: f32,
    /// Horizontal distance kept from the viewport edges
    pub viewport_margin: f32,
    /// Panel height assumed before the first measurement
    pub estimated_panel_height: f32,
    /// Menu width assumed before the first measurement
    pub estimated_menu_width: f32,
    /// Maximum option rows rendered before collapsing into "N more results"
    pub max_display_options: usize,
    /// Maximum tags shown on a multi-select trigger before "+N"
    pub max_display_tags: usize,
    /// Label of the multi-select "select all" row
    pub select_all_label: String,
    /// Row shown when a search matches nothing
    pub empty_label: String,
}

impl Default for TetherConfig {
    fn default() -> Self {
        Self {
            select_gap: SELECT_GAP,
            menu_gap: MENU_GAP,
            viewport_margin: VIEWPORT_MARGIN,
            estimated_panel_height: ESTIMATED_PANEL_HEIGHT,
            estimated_menu_width: ESTIMATED_MENU_WIDTH,
            max_display_options: 10,
            max_display_tags: 3,
            select_all_label: "Select all".to_string(),
            empty_label: "No results found".to_string(),
        }
    }
}

impl TetherConfig {
    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!("loaded tether config from {}", path.display());
        Ok(config)
    }

    /// Placement constants for an overlay style
    pub fn placement_options(&self, style: PlacementStyle) -> PlacementOptions {
        let gap = match style {
            PlacementStyle::Select => self.select_gap,
            PlacementStyle::ContextMenu => self.menu_gap,
        };
        PlacementOptions {
            gap,
            margin: self.viewport_margin,
        }
    }
}
