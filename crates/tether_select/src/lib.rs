//! # Tether Select
//!
//! Searchable select components built on the `tether_overlay` primitive.
//!
//! - **Primitive**: `tether_overlay` owns placement, the measure-then-reveal
//!   lifecycle and dismissal
//! - **Components**: this crate adds options, search, selection state and
//!   the render models hosts paint
//!
//! ## Example
//!
//! ```ignore
//! use tether_select::prelude::*;
//!
//! let mut course = ts::select()
//!     .placeholder("Choose a course...")
//!     .option_with_secondary("1", "Toán", "MATH101")
//!     .show_secondary(true)
//!     .on_change(|v| println!("course = {}", v))
//!     .build(layer.clone(), course_trigger)?;
//!
//! let mut days = ts::multi_select()
//!     .option("mon", "Monday")
//!     .option("tue", "Tuesday")
//!     .show_select_all(true)
//!     .build(layer.clone(), days_trigger)?;
//!
//! let mut actions = ts::dropdown_menu("More")
//!     .item("Rename", || {})
//!     .build(layer, actions_trigger);
//! ```
//!
//! ## Components
//!
//! - **Select** - single value; picking a row commits and closes
//! - **MultiSelect** - many values shown as tags; picking toggles, panel stays open
//! - **DropdownMenu** - action menu, right-aligned to its trigger

pub mod dropdown_menu;
pub mod filter;
pub mod multi_select;
pub mod option;
pub mod popover;
pub mod select;
pub mod selection;
pub mod view;

pub use dropdown_menu::{DropdownMenu, DropdownMenuBuilder, MenuItem};
pub use filter::{filter, truncate, OptionFilter, SearchState, Truncated};
pub use multi_select::{MultiSelect, MultiSelectBuilder};
pub use option::{OptionList, SelectOption};
pub use select::{Select, SelectBuilder};
pub use selection::{MultiSelection, SingleSelection};
pub use view::{Chevron, MenuItemView, MenuView, PanelRow, PanelView, TagView, TriggerView};

/// Convenience module for building components with a `ts::` prefix
pub mod ts {
    pub use crate::dropdown_menu::dropdown_menu;
    pub use crate::multi_select::multi_select;
    pub use crate::select::select;
}

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::ts;
    pub use crate::{
        DropdownMenu, MultiSelect, PanelRow, PanelView, Select, SelectOption, TriggerView,
    };
    // Overlay and geometry types every host needs
    pub use tether_core::{InputEvent, Key, Rect, Size, TetherConfig, Viewport};
    pub use tether_overlay::{
        overlay_layer, DismissReason, FrameOutcome, OverlayLayer, RepositionOutcome,
    };
}

#[cfg(test)]
mod tests;
