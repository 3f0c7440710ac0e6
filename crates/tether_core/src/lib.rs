//! Tether Core
//!
//! Foundational pieces for floating-overlay selection components:
//!
//! - **Geometry**: trigger-relative placement with flip and viewport clamping
//! - **Elements**: explicit element ids and containment checks
//! - **Events**: the input events overlays listen to while open
//! - **State machines**: the `StateTransitions` trait used by overlay lifecycles
//! - **Configuration**: `TetherConfig`, loadable from TOML

pub mod config;
pub mod element;
pub mod error;
pub mod events;
pub mod fsm;
pub mod geometry;

pub use config::TetherConfig;
pub use element::{ElementArena, ElementId, ElementTree};
pub use error::{Result, TetherError};
pub use events::{EventKind, InputEvent, Key, Phase};
pub use fsm::StateTransitions;
pub use geometry::{
    compute_placement, compute_placement_with, Placement, PlacementOptions, PlacementStyle, Rect,
    Side, Size, Viewport,
};
