//! Overlay placement geometry
//!
//! Pure functions that compute where a floating panel goes relative to the
//! element that opened it. Everything here is in logical viewport pixels with
//! the origin at the top-left corner.
//!
//! # Example
//!
//! ```rust
//! use tether_core::geometry::{compute_placement, PlacementStyle, Rect, Side, Size, Viewport};
//!
//! let trigger = Rect::new(100.0, 50.0, 200.0, 32.0);
//! let placement = compute_placement(
//!     trigger,
//!     Size::new(200.0, 240.0),
//!     Viewport::new(1024.0, 768.0),
//!     PlacementStyle::Select,
//! );
//!
//! assert_eq!(placement.side, Side::Below);
//! assert_eq!(placement.top, 86.0); // 50 + 32 + 4
//! assert_eq!(placement.left, 100.0);
//! assert_eq!(placement.width, 200.0);
//! ```

use serde::{Deserialize, Serialize};

/// Gap between a select trigger and its panel
pub const SELECT_GAP: f32 = 4.0;

/// Gap between a context-menu trigger and its menu
pub const MENU_GAP: f32 = 8.0;

/// Minimum distance kept between an overlay and the viewport's left/right edges
pub const VIEWPORT_MARGIN: f32 = 8.0;

/// Panel height assumed before the real panel has been measured
pub const ESTIMATED_PANEL_HEIGHT: f32 = 300.0;

/// Menu width assumed before the real menu has been measured
pub const ESTIMATED_MENU_WIDTH: f32 = 180.0;

/// A width/height pair
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size::new(0.0, 0.0);

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Visible area of the host window
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle in viewport coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const ZERO: Rect = Rect::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn left(&self) -> f32 {
        self.x
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// True when the rectangle has no area (an unmounted or collapsed element)
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Check whether a point lies inside the rectangle (edges inclusive)
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left() && x <= self.right() && y >= self.top() && y <= self.bottom()
    }
}

/// Which kind of overlay is being placed
///
/// The style decides the gap, the horizontal alignment and the width rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementStyle {
    /// Select/combobox panel: 4px gap, left-aligned, as wide as the trigger
    #[default]
    Select,
    /// Context/dropdown menu: 8px gap, right-aligned, intrinsic width
    ContextMenu,
}

impl PlacementStyle {
    /// Default gap between trigger and overlay for this style
    pub fn gap(&self) -> f32 {
        match self {
            PlacementStyle::Select => SELECT_GAP,
            PlacementStyle::ContextMenu => MENU_GAP,
        }
    }
}

/// Vertical side of the trigger the overlay ended up on
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    Below,
    Above,
}

/// Tunable placement constants
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlacementOptions {
    /// Gap between trigger and overlay
    pub gap: f32,
    /// Minimum distance from the viewport's horizontal edges
    pub margin: f32,
}

impl PlacementOptions {
    pub fn for_style(style: PlacementStyle) -> Self {
        Self {
            gap: style.gap(),
            margin: VIEWPORT_MARGIN,
        }
    }
}

/// Result of a placement computation
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub side: Side,
}

/// Compute an overlay's position with the default constants for `style`
pub fn compute_placement(
    trigger: Rect,
    overlay: Size,
    viewport: Viewport,
    style: PlacementStyle,
) -> Placement {
    compute_placement_with(
        trigger,
        overlay,
        viewport,
        style,
        PlacementOptions::for_style(style),
    )
}

/// Compute an overlay's position
///
/// Below the trigger by default; flips above only when the space below is too
/// small and the space above is large enough. When neither side fits, stays
/// below. Horizontally clamped to `[margin, viewport.width - margin]`, with the
/// left margin winning when the overlay is wider than the viewport allows.
///
/// Total over its inputs: non-finite numbers are treated as zero.
pub fn compute_placement_with(
    trigger: Rect,
    overlay: Size,
    viewport: Viewport,
    style: PlacementStyle,
    options: PlacementOptions,
) -> Placement {
    let trigger = Rect::new(
        finite(trigger.x),
        finite(trigger.y),
        finite(trigger.width).max(0.0),
        finite(trigger.height).max(0.0),
    );
    let viewport = Viewport::new(finite(viewport.width), finite(viewport.height));
    let gap = finite(options.gap);
    let margin = finite(options.margin);

    let width = match style {
        PlacementStyle::Select => trigger.width,
        PlacementStyle::ContextMenu => finite(overlay.width).max(0.0),
    };
    let height = finite(overlay.height).max(0.0);

    let space_below = viewport.height - trigger.bottom();
    let space_above = trigger.top();

    let (top, side) = if space_below < height && space_above > height {
        (trigger.top() - gap - height, Side::Above)
    } else {
        (trigger.bottom() + gap, Side::Below)
    };

    let preferred_left = match style {
        PlacementStyle::Select => trigger.left(),
        PlacementStyle::ContextMenu => trigger.right() - width,
    };
    let left = preferred_left
        .min(viewport.width - margin - width)
        .max(margin);

    Placement {
        top,
        left,
        width,
        side,
    }
}

fn finite(v: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}
