//! Dismissal rules for open overlays
//!
//! Decides, for one input event, whether an open overlay should close. The
//! rules are checked in priority order:
//!
//! 1. `Escape` always closes.
//! 2. A pointer press outside both the trigger and the panel closes.
//! 3. A scroll anywhere except inside the panel (or an exempt region) closes.
//! 4. A single-select commit closes (reported by the caller, not an event).
//!
//! A panel that cannot be found counts as "outside", so a race at open time
//! closes the overlay instead of leaving it orphaned.

use serde::{Deserialize, Serialize};
use tether_core::element::{ElementId, ElementTree};
use tether_core::events::{InputEvent, Key};

/// Why an overlay closed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DismissReason {
    /// Escape key
    Escape,
    /// Pointer pressed outside trigger and panel
    OutsidePointer,
    /// Page scrolled outside the panel
    OutsideScroll,
    /// A single-select value was committed
    Commit,
    /// The trigger element went away while open
    AnchorLost,
    /// Closed by the owning component (trigger toggle, `close()`)
    Programmatic,
}

/// Everything the controller needs to know about one open overlay
pub struct DismissalContext<'a, T: ElementTree + ?Sized> {
    pub tree: &'a T,
    pub trigger: ElementId,
    /// Root of the mounted panel (None if it is not mounted)
    pub panel: Option<ElementId>,
    /// Extra scrollable regions that must not dismiss the overlay
    pub scroll_exempt: &'a [ElementId],
}

impl<'a, T: ElementTree + ?Sized> DismissalContext<'a, T> {
    fn in_panel(&self, node: ElementId) -> bool {
        self.panel
            .map(|panel| self.tree.contains(panel, node))
            .unwrap_or(false)
    }

    fn in_trigger(&self, node: ElementId) -> bool {
        self.tree.contains(self.trigger, node)
    }

    fn in_scroll_exempt(&self, node: ElementId) -> bool {
        self.scroll_exempt
            .iter()
            .any(|region| self.tree.contains(*region, node))
    }
}

/// Stateless dismissal decision logic
pub struct DismissalController;

impl DismissalController {
    /// Decide whether `event` should close the overlay described by `ctx`
    pub fn evaluate<T: ElementTree + ?Sized>(
        event: &InputEvent,
        ctx: &DismissalContext<'_, T>,
    ) -> Option<DismissReason> {
        match event {
            InputEvent::KeyDown { key: Key::Escape } => Some(DismissReason::Escape),
            InputEvent::KeyDown { .. } => None,
            InputEvent::PointerDown { target, .. } => {
                let inside = target
                    .map(|t| ctx.in_trigger(t) || ctx.in_panel(t))
                    .unwrap_or(false);
                (!inside).then_some(DismissReason::OutsidePointer)
            }
            InputEvent::Scroll { target } => {
                let inside = target
                    .map(|t| ctx.in_panel(t) || ctx.in_scroll_exempt(t))
                    .unwrap_or(false);
                (!inside).then_some(DismissReason::OutsideScroll)
            }
            InputEvent::Resize { .. } => None,
        }
    }
}
