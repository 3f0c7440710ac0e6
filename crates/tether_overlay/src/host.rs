//! Overlay host - per-instance overlay lifecycle
//!
//! An [`OverlayHost`] owns the open/closed state of one floating panel and
//! runs the two-pass measure-then-reveal sequence:
//!
//! ```text
//! Closed --open()--> Measuring --on_frame(measured)--> Visible --close()--> Closed
//!                        |                                          ^
//!                        +------------------close()-----------------+
//! ```
//!
//! While `Measuring`, the panel is mounted in the layer at an estimated
//! position with `visible == false` so the host toolkit can lay it out and
//! report its real size. Only then is the geometry recomputed and the panel
//! revealed.
//!
//! Every open starts a new session. The session owns the geometry, the
//! listener list and the mounted panel; closing drops all of it, so nothing
//! leaks from one open to the next. Frame callbacks carry the session they
//! were scheduled for and are ignored once that session is gone.
//!
//! # Example
//!
//! ```rust
//! use tether_core::{InputEvent, Key, PlacementStyle, Rect, Size, Viewport};
//! use tether_overlay::{overlay_layer, FrameOutcome, OverlayHost};
//!
//! let layer = overlay_layer();
//! let trigger = layer.borrow_mut().document_mut().insert_root();
//! let mut host = OverlayHost::new(layer.clone(), trigger, PlacementStyle::Select);
//!
//! let rect = Rect::new(20.0, 20.0, 240.0, 36.0);
//! let viewport = Viewport::new(800.0, 600.0);
//! let frame = host.open(rect, viewport).expect("closed host opens");
//! assert!(!host.geometry().visible);
//!
//! let outcome = host.on_frame(frame, Size::new(240.0, 180.0), rect, viewport);
//! assert!(matches!(outcome, FrameOutcome::Revealed(_)));
//! assert!(host.geometry().visible);
//!
//! host.handle_event(&InputEvent::key(Key::Escape));
//! assert!(!host.is_open());
//! ```

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use tether_core::config::TetherConfig;
use tether_core::element::{ElementId, ElementTree};
use tether_core::events::{EventKind, InputEvent, Phase};
use tether_core::fsm::StateTransitions;
use tether_core::geometry::{
    compute_placement_with, Placement, PlacementOptions, PlacementStyle, Rect, Size, Viewport,
};

use crate::dismiss::{DismissReason, DismissalContext, DismissalController};
use crate::layer::{OverlayGeometry, OverlayHandle, OverlayLayer};

// =============================================================================
// OverlayPhase - FSM for the measure-then-reveal lifecycle
// =============================================================================

/// Event codes for the overlay state machine
pub mod overlay_events {
    /// Open the overlay (Closed -> Measuring)
    pub const OPEN: u32 = 21001;
    /// Real panel size is known (Measuring -> Visible)
    pub const MEASURED: u32 = 21002;
    /// Close the overlay (Measuring/Visible -> Closed)
    pub const CLOSE: u32 = 21003;
}

/// Lifecycle state of an overlay
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum OverlayPhase {
    /// Nothing mounted
    #[default]
    Closed,
    /// Mounted but hidden, waiting for a layout pass to report its size
    Measuring,
    /// Positioned from a real measurement and shown
    Visible,
}

impl OverlayPhase {
    /// Check if a panel is mounted (measuring or visible)
    pub fn is_open(&self) -> bool {
        !matches!(self, OverlayPhase::Closed)
    }
}

impl StateTransitions for OverlayPhase {
    fn on_event(&self, event: u32) -> Option<Self> {
        use overlay_events::*;
        use OverlayPhase::*;

        match (self, event) {
            (Closed, OPEN) => Some(Measuring),
            (Measuring, MEASURED) => Some(Visible),
            (Measuring, CLOSE) | (Visible, CLOSE) => Some(Closed),
            _ => None,
        }
    }
}

// =============================================================================
// Sessions and listeners
// =============================================================================

/// Identifies one open..close cycle of a host
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// A scheduled layout pass for one session
///
/// Handed to the host toolkit by [`OverlayHost::open`]; the toolkit lays the
/// panel out and passes the request back to [`OverlayHost::on_frame`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameRequest {
    pub handle: OverlayHandle,
    pub session: SessionId,
}

/// What a frame callback did
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FrameOutcome {
    /// The panel is now positioned from its real size and visible
    Revealed(OverlayGeometry),
    /// The trigger had no size yet; schedule another frame
    Retry(FrameRequest),
    /// The session this frame was scheduled for is gone; nothing happened
    Stale,
    /// The overlay closed while handling the frame
    Dismissed(DismissReason),
}

/// What a reposition request did
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RepositionOutcome {
    /// The visible panel was re-placed
    Moved(OverlayGeometry),
    /// Closed or still measuring; nothing to move
    NotVisible,
    /// The trigger is gone and the overlay closed
    Dismissed(DismissReason),
}

new_key_type! {
    /// Handle to an event listener registered by an open overlay
    pub struct ListenerId;
}

/// A subscription held by one open session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Listener {
    pub kind: EventKind,
    pub phase: Phase,
}

/// Listeners every session registers on open
///
/// Scroll is captured so a scroll anywhere on the page is seen, not only
/// scrolls that bubble up to the document.
const SESSION_LISTENERS: [Listener; 4] = [
    Listener {
        kind: EventKind::PointerDown,
        phase: Phase::Bubble,
    },
    Listener {
        kind: EventKind::KeyDown,
        phase: Phase::Bubble,
    },
    Listener {
        kind: EventKind::Scroll,
        phase: Phase::Capture,
    },
    Listener {
        kind: EventKind::Resize,
        phase: Phase::Bubble,
    },
];

/// State that lives exactly as long as one open session
#[derive(Debug)]
struct Session {
    id: SessionId,
    geometry: OverlayGeometry,
    /// Last size reported by a frame callback
    measured: Option<Size>,
    trigger_rect: Rect,
    viewport: Viewport,
    listeners: SlotMap<ListenerId, Listener>,
    scroll_exempt: SmallVec<[ElementId; 2]>,
}

impl Session {
    fn listens_to(&self, kind: EventKind) -> bool {
        self.listeners.values().any(|l| l.kind == kind)
    }
}

// =============================================================================
// OverlayHost
// =============================================================================

/// Owns the lifecycle of one floating panel anchored to one trigger
pub struct OverlayHost {
    handle: OverlayHandle,
    layer: OverlayLayer,
    trigger: ElementId,
    style: PlacementStyle,
    options: PlacementOptions,
    /// Size assumed before the first measurement
    estimate: Size,
    phase: OverlayPhase,
    session: Option<Session>,
    next_session: u64,
}

impl std::fmt::Debug for OverlayHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayHost")
            .field("handle", &self.handle)
            .field("trigger", &self.trigger)
            .field("style", &self.style)
            .field("phase", &self.phase)
            .field("session", &self.session.as_ref().map(|s| s.id))
            .finish()
    }
}

impl OverlayHost {
    /// Create a host for `trigger` with default constants
    pub fn new(layer: OverlayLayer, trigger: ElementId, style: PlacementStyle) -> Self {
        Self::with_config(layer, trigger, style, &TetherConfig::default())
    }

    /// Create a host for `trigger` using the constants in `config`
    pub fn with_config(
        layer: OverlayLayer,
        trigger: ElementId,
        style: PlacementStyle,
        config: &TetherConfig,
    ) -> Self {
        let handle = layer.borrow_mut().allocate_handle();
        let estimate = match style {
            PlacementStyle::Select => Size::new(0.0, config.estimated_panel_height),
            PlacementStyle::ContextMenu => {
                Size::new(config.estimated_menu_width, config.estimated_panel_height)
            }
        };
        Self {
            handle,
            layer,
            trigger,
            style,
            options: config.placement_options(style),
            estimate,
            phase: OverlayPhase::Closed,
            session: None,
            next_session: 1,
        }
    }

    pub fn handle(&self) -> OverlayHandle {
        self.handle
    }

    pub fn trigger(&self) -> ElementId {
        self.trigger
    }

    pub fn style(&self) -> PlacementStyle {
        self.style
    }

    pub fn layer(&self) -> &OverlayLayer {
        &self.layer
    }

    pub fn phase(&self) -> OverlayPhase {
        self.phase
    }

    /// True while a panel is mounted (measuring or visible)
    pub fn is_open(&self) -> bool {
        self.phase.is_open()
    }

    /// Current geometry (all zero and hidden while closed)
    pub fn geometry(&self) -> OverlayGeometry {
        self.session
            .as_ref()
            .map(|s| s.geometry)
            .unwrap_or_default()
    }

    /// Current session, if open
    pub fn session(&self) -> Option<SessionId> {
        self.session.as_ref().map(|s| s.id)
    }

    /// Root element of the mounted panel
    pub fn panel(&self) -> Option<ElementId> {
        if self.session.is_none() {
            return None;
        }
        self.layer.borrow().panel_of(self.handle)
    }

    /// Number of live event listeners held by the current session
    pub fn listener_count(&self) -> usize {
        self.session.as_ref().map(|s| s.listeners.len()).unwrap_or(0)
    }

    /// Listeners held by the current session
    pub fn listeners(&self) -> Vec<Listener> {
        self.session
            .as_ref()
            .map(|s| s.listeners.values().copied().collect())
            .unwrap_or_default()
    }

    /// Mark an extra scrollable region whose scrolling must not dismiss
    ///
    /// Scrolls inside the panel are always exempt. Regions are per session
    /// and forgotten on close.
    pub fn exempt_scroll_region(&mut self, region: ElementId) {
        if let Some(session) = self.session.as_mut() {
            if !session.scroll_exempt.contains(&region) {
                session.scroll_exempt.push(region);
            }
        }
    }

    /// Open the overlay
    ///
    /// Mounts the panel hidden at an estimated position, registers the
    /// session's listeners and returns the frame to measure it in. Opening an
    /// overlay that is already open does nothing and returns `None`.
    pub fn open(&mut self, trigger_rect: Rect, viewport: Viewport) -> Option<FrameRequest> {
        let next = self.phase.on_event(overlay_events::OPEN)?;

        let id = SessionId(self.next_session);
        self.next_session += 1;

        let placement = self.place(trigger_rect, self.estimate, viewport);
        let geometry = hidden(placement);

        let mut listeners = SlotMap::with_key();
        for listener in SESSION_LISTENERS {
            listeners.insert(listener);
        }

        {
            let mut layer = self.layer.borrow_mut();
            layer.mount(self.handle);
            layer.set_geometry(self.handle, geometry);
        }

        self.session = Some(Session {
            id,
            geometry,
            measured: None,
            trigger_rect,
            viewport,
            listeners,
            scroll_exempt: SmallVec::new(),
        });
        self.phase = next;

        tracing::debug!(
            "OverlayHost::open - {:?} session {} measuring at ({:.1}, {:.1})",
            self.handle,
            id.0,
            geometry.left,
            geometry.top
        );

        Some(FrameRequest {
            handle: self.handle,
            session: id,
        })
    }

    /// Close the overlay
    ///
    /// Unmounts the panel and drops the session (geometry, listeners, scroll
    /// exemptions). Returns false if it was already closed.
    pub fn close(&mut self, reason: DismissReason) -> bool {
        let Some(next) = self.phase.on_event(overlay_events::CLOSE) else {
            return false;
        };
        let session = self.session.take();
        self.layer.borrow_mut().unmount(self.handle);
        self.phase = next;

        tracing::debug!(
            "OverlayHost::close - {:?} session {:?} closed ({:?})",
            self.handle,
            session.map(|s| s.id.0),
            reason
        );
        true
    }

    /// Frame callback: the panel has been laid out at `measured` size
    ///
    /// While measuring, recomputes the placement from the real size and
    /// reveals the panel. While visible, re-places it (content changed size).
    /// Requests for a closed or superseded session are ignored.
    pub fn on_frame(
        &mut self,
        request: FrameRequest,
        measured: Size,
        trigger_rect: Rect,
        viewport: Viewport,
    ) -> FrameOutcome {
        let current = self.session.as_ref().map(|s| s.id);
        if request.handle != self.handle || current != Some(request.session) {
            tracing::trace!(
                "OverlayHost::on_frame - {:?} ignoring stale frame for session {}",
                self.handle,
                request.session.0
            );
            return FrameOutcome::Stale;
        }

        if !self.anchor_mounted() {
            tracing::warn!(
                "OverlayHost::on_frame - {:?} trigger {:?} is gone, closing",
                self.handle,
                self.trigger
            );
            self.close(DismissReason::AnchorLost);
            return FrameOutcome::Dismissed(DismissReason::AnchorLost);
        }

        if trigger_rect.is_empty() {
            tracing::trace!(
                "OverlayHost::on_frame - {:?} trigger has no size yet, retrying",
                self.handle
            );
            if let Some(session) = self.session.as_mut() {
                session.measured = Some(measured);
                session.viewport = viewport;
            }
            return FrameOutcome::Retry(request);
        }

        let placement = self.place(trigger_rect, measured, viewport);
        let geometry = shown(placement);

        if let Some(session) = self.session.as_mut() {
            session.geometry = geometry;
            session.measured = Some(measured);
            session.trigger_rect = trigger_rect;
            session.viewport = viewport;
        }
        self.layer.borrow_mut().set_geometry(self.handle, geometry);

        if let Some(next) = self.phase.on_event(overlay_events::MEASURED) {
            self.phase = next;
            tracing::debug!(
                "OverlayHost::on_frame - {:?} revealed at ({:.1}, {:.1}) w={:.1} {:?}",
                self.handle,
                geometry.left,
                geometry.top,
                geometry.width,
                placement.side
            );
        }

        FrameOutcome::Revealed(geometry)
    }

    /// Re-place a visible overlay after the trigger moved or the window resized
    ///
    /// Uses the last measured size. Does nothing while closed or measuring.
    pub fn reposition(&mut self, trigger_rect: Rect, viewport: Viewport) -> RepositionOutcome {
        if self.phase != OverlayPhase::Visible {
            return RepositionOutcome::NotVisible;
        }
        if !self.anchor_mounted() {
            self.close(DismissReason::AnchorLost);
            return RepositionOutcome::Dismissed(DismissReason::AnchorLost);
        }
        let Some(measured) = self.session.as_ref().and_then(|s| s.measured) else {
            return RepositionOutcome::NotVisible;
        };
        let geometry = shown(self.place(trigger_rect, measured, viewport));
        if let Some(session) = self.session.as_mut() {
            session.geometry = geometry;
            session.trigger_rect = trigger_rect;
            session.viewport = viewport;
        }
        self.layer.borrow_mut().set_geometry(self.handle, geometry);
        RepositionOutcome::Moved(geometry)
    }

    /// Route an input event to this overlay
    ///
    /// Only events this session has a listener for are considered. Returns the
    /// reason if the event closed the overlay.
    pub fn handle_event(&mut self, event: &InputEvent) -> Option<DismissReason> {
        let session = self.session.as_ref()?;
        if !session.listens_to(event.kind()) {
            return None;
        }

        if let InputEvent::Resize { viewport } = event {
            let trigger_rect = session.trigger_rect;
            if !self.anchor_mounted() {
                self.close(DismissReason::AnchorLost);
                return Some(DismissReason::AnchorLost);
            }
            if self.phase == OverlayPhase::Visible {
                self.reposition(trigger_rect, *viewport);
            } else if let Some(session) = self.session.as_mut() {
                session.viewport = *viewport;
            }
            return None;
        }

        let reason = {
            let layer = self.layer.borrow();
            let ctx = DismissalContext {
                tree: layer.document(),
                trigger: self.trigger,
                panel: layer.panel_of(self.handle),
                scroll_exempt: &session.scroll_exempt,
            };
            DismissalController::evaluate(event, &ctx)
        };

        if let Some(reason) = reason {
            self.close(reason);
        }
        reason
    }

    /// A value was committed from the panel (single-select): close
    pub fn commit(&mut self) -> bool {
        self.close(DismissReason::Commit)
    }

    fn anchor_mounted(&self) -> bool {
        self.layer.borrow().document().is_mounted(self.trigger)
    }

    fn place(&self, trigger_rect: Rect, overlay: Size, viewport: Viewport) -> Placement {
        compute_placement_with(trigger_rect, overlay, viewport, self.style, self.options)
    }
}

impl Drop for OverlayHost {
    fn drop(&mut self) {
        if self.session.is_some() {
            if let Ok(mut layer) = self.layer.try_borrow_mut() {
                layer.unmount(self.handle);
            }
        }
    }
}

fn hidden(placement: Placement) -> OverlayGeometry {
    OverlayGeometry {
        top: placement.top,
        left: placement.left,
        width: placement.width,
        visible: false,
    }
}

fn shown(placement: Placement) -> OverlayGeometry {
    OverlayGeometry {
        visible: true,
        ..hidden(placement)
    }
}
