//! Overlay plumbing shared by select, multi-select and dropdown menu
//!
//! Wraps an [`OverlayHost`] with the per-session state the components need:
//! the search text and the keyboard highlight. Both are reset whenever the
//! overlay opens or closes, so nothing carries over between sessions.

use tether_core::element::ElementId;
use tether_core::events::InputEvent;
use tether_core::geometry::{Rect, Size, Viewport};
use tether_overlay::{
    DismissReason, FrameOutcome, FrameRequest, OverlayGeometry, OverlayHost, OverlayPhase,
    RepositionOutcome,
};

use crate::filter::SearchState;

/// An overlay host plus its session-scoped search and highlight state
#[derive(Debug)]
pub struct Popover {
    host: OverlayHost,
    search: SearchState,
    highlight: Option<usize>,
    disabled: bool,
}

impl Popover {
    pub fn new(host: OverlayHost) -> Self {
        Self {
            host,
            search: SearchState::default(),
            highlight: None,
            disabled: false,
        }
    }

    pub fn host(&self) -> &OverlayHost {
        &self.host
    }

    pub fn is_open(&self) -> bool {
        self.host.is_open()
    }

    pub fn phase(&self) -> OverlayPhase {
        self.host.phase()
    }

    pub fn geometry(&self) -> OverlayGeometry {
        self.host.geometry()
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Disable or enable; disabling an open popover closes it
    pub fn set_disabled(&mut self, disabled: bool) {
        self.disabled = disabled;
        if disabled {
            self.close();
        }
    }

    /// Open unless disabled or already open
    pub fn open(&mut self, trigger_rect: Rect, viewport: Viewport) -> Option<FrameRequest> {
        if self.disabled {
            tracing::trace!("Popover::open - {:?} is disabled", self.host.handle());
            return None;
        }
        let request = self.host.open(trigger_rect, viewport)?;
        self.reset_session();
        Some(request)
    }

    /// Trigger click: open when closed, close when open
    pub fn toggle(&mut self, trigger_rect: Rect, viewport: Viewport) -> Option<FrameRequest> {
        if self.is_open() {
            self.close();
            None
        } else {
            self.open(trigger_rect, viewport)
        }
    }

    pub fn close(&mut self) -> bool {
        self.dismiss(DismissReason::Programmatic)
    }

    /// Close after a single-select commit
    pub fn commit(&mut self) -> bool {
        self.dismiss(DismissReason::Commit)
    }

    fn dismiss(&mut self, reason: DismissReason) -> bool {
        let closed = self.host.close(reason);
        self.reset_session();
        closed
    }

    pub fn on_frame(
        &mut self,
        request: FrameRequest,
        measured: Size,
        trigger_rect: Rect,
        viewport: Viewport,
    ) -> FrameOutcome {
        let outcome = self.host.on_frame(request, measured, trigger_rect, viewport);
        if let FrameOutcome::Dismissed(_) = outcome {
            self.reset_session();
        }
        outcome
    }

    /// Re-place a visible panel; a lost trigger closes it and ends the session
    pub fn reposition(&mut self, trigger_rect: Rect, viewport: Viewport) -> RepositionOutcome {
        let outcome = self.host.reposition(trigger_rect, viewport);
        if let RepositionOutcome::Dismissed(_) = outcome {
            self.reset_session();
        }
        outcome
    }

    /// Keep scrolls inside `region` from dismissing the open panel
    pub fn exempt_scroll_region(&mut self, region: ElementId) {
        self.host.exempt_scroll_region(region);
    }

    /// Route an event through the dismissal rules
    pub fn handle_event(&mut self, event: &InputEvent) -> Option<DismissReason> {
        let reason = self.host.handle_event(event);
        if reason.is_some() {
            self.reset_session();
        }
        reason
    }

    pub fn query(&self) -> &str {
        self.search.query()
    }

    /// Replace the search text; ignored while closed
    pub fn set_query(&mut self, query: impl Into<String>) -> bool {
        if !self.is_open() {
            return false;
        }
        self.search.set(query);
        self.highlight = None;
        true
    }

    /// Append typed text to the search
    pub fn push_query(&mut self, c: char) -> bool {
        let mut query = self.search.query().to_string();
        query.push(c);
        self.set_query(query)
    }

    /// Delete the last character of the search
    pub fn pop_query(&mut self) -> bool {
        let mut query = self.search.query().to_string();
        if query.pop().is_none() {
            return false;
        }
        self.set_query(query)
    }

    pub fn highlight(&self) -> Option<usize> {
        self.highlight
    }

    /// Move the keyboard highlight within `len` rows, clamping at both ends
    pub fn move_highlight(&mut self, forward: bool, len: usize) {
        if len == 0 {
            self.highlight = None;
            return;
        }
        self.highlight = Some(match (self.highlight, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1).min(len - 1),
            (Some(i), false) => i.saturating_sub(1).min(len - 1),
        });
    }

    pub fn reset_highlight(&mut self) {
        self.highlight = None;
    }

    fn reset_session(&mut self) {
        self.search.reset();
        self.highlight = None;
    }
}
