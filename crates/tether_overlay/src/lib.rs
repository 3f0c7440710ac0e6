//! Tether Overlay
//!
//! Floating panels anchored to a trigger element:
//!
//! - **OverlayLayer**: the shared detached render target all panels mount into
//! - **OverlayHost**: per-instance open/measure/reveal/close lifecycle
//! - **DismissalController**: Escape, outside-pointer and outside-scroll rules
//!
//! Hosts are single-threaded and event-driven. Nothing here spawns threads or
//! awaits; the measure-then-reveal step is a [`FrameRequest`] the toolkit
//! answers on its next layout pass.

pub mod dismiss;
pub mod host;
pub mod layer;

pub use dismiss::{DismissReason, DismissalContext, DismissalController};
pub use host::{
    overlay_events, FrameOutcome, FrameRequest, Listener, ListenerId, OverlayHost, OverlayPhase,
    RepositionOutcome, SessionId,
};
pub use layer::{
    overlay_layer, Mount, OverlayGeometry, OverlayHandle, OverlayLayer, OverlayLayerInner,
};
