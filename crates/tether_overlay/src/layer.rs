//! Detached overlay layer
//!
//! One layer exists per window. It owns the element document, a portal root
//! that sits outside every scrolling/clipping ancestor, and the ordered set of
//! panels currently mounted under that root. Hosts render the layer in a
//! separate pass after the main tree so panels always appear on top.
//!
//! Each [`OverlayHost`](crate::host::OverlayHost) gets its own
//! [`OverlayHandle`] and only ever touches the entry for that handle.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tether_core::element::{ElementArena, ElementId, ElementTree};

/// Handle identifying one overlay instance within a layer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OverlayHandle(u64);

impl OverlayHandle {
    /// Reconstruct a handle from a raw ID
    pub fn from_raw(id: u64) -> Self {
        Self(id)
    }

    /// Get the raw ID
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Screen position of a mounted panel
///
/// `visible` stays false until the panel has been measured against a real
/// trigger rectangle; hosts must not paint a panel that is not visible.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OverlayGeometry {
    pub top: f32,
    pub left: f32,
    pub width: f32,
    pub visible: bool,
}

/// A panel mounted in the layer
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Mount {
    /// Root element of the panel's subtree
    pub panel: ElementId,
    /// Current position
    pub geometry: OverlayGeometry,
}

/// Inner state of the overlay layer
#[derive(Debug)]
pub struct OverlayLayerInner {
    document: ElementArena,
    portal_root: ElementId,
    mounts: IndexMap<OverlayHandle, Mount>,
    next_id: u64,
}

impl Default for OverlayLayerInner {
    fn default() -> Self {
        Self::new()
    }
}

impl OverlayLayerInner {
    pub fn new() -> Self {
        let mut document = ElementArena::new();
        let portal_root = document.insert_named("overlay-root", None);
        Self {
            document,
            portal_root,
            mounts: IndexMap::new(),
            next_id: 1,
        }
    }

    /// Allocate a handle for a new overlay instance
    pub fn allocate_handle(&mut self) -> OverlayHandle {
        let handle = OverlayHandle(self.next_id);
        self.next_id += 1;
        handle
    }

    /// The element document shared by triggers and panels
    pub fn document(&self) -> &ElementArena {
        &self.document
    }

    /// Mutable access to the document (hosts register their triggers here)
    pub fn document_mut(&mut self) -> &mut ElementArena {
        &mut self.document
    }

    /// Root element all panels are mounted under
    pub fn portal_root(&self) -> ElementId {
        self.portal_root
    }

    /// Mount a panel for `handle`
    ///
    /// A handle holds at most one panel: mounting again returns the panel that
    /// is already there.
    pub fn mount(&mut self, handle: OverlayHandle) -> ElementId {
        if let Some(existing) = self.mounts.get(&handle) {
            return existing.panel;
        }
        let panel = self.document.insert_child(self.portal_root);
        self.mounts.insert(
            handle,
            Mount {
                panel,
                geometry: OverlayGeometry::default(),
            },
        );
        tracing::trace!(
            "OverlayLayer::mount - {:?} -> {:?} ({} mounted)",
            handle,
            panel,
            self.mounts.len()
        );
        panel
    }

    /// Remove the panel for `handle` and its whole subtree
    pub fn unmount(&mut self, handle: OverlayHandle) -> bool {
        match self.mounts.shift_remove(&handle) {
            Some(mount) => {
                self.document.remove(mount.panel);
                tracing::trace!("OverlayLayer::unmount - {:?}", handle);
                true
            }
            None => false,
        }
    }

    /// Update the geometry of a mounted panel
    pub fn set_geometry(&mut self, handle: OverlayHandle, geometry: OverlayGeometry) {
        if let Some(mount) = self.mounts.get_mut(&handle) {
            mount.geometry = geometry;
        }
    }

    /// Mounted panel for a handle
    pub fn mount_of(&self, handle: OverlayHandle) -> Option<&Mount> {
        self.mounts.get(&handle)
    }

    /// Panel element for a handle, if it is mounted and still in the document
    pub fn panel_of(&self, handle: OverlayHandle) -> Option<ElementId> {
        self.mounts
            .get(&handle)
            .map(|m| m.panel)
            .filter(|panel| self.document.is_mounted(*panel))
    }

    /// Number of mounted panels
    pub fn mount_count(&self) -> usize {
        self.mounts.len()
    }

    /// Panels that should be painted, in mount order
    pub fn visible_mounts(&self) -> impl Iterator<Item = (OverlayHandle, &Mount)> {
        self.mounts
            .iter()
            .filter(|(_, m)| m.geometry.visible)
            .map(|(h, m)| (*h, m))
    }
}

/// Shared overlay layer (single-threaded UI)
pub type OverlayLayer = Rc<RefCell<OverlayLayerInner>>;

/// Create a new overlay layer
pub fn overlay_layer() -> OverlayLayer {
    Rc::new(RefCell::new(OverlayLayerInner::new()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mount_is_idempotent_per_handle() {
        let mut layer = OverlayLayerInner::new();
        let h = layer.allocate_handle();
        let a = layer.mount(h);
        let b = layer.mount(h);
        assert_eq!(a, b);
        assert_eq!(layer.mount_count(), 1);
        assert!(layer.document().contains(layer.portal_root(), a));
    }

    #[test]
    fn test_handles_own_separate_subtrees() {
        let mut layer = OverlayLayerInner::new();
        let h1 = layer.allocate_handle();
        let h2 = layer.allocate_handle();
        assert_ne!(h1, h2);

        let p1 = layer.mount(h1);
        let p2 = layer.mount(h2);
        assert!(!layer.document().contains(p1, p2));

        assert!(layer.unmount(h1));
        assert!(!layer.unmount(h1));
        assert_eq!(layer.panel_of(h1), None);
        assert_eq!(layer.panel_of(h2), Some(p2));
    }

    #[test]
    fn test_unmount_removes_panel_children() {
        let mut layer = OverlayLayerInner::new();
        let h = layer.allocate_handle();
        let panel = layer.mount(h);
        let row = layer.document_mut().insert_child(panel);
        layer.unmount(h);
        assert!(!layer.document().is_mounted(row));
    }

    #[test]
    fn test_visible_mounts_filters_unmeasured() {
        let mut layer = OverlayLayerInner::new();
        let h1 = layer.allocate_handle();
        let h2 = layer.allocate_handle();
        layer.mount(h1);
        layer.mount(h2);
        layer.set_geometry(
            h2,
            OverlayGeometry {
                top: 10.0,
                left: 10.0,
                width: 100.0,
                visible: true,
            },
        );
        let visible: Vec<_> = layer.visible_mounts().map(|(h, _)| h).collect();
        assert_eq!(visible, vec![h2]);
    }
}
