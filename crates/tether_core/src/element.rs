//! Element identity and containment
//!
//! Overlays never search the host's tree by class name to find out whether an
//! event landed inside them. Instead every trigger and panel is an [`ElementId`]
//! and containment is answered by walking parent links in an [`ElementArena`].
//!
//! Ids of removed elements stay valid as keys but are no longer contained by
//! anything, so a lookup against a node that went away reads as "outside".

use rustc_hash::FxHashMap;
use slotmap::{new_key_type, Key, SlotMap};

new_key_type! {
    /// Handle to an element known to the overlay system (a trigger, a panel, a row)
    pub struct ElementId;
}

impl ElementId {
    /// Convert to a raw u64 representation
    pub fn to_raw(self) -> u64 {
        self.data().as_ffi()
    }

    /// Create from a raw u64 representation produced by `to_raw()`
    pub fn from_raw(raw: u64) -> Self {
        Self::from(slotmap::KeyData::from_ffi(raw))
    }
}

/// Read access to an element hierarchy
///
/// Hosts with their own retained tree can implement this directly instead of
/// mirroring nodes into an [`ElementArena`].
pub trait ElementTree {
    /// Whether `node` is currently mounted
    fn is_mounted(&self, node: ElementId) -> bool;

    /// Parent of a mounted node (None for roots and unknown nodes)
    fn parent(&self, node: ElementId) -> Option<ElementId>;

    /// Whether `node` is `ancestor` or one of its descendants
    ///
    /// Unknown or unmounted nodes are never contained.
    fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        if !self.is_mounted(ancestor) || !self.is_mounted(node) {
            return false;
        }
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }
}

#[derive(Clone, Debug, Default)]
struct Node {
    parent: Option<ElementId>,
    children: Vec<ElementId>,
    /// Optional debug name (shows up in logs)
    name: Option<String>,
}

/// A minimal parent/child arena
///
/// Used by the overlay layer for its portal root and mounted panels, and by
/// hosts/tests that do not keep their own retained tree.
#[derive(Debug, Default)]
pub struct ElementArena {
    nodes: SlotMap<ElementId, Node>,
    names: FxHashMap<String, ElementId>,
}

impl ElementArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a parentless element
    pub fn insert_root(&mut self) -> ElementId {
        self.nodes.insert(Node::default())
    }

    /// Insert an element under `parent`
    ///
    /// Inserting under an unmounted parent creates a detached root instead.
    pub fn insert_child(&mut self, parent: ElementId) -> ElementId {
        let parent = self.nodes.contains_key(parent).then_some(parent);
        let id = self.nodes.insert(Node {
            parent,
            ..Node::default()
        });
        if let Some(p) = parent.and_then(|p| self.nodes.get_mut(p)) {
            p.children.push(id);
        }
        id
    }

    /// Insert a named element (names are unique; re-using one rebinds it)
    pub fn insert_named(
        &mut self,
        name: impl Into<String>,
        parent: Option<ElementId>,
    ) -> ElementId {
        let name = name.into();
        let id = match parent {
            Some(parent) => self.insert_child(parent),
            None => self.insert_root(),
        };
        if let Some(node) = self.nodes.get_mut(id) {
            node.name = Some(name.clone());
        }
        self.names.insert(name, id);
        id
    }

    /// Look up a named element
    pub fn named(&self, name: &str) -> Option<ElementId> {
        self.names
            .get(name)
            .copied()
            .filter(|id| self.nodes.contains_key(*id))
    }

    /// Debug name of an element, if it has one
    pub fn name(&self, node: ElementId) -> Option<&str> {
        self.nodes.get(node).and_then(|n| n.name.as_deref())
    }

    /// Remove an element and its whole subtree
    ///
    /// Returns the number of nodes removed (0 if it was already gone).
    pub fn remove(&mut self, node: ElementId) -> usize {
        let Some(removed) = self.nodes.remove(node) else {
            return 0;
        };
        if let Some(parent) = removed.parent.and_then(|p| self.nodes.get_mut(p)) {
            parent.children.retain(|c| *c != node);
        }
        self.forget_name(node, removed.name);

        let mut count = 1;
        let mut stack = removed.children;
        while let Some(child) = stack.pop() {
            if let Some(n) = self.nodes.remove(child) {
                self.forget_name(child, n.name);
                stack.extend(n.children);
                count += 1;
            }
        }
        count
    }

    fn forget_name(&mut self, node: ElementId, name: Option<String>) {
        if let Some(name) = name {
            if self.names.get(&name) == Some(&node) {
                self.names.remove(&name);
            }
        }
    }

    /// Children of a node in insertion order
    pub fn children(&self, node: ElementId) -> &[ElementId] {
        self.nodes
            .get(node)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Total number of live elements
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl ElementTree for ElementArena {
    fn is_mounted(&self, node: ElementId) -> bool {
        self.nodes.contains_key(node)
    }

    fn parent(&self, node: ElementId) -> Option<ElementId> {
        self.nodes.get(node).and_then(|n| n.parent)
    }
}
