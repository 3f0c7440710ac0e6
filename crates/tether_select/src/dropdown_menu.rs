//! Dropdown menu - the context-menu flavor of the overlay primitive
//!
//! The menu sits 8px below (or above) its trigger, takes its own measured
//! width and is right-aligned to the trigger's right edge. Activating an
//! enabled item runs its action and closes the menu.
//!
//! ```rust
//! use std::cell::Cell;
//! use std::rc::Rc;
//! use tether_overlay::overlay_layer;
//! use tether_select::dropdown_menu::DropdownMenuBuilder;
//!
//! let layer = overlay_layer();
//! let trigger = layer.borrow_mut().document_mut().insert_root();
//! let deleted = Rc::new(Cell::new(false));
//! let flag = deleted.clone();
//!
//! let mut menu = DropdownMenuBuilder::new("Actions")
//!     .item("Edit", || {})
//!     .separator()
//!     .item_with_shortcut("Delete", "Del", move || flag.set(true))
//!     .build(layer, trigger);
//!
//! assert!(menu.activate(1));
//! assert!(deleted.get());
//! ```

use std::rc::Rc;

use tether_core::config::TetherConfig;
use tether_core::element::ElementId;
use tether_core::events::{InputEvent, Key};
use tether_core::geometry::{PlacementStyle, Rect, Size, Viewport};
use tether_overlay::{
    DismissReason, FrameOutcome, FrameRequest, OverlayGeometry, OverlayHost, OverlayLayer,
    OverlayPhase, RepositionOutcome,
};

use crate::popover::Popover;
use crate::view::{MenuItemView, MenuView};

/// Menu item action
pub type ActionFn = Rc<dyn Fn()>;

/// One entry of a dropdown menu
#[derive(Clone)]
pub struct MenuItem {
    pub label: String,
    /// Keyboard shortcut hint shown on the right ("Ctrl+S")
    pub shortcut: Option<String>,
    pub disabled: bool,
    /// Draw a separator line above this item
    pub separator_before: bool,
    action: Option<ActionFn>,
}

impl std::fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MenuItem")
            .field("label", &self.label)
            .field("shortcut", &self.shortcut)
            .field("disabled", &self.disabled)
            .field("separator_before", &self.separator_before)
            .finish()
    }
}

impl MenuItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            shortcut: None,
            disabled: false,
            separator_before: false,
            action: None,
        }
    }

    pub fn shortcut(mut self, shortcut: impl Into<String>) -> Self {
        self.shortcut = Some(shortcut.into());
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn on_click<F>(mut self, action: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.action = Some(Rc::new(action));
        self
    }

    fn view(&self) -> MenuItemView {
        MenuItemView {
            label: self.label.clone(),
            shortcut: self.shortcut.clone(),
            disabled: self.disabled,
            separator_before: self.separator_before,
        }
    }
}

/// Builder for [`DropdownMenu`]
pub struct DropdownMenuBuilder {
    trigger_label: String,
    items: Vec<MenuItem>,
    pending_separator: bool,
    disabled: bool,
    config: TetherConfig,
}

impl std::fmt::Debug for DropdownMenuBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DropdownMenuBuilder")
            .field("trigger_label", &self.trigger_label)
            .field("items", &self.items.len())
            .finish()
    }
}

impl DropdownMenuBuilder {
    /// Create with a trigger label
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            trigger_label: label.into(),
            items: Vec::new(),
            pending_separator: false,
            disabled: false,
            config: TetherConfig::default(),
        }
    }

    fn push(mut self, mut item: MenuItem) -> Self {
        item.separator_before |= std::mem::take(&mut self.pending_separator);
        self.items.push(item);
        self
    }

    /// Add a menu item
    pub fn item<F>(self, label: impl Into<String>, on_click: F) -> Self
    where
        F: Fn() + 'static,
    {
        self.push(MenuItem::new(label).on_click(on_click))
    }

    /// Add a menu item with keyboard shortcut display
    pub fn item_with_shortcut<F>(
        self,
        label: impl Into<String>,
        shortcut: impl Into<String>,
        on_click: F,
    ) -> Self
    where
        F: Fn() + 'static,
    {
        self.push(MenuItem::new(label).shortcut(shortcut).on_click(on_click))
    }

    /// Add a disabled menu item
    pub fn item_disabled(self, label: impl Into<String>) -> Self {
        self.push(MenuItem::new(label).disabled())
    }

    /// Add a fully configured item
    pub fn menu_item(self, item: MenuItem) -> Self {
        self.push(item)
    }

    /// Separate the next item from the previous one
    pub fn separator(mut self) -> Self {
        self.pending_separator = !self.items.is_empty();
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn config(mut self, config: &TetherConfig) -> Self {
        self.config = config.clone();
        self
    }

    pub fn build(self, layer: OverlayLayer, trigger: ElementId) -> DropdownMenu {
        let host = OverlayHost::with_config(
            layer,
            trigger,
            PlacementStyle::ContextMenu,
            &self.config,
        );
        let mut popover = Popover::new(host);
        popover.set_disabled(self.disabled);
        DropdownMenu {
            popover,
            trigger_label: self.trigger_label,
            items: self.items,
        }
    }
}

/// A trigger-anchored action menu
pub struct DropdownMenu {
    popover: Popover,
    trigger_label: String,
    items: Vec<MenuItem>,
}

impl std::fmt::Debug for DropdownMenu {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DropdownMenu")
            .field("trigger_label", &self.trigger_label)
            .field("items", &self.items.len())
            .field("phase", &self.popover.phase())
            .finish()
    }
}

impl DropdownMenu {
    pub fn trigger_label(&self) -> &str {
        &self.trigger_label
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn open(&mut self, trigger_rect: Rect, viewport: Viewport) -> Option<FrameRequest> {
        self.popover.open(trigger_rect, viewport)
    }

    pub fn toggle(&mut self, trigger_rect: Rect, viewport: Viewport) -> Option<FrameRequest> {
        self.popover.toggle(trigger_rect, viewport)
    }

    pub fn close(&mut self) -> bool {
        self.popover.close()
    }

    pub fn on_frame(
        &mut self,
        request: FrameRequest,
        measured: Size,
        trigger_rect: Rect,
        viewport: Viewport,
    ) -> FrameOutcome {
        self.popover.on_frame(request, measured, trigger_rect, viewport)
    }

    /// Re-place an open menu after its trigger moved
    pub fn reposition(&mut self, trigger_rect: Rect, viewport: Viewport) -> RepositionOutcome {
        self.popover.reposition(trigger_rect, viewport)
    }

    pub fn is_open(&self) -> bool {
        self.popover.is_open()
    }

    pub fn phase(&self) -> OverlayPhase {
        self.popover.phase()
    }

    pub fn geometry(&self) -> OverlayGeometry {
        self.popover.geometry()
    }

    pub fn host(&self) -> &OverlayHost {
        self.popover.host()
    }

    /// Run the item at `index` and close the menu
    ///
    /// Disabled or missing items do nothing and return false.
    pub fn activate(&mut self, index: usize) -> bool {
        let Some(item) = self.items.get(index).filter(|i| !i.disabled) else {
            return false;
        };
        tracing::debug!("DropdownMenu::activate - {:?}", item.label);
        let action = item.action.clone();
        self.popover.commit();
        if let Some(action) = action {
            action();
        }
        true
    }

    fn enabled_indices(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| !item.disabled)
            .map(|(i, _)| i)
            .collect()
    }

    /// Route an input event; arrows move over enabled items, Enter activates
    pub fn handle_event(&mut self, event: &InputEvent) -> Option<DismissReason> {
        if let Some(reason) = self.popover.handle_event(event) {
            return Some(reason);
        }
        if !self.popover.is_open() {
            return None;
        }
        match event {
            InputEvent::KeyDown {
                key: key @ (Key::ArrowDown | Key::ArrowUp),
            } => {
                let len = self.enabled_indices().len();
                self.popover.move_highlight(*key == Key::ArrowDown, len);
                None
            }
            InputEvent::KeyDown { key: Key::Enter } => {
                let target = self
                    .popover
                    .highlight()
                    .and_then(|i| self.enabled_indices().get(i).copied())?;
                self.activate(target).then_some(DismissReason::Commit)
            }
            _ => None,
        }
    }

    /// Index into `items()` of the highlighted entry
    pub fn highlighted_item(&self) -> Option<usize> {
        self.popover
            .highlight()
            .and_then(|i| self.enabled_indices().get(i).copied())
    }

    /// Entries of the open menu (None while closed)
    pub fn menu_view(&self) -> Option<MenuView> {
        if !self.is_open() {
            return None;
        }
        Some(MenuView {
            geometry: self.popover.geometry(),
            items: self.items.iter().map(MenuItem::view).collect(),
        })
    }
}

/// Start building a dropdown menu
pub fn dropdown_menu(label: impl Into<String>) -> DropdownMenuBuilder {
    DropdownMenuBuilder::new(label)
}
