//! Select component - searchable single-value selection
//!
//! A trigger that opens a floating panel with a search box, a placeholder
//! row and a filtered, capped option list. Picking a row commits the value
//! and closes the panel.
//!
//! # Example
//!
//! ```rust
//! use tether_core::{Rect, Size, Viewport};
//! use tether_overlay::overlay_layer;
//! use tether_select::select::SelectBuilder;
//!
//! let layer = overlay_layer();
//! let trigger = layer.borrow_mut().document_mut().insert_root();
//!
//! let mut course = SelectBuilder::new()
//!     .placeholder("Choose a course...")
//!     .option_with_secondary("1", "Toán", "MATH101")
//!     .option_with_secondary("2", "Lý", "PHYS101")
//!     .show_secondary(true)
//!     .on_change(|value| println!("Selected: {}", value))
//!     .build(layer, trigger)
//!     .unwrap();
//!
//! let rect = Rect::new(40.0, 40.0, 260.0, 36.0);
//! let viewport = Viewport::new(1280.0, 720.0);
//! let frame = course.open(rect, viewport).unwrap();
//! course.on_frame(frame, Size::new(260.0, 160.0), rect, viewport);
//!
//! course.set_query("phys");
//! assert_eq!(course.panel_view().unwrap().option_values(), vec!["2"]);
//!
//! course.select("2");
//! assert_eq!(course.value(), "2");
//! assert!(!course.is_open());
//! ```

use std::rc::Rc;

use tether_core::config::TetherConfig;
use tether_core::element::ElementId;
use tether_core::error::Result;
use tether_core::events::{InputEvent, Key};
use tether_core::geometry::{PlacementStyle, Rect, Size, Viewport};
use tether_overlay::{
    DismissReason, FrameOutcome, FrameRequest, OverlayGeometry, OverlayHost, OverlayLayer,
    OverlayPhase, RepositionOutcome,
};

use crate::filter::{truncate, OptionFilter};
use crate::option::{OptionList, SelectOption};
use crate::popover::Popover;
use crate::selection::SingleSelection;
use crate::view::{Chevron, PanelRow, PanelView, TriggerView};

/// Callback fired with the new value after every committed change
pub type ChangeFn = Rc<dyn Fn(&str)>;

/// Builder for [`Select`]
pub struct SelectBuilder {
    options: Vec<SelectOption>,
    placeholder: String,
    default_value: String,
    disabled: bool,
    show_secondary: bool,
    max_display_options: Option<usize>,
    config: TetherConfig,
    on_change: Option<ChangeFn>,
}

impl std::fmt::Debug for SelectBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectBuilder")
            .field("options", &self.options.len())
            .field("placeholder", &self.placeholder)
            .field("default_value", &self.default_value)
            .field("disabled", &self.disabled)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

impl Default for SelectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectBuilder {
    pub fn new() -> Self {
        Self {
            options: Vec::new(),
            placeholder: "Select...".to_string(),
            default_value: String::new(),
            disabled: false,
            show_secondary: false,
            max_display_options: None,
            config: TetherConfig::default(),
            on_change: None,
        }
    }

    /// Add an option
    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push(SelectOption::new(value, label));
        self
    }

    /// Add an option with secondary text
    pub fn option_with_secondary(
        mut self,
        value: impl Into<String>,
        label: impl Into<String>,
        secondary: impl Into<String>,
    ) -> Self {
        self.options
            .push(SelectOption::new(value, label).secondary(secondary));
        self
    }

    /// Add multiple options
    pub fn options(mut self, options: impl IntoIterator<Item = SelectOption>) -> Self {
        self.options.extend(options);
        self
    }

    /// Text shown when nothing is selected, also the label of the clear row
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// The caller-controlled current value
    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = value.into();
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Render and search secondary text
    pub fn show_secondary(mut self, show: bool) -> Self {
        self.show_secondary = show;
        self
    }

    /// Cap on rendered option rows (defaults to the config value, 10)
    pub fn max_display_options(mut self, max: usize) -> Self {
        self.max_display_options = Some(max);
        self
    }

    pub fn config(mut self, config: &TetherConfig) -> Self {
        self.config = config.clone();
        self
    }

    /// Set the change callback
    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&str) + 'static,
    {
        self.on_change = Some(Rc::new(callback));
        self
    }

    /// Build the select anchored to `trigger`
    ///
    /// Fails if two options share a value.
    pub fn build(self, layer: OverlayLayer, trigger: ElementId) -> Result<Select> {
        let options = OptionList::new(self.options)?;
        let host = OverlayHost::with_config(layer, trigger, PlacementStyle::Select, &self.config);
        let mut popover = Popover::new(host);
        popover.set_disabled(self.disabled);

        Ok(Select {
            popover,
            options,
            placeholder: self.placeholder,
            selection: SingleSelection::new(self.default_value),
            show_secondary: self.show_secondary,
            max_display_options: self
                .max_display_options
                .unwrap_or(self.config.max_display_options),
            empty_label: self.config.empty_label,
            on_change: self.on_change,
        })
    }
}

/// A searchable single-value select
pub struct Select {
    popover: Popover,
    options: OptionList,
    placeholder: String,
    selection: SingleSelection,
    show_secondary: bool,
    max_display_options: usize,
    empty_label: String,
    on_change: Option<ChangeFn>,
}

impl std::fmt::Debug for Select {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Select")
            .field("value", &self.selection.value())
            .field("options", &self.options.len())
            .field("phase", &self.popover.phase())
            .field("query", &self.popover.query())
            .finish()
    }
}

impl Select {
    // ---------------------------------------------------------------------
    // Overlay lifecycle
    // ---------------------------------------------------------------------

    /// Open the panel (no-op when disabled or already open)
    pub fn open(&mut self, trigger_rect: Rect, viewport: Viewport) -> Option<FrameRequest> {
        self.popover.open(trigger_rect, viewport)
    }

    /// Trigger click
    pub fn toggle(&mut self, trigger_rect: Rect, viewport: Viewport) -> Option<FrameRequest> {
        self.popover.toggle(trigger_rect, viewport)
    }

    pub fn close(&mut self) -> bool {
        self.popover.close()
    }

    /// Answer a frame request with the panel's laid-out size
    pub fn on_frame(
        &mut self,
        request: FrameRequest,
        measured: Size,
        trigger_rect: Rect,
        viewport: Viewport,
    ) -> FrameOutcome {
        self.popover.on_frame(request, measured, trigger_rect, viewport)
    }

    /// Re-place a visible panel after the trigger moved
    pub fn reposition(&mut self, trigger_rect: Rect, viewport: Viewport) -> RepositionOutcome {
        self.popover.reposition(trigger_rect, viewport)
    }

    /// Route an input event
    ///
    /// Dismissal rules run first. While the panel stays open, arrow keys move
    /// the highlight, Enter commits the highlighted option, and typed
    /// characters edit the search. Returns the reason if the panel closed.
    pub fn handle_event(&mut self, event: &InputEvent) -> Option<DismissReason> {
        if let Some(reason) = self.popover.handle_event(event) {
            return Some(reason);
        }
        if !self.popover.is_open() {
            return None;
        }
        let InputEvent::KeyDown { key } = event else {
            return None;
        };
        match key {
            Key::ArrowDown | Key::ArrowUp => {
                let len = self.visible_options().0.len();
                self.popover.move_highlight(*key == Key::ArrowDown, len);
                None
            }
            Key::Enter => {
                let highlighted = self.popover.highlight().and_then(|i| {
                    let (visible, _) = self.visible_options();
                    visible.get(i).map(|o| o.value.clone())
                });
                highlighted.map(|value| {
                    self.select(value);
                    DismissReason::Commit
                })
            }
            Key::Character(c) => {
                self.popover.push_query(*c);
                None
            }
            Key::Backspace => {
                self.popover.pop_query();
                None
            }
            Key::Escape | Key::Tab => None,
        }
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

    /// Keep scrolls inside `region` (a scrollable list) from closing the panel
    pub fn exempt_scroll_region(&mut self, region: ElementId) {
        self.popover.exempt_scroll_region(region);
    }

    // ---------------------------------------------------------------------
    // Search
    // ---------------------------------------------------------------------

    pub fn query(&self) -> &str {
        self.popover.query()
    }

    /// Replace the search text (ignored while closed)
    pub fn set_query(&mut self, query: impl Into<String>) -> bool {
        self.popover.set_query(query)
    }

    fn filter(&self) -> OptionFilter {
        OptionFilter {
            search_secondary: self.show_secondary,
        }
    }

    /// Options matching the current search, in option order
    pub fn filtered(&self) -> Vec<&SelectOption> {
        self.filter().apply(self.options.iter(), self.popover.query())
    }

    fn visible_options(&self) -> (Vec<&SelectOption>, usize) {
        let filtered = self.filtered();
        let truncated = truncate(&filtered, self.max_display_options);
        (truncated.visible.to_vec(), truncated.hidden)
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    /// Current value (`""` when nothing is selected)
    pub fn value(&self) -> &str {
        self.selection.value()
    }

    /// The selected option, if the value names a known option
    pub fn selected_option(&self) -> Option<&SelectOption> {
        self.options.get(self.selection.value())
    }

    /// Commit `value`: update, close the panel, fire `on_change`
    pub fn select(&mut self, value: impl Into<String>) {
        let value = value.into();
        tracing::debug!("Select::select - {:?}", value);
        self.selection.select(value);
        self.popover.commit();
        self.emit();
    }

    /// Pick the placeholder row: clears the value and closes the panel
    pub fn select_placeholder(&mut self) {
        self.select(String::new());
    }

    /// Clear the value without opening or closing the panel
    pub fn clear(&mut self) {
        tracing::debug!("Select::clear");
        self.selection.clear();
        self.emit();
    }

    /// Apply the caller's current value
    ///
    /// Overwrites the internal value whenever it differs from the last one
    /// passed in, even if the user changed the selection in between.
    pub fn set_default_value(&mut self, value: impl AsRef<str>) -> bool {
        let changed = self.selection.sync_external(value.as_ref());
        if changed {
            tracing::trace!("Select::set_default_value - synced {:?}", value.as_ref());
        }
        changed
    }

    /// Replace the option list (selection is kept even if it no longer matches)
    pub fn set_options(&mut self, options: impl IntoIterator<Item = SelectOption>) -> Result<()> {
        self.options = OptionList::new(options)?;
        self.popover.reset_highlight();
        Ok(())
    }

    pub fn options(&self) -> &OptionList {
        &self.options
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        self.popover.set_disabled(disabled);
    }

    pub fn is_disabled(&self) -> bool {
        self.popover.is_disabled()
    }

    fn emit(&self) {
        if let Some(callback) = &self.on_change {
            callback(self.selection.value());
        }
    }

    // ---------------------------------------------------------------------
    // Views
    // ---------------------------------------------------------------------

    /// What the closed-state control shows
    pub fn trigger_view(&self) -> TriggerView {
        let selected = self.selected_option();
        let (label, is_placeholder) = match selected {
            Some(option) => (option.label.clone(), false),
            None => (self.placeholder.clone(), true),
        };
        let secondary = if self.show_secondary {
            selected.and_then(|o| o.secondary.clone())
        } else {
            None
        };

        TriggerView {
            label,
            secondary,
            is_placeholder,
            show_clear: !self.selection.is_empty() && !self.is_disabled(),
            chevron: if self.is_open() {
                Chevron::Up
            } else {
                Chevron::Down
            },
            disabled: self.is_disabled(),
            tags: Vec::new(),
            overflow: 0,
        }
    }

    /// Rows of the open panel (None while closed)
    pub fn panel_view(&self) -> Option<PanelView> {
        if !self.is_open() {
            return None;
        }
        let query = self.popover.query();
        let value = self.selection.value();
        let highlight = self.popover.highlight();
        let mut rows = Vec::new();

        if query.is_empty() {
            rows.push(PanelRow::Placeholder {
                label: self.placeholder.clone(),
                selected: value.is_empty(),
            });
        }

        let (visible, hidden) = self.visible_options();
        if visible.is_empty() && hidden == 0 {
            rows.push(PanelRow::Empty {
                label: self.empty_label.clone(),
            });
        }
        for (i, option) in visible.iter().enumerate() {
            rows.push(PanelRow::Item {
                value: option.value.clone(),
                label: option.label.clone(),
                secondary: if self.show_secondary {
                    option.secondary.clone()
                } else {
                    None
                },
                selected: option.value == value,
                highlighted: highlight == Some(i),
            });
        }
        if hidden > 0 {
            rows.push(PanelRow::MoreResults { count: hidden });
        }

        Some(PanelView {
            geometry: self.popover.geometry(),
            query: query.to_string(),
            rows,
        })
    }
}

/// Start building a select
pub fn select() -> SelectBuilder {
    SelectBuilder::new()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tether_overlay::overlay_layer;

    const RECT: Rect = Rect::new(40.0, 40.0, 260.0, 36.0);
    const VIEWPORT: Viewport = Viewport::new(1280.0, 720.0);

    fn build(builder: SelectBuilder) -> Select {
        let layer = overlay_layer();
        let trigger = layer.borrow_mut().document_mut().insert_root();
        builder.build(layer, trigger).unwrap()
    }

    fn open(select: &mut Select) {
        let frame = select.open(RECT, VIEWPORT).unwrap();
        select.on_frame(frame, Size::new(260.0, 200.0), RECT, VIEWPORT);
    }

    #[test]
    fn test_select_round_trip() {
        let changes = Rc::new(RefCell::new(Vec::new()));
        let sink = changes.clone();
        let mut s = build(
            SelectBuilder::new()
                .option("A", "Alpha")
                .option("B", "Beta")
                .on_change(move |v| sink.borrow_mut().push(v.to_string())),
        );

        open(&mut s);
        s.select("A");
        assert_eq!(s.value(), "A");
        assert!(!s.is_open());

        s.clear();
        assert_eq!(s.value(), "");
        assert!(!s.is_open());

        open(&mut s);
        assert!(s.is_open());
        assert_eq!(*changes.borrow(), vec!["A".to_string(), String::new()]);
    }

    #[test]
    fn test_clear_while_open_keeps_panel_open() {
        let mut s = build(SelectBuilder::new().option("A", "Alpha").default_value("A"));
        open(&mut s);
        s.clear();
        assert!(s.is_open());
        assert_eq!(s.value(), "");
    }

    #[test]
    fn test_placeholder_row_clears() {
        let mut s = build(SelectBuilder::new().option("A", "Alpha").default_value("A"));
        open(&mut s);
        s.select_placeholder();
        assert_eq!(s.value(), "");
        assert!(s.trigger_view().is_placeholder);
    }

    #[test]
    fn test_panel_rows() {
        let mut s = build(
            SelectBuilder::new()
                .placeholder("Pick one")
                .options((0..15).map(|i| SelectOption::new(i.to_string(), format!("Item {}", i))))
                .default_value("3"),
        );
        assert!(s.panel_view().is_none());
        open(&mut s);

        let view = s.panel_view().unwrap();
        assert!(view.geometry.visible);
        assert_eq!(
            view.rows[0],
            PanelRow::Placeholder {
                label: "Pick one".to_string(),
                selected: false
            }
        );
        assert_eq!(view.option_values().len(), 10);
        assert_eq!(view.more_results(), Some(5));
        assert!(view.rows.iter().any(|r| matches!(
            r,
            PanelRow::Item { value, selected: true, .. } if value == "3"
        )));

        s.set_query("item 1");
        let view = s.panel_view().unwrap();
        // "Item 1", "Item 10".."Item 14"; placeholder hidden while searching
        assert_eq!(view.option_values(), vec!["1", "10", "11", "12", "13", "14"]);
        assert!(!matches!(view.rows[0], PanelRow::Placeholder { .. }));
        assert_eq!(view.more_results(), None);

        s.set_query("nothing");
        let view = s.panel_view().unwrap();
        assert!(matches!(view.rows[0], PanelRow::Empty { .. }));
    }

    #[test]
    fn test_zero_cap_hides_matches_without_empty_row() {
        let mut s = build(
            SelectBuilder::new()
                .option("1", "Toán")
                .option("2", "Lý")
                .max_display_options(0),
        );
        open(&mut s);
        let view = s.panel_view().unwrap();
        assert!(view.option_values().is_empty());
        assert_eq!(view.more_results(), Some(2));
        assert!(!view.rows.iter().any(|r| matches!(r, PanelRow::Empty { .. })));

        s.set_query("nothing");
        let view = s.panel_view().unwrap();
        assert!(matches!(view.rows[0], PanelRow::Empty { .. }));
        assert_eq!(view.more_results(), None);
    }

    #[test]
    fn test_secondary_only_when_enabled() {
        let opts = || {
            vec![
                SelectOption::new("1", "Toán").secondary("MATH101"),
                SelectOption::new("2", "Lý").secondary("PHYS101"),
            ]
        };
        let mut plain = build(SelectBuilder::new().options(opts()));
        open(&mut plain);
        plain.set_query("101");
        assert!(plain.panel_view().unwrap().option_values().is_empty());

        let mut rich = build(SelectBuilder::new().options(opts()).show_secondary(true));
        open(&mut rich);
        rich.set_query("101");
        assert_eq!(rich.panel_view().unwrap().option_values(), vec!["1", "2"]);
        rich.set_query("toán");
        assert_eq!(rich.panel_view().unwrap().option_values(), vec!["1"]);
    }

    #[test]
    fn test_external_sync_overwrites_local_state() {
        let mut s = build(
            SelectBuilder::new()
                .option("A", "Alpha")
                .option("B", "Beta")
                .default_value("A"),
        );
        open(&mut s);
        s.set_query("be");
        assert!(s.set_default_value("B"));
        assert_eq!(s.value(), "B");
        assert!(!s.set_default_value("B"));

        s.select("A");
        assert!(s.set_default_value(""));
        assert_eq!(s.value(), "");
    }

    #[test]
    fn test_dangling_value_falls_back_to_placeholder() {
        let mut s = build(
            SelectBuilder::new()
                .placeholder("None")
                .option("A", "Alpha")
                .default_value("A"),
        );
        s.set_options([SelectOption::new("B", "Beta")]).unwrap();
        assert_eq!(s.value(), "A");
        let trigger = s.trigger_view();
        assert_eq!(trigger.label, "None");
        assert!(trigger.is_placeholder);
        assert!(trigger.show_clear);
    }

    #[test]
    fn test_disabled_select() {
        let mut s = build(SelectBuilder::new().option("A", "Alpha").disabled(true));
        assert!(s.open(RECT, VIEWPORT).is_none());
        assert!(s.trigger_view().disabled);
        assert!(!s.trigger_view().show_clear);
    }

    #[test]
    fn test_keyboard_navigation_commits() {
        let value = Rc::new(RefCell::new(String::new()));
        let sink = value.clone();
        let mut s = build(
            SelectBuilder::new()
                .option("a", "Apple")
                .option("b", "Banana")
                .option("c", "Cherry")
                .on_change(move |v| *sink.borrow_mut() = v.to_string()),
        );
        open(&mut s);
        s.handle_event(&InputEvent::key(Key::Character('a')));
        // "a" matches Apple and Banana
        assert_eq!(s.panel_view().unwrap().option_values(), vec!["a", "b"]);
        s.handle_event(&InputEvent::key(Key::ArrowDown));
        s.handle_event(&InputEvent::key(Key::ArrowDown));
        let reason = s.handle_event(&InputEvent::key(Key::Enter));
        assert_eq!(reason, Some(DismissReason::Commit));
        assert_eq!(s.value(), "b");
        assert_eq!(*value.borrow(), "b");
        assert!(!s.is_open());
    }

    #[test]
    fn test_enter_without_highlight_does_nothing() {
        let mut s = build(SelectBuilder::new().option("a", "Apple"));
        open(&mut s);
        assert_eq!(s.handle_event(&InputEvent::key(Key::Enter)), None);
        assert!(s.is_open());
        assert_eq!(s.value(), "");
    }

    #[test]
    fn test_duplicate_options_fail_to_build() {
        let layer = overlay_layer();
        let trigger = layer.borrow_mut().document_mut().insert_root();
        let result = SelectBuilder::new()
            .option("a", "A")
            .option("a", "B")
            .build(layer, trigger);
        assert!(result.is_err());
    }
}
