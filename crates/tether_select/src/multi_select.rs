//! Multi-select component - searchable multi-value selection with tags
//!
//! Picking a row toggles its value and leaves the panel open. The trigger
//! shows the first few selected labels as removable tags plus a `+N` count
//! for the rest.
//!
//! ```rust
//! use tether_overlay::overlay_layer;
//! use tether_select::multi_select::MultiSelectBuilder;
//!
//! let layer = overlay_layer();
//! let trigger = layer.borrow_mut().document_mut().insert_root();
//!
//! let mut days = MultiSelectBuilder::new()
//!     .option("mon", "Monday")
//!     .option("tue", "Tuesday")
//!     .option("wed", "Wednesday")
//!     .show_select_all(true)
//!     .build(layer, trigger)
//!     .unwrap();
//!
//! days.select_all();
//! assert_eq!(days.values(), vec!["mon", "tue", "wed"]);
//! days.select_all();
//! assert!(days.values().is_empty());
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
use crate::selection::MultiSelection;
use crate::view::{Chevron, PanelRow, PanelView, TagView, TriggerView};

/// Callback fired with the full new selection after every committed change
pub type MultiChangeFn = Rc<dyn Fn(&[String])>;

/// Builder for [`MultiSelect`]
pub struct MultiSelectBuilder {
    options: Vec<SelectOption>,
    placeholder: String,
    default_values: Vec<String>,
    disabled: bool,
    show_secondary: bool,
    show_select_all: bool,
    select_all_label: Option<String>,
    max_display_options: Option<usize>,
    max_display_tags: Option<usize>,
    config: TetherConfig,
    on_change: Option<MultiChangeFn>,
}

impl std::fmt::Debug for MultiSelectBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiSelectBuilder")
            .field("options", &self.options.len())
            .field("default_values", &self.default_values)
            .field("show_select_all", &self.show_select_all)
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}

impl Default for MultiSelectBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MultiSelectBuilder {
    pub fn new() -> Self {
        Self {
            options: Vec::new(),
            placeholder: "Select...".to_string(),
            default_values: Vec::new(),
            disabled: false,
            show_secondary: false,
            show_select_all: false,
            select_all_label: None,
            max_display_options: None,
            max_display_tags: None,
            config: TetherConfig::default(),
            on_change: None,
        }
    }

    pub fn option(mut self, value: impl Into<String>, label: impl Into<String>) -> Self {
        self.options.push(SelectOption::new(value, label));
        self
    }

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

    pub fn options(mut self, options: impl IntoIterator<Item = SelectOption>) -> Self {
        self.options.extend(options);
        self
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// The caller-controlled current values
    pub fn default_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default_values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    pub fn show_secondary(mut self, show: bool) -> Self {
        self.show_secondary = show;
        self
    }

    /// Add a "select all" row at the top of the panel
    pub fn show_select_all(mut self, show: bool) -> Self {
        self.show_select_all = show;
        self
    }

    pub fn select_all_label(mut self, label: impl Into<String>) -> Self {
        self.select_all_label = Some(label.into());
        self
    }

    pub fn max_display_options(mut self, max: usize) -> Self {
        self.max_display_options = Some(max);
        self
    }

    /// Tags shown on the trigger before collapsing into `+N` (default 3)
    pub fn max_display_tags(mut self, max: usize) -> Self {
        self.max_display_tags = Some(max);
        self
    }

    pub fn config(mut self, config: &TetherConfig) -> Self {
        self.config = config.clone();
        self
    }

    pub fn on_change<F>(mut self, callback: F) -> Self
    where
        F: Fn(&[String]) + 'static,
    {
        self.on_change = Some(Rc::new(callback));
        self
    }

    /// Build the multi-select anchored to `trigger`
    pub fn build(self, layer: OverlayLayer, trigger: ElementId) -> Result<MultiSelect> {
        let options = OptionList::new(self.options)?;
        let host = OverlayHost::with_config(layer, trigger, PlacementStyle::Select, &self.config);
        let mut popover = Popover::new(host);
        popover.set_disabled(self.disabled);

        Ok(MultiSelect {
            popover,
            options,
            placeholder: self.placeholder,
            selection: MultiSelection::new(self.default_values),
            show_secondary: self.show_secondary,
            show_select_all: self.show_select_all,
            select_all_label: self
                .select_all_label
                .unwrap_or_else(|| self.config.select_all_label.clone()),
            max_display_options: self
                .max_display_options
                .unwrap_or(self.config.max_display_options),
            max_display_tags: self.max_display_tags.unwrap_or(self.config.max_display_tags),
            empty_label: self.config.empty_label,
            on_change: self.on_change,
        })
    }
}

/// A searchable multi-value select
pub struct MultiSelect {
    popover: Popover,
    options: OptionList,
    placeholder: String,
    selection: MultiSelection,
    show_secondary: bool,
    show_select_all: bool,
    select_all_label: String,
    max_display_options: usize,
    max_display_tags: usize,
    empty_label: String,
    on_change: Option<MultiChangeFn>,
}

impl std::fmt::Debug for MultiSelect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiSelect")
            .field("values", &self.selection.values())
            .field("options", &self.options.len())
            .field("phase", &self.popover.phase())
            .finish()
    }
}

impl MultiSelect {
    pub fn open(&mut self, trigger_rect: Rect, viewport: Viewport) -> Option<FrameRequest> {
        self.popover.open(trigger_rect, viewport)
    }

    pub fn toggle_open(&mut self, trigger_rect: Rect, viewport: Viewport) -> Option<FrameRequest> {
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

    pub fn reposition(&mut self, trigger_rect: Rect, viewport: Viewport) -> RepositionOutcome {
        self.popover.reposition(trigger_rect, viewport)
    }

    /// Route an input event
    ///
    /// Same as the single select, except Enter toggles the highlighted option
    /// and the panel stays open.
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
            }
            Key::Enter => {
                let highlighted = self.popover.highlight().and_then(|i| {
                    let (visible, _) = self.visible_options();
                    visible.get(i).map(|o| o.value.clone())
                });
                if let Some(value) = highlighted {
                    self.toggle(&value);
                }
            }
            Key::Character(c) => {
                self.popover.push_query(*c);
            }
            Key::Backspace => {
                self.popover.pop_query();
            }
            Key::Escape | Key::Tab => {}
        }
        None
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

    pub fn query(&self) -> &str {
        self.popover.query()
    }

    pub fn set_query(&mut self, query: impl Into<String>) -> bool {
        self.popover.set_query(query)
    }

    /// Options matching the current search, in option order
    pub fn filtered(&self) -> Vec<&SelectOption> {
        OptionFilter {
            search_secondary: self.show_secondary,
        }
        .apply(self.options.iter(), self.popover.query())
    }

    fn visible_options(&self) -> (Vec<&SelectOption>, usize) {
        let filtered = self.filtered();
        let truncated = truncate(&filtered, self.max_display_options);
        (truncated.visible.to_vec(), truncated.hidden)
    }

    // ---------------------------------------------------------------------
    // Selection
    // ---------------------------------------------------------------------

    /// Selected values in insertion order
    pub fn values(&self) -> Vec<String> {
        self.selection.values()
    }

    pub fn contains(&self, value: &str) -> bool {
        self.selection.contains(value)
    }

    /// Add `value` if absent, remove it if present; the panel stays open
    pub fn toggle(&mut self, value: &str) {
        let selected = self.selection.toggle(value);
        tracing::debug!("MultiSelect::toggle - {:?} selected={}", value, selected);
        self.emit();
    }

    /// Select every option, or clear if all are already selected
    pub fn select_all(&mut self) {
        self.selection.toggle_all(&self.options);
        tracing::debug!("MultiSelect::select_all - {} selected", self.selection.len());
        self.emit();
    }

    /// Remove a tag from the trigger (no-op if `value` is not selected)
    pub fn remove_tag(&mut self, value: &str) -> bool {
        if !self.selection.contains(value) {
            return false;
        }
        self.toggle(value);
        true
    }

    /// Empty the selection
    pub fn clear(&mut self) {
        tracing::debug!("MultiSelect::clear");
        self.selection.clear();
        self.emit();
    }

    pub fn is_all_selected(&self) -> bool {
        self.selection.is_all_selected(&self.options)
    }

    /// Apply the caller's current values; overwrites local state if they changed
    pub fn set_default_values(&mut self, values: &[String]) -> bool {
        let changed = self.selection.sync_external(values);
        if changed {
            tracing::trace!("MultiSelect::set_default_values - synced {:?}", values);
        }
        changed
    }

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
            let values = self.selection.values();
            callback(&values);
        }
    }

    // ---------------------------------------------------------------------
    // Views
    // ---------------------------------------------------------------------

    /// Closed-state control with tags and the `+N` overflow count
    pub fn trigger_view(&self) -> TriggerView {
        let tags: Vec<TagView> = self
            .selection
            .iter()
            .take(self.max_display_tags)
            .map(|value| TagView {
                value: value.to_string(),
                label: self.options.label_of(value).unwrap_or(value).to_string(),
            })
            .collect();
        let overflow = self.selection.len().saturating_sub(tags.len());
        let is_placeholder = self.selection.is_empty();

        TriggerView {
            label: if is_placeholder {
                self.placeholder.clone()
            } else {
                String::new()
            },
            secondary: None,
            is_placeholder,
            show_clear: !is_placeholder && !self.is_disabled(),
            chevron: if self.is_open() {
                Chevron::Up
            } else {
                Chevron::Down
            },
            disabled: self.is_disabled(),
            tags,
            overflow,
        }
    }

    /// Rows of the open panel (None while closed)
    pub fn panel_view(&self) -> Option<PanelView> {
        if !self.is_open() {
            return None;
        }
        let query = self.popover.query();
        let highlight = self.popover.highlight();
        let mut rows = Vec::new();

        if self.show_select_all && query.is_empty() && !self.options.is_empty() {
            rows.push(PanelRow::SelectAll {
                label: self.select_all_label.clone(),
                checked: self.is_all_selected(),
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
                selected: self.selection.contains(&option.value),
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

/// Start building a multi-select
pub fn multi_select() -> MultiSelectBuilder {
    MultiSelectBuilder::new()
}
