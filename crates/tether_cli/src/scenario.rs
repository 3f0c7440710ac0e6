//! Scenario files
//!
//! A scenario describes one select or multi-select, where its trigger sits,
//! and a list of user steps to replay against it:
//!
//! ```toml
//! kind = "select"
//! show_secondary = true
//! default = "1"
//! trigger = [40.0, 40.0, 260.0, 36.0]
//!
//! [[options]]
//! value = "1"
//! label = "Toán"
//! secondary = "MATH101"
//!
//! [[steps]]
//! action = "open"
//!
//! [[steps]]
//! action = "frame"
//!
//! [[steps]]
//! action = "type"
//! text = "101"
//! ```

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tether_core::element::ElementId;
use tether_core::events::{InputEvent, Key};
use tether_core::geometry::{Rect, Size, Viewport};
use tether_core::TetherConfig;
use tether_overlay::{
    overlay_layer, FrameOutcome, FrameRequest, OverlayLayer, RepositionOutcome,
};
use tether_select::{
    MultiSelect, MultiSelectBuilder, PanelView, Select, SelectBuilder, SelectOption, TriggerView,
};

/// Which component a scenario drives
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    #[default]
    Select,
    Multi,
}

/// Initial controlled value: a string for select, a list for multi
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    One(String),
    Many(Vec<String>),
}

impl DefaultValue {
    fn one(&self) -> String {
        match self {
            DefaultValue::One(v) => v.clone(),
            DefaultValue::Many(vs) => vs.first().cloned().unwrap_or_default(),
        }
    }

    fn many(&self) -> Vec<String> {
        match self {
            DefaultValue::One(v) if v.is_empty() => Vec::new(),
            DefaultValue::One(v) => vec![v.clone()],
            DefaultValue::Many(vs) => vs.clone(),
        }
    }
}

/// One replayed user or host action
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    /// Click the trigger while closed
    Open,
    /// Answer the pending layout pass (defaults to the scenario's panel size)
    Frame { size: Option<[f32; 2]> },
    /// Replace the search text
    Type { text: String },
    /// Click an option row (`""` picks the placeholder row)
    Pick { value: String },
    /// Multi-select: toggle a value
    Toggle { value: String },
    SelectAll,
    RemoveTag { value: String },
    Clear,
    /// Press a key ("escape", "enter", "down", "a")
    Key { key: String },
    ClickOutside,
    ClickInside,
    ScrollOutside,
    ScrollInside,
    Resize { viewport: [f32; 2] },
    /// Trigger moved (layout shift); re-places a visible panel
    Move { trigger: [f32; 4] },
    /// The caller passed a new controlled value
    SetDefault { value: DefaultValue },
}

/// A scenario file
#[derive(Clone, Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    #[serde(default)]
    pub kind: ComponentKind,
    #[serde(default)]
    pub placeholder: Option<String>,
    #[serde(default)]
    pub show_secondary: bool,
    #[serde(default)]
    pub show_select_all: bool,
    #[serde(default)]
    pub max_display_tags: Option<usize>,
    #[serde(default)]
    pub default: Option<DefaultValue>,
    #[serde(default = "default_viewport")]
    pub viewport: [f32; 2],
    #[serde(default = "default_trigger")]
    pub trigger: [f32; 4],
    #[serde(default = "default_panel_size")]
    pub panel_size: [f32; 2],
    #[serde(default)]
    pub options: Vec<SelectOption>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

fn default_viewport() -> [f32; 2] {
    [1280.0, 720.0]
}

fn default_trigger() -> [f32; 4] {
    [40.0, 40.0, 260.0, 36.0]
}

fn default_panel_size() -> [f32; 2] {
    [260.0, 240.0]
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }
}

/// A value reported through `on_change`
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Change {
    Single(String),
    Multi(Vec<String>),
}

/// What one step did
#[derive(Clone, Debug, Serialize)]
pub struct StepLog {
    pub index: usize,
    pub action: String,
    pub outcome: String,
}

/// Result of replaying a scenario
#[derive(Clone, Debug, Serialize)]
pub struct Report {
    pub steps: Vec<StepLog>,
    pub changes: Vec<Change>,
    pub phase: String,
    pub trigger: TriggerView,
    pub panel: Option<PanelView>,
}

enum Component {
    Single(Select),
    Multi(MultiSelect),
}

/// Replays steps against one component
struct Runner {
    layer: OverlayLayer,
    outside: ElementId,
    component: Component,
    trigger_rect: Rect,
    viewport: Viewport,
    panel_size: Size,
    pending: Option<FrameRequest>,
    changes: Rc<RefCell<Vec<Change>>>,
}

fn rect(r: [f32; 4]) -> Rect {
    Rect::new(r[0], r[1], r[2], r[3])
}

impl Runner {
    fn new(scenario: &Scenario, config: &TetherConfig) -> Result<Self> {
        let layer = overlay_layer();
        let (outside, trigger) = {
            let mut inner = layer.borrow_mut();
            let doc = inner.document_mut();
            let body = doc.insert_named("body", None);
            let outside = doc.insert_named("page-content", Some(body));
            let trigger = doc.insert_named("trigger", Some(body));
            (outside, trigger)
        };
        let changes = Rc::new(RefCell::new(Vec::new()));

        let component = match scenario.kind {
            ComponentKind::Select => {
                let sink = changes.clone();
                let mut builder = SelectBuilder::new()
                    .config(config)
                    .options(scenario.options.clone())
                    .show_secondary(scenario.show_secondary)
                    .on_change(move |v| sink.borrow_mut().push(Change::Single(v.to_string())));
                if let Some(placeholder) = &scenario.placeholder {
                    builder = builder.placeholder(placeholder.clone());
                }
                if let Some(default) = &scenario.default {
                    builder = builder.default_value(default.one());
                }
                Component::Single(builder.build(layer.clone(), trigger)?)
            }
            ComponentKind::Multi => {
                let sink = changes.clone();
                let mut builder = MultiSelectBuilder::new()
                    .config(config)
                    .options(scenario.options.clone())
                    .show_secondary(scenario.show_secondary)
                    .show_select_all(scenario.show_select_all)
                    .on_change(move |v| sink.borrow_mut().push(Change::Multi(v.to_vec())));
                if let Some(placeholder) = &scenario.placeholder {
                    builder = builder.placeholder(placeholder.clone());
                }
                if let Some(max) = scenario.max_display_tags {
                    builder = builder.max_display_tags(max);
                }
                if let Some(default) = &scenario.default {
                    builder = builder.default_values(default.many());
                }
                Component::Multi(builder.build(layer.clone(), trigger)?)
            }
        };

        Ok(Self {
            layer,
            outside,
            component,
            trigger_rect: rect(scenario.trigger),
            viewport: Viewport::new(scenario.viewport[0], scenario.viewport[1]),
            panel_size: Size::new(scenario.panel_size[0], scenario.panel_size[1]),
            pending: None,
            changes,
        })
    }

    fn is_open(&self) -> bool {
        match &self.component {
            Component::Single(s) => s.is_open(),
            Component::Multi(m) => m.is_open(),
        }
    }

    fn dispatch(&mut self, event: InputEvent) -> String {
        let reason = match &mut self.component {
            Component::Single(s) => s.handle_event(&event),
            Component::Multi(m) => m.handle_event(&event),
        };
        match reason {
            Some(reason) => format!("closed ({:?})", reason),
            None if self.is_open() => "open".to_string(),
            None => "ignored".to_string(),
        }
    }

    /// Element inside the open panel, or None while closed
    fn panel_row(&self) -> Option<ElementId> {
        let panel = match &self.component {
            Component::Single(s) => s.host().panel(),
            Component::Multi(m) => m.host().panel(),
        }?;
        Some(self.layer.borrow_mut().document_mut().insert_child(panel))
    }

    fn step(&mut self, step: &Step) -> Result<String> {
        let outcome = match step {
            Step::Open => {
                let request = match &mut self.component {
                    Component::Single(s) => s.open(self.trigger_rect, self.viewport),
                    Component::Multi(m) => m.open(self.trigger_rect, self.viewport),
                };
                match request {
                    Some(request) => {
                        self.pending = Some(request);
                        "measuring".to_string()
                    }
                    None => "no-op".to_string(),
                }
            }
            Step::Frame { size } => {
                let Some(request) = self.pending.take() else {
                    return Ok("no pending frame".to_string());
                };
                let measured = size
                    .map(|[w, h]| Size::new(w, h))
                    .unwrap_or(self.panel_size);
                let outcome = match &mut self.component {
                    Component::Single(s) => {
                        s.on_frame(request, measured, self.trigger_rect, self.viewport)
                    }
                    Component::Multi(m) => {
                        m.on_frame(request, measured, self.trigger_rect, self.viewport)
                    }
                };
                match outcome {
                    FrameOutcome::Revealed(g) => {
                        format!("revealed at ({:.1}, {:.1}) width {:.1}", g.left, g.top, g.width)
                    }
                    FrameOutcome::Retry(request) => {
                        self.pending = Some(request);
                        "retry".to_string()
                    }
                    FrameOutcome::Stale => "stale".to_string(),
                    FrameOutcome::Dismissed(reason) => format!("closed ({:?})", reason),
                }
            }
            Step::Type { text } => {
                let applied = match &mut self.component {
                    Component::Single(s) => s.set_query(text.clone()),
                    Component::Multi(m) => m.set_query(text.clone()),
                };
                if applied {
                    format!("query {:?}", text)
                } else {
                    "ignored (closed)".to_string()
                }
            }
            Step::Pick { value } => match &mut self.component {
                Component::Single(s) if value.is_empty() => {
                    s.select_placeholder();
                    "placeholder".to_string()
                }
                Component::Single(s) => {
                    s.select(value.clone());
                    format!("selected {:?}", value)
                }
                Component::Multi(m) => {
                    m.toggle(value);
                    format!("toggled {:?}", value)
                }
            },
            Step::Toggle { value } => match &mut self.component {
                Component::Multi(m) => {
                    m.toggle(value);
                    format!("toggled {:?}", value)
                }
                Component::Single(_) => anyhow::bail!("toggle needs a multi-select scenario"),
            },
            Step::SelectAll => match &mut self.component {
                Component::Multi(m) => {
                    m.select_all();
                    format!("{} selected", m.values().len())
                }
                Component::Single(_) => anyhow::bail!("select_all needs a multi-select scenario"),
            },
            Step::RemoveTag { value } => match &mut self.component {
                Component::Multi(m) => {
                    if m.remove_tag(value) {
                        format!("removed {:?}", value)
                    } else {
                        "no-op".to_string()
                    }
                }
                Component::Single(_) => anyhow::bail!("remove_tag needs a multi-select scenario"),
            },
            Step::Clear => {
                match &mut self.component {
                    Component::Single(s) => s.clear(),
                    Component::Multi(m) => m.clear(),
                }
                "cleared".to_string()
            }
            Step::Key { key } => {
                let key = Key::from_name(key)
                    .with_context(|| format!("Unknown key '{}'", key))?;
                self.dispatch(InputEvent::key(key))
            }
            Step::ClickOutside => self.dispatch(InputEvent::pointer_down(self.outside)),
            Step::ClickInside => match self.panel_row() {
                Some(row) => self.dispatch(InputEvent::pointer_down(row)),
                None => "ignored".to_string(),
            },
            Step::ScrollOutside => self.dispatch(InputEvent::scroll(Some(self.outside))),
            Step::ScrollInside => match self.panel_row() {
                Some(row) => self.dispatch(InputEvent::scroll(Some(row))),
                None => "ignored".to_string(),
            },
            Step::Resize { viewport } => {
                self.viewport = Viewport::new(viewport[0], viewport[1]);
                self.dispatch(InputEvent::Resize {
                    viewport: self.viewport,
                })
            }
            Step::Move { trigger } => {
                self.trigger_rect = rect(*trigger);
                let outcome = match &mut self.component {
                    Component::Single(s) => s.reposition(self.trigger_rect, self.viewport),
                    Component::Multi(m) => m.reposition(self.trigger_rect, self.viewport),
                };
                match outcome {
                    RepositionOutcome::Moved(g) => {
                        format!("moved to ({:.1}, {:.1})", g.left, g.top)
                    }
                    RepositionOutcome::NotVisible => "not visible".to_string(),
                    RepositionOutcome::Dismissed(reason) => format!("closed ({:?})", reason),
                }
            }
            Step::SetDefault { value } => {
                let synced = match &mut self.component {
                    Component::Single(s) => s.set_default_value(value.one()),
                    Component::Multi(m) => m.set_default_values(&value.many()),
                };
                if synced {
                    "synced".to_string()
                } else {
                    "unchanged".to_string()
                }
            }
        };
        Ok(outcome)
    }

    fn report(self, steps: Vec<StepLog>) -> Report {
        let (phase, trigger, panel) = match &self.component {
            Component::Single(s) => (s.phase(), s.trigger_view(), s.panel_view()),
            Component::Multi(m) => (m.phase(), m.trigger_view(), m.panel_view()),
        };
        let changes = self.changes.borrow().clone();
        Report {
            steps,
            changes,
            phase: format!("{:?}", phase),
            trigger,
            panel,
        }
    }
}

fn action_name(step: &Step) -> &'static str {
    match step {
        Step::Open => "open",
        Step::Frame { .. } => "frame",
        Step::Type { .. } => "type",
        Step::Pick { .. } => "pick",
        Step::Toggle { .. } => "toggle",
        Step::SelectAll => "select_all",
        Step::RemoveTag { .. } => "remove_tag",
        Step::Clear => "clear",
        Step::Key { .. } => "key",
        Step::ClickOutside => "click_outside",
        Step::ClickInside => "click_inside",
        Step::ScrollOutside => "scroll_outside",
        Step::ScrollInside => "scroll_inside",
        Step::Resize { .. } => "resize",
        Step::Move { .. } => "move",
        Step::SetDefault { .. } => "set_default",
    }
}

/// Replay every step of `scenario` and collect the result
pub fn run(scenario: &Scenario, config: &TetherConfig) -> Result<Report> {
    let mut runner = Runner::new(scenario, config)?;
    let mut logs = Vec::with_capacity(scenario.steps.len());

    for (index, step) in scenario.steps.iter().enumerate() {
        let action = action_name(step);
        let outcome = runner
            .step(step)
            .with_context(|| format!("Step {} ({}) failed", index + 1, action))?;
        tracing::debug!("step {} {} -> {}", index + 1, action, outcome);
        logs.push(StepLog {
            index: index + 1,
            action: action.to_string(),
            outcome,
        });
    }

    Ok(runner.report(logs))
}

/// Human-readable rendering of a report
pub fn render_text(report: &Report) -> String {
    use std::fmt::Write;

    let mut out = String::new();
    for log in &report.steps {
        let _ = writeln!(out, "{:>3}. {:<14} {}", log.index, log.action, log.outcome);
    }

    let _ = writeln!(out, "\nchanges:");
    if report.changes.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for change in &report.changes {
        match change {
            Change::Single(v) => {
                let _ = writeln!(out, "  {:?}", v);
            }
            Change::Multi(vs) => {
                let _ = writeln!(out, "  {:?}", vs);
            }
        }
    }

    let t = &report.trigger;
    let _ = writeln!(out, "\ntrigger ({}):", report.phase);
    if t.tags.is_empty() {
        let _ = writeln!(
            out,
            "  {}{}",
            t.label,
            if t.is_placeholder { " (placeholder)" } else { "" }
        );
    } else {
        let tags: Vec<_> = t.tags.iter().map(|tag| tag.label.as_str()).collect();
        let _ = write!(out, "  [{}]", tags.join("] ["));
        if t.overflow > 0 {
            let _ = write!(out, " +{}", t.overflow);
        }
        let _ = writeln!(out);
    }

    if let Some(panel) = &report.panel {
        let g = panel.geometry;
        let _ = writeln!(
            out,
            "\npanel at ({:.1}, {:.1}) width {:.1}{}:",
            g.left,
            g.top,
            g.width,
            if g.visible { "" } else { " (hidden)" }
        );
        for row in &panel.rows {
            let _ = writeln!(out, "  {}", describe_row(row));
        }
    }
    out
}

fn describe_row(row: &tether_select::PanelRow) -> String {
    use tether_select::PanelRow;

    match row {
        PanelRow::Placeholder { label, selected } => {
            format!("{} {}", if *selected { "(*)" } else { "( )" }, label)
        }
        PanelRow::SelectAll { label, checked } => {
            format!("{} {}", if *checked { "[x]" } else { "[ ]" }, label)
        }
        PanelRow::Item {
            label,
            secondary,
            selected,
            highlighted,
            ..
        } => {
            let mut line = format!(
                "{}{} {}",
                if *highlighted { ">" } else { " " },
                if *selected { "[x]" } else { "[ ]" },
                label
            );
            if let Some(secondary) = secondary {
                line.push_str(&format!(" ({})", secondary));
            }
            line
        }
        PanelRow::MoreResults { count } => format!("... {} more results", count),
        PanelRow::Empty { label } => label.clone(),
    }
}
