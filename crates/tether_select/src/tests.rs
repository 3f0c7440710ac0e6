//! End-to-end scenarios across overlay, selection and rendering

use std::cell::RefCell;
use std::rc::Rc;

use tether_core::element::ElementId;
use tether_core::events::{InputEvent, Key};
use tether_core::geometry::{Rect, Size, Viewport};
use tether_core::TetherConfig;
use tether_overlay::{overlay_layer, DismissReason, FrameOutcome, OverlayLayer, OverlayPhase};

use crate::prelude::*;
use crate::select::SelectBuilder;
use crate::view::PanelRow;

const VIEWPORT: Viewport = Viewport::new(1280.0, 720.0);

fn courses() -> Vec<SelectOption> {
    vec![
        SelectOption::new("1", "Toán").secondary("MATH101"),
        SelectOption::new("2", "Lý").secondary("PHYS101"),
    ]
}

/// A page with a scrollable sidebar and one trigger per component
struct Page {
    layer: OverlayLayer,
    body: ElementId,
    sidebar: ElementId,
}

impl Page {
    fn new() -> Self {
        let layer = overlay_layer();
        let (body, sidebar) = {
            let mut inner = layer.borrow_mut();
            let doc = inner.document_mut();
            let body = doc.insert_named("body", None);
            let sidebar = doc.insert_named("sidebar", Some(body));
            (body, sidebar)
        };
        Self {
            layer,
            body,
            sidebar,
        }
    }

    fn trigger(&self, name: &str) -> ElementId {
        self.layer
            .borrow_mut()
            .document_mut()
            .insert_named(name, Some(self.body))
    }

    fn row_in(&self, select: &Select) -> ElementId {
        let panel = select.host().panel().unwrap();
        self.layer.borrow_mut().document_mut().insert_child(panel)
    }
}

fn show(select: &mut Select, rect: Rect) {
    let frame = select.open(rect, VIEWPORT).unwrap();
    let outcome = select.on_frame(frame, Size::new(rect.width, 180.0), rect, VIEWPORT);
    assert!(matches!(outcome, FrameOutcome::Revealed(_)));
}

#[test]
fn test_course_scenario() {
    let page = Page::new();
    let trigger = page.trigger("course");
    let mut s = ts::select()
        .options(courses())
        .show_secondary(true)
        .build(page.layer.clone(), trigger)
        .unwrap();
    show(&mut s, Rect::new(20.0, 20.0, 240.0, 36.0));

    s.set_query("101");
    assert_eq!(s.panel_view().unwrap().option_values(), vec!["1", "2"]);
    s.set_query("toán");
    assert_eq!(s.panel_view().unwrap().option_values(), vec!["1"]);
}

#[test]
fn test_panel_appears_only_after_measurement() {
    let page = Page::new();
    let trigger = page.trigger("t");
    let mut s = ts::select()
        .options(courses())
        .build(page.layer.clone(), trigger)
        .unwrap();
    let rect = Rect::new(20.0, 20.0, 240.0, 36.0);

    let frame = s.open(rect, VIEWPORT).unwrap();
    assert_eq!(s.phase(), OverlayPhase::Measuring);
    assert!(!s.geometry().visible);
    assert_eq!(page.layer.borrow().visible_mounts().count(), 0);

    s.on_frame(frame, Size::new(240.0, 120.0), rect, VIEWPORT);
    assert_eq!(s.phase(), OverlayPhase::Visible);
    let g = s.geometry();
    assert!(g.visible);
    assert_eq!(g.top, 56.0 + 4.0);
    assert_eq!(g.left, 20.0);
    assert_eq!(g.width, 240.0);
    assert_eq!(page.layer.borrow().visible_mounts().count(), 1);
}

#[test]
fn test_flip_above_near_bottom() {
    let page = Page::new();
    let trigger = page.trigger("t");
    let mut s = ts::select()
        .options(courses())
        .build(page.layer.clone(), trigger)
        .unwrap();
    let rect = Rect::new(20.0, 640.0, 240.0, 36.0);
    let frame = s.open(rect, VIEWPORT).unwrap();
    s.on_frame(frame, Size::new(240.0, 200.0), rect, VIEWPORT);
    assert_eq!(s.geometry().top, 640.0 - 4.0 - 200.0);
}

#[test]
fn test_rapid_open_is_one_session() {
    let page = Page::new();
    let trigger = page.trigger("t");
    let mut s = ts::select()
        .options(courses())
        .build(page.layer.clone(), trigger)
        .unwrap();
    let rect = Rect::new(20.0, 20.0, 240.0, 36.0);
    let first = s.open(rect, VIEWPORT);
    assert!(first.is_some());
    assert!(s.open(rect, VIEWPORT).is_none());
    assert_eq!(page.layer.borrow().mount_count(), 1);
    assert_eq!(s.host().listener_count(), 4);
}

#[test]
fn test_stale_frame_after_reopen_is_ignored() {
    let page = Page::new();
    let trigger = page.trigger("t");
    let mut s = ts::select()
        .options(courses())
        .build(page.layer.clone(), trigger)
        .unwrap();
    let rect = Rect::new(20.0, 20.0, 240.0, 36.0);

    let old = s.open(rect, VIEWPORT).unwrap();
    s.close();
    let new = s.open(rect, VIEWPORT).unwrap();

    assert_eq!(
        s.on_frame(old, Size::new(240.0, 100.0), rect, VIEWPORT),
        FrameOutcome::Stale
    );
    assert_eq!(s.phase(), OverlayPhase::Measuring);
    assert!(matches!(
        s.on_frame(new, Size::new(240.0, 100.0), rect, VIEWPORT),
        FrameOutcome::Revealed(_)
    ));
}

#[test]
fn test_dismissal_rules_end_to_end() {
    let page = Page::new();
    let trigger = page.trigger("t");
    let mut s = ts::select()
        .options(courses())
        .build(page.layer.clone(), trigger)
        .unwrap();
    let rect = Rect::new(20.0, 20.0, 240.0, 36.0);

    show(&mut s, rect);
    let row = page.row_in(&s);
    assert_eq!(s.handle_event(&InputEvent::pointer_down(row)), None);
    assert_eq!(s.handle_event(&InputEvent::pointer_down(trigger)), None);
    assert_eq!(s.handle_event(&InputEvent::scroll(Some(row))), None);
    assert!(s.is_open());

    assert_eq!(
        s.handle_event(&InputEvent::scroll(Some(page.sidebar))),
        Some(DismissReason::OutsideScroll)
    );
    assert!(!s.is_open());
    assert_eq!(s.host().listener_count(), 0);

    show(&mut s, rect);
    assert_eq!(
        s.handle_event(&InputEvent::pointer_down(page.body)),
        Some(DismissReason::OutsidePointer)
    );

    show(&mut s, rect);
    assert_eq!(
        s.handle_event(&InputEvent::key(Key::Escape)),
        Some(DismissReason::Escape)
    );

    // Closed hosts ignore everything
    assert_eq!(s.handle_event(&InputEvent::key(Key::Escape)), None);
}

#[test]
fn test_scroll_exempt_region() {
    let page = Page::new();
    let trigger = page.trigger("t");
    let mut s = ts::select()
        .options(courses())
        .build(page.layer.clone(), trigger)
        .unwrap();
    show(&mut s, Rect::new(20.0, 20.0, 240.0, 36.0));
    s.exempt_scroll_region(page.sidebar);
    assert_eq!(s.handle_event(&InputEvent::scroll(Some(page.sidebar))), None);
    assert!(s.is_open());
}

#[test]
fn test_instances_are_isolated() {
    let page = Page::new();
    let a_trigger = page.trigger("a");
    let b_trigger = page.trigger("b");
    let mut a = ts::select()
        .options(courses())
        .build(page.layer.clone(), a_trigger)
        .unwrap();
    let mut b = ts::select()
        .options(courses())
        .build(page.layer.clone(), b_trigger)
        .unwrap();

    show(&mut a, Rect::new(20.0, 20.0, 240.0, 36.0));
    show(&mut b, Rect::new(400.0, 20.0, 240.0, 36.0));
    assert_ne!(a.host().panel(), b.host().panel());

    // A click inside A's panel is outside B
    let row = page.row_in(&a);
    let click = InputEvent::pointer_down(row);
    assert_eq!(a.handle_event(&click), None);
    assert_eq!(b.handle_event(&click), Some(DismissReason::OutsidePointer));
    assert!(a.is_open());
    assert!(!b.is_open());

    a.set_query("lý");
    b.open(Rect::new(400.0, 20.0, 240.0, 36.0), VIEWPORT);
    assert_eq!(b.query(), "");
    assert_eq!(a.query(), "lý");
}

#[test]
fn test_trigger_removed_while_open() {
    let page = Page::new();
    let trigger = page.trigger("t");
    let mut s = ts::select()
        .options(courses())
        .build(page.layer.clone(), trigger)
        .unwrap();
    let rect = Rect::new(20.0, 20.0, 240.0, 36.0);
    let frame = s.open(rect, VIEWPORT).unwrap();
    page.layer.borrow_mut().document_mut().remove(trigger);

    assert_eq!(
        s.on_frame(frame, Size::new(240.0, 100.0), rect, VIEWPORT),
        FrameOutcome::Dismissed(DismissReason::AnchorLost)
    );
    assert!(!s.is_open());
    assert_eq!(page.layer.borrow().mount_count(), 0);
}

#[test]
fn test_trigger_removed_before_reposition() {
    let page = Page::new();
    let trigger = page.trigger("t");
    let mut s = ts::select()
        .options(courses())
        .build(page.layer.clone(), trigger)
        .unwrap();
    let rect = Rect::new(20.0, 20.0, 240.0, 36.0);
    show(&mut s, rect);
    s.set_query("lý");
    s.handle_event(&InputEvent::key(Key::ArrowDown));

    let shifted = Rect::new(60.0, 20.0, 240.0, 36.0);
    assert!(matches!(s.reposition(shifted, VIEWPORT), RepositionOutcome::Moved(_)));
    assert_eq!(s.query(), "lý");

    page.layer.borrow_mut().document_mut().remove(trigger);
    assert_eq!(
        s.reposition(shifted, VIEWPORT),
        RepositionOutcome::Dismissed(DismissReason::AnchorLost)
    );
    assert!(!s.is_open());
    assert_eq!(s.query(), "");
    assert_eq!(page.layer.borrow().mount_count(), 0);
    assert_eq!(s.reposition(shifted, VIEWPORT), RepositionOutcome::NotVisible);
}

#[test]
fn test_zero_size_trigger_retries() {
    let page = Page::new();
    let trigger = page.trigger("t");
    let mut s = ts::select()
        .options(courses())
        .build(page.layer.clone(), trigger)
        .unwrap();
    let frame = s.open(Rect::default(), VIEWPORT).unwrap();
    let outcome = s.on_frame(frame, Size::new(240.0, 100.0), Rect::default(), VIEWPORT);
    assert_eq!(outcome, FrameOutcome::Retry(frame));
    assert!(!s.geometry().visible);

    let rect = Rect::new(20.0, 20.0, 240.0, 36.0);
    assert!(matches!(
        s.on_frame(frame, Size::new(240.0, 100.0), rect, VIEWPORT),
        FrameOutcome::Revealed(_)
    ));
}

#[test]
fn test_resize_repositions_without_closing() {
    let page = Page::new();
    let trigger = page.trigger("t");
    let mut s = ts::select()
        .options(courses())
        .build(page.layer.clone(), trigger)
        .unwrap();
    let rect = Rect::new(900.0, 20.0, 300.0, 36.0);
    show(&mut s, rect);
    assert_eq!(s.geometry().left, 900.0);

    let narrow = Viewport::new(1000.0, 720.0);
    assert_eq!(s.handle_event(&InputEvent::Resize { viewport: narrow }), None);
    assert!(s.is_open());
    assert_eq!(s.geometry().left, 1000.0 - 8.0 - 300.0);
}

#[test]
fn test_single_select_round_trip_with_callbacks() {
    let page = Page::new();
    let trigger = page.trigger("t");
    let seen = Rc::new(RefCell::new(Vec::<String>::new()));
    let sink = seen.clone();
    let mut s = SelectBuilder::new()
        .option("A", "Alpha")
        .option("B", "Beta")
        .on_change(move |v| sink.borrow_mut().push(v.to_string()))
        .build(page.layer.clone(), trigger)
        .unwrap();
    let rect = Rect::new(20.0, 20.0, 240.0, 36.0);

    show(&mut s, rect);
    s.select("A");
    assert_eq!(s.value(), "A");
    assert!(!s.is_open());
    assert_eq!(s.trigger_view().label, "Alpha");

    s.clear();
    assert_eq!(s.value(), "");
    assert!(!s.is_open());

    show(&mut s, rect);
    assert!(s.is_open());
    assert_eq!(*seen.borrow(), vec!["A".to_string(), String::new()]);
}

#[test]
fn test_external_sync_beats_unconfirmed_edit() {
    let page = Page::new();
    let trigger = page.trigger("t");
    let mut s = ts::select()
        .options(courses())
        .default_value("1")
        .build(page.layer.clone(), trigger)
        .unwrap();
    show(&mut s, Rect::new(20.0, 20.0, 240.0, 36.0));

    // User typed but did not pick anything
    s.set_query("lý");
    assert!(s.set_default_value("2"));
    assert_eq!(s.value(), "2");
    assert_eq!(s.trigger_view().label, "Lý");
}

#[test]
fn test_multi_select_flow() {
    let page = Page::new();
    let trigger = page.trigger("days");
    let seen = Rc::new(RefCell::new(Vec::<Vec<String>>::new()));
    let sink = seen.clone();
    let mut m = ts::multi_select()
        .option("mon", "Monday")
        .option("tue", "Tuesday")
        .option("wed", "Wednesday")
        .show_select_all(true)
        .on_change(move |v| sink.borrow_mut().push(v.to_vec()))
        .build(page.layer.clone(), trigger)
        .unwrap();
    let rect = Rect::new(20.0, 20.0, 240.0, 36.0);
    let frame = m.open(rect, VIEWPORT).unwrap();
    m.on_frame(frame, Size::new(240.0, 180.0), rect, VIEWPORT);

    m.select_all();
    assert_eq!(m.values(), vec!["mon", "tue", "wed"]);
    assert!(m.is_open());
    m.select_all();
    assert!(m.values().is_empty());

    m.toggle("wed");
    m.toggle("mon");
    let view = m.trigger_view();
    let labels: Vec<_> = view.tags.iter().map(|t| t.label.as_str()).collect();
    assert_eq!(labels, vec!["Wednesday", "Monday"]);
    assert_eq!(view.overflow, 0);

    assert!(m.remove_tag("wed"));
    assert_eq!(m.values(), vec!["mon"]);
    assert_eq!(seen.borrow().len(), 5);
    assert_eq!(seen.borrow().last().unwrap(), &vec!["mon".to_string()]);
}

#[test]
fn test_truncation_with_config() {
    let page = Page::new();
    let trigger = page.trigger("t");
    let config = TetherConfig {
        max_display_options: 5,
        empty_label: "Không có kết quả".to_string(),
        ..TetherConfig::default()
    };
    let mut s = ts::select()
        .options((0..12).map(|i| SelectOption::new(format!("v{}", i), format!("Row {}", i))))
        .config(&config)
        .build(page.layer.clone(), trigger)
        .unwrap();
    show(&mut s, Rect::new(20.0, 20.0, 240.0, 36.0));

    let view = s.panel_view().unwrap();
    assert_eq!(view.option_values().len(), 5);
    assert_eq!(view.more_results(), Some(7));
    assert!(!view.rows.last().unwrap().is_interactive());

    s.set_query("zzz");
    let view = s.panel_view().unwrap();
    assert_eq!(
        view.rows,
        vec![PanelRow::Empty {
            label: "Không có kết quả".to_string()
        }]
    );
}

#[test]
fn test_dropping_component_unmounts_panel() {
    let page = Page::new();
    let trigger = page.trigger("t");
    {
        let mut s = ts::select()
            .options(courses())
            .build(page.layer.clone(), trigger)
            .unwrap();
        show(&mut s, Rect::new(20.0, 20.0, 240.0, 36.0));
        assert_eq!(page.layer.borrow().mount_count(), 1);
    }
    assert_eq!(page.layer.borrow().mount_count(), 0);
}

#[test]
fn test_panel_view_serializes() {
    let page = Page::new();
    let trigger = page.trigger("t");
    let mut s = ts::select()
        .options(courses())
        .placeholder("Course")
        .build(page.layer.clone(), trigger)
        .unwrap();
    show(&mut s, Rect::new(20.0, 20.0, 240.0, 36.0));

    let json = serde_json::to_value(s.panel_view().unwrap()).unwrap();
    assert_eq!(json["rows"][0]["kind"], "placeholder");
    assert_eq!(json["rows"][1]["kind"], "item");
    assert_eq!(json["rows"][1]["label"], "Toán");
    assert_eq!(json["geometry"]["visible"], true);
}
