//! End-to-end dropdown behavior against the headless backends.

use std::sync::Arc;
use std::time::Duration;

use horizon_dropdown::{
    ControlValueAccessor, Dropdown, DropdownConfig, DropdownEvent, DropdownOption,
    HeadlessOverlay, HeadlessSurface, Key, KeyPress, OptionId, OverlayPhase, PanelClass,
    PanelItemKind, Rect, ScrollbarConfig, SelectedValue,
};
use horizon_dropdown_core::EventLoop;
use parking_lot::Mutex;

struct Fixture {
    event_loop: EventLoop,
    surface: HeadlessSurface,
    overlay: HeadlessOverlay,
}

impl Fixture {
    fn new() -> Self {
        let event_loop = EventLoop::with_manual_clock();
        let surface = HeadlessSurface::new(Rect::new(20.0, 40.0, 280.0, 36.0))
            .with_list_viewport(100.0, 20.0);
        let overlay = HeadlessOverlay::new(surface.clone());
        Self {
            event_loop,
            surface,
            overlay,
        }
    }

    fn without_auto_mount(mut self) -> Self {
        self.overlay = self.overlay.with_auto_mount(false);
        self
    }

    fn dropdown(&self) -> Dropdown {
        Dropdown::new(
            self.surface.clone(),
            self.overlay.clone(),
            self.event_loop.clone(),
        )
    }
}

fn ab_options() -> Vec<DropdownOption> {
    vec![DropdownOption::new(1, "A"), DropdownOption::new(2, "B")]
}

fn numbered_options(count: i64) -> Vec<DropdownOption> {
    (1..=count)
        .map(|id| DropdownOption::new(id, format!("Label {id}")))
        .collect()
}

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < 0.01
}

#[test]
fn test_label_follows_catalog_replacement() {
    let fixture = Fixture::new();
    let mut dropdown = fixture
        .dropdown()
        .with_options(ab_options())
        .with_selected(SelectedValue::from(1));
    assert_eq!(dropdown.label().as_deref(), Some("A"));

    dropdown.set_options(vec![DropdownOption::new(2, "B")]);
    assert_eq!(dropdown.label(), None);
    assert_eq!(dropdown.resolved_id(), None);
    assert_eq!(dropdown.display_text(), "Select an option");
}

#[test]
fn test_toggle_on_empty_catalog_is_noop() {
    let fixture = Fixture::new();
    let mut dropdown = fixture.dropdown();

    assert!(!dropdown.toggle());
    assert!(!dropdown.handle_event(DropdownEvent::TriggerClicked));
    assert_eq!(dropdown.overlay_phase(), OverlayPhase::Closed);
    assert_eq!(fixture.overlay.created_count(), 0);
}

#[test]
fn test_select_commits_projected_id_in_order() {
    let fixture = Fixture::new();
    let mut dropdown = fixture.dropdown().with_options(ab_options());
    let log = Arc::new(Mutex::new(Vec::new()));

    let sink = log.clone();
    dropdown.register_on_change(Box::new(move |value| {
        sink.lock().push(format!("change {value:?}"));
    }));
    let sink = log.clone();
    dropdown.selected_changed.connect(move |value| {
        sink.lock().push(format!("emit {value:?}"));
    });

    dropdown.toggle();
    let sink = log.clone();
    dropdown.open_changed.connect(move |open| {
        sink.lock().push(format!("open {open}"));
    });

    let value = dropdown.select_option(Some(&DropdownOption::new(2, "B")));
    let committed = Some(SelectedValue::Id(OptionId::Int(2)));

    assert_eq!(value, committed);
    assert_eq!(
        *log.lock(),
        vec![
            format!("change {committed:?}"),
            format!("emit {committed:?}"),
            "open false".to_string(),
        ]
    );
    assert!(!dropdown.is_open());
    assert_eq!(dropdown.committed_id(), Some(OptionId::Int(2)));
    assert_eq!(dropdown.label().as_deref(), Some("B"));
}

#[test]
fn test_record_projection_round_trip() {
    let fixture = Fixture::new();
    let mut dropdown = fixture
        .dropdown()
        .with_options(numbered_options(15))
        .with_value_fn(|option| SelectedValue::Record(option.clone()));

    dropdown.write_value(Some(SelectedValue::from(2)));
    assert_eq!(dropdown.label().as_deref(), Some("Label 2"));

    dropdown.toggle();
    let value = dropdown.select_item(4).unwrap();
    assert_eq!(
        value,
        Some(SelectedValue::Record(DropdownOption::new(5, "Label 5")))
    );
    assert_eq!(dropdown.label().as_deref(), Some("Label 5"));
}

#[test]
fn test_write_value_does_not_notify() {
    let fixture = Fixture::new();
    let mut dropdown = fixture.dropdown().with_options(ab_options());
    let changes = Arc::new(Mutex::new(0));
    let counter = changes.clone();
    dropdown.register_on_change(Box::new(move |_| *counter.lock() += 1));

    dropdown.write_value(Some(SelectedValue::from(2)));
    dropdown.write_value(None);

    assert_eq!(*changes.lock(), 0);
    assert_eq!(dropdown.label(), None);
}

#[test]
fn test_panel_anchored_below_trigger_with_matching_width() {
    let fixture = Fixture::new();
    let mut dropdown = fixture.dropdown().with_options(ab_options());
    dropdown.toggle();

    let config = fixture.overlay.last_config().unwrap();
    assert_eq!(config.origin.x, 20.0);
    assert_eq!(config.origin.y, 76.0);
    assert_eq!(config.width, 280.0);
    assert!(config.has_backdrop);
    assert_eq!(config.backdrop_class, "transparent-bg");

    let content = fixture.overlay.last_content().unwrap();
    assert_eq!(content.len(), 2);
}

#[test]
fn test_scrollbar_tracks_list_scroll() {
    let fixture = Fixture::new();
    let mut dropdown = fixture.dropdown().with_options(numbered_options(15));

    dropdown.toggle();
    dropdown.advance(Duration::from_millis(50)).unwrap();
    assert_eq!(dropdown.overlay_phase(), OverlayPhase::Open);
    assert!(fixture.surface.has_panel_class(PanelClass::Animated));
    assert!(!fixture.surface.has_panel_class(PanelClass::NoScroll));

    let thumb = fixture.surface.thumb().unwrap();
    assert!(approx(thumb.height, 33.33));
    assert!(approx(thumb.offset, 10.0));

    fixture.surface.scroll_to(100.0);
    dropdown.process_events();

    let thumb = fixture.surface.thumb().unwrap();
    assert!(approx(thumb.height, 33.33));
    assert!(approx(thumb.offset, 43.33));
}

#[test]
fn test_short_list_hides_thumb() {
    let fixture = Fixture::new();
    let mut dropdown = fixture.dropdown().with_options(ab_options());

    dropdown.toggle();
    dropdown.advance(Duration::from_millis(50)).unwrap();

    assert!(fixture.surface.has_panel_class(PanelClass::NoScroll));
    let thumb = fixture.surface.thumb().unwrap();
    assert_eq!(thumb.height, 0.0);
    assert_eq!(thumb.offset, 0.0);
}

#[test]
fn test_catalog_replaced_while_open_refreshes_rows() {
    let fixture = Fixture::new();
    let mut dropdown = fixture.dropdown().with_options(ab_options());
    dropdown.toggle();
    dropdown.advance(Duration::from_millis(50)).unwrap();

    dropdown.set_options(vec![DropdownOption::new(9, "Z"), DropdownOption::new(1, "A")]);

    let content = fixture.overlay.last_content().unwrap();
    assert_eq!(content.items[0].label, "Z");
    assert_eq!(content.items[1].label, "A");
    assert_eq!(fixture.overlay.created_count(), 1);
    assert_eq!(fixture.surface.scroll_listener_count(), 1);

    assert!(dropdown.handle_event(DropdownEvent::ItemClicked(0)));
    assert_eq!(
        dropdown.selected_value(),
        Some(SelectedValue::Id(OptionId::Int(9)))
    );
    assert_eq!(dropdown.label().as_deref(), Some("Z"));
}

#[test]
fn test_selected_row_follows_write_while_open() {
    let fixture = Fixture::new();
    let mut dropdown = fixture
        .dropdown()
        .with_options(ab_options())
        .with_selected(SelectedValue::from(1));
    dropdown.toggle();
    assert!(fixture.overlay.last_content().unwrap().items[0].selected);

    dropdown.write_value(Some(SelectedValue::from(2)));

    let content = fixture.overlay.last_content().unwrap();
    assert!(!content.items[0].selected);
    assert!(content.items[1].selected);
}

#[test]
fn test_clear_entry_added_while_open() {
    let fixture = Fixture::new();
    let mut dropdown = fixture
        .dropdown()
        .with_options(ab_options())
        .with_selected(SelectedValue::from(2));
    dropdown.toggle();

    dropdown.set_optional(true);
    dropdown.set_placeholder("Nothing");

    let content = fixture.overlay.last_content().unwrap();
    assert_eq!(content.len(), 3);
    assert_eq!(content.items[0].kind, PanelItemKind::Clear);
    assert_eq!(content.items[0].label, "Nothing");

    assert!(dropdown.handle_event(DropdownEvent::ItemClicked(0)));
    assert_eq!(dropdown.selected_value(), None);
}

#[test]
fn test_row_events_ignored_unless_open_and_enabled() {
    let fixture = Fixture::new();
    let mut dropdown = fixture.dropdown().with_options(ab_options());
    let changes = Arc::new(Mutex::new(0));
    let counter = changes.clone();
    dropdown.register_on_change(Box::new(move |_| *counter.lock() += 1));

    assert!(!dropdown.handle_event(DropdownEvent::ItemClicked(1)));
    assert_eq!(dropdown.select_item(1), None);

    dropdown.set_disabled_state(true);
    assert!(!dropdown.handle_key(KeyPress::on_item(Key::Enter, 1)));

    dropdown.set_disabled_state(false);
    dropdown.toggle();
    dropdown.set_disabled_state(true);
    assert!(!dropdown.handle_event(DropdownEvent::ItemClicked(0)));
    assert!(dropdown.is_open());

    assert_eq!(*changes.lock(), 0);
    assert_eq!(dropdown.selected_value(), None);
    assert!(!fixture.event_loop.has_pending());
}

#[test]
fn test_scrollbar_padding_updates_while_open() {
    let fixture = Fixture::new();
    let mut dropdown = fixture.dropdown().with_options(numbered_options(15));
    dropdown.toggle();
    dropdown.advance(Duration::from_millis(50)).unwrap();
    assert!(approx(fixture.surface.thumb().unwrap().offset, 10.0));

    dropdown.set_config(DropdownConfig {
        scrollbar: ScrollbarConfig { padding: 4.0 },
        ..DropdownConfig::default()
    });
    assert!(approx(fixture.surface.thumb().unwrap().offset, 4.0));

    fixture.surface.scroll_to(100.0);
    dropdown.process_events();
    assert!(approx(fixture.surface.thumb().unwrap().offset, 37.33));
}

#[test]
fn test_backdrop_click_closes_on_next_turn() {
    let fixture = Fixture::new();
    let mut dropdown = fixture.dropdown().with_options(ab_options());
    dropdown.toggle();

    assert!(fixture.overlay.click_backdrop());
    assert!(dropdown.is_open());

    dropdown.process_events();
    assert!(!dropdown.is_open());
    assert_eq!(fixture.overlay.live_handles(), 0);
    assert_eq!(fixture.overlay.leaked_listeners(), 0);
}

#[test]
fn test_close_releases_scroll_listener() {
    let fixture = Fixture::new();
    let mut dropdown = fixture.dropdown().with_options(numbered_options(15));
    dropdown.toggle();
    dropdown.advance(Duration::from_millis(50)).unwrap();

    let scrolled = fixture.surface_scroll_signal();
    assert_eq!(scrolled.connection_count(), 1);

    dropdown.toggle();
    assert_eq!(scrolled.connection_count(), 0);
    assert_eq!(dropdown.process_events(), 0);
}

#[test]
fn test_reopen_does_not_duplicate_listeners() {
    let fixture = Fixture::new();
    let mut dropdown = fixture.dropdown().with_options(numbered_options(15));

    for _ in 0..3 {
        dropdown.toggle();
        dropdown.advance(Duration::from_millis(50)).unwrap();
        assert_eq!(fixture.surface.scroll_listener_count(), 1);
        assert_eq!(
            fixture.overlay.current_backdrop().unwrap().connection_count(),
            1
        );
        dropdown.toggle();
    }

    assert_eq!(fixture.overlay.created_count(), 3);
    assert_eq!(fixture.overlay.live_handles(), 0);
    assert_eq!(fixture.overlay.leaked_listeners(), 0);
}

#[test]
fn test_mount_timeout_leaves_stalled_overlay() {
    let fixture = Fixture::new().without_auto_mount();
    let mut dropdown = fixture.dropdown().with_options(ab_options());

    dropdown.toggle();
    dropdown.advance(Duration::from_millis(1950)).unwrap();
    assert_eq!(dropdown.overlay_phase(), OverlayPhase::Opening);

    dropdown.advance(Duration::from_millis(50)).unwrap();
    assert_eq!(dropdown.overlay_phase(), OverlayPhase::Stalled);
    assert!(dropdown.is_open());
    assert_eq!(fixture.event_loop.active_timer_count(), 0);
    assert!(!fixture.surface.has_panel_class(PanelClass::Animated));

    assert!(dropdown.toggle());
    assert_eq!(dropdown.overlay_phase(), OverlayPhase::Closed);
    assert_eq!(fixture.overlay.live_handles(), 0);
}

#[test]
fn test_late_mount_within_budget() {
    let fixture = Fixture::new().without_auto_mount();
    let mut dropdown = fixture.dropdown().with_options(ab_options());

    dropdown.toggle();
    dropdown.advance(Duration::from_millis(300)).unwrap();
    fixture.surface.mount_panel(2);
    dropdown.advance(Duration::from_millis(50)).unwrap();

    assert_eq!(dropdown.overlay_phase(), OverlayPhase::Open);
    assert!(fixture.surface.has_panel_class(PanelClass::Animated));
}

#[test]
fn test_drop_while_polling_stops_timer() {
    let fixture = Fixture::new().without_auto_mount();
    let mut dropdown = fixture.dropdown().with_options(ab_options());
    dropdown.toggle();
    dropdown.advance(Duration::from_millis(100)).unwrap();
    assert_eq!(fixture.event_loop.active_timer_count(), 1);

    drop(dropdown);

    assert_eq!(fixture.event_loop.active_timer_count(), 0);
    assert_eq!(fixture.overlay.live_handles(), 0);
    let delivered = fixture
        .event_loop
        .advance(Duration::from_secs(3), |event| panic!("event after teardown: {event:?}"))
        .unwrap();
    assert_eq!(delivered, 0);
}

#[test]
fn test_config_from_toml() {
    let config = DropdownConfig::from_toml_str(
        r#"
        placeholder = "Pick one"
        optional = true
        backdrop_class = "dim"

        [mount_poll]
        interval_ms = 10
        timeout_ms = 30
        "#,
    )
    .unwrap();

    let fixture = Fixture::new().without_auto_mount();
    let mut dropdown = fixture
        .dropdown()
        .with_config(config)
        .with_options(ab_options());
    assert_eq!(dropdown.display_text(), "Pick one");
    assert_eq!(dropdown.panel_items().len(), 3);

    dropdown.toggle();
    assert_eq!(fixture.overlay.last_config().unwrap().backdrop_class, "dim");
    dropdown.advance(Duration::from_millis(30)).unwrap();
    assert_eq!(dropdown.overlay_phase(), OverlayPhase::Stalled);
}

#[test]
fn test_catalog_from_json() {
    let fixture = Fixture::new();
    let options = horizon_dropdown::OptionCatalog::from_json(
        r#"[{"id": 1, "label": "Apple"}, {"id": 2, "label": "Banana"}]"#,
    )
    .unwrap();
    let dropdown = fixture
        .dropdown()
        .with_options(options)
        .with_selected(SelectedValue::from_json("\"2\"").unwrap());

    assert_eq!(dropdown.label().as_deref(), Some("Banana"));
}

impl Fixture {
    fn surface_scroll_signal(&self) -> Arc<horizon_dropdown_core::Signal<()>> {
        use horizon_dropdown::DropdownSurface;
        self.surface.list_scrolled().unwrap()
    }
}
