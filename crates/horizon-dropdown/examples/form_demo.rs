//! A small form with two dropdowns, driven headlessly.
//!
//! Run with `RUST_LOG=horizon_dropdown=debug` to watch the overlay lifecycle.

use std::sync::Arc;
use std::time::Duration;

use horizon_dropdown::{
    CommittedValue, ControlValueAccessor, Dropdown, DropdownEvent, DropdownOption,
    HeadlessOverlay, HeadlessSurface, Key, KeyPress, Rect, SelectedValue,
};
use horizon_dropdown_core::EventLoop;
use parking_lot::Mutex;
use tracing_subscriber::EnvFilter;

/// The host side of a form binding: holds the value and pushes it into the control.
struct FormControl {
    value: Arc<Mutex<CommittedValue>>,
}

impl FormControl {
    fn new(initial: CommittedValue) -> Self {
        Self {
            value: Arc::new(Mutex::new(initial)),
        }
    }

    fn bind(&self, dropdown: &mut Dropdown) {
        dropdown.write_value(self.value.lock().clone());
        let value = self.value.clone();
        dropdown.register_on_change(Box::new(move |committed| {
            *value.lock() = committed.clone();
        }));
        dropdown.register_on_touched(Box::new(|| tracing::info!("control touched")));
    }

    fn value(&self) -> CommittedValue {
        self.value.lock().clone()
    }
}

/// Advance the shared loop, offering every event to each dropdown in turn.
fn pump(
    event_loop: &EventLoop,
    dropdowns: &mut [&mut Dropdown],
    duration: Duration,
) -> horizon_dropdown::Result<usize> {
    let delivered = event_loop.advance(duration, |event| {
        let handled = dropdowns
            .iter_mut()
            .any(|dropdown| dropdown.handle_loop_event(event));
        if !handled {
            tracing::debug!(?event, "loop event without owner");
        }
    })?;
    Ok(delivered)
}

fn long_list() -> Vec<DropdownOption> {
    (1..=15)
        .map(|id| {
            let label = if id == 3 {
                "Looooooooooong looooooooooong label 3".to_string()
            } else {
                format!("Label {id}")
            };
            DropdownOption::new(id, label)
        })
        .collect()
}

fn short_list() -> Vec<DropdownOption> {
    (1..=5)
        .map(|id| DropdownOption::new(id, format!("Label {id}")))
        .collect()
}

fn main() -> horizon_dropdown::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let event_loop = EventLoop::with_manual_clock();

    let first_surface = HeadlessSurface::new(Rect::new(16.0, 16.0, 320.0, 40.0))
        .with_list_viewport(200.0, 32.0);
    let mut first = Dropdown::new(
        first_surface.clone(),
        HeadlessOverlay::new(first_surface.clone()),
        event_loop.clone(),
    )
    .with_options(long_list())
    .with_optional(true)
    .with_value_fn(|option| SelectedValue::Record(option.clone()));

    let second_surface = HeadlessSurface::new(Rect::new(16.0, 80.0, 320.0, 40.0));
    let mut second = Dropdown::new(
        second_surface.clone(),
        HeadlessOverlay::new(second_surface.clone()),
        event_loop.clone(),
    )
    .with_options(short_list())
    .with_placeholder("Pick a number");

    let control1 = FormControl::new(None);
    let control2 = FormControl::new(Some(SelectedValue::from(2)));
    control1.bind(&mut first);
    control2.bind(&mut second);

    first.selected_changed.connect(|value| {
        tracing::info!(?value, "first dropdown committed");
    });

    println!("first:  {}", first.display_text());
    println!("second: {}", second.display_text());

    let frame = Duration::from_millis(50);

    // Pointer interaction on the long list.
    first.handle_event(DropdownEvent::TriggerClicked);
    pump(&event_loop, &mut [&mut first, &mut second], frame)?;
    first_surface.scroll_to(160.0);
    pump(&event_loop, &mut [&mut first, &mut second], frame)?;
    println!("thumb after scroll: {:?}", first_surface.thumb());
    first.handle_event(DropdownEvent::ItemClicked(3));

    // Keyboard interaction on the short list.
    second.handle_key(KeyPress::on_trigger(Key::Enter));
    pump(&event_loop, &mut [&mut first, &mut second], frame)?;
    println!("second panel: {:?}", second.overlay_phase());
    second.handle_key(KeyPress::on_item(Key::ArrowDown, 0));
    second.handle_key(KeyPress::on_item(Key::Enter, 1));
    pump(&event_loop, &mut [&mut first, &mut second], frame)?;

    println!("first:  {} -> {:?}", first.display_text(), control1.value());
    println!("second: {} -> {:?}", second.display_text(), control2.value());

    Ok(())
}
