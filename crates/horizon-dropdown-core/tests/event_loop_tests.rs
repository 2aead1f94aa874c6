//! Integration tests for the event loop's turn and timer semantics.

use std::time::Duration;

use horizon_dropdown_core::{EventLoop, LoopEvent, Signal};
use proptest::prelude::*;

#[test]
fn test_tasks_posted_during_a_turn_run_on_the_next_turn() {
    let event_loop = EventLoop::with_manual_clock();
    let first = event_loop.post_task();
    let mut follow_up = None;
    let mut seen = Vec::new();

    let delivered = event_loop.process_pending(|event| {
        seen.push(event);
        if event == (LoopEvent::Deferred { id: first }) {
            follow_up = Some(event_loop.post_task());
        }
    });

    assert_eq!(delivered, 1);
    assert_eq!(seen, vec![LoopEvent::Deferred { id: first }]);

    let follow_up = follow_up.expect("follow-up task posted");
    assert!(event_loop.is_task_pending(follow_up));
    event_loop.process_pending(|event| seen.push(event));
    assert_eq!(seen.last(), Some(&LoopEvent::Deferred { id: follow_up }));
}

#[test]
fn test_stopping_a_timer_inside_the_handler_prevents_later_fires() {
    let event_loop = EventLoop::with_manual_clock();
    let timer = event_loop.start_repeating_timer(Duration::from_millis(50));
    let mut fires = 0;

    event_loop
        .advance(Duration::from_secs(2), |event| {
            if event == (LoopEvent::Timer { id: timer }) {
                fires += 1;
                if fires == 3 {
                    event_loop.stop_timer(timer).unwrap();
                }
            }
        })
        .unwrap();

    assert_eq!(fires, 3);
    assert!(!event_loop.is_timer_active(timer));
}

#[test]
fn test_cancelled_task_is_never_delivered() {
    let event_loop = EventLoop::with_manual_clock();
    let task = event_loop.post_task();
    assert!(event_loop.cancel_task(task));

    let delivered = event_loop.run_until_idle(|_| panic!("cancelled task delivered"));
    assert_eq!(delivered, 0);
}

#[test]
fn test_signal_forwarded_through_notifier() {
    let event_loop = EventLoop::with_manual_clock();
    let clicked = Signal::<()>::new();
    let notifier = event_loop.notifier();
    let id = notifier.id();

    let forward = notifier.clone();
    clicked.connect(move |_| {
        forward.notify();
    });

    clicked.emit(());
    clicked.emit(());

    let mut notified = 0;
    event_loop.run_until_idle(|event| {
        if event == (LoopEvent::Notified { id }) {
            notified += 1;
        }
    });
    assert_eq!(notified, 2);
}

#[test]
fn test_system_clock_loop_processes_ready_work() {
    let event_loop = EventLoop::new();
    assert!(!event_loop.is_manual());

    let task = event_loop.post_task();
    let mut seen = Vec::new();
    event_loop.process_pending(|event| seen.push(event));
    assert_eq!(seen, vec![LoopEvent::Deferred { id: task }]);
}

proptest! {
    #[test]
    fn test_repeating_timer_fires_once_per_elapsed_interval(
        interval_ms in 1u64..200,
        elapsed_ms in 0u64..5_000,
    ) {
        let event_loop = EventLoop::with_manual_clock();
        let timer = event_loop.start_repeating_timer(Duration::from_millis(interval_ms));
        let mut fires = 0u64;

        event_loop
            .advance(Duration::from_millis(elapsed_ms), |event| {
                if event == (LoopEvent::Timer { id: timer }) {
                    fires += 1;
                }
            })
            .unwrap();

        prop_assert_eq!(fires, elapsed_ms / interval_ms);
    }
}
