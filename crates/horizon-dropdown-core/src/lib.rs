//! Core systems for Horizon Dropdown.
//!
//! This crate provides the event-loop primitives the dropdown widget is built
//! on:
//!
//! - **Signal/Slot System**: Type-safe notifications with connection IDs
//! - **Property System**: Values that report whether a write changed them
//! - **Event Loop**: Repeating timers, next-turn tasks and notifiers, driven by
//!   the system clock or a virtual clock for tests
//!
//! Everything is single-threaded in spirit: the loop hands out [`LoopEvent`]s
//! one at a time and the host routes them to whichever widget owns the ID.
//!
//! # Example
//!
//! ```
//! use horizon_dropdown_core::{EventLoop, LoopEvent};
//! use std::time::Duration;
//!
//! let event_loop = EventLoop::with_manual_clock();
//! let backdrop = event_loop.notifier();
//! backdrop.notify();
//!
//! let mut closed = false;
//! event_loop
//!     .advance(Duration::from_millis(16), |event| {
//!         if event == (LoopEvent::Notified { id: backdrop.id() }) {
//!             closed = true;
//!         }
//!     })
//!     .unwrap();
//! assert!(closed);
//! ```

mod error;
mod event;
mod event_loop;
pub mod logging;
pub mod property;
pub mod signal;
mod task;
mod timer;

pub use error::{LoopError, Result};
pub use event::LoopEvent;
pub use event_loop::{EventLoop, Notifier};
pub use property::Property;
pub use signal::{ConnectionGuard, ConnectionId, Signal};
pub use task::{NotifierId, TaskId, TaskQueue};
pub use timer::{TimerId, TimerManager};
