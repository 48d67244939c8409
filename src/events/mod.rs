//! Hub events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted by the hub, its forwarding worker and
//! subscriber workers.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Hub` (forward/reconfigure/flush), `ForwardWorker`,
//!   `SubscriberSet` workers (overflow/panic).
//! - **Consumers**: the hub listener (fans out to `SubscriberSet`) and any
//!   receiver obtained from `Hub::subscribe()`.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};

pub(crate) use event::panic_message;
