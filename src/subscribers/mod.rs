//! # Event subscribers for the hub.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and built-in implementations for handling events broadcast through the
//! [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Hub / ForwardWorker ── publish(Event) ──► Bus ──► hub listener
//!                                                       │
//!                                                       ▼
//!                                               SubscriberSet::emit
//!                                            ┌──────────┼──────────┐
//!                                            ▼          ▼          ▼
//!                                        LogWriter   Metrics    Custom
//! ```

mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod embedded;

pub use set::SubscriberSet;
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
pub use embedded::LogWriter;
