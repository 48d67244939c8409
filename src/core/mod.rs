//! Hub core: queueing, batching and lifecycle.
//!
//! The public API from this module is [`Hub`] with its [`HubConfig`] and the
//! two builders. Everything else is the machinery behind it.
//!
//! Internal modules:
//! - [`queue`]: bounded FIFO of events and flush barriers;
//! - [`worker`]: the single consumer assembling and delivering batches;
//! - [`runner`]: isolation of individual router calls;
//! - [`hub`]: forward, reconfigure and flush;
//! - [`config`], [`builder`]: validated configuration and builders.

mod builder;
mod config;
mod hub;
mod queue;
mod runner;
mod worker;

pub use builder::{HubBuilder, HubConfigBuilder};
pub use config::HubConfig;
pub use hub::{FlushOutcome, Hub};

pub(crate) use queue::{BarrierSignal, Queueable, Released};

/// Marker for payloads the hub can distribute.
///
/// Implemented for every `Send + Sync + 'static` type; the hub never inspects
/// or mutates a routable.
pub trait Routable: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Routable for T {}
