//! # Routers: backend sinks fed by the forwarding worker.
//!
//! - [`Router`] start/stop lifecycle plus batch delivery
//! - [`Flushable`] optional drain capability used by `Hub::flush`
//! - [`FlushFailure`] per-router flush error returned as data

mod router;

pub use router::{FlushFailure, Flushable, Router, RouterRef};
