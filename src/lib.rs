//! # eventhub
//!
//! **eventhub** is an in-process event distribution hub for Rust.
//!
//! Producers submit discrete events ("routables"); the hub buffers them in a
//! bounded queue, optionally filters or transforms them, batches them and hands
//! each batch to one or more pluggable sinks ("routers") on a dedicated worker.
//! The active configuration can be swapped at runtime without losing buffered
//! events, and [`Hub::flush`] guarantees that everything forwarded so far has
//! reached the routers before they are asked to drain.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   producer A        producer B        producer C
//!       │                 │                 │
//!       └──── forward ────┼──── forward ────┘
//!                         ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Hub                                                              │
//! │  - EnqueueTime preprocessors (caller's thread)                    │
//! │  - bounded Queue<Queueable> (events + flush barriers)             │
//! │  - current HubConfig (routers, preprocessors, batching)           │
//! │  - Bus (broadcast events)                                         │
//! └──────────────────────────────┬────────────────────────────────────┘
//!                                ▼
//!                    ┌───────────────────────┐
//!                    │     ForwardWorker     │
//!                    │ - batch assembly      │
//!                    │ - ForwardTime preproc │
//!                    │ - barrier release     │
//!                    └───┬───────┬───────┬───┘
//!                        ▼       ▼       ▼
//!                    router1  router2  routerN      (sequential, isolated)
//!
//! every suppressed failure / drop / lifecycle step:
//!   Hub, ForwardWorker ── publish(Event) ──► Bus ──► SubscriberSet ──► Subscribe::on_event
//! ```
//!
//! ### Lifecycle
//! ```text
//! Hub::new() ─────────────► Unconfigured (queue of 1000, no worker)
//!     │  reconfigure(Some(cfg))
//!     ▼
//! Configured ─── forward / flush ───► delivery to cfg.routers
//!     │  reconfigure(Some(cfg2))  → stop cfg routers, start cfg2 routers,
//!     │                             move undelivered events, new worker
//!     │  reconfigure(None)        → stop routers, keep events, no worker
//!     ▼
//! Unconfigured (events retained until the next configuration)
//! ```
//!
//! ## Features
//! | Area               | Description                                                 | Key types / traits                          |
//! |--------------------|-------------------------------------------------------------|---------------------------------------------|
//! | **Hub**            | Forward, reconfigure and flush.                             | [`Hub`], [`HubBuilder`], [`FlushOutcome`]   |
//! | **Configuration**  | Validated, immutable snapshot with a builder.               | [`HubConfig`], [`HubConfigBuilder`]         |
//! | **Routers**        | Pluggable sinks with optional flush capability.             | [`Router`], [`Flushable`], [`FlushFailure`] |
//! | **Preprocessors**  | Filters/transforms bound to enqueue or forward time.        | [`Preprocessor`], [`PreprocessorFn`], [`FilterPreprocessor`] |
//! | **Subscriber API** | Observe lifecycle events and every suppressed failure.      | [`Subscribe`], [`Event`], [`EventKind`]     |
//! | **Errors**         | Typed errors for hub operations, validation and routers.    | [`HubError`], [`ConfigError`], [`RouterError`] |
//!
//! ## Optional features
//! - `logging` (default): exports the built-in [`LogWriter`] rendering events through `tracing`.
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use async_trait::async_trait;
//! use tokio_util::sync::CancellationToken;
//! use eventhub::{FilterPreprocessor, Condition, Hub, HubConfig, Router, RouterError, Subscribe};
//!
//! struct Console;
//!
//! #[async_trait]
//! impl Router<String> for Console {
//!     fn name(&self) -> &str { "console" }
//!
//!     async fn forward(&self, batch: &[String], ctx: CancellationToken) -> Result<(), RouterError> {
//!         for msg in batch {
//!             if ctx.is_cancelled() { return Err(RouterError::Canceled); }
//!             println!("{msg}");
//!         }
//!         Ok(())
//!     }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Build subscribers (optional)
//!     #[cfg(feature = "logging")]
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(eventhub::LogWriter::new())];
//!     #[cfg(not(feature = "logging"))]
//!     let subs: Vec<Arc<dyn Subscribe>> = Vec::new();
//!
//!     let hub = Hub::<String>::builder().with_subscribers(subs).build();
//!
//!     let important: Condition<String> = Box::new(|m: &String| m.starts_with("Important"));
//!     let config = HubConfig::<String>::builder()
//!         .with_router(Arc::new(Console))
//!         .with_preprocessor(Arc::new(FilterPreprocessor::allow(vec![important])))
//!         .with_batch_delay(Duration::from_millis(20))
//!         .build()?;
//!
//!     hub.reconfigure(Some(config), CancellationToken::new()).await?;
//!     hub.forward(["Unimportant message.".to_string(), "Important message.".to_string()]);
//!
//!     let outcome = hub.flush(CancellationToken::new()).await?;
//!     assert!(outcome.failures().is_empty());
//!     Ok(())
//! }
//! ```

mod core;
mod error;
mod events;
mod preprocessors;
mod routers;
mod subscribers;

// ---- Public re-exports ----

pub use core::{FlushOutcome, Hub, HubBuilder, HubConfig, HubConfigBuilder, Routable};
pub use error::{ConfigError, HubError, RouterError};
pub use events::{Bus, Event, EventKind};
pub use preprocessors::{
    Condition, FilterPreprocessor, Outcome, Phase, Preprocessor, PreprocessorFn, PreprocessorRef,
    apply,
};
pub use routers::{FlushFailure, Flushable, Router, RouterRef};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: expose a simple built-in logger subscriber (demo/reference).
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
