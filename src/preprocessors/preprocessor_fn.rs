//! # Function-backed preprocessor (`PreprocessorFn`)
//!
//! [`PreprocessorFn`] wraps a closure `F: Fn(&T) -> Outcome<T>` together with the
//! phase it is bound to. Use it for one-off rules that do not deserve a type.
//!
//! ## Example
//! ```rust
//! use eventhub::{Outcome, Phase, PreprocessorFn, PreprocessorRef};
//!
//! let no_blanks: PreprocessorRef<String> =
//!     PreprocessorFn::arc("no-blanks", Phase::EnqueueTime, |s: &String| {
//!         if s.trim().is_empty() { Outcome::Drop } else { Outcome::Keep }
//!     });
//!
//! assert_eq!(no_blanks.name(), "no-blanks");
//! assert_eq!(no_blanks.process(&"  ".to_string()), Outcome::Drop);
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use crate::core::Routable;

use super::preprocessor::{Outcome, Phase, Preprocessor};

/// Closure-backed preprocessor.
#[derive(Debug)]
pub struct PreprocessorFn<F> {
    name: Cow<'static, str>,
    phase: Phase,
    f: F,
}

impl<F> PreprocessorFn<F> {
    /// Creates a new function-backed preprocessor.
    ///
    /// Prefer [`PreprocessorFn::arc`] when you immediately need a
    /// [`PreprocessorRef`](crate::PreprocessorRef).
    pub fn new(name: impl Into<Cow<'static, str>>, phase: Phase, f: F) -> Self {
        Self {
            name: name.into(),
            phase,
            f,
        }
    }

    /// Creates the preprocessor and returns it as a shared handle.
    pub fn arc(name: impl Into<Cow<'static, str>>, phase: Phase, f: F) -> Arc<Self> {
        Arc::new(Self::new(name, phase, f))
    }
}

impl<T, F> Preprocessor<T> for PreprocessorFn<F>
where
    T: Routable,
    F: Fn(&T) -> Outcome<T> + Send + Sync + 'static,
{
    fn phase(&self) -> Phase {
        self.phase
    }

    fn process(&self, item: &T) -> Outcome<T> {
        (self.f)(item)
    }

    fn name(&self) -> &str {
        &self.name
    }
}
