//! # Preprocessors: filters and transforms applied to routables.
//!
//! - [`Preprocessor`] the trait every rule implements, bound to one [`Phase`]
//! - [`PreprocessorFn`] closure-backed preprocessor
//! - [`FilterPreprocessor`] allow/block predicate filter
//! - [`apply`] runs a chain for one phase over an ordered sequence

mod chain;
mod filter;
mod preprocessor;
mod preprocessor_fn;

pub use chain::apply;
pub(crate) use chain::apply_to_batch;
pub use filter::{Condition, FilterPreprocessor};
pub use preprocessor::{Outcome, Phase, Preprocessor, PreprocessorRef};
pub use preprocessor_fn::PreprocessorFn;
