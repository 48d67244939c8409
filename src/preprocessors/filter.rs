//! # Allow/block filtering preprocessor.
//!
//! [`FilterPreprocessor`] keeps an item only when:
//! - **every** allow condition holds, and
//! - **no** block condition holds.
//!
//! It never replaces items, so it only ever answers `Keep` or `Drop`.
//!
//! ## Example
//! ```rust
//! use eventhub::{Condition, FilterPreprocessor, Outcome, Preprocessor};
//!
//! let is_error: Condition<String> = Box::new(|line: &String| line.starts_with("ERROR"));
//! let only_errors = FilterPreprocessor::allow(vec![is_error]);
//!
//! assert_eq!(only_errors.process(&"ERROR disk".to_string()), Outcome::Keep);
//! assert_eq!(only_errors.process(&"INFO boot".to_string()), Outcome::Drop);
//! ```

use std::fmt;

use crate::core::Routable;

use super::preprocessor::{Outcome, Phase, Preprocessor};

/// Predicate evaluated against a single item.
pub type Condition<T> = Box<dyn Fn(&T) -> bool + Send + Sync>;

/// Preprocessor dropping items by allow/block predicates.
pub struct FilterPreprocessor<T> {
    allow: Vec<Condition<T>>,
    block: Vec<Condition<T>>,
    phase: Phase,
}

impl<T> FilterPreprocessor<T> {
    /// Creates a filter from both condition lists, bound to `phase`.
    pub fn new(allow: Vec<Condition<T>>, block: Vec<Condition<T>>, phase: Phase) -> Self {
        Self {
            allow,
            block,
            phase,
        }
    }

    /// Enqueue-time filter that keeps only items satisfying every condition.
    pub fn allow(conditions: Vec<Condition<T>>) -> Self {
        Self::new(conditions, Vec::new(), Phase::EnqueueTime)
    }

    /// Enqueue-time filter that drops items matching any condition.
    pub fn block(conditions: Vec<Condition<T>>) -> Self {
        Self::new(Vec::new(), conditions, Phase::EnqueueTime)
    }

    /// Rebinds the filter to another phase.
    #[must_use]
    pub fn in_phase(mut self, phase: Phase) -> Self {
        self.phase = phase;
        self
    }

    fn admits(&self, item: &T) -> bool {
        self.allow.iter().all(|cond| cond(item)) && !self.block.iter().any(|cond| cond(item))
    }
}

impl<T: Routable> Preprocessor<T> for FilterPreprocessor<T> {
    fn phase(&self) -> Phase {
        self.phase
    }

    fn process(&self, item: &T) -> Outcome<T> {
        if self.admits(item) {
            Outcome::Keep
        } else {
            Outcome::Drop
        }
    }

    fn name(&self) -> &str {
        "filter"
    }
}

impl<T> fmt::Debug for FilterPreprocessor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterPreprocessor")
            .field("allow", &self.allow.len())
            .field("block", &self.block.len())
            .field("phase", &self.phase)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cond(f: impl Fn(&i32) -> bool + Send + Sync + 'static) -> Condition<i32> {
        Box::new(f)
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let f = FilterPreprocessor::<i32>::new(Vec::new(), Vec::new(), Phase::ForwardTime);
        assert_eq!(f.process(&7), Outcome::Keep);
        assert_eq!(f.phase(), Phase::ForwardTime);
    }

    #[test]
    fn test_all_allow_conditions_must_hold() {
        let f = FilterPreprocessor::allow(vec![cond(|n| *n > 0), cond(|n| n % 2 == 0)]);
        assert_eq!(f.process(&4), Outcome::Keep);
        assert_eq!(f.process(&3), Outcome::Drop);
        assert_eq!(f.process(&-2), Outcome::Drop);
        assert_eq!(f.phase(), Phase::EnqueueTime);
    }

    #[test]
    fn test_any_block_condition_drops() {
        let f = FilterPreprocessor::block(vec![cond(|n| *n == 13), cond(|n| *n < 0)]);
        assert_eq!(f.process(&13), Outcome::Drop);
        assert_eq!(f.process(&-1), Outcome::Drop);
        assert_eq!(f.process(&12), Outcome::Keep);
    }

    #[test]
    fn test_block_wins_over_allow() {
        let f = FilterPreprocessor::new(
            vec![cond(|n| *n > 0)],
            vec![cond(|n| *n > 100)],
            Phase::EnqueueTime,
        )
        .in_phase(Phase::ForwardTime);
        assert_eq!(f.process(&50), Outcome::Keep);
        assert_eq!(f.process(&500), Outcome::Drop);
        assert_eq!(f.phase(), Phase::ForwardTime);
    }
}
