//! # Applying a preprocessor chain to an ordered sequence.
//!
//! For a given [`Phase`], preprocessors run **in configured order**; each one makes
//! a full pass over the sequence produced by the previous one:
//!
//! ```text
//! items ──► pass(P1) ──► items' ──► pass(P2) ──► items'' ──► ...
//!
//! pass(P):  for item in items:
//!             Keep        → emit item
//!             Drop        → emit nothing
//!             Replace(rs) → emit rs (in order, at the item's position)
//! ```
//!
//! ## Rules
//! - A preprocessor never re-examines items it produced in the same pass.
//! - Later preprocessors **do** see replacement items of earlier ones.
//! - Barrier markers in a batch pass through untouched and keep their position.

use crate::core::{Queueable, Routable};

use super::preprocessor::{Outcome, Phase, Preprocessor, PreprocessorRef};

/// Runs every preprocessor bound to `phase` over `items`.
pub fn apply<T: Routable>(preprocessors: &[PreprocessorRef<T>], phase: Phase, items: Vec<T>) -> Vec<T> {
    bound_to(preprocessors, phase).fold(items, |items, p| pass(p, items, Ok, |event| event))
}

/// Runs every preprocessor bound to `phase` over the events of a dequeued batch.
pub(crate) fn apply_to_batch<T: Routable>(
    preprocessors: &[PreprocessorRef<T>],
    phase: Phase,
    batch: Vec<Queueable<T>>,
) -> Vec<Queueable<T>> {
    bound_to(preprocessors, phase).fold(batch, |batch, p| {
        pass(
            p,
            batch,
            |item| match item {
                Queueable::Event(event) => Ok(event),
                other => Err(other),
            },
            Queueable::Event,
        )
    })
}

fn bound_to<T: Routable>(
    preprocessors: &[PreprocessorRef<T>],
    phase: Phase,
) -> impl Iterator<Item = &dyn Preprocessor<T>> {
    preprocessors
        .iter()
        .filter(move |p| p.phase() == phase)
        .map(|p| p.as_ref())
}

/// One left-to-right pass of a single preprocessor.
///
/// `split` yields the event inside an item (or hands back items that are not
/// events); `wrap` turns kept/replacement events back into items.
fn pass<I, T: Routable>(
    preprocessor: &dyn Preprocessor<T>,
    items: Vec<I>,
    split: impl Fn(I) -> Result<T, I>,
    wrap: impl Fn(T) -> I,
) -> Vec<I> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match split(item) {
            Err(passthrough) => out.push(passthrough),
            Ok(event) => match preprocessor.process(&event) {
                Outcome::Keep => out.push(wrap(event)),
                Outcome::Drop => {}
                Outcome::Replace(replacement) => out.extend(replacement.into_iter().map(&wrap)),
            },
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BarrierSignal;
    use crate::preprocessors::PreprocessorFn;
    use parking_lot::Mutex;
    use std::sync::Arc;

    fn duplicate(phase: Phase) -> PreprocessorRef<String> {
        PreprocessorFn::arc("duplicate", phase, |item: &String| {
            Outcome::Replace(vec![item.clone(), format!("{item}'")])
        })
    }

    struct Recorder {
        seen: Mutex<Vec<String>>,
    }

    impl Preprocessor<String> for Recorder {
        fn phase(&self) -> Phase {
            Phase::EnqueueTime
        }
        fn process(&self, item: &String) -> Outcome<String> {
            self.seen.lock().push(item.clone());
            if item.ends_with('\'') {
                Outcome::Drop
            } else {
                Outcome::Keep
            }
        }
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_no_preprocessors_is_identity() {
        let out = apply::<String>(&[], Phase::EnqueueTime, strings(&["a", "b"]));
        assert_eq!(out, strings(&["a", "b"]));
    }

    #[test]
    fn test_keep_drop_replace() {
        let p: PreprocessorRef<String> =
            PreprocessorFn::arc("mixed", Phase::EnqueueTime, |item: &String| match item.as_str() {
                "drop" => Outcome::Drop,
                "split" => Outcome::replace(["x".to_string(), "y".to_string()]),
                "empty" => Outcome::Replace(Vec::new()),
                _ => Outcome::Keep,
            });
        let out = apply(
            &[p],
            Phase::EnqueueTime,
            strings(&["a", "drop", "split", "empty", "b"]),
        );
        assert_eq!(out, strings(&["a", "x", "y", "b"]));
    }

    #[test]
    fn test_same_preprocessor_skips_its_own_replacements() {
        let out = apply(&[duplicate(Phase::EnqueueTime)], Phase::EnqueueTime, strings(&["a", "b"]));
        assert_eq!(out, strings(&["a", "a'", "b", "b'"]));
    }

    #[test]
    fn test_later_preprocessor_sees_replacements() {
        let recorder = Arc::new(Recorder {
            seen: Mutex::new(Vec::new()),
        });
        let chain: Vec<PreprocessorRef<String>> = vec![
            duplicate(Phase::EnqueueTime),
            recorder.clone() as PreprocessorRef<String>,
        ];

        let out = apply(&chain, Phase::EnqueueTime, strings(&["a", "b"]));

        assert_eq!(out, strings(&["a", "b"]));
        assert_eq!(*recorder.seen.lock(), strings(&["a", "a'", "b", "b'"]));
    }

    #[test]
    fn test_other_phase_is_never_invoked() {
        let out = apply(&[duplicate(Phase::ForwardTime)], Phase::EnqueueTime, strings(&["a"]));
        assert_eq!(out, strings(&["a"]));
    }

    #[test]
    fn test_barriers_keep_their_position() {
        let (barrier, _released) = BarrierSignal::new();
        let batch = vec![
            Queueable::Event("a".to_string()),
            Queueable::Barrier(barrier),
            Queueable::Event("b".to_string()),
        ];

        let out = apply_to_batch(&[duplicate(Phase::ForwardTime)], Phase::ForwardTime, batch);

        let shape: Vec<String> = out
            .iter()
            .map(|q| match q {
                Queueable::Event(e) => e.clone(),
                Queueable::Barrier(_) => "|".to_string(),
            })
            .collect();
        assert_eq!(shape, strings(&["a", "a'", "|", "b", "b'"]));
    }
}
