//! # Constrained Beam Search
//!
//! Position-synchronous beam search over per-position candidate lists.
//!
//! ## Algorithm
//!
//! ```text
//! beam = [empty state]
//! for each position p:
//!     for each state s in beam (best first):
//!         extend s with up to `max_fork_size` admitted candidates of p
//!     keep the `max_beam_size` extensions with the highest mean score
//!     if no extension exists: fail
//! return the best state
//! ```
//!
//! A state's score is the arithmetic mean of its elements' scores. The
//! search is generic over the candidate type and the transition rule, so it
//! knows nothing about labels or tagging schemes.

use tracing::trace;

use crate::config::DecoderConfig;
use crate::scored::Scored;

/// Anything the beam can rank.
pub trait Candidate {
    fn score(&self) -> f64;
}

impl<T> Candidate for Scored<T> {
    fn score(&self) -> f64 {
        self.score
    }
}

/// Decides whether a candidate may extend a partial sequence.
pub trait Transition<C> {
    /// `previous` is `None` at the first position; `is_last` is set for the
    /// final position of the sequence.
    fn admits(&self, previous: Option<&C>, current: &C, is_last: bool) -> bool;
}

/// A complete sequence found by the search.
#[derive(Debug, Clone, PartialEq)]
pub struct BeamPath<'c, C> {
    /// One candidate per position.
    pub elements: Vec<&'c C>,
    /// Mean of the element scores.
    pub score: f64,
}

/// Partial state: the index of the chosen candidate at each position so far.
#[derive(Debug, Clone)]
struct State {
    picks: Vec<usize>,
    total: f64,
}

impl State {
    fn empty(capacity: usize) -> Self {
        Self {
            picks: Vec::with_capacity(capacity),
            total: 0.0,
        }
    }

    fn extend(&self, pick: usize, score: f64) -> Self {
        let mut picks = Vec::with_capacity(self.picks.capacity());
        picks.extend_from_slice(&self.picks);
        picks.push(pick);
        Self {
            picks,
            total: self.total + score,
        }
    }

    fn mean(&self) -> f64 {
        self.total / self.picks.len() as f64
    }
}

/// Beam search with fork, beam and iteration bounds.
#[derive(Debug, Clone, Copy)]
pub struct BeamSearch {
    max_beam_size: Option<usize>,
    max_fork_size: Option<usize>,
    max_iterations: Option<usize>,
}

impl BeamSearch {
    /// Create a search bounded by `config`.
    pub fn new(config: &DecoderConfig) -> Self {
        Self {
            max_beam_size: config.max_beam_size,
            max_fork_size: config.max_fork_size,
            max_iterations: config.max_iterations,
        }
    }

    /// Find the best sequence whose every transition is admitted.
    ///
    /// Each column must be sorted by descending score. Returns `None` when
    /// there are no columns, when there are more columns than the iteration
    /// budget, or when the beam collapses at some position.
    pub fn search<'c, C, T>(&self, columns: &[&'c [C]], transition: &T) -> Option<BeamPath<'c, C>>
    where
        C: Candidate,
        T: Transition<C>,
    {
        let len = columns.len();
        if len == 0 {
            return None;
        }
        if self.max_iterations.is_some_and(|max| len > max) {
            trace!(len, max_iterations = ?self.max_iterations, "sequence exceeds iteration budget");
            return None;
        }

        let fork_size = self.max_fork_size.unwrap_or(usize::MAX);
        let beam_size = self.max_beam_size.unwrap_or(usize::MAX);
        let mut beam = vec![State::empty(len)];

        for (position, column) in columns.iter().enumerate() {
            let is_last = position + 1 == len;
            let mut extended = Vec::new();

            for state in &beam {
                let previous = state.picks.last().map(|&i| &columns[position - 1][i]);
                let forks = column
                    .iter()
                    .enumerate()
                    .filter(|(_, candidate)| transition.admits(previous, candidate, is_last))
                    .take(fork_size);

                for (pick, candidate) in forks {
                    extended.push(state.extend(pick, candidate.score()));
                }
            }

            if extended.is_empty() {
                trace!(position, "beam collapsed");
                return None;
            }

            // Stable: equal means keep the order in which they were generated.
            extended.sort_by(|a, b| b.mean().total_cmp(&a.mean()));
            extended.truncate(beam_size);
            trace!(position, live = extended.len(), best = extended[0].mean(), "beam step");
            beam = extended;
        }

        let best = beam.into_iter().next()?;
        let score = best.mean();
        let elements = best
            .picks
            .iter()
            .zip(columns)
            .map(|(&pick, column)| &column[pick])
            .collect();

        Some(BeamPath { elements, score })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Letters with scores; a letter may not repeat its predecessor, and the
    /// last letter must be a vowel.
    #[derive(Debug, PartialEq)]
    struct Letter(char, f64);

    impl Candidate for Letter {
        fn score(&self) -> f64 {
            self.1
        }
    }

    struct NoRepeatEndsInVowel;

    impl Transition<Letter> for NoRepeatEndsInVowel {
        fn admits(&self, previous: Option<&Letter>, current: &Letter, is_last: bool) -> bool {
            previous.is_none_or(|p| p.0 != current.0) && (!is_last || "aeiou".contains(current.0))
        }
    }

    struct Anything;

    impl Transition<Letter> for Anything {
        fn admits(&self, _: Option<&Letter>, _: &Letter, _: bool) -> bool {
            true
        }
    }

    fn word(path: &BeamPath<'_, Letter>) -> String {
        path.elements.iter().map(|l| l.0).collect()
    }

    fn search(config: DecoderConfig, columns: &[Vec<Letter>]) -> Option<String> {
        let slices: Vec<&[Letter]> = columns.iter().map(Vec::as_slice).collect();
        BeamSearch::new(&config)
            .search(&slices, &NoRepeatEndsInVowel)
            .map(|p| word(&p))
    }

    #[test]
    fn test_unconstrained_picks_argmax() {
        let columns = vec![
            vec![Letter('x', 0.7), Letter('a', 0.3)],
            vec![Letter('y', 0.6), Letter('b', 0.4)],
        ];
        let slices: Vec<&[Letter]> = columns.iter().map(Vec::as_slice).collect();
        let path = BeamSearch::new(&DecoderConfig::default())
            .search(&slices, &Anything)
            .unwrap();
        assert_eq!(word(&path), "xy");
        assert!((path.score - 0.65).abs() < 1e-12);
    }

    #[test]
    fn test_constraints_are_enforced() {
        let columns = vec![
            vec![Letter('a', 0.6), Letter('b', 0.4)],
            vec![Letter('a', 0.9), Letter('e', 0.1)],
        ];
        // "aa" repeats, so the best admitted paths are "ba" (0.65) and "ae" (0.35).
        assert_eq!(search(DecoderConfig::default(), &columns).as_deref(), Some("ba"));
    }

    #[test]
    fn test_collapse_returns_none() {
        let columns = vec![vec![Letter('a', 1.0)], vec![Letter('a', 1.0)]];
        assert_eq!(search(DecoderConfig::default(), &columns), None);
    }

    #[test]
    fn test_iteration_budget() {
        let columns: Vec<Vec<Letter>> = (0..4)
            .map(|i| vec![if i % 2 == 0 { Letter('a', 1.0) } else { Letter('b', 1.0) }])
            .collect();
        let config = DecoderConfig::default().with_max_iterations(Some(3));
        assert_eq!(search(config, &columns), None);
        let config = DecoderConfig::default().with_max_iterations(Some(4));
        assert_eq!(search(config, &columns), None); // ends in 'b', not a vowel
        let config = DecoderConfig::default().with_max_iterations(None);
        assert_eq!(search(config, &columns[..3]).as_deref(), Some("aba"));
    }

    #[test]
    fn test_narrow_beam_can_collapse() {
        // 'a' wins the first position but only 'a' may end the sequence.
        let columns = vec![
            vec![Letter('a', 0.9), Letter('e', 0.1)],
            vec![Letter('a', 1.0)],
        ];
        let narrow = DecoderConfig::default()
            .with_beam_size(Some(1))
            .with_fork_size(Some(1));
        assert_eq!(search(narrow, &columns), None);
        assert_eq!(search(DecoderConfig::default(), &columns).as_deref(), Some("ea"));
    }

    #[test]
    fn test_fork_size_limits_branching() {
        // With one fork per state only the top admitted candidate is tried.
        let columns = vec![
            vec![Letter('b', 0.5), Letter('c', 0.5)],
            vec![Letter('b', 0.9), Letter('a', 0.1)],
        ];
        let single = DecoderConfig::default()
            .with_fork_size(Some(1))
            .with_beam_size(Some(1));
        // Only 'b' survives the first step; 'b' cannot repeat so 'a' follows.
        assert_eq!(search(single, &columns).as_deref(), Some("ba"));
    }

    #[test]
    fn test_ties_prefer_first_generated() {
        let columns = vec![
            vec![Letter('c', 0.5), Letter('d', 0.5)],
            vec![Letter('a', 1.0)],
        ];
        assert_eq!(search(DecoderConfig::default(), &columns).as_deref(), Some("ca"));
    }

    #[test]
    fn test_wider_beam_never_scores_lower() {
        let columns = vec![
            vec![Letter('a', 0.5), Letter('b', 0.3), Letter('c', 0.2)],
            vec![Letter('a', 0.6), Letter('c', 0.3), Letter('e', 0.1)],
            vec![Letter('e', 0.5), Letter('c', 0.3), Letter('a', 0.2)],
            vec![Letter('e', 0.7), Letter('b', 0.2), Letter('o', 0.1)],
        ];
        let slices: Vec<&[Letter]> = columns.iter().map(Vec::as_slice).collect();
        let mut last = f64::NEG_INFINITY;
        for size in 1..=3 {
            let config = DecoderConfig::default()
                .with_beam_size(Some(size))
                .with_fork_size(Some(size));
            let path = BeamSearch::new(&config)
                .search(&slices, &NoRepeatEndsInVowel)
                .unwrap();
            assert!(path.score >= last);
            last = path.score;
        }
    }

    #[test]
    fn test_empty_input() {
        let columns: Vec<Vec<Letter>> = Vec::new();
        assert_eq!(search(DecoderConfig::default(), &columns), None);
    }
}
