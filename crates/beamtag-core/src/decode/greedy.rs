//! Greedy left-to-right decoding, used when the beam search gives up.

use super::beam::Transition;
use crate::error::{BeamtagError, Result};

/// Pick, at each position, the best candidate admitted after the previous
/// pick.
///
/// Columns must be sorted by descending score and should hold the full
/// distribution: with a validated alphabet the `O` label is always admitted,
/// so a choice exists at every position.
///
/// # Errors
/// `NoAdmissibleLabel` if a column offers nothing the transition admits.
pub fn decode<'c, C, T>(columns: &[&'c [C]], transition: &T) -> Result<Vec<&'c C>>
where
    T: Transition<C>,
{
    let len = columns.len();
    let mut chosen: Vec<&'c C> = Vec::with_capacity(len);

    for (position, column) in columns.iter().enumerate() {
        let is_last = position + 1 == len;
        let previous = chosen.last().copied();
        let pick = column
            .iter()
            .find(|candidate| transition.admits(previous, candidate, is_last))
            .ok_or(BeamtagError::NoAdmissibleLabel { position })?;
        chosen.push(pick);
    }

    Ok(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Odd numbers may only follow even numbers and the sequence must end even.
    struct Parity;

    impl Transition<u32> for Parity {
        fn admits(&self, previous: Option<&u32>, current: &u32, is_last: bool) -> bool {
            let after_even = previous.is_none_or(|p| p % 2 == 0);
            (current % 2 == 0 || after_even) && (!is_last || current % 2 == 0)
        }
    }

    fn run(columns: &[Vec<u32>]) -> Result<Vec<u32>> {
        let slices: Vec<&[u32]> = columns.iter().map(Vec::as_slice).collect();
        decode(&slices, &Parity).map(|picks| picks.into_iter().copied().collect())
    }

    #[test]
    fn test_takes_first_admitted() {
        let columns = vec![vec![1, 2], vec![3, 4], vec![5, 6]];
        // 1 is fine at the start, 3 cannot follow 1, 5 cannot end.
        assert_eq!(run(&columns).unwrap(), [1, 4, 6]);
    }

    #[test]
    fn test_reports_stuck_position() {
        let columns = vec![vec![1], vec![3]];
        assert!(matches!(
            run(&columns),
            Err(BeamtagError::NoAdmissibleLabel { position: 1 })
        ));
    }

    #[test]
    fn test_deterministic() {
        let columns = vec![vec![7, 2, 9], vec![4, 1], vec![3, 8]];
        let first = run(&columns).unwrap();
        for _ in 0..5 {
            assert_eq!(run(&columns).unwrap(), first);
        }
    }

    #[test]
    fn test_empty() {
        assert!(run(&[]).unwrap().is_empty());
    }
}
