//! Nearest-point search by planar distance.
//!
//! A plain linear scan. Ties go to the candidate encountered first, so
//! results depend on candidate order and callers pass candidates in
//! catalog order.

use std::borrow::Borrow;

use crate::types::{Location, RouteError};

/// Return the candidate closest to `target`.
///
/// # Errors
///
/// Returns [`RouteError::EmptyCandidateSet`] if `candidates` yields
/// nothing.
///
/// # Examples
///
/// ```
/// use hoproute_planner::{Location, nearest};
///
/// let candidates = [Location::new(0.0, 0.0), Location::new(5.0, 5.0)];
/// let closest = nearest(Location::new(4.0, 4.5), &candidates).unwrap();
/// assert_eq!(closest, Location::new(5.0, 5.0));
/// ```
pub fn nearest<I>(target: Location, candidates: I) -> Result<Location, RouteError>
where
    I: IntoIterator,
    I::Item: Borrow<Location>,
{
    let mut best: Option<(f64, Location)> = None;

    for candidate in candidates {
        let candidate = *candidate.borrow();
        let distance = candidate.distance(target);
        if best.is_none_or(|(best_distance, _)| distance < best_distance) {
            best = Some((distance, candidate));
        }
    }

    best.map(|(_, location)| location)
        .ok_or(RouteError::EmptyCandidateSet)
}

/// Return the position of the candidate closest to `target`.
///
/// Same tie-breaking as [`nearest`]: the lowest index wins.
///
/// # Errors
///
/// Returns [`RouteError::EmptyCandidateSet`] if `candidates` is empty.
pub fn nearest_index(target: Location, candidates: &[Location]) -> Result<usize, RouteError> {
    let mut best: Option<(f64, usize)> = None;

    for (i, candidate) in candidates.iter().enumerate() {
        let distance = candidate.distance(target);
        if best.is_none_or(|(best_distance, _)| distance < best_distance) {
            best = Some((distance, i));
        }
    }

    best.map(|(_, i)| i).ok_or(RouteError::EmptyCandidateSet)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn grid() -> Vec<Location> {
        let mut points = Vec::new();
        for i in 0..7 {
            for j in 0..5 {
                points.push(Location::new(
                    f64::from(i).mul_add(3.7, -10.0),
                    f64::from(j).mul_add(-2.3, 4.0),
                ));
            }
        }
        points
    }

    #[test]
    fn empty_candidates_fail() {
        let result = nearest(Location::new(0.0, 0.0), std::iter::empty::<Location>());
        assert!(matches!(result, Err(RouteError::EmptyCandidateSet)));
        assert!(matches!(
            nearest_index(Location::new(0.0, 0.0), &[]),
            Err(RouteError::EmptyCandidateSet)
        ));
    }

    #[test]
    fn single_candidate_is_returned() {
        let only = Location::new(12.0, -7.0);
        assert_eq!(nearest(Location::new(-80.0, 100.0), [only]).unwrap(), only);
    }

    #[test]
    fn exact_match_wins() {
        let candidates = grid();
        for &c in &candidates {
            assert_eq!(nearest(c, &candidates).unwrap(), c);
        }
    }

    #[test]
    fn tie_goes_to_first_candidate() {
        let a = Location::new(1.0, 0.0);
        let b = Location::new(-1.0, 0.0);
        let target = Location::new(0.0, 0.0);
        assert_eq!(nearest(target, [a, b]).unwrap(), a);
        assert_eq!(nearest(target, [b, a]).unwrap(), b);
        assert_eq!(nearest_index(target, &[b, a]).unwrap(), 0);
    }

    #[test]
    fn result_is_no_farther_than_any_candidate() {
        let candidates = grid();
        let targets = [
            Location::new(0.3, 0.1),
            Location::new(-9.9, 4.2),
            Location::new(15.5, -6.0),
            Location::new(100.0, 100.0),
            Location::new(-3.14, -1.59),
        ];
        for target in targets {
            let best = nearest(target, &candidates).unwrap();
            assert!(candidates.contains(&best));
            let best_distance = best.distance(target);
            for c in &candidates {
                assert!(best_distance <= c.distance(target));
            }
        }
    }

    #[test]
    fn index_matches_location() {
        let candidates = grid();
        let target = Location::new(2.0, 1.0);
        let i = nearest_index(target, &candidates).unwrap();
        assert_eq!(candidates[i], nearest(target, &candidates).unwrap());
    }
}
