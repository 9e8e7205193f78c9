//! Cable cost estimation: which submarine cable bridges two locations
//! most cheaply.
//!
//! For a cable, the entry cost is the distance from the start to the
//! cable's nearest landing. Each landing is then tried as the exit: the
//! exit cost is the distance from that landing to the end, plus half the
//! absolute difference between entry and exit costs. The penalty term
//! discourages cables whose entry and exit legs are badly lopsided,
//! a rough stand-in for "this cable does not run between these areas".

use std::sync::Arc;

use crate::catalog::SubmarineCable;
use crate::index::InfrastructureIndex;
use crate::nearest::nearest;
use crate::types::{Location, RouteError};

/// The cheapest cable found by [`cheapest_cable`] and its cost.
#[derive(Debug, Clone, PartialEq)]
pub struct CableEstimate {
    /// Entry + exit + asymmetry penalty, in raw coordinate units.
    pub cost: f64,
    /// The cable achieving that cost.
    pub cable: Arc<SubmarineCable>,
}

/// Cost of riding a cable given entry and exit leg lengths.
#[must_use]
pub fn crossing_cost(entry_distance: f64, exit_distance: f64) -> f64 {
    0.5f64.mul_add(
        (entry_distance - exit_distance).abs(),
        entry_distance + exit_distance,
    )
}

/// Find the cable with the lowest crossing cost from `start` to `end`.
///
/// Returns `Ok(None)` only when the index has no usable cables. The
/// result is never filtered against the direct distance; comparing the
/// two is up to the caller. Ties keep the cable seen first.
///
/// # Errors
///
/// Propagates [`RouteError::EmptyCandidateSet`] from the endpoint
/// search, which the index's two-endpoint minimum rules out.
pub fn cheapest_cable(
    start: Location,
    end: Location,
    index: &InfrastructureIndex,
) -> Result<Option<CableEstimate>, RouteError> {
    let mut best: Option<(f64, &Arc<SubmarineCable>)> = None;

    for cable in index.cables() {
        let entry = nearest(start, &cable.endpoints)?;
        let entry_distance = start.distance(entry);

        for &endpoint in &cable.endpoints {
            let cost = crossing_cost(entry_distance, endpoint.distance(end));
            if best.is_none_or(|(best_cost, _)| cost < best_cost) {
                best = Some((cost, cable));
            }
        }
    }

    Ok(best.map(|(cost, cable)| CableEstimate {
        cost,
        cable: Arc::clone(cable),
    }))
}
