//! Whole-trace reconstruction: snap every hop, then plan each
//! consecutive pair.

use crate::index::InfrastructureIndex;
use crate::planner::{PathPlanner, PlanStats};
use crate::types::{Marker, PathSegment, PlannerConfig, Route, RouteError, TracePoint};

/// Snap every trace point onto the index, producing one marker per hop.
///
/// # Errors
///
/// Returns [`RouteError::NonFiniteLocation`] for a hop with a NaN or
/// infinite coordinate, and [`RouteError::EmptyCandidateSet`] if the
/// index is empty.
pub fn snap_trace(
    index: &InfrastructureIndex,
    trace: &[TracePoint],
) -> Result<Vec<Marker>, RouteError> {
    trace
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let location = index.snap(point.location)?;
            tracing::trace!(hop = i + 1, from = %point.location, to = %location, "snapped hop");
            Ok(Marker {
                ordinal: i + 1,
                label: point.label.clone(),
                location,
            })
        })
        .collect()
}

/// Plan consecutive markers into one segment list.
///
/// # Errors
///
/// Propagates planner errors; see [`PathPlanner::plan`].
pub fn plan_markers(
    index: &InfrastructureIndex,
    markers: &[Marker],
    config: &PlannerConfig,
) -> Result<(Vec<PathSegment>, PlanStats), RouteError> {
    let mut planner = PathPlanner::new(index, config);
    for pair in markers.windows(2) {
        planner.plan(pair[0].location, pair[1].location)?;
    }
    Ok(planner.finish())
}

/// Reconstruct a physical path for a traceroute.
///
/// Zero or one trace points produce markers but no segments.
///
/// # Errors
///
/// Returns [`RouteError::InvalidConfig`] if `config` fails validation,
/// and otherwise propagates snapping and planning errors.
///
/// # Examples
///
/// ```
/// use hoproute_planner::{InfrastructureIndex, Location, PlannerConfig, TracePoint, reconstruct};
///
/// let index = InfrastructureIndex::from_json(
///     r#"{"Lisbon": [38.72, -9.14], "New York": [40.71, -74.0]}"#,
///     r#"[{"name": "West-1", "endpoints": [[38.7, -9.3], [40.5, -73.9]],
///          "geometry": [[38.7, -9.3], [39.5, -40.0], [40.5, -73.9]]}]"#,
/// )
/// .unwrap();
///
/// let trace = [
///     TracePoint::new(Location::new(38.8, -9.0), "lisbon-gw"),
///     TracePoint::new(Location::new(40.6, -74.1), "nyc-edge"),
/// ];
/// let route = reconstruct(&index, &trace, &PlannerConfig::default()).unwrap();
///
/// assert_eq!(route.markers.len(), 2);
/// assert!(route.segments.iter().any(|s| s.is_submarine()));
/// ```
pub fn reconstruct(
    index: &InfrastructureIndex,
    trace: &[TracePoint],
    config: &PlannerConfig,
) -> Result<Route, RouteError> {
    config.validate()?;
    let markers = snap_trace(index, trace)?;
    let (segments, stats) = plan_markers(index, &markers, config)?;
    tracing::debug!(
        hops = markers.len(),
        segments = segments.len(),
        midpoint_splits = stats.midpoint_splits,
        "route reconstructed"
    );
    Ok(Route { markers, segments })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Location;

    fn index() -> InfrastructureIndex {
        InfrastructureIndex::from_json(
            r#"{"A": [0.0, 0.0], "B": [0.0, 30.0], "C": [3.0, 31.0]}"#,
            r#"[{"name": "Span", "endpoints": [[0.0, 1.0], [0.0, 29.0]],
                 "geometry": [[0.0, 1.0], [0.0, 15.0], [0.0, 29.0]]}]"#,
        )
        .unwrap()
    }

    #[test]
    fn empty_trace_is_empty_route() {
        let route = reconstruct(&index(), &[], &PlannerConfig::default()).unwrap();
        assert_eq!(route, Route::default());
    }

    #[test]
    fn single_hop_has_marker_but_no_segments() {
        let trace = [TracePoint::new(Location::new(0.2, -0.1), "gw")];
        let route = reconstruct(&index(), &trace, &PlannerConfig::default()).unwrap();
        assert_eq!(route.markers.len(), 1);
        assert_eq!(route.markers[0].location, Location::new(0.0, 0.0));
        assert!(route.segments.is_empty());
    }

    #[test]
    fn markers_are_snapped_and_numbered() {
        let trace = [
            TracePoint::new(Location::new(0.1, 0.1), "first"),
            TracePoint::new(Location::new(0.0, 29.9), "second"),
            TracePoint::new(Location::new(2.9, 31.2), "third"),
        ];
        let route = reconstruct(&index(), &trace, &PlannerConfig::default()).unwrap();
        let captions: Vec<String> = route.markers.iter().map(Marker::caption).collect();
        assert_eq!(captions, ["(1) first", "(2) second", "(3) third"]);
        assert_eq!(route.markers[1].location, Location::new(0.0, 30.0));
        assert_eq!(route.markers[2].location, Location::new(3.0, 31.0));
    }

    #[test]
    fn segments_chain_through_every_hop() {
        let trace = [
            TracePoint::new(Location::new(0.1, 0.1), "first"),
            TracePoint::new(Location::new(0.0, 29.9), "second"),
            TracePoint::new(Location::new(2.9, 31.2), "third"),
        ];
        let route = reconstruct(&index(), &trace, &PlannerConfig::default()).unwrap();
        assert_eq!(route.segments[0].from(), Location::new(0.0, 0.0));
        assert_eq!(
            route.segments[route.segments.len() - 1].to(),
            Location::new(3.0, 31.0)
        );
        for pair in route.segments.windows(2) {
            assert_eq!(pair[0].to(), pair[1].from());
        }
        assert!(route.segments.iter().any(PathSegment::is_submarine));
    }

    #[test]
    fn invalid_config_is_rejected_before_planning() {
        let config = PlannerConfig {
            break_threshold: f64::NAN,
            ..PlannerConfig::default()
        };
        let result = reconstruct(&index(), &[], &config);
        assert!(matches!(result, Err(RouteError::InvalidConfig(_))));
    }

    #[test]
    fn non_finite_hop_is_an_error() {
        let trace = [
            TracePoint::new(Location::new(0.1, 0.1), "first"),
            TracePoint::new(Location::new(f64::NAN, 0.0), "lost"),
            TracePoint::new(Location::new(0.0, 29.9), "third"),
        ];
        let result = reconstruct(&index(), &trace, &PlannerConfig::default());
        assert!(matches!(result, Err(RouteError::NonFiniteLocation(_))));
    }

    #[test]
    fn repeated_hops_plan_zero_length_legs() {
        let trace = [
            TracePoint::new(Location::new(0.0, 0.0), "a"),
            TracePoint::new(Location::new(0.01, 0.0), "a-again"),
        ];
        let route = reconstruct(&index(), &trace, &PlannerConfig::default()).unwrap();
        assert_eq!(
            route.segments,
            [PathSegment::Ground {
                from: Location::new(0.0, 0.0),
                to: Location::new(0.0, 0.0)
            }]
        );
    }
}
