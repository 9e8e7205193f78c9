//! Route diagnostics: timing and counts for each reconstruction phase.
//!
//! Intended for tuning the break threshold and inspecting how a catalog
//! shapes the reconstructed paths. Time is read through the [`Clock`]
//! trait so the core stays free of platform time sources; callers supply
//! one (the CLI uses `std::time::Instant`).
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::index::InfrastructureIndex;
use crate::route::{plan_markers, snap_trace};
use crate::types::{PathSegment, PlannerConfig, Route, RouteError, TracePoint};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// A monotonic time source.
pub trait Clock {
    /// Opaque instant type.
    type Instant;

    /// The current instant.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Diagnostics collected from a single reconstruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteDiagnostics {
    /// Phase 1: snapping hops onto the index.
    pub snap: PhaseDiagnostics,
    /// Phase 2: planning consecutive pairs.
    pub plan: PhaseDiagnostics,
    /// Total wall-clock duration (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across both phases.
    pub summary: RouteSummary,
}

/// Diagnostics for a single phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseDiagnostics {
    /// Wall-clock duration of this phase (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Phase-specific metrics.
    pub metrics: PhaseMetrics,
}

/// Phase-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PhaseMetrics {
    /// Snapping metrics.
    Snap {
        /// Number of trace points.
        hop_count: usize,
        /// Number of distinct infrastructure locations hit.
        distinct_locations: usize,
        /// Largest distance between a hop and its snapped location.
        max_snap_distance: f64,
        /// Mean distance between a hop and its snapped location.
        mean_snap_distance: f64,
    },
    /// Planning metrics.
    Plan {
        /// Number of consecutive pairs planned.
        pair_count: usize,
        /// Ground segments emitted.
        ground_segments: usize,
        /// Submarine segments emitted.
        submarine_segments: usize,
        /// Ground lines split at an intermediate point.
        midpoint_splits: usize,
        /// Planner dispatches, including one per pair.
        dispatches: usize,
        /// Deepest recursion level reached.
        max_depth: usize,
    },
}

/// High-level summary for a reconstruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteSummary {
    /// Locations in the index.
    pub indexed_locations: usize,
    /// Usable cables in the index.
    pub indexed_cables: usize,
    /// Segments in the final route.
    pub segment_count: usize,
    /// Distinct cable names ridden, sorted.
    pub cables_used: Vec<String>,
}

/// Reconstruct a route and collect diagnostics along the way.
///
/// Produces the same [`Route`] as [`crate::reconstruct`].
///
/// # Errors
///
/// Same as [`crate::reconstruct`].
pub fn reconstruct_with_diagnostics<C: Clock>(
    index: &InfrastructureIndex,
    trace: &[TracePoint],
    config: &PlannerConfig,
    clock: &C,
) -> Result<(Route, RouteDiagnostics), RouteError> {
    config.validate()?;
    let total_start = clock.now();

    let start = clock.now();
    let markers = snap_trace(index, trace)?;
    let snap_duration = clock.elapsed(&start);

    let snap_distances: Vec<f64> = trace
        .iter()
        .zip(&markers)
        .map(|(point, marker)| point.location.distance(marker.location))
        .collect();
    let distinct_locations = markers
        .iter()
        .map(|m| m.location)
        .collect::<std::collections::HashSet<_>>()
        .len();

    let start = clock.now();
    let (segments, stats) = plan_markers(index, &markers, config)?;
    let plan_duration = clock.elapsed(&start);

    let ground_segments = segments.iter().filter(|s| s.is_ground()).count();
    let cables_used: BTreeSet<&str> = segments
        .iter()
        .filter_map(|s| match s {
            PathSegment::Submarine { cable_name, .. } => Some(cable_name.as_str()),
            PathSegment::Ground { .. } => None,
        })
        .collect();

    let diagnostics = RouteDiagnostics {
        snap: PhaseDiagnostics {
            duration: snap_duration,
            metrics: PhaseMetrics::Snap {
                hop_count: trace.len(),
                distinct_locations,
                max_snap_distance: snap_distances.iter().copied().fold(0.0, f64::max),
                mean_snap_distance: mean(&snap_distances),
            },
        },
        plan: PhaseDiagnostics {
            duration: plan_duration,
            metrics: PhaseMetrics::Plan {
                pair_count: markers.len().saturating_sub(1),
                ground_segments,
                submarine_segments: segments.len() - ground_segments,
                midpoint_splits: stats.midpoint_splits,
                dispatches: stats.dispatches,
                max_depth: stats.max_depth,
            },
        },
        total_duration: clock.elapsed(&total_start),
        summary: RouteSummary {
            indexed_locations: index.len(),
            indexed_cables: index.cables().len(),
            segment_count: segments.len(),
            cables_used: cables_used.into_iter().map(str::to_owned).collect(),
        },
    };

    Ok((Route { markers, segments }, diagnostics))
}

impl RouteDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Route Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Index: {} locations, {} cables",
            self.summary.indexed_locations, self.summary.indexed_cables,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<16} {:>10} {:>10}  {}",
            "Phase", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        for (name, diag) in [("Snap", &self.snap), ("Plan", &self.plan)] {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<16} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!("Segments: {}", self.summary.segment_count));
        if self.summary.cables_used.is_empty() {
            lines.push("Cables: none".to_string());
        } else {
            lines.push(format!("Cables: {}", self.summary.cables_used.join(", ")));
        }

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

#[allow(clippy::cast_precision_loss)]
fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Format phase metrics into a compact detail string.
fn format_metrics(metrics: &PhaseMetrics) -> String {
    match metrics {
        PhaseMetrics::Snap {
            hop_count,
            distinct_locations,
            max_snap_distance,
            mean_snap_distance,
        } => format!(
            "{hop_count} hops -> {distinct_locations} locations (snap mean={mean_snap_distance:.3} max={max_snap_distance:.3})",
        ),
        PhaseMetrics::Plan {
            pair_count,
            ground_segments,
            submarine_segments,
            midpoint_splits,
            dispatches,
            max_depth,
        } => format!(
            "{pair_count} pairs, {ground_segments} ground + {submarine_segments} submarine, {midpoint_splits} splits, {dispatches} dispatches (depth {max_depth})",
        ),
    }
}
