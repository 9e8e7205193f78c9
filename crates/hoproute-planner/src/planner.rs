//! Path planning between two snapped infrastructure points.
//!
//! The planner dispatches on the kind of each endpoint:
//!
//! | start      | end        | strategy                                             |
//! |------------|------------|------------------------------------------------------|
//! | ground     | ground     | ride the cheapest cable if it beats the direct line  |
//! | submarine  | submarine  | same cable, or hop cables, or bridge over ground     |
//! | ground     | submarine  | reach the end cable's nearest landing, then ride it  |
//! | submarine  | ground     | ride towards the end while the cable gets closer     |
//!
//! Ground lines longer than [`PlannerConfig::break_threshold`] are split
//! at the infrastructure nearest their midpoint and both halves are
//! planned again from scratch. When no intermediate point exists the
//! line is drawn as is.
//!
//! Every re-plan goes one level deeper; exceeding
//! [`PlannerConfig::max_depth`] is reported as
//! [`RouteError::InvariantViolation`] rather than recursing forever on
//! catalog data that defeats convergence.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::catalog::SubmarineCable;
use crate::cost::cheapest_cable;
use crate::index::{InfrastructureIndex, InfrastructurePoint};
use crate::nearest::nearest;
use crate::types::{Location, PathSegment, PlannerConfig, RouteError};

/// Recursion statistics gathered while planning.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanStats {
    /// Number of dispatches, including the top-level ones.
    pub dispatches: usize,
    /// Number of ground lines split at an intermediate point.
    pub midpoint_splits: usize,
    /// Deepest recursion level reached.
    pub max_depth: usize,
}

/// Accumulates segments for one or more consecutive point pairs.
pub struct PathPlanner<'a> {
    index: &'a InfrastructureIndex,
    config: &'a PlannerConfig,
    segments: Vec<PathSegment>,
    stats: PlanStats,
}

impl<'a> PathPlanner<'a> {
    /// Create a planner over `index`.
    #[must_use]
    pub const fn new(index: &'a InfrastructureIndex, config: &'a PlannerConfig) -> Self {
        Self {
            index,
            config,
            segments: Vec::new(),
            stats: PlanStats {
                dispatches: 0,
                midpoint_splits: 0,
                max_depth: 0,
            },
        }
    }

    /// Plan from `start` to `end`, appending segments.
    ///
    /// Both locations must already be snapped onto the index.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidConfig`] if the configuration fails
    /// [`PlannerConfig::validate`], and [`RouteError::InvariantViolation`]
    /// if either location is not indexed or the recursion bound is
    /// exceeded.
    pub fn plan(&mut self, start: Location, end: Location) -> Result<(), RouteError> {
        self.config.validate()?;
        self.build(start, end, 0)
    }

    /// Segments emitted so far.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    /// Statistics gathered so far.
    #[must_use]
    pub const fn stats(&self) -> PlanStats {
        self.stats
    }

    /// Consume the planner, returning its segments and statistics.
    #[must_use]
    pub fn finish(self) -> (Vec<PathSegment>, PlanStats) {
        (self.segments, self.stats)
    }

    fn build(&mut self, start: Location, end: Location, depth: usize) -> Result<(), RouteError> {
        if depth > self.config.max_depth {
            return Err(RouteError::InvariantViolation(format!(
                "planning {start} -> {end} exceeded {} recursion levels",
                self.config.max_depth
            )));
        }
        self.stats.dispatches += 1;
        self.stats.max_depth = self.stats.max_depth.max(depth);

        let index = self.index;
        match (index.point(start)?, index.point(end)?) {
            (InfrastructurePoint::GroundExchange { .. }, InfrastructurePoint::GroundExchange { .. }) => {
                self.ground_to_ground(start, end, depth)
            }
            (
                InfrastructurePoint::SubmarineLanding { cable: start_cable },
                InfrastructurePoint::SubmarineLanding { cable: end_cable },
            ) => self.submarine_to_submarine(start, start_cable, end, end_cable, depth),
            (
                InfrastructurePoint::GroundExchange { .. },
                InfrastructurePoint::SubmarineLanding { cable: end_cable },
            ) => self.ground_to_submarine(start, end, end_cable, depth),
            (
                InfrastructurePoint::SubmarineLanding { cable: start_cable },
                InfrastructurePoint::GroundExchange { .. },
            ) => self.submarine_to_ground(start, start_cable, end, depth),
        }
    }

    fn ground_to_ground(
        &mut self,
        start: Location,
        end: Location,
        depth: usize,
    ) -> Result<(), RouteError> {
        let direct = start.distance(end);
        let Some(estimate) = cheapest_cable(start, end, self.index)? else {
            return self.draw_ground(start, end, depth);
        };

        if estimate.cost < direct {
            let entry = nearest(start, &estimate.cable.endpoints)?;
            let exit = nearest(end, &estimate.cable.endpoints)?;
            tracing::trace!(
                cable = %estimate.cable.name,
                cost = estimate.cost,
                direct,
                %entry,
                %exit,
                "cable beats direct ground line"
            );
            self.draw_ground(start, entry, depth)?;
            self.draw_submarine(entry, exit, &estimate.cable)?;
            return self.build(exit, end, depth + 1);
        }

        self.draw_ground(start, end, depth)
    }

    fn submarine_to_submarine(
        &mut self,
        start: Location,
        start_cable: &Arc<SubmarineCable>,
        end: Location,
        end_cable: &Arc<SubmarineCable>,
        depth: usize,
    ) -> Result<(), RouteError> {
        let index = self.index;
        if let Some(shared) = index
            .endpoint_cables(start)
            .iter()
            .find(|cable| cable.lands_at(end))
        {
            return self.draw_submarine(start, end, shared);
        }

        let closest = nearest(end, &start_cable.endpoints)?;
        if closest == start {
            // The start cable cannot get any closer; walk over to the
            // end cable's nearest landing instead.
            let entry = nearest(start, &end_cable.endpoints)?;
            self.draw_ground(start, entry, depth)?;
            if entry != end {
                self.draw_submarine(entry, end, end_cable)?;
            }
            return Ok(());
        }

        self.draw_submarine(start, closest, start_cable)?;
        self.build(closest, end, depth + 1)
    }

    fn ground_to_submarine(
        &mut self,
        start: Location,
        end: Location,
        end_cable: &Arc<SubmarineCable>,
        depth: usize,
    ) -> Result<(), RouteError> {
        let entry = nearest(start, &end_cable.endpoints)?;
        if entry == end {
            return self.draw_ground(start, end, depth);
        }

        self.build(start, entry, depth + 1)?;
        self.draw_submarine(entry, end, end_cable)
    }

    fn submarine_to_ground(
        &mut self,
        start: Location,
        start_cable: &Arc<SubmarineCable>,
        end: Location,
        depth: usize,
    ) -> Result<(), RouteError> {
        let exit = nearest(end, &start_cable.endpoints)?;
        if exit != start {
            self.draw_submarine(start, exit, start_cable)?;
            return self.build(exit, end, depth + 1);
        }

        self.draw_ground(start, end, depth)
    }

    /// Emit a ground line, splitting it first if it is too long.
    fn draw_ground(&mut self, start: Location, end: Location, depth: usize) -> Result<(), RouteError> {
        if start.distance(end) > self.config.break_threshold {
            let mid = self.index.snap(start.midpoint(end))?;
            if mid != start && mid != end {
                tracing::trace!(%start, %end, %mid, "splitting long ground line");
                self.stats.midpoint_splits += 1;
                self.build(start, mid, depth + 1)?;
                return self.build(mid, end, depth + 1);
            }
        }

        self.segments.push(PathSegment::Ground {
            from: start,
            to: end,
        });
        Ok(())
    }

    fn draw_submarine(
        &mut self,
        start: Location,
        end: Location,
        cable: &SubmarineCable,
    ) -> Result<(), RouteError> {
        let geometry = cable.slice_between(start, end)?;
        self.segments.push(PathSegment::Submarine {
            from: start,
            to: end,
            cable_name: cable.name.clone(),
            geometry,
        });
        Ok(())
    }
}

/// Plan a single pair of snapped locations.
///
/// # Errors
///
/// See [`PathPlanner::plan`].
pub fn plan_between(
    index: &InfrastructureIndex,
    config: &PlannerConfig,
    start: Location,
    end: Location,
) -> Result<Vec<PathSegment>, RouteError> {
    let mut planner = PathPlanner::new(index, config);
    planner.plan(start, end)?;
    Ok(planner.finish().0)
}
