//! hoproute-planner: Physical path reconstruction for traceroutes (sans-IO).
//!
//! Maps geolocated traceroute hops onto a catalog of ground exchange
//! points and submarine cables, then reconstructs a plausible physical
//! route through that infrastructure:
//! load catalogs -> index locations -> snap hops -> plan each pair.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! JSON strings and returns structured data. Reading catalog files and
//! rendering routes lives in `hoproute-cli` and `hoproute-export`.

pub mod catalog;
pub mod cost;
pub mod diagnostics;
pub mod index;
pub mod nearest;
pub mod planner;
pub mod route;
pub mod types;

pub use catalog::{GroundExchange, GroundExchangeCatalog, SubmarineCable, cables_from_json};
pub use cost::{CableEstimate, cheapest_cable, crossing_cost};
pub use diagnostics::{Clock, RouteDiagnostics, reconstruct_with_diagnostics};
pub use index::{InfrastructureIndex, InfrastructurePoint};
pub use nearest::{nearest, nearest_index};
pub use planner::{PathPlanner, PlanStats, plan_between};
pub use route::{plan_markers, reconstruct, snap_trace};
pub use types::{Location, Marker, PathSegment, PlannerConfig, Route, RouteError, TracePoint};
