//! Shared types for hoproute path reconstruction.

use std::fmt;
use std::hash::{Hash, Hasher};

use geo::line_measures::Distance;
use geo::Euclidean;
use serde::{Deserialize, Serialize};

/// A geographic location in raw latitude/longitude degrees.
///
/// Distances between locations are planar: latitude and longitude are
/// treated as Cartesian coordinates. Only relative comparisons drive
/// planning decisions, so the approximation is acceptable.
///
/// Equality and hashing compare the bit patterns of both coordinates
/// (with `-0.0` folded into `0.0`), which lets a `Location` key hash
/// maps. Catalog loading rejects non-finite coordinates.
///
/// Serialized as a two-element `[lat, lon]` array.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Location {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl Location {
    /// Create a new location.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Planar Euclidean distance to another location.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        Euclidean.distance(&geo::Point::from(self), &geo::Point::from(other))
    }

    /// Arithmetic midpoint between this location and another.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self::new(
            f64::midpoint(self.lat, other.lat),
            f64::midpoint(self.lon, other.lon),
        )
    }

    /// Returns `true` if both coordinates are finite.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    fn key(self) -> (u64, u64) {
        // -0.0 + 0.0 == +0.0
        ((self.lat + 0.0).to_bits(), (self.lon + 0.0).to_bits())
    }
}

impl PartialEq for Location {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Location {}

impl Hash for Location {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

impl From<[f64; 2]> for Location {
    fn from([lat, lon]: [f64; 2]) -> Self {
        Self::new(lat, lon)
    }
}

impl From<Location> for [f64; 2] {
    fn from(location: Location) -> Self {
        [location.lat, location.lon]
    }
}

impl From<Location> for geo::Point<f64> {
    fn from(location: Location) -> Self {
        Self::new(location.lon, location.lat)
    }
}

/// A traceroute hop supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TracePoint {
    /// Geolocated position of the hop.
    pub location: Location,
    /// Hostname or address shown next to the hop marker.
    pub label: String,
}

impl TracePoint {
    /// Create a new trace point.
    #[must_use]
    pub fn new(location: Location, label: impl Into<String>) -> Self {
        Self {
            location,
            label: label.into(),
        }
    }
}

/// One drawable leg of a reconstructed path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PathSegment {
    /// A straight terrestrial line between two infrastructure points.
    Ground {
        /// Start of the line.
        from: Location,
        /// End of the line.
        to: Location,
    },
    /// A ride along a submarine cable between two of its landings.
    Submarine {
        /// Landing where the path enters the cable.
        from: Location,
        /// Landing where the path leaves the cable.
        to: Location,
        /// Name of the cable.
        cable_name: String,
        /// The portion of the cable's route between the two landings.
        geometry: Vec<Location>,
    },
}

impl PathSegment {
    /// Where the segment starts.
    #[must_use]
    pub const fn from(&self) -> Location {
        match self {
            Self::Ground { from, .. } | Self::Submarine { from, .. } => *from,
        }
    }

    /// Where the segment ends.
    #[must_use]
    pub const fn to(&self) -> Location {
        match self {
            Self::Ground { to, .. } | Self::Submarine { to, .. } => *to,
        }
    }

    /// Returns `true` for [`PathSegment::Ground`].
    #[must_use]
    pub const fn is_ground(&self) -> bool {
        matches!(self, Self::Ground { .. })
    }

    /// Returns `true` for [`PathSegment::Submarine`].
    #[must_use]
    pub const fn is_submarine(&self) -> bool {
        matches!(self, Self::Submarine { .. })
    }
}

/// A trace hop after snapping to infrastructure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// 1-based position of the hop in the trace.
    pub ordinal: usize,
    /// Label of the originating trace point.
    pub label: String,
    /// Snapped infrastructure location.
    pub location: Location,
}

impl Marker {
    /// Text shown next to the marker, e.g. `"(3) ae-1.example.net"`.
    #[must_use]
    pub fn caption(&self) -> String {
        format!("({}) {}", self.ordinal, self.label)
    }
}

/// Result of reconstructing a path for a whole trace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    /// One marker per trace point, in trace order.
    pub markers: Vec<Marker>,
    /// Path segments in emission order.
    pub segments: Vec<PathSegment>,
}

/// Configuration for the path planner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerConfig {
    /// Maximum direct ground-segment length (raw coordinate units)
    /// before the planner tries to split it at an intermediate point.
    pub break_threshold: f64,

    /// Maximum planner recursion depth before giving up with
    /// [`RouteError::InvariantViolation`].
    pub max_depth: usize,
}

impl PlannerConfig {
    /// Default ground-segment break threshold.
    pub const DEFAULT_BREAK_THRESHOLD: f64 = 10.0;

    /// Default recursion depth bound.
    pub const DEFAULT_MAX_DEPTH: usize = 256;

    /// Check the configuration for values the planner cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvalidConfig`] if `break_threshold` is
    /// negative or not finite, or if `max_depth` is zero.
    pub fn validate(&self) -> Result<(), RouteError> {
        if !self.break_threshold.is_finite() || self.break_threshold < 0.0 {
            return Err(RouteError::InvalidConfig(format!(
                "break_threshold must be finite and non-negative, got {}",
                self.break_threshold
            )));
        }
        if self.max_depth == 0 {
            return Err(RouteError::InvalidConfig(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            break_threshold: Self::DEFAULT_BREAK_THRESHOLD,
            max_depth: Self::DEFAULT_MAX_DEPTH,
        }
    }
}

/// Errors that can occur while loading catalogs or reconstructing a path.
///
/// None of these are recoverable inside the planner. Callers should
/// report any of them as "unable to build path".
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// A catalog is empty or malformed.
    #[error("failed to load infrastructure catalog: {0}")]
    DataLoad(String),

    /// A nearest-point search was given no candidates.
    #[error("nearest-point search has no candidates")]
    EmptyCandidateSet,

    /// The planner reached a state that valid input cannot produce.
    #[error("planner invariant violated: {0}")]
    InvariantViolation(String),

    /// Planner configuration is invalid.
    #[error("invalid planner configuration: {0}")]
    InvalidConfig(String),

    /// A location to snap has a NaN or infinite coordinate.
    #[error("location {0} is not finite")]
    NonFiniteLocation(Location),
}
