//! Infrastructure index: every known exchange and cable landing, keyed
//! by location.
//!
//! Built once from the two catalogs and read-only afterwards. Two
//! lookups are maintained:
//!
//! - a location index mapping each location to exactly one
//!   [`InfrastructurePoint`]
//! - an endpoint index mapping each landing location to *every* cable
//!   that terminates there
//!
//! When several records share a coordinate the location index keeps the
//! last one loaded: cables override exchanges, later cables override
//! earlier ones. The endpoint index keeps all of them, in catalog order.
//!
//! Snapping arbitrary coordinates onto the index goes through an R\*-tree
//! but returns exactly what a linear [`nearest`] scan over
//! [`InfrastructureIndex::all_locations`] would.

use std::collections::HashMap;
use std::sync::Arc;

use rstar::RTree;
use rstar::primitives::GeomWithData;

use crate::catalog::{GroundExchangeCatalog, SubmarineCable, cables_from_json};
use crate::nearest::nearest;
use crate::types::{Location, RouteError};

/// Relative slack when collecting near-tied R-tree candidates, so that
/// rounding differences between squared and true distances cannot change
/// which candidate wins.
const TIE_SLACK: f64 = 1e-9;

/// What sits at an indexed location.
#[derive(Debug, Clone, PartialEq)]
pub enum InfrastructurePoint {
    /// A terrestrial exchange point.
    GroundExchange {
        /// Exchange name.
        name: String,
    },
    /// A submarine cable landing.
    SubmarineLanding {
        /// The cable associated with this landing in the location index.
        cable: Arc<SubmarineCable>,
    },
}

/// Catalog position of an indexed location, stored in the R-tree.
type IndexedLocation = GeomWithData<[f64; 2], usize>;

/// Read-only lookup over all known infrastructure.
#[derive(Debug)]
pub struct InfrastructureIndex {
    /// Locations in first-insertion order.
    locations: Vec<Location>,
    points: HashMap<Location, InfrastructurePoint>,
    endpoint_cables: HashMap<Location, Vec<Arc<SubmarineCable>>>,
    /// Usable cables in catalog order.
    cables: Vec<Arc<SubmarineCable>>,
    tree: RTree<IndexedLocation>,
}

impl InfrastructureIndex {
    /// Build the index from parsed catalogs.
    ///
    /// Cables with fewer than two endpoints cannot carry a path and are
    /// skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::DataLoad`] if either catalog is empty, any
    /// coordinate is not finite, or a usable cable has no geometry.
    pub fn load(
        ground: &GroundExchangeCatalog,
        cables: &[SubmarineCable],
    ) -> Result<Self, RouteError> {
        if ground.is_empty() {
            return Err(RouteError::DataLoad(
                "ground exchange catalog is empty".to_string(),
            ));
        }
        if cables.is_empty() {
            return Err(RouteError::DataLoad(
                "submarine cable catalog is empty".to_string(),
            ));
        }

        let mut index = Self {
            locations: Vec::new(),
            points: HashMap::new(),
            endpoint_cables: HashMap::new(),
            cables: Vec::new(),
            tree: RTree::new(),
        };

        for exchange in ground.exchanges() {
            check_finite(exchange.location, || format!("exchange {:?}", exchange.name))?;
            index.insert(
                exchange.location,
                InfrastructurePoint::GroundExchange {
                    name: exchange.name.clone(),
                },
            );
        }

        for cable in cables {
            if cable.endpoints.len() < 2 {
                tracing::warn!(
                    cable = %cable.name,
                    endpoints = cable.endpoints.len(),
                    "skipping cable with fewer than two endpoints"
                );
                continue;
            }
            if cable.geometry.is_empty() {
                return Err(RouteError::DataLoad(format!(
                    "cable {:?} has no geometry",
                    cable.name
                )));
            }
            for &location in cable.endpoints.iter().chain(&cable.geometry) {
                check_finite(location, || format!("cable {:?}", cable.name))?;
            }

            let cable = Arc::new(cable.clone());
            for &endpoint in &cable.endpoints {
                index.insert(
                    endpoint,
                    InfrastructurePoint::SubmarineLanding {
                        cable: Arc::clone(&cable),
                    },
                );
                let landed = index.endpoint_cables.entry(endpoint).or_default();
                // An endpoint listed twice on one cable still maps to it once.
                if !landed.iter().any(|c| Arc::ptr_eq(c, &cable)) {
                    landed.push(Arc::clone(&cable));
                }
            }
            index.cables.push(cable);
        }

        index.tree = RTree::bulk_load(
            index
                .locations
                .iter()
                .enumerate()
                .map(|(i, l)| IndexedLocation::new([l.lat, l.lon], i))
                .collect(),
        );

        tracing::debug!(
            locations = index.locations.len(),
            cables = index.cables.len(),
            skipped_cables = cables.len() - index.cables.len(),
            "infrastructure index loaded"
        );

        Ok(index)
    }

    /// Parse both catalogs from JSON text and build the index.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::DataLoad`] if either document is malformed
    /// or [`load`](Self::load) rejects the parsed catalogs.
    pub fn from_json(ground_json: &str, cables_json: &str) -> Result<Self, RouteError> {
        let ground = GroundExchangeCatalog::from_json(ground_json)?;
        let cables = cables_from_json(cables_json)?;
        Self::load(&ground, &cables)
    }

    fn insert(&mut self, location: Location, point: InfrastructurePoint) {
        if self.points.insert(location, point).is_none() {
            self.locations.push(location);
        }
    }

    /// Every indexed location, in first-insertion order.
    pub fn all_locations(&self) -> impl ExactSizeIterator<Item = Location> + '_ {
        self.locations.iter().copied()
    }

    /// The cables landing at `location`, in catalog order. Empty if none.
    #[must_use]
    pub fn endpoint_cables(&self, location: Location) -> &[Arc<SubmarineCable>] {
        self.endpoint_cables
            .get(&location)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// The infrastructure at `location`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::InvariantViolation`] if `location` is not
    /// indexed. Locations produced by [`snap`](Self::snap) always are.
    pub fn point(&self, location: Location) -> Result<&InfrastructurePoint, RouteError> {
        self.points.get(&location).ok_or_else(|| {
            RouteError::InvariantViolation(format!("location {location} is not in the index"))
        })
    }

    /// The indexed location nearest to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::NonFiniteLocation`] if `target` has a NaN or
    /// infinite coordinate, and [`RouteError::EmptyCandidateSet`] if the
    /// index is empty.
    pub fn snap(&self, target: Location) -> Result<Location, RouteError> {
        if !target.is_finite() {
            return Err(RouteError::NonFiniteLocation(target));
        }
        let query = [target.lat, target.lon];
        let mut cutoff = None;
        let mut tied = Vec::new();

        for (entry, distance_2) in self.tree.nearest_neighbor_iter_with_distance_2(&query) {
            let limit = *cutoff.get_or_insert(distance_2 * (1.0 + TIE_SLACK));
            if distance_2 > limit {
                break;
            }
            tied.push(entry.data);
        }

        tied.sort_unstable();
        nearest(target, tied.iter().map(|&i| self.locations[i]))
    }

    /// Usable cables (two or more endpoints), in catalog order.
    #[must_use]
    pub fn cables(&self) -> &[Arc<SubmarineCable>] {
        &self.cables
    }

    /// Number of distinct indexed locations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// Returns `true` if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

fn check_finite(location: Location, owner: impl FnOnce() -> String) -> Result<(), RouteError> {
    if location.is_finite() {
        Ok(())
    } else {
        Err(RouteError::DataLoad(format!(
            "{} has non-finite coordinate {location}",
            owner()
        )))
    }
}
