//! Static infrastructure catalogs: ground exchanges and submarine cables.
//!
//! Both catalogs are plain JSON documents:
//!
//! - ground exchanges: an object mapping exchange name to `[lat, lon]`
//! - submarine cables: an array of `{ "name", "endpoints", "geometry" }`
//!   records, where `endpoints` and `geometry` are arrays of `[lat, lon]`
//!
//! Document order is preserved for both, since snapping breaks distance
//! ties by catalog order.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};

use crate::nearest::nearest_index;
use crate::types::{Location, RouteError};

/// A terrestrial internet exchange point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroundExchange {
    /// Exchange name.
    pub name: String,
    /// Exchange location.
    pub location: Location,
}

/// Ordered list of ground exchanges, deserialized from a
/// `{ name: [lat, lon] }` JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroundExchangeCatalog {
    exchanges: Vec<GroundExchange>,
}

impl GroundExchangeCatalog {
    /// Build a catalog from exchanges in the given order.
    #[must_use]
    pub const fn new(exchanges: Vec<GroundExchange>) -> Self {
        Self { exchanges }
    }

    /// Parse a catalog from its JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::DataLoad`] if the text is not an object of
    /// `name: [lat, lon]` entries.
    pub fn from_json(json: &str) -> Result<Self, RouteError> {
        serde_json::from_str(json)
            .map_err(|e| RouteError::DataLoad(format!("ground exchange catalog: {e}")))
    }

    /// Exchanges in catalog order.
    #[must_use]
    pub fn exchanges(&self) -> &[GroundExchange] {
        &self.exchanges
    }

    /// Number of exchanges.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.exchanges.len()
    }

    /// Returns `true` if the catalog has no exchanges.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}

impl FromIterator<(String, Location)> for GroundExchangeCatalog {
    fn from_iter<I: IntoIterator<Item = (String, Location)>>(iter: I) -> Self {
        Self::new(
            iter.into_iter()
                .map(|(name, location)| GroundExchange { name, location })
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for GroundExchangeCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = GroundExchangeCatalog;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of exchange names to [lat, lon] pairs")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut exchanges = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((name, location)) = map.next_entry::<String, Location>()? {
                    exchanges.push(GroundExchange { name, location });
                }
                Ok(GroundExchangeCatalog::new(exchanges))
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}

/// An undersea cable record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmarineCable {
    /// Cable name.
    pub name: String,
    /// Landing locations, in catalog order.
    pub endpoints: Vec<Location>,
    /// Physical route of the cable as a polyline.
    pub geometry: Vec<Location>,
}

impl SubmarineCable {
    /// Returns `true` if `location` is one of the cable's landings.
    #[must_use]
    pub fn lands_at(&self, location: Location) -> bool {
        self.endpoints.contains(&location)
    }

    /// The portion of the cable's geometry between two locations.
    ///
    /// Each location is matched to its nearest geometry vertex (first
    /// occurrence on ties). The slice runs between the two vertices
    /// inclusive, always in geometry order, so riding a cable
    /// "backwards" yields the same points as riding it forwards.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::EmptyCandidateSet`] if the cable has no
    /// geometry.
    pub fn slice_between(&self, from: Location, to: Location) -> Result<Vec<Location>, RouteError> {
        let a = nearest_index(from, &self.geometry)?;
        let b = nearest_index(to, &self.geometry)?;
        let (start, end) = if a <= b { (a, b) } else { (b, a) };
        Ok(self.geometry[start..=end].to_vec())
    }
}

/// Parse a submarine cable catalog from its JSON text.
///
/// # Errors
///
/// Returns [`RouteError::DataLoad`] if the text is not an array of cable
/// records or a record is missing `name`, `endpoints`, or `geometry`.
pub fn cables_from_json(json: &str) -> Result<Vec<SubmarineCable>, RouteError> {
    serde_json::from_str(json)
        .map_err(|e| RouteError::DataLoad(format!("submarine cable catalog: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cable(geometry: &[(f64, f64)]) -> SubmarineCable {
        let geometry: Vec<Location> = geometry
            .iter()
            .map(|&(lat, lon)| Location::new(lat, lon))
            .collect();
        SubmarineCable {
            name: "test".to_string(),
            endpoints: vec![geometry[0], geometry[geometry.len() - 1]],
            geometry,
        }
    }

    #[test]
    fn ground_catalog_preserves_document_order() {
        let catalog = GroundExchangeCatalog::from_json(
            r#"{"Zurich": [47.37, 8.54], "Amsterdam": [52.37, 4.9], "Berlin": [52.52, 13.4]}"#,
        )
        .unwrap();
        let names: Vec<&str> = catalog
            .exchanges()
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        assert_eq!(names, ["Zurich", "Amsterdam", "Berlin"]);
        assert_eq!(catalog.exchanges()[1].location, Location::new(52.37, 4.9));
    }

    #[test]
    fn ground_catalog_rejects_bad_location() {
        let result = GroundExchangeCatalog::from_json(r#"{"Zurich": "47.37,8.54"}"#);
        assert!(matches!(result, Err(RouteError::DataLoad(_))));
    }

    #[test]
    fn ground_catalog_rejects_array() {
        let result = GroundExchangeCatalog::from_json("[[47.37, 8.54]]");
        assert!(matches!(result, Err(RouteError::DataLoad(_))));
    }

    #[test]
    fn cable_catalog_parses_records() {
        let cables = cables_from_json(
            r#"[{"name": "Atlantic-1", "endpoints": [[40.0, -70.0], [50.0, -5.0]],
                 "geometry": [[40.0, -70.0], [45.0, -40.0], [50.0, -5.0]]}]"#,
        )
        .unwrap();
        assert_eq!(cables.len(), 1);
        assert_eq!(cables[0].name, "Atlantic-1");
        assert_eq!(cables[0].endpoints.len(), 2);
        assert_eq!(cables[0].geometry.len(), 3);
    }

    #[test]
    fn cable_catalog_rejects_missing_geometry() {
        let result = cables_from_json(r#"[{"name": "x", "endpoints": [[0.0, 0.0], [1.0, 1.0]]}]"#);
        let Err(RouteError::DataLoad(msg)) = result else {
            unreachable!("expected DataLoad, got {result:?}");
        };
        assert!(msg.contains("geometry"), "unexpected message: {msg}");
    }

    #[test]
    fn lands_at_checks_endpoints_only() {
        let c = cable(&[(0.0, 0.0), (0.0, 5.0), (0.0, 10.0)]);
        assert!(c.lands_at(Location::new(0.0, 0.0)));
        assert!(c.lands_at(Location::new(0.0, 10.0)));
        assert!(!c.lands_at(Location::new(0.0, 5.0)));
    }

    #[test]
    fn slice_forward() {
        let c = cable(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0), (0.0, 3.0)]);
        let slice = c
            .slice_between(Location::new(0.0, 1.0), Location::new(0.0, 3.0))
            .unwrap();
        assert_eq!(
            slice,
            [
                Location::new(0.0, 1.0),
                Location::new(0.0, 2.0),
                Location::new(0.0, 3.0)
            ]
        );
    }

    #[test]
    fn slice_backward_is_reordered() {
        let c = cable(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0), (0.0, 3.0)]);
        let forward = c
            .slice_between(Location::new(0.0, 0.0), Location::new(0.0, 2.0))
            .unwrap();
        let backward = c
            .slice_between(Location::new(0.0, 2.0), Location::new(0.0, 0.0))
            .unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward.len(), 3);
    }

    #[test]
    fn slice_snaps_off_vertex_locations() {
        // Landing points need not sit exactly on the geometry.
        let c = cable(&[(0.0, 0.0), (0.0, 1.0), (0.0, 2.0)]);
        let slice = c
            .slice_between(Location::new(0.1, 0.9), Location::new(0.2, 2.4))
            .unwrap();
        assert_eq!(slice, [Location::new(0.0, 1.0), Location::new(0.0, 2.0)]);
    }

    #[test]
    fn slice_of_empty_geometry_fails() {
        let c = SubmarineCable {
            name: "empty".to_string(),
            endpoints: vec![Location::new(0.0, 0.0), Location::new(1.0, 1.0)],
            geometry: Vec::new(),
        };
        assert!(matches!(
            c.slice_between(Location::new(0.0, 0.0), Location::new(1.0, 1.0)),
            Err(RouteError::EmptyCandidateSet)
        ));
    }
}
