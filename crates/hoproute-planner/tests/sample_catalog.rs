//! Integration test: reconstruct the sample traces against the sample catalogs.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::path::PathBuf;

use hoproute_planner::{
    InfrastructureIndex, InfrastructurePoint, Location, PathSegment, PlannerConfig, Route,
    TracePoint, plan_between, reconstruct,
};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .unwrap()
        .parent()
        .unwrap()
        .to_path_buf()
}

fn read_asset(relative: &str) -> String {
    let path = workspace_root().join("assets").join(relative);
    assert!(path.exists(), "sample asset not found at {path:?}");
    std::fs::read_to_string(&path).unwrap()
}

fn sample_index() -> InfrastructureIndex {
    InfrastructureIndex::from_json(
        &read_asset("catalog/ground-exchange.json"),
        &read_asset("catalog/submarine.json"),
    )
    .expect("sample catalogs should load")
}

fn sample_trace(name: &str) -> Vec<TracePoint> {
    serde_json::from_str(&read_asset(&format!("traces/{name}.json"))).unwrap()
}

fn assert_contiguous(route: &Route) {
    for pair in route.segments.windows(2) {
        assert_eq!(pair[0].to(), pair[1].from(), "gap between {pair:?}");
    }
    if let (Some(first), Some(last)) = (route.segments.first(), route.segments.last()) {
        assert_eq!(first.from(), route.markers[0].location);
        assert_eq!(last.to(), route.markers[route.markers.len() - 1].location);
    }
}

#[test]
fn sample_catalog_loads() {
    let index = sample_index();

    // 12 exchanges + 7 distinct landings; the one-ended spur is skipped.
    assert_eq!(index.len(), 19);
    let names: Vec<&str> = index.cables().iter().map(|c| c.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "Atlantic Crossing",
            "Iberia Express",
            "South Atlantic Link",
            "Americas Coastal"
        ]
    );
}

#[test]
fn shared_landing_lists_every_cable() {
    let index = sample_index();
    let fortaleza = Location::new(-3.72, -38.54);

    let landed: Vec<&str> = index
        .endpoint_cables(fortaleza)
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(landed, ["South Atlantic Link", "Americas Coastal"]);

    // The later cable owns the location itself.
    let InfrastructurePoint::SubmarineLanding { cable } = index.point(fortaleza).unwrap() else {
        panic!("expected a landing");
    };
    assert_eq!(cable.name, "Americas Coastal");
}

#[test]
fn transatlantic_trace_rides_a_cable() {
    let index = sample_index();
    let route = reconstruct(
        &index,
        &sample_trace("london-ashburn"),
        &PlannerConfig::default(),
    )
    .unwrap();

    let captions: Vec<String> = route.markers.iter().map(|m| m.caption()).collect();
    assert_eq!(
        captions,
        [
            "(1) core1.lon.example.net",
            "(2) edge2.lon.example.net",
            "(3) ix.nyc.example.net",
            "(4) dc3.ash.example.net"
        ]
    );
    assert_contiguous(&route);

    let london = Location::new(51.51, -0.13);
    let bude = Location::new(50.83, -4.55);
    let new_york_landing = Location::new(40.58, -73.66);
    let new_york = Location::new(40.71, -74.01);
    let ashburn = Location::new(39.04, -77.49);

    assert_eq!(route.segments.len(), 5);
    assert_eq!(
        route.segments[0],
        PathSegment::Ground {
            from: london,
            to: london
        }
    );
    assert_eq!(
        route.segments[1],
        PathSegment::Ground {
            from: london,
            to: bude
        }
    );
    let PathSegment::Submarine {
        cable_name,
        geometry,
        ..
    } = &route.segments[2]
    else {
        panic!("expected a submarine segment, got {:?}", route.segments[2]);
    };
    assert_eq!(cable_name, "Atlantic Crossing");
    assert_eq!(geometry.len(), 4);
    assert_eq!(
        route.segments[3],
        PathSegment::Ground {
            from: new_york_landing,
            to: new_york
        }
    );
    assert_eq!(
        route.segments[4],
        PathSegment::Ground {
            from: new_york,
            to: ashburn
        }
    );
}

#[test]
fn long_ground_trace_is_split_at_intermediate_points() {
    let index = sample_index();
    let config = PlannerConfig::default();
    let route = reconstruct(&index, &sample_trace("madrid-frankfurt"), &config).unwrap();

    assert_contiguous(&route);
    assert!(route.segments.iter().all(PathSegment::is_ground));

    let stops: Vec<Location> = route.segments.iter().map(PathSegment::to).collect();
    assert_eq!(
        stops,
        [
            Location::new(43.40, -2.95),
            Location::new(48.86, 2.35),
            Location::new(50.11, 8.68)
        ]
    );
    for segment in &route.segments {
        assert!(segment.from().distance(segment.to()) <= config.break_threshold);
    }
}

#[test]
fn every_pair_of_sample_locations_plans() {
    let index = sample_index();
    let config = PlannerConfig::default();
    let locations: Vec<Location> = index.all_locations().collect();

    for &start in &locations {
        for &end in &locations {
            let segments = plan_between(&index, &config, start, end)
                .unwrap_or_else(|e| panic!("{start} -> {end}: {e}"));
            assert!(!segments.is_empty());
            assert_eq!(segments[0].from(), start);
            assert_eq!(segments[segments.len() - 1].to(), end);
            for pair in segments.windows(2) {
                assert_eq!(pair[0].to(), pair[1].from());
            }
            assert_eq!(
                plan_between(&index, &config, start, end).unwrap(),
                segments,
                "planning {start} -> {end} is not deterministic"
            );
        }
    }
}
