//! SVG export serializer.
//!
//! Renders a [`Route`] onto an equirectangular world map using the
//! [`svg`] crate for document construction, XML escaping, and path
//! data formatting.
//!
//! Coordinates are projected with `x = lon + 180` and `y = 90 - lat`,
//! so the `viewBox` is `0 0 360 180` with the north-west corner at the
//! origin. Ground segments are drawn as red `<path>` elements, submarine
//! segments as blue `<path>` elements carrying the cable name in a
//! `<title>`, and each marker as a `<circle>` with a `"(n) label"`
//! caption.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use std::collections::HashMap;

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Description, Element, Group, Path, Title};
use svg::node::{Node, Text, Value};

use hoproute_planner::{Location, Marker, PathSegment, Route};

/// Width of the projected map in degrees of longitude.
const MAP_WIDTH: u32 = 360;
/// Height of the projected map in degrees of latitude.
const MAP_HEIGHT: u32 = 180;
/// Rendered pixels per degree.
const PIXELS_PER_DEGREE: u32 = 4;

const GROUND_STROKE: &str = "red";
const SUBMARINE_STROKE: &str = "blue";
const STROKE_WIDTH: f64 = 0.3;
const MARKER_RADIUS: f64 = 0.8;
const LABEL_FONT_SIZE: f64 = 2.5;

/// Metadata to embed in the SVG document.
///
/// All fields are optional. When present, a `<title>` and/or `<desc>`
/// element is emitted immediately after the opening `<svg>` tag.
///
/// Text values are XML-escaped automatically by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    ///
    /// Typically the trace file name.
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,

    /// Serialized planner configuration, emitted inside a `<metadata>`
    /// element wrapped in a namespaced `<hoproute:planner>` element so
    /// exported maps record the settings that produced them.
    pub config_json: Option<&'a str>,
}

/// Project a location into map coordinates.
///
/// # Examples
///
/// ```
/// use hoproute_planner::Location;
/// use hoproute_export::project;
///
/// assert_eq!(project(Location::new(0.0, 0.0)), (180.0, 90.0));
/// assert_eq!(project(Location::new(90.0, -180.0)), (0.0, 0.0));
/// ```
#[must_use]
pub fn project(location: Location) -> (f64, f64) {
    (location.lon + 180.0, 90.0 - location.lat)
}

/// Build an SVG path `d` attribute string from a sequence of locations.
///
/// Uses `M` for the first point and `L` for subsequent points, after
/// projecting each location. Returns an empty string for fewer than 2
/// points.
///
/// # Examples
///
/// ```
/// use hoproute_planner::Location;
/// use hoproute_export::build_path_data;
///
/// let d = build_path_data(&[Location::new(0.0, 0.0), Location::new(10.0, -20.0)]);
/// assert_eq!(d, "M180,90 L160,80");
/// ```
#[must_use]
pub fn build_path_data(points: &[Location]) -> String {
    let Some((first, rest)) = points.split_first() else {
        return String::new();
    };
    if rest.is_empty() {
        return String::new();
    }

    let mut data = Data::new().move_to(project(*first));
    for &p in rest {
        data = data.line_to(project(p));
    }
    String::from(Value::from(data))
}

/// Points to draw for a segment.
///
/// Submarine segments follow the cable geometry when it has at least two
/// points and fall back to the straight landing-to-landing line otherwise.
fn segment_points(segment: &PathSegment) -> Vec<Location> {
    match segment {
        PathSegment::Submarine { geometry, .. } if geometry.len() >= 2 => geometry.clone(),
        PathSegment::Ground { from, to } | PathSegment::Submarine { from, to, .. } => {
            vec![*from, *to]
        }
    }
}

fn segment_path(segment: &PathSegment) -> Option<Path> {
    let d = build_path_data(&segment_points(segment));
    if d.is_empty() {
        return None;
    }

    let stroke = if segment.is_ground() {
        GROUND_STROKE
    } else {
        SUBMARINE_STROKE
    };
    let path = Path::new()
        .set("d", d)
        .set("fill", "none")
        .set("stroke", stroke)
        .set("stroke-width", STROKE_WIDTH);

    Some(match segment {
        PathSegment::Submarine { cable_name, .. } => path.add(Title::new(cable_name.as_str())),
        PathSegment::Ground { .. } => path,
    })
}

/// Build the `<circle>` and caption `<text>` for a marker.
///
/// `stack` is the number of earlier markers at the same location; their
/// captions are shifted down so they do not overprint each other.
#[allow(clippy::cast_precision_loss)]
fn marker_group(marker: &Marker, stack: usize) -> Group {
    let (x, y) = project(marker.location);

    let circle = Circle::new()
        .set("cx", x)
        .set("cy", y)
        .set("r", MARKER_RADIUS)
        .set("fill", "black");

    let mut caption = Element::new("text");
    caption.assign("x", MARKER_RADIUS.mul_add(1.5, x));
    caption.assign("y", (stack as f64).mul_add(LABEL_FONT_SIZE, y));
    caption.assign("font-size", LABEL_FONT_SIZE);
    caption.assign("font-family", "sans-serif");
    caption.append(Text::new(marker.caption()));

    Group::new()
        .set("class", "marker")
        .add(circle)
        .add(caption)
}

/// Serialize a route into an SVG document string.
///
/// Ground segments land under `<g id="ground">`, submarine segments
/// under `<g id="submarine">`, and markers under `<g id="markers">`.
/// Empty groups are omitted. Markers are drawn last so they sit on top
/// of the paths.
///
/// If [`SvgMetadata::title`] or [`SvgMetadata::description`] is
/// provided, the corresponding `<title>` / `<desc>` element is emitted
/// after the opening `<svg>` tag. If [`SvgMetadata::config_json`] is
/// provided, a `<metadata>` element is emitted containing the JSON.
///
/// # Examples
///
/// ```
/// use hoproute_planner::{Location, Marker, PathSegment, Route};
/// use hoproute_export::{SvgMetadata, to_svg};
///
/// let route = Route {
///     markers: vec![Marker {
///         ordinal: 1,
///         label: "gw".to_string(),
///         location: Location::new(0.0, 0.0),
///     }],
///     segments: vec![PathSegment::Ground {
///         from: Location::new(0.0, 0.0),
///         to: Location::new(10.0, -20.0),
///     }],
/// };
/// let metadata = SvgMetadata {
///     title: Some("sample"),
///     ..SvgMetadata::default()
/// };
/// let svg = to_svg(&route, &metadata);
/// assert!(svg.contains("<title>sample</title>"));
/// assert!(svg.contains("M180,90 L160,80"));
/// assert!(svg.contains("(1) gw"));
/// ```
#[must_use]
pub fn to_svg(route: &Route, metadata: &SvgMetadata<'_>) -> String {
    let mut doc = Document::new()
        .set("width", MAP_WIDTH * PIXELS_PER_DEGREE)
        .set("height", MAP_HEIGHT * PIXELS_PER_DEGREE)
        .set("viewBox", (0, 0, MAP_WIDTH, MAP_HEIGHT));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    if let Some(config_json) = metadata.config_json {
        let mut planner_el = Element::new("hoproute:planner");
        planner_el.assign("xmlns:hoproute", "https://github.com/hoproute/hoproute/ns/1");
        planner_el.append(Text::new(config_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(planner_el);
        doc = doc.add(metadata_el);
    }

    let (ground, submarine): (Vec<&PathSegment>, Vec<&PathSegment>) =
        route.segments.iter().partition(|s| s.is_ground());

    for (id, segments) in [("ground", ground), ("submarine", submarine)] {
        let paths: Vec<Path> = segments.into_iter().filter_map(segment_path).collect();
        if paths.is_empty() {
            continue;
        }
        let mut group = Group::new().set("id", id);
        for path in paths {
            group = group.add(path);
        }
        doc = doc.add(group);
    }

    if !route.markers.is_empty() {
        let mut seen: HashMap<Location, usize> = HashMap::new();
        let mut group = Group::new().set("id", "markers");
        for marker in &route.markers {
            let stack = seen.entry(marker.location).or_default();
            group = group.add(marker_group(marker, *stack));
            *stack += 1;
        }
        doc = doc.add(group);
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}
