//! hoproute-export: Pure map serializers (sans-IO)
//!
//! Renders reconstructed routes into output formats. Currently supports
//! SVG on an equirectangular world map.

pub mod svg;

pub use svg::{SvgMetadata, build_path_data, project, to_svg};
