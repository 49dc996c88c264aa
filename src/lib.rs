//! # Piste-osm Library
//!
//! Converts the SAC (Swiss Alpine Club) ski touring datasets into OpenStreetMap
//! piste routes.
//!
//! The interesting part is the tag translation in [`core`]: a pure, total
//! mapping from raw source attributes to `route=piste` tags, plus the merge
//! policy for coincident geometries. The [`pipeline`] module reads the source
//! dataset, builds OSM nodes and ways and writes OSM XML around it.
//!
//! ## Basic Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let summary = piste_osm::convert_file(
//!     Path::new("data/ski_routes.geojson"),
//!     Path::new("out/ski_routes.osm"),
//! )?;
//! println!("{} ways written", summary.ways);
//! # Ok(())
//! # }
//! ```
//!
//! ## Translating a single record
//!
//! ```rust
//! use piste_osm::{translate_attributes, AttributeRecord};
//!
//! let attrs = AttributeRecord::new()
//!     .with("target_name", "Lake Loop")
//!     .with("name_en", "Blue");
//! let tags = translate_attributes(&attrs);
//! assert_eq!(tags.get("name"), Some("Lake Loop (Blue)"));
//! assert_eq!(tags.get("route"), Some("piste"));
//! ```

use std::path::Path;

pub mod core;
pub mod pipeline;

pub use crate::core::error::{Error, Result};
pub use crate::core::{
    merge_tags, translate_attributes, AttrValue, AttributeRecord, Geometry, GeometryKind, Layer,
    SacTranslation, SourceFeature, TagSet, Translation,
};
pub use crate::pipeline::{convert, ConversionSummary, ConvertOptions, Datasource, Driver};

/// Convert `input` to OSM XML at `output` with the SAC translation and default options
pub fn convert_file(input: &Path, output: &Path) -> Result<ConversionSummary> {
    convert(
        input,
        output,
        &SacTranslation::new(),
        &ConvertOptions::default(),
    )
}
