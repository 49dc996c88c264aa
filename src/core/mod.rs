//! Core translation modules for piste-osm
//!
//! Everything in here is pure: no I/O, no logging, no shared state.

pub mod error;
pub mod feature;
pub mod record;
pub mod tags;
pub mod translate;
pub mod translation;

pub use feature::{Coord, Geometry, GeometryKind, Layer, SourceFeature};
pub use record::{AttrValue, AttributeRecord};
pub use tags::TagSet;
pub use translate::{merge_tags, translate_attributes, AccessLevel, Discipline, SacTranslation};
pub use translation::Translation;
