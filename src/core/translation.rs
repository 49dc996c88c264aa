//! Translation hooks - interface between the conversion pipeline and the tag rules
//!
//! The pipeline drives a `Translation` through four capabilities, in this
//! order per feature: layer filter, feature filter, tag translation and, when
//! two geometries coincide, tag merging.

use super::feature::{Geometry, GeometryKind, Layer, SourceFeature};
use super::record::AttributeRecord;
use super::tags::TagSet;

/// Hooks a conversion pipeline calls while turning source features into OSM data.
///
/// Implementations must be pure: `translate` may be called from several
/// threads at once, while `merge_tags` calls for one geometry group arrive
/// strictly in the pipeline's visiting order and must never be reordered.
pub trait Translation: Send + Sync {
    /// Accept, replace or drop (`None`) a whole layer. Keeps every layer by default.
    fn filter_layer(&self, layer: Layer) -> Option<Layer> {
        Some(layer)
    }

    /// Accept, replace or drop (`None`) a single feature. Keeps every feature by default.
    fn filter_feature(
        &self,
        feature: SourceFeature,
        _fields: &[String],
        _reproject: &dyn Fn(&Geometry) -> Geometry,
    ) -> Option<SourceFeature> {
        Some(feature)
    }

    /// Derive the output tags for one feature's attributes
    fn translate(&self, attributes: &AttributeRecord) -> TagSet;

    /// Combine the tags of two coincident geometries. `incoming` is the later one.
    fn merge_tags(&self, kind: GeometryKind, existing: &TagSet, incoming: &TagSet) -> TagSet;
}
