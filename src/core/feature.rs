//! Feature model handed between the dataset reader and the translation hooks

use super::record::AttributeRecord;

/// Coordinate as (lon, lat) in WGS84 degrees
pub type Coord = (f64, f64);

/// Source geometry as read from the dataset
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(Coord),
    LineString(Vec<Coord>),
    MultiLineString(Vec<Vec<Coord>>),
    /// Exterior ring first, then holes
    Polygon(Vec<Vec<Coord>>),
}

/// Geometry class reported to the merge hook for coincident geometries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GeometryKind {
    Point,
    Line,
    Area,
}

impl Geometry {
    pub fn kind(&self) -> GeometryKind {
        match self {
            Geometry::Point(_) => GeometryKind::Point,
            Geometry::LineString(_) | Geometry::MultiLineString(_) => GeometryKind::Line,
            Geometry::Polygon(_) => GeometryKind::Area,
        }
    }
}

impl GeometryKind {
    pub fn name(&self) -> &'static str {
        match self {
            GeometryKind::Point => "point",
            GeometryKind::Line => "line",
            GeometryKind::Area => "area",
        }
    }
}

/// One source feature: geometry plus raw attributes
#[derive(Debug, Clone, PartialEq)]
pub struct SourceFeature {
    pub geometry: Geometry,
    pub attributes: AttributeRecord,
}

/// A named layer of features, with the attribute field names it declares
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layer {
    pub name: String,
    pub fields: Vec<String>,
    pub features: Vec<SourceFeature>,
}
