//! OSM data builder and XML writer
//!
//! Builds nodes and ways from translated features and serializes them as
//! OSM XML 0.6. Nodes are shared by exact coordinate; ways that run over
//! the same node sequence (in either direction) are coincident and share one
//! output way, with their tags combined through `Translation::merge_tags`.

use std::collections::HashMap;
use std::io::Write;

use log::{debug, warn};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::core::error::{Error, Result};
use crate::core::{Coord, Geometry, GeometryKind, SourceFeature, TagSet, Translation};

/// Coordinates are keyed at OSM's native 1e-7 degree precision
const COORD_SCALE: f64 = 1e7;

#[derive(Debug, Clone, PartialEq)]
pub struct OsmNode {
    pub id: i64,
    pub lon: f64,
    pub lat: f64,
    pub tags: TagSet,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OsmWay {
    pub id: i64,
    pub nodes: Vec<i64>,
    pub tags: TagSet,
}

/// Counters reported after processing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OsmStats {
    pub features: u64,
    pub skipped: u64,
    pub merged: u64,
}

/// In-memory OSM dataset built from translated features
pub struct OsmData<'t> {
    translation: &'t dyn Translation,
    nodes: Vec<OsmNode>,
    node_index: HashMap<(i64, i64), usize>,
    ways: Vec<OsmWay>,
    way_index: HashMap<Vec<i64>, usize>,
    stats: OsmStats,
}

impl<'t> OsmData<'t> {
    pub fn new(translation: &'t dyn Translation) -> Self {
        Self {
            translation,
            nodes: Vec::new(),
            node_index: HashMap::new(),
            ways: Vec::new(),
            way_index: HashMap::new(),
            stats: OsmStats::default(),
        }
    }

    pub fn nodes(&self) -> &[OsmNode] {
        &self.nodes
    }

    pub fn ways(&self) -> &[OsmWay] {
        &self.ways
    }

    pub fn stats(&self) -> OsmStats {
        self.stats
    }

    /// Translate a feature's attributes and add its geometry.
    ///
    /// Features with degenerate geometry are counted as skipped, not failed.
    pub fn add_feature(&mut self, feature: &SourceFeature) {
        let tags = self.translation.translate(&feature.attributes);
        match self.add_geometry(&feature.geometry, tags) {
            Ok(()) => self.stats.features += 1,
            Err(e) => {
                warn!("Skipping feature: {e}");
                self.stats.skipped += 1;
            }
        }
    }

    pub fn add_geometry(&mut self, geometry: &Geometry, tags: TagSet) -> Result<()> {
        match geometry {
            Geometry::Point(coord) => {
                self.add_point(*coord, tags);
                Ok(())
            }
            Geometry::LineString(line) => {
                let coords = way_coords(line, GeometryKind::Line)?;
                self.add_way(&coords, tags, GeometryKind::Line);
                Ok(())
            }
            Geometry::MultiLineString(parts) => {
                // Every part is checked before anything is added
                let mut usable = Vec::with_capacity(parts.len());
                for (i, part) in parts.iter().enumerate() {
                    match way_coords(part, GeometryKind::Line) {
                        Ok(coords) => usable.push(coords),
                        Err(e) => warn!("Skipping part {i} of MultiLineString: {e}"),
                    }
                }
                if usable.is_empty() {
                    return Err(Error::InvalidGeometry(
                        "MultiLineString without usable parts".to_string(),
                    ));
                }
                for coords in usable {
                    self.add_way(&coords, tags.clone(), GeometryKind::Line);
                }
                Ok(())
            }
            Geometry::Polygon(rings) => {
                let exterior = rings
                    .first()
                    .ok_or_else(|| Error::InvalidGeometry("polygon without rings".to_string()))?;
                if rings.len() > 1 {
                    debug!("Dropping {} polygon holes", rings.len() - 1);
                }
                let coords = way_coords(exterior, GeometryKind::Area)?;
                self.add_way(&coords, tags, GeometryKind::Area);
                Ok(())
            }
        }
    }

    fn node_for(&mut self, coord: Coord) -> usize {
        let key = coord_key(coord);
        if let Some(&index) = self.node_index.get(&key) {
            return index;
        }
        let index = self.nodes.len();
        self.nodes.push(OsmNode {
            id: -(index as i64) - 1,
            lon: coord.0,
            lat: coord.1,
            tags: TagSet::new(),
        });
        self.node_index.insert(key, index);
        index
    }

    fn add_point(&mut self, coord: Coord, tags: TagSet) {
        let index = self.node_for(coord);
        let node = &mut self.nodes[index];
        if node.tags.is_empty() {
            node.tags = tags;
        } else {
            node.tags = self
                .translation
                .merge_tags(GeometryKind::Point, &node.tags, &tags);
            self.stats.merged += 1;
        }
    }

    /// Add a way over coordinates already checked by `way_coords`
    fn add_way(&mut self, coords: &[Coord], tags: TagSet, kind: GeometryKind) {
        let node_ids: Vec<i64> = coords
            .iter()
            .map(|coord| {
                let index = self.node_for(*coord);
                self.nodes[index].id
            })
            .collect();

        let key = canonical_sequence(&node_ids);
        if let Some(&index) = self.way_index.get(&key) {
            let way = &mut self.ways[index];
            way.tags = self.translation.merge_tags(kind, &way.tags, &tags);
            self.stats.merged += 1;
            return;
        }

        let index = self.ways.len();
        self.ways.push(OsmWay {
            id: -(index as i64) - 1,
            nodes: node_ids,
            tags,
        });
        self.way_index.insert(key, index);
    }

    /// Serialize as OSM XML 0.6: all nodes first, then ways
    pub fn write_xml<W: Write>(&self, out: W) -> Result<()> {
        let mut writer = Writer::new_with_indent(out, b' ', 2);

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(xml_error)?;

        let mut osm = BytesStart::new("osm");
        osm.push_attribute(("version", "0.6"));
        osm.push_attribute(("generator", concat!("piste-osm ", env!("CARGO_PKG_VERSION"))));
        osm.push_attribute(("upload", "never"));
        writer.write_event(Event::Start(osm)).map_err(xml_error)?;

        for node in &self.nodes {
            let id = node.id.to_string();
            let lat = format!("{:.7}", node.lat);
            let lon = format!("{:.7}", node.lon);

            let mut elem = BytesStart::new("node");
            elem.push_attribute(("id", id.as_str()));
            elem.push_attribute(("visible", "true"));
            elem.push_attribute(("lat", lat.as_str()));
            elem.push_attribute(("lon", lon.as_str()));

            if node.tags.is_empty() {
                writer.write_event(Event::Empty(elem)).map_err(xml_error)?;
            } else {
                writer.write_event(Event::Start(elem)).map_err(xml_error)?;
                write_tags(&mut writer, &node.tags)?;
                writer
                    .write_event(Event::End(BytesEnd::new("node")))
                    .map_err(xml_error)?;
            }
        }

        for way in &self.ways {
            let id = way.id.to_string();
            let mut elem = BytesStart::new("way");
            elem.push_attribute(("id", id.as_str()));
            elem.push_attribute(("visible", "true"));
            writer.write_event(Event::Start(elem)).map_err(xml_error)?;

            for node_id in &way.nodes {
                let node_ref = node_id.to_string();
                let mut nd = BytesStart::new("nd");
                nd.push_attribute(("ref", node_ref.as_str()));
                writer.write_event(Event::Empty(nd)).map_err(xml_error)?;
            }
            write_tags(&mut writer, &way.tags)?;

            writer
                .write_event(Event::End(BytesEnd::new("way")))
                .map_err(xml_error)?;
        }

        writer
            .write_event(Event::End(BytesEnd::new("osm")))
            .map_err(xml_error)?;
        writer.get_mut().flush()?;
        Ok(())
    }
}

fn write_tags<W: Write>(writer: &mut Writer<W>, tags: &TagSet) -> Result<()> {
    for (k, v) in tags.iter() {
        let mut tag = BytesStart::new("tag");
        tag.push_attribute(("k", k));
        tag.push_attribute(("v", v));
        writer.write_event(Event::Empty(tag)).map_err(xml_error)?;
    }
    Ok(())
}

fn xml_error<E: std::fmt::Display>(err: E) -> Error {
    Error::IoError(std::io::Error::new(
        std::io::ErrorKind::Other,
        format!("XML write failed: {err}"),
    ))
}

/// Way vertices with repeated neighbours dropped and area rings closed.
///
/// Fails without touching any state when too few distinct nodes remain.
fn way_coords(coords: &[Coord], kind: GeometryKind) -> Result<Vec<Coord>> {
    let mut kept: Vec<Coord> = Vec::with_capacity(coords.len() + 1);
    for &coord in coords {
        if kept.last().map(|&last| coord_key(last)) != Some(coord_key(coord)) {
            kept.push(coord);
        }
    }

    if kind == GeometryKind::Area {
        if let (Some(&first), Some(&last)) = (kept.first(), kept.last()) {
            if coord_key(first) != coord_key(last) {
                kept.push(first);
            }
        }
    }

    let min_nodes = if kind == GeometryKind::Area { 4 } else { 2 };
    if kept.len() < min_nodes {
        return Err(Error::InvalidGeometry(format!(
            "{} with {} distinct node(s)",
            kind.name(),
            kept.len()
        )));
    }
    Ok(kept)
}

fn coord_key(coord: Coord) -> (i64, i64) {
    (
        (coord.0 * COORD_SCALE).round() as i64,
        (coord.1 * COORD_SCALE).round() as i64,
    )
}

/// Direction-independent key for a node sequence
fn canonical_sequence(node_ids: &[i64]) -> Vec<i64> {
    let forward = node_ids.to_vec();
    let reverse: Vec<i64> = node_ids.iter().rev().copied().collect();
    forward.min(reverse)
}
