//! GeoJSON dataset reader
//!
//! Reads a GeoJSON FeatureCollection (or a single Feature) into one `Layer`
//! named after the file stem. Coordinates are taken as WGS84 lon/lat.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::{debug, warn};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::core::error::{Error, Result};
use crate::core::{AttrValue, AttributeRecord, Coord, Geometry, Layer, SourceFeature};

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    geometry: Option<Value>,
    #[serde(default)]
    properties: Option<Map<String, Value>>,
}

/// Read the GeoJSON file at `path` into a layer
pub fn read_layer(path: &Path) -> Result<Layer> {
    let file = File::open(path)?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("layer")
        .to_string();
    parse_layer(BufReader::new(file), &name)
}

/// Parse GeoJSON from any reader into a layer called `name`.
///
/// Features without a usable geometry are skipped with a warning.
pub fn parse_layer<R: Read>(reader: R, name: &str) -> Result<Layer> {
    let root: Value = serde_json::from_reader(reader)?;

    let kind = root.get("type").and_then(Value::as_str).map(str::to_string);

    let raw_features: Vec<Value> = match (kind.as_deref(), root) {
        (Some("FeatureCollection"), Value::Object(mut object)) => match object.remove("features") {
            Some(Value::Array(features)) => features,
            _ => {
                return Err(Error::ParseError(
                    "FeatureCollection without a 'features' array".to_string(),
                ))
            }
        },
        (Some("Feature"), root) => vec![root],
        (Some(other), _) => {
            return Err(Error::ParseError(format!(
                "expected a FeatureCollection or Feature, found '{other}'"
            )))
        }
        (None, _) => {
            return Err(Error::ParseError(
                "GeoJSON object has no 'type' member".to_string(),
            ))
        }
    };

    let mut layer = Layer {
        name: name.to_string(),
        ..Default::default()
    };

    for (index, raw) in raw_features.into_iter().enumerate() {
        let raw: RawFeature = serde_json::from_value(raw)?;

        let geometry = match raw.geometry.as_ref().map(parse_geometry) {
            Some(Ok(geometry)) => geometry,
            Some(Err(e)) => {
                warn!("Skipping feature {index} of layer '{name}': {e}");
                continue;
            }
            None => {
                warn!("Skipping feature {index} of layer '{name}': no geometry");
                continue;
            }
        };

        let properties = raw.properties.unwrap_or_default();
        for key in properties.keys() {
            if !layer.fields.contains(key) {
                layer.fields.push(key.clone());
            }
        }

        let attributes: AttributeRecord = properties
            .into_iter()
            .filter_map(|(key, value)| attr_value(value).map(|v| (key, v)))
            .collect();

        layer.features.push(SourceFeature {
            geometry,
            attributes,
        });
    }

    debug!(
        "Read {} features with {} fields from layer '{}'",
        layer.features.len(),
        layer.fields.len(),
        layer.name
    );

    Ok(layer)
}

/// JSON property → attribute value; `null` means absent
fn attr_value(value: Value) -> Option<AttrValue> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(AttrValue::Text(s)),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Some(AttrValue::Integer(i)),
            None => n.as_f64().map(AttrValue::Real),
        },
        Value::Bool(b) => Some(AttrValue::Text(b.to_string())),
        other => Some(AttrValue::Text(other.to_string())),
    }
}

fn parse_geometry(value: &Value) -> Result<Geometry> {
    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .ok_or_else(|| Error::InvalidGeometry("geometry has no 'type'".to_string()))?;
    let coordinates = value
        .get("coordinates")
        .ok_or_else(|| Error::InvalidGeometry(format!("{kind} has no 'coordinates'")))?;

    match kind {
        "Point" => Ok(Geometry::Point(parse_position(coordinates)?)),
        "LineString" => Ok(Geometry::LineString(parse_positions(coordinates)?)),
        "MultiLineString" => Ok(Geometry::MultiLineString(parse_rings(coordinates)?)),
        "Polygon" => Ok(Geometry::Polygon(parse_rings(coordinates)?)),
        other => Err(Error::InvalidGeometry(format!(
            "unsupported geometry type '{other}'"
        ))),
    }
}

fn parse_position(value: &Value) -> Result<Coord> {
    let position = value
        .as_array()
        .ok_or_else(|| Error::InvalidGeometry("position is not an array".to_string()))?;

    match (
        position.first().and_then(Value::as_f64),
        position.get(1).and_then(Value::as_f64),
    ) {
        (Some(lon), Some(lat)) => Ok((lon, lat)),
        _ => Err(Error::InvalidGeometry(format!(
            "position needs numeric lon/lat, got {value}"
        ))),
    }
}

fn parse_positions(value: &Value) -> Result<Vec<Coord>> {
    value
        .as_array()
        .ok_or_else(|| Error::InvalidGeometry("expected an array of positions".to_string()))?
        .iter()
        .map(parse_position)
        .collect()
}

fn parse_rings(value: &Value) -> Result<Vec<Vec<Coord>>> {
    value
        .as_array()
        .ok_or_else(|| Error::InvalidGeometry("expected an array of lines".to_string()))?
        .iter()
        .map(parse_positions)
        .collect()
}
