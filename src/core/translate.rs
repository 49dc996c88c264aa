//! SAC ski touring translation - attribute semantics for piste routes
//!
//! Turns the attributes of the SAC ski touring network and route layers into
//! `type=route` + `route=piste` tag sets. Every rule degrades to "no tag" on
//! missing or malformed input; nothing here can fail.

use super::feature::GeometryKind;
use super::record::AttributeRecord;
use super::tags::TagSet;
use super::translation::Translation;

/// Placeholder name for bare network segments, so renderers don't show "Unknown"
pub const SEGMENT_PLACEHOLDER_NAME: &str = "Ski Info";

/// Route discipline, rendered as `piste:type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Discipline {
    SkiTour,
    Snowshoe,
}

impl Discipline {
    /// Unknown or missing disciplines fall back to ski touring
    pub fn from_code(code: Option<&str>) -> Discipline {
        match code {
            Some("snowshoe_tour") | Some("ski_snowshoe_tour") => Discipline::Snowshoe,
            _ => Discipline::SkiTour,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            Discipline::SkiTour => "skitour",
            Discipline::Snowshoe => "snowshoe",
        }
    }
}

/// Segment accessibility, rendered as `sac:access`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessLevel {
    Standard = 0,
    Foot = 1,
    Caution = 2,
}

impl AccessLevel {
    /// Codes outside 0..=2 have no documented meaning and map to `None`
    pub fn from_code(code: i64) -> Option<AccessLevel> {
        match code {
            0 => Some(AccessLevel::Standard),
            1 => Some(AccessLevel::Foot),
            2 => Some(AccessLevel::Caution),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> &'static str {
        match self {
            AccessLevel::Standard => "standard",
            AccessLevel::Foot => "foot",
            AccessLevel::Caution => "caution",
        }
    }
}

/// Translate one SAC attribute record into piste route tags.
///
/// Rule order matters: the segment placeholder name is written before name
/// composition so a real name always replaces it.
pub fn translate_attributes(attrs: &AttributeRecord) -> TagSet {
    let mut tags = TagSet::new();
    tags.insert("type", "route");
    tags.insert("route", "piste");

    let discipline = attrs.text("discipline");
    tags.insert(
        "piste:type",
        Discipline::from_code(discipline.as_deref()).as_tag(),
    );

    if let Some(access) = attrs.integer("access").and_then(AccessLevel::from_code) {
        tags.insert("sac:access", access.as_tag());
    }

    if !tags.contains_key("name") && attrs.text("segm_id").is_some() {
        tags.insert("name", SEGMENT_PLACEHOLDER_NAME);
    }

    // 0 both ways, 1 up, 2 down, 10 up start, 20 down start; passed through as-is
    if let Some(direction) = attrs.text("direction") {
        tags.insert("sac:direction", direction);
    }

    if let Some(difficulty) = attrs.text("difficulty_en") {
        tags.insert("piste:difficulty", difficulty);
    }

    if let Some(name) = compose_name(attrs) {
        tags.insert("name", name);
    }

    if let Some(url) = attrs.text("url_sac_en") {
        tags.insert("website", url);
    }

    if let Some(description) = compose_description(attrs) {
        tags.insert("description", description);
    }

    tags
}

/// "{target_name} ({name_en})", then `target_name`, then the raw `name`
fn compose_name(attrs: &AttributeRecord) -> Option<String> {
    match (attrs.text("target_name"), attrs.text("name_en")) {
        (Some(target), Some(name_en)) => Some(format!("{target} ({name_en})")),
        (Some(target), None) => Some(target.into_owned()),
        (None, _) => attrs.text("name").map(|n| n.into_owned()),
    }
}

fn compose_description(attrs: &AttributeRecord) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();

    if let Some(altitude) = attrs.text("target_altitude") {
        parts.push(format!("Altitude: {altitude}m."));
    }
    if let Some(difficulty) = attrs.text("difficulty_en") {
        parts.push(format!("Difficulty: {difficulty}."));
    }
    if let (Some(ascent), Some(descent)) = (
        attrs.text("ascent_altitude"),
        attrs.text("descent_altitude"),
    ) {
        parts.push(format!("Elevation gain: +{ascent}m -{descent}m."));
    }
    if let Some(times) = attrs
        .text("ascent_time_label")
        .or_else(|| attrs.text("ascent_time"))
    {
        parts.push(format!("Ascent times: {times}."));
    }
    if let Some(source) = attrs.text("source_txt") {
        parts.push(format!("Source: {source}."));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" "))
    }
}

/// Shallow union of two tag sets; `incoming` wins on every shared key.
///
/// Not commutative: callers must merge in a fixed visiting order.
pub fn merge_tags(existing: &TagSet, incoming: &TagSet) -> TagSet {
    let mut merged = existing.clone();
    merged.extend(incoming.iter());
    merged
}

/// Translation hooks for the SAC ski touring dataset
#[derive(Debug, Clone, Copy, Default)]
pub struct SacTranslation;

impl SacTranslation {
    pub fn new() -> Self {
        SacTranslation
    }
}

impl Translation for SacTranslation {
    fn translate(&self, attributes: &AttributeRecord) -> TagSet {
        translate_attributes(attributes)
    }

    fn merge_tags(&self, _kind: GeometryKind, existing: &TagSet, incoming: &TagSet) -> TagSet {
        merge_tags(existing, incoming)
    }
}
