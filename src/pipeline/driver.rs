//! Dataset driver resolution
//!
//! Maps dataset paths and driver names onto the readers built into piste-osm.
//! Legacy driver names are normalized here, once, when a datasource is opened.

use std::path::Path;

use strsim::{jaro_winkler, normalized_levenshtein};

use crate::core::error::{Error, Result};

/// Dataset drivers known to the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Driver {
    GeoJson,
    /// Layers held in memory, built by callers rather than read from disk
    Memory,
    GeoPackage,
    Shapefile,
}

/// Older driver names still found in scripts and configs
const DRIVER_ALIASES: &[(&str, Driver)] = &[("Memory", Driver::Memory), ("JSON", Driver::GeoJson)];

const DRIVER_EXTENSIONS: &[(&str, Driver)] = &[
    ("geojson", Driver::GeoJson),
    ("json", Driver::GeoJson),
    ("gpkg", Driver::GeoPackage),
    ("shp", Driver::Shapefile),
];

impl Driver {
    pub fn all() -> &'static [Driver] {
        &[
            Driver::GeoJson,
            Driver::Memory,
            Driver::GeoPackage,
            Driver::Shapefile,
        ]
    }

    /// Canonical driver name
    pub fn name(&self) -> &'static str {
        match self {
            Driver::GeoJson => "GeoJSON",
            Driver::Memory => "MEM",
            Driver::GeoPackage => "GPKG",
            Driver::Shapefile => "ESRI Shapefile",
        }
    }

    /// Whether a reader for this driver is built in
    pub fn is_available(&self) -> bool {
        matches!(self, Driver::GeoJson | Driver::Memory)
    }

    /// Resolve a driver by canonical name or alias (case-insensitive)
    pub fn by_name(name: &str) -> Result<Driver> {
        if let Some(driver) = Driver::all()
            .iter()
            .find(|d| d.name().eq_ignore_ascii_case(name))
        {
            return Ok(*driver);
        }

        if let Some((_, driver)) = DRIVER_ALIASES
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
        {
            return Ok(*driver);
        }

        let candidates: Vec<&str> = Driver::all()
            .iter()
            .map(|d| d.name())
            .chain(DRIVER_ALIASES.iter().map(|(alias, _)| *alias))
            .collect();

        Err(Error::DriverNotFound {
            name: name.to_string(),
            suggestion: suggest_name(name, &candidates),
        })
    }

    /// Resolve the driver for a dataset path from its file extension
    pub fn for_path(path: &Path) -> Result<Driver> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        if let Some((_, driver)) = DRIVER_EXTENSIONS.iter().find(|(ext, _)| *ext == extension) {
            return Ok(*driver);
        }

        let candidates: Vec<&str> = DRIVER_EXTENSIONS.iter().map(|(ext, _)| *ext).collect();
        Err(Error::DriverNotFound {
            name: if extension.is_empty() {
                path.display().to_string()
            } else {
                format!(".{extension}")
            },
            suggestion: suggest_name(&extension, &candidates).map(|ext| format!(".{ext}")),
        })
    }

    /// Capability check run once when a datasource is opened
    pub fn ensure_available(self) -> Result<Driver> {
        if self.is_available() {
            Ok(self)
        } else {
            // GeoJSON is the only built-in reader for files
            Err(Error::DriverNotFound {
                name: self.name().to_string(),
                suggestion: Some(Driver::GeoJson.name().to_string()),
            })
        }
    }
}

/// Closest candidate to `input`, if any is similar enough.
///
/// Scores 70% Jaro-Winkler plus 30% normalized Levenshtein, case-insensitive.
fn suggest_name(input: &str, candidates: &[&str]) -> Option<String> {
    if input.is_empty() {
        return None;
    }

    let input_lower = input.to_lowercase();
    let min_threshold = 0.7;

    let mut best: Option<(&str, f64)> = None;
    for candidate in candidates {
        let candidate_lower = candidate.to_lowercase();
        let score = jaro_winkler(&input_lower, &candidate_lower) * 0.7
            + normalized_levenshtein(&input_lower, &candidate_lower) * 0.3;

        if score >= min_threshold && best.map_or(true, |(_, s)| score > s) {
            best = Some((*candidate, score));
        }
    }

    best.map(|(name, _)| name.to_string())
}
