//! Conversion pipeline - dataset in, OSM XML out
//!
//! Opens the source dataset, runs every feature through a `Translation`, builds
//! OSM nodes and ways and writes them out. Features are visited strictly in
//! source order (layers in dataset order, features in layer order), which also
//! fixes the order in which coincident geometries are merged.

pub mod driver;
pub mod geojson;
pub mod osm;

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;
use std::sync::Arc;

use log::{debug, info};

use crate::core::error::{Error, Result};
use crate::core::{Geometry, Layer, Translation};

pub use driver::Driver;
pub use osm::{OsmData, OsmNode, OsmStats, OsmWay};

/// Progress callback receiving (processed_features, total_features)
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Options for a conversion run
#[derive(Default)]
pub struct ConvertOptions {
    /// Optional progress callback
    pub progress: Option<ProgressCallback>,

    /// Read and translate, but write nothing
    pub dry_run: bool,
}

/// What a conversion run produced
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionSummary {
    pub layers: u64,
    pub features: u64,
    pub filtered: u64,
    pub skipped: u64,
    pub merged: u64,
    pub nodes: u64,
    pub ways: u64,
}

/// An opened source dataset
#[derive(Debug, Clone)]
pub struct Datasource {
    driver: Driver,
    layers: Vec<Layer>,
}

impl Datasource {
    /// Open the dataset at `path`, resolving and checking its driver once
    pub fn open(path: &Path) -> Result<Self> {
        let driver = Driver::for_path(path)?.ensure_available()?;
        debug!("Opening {} with driver {}", path.display(), driver.name());

        // Only GeoJSON passes the capability check for on-disk datasets
        let layers = vec![geojson::read_layer(path)?];

        Ok(Self { driver, layers })
    }

    /// Wrap layers that are already in memory, held by the driver named `driver_name`.
    ///
    /// Legacy names such as `Memory` resolve to `MEM`; drivers that read from
    /// disk are rejected.
    pub fn with_driver(driver_name: &str, layers: Vec<Layer>) -> Result<Self> {
        let driver = Driver::by_name(driver_name)?.ensure_available()?;
        if driver != Driver::Memory {
            return Err(Error::InvalidInput(format!(
                "driver '{}' cannot hold in-memory layers",
                driver.name()
            )));
        }
        debug!("Holding {} layer(s) with driver {}", layers.len(), driver.name());
        Ok(Self { driver, layers })
    }

    /// Wrap layers that are already in memory
    pub fn in_memory(layers: Vec<Layer>) -> Result<Self> {
        Self::with_driver("Memory", layers)
    }

    pub fn driver(&self) -> Driver {
        self.driver
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn feature_count(&self) -> u64 {
        self.layers.iter().map(|l| l.features.len() as u64).sum()
    }
}

/// Source coordinates are already WGS84
fn keep_wgs84(geometry: &Geometry) -> Geometry {
    geometry.clone()
}

/// Run every layer and feature of `datasource` through `translation`.
///
/// Returns the built OSM data and the number of features dropped by the filters.
pub fn process<'t>(
    datasource: Datasource,
    translation: &'t dyn Translation,
    options: &ConvertOptions,
) -> (OsmData<'t>, u64) {
    let total = datasource.feature_count();
    let mut data = OsmData::new(translation);
    let mut processed = 0u64;
    let mut filtered = 0u64;

    for layer in datasource.layers {
        let layer_name = layer.name.clone();
        let layer_size = layer.features.len() as u64;

        let Some(layer) = translation.filter_layer(layer) else {
            debug!("Layer '{layer_name}' filtered out");
            filtered += layer_size;
            processed += layer_size;
            if let Some(progress) = &options.progress {
                progress(processed, total);
            }
            continue;
        };

        let Layer { fields, features, .. } = layer;
        debug!("Processing layer '{layer_name}' ({} features)", features.len());

        for feature in features {
            match translation.filter_feature(feature, &fields, &keep_wgs84) {
                Some(feature) => data.add_feature(&feature),
                None => filtered += 1,
            }

            processed += 1;
            if let Some(progress) = &options.progress {
                progress(processed, total);
            }
        }
    }

    (data, filtered)
}

/// Convert the dataset at `input` into an OSM XML file at `output`.
///
/// The output's parent directory is created when missing.
pub fn convert(
    input: &Path,
    output: &Path,
    translation: &dyn Translation,
    options: &ConvertOptions,
) -> Result<ConversionSummary> {
    if !input.exists() {
        return Err(Error::InvalidInput(format!(
            "Missing {}",
            input.display()
        )));
    }

    let datasource = Datasource::open(input)?;
    let layers = datasource.layers().len() as u64;
    info!(
        "Read {} features from {} layer(s) in {}",
        datasource.feature_count(),
        layers,
        input.display()
    );

    let (data, filtered) = process(datasource, translation, options);
    let stats = data.stats();
    let summary = ConversionSummary {
        layers,
        features: stats.features,
        filtered,
        skipped: stats.skipped,
        merged: stats.merged,
        nodes: data.nodes().len() as u64,
        ways: data.ways().len() as u64,
    };

    if options.dry_run {
        info!("Dry run, not writing {}", output.display());
        return Ok(summary);
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let file = File::create(output)?;
    data.write_xml(BufWriter::new(file))?;

    info!(
        "Wrote {} nodes and {} ways to {}",
        summary.nodes,
        summary.ways,
        output.display()
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{AttributeRecord, SacTranslation, SourceFeature, TagSet, GeometryKind};
    use std::sync::atomic::{AtomicU64, Ordering};
    use tempfile::TempDir;

    fn segment(coords: &[(f64, f64)], fields: &[(&str, &str)]) -> SourceFeature {
        SourceFeature {
            geometry: Geometry::LineString(coords.to_vec()),
            attributes: fields.iter().copied().collect(),
        }
    }

    fn network_layer() -> Layer {
        Layer {
            name: "ski_network".to_string(),
            fields: vec!["segm_id".to_string(), "access".to_string()],
            features: vec![
                segment(&[(7.0, 46.0), (7.1, 46.1)], &[("segm_id", "1"), ("access", "0")]),
                segment(&[(7.1, 46.1), (7.2, 46.2)], &[("segm_id", "2"), ("access", "1")]),
            ],
        }
    }

    /// Drops every feature without a segment id
    struct SegmentsOnly;

    impl Translation for SegmentsOnly {
        fn filter_feature(
            &self,
            feature: SourceFeature,
            _fields: &[String],
            _reproject: &dyn Fn(&Geometry) -> Geometry,
        ) -> Option<SourceFeature> {
            feature.attributes.contains("segm_id").then_some(feature)
        }

        fn translate(&self, attributes: &AttributeRecord) -> TagSet {
            crate::core::translate_attributes(attributes)
        }

        fn merge_tags(&self, _kind: GeometryKind, existing: &TagSet, incoming: &TagSet) -> TagSet {
            crate::core::merge_tags(existing, incoming)
        }
    }

    /// Drops the layer named "skipped"
    struct NoSkippedLayer;

    impl Translation for NoSkippedLayer {
        fn filter_layer(&self, layer: Layer) -> Option<Layer> {
            (layer.name != "skipped").then_some(layer)
        }

        fn translate(&self, attributes: &AttributeRecord) -> TagSet {
            crate::core::translate_attributes(attributes)
        }

        fn merge_tags(&self, _kind: GeometryKind, existing: &TagSet, incoming: &TagSet) -> TagSet {
            crate::core::merge_tags(existing, incoming)
        }
    }

    #[test]
    fn test_in_memory_datasource_uses_mem_driver() {
        let datasource = Datasource::in_memory(vec![network_layer()]).unwrap();
        assert_eq!(datasource.driver(), Driver::Memory);
        assert_eq!(datasource.feature_count(), 2);
    }

    #[test]
    fn test_with_driver_resolves_legacy_names() {
        let datasource = Datasource::with_driver("memory", vec![network_layer()]).unwrap();
        assert_eq!(datasource.driver().name(), "MEM");

        assert!(matches!(
            Datasource::with_driver("GeoJSON", vec![]),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            Datasource::with_driver("GPKG", vec![]),
            Err(Error::DriverNotFound { .. })
        ));
        assert!(matches!(
            Datasource::with_driver("Memroy", vec![]),
            Err(Error::DriverNotFound { suggestion: Some(_), .. })
        ));
    }

    #[test]
    fn test_filtered_layer_still_reports_progress() {
        let seen = Arc::new(AtomicU64::new(0));
        let seen_cb = seen.clone();
        let options = ConvertOptions {
            progress: Some(Arc::new(move |done, total| {
                assert_eq!(total, 3);
                seen_cb.store(done, Ordering::SeqCst);
            })),
            ..Default::default()
        };

        let mut skipped = network_layer();
        skipped.name = "skipped".to_string();
        skipped.features.truncate(1);

        let (data, filtered) = process(
            Datasource::in_memory(vec![network_layer(), skipped]).unwrap(),
            &NoSkippedLayer,
            &options,
        );

        assert_eq!(filtered, 1);
        assert_eq!(data.ways().len(), 2);
        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_process_reports_progress() {
        let seen = Arc::new(AtomicU64::new(0));
        let seen_cb = seen.clone();
        let options = ConvertOptions {
            progress: Some(Arc::new(move |done, total| {
                assert!(done <= total);
                seen_cb.store(done, Ordering::SeqCst);
            })),
            ..Default::default()
        };

        let translation = SacTranslation::new();
        let (data, filtered) = process(
            Datasource::in_memory(vec![network_layer()]).unwrap(),
            &translation,
            &options,
        );

        assert_eq!(seen.load(Ordering::SeqCst), 2);
        assert_eq!(filtered, 0);
        assert_eq!(data.ways().len(), 2);
        assert_eq!(data.ways()[1].tags.get("sac:access"), Some("foot"));
    }

    #[test]
    fn test_feature_filter_drops_features() {
        let mut layer = network_layer();
        layer
            .features
            .push(segment(&[(8.0, 47.0), (8.1, 47.1)], &[("name", "no segment")]));

        let (data, filtered) = process(
            Datasource::in_memory(vec![layer]).unwrap(),
            &SegmentsOnly,
            &ConvertOptions::default(),
        );

        assert_eq!(filtered, 1);
        assert_eq!(data.ways().len(), 2);
    }

    #[test]
    fn test_convert_missing_input() {
        let dir = TempDir::new().unwrap();
        let result = convert(
            &dir.path().join("missing.geojson"),
            &dir.path().join("out.osm"),
            &SacTranslation::new(),
            &ConvertOptions::default(),
        );
        assert!(matches!(result, Err(Error::InvalidInput(msg)) if msg.starts_with("Missing")));
    }

    #[test]
    fn test_convert_writes_into_new_directory() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("ski_routes.geojson");
        fs::write(
            &input,
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature",
                 "geometry": {"type": "LineString", "coordinates": [[7.0, 46.0], [7.1, 46.1]]},
                 "properties": {"target_name": "Lake Loop", "name_en": "Blue"}}
            ]}"#,
        )
        .unwrap();
        let output = dir.path().join("nested/out/routes.osm");

        let summary = convert(&input, &output, &SacTranslation::new(), &ConvertOptions::default())
            .unwrap();

        assert_eq!(summary.layers, 1);
        assert_eq!(summary.features, 1);
        assert_eq!(summary.ways, 1);
        assert_eq!(summary.nodes, 2);
        let xml = fs::read_to_string(&output).unwrap();
        assert!(xml.contains("v=\"Lake Loop (Blue)\""));
    }

    #[test]
    fn test_convert_dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("routes.geojson");
        fs::write(&input, r#"{"type": "FeatureCollection", "features": []}"#).unwrap();
        let output = dir.path().join("routes.osm");

        let options = ConvertOptions {
            dry_run: true,
            ..Default::default()
        };
        let summary = convert(&input, &output, &SacTranslation::new(), &options).unwrap();

        assert_eq!(summary.features, 0);
        assert!(!output.exists());
    }

    #[test]
    fn test_convert_unsupported_driver() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("sac.gpkg");
        fs::write(&input, b"SQLite format 3\0").unwrap();

        let result = convert(
            &input,
            &dir.path().join("out.osm"),
            &SacTranslation::new(),
            &ConvertOptions::default(),
        );
        assert!(matches!(
            result,
            Err(Error::DriverNotFound { name, suggestion: Some(s) }) if name == "GPKG" && s == "GeoJSON"
        ));
    }
}
