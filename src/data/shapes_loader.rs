use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::models::shape::Shape;
use crate::utils::logging::{self, FileIOType, OperationCategory};

#[derive(Debug, Error)]
pub enum ShapesLoadError {
    #[error("IO error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid shapes file {path}: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Read a JSON array of shapes as exported by the drawing UI.
pub fn load_shapes(path: impl AsRef<Path>) -> Result<Vec<Shape>, ShapesLoadError> {
    let _timing = logging::start_timing(
        "load_shapes",
        OperationCategory::FileIO { subcategory: FileIOType::ShapesLoad },
    );
    let path = path.as_ref();
    let display = || path.display().to_string();

    let file = File::open(path).map_err(|source| ShapesLoadError::Io { path: display(), source })?;
    let shapes: Vec<Shape> = serde_json::from_reader(BufReader::new(file))
        .map_err(|source| ShapesLoadError::Json { path: display(), source })?;

    info!(count = shapes.len(), path = %path.display(), "Loaded shapes");
    Ok(shapes)
}

pub fn save_shapes(path: impl AsRef<Path>, shapes: &[Shape]) -> Result<(), ShapesLoadError> {
    let path = path.as_ref();
    let display = || path.display().to_string();

    let file = File::create(path).map_err(|source| ShapesLoadError::Io { path: display(), source })?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, shapes)
        .map_err(|source| ShapesLoadError::Json { path: display(), source })?;
    writer.flush().map_err(|source| ShapesLoadError::Io { path: display(), source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::coords::LatLng;
    use crate::models::shape::{ShapeGeometry, ShapeId};

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shapes.json");
        let shapes = vec![
            Shape::new(ShapeId(1), ShapeGeometry::Marker(LatLng::new(1.0, 2.0))).with_sound("drum"),
            Shape::new(ShapeId(2), ShapeGeometry::Polyline(vec![LatLng::new(0.0, 0.0), LatLng::new(1.0, 1.0)])),
        ];

        save_shapes(&path, &shapes).unwrap();
        assert_eq!(load_shapes(&path).unwrap(), shapes);
    }

    #[test]
    fn test_unknown_type_does_not_fail_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[
                {{"id": 1, "type": "circle", "coordinates": {{"center": [42.3, -83.7], "radius": 50.0}}}},
                {{"id": 2, "type": "marker", "coordinates": [42.3, -83.7]}},
                {{"id": 3, "type": "hexagon", "coordinates": null}}
            ]"#
        )
        .unwrap();

        let shapes = load_shapes(file.path()).unwrap();
        assert_eq!(shapes.len(), 3);
        assert_eq!(shapes[2].kind(), "hexagon");
    }

    #[test]
    fn test_missing_file() {
        let err = load_shapes("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ShapesLoadError::Io { .. }));
    }

    #[test]
    fn test_bad_shape_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"[{{"id": 1, "type": "circle", "coordinates": [1.0, 2.0]}}]"#).unwrap();

        let err = load_shapes(file.path()).unwrap_err();
        assert!(matches!(err, ShapesLoadError::Json { .. }));
        assert!(err.to_string().contains("malformed coordinates"), "{}", err);
    }
}
