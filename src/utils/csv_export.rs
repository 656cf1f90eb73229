use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;
use thiserror::Error;
use tracing::info;

use crate::analysis::collision::Collision;
use crate::analysis::primitives::PrimitiveKind;
use crate::models::shape::ShapeId;
use crate::utils::logging::{self, FileIOType, OperationCategory};

#[derive(Debug, Error)]
pub enum CsvExportError {
    #[error("failed to create output directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
struct CollisionRow<'a> {
    point_shape_id: ShapeId,
    containing_shape_id: ShapeId,
    containing_kind: PrimitiveKind,
    sound: Option<&'a str>,
}

/// Writes collision results into a timestamped directory.
pub struct CsvExporter {
    output_dir: PathBuf,
    timestamp: String,
}

impl CsvExporter {
    pub fn new(output_dir: impl AsRef<Path>) -> Result<Self, CsvExportError> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();

        let full_path = output_dir.as_ref().join(&timestamp);
        std::fs::create_dir_all(&full_path).map_err(|source| CsvExportError::CreateDir {
            path: full_path.display().to_string(),
            source,
        })?;

        Ok(Self {
            output_dir: full_path,
            timestamp,
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// One row per (point, containing shape) pair.
    pub fn export_collisions(&self, collisions: &[Collision]) -> Result<PathBuf, CsvExportError> {
        let _timing = logging::start_timing(
            "export_collisions",
            OperationCategory::FileIO { subcategory: FileIOType::CsvExport },
        );
        let path = self.output_dir.join("collisions.csv");
        write_collisions(&path, collisions)?;
        info!(path = %path.display(), "Exported collisions");
        Ok(path)
    }
}

pub fn write_collisions(path: &Path, collisions: &[Collision]) -> Result<(), CsvExportError> {
    let mut writer = csv::Writer::from_path(path)?;

    for collision in collisions {
        for shape in &collision.containing_shapes {
            writer.serialize(CollisionRow {
                point_shape_id: collision.point_shape_id,
                containing_shape_id: shape.shape_id,
                containing_kind: shape.kind,
                sound: shape.sound.as_deref(),
            })?;
        }
    }

    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::collision::ContainingShape;

    #[test]
    fn test_rows_per_pair() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = CsvExporter::new(dir.path()).unwrap();
        assert!(exporter.output_dir().ends_with(exporter.timestamp()));

        let collisions = vec![Collision {
            point_shape_id: ShapeId(1),
            containing_shapes: vec![
                ContainingShape { shape_id: ShapeId(2), kind: PrimitiveKind::Circle, sound: Some("bass".into()) },
                ContainingShape { shape_id: ShapeId(3), kind: PrimitiveKind::Polygon, sound: None },
            ],
        }];

        let path = exporter.export_collisions(&collisions).unwrap();
        let contents = std::fs::read_to_string(path).unwrap();
        assert_eq!(
            contents,
            "point_shape_id,containing_shape_id,containing_kind,sound\n1,2,circle,bass\n1,3,polygon,\n"
        );
    }
}
