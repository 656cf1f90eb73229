use chrono::Utc;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analysis::collision::{find_collisions, Collision};
use crate::data::coords::LatLng;
use crate::models::shape::{Shape, ShapeGeometry, ShapeId};

#[derive(Debug, Error, PartialEq)]
pub enum ShapeLayerError {
    #[error("no shape with id {0}")]
    UnknownShape(ShapeId),
    #[error("shape id {0} already exists")]
    DuplicateShape(ShapeId),
}

/// The shapes drawn in one session.
#[derive(Debug, Clone, Default)]
pub struct ShapeLayer {
    shapes: Vec<Shape>,
    last_id: Option<ShapeId>,
}

impl ShapeLayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_shapes(shapes: Vec<Shape>) -> Result<Self, ShapeLayerError> {
        let mut layer = Self::new();
        for shape in shapes {
            layer.insert(shape)?;
        }
        Ok(layer)
    }

    /// Build a layer from an exported file. Later shapes reusing an id are
    /// dropped with a warning; the first one wins.
    pub fn from_import(shapes: Vec<Shape>) -> Self {
        let mut layer = Self::new();
        for shape in shapes {
            if let Err(ShapeLayerError::DuplicateShape(id)) = layer.insert(shape) {
                warn!(shape_id = %id, "Duplicate shape id in import, skipping");
            }
        }
        layer
    }

    // Timestamp ids, bumped when two shapes land in the same millisecond.
    fn next_id(&mut self) -> ShapeId {
        let now = ShapeId(Utc::now().timestamp_millis());
        let id = match self.last_id {
            Some(last) if now <= last => ShapeId(last.0 + 1),
            _ => now,
        };
        self.last_id = Some(id);
        id
    }

    /// Record a finished drawing and return its new id.
    pub fn add(&mut self, geometry: ShapeGeometry) -> ShapeId {
        let id = self.next_id();
        let shape = Shape::new(id, geometry);
        info!(shape_id = %id, kind = shape.kind(), "Shape drawn");
        self.shapes.push(shape);
        id
    }

    /// Insert a shape that already has an id, e.g. from an import.
    pub fn insert(&mut self, shape: Shape) -> Result<(), ShapeLayerError> {
        if self.get(shape.id).is_some() {
            return Err(ShapeLayerError::DuplicateShape(shape.id));
        }
        if self.last_id.map_or(true, |last| shape.id > last) {
            self.last_id = Some(shape.id);
        }
        self.shapes.push(shape);
        Ok(())
    }

    pub fn assign_sound(&mut self, id: ShapeId, sound: impl Into<String>) -> Result<(), ShapeLayerError> {
        let shape = self
            .shapes
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(ShapeLayerError::UnknownShape(id))?;
        let sound = sound.into();
        info!(shape_id = %id, sound = %sound, "Assigned sound");
        shape.sound = Some(sound);
        Ok(())
    }

    pub fn delete(&mut self, id: ShapeId) -> Option<Shape> {
        let pos = self.shapes.iter().position(|s| s.id == id)?;
        debug!(shape_id = %id, "Deleted shape");
        Some(self.shapes.remove(pos))
    }

    pub fn clear(&mut self) {
        debug!(count = self.shapes.len(), "Cleared all shapes");
        self.shapes.clear();
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id == id)
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn collisions(&self, reference: &LatLng) -> Option<Vec<Collision>> {
        find_collisions(&self.shapes, reference)
    }
}
