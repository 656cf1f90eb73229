// Planar primitives built from drawn shapes
use geo::{BoundingRect, Intersects, LineString, Polygon};
use serde::Serialize;
use tracing::{debug, warn};

use crate::config::const_funcs::project_latlng;
use crate::config::constants::MIN_POLYGON_VERTICES;
use crate::data::coords::{Coordinate, LatLng};
use crate::models::shape::{Shape, ShapeGeometry, ShapeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveKind {
    Point,
    Circle,
    Polygon,
}

/// Projected geometry of a shape, in meters around the reference point.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanarPrimitive {
    Point(Coordinate),
    Circle { center: Coordinate, radius: f64 },
    Polygon(Polygon<f64>),
}

impl PlanarPrimitive {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            PlanarPrimitive::Point(_) => PrimitiveKind::Point,
            PlanarPrimitive::Circle { .. } => PrimitiveKind::Circle,
            PlanarPrimitive::Polygon(_) => PrimitiveKind::Polygon,
        }
    }

    pub fn is_area(&self) -> bool {
        !matches!(self, PlanarPrimitive::Point(_))
    }

    /// Axis-aligned bounds as (min, max).
    pub fn bounds(&self) -> Option<(Coordinate, Coordinate)> {
        match self {
            PlanarPrimitive::Point(p) => Some((*p, *p)),
            PlanarPrimitive::Circle { center, radius } => Some((
                Coordinate::new(center.x - radius, center.y - radius),
                Coordinate::new(center.x + radius, center.y + radius),
            )),
            PlanarPrimitive::Polygon(polygon) => polygon.bounding_rect().map(|rect| {
                (
                    Coordinate::new(rect.min().x, rect.min().y),
                    Coordinate::new(rect.max().x, rect.max().y),
                )
            }),
        }
    }

    /// Containment test with the boundary counted as inside.
    pub fn contains(&self, point: &Coordinate) -> bool {
        match self {
            PlanarPrimitive::Point(p) => p == point,
            PlanarPrimitive::Circle { center, radius } => center.distance_to(point) <= *radius,
            PlanarPrimitive::Polygon(polygon) => polygon.intersects(&geo::Coord::from(*point)),
        }
    }
}

/// Side-table entry for a primitive: the owning shape and its sound.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PrimitiveMeta {
    pub shape_id: ShapeId,
    pub sound: Option<String>,
}

/// Primitives and their metadata, addressed by slot.
#[derive(Debug, Clone, Default)]
pub struct PrimitiveSet {
    primitives: Vec<PlanarPrimitive>,
    meta: Vec<PrimitiveMeta>,
}

impl PrimitiveSet {
    pub fn push(&mut self, primitive: PlanarPrimitive, meta: PrimitiveMeta) -> usize {
        self.primitives.push(primitive);
        self.meta.push(meta);
        self.primitives.len() - 1
    }

    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    pub fn primitive(&self, slot: usize) -> Option<&PlanarPrimitive> {
        self.primitives.get(slot)
    }

    pub fn meta(&self, slot: usize) -> Option<&PrimitiveMeta> {
        self.meta.get(slot)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &PlanarPrimitive, &PrimitiveMeta)> {
        self.primitives
            .iter()
            .zip(self.meta.iter())
            .enumerate()
            .map(|(slot, (primitive, meta))| (slot, primitive, meta))
    }
}

fn project_ring(ring: &[LatLng], reference: &LatLng) -> Vec<Coordinate> {
    ring.iter().map(|pos| project_latlng(pos, reference)).collect()
}

fn build_polygon(shape: &Shape, ring: &[LatLng], reference: &LatLng) -> Option<PlanarPrimitive> {
    if ring.len() < MIN_POLYGON_VERTICES {
        warn!(
            shape_id = %shape.id,
            vertices = ring.len(),
            "Skipping {} with too few vertices",
            shape.kind()
        );
        return None;
    }

    // LineString closes the ring itself when the polygon is built.
    let exterior: LineString<f64> = project_ring(ring, reference)
        .into_iter()
        .map(geo::Coord::from)
        .collect();

    Some(PlanarPrimitive::Polygon(Polygon::new(exterior, vec![])))
}

/// Project one shape into the plane. Unsupported kinds and invalid geometry
/// yield `None`.
pub fn build_primitive(shape: &Shape, reference: &LatLng) -> Option<PlanarPrimitive> {
    if let Err(e) = shape.validate() {
        warn!(shape_id = %shape.id, error = %e, "Skipping invalid shape");
        return None;
    }

    match &shape.geometry {
        ShapeGeometry::Marker(pos) => Some(PlanarPrimitive::Point(project_latlng(pos, reference))),
        ShapeGeometry::Circle(circle) => Some(PlanarPrimitive::Circle {
            center: project_latlng(&circle.center, reference),
            radius: circle.radius,
        }),
        ShapeGeometry::Polygon(ring) | ShapeGeometry::Rectangle(ring) => {
            build_polygon(shape, ring, reference)
        }
        ShapeGeometry::Polyline(_)
        | ShapeGeometry::CircleMarker(_)
        | ShapeGeometry::Unsupported { .. } => {
            warn!(
                shape_id = %shape.id,
                "Shape type {} not supported for collisions, skipping",
                shape.kind()
            );
            None
        }
    }
}

pub fn build_primitives(shapes: &[Shape], reference: &LatLng) -> PrimitiveSet {
    let mut set = PrimitiveSet::default();

    for shape in shapes {
        if let Some(primitive) = build_primitive(shape, reference) {
            debug!(shape_id = %shape.id, kind = ?primitive.kind(), "Built planar primitive");
            set.push(
                primitive,
                PrimitiveMeta {
                    shape_id: shape.id,
                    sound: shape.sound.clone(),
                },
            );
        }
    }

    set
}
