//! Point-in-zone collision query.
//!
//! Shapes are projected around a reference point, area primitives (circles
//! and polygons) go into an R-tree, and every point primitive asks the tree
//! which areas contain it. A point with no containing area is left out of the
//! result entirely.

use serde::Serialize;
use tracing::{debug, info};

use crate::analysis::primitives::{build_primitives, PlanarPrimitive, PrimitiveKind, PrimitiveSet};
use crate::data::coords::{Coordinate, LatLng};
use crate::models::shape::{Shape, ShapeId};
use crate::utils::logging::{self, CollisionStage, OperationCategory};
use crate::utils::spatial_index::{IndexedArea, SpatialIndex};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainingShape {
    pub shape_id: ShapeId,
    pub kind: PrimitiveKind,
    pub sound: Option<String>,
}

/// Areas containing one point shape. The order of `containing_shapes` follows
/// the index and carries no meaning.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Collision {
    pub point_shape_id: ShapeId,
    pub containing_shapes: Vec<ContainingShape>,
}

impl Collision {
    pub fn contains_shape(&self, id: ShapeId) -> bool {
        self.containing_shapes.iter().any(|s| s.shape_id == id)
    }
}

fn build_area_index(set: &PrimitiveSet) -> SpatialIndex {
    let _timing = logging::start_timing(
        "build_area_index",
        OperationCategory::Collision { stage: CollisionStage::IndexBuild },
    );

    let areas = set
        .iter()
        .filter(|(_, primitive, _)| primitive.is_area())
        .filter_map(|(slot, primitive, _)| {
            primitive
                .bounds()
                .map(|(min, max)| IndexedArea::new(slot, min, max))
        })
        .collect();

    SpatialIndex::bulk_load(areas)
}

fn containing_shapes(set: &PrimitiveSet, index: &SpatialIndex, point: &Coordinate) -> Vec<ContainingShape> {
    index
        .candidates_at(point)
        .filter_map(|slot| {
            let primitive = set.primitive(slot)?;
            let meta = set.meta(slot)?;
            primitive.contains(point).then(|| ContainingShape {
                shape_id: meta.shape_id,
                kind: primitive.kind(),
                sound: meta.sound.clone(),
            })
        })
        .collect()
}

/// Find, for every point shape, the area shapes that contain it.
///
/// Returns `None` for an empty shape set, without building an index. Points
/// with zero hits are omitted from the returned list.
pub fn find_collisions(shapes: &[Shape], reference: &LatLng) -> Option<Vec<Collision>> {
    if shapes.is_empty() {
        debug!("No shapes to check for collisions");
        return None;
    }

    let _timing = logging::start_timing(
        "find_collisions",
        OperationCategory::Collision { stage: CollisionStage::Query },
    );

    let set = {
        let _timing = logging::start_timing(
            "build_primitives",
            OperationCategory::Collision { stage: CollisionStage::Projection },
        );
        build_primitives(shapes, reference)
    };
    let index = build_area_index(&set);

    // Points are only ever queried, never indexed.
    let points: Vec<(ShapeId, Coordinate)> = set
        .iter()
        .filter_map(|(_, primitive, meta)| match primitive {
            PlanarPrimitive::Point(p) => Some((meta.shape_id, *p)),
            _ => None,
        })
        .collect();

    let mut collisions = Vec::new();
    for (point_shape_id, point) in &points {
        let hits = containing_shapes(&set, &index, point);
        debug!(point_shape_id = %point_shape_id, hits = hits.len(), "Queried point");
        if !hits.is_empty() {
            collisions.push(Collision {
                point_shape_id: *point_shape_id,
                containing_shapes: hits,
            });
        }
    }

    info!(
        shapes = shapes.len(),
        areas = index.len(),
        points = points.len(),
        colliding_points = collisions.len(),
        "Collision query finished"
    );

    Some(collisions)
}

/// Sounds active for a marker: the labels of every area containing it, first
/// occurrence kept, unlabeled areas skipped.
pub fn active_sounds(collisions: &[Collision], marker: ShapeId) -> Vec<String> {
    let mut sounds: Vec<String> = Vec::new();

    let containing = collisions
        .iter()
        .filter(|c| c.point_shape_id == marker)
        .flat_map(|c| c.containing_shapes.iter());

    for shape in containing {
        if let Some(sound) = &shape.sound {
            if !sounds.contains(sound) {
                sounds.push(sound.clone());
            }
        }
    }

    sounds
}
