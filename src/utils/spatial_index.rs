use std::fmt;

use rstar::{RTree, RTreeObject, AABB};

use crate::data::coords::Coordinate;

/// Bounding box of one indexed area, pointing back at its primitive slot.
#[derive(Clone, Debug)]
pub struct IndexedArea {
    slot: usize,
    envelope: AABB<[f64; 2]>,
}

impl IndexedArea {
    pub fn new(slot: usize, min: Coordinate, max: Coordinate) -> Self {
        Self {
            slot,
            envelope: AABB::from_corners([min.x, min.y], [max.x, max.y]),
        }
    }

    pub fn slot(&self) -> usize {
        self.slot
    }
}

impl RTreeObject for IndexedArea {
    type Envelope = AABB<[f64; 2]>;

    #[inline]
    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

/// R-tree over area bounding boxes. Envelope hits are candidates only; the
/// caller still has to test the exact geometry.
#[derive(Clone)]
pub struct SpatialIndex {
    tree: RTree<IndexedArea>,
}

impl fmt::Debug for SpatialIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpatialIndex")
            .field("size", &self.tree.size())
            .finish()
    }
}

impl SpatialIndex {
    pub fn bulk_load(areas: Vec<IndexedArea>) -> Self {
        Self {
            tree: RTree::bulk_load(areas),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Slots whose bounding box contains `point`, edges included.
    pub fn candidates_at<'a>(&'a self, point: &Coordinate) -> impl Iterator<Item = usize> + 'a {
        let query_box = AABB::from_point([point.x, point.y]);
        self.tree
            .locate_in_envelope_intersecting(&query_box)
            .map(IndexedArea::slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> SpatialIndex {
        SpatialIndex::bulk_load(vec![
            IndexedArea::new(0, Coordinate::new(0.0, 0.0), Coordinate::new(10.0, 10.0)),
            IndexedArea::new(1, Coordinate::new(5.0, 5.0), Coordinate::new(20.0, 20.0)),
            IndexedArea::new(2, Coordinate::new(-30.0, -30.0), Coordinate::new(-20.0, -20.0)),
        ])
    }

    #[test]
    fn test_overlapping_boxes_both_hit() {
        let index = sample_index();
        let mut hits: Vec<_> = index.candidates_at(&Coordinate::new(7.0, 7.0)).collect();
        hits.sort();
        assert_eq!(hits, vec![0, 1]);
    }

    #[test]
    fn test_edge_counts_as_hit() {
        let index = sample_index();
        let hits: Vec<_> = index.candidates_at(&Coordinate::new(-20.0, -25.0)).collect();
        assert_eq!(hits, vec![2]);
    }

    #[test]
    fn test_miss() {
        let index = sample_index();
        assert_eq!(index.candidates_at(&Coordinate::new(100.0, 100.0)).count(), 0);
        assert_eq!(index.len(), 3);
    }
}
