use geo_types::Line;
use rstar::{RTree, AABB};

use crate::simplify::tagged_line_string::TaggedLineSegment;

/// An R-tree of tagged segments supporting removal.
#[derive(Debug, Default)]
pub struct LineSegmentIndex {
    tree: RTree<TaggedLineSegment>,
}

impl LineSegmentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, seg: TaggedLineSegment) {
        self.tree.insert(seg);
    }

    pub fn remove(&mut self, seg: &TaggedLineSegment) -> bool {
        self.tree.remove(seg).is_some()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }

    /// Segments whose envelopes intersect the envelope of `query`.
    pub fn query<'a>(
        &'a self,
        query: &Line<f64>,
    ) -> impl Iterator<Item = &'a TaggedLineSegment> + 'a {
        let env = AABB::from_corners([query.start.x, query.start.y], [query.end.x, query.end.y]);
        self.tree.locate_in_envelope_intersecting(&env)
    }

    /// Builds the index in one pass, which packs the tree better than
    /// repeated inserts.
    pub fn bulk_load(segments: Vec<TaggedLineSegment>) -> Self {
        Self {
            tree: RTree::bulk_load(segments),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::Coord;

    fn seg(x0: f64, y0: f64, x1: f64, y1: f64, index: usize) -> TaggedLineSegment {
        TaggedLineSegment::new(Coord { x: x0, y: y0 }, Coord { x: x1, y: y1 }, 0, index)
    }

    #[test]
    fn test_query_and_remove() {
        let mut index = LineSegmentIndex::bulk_load(vec![
            seg(0.0, 0.0, 1.0, 1.0, 0),
            seg(5.0, 5.0, 6.0, 6.0, 1),
        ]);
        let query = Line::new(Coord { x: 0.5, y: 1.0 }, Coord { x: 0.5, y: 0.0 });
        let found: Vec<_> = index.query(&query).map(|s| s.index).collect();
        assert_eq!(found, vec![0]);

        assert!(index.remove(&seg(0.0, 0.0, 1.0, 1.0, 0)));
        assert!(!index.remove(&seg(0.0, 0.0, 1.0, 1.0, 0)));
        assert_eq!(index.query(&query).count(), 0);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_equal_geometry_different_tags() {
        let mut index = LineSegmentIndex::new();
        index.add(seg(0.0, 0.0, 1.0, 0.0, 0));
        index.add(seg(0.0, 0.0, 1.0, 0.0, 1));
        assert!(index.remove(&seg(0.0, 0.0, 1.0, 0.0, 1)));
        let query = Line::new(Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 0.0 });
        let left: Vec<_> = index.query(&query).collect();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].index, 0);
    }
}
