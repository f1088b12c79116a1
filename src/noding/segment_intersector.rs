use geo_types::Coord;
use smallvec::SmallVec;

use crate::algorithm::{LineIntersector, RobustLineIntersector, SegmentIntersection};
use crate::noding::segment_string::SegmentString;

/// Receives candidate segment pairs found by a chain search.
///
/// Edges are passed by arena index so implementations can both read the
/// segment endpoints and append nodes to either string.
pub trait SegmentIntersector {
    fn process_intersections(
        &mut self,
        edges: &mut [SegmentString],
        edge0: usize,
        segment0: usize,
        edge1: usize,
        segment1: usize,
    );

    /// Lets a search stop early once the caller has what it needs.
    fn is_done(&self) -> bool {
        false
    }
}

/// One recorded (non-trivial) intersection between two segments.
#[derive(Clone, Debug, PartialEq)]
pub struct IntersectionRecord {
    pub edges: [usize; 2],
    pub segments: [usize; 2],
    pub points: SmallVec<[Coord<f64>; 2]>,
    pub proper: bool,
}

/// Computes intersections between segment pairs, adds them as nodes to
/// both segment strings, and tracks whether any proper intersection lies
/// in the interior of the inputs.
#[derive(Debug)]
pub struct IntersectionAdder<L: LineIntersector = RobustLineIntersector> {
    li: L,
    /// When `false`, proper intersections are detected but not added as nodes.
    pub include_proper: bool,
    boundary_nodes: Option<[Vec<Coord<f64>>; 2]>,

    has_intersection: bool,
    has_proper: bool,
    has_proper_interior: bool,
    proper_intersection_point: Option<Coord<f64>>,
    records: Vec<IntersectionRecord>,

    pub num_tests: usize,
    pub num_intersections: usize,
    pub num_interior_intersections: usize,
    pub num_proper_intersections: usize,
}

impl Default for IntersectionAdder<RobustLineIntersector> {
    fn default() -> Self {
        Self::new()
    }
}

impl IntersectionAdder<RobustLineIntersector> {
    pub fn new() -> Self {
        Self::with_intersector(RobustLineIntersector::new())
    }
}

impl<L: LineIntersector> IntersectionAdder<L> {
    pub fn with_intersector(li: L) -> Self {
        Self {
            li,
            include_proper: true,
            boundary_nodes: None,
            has_intersection: false,
            has_proper: false,
            has_proper_interior: false,
            proper_intersection_point: None,
            records: Vec::new(),
            num_tests: 0,
            num_intersections: 0,
            num_interior_intersections: 0,
            num_proper_intersections: 0,
        }
    }

    /// Proper intersections at any of these points are not counted as
    /// interior (they sit on the boundary of the inputs).
    pub fn with_boundary_nodes(mut self, nodes0: Vec<Coord<f64>>, nodes1: Vec<Coord<f64>>) -> Self {
        self.boundary_nodes = Some([nodes0, nodes1]);
        self
    }

    pub fn include_proper(mut self, include: bool) -> Self {
        self.include_proper = include;
        self
    }

    /// Any non-trivial intersection was found.
    pub fn has_intersection(&self) -> bool {
        self.has_intersection
    }

    pub fn has_proper_intersection(&self) -> bool {
        self.has_proper
    }

    /// A proper intersection was found away from every boundary node.
    pub fn has_proper_interior_intersection(&self) -> bool {
        self.has_proper_interior
    }

    /// The most recently found proper intersection point.
    pub fn proper_intersection_point(&self) -> Option<Coord<f64>> {
        self.proper_intersection_point
    }

    pub fn intersections(&self) -> &[IntersectionRecord] {
        &self.records
    }

    /// Same string, a single intersection point, and the two segments are
    /// neighbours (including the first and last segment of a closed ring).
    fn is_trivial_intersection(
        &self,
        edges: &[SegmentString],
        edge0: usize,
        segment0: usize,
        edge1: usize,
        segment1: usize,
        li: &SegmentIntersection,
    ) -> bool {
        if edge0 != edge1 || li.intersection_count() != 1 {
            return false;
        }
        if segment0.abs_diff(segment1) == 1 {
            return true;
        }
        let edge = &edges[edge0];
        if edge.is_closed() {
            let max_segment = edge.segment_count() - 1;
            if (segment0 == 0 && segment1 == max_segment)
                || (segment1 == 0 && segment0 == max_segment)
            {
                return true;
            }
        }
        false
    }

    fn is_boundary_point(&self, li: &SegmentIntersection) -> bool {
        match &self.boundary_nodes {
            Some(sets) => sets.iter().flatten().any(|&node| li.is_intersection(node)),
            None => false,
        }
    }
}

impl<L: LineIntersector> SegmentIntersector for IntersectionAdder<L> {
    fn process_intersections(
        &mut self,
        edges: &mut [SegmentString],
        edge0: usize,
        segment0: usize,
        edge1: usize,
        segment1: usize,
    ) {
        if edge0 == edge1 && segment0 == segment1 {
            return;
        }
        self.num_tests += 1;

        let (p00, p01) = edges[edge0].segment(segment0);
        let (p10, p11) = edges[edge1].segment(segment1);
        let li = self.li.compute(p00, p01, p10, p11);
        if !li.has_intersection() {
            return;
        }

        self.num_intersections += 1;
        if li.is_interior_intersection() {
            self.num_interior_intersections += 1;
        }
        edges[edge0].set_isolated(false);
        edges[edge1].set_isolated(false);

        if self.is_trivial_intersection(edges, edge0, segment0, edge1, segment1, &li) {
            return;
        }
        self.has_intersection = true;

        if self.include_proper || !li.is_proper() {
            edges[edge0].add_intersections(&li, segment0);
            edges[edge1].add_intersections(&li, segment1);
        }
        self.records.push(IntersectionRecord {
            edges: [edge0, edge1],
            segments: [segment0, segment1],
            points: li.points().iter().copied().collect(),
            proper: li.is_proper(),
        });

        if li.is_proper() {
            self.num_proper_intersections += 1;
            self.proper_intersection_point = Some(li.intersection(0));
            self.has_proper = true;
            if !self.is_boundary_point(&li) {
                self.has_proper_interior = true;
            }
        }
    }
}

/// Collects intersection points interior to at least one segment and adds
/// them as nodes. These are the points snap rounding turns into hot pixels.
#[derive(Debug, Default)]
pub struct InteriorIntersectionFinder<L: LineIntersector = RobustLineIntersector> {
    li: L,
    interior_intersections: Vec<Coord<f64>>,
}

impl<L: LineIntersector> InteriorIntersectionFinder<L> {
    pub fn new(li: L) -> Self {
        Self {
            li,
            interior_intersections: Vec::new(),
        }
    }

    pub fn interior_intersections(&self) -> &[Coord<f64>] {
        &self.interior_intersections
    }

    pub fn into_interior_intersections(self) -> Vec<Coord<f64>> {
        self.interior_intersections
    }
}

impl<L: LineIntersector> SegmentIntersector for InteriorIntersectionFinder<L> {
    fn process_intersections(
        &mut self,
        edges: &mut [SegmentString],
        edge0: usize,
        segment0: usize,
        edge1: usize,
        segment1: usize,
    ) {
        if edge0 == edge1 && segment0 == segment1 {
            return;
        }
        let (p00, p01) = edges[edge0].segment(segment0);
        let (p10, p11) = edges[edge1].segment(segment1);
        let li = self.li.compute(p00, p01, p10, p11);
        if li.has_intersection() && li.is_interior_intersection() {
            self.interior_intersections.extend_from_slice(li.points());
            edges[edge0].add_intersections(&li, segment0);
            edges[edge1].add_intersections(&li, segment1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ss(pts: &[(f64, f64)]) -> SegmentString {
        SegmentString::new(pts.iter().map(|&(x, y)| Coord { x, y }).collect()).unwrap()
    }

    #[test]
    fn test_proper_crossing_is_recorded() {
        let mut edges = vec![ss(&[(0.0, 0.0), (10.0, 10.0)]), ss(&[(0.0, 10.0), (10.0, 0.0)])];
        let mut adder = IntersectionAdder::new();
        adder.process_intersections(&mut edges, 0, 0, 1, 0);

        assert!(adder.has_intersection());
        assert!(adder.has_proper_intersection());
        assert!(adder.has_proper_interior_intersection());
        assert_eq!(adder.proper_intersection_point(), Some(Coord { x: 5.0, y: 5.0 }));
        assert_eq!(adder.num_proper_intersections, 1);
        assert!(!edges[0].is_isolated() && !edges[1].is_isolated());
        assert_eq!(edges[0].nodes().len(), 1);
        assert_eq!(edges[1].nodes().len(), 1);
    }

    #[test]
    fn test_adjacent_segments_are_trivial() {
        let mut edges = vec![ss(&[(0.0, 0.0), (5.0, 0.0), (5.0, 5.0)])];
        let mut adder = IntersectionAdder::new();
        adder.process_intersections(&mut edges, 0, 0, 0, 1);
        assert_eq!(adder.num_intersections, 1);
        assert!(!adder.has_intersection());
        assert!(edges[0].nodes().is_empty());
        assert!(!edges[0].is_isolated());
    }

    #[test]
    fn test_closed_ring_wraparound_is_trivial() {
        let mut edges = vec![ss(&[(0.0, 0.0), (5.0, 0.0), (5.0, 5.0), (0.0, 5.0), (0.0, 0.0)])];
        let mut adder = IntersectionAdder::new();
        adder.process_intersections(&mut edges, 0, 0, 0, 3);
        assert!(!adder.has_intersection());
        adder.process_intersections(&mut edges, 0, 0, 0, 0);
        assert_eq!(adder.num_tests, 1);
    }

    #[test]
    fn test_boundary_node_is_not_interior() {
        let mut edges = vec![ss(&[(0.0, 0.0), (10.0, 10.0)]), ss(&[(0.0, 10.0), (10.0, 0.0)])];
        let mut adder = IntersectionAdder::new()
            .with_boundary_nodes(vec![Coord { x: 5.0, y: 5.0 }], Vec::new());
        adder.process_intersections(&mut edges, 0, 0, 1, 0);
        assert!(adder.has_proper_intersection());
        assert!(!adder.has_proper_interior_intersection());
    }

    #[test]
    fn test_exclude_proper_keeps_nodes_out() {
        let mut edges = vec![ss(&[(0.0, 0.0), (10.0, 10.0)]), ss(&[(0.0, 10.0), (10.0, 0.0)])];
        let mut adder = IntersectionAdder::new().include_proper(false);
        adder.process_intersections(&mut edges, 0, 0, 1, 0);
        assert!(adder.has_proper_intersection());
        assert!(edges[0].nodes().is_empty());
    }

    #[test]
    fn test_interior_finder_ignores_endpoint_touch() {
        let mut edges = vec![
            ss(&[(0.0, 0.0), (5.0, 5.0)]),
            ss(&[(5.0, 5.0), (10.0, 0.0)]),
            ss(&[(0.0, 5.0), (10.0, 5.0)]),
        ];
        let mut finder = InteriorIntersectionFinder::new(RobustLineIntersector::new());
        finder.process_intersections(&mut edges, 0, 0, 1, 0);
        assert!(finder.interior_intersections().is_empty());
        finder.process_intersections(&mut edges, 0, 0, 2, 0);
        assert_eq!(finder.interior_intersections(), &[Coord { x: 5.0, y: 5.0 }]);
        assert_eq!(edges[2].nodes().len(), 1);
    }
}
