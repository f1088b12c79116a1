//! Segment/segment intersection classification.
//!
//! Every higher level component (chain search, hot pixels, the noding
//! validator and the topology-preserving simplifier) talks to the
//! [`LineIntersector`] trait, so a different predicate can be swapped in
//! through a type parameter.

use geo::algorithm::line_intersection::{line_intersection, LineIntersection};
use geo::Line;
use geo_types::Coord;
use smallvec::SmallVec;

use crate::utils::make_precise;

/// Computes the intersection of segment `p1-p2` with segment `q1-q2`.
pub trait LineIntersector {
    fn compute(
        &self,
        p1: Coord<f64>,
        p2: Coord<f64>,
        q1: Coord<f64>,
        q2: Coord<f64>,
    ) -> SegmentIntersection;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntersectionKind {
    None,
    Point,
    Collinear,
}

/// Outcome of one [`LineIntersector::compute`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct SegmentIntersection {
    kind: IntersectionKind,
    points: SmallVec<[Coord<f64>; 2]>,
    proper: bool,
    input: [[Coord<f64>; 2]; 2],
}

impl SegmentIntersection {
    fn none(input: [[Coord<f64>; 2]; 2]) -> Self {
        Self {
            kind: IntersectionKind::None,
            points: SmallVec::new(),
            proper: false,
            input,
        }
    }

    pub fn kind(&self) -> IntersectionKind {
        self.kind
    }

    pub fn has_intersection(&self) -> bool {
        self.kind != IntersectionKind::None
    }

    /// 0, 1 or 2 (the latter for a collinear overlap).
    pub fn intersection_count(&self) -> usize {
        self.points.len()
    }

    pub fn intersection(&self, i: usize) -> Coord<f64> {
        self.points[i]
    }

    pub fn points(&self) -> &[Coord<f64>] {
        &self.points
    }

    pub fn is_collinear(&self) -> bool {
        self.kind == IntersectionKind::Collinear
    }

    /// A single intersection point interior to both segments.
    pub fn is_proper(&self) -> bool {
        self.has_intersection() && self.proper
    }

    /// One of the two input segments, `0` for `p1-p2` and `1` for `q1-q2`.
    pub fn endpoints(&self, input: usize) -> [Coord<f64>; 2] {
        self.input[input]
    }

    /// Whether any intersection point is interior to either input segment.
    pub fn is_interior_intersection(&self) -> bool {
        self.is_interior_intersection_of(0) || self.is_interior_intersection_of(1)
    }

    /// Whether any intersection point is interior to the given input segment.
    pub fn is_interior_intersection_of(&self, input: usize) -> bool {
        let [a, b] = self.input[input];
        self.points.iter().any(|&pt| pt != a && pt != b)
    }

    /// Whether `pt` is one of the computed intersection points. For a
    /// collinear overlap only the overlap endpoints match.
    pub fn is_intersection(&self, pt: Coord<f64>) -> bool {
        self.points.iter().any(|&p| p == pt)
    }
}

/// Intersector built on `geo`'s robust segment intersection.
///
/// Improper intersections always report an input endpoint exactly; only the
/// proper intersection point is computed (and optionally rounded onto the
/// `1/scale` lattice).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RobustLineIntersector {
    scale: Option<f64>,
}

impl RobustLineIntersector {
    pub fn new() -> Self {
        Self { scale: None }
    }

    /// Rounds computed intersection points onto the `1/scale` lattice.
    pub fn with_scale(scale: f64) -> Self {
        Self { scale: Some(scale) }
    }

    pub fn scale(&self) -> Option<f64> {
        self.scale
    }

    fn round(&self, pt: Coord<f64>) -> Coord<f64> {
        match self.scale {
            Some(scale) => make_precise(pt, scale),
            None => pt,
        }
    }
}

impl LineIntersector for RobustLineIntersector {
    fn compute(
        &self,
        p1: Coord<f64>,
        p2: Coord<f64>,
        q1: Coord<f64>,
        q2: Coord<f64>,
    ) -> SegmentIntersection {
        let input = [[p1, p2], [q1, q2]];
        let Some(result) = line_intersection(Line::new(p1, p2), Line::new(q1, q2)) else {
            return SegmentIntersection::none(input);
        };

        let mut points = SmallVec::new();
        match result {
            LineIntersection::SinglePoint {
                intersection,
                is_proper,
            } => {
                // Improper points are input endpoints and stay exact.
                points.push(if is_proper { self.round(intersection) } else { intersection });
                SegmentIntersection {
                    kind: IntersectionKind::Point,
                    points,
                    proper: is_proper,
                    input,
                }
            }
            LineIntersection::Collinear { intersection } => {
                points.push(intersection.start);
                points.push(intersection.end);
                SegmentIntersection {
                    kind: IntersectionKind::Collinear,
                    points,
                    proper: false,
                    input,
                }
            }
        }
    }
}
