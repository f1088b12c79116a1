//! Vertex reduction for line strings.
//!
//! [`DouglasPeuckerLineSimplifier`] and [`VWLineSimplifier`] are purely
//! geometric. [`TopologyPreservingSimplifier`] additionally refuses any
//! simplification that would make a line cross itself or any other line
//! simplified with it.

pub mod douglas_peucker;
pub mod segment_index;
pub mod tagged_line_string;
pub mod topology_preserving;
pub mod visvalingam;


use geo::EuclideanDistance;
use geo_types::{Coord, Line, LineString, Point};
use log::debug;

use crate::error::{Error, Result};

pub use douglas_peucker::DouglasPeuckerLineSimplifier;
pub use segment_index::LineSegmentIndex;
pub use tagged_line_string::{TaggedLineSegment, TaggedLineString};
pub use topology_preserving::{TaggedLineStringSimplifier, TopologyPreservingSimplifier};
pub use visvalingam::VWLineSimplifier;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SimplifyMethod {
    DouglasPeucker,
    VisvalingamWhyatt,
    TopologyPreserving,
}

/// Simplifies one line string with the chosen algorithm.
///
/// `tolerance` is a distance for all three methods; Visvalingam-Whyatt
/// compares triangle areas against its square.
pub fn simplify(
    line: &LineString<f64>,
    tolerance: f64,
    method: SimplifyMethod,
) -> Result<LineString<f64>> {
    let coords = match method {
        SimplifyMethod::DouglasPeucker => {
            DouglasPeuckerLineSimplifier::new(tolerance)?.simplify(&line.0)?
        }
        SimplifyMethod::VisvalingamWhyatt => VWLineSimplifier::new(tolerance)?.simplify(&line.0)?,
        SimplifyMethod::TopologyPreserving => {
            let simplifier = TopologyPreservingSimplifier::new(tolerance)?;
            return simplifier.simplify_line(line);
        }
    };
    debug!(
        "{method:?} simplification kept {} of {} vertices",
        coords.len(),
        line.0.len()
    );
    Ok(LineString::new(coords))
}

/// A closed input has to keep 4 vertices to stay a ring. When the
/// simplified coordinates fall below that the input is returned as it was.
pub(crate) fn keep_ring(pts: &[Coord<f64>], simplified: Vec<Coord<f64>>) -> Vec<Coord<f64>> {
    let closed = pts.len() >= 4 && pts.first() == pts.last();
    if closed && simplified.len() < 4 {
        debug!("ring of {} vertices would collapse, keeping it unsimplified", pts.len());
        return pts.to_vec();
    }
    simplified
}

pub(crate) fn check_tolerance(tolerance: f64) -> Result<()> {
    if tolerance.is_finite() && tolerance >= 0.0 {
        Ok(())
    } else {
        Err(Error::InvalidTolerance(tolerance))
    }
}

/// Distance from `p` to the segment `a-b`.
pub(crate) fn segment_distance(a: Coord<f64>, b: Coord<f64>, p: Coord<f64>) -> f64 {
    Point::from(p).euclidean_distance(&Line::new(a, b))
}

/// Index and distance of the vertex strictly between `i` and `j` furthest
/// from the chord `i-j`. Returns `(i, -1.0)` when there is none.
pub(crate) fn find_furthest_point(pts: &[Coord<f64>], i: usize, j: usize) -> (usize, f64) {
    let (a, b) = (pts[i], pts[j]);
    let mut max_index = i;
    let mut max_dist = -1.0;
    for (k, &p) in pts.iter().enumerate().take(j).skip(i + 1) {
        let dist = segment_distance(a, b, p);
        if dist > max_dist {
            max_dist = dist;
            max_index = k;
        }
    }
    (max_index, max_dist)
}
