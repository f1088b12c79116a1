use geo_types::Coord;

use crate::error::Result;
use crate::simplify::{check_tolerance, find_furthest_point, keep_ring};
use crate::utils::validate_coords;

/// Douglas-Peucker reduction of a coordinate sequence.
///
/// Keeps both endpoints; every dropped vertex lies within
/// `distance_tolerance` of the segment that replaced it. A closed ring that
/// would drop below 4 vertices is returned unchanged.
#[derive(Debug, Clone, Copy)]
pub struct DouglasPeuckerLineSimplifier {
    pub distance_tolerance: f64,
}

impl DouglasPeuckerLineSimplifier {
    pub fn new(distance_tolerance: f64) -> Result<Self> {
        check_tolerance(distance_tolerance)?;
        Ok(Self { distance_tolerance })
    }

    pub fn simplify(&self, pts: &[Coord<f64>]) -> Result<Vec<Coord<f64>>> {
        validate_coords(pts)?;
        let used = self.mark_used(pts);
        let simplified = pts
            .iter()
            .zip(used)
            .filter_map(|(&p, keep)| keep.then_some(p))
            .collect();
        Ok(keep_ring(pts, simplified))
    }

    fn mark_used(&self, pts: &[Coord<f64>]) -> Vec<bool> {
        let mut used = vec![true; pts.len()];
        let mut stack = vec![(0, pts.len() - 1)];
        while let Some((i, j)) = stack.pop() {
            if i + 1 >= j {
                continue;
            }
            let (furthest, dist) = find_furthest_point(pts, i, j);
            if dist <= self.distance_tolerance {
                used[i + 1..j].fill(false);
            } else {
                stack.push((furthest, j));
                stack.push((i, furthest));
            }
        }
        used
    }
}
