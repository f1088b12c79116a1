use std::cmp::Ordering;
use std::collections::BinaryHeap;

use geo::{Area, Triangle};
use geo_types::Coord;

use crate::error::Result;
use crate::simplify::{check_tolerance, keep_ring};
use crate::utils::validate_coords;

/// Visvalingam-Whyatt reduction of a coordinate sequence.
///
/// Repeatedly removes the vertex forming the smallest triangle with its
/// neighbours while that area is below `distance_tolerance²`. Endpoints
/// are never removed, and a closed ring that would drop below 4 vertices is
/// returned unchanged.
#[derive(Debug, Clone, Copy)]
pub struct VWLineSimplifier {
    pub distance_tolerance: f64,
}

/// A candidate removal. Ordered so the heap pops the smallest area first,
/// then the lowest vertex index.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    area: f64,
    index: usize,
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .area
            .total_cmp(&self.area)
            .then_with(|| other.index.cmp(&self.index))
    }
}

/// Vertex list with removal, kept as index links into the input.
struct VertexList<'a> {
    pts: &'a [Coord<f64>],
    prev: Vec<Option<usize>>,
    next: Vec<Option<usize>>,
    area: Vec<f64>,
    live: Vec<bool>,
}

impl<'a> VertexList<'a> {
    fn new(pts: &'a [Coord<f64>]) -> Self {
        let n = pts.len();
        let mut list = Self {
            pts,
            prev: (0..n).map(|i| i.checked_sub(1)).collect(),
            next: (0..n).map(|i| (i + 1 < n).then_some(i + 1)).collect(),
            area: vec![f64::MAX; n],
            live: vec![true; n],
        };
        for i in 0..n {
            list.update_area(i);
        }
        list
    }

    fn update_area(&mut self, i: usize) {
        self.area[i] = match (self.prev[i], self.next[i]) {
            (Some(p), Some(n)) => {
                Triangle::new(self.pts[p], self.pts[i], self.pts[n]).unsigned_area()
            }
            _ => f64::MAX,
        };
    }

    /// Unlinks an interior vertex and returns its neighbours.
    fn remove(&mut self, i: usize) -> Option<(usize, usize)> {
        let (p, n) = (self.prev[i]?, self.next[i]?);
        self.next[p] = Some(n);
        self.prev[n] = Some(p);
        self.live[i] = false;
        self.update_area(p);
        self.update_area(n);
        Some((p, n))
    }

    fn coordinates(&self) -> Vec<Coord<f64>> {
        self.pts
            .iter()
            .zip(&self.live)
            .filter_map(|(&p, &live)| live.then_some(p))
            .collect()
    }
}

impl VWLineSimplifier {
    pub fn new(distance_tolerance: f64) -> Result<Self> {
        check_tolerance(distance_tolerance)?;
        Ok(Self { distance_tolerance })
    }

    pub fn simplify(&self, pts: &[Coord<f64>]) -> Result<Vec<Coord<f64>>> {
        validate_coords(pts)?;
        let area_tolerance = self.distance_tolerance * self.distance_tolerance;

        let mut list = VertexList::new(pts);
        let mut heap: BinaryHeap<Candidate> = (0..pts.len())
            .map(|index| Candidate {
                area: list.area[index],
                index,
            })
            .collect();

        while let Some(Candidate { area, index }) = heap.pop() {
            // Skip entries made stale by an earlier removal.
            if !list.live[index] || list.area[index].to_bits() != area.to_bits() {
                continue;
            }
            if area >= area_tolerance {
                break;
            }
            if let Some((p, n)) = list.remove(index) {
                heap.push(Candidate {
                    area: list.area[p],
                    index: p,
                });
                heap.push(Candidate {
                    area: list.area[n],
                    index: n,
                });
            }
        }

        let mut simplified = list.coordinates();
        if simplified.len() < 2 {
            simplified.push(simplified[0]);
        }
        Ok(keep_ring(pts, simplified))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coords(pts: &[(f64, f64)]) -> Vec<Coord<f64>> {
        pts.iter().map(|&(x, y)| Coord { x, y }).collect()
    }

    #[test]
    fn test_flat_vertex_is_removed() {
        let vw = VWLineSimplifier::new(1.0).unwrap();
        let out = vw.simplify(&coords(&[(0.0, 0.0), (5.0, 0.1), (10.0, 0.0)])).unwrap();
        assert_eq!(out, coords(&[(0.0, 0.0), (10.0, 0.0)]));
    }

    #[test]
    fn test_tolerance_is_squared() {
        // Triangle area 2.5: kept at tolerance 1.5 (area 2.25), removed at 1.6 (2.56).
        let pts = coords(&[(0.0, 0.0), (5.0, 0.5), (10.0, 0.0)]);
        assert_eq!(VWLineSimplifier::new(1.5).unwrap().simplify(&pts).unwrap().len(), 3);
        assert_eq!(VWLineSimplifier::new(1.6).unwrap().simplify(&pts).unwrap().len(), 2);
    }

    #[test]
    fn test_smallest_triangle_goes_first() {
        // Areas 1, 3 and 8; only the first is below 1.44.
        let pts = coords(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (4.0, 4.0), (6.0, 0.0)]);
        let out = VWLineSimplifier::new(1.2).unwrap().simplify(&pts).unwrap();
        assert_eq!(out, coords(&[(0.0, 0.0), (2.0, 0.0), (4.0, 4.0), (6.0, 0.0)]));
    }

    #[test]
    fn test_equal_areas_remove_lowest_index_first() {
        // All interior vertices start at area 1. Removing index 1 leaves
        // index 2 at area 1; removing that lifts index 3 to area 2.
        let pts = coords(&[(0.0, 0.0), (1.0, 1.0), (2.0, 0.0), (3.0, 1.0), (4.0, 0.0)]);
        let out = VWLineSimplifier::new(1.05).unwrap().simplify(&pts).unwrap();
        assert_eq!(out, coords(&[(0.0, 0.0), (3.0, 1.0), (4.0, 0.0)]));
    }

    #[test]
    fn test_closed_ring_does_not_collapse() {
        let ring = coords(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]);
        let out = VWLineSimplifier::new(100.0).unwrap().simplify(&ring).unwrap();
        assert_eq!(out, ring);
        assert!(validate_coords(&out).is_ok());
    }
}
