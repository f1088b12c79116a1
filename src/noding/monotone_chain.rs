//! Monotone chain decomposition of segment strings.
//!
//! A chain is a run of consecutive segments whose direction vectors all lie
//! in the same quadrant, so the run is monotone in both x and y. The
//! envelope of any contiguous sub-run is then given by its two end vertices,
//! which is what makes the bisecting searches below cheap.

use geo::{Intersects, Rect};
use geo_types::Coord;
use smallvec::SmallVec;

use crate::noding::segment_intersector::SegmentIntersector;
use crate::noding::segment_string::SegmentString;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Quadrant {
    NE,
    NW,
    SW,
    SE,
}

impl Quadrant {
    fn of(p0: Coord<f64>, p1: Coord<f64>) -> Self {
        let dx = p1.x - p0.x;
        let dy = p1.y - p0.y;
        match (dx >= 0.0, dy >= 0.0) {
            (true, true) => Quadrant::NE,
            (true, false) => Quadrant::SE,
            (false, true) => Quadrant::NW,
            (false, false) => Quadrant::SW,
        }
    }
}

/// Chain start indices for one segment string.
///
/// `start_index` is strictly increasing; chain `i` spans vertices
/// `start_index[i]..=start_index[i + 1]` and the final entry is the last
/// vertex index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonotoneChainEdge {
    start_index: SmallVec<[usize; 8]>,
}

impl MonotoneChainEdge {
    pub fn new(coords: &[Coord<f64>]) -> Self {
        let mut start_index = SmallVec::new();
        if coords.is_empty() {
            return Self { start_index };
        }
        let mut start = 0;
        start_index.push(start);
        while start < coords.len() - 1 {
            let last = find_chain_end(coords, start);
            start_index.push(last);
            start = last;
        }
        Self { start_index }
    }

    pub fn start_indices(&self) -> &[usize] {
        &self.start_index
    }

    pub fn chain_count(&self) -> usize {
        self.start_index.len().saturating_sub(1)
    }

    /// First and last vertex index of chain `chain`.
    pub fn chain_range(&self, chain: usize) -> (usize, usize) {
        (self.start_index[chain], self.start_index[chain + 1])
    }

    pub fn min_x(&self, coords: &[Coord<f64>], chain: usize) -> f64 {
        let (s, e) = self.chain_range(chain);
        coords[s].x.min(coords[e].x)
    }

    pub fn max_x(&self, coords: &[Coord<f64>], chain: usize) -> f64 {
        let (s, e) = self.chain_range(chain);
        coords[s].x.max(coords[e].x)
    }

    pub fn envelope(&self, coords: &[Coord<f64>], chain: usize) -> Rect<f64> {
        let (s, e) = self.chain_range(chain);
        Rect::new(coords[s], coords[e])
    }
}

fn find_chain_end(coords: &[Coord<f64>], start: usize) -> usize {
    let chain_quad = Quadrant::of(coords[start], coords[start + 1]);
    let mut last = start + 1;
    while last < coords.len() {
        if Quadrant::of(coords[last - 1], coords[last]) != chain_quad {
            break;
        }
        last += 1;
    }
    last - 1
}

/// A lightweight view onto one chain of one segment string in an arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MonotoneChain {
    pub edge: usize,
    pub chain: usize,
}

impl MonotoneChain {
    pub fn new(edge: usize, chain: usize) -> Self {
        Self { edge, chain }
    }

    /// First and last vertex index of this chain in its segment string.
    pub fn range(&self, edges: &[SegmentString]) -> (usize, usize) {
        edges[self.edge].monotone_chains().chain_range(self.chain)
    }

    pub fn envelope(&self, edges: &[SegmentString]) -> Rect<f64> {
        let e = &edges[self.edge];
        e.monotone_chains().envelope(e.coords(), self.chain)
    }

    /// Reports every segment pair of `self` and `other` whose envelopes
    /// overlap to `si`.
    pub fn compute_intersections<SI: SegmentIntersector>(
        &self,
        other: &MonotoneChain,
        edges: &mut [SegmentString],
        si: &mut SI,
    ) {
        let (s0, e0) = self.range(edges);
        let (s1, e1) = other.range(edges);
        compute_intersects_for_chain(edges, self.edge, (s0, e0), other.edge, (s1, e1), si);
    }

    /// Calls `visit` with the index of each segment of this chain that may
    /// overlap `search`. Leaf segments are reported without an envelope
    /// test, so callers must still test the segment itself.
    pub fn select<F: FnMut(usize)>(
        &self,
        edges: &[SegmentString],
        search: &Rect<f64>,
        mut visit: F,
    ) {
        let coords = edges[self.edge].coords();
        let (start, end) = self.range(edges);
        let mut stack: Vec<(usize, usize)> = vec![(start, end)];
        while let Some((s, e)) = stack.pop() {
            if e - s == 1 {
                visit(s);
                continue;
            }
            if !search.intersects(&Rect::new(coords[s], coords[e])) {
                continue;
            }
            let mid = (s + e) / 2;
            // Push the upper half first so segments are visited in order.
            if mid < e {
                stack.push((mid, e));
            }
            if s < mid {
                stack.push((s, mid));
            }
        }
    }
}

/// Bisects both vertex ranges until single segment pairs remain, pruning
/// pairs whose end-vertex envelopes are disjoint.
///
/// Uses an explicit work stack: fully overlapping chains can need as many
/// levels as there are segments.
pub fn compute_intersects_for_chain<SI: SegmentIntersector>(
    edges: &mut [SegmentString],
    edge0: usize,
    range0: (usize, usize),
    edge1: usize,
    range1: (usize, usize),
    si: &mut SI,
) {
    let mut stack: Vec<(usize, usize, usize, usize)> =
        vec![(range0.0, range0.1, range1.0, range1.1)];
    while let Some((start0, end0, start1, end1)) = stack.pop() {
        if si.is_done() {
            return;
        }
        if end0 - start0 == 1 && end1 - start1 == 1 {
            si.process_intersections(edges, edge0, start0, edge1, start1);
            continue;
        }

        let overlaps = {
            let p = edges[edge0].coords();
            let q = edges[edge1].coords();
            Rect::new(p[start0], p[end0]).intersects(&Rect::new(q[start1], q[end1]))
        };
        if !overlaps {
            continue;
        }

        let mid0 = (start0 + end0) / 2;
        let mid1 = (start1 + end1) / 2;
        // Reverse push order keeps the lower sub-ranges first.
        if mid0 < end0 {
            if mid1 < end1 {
                stack.push((mid0, end0, mid1, end1));
            }
            if start1 < mid1 {
                stack.push((mid0, end0, start1, mid1));
            }
        }
        if start0 < mid0 {
            if mid1 < end1 {
                stack.push((start0, mid0, mid1, end1));
            }
            if start1 < mid1 {
                stack.push((start0, mid0, start1, mid1));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noding::segment_intersector::SegmentIntersector;

    fn coords(pts: &[(f64, f64)]) -> Vec<Coord<f64>> {
        pts.iter().map(|&(x, y)| Coord { x, y }).collect()
    }

    struct PairCollector(Vec<(usize, usize, usize, usize)>);

    impl SegmentIntersector for PairCollector {
        fn process_intersections(
            &mut self,
            _: &mut [SegmentString],
            e0: usize,
            s0: usize,
            e1: usize,
            s1: usize,
        ) {
            self.0.push((e0, s0, e1, s1));
        }
    }

    #[test]
    fn test_start_indices_partition() {
        // NE, NE, SE, SW, SW, NW
        let pts = coords(&[
            (0.0, 0.0),
            (1.0, 1.0),
            (2.0, 3.0),
            (3.0, 2.0),
            (2.0, 1.0),
            (1.0, 0.0),
            (0.0, 1.0),
        ]);
        let mce = MonotoneChainEdge::new(&pts);
        assert_eq!(mce.start_indices(), &[0, 2, 3, 5, 6]);
        assert_eq!(mce.chain_count(), 4);
        assert_eq!(mce.min_x(&pts, 1), 2.0);
        assert_eq!(mce.max_x(&pts, 1), 3.0);
    }

    #[test]
    fn test_single_chain() {
        let pts = coords(&[(0.0, 0.0), (1.0, 0.0), (2.0, 1.0), (5.0, 7.0)]);
        let mce = MonotoneChainEdge::new(&pts);
        assert_eq!(mce.start_indices(), &[0, 3]);
        let env = mce.envelope(&pts, 0);
        assert_eq!(env.min(), Coord { x: 0.0, y: 0.0 });
        assert_eq!(env.max(), Coord { x: 5.0, y: 7.0 });
    }

    #[test]
    fn test_chain_search_prunes_disjoint_ranges() {
        let a = SegmentString::new(coords(&[
            (0.0, 0.0),
            (1.0, 1.0),
            (2.0, 2.0),
            (3.0, 3.0),
            (4.0, 4.0),
        ]))
        .unwrap();
        let b = SegmentString::new(coords(&[(3.5, 0.0), (3.5, 10.0)])).unwrap();
        let mut edges = vec![a, b];
        let mut collector = PairCollector(Vec::new());
        MonotoneChain::new(0, 0).compute_intersections(
            &MonotoneChain::new(1, 0),
            &mut edges,
            &mut collector,
        );
        // The first half of `a` is pruned; leaf pairs are reported unfiltered.
        assert_eq!(collector.0, vec![(0, 2, 1, 0), (0, 3, 1, 0)]);
    }

    #[test]
    fn test_select_visits_candidates_in_order() {
        let pts: Vec<_> = (0..10).map(|i| Coord { x: i as f64, y: 0.0 }).collect();
        let edges = vec![SegmentString::new(pts).unwrap()];
        let search = Rect::new(Coord { x: 1.5, y: -0.5 }, Coord { x: 3.5, y: 0.5 });
        let mut seen = Vec::new();
        MonotoneChain::new(0, 0).select(&edges, &search, |i| seen.push(i));
        assert!(seen.contains(&1) && seen.contains(&2) && seen.contains(&3));
        // The upper half of the chain is pruned by its envelope.
        assert!(seen.iter().all(|&i| i < 5));
        let mut sorted = seen.clone();
        sorted.sort_unstable();
        assert_eq!(seen, sorted);
    }

    #[test]
    fn test_long_collinear_chains_do_not_overflow() {
        let n = 20_000;
        let pts: Vec<_> = (0..n).map(|i| Coord { x: i as f64, y: 0.0 }).collect();
        let mut edges = vec![
            SegmentString::new(pts.clone()).unwrap(),
            SegmentString::new(pts).unwrap(),
        ];
        let mut collector = PairCollector(Vec::new());
        MonotoneChain::new(0, 0).compute_intersections(
            &MonotoneChain::new(1, 0),
            &mut edges,
            &mut collector,
        );
        assert!(collector.0.len() >= n - 1);
    }
}
