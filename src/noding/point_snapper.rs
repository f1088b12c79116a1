use log::trace;
use rstar::{RTree, RTreeObject, AABB};

use crate::algorithm::LineIntersector;
use crate::noding::hot_pixel::HotPixel;
use crate::noding::monotone_chain::MonotoneChain;
use crate::noding::segment_string::SegmentString;

#[derive(Clone, Copy, Debug, PartialEq)]
struct IndexedChain {
    chain: MonotoneChain,
    min: [f64; 2],
    max: [f64; 2],
}

impl RTreeObject for IndexedChain {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(self.min, self.max)
    }
}

/// Snaps segments to hot pixels, finding candidates through an R-tree of
/// monotone chain envelopes.
///
/// The index is built once from a fixed set of edges. Snapping only adds
/// nodes, so the chain envelopes stay valid across any number of queries.
pub struct McIndexPointSnapper {
    index: RTree<IndexedChain>,
}

impl McIndexPointSnapper {
    pub fn new(edges: &[SegmentString]) -> Self {
        let mut entries = Vec::new();
        for (edge_idx, edge) in edges.iter().enumerate() {
            for chain_idx in 0..edge.monotone_chains().chain_count() {
                let chain = MonotoneChain::new(edge_idx, chain_idx);
                let env = chain.envelope(edges);
                entries.push(IndexedChain {
                    chain,
                    min: [env.min().x, env.min().y],
                    max: [env.max().x, env.max().y],
                });
            }
        }
        Self {
            index: RTree::bulk_load(entries),
        }
    }

    /// Adds the hot pixel's centre as a node to every segment passing
    /// through it and reports whether any node was added.
    ///
    /// When snapping a vertex, pass its `(edge, vertex_index)` so the two
    /// segments meeting at that vertex are not snapped to their own vertex.
    pub fn snap<L: LineIntersector>(
        &self,
        hot_pixel: &HotPixel<L>,
        edges: &mut [SegmentString],
        vertex: Option<(usize, usize)>,
    ) -> bool {
        let env = hot_pixel.safe_envelope();
        let query = AABB::from_corners([env.min().x, env.min().y], [env.max().x, env.max().y]);

        let mut candidates: Vec<(usize, usize)> = Vec::new();
        for entry in self.index.locate_in_envelope_intersecting(&query) {
            let edge = entry.chain.edge;
            entry.chain.select(edges, &env, |segment| {
                if let Some((v_edge, v_index)) = vertex {
                    if v_edge == edge && (segment == v_index || segment + 1 == v_index) {
                        return;
                    }
                }
                candidates.push((edge, segment));
            });
        }

        let mut is_node_added = false;
        for (edge, segment) in candidates {
            if hot_pixel.add_snapped_node(&mut edges[edge], segment) {
                let c = hot_pixel.coordinate();
                trace!("snapped edge {edge} segment {segment} to ({}, {})", c.x, c.y);
                is_node_added = true;
            }
        }
        is_node_added
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::Coord;

    fn ss(pts: &[(f64, f64)]) -> SegmentString {
        SegmentString::new(pts.iter().map(|&(x, y)| Coord { x, y }).collect()).unwrap()
    }

    #[test]
    fn test_snap_to_passing_segment() {
        let mut edges = vec![ss(&[(0.0, 0.0), (10.0, 10.0)]), ss(&[(20.0, 0.0), (30.0, 0.0)])];
        let snapper = McIndexPointSnapper::new(&edges);
        let hp = HotPixel::new(Coord { x: 5.0, y: 5.0 }, 1.0).unwrap();

        assert!(snapper.snap(&hp, &mut edges, None));
        assert_eq!(edges[0].nodes().len(), 1);
        assert!(edges[1].nodes().is_empty());
    }

    #[test]
    fn test_nothing_nearby_is_not_an_error() {
        let mut edges = vec![ss(&[(0.0, 0.0), (10.0, 0.0)])];
        let snapper = McIndexPointSnapper::new(&edges);
        let hp = HotPixel::new(Coord { x: 5.0, y: 5.0 }, 1.0).unwrap();
        assert!(!snapper.snap(&hp, &mut edges, None));
    }

    #[test]
    fn test_vertex_does_not_snap_to_itself() {
        let mut edges = vec![ss(&[(0.0, 0.0), (5.0, 5.0), (10.0, 0.0)])];
        let snapper = McIndexPointSnapper::new(&edges);
        let hp = HotPixel::new(Coord { x: 5.0, y: 5.0 }, 1.0).unwrap();
        assert!(!snapper.snap(&hp, &mut edges, Some((0, 1))));
        assert!(edges[0].nodes().is_empty());
    }

    #[test]
    fn test_vertex_snaps_nearby_segment_of_same_edge() {
        // The last segment passes through the pixel around vertex 1.
        let mut edges = vec![ss(&[
            (0.0, 0.0),
            (5.0, 5.0),
            (10.0, 5.0),
            (10.0, 10.0),
            (5.0, 5.2),
            (0.0, 5.2),
        ])];
        let snapper = McIndexPointSnapper::new(&edges);
        let hp = HotPixel::new(Coord { x: 5.0, y: 5.0 }, 1.0).unwrap();
        assert!(snapper.snap(&hp, &mut edges, Some((0, 1))));
        assert!(edges[0].nodes().iter().all(|n| n.coord == Coord { x: 5.0, y: 5.0 }));
    }
}
