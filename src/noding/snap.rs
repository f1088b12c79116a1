use std::collections::HashSet;

use geo_types::Coord;
use log::{debug, warn};

use crate::algorithm::RobustLineIntersector;
use crate::error::{Error, Result};
use crate::noding::hot_pixel::HotPixel;
use crate::noding::point_snapper::McIndexPointSnapper;
use crate::noding::segment_intersector::InteriorIntersectionFinder;
use crate::noding::segment_string::{noded_substrings, SegmentString};
use crate::noding::sweep_line::SimpleMcSweepLineIntersector;
use crate::noding::Noder;
use crate::utils::{make_precise, CoordKey};

/// Snap-rounding noder.
///
/// Rounds all vertices onto the lattice with spacing `1 / scale_factor`,
/// finds every interior intersection (rounded the same way), then forces
/// each segment passing through the pixel of an intersection or vertex to
/// be noded at that pixel's centre. The result is fully noded and every
/// vertex lies on the lattice.
#[derive(Debug, Clone)]
pub struct McIndexSnapRounder {
    pub scale_factor: f64,
    li: RobustLineIntersector,
}

impl McIndexSnapRounder {
    pub fn new(scale_factor: f64) -> Result<Self> {
        if !(scale_factor.is_finite() && scale_factor > 0.0) {
            return Err(Error::InvalidScaleFactor(scale_factor));
        }
        Ok(Self {
            scale_factor,
            li: RobustLineIntersector::with_scale(scale_factor),
        })
    }

    fn round_inputs(&self, strings: Vec<SegmentString>) -> Vec<SegmentString> {
        let scale = self.scale_factor;
        let mut rounded = Vec::with_capacity(strings.len());
        for (i, s) in strings.into_iter().enumerate() {
            match s.map_coords(|c| make_precise(c, scale)) {
                Some(r) => rounded.push(r),
                None => warn!("segment string {i} collapsed to a point when rounded, dropping it"),
            }
        }
        rounded
    }

    fn find_interior_intersections(&self, edges: &mut [SegmentString]) -> Vec<Coord<f64>> {
        let sweep = SimpleMcSweepLineIntersector::for_self_intersection(edges, true);
        let mut finder = InteriorIntersectionFinder::new(self.li);
        sweep.compute_intersections(edges, &mut finder);

        let mut seen = HashSet::new();
        finder
            .into_interior_intersections()
            .into_iter()
            .filter(|&p| seen.insert(CoordKey::from(p)))
            .collect()
    }

    fn compute_intersection_snaps(
        &self,
        snapper: &McIndexPointSnapper,
        edges: &mut [SegmentString],
        points: &[Coord<f64>],
    ) -> Result<usize> {
        let mut snapped = 0;
        for &pt in points {
            let hot_pixel = HotPixel::with_intersector(pt, self.scale_factor, self.li)?;
            if snapper.snap(&hot_pixel, edges, None) {
                snapped += 1;
            }
        }
        Ok(snapped)
    }

    /// Nodes every vertex that some other segment passes near.
    fn compute_vertex_snaps(
        &self,
        snapper: &McIndexPointSnapper,
        edges: &mut [SegmentString],
    ) -> Result<usize> {
        let mut snapped = 0;
        for edge in 0..edges.len() {
            for vertex in 0..edges[edge].len() {
                let pt = edges[edge].coord(vertex);
                let hot_pixel = HotPixel::with_intersector(pt, self.scale_factor, self.li)?;
                if snapper.snap(&hot_pixel, edges, Some((edge, vertex))) {
                    edges[edge].add_intersection(pt, vertex);
                    snapped += 1;
                }
            }
        }
        Ok(snapped)
    }
}

impl Noder for McIndexSnapRounder {
    fn compute_nodes(&mut self, strings: Vec<SegmentString>) -> Result<Vec<SegmentString>> {
        let mut edges = self.round_inputs(strings);
        let intersections = self.find_interior_intersections(&mut edges);

        let snapper = McIndexPointSnapper::new(&edges);
        let intersection_snaps =
            self.compute_intersection_snaps(&snapper, &mut edges, &intersections)?;
        let vertex_snaps = self.compute_vertex_snaps(&snapper, &mut edges)?;
        debug!(
            "Snap rounding: {} edges, {} interior intersections, \
             {intersection_snaps} intersection snaps, {vertex_snaps} vertex snaps",
            edges.len(),
            intersections.len()
        );

        Ok(noded_substrings(&edges))
    }
}
