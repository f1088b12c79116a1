use log::debug;

use crate::algorithm::{LineIntersector, RobustLineIntersector};
use crate::error::Result;
use crate::noding::segment_intersector::IntersectionAdder;
use crate::noding::segment_string::{noded_substrings, SegmentString};
use crate::noding::sweep_line::SimpleMcSweepLineIntersector;
use crate::noding::Noder;

/// Floating-point noder: a monotone chain sweep over all strings with an
/// [`IntersectionAdder`] inserting every non-trivial intersection.
///
/// Computed intersection points are not rounded unless the intersector is
/// scaled, so the output is not guaranteed to be fully noded. Use
/// [`McIndexSnapRounder`](crate::noding::McIndexSnapRounder) when it must be.
#[derive(Debug, Clone, Default)]
pub struct McSweepLineNoder<L: LineIntersector + Clone = RobustLineIntersector> {
    li: L,
}

impl McSweepLineNoder<RobustLineIntersector> {
    pub fn new() -> Self {
        Self::with_intersector(RobustLineIntersector::new())
    }
}

impl<L: LineIntersector + Clone> McSweepLineNoder<L> {
    pub fn with_intersector(li: L) -> Self {
        Self { li }
    }
}

impl<L: LineIntersector + Clone> Noder for McSweepLineNoder<L> {
    fn compute_nodes(&mut self, mut strings: Vec<SegmentString>) -> Result<Vec<SegmentString>> {
        let sweep = SimpleMcSweepLineIntersector::for_self_intersection(&strings, true);
        let mut adder = IntersectionAdder::with_intersector(self.li.clone());
        sweep.compute_intersections(&mut strings, &mut adder);
        debug!(
            "Noded {} strings: {} tests, {} intersections ({} proper)",
            strings.len(),
            adder.num_tests,
            adder.num_intersections,
            adder.num_proper_intersections
        );
        Ok(noded_substrings(&strings))
    }
}
