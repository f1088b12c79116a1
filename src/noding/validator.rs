use std::collections::HashSet;

use log::debug;

use crate::algorithm::{LineIntersector, RobustLineIntersector};
use crate::error::NotSimpleError;
use crate::noding::segment_string::SegmentString;
use crate::utils::parallel::find_map_first;
use crate::utils::CoordKey;

/// Checks that a set of segment strings is fully noded.
///
/// A diagnostic only: it reports the first violation and repairs nothing.
/// The pairwise segment check is quadratic, so keep it out of hot paths.
pub struct NodingValidator<'a, L: LineIntersector = RobustLineIntersector> {
    strings: &'a [SegmentString],
    li: L,
}

impl<'a> NodingValidator<'a, RobustLineIntersector> {
    pub fn new(strings: &'a [SegmentString]) -> Self {
        Self::with_intersector(strings, RobustLineIntersector::new())
    }
}

impl<'a, L: LineIntersector + Sync> NodingValidator<'a, L> {
    pub fn with_intersector(strings: &'a [SegmentString], li: L) -> Self {
        Self { strings, li }
    }

    /// Runs, in order: the `a, b, a` collapse check, the endpoint against
    /// interior vertex check, and the pairwise interior intersection check.
    pub fn check_valid(&self) -> Result<(), NotSimpleError> {
        debug!("Validating noding of {} segment strings", self.strings.len());
        self.check_collapses()?;
        self.check_endpoint_vertices()?;
        self.check_interior_intersections()
    }

    fn check_collapses(&self) -> Result<(), NotSimpleError> {
        for s in self.strings {
            for (i, w) in s.coords().windows(3).enumerate() {
                if w[0] == w[2] {
                    return Err(NotSimpleError::Collapse {
                        index: i + 1,
                        coord: w[1],
                    });
                }
            }
        }
        Ok(())
    }

    /// An endpoint of one string on an interior vertex of any string means
    /// a node is missing there.
    fn check_endpoint_vertices(&self) -> Result<(), NotSimpleError> {
        let endpoints: HashSet<CoordKey> = self
            .strings
            .iter()
            .flat_map(|s| [s.coord(0), s.coord(s.len() - 1)])
            .map(CoordKey::from)
            .collect();

        for s in self.strings {
            let coords = s.coords();
            if coords.len() < 3 {
                continue;
            }
            for &c in &coords[1..coords.len() - 1] {
                if endpoints.contains(&CoordKey::from(c)) {
                    return Err(NotSimpleError::EndpointOnInterior { coord: c });
                }
            }
        }
        Ok(())
    }

    fn check_interior_intersections(&self) -> Result<(), NotSimpleError> {
        let strings = self.strings;
        let found = find_map_first(strings, |i, s0| {
            strings[i..]
                .iter()
                .enumerate()
                .find_map(|(offset, s1)| self.find_interior_intersection(s0, s1, offset == 0))
        });
        match found {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn find_interior_intersection(
        &self,
        s0: &SegmentString,
        s1: &SegmentString,
        same: bool,
    ) -> Option<NotSimpleError> {
        for i in 0..s0.segment_count() {
            let first = if same { i + 1 } else { 0 };
            for j in first..s1.segment_count() {
                let (p00, p01) = s0.segment(i);
                let (p10, p11) = s1.segment(j);
                let li = self.li.compute(p00, p01, p10, p11);
                if !li.has_intersection() {
                    continue;
                }
                if li.is_proper() || li.is_interior_intersection() {
                    let point = li
                        .points()
                        .iter()
                        .copied()
                        .find(|&p| (p != p00 && p != p01) || (p != p10 && p != p11))
                        .unwrap_or(li.intersection(0));
                    return Some(NotSimpleError::InteriorIntersection {
                        segment0: [p00, p01],
                        segment1: [p10, p11],
                        point,
                    });
                }
            }
        }
        None
    }
}
