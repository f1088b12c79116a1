//! Douglas-Peucker style simplification that never introduces a crossing.
//!
//! Lines are simplified one after another against two shared indexes: the
//! input index holds original segments not yet absorbed by a flattening,
//! the output index holds the flattened segments accepted so far. A
//! candidate segment is rejected if it has an interior intersection with
//! anything in either index, except input segments of the very section it
//! replaces.

use geo_types::{Coord, Line, LineString, Polygon};
use log::debug;

use crate::algorithm::{LineIntersector, RobustLineIntersector};
use crate::error::Result;
use crate::simplify::segment_index::LineSegmentIndex;
use crate::simplify::tagged_line_string::{TaggedLineSegment, TaggedLineString};
use crate::simplify::{check_tolerance, find_furthest_point};

/// What to do with the section `[i, j]` of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SectionDecision {
    /// A single original segment, kept as is.
    KeepSegment,
    /// Replace the whole section by one segment.
    Flatten,
    /// Split at the given vertex and try both halves.
    Split(usize),
}

/// Simplifies the sections of one [`TaggedLineString`] at a time against
/// shared input and output segment indexes.
pub struct TaggedLineStringSimplifier<'a, L: LineIntersector = RobustLineIntersector> {
    li: L,
    input_index: &'a mut LineSegmentIndex,
    output_index: &'a mut LineSegmentIndex,
    pub distance_tolerance: f64,
}

impl<'a> TaggedLineStringSimplifier<'a, RobustLineIntersector> {
    pub fn new(
        input_index: &'a mut LineSegmentIndex,
        output_index: &'a mut LineSegmentIndex,
        distance_tolerance: f64,
    ) -> Self {
        Self {
            li: RobustLineIntersector::new(),
            input_index,
            output_index,
            distance_tolerance,
        }
    }
}

impl<'a, L: LineIntersector> TaggedLineStringSimplifier<'a, L> {
    pub fn with_intersector(
        li: L,
        input_index: &'a mut LineSegmentIndex,
        output_index: &'a mut LineSegmentIndex,
        distance_tolerance: f64,
    ) -> Self {
        Self {
            li,
            input_index,
            output_index,
            distance_tolerance,
        }
    }

    /// Fills `line`'s result. Sections are processed left to right on an
    /// explicit stack of `(i, j, depth)`.
    pub fn simplify(&mut self, line: &mut TaggedLineString) {
        let last = line.parent_coordinates().len() - 1;
        let mut stack = vec![(0, last, 0usize)];
        while let Some((i, j, depth)) = stack.pop() {
            let depth = depth + 1;
            match self.decide(line, i, j, depth) {
                SectionDecision::KeepSegment => {
                    // Stays in the input index.
                    let seg = line.segment(i).segment;
                    line.add_to_result(seg);
                }
                SectionDecision::Flatten => {
                    let seg = self.flatten(line, i, j);
                    line.add_to_result(seg);
                }
                SectionDecision::Split(furthest) => {
                    stack.push((furthest, j, depth));
                    stack.push((i, furthest, depth));
                }
            }
        }
    }

    fn decide(&self, line: &TaggedLineString, i: usize, j: usize, depth: usize) -> SectionDecision {
        if i + 1 == j {
            return SectionDecision::KeepSegment;
        }

        let mut valid = true;
        // Even if every later section collapsed to one segment the result
        // could not reach the minimum size.
        if line.result_size() < line.minimum_size() && depth + 1 < line.minimum_size() {
            valid = false;
        }

        let pts = line.parent_coordinates();
        let (furthest, distance) = find_furthest_point(pts, i, j);
        if distance > self.distance_tolerance {
            valid = false;
        }

        if valid {
            let candidate = Line::new(pts[i], pts[j]);
            if self.has_bad_intersection(line, (i, j), &candidate) {
                valid = false;
            }
        }

        if valid {
            SectionDecision::Flatten
        } else {
            SectionDecision::Split(furthest)
        }
    }

    fn flatten(&mut self, line: &TaggedLineString, start: usize, end: usize) -> Line<f64> {
        let pts = line.parent_coordinates();
        let flattened = TaggedLineSegment::new(pts[start], pts[end], line.parent(), start);
        for seg in &line.segments()[start..end] {
            self.input_index.remove(seg);
        }
        self.output_index.add(flattened);
        flattened.segment
    }

    fn has_bad_intersection(
        &self,
        line: &TaggedLineString,
        section: (usize, usize),
        candidate: &Line<f64>,
    ) -> bool {
        self.has_bad_output_intersection(candidate)
            || self.has_bad_input_intersection(line, section, candidate)
    }

    fn has_bad_output_intersection(&self, candidate: &Line<f64>) -> bool {
        self.output_index
            .query(candidate)
            .any(|seg| self.has_interior_intersection(&seg.segment, candidate))
    }

    fn has_bad_input_intersection(
        &self,
        line: &TaggedLineString,
        section: (usize, usize),
        candidate: &Line<f64>,
    ) -> bool {
        self.input_index.query(candidate).any(|seg| {
            self.has_interior_intersection(&seg.segment, candidate)
                && !is_in_line_section(line, section, seg)
        })
    }

    fn has_interior_intersection(&self, seg0: &Line<f64>, seg1: &Line<f64>) -> bool {
        let li = self.li.compute(seg0.start, seg0.end, seg1.start, seg1.end);
        li.is_interior_intersection()
    }
}

/// Whether `seg` is one of the original segments of the section being
/// flattened, which the candidate replaces rather than crosses.
fn is_in_line_section(
    line: &TaggedLineString,
    section: (usize, usize),
    seg: &TaggedLineSegment,
) -> bool {
    seg.parent == line.parent() && seg.index >= section.0 && seg.index < section.1
}

/// Simplifies a set of lines (or polygon rings) together so that no line
/// comes to cross itself or any other.
///
/// Closed lines keep at least 4 vertices so rings stay valid; open lines
/// keep at least 2.
#[derive(Debug, Clone, Copy)]
pub struct TopologyPreservingSimplifier {
    pub distance_tolerance: f64,
}

impl TopologyPreservingSimplifier {
    pub fn new(distance_tolerance: f64) -> Result<Self> {
        check_tolerance(distance_tolerance)?;
        Ok(Self { distance_tolerance })
    }

    pub fn simplify_line(&self, line: &LineString<f64>) -> Result<LineString<f64>> {
        let mut out = self.simplify_lines(std::slice::from_ref(line))?;
        Ok(out.remove(0))
    }

    pub fn simplify_lines(&self, lines: &[LineString<f64>]) -> Result<Vec<LineString<f64>>> {
        let coords: Vec<Vec<Coord<f64>>> = lines.iter().map(|l| l.0.clone()).collect();
        let simplified = self.simplify_coords(coords)?;
        Ok(simplified.into_iter().map(LineString::new).collect())
    }

    /// Simplifies the exterior and all holes together.
    pub fn simplify_polygon(&self, polygon: &Polygon<f64>) -> Result<Polygon<f64>> {
        let mut rings = vec![polygon.exterior().clone()];
        rings.extend(polygon.interiors().iter().cloned());
        let mut simplified = self.simplify_lines(&rings)?.into_iter();
        let exterior = simplified.next().unwrap_or_else(|| LineString::new(Vec::new()));
        Ok(Polygon::new(exterior, simplified.collect()))
    }

    fn simplify_coords(&self, lines: Vec<Vec<Coord<f64>>>) -> Result<Vec<Vec<Coord<f64>>>> {
        let mut tagged = Vec::with_capacity(lines.len());
        for (parent, coords) in lines.into_iter().enumerate() {
            let closed = coords.len() > 1 && coords.first() == coords.last();
            let minimum_size = if closed { 4 } else { TaggedLineString::DEFAULT_MINIMUM_SIZE };
            tagged.push(TaggedLineString::new(parent, coords)?.with_minimum_size(minimum_size));
        }

        let segments = tagged
            .iter()
            .flat_map(|l| l.segments().iter().copied())
            .collect();
        let mut input_index = LineSegmentIndex::bulk_load(segments);
        let mut output_index = LineSegmentIndex::new();
        let segment_count = input_index.len();

        let mut simplifier = TaggedLineStringSimplifier::new(
            &mut input_index,
            &mut output_index,
            self.distance_tolerance,
        );
        for line in &mut tagged {
            simplifier.simplify(line);
        }

        let result: Vec<Vec<Coord<f64>>> = tagged
            .iter()
            .map(TaggedLineString::result_coordinates)
            .collect();
        debug!(
            "Topology-preserving simplification of {} lines: {} segments in, {} out",
            tagged.len(),
            segment_count,
            result.iter().map(|c| c.len().saturating_sub(1)).sum::<usize>()
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn test_single_line_flattens() {
        let tps = TopologyPreservingSimplifier::new(1.0).unwrap();
        let line = LineString::from(vec![(0.0, 0.0), (5.0, 0.5), (10.0, 0.0)]);
        assert_eq!(
            tps.simplify_line(&line).unwrap(),
            LineString::from(vec![(0.0, 0.0), (10.0, 0.0)])
        );
    }

    #[test]
    fn test_flattening_that_would_cross_is_refused() {
        // The bump would collapse onto a chord that crosses the second line.
        let tps = TopologyPreservingSimplifier::new(5.0).unwrap();
        let lines = vec![
            LineString::from(vec![(0.0, 0.0), (5.0, 3.0), (10.0, 0.0)]),
            LineString::from(vec![(5.0, -1.0), (5.0, 1.0)]),
        ];
        let out = tps.simplify_lines(&lines).unwrap();
        assert_eq!(out[0], lines[0]);
        assert_eq!(out[1], lines[1]);

        // The same line alone flattens.
        let alone = tps.simplify_line(&lines[0]).unwrap();
        assert_eq!(alone.0.len(), 2);
    }

    #[test]
    fn test_closed_ring_keeps_four_vertices() {
        let tps = TopologyPreservingSimplifier::new(100.0).unwrap();
        let ring = LineString::from(vec![
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 1.0),
            (10.0, 10.0),
            (0.0, 10.0),
            (0.0, 0.0),
        ]);
        let out = tps.simplify_line(&ring).unwrap();
        assert!(out.0.len() >= 4);
        assert_eq!(out.0.first(), out.0.last());
    }

    #[test]
    fn test_polygon_hole_stays_inside() {
        let tps = TopologyPreservingSimplifier::new(2.0).unwrap();
        let polygon = Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (20.0, 0.0),
                (20.0, 20.0),
                (10.0, 21.0),
                (0.0, 20.0),
                (0.0, 0.0),
            ]),
            vec![LineString::from(vec![
                (8.0, 18.0),
                (12.0, 18.0),
                (12.0, 20.0),
                (8.0, 20.0),
                (8.0, 18.0),
            ])],
        );
        let out = tps.simplify_polygon(&polygon).unwrap();
        // Dropping the apex at (10, 21) would cut through the hole.
        assert!(out.exterior().0.contains(&Coord { x: 10.0, y: 21.0 }));
        assert_eq!(out.interiors().len(), 1);
    }

    #[test]
    fn test_rejects_bad_tolerance() {
        assert!(matches!(TopologyPreservingSimplifier::new(-0.5), Err(Error::InvalidTolerance(_))));
    }
}
