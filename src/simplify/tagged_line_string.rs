use geo_types::{Coord, Line, LineString};
use rstar::{RTreeObject, AABB};

use crate::error::Result;
use crate::utils::validate_coords;

/// A segment of a line being simplified, tagged with the line it belongs
/// to and its position in that line's original coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaggedLineSegment {
    pub segment: Line<f64>,
    pub parent: usize,
    pub index: usize,
}

impl TaggedLineSegment {
    pub fn new(p0: Coord<f64>, p1: Coord<f64>, parent: usize, index: usize) -> Self {
        Self {
            segment: Line::new(p0, p1),
            parent,
            index,
        }
    }
}

impl RTreeObject for TaggedLineSegment {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        let p1 = self.segment.start;
        let p2 = self.segment.end;
        AABB::from_corners([p1.x, p1.y], [p2.x, p2.y])
    }
}

/// A line together with the simplified result being built for it.
#[derive(Debug, Clone)]
pub struct TaggedLineString {
    parent: usize,
    coords: Vec<Coord<f64>>,
    segments: Vec<TaggedLineSegment>,
    result: Vec<Line<f64>>,
    minimum_size: usize,
}

impl TaggedLineString {
    pub const DEFAULT_MINIMUM_SIZE: usize = 2;

    /// `parent` identifies the line among all lines simplified together.
    pub fn new(parent: usize, coords: Vec<Coord<f64>>) -> Result<Self> {
        validate_coords(&coords)?;
        let segments = coords
            .windows(2)
            .enumerate()
            .map(|(i, w)| TaggedLineSegment::new(w[0], w[1], parent, i))
            .collect();
        Ok(Self {
            parent,
            coords,
            segments,
            result: Vec::new(),
            minimum_size: Self::DEFAULT_MINIMUM_SIZE,
        })
    }

    /// The fewest vertices the result may have.
    pub fn with_minimum_size(mut self, minimum_size: usize) -> Self {
        self.minimum_size = minimum_size;
        self
    }

    pub fn parent(&self) -> usize {
        self.parent
    }

    pub fn minimum_size(&self) -> usize {
        self.minimum_size
    }

    pub fn parent_coordinates(&self) -> &[Coord<f64>] {
        &self.coords
    }

    pub fn segments(&self) -> &[TaggedLineSegment] {
        &self.segments
    }

    pub fn segment(&self, i: usize) -> &TaggedLineSegment {
        &self.segments[i]
    }

    pub fn add_to_result(&mut self, segment: Line<f64>) {
        self.result.push(segment);
    }

    /// Number of vertices in the result so far.
    pub fn result_size(&self) -> usize {
        if self.result.is_empty() {
            0
        } else {
            self.result.len() + 1
        }
    }

    pub fn result_coordinates(&self) -> Vec<Coord<f64>> {
        let mut coords: Vec<Coord<f64>> = self.result.iter().map(|l| l.start).collect();
        if let Some(last) = self.result.last() {
            coords.push(last.end);
        }
        coords
    }

    pub fn to_line_string(&self) -> LineString<f64> {
        LineString::new(self.result_coordinates())
    }
}
