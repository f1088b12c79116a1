use std::cell::OnceCell;

use geo::{Intersects, Rect};
use geo_types::Coord;

use crate::algorithm::{LineIntersector, RobustLineIntersector};
use crate::error::{Error, Result};
use crate::noding::segment_string::SegmentString;
use crate::utils::round_half_up;

/// The tolerance square around one snap-rounding lattice point.
///
/// The square has side 1 in scaled coordinates and is half-open: its left
/// and bottom edges and the lower-left corner are inside, the top and right
/// edges are not. A segment that merely grazes the top or right edge does
/// not get snapped, so pixels sharing an edge never both claim it.
#[derive(Debug, Clone)]
pub struct HotPixel<L: LineIntersector = RobustLineIntersector> {
    li: L,
    original: Coord<f64>,
    /// Centre in scaled coordinates.
    pt: Coord<f64>,
    scale_factor: f64,
    min_x: f64,
    max_x: f64,
    min_y: f64,
    max_y: f64,
    /// NE, NW, SW, SE. The edge order matters for the left/bottom test.
    corners: [Coord<f64>; 4],
    safe_env: OnceCell<Rect<f64>>,
}

impl HotPixel<RobustLineIntersector> {
    pub fn new(pt: Coord<f64>, scale_factor: f64) -> Result<Self> {
        Self::with_intersector(pt, scale_factor, RobustLineIntersector::new())
    }
}

impl<L: LineIntersector> HotPixel<L> {
    /// Half the diagonal would do for a query envelope; 0.75 keeps a margin
    /// for segments whose scaled endpoints round across the pixel.
    pub const SAFE_ENV_EXPANSION_FACTOR: f64 = 0.75;

    pub fn with_intersector(pt: Coord<f64>, scale_factor: f64, li: L) -> Result<Self> {
        if !(scale_factor.is_finite() && scale_factor > 0.0) {
            return Err(Error::InvalidScaleFactor(scale_factor));
        }
        let scaled = if scale_factor != 1.0 {
            Coord {
                x: round_half_up(pt.x * scale_factor),
                y: round_half_up(pt.y * scale_factor),
            }
        } else {
            pt
        };

        let tolerance = 0.5;
        let min_x = scaled.x - tolerance;
        let max_x = scaled.x + tolerance;
        let min_y = scaled.y - tolerance;
        let max_y = scaled.y + tolerance;
        let corners = [
            Coord { x: max_x, y: max_y },
            Coord { x: min_x, y: max_y },
            Coord { x: min_x, y: min_y },
            Coord { x: max_x, y: min_y },
        ];

        Ok(Self {
            li,
            original: pt,
            pt: scaled,
            scale_factor,
            min_x,
            max_x,
            min_y,
            max_y,
            corners,
            safe_env: OnceCell::new(),
        })
    }

    /// The snap target in input coordinates.
    pub fn coordinate(&self) -> Coord<f64> {
        self.original
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    /// A conservative envelope around the pixel in input coordinates, for
    /// spatial index queries only.
    pub fn safe_envelope(&self) -> Rect<f64> {
        *self.safe_env.get_or_init(|| {
            let safe_tolerance = Self::SAFE_ENV_EXPANSION_FACTOR / self.scale_factor;
            Rect::new(
                Coord {
                    x: self.original.x - safe_tolerance,
                    y: self.original.y - safe_tolerance,
                },
                Coord {
                    x: self.original.x + safe_tolerance,
                    y: self.original.y + safe_tolerance,
                },
            )
        })
    }

    fn scale(&self, c: Coord<f64>) -> Coord<f64> {
        Coord {
            x: round_half_up(c.x * self.scale_factor),
            y: round_half_up(c.y * self.scale_factor),
        }
    }

    /// Whether segment `p0-p1` (input coordinates) passes through this pixel.
    pub fn intersects(&self, p0: Coord<f64>, p1: Coord<f64>) -> bool {
        if self.scale_factor == 1.0 {
            return self.intersects_scaled(p0, p1);
        }
        self.intersects_scaled(self.scale(p0), self.scale(p1))
    }

    fn intersects_scaled(&self, p0: Coord<f64>, p1: Coord<f64>) -> bool {
        let pixel = Rect::new(
            Coord {
                x: self.min_x,
                y: self.min_y,
            },
            Coord {
                x: self.max_x,
                y: self.max_y,
            },
        );
        if !pixel.intersects(&Rect::new(p0, p1)) {
            return false;
        }
        self.intersects_tolerance_square(p0, p1)
    }

    /// A proper crossing of any pixel edge, or touching both the left and
    /// the bottom edge, or an endpoint at the pixel centre.
    fn intersects_tolerance_square(&self, p0: Coord<f64>, p1: Coord<f64>) -> bool {
        let [ne, nw, sw, se] = self.corners;

        let top = self.li.compute(p0, p1, ne, nw);
        if top.is_proper() {
            return true;
        }
        let left = self.li.compute(p0, p1, nw, sw);
        if left.is_proper() {
            return true;
        }
        let bottom = self.li.compute(p0, p1, sw, se);
        if bottom.is_proper() {
            return true;
        }
        let right = self.li.compute(p0, p1, se, ne);
        if right.is_proper() {
            return true;
        }

        if left.has_intersection() && bottom.has_intersection() {
            return true;
        }
        p0 == self.pt || p1 == self.pt
    }

    /// Inserts this pixel's centre as a node on segment `segment_index` of
    /// `edge` if the segment passes through the pixel.
    pub fn add_snapped_node(&self, edge: &mut SegmentString, segment_index: usize) -> bool {
        let (p0, p1) = edge.segment(segment_index);
        if self.intersects(p0, p1) {
            edge.add_intersection(self.coordinate(), segment_index);
            return true;
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(x: f64, y: f64) -> Coord<f64> {
        Coord { x, y }
    }

    #[test]
    fn test_diagonal_through_pixel() {
        let hp = HotPixel::new(c(5.0, 5.0), 1.0).unwrap();
        assert!(hp.intersects(c(0.0, 0.0), c(10.0, 10.0)));
        assert!(!hp.intersects(c(0.0, 0.0), c(4.0, 4.0)));
    }

    #[test]
    fn test_half_open_edges() {
        let hp = HotPixel::new(c(5.0, 5.0), 1.0).unwrap();
        // Along the bottom edge: touches left and bottom.
        assert!(hp.intersects(c(0.0, 4.5), c(10.0, 4.5)));
        // Along the top edge: excluded.
        assert!(!hp.intersects(c(0.0, 5.5), c(10.0, 5.5)));
        // Along the left edge: included.
        assert!(hp.intersects(c(4.5, 0.0), c(4.5, 10.0)));
        // Along the right edge: excluded.
        assert!(!hp.intersects(c(5.5, 0.0), c(5.5, 10.0)));
    }

    #[test]
    fn test_endpoint_at_centre() {
        let hp = HotPixel::new(c(5.0, 5.0), 1.0).unwrap();
        assert!(hp.intersects(c(5.0, 5.0), c(5.2, 5.1)));
        assert!(!hp.intersects(c(5.1, 5.0), c(5.2, 5.1)));
    }

    #[test]
    fn test_scaled_pixel() {
        // Lattice spacing 0.1: the pixel around (0.5, 0.5) spans 0.45..0.55.
        let hp = HotPixel::new(c(0.5, 0.5), 10.0).unwrap();
        assert!(hp.intersects(c(0.0, 0.0), c(1.0, 1.0)));
        assert!(!hp.intersects(c(0.0, 0.0), c(1.0, 0.2)));
        let env = hp.safe_envelope();
        assert!((env.min().x - 0.425).abs() < 1e-12);
        assert!((env.max().y - 0.575).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_bad_scale() {
        assert!(matches!(HotPixel::new(c(0.0, 0.0), 0.0), Err(Error::InvalidScaleFactor(_))));
        assert!(matches!(HotPixel::new(c(0.0, 0.0), f64::NAN), Err(Error::InvalidScaleFactor(_))));
    }

    #[test]
    fn test_snapped_segment_still_intersects() {
        let hp = HotPixel::new(c(5.0, 2.0), 1.0).unwrap();
        let mut edge = SegmentString::new(vec![c(0.0, 0.0), c(10.0, 3.0)]).unwrap();
        assert!(hp.add_snapped_node(&mut edge, 0));

        let parts = edge.noded_substrings();
        assert_eq!(parts.len(), 2);
        for part in &parts {
            let (p0, p1) = part.segment(0);
            assert!(hp.intersects(p0, p1));
        }
    }
}
