pub mod parallel;

use geo_types::Coord;

use crate::error::DegenerateGeometryError;

/// Rounds half-way values towards positive infinity, the lattice
/// convention shared by hot pixels and the scaled noder.
#[inline]
pub fn round_half_up(v: f64) -> f64 {
    (v + 0.5).floor()
}

/// Snaps a coordinate onto the lattice with spacing `1 / scale`.
#[inline]
pub fn make_precise(c: Coord<f64>, scale: f64) -> Coord<f64> {
    Coord {
        x: round_half_up(c.x * scale) / scale,
        y: round_half_up(c.y * scale) / scale,
    }
}

/// Wrapper for Coord to be Hashable (since f64 is not Hash).
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug)]
pub struct CoordKey(u64, u64);

impl From<Coord<f64>> for CoordKey {
    fn from(c: Coord<f64>) -> Self {
        // Fold -0.0 onto 0.0 so equal coordinates share a key.
        CoordKey((c.x + 0.0).to_bits(), (c.y + 0.0).to_bits())
    }
}

/// Checks the boundary invariants every noded or simplified line must
/// satisfy: at least two vertices, all finite, no zero-length segments.
pub fn validate_coords(coords: &[Coord<f64>]) -> Result<(), DegenerateGeometryError> {
    if coords.len() < 2 {
        return Err(DegenerateGeometryError::TooFewPoints { found: coords.len() });
    }
    for (index, &coord) in coords.iter().enumerate() {
        if !coord.x.is_finite() || !coord.y.is_finite() {
            return Err(DegenerateGeometryError::NonFinite { index, coord });
        }
    }
    for (index, w) in coords.windows(2).enumerate() {
        if w[0] == w[1] {
            return Err(DegenerateGeometryError::ZeroLengthSegment { index, coord: w[0] });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_half_up() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-2.5), -2.0);
        assert_eq!(round_half_up(-2.6), -3.0);
        assert_eq!(round_half_up(0.49), 0.0);
    }

    #[test]
    fn test_coord_key_signed_zero() {
        let a = CoordKey::from(Coord { x: 0.0, y: -0.0 });
        let b = CoordKey::from(Coord { x: -0.0, y: 0.0 });
        assert_eq!(a, b);
    }

    #[test]
    fn test_validate_coords() {
        let ok = [Coord { x: 0.0, y: 0.0 }, Coord { x: 1.0, y: 0.0 }];
        assert!(validate_coords(&ok).is_ok());

        let short = [Coord { x: 0.0, y: 0.0 }];
        assert_eq!(
            validate_coords(&short),
            Err(DegenerateGeometryError::TooFewPoints { found: 1 })
        );

        let nan = [Coord { x: 0.0, y: 0.0 }, Coord { x: f64::NAN, y: 0.0 }];
        assert!(matches!(
            validate_coords(&nan),
            Err(DegenerateGeometryError::NonFinite { index: 1, .. })
        ));

        let repeated = [
            Coord { x: 0.0, y: 0.0 },
            Coord { x: 1.0, y: 1.0 },
            Coord { x: 1.0, y: 1.0 },
        ];
        assert!(matches!(
            validate_coords(&repeated),
            Err(DegenerateGeometryError::ZeroLengthSegment { index: 1, .. })
        ));
    }
}
