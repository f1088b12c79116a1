use geo_types::Coord;
use log::{debug, warn};

use crate::error::{Error, Result};
use crate::noding::segment_string::SegmentString;
use crate::noding::Noder;
use crate::utils::round_half_up;

/// Runs an integer-precision noder on data of any precision.
///
/// Input coordinates are mapped to `round((c - offset) * scale_factor)`
/// before noding and the results are mapped back with
/// `c / scale_factor + offset`. With a scale factor of 1 the wrapped noder
/// sees the input untouched.
#[derive(Debug, Clone)]
pub struct ScaledNoder<N: Noder> {
    noder: N,
    scale_factor: f64,
    offset: Coord<f64>,
}

impl<N: Noder> ScaledNoder<N> {
    pub fn new(noder: N, scale_factor: f64) -> Result<Self> {
        if !(scale_factor.is_finite() && scale_factor > 0.0) {
            return Err(Error::InvalidScaleFactor(scale_factor));
        }
        Ok(Self {
            noder,
            scale_factor,
            offset: Coord { x: 0.0, y: 0.0 },
        })
    }

    /// Moves the lattice origin, which keeps more precision for data far
    /// from (0, 0).
    pub fn with_offset(mut self, offset: Coord<f64>) -> Self {
        self.offset = offset;
        self
    }

    pub fn scale_factor(&self) -> f64 {
        self.scale_factor
    }

    pub fn offset(&self) -> Coord<f64> {
        self.offset
    }

    pub fn is_integer_precision(&self) -> bool {
        self.scale_factor == 1.0
    }

    pub fn into_inner(self) -> N {
        self.noder
    }

    fn scale(&self, strings: Vec<SegmentString>) -> Vec<SegmentString> {
        let (scale, offset) = (self.scale_factor, self.offset);
        let mut scaled = Vec::with_capacity(strings.len());
        for (i, s) in strings.into_iter().enumerate() {
            let mapped = s.map_coords(|c| Coord {
                x: round_half_up((c.x - offset.x) * scale),
                y: round_half_up((c.y - offset.y) * scale),
            });
            match mapped {
                Some(m) => scaled.push(m),
                None => warn!("segment string {i} collapsed to a point when scaled, dropping it"),
            }
        }
        scaled
    }

    fn rescale(&self, strings: Vec<SegmentString>) -> Vec<SegmentString> {
        let (scale, offset) = (self.scale_factor, self.offset);
        strings
            .iter()
            .filter_map(|s| {
                s.map_coords(|c| Coord {
                    x: c.x / scale + offset.x,
                    y: c.y / scale + offset.y,
                })
            })
            .collect()
    }
}

impl<N: Noder> Noder for ScaledNoder<N> {
    fn compute_nodes(&mut self, strings: Vec<SegmentString>) -> Result<Vec<SegmentString>> {
        if self.is_integer_precision() {
            return self.noder.compute_nodes(strings);
        }
        let input_count = strings.len();
        let scaled = self.scale(strings);
        debug!(
            "Scaled {} of {input_count} strings by {}",
            scaled.len(),
            self.scale_factor
        );
        let noded = self.noder.compute_nodes(scaled)?;
        Ok(self.rescale(noded))
    }
}
