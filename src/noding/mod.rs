//! Noding: splitting a set of lines so that they meet only at endpoints.
//!
//! Strings live in a caller-owned arena (`Vec<SegmentString>`); chains,
//! sweep events and index entries refer to them by position, and
//! intersections are recorded by appending nodes to the strings.

pub mod hot_pixel;
pub mod mc_noder;
pub mod monotone_chain;
pub mod point_snapper;
pub mod scaled_noder;
pub mod segment_intersector;
pub mod segment_string;
pub mod snap;
pub mod sweep_line;
pub mod validator;

#[cfg(test)]
mod tests;

use geo_types::LineString;
use log::info;

use crate::error::Result;

pub use hot_pixel::HotPixel;
pub use mc_noder::McSweepLineNoder;
pub use monotone_chain::{MonotoneChain, MonotoneChainEdge};
pub use point_snapper::McIndexPointSnapper;
pub use scaled_noder::ScaledNoder;
pub use segment_intersector::{IntersectionAdder, InteriorIntersectionFinder, SegmentIntersector};
pub use segment_string::{noded_substrings, SegmentNode, SegmentString};
pub use snap::McIndexSnapRounder;
pub use sweep_line::{SimpleMcSweepLineIntersector, SweepLineBuilder};
pub use validator::NodingValidator;

/// Computes the noded substrings of a set of segment strings.
pub trait Noder {
    fn compute_nodes(&mut self, strings: Vec<SegmentString>) -> Result<Vec<SegmentString>>;
}

/// Nodes a set of lines.
///
/// With a scale factor the lines are snap rounded onto the `1 / scale`
/// lattice and the result is guaranteed fully noded. Without one the
/// floating-point sweep noder is used. Output lines are grouped by the
/// input line they came from, in input order.
pub fn node_lines(lines: &[LineString<f64>], scale: Option<f64>) -> Result<Vec<LineString<f64>>> {
    let strings = lines
        .iter()
        .enumerate()
        .map(|(i, line)| SegmentString::from_line_string(line).map(|s| s.with_data(i)))
        .collect::<Result<Vec<_>>>()?;

    let noded = match scale {
        Some(scale) => {
            ScaledNoder::new(McIndexSnapRounder::new(1.0)?, scale)?.compute_nodes(strings)?
        }
        None => McSweepLineNoder::new().compute_nodes(strings)?,
    };
    info!("Noded {} lines into {} substrings", lines.len(), noded.len());

    Ok(noded.iter().map(SegmentString::to_line_string).collect())
}
