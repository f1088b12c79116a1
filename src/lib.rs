pub mod algorithm;
pub mod error;
pub mod noding;
pub mod simplify;
pub mod utils;
pub mod wasm;

pub use error::{Error, Result};
pub use noding::{
    node_lines, McIndexSnapRounder, McSweepLineNoder, Noder, NodingValidator, ScaledNoder,
    SegmentString,
};
pub use simplify::{simplify, SimplifyMethod, TopologyPreservingSimplifier};
