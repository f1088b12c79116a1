pub mod line_intersector;

pub use line_intersector::{
    IntersectionKind, LineIntersector, RobustLineIntersector, SegmentIntersection,
};
