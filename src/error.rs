use geo_types::Coord;
use thiserror::Error;

/// Input that cannot be noded or simplified meaningfully.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DegenerateGeometryError {
    #[error("a segment string needs at least 2 vertices, found {found}")]
    TooFewPoints { found: usize },

    #[error("non-finite coordinate ({}, {}) at vertex {index}", .coord.x, .coord.y)]
    NonFinite { index: usize, coord: Coord<f64> },

    #[error("zero-length segment at vertex {index} ({}, {})", .coord.x, .coord.y)]
    ZeroLengthSegment { index: usize, coord: Coord<f64> },
}

/// The first violation of the noding post-condition found by
/// [`NodingValidator`](crate::noding::NodingValidator).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NotSimpleError {
    #[error("found a-b-a collapse at vertex {index} ({}, {})", .coord.x, .coord.y)]
    Collapse { index: usize, coord: Coord<f64> },

    #[error("found endpoint/interior vertex intersection at ({}, {})", .coord.x, .coord.y)]
    EndpointOnInterior { coord: Coord<f64> },

    #[error(
        "found non-noded intersection at ({}, {}) between {segment0:?} and {segment1:?}",
        .point.x, .point.y
    )]
    InteriorIntersection {
        segment0: [Coord<f64>; 2],
        segment1: [Coord<f64>; 2],
        point: Coord<f64>,
    },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Degenerate geometry: {0}")]
    Degenerate(#[from] DegenerateGeometryError),

    #[error("Noding is not simple: {0}")]
    NotSimple(#[from] NotSimpleError),

    #[error("Invalid scale factor: {0}")]
    InvalidScaleFactor(f64),

    #[error("Invalid distance tolerance: {0}")]
    InvalidTolerance(f64),
}

pub type Result<T> = std::result::Result<T, Error>;
