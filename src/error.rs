//! Error types
//!
//! Distance queries and marching never fail; errors only arise from
//! parsing user-facing names and from caller-supplied output buffers.

use thiserror::Error;

/// Errors raised outside the marching hot path
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarchError {
    /// Algorithm name not recognised
    #[error("unknown raymarching algorithm: {0}")]
    UnknownAlgorithm(String),

    /// Acceleration structure name not recognised
    #[error("unknown acceleration structure: {0}")]
    UnknownAcceleration(String),

    /// Output buffer length does not match the frame size
    #[error("{buffer} buffer holds {actual} values, expected {expected}")]
    BufferSize {
        /// Which buffer
        buffer: &'static str,
        /// Required length
        expected: usize,
        /// Supplied length
        actual: usize,
    },

    /// Row range outside the frame
    #[error("rows {start}..{end} out of range for height {height}")]
    RowRange {
        /// First row
        start: u32,
        /// One past the last row
        end: u32,
        /// Frame height
        height: u32,
    },
}
