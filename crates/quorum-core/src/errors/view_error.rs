//! Binary view errors. Always fatal to the single triggering operation.

use super::error_code::{self, QuorumErrorCode};

/// Errors raised by typed views over shared byte buffers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ViewError {
    #[error("access out of bounds: offset {offset} + width {width} exceeds buffer length {len}")]
    OutOfBounds {
        offset: usize,
        width: usize,
        len: usize,
    },

    #[error("buffer length {len} is not a multiple of element width {width}")]
    Misaligned { len: usize, width: usize },

    #[error("atomic word index {index} out of range: buffer holds {words} whole words")]
    WordIndexOutOfRange { index: usize, words: usize },
}

impl QuorumErrorCode for ViewError {
    fn error_code(&self) -> &'static str {
        error_code::VIEW_ERROR
    }
}
