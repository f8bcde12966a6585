/// Errors produced by the engine crate.
///
/// `NoDetection` (spec: zero candidates survive) is deliberately absent here:
/// it is not an error, it is an empty `Ok` result. Only conditions a caller
/// must fix before retrying are represented as `Err`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessCornerError {
    #[error("image buffer is not contiguous: width={width} height={height} len={len}")]
    NonContiguousImage {
        width: usize,
        height: usize,
        len: usize,
    },
}

pub type Result<T> = std::result::Result<T, ChessCornerError>;
