/// Errors produced by the `chess-corners` facade.
///
/// `NoDetection` (spec §7) is not a variant here: zero surviving corners is a
/// successful `find`/`refine` call with an empty or unchanged result.
#[derive(thiserror::Error, Debug)]
pub enum DetectError {
    #[error("invalid input image: {reason}")]
    InvalidInput { reason: String },

    #[error("pyramid level {level} out of range [0, {max}] (use -1 for auto)")]
    LevelOutOfRange { level: i32, max: i32 },

    #[error(transparent)]
    Core(#[from] chess_corners_core::ChessCornerError),
}

pub type Result<T> = std::result::Result<T, DetectError>;
