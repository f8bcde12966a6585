//! ChESS chessboard-corner detector.
//!
//! Public facade over `chess-corners-core`: decodes nothing itself (callers
//! hand it an `image::GrayImage`), runs the coarse-to-fine detection and
//! refinement protocol, and reports [`CornerDescriptor`]s or the
//! scaled-integer wire format the `find`/`refine` entry points use to talk
//! to an external grid fitter (spec §4.6 — out of scope here).

pub mod debug;
pub mod descriptor;
mod error;
mod facade;

pub use chess_corners_core::{ChessConfig, ChessParams, CoarseToFineParams, PyramidParams, Refiner, RefinerKind};
pub use debug::{DebugSink, FileDebugSink, NoopDebugSink};
pub use descriptor::CornerDescriptor;
pub use error::{DetectError, Result};
pub use facade::{default_chess_config, find, find_chess_corners_image, refine, FIND_GRID_SCALE};
