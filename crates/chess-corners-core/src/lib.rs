//! Low-level ChESS corner-detection engine.
//!
//! This crate is the response operator, variance gate, connected-component
//! tracker, and image pyramid in isolation — no I/O, no orientation
//! estimation, no debug tracing. Application code should generally depend on
//! `chess-corners` instead; this crate exists so alternative detectors
//! (ChArUco, marker boards) can reuse the underlying primitives without also
//! taking `chess-corners`'s descriptor and facade layers.

pub mod config;
pub mod detect;
pub mod error;
pub mod imageview;
pub mod pyramid;
pub mod response;
pub mod tracker;
pub mod variance;

pub use config::{ChessConfig, ChessParams, CoarseToFineParams, PyramidParams, Refiner, RefinerKind};
pub use error::{ChessCornerError, Result};
pub use tracker::RawCorner;
