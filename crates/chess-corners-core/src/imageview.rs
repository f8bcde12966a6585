//! Borrowed view over a contiguous 8-bit grayscale raster.
//!
//! Mirrors `calib-targets-core::GrayImageView`: a thin, non-owning wrapper so
//! the engine never has to know about `image::GrayImage` or any other
//! concrete pixel-buffer type. `origin` lets a view into a patch of a larger
//! image still report coordinates in the parent image's frame (used by the
//! ROI-limited response path).

use crate::error::{ChessCornerError, Result};

#[derive(Clone, Copy, Debug)]
pub struct ImageView<'a> {
    pub width: usize,
    pub height: usize,
    pub data: &'a [u8],
    /// Coordinates of `data[0]` in the parent image's pixel frame.
    pub origin: [i32; 2],
}

impl<'a> ImageView<'a> {
    pub fn new(width: usize, height: usize, data: &'a [u8]) -> Result<Self> {
        Self::with_origin(width, height, data, [0, 0])
    }

    pub fn with_origin(
        width: usize,
        height: usize,
        data: &'a [u8],
        origin: [i32; 2],
    ) -> Result<Self> {
        if data.len() != width * height {
            return Err(ChessCornerError::NonContiguousImage {
                width,
                height,
                len: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
            origin,
        })
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> u8 {
        let lx = x - self.origin[0];
        let ly = y - self.origin[1];
        if lx < 0 || ly < 0 || lx as usize >= self.width || ly as usize >= self.height {
            return 0;
        }
        self.data[ly as usize * self.width + lx as usize]
    }

    /// True if `(x, y)` (in the view's own local frame, ignoring `origin`)
    /// lies within the `margin`-shrunken interior.
    #[inline]
    pub fn in_margin_interior(&self, x: i32, y: i32, margin: i32) -> bool {
        x >= margin
            && (x as usize) < self.width.saturating_sub(margin as usize)
            && y >= margin
            && (y as usize) < self.height.saturating_sub(margin as usize)
    }
}
