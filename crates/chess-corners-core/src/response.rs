//! ChESS-5 corner-response operator.
//!
//! Samples 16 pixels around a radius-5 circle centred on each interior pixel
//! and scores how strongly the neighborhood looks like a chessboard saddle:
//! points 180 degrees apart across the circle should be similar (a saddle's
//! diagonal quadrants share a colour), while the circle as a whole should
//! differ substantially from its own mean (the saddle's bright/dark
//! quadrants alternate every 90 degrees). The response is
//!
//! ```text
//! response = symmetric_term - perimeter_term
//! symmetric_term  = sum_{i=0}^{7}  |s[i] + s[i+8] - 2*mean|
//! perimeter_term  = sum_{i=0}^{15} |s[i] - s[(i+1) % 16]|
//! ```
//!
//! `symmetric_term` is large when opposite samples are both far from the
//! mean in the *same* direction (flat, high-contrast quadrants), and
//! `perimeter_term` is large whenever adjacent samples disagree, which a
//! saddle does constantly as it winds around the circle. Net, the response
//! peaks at saddle points and stays flat inside a single-colour square,
//! where both terms are near zero.
//!
//! Output is invalid within `ChessParams::MARGIN` pixels of the border;
//! callers must not read `ResponseMap` values there.

use crate::config::ChessParams;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// 16-point Bresenham-style circle of radius 5, sampled every 22.5 degrees.
/// Diametrically opposite samples are exact negations of each other, i.e.
/// `OFFSETS[i] == -OFFSETS[i + 8]`.
const OFFSETS: [(i32, i32); 16] = [
    (5, 0),
    (5, 2),
    (4, 4),
    (2, 5),
    (0, 5),
    (-2, 5),
    (-4, 4),
    (-5, 2),
    (-5, 0),
    (-5, -2),
    (-4, -4),
    (-2, -5),
    (0, -5),
    (2, -5),
    (4, -4),
    (5, -2),
];

/// A rectangular sub-region of an image, in that image's pixel coordinates.
/// `x1`/`y1` are exclusive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Roi {
    pub x0: usize,
    pub y0: usize,
    pub x1: usize,
    pub y1: usize,
}

impl Roi {
    pub fn width(&self) -> usize {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(&self) -> usize {
        self.y1.saturating_sub(self.y0)
    }

    fn full(w: usize, h: usize) -> Self {
        Roi {
            x0: 0,
            y0: 0,
            x1: w,
            y1: h,
        }
    }
}

/// A signed 16-bit response field. Values `<= 0` mean "not a corner
/// candidate"; this is also the state a pixel is put into once the
/// connected-component tracker has consumed it (spec §3).
#[derive(Clone, Debug)]
pub struct ResponseMap {
    pub w: usize,
    pub h: usize,
    pub data: Vec<i16>,
    /// Offset of `data[0]` in the coordinate system of the image the
    /// response was computed from. Non-zero for patch responses.
    pub origin: [i32; 2],
}

impl ResponseMap {
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> i16 {
        self.data[y * self.w + x]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, v: i16) {
        self.data[y * self.w + x] = v;
    }

    /// Strongest positive response currently present in the field.
    pub fn max_positive(&self) -> i16 {
        self.data.iter().copied().filter(|&r| r > 0).max().unwrap_or(0)
    }
}

#[inline]
fn sample(data: &[u8], w: usize, h: usize, x: i32, y: i32) -> i32 {
    if x < 0 || y < 0 || x as usize >= w || y as usize >= h {
        return 0;
    }
    data[y as usize * w + x as usize] as i32
}

/// ChESS-5 response at a single interior pixel. Callers must ensure
/// `(x, y)` is at least `ChessParams::MARGIN` from every border of the
/// `w x h` image `data` belongs to.
fn response_at(data: &[u8], w: usize, h: usize, x: i32, y: i32) -> i16 {
    let mut s = [0i32; 16];
    for (i, (dx, dy)) in OFFSETS.iter().enumerate() {
        s[i] = sample(data, w, h, x + dx, y + dy);
    }

    let sum: i32 = s.iter().sum();
    let mean = sum / 16;

    let mut symmetric_term = 0i32;
    for i in 0..8 {
        symmetric_term += (s[i] + s[i + 8] - 2 * mean).abs();
    }

    let mut perimeter_term = 0i32;
    for i in 0..16 {
        perimeter_term += (s[i] - s[(i + 1) % 16]).abs();
    }

    (symmetric_term - perimeter_term).clamp(i16::MIN as i32, i16::MAX as i32) as i16
}

/// Compute the ChESS-5 response over the whole `w x h` image.
///
/// `data.len()` must equal `w * h`; non-contiguous buffers are the caller's
/// responsibility to rule out (spec §4.1 treats this as a precondition, not
/// a runtime-checked error, at this layer — `chess-corners`'s public entry
/// points validate contiguity before reaching here).
pub fn chess_response_u8(data: &[u8], w: usize, h: usize, _params: &ChessParams) -> ResponseMap {
    chess_response_u8_patch(data, w, h, _params, Roi::full(w, h))
}

/// Compute the ChESS-5 response restricted to `roi` of the `w x h` image
/// `data`. The returned map is sized to `roi`'s extent with `origin` set to
/// `(roi.x0, roi.y0)`; pixels within `ChessParams::MARGIN` of the *image's*
/// border (not the ROI's) are left at 0, exactly as the full-image variant
/// leaves them invalid.
pub fn chess_response_u8_patch(
    data: &[u8],
    w: usize,
    h: usize,
    _params: &ChessParams,
    roi: Roi,
) -> ResponseMap {
    let roi = Roi {
        x0: roi.x0.min(w),
        y0: roi.y0.min(h),
        x1: roi.x1.min(w),
        y1: roi.y1.min(h),
    };
    let rw = roi.width();
    let rh = roi.height();
    let mut out = vec![0i16; rw * rh];

    let fill_row = |ry: usize, row: &mut [i16]| {
        let margin = ChessParams::MARGIN;
        let y = roi.y0 + ry;
        if y < margin as usize || y + margin as usize >= h {
            return;
        }
        for (rx, cell) in row.iter_mut().enumerate() {
            let x = roi.x0 + rx;
            if x < margin as usize || x + margin as usize >= w {
                continue;
            }
            *cell = response_at(data, w, h, x as i32, y as i32);
        }
    };

    #[cfg(feature = "rayon")]
    out.par_chunks_mut(rw).enumerate().for_each(|(ry, row)| fill_row(ry, row));
    #[cfg(not(feature = "rayon"))]
    out.chunks_mut(rw).enumerate().for_each(|(ry, row)| fill_row(ry, row));

    ResponseMap {
        w: rw,
        h: rh,
        data: out,
        origin: [roi.x0 as i32, roi.y0 as i32],
    }
}
