//! Variance gate (spec §4.2).
//!
//! Rejects a candidate corner whose surrounding intensity window is too flat
//! to plausibly be a chessboard saddle — i.e. a spurious ChESS peak that
//! landed inside a solid-colour square.

use crate::config::ChessParams;

/// True iff the sample variance of the `(2r+1) x (2r+1)` window of `image`
/// centred at `(x, y)` exceeds `variance_threshold`. Out-of-bounds windows
/// return `false`. Uses the biased estimator (sum of squared deviations over
/// window area), matching the reference implementation exactly.
pub fn high_variance(
    x: i32,
    y: i32,
    w: i32,
    h: i32,
    image: &[u8],
    r: i32,
    variance_threshold: i32,
) -> bool {
    if x - r < 0 || x + r >= w || y - r < 0 || y + r >= h {
        return false;
    }

    let side = 1 + 2 * r;
    let area = side * side;

    let mut sum = 0i64;
    for dy in -r..=r {
        for dx in -r..=r {
            let px = (x + dx) as usize;
            let py = (y + dy) as usize;
            sum += image[py * w as usize + px] as i64;
        }
    }
    let mean = sum / area as i64;

    let mut sum_deviation_sq = 0i64;
    for dy in -r..=r {
        for dx in -r..=r {
            let px = (x + dx) as usize;
            let py = (y + dy) as usize;
            let deviation = image[py * w as usize + px] as i64 - mean;
            sum_deviation_sq += deviation * deviation;
        }
    }
    let variance = sum_deviation_sq / area as i64;

    variance > variance_threshold as i64
}

/// `high_variance` using the window radius and threshold selected by `params`.
pub fn high_variance_gated(x: i32, y: i32, w: i32, h: i32, image: &[u8], params: &ChessParams) -> bool {
    high_variance(
        x,
        y,
        w,
        h,
        image,
        params.constancy_window_r(),
        params.variance_threshold(),
    )
}
