//! Per-corner descriptor (supplemented feature, see SPEC_FULL.md).
//!
//! mrgingham's output is a bare point. Everything downstream in the broader
//! ecosystem (axis estimation, grid alignment) wants an orientation too, so
//! every corner `chess-corners` reports carries one, estimated from the
//! local image structure tensor.

/// A detected chessboard corner in full-image pixel coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CornerDescriptor {
    pub x: f32,
    pub y: f32,
    /// Dominant local edge orientation in radians, taken mod π (a saddle
    /// corner's principal axis has no natural front/back).
    pub orientation: f32,
    /// ChESS response at the corner (the component's `response_max`).
    pub response: f32,
}

/// Structure-tensor orientation of the `(2r+1) x (2r+1)` window of `data`
/// centred at `(cx, cy)`, the same window the variance gate inspects.
/// Falls back to `0.0` when the window touches the image border (gradients
/// are undefined there) or is degenerate (uniform window).
pub(crate) fn estimate_orientation(data: &[u8], w: usize, h: usize, cx: i32, cy: i32, r: i32) -> f32 {
    if cx - r - 1 < 0 || cy - r - 1 < 0 || cx + r + 1 >= w as i32 || cy + r + 1 >= h as i32 {
        return 0.0;
    }

    let px = |x: i32, y: i32| data[y as usize * w + x as usize] as f64;

    let (mut sxx, mut syy, mut sxy) = (0.0f64, 0.0f64, 0.0f64);
    for dy in -r..=r {
        for dx in -r..=r {
            let x = cx + dx;
            let y = cy + dy;
            let gx = px(x + 1, y) - px(x - 1, y);
            let gy = px(x, y + 1) - px(x, y - 1);
            sxx += gx * gx;
            syy += gy * gy;
            sxy += gx * gy;
        }
    }

    if sxx + syy == 0.0 {
        return 0.0;
    }

    let mut theta = 0.5 * (2.0 * sxy).atan2(sxx - syy);
    if theta < 0.0 {
        theta += std::f64::consts::PI;
    }
    theta as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_window_has_no_defined_orientation() {
        let (w, h) = (40, 40);
        let data = vec![100u8; w * h];
        assert_eq!(estimate_orientation(&data, w, h, 20, 20, 10), 0.0);
    }

    #[test]
    fn vertical_edge_orients_along_the_edge() {
        let (w, h) = (40, 40);
        let mut data = vec![20u8; w * h];
        for y in 0..h {
            for x in 20..w {
                data[y * w + x] = 220;
            }
        }
        let theta = estimate_orientation(&data, w, h, 20, 20, 8);
        // a vertical intensity edge has a purely horizontal gradient, so the
        // structure tensor's dominant axis (theta == 0) runs along x.
        assert!(theta.abs() < 0.05 || (theta - std::f32::consts::PI).abs() < 0.05);
    }

    #[test]
    fn window_touching_border_falls_back_to_zero() {
        let (w, h) = (20, 20);
        let data = vec![128u8; w * h];
        assert_eq!(estimate_orientation(&data, w, h, 2, 2, 10), 0.0);
    }
}
