//! Connected-component tracker (spec §4.3).
//!
//! Flood-fills the positive half of a ChESS response field, zeroing every
//! pixel it visits so the outer raster scan never revisits it and two
//! reported centroids never share a pixel. Each accepted component yields
//! one intensity-weighted centroid, gated on component size, peak response,
//! and local image variance.

use crate::config::ChessParams;
use crate::imageview::ImageView;
use crate::response::ResponseMap;
use crate::variance::high_variance_gated;

/// One detected corner, in the local pixel frame of the `ResponseMap` it was
/// extracted from (i.e. excluding `ResponseMap::origin` — add that back in
/// to get coordinates in the image the response was computed from).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawCorner {
    pub xy: [f32; 2],
    pub strength: f32,
}

#[derive(Default)]
struct ComponentAccumulator {
    sum_w_x: u64,
    sum_w_y: u64,
    sum_w: u64,
    n: u32,
    x_peak: i32,
    y_peak: i32,
    response_max: i16,
}

impl ComponentAccumulator {
    fn accumulate(&mut self, x: i32, y: i32, response: i16) {
        if response > self.response_max {
            self.response_max = response;
            self.x_peak = x;
            self.y_peak = y;
        }
        self.sum_w_x += response as u64 * x as u64;
        self.sum_w_y += response as u64 * y as u64;
        self.sum_w += response as u64;
        self.n += 1;
    }

    fn centroid(&self) -> (f32, f32) {
        (
            self.sum_w_x as f32 / self.sum_w as f32,
            self.sum_w_y as f32 / self.sum_w as f32,
        )
    }
}

/// LIFO bag of candidate pixel coordinates awaiting visitation within one
/// component's flood fill, reused across every component of one `Tracker`
/// invocation.
struct XyStack {
    xy: Vec<(i16, i16)>,
}

impl XyStack {
    fn new() -> Self {
        Self {
            xy: Vec::with_capacity(128),
        }
    }

    fn reset(&mut self) {
        self.xy.clear();
    }

    fn push(&mut self, x: i16, y: i16) {
        self.xy.push((x, y));
    }

    fn pop(&mut self) -> Option<(i16, i16)> {
        self.xy.pop()
    }
}

#[inline]
fn is_candidate(resp: &ResponseMap, x: i32, y: i32, threshold: i16, max_so_far: Option<i16>) -> bool {
    if x < 0 || y < 0 || x as usize >= resp.w || y as usize >= resp.h {
        return false;
    }
    let response = resp.get(x as usize, y as usize);
    response > threshold && max_so_far.is_none_or(|m| response > (m >> 4))
}

fn check_and_push(
    stack: &mut XyStack,
    touched_margin: &mut bool,
    x: i32,
    y: i32,
    resp: &ResponseMap,
    margin: i32,
) {
    if !(x >= margin
        && (x as usize) < resp.w.saturating_sub(margin as usize)
        && y >= margin
        && (y as usize) < resp.h.saturating_sub(margin as usize))
    {
        *touched_margin = true;
        return;
    }
    if resp.get(x as usize, y as usize) <= 0 {
        return;
    }
    stack.push(x as i16, y as i16);
}

/// Grow the connected component seeded by whatever is currently on `stack`,
/// consuming (zeroing) every pixel visited. Returns the weighted centroid
/// and peak response if the completed component passes every validity test;
/// otherwise `None`. Either way, every visited pixel is left at 0.
///
/// `image` supplies pixel intensities for the variance gate, in the same
/// parent-image coordinate frame as `resp.origin`/`image.origin` (so a
/// patch-sized `resp` paired with a differently-offset `image` is sampled
/// at the right place instead of at `resp`'s own local coordinates).
/// `None` skips the gate entirely.
fn follow_component(
    stack: &mut XyStack,
    resp: &mut ResponseMap,
    image: Option<ImageView<'_>>,
    threshold: i16,
    margin: i32,
    params: &ChessParams,
) -> Option<RawCorner> {
    let mut acc = ComponentAccumulator::default();
    let mut touched_margin = false;

    while let Some((x, y)) = stack.pop() {
        let (x, y) = (x as i32, y as i32);
        let max_so_far = if acc.n > 0 { Some(acc.response_max) } else { None };
        if !is_candidate(resp, x, y, threshold, max_so_far) {
            resp.set(x as usize, y as usize, 0);
            continue;
        }

        let response = resp.get(x as usize, y as usize);
        acc.accumulate(x, y, response);
        resp.set(x as usize, y as usize, 0);

        check_and_push(stack, &mut touched_margin, x + 1, y, resp, margin);
        check_and_push(stack, &mut touched_margin, x - 1, y, resp, margin);
        check_and_push(stack, &mut touched_margin, x, y + 1, resp, margin);
        check_and_push(stack, &mut touched_margin, x, y - 1, resp, margin);
    }

    if touched_margin {
        return None;
    }
    if acc.n < params.min_cluster_size {
        return None;
    }
    if acc.response_max <= params.response_min_peak_threshold() {
        return None;
    }
    if let Some(view) = image {
        let img_x = acc.x_peak + resp.origin[0] - view.origin[0];
        let img_y = acc.y_peak + resp.origin[1] - view.origin[1];
        if !high_variance_gated(img_x, img_y, view.width as i32, view.height as i32, view.data, params) {
            return None;
        }
    }

    let (cx, cy) = acc.centroid();
    Some(RawCorner {
        xy: [cx, cy],
        strength: acc.response_max as f32,
    })
}

/// Full raster-scan pass (spec §4.3 `process_full`): walk every interior
/// pixel in row-major order, growing and consuming a component at each
/// surviving candidate seed. `resp` is mutated in place — every pixel ends
/// up `<= 0` on return. `image`, if given, supplies the variance gate (see
/// [`follow_component`]); `None` genuinely disables the gate rather than
/// sampling a stand-in buffer.
pub fn process_full(resp: &mut ResponseMap, image: Option<ImageView<'_>>, params: &ChessParams, margin: i32) -> Vec<RawCorner> {
    let threshold = params.response_min_threshold(resp.max_positive());
    let mut stack = XyStack::new();
    let mut out = Vec::new();

    let y_lo = margin + 1;
    let y_hi = resp.h as i32 - margin - 1;
    let x_lo = margin + 1;
    let x_hi = resp.w as i32 - margin - 1;

    let mut y = y_lo;
    while y < y_hi {
        let mut x = x_lo;
        while x < x_hi {
            if is_candidate(resp, x, y, threshold, None) {
                stack.reset();
                stack.push(x as i16, y as i16);
                if let Some(corner) = follow_component(&mut stack, resp, image, threshold, margin, params) {
                    out.push(corner);
                }
            }
            x += 1;
        }
        y += 1;
    }

    apply_nms(out, params.nms_radius)
}

/// Per-seed refinement pass (spec §4.3 `process_refine`): for each seed,
/// grow a component starting from the `radius`-pixel neighborhood of its
/// rounded position. Returns one slot per seed, `None` where refinement did
/// not produce a valid component (the caller keeps the seed's previous
/// position and level in that case). `image` has the same meaning as in
/// [`process_full`].
pub fn process_refine(
    resp: &mut ResponseMap,
    image: Option<ImageView<'_>>,
    params: &ChessParams,
    margin: i32,
    seeds: &[(f32, f32)],
    radius: i32,
) -> Vec<Option<RawCorner>> {
    let threshold = params.response_min_threshold(resp.max_positive());
    let mut stack = XyStack::new();

    seeds
        .iter()
        .map(|&(sx, sy)| {
            let x = (sx + 0.5).floor() as i32;
            let y = (sy + 0.5).floor() as i32;

            stack.reset();
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    if is_candidate(resp, x + dx, y + dy, threshold, None) {
                        stack.push((x + dx) as i16, (y + dy) as i16);
                    }
                }
            }
            follow_component(&mut stack, resp, image, threshold, margin, params)
        })
        .collect()
}

/// Drop any corner that lies within `radius` pixels of a stronger corner
/// already kept. `radius == 0` disables the pass. Runs after centroids are
/// weighted, not instead of the tracker's own pixel-level disjointness.
fn apply_nms(mut corners: Vec<RawCorner>, radius: u32) -> Vec<RawCorner> {
    if radius == 0 || corners.len() < 2 {
        return corners;
    }
    let r2 = (radius * radius) as f32;
    corners.sort_by(|a, b| b.strength.partial_cmp(&a.strength).unwrap_or(std::cmp::Ordering::Equal));

    let mut kept: Vec<RawCorner> = Vec::with_capacity(corners.len());
    'candidates: for c in corners {
        for k in &kept {
            let dx = c.xy[0] - k.xy[0];
            let dy = c.xy[1] - k.xy[1];
            if dx * dx + dy * dy <= r2 {
                continue 'candidates;
            }
        }
        kept.push(c);
    }
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::chess_response_u8;

    fn saddle_image(w: usize, h: usize, cx: i32, cy: i32) -> Vec<u8> {
        let mut img = vec![0u8; w * h];
        for y in 0..h {
            for x in 0..w {
                let dx = x as i32 - cx;
                let dy = y as i32 - cy;
                let bright = (dx >= 0) == (dy >= 0);
                img[y * w + x] = if bright { 220 } else { 30 };
            }
        }
        img
    }

    #[test]
    fn constant_image_yields_no_corners() {
        let (w, h) = (64, 64);
        let img = vec![128u8; w * h];
        let view = ImageView::new(w, h, &img).unwrap();
        let params = ChessParams::default();
        let mut resp = chess_response_u8(&img, w, h, &params);
        let corners = process_full(&mut resp, Some(view), &params, ChessParams::MARGIN);
        assert!(corners.is_empty());
    }

    #[test]
    fn single_saddle_yields_exactly_one_corner_near_truth() {
        let (w, h) = (200, 200);
        let img = saddle_image(w, h, 100, 100);
        let view = ImageView::new(w, h, &img).unwrap();
        let params = ChessParams::default();
        let mut resp = chess_response_u8(&img, w, h, &params);
        let corners = process_full(&mut resp, Some(view), &params, ChessParams::MARGIN);

        assert_eq!(corners.len(), 1);
        let c = corners[0];
        assert!((c.xy[0] - 100.0).abs() < 0.5);
        assert!((c.xy[1] - 100.0).abs() < 0.5);
    }

    #[test]
    fn low_texture_peak_is_rejected_by_the_variance_gate() {
        // A flat-ish image with a tiny 1-pixel perturbation can still trip the
        // ChESS response locally, but the surrounding 21x21 window is far too
        // constant to pass `high_variance`.
        let (w, h) = (64, 64);
        let mut img = vec![128u8; w * h];
        img[32 * w + 32] = 129;
        let view = ImageView::new(w, h, &img).unwrap();
        let params = ChessParams::default();
        let mut resp = chess_response_u8(&img, w, h, &params);
        let corners = process_full(&mut resp, Some(view), &params, ChessParams::MARGIN);
        assert!(corners.is_empty());
    }

    #[test]
    fn margin_touching_component_is_rejected() {
        let (w, h) = (200, 200);
        let img = saddle_image(w, h, 8, 100);
        let view = ImageView::new(w, h, &img).unwrap();
        let params = ChessParams::default();
        let mut resp = chess_response_u8(&img, w, h, &params);
        let corners = process_full(&mut resp, Some(view), &params, ChessParams::MARGIN);
        assert!(corners.is_empty());
    }

    #[test]
    fn consumed_pixels_never_overlap_between_components() {
        let (w, h) = (200, 120);
        let mut img = vec![128u8; w * h];
        for (cx, cy) in [(50, 60), (150, 60)] {
            let patch = saddle_image(60, 60, 30, 30);
            for y in 0..60usize {
                for x in 0..60usize {
                    img[(cy - 30 + y as i32) as usize * w + (cx - 30 + x as i32) as usize] =
                        patch[y * 60 + x];
                }
            }
        }
        let view = ImageView::new(w, h, &img).unwrap();
        let params = ChessParams::default();
        let mut resp = chess_response_u8(&img, w, h, &params);
        let corners = process_full(&mut resp, Some(view), &params, ChessParams::MARGIN);
        assert_eq!(corners.len(), 2);
        // every response cell was consumed (zeroed) by the scan
        assert!(resp.data.iter().all(|&r| r <= 0));
    }

    #[test]
    fn refine_pass_only_touches_requested_seeds() {
        let (w, h) = (200, 200);
        let img = saddle_image(w, h, 100, 100);
        let view = ImageView::new(w, h, &img).unwrap();
        let params = ChessParams::default();
        let mut resp = chess_response_u8(&img, w, h, &params);
        let seeds = [(100.0f32, 100.0f32)];
        let refined = process_refine(&mut resp, Some(view), &params, ChessParams::MARGIN, &seeds, 1);
        assert_eq!(refined.len(), 1);
        assert!(refined[0].is_some());
    }

    #[test]
    fn patch_response_with_offset_view_samples_the_variance_gate_at_the_right_pixels() {
        // resp is computed over a small ROI of a larger image, with its own
        // origin; image is a separately-offset view into a *different*
        // sub-rectangle of that same parent frame. The gate must translate
        // resp's local peak coordinates through both origins before
        // sampling, not index `image` with resp's own width.
        let (full_w, full_h) = (200, 200);
        let full = saddle_image(full_w, full_h, 100, 100);

        let roi = crate::response::Roi {
            x0: 80,
            y0: 80,
            x1: 120,
            y1: 120,
        };
        let params = ChessParams::default();
        let mut resp = crate::response::chess_response_u8_patch(&full, full_w, full_h, &params, roi);

        // a view into a differently-sized, differently-offset window that
        // still covers the saddle and shares the parent image's frame.
        let view_origin = [70, 70];
        let (view_w, view_h) = (100, 100);
        let mut patch = vec![0u8; view_w * view_h];
        for y in 0..view_h {
            for x in 0..view_w {
                patch[y * view_w + x] = full[(view_origin[1] + y as i32) as usize * full_w + (view_origin[0] + x as i32) as usize];
            }
        }
        let view = ImageView::with_origin(view_w, view_h, &patch, view_origin).unwrap();

        let corners = process_full(&mut resp, Some(view), &params, ChessParams::MARGIN);
        assert_eq!(corners.len(), 1);
        let c = corners[0];
        // corner coordinates are local to resp's own origin-relative frame
        assert!((c.xy[0] + resp.origin[0] as f32 - 100.0).abs() < 0.5);
        assert!((c.xy[1] + resp.origin[1] as f32 - 100.0).abs() < 0.5);
    }
}
