//! Coarse-to-fine detection driver (spec §4.4, §4.5).
//!
//! Ties the response operator, variance gate, connected-component tracker,
//! and image pyramid together: find corners at the coarsest pyramid level
//! that yields any, then walk back down to level 0, refining each point's
//! position one level at a time.

use log::debug;

#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::config::{ChessConfig, ChessParams, Refiner, RefinerKind};
use crate::imageview::ImageView;
use crate::pyramid::{build_pyramid, scale_image_coord};
use crate::response::{chess_response_u8, ResponseMap};
use crate::tracker::{process_full, process_refine, RawCorner};

/// Run the tracker once against a precomputed response field and adapt the
/// result through `refiner`. `image` supplies pixel intensities for the
/// variance gate, in the same parent-image coordinate frame as
/// `resp.origin`/`image.origin` — this is what lets a patch-sized `resp`
/// (from [`crate::response::chess_response_u8_patch`]) pair with a
/// differently-offset `image` view and still sample the gate at the right
/// pixels. Passing `None` genuinely disables the gate (every response peak
/// above threshold is accepted, regardless of local texture) and is meant
/// for callers who validate candidates some other way downstream. `resp` is
/// cloned internally, so the caller's copy is left untouched and may be
/// reused (e.g. for a second, smaller ROI pass).
pub fn detect_corners_from_response_with_refiner(
    resp: &ResponseMap,
    params: &ChessParams,
    image: Option<ImageView<'_>>,
    refiner: &mut Refiner,
) -> Vec<RawCorner> {
    debug_assert_eq!(
        refiner.kind(),
        RefinerKind::Centroid,
        "only the centroid refiner is implemented"
    );

    let mut working = resp.clone();
    process_full(&mut working, image, params, ChessParams::MARGIN)
}

/// Full coarse-to-fine protocol over an image pyramid built from `image`.
/// Returns corners in `image`'s own full-resolution pixel frame.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(image, config, refiner), fields(width = image.width, height = image.height))
)]
pub fn detect_corners_multiscale(image: ImageView<'_>, config: &ChessConfig, refiner: &mut Refiner) -> Vec<RawCorner> {
    let levels = build_pyramid(image.data, image.width, image.height, &config.multiscale.pyramid);
    debug!("built {} pyramid levels from a {}x{} image", levels.len(), image.width, image.height);

    let mut coarse_idx = levels.len() - 1;
    let mut points: Vec<(f32, f32, f32)> = loop {
        let level = &levels[coarse_idx];
        let resp = chess_response_u8(&level.data, level.width, level.height, &config.params);
        let view = ImageView::new(level.width, level.height, &level.data).expect("pyramid level is contiguous");
        let seeds = detect_corners_from_response_with_refiner(&resp, &config.params, Some(view), refiner);
        debug!("level {coarse_idx}: {} seed corners", seeds.len());
        if !seeds.is_empty() || coarse_idx == 0 {
            break seeds.iter().map(|c| (c.xy[0], c.xy[1], c.strength)).collect();
        }
        coarse_idx -= 1;
    };

    for level_idx in (0..coarse_idx).rev() {
        points = points
            .into_iter()
            .map(|(x, y, s)| (scale_image_coord(x, 2.0), scale_image_coord(y, 2.0), s))
            .collect();

        let level = &levels[level_idx];
        let mut resp = chess_response_u8(&level.data, level.width, level.height, &config.params);
        let level_view = ImageView::new(level.width, level.height, &level.data).expect("pyramid level is contiguous");
        let seed_coords: Vec<(f32, f32)> = points.iter().map(|&(x, y, _)| (x, y)).collect();
        let refined = process_refine(
            &mut resp,
            Some(level_view),
            &config.params,
            ChessParams::MARGIN,
            &seed_coords,
            config.multiscale.refinement_radius as i32,
        );

        points = refined
            .into_iter()
            .zip(points)
            .map(|(refined, (px, py, pstrength))| match refined {
                // a failed refinement keeps the coarser level's position and
                // strength rather than dropping the point entirely
                Some(c) => (c.xy[0], c.xy[1], c.strength),
                None => (px, py, pstrength),
            })
            .collect();
    }

    let corners: Vec<RawCorner> = points.into_iter().map(|(x, y, strength)| RawCorner { xy: [x, y], strength }).collect();
    let merged = merge_duplicates(corners, config.multiscale.merge_radius);
    debug!("{} corners after cross-level merge", merged.len());
    merged
}

/// Drop weaker duplicates produced when two coarse seeds converge to the
/// same fine-level corner during refinement.
fn merge_duplicates(mut corners: Vec<RawCorner>, radius: f32) -> Vec<RawCorner> {
    if radius <= 0.0 || corners.len() < 2 {
        return corners;
    }
    corners.sort_by(|a, b| b.strength.partial_cmp(&a.strength).unwrap_or(std::cmp::Ordering::Equal));

    let r2 = radius * radius;
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
