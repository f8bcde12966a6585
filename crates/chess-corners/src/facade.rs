//! Public entry points (spec §4.5).

use image::GrayImage;
use log::info;

#[cfg(feature = "tracing")]
use tracing::instrument;

use chess_corners_core::{
    detect::{detect_corners_from_response_with_refiner, detect_corners_multiscale},
    imageview::ImageView,
    pyramid::{build_pyramid, scale_image_coord},
    response::chess_response_u8,
    tracker::process_refine,
    ChessConfig, ChessParams, PyramidParams, Refiner, RefinerKind,
};

use crate::debug::{write_corner_dump, DebugSink};
use crate::descriptor::{estimate_orientation, CornerDescriptor};
use crate::error::{DetectError, Result};

/// Fixed-point multiplier applied to `find`'s full-image-pixel output before
/// handing it to the downstream grid fitter (spec §6, §9 — part of the wire
/// format between the two subsystems, not to be changed independently).
pub const FIND_GRID_SCALE: f64 = 1024.0;

const MAX_LEVEL: i32 = 10;

fn validate_image(image: &GrayImage) -> Result<()> {
    let margin = ChessParams::MARGIN;
    let min_side = (2 * margin + 3) as u32;
    if image.width() < min_side || image.height() < min_side {
        return Err(DetectError::InvalidInput {
            reason: format!(
                "image {}x{} is smaller than the {min_side}x{min_side} minimum for a {margin}px margin",
                image.width(),
                image.height()
            ),
        });
    }
    Ok(())
}

fn validate_level(level: i32) -> Result<()> {
    if level < -1 || level > MAX_LEVEL {
        return Err(DetectError::LevelOutOfRange { level, max: MAX_LEVEL });
    }
    Ok(())
}

/// `chess-corners-core`'s default detection configuration, exposed here so
/// callers that only want the one-call convenience don't need to depend on
/// `chess-corners-core` directly.
pub fn default_chess_config() -> ChessConfig {
    ChessConfig::default()
}

/// Detect corners in `image`, returning scaled-integer full-image
/// coordinates (spec §6's `FIND_GRID_SCALE` wire format) for a downstream
/// grid fitter.
///
/// `level == -1` runs the full auto-level coarse-to-fine protocol
/// (§4.4) and refines every point down to level 0 before scaling. A
/// non-negative `level` instead runs a single detection pass at that one
/// pyramid level with no refinement — the per-level step the auto driver
/// itself would perform one level at a time.
///
/// The returned `bool` is `true` iff at least one corner was found; an
/// empty, successful result (spec §7 `NoDetection`) reports `false` with an
/// empty list rather than an error.
pub fn find(
    image: &GrayImage,
    level: i32,
    mut debug: Option<&mut dyn DebugSink>,
) -> Result<(bool, Vec<(i32, i32)>)> {
    validate_image(image)?;
    validate_level(level)?;

    let w = image.width() as usize;
    let h = image.height() as usize;
    let data = image.as_raw();

    let params = ChessParams::default();
    let full_res_points: Vec<(f32, f32)> = if level == -1 {
        let view = ImageView::new(w, h, data)?;
        let config = ChessConfig::default();
        detect_corners_multiscale(view, &config, &mut Refiner::from_kind(RefinerKind::Centroid))
            .into_iter()
            .map(|c| (c.xy[0], c.xy[1]))
            .collect()
    } else {
        let pyramid_params = PyramidParams {
            num_levels: level as u8 + 1,
            min_size: 1,
        };
        let levels = build_pyramid(data, w, h, &pyramid_params);
        let target = levels.last().expect("build_pyramid always returns level 0");
        if let Some(sink) = debug.as_deref_mut() {
            let level_img = GrayImage::from_raw(target.width as u32, target.height as u32, target.data.clone())
                .expect("pyramid level buffer matches its own dimensions");
            let _ = sink.write_image(&format!("level{level}-input.png"), &level_img);
        }

        let resp = chess_response_u8(&target.data, target.width, target.height, &params);
        let view = ImageView::new(target.width, target.height, &target.data)?;
        let corners =
            detect_corners_from_response_with_refiner(&resp, &params, Some(view), &mut Refiner::from_kind(RefinerKind::Centroid));

        corners
            .into_iter()
            .map(|c| (scale_image_coord(c.xy[0], target.scale), scale_image_coord(c.xy[1], target.scale)))
            .collect()
    };

    if let Some(sink) = debug.as_deref_mut() {
        let dump: Vec<(f64, f64)> = full_res_points.iter().map(|&(x, y)| (x as f64, y as f64)).collect();
        let _ = write_corner_dump(sink, &format!("level{level}-corners.txt"), &dump);
    }

    let scaled: Vec<(i32, i32)> = full_res_points
        .iter()
        .map(|&(x, y)| {
            (
                (x as f64 * FIND_GRID_SCALE).round() as i32,
                (y as f64 * FIND_GRID_SCALE).round() as i32,
            )
        })
        .collect();

    let found = !scaled.is_empty();
    Ok((found, scaled))
}

/// Refine, in place, every descriptor in `points` whose recorded level in
/// `levels` equals `target_level + 1`, dropping it to `target_level` on
/// success. Returns the number of descriptors actually refined; failures
/// leave their point and level untouched (spec invariant 6: level is
/// monotone non-increasing).
pub fn refine(
    image: &GrayImage,
    target_level: i32,
    points: &mut [CornerDescriptor],
    levels: &mut [i8],
    mut debug: Option<&mut dyn DebugSink>,
) -> Result<usize> {
    validate_image(image)?;
    if !(0..=MAX_LEVEL).contains(&target_level) {
        return Err(DetectError::LevelOutOfRange {
            level: target_level,
            max: MAX_LEVEL,
        });
    }
    if points.len() != levels.len() {
        return Err(DetectError::InvalidInput {
            reason: format!("points.len()={} != levels.len()={}", points.len(), levels.len()),
        });
    }

    let w = image.width() as usize;
    let h = image.height() as usize;
    let data = image.as_raw();

    let params = ChessParams::default();
    let pyramid_params = PyramidParams {
        num_levels: target_level as u8 + 1,
        min_size: 1,
    };
    let pyramid_levels = build_pyramid(data, w, h, &pyramid_params);
    let target = pyramid_levels.last().expect("build_pyramid always returns level 0");
    let scale = target.scale;

    if let Some(sink) = debug.as_deref_mut() {
        let level_img = GrayImage::from_raw(target.width as u32, target.height as u32, target.data.clone())
            .expect("pyramid level buffer matches its own dimensions");
        let _ = sink.write_image(&format!("refine{target_level}-input.png"), &level_img);
    }

    let mut resp = chess_response_u8(&target.data, target.width, target.height, &params);
    let target_view = ImageView::new(target.width, target.height, &target.data)?;

    let pending: Vec<usize> = (0..points.len()).filter(|&i| levels[i] as i32 == target_level + 1).collect();
    let seeds: Vec<(f32, f32)> = pending
        .iter()
        .map(|&i| {
            let inv_scale = 1.0 / scale;
            (
                (points[i].x + 0.5) * inv_scale - 0.5,
                (points[i].y + 0.5) * inv_scale - 0.5,
            )
        })
        .collect();

    let refined = process_refine(&mut resp, Some(target_view), &params, ChessParams::MARGIN, &seeds, 1);

    let mut updated = 0usize;
    let mut dump = Vec::new();
    for (slot, &idx) in refined.iter().zip(pending.iter()) {
        if let Some(corner) = slot {
            let x_full = scale_image_coord(corner.xy[0], scale);
            let y_full = scale_image_coord(corner.xy[1], scale);
            let orientation = estimate_orientation(
                &target.data,
                target.width,
                target.height,
                corner.xy[0].round() as i32,
                corner.xy[1].round() as i32,
                params.constancy_window_r(),
            );
            points[idx] = CornerDescriptor {
                x: x_full,
                y: y_full,
                orientation,
                response: corner.strength,
            };
            levels[idx] = target_level as i8;
            updated += 1;
            dump.push((x_full as f64, y_full as f64));
        }
    }

    if let Some(sink) = debug.as_deref_mut() {
        let _ = write_corner_dump(sink, &format!("refine{target_level}-corners.txt"), &dump);
    }

    Ok(updated)
}

/// One-call convenience used throughout the rest of the ecosystem: run the
/// full coarse-to-fine protocol and return descriptors (with orientation)
/// directly, skipping the scaled-integer wire format `find` produces for the
/// external grid fitter.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(image, config), fields(width = image.width(), height = image.height()))
)]
pub fn find_chess_corners_image(image: &GrayImage, config: &ChessConfig) -> Result<Vec<CornerDescriptor>> {
    validate_image(image)?;

    let w = image.width() as usize;
    let h = image.height() as usize;
    let data = image.as_raw();
    let view = ImageView::new(w, h, data)?;

    let mut refiner = Refiner::from_kind(config.params.refiner);
    let corners = detect_corners_multiscale(view, config, &mut refiner);
    info!("found {} chessboard corners in a {w}x{h} image", corners.len());

    Ok(corners
        .into_iter()
        .map(|c| CornerDescriptor {
            x: c.xy[0],
            y: c.xy[1],
            orientation: estimate_orientation(data, w, h, c.xy[0].round() as i32, c.xy[1].round() as i32, config.params.constancy_window_r()),
            response: c.strength,
        })
        .collect())
}
