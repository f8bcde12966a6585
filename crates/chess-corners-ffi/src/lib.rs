//! C ABI wrapper over `chess-corners`'s one-call convenience entry point.
//!
//! Every function here is `extern "C"` and panic-free by construction: Rust
//! panics must never cross the FFI boundary, so failures are reported as a
//! negative status code instead of propagated.

use std::slice;

use chess_corners::{find_chess_corners_image, ChessConfig, ChessParams};

/// Status codes returned by every function in this crate.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChessCornersStatus {
    Ok = 0,
    InvalidInput = -1,
    NullPointer = -2,
}

/// A single detected corner, in full-image pixel coordinates.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct ChessCornerC {
    pub x: f32,
    pub y: f32,
    pub orientation: f32,
    pub response: f32,
}

/// Run the coarse-to-fine detector over an 8-bit grayscale `width x height`
/// buffer. On [`ChessCornersStatus::Ok`], `*out_corners` and `*out_len`
/// describe a heap buffer owned by this crate; free it with
/// [`chess_corners_free`]. On any other status, both outputs are left
/// untouched.
///
/// # Safety
///
/// `data` must point to at least `width * height` readable bytes.
/// `out_corners` and `out_len` must point to valid, writable locations.
#[no_mangle]
pub unsafe extern "C" fn chess_corners_detect(
    data: *const u8,
    width: u32,
    height: u32,
    use_legacy_params: bool,
    single_scale: bool,
    out_corners: *mut *mut ChessCornerC,
    out_len: *mut usize,
) -> ChessCornersStatus {
    if data.is_null() || out_corners.is_null() || out_len.is_null() {
        return ChessCornersStatus::NullPointer;
    }

    let len = (width as usize) * (height as usize);
    let raster = slice::from_raw_parts(data, len);
    let Some(image) = image::GrayImage::from_raw(width, height, raster.to_vec()) else {
        return ChessCornersStatus::InvalidInput;
    };

    let mut config = if single_scale {
        ChessConfig::single_scale()
    } else {
        ChessConfig::coarse_to_fine()
    };
    if use_legacy_params {
        config.params = ChessParams::legacy();
    }

    let corners = match find_chess_corners_image(&image, &config) {
        Ok(c) => c,
        Err(_) => return ChessCornersStatus::InvalidInput,
    };

    let mut boxed: Box<[ChessCornerC]> = corners
        .into_iter()
        .map(|c| ChessCornerC {
            x: c.x,
            y: c.y,
            orientation: c.orientation,
            response: c.response,
        })
        .collect();

    *out_len = boxed.len();
    *out_corners = boxed.as_mut_ptr();
    std::mem::forget(boxed);

    ChessCornersStatus::Ok
}

/// Free a buffer returned by [`chess_corners_detect`].
///
/// # Safety
///
/// `ptr`/`len` must be exactly the pair returned by a prior successful call
/// to [`chess_corners_detect`], and must not already have been freed.
#[no_mangle]
pub unsafe extern "C" fn chess_corners_free(ptr: *mut ChessCornerC, len: usize) {
    if ptr.is_null() {
        return;
    }
    drop(Box::from_raw(slice::from_raw_parts_mut(ptr, len)));
}
