//! Timing over the response operator and the full find/refine pipeline on a
//! synthetic grid, mirroring `calib-targets-chessboard`'s
//! `chessboard_timing`/`dataset_corners` benches.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use image::GrayImage;

use chess_corners::{find_chess_corners_image, ChessConfig};
use chess_corners_core::response::chess_response_u8;
use chess_corners_core::ChessParams;

fn synthetic_grid(size: u32, square: u32) -> GrayImage {
    GrayImage::from_fn(size, size, |x, y| {
        let bright = ((x / square) + (y / square)) % 2 == 0;
        image::Luma([if bright { 230u8 } else { 25u8 }])
    })
}

fn bench_response(c: &mut Criterion) {
    let img = synthetic_grid(640, 40);
    let (w, h) = (img.width() as usize, img.height() as usize);
    let data = img.as_raw();
    let params = ChessParams::default();

    c.bench_function("chess_response_u8 640x640", |b| {
        b.iter(|| chess_response_u8(black_box(data), w, h, black_box(&params)))
    });
}

fn bench_find_chess_corners_image(c: &mut Criterion) {
    let img = synthetic_grid(640, 40);
    let config = ChessConfig::coarse_to_fine();

    c.bench_function("find_chess_corners_image 640x640 coarse_to_fine", |b| {
        b.iter(|| find_chess_corners_image(black_box(&img), black_box(&config)).unwrap())
    });
}

criterion_group!(benches, bench_response, bench_find_chess_corners_image);
criterion_main!(benches);
