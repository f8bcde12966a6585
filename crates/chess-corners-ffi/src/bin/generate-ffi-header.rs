//! Generates `chess_corners.h` from the `#[repr(C)]` surface in `src/lib.rs`.
//!
//! Run with `cargo run -p chess-corners-ffi --features generate-header --bin generate-ffi-header -- <out-dir>`.

use std::env;
use std::path::PathBuf;

fn main() {
    let crate_dir = env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR is set by cargo");
    let out_dir: PathBuf = env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from(&crate_dir));

    cbindgen::Builder::new()
        .with_crate(&crate_dir)
        .with_language(cbindgen::Language::C)
        .generate()
        .expect("failed to generate FFI header")
        .write_to_file(out_dir.join("chess_corners.h"));
}
