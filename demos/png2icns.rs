//! Creates an ICNS file containing all seven icon sizes, resampled from a
//! single PNG file.
//!
//! To create an ICNS file from a PNG, run:
//!
//! ```shell
//! cargo run --example png2icns <path/to/file.png> [<path/to/output.icns>]
//! # ICNS will be saved to path/to/file.icns unless an output is given
//! ```
//!
//! The input must be an 8-bit RGBA PNG; it can have any dimensions.  Set
//! `RUST_LOG=debug` to see what the pipeline is doing.

extern crate env_logger;
extern crate log;
extern crate pngtoicns;

use pngtoicns::PngCodec;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

fn main() {
    env_logger::init();
    let num_args = env::args().count();
    if num_args < 2 || num_args > 3 {
        println!("Usage: png2icns <path> [<output>]");
        process::exit(1);
    }
    let png_path = PathBuf::from(env::args().nth(1).unwrap());
    let icns_path = match env::args().nth(2) {
        Some(path) => PathBuf::from(path),
        None => png_path.with_extension("icns"),
    };
    if let Err(error) = convert(&png_path, &icns_path) {
        eprintln!("Error: {}", error);
        process::exit(1);
    }
    log::info!("Created ICNS file: {}", icns_path.display());
    println!("ICNS file created successfully: {}", icns_path.display());
}

fn convert(png_path: &Path, icns_path: &Path) -> io::Result<()> {
    let png_data = fs::read(png_path)?;
    let icns_data = pngtoicns::png_to_icns(&png_data, &PngCodec::new())?;
    write_atomically(icns_path, &icns_data)
}

/// Writes next to the destination and renames, so a failure never leaves a
/// truncated container (or a stray temporary file) behind.
fn write_atomically(path: &Path, data: &[u8]) -> io::Result<()> {
    let tmp_path = path.with_extension("icns.tmp");
    let result = fs::write(&tmp_path, data)
        .and_then(|()| fs::rename(&tmp_path, path));
    if result.is_err() {
        let _ = fs::remove_file(&tmp_path);
    }
    result
}
