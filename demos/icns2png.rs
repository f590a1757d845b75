//! Extracts one icon from an ICNS file as a PNG.
//!
//! ```shell
//! cargo run --example icns2png <path/to/file.icns> <ostype>
//! # PNG will be saved to path/to/file.<ostype>.png
//! ```

extern crate pngtoicns;

use pngtoicns::{IconFamily, OSType, PngCodec};
use std::env;
use std::fs::{self, File};
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

fn main() {
    if env::args().count() != 3 {
        println!("Usage: icns2png <path> <ostype>");
        return;
    }
    let icns_path = env::args().nth(1).unwrap();
    let icns_path = Path::new(&icns_path);
    let ostype = OSType::from_str(&env::args().nth(2).unwrap()).unwrap();
    let icns_file = BufReader::new(File::open(icns_path)
        .expect("failed to open ICNS file"));
    let family = IconFamily::read(icns_file)
        .expect("failed to read ICNS file");
    let element = family.elements
        .iter()
        .find(|el| el.ostype == ostype)
        .expect("no element with that OSType found");
    // Decode first so that only well-formed icons are written out.
    element.decode_image(&PngCodec::new()).expect("failed to decode image");
    let png_path = icns_path.with_extension(format!("{}.png", ostype));
    fs::write(png_path, &element.data).expect("failed to write PNG file");
}
