extern crate pngtoicns;

use pngtoicns::IconFamily;
use std::env;
use std::fs::File;
use std::io::BufReader;

fn main() {
    if env::args().count() != 2 {
        println!("Usage: readicns <path>");
        return;
    }
    let path = env::args().nth(1).unwrap();
    let file = File::open(path).expect("failed to open file");
    let buffered = BufReader::new(file);
    let family = IconFamily::read(buffered).expect("failed to read ICNS file");
    println!("ICNS file contains {} element(s).", family.elements.len());
    for (index, element) in family.elements.iter().enumerate() {
        let size = match element.icon_type() {
            Some(icon_type) => {
                format!("{0}x{0}", icon_type.pixel_width())
            }
            None => "unknown type".to_string(),
        };
        println!("Element {}: {} ({}, {} byte payload)",
                 index,
                 element.ostype,
                 size,
                 element.data.len());
    }
}
