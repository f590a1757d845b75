//! Library for turning a single image into a multi-resolution Apple Icon
//! Image (.icns) file.
//!
//! The pipeline decodes an 8-bit RGBA PNG, resamples it to each of the seven
//! icon sizes (16 through 1024 pixels square), re-encodes each resampled
//! image as PNG, and packages the results into an ICNS container:
//!
//! ```
//! use pngtoicns::{Pixel, PixelBuffer, PngCodec};
//!
//! let source = PixelBuffer::filled(100, 100, Pixel::new(255, 0, 0, 255));
//! let icns = pngtoicns::build_icns(&source, &PngCodec::new()).unwrap();
//! assert_eq!(&icns[..4], b"icns");
//! ```
//!
//! See https://en.wikipedia.org/wiki/Apple_Icon_Image_format for more
//! information about the file format.

#![warn(missing_docs)]

pub mod crc;
pub mod deflate;
pub mod filter;

mod codec;
mod element;
mod error;
mod family;
mod icontype;
mod image;
mod png;
mod resize;

pub use codec::ImageCodec;
pub use element::IconElement;
pub use error::{Error, FormatError, Result};
pub use family::{assemble, IconFamily};
pub use icontype::{IconType, OSType};
pub use image::{Pixel, PixelBuffer};
pub use png::{PngChunk, PngCodec, PNG_SIGNATURE};
pub use resize::resize;

use log::debug;

/// The square pixel sizes of the images in a complete icon set.
pub const ICON_SIZES: [u32; 7] = [16, 32, 64, 128, 256, 512, 1024];

/// Resamples `source` to every size in [`ICON_SIZES`], in that order.
pub fn generate_icon_set(source: &PixelBuffer) -> Vec<PixelBuffer> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        ICON_SIZES.par_iter().map(|&size| resize(source, size, size)).collect()
    }
    #[cfg(not(feature = "parallel"))]
    {
        ICON_SIZES.iter().map(|&size| resize(source, size, size)).collect()
    }
}

/// Resamples `source` to every icon size and assembles the results into an
/// ICNS file, encoding each size with `codec`.
pub fn build_icns<C: ImageCodec + ?Sized>(source: &PixelBuffer,
                                          codec: &C)
                                         -> Result<Vec<u8>> {
    debug!("building icon set from {}x{} source",
           source.width(),
           source.height());
    let icons = generate_icon_set(source);
    assemble(&icons, codec)
}

/// Converts PNG file data into ICNS file data, using `codec` both to decode
/// the source and to encode each icon size.
pub fn png_to_icns<C: ImageCodec + ?Sized>(png_data: &[u8],
                                           codec: &C)
                                          -> Result<Vec<u8>> {
    let source = codec.decode(png_data)?;
    build_icns(&source, codec)
}
