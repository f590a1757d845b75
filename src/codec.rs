use super::error::Result;
use super::image::PixelBuffer;

/// Something that can turn encoded image bytes into pixels and back.
///
/// [`PngCodec`](struct.PngCodec.html) is the portable implementation; a
/// platform integration may supply another (for instance one backed by a
/// system graphics API) and hand it to the ICNS assembler instead.
pub trait ImageCodec: Send + Sync {
    /// Decodes an encoded image into pixels.
    fn decode(&self, data: &[u8]) -> Result<PixelBuffer>;

    /// Encodes pixels into an image file.
    fn encode(&self, image: &PixelBuffer) -> Result<Vec<u8>>;
}
