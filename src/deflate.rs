//! Thin adapter over `flate2`'s zlib streams, which is how PNG wraps its
//! DEFLATE-compressed image data.

use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::{Read, Write};

use super::error::{Error, Result};

/// The highest zlib compression level.
pub const BEST_COMPRESSION: u32 = 9;

/// Compresses `bytes` into a zlib stream at the given level (0-9, clamped).
pub fn deflate(bytes: &[u8], level: u32) -> Result<Vec<u8>> {
    let level = Compression::new(level.min(BEST_COMPRESSION));
    let mut encoder = ZlibEncoder::new(Vec::new(), level);
    encoder.write_all(bytes).map_err(Error::CompressionFailure)?;
    encoder.finish().map_err(Error::CompressionFailure)
}

/// Size hints usually come from untrusted headers, so at most this many
/// bytes are reserved before any data has been decompressed:
const MAX_PREALLOCATION: usize = 1 << 24;

/// Decompresses a zlib stream.  `expected_size_hint` only pre-sizes the
/// output buffer (up to a fixed ceiling); the result may be longer or
/// shorter.  Bytes following the end of the zlib stream are ignored.
pub fn inflate(bytes: &[u8], expected_size_hint: usize) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(bytes);
    let mut output =
        Vec::with_capacity(expected_size_hint.min(MAX_PREALLOCATION));
    decoder.read_to_end(&mut output).map_err(Error::CompressionFailure)?;
    Ok(output)
}

/// Decompresses at most `limit` bytes from the start of a zlib stream.  The
/// rest of the stream is never decompressed, so it is neither stored nor
/// validated.
pub fn inflate_limited(bytes: &[u8], limit: usize) -> Result<Vec<u8>> {
    let decoder = ZlibDecoder::new(bytes);
    let mut output = Vec::with_capacity(limit.min(MAX_PREALLOCATION));
    decoder.take(limit as u64)
        .read_to_end(&mut output)
        .map_err(Error::CompressionFailure)?;
    Ok(output)
}
