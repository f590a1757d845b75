use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use log::{debug, trace};
use std::io::{Read, Write};

use super::codec::ImageCodec;
use super::crc::Crc32;
use super::deflate::{self, BEST_COMPRESSION};
use super::error::{Error, FormatError, Result};
use super::filter::{self, FilterType, BYTES_PER_PIXEL};
use super::image::{Pixel, PixelBuffer};

/// The eight bytes every PNG file starts with.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a,
                                    0x0a];

/// The length of the IHDR chunk payload, in bytes:
const IHDR_LENGTH: usize = 13;

/// PNG caps chunk lengths at 2^31 - 1:
const MAX_CHUNK_LENGTH: u32 = 0x7fff_ffff;

const BIT_DEPTH_8: u8 = 8;
const COLOR_TYPE_RGBA: u8 = 6;
const INTERLACE_NONE: u8 = 0;

/// One framed section of a PNG stream.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PngChunk {
    /// The four-letter ASCII chunk type (e.g. `IHDR`).
    pub chunk_type: [u8; 4],
    /// The chunk payload.
    pub data: Vec<u8>,
}

impl PngChunk {
    /// Creates a chunk with the given type and payload.
    pub fn new(chunk_type: [u8; 4], data: Vec<u8>) -> PngChunk {
        PngChunk { chunk_type, data }
    }

    /// Returns the chunk type as a string, for messages.
    pub fn type_name(&self) -> String {
        String::from_utf8_lossy(&self.chunk_type).into_owned()
    }

    /// Computes the CRC over the chunk type and payload (but not the
    /// length field), as stored after the payload.
    pub fn crc(&self) -> u32 {
        let mut hasher = Crc32::new();
        hasher.update(&self.chunk_type);
        hasher.update(&self.data);
        hasher.finish()
    }

    /// Reads one chunk.  The trailing CRC is always consumed; it is only
    /// compared against the contents if `verify_checksum` is set.
    pub fn read<R: Read>(mut reader: R,
                         verify_checksum: bool)
                         -> Result<PngChunk> {
        let length = reader.read_u32::<BigEndian>()?;
        if length > MAX_CHUNK_LENGTH {
            let msg = format!("chunk length {} exceeds 2^31 - 1", length);
            return Err(FormatError::MalformedChunk(msg).into());
        }
        let mut chunk_type = [0u8; 4];
        reader.read_exact(&mut chunk_type)?;
        let mut data = Vec::new();
        reader.by_ref().take(u64::from(length)).read_to_end(&mut data)?;
        let chunk = PngChunk::new(chunk_type, data);
        if chunk.data.len() != length as usize {
            let msg = format!("'{}' chunk truncated ({} of {} bytes)",
                              chunk.type_name(),
                              chunk.data.len(),
                              length);
            return Err(Error::IncompleteData(msg));
        }
        let stored_crc = reader.read_u32::<BigEndian>()?;
        if verify_checksum {
            let actual = chunk.crc();
            if actual != stored_crc {
                return Err(FormatError::ChecksumMismatch {
                        chunk: chunk.type_name(),
                        expected: stored_crc,
                        actual,
                    }
                    .into());
            }
        }
        Ok(chunk)
    }

    /// Writes the chunk as length, type, payload, CRC.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        let length = u32::try_from(self.data.len())
            .ok()
            .filter(|&length| length <= MAX_CHUNK_LENGTH)
            .ok_or_else(|| {
                let msg = format!("'{}' payload of {} bytes is too long",
                                  self.type_name(),
                                  self.data.len());
                FormatError::MalformedChunk(msg)
            })?;
        writer.write_u32::<BigEndian>(length)?;
        writer.write_all(&self.chunk_type)?;
        writer.write_all(&self.data)?;
        writer.write_u32::<BigEndian>(self.crc())?;
        Ok(())
    }
}

/// The fields of an IHDR chunk this codec cares about.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Header {
    width: u32,
    height: u32,
}

impl Header {
    fn parse(data: &[u8]) -> Result<Header> {
        if data.len() != IHDR_LENGTH {
            let msg = format!("IHDR chunk has length {} instead of {}",
                              data.len(),
                              IHDR_LENGTH);
            return Err(FormatError::MalformedChunk(msg).into());
        }
        let mut reader = data;
        let width = reader.read_u32::<BigEndian>()?;
        let height = reader.read_u32::<BigEndian>()?;
        let bit_depth = data[8];
        let color_type = data[9];
        let interlace = data[12];
        debug!("IHDR: {}x{}, bit depth {}, color type {}, interlace {}",
               width,
               height,
               bit_depth,
               color_type,
               interlace);
        if bit_depth != BIT_DEPTH_8 || color_type != COLOR_TYPE_RGBA ||
           interlace != INTERLACE_NONE {
            return Err(FormatError::UnsupportedFormat {
                    bit_depth,
                    color_type,
                    interlace,
                }
                .into());
        }
        Ok(Header { width, height })
    }

    fn to_bytes(self) -> Vec<u8> {
        let mut data = Vec::with_capacity(IHDR_LENGTH);
        data.extend_from_slice(&self.width.to_be_bytes());
        data.extend_from_slice(&self.height.to_be_bytes());
        // Bit depth, color type, compression, filter method, interlace.
        data.extend_from_slice(&[BIT_DEPTH_8, COLOR_TYPE_RGBA, 0, 0,
                                 INTERLACE_NONE]);
        data
    }

    /// Returns the length of one scanline including its filter-type byte.
    fn stride(self) -> Result<usize> {
        (self.width as usize)
            .checked_mul(BYTES_PER_PIXEL)
            .and_then(|row| row.checked_add(1))
            .ok_or_else(|| self.too_large())
    }

    fn too_large(self) -> Error {
        FormatError::DimensionsTooLarge {
                width: self.width,
                height: self.height,
            }
            .into()
    }
}

/// Decodes and encodes 8-bit non-interlaced RGBA PNG images.
///
/// Only the IHDR, IDAT and IEND chunks are interpreted; any other chunk is
/// skipped.  Chunk CRCs are not checked unless
/// [`with_checksum_verification`](#method.with_checksum_verification) is
/// turned on.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct PngCodec {
    compression_level: u32,
    verify_checksums: bool,
}

impl PngCodec {
    /// Creates a codec that compresses at the highest level and does not
    /// verify chunk CRCs on read.
    pub fn new() -> PngCodec {
        PngCodec {
            compression_level: BEST_COMPRESSION,
            verify_checksums: false,
        }
    }

    /// Sets the zlib compression level used when encoding (0-9; higher
    /// values are clamped to 9).
    pub fn with_compression_level(mut self, level: u32) -> PngCodec {
        self.compression_level = level.min(BEST_COMPRESSION);
        self
    }

    /// Sets whether decoding rejects chunks whose stored CRC doesn't match.
    pub fn with_checksum_verification(mut self, verify: bool) -> PngCodec {
        self.verify_checksums = verify;
        self
    }

    /// Returns the zlib compression level used when encoding.
    pub fn compression_level(&self) -> u32 {
        self.compression_level
    }

    /// Returns true if decoding verifies chunk CRCs.
    pub fn verifies_checksums(&self) -> bool {
        self.verify_checksums
    }

    /// Reads an image from a PNG stream.  Anything after the IEND chunk is
    /// left unread.
    pub fn read_png<R: Read>(&self, mut reader: R) -> Result<PixelBuffer> {
        let mut signature = [0u8; 8];
        if reader.read_exact(&mut signature).is_err() ||
           signature != PNG_SIGNATURE {
            return Err(FormatError::BadSignature.into());
        }

        let mut header: Option<Header> = None;
        let mut compressed = Vec::new();
        loop {
            let chunk = PngChunk::read(reader.by_ref(),
                                       self.verify_checksums)?;
            trace!("read '{}' chunk ({} bytes)",
                   chunk.type_name(),
                   chunk.data.len());
            match &chunk.chunk_type {
                b"IHDR" => header = Some(Header::parse(&chunk.data)?),
                b"IDAT" => compressed.extend_from_slice(&chunk.data),
                b"IEND" => break,
                _ => {}
            }
        }
        let header = header.ok_or(FormatError::MissingChunk("IHDR"))?;
        if compressed.is_empty() {
            return Err(FormatError::MissingChunk("IDAT").into());
        }

        let stride = header.stride()?;
        let expected = stride.checked_mul(header.height as usize)
            .ok_or_else(|| header.too_large())?;
        // Scanline data past the expected size is never used.
        let raw = deflate::inflate_limited(&compressed, expected)?;
        debug!("inflated {} bytes of image data into {} (expected {})",
               compressed.len(),
               raw.len(),
               expected);
        if raw.len() < expected {
            let msg = format!("image data inflates to {} bytes; expected {}",
                              raw.len(),
                              expected);
            return Err(Error::IncompleteData(msg));
        }

        let pixels = unfilter_image(&raw[..expected], header)?;
        PixelBuffer::from_pixels(header.width, header.height, pixels)
    }

    /// Writes an image as a PNG stream.  The whole stream is built in memory
    /// first, so nothing is written if encoding fails.
    pub fn write_png<W: Write>(&self,
                               image: &PixelBuffer,
                               mut writer: W)
                               -> Result<()> {
        let data = self.encode_png(image)?;
        writer.write_all(&data)?;
        Ok(())
    }

    fn encode_png(&self, image: &PixelBuffer) -> Result<Vec<u8>> {
        let header = Header {
            width: image.width(),
            height: image.height(),
        };
        let stride = header.stride()?;
        let mut raw = Vec::with_capacity(stride * header.height as usize);
        for y in 0..header.height {
            raw.push(FilterType::None.to_byte());
            for px in image.row(y) {
                raw.extend_from_slice(&[px.r, px.g, px.b, px.a]);
            }
        }
        let compressed = deflate::deflate(&raw, self.compression_level)?;
        debug!("encoding {}x{} PNG: {} bytes of scanlines deflated to {}",
               header.width,
               header.height,
               raw.len(),
               compressed.len());

        let mut output = Vec::with_capacity(compressed.len() + 57);
        output.extend_from_slice(&PNG_SIGNATURE);
        PngChunk::new(*b"IHDR", header.to_bytes()).write(&mut output)?;
        PngChunk::new(*b"IDAT", compressed).write(&mut output)?;
        PngChunk::new(*b"IEND", Vec::new()).write(&mut output)?;
        Ok(output)
    }
}

impl Default for PngCodec {
    fn default() -> PngCodec {
        PngCodec::new()
    }
}

impl ImageCodec for PngCodec {
    fn decode(&self, data: &[u8]) -> Result<PixelBuffer> {
        self.read_png(data)
    }

    fn encode(&self, image: &PixelBuffer) -> Result<Vec<u8>> {
        self.encode_png(image)
    }
}

/// Reverses the per-scanline filters over the decompressed image data,
/// which must be exactly `height` scanlines long.
fn unfilter_image(raw: &[u8], header: Header) -> Result<Vec<Pixel>> {
    let row_len = (header.width as usize) * BYTES_PER_PIXEL;
    let num_pixels = (header.width as usize) * (header.height as usize);
    let mut pixels = Vec::with_capacity(num_pixels);
    let mut prev = vec![0u8; row_len];
    let mut line = vec![0u8; row_len];
    for (row, scanline) in raw.chunks_exact(row_len + 1).enumerate() {
        let filter = FilterType::from_byte(scanline[0]).ok_or_else(|| {
            FormatError::BadFilter {
                filter_type: scanline[0],
                row: row as u32,
            }
        })?;
        line.copy_from_slice(&scanline[1..]);
        filter::unfilter_scanline(filter, &mut line, &prev);
        pixels.extend(line.chunks_exact(BYTES_PER_PIXEL)
            .map(|px| Pixel::new(px[0], px[1], px[2], px[3])));
        std::mem::swap(&mut prev, &mut line);
    }
    Ok(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::codec::ImageCodec;
    use super::super::deflate;
    use super::super::error::{Error, FormatError};
    use super::super::filter::{self, FilterType};
    use super::super::image::{Pixel, PixelBuffer};

    fn gradient(width: u32, height: u32) -> PixelBuffer {
        let mut pixels = Vec::new();
        for y in 0..height {
            for x in 0..width {
                pixels.push(Pixel::new((x * 17) as u8,
                                       (y * 31) as u8,
                                       (x ^ y) as u8,
                                       (255 - x * 3) as u8));
            }
        }
        PixelBuffer::from_pixels(width, height, pixels).unwrap()
    }

    fn ihdr(width: u32, height: u32, depth: u8, color: u8, lace: u8)
            -> PngChunk {
        let mut data = Vec::new();
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&[depth, color, 0, 0, lace]);
        PngChunk::new(*b"IHDR", data)
    }

    fn build_png(chunks: &[PngChunk]) -> Vec<u8> {
        let mut data = PNG_SIGNATURE.to_vec();
        for chunk in chunks {
            chunk.write(&mut data).unwrap();
        }
        data
    }

    /// Filters every scanline of `image` with the given per-row filters.
    fn filtered_idat(image: &PixelBuffer, filters: &[FilterType]) -> Vec<u8> {
        let row_len = image.width() as usize * 4;
        let rgba = image.to_rgba_bytes();
        let zeros = vec![0u8; row_len];
        let mut raw = Vec::new();
        for y in 0..image.height() as usize {
            let line = &rgba[y * row_len..(y + 1) * row_len];
            let prev = if y == 0 {
                &zeros[..]
            } else {
                &rgba[(y - 1) * row_len..y * row_len]
            };
            let filter = filters[y % filters.len()];
            let mut out = vec![0u8; row_len];
            filter::filter_scanline(filter, line, prev, &mut out);
            raw.push(filter.to_byte());
            raw.extend_from_slice(&out);
        }
        deflate::deflate(&raw, 6).unwrap()
    }

    #[test]
    fn encode_layout() {
        let image = PixelBuffer::filled(2, 3, Pixel::WHITE);
        let data = PngCodec::new().encode(&image).unwrap();
        assert_eq!(&data[..8], &PNG_SIGNATURE);
        assert_eq!(&data[8..16], b"\0\0\0\x0dIHDR");
        assert_eq!(&data[16..29],
                   &[0, 0, 0, 2, 0, 0, 0, 3, 8, 6, 0, 0, 0]);
        assert_eq!(&data[data.len() - 12..],
                   b"\0\0\0\0IEND\xae\x42\x60\x82");
    }

    #[test]
    fn encoded_chunk_crcs_are_valid() {
        let data = PngCodec::new().encode(&gradient(5, 4)).unwrap();
        let strict = PngCodec::new().with_checksum_verification(true);
        assert_eq!(strict.decode(&data).unwrap(), gradient(5, 4));
    }

    #[test]
    fn round_trip() {
        for &(width, height) in &[(1, 1), (7, 3), (16, 16), (0, 0), (3, 0)] {
            let image = gradient(width, height);
            let codec = PngCodec::new();
            let data = codec.encode(&image).unwrap();
            assert_eq!(codec.decode(&data).unwrap(), image);
        }
    }

    #[test]
    fn round_trip_at_every_compression_level() {
        let image = gradient(9, 9);
        for level in 0..10 {
            let codec = PngCodec::new().with_compression_level(level);
            let data = codec.encode(&image).unwrap();
            assert_eq!(codec.decode(&data).unwrap(), image);
        }
    }

    #[test]
    fn decode_all_filter_types() {
        let image = gradient(6, 10);
        let idat = filtered_idat(&image, &FilterType::ALL);
        let data = build_png(&[ihdr(6, 10, 8, 6, 0),
                               PngChunk::new(*b"IDAT", idat),
                               PngChunk::new(*b"IEND", vec![])]);
        assert_eq!(PngCodec::new().decode(&data).unwrap(), image);
    }

    #[test]
    fn decode_split_idat_and_ancillary_chunks() {
        let image = gradient(4, 4);
        let idat = filtered_idat(&image, &[FilterType::Paeth]);
        let (first, second) = idat.split_at(idat.len() / 2);
        let mut data = build_png(&[ihdr(4, 4, 8, 6, 0),
                                   PngChunk::new(*b"tEXt", b"k\0v".to_vec()),
                                   PngChunk::new(*b"IDAT", first.to_vec()),
                                   PngChunk::new(*b"gAMA", vec![0; 4]),
                                   PngChunk::new(*b"IDAT", second.to_vec()),
                                   PngChunk::new(*b"IEND", vec![])]);
        data.extend_from_slice(b"trailing garbage");
        assert_eq!(PngCodec::new().decode(&data).unwrap(), image);
    }

    #[test]
    fn bad_signature() {
        let codec = PngCodec::new();
        let mut data = codec.encode(&gradient(2, 2)).unwrap();
        data[1] = b'Q';
        match codec.decode(&data) {
            Err(Error::Format(FormatError::BadSignature)) => {}
            other => panic!("unexpected result: {:?}", other),
        }
        assert!(matches!(codec.decode(b"\x89PN"),
                         Err(Error::Format(FormatError::BadSignature))));
    }

    #[test]
    fn grayscale_is_unsupported() {
        let data = build_png(&[ihdr(2, 2, 8, 0, 0),
                               PngChunk::new(*b"IDAT", vec![0x78, 0x01]),
                               PngChunk::new(*b"IEND", vec![])]);
        match PngCodec::new().decode(&data) {
            Err(Error::Format(FormatError::UnsupportedFormat {
                bit_depth: 8,
                color_type: 0,
                interlace: 0,
            })) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn sixteen_bit_and_interlaced_are_unsupported() {
        for header in [ihdr(2, 2, 16, 6, 0), ihdr(2, 2, 8, 6, 1)] {
            let data = build_png(&[header]);
            assert!(matches!(
                PngCodec::new().decode(&data),
                Err(Error::Format(FormatError::UnsupportedFormat { .. }))
            ));
        }
    }

    #[test]
    fn bad_ihdr_length() {
        let data = build_png(&[PngChunk::new(*b"IHDR", vec![0; 12])]);
        assert!(matches!(PngCodec::new().decode(&data),
                         Err(Error::Format(FormatError::MalformedChunk(_)))));
    }

    #[test]
    fn bad_filter_type() {
        let raw = vec![0, 1, 2, 3, 4, 7, 1, 2, 3, 4];
        let data = build_png(&[ihdr(1, 2, 8, 6, 0),
                               PngChunk::new(*b"IDAT",
                                             deflate::deflate(&raw, 9)
                                                 .unwrap()),
                               PngChunk::new(*b"IEND", vec![])]);
        match PngCodec::new().decode(&data) {
            Err(Error::Format(FormatError::BadFilter {
                filter_type: 7,
                row: 1,
            })) => {}
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn missing_chunks() {
        let data = build_png(&[PngChunk::new(*b"IEND", vec![])]);
        assert!(matches!(PngCodec::new().decode(&data),
                         Err(Error::Format(FormatError::MissingChunk("IHDR")))));
        let data = build_png(&[ihdr(1, 1, 8, 6, 0),
                               PngChunk::new(*b"IEND", vec![])]);
        assert!(matches!(PngCodec::new().decode(&data),
                         Err(Error::Format(FormatError::MissingChunk("IDAT")))));
    }

    #[test]
    fn short_image_data() {
        let raw = vec![0, 1, 2, 3, 4];
        let data = build_png(&[ihdr(1, 2, 8, 6, 0),
                               PngChunk::new(*b"IDAT",
                                             deflate::deflate(&raw, 9)
                                                 .unwrap()),
                               PngChunk::new(*b"IEND", vec![])]);
        assert!(matches!(PngCodec::new().decode(&data),
                         Err(Error::IncompleteData(_))));
    }

    #[test]
    fn huge_dimensions_with_tiny_image_data() {
        let raw = vec![0, 1, 2, 3, 4];
        let data = build_png(&[ihdr(0x3fff_ffff, 0x3fff_ffff, 8, 6, 0),
                               PngChunk::new(*b"IDAT",
                                             deflate::deflate(&raw, 9)
                                                 .unwrap()),
                               PngChunk::new(*b"IEND", vec![])]);
        assert!(matches!(PngCodec::new().decode(&data),
                         Err(Error::IncompleteData(_))));
    }

    #[test]
    fn extra_image_data_is_ignored() {
        let mut raw = vec![0, 10, 20, 30, 40];
        raw.extend(std::iter::repeat(0xee).take(100_000));
        let data = build_png(&[ihdr(1, 1, 8, 6, 0),
                               PngChunk::new(*b"IDAT",
                                             deflate::deflate(&raw, 9)
                                                 .unwrap()),
                               PngChunk::new(*b"IEND", vec![])]);
        let image = PngCodec::new().decode(&data).unwrap();
        assert_eq!(image.pixels(), &[Pixel::new(10, 20, 30, 40)]);
    }

    #[test]
    fn truncated_stream() {
        let data = PngCodec::new().encode(&gradient(3, 3)).unwrap();
        // Cut inside the IEND chunk, and right after the IDAT chunk.
        for cut in [data.len() - 3, data.len() - 12] {
            assert!(matches!(PngCodec::new().decode(&data[..cut]),
                             Err(Error::IncompleteData(_))));
        }
    }

    #[test]
    fn checksum_verification_is_opt_in() {
        let image = gradient(3, 2);
        let mut data = PngCodec::new().encode(&image).unwrap();
        // Corrupt the stored CRC of the IHDR chunk.
        data[29] ^= 0xff;
        assert_eq!(PngCodec::new().decode(&data).unwrap(), image);
        let strict = PngCodec::new().with_checksum_verification(true);
        match strict.decode(&data) {
            Err(Error::Format(FormatError::ChecksumMismatch { chunk, .. })) => {
                assert_eq!(chunk, "IHDR");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn chunk_read_write() {
        let chunk = PngChunk::new(*b"abCD", b"payload".to_vec());
        let mut data = Vec::new();
        chunk.write(&mut data).unwrap();
        assert_eq!(data.len(), 4 + 4 + 7 + 4);
        assert_eq!(&data[..8], b"\0\0\0\x07abCD");
        let read = PngChunk::read(&data[..], true).unwrap();
        assert_eq!(read, chunk);
        assert_eq!(read.type_name(), "abCD");
    }
}
