use std::io;
use thiserror::Error;

use super::icontype::OSType;

/// The result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while decoding, encoding, or assembling images.  Every
/// error is terminal for the operation that raised it.
#[derive(Debug, Error)]
pub enum Error {
    /// The input bytes are not in a form this crate understands.
    #[error("format error: {0}")]
    Format(#[from] FormatError),
    /// The input ended before a complete image could be read.
    #[error("incomplete data: {0}")]
    IncompleteData(String),
    /// An icon set lacks an image with the given square dimensions.
    #[error("missing icon size {0}x{0}")]
    MissingSize(u32),
    /// The DEFLATE stream could not be compressed or decompressed.
    #[error("compression failure: {0}")]
    CompressionFailure(#[source] io::Error),
    /// A pixel buffer was given the wrong number of pixels for its size.
    #[error("expected {expected} pixels, got {actual}")]
    DimensionMismatch {
        /// The number of pixels the dimensions call for.
        expected: usize,
        /// The number of pixels supplied.
        actual: usize,
    },
    /// No icon type has the given image dimensions.
    #[error("no supported icon type has dimensions {width}x{height}")]
    UnsupportedSize {
        /// The image width.
        width: u32,
        /// The image height.
        height: u32,
    },
    /// An ICNS container would not fit its 32-bit length field.
    #[error("icns container too large ({0} bytes)")]
    ContainerTooLarge(u64),
    /// The underlying reader or writer failed.
    #[error(transparent)]
    Io(io::Error),
}

/// The ways in which PNG or ICNS input can be malformed or unsupported.
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum FormatError {
    /// The stream does not start with the PNG signature.
    #[error("not a PNG file (bad signature)")]
    BadSignature,
    /// The image is not 8-bit, non-interlaced RGBA.
    #[error("unsupported PNG format (bit depth {bit_depth}, color type \
             {color_type}, interlace {interlace}); only 8-bit \
             non-interlaced RGBA is supported")]
    UnsupportedFormat {
        /// The IHDR bit depth.
        bit_depth: u8,
        /// The IHDR color type.
        color_type: u8,
        /// The IHDR interlace method.
        interlace: u8,
    },
    /// A scanline uses a filter type outside 0..=4.
    #[error("unsupported filter type {filter_type} on scanline {row}")]
    BadFilter {
        /// The offending filter-type byte.
        filter_type: u8,
        /// The scanline it appeared on.
        row: u32,
    },
    /// A chunk is structurally invalid.
    #[error("malformed chunk: {0}")]
    MalformedChunk(String),
    /// A chunk the image cannot do without is absent (or empty).
    #[error("missing required '{0}' chunk")]
    MissingChunk(&'static str),
    /// A chunk's stored CRC does not match its contents.
    #[error("CRC mismatch in '{chunk}' chunk (stored {expected:08x}, \
             computed {actual:08x})")]
    ChecksumMismatch {
        /// The chunk's type code.
        chunk: String,
        /// The CRC stored in the stream.
        expected: u32,
        /// The CRC computed over the chunk.
        actual: u32,
    },
    /// The image dimensions overflow the addressable buffer size.
    #[error("image dimensions {width}x{height} are too large")]
    DimensionsTooLarge {
        /// The IHDR width.
        width: u32,
        /// The IHDR height.
        height: u32,
    },
    /// An ICNS element's OSType is not one of the supported icon types.
    #[error("unsupported icon type '{0}'")]
    UnsupportedIconType(OSType),
    /// The stream does not start with the ICNS magic literal.
    #[error("not an icns file (wrong magic literal)")]
    NotIcns,
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Error {
        if error.kind() == io::ErrorKind::UnexpectedEof {
            Error::IncompleteData(error.to_string())
        } else {
            Error::Io(error)
        }
    }
}

impl From<Error> for io::Error {
    fn from(error: Error) -> io::Error {
        match error {
            Error::Io(error) => error,
            Error::IncompleteData(_) => {
                io::Error::new(io::ErrorKind::UnexpectedEof, error)
            }
            Error::MissingSize(_) |
            Error::DimensionMismatch { .. } |
            Error::UnsupportedSize { .. } => {
                io::Error::new(io::ErrorKind::InvalidInput, error)
            }
            _ => io::Error::new(io::ErrorKind::InvalidData, error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_eof_becomes_incomplete_data() {
        let error = Error::from(io::Error::from(io::ErrorKind::UnexpectedEof));
        assert!(matches!(error, Error::IncompleteData(_)));
        let error = Error::from(io::Error::from(io::ErrorKind::BrokenPipe));
        assert!(matches!(error, Error::Io(_)));
    }

    #[test]
    fn converts_to_io_error() {
        let error: io::Error = Error::MissingSize(64).into();
        assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(error.to_string(), "missing icon size 64x64");
        let error: io::Error =
            Error::UnsupportedSize { width: 100, height: 90 }.into();
        assert_eq!(error.kind(), io::ErrorKind::InvalidInput);
        assert_eq!(error.to_string(),
                   "no supported icon type has dimensions 100x90");
        let error: io::Error = Error::from(FormatError::BadSignature).into();
        assert_eq!(error.kind(), io::ErrorKind::InvalidData);
    }
}
