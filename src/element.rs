use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use std::io::{Read, Write};

use super::codec::ImageCodec;
use super::error::{Error, FormatError, Result};
use super::icontype::{IconType, OSType};
use super::image::PixelBuffer;

/// The length of an icon element header, in bytes:
pub const ICON_ELEMENT_HEADER_LENGTH: u32 = 8;

/// One entry in an ICNS file: an OSType identifying the icon type, and the
/// encoded (PNG) image data for that type.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct IconElement {
    /// The OSType for this element (e.g. `ic07` or `icp4`).
    pub ostype: OSType,
    /// The raw data payload for this element.
    pub data: Vec<u8>,
}

impl IconElement {
    /// Creates an icon element with the given OSType and data payload.
    pub fn new(ostype: OSType, data: Vec<u8>) -> IconElement {
        IconElement { ostype, data }
    }

    /// Encodes the image into an element of the given icon type.  Returns an
    /// error if the image has the wrong dimensions for the type, or if
    /// encoding fails.
    pub fn encode_image_with_type<C: ImageCodec + ?Sized>(image: &PixelBuffer,
                                                          icon_type: IconType,
                                                          codec: &C)
                                                         -> Result<IconElement> {
        let width = icon_type.pixel_width();
        let height = icon_type.pixel_height();
        if image.width() != width || image.height() != height {
            return Err(Error::DimensionMismatch {
                expected: (width as usize) * (height as usize),
                actual: image.pixels().len(),
            });
        }
        let data = codec.encode(image)?;
        Ok(IconElement::new(icon_type.ostype(), data))
    }

    /// Decodes the icon element into an image.  Returns an error if this
    /// element does not represent an icon type supported by this library, or
    /// if the data is malformed.
    pub fn decode_image<C: ImageCodec + ?Sized>(&self,
                                                codec: &C)
                                               -> Result<PixelBuffer> {
        let icon_type = self.icon_type()
            .ok_or(FormatError::UnsupportedIconType(self.ostype))?;
        let image = codec.decode(&self.data)?;
        let width = icon_type.pixel_width();
        let height = icon_type.pixel_height();
        if image.width() != width || image.height() != height {
            let msg = format!("decoded PNG has wrong dimensions ({}x{} \
                               instead of {}x{})",
                              image.width(),
                              image.height(),
                              width,
                              height);
            return Err(FormatError::MalformedChunk(msg).into());
        }
        Ok(image)
    }

    /// Returns the type of icon encoded by this element, or `None` if this
    /// element does not encode a supported icon type.
    pub fn icon_type(&self) -> Option<IconType> {
        IconType::from_ostype(self.ostype)
    }

    /// Returns the encoded length of the element, in bytes, including the
    /// length of the header.
    pub fn total_length(&self) -> u64 {
        u64::from(ICON_ELEMENT_HEADER_LENGTH) + (self.data.len() as u64)
    }

    /// Reads an icon element from within an ICNS file.
    pub fn read<R: Read>(mut reader: R) -> Result<IconElement> {
        let mut raw_ostype = [0u8; 4];
        reader.read_exact(&mut raw_ostype)?;
        let element_length = reader.read_u32::<BigEndian>()?;
        if element_length < ICON_ELEMENT_HEADER_LENGTH {
            let msg = format!("invalid element length {} for '{}'",
                              element_length,
                              OSType(raw_ostype));
            return Err(FormatError::MalformedChunk(msg).into());
        }
        let data_length = element_length - ICON_ELEMENT_HEADER_LENGTH;
        let mut data = Vec::new();
        reader.by_ref().take(u64::from(data_length)).read_to_end(&mut data)?;
        if data.len() != data_length as usize {
            let msg = format!("'{}' element truncated ({} of {} bytes)",
                              OSType(raw_ostype),
                              data.len(),
                              data_length);
            return Err(Error::IncompleteData(msg));
        }
        Ok(IconElement::new(OSType(raw_ostype), data))
    }

    /// Writes the icon element to within an ICNS file.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        let total_length = u32::try_from(self.total_length())
            .map_err(|_| Error::ContainerTooLarge(self.total_length()))?;
        let OSType(ref raw_ostype) = self.ostype;
        writer.write_all(raw_ostype)?;
        writer.write_u32::<BigEndian>(total_length)?;
        writer.write_all(&self.data)?;
        Ok(())
    }
}
