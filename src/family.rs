use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};
use log::debug;
use std::io::{Read, Write};

use super::codec::ImageCodec;
use super::element::IconElement;
use super::error::{Error, FormatError, Result};
use super::icontype::IconType;
use super::image::PixelBuffer;

/// The first four bytes of an ICNS file:
const ICNS_MAGIC_LITERAL: &[u8; 4] = b"icns";

/// The length of an icon family header, in bytes:
const ICON_FAMILY_HEADER_LENGTH: u32 = 8;

/// A set of icons stored in a single ICNS file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct IconFamily {
    /// The icon elements stored in the ICNS file.
    pub elements: Vec<IconElement>,
}

impl IconFamily {
    /// Creates a new, empty icon family.
    pub fn new() -> IconFamily {
        IconFamily { elements: Vec::new() }
    }

    /// Builds a complete icon family from a collection of images.  For each
    /// icon type, in container order, the first image whose dimensions match
    /// exactly is encoded with `codec`; images of other sizes are ignored.
    /// Returns [`Error::MissingSize`] if any icon type has no matching image,
    /// before anything is encoded.
    pub fn assemble<C: ImageCodec + ?Sized>(images: &[PixelBuffer],
                                            codec: &C)
                                           -> Result<IconFamily> {
        let mut matched = Vec::with_capacity(IconType::ALL.len());
        for &icon_type in IconType::ALL.iter() {
            let (width, height) = (icon_type.pixel_width(),
                                   icon_type.pixel_height());
            let image = images.iter()
                .find(|image| {
                    image.width() == width && image.height() == height
                })
                .ok_or(Error::MissingSize(width))?;
            matched.push((icon_type, image));
        }
        let family = IconFamily { elements: encode_all(&matched, codec)? };
        let total_length = family.total_length();
        if total_length > u64::from(u32::MAX) {
            return Err(Error::ContainerTooLarge(total_length));
        }
        debug!("assembled {} icon elements ({} bytes)",
               family.elements.len(),
               total_length);
        Ok(family)
    }

    /// Returns true if the icon family contains no icons nor any other
    /// elements.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Encodes the image into the family, automatically choosing an
    /// appropriate icon type based on the dimensions of the image.  Returns
    /// an error if there is no supported icon type matching the image
    /// dimensions.
    pub fn add_icon<C: ImageCodec + ?Sized>(&mut self,
                                            image: &PixelBuffer,
                                            codec: &C)
                                           -> Result<()> {
        match IconType::from_pixel_size(image.width(), image.height()) {
            Some(icon_type) => self.add_icon_with_type(image, icon_type, codec),
            None => {
                Err(Error::UnsupportedSize {
                    width: image.width(),
                    height: image.height(),
                })
            }
        }
    }

    /// Encodes the image into the family using the given icon type.  Returns
    /// an error if the image has the wrong dimensions for the selected type.
    pub fn add_icon_with_type<C: ImageCodec + ?Sized>(&mut self,
                                                      image: &PixelBuffer,
                                                      icon_type: IconType,
                                                      codec: &C)
                                                     -> Result<()> {
        self.elements.push(IconElement::encode_image_with_type(image,
                                                               icon_type,
                                                               codec)?);
        Ok(())
    }

    /// Returns a list of all icon types for which the icon family contains
    /// an element.
    pub fn available_icons(&self) -> Vec<IconType> {
        self.elements.iter().filter_map(IconElement::icon_type).collect()
    }

    /// Determines whether the icon family contains an element with the given
    /// icon type.
    pub fn has_icon_with_type(&self, icon_type: IconType) -> bool {
        self.find_element(icon_type).is_ok()
    }

    /// Decodes an image from the family with the given icon type.  Returns
    /// an error if the element for the selected type is not present in the
    /// icon family, or if the encoded data is malformed.
    pub fn get_icon_with_type<C: ImageCodec + ?Sized>(&self,
                                                      icon_type: IconType,
                                                      codec: &C)
                                                     -> Result<PixelBuffer> {
        self.find_element(icon_type)?.decode_image(codec)
    }

    fn find_element(&self, icon_type: IconType) -> Result<&IconElement> {
        let ostype = icon_type.ostype();
        self.elements.iter().find(|el| el.ostype == ostype).ok_or_else(|| {
            Error::MissingSize(icon_type.pixel_width())
        })
    }

    /// Reads an icon family from an ICNS file.
    pub fn read<R: Read>(mut reader: R) -> Result<IconFamily> {
        let mut magic = [0u8; 4];
        reader.read_exact(&mut magic)?;
        if magic != *ICNS_MAGIC_LITERAL {
            return Err(FormatError::NotIcns.into());
        }
        let file_length = u64::from(reader.read_u32::<BigEndian>()?);
        let mut file_position = u64::from(ICON_FAMILY_HEADER_LENGTH);
        let mut family = IconFamily::new();
        while file_position < file_length {
            let element = IconElement::read(reader.by_ref())?;
            file_position += element.total_length();
            family.elements.push(element);
        }
        Ok(family)
    }

    /// Writes the icon family to an ICNS file.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        let total_length = self.total_length();
        let total_length = u32::try_from(total_length)
            .map_err(|_| Error::ContainerTooLarge(total_length))?;
        writer.write_all(ICNS_MAGIC_LITERAL)?;
        writer.write_u32::<BigEndian>(total_length)?;
        for element in &self.elements {
            element.write(writer.by_ref())?;
        }
        Ok(())
    }

    /// Serializes the icon family into an in-memory ICNS file.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut output = Vec::with_capacity(self.total_length() as usize);
        self.write(&mut output)?;
        Ok(output)
    }

    /// Returns the encoded length of the file, in bytes, including the
    /// length of the header.
    pub fn total_length(&self) -> u64 {
        let mut length = u64::from(ICON_FAMILY_HEADER_LENGTH);
        for element in &self.elements {
            length += element.total_length();
        }
        length
    }
}

/// Encodes one image per required icon size and serializes them into an
/// ICNS file.  See [`IconFamily::assemble`].
pub fn assemble<C: ImageCodec + ?Sized>(images: &[PixelBuffer],
                                        codec: &C)
                                       -> Result<Vec<u8>> {
    IconFamily::assemble(images, codec)?.to_bytes()
}

#[cfg(not(feature = "parallel"))]
fn encode_all<C: ImageCodec + ?Sized>(matched: &[(IconType, &PixelBuffer)],
                                      codec: &C)
                                     -> Result<Vec<IconElement>> {
    matched.iter()
        .map(|&(icon_type, image)| {
            IconElement::encode_image_with_type(image, icon_type, codec)
        })
        .collect()
}

#[cfg(feature = "parallel")]
fn encode_all<C: ImageCodec + ?Sized>(matched: &[(IconType, &PixelBuffer)],
                                      codec: &C)
                                     -> Result<Vec<IconElement>> {
    use rayon::prelude::*;
    matched.par_iter()
        .map(|&(icon_type, image)| {
            IconElement::encode_image_with_type(image, icon_type, codec)
        })
        .collect()
}
