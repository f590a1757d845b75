use super::error::{Error, Result};

/// A single 8-bit-per-channel RGBA pixel.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq)]
pub struct Pixel {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel; 0 is fully transparent.
    pub a: u8,
}

impl Pixel {
    /// Fully transparent black.
    pub const TRANSPARENT: Pixel = Pixel::new(0, 0, 0, 0);

    /// Opaque white.
    pub const WHITE: Pixel = Pixel::new(255, 255, 255, 255);

    /// Creates a pixel from its four channel values.
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Pixel {
        Pixel { r, g, b, a }
    }

    /// Returns true if the pixel is fully transparent.
    pub fn is_transparent(self) -> bool {
        self.a == 0
    }
}

/// A decoded RGBA image.  The number of pixels always equals
/// `width * height`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Box<[Pixel]>,
}

impl PixelBuffer {
    /// Creates a new image with all pixels fully transparent.
    pub fn new(width: u32, height: u32) -> PixelBuffer {
        PixelBuffer::filled(width, height, Pixel::TRANSPARENT)
    }

    /// Creates a new image with every pixel set to `pixel`.
    pub fn filled(width: u32, height: u32, pixel: Pixel) -> PixelBuffer {
        let num_pixels = (width as usize) * (height as usize);
        PixelBuffer {
            width,
            height,
            pixels: vec![pixel; num_pixels].into_boxed_slice(),
        }
    }

    /// Creates an image from row-major pixels.  Returns an error if the
    /// number of pixels doesn't match the dimensions.
    pub fn from_pixels(width: u32,
                       height: u32,
                       pixels: Vec<Pixel>)
                       -> Result<PixelBuffer> {
        let expected = (width as usize) * (height as usize);
        if pixels.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(PixelBuffer {
            width,
            height,
            pixels: pixels.into_boxed_slice(),
        })
    }

    /// Creates an image from row-major RGBA bytes, four per pixel.  Returns
    /// an error if the data length doesn't match the dimensions.
    pub fn from_rgba(width: u32,
                     height: u32,
                     data: &[u8])
                     -> Result<PixelBuffer> {
        if data.len() % 4 != 0 {
            return Err(Error::DimensionMismatch {
                expected: (width as usize) * (height as usize),
                actual: data.len() / 4,
            });
        }
        let pixels = data.chunks_exact(4)
            .map(|px| Pixel::new(px[0], px[1], px[2], px[3]))
            .collect();
        PixelBuffer::from_pixels(width, height, pixels)
    }

    /// Returns the width of the image, in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the image, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns true if the image has no pixels.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Returns the image's pixels in row-major order.
    pub fn pixels(&self) -> &[Pixel] {
        &self.pixels
    }

    /// Returns a mutable reference to the image's pixels.
    pub fn pixels_mut(&mut self) -> &mut [Pixel] {
        &mut self.pixels
    }

    /// Returns the pixel at `(x, y)`, or `None` if out of bounds.
    pub fn get(&self, x: u32, y: u32) -> Option<Pixel> {
        if x < self.width && y < self.height {
            Some(self.pixels[self.index(x, y)])
        } else {
            None
        }
    }

    /// Returns one row of pixels.
    ///
    /// # Panics
    /// Panics if `y` is not less than the image height.
    pub fn row(&self, y: u32) -> &[Pixel] {
        let start = self.index(0, y);
        &self.pixels[start..start + self.width as usize]
    }

    /// Returns the pixel data as RGBA bytes, four per pixel.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(self.pixels.len() * 4);
        for px in self.pixels.iter() {
            data.extend_from_slice(&[px.r, px.g, px.b, px.a]);
        }
        data
    }

    /// Composites the image over an opaque white background, leaving every
    /// pixel fully opaque.
    pub fn flatten_onto_white(&mut self) {
        for px in self.pixels.iter_mut() {
            let alpha = u32::from(px.a);
            let blend = |c: u8| {
                ((u32::from(c) * alpha + 255 * (255 - alpha)) / 255) as u8
            };
            *px = Pixel::new(blend(px.r), blend(px.g), blend(px.b), 255);
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize) * (self.width as usize) + (x as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::super::error::Error;

    #[test]
    fn new_image_is_transparent() {
        let image = PixelBuffer::new(3, 2);
        assert_eq!(image.pixels().len(), 6);
        assert!(image.pixels().iter().all(|px| px.is_transparent()));
        assert_eq!(image.get(2, 1), Some(Pixel::TRANSPARENT));
        assert_eq!(image.get(3, 0), None);
    }

    #[test]
    fn from_pixels_checks_length() {
        let result = PixelBuffer::from_pixels(2, 2, vec![Pixel::WHITE; 3]);
        match result {
            Err(Error::DimensionMismatch { expected, actual }) => {
                assert_eq!(expected, 4);
                assert_eq!(actual, 3);
            }
            _ => panic!("expected a dimension mismatch"),
        }
    }

    #[test]
    fn rgba_bytes_round_trip() {
        let data: Vec<u8> = (0..24).collect();
        let image = PixelBuffer::from_rgba(3, 2, &data).unwrap();
        assert_eq!(image.get(1, 0), Some(Pixel::new(4, 5, 6, 7)));
        assert_eq!(image.row(1)[0], Pixel::new(12, 13, 14, 15));
        assert_eq!(image.to_rgba_bytes(), data);
        assert!(PixelBuffer::from_rgba(1, 1, &[1, 2, 3]).is_err());
    }

    #[test]
    fn flatten_onto_white() {
        let pixels = vec![Pixel::new(10, 20, 30, 255),
                          Pixel::new(0, 0, 0, 0),
                          Pixel::new(0, 100, 255, 51)];
        let mut image = PixelBuffer::from_pixels(3, 1, pixels).unwrap();
        image.flatten_onto_white();
        assert_eq!(image.pixels()[0], Pixel::new(10, 20, 30, 255));
        assert_eq!(image.pixels()[1], Pixel::WHITE);
        assert_eq!(image.pixels()[2], Pixel::new(204, 224, 255, 255));
    }
}
