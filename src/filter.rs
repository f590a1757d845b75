//! The five standard PNG scanline filters.

/// Bytes per pixel for 8-bit RGBA; the distance to the "left" neighbor.
pub const BYTES_PER_PIXEL: usize = 4;

/// A PNG scanline filter type (filter method 0).
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum FilterType {
    /// Bytes are stored unchanged.
    None,
    /// Each byte is stored relative to the byte one pixel to its left.
    Sub,
    /// Each byte is stored relative to the byte above it.
    Up,
    /// Each byte is stored relative to the mean of its left and up
    /// neighbors.
    Average,
    /// Each byte is stored relative to the Paeth predictor of its left, up,
    /// and upper-left neighbors.
    Paeth,
}

impl FilterType {
    /// All filter types, in type-byte order.
    pub const ALL: [FilterType; 5] = [FilterType::None,
                                      FilterType::Sub,
                                      FilterType::Up,
                                      FilterType::Average,
                                      FilterType::Paeth];

    /// Returns the filter type for a scanline's type byte, if it's valid.
    pub fn from_byte(byte: u8) -> Option<FilterType> {
        match byte {
            0 => Some(FilterType::None),
            1 => Some(FilterType::Sub),
            2 => Some(FilterType::Up),
            3 => Some(FilterType::Average),
            4 => Some(FilterType::Paeth),
            _ => None,
        }
    }

    /// Returns the scanline type byte for this filter.
    pub fn to_byte(self) -> u8 {
        match self {
            FilterType::None => 0,
            FilterType::Sub => 1,
            FilterType::Up => 2,
            FilterType::Average => 3,
            FilterType::Paeth => 4,
        }
    }

    fn predict(self, a: u8, b: u8, c: u8) -> u8 {
        match self {
            FilterType::None => 0,
            FilterType::Sub => a,
            FilterType::Up => b,
            FilterType::Average => ((u16::from(a) + u16::from(b)) / 2) as u8,
            FilterType::Paeth => paeth_predictor(a, b, c),
        }
    }
}

/// Picks whichever of `a` (left), `b` (up) and `c` (upper-left) is closest
/// to `a + b - c`, preferring `a`, then `b` on ties.
pub fn paeth_predictor(a: u8, b: u8, c: u8) -> u8 {
    let p = i16::from(a) + i16::from(b) - i16::from(c);
    let pa = (p - i16::from(a)).abs();
    let pb = (p - i16::from(b)).abs();
    let pc = (p - i16::from(c)).abs();
    if pa <= pb && pa <= pc {
        a
    } else if pb <= pc {
        b
    } else {
        c
    }
}

/// Reverses `filter` in place on one scanline.  `prev` is the previous
/// scanline's unfiltered bytes (all zeros for the first scanline) and must
/// be the same length as `line`.  Bytes are reconstructed left to right, so
/// each one sees its already-unfiltered left neighbor.
pub fn unfilter_scanline(filter: FilterType, line: &mut [u8], prev: &[u8]) {
    debug_assert_eq!(line.len(), prev.len());
    if filter == FilterType::None {
        return;
    }
    for i in 0..line.len() {
        let (a, c) = if i >= BYTES_PER_PIXEL {
            (line[i - BYTES_PER_PIXEL], prev[i - BYTES_PER_PIXEL])
        } else {
            (0, 0)
        };
        let b = prev[i];
        line[i] = line[i].wrapping_add(filter.predict(a, b, c));
    }
}

/// Applies `filter` to one raw scanline, writing the filtered bytes to
/// `out`.  `prev` is the previous raw scanline (all zeros for the first).
pub fn filter_scanline(filter: FilterType,
                       line: &[u8],
                       prev: &[u8],
                       out: &mut [u8]) {
    debug_assert_eq!(line.len(), prev.len());
    debug_assert_eq!(line.len(), out.len());
    for i in 0..line.len() {
        let (a, c) = if i >= BYTES_PER_PIXEL {
            (line[i - BYTES_PER_PIXEL], prev[i - BYTES_PER_PIXEL])
        } else {
            (0, 0)
        };
        let b = prev[i];
        out[i] = line[i].wrapping_sub(filter.predict(a, b, c));
    }
}
