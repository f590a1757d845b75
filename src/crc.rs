//! CRC-32 (IEEE 802.3 / zlib) checksums, as used for PNG chunk framing.

/// The reversed form of the CRC-32 polynomial `0x04C11DB7`.
const POLYNOMIAL: u32 = 0xEDB8_8320;

/// Lookup table for byte-at-a-time CRC computation.
pub static CRC_TABLE: [u32; 256] = make_table();

/// Computes the 256-entry lookup table for the CRC-32 polynomial.  This is a
/// pure function, so it can be evaluated at compile time and called any
/// number of times.
pub const fn make_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut n = 0;
    while n < 256 {
        let mut c = n as u32;
        let mut k = 0;
        while k < 8 {
            c = if c & 1 != 0 { POLYNOMIAL ^ (c >> 1) } else { c >> 1 };
            k += 1;
        }
        table[n] = c;
        n += 1;
    }
    table
}

/// Folds `bytes` into a running CRC register.  The register is neither
/// pre- nor post-conditioned; see [`crc`] for the finished checksum.
pub fn update(crc: u32, bytes: &[u8]) -> u32 {
    let mut c = crc;
    for &byte in bytes {
        c = CRC_TABLE[((c ^ u32::from(byte)) & 0xff) as usize] ^ (c >> 8);
    }
    c
}

/// Computes the CRC-32 of `bytes`.
///
/// # Examples
/// ```
/// assert_eq!(pngtoicns::crc::crc(b""), 0);
/// assert_eq!(pngtoicns::crc::crc(b"123456789"), 0xCBF43926);
/// ```
pub fn crc(bytes: &[u8]) -> u32 {
    update(0xffff_ffff, bytes) ^ 0xffff_ffff
}

/// An incremental CRC-32 hasher, for checksums over data that arrives in
/// pieces (such as a PNG chunk's type code followed by its payload).
#[derive(Clone, Copy, Debug)]
pub struct Crc32 {
    register: u32,
}

impl Crc32 {
    /// Creates a hasher over the empty byte sequence.
    pub fn new() -> Crc32 {
        Crc32 { register: 0xffff_ffff }
    }

    /// Feeds more bytes into the hasher.
    pub fn update(&mut self, bytes: &[u8]) {
        self.register = update(self.register, bytes);
    }

    /// Returns the checksum of all bytes fed so far.
    pub fn finish(&self) -> u32 {
        self.register ^ 0xffff_ffff
    }
}

impl Default for Crc32 {
    fn default() -> Crc32 {
        Crc32::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vectors() {
        assert_eq!(crc(b""), 0x0000_0000);
        assert_eq!(crc(b"123456789"), 0xCBF4_3926);
        assert_eq!(crc(b"IEND"), 0xAE42_6082);
    }

    #[test]
    fn table_is_idempotent() {
        assert_eq!(make_table(), CRC_TABLE);
        assert_eq!(CRC_TABLE[0], 0);
        assert_eq!(CRC_TABLE[1], 0x7707_3096);
        assert_eq!(CRC_TABLE[255], 0x2D02_EF8D);
    }

    #[test]
    fn incremental_matches_one_shot() {
        let mut hasher = Crc32::new();
        hasher.update(b"1234");
        hasher.update(b"");
        hasher.update(b"56789");
        assert_eq!(hasher.finish(), crc(b"123456789"));
    }

    #[test]
    fn update_continues_from_running_value() {
        let partial = update(0xffff_ffff, b"IHDR");
        let whole = update(partial, b"\0\0\0\x10") ^ 0xffff_ffff;
        assert_eq!(whole, crc(b"IHDR\0\0\0\x10"));
    }
}
