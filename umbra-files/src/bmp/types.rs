use std::fmt::{Debug, Formatter};

/// "BM", read as a little endian u16.
pub const BMP_MAGIC: u16 = 0x4d42;

pub const OFFSET_PIXEL_DATA: usize = 10;
pub const OFFSET_WIDTH: usize = 18;
pub const OFFSET_HEIGHT: usize = 22;
pub const OFFSET_BIT_COUNT: usize = 28;
pub const OFFSET_COMPRESSION: usize = 30;

/// `BI_RGB`, the only compression mode that is read.
pub const COMPRESSION_NONE: u32 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BmpHeader {
    pub pixel_offset: u32,
    pub width: i32,
    /// Negative for top-down images.
    pub height: i32,
    pub bit_count: u16,
    pub compression: u32,
}

/// Decoded pixels, RGBA8, rows from top to bottom.
#[derive(Clone, PartialEq, Eq)]
pub struct BmpImage {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl Debug for BmpImage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "BmpImage {{ {}x{}, pixels: [{}] }}", self.width, self.height, self.pixels.len())
    }
}
