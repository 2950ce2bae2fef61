use log::trace;

use crate::ParserError;
use crate::bmp::types::{
    BMP_MAGIC, BmpHeader, BmpImage, COMPRESSION_NONE, OFFSET_BIT_COUNT, OFFSET_COMPRESSION, OFFSET_HEIGHT,
    OFFSET_PIXEL_DATA, OFFSET_WIDTH,
};
use crate::common::tokenizer::WordTokenizer;

pub struct BmpReader {}

impl BmpReader {
    pub fn parse_header(data: &[u8]) -> Result<BmpHeader, ParserError> {
        let mut rdr = WordTokenizer::binary(data);
        let magic = rdr.read::<u16>()?;
        if magic != BMP_MAGIC {
            return Err(ParserError::InvalidMagicValue { magic: magic as u32 });
        }

        Ok(BmpHeader {
            pixel_offset: rdr.read_at(OFFSET_PIXEL_DATA)?,
            width: rdr.read_at(OFFSET_WIDTH)?,
            height: rdr.read_at(OFFSET_HEIGHT)?,
            bit_count: rdr.read_at(OFFSET_BIT_COUNT)?,
            compression: rdr.read_at(OFFSET_COMPRESSION)?,
        })
    }

    pub fn parse(data: &[u8]) -> Result<BmpImage, ParserError> {
        let header = Self::parse_header(data)?;
        trace!("BMP header {:?}", header);

        if header.compression != COMPRESSION_NONE {
            return Err(ParserError::FormatError {
                reason: "Compressed BMPs are not supported",
            });
        }

        let bytes_per_pixel = match header.bit_count {
            24 => 3,
            32 => 4,
            _ => {
                return Err(ParserError::FormatError {
                    reason: "Only 24 and 32 bit BMPs are supported",
                });
            }
        };

        if header.width <= 0 || header.height == 0 {
            return Err(ParserError::FormatError {
                reason: "BMP without pixels",
            });
        }

        let width = header.width.unsigned_abs() as usize;
        let height = header.height.unsigned_abs() as usize;
        let top_down = header.height < 0;

        // rows are padded to a multiple of four bytes
        let row_size = (width * bytes_per_pixel + 3) & !3;
        let truncated = ParserError::FormatError {
            reason: "BMP pixel data is truncated",
        };
        let pixel_bytes = row_size.checked_mul(height).ok_or(ParserError::FormatError {
            reason: "BMP dimensions overflow",
        })?;
        let offset = header.pixel_offset as usize;
        let pixel_data = offset
            .checked_add(pixel_bytes)
            .and_then(|end| data.get(offset..end))
            .ok_or(truncated)?;

        let mut pixels = Vec::with_capacity(width * height * 4);
        for y in 0..height {
            let source_row = if top_down { y } else { height - 1 - y };
            let row = &pixel_data[source_row * row_size..source_row * row_size + width * bytes_per_pixel];
            // stored as BGR(A); the fourth byte of BI_RGB images is unused
            for pixel in row.chunks_exact(bytes_per_pixel) {
                pixels.extend_from_slice(&[pixel[2], pixel[1], pixel[0], 0xff]);
            }
        }

        Ok(BmpImage {
            width: width as u32,
            height: height as u32,
            pixels,
        })
    }
}
