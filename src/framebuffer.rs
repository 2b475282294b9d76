//! 1-bit map raster
//!
//! Rows of packed bytes, eight horizontal pixels per byte, most significant
//! bit first: the same layout a monochrome panel expects and the layout of a
//! binary PBM (P4) image, so exporting is a header plus a single write.

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*};
use std::io::{self, Write};

/// Packed monochrome buffer; `BinaryColor::On` pixels are the dark ones.
pub struct MapBuffer {
    width: u32,
    height: u32,
    bits: Vec<u8>,
}

impl MapBuffer {
    /// All-`Off` buffer of the given size.
    pub fn new(width: u32, height: u32) -> Self {
        let bytes_per_row = width.div_ceil(8);
        Self {
            width,
            height,
            bits: vec![0x00; (bytes_per_row * height) as usize],
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    fn locate(&self, x: u32, y: u32) -> Option<(usize, u8)> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let byte_index = (y * self.width.div_ceil(8) + x / 8) as usize;
        Some((byte_index, 0x80 >> (x % 8)))
    }

    /// Set one pixel; coordinates outside the buffer are ignored.
    pub fn set_pixel(&mut self, x: u32, y: u32, color: BinaryColor) {
        if let Some((index, mask)) = self.locate(x, y) {
            match color {
                BinaryColor::On => self.bits[index] |= mask,
                BinaryColor::Off => self.bits[index] &= !mask,
            }
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<BinaryColor> {
        self.locate(x, y).map(|(index, mask)| {
            if self.bits[index] & mask != 0 {
                BinaryColor::On
            } else {
                BinaryColor::Off
            }
        })
    }

    /// Number of `On` pixels. Row padding bits are never set.
    pub fn count_on(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }

    /// Write the buffer as a binary PBM image (1 = black).
    pub fn write_pbm<W: Write>(&self, mut out: W) -> io::Result<()> {
        write!(out, "P4\n{} {}\n", self.width, self.height)?;
        out.write_all(&self.bits)?;
        out.flush()
    }
}

impl OriginDimensions for MapBuffer {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for MapBuffer {
    type Color = BinaryColor;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            if let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) {
                self.set_pixel(x, y, color);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn test_set_and_read_pixels() {
        let mut buffer = MapBuffer::new(10, 3);
        assert_eq!(buffer.size(), Size::new(10, 3));
        assert_eq!(buffer.as_bytes().len(), 2 * 3);

        buffer.set_pixel(0, 0, BinaryColor::On);
        buffer.set_pixel(9, 2, BinaryColor::On);
        buffer.set_pixel(10, 0, BinaryColor::On); // ignored
        assert_eq!(buffer.pixel(0, 0), Some(BinaryColor::On));
        assert_eq!(buffer.pixel(9, 2), Some(BinaryColor::On));
        assert_eq!(buffer.pixel(1, 0), Some(BinaryColor::Off));
        assert_eq!(buffer.pixel(10, 0), None);
        assert_eq!(buffer.as_bytes()[0], 0x80);
        assert_eq!(buffer.as_bytes()[5], 0x40);
        assert_eq!(buffer.count_on(), 2);

        buffer.set_pixel(0, 0, BinaryColor::Off);
        assert_eq!(buffer.count_on(), 1);
    }

    #[test]
    fn test_draw_target_clips_to_buffer() {
        let mut buffer = MapBuffer::new(8, 4);
        Rectangle::new(Point::new(-2, 2), Size::new(20, 5))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut buffer)
            .unwrap();
        assert_eq!(buffer.count_on(), 16);
        assert_eq!(buffer.pixel(0, 1), Some(BinaryColor::Off));
        assert_eq!(buffer.pixel(7, 3), Some(BinaryColor::On));
    }

    #[test]
    fn test_pbm_export() {
        let mut buffer = MapBuffer::new(12, 2);
        buffer.set_pixel(11, 1, BinaryColor::On);
        let mut out = Vec::new();
        buffer.write_pbm(&mut out).unwrap();

        let header = b"P4\n12 2\n";
        assert_eq!(&out[..header.len()], header);
        assert_eq!(out.len(), header.len() + 4);
        assert_eq!(out[header.len() + 3], 0x10);
    }
}
