// ============================================================================
// CANVAS — packed ARGB pixel buffers and screen rectangles
// ============================================================================
//
// Pixels are stored as one `u32` per pixel, row-major, with alpha in bits
// 24–31, red 16–23, green 8–15 and blue 0–7 (the layout desktop capture
// APIs hand back for 32bpp ARGB surfaces).
// ============================================================================

use image::RgbaImage;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Pack four 8-bit fields into one ARGB pixel.
#[inline]
pub fn pack_argb(a: u8, r: u8, g: u8, b: u8) -> u32 {
    ((a as u32) << 24) | ((r as u32) << 16) | ((g as u32) << 8) | (b as u32)
}

/// Unpack an ARGB pixel into `[a, r, g, b]`.
#[inline]
pub fn unpack_argb(px: u32) -> [u8; 4] {
    [(px >> 24) as u8, (px >> 16) as u8, (px >> 8) as u8, px as u8]
}

// ============================================================================
// GEOMETRY
// ============================================================================

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Screen-space rectangle. The origin may be negative (monitors left of or
/// above the primary display), the extent never is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle anchored at the origin.
    pub fn from_size(size: Size) -> Self {
        Self::new(0, 0, size.width, size.height)
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }
}

// ============================================================================
// PIXEL BUFFER
// ============================================================================

/// Row-major buffer of packed ARGB pixels.
///
/// `pixels.len() == width * height` always holds. A zero-sized buffer is a
/// legal value (an empty capture, for instance) but the blur engine refuses
/// to be built on one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u32>,
}

impl PixelBuffer {
    /// Transparent black buffer.
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, 0)
    }

    pub fn filled(width: u32, height: u32, argb: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![argb; width as usize * height as usize],
        }
    }

    /// Wrap an existing pixel vector. Returns `None` when the length does
    /// not match the dimensions.
    pub fn from_raw(width: u32, height: u32, pixels: Vec<u32>) -> Option<Self> {
        if pixels.len() != width as usize * height as usize {
            return None;
        }
        Some(Self { width, height, pixels })
    }

    /// For callers that built `pixels` from a buffer of the same dimensions.
    pub(crate) fn from_raw_unchecked(width: u32, height: u32, pixels: Vec<u32>) -> Self {
        debug_assert_eq!(pixels.len(), width as usize * height as usize);
        Self { width, height, pixels }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.size().is_empty()
    }

    pub fn pixels(&self) -> &[u32] {
        &self.pixels
    }

    pub fn into_raw(self) -> Vec<u32> {
        self.pixels
    }

    /// Pixel at `(x, y)`, or `None` outside the buffer.
    pub fn get(&self, x: u32, y: u32) -> Option<u32> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[y as usize * self.width as usize + x as usize])
    }

    /// Convert from the `image` crate's RGBA byte layout.
    pub fn from_rgba_image(img: &RgbaImage) -> Self {
        let pixels: Vec<u32> = img
            .as_raw()
            .par_chunks_exact(4)
            .map(|p| pack_argb(p[3], p[0], p[1], p[2]))
            .collect();
        Self {
            width: img.width(),
            height: img.height(),
            pixels,
        }
    }

    /// Convert to the `image` crate's RGBA byte layout.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut raw = vec![0u8; self.pixels.len() * 4];
        raw.par_chunks_exact_mut(4)
            .zip(self.pixels.par_iter())
            .for_each(|(out, &px)| {
                let [a, r, g, b] = unpack_argb(px);
                out.copy_from_slice(&[r, g, b, a]);
            });
        RgbaImage::from_raw(self.width, self.height, raw)
            .unwrap_or_else(|| RgbaImage::new(self.width, self.height))
    }

    /// Copy out `rect` (in this buffer's coordinates). Parts of the rect that
    /// fall outside the buffer come back as transparent black.
    pub fn crop(&self, rect: Rect) -> PixelBuffer {
        let out_w = rect.width as usize;
        let mut out = PixelBuffer::new(rect.width, rect.height);
        if out_w == 0 || self.is_empty() {
            return out;
        }

        let src_w = self.width as i64;
        let src_h = self.height as i64;
        out.pixels
            .par_chunks_mut(out_w)
            .enumerate()
            .for_each(|(y, row_out)| {
                let sy = rect.y as i64 + y as i64;
                if sy < 0 || sy >= src_h {
                    return;
                }
                let row_in = &self.pixels[(sy * src_w) as usize..((sy + 1) * src_w) as usize];
                for (x, px) in row_out.iter_mut().enumerate() {
                    let sx = rect.x as i64 + x as i64;
                    if sx >= 0 && sx < src_w {
                        *px = row_in[sx as usize];
                    }
                }
            });
        out
    }
}
