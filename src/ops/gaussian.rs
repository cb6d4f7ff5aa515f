// ============================================================================
// GAUSSIAN BLUR — three cascaded box passes per channel, channels in parallel
// ============================================================================
//
// Pipeline for one `process` call:
//   split ARGB into four planes
//   → blur the four planes concurrently (3 separable box passes each)
//   → clamp + merge back into ARGB
//
// All planes are locals of the call and are dropped before it returns.
// ============================================================================

use image::RgbaImage;

use super::box_filter::separable_pass;
use super::box_sizes::{BoxRadii, PASSES};
use super::channels::{self, ChannelBuffer};
use super::pool::{self, WorkerPool};
use super::BlurError;
use crate::canvas::PixelBuffer;

/// Blur engine bound to one source image.
///
/// The image is borrowed read-only; each [`process`](Self::process) call
/// produces a new buffer and keeps nothing between calls.
#[derive(Debug, Clone, Copy)]
pub struct BlurEngine<'a> {
    image: &'a PixelBuffer,
    pool: Option<&'a WorkerPool>,
}

impl<'a> BlurEngine<'a> {
    /// Fails with [`BlurError::InvalidImage`] if either dimension is zero.
    pub fn new(image: &'a PixelBuffer) -> Result<Self, BlurError> {
        if image.is_empty() {
            return Err(BlurError::InvalidImage {
                width: image.width(),
                height: image.height(),
            });
        }
        Ok(Self { image, pool: None })
    }

    /// Confine the work to `pool` instead of rayon's global pool.
    pub fn with_pool(mut self, pool: &'a WorkerPool) -> Self {
        self.pool = Some(pool);
        self
    }

    pub fn image(&self) -> &'a PixelBuffer {
        self.image
    }

    /// Blur with strength `sigma`. `sigma <= 0` returns an unmodified copy.
    /// The result always has the source's dimensions.
    pub fn process(&self, sigma: i32) -> PixelBuffer {
        if sigma <= 0 {
            return self.image.clone();
        }
        let radii = BoxRadii::for_sigma(sigma);
        let image = self.image;
        pool::install(self.pool, move || blur_argb(image, radii))
    }
}

/// Blur a pixel buffer on rayon's global pool.
pub fn gaussian_blur(image: &PixelBuffer, sigma: i32) -> Result<PixelBuffer, BlurError> {
    Ok(BlurEngine::new(image)?.process(sigma))
}

/// Blur an `image` crate RGBA image, optionally inside `pool`.
pub fn gaussian_blur_rgba(
    img: &RgbaImage,
    sigma: i32,
    pool: Option<&WorkerPool>,
) -> Result<RgbaImage, BlurError> {
    let src = PixelBuffer::from_rgba_image(img);
    let mut engine = BlurEngine::new(&src)?;
    if let Some(pool) = pool {
        engine = engine.with_pool(pool);
    }
    Ok(engine.process(sigma).to_rgba_image())
}

fn blur_argb(image: &PixelBuffer, radii: BoxRadii) -> PixelBuffer {
    let (w, h) = (image.width() as usize, image.height() as usize);
    let [alpha, red, green, blue] = channels::split(image.pixels());

    let (alpha, red, green, blue) = pool::join4(
        move || blur_channel(alpha, w, h, radii),
        move || blur_channel(red, w, h, radii),
        move || blur_channel(green, w, h, radii),
        move || blur_channel(blue, w, h, radii),
    );

    let pixels = channels::merge(&alpha, &red, &green, &blue);
    PixelBuffer::from_raw_unchecked(image.width(), image.height(), pixels)
}

// ---------------------------------------------------------------------------
//  Per-channel ping-pong
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    A,
    B,
}

/// Source and destination slot of pass `k`: A→B, B→A, A→B, …
fn pass_slots(k: usize) -> (Slot, Slot) {
    if k % 2 == 0 {
        (Slot::A, Slot::B)
    } else {
        (Slot::B, Slot::A)
    }
}

/// The two ping-pong planes of one channel plus the column-pass scratch.
struct ChannelPlanes {
    a: ChannelBuffer,
    b: ChannelBuffer,
    scratch: ChannelBuffer,
}

impl ChannelPlanes {
    fn new(channel: ChannelBuffer) -> Self {
        let len = channel.len();
        Self {
            a: channel,
            b: vec![0; len],
            scratch: vec![0; len],
        }
    }

    /// `(source, destination, scratch)` for a pass reading from `src`.
    fn for_pass(&mut self, src: Slot) -> (&[i32], &mut [i32], &mut [i32]) {
        match src {
            Slot::A => (self.a.as_slice(), self.b.as_mut_slice(), self.scratch.as_mut_slice()),
            Slot::B => (self.b.as_slice(), self.a.as_mut_slice(), self.scratch.as_mut_slice()),
        }
    }

    fn take(self, slot: Slot) -> ChannelBuffer {
        match slot {
            Slot::A => self.a,
            Slot::B => self.b,
        }
    }
}

/// Run the three separable passes over one channel. Each pass finishes
/// completely before the next starts reading its output.
fn blur_channel(channel: ChannelBuffer, width: usize, height: usize, radii: BoxRadii) -> ChannelBuffer {
    let mut planes = ChannelPlanes::new(channel);
    for (k, &radius) in radii.0.iter().enumerate() {
        let (src, dst_slot) = pass_slots(k);
        debug_assert_ne!(src, dst_slot);
        let (src, dst, scratch) = planes.for_pass(src);
        separable_pass(src, dst, scratch, width, height, radius);
    }
    let (_, last_dst) = pass_slots(PASSES - 1);
    planes.take(last_dst)
}
