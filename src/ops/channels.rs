// ============================================================================
// CHANNELS — split packed ARGB into integer planes and merge them back
// ============================================================================

use rayon::prelude::*;

use crate::canvas::{pack_argb, unpack_argb};

/// One colour channel of an image, positionally aligned with its pixels.
/// Values may drift outside 0..=255 between passes; they are clamped once,
/// in [`merge`].
pub type ChannelBuffer = Vec<i32>;

/// Channel planes in pixel-field order: alpha, red, green, blue.
pub type Planes = [ChannelBuffer; 4];

/// Split packed ARGB pixels into four planes.
pub fn split(pixels: &[u32]) -> Planes {
    let len = pixels.len();
    let mut planes: Planes = [vec![0; len], vec![0; len], vec![0; len], vec![0; len]];
    let [a, r, g, b] = &mut planes;

    a.par_iter_mut()
        .zip(r.par_iter_mut())
        .zip(g.par_iter_mut())
        .zip(b.par_iter_mut())
        .zip(pixels.par_iter())
        .for_each(|((((a, r), g), b), &px)| {
            let [pa, pr, pg, pb] = unpack_argb(px);
            *a = pa as i32;
            *r = pr as i32;
            *g = pg as i32;
            *b = pb as i32;
        });

    planes
}

/// Clamp each plane value into 0..=255 and pack the four planes back into
/// ARGB pixels.
pub fn merge(alpha: &[i32], red: &[i32], green: &[i32], blue: &[i32]) -> Vec<u32> {
    debug_assert!(
        alpha.len() == red.len() && red.len() == green.len() && green.len() == blue.len(),
        "channel planes differ in length"
    );

    alpha
        .par_iter()
        .zip(red.par_iter())
        .zip(green.par_iter())
        .zip(blue.par_iter())
        .map(|(((&a, &r), &g), &b)| pack_argb(clamp_u8(a), clamp_u8(r), clamp_u8(g), clamp_u8(b)))
        .collect()
}

#[inline]
fn clamp_u8(v: i32) -> u8 {
    v.clamp(0, 255) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_extracts_each_field() {
        let [a, r, g, b] = split(&[0xFF10_2030, 0x0001_0203]);
        assert_eq!(a, vec![0xFF, 0x00]);
        assert_eq!(r, vec![0x10, 0x01]);
        assert_eq!(g, vec![0x20, 0x02]);
        assert_eq!(b, vec![0x30, 0x03]);
    }

    #[test]
    fn merge_clamps_out_of_range_values() {
        let merged = merge(&[300], &[-5], &[128], &[256]);
        assert_eq!(merged, vec![pack_argb(255, 0, 128, 255)]);
    }

    #[test]
    fn merge_inverts_split() {
        let pixels = vec![0x8040_2010, 0xFFFF_FFFF, 0, 0x7F00_FF00];
        let [a, r, g, b] = split(&pixels);
        assert_eq!(merge(&a, &r, &g, &b), pixels);
    }
}
