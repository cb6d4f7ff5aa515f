// ============================================================================
// BOX SIZES — choose box widths whose cascade approximates a Gaussian
// ============================================================================
//
// n successive box filters of width w have variance n·(w²−1)/12. Solving for
// sigma gives an ideal (non-integer, maybe even) width, so we mix two odd
// widths wl < wu, using wl for the first m passes and wu for the rest, with m
// picked so the summed variance lands closest to sigma².
// ============================================================================

use super::div_round_half_away_wide;

/// Number of cascaded box passes.
pub const PASSES: usize = 3;

/// Planner output: the two widths and how many passes use the lower one.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoxPlan {
    /// Largest odd width not above the ideal width.
    pub lower: u32,
    /// `lower + 2`.
    pub upper: u32,
    /// Passes (from the first) that use `lower`.
    pub lower_count: usize,
}

/// Per-pass radii, in pass order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoxRadii(pub [usize; PASSES]);

impl BoxPlan {
    /// Plan box widths for `sigma`. Negative sigma is treated as 0.
    pub fn for_sigma(sigma: i32) -> Self {
        // 12·sigma² passes i64::MAX near sigma = 8.8e8; plan in 128 bits.
        // For sigma = i32::MAX, wu is exactly u32::MAX.
        let n = PASSES as u128;
        let s = sigma.max(0) as u128;
        let twelve_s2 = 12 * s * s;

        // floor(sqrt(12·s²/n + 1)), exact
        let mut wl = (twelve_s2 / n + 1).isqrt();
        if wl % 2 == 0 {
            wl = wl.saturating_sub(1);
        }
        let wu = wl + 2;

        let (n, wl_i, twelve_s2) = (n as i128, wl as i128, twelve_s2 as i128);
        let numer = twelve_s2 - n * wl_i * wl_i - 4 * n * wl_i - 3 * n;
        let denom = -4 * wl_i - 4;
        let m = div_round_half_away_wide(numer, denom).clamp(0, n);

        Self {
            lower: u32::try_from(wl).unwrap_or(u32::MAX - 2),
            upper: u32::try_from(wu).unwrap_or(u32::MAX),
            lower_count: m as usize,
        }
    }

    pub fn widths(&self) -> [u32; PASSES] {
        let mut widths = [self.upper; PASSES];
        for w in widths.iter_mut().take(self.lower_count) {
            *w = self.lower;
        }
        widths
    }

    pub fn radii(&self) -> BoxRadii {
        BoxRadii(self.widths().map(radius_for_width))
    }
}

impl BoxRadii {
    pub fn for_sigma(sigma: i32) -> Self {
        BoxPlan::for_sigma(sigma).radii()
    }

    /// True when every pass is an identity copy.
    pub fn is_identity(&self) -> bool {
        self.0.iter().all(|&r| r == 0)
    }
}

/// `(width - 1) / 2`; widths below 1 give radius 0.
#[inline]
pub fn radius_for_width(width: u32) -> usize {
    (width.max(1) as usize - 1) / 2
}
