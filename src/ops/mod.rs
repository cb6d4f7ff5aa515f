// ============================================================================
// OPS — the blur engine and its building blocks
// ============================================================================

pub mod box_filter;
pub mod box_sizes;
pub mod channels;
pub mod gaussian;
pub mod pool;

pub use box_sizes::{BoxPlan, BoxRadii};
pub use gaussian::{BlurEngine, gaussian_blur, gaussian_blur_rgba};
pub use pool::WorkerPool;

/// Errors raised by the blur engine.
#[derive(Debug)]
pub enum BlurError {
    /// The engine was asked to blur an image with a zero dimension.
    InvalidImage { width: u32, height: u32 },
    /// The worker pool could not be started.
    Pool(String),
}

impl std::fmt::Display for BlurError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BlurError::InvalidImage { width, height } => {
                write!(f, "Invalid image: {}x{} (both dimensions must be positive)", width, height)
            }
            BlurError::Pool(e) => write!(f, "Worker pool error: {}", e),
        }
    }
}

impl std::error::Error for BlurError {}

impl From<rayon::ThreadPoolBuildError> for BlurError {
    fn from(e: rayon::ThreadPoolBuildError) -> Self {
        BlurError::Pool(e.to_string())
    }
}

/// `numer / denom` rounded to the nearest integer, ties away from zero.
/// Every rounding in a blur follows this rule: the box filter uses it
/// directly and the box-size planner through [`div_round_half_away_wide`].
/// `denom` must be non-zero.
#[inline]
pub(crate) fn div_round_half_away(numer: i64, denom: i64) -> i64 {
    let (numer, denom) = if denom < 0 { (-numer, -denom) } else { (numer, denom) };
    if numer >= 0 {
        (2 * numer + denom) / (2 * denom)
    } else {
        -((-2 * numer + denom) / (2 * denom))
    }
}

/// [`div_round_half_away`] for 128-bit operands.
pub(crate) fn div_round_half_away_wide(numer: i128, denom: i128) -> i128 {
    let (numer, denom) = if denom < 0 { (-numer, -denom) } else { (numer, denom) };
    if numer >= 0 {
        (2 * numer + denom) / (2 * denom)
    } else {
        -((-2 * numer + denom) / (2 * denom))
    }
}
