// ============================================================================
// BACKDROP — capture the desktop behind the window, blur it, paint a viewport
// ============================================================================
//
// The platform pieces (screen grabbing, display enumeration, painting) sit
// behind the three traits below. `Backdrop` only wires them together, and
// because the backdrop is cosmetic it never fails: a failed capture becomes
// a blank backdrop and a failed blur leaves the capture unblurred.
// ============================================================================

use std::time::Instant;

use crate::canvas::{PixelBuffer, Rect, Size};
use crate::ops::{BlurEngine, WorkerPool};

/// Errors from capture providers and presenters.
#[derive(Debug)]
pub enum CaptureError {
    Io(std::io::Error),
    Image(String),
    /// A zero-sized region was requested or presented.
    EmptyRegion(Rect),
}

impl std::fmt::Display for CaptureError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureError::Io(e) => write!(f, "I/O error: {}", e),
            CaptureError::Image(e) => write!(f, "Image error: {}", e),
            CaptureError::EmptyRegion(r) => {
                write!(f, "Empty region {}x{} at ({}, {})", r.width, r.height, r.x, r.y)
            }
        }
    }
}

impl std::error::Error for CaptureError {}

impl From<std::io::Error> for CaptureError {
    fn from(e: std::io::Error) -> Self {
        CaptureError::Io(e)
    }
}

impl From<image::ImageError> for CaptureError {
    fn from(e: image::ImageError) -> Self {
        CaptureError::Image(e.to_string())
    }
}

/// Grabs what is on screen inside a region.
pub trait ScreenCaptureProvider {
    /// The returned buffer must be exactly `region.width` × `region.height`.
    fn capture(&self, region: Rect) -> Result<PixelBuffer, CaptureError>;
}

/// Reports the rectangle covering every active display.
pub trait DisplayGeometryEnumerator {
    fn bounding_rect(&self) -> Rect;
}

/// Paints part of a buffer onto the window.
pub trait Presenter {
    /// Paint the `source` region of `pixels`. `pixels` is read-only.
    fn present(&mut self, pixels: &PixelBuffer, source: Rect) -> Result<(), CaptureError>;
}

/// Displays laid out side by side, left to right.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayLayout {
    displays: Vec<Size>,
}

impl DisplayLayout {
    pub fn new(displays: Vec<Size>) -> Self {
        Self { displays }
    }

    pub fn displays(&self) -> &[Size] {
        &self.displays
    }
}

impl DisplayGeometryEnumerator for DisplayLayout {
    /// Origin at (0, 0); width is the sum of display widths, height the
    /// tallest display.
    fn bounding_rect(&self) -> Rect {
        let width = self
            .displays
            .iter()
            .fold(0u32, |acc, d| acc.saturating_add(d.width));
        let height = self.displays.iter().map(|d| d.height).max().unwrap_or(0);
        Rect::new(0, 0, width, height)
    }
}

/// A captured, blurred desktop image and the screen area it covers.
#[derive(Clone, Debug)]
pub struct Backdrop {
    image: PixelBuffer,
    bounds: Rect,
    blurred: bool,
}

impl Backdrop {
    /// Capture the area covered by `geometry` and blur it with `sigma`.
    pub fn capture(
        geometry: &dyn DisplayGeometryEnumerator,
        provider: &dyn ScreenCaptureProvider,
        sigma: i32,
        pool: Option<&WorkerPool>,
    ) -> Self {
        let bounds = geometry.bounding_rect();
        let start = Instant::now();
        let captured = match provider.capture(bounds) {
            Ok(img) => img,
            Err(e) => {
                log_warn!("Desktop capture failed ({}); using a blank backdrop", e);
                return Self {
                    image: PixelBuffer::new(bounds.width, bounds.height),
                    bounds,
                    blurred: false,
                };
            }
        };
        log_info!(
            "Captured {}x{} desktop in {:.0}ms",
            captured.width(),
            captured.height(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Self::from_capture(bounds, captured, sigma, pool)
    }

    /// Blur an already captured image covering `bounds`.
    pub fn from_capture(
        bounds: Rect,
        captured: PixelBuffer,
        sigma: i32,
        pool: Option<&WorkerPool>,
    ) -> Self {
        let captured = if captured.size() != bounds.size() {
            log_warn!(
                "Capture is {}x{} but {}x{} was requested; cropping",
                captured.width(),
                captured.height(),
                bounds.width,
                bounds.height
            );
            captured.crop(Rect::from_size(bounds.size()))
        } else {
            captured
        };

        if sigma <= 0 {
            return Self {
                image: captured,
                bounds,
                blurred: false,
            };
        }

        let engine = match BlurEngine::new(&captured) {
            Ok(engine) => engine,
            Err(e) => {
                log_warn!("Backdrop left unblurred: {}", e);
                return Self {
                    image: captured,
                    bounds,
                    blurred: false,
                };
            }
        };
        let engine = match pool {
            Some(pool) => engine.with_pool(pool),
            None => engine,
        };

        let start = Instant::now();
        let image = engine.process(sigma);
        log_info!(
            "Blurred backdrop (sigma {}) in {:.0}ms",
            sigma,
            start.elapsed().as_secs_f64() * 1000.0
        );
        Self {
            image,
            bounds,
            blurred: true,
        }
    }

    pub fn image(&self) -> &PixelBuffer {
        &self.image
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// `false` when the blur was skipped or fell back.
    pub fn is_blurred(&self) -> bool {
        self.blurred
    }

    /// Region of the backdrop that lies behind `window` (screen coordinates).
    ///
    /// Right-to-left layouts measure the window position from the right
    /// edge, so the x origin is mirrored against the backdrop width.
    pub fn viewport(&self, window: Rect, right_to_left: bool) -> Rect {
        let x = if right_to_left {
            (self.bounds.width as i64 - window.x as i64).clamp(i32::MIN as i64, i32::MAX as i64) as i32
        } else {
            window.x
        };
        Rect::new(x, window.y, window.width, window.height)
    }

    /// Paint the part of the backdrop behind `window`.
    pub fn paint(
        &self,
        presenter: &mut dyn Presenter,
        window: Rect,
        right_to_left: bool,
    ) -> Result<(), CaptureError> {
        let source = self.viewport(window, right_to_left);
        if source.is_empty() {
            return Err(CaptureError::EmptyRegion(source));
        }
        presenter.present(&self.image, source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::pack_argb;

    struct FixedCapture(PixelBuffer);

    impl ScreenCaptureProvider for FixedCapture {
        fn capture(&self, region: Rect) -> Result<PixelBuffer, CaptureError> {
            Ok(self.0.crop(region))
        }
    }

    struct FailingCapture;

    impl ScreenCaptureProvider for FailingCapture {
        fn capture(&self, region: Rect) -> Result<PixelBuffer, CaptureError> {
            Err(CaptureError::EmptyRegion(region))
        }
    }

    #[derive(Default)]
    struct Recorder(Vec<(Size, Rect)>);

    impl Presenter for Recorder {
        fn present(&mut self, pixels: &PixelBuffer, source: Rect) -> Result<(), CaptureError> {
            self.0.push((pixels.size(), source));
            Ok(())
        }
    }

    fn checkerboard(w: u32, h: u32) -> PixelBuffer {
        let pixels = (0..w * h)
            .map(|i| {
                let v = if (i % w + i / w) % 2 == 0 { 255 } else { 0 };
                pack_argb(255, v, v, v)
            })
            .collect();
        PixelBuffer::from_raw(w, h, pixels).unwrap()
    }

    #[test]
    fn layout_sums_widths_and_takes_tallest() {
        let layout = DisplayLayout::new(vec![Size::new(1920, 1080), Size::new(1280, 1440)]);
        assert_eq!(layout.bounding_rect(), Rect::new(0, 0, 3200, 1440));
        assert_eq!(DisplayLayout::default().bounding_rect(), Rect::new(0, 0, 0, 0));
    }

    #[test]
    fn capture_blurs_the_bounding_rect() {
        let layout = DisplayLayout::new(vec![Size::new(8, 6), Size::new(4, 4)]);
        let desktop = checkerboard(12, 6);
        let backdrop = Backdrop::capture(&layout, &FixedCapture(desktop.clone()), 2, None);

        assert!(backdrop.is_blurred());
        assert_eq!(backdrop.image().size(), Size::new(12, 6));
        assert_ne!(backdrop.image(), &desktop);
    }

    #[test]
    fn failed_capture_gives_blank_backdrop() {
        let layout = DisplayLayout::new(vec![Size::new(5, 3)]);
        let backdrop = Backdrop::capture(&layout, &FailingCapture, 15, None);
        assert!(!backdrop.is_blurred());
        assert_eq!(backdrop.image(), &PixelBuffer::new(5, 3));
    }

    #[test]
    fn empty_capture_stays_unblurred() {
        let backdrop = Backdrop::from_capture(Rect::new(0, 0, 0, 0), PixelBuffer::new(0, 0), 15, None);
        assert!(!backdrop.is_blurred());
        assert!(backdrop.image().is_empty());
    }

    #[test]
    fn zero_sigma_keeps_capture() {
        let desktop = checkerboard(4, 4);
        let backdrop = Backdrop::from_capture(Rect::new(0, 0, 4, 4), desktop.clone(), 0, None);
        assert!(!backdrop.is_blurred());
        assert_eq!(backdrop.image(), &desktop);
    }

    #[test]
    fn mismatched_capture_is_cropped_to_bounds() {
        let backdrop = Backdrop::from_capture(Rect::new(0, 0, 3, 2), checkerboard(5, 5), 0, None);
        assert_eq!(backdrop.image().size(), Size::new(3, 2));
    }

    #[test]
    fn viewport_follows_window_and_mirrors_for_rtl() {
        let backdrop = Backdrop::from_capture(Rect::new(0, 0, 100, 50), PixelBuffer::new(100, 50), 0, None);
        let window = Rect::new(30, 10, 20, 15);
        assert_eq!(backdrop.viewport(window, false), Rect::new(30, 10, 20, 15));
        assert_eq!(backdrop.viewport(window, true), Rect::new(70, 10, 20, 15));
    }

    #[test]
    fn paint_hands_viewport_to_presenter() {
        let backdrop = Backdrop::from_capture(Rect::new(0, 0, 10, 10), PixelBuffer::new(10, 10), 0, None);
        let mut recorder = Recorder::default();
        backdrop.paint(&mut recorder, Rect::new(2, 3, 4, 5), false).unwrap();
        assert_eq!(recorder.0, vec![(Size::new(10, 10), Rect::new(2, 3, 4, 5))]);

        let err = backdrop.paint(&mut recorder, Rect::new(0, 0, 0, 5), false);
        assert!(matches!(err, Err(CaptureError::EmptyRegion(_))));
    }
}
