use image::RgbaImage;
use image::buffer::ConvertBuffer;
use rayon::prelude::*;
use std::path::{Path, PathBuf};

use crate::backdrop::{CaptureError, Presenter, ScreenCaptureProvider};
use crate::canvas::{PixelBuffer, Rect, pack_argb, unpack_argb};

/// Extensions the CLI accepts as input.
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "tga", "tif", "tiff"];

/// Check if a file extension is a supported image format.
pub fn is_image_extension(ext: &str) -> bool {
    IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
}

/// Decode any supported image file into an ARGB buffer.
pub fn load_pixels(path: &Path) -> Result<PixelBuffer, CaptureError> {
    let img = image::open(path)?.to_rgba8();
    Ok(PixelBuffer::from_rgba_image(&img))
}

/// Encode `pixels` to `path`; the format follows the file extension.
/// JPEG has no alpha channel, so it is written as RGB.
pub fn save_pixels(pixels: &PixelBuffer, path: &Path) -> Result<(), CaptureError> {
    if pixels.is_empty() {
        return Err(CaptureError::EmptyRegion(Rect::from_size(pixels.size())));
    }
    save_rgba_image(&pixels.to_rgba_image(), path)
}

/// Encode an RGBA image to `path`, with the same format rules as
/// [`save_pixels`].
pub fn save_rgba_image(img: &RgbaImage, path: &Path) -> Result<(), CaptureError> {
    if img.width() == 0 || img.height() == 0 {
        return Err(CaptureError::EmptyRegion(Rect::new(0, 0, img.width(), img.height())));
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    match ext.as_str() {
        "jpg" | "jpeg" => {
            let rgb: image::RgbImage = img.convert();
            rgb.save(path)?
        }
        "" => img.save_with_format(path, image::ImageFormat::Png)?,
        _ => img.save(path)?,
    }
    Ok(())
}

// ============================================================================
// FILE-BACKED CAPTURE
// ============================================================================

/// Treats an image file as the desktop. The file is re-read on every
/// capture, the way a real screen grab sees the current screen.
#[derive(Clone, Debug)]
pub struct ImageFileCapture {
    path: PathBuf,
}

impl ImageFileCapture {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScreenCaptureProvider for ImageFileCapture {
    /// Areas of `region` outside the file come back transparent.
    fn capture(&self, region: Rect) -> Result<PixelBuffer, CaptureError> {
        if region.is_empty() {
            return Err(CaptureError::EmptyRegion(region));
        }
        let desktop = load_pixels(&self.path)?;
        Ok(desktop.crop(region))
    }
}

// ============================================================================
// FILE-BACKED PRESENTER
// ============================================================================

/// Writes each presented region to an image file, with the window opacity
/// folded into the alpha channel.
#[derive(Clone, Debug)]
pub struct PngPresenter {
    path: PathBuf,
    opacity: f32,
}

impl PngPresenter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            opacity: 1.0,
        }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity.clamp(0.0, 1.0);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Presenter for PngPresenter {
    fn present(&mut self, pixels: &PixelBuffer, source: Rect) -> Result<(), CaptureError> {
        let region = pixels.crop(source);
        let region = if self.opacity < 1.0 {
            apply_opacity(&region, self.opacity)
        } else {
            region
        };
        save_pixels(&region, &self.path)
    }
}

/// Scale every pixel's alpha by `opacity`, rounding to nearest.
fn apply_opacity(pixels: &PixelBuffer, opacity: f32) -> PixelBuffer {
    let out: Vec<u32> = pixels
        .pixels()
        .par_iter()
        .map(|&px| {
            let [a, r, g, b] = unpack_argb(px);
            let a = (a as f32 * opacity).round().clamp(0.0, 255.0) as u8;
            pack_argb(a, r, g, b)
        })
        .collect();
    PixelBuffer::from_raw_unchecked(pixels.width(), pixels.height(), out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("frostglass-io-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn extension_check_is_case_insensitive() {
        assert!(is_image_extension("PNG"));
        assert!(is_image_extension("jpeg"));
        assert!(!is_image_extension("txt"));
    }

    #[test]
    fn png_round_trip_preserves_pixels() {
        let path = temp_path("round_trip.png");
        let buf = PixelBuffer::from_raw(2, 2, vec![0xFF00_00FF, 0x8012_3456, 0, 0xFFFF_FFFF]).unwrap();
        save_pixels(&buf, &path).unwrap();
        assert_eq!(load_pixels(&path).unwrap(), buf);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn file_capture_crops_region() {
        let path = temp_path("desktop.png");
        let desktop = PixelBuffer::from_raw(3, 1, vec![0xFF00_0001, 0xFF00_0002, 0xFF00_0003]).unwrap();
        save_pixels(&desktop, &path).unwrap();

        let capture = ImageFileCapture::new(&path);
        let region = capture.capture(Rect::new(1, 0, 3, 1)).unwrap();
        assert_eq!(region.pixels(), &[0xFF00_0002, 0xFF00_0003, 0]);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn missing_file_is_a_capture_error() {
        let capture = ImageFileCapture::new(temp_path("does-not-exist.png"));
        assert!(capture.capture(Rect::new(0, 0, 4, 4)).is_err());
    }

    #[test]
    fn presenter_applies_opacity() {
        let path = temp_path("presented.png");
        let buf = PixelBuffer::filled(4, 4, pack_argb(200, 10, 20, 30));
        let mut presenter = PngPresenter::new(&path).with_opacity(0.5);
        presenter.present(&buf, Rect::new(1, 1, 2, 2)).unwrap();

        let written = load_pixels(&path).unwrap();
        assert_eq!(written.size(), crate::canvas::Size::new(2, 2));
        assert!(written.pixels().iter().all(|&px| px == pack_argb(100, 10, 20, 30)));
        let _ = std::fs::remove_file(&path);
    }
}
