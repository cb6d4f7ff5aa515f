//! FrostGlass: a frosted-glass backdrop renderer built on a parallel,
//! integer-exact three-pass box approximation of a Gaussian blur.

#[macro_use]
pub mod logger;

pub mod backdrop;
pub mod canvas;
pub mod cli;
pub mod io;
pub mod ops;
pub mod settings;

pub use backdrop::{Backdrop, CaptureError, DisplayGeometryEnumerator, DisplayLayout, Presenter, ScreenCaptureProvider};
pub use canvas::{PixelBuffer, Rect, Size};
pub use ops::{BlurEngine, BlurError, WorkerPool, gaussian_blur};
pub use settings::Settings;
