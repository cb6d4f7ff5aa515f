// ============================================================================
// FrostGlass CLI — headless blur and backdrop rendering
// ============================================================================
//
// Usage examples:
//   frostglass -i shot.png -o blurred.png --sigma 15
//   frostglass -i "shots/*.png" --output-dir out/ --sigma 8 --workers 4
//   frostglass -i desktop.png --displays 1920x1080,1280x1024 \
//              --window 100,50,800,600 -o backdrop.png
//
// Blur mode writes each input blurred at its full size. Backdrop mode
// (enabled by --window) treats the single input as the captured desktop,
// blurs it, and writes only the region behind the window.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use crate::backdrop::{Backdrop, DisplayLayout};
use crate::canvas::{Rect, Size};
use crate::io::{ImageFileCapture, PngPresenter, is_image_extension, save_rgba_image};
use crate::ops::{WorkerPool, gaussian_blur_rgba};
use crate::settings::Settings;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// FrostGlass frosted-glass backdrop renderer.
#[derive(Parser, Debug)]
#[command(
    name = "frostglass",
    about = "Blur images or render a frosted-glass window backdrop",
    long_about = "Blur image files with a fast three-pass box approximation of a\n\
                  Gaussian blur, or treat an image as a desktop capture and render\n\
                  the blurred backdrop behind a window.\n\n\
                  Example:\n  \
                  frostglass -i shot.png -o blurred.png --sigma 15\n  \
                  frostglass -i desktop.png --window 100,50,800,600 -o backdrop.png"
)]
pub struct CliArgs {
    /// Input file(s). Glob patterns accepted (e.g. "*.png", "shots/*.jpg").
    #[arg(short, long, required = true, num_args = 1..)]
    pub input: Vec<String>,

    /// Output file path. Only valid for single-file input.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output directory for batch processing.
    #[arg(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Blur strength. 0 or less copies the input unchanged. Defaults to the saved setting.
    #[arg(short, long, value_name = "SIGMA", allow_negative_numbers = true)]
    pub sigma: Option<i32>,

    /// Maximum blur worker threads (0 = one per CPU). Defaults to the saved setting.
    #[arg(short, long, value_name = "N")]
    pub workers: Option<usize>,

    /// Display sizes left to right, e.g. "1920x1080,1280x1024".
    /// Defaults to the saved displays, then to the input image's size.
    #[arg(long, value_name = "WxH[,WxH...]", value_parser = parse_displays)]
    pub displays: Option<DisplayList>,

    /// Window rectangle "X,Y,W,H" in screen pixels. Enables backdrop mode.
    #[arg(long, value_name = "X,Y,W,H", value_parser = parse_window)]
    pub window: Option<Rect>,

    /// Mirror the viewport for a right-to-left window layout.
    #[arg(long)]
    pub rtl: bool,

    /// Window opacity folded into the backdrop's alpha (0.0-1.0).
    #[arg(long, value_name = "0.0-1.0")]
    pub opacity: Option<f32>,

    /// Persist the effective sigma, workers, displays, opacity and layout.
    #[arg(long)]
    pub save_settings: bool,

    /// Echo the session log to stderr and print per-file timing.
    #[arg(short, long)]
    pub verbose: bool,
}

/// Parsed `--displays` value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DisplayList(pub Vec<Size>);

fn parse_displays(s: &str) -> Result<DisplayList, String> {
    let mut displays = Vec::new();
    for part in s.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (w, h) = part
            .split_once(['x', 'X'])
            .ok_or_else(|| format!("'{}' is not WIDTHxHEIGHT", part))?;
        let w: u32 = w.trim().parse().map_err(|_| format!("bad width in '{}'", part))?;
        let h: u32 = h.trim().parse().map_err(|_| format!("bad height in '{}'", part))?;
        if w == 0 || h == 0 {
            return Err(format!("display '{}' has a zero dimension", part));
        }
        displays.push(Size::new(w, h));
    }
    if displays.is_empty() {
        return Err("no displays given".to_string());
    }
    Ok(DisplayList(displays))
}

fn parse_window(s: &str) -> Result<Rect, String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    let [x, y, w, h] = parts.as_slice() else {
        return Err(format!("'{}' is not X,Y,W,H", s));
    };
    let x: i32 = x.parse().map_err(|_| format!("bad x in '{}'", s))?;
    let y: i32 = y.parse().map_err(|_| format!("bad y in '{}'", s))?;
    let w: u32 = w.parse().map_err(|_| format!("bad width in '{}'", s))?;
    let h: u32 = h.parse().map_err(|_| format!("bad height in '{}'", s))?;
    if w == 0 || h == 0 {
        return Err(format!("window '{}' has a zero dimension", s));
    }
    Ok(Rect::new(x, y, w, h))
}

// ============================================================================
// Public entry point
// ============================================================================

/// Run all CLI processing and return an OS exit code.
/// `0` = all files succeeded, `1` = one or more files failed.
pub fn run(args: CliArgs) -> ExitCode {
    let settings = effective_settings(&args);
    if args.save_settings {
        settings.save();
    }

    let inputs = resolve_inputs(&args.input);
    if inputs.is_empty() {
        eprintln!("error: no input files matched the given pattern(s).");
        return ExitCode::FAILURE;
    }

    if inputs.len() > 1 && args.output.is_some() && args.output_dir.is_none() {
        eprintln!(
            "error: {} input files given but --output only accepts a single file path.\n\
             Use --output-dir to specify a destination directory for batch processing.",
            inputs.len()
        );
        return ExitCode::FAILURE;
    }

    let pool = match WorkerPool::new(settings.max_workers) {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("error: {}", e);
            log_err!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    log_info!(
        "Blur sigma {} on {} worker(s)",
        settings.blur_sigma,
        pool.workers()
    );

    if let Some(dir) = &args.output_dir {
        if let Err(e) = std::fs::create_dir_all(dir) {
            eprintln!(
                "error: could not create output directory '{}': {}",
                dir.display(),
                e
            );
            return ExitCode::FAILURE;
        }
    }

    if let Some(window) = args.window {
        if inputs.len() > 1 {
            eprintln!("error: --window renders one backdrop and takes exactly one input file.");
            return ExitCode::FAILURE;
        }
        return run_backdrop(&inputs[0], &args, &settings, window, &pool);
    }

    let total = inputs.len();
    let multi = total > 1;
    let mut any_failure = false;

    for (idx, input_path) in inputs.iter().enumerate() {
        if multi || args.verbose {
            println!("[{}/{}] {}", idx + 1, total, input_path.display());
        }
        let file_start = Instant::now();

        let Some(output_path) =
            build_output_path(input_path, args.output.as_deref(), args.output_dir.as_deref())
        else {
            eprintln!(
                "  error: cannot determine output path for '{}'.",
                input_path.display()
            );
            any_failure = true;
            continue;
        };

        match blur_one(input_path, &output_path, settings.blur_sigma, &pool) {
            Ok(()) => {
                log_info!("{} -> {}", input_path.display(), output_path.display());
                if args.verbose || multi {
                    println!(
                        "  → {} ({:.0}ms)",
                        output_path.display(),
                        file_start.elapsed().as_secs_f64() * 1000.0
                    );
                }
            }
            Err(e) => {
                log_err!("{}: {}", input_path.display(), e);
                eprintln!("  error: {}", e);
                any_failure = true;
            }
        }
    }

    if any_failure { ExitCode::FAILURE } else { ExitCode::SUCCESS }
}

/// Saved settings with command-line overrides applied.
fn effective_settings(args: &CliArgs) -> Settings {
    let mut settings = Settings::load();
    if let Some(sigma) = args.sigma {
        settings.blur_sigma = sigma;
    }
    if let Some(workers) = args.workers {
        settings.max_workers = workers;
    }
    if let Some(opacity) = args.opacity {
        settings.window_opacity = opacity;
    }
    if let Some(DisplayList(displays)) = &args.displays {
        settings.displays = displays.clone();
    }
    if args.rtl {
        settings.right_to_left = true;
    }
    settings.sanitized()
}

// ============================================================================
// Per-file pipelines
// ============================================================================

fn blur_one(input: &Path, output: &Path, sigma: i32, pool: &WorkerPool) -> Result<(), String> {
    let src = image::open(input)
        .map_err(|e| format!("load failed: {}", e))?
        .to_rgba8();
    let blurred = gaussian_blur_rgba(&src, sigma, Some(pool)).map_err(|e| e.to_string())?;
    save_rgba_image(&blurred, output).map_err(|e| format!("save failed: {}", e))
}

fn run_backdrop(
    input: &Path,
    args: &CliArgs,
    settings: &Settings,
    window: Rect,
    pool: &WorkerPool,
) -> ExitCode {
    let displays = if settings.displays.is_empty() {
        match image::image_dimensions(input) {
            Ok((w, h)) => vec![Size::new(w, h)],
            Err(e) => {
                eprintln!("error: cannot read '{}': {}", input.display(), e);
                log_err!("cannot read '{}': {}", input.display(), e);
                return ExitCode::FAILURE;
            }
        }
    } else {
        settings.displays.clone()
    };

    let Some(output) = build_output_path(input, args.output.as_deref(), args.output_dir.as_deref())
    else {
        eprintln!("error: cannot determine output path for '{}'.", input.display());
        return ExitCode::FAILURE;
    };

    let start = Instant::now();
    let layout = DisplayLayout::new(displays);
    let capture = ImageFileCapture::new(input);
    let backdrop = Backdrop::capture(&layout, &capture, settings.blur_sigma, Some(pool));
    let mut presenter = PngPresenter::new(&output).with_opacity(settings.window_opacity);

    match backdrop.paint(&mut presenter, window, settings.right_to_left) {
        Ok(()) => {
            log_info!("Backdrop for {:?} written to {}", window, output.display());
            if args.verbose {
                println!(
                    "  → {} ({:.0}ms)",
                    output.display(),
                    start.elapsed().as_secs_f64() * 1000.0
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            log_err!("Backdrop paint failed: {}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Expand glob patterns and literal paths into a deduplicated, ordered list.
/// Glob matches that are not images are skipped.
fn resolve_inputs(patterns: &[String]) -> Vec<PathBuf> {
    let mut result: Vec<PathBuf> = Vec::new();

    for pattern in patterns {
        let as_path = Path::new(pattern);

        if as_path.exists() {
            if !result.iter().any(|p| p.as_path() == as_path) {
                result.push(as_path.to_path_buf());
            }
            continue;
        }

        match glob::glob(pattern) {
            Ok(entries) => {
                let mut matched = false;
                for entry in entries.flatten() {
                    let is_image = entry
                        .extension()
                        .and_then(|e| e.to_str())
                        .is_some_and(is_image_extension);
                    if is_image && !result.contains(&entry) {
                        result.push(entry);
                        matched = true;
                    }
                }
                if !matched {
                    eprintln!("warning: pattern '{}' matched no image files.", pattern);
                }
            }
            Err(e) => {
                eprintln!("warning: invalid glob '{}': {}", pattern, e);
            }
        }
    }

    result
}

/// Compute the output path for a single input file.
///
/// Priority:
/// 1. `--output` (explicit path, used for single-file input)
/// 2. `--output-dir` (batch directory, keeps the input file name)
/// 3. Fallback: next to the input as `<stem>_frosted.<ext>`
fn build_output_path(
    input: &Path,
    output: Option<&Path>,
    output_dir: Option<&Path>,
) -> Option<PathBuf> {
    if let Some(out) = output {
        return Some(out.to_path_buf());
    }

    let file_name = input.file_name()?;
    if let Some(dir) = output_dir {
        return Some(dir.join(file_name));
    }

    let stem = input.file_stem()?.to_string_lossy().into_owned();
    let ext = input
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "png".to_string());
    let parent = input.parent().unwrap_or(Path::new("."));
    Some(parent.join(format!("{}_frosted.{}", stem, ext)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_display_list() {
        assert_eq!(
            parse_displays("1920x1080, 1280X1024").unwrap(),
            DisplayList(vec![Size::new(1920, 1080), Size::new(1280, 1024)])
        );
        assert!(parse_displays("1920").is_err());
        assert!(parse_displays("0x1080").is_err());
        assert!(parse_displays("").is_err());
    }

    #[test]
    fn parses_window_rect() {
        assert_eq!(parse_window("-10, 20,300,200").unwrap(), Rect::new(-10, 20, 300, 200));
        assert!(parse_window("1,2,3").is_err());
        assert!(parse_window("1,2,0,4").is_err());
    }

    #[test]
    fn output_path_priority() {
        let input = Path::new("shots/desk.jpg");
        assert_eq!(
            build_output_path(input, Some(Path::new("x.png")), Some(Path::new("out"))),
            Some(PathBuf::from("x.png"))
        );
        assert_eq!(
            build_output_path(input, None, Some(Path::new("out"))),
            Some(PathBuf::from("out/desk.jpg"))
        );
        assert_eq!(
            build_output_path(input, None, None),
            Some(PathBuf::from("shots/desk_frosted.jpg"))
        );
    }

    #[test]
    fn blur_one_writes_blurred_file() {
        let dir = std::env::temp_dir().join(format!("frostglass-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let input = dir.join("stripes.png");
        let output = dir.join("stripes_frosted.png");
        let stripes = image::RgbaImage::from_fn(16, 4, |x, _| {
            let v = if x < 8 { 0 } else { 255 };
            image::Rgba([v, v, v, 255])
        });
        stripes.save(&input).unwrap();

        let pool = WorkerPool::new(2).unwrap();
        blur_one(&input, &output, 3, &pool).unwrap();

        let written = image::open(&output).unwrap().to_rgba8();
        assert_eq!(written.dimensions(), (16, 4));
        assert_eq!(written, gaussian_blur_rgba(&stripes, 3, None).unwrap());
        assert_ne!(written, stripes);

        assert!(blur_one(&dir.join("missing.png"), &output, 3, &pool).is_err());
        let _ = std::fs::remove_file(&input);
        let _ = std::fs::remove_file(&output);
    }

    #[test]
    fn cli_overrides_reach_settings() {
        let args = CliArgs::parse_from([
            "frostglass", "-i", "a.png", "--sigma", "-2", "-w", "3", "--rtl", "--displays", "800x600",
        ]);
        let s = effective_settings(&args);
        assert_eq!(s.blur_sigma, 0);
        assert_eq!(s.max_workers, 3);
        assert!(s.right_to_left);
        assert_eq!(s.displays, vec![Size::new(800, 600)]);
    }
}
