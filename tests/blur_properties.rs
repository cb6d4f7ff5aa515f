use frostglass::canvas::{PixelBuffer, Size, pack_argb, unpack_argb};
use frostglass::ops::{BlurEngine, BoxPlan, BoxRadii, WorkerPool, gaussian_blur};

/// Deterministic pseudo-random ARGB image.
fn noise(width: u32, height: u32, seed: u32) -> PixelBuffer {
    let mut state = seed.wrapping_mul(2_654_435_761).max(1);
    let pixels = (0..width * height)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            state
        })
        .collect();
    PixelBuffer::from_raw(width, height, pixels).unwrap()
}

#[test]
fn non_positive_sigma_returns_input() {
    let img = noise(17, 9, 1);
    for sigma in [0, -1, -50] {
        assert_eq!(gaussian_blur(&img, sigma).unwrap(), img);
    }
}

#[test]
fn empty_image_is_rejected() {
    assert!(gaussian_blur(&PixelBuffer::new(0, 5), 3).is_err());
    assert!(BlurEngine::new(&PixelBuffer::new(5, 0)).is_err());
}

#[test]
fn dimensions_are_preserved() {
    for (w, h) in [(1, 1), (1, 40), (40, 1), (33, 7)] {
        let out = gaussian_blur(&noise(w, h, w + h), 6).unwrap();
        assert_eq!(out.size(), Size::new(w, h));
    }
}

#[test]
fn single_pixel_is_unchanged() {
    let img = PixelBuffer::filled(1, 1, pack_argb(12, 34, 56, 78));
    assert_eq!(gaussian_blur(&img, 50).unwrap(), img);
}

#[test]
fn uniform_image_is_a_fixed_point() {
    let img = PixelBuffer::filled(23, 11, pack_argb(201, 7, 128, 255));
    assert_eq!(gaussian_blur(&img, 9).unwrap(), img);
}

#[test]
fn output_is_identical_for_any_worker_count() {
    let img = noise(64, 37, 7);
    let single = WorkerPool::new(1).unwrap();
    let many = WorkerPool::new(8).unwrap();

    let a = BlurEngine::new(&img).unwrap().with_pool(&single).process(5);
    let b = BlurEngine::new(&img).unwrap().with_pool(&many).process(5);
    let c = BlurEngine::new(&img).unwrap().process(5);
    assert_eq!(a, b);
    assert_eq!(a, c);
}

#[test]
fn channels_are_blurred_independently() {
    // Alpha varies, colour is black everywhere: colour must stay black.
    let pixels = (0..30u32 * 20)
        .map(|i| pack_argb((i * 37 % 256) as u8, 0, 0, 0))
        .collect();
    let img = PixelBuffer::from_raw(30, 20, pixels).unwrap();
    let out = gaussian_blur(&img, 4).unwrap();
    assert!(out.pixels().iter().all(|&px| px & 0x00FF_FFFF == 0));
}

#[test]
fn blurred_values_stay_within_input_range() {
    let img = noise(40, 25, 3);
    let out = gaussian_blur(&img, 3).unwrap();
    for ch in 0..4 {
        let values = |buf: &PixelBuffer| -> Vec<u8> {
            buf.pixels().iter().map(|&px| unpack_argb(px)[ch]).collect()
        };
        let input = values(&img);
        let lo = *input.iter().min().unwrap();
        let hi = *input.iter().max().unwrap();
        assert!(values(&out).iter().all(|&v| (lo..=hi).contains(&v)));
    }
}

#[test]
fn blur_smooths_a_hard_edge() {
    let pixels = (0..20u32 * 4)
        .map(|i| if i % 20 < 10 { pack_argb(255, 0, 0, 0) } else { pack_argb(255, 255, 255, 255) })
        .collect();
    let img = PixelBuffer::from_raw(20, 4, pixels).unwrap();
    let out = gaussian_blur(&img, 2).unwrap();

    let red = |x: u32| unpack_argb(out.get(x, 1).unwrap())[1];
    assert!(red(9) > 0 && red(10) < 255);
    assert!(red(9) <= red(10));
    assert_eq!(red(0), 0);
    assert_eq!(red(19), 255);
}

#[test]
fn box_plan_reference_values() {
    let plan = BoxPlan::for_sigma(15);
    assert_eq!(plan.widths(), [29, 29, 31]);
    assert_eq!(BoxRadii::for_sigma(15), BoxRadii([14, 14, 15]));
    assert_eq!(BoxRadii::for_sigma(1), BoxRadii([0, 0, 1]));
    assert!(BoxRadii::for_sigma(0).is_identity());
}

#[test]
fn largest_sigma_blurs_small_image_quickly() {
    let uniform = PixelBuffer::filled(8, 8, pack_argb(255, 40, 80, 120));
    assert_eq!(gaussian_blur(&uniform, i32::MAX).unwrap(), uniform);

    let img = noise(8, 5, 11);
    let out = gaussian_blur(&img, i32::MAX).unwrap();
    assert_eq!(out.size(), img.size());
}
