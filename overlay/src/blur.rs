//! Gaussian blur approximation for cutout layers
//!
//! tiny-skia has no filter effects, so the soft edge of the hover cutout is
//! produced here: three successive box blurs whose widths are chosen so the
//! combined variance matches the requested standard deviation. Each box blur
//! is a horizontal then a vertical sliding-window pass. Pixels outside the
//! layer count as fully transparent.
//!
//! The buffer is premultiplied RGBA; averaging every channel independently
//! keeps color ≤ alpha, so the result stays a valid premultiplied pixmap.

use tiny_skia::Pixmap;

const PASSES: usize = 3;

/// Odd box widths approximating a Gaussian with standard deviation `sigma`
pub fn box_sizes(sigma: f32, passes: usize) -> Vec<usize> {
    let n = passes as f32;
    let variance = sigma * sigma;
    let ideal = (12.0 * variance / n + 1.0).sqrt();

    let mut lower = ideal.floor() as i64;
    if lower % 2 == 0 {
        lower -= 1;
    }
    let lower = lower.max(1);
    let upper = lower + 2;

    let l = lower as f32;
    let m_ideal = (12.0 * variance - n * l * l - 4.0 * n * l - 3.0 * n) / (-4.0 * l - 4.0);
    let m = m_ideal.round().max(0.0) as usize;

    (0..passes)
        .map(|i| (if i < m { lower } else { upper }) as usize)
        .collect()
}

/// Blur `pixmap` in place with a Gaussian of standard deviation `sigma`
pub fn gaussian_blur(pixmap: &mut Pixmap, sigma: f32) {
    if sigma.is_nan() || sigma <= 0.0 {
        return;
    }

    let width = pixmap.width() as usize;
    let height = pixmap.height() as usize;
    let data = pixmap.data_mut();
    let mut scratch = vec![0u8; data.len()];

    for size in box_sizes(sigma, PASSES) {
        let radius = (size - 1) / 2;
        if radius == 0 {
            continue;
        }
        blur_horizontal(data, &mut scratch, width, height, radius);
        blur_vertical(&scratch, data, width, height, radius);
    }
}

fn blur_horizontal(src: &[u8], dst: &mut [u8], width: usize, height: usize, radius: usize) {
    let window = (2 * radius + 1) as u32;

    for y in 0..height {
        let row = y * width * 4;
        for c in 0..4 {
            let at = |x: usize| src[row + x * 4 + c] as u32;

            // Window for x = 0 covers [-r, r]; the left half is transparent
            let mut sum: u32 = (0..=radius.min(width - 1)).map(at).sum();
            for x in 0..width {
                dst[row + x * 4 + c] = ((sum + window / 2) / window) as u8;

                let incoming = x + radius + 1;
                if incoming < width {
                    sum += at(incoming);
                }
                if x >= radius {
                    sum -= at(x - radius);
                }
            }
        }
    }
}

fn blur_vertical(src: &[u8], dst: &mut [u8], width: usize, height: usize, radius: usize) {
    let window = (2 * radius + 1) as u32;

    for x in 0..width {
        for c in 0..4 {
            let at = |y: usize| src[(y * width + x) * 4 + c] as u32;

            let mut sum: u32 = (0..=radius.min(height - 1)).map(at).sum();
            for y in 0..height {
                dst[(y * width + x) * 4 + c] = ((sum + window / 2) / window) as u8;

                let incoming = y + radius + 1;
                if incoming < height {
                    sum += at(incoming);
                }
                if y >= radius {
                    sum -= at(y - radius);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tiny_skia::Color;

    fn total_alpha(pixmap: &Pixmap) -> u64 {
        pixmap.pixels().iter().map(|p| p.alpha() as u64).sum()
    }

    #[test]
    fn box_sizes_match_variance() {
        let sizes = box_sizes(10.0, 3);
        assert_eq!(sizes, vec![19, 19, 21]);
        let variance: f32 = sizes.iter().map(|&s| ((s * s - 1) as f32) / 12.0).sum();
        assert!((variance - 100.0).abs() < 5.0);
    }

    #[test]
    fn box_sizes_are_odd_and_positive() {
        for sigma in [0.1, 1.0, 2.5, 16.0, 100.0] {
            for size in box_sizes(sigma, 3) {
                assert!(size >= 1 && size % 2 == 1, "sigma {sigma} gave {size}");
            }
        }
    }

    #[test]
    fn blur_spreads_a_point_symmetrically() {
        let mut pixmap = Pixmap::new(41, 41).unwrap();
        let center = (20 * 41 + 20) * 4;
        pixmap.data_mut()[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);

        gaussian_blur(&mut pixmap, 2.0);

        let a = |x, y| pixmap.pixel(x, y).unwrap().alpha();
        assert!(a(20, 20) < 255);
        assert!(a(20, 20) >= a(22, 20));
        assert_eq!(a(18, 20), a(22, 20));
        assert_eq!(a(20, 18), a(20, 22));
        assert_eq!(a(0, 0), 0);
    }

    #[test]
    fn blur_keeps_uniform_interior_and_roughly_conserves_alpha() {
        let mut pixmap = Pixmap::new(64, 64).unwrap();
        let rect = tiny_skia::Rect::from_xywh(16.0, 16.0, 32.0, 32.0).unwrap();
        let mut paint = tiny_skia::Paint::default();
        paint.set_color(Color::WHITE);
        pixmap.fill_rect(rect, &paint, tiny_skia::Transform::identity(), None);
        let before = total_alpha(&pixmap);

        gaussian_blur(&mut pixmap, 2.0);

        assert_eq!(pixmap.pixel(32, 32).unwrap().alpha(), 255);
        assert!(pixmap.pixel(16, 32).unwrap().alpha() < 255);
        let after = total_alpha(&pixmap);
        let drift = (before as i64 - after as i64).unsigned_abs();
        assert!(drift * 50 < before, "alpha drifted by {drift}");
    }

    #[test]
    fn non_positive_sigma_is_a_no_op() {
        let mut pixmap = Pixmap::new(3, 3).unwrap();
        pixmap.fill(Color::WHITE);
        let before = pixmap.clone();
        gaussian_blur(&mut pixmap, 0.0);
        gaussian_blur(&mut pixmap, f32::NAN);
        assert_eq!(pixmap, before);
    }
}
