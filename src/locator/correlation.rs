//! Zero-mean normalized cross-correlation between a template and every
//! placement inside a larger grayscale image. A score of 1.0 is an exact
//! match up to brightness and contrast; flat windows score 0.

use image::GrayImage;

use crate::common::imaging::area_resize;

const EPSILON: f64 = 1e-6;
/// Below this many placements a full-resolution scan is cheap enough.
const DIRECT_SEARCH_POSITIONS: u64 = 4096;
/// Smallest template side worth matching at a reduced scale.
const MIN_PYRAMID_SIDE: u32 = 4;
/// Coarse peaks refined at full resolution before falling back to a full scan.
const COARSE_CANDIDATES: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Correlation {
    pub x: u32,
    pub y: u32,
    pub score: f32,
}

/// Summed-area tables for the window sums needed by the denominator.
struct WindowSums {
    stride: usize,
    sum: Vec<f64>,
    sum_sq: Vec<f64>,
}

impl WindowSums {
    fn new(image: &GrayImage) -> Self {
        let (w, h) = (image.width() as usize, image.height() as usize);
        let stride = w + 1;
        let mut sum = vec![0.0; stride * (h + 1)];
        let mut sum_sq = vec![0.0; stride * (h + 1)];
        let raw = image.as_raw();
        for y in 0..h {
            let mut row = 0.0;
            let mut row_sq = 0.0;
            for x in 0..w {
                let v = f64::from(raw[y * w + x]);
                row += v;
                row_sq += v * v;
                sum[(y + 1) * stride + x + 1] = sum[y * stride + x + 1] + row;
                sum_sq[(y + 1) * stride + x + 1] = sum_sq[y * stride + x + 1] + row_sq;
            }
        }
        Self {
            stride,
            sum,
            sum_sq,
        }
    }

    fn window(&self, x: usize, y: usize, w: usize, h: usize) -> (f64, f64) {
        let s = self.stride;
        let area = |t: &[f64]| t[(y + h) * s + x + w] - t[(y + h) * s + x] - t[y * s + x + w] + t[y * s + x];
        (area(&self.sum), area(&self.sum_sq))
    }
}

struct ZeroMeanTemplate {
    width: usize,
    height: usize,
    values: Vec<f64>,
    norm_sq: f64,
}

impl ZeroMeanTemplate {
    fn new(template: &GrayImage) -> Option<Self> {
        let raw = template.as_raw();
        if raw.is_empty() {
            return None;
        }
        let mean = raw.iter().map(|&v| f64::from(v)).sum::<f64>() / raw.len() as f64;
        let values: Vec<f64> = raw.iter().map(|&v| f64::from(v) - mean).collect();
        let norm_sq = values.iter().map(|v| v * v).sum::<f64>();
        if norm_sq < EPSILON {
            return None;
        }
        Some(Self {
            width: template.width() as usize,
            height: template.height() as usize,
            values,
            norm_sq,
        })
    }
}

/// Whether a template has enough contrast to ever produce a score.
pub fn has_contrast(template: &GrayImage) -> bool {
    ZeroMeanTemplate::new(template).is_some()
}

fn score_at(
    haystack: &GrayImage,
    sums: &WindowSums,
    template: &ZeroMeanTemplate,
    x: usize,
    y: usize,
) -> f32 {
    let n = (template.width * template.height) as f64;
    let (sum, sum_sq) = sums.window(x, y, template.width, template.height);
    let variance = sum_sq - sum * sum / n;
    if variance <= EPSILON {
        return 0.0;
    }

    let raw = haystack.as_raw();
    let stride = haystack.width() as usize;
    let mut cross = 0.0;
    for j in 0..template.height {
        let row = &raw[(y + j) * stride + x..(y + j) * stride + x + template.width];
        let t_row = &template.values[j * template.width..(j + 1) * template.width];
        cross += row
            .iter()
            .zip(t_row)
            .map(|(&v, &t)| f64::from(v) * t)
            .sum::<f64>();
    }
    (cross / (template.norm_sq * variance).sqrt()).clamp(-1.0, 1.0) as f32
}

/// Best placement with `x` in `xs` and `y` in `ys` (inclusive). Ties keep the
/// first placement in row-major order.
fn scan(
    haystack: &GrayImage,
    sums: &WindowSums,
    template: &ZeroMeanTemplate,
    xs: (usize, usize),
    ys: (usize, usize),
) -> Option<Correlation> {
    let mut best: Option<Correlation> = None;
    for y in ys.0..=ys.1 {
        for x in xs.0..=xs.1 {
            let score = score_at(haystack, sums, template, x, y);
            if best.is_none_or(|b| score > b.score) {
                best = Some(Correlation {
                    x: x as u32,
                    y: y as u32,
                    score,
                });
            }
        }
    }
    best
}

/// Up to `limit` local peaks, best first. A peak suppresses every weaker
/// placement closer than `spacing` on both axes.
fn peaks(
    haystack: &GrayImage,
    template: &ZeroMeanTemplate,
    limit: usize,
    spacing: u32,
) -> Vec<Correlation> {
    let sums = WindowSums::new(haystack);
    let max_x = haystack.width() as usize - template.width;
    let max_y = haystack.height() as usize - template.height;
    let mut all = Vec::with_capacity((max_x + 1) * (max_y + 1));
    for y in 0..=max_y {
        for x in 0..=max_x {
            let score = score_at(haystack, &sums, template, x, y);
            if score > 0.0 {
                all.push(Correlation {
                    x: x as u32,
                    y: y as u32,
                    score,
                });
            }
        }
    }
    all.sort_by(|a, b| b.score.total_cmp(&a.score));

    let mut kept: Vec<Correlation> = Vec::with_capacity(limit);
    for candidate in all {
        if kept.len() == limit {
            break;
        }
        let near = kept
            .iter()
            .any(|k| k.x.abs_diff(candidate.x) < spacing && k.y.abs_diff(candidate.y) < spacing);
        if !near {
            kept.push(candidate);
        }
    }
    kept
}

fn fits(haystack: &GrayImage, needle: &GrayImage) -> bool {
    needle.width() > 0
        && needle.height() > 0
        && needle.width() <= haystack.width()
        && needle.height() <= haystack.height()
}

/// Exhaustive full-resolution search.
pub fn best_match(haystack: &GrayImage, needle: &GrayImage) -> Option<Correlation> {
    if !fits(haystack, needle) {
        return None;
    }
    let template = ZeroMeanTemplate::new(needle)?;
    let sums = WindowSums::new(haystack);
    scan(
        haystack,
        &sums,
        &template,
        (0, (haystack.width() - needle.width()) as usize),
        (0, (haystack.height() - needle.height()) as usize),
    )
}

/// Ranks placements at `1/scale` resolution, then re-scores the
/// neighbourhood of the strongest few at full resolution. When none of them
/// reaches `accept`, the whole image is searched at full resolution, so a
/// look-alike that wins the coarse pass cannot hide a real match. The
/// returned score is always a full-resolution score.
pub fn best_match_coarse_to_fine(
    haystack: &GrayImage,
    needle: &GrayImage,
    scale: u32,
    accept: f32,
) -> Option<Correlation> {
    if !fits(haystack, needle) {
        return None;
    }
    let (hw, hh) = haystack.dimensions();
    let (nw, nh) = needle.dimensions();
    let positions = u64::from(hw - nw + 1) * u64::from(hh - nh + 1);
    if scale <= 1
        || positions <= DIRECT_SEARCH_POSITIONS
        || nw / scale < MIN_PYRAMID_SIDE
        || nh / scale < MIN_PYRAMID_SIDE
    {
        return best_match(haystack, needle);
    }

    let template = ZeroMeanTemplate::new(needle)?;
    let small_haystack = area_resize(haystack, hw / scale, hh / scale);
    let small_needle = area_resize(needle, nw / scale, nh / scale);
    let candidates = match ZeroMeanTemplate::new(&small_needle) {
        Some(small) => peaks(
            &small_haystack,
            &small,
            COARSE_CANDIDATES,
            (small_needle.width().min(small_needle.height()) / 2).max(1),
        ),
        None => Vec::new(),
    };

    let fx = f64::from(hw) / f64::from(small_haystack.width());
    let fy = f64::from(hh) / f64::from(small_haystack.height());
    let rx = fx.ceil() as i64 + 1;
    let ry = fy.ceil() as i64 + 1;
    let max_x = i64::from(hw - nw);
    let max_y = i64::from(hh - nh);

    let sums = WindowSums::new(haystack);
    let mut best: Option<Correlation> = None;
    for coarse in &candidates {
        let cx = (f64::from(coarse.x) * fx).round() as i64;
        let cy = (f64::from(coarse.y) * fy).round() as i64;
        let refined = scan(
            haystack,
            &sums,
            &template,
            ((cx - rx).clamp(0, max_x) as usize, (cx + rx).clamp(0, max_x) as usize),
            ((cy - ry).clamp(0, max_y) as usize, (cy + ry).clamp(0, max_y) as usize),
        );
        if let Some(refined) = refined {
            if best.is_none_or(|b| refined.score > b.score) {
                best = Some(refined);
            }
        }
    }

    match best {
        Some(found) if found.score >= accept => Some(found),
        _ => scan(
            haystack,
            &sums,
            &template,
            (0, max_x as usize),
            (0, max_y as usize),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{checker_template, paste, triangle_template};
    use image::Luma;

    #[test]
    fn exact_placement_scores_one() {
        let needle = checker_template();
        let mut haystack = GrayImage::from_pixel(120, 80, Luma([255]));
        paste(&mut haystack, &needle, 40, 24);

        let found = best_match(&haystack, &needle).unwrap();
        assert_eq!((found.x, found.y), (40, 24));
        assert!(found.score > 0.999);
    }

    #[test]
    fn brightness_shift_still_matches() {
        let needle = checker_template();
        let shifted = GrayImage::from_fn(needle.width(), needle.height(), |x, y| {
            Luma([needle.get_pixel(x, y)[0] / 2 + 60])
        });
        let mut haystack = GrayImage::from_pixel(64, 64, Luma([200]));
        paste(&mut haystack, &shifted, 8, 16);

        let found = best_match(&haystack, &needle).unwrap();
        assert_eq!((found.x, found.y), (8, 16));
        assert!(found.score > 0.999);
    }

    #[test]
    fn flat_background_does_not_match() {
        let haystack = GrayImage::from_pixel(32, 32, Luma([255]));
        let found = best_match(&haystack, &checker_template()).unwrap();
        assert_eq!(found.score, 0.0);
    }

    #[test]
    fn different_template_scores_low() {
        let mut haystack = GrayImage::from_pixel(96, 96, Luma([255]));
        paste(&mut haystack, &triangle_template(), 32, 32);

        let found = best_match(&haystack, &checker_template()).unwrap();
        assert!(found.score < 0.8, "score was {}", found.score);
    }

    #[test]
    fn flat_or_oversized_templates_are_rejected() {
        let haystack = GrayImage::from_pixel(16, 16, Luma([0]));
        assert!(best_match(&haystack, &GrayImage::from_pixel(4, 4, Luma([9]))).is_none());
        assert!(best_match(&haystack, &checker_template()).is_none());
        assert!(!has_contrast(&GrayImage::from_pixel(4, 4, Luma([9]))));
        assert!(has_contrast(&checker_template()));
    }

    #[test]
    fn coarse_to_fine_agrees_with_exhaustive_search() {
        let needle = triangle_template();
        let mut haystack = GrayImage::from_pixel(400, 240, Luma([255]));
        paste(&mut haystack, &checker_template(), 40, 40);
        paste(&mut haystack, &needle, 284, 152);

        let coarse = best_match_coarse_to_fine(&haystack, &needle, 4, 0.8).unwrap();
        assert_eq!((coarse.x, coarse.y), (284, 152));
        assert!(coarse.score > 0.999);
    }

    #[test]
    fn coarse_to_fine_handles_unaligned_placement() {
        let needle = checker_template();
        let mut haystack = GrayImage::from_pixel(400, 240, Luma([255]));
        paste(&mut haystack, &needle, 133, 71);

        let found = best_match_coarse_to_fine(&haystack, &needle, 4, 0.8).unwrap();
        assert_eq!((found.x, found.y), (133, 71));
        assert!(found.score > 0.999);
    }

    fn ring(stroke: f32, ink: u8) -> GrayImage {
        GrayImage::from_fn(32, 32, |x, y| {
            let dx = x as f32 - 15.5;
            let dy = y as f32 - 15.5;
            let distance = (dx * dx + dy * dy).sqrt();
            if (distance - 12.0).abs() <= stroke / 2.0 {
                Luma([ink])
            } else {
                Luma([247])
            }
        })
    }

    #[test]
    fn look_alike_winning_coarse_pass_does_not_hide_real_match() {
        let needle = ring(1.0, 200);
        let mut haystack = GrayImage::from_pixel(1000, 400, Luma([247]));
        paste(&mut haystack, &ring(3.0, 225), 120, 60);
        paste(&mut haystack, &needle, 481, 137);

        let found = best_match_coarse_to_fine(&haystack, &needle, 4, 0.8).unwrap();
        assert_eq!((found.x, found.y), (481, 137));
        assert!(found.score > 0.999, "score was {}", found.score);
    }

    #[test]
    fn crowded_screen_falls_back_to_full_scan() {
        let needle = ring(1.0, 200);
        let mut haystack = GrayImage::from_pixel(1000, 400, Luma([247]));
        for i in 0..12 {
            paste(&mut haystack, &ring(3.0, 225), 40 + i * 70, 40);
            paste(&mut haystack, &ring(3.0, 225), 40 + i * 70, 300);
        }
        paste(&mut haystack, &needle, 481, 171);

        let found = best_match_coarse_to_fine(&haystack, &needle, 4, 0.8).unwrap();
        assert_eq!((found.x, found.y), (481, 171));
        assert!(found.score > 0.999);
    }
}
