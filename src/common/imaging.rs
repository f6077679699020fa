use image::{GrayImage, Luma};

/// Source pixels (and their weights) that cover one destination pixel.
fn axis_weights(src_len: u32, dst_len: u32) -> Vec<Vec<(usize, f64)>> {
    let scale = f64::from(src_len) / f64::from(dst_len);
    (0..dst_len)
        .map(|d| {
            let start = f64::from(d) * scale;
            let end = start + scale;
            let first = start.floor() as u32;
            let last = (end.ceil() as u32).min(src_len);
            (first..last)
                .filter_map(|s| {
                    let overlap = end.min(f64::from(s + 1)) - start.max(f64::from(s));
                    (overlap > 1e-9).then(|| (s as usize, overlap / scale))
                })
                .collect()
        })
        .collect()
}

/// Area-averaging resize: every destination pixel is the mean of the source
/// area it covers, with fractional coverage at the edges.
pub fn area_resize(src: &GrayImage, width: u32, height: u32) -> GrayImage {
    let (src_w, src_h) = src.dimensions();
    if src_w == 0 || src_h == 0 || width == 0 || height == 0 {
        return GrayImage::new(width, height);
    }
    if (src_w, src_h) == (width, height) {
        return src.clone();
    }

    let xs = axis_weights(src_w, width);
    let ys = axis_weights(src_h, height);
    let raw = src.as_raw();
    let stride = src_w as usize;

    let mut out = GrayImage::new(width, height);
    for (dy, y_weights) in ys.iter().enumerate() {
        for (dx, x_weights) in xs.iter().enumerate() {
            let mut acc = 0.0;
            for &(sy, wy) in y_weights {
                let row = sy * stride;
                for &(sx, wx) in x_weights {
                    acc += f64::from(raw[row + sx]) * wx * wy;
                }
            }
            out.put_pixel(dx as u32, dy as u32, Luma([acc.round().clamp(0.0, 255.0) as u8]));
        }
    }
    out
}
