use anthro_core::{gaussian_smooth, or_maps};
use image::GrayImage;
use imageproc::edges::canny;
use imageproc::filter::bilateral_filter;

use super::WristParams;

/// Combined edge map of the two detection passes.
fn edge_map(gray: &GrayImage, p: &WristParams) -> GrayImage {
    let smoothed = bilateral_filter(
        gray,
        p.bilateral_diameter,
        p.bilateral_sigma_color,
        p.bilateral_sigma_space,
    );
    let primary = canny(&smoothed, p.canny_primary[0], p.canny_primary[1]);
    let blurred = gaussian_smooth(gray, p.smooth_sigma);
    let secondary = canny(&blurred, p.canny_secondary[0], p.canny_secondary[1]);
    or_maps(&primary, &secondary)
}

/// Span between the outermost edge pixels of every profiled row.
///
/// Rows cover the central third of the crop (`h/2 ± h/3`). A row needs at
/// least two edge pixels; spans outside `width_range` are dropped.
pub fn scanline_widths(gray: &GrayImage, p: &WristParams) -> Vec<f64> {
    let (w, h) = gray.dimensions();
    if w < 3 || h < 3 {
        return Vec::new();
    }
    let edges = edge_map(gray, p);

    let center = h / 2;
    let third = h / 3;
    let mut widths = Vec::new();
    for y in ((center - third)..(center + third)).step_by(p.row_step.max(1)) {
        let mut first = None;
        let mut last = 0u32;
        let mut count = 0usize;
        for x in 0..w {
            if edges.get_pixel(x, y)[0] > 0 {
                first.get_or_insert(x);
                last = x;
                count += 1;
            }
        }
        let Some(first) = first else {
            continue;
        };
        if count < 2 {
            continue;
        }
        let width = (last - first) as f64;
        if p.width_ok(width) {
            widths.push(width);
        }
    }
    widths
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn band(w: u32, h: u32, x0: u32, x1: u32) -> GrayImage {
        GrayImage::from_fn(w, h, |x, _| {
            if (x0..x1).contains(&x) {
                Luma([200])
            } else {
                Luma([30])
            }
        })
    }

    #[test]
    fn vertical_band_gives_its_width_on_every_row() {
        let img = band(120, 120, 40, 76);
        let widths = scanline_widths(&img, &WristParams::default());
        // rows 20, 22, .., 98
        assert_eq!(widths.len(), 40);
        for w in widths {
            assert!((w - 36.0).abs() <= 3.0, "{w}");
        }
    }

    #[test]
    fn bilateral_pass_preserves_band_edges() {
        let img = band(32, 8, 16, 32);
        let p = WristParams::default();
        let out = bilateral_filter(
            &img,
            p.bilateral_diameter,
            p.bilateral_sigma_color,
            p.bilateral_sigma_space,
        );
        assert!(out.get_pixel(15, 4)[0] < 70);
        assert!(out.get_pixel(16, 4)[0] > 170);
        assert_eq!(out.get_pixel(2, 4)[0], 30);
    }

    #[test]
    fn uniform_crop_has_no_widths() {
        let img = GrayImage::from_pixel(120, 120, Luma([90]));
        assert!(scanline_widths(&img, &WristParams::default()).is_empty());
    }

    #[test]
    fn too_wide_spans_are_dropped() {
        // Edges near both borders of a 200 px crop: span ~150 px.
        let img = band(200, 60, 25, 175);
        assert!(scanline_widths(&img, &WristParams::default()).is_empty());
    }

    #[test]
    fn tiny_crop_is_ignored() {
        let img = GrayImage::new(2, 40);
        assert!(scanline_widths(&img, &WristParams::default()).is_empty());
    }
}
