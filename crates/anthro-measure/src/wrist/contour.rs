use anthro_core::{
    adaptive_threshold_gaussian_inv, bounding_rect, contour_points_f64, contour_points_i32,
    polygon_moments,
};
use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};

use super::WristParams;

/// Width of the dark blob nearest the crop's vertical centre line.
///
/// The crop is binarized with an inverted Gaussian adaptive threshold; outer
/// contours of plausible area whose centroid lies near the centre line compete
/// and the closest one wins. Its width is the shorter side of the axis-aligned
/// bounding box.
pub fn contour_width(gray: &GrayImage, p: &WristParams) -> Option<f64> {
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return None;
    }
    let binary = adaptive_threshold_gaussian_inv(gray, p.threshold_block, p.threshold_c);

    let crop_area = w as f64 * h as f64;
    let max_area = p.contour_max_area_frac * crop_area;
    let mid_x = w as f64 / 2.0;
    let max_offset = p.centroid_max_offset_frac * w as f64;

    let mut best: Option<(f64, Vec<imageproc::point::Point<i32>>)> = None;
    for c in find_contours::<i32>(&binary) {
        if c.border_type != BorderType::Outer || c.parent.is_some() {
            continue;
        }
        let m = polygon_moments(&contour_points_f64(&c.points));
        if m.m00 < p.contour_min_area || m.m00 > max_area {
            continue;
        }
        let Some(centroid) = m.centroid() else {
            continue;
        };
        let offset = (centroid.x - mid_x).abs();
        if offset >= max_offset {
            continue;
        }
        if best.as_ref().map_or(true, |(d, _)| offset < *d) {
            best = Some((offset, c.points));
        }
    }

    let (_, points) = best?;
    let (_, _, bw, bh) = bounding_rect(&contour_points_i32(&points))?;
    let width = bw.min(bh) as f64;
    p.width_ok(width).then_some(width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    fn ellipse(w: u32, h: u32, cx: f64, cy: f64, rx: f64, ry: f64) -> GrayImage {
        GrayImage::from_fn(w, h, |x, y| {
            let u = (x as f64 - cx) / rx;
            let v = (y as f64 - cy) / ry;
            if u * u + v * v <= 1.0 {
                Luma([40])
            } else {
                Luma([200])
            }
        })
    }

    #[test]
    fn centred_dark_blob_gives_its_short_side() {
        let img = ellipse(120, 120, 60.0, 60.0, 15.0, 30.0);
        let width = contour_width(&img, &WristParams::default()).expect("blob");
        assert!((width - 31.0).abs() <= 4.0, "{width}");
    }

    #[test]
    fn off_centre_blob_is_rejected() {
        let img = ellipse(120, 120, 8.0, 60.0, 6.0, 30.0);
        assert_eq!(contour_width(&img, &WristParams::default()), None);
    }

    #[test]
    fn nearest_blob_to_centre_wins() {
        let mut img = ellipse(160, 120, 70.0, 60.0, 10.0, 30.0);
        for (x, y, p) in ellipse(160, 120, 110.0, 60.0, 20.0, 30.0).enumerate_pixels() {
            if p[0] < 100 {
                img.put_pixel(x, y, *p);
            }
        }
        let width = contour_width(&img, &WristParams::default()).expect("blob");
        assert!(width < 26.0, "{width}");
    }

    #[test]
    fn uniform_crop_has_no_blob() {
        let img = GrayImage::from_pixel(80, 80, Luma([128]));
        assert_eq!(contour_width(&img, &WristParams::default()), None);
    }
}
