//! Image primitives around `imageproc`: a Gaussian-weighted inverted adaptive
//! threshold (`imageproc`'s is mean-based) plus small smoothing, crop and
//! combine helpers.

use crate::geometry::Region;
use image::{GrayImage, ImageBuffer, Luma, RgbImage};

/// Gaussian sigma matching a square smoothing kernel of side `ksize`
/// (the rule used when only a kernel size is given).
#[inline]
pub fn kernel_sigma(ksize: u32) -> f32 {
    0.3 * ((ksize as f32 - 1.0) * 0.5 - 1.0) + 0.8
}

/// Gaussian smoothing; returns a copy when `sigma` is not positive.
pub fn gaussian_smooth(src: &GrayImage, sigma: f32) -> GrayImage {
    if !(sigma > 0.0) || src.width() == 0 || src.height() == 0 {
        return src.clone();
    }
    imageproc::filter::gaussian_blur_f32(src, sigma)
}

/// Copy a region out of an RGB image. Returns `None` for an empty region.
pub fn crop_rgb(src: &RgbImage, region: Region) -> Option<RgbImage> {
    if region.is_empty() || region.x1 > src.width() || region.y1 > src.height() {
        return None;
    }
    Some(
        image::imageops::crop_imm(src, region.x0, region.y0, region.width(), region.height())
            .to_image(),
    )
}

/// Pixel-wise maximum of two binary maps of equal size.
pub fn or_maps(a: &GrayImage, b: &GrayImage) -> GrayImage {
    debug_assert_eq!(a.dimensions(), b.dimensions());
    let mut out = a.clone();
    for (o, &v) in out.iter_mut().zip(b.iter()) {
        *o = (*o).max(v);
    }
    out
}

/// Inverted adaptive threshold against a Gaussian-weighted local mean.
///
/// A pixel becomes 255 when it is not brighter than `local_mean - c`, else 0.
/// The local mean uses the Gaussian sigma of a `block_size` kernel.
pub fn adaptive_threshold_gaussian_inv(src: &GrayImage, block_size: u32, c: f32) -> GrayImage {
    let (w, h) = src.dimensions();
    if w == 0 || h == 0 {
        return src.clone();
    }
    let as_f32: ImageBuffer<Luma<f32>, Vec<f32>> =
        ImageBuffer::from_fn(w, h, |x, y| Luma([src.get_pixel(x, y)[0] as f32]));
    let sigma = kernel_sigma(block_size.max(3));
    let mean = imageproc::filter::gaussian_blur_f32(&as_f32, sigma);

    GrayImage::from_fn(w, h, |x, y| {
        let v = src.get_pixel(x, y)[0] as f32;
        let t = mean.get_pixel(x, y)[0] - c;
        if v > t {
            Luma([0])
        } else {
            Luma([255])
        }
    })
}
