use super::{ScaleDetectError, ScaleDetection, ScaleDetectorParams};
use anthro_core::{contour_points_f64, gaussian_smooth, min_area_rect};
use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::geometry::{contour_area, convex_hull};
use imageproc::point::Point;
use log::{debug, warn};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Added to the short side before dividing, so near-degenerate rectangles
/// produce a huge but finite aspect.
const ASPECT_EPS: f64 = 1e-8;

/// Contour-based detector for the reference ruler.
#[derive(Clone, Debug, Default)]
pub struct ScaleDetector {
    params: ScaleDetectorParams,
}

struct Candidate {
    index: usize,
    aspect: f64,
    long_side: f64,
}

impl ScaleDetector {
    pub fn new(params: ScaleDetectorParams) -> Self {
        Self { params }
    }

    #[inline]
    pub fn params(&self) -> &ScaleDetectorParams {
        &self.params
    }

    /// Detect the ruler and return its long side in pixels.
    ///
    /// Candidates are ranked by aspect first and length second, so a thinner
    /// object beats a merely longer one. When nothing qualifies the largest
    /// contour's rectangle is used (if enabled), which keeps a usable, if
    /// coarser, calibration.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, gray), fields(width = gray.width(), height = gray.height()))
    )]
    pub fn detect(&self, gray: &GrayImage) -> Result<ScaleDetection, ScaleDetectError> {
        let (w, h) = gray.dimensions();
        if w == 0 || h == 0 {
            return Err(ScaleDetectError::EmptyImage {
                width: w,
                height: h,
            });
        }
        let p = &self.params;

        let blurred = gaussian_smooth(gray, p.blur_sigma);
        let edges = imageproc::edges::canny(&blurred, p.canny_low, p.canny_high);

        let contours: Vec<_> = find_contours::<i32>(&edges)
            .into_iter()
            .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
            .collect();
        debug!("scale detection: {w}x{h}px, {} outer contours", contours.len());
        if contours.is_empty() {
            return Err(ScaleDetectError::NoContours);
        }

        let max_dim = w.max(h) as f64;
        let min_area = p.min_area_frac * w as f64 * h as f64;
        let min_len = p.min_length_frac * max_dim;
        let max_len = p.max_length_frac * max_dim;

        // Open Canny curves trace back over themselves; the hull area is the
        // extent they span.
        let areas: Vec<f64> = contours
            .iter()
            .map(|c| hull_area(&c.points))
            .collect();
        let outlines: Vec<_> = contours
            .iter()
            .map(|c| contour_points_f64(&c.points))
            .collect();

        let mut candidates = Vec::new();
        for (index, pts) in outlines.iter().enumerate() {
            if areas[index] < min_area {
                continue;
            }
            let Some(rect) = min_area_rect(pts) else {
                continue;
            };
            if rect.short_side <= 0.0 {
                continue;
            }
            let aspect = rect.long_side / (rect.short_side + ASPECT_EPS);
            if aspect > p.min_aspect && rect.long_side > min_len && rect.long_side < max_len {
                debug!(
                    "ruler candidate: length={:.1}px aspect={:.1} area={:.0}",
                    rect.long_side, aspect, areas[index]
                );
                candidates.push(Candidate {
                    index,
                    aspect,
                    long_side: rect.long_side,
                });
            }
        }

        // Stable sort keeps scan order among exact ties.
        candidates.sort_by(|a, b| {
            b.aspect
                .total_cmp(&a.aspect)
                .then(b.long_side.total_cmp(&a.long_side))
        });

        if let Some(best) = candidates.first() {
            let rect = min_area_rect(&outlines[best.index]).ok_or(ScaleDetectError::NoContours)?;
            debug!(
                "selected ruler: {:.1}px (aspect {:.1}) out of {} candidates",
                best.long_side,
                best.aspect,
                candidates.len()
            );
            return Ok(ScaleDetection {
                pixel_length: best.long_side,
                rect,
                aspect: Some(best.aspect),
                fallback_used: false,
                candidates: candidates.len(),
                contours: outlines.len(),
            });
        }

        if !p.fallback_to_largest {
            return Err(ScaleDetectError::NoContours);
        }

        warn!("no ruler-like objects found, using largest contour as fallback");
        let largest = areas
            .iter()
            .enumerate()
            .fold(0usize, |best, (i, &a)| if a > areas[best] { i } else { best });
        let rect = min_area_rect(&outlines[largest]).ok_or(ScaleDetectError::DegenerateFallback)?;
        if rect.long_side <= 0.0 {
            return Err(ScaleDetectError::DegenerateFallback);
        }
        debug!("fallback scale: {:.1}px", rect.long_side);
        Ok(ScaleDetection {
            pixel_length: rect.long_side,
            rect,
            aspect: rect.aspect(),
            fallback_used: true,
            candidates: 0,
            contours: outlines.len(),
        })
    }
}

/// Area of the convex hull of a traced contour.
fn hull_area(points: &[Point<i32>]) -> f64 {
    let mut pts = points.to_vec();
    pts.sort_unstable_by_key(|p| (p.x, p.y));
    pts.dedup();
    contour_area(&convex_hull(pts))
}
