//! Planar geometry helpers for contours and pixel regions.

use nalgebra::{Point2, Vector2};
use serde::{Deserialize, Serialize};

/// Axis-aligned pixel rectangle `[x0, x1) × [y0, y1)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl Region {
    /// Square of half-size `half` around `(cx, cy)`, clamped to `[0,w]×[0,h]`.
    pub fn centered_clamped(cx: i64, cy: i64, half: i64, width: u32, height: u32) -> Self {
        let clamp = |v: i64, hi: u32| v.clamp(0, hi as i64) as u32;
        Self {
            x0: clamp(cx - half, width),
            y0: clamp(cy - half, height),
            x1: clamp(cx + half, width),
            y1: clamp(cy + half, height),
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }
}

/// Rotated rectangle returned by [`min_area_rect`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RotatedRect {
    pub center: Point2<f64>,
    /// Length of the longer side.
    pub long_side: f64,
    /// Length of the shorter side.
    pub short_side: f64,
    /// Direction of the long side in radians, in `[0, π)`.
    pub angle: f64,
    pub corners: [Point2<f64>; 4],
}

impl RotatedRect {
    /// `long / short`, or `None` for a degenerate rectangle.
    pub fn aspect(&self) -> Option<f64> {
        (self.short_side > 0.0).then(|| self.long_side / self.short_side)
    }

    pub fn area(&self) -> f64 {
        self.long_side * self.short_side
    }
}

/// Zeroth and first-order moments of a closed polygon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PolygonMoments {
    pub m00: f64,
    pub m10: f64,
    pub m01: f64,
}

impl PolygonMoments {
    pub fn centroid(&self) -> Option<Point2<f64>> {
        (self.m00 > 0.0).then(|| Point2::new(self.m10 / self.m00, self.m01 / self.m00))
    }
}

/// Green's-theorem moments of the polygon traced by `points`.
///
/// Orientation is normalized so `m00` is the (non-negative) enclosed area.
pub fn polygon_moments(points: &[Point2<f64>]) -> PolygonMoments {
    let n = points.len();
    if n < 3 {
        return PolygonMoments {
            m00: 0.0,
            m10: 0.0,
            m01: 0.0,
        };
    }
    let mut a = 0.0;
    let mut cx = 0.0;
    let mut cy = 0.0;
    for i in 0..n {
        let p = points[i];
        let q = points[(i + 1) % n];
        let cross = p.x * q.y - q.x * p.y;
        a += cross;
        cx += (p.x + q.x) * cross;
        cy += (p.y + q.y) * cross;
    }
    let sign = if a < 0.0 { -1.0 } else { 1.0 };
    PolygonMoments {
        m00: sign * a / 2.0,
        m10: sign * cx / 6.0,
        m01: sign * cy / 6.0,
    }
}

/// Axis-aligned bounding box in inclusive pixel units: `(x, y, w, h)` where a
/// single pixel has size `1 × 1`.
pub fn bounding_rect(points: &[Point2<i32>]) -> Option<(i32, i32, i32, i32)> {
    let first = points.first()?;
    let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
    for p in &points[1..] {
        min_x = min_x.min(p.x);
        min_y = min_y.min(p.y);
        max_x = max_x.max(p.x);
        max_y = max_y.max(p.y);
    }
    Some((min_x, min_y, max_x - min_x + 1, max_y - min_y + 1))
}

/// Convex hull (counter-clockwise in a y-up frame), monotone chain.
pub fn convex_hull(points: &[Point2<f64>]) -> Vec<Point2<f64>> {
    let mut pts: Vec<Point2<f64>> = points.to_vec();
    pts.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    fn cross(o: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
        (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
    }

    let mut hull: Vec<Point2<f64>> = Vec::with_capacity(pts.len() * 2);
    for p in &pts {
        while hull.len() >= 2 && cross(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0 {
            hull.pop();
        }
        hull.push(*p);
    }
    let lower_len = hull.len() + 1;
    for p in pts.iter().rev().skip(1) {
        while hull.len() >= lower_len
            && cross(&hull[hull.len() - 2], &hull[hull.len() - 1], p) <= 0.0
        {
            hull.pop();
        }
        hull.push(*p);
    }
    hull.pop();
    hull
}

/// Minimum-area enclosing rectangle (rotating calipers over hull edges).
///
/// Returns `None` for an empty point set. One or two distinct points give a
/// zero-width rectangle.
pub fn min_area_rect(points: &[Point2<f64>]) -> Option<RotatedRect> {
    let hull = convex_hull(points);
    match hull.len() {
        0 => None,
        1 => Some(rect_from_axis(&hull, Vector2::new(1.0, 0.0))),
        2 => {
            let d = hull[1] - hull[0];
            let axis = if d.norm() > 0.0 { d.normalize() } else { Vector2::new(1.0, 0.0) };
            Some(rect_from_axis(&hull, axis))
        }
        n => {
            let mut best: Option<RotatedRect> = None;
            for i in 0..n {
                let edge = hull[(i + 1) % n] - hull[i];
                let len = edge.norm();
                if len <= f64::EPSILON {
                    continue;
                }
                let rect = rect_from_axis(&hull, edge / len);
                if best.map(|b| rect.area() < b.area()).unwrap_or(true) {
                    best = Some(rect);
                }
            }
            best
        }
    }
}

/// Extents below this are rounding noise from projecting collinear points.
const SIDE_EPS: f64 = 1e-9;

fn rect_from_axis(hull: &[Point2<f64>], u: Vector2<f64>) -> RotatedRect {
    let v = Vector2::new(-u.y, u.x);
    let (mut min_u, mut max_u) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut min_v, mut max_v) = (f64::INFINITY, f64::NEG_INFINITY);
    for p in hull {
        let pu = p.coords.dot(&u);
        let pv = p.coords.dot(&v);
        min_u = min_u.min(pu);
        max_u = max_u.max(pu);
        min_v = min_v.min(pv);
        max_v = max_v.max(pv);
    }
    let corner = |a: f64, b: f64| Point2::from(u * a + v * b);
    let corners = [
        corner(min_u, min_v),
        corner(max_u, min_v),
        corner(max_u, max_v),
        corner(min_u, max_v),
    ];
    let center = Point2::from(u * (0.5 * (min_u + max_u)) + v * (0.5 * (min_v + max_v)));
    let snap = |d: f64| if d < SIDE_EPS { 0.0 } else { d };
    let du = snap(max_u - min_u);
    let dv = snap(max_v - min_v);
    let (long_side, short_side, long_dir) = if du >= dv { (du, dv, u) } else { (dv, du, v) };
    let angle = long_dir.y.atan2(long_dir.x).rem_euclid(std::f64::consts::PI);
    RotatedRect {
        center,
        long_side,
        short_side,
        angle,
        corners,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rect_points(w: f64, h: f64, theta: f64, c: Point2<f64>) -> Vec<Point2<f64>> {
        let (s, co) = theta.sin_cos();
        [(-w, -h), (w, -h), (w, h), (-w, h)]
            .iter()
            .map(|&(x, y)| {
                let (x, y) = (0.5 * x, 0.5 * y);
                Point2::new(c.x + co * x - s * y, c.y + s * x + co * y)
            })
            .collect()
    }

    #[test]
    fn region_is_clamped_to_image() {
        let r = Region::centered_clamped(5, 95, 20, 100, 100);
        assert_eq!(r, Region { x0: 0, y0: 75, x1: 25, y1: 100 });
        assert_eq!(r.area(), 25 * 25);

        let off = Region::centered_clamped(-50, -50, 10, 100, 100);
        assert!(off.is_empty());
    }

    #[test]
    fn moments_of_axis_aligned_square() {
        let sq = rect_points(10.0, 10.0, 0.0, Point2::new(20.0, 30.0));
        let m = polygon_moments(&sq);
        assert_relative_eq!(m.m00, 100.0, epsilon = 1e-9);
        let c = m.centroid().unwrap();
        assert_relative_eq!(c.x, 20.0, epsilon = 1e-9);
        assert_relative_eq!(c.y, 30.0, epsilon = 1e-9);

        let mut reversed = sq.clone();
        reversed.reverse();
        assert_relative_eq!(polygon_moments(&reversed).m00, 100.0, epsilon = 1e-9);
    }

    #[test]
    fn degenerate_polygon_has_no_centroid() {
        let line = [Point2::new(0.0, 0.0), Point2::new(5.0, 0.0)];
        assert!(polygon_moments(&line).centroid().is_none());
    }

    #[test]
    fn hull_drops_interior_points() {
        let mut pts = rect_points(4.0, 2.0, 0.0, Point2::new(0.0, 0.0));
        pts.push(Point2::new(0.0, 0.0));
        pts.push(Point2::new(1.0, 0.5));
        let hull = convex_hull(&pts);
        assert_eq!(hull.len(), 4);
    }

    #[test]
    fn min_area_rect_recovers_rotated_bar() {
        let theta = 0.6;
        let pts = rect_points(200.0, 10.0, theta, Point2::new(320.0, 240.0));
        let r = min_area_rect(&pts).unwrap();
        assert_relative_eq!(r.long_side, 200.0, epsilon = 1e-6);
        assert_relative_eq!(r.short_side, 10.0, epsilon = 1e-6);
        assert_relative_eq!(r.aspect().unwrap(), 20.0, epsilon = 1e-6);
        assert_relative_eq!(r.angle, theta, epsilon = 1e-6);
        assert_relative_eq!(r.center.x, 320.0, epsilon = 1e-6);
    }

    #[test]
    fn min_area_rect_handles_tiny_inputs() {
        assert!(min_area_rect(&[]).is_none());
        let one = min_area_rect(&[Point2::new(3.0, 4.0)]).unwrap();
        assert_eq!(one.long_side, 0.0);
        assert!(one.aspect().is_none());
        let two = min_area_rect(&[Point2::new(0.0, 0.0), Point2::new(3.0, 4.0)]).unwrap();
        assert_relative_eq!(two.long_side, 5.0, epsilon = 1e-12);
        assert_eq!(two.short_side, 0.0);
        assert!(two.aspect().is_none());
    }

    #[test]
    fn collinear_points_give_degenerate_rect() {
        let pts: Vec<_> = (0..7)
            .map(|i| Point2::new(1.0 + 3.0 * i as f64, 2.0 + 4.0 * i as f64))
            .collect();
        let r = min_area_rect(&pts).unwrap();
        assert_relative_eq!(r.long_side, 30.0, epsilon = 1e-9);
        assert_eq!(r.short_side, 0.0);
        assert!(r.aspect().is_none());
    }

    #[test]
    fn bounding_rect_counts_pixels_inclusively() {
        let pts = [Point2::new(2, 3), Point2::new(6, 3), Point2::new(4, 9)];
        assert_eq!(bounding_rect(&pts), Some((2, 3, 5, 7)));
        assert_eq!(bounding_rect(&[]), None);
    }
}
