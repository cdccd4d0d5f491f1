//! Backend-neutral vector paths.
//!
//! Only lines and cubic Béziers: every backend (Canvas 2D, tiny-skia, PDF
//! content streams) has a direct equivalent for both.

use super::Rect;

/// Control-point distance for approximating a quarter circle with a cubic.
pub const CIRCLE_KAPPA: f64 = 0.552_284_749_8;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PathEl {
    MoveTo(f64, f64),
    LineTo(f64, f64),
    CubicTo(f64, f64, f64, f64, f64, f64),
    Close,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Path {
    els: Vec<PathEl>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn elements(&self) -> &[PathEl] {
        &self.els
    }

    pub fn is_empty(&self) -> bool {
        self.els.is_empty()
    }

    pub fn move_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.els.push(PathEl::MoveTo(x, y));
        self
    }

    pub fn line_to(&mut self, x: f64, y: f64) -> &mut Self {
        self.els.push(PathEl::LineTo(x, y));
        self
    }

    pub fn cubic_to(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, x: f64, y: f64) -> &mut Self {
        self.els.push(PathEl::CubicTo(x1, y1, x2, y2, x, y));
        self
    }

    pub fn close(&mut self) -> &mut Self {
        self.els.push(PathEl::Close);
        self
    }

    /// Append every element of `other`.
    pub fn extend(&mut self, other: &Path) -> &mut Self {
        self.els.extend_from_slice(&other.els);
        self
    }

    /// Circle as four cubic segments, starting at 3 o'clock.
    pub fn circle(cx: f64, cy: f64, r: f64) -> Self {
        let k = r * CIRCLE_KAPPA;
        let mut p = Self::new();
        p.move_to(cx + r, cy)
            .cubic_to(cx + r, cy + k, cx + k, cy + r, cx, cy + r)
            .cubic_to(cx - k, cy + r, cx - r, cy + k, cx - r, cy)
            .cubic_to(cx - r, cy - k, cx - k, cy - r, cx, cy - r)
            .cubic_to(cx + k, cy - r, cx + r, cy - k, cx + r, cy)
            .close();
        p
    }

    pub fn rect(r: Rect) -> Self {
        let mut p = Self::new();
        p.move_to(r.x, r.y)
            .line_to(r.right(), r.y)
            .line_to(r.right(), r.bottom())
            .line_to(r.x, r.bottom())
            .close();
        p
    }

    /// Rectangle with quarter-circle corners of `radius` (clamped to fit).
    pub fn rounded_rect(r: Rect, radius: f64) -> Self {
        let rad = radius.max(0.0).min(r.width / 2.0).min(r.height / 2.0);
        if rad <= 0.0 {
            return Self::rect(r);
        }
        let k = rad * CIRCLE_KAPPA;
        let (x0, y0, x1, y1) = (r.x, r.y, r.right(), r.bottom());
        let mut p = Self::new();
        p.move_to(x0 + rad, y0)
            .line_to(x1 - rad, y0)
            .cubic_to(x1 - rad + k, y0, x1, y0 + rad - k, x1, y0 + rad)
            .line_to(x1, y1 - rad)
            .cubic_to(x1, y1 - rad + k, x1 - rad + k, y1, x1 - rad, y1)
            .line_to(x0 + rad, y1)
            .cubic_to(x0 + rad - k, y1, x0, y1 - rad + k, x0, y1 - rad)
            .line_to(x0, y0 + rad)
            .cubic_to(x0, y0 + rad - k, x0 + rad - k, y0, x0 + rad, y0)
            .close();
        p
    }

    /// Closed polygon through the given points.
    pub fn polygon(points: &[(f64, f64)]) -> Self {
        let mut p = Self::new();
        let mut iter = points.iter();
        if let Some(&(x, y)) = iter.next() {
            p.move_to(x, y);
            for &(x, y) in iter {
                p.line_to(x, y);
            }
            p.close();
        }
        p
    }

    /// Square rotated 45 degrees, `size` from center to each tip.
    pub fn diamond(cx: f64, cy: f64, size: f64) -> Self {
        Self::polygon(&[
            (cx, cy - size),
            (cx + size, cy),
            (cx, cy + size),
            (cx - size, cy),
        ])
    }

    /// Apply a point transform to every coordinate.
    pub fn map(&self, f: impl Fn(f64, f64) -> (f64, f64)) -> Self {
        let els = self
            .els
            .iter()
            .map(|el| match *el {
                PathEl::MoveTo(x, y) => {
                    let (x, y) = f(x, y);
                    PathEl::MoveTo(x, y)
                }
                PathEl::LineTo(x, y) => {
                    let (x, y) = f(x, y);
                    PathEl::LineTo(x, y)
                }
                PathEl::CubicTo(x1, y1, x2, y2, x, y) => {
                    let (x1, y1) = f(x1, y1);
                    let (x2, y2) = f(x2, y2);
                    let (x, y) = f(x, y);
                    PathEl::CubicTo(x1, y1, x2, y2, x, y)
                }
                PathEl::Close => PathEl::Close,
            })
            .collect();
        Self { els }
    }

    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        self.map(|x, y| (x + dx, y + dy))
    }
}
