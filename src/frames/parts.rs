//! Building blocks for recipe frames.
//!
//! Sizes are in units of `p = width * 0.012`, so a recipe scales with the
//! cell. Points are either the four corners or the four cardinal points of
//! the ring at a given inset.

use std::f64::consts::{FRAC_1_SQRT_2, FRAC_PI_2, PI, TAU};

use super::DrawOp;
use crate::color::Rgba;
use crate::compose::{Path, Rect};
use crate::types::CellShape;

const UNIT: f64 = 0.012;
const ARC_SEGMENTS: u32 = 12;

#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    /// Stroked border following the cell shape.
    Ring {
        color: Rgba,
        width: f64,
        inset: f64,
        dash: Option<[f64; 2]>,
    },
    CornerDots {
        color: Rgba,
        radius: f64,
        inset: f64,
    },
    CardinalDots {
        color: Rgba,
        radius: f64,
        inset: f64,
    },
    /// Squares rotated 45 degrees on the cardinal points.
    Diamonds {
        color: Rgba,
        size: f64,
        inset: f64,
    },
    CornerStars {
        color: Rgba,
        size: f64,
        inset: f64,
    },
    CardinalStars {
        color: Rgba,
        size: f64,
        inset: f64,
    },
    /// Triangles on the corner points pointing away from the center.
    CornerSpikes {
        color: Rgba,
        size: f64,
        inset: f64,
    },
    /// `count` triangles spread evenly around the ring.
    Spikes {
        color: Rgba,
        size: f64,
        inset: f64,
        count: u32,
        inward: bool,
    },
    /// Corner brackets (square) or short arcs on the cardinal points (circle).
    /// `length` is a fraction of the cell width.
    Brackets {
        color: Rgba,
        width: f64,
        inset: f64,
        length: f64,
    },
    Ticks {
        color: Rgba,
        width: f64,
        inset: f64,
        count: u32,
    },
}

fn cardinal_points(shape: CellShape, b: Rect, inset: f64) -> [(f64, f64); 4] {
    let (cx, cy) = b.center();
    match shape {
        CellShape::Circle => {
            let r = b.width / 2.0 - inset;
            [(cx, cy - r), (cx + r, cy), (cx, cy + r), (cx - r, cy)]
        }
        CellShape::Square => [
            (cx, b.y + inset),
            (b.right() - inset, cy),
            (cx, b.bottom() - inset),
            (b.x + inset, cy),
        ],
    }
}

fn corner_points(shape: CellShape, b: Rect, inset: f64) -> [(f64, f64); 4] {
    let (cx, cy) = b.center();
    match shape {
        CellShape::Circle => {
            let d = (b.width / 2.0 - inset) * FRAC_1_SQRT_2;
            [
                (cx - d, cy - d),
                (cx + d, cy - d),
                (cx + d, cy + d),
                (cx - d, cy + d),
            ]
        }
        CellShape::Square => [
            (b.x + inset, b.y + inset),
            (b.right() - inset, b.y + inset),
            (b.right() - inset, b.bottom() - inset),
            (b.x + inset, b.bottom() - inset),
        ],
    }
}

/// Where a ray from the center at `angle` meets the inset rectangle.
fn rect_perimeter_from_angle(b: Rect, inset: f64, angle: f64) -> (f64, f64) {
    let (cx, cy) = b.center();
    let hw = b.width / 2.0 - inset;
    let hh = b.height / 2.0 - inset;
    let (sin, cos) = angle.sin_cos();
    let tx = if cos.abs() > f64::EPSILON { hw / cos.abs() } else { f64::INFINITY };
    let ty = if sin.abs() > f64::EPSILON { hh / sin.abs() } else { f64::INFINITY };
    let t = tx.min(ty);
    (cx + cos * t, cy + sin * t)
}

/// Polygon in local coordinates, rotated by `angle` and moved to `origin`.
fn placed_polygon(local: &[(f64, f64)], angle: f64, origin: (f64, f64)) -> Path {
    let (sin, cos) = angle.sin_cos();
    let pts: Vec<(f64, f64)> = local
        .iter()
        .map(|&(x, y)| (origin.0 + x * cos - y * sin, origin.1 + x * sin + y * cos))
        .collect();
    Path::polygon(&pts)
}

fn star(cx: f64, cy: f64, r: f64, points: u32) -> Path {
    let n = points * 2;
    let pts: Vec<(f64, f64)> = (0..n)
        .map(|i| {
            let angle = f64::from(i) * PI / f64::from(points) - FRAC_PI_2;
            let radius = if i % 2 == 0 { r } else { r * 0.4 };
            (cx + angle.cos() * radius, cy + angle.sin() * radius)
        })
        .collect();
    Path::polygon(&pts)
}

fn arc(cx: f64, cy: f64, r: f64, start: f64, end: f64) -> Path {
    let mut p = Path::new();
    for i in 0..=ARC_SEGMENTS {
        let a = start + (end - start) * f64::from(i) / f64::from(ARC_SEGMENTS);
        let (x, y) = (cx + a.cos() * r, cy + a.sin() * r);
        if i == 0 {
            p.move_to(x, y);
        } else {
            p.line_to(x, y);
        }
    }
    p
}

fn line(x1: f64, y1: f64, x2: f64, y2: f64) -> Path {
    let mut p = Path::new();
    p.move_to(x1, y1).line_to(x2, y2);
    p
}

fn fill(path: Path, color: Rgba) -> DrawOp {
    DrawOp::Fill { path, color }
}

fn stroke(path: Path, color: Rgba, width: f64, round_cap: bool) -> DrawOp {
    DrawOp::Stroke {
        path,
        color,
        width,
        dash: None,
        round_cap,
    }
}

/// Border path for the cell shape at `inset` (absolute units).
pub(crate) fn ring_path(shape: CellShape, b: Rect, inset: f64, line_width: f64) -> Path {
    match shape {
        CellShape::Circle => {
            let (cx, cy) = b.center();
            Path::circle(cx, cy, (b.width / 2.0 - inset).max(0.0))
        }
        CellShape::Square => Path::rounded_rect(
            Rect::new(
                b.x + inset,
                b.y + inset,
                (b.width - 2.0 * inset).max(0.0),
                (b.height - 2.0 * inset).max(0.0),
            ),
            (line_width * 0.5).max(1.0),
        ),
    }
}

impl Part {
    pub(crate) fn emit(&self, shape: CellShape, b: Rect, ops: &mut Vec<DrawOp>) {
        let p = b.width * UNIT;
        match *self {
            Self::Ring {
                color,
                width,
                inset,
                dash,
            } => {
                let width = width * p;
                ops.push(DrawOp::Stroke {
                    path: ring_path(shape, b, inset * p, width),
                    color,
                    width,
                    dash: dash.map(|[on, off]| [on * p, off * p]),
                    round_cap: false,
                });
            }
            Self::CornerDots {
                color,
                radius,
                inset,
            } => {
                for (x, y) in corner_points(shape, b, inset * p) {
                    ops.push(fill(Path::circle(x, y, radius * p), color));
                }
            }
            Self::CardinalDots {
                color,
                radius,
                inset,
            } => {
                for (x, y) in cardinal_points(shape, b, inset * p) {
                    ops.push(fill(Path::circle(x, y, radius * p), color));
                }
            }
            Self::Diamonds { color, size, inset } => {
                // A square of side s rotated 45 degrees reaches s/sqrt(2) from its center.
                let tip = size * p * FRAC_1_SQRT_2;
                for (x, y) in cardinal_points(shape, b, inset * p) {
                    ops.push(fill(Path::diamond(x, y, tip), color));
                }
            }
            Self::CornerStars { color, size, inset } => {
                for (x, y) in corner_points(shape, b, inset * p) {
                    ops.push(fill(star(x, y, size * p, 4), color));
                }
            }
            Self::CardinalStars { color, size, inset } => {
                for (x, y) in cardinal_points(shape, b, inset * p) {
                    ops.push(fill(star(x, y, size * p, 4), color));
                }
            }
            Self::CornerSpikes { color, size, inset } => {
                let s = size * p;
                let (cx, cy) = b.center();
                let local = [(-s * 0.5, -s * 0.3), (s * 0.5, 0.0), (-s * 0.5, s * 0.3)];
                for (x, y) in corner_points(shape, b, inset * p) {
                    let angle = (y - cy).atan2(x - cx);
                    ops.push(fill(placed_polygon(&local, angle, (x, y)), color));
                }
            }
            Self::Spikes {
                color,
                size,
                inset,
                count,
                inward,
            } => {
                let s = size * p;
                let dir = if inward { -1.0 } else { 1.0 };
                let local = [(0.0, -s * 0.3), (s * 0.8 * dir, 0.0), (0.0, s * 0.3)];
                let (cx, cy) = b.center();
                let r = b.width / 2.0 - inset * p;
                for i in 0..count {
                    let a = f64::from(i) / f64::from(count) * TAU;
                    let at = match shape {
                        CellShape::Circle => (cx + a.cos() * r, cy + a.sin() * r),
                        CellShape::Square => rect_perimeter_from_angle(b, inset * p, a),
                    };
                    ops.push(fill(placed_polygon(&local, a, at), color));
                }
            }
            Self::Brackets {
                color,
                width,
                inset,
                length,
            } => {
                let (lw, inset, len) = (width * p, inset * p, length * b.width);
                match shape {
                    CellShape::Circle => {
                        let (cx, cy) = b.center();
                        let r = b.width / 2.0 - inset;
                        if r > 0.0 {
                            let half = len / r / 2.0;
                            for k in 0..4 {
                                let a = f64::from(k) * FRAC_PI_2;
                                ops.push(stroke(arc(cx, cy, r, a - half, a + half), color, lw, true));
                            }
                        }
                    }
                    CellShape::Square => {
                        let corners = [
                            (b.x + inset, b.y + inset, 1.0, 1.0),
                            (b.right() - inset, b.y + inset, -1.0, 1.0),
                            (b.right() - inset, b.bottom() - inset, -1.0, -1.0),
                            (b.x + inset, b.bottom() - inset, 1.0, -1.0),
                        ];
                        for (x, y, dx, dy) in corners {
                            let mut path = Path::new();
                            path.move_to(x + dx * len, y)
                                .line_to(x, y)
                                .line_to(x, y + dy * len);
                            ops.push(stroke(path, color, lw, true));
                        }
                    }
                }
            }
            Self::Ticks {
                color,
                width,
                inset,
                count,
            } => {
                let (lw, inset) = (width * p, inset * p);
                let tick = b.width * 0.02;
                match shape {
                    CellShape::Circle => {
                        let (cx, cy) = b.center();
                        let r = b.width / 2.0 - inset;
                        for i in 0..count {
                            let a = f64::from(i) / f64::from(count) * TAU;
                            let (cos, sin) = (a.cos(), a.sin());
                            let path = line(
                                cx + cos * r,
                                cy + sin * r,
                                cx + cos * (r - tick),
                                cy + sin * (r - tick),
                            );
                            ops.push(stroke(path, color, lw, false));
                        }
                    }
                    CellShape::Square => {
                        let per_side = count / 4;
                        if per_side == 0 {
                            return;
                        }
                        let step = (b.width - 2.0 * inset) / f64::from(per_side);
                        let (x0, y0, x1, y1) =
                            (b.x + inset, b.y + inset, b.right() - inset, b.bottom() - inset);
                        for i in 1..per_side {
                            let d = f64::from(i) * step;
                            for path in [
                                line(x0 + d, y0, x0 + d, y0 + tick),
                                line(x1, y0 + d, x1 - tick, y0 + d),
                                line(x0 + d, y1, x0 + d, y1 - tick),
                                line(x0, y0 + d, x0 + tick, y0 + d),
                            ] {
                                ops.push(stroke(path, color, lw, false));
                            }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::unreachable
)]
mod tests {
    use super::*;

    const WHITE: Rgba = Rgba::new(255, 255, 255, 255);

    fn bounds() -> Rect {
        Rect::new(0.0, 0.0, 100.0, 100.0)
    }

    #[test]
    fn dashed_ring_scales_dash_with_cell() {
        let part = Part::Ring {
            color: WHITE,
            width: 2.0,
            inset: 3.0,
            dash: Some([1.5, 2.5]),
        };
        let mut ops = Vec::new();
        part.emit(CellShape::Circle, bounds(), &mut ops);
        match &ops[0] {
            DrawOp::Stroke { dash, width, .. } => {
                let [on, off] = dash.unwrap();
                assert!((on - 1.8).abs() < 1e-9);
                assert!((off - 3.0).abs() < 1e-9);
                assert!((width - 2.4).abs() < 1e-9);
            }
            DrawOp::Fill { .. } => unreachable!(),
        }
    }

    #[test]
    fn corner_points_on_circle_lie_on_ring() {
        let b = bounds();
        for (x, y) in corner_points(CellShape::Circle, b, 10.0) {
            let r = ((x - 50.0).powi(2) + (y - 50.0).powi(2)).sqrt();
            assert!((r - 40.0).abs() < 1e-9);
        }
    }

    #[test]
    fn spikes_emit_one_fill_each() {
        let part = Part::Spikes {
            color: WHITE,
            size: 4.0,
            inset: 2.0,
            count: 14,
            inward: false,
        };
        let mut ops = Vec::new();
        part.emit(CellShape::Square, bounds(), &mut ops);
        assert_eq!(ops.len(), 14);
    }

    #[test]
    fn square_ticks_skip_corners() {
        let part = Part::Ticks {
            color: WHITE,
            width: 1.0,
            inset: 3.0,
            count: 8,
        };
        let mut ops = Vec::new();
        part.emit(CellShape::Square, bounds(), &mut ops);
        // two per side, the first of which sits at the corner and is skipped
        assert_eq!(ops.len(), 4);
    }

    #[test]
    fn perimeter_hit_on_axis() {
        let (x, y) = rect_perimeter_from_angle(bounds(), 10.0, 0.0);
        assert!((x - 90.0).abs() < 1e-9);
        assert!((y - 50.0).abs() < 1e-9);
    }
}
