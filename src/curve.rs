//! Shaping functions that map normalised progress to eased progress.
//!
//! Every curve maps `[0, 1]` onto `[0, 1]`, is monotonic, and fixes both
//! endpoints, so an animation always starts at its start value and lands
//! exactly on its target.

use serde::{Deserialize, Serialize};

/// A monotonic easing curve.
///
/// On the wire (config files) curves are written as externally tagged JSON:
/// `"Linear"`, `"Ease"`, `"EaseOutCubic"` or
/// `{"CubicBezier": [0.25, 0.1, 0.25, 1.0]}`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Curve {
    /// Identity: progress is used unchanged.
    #[default]
    Linear,
    /// CSS `ease`, i.e. `cubic-bezier(0.25, 0.1, 0.25, 1.0)`.
    Ease,
    /// `1 - (1 - t)^3`.
    EaseOutCubic,
    /// CSS-like cubic Bézier with control points (0,0), (x1,y1), (x2,y2), (1,1).
    CubicBezier([f32; 4]),
}

impl Curve {
    /// Map normalised progress `t` to eased progress.
    ///
    /// `t` is clamped to `[0, 1]` first.
    pub fn apply(&self, t: f32) -> f32 {
        let t = clamp01(t);
        match *self {
            Curve::Linear => t,
            Curve::Ease => cubic_bezier(t, 0.25, 0.10, 0.25, 1.00),
            Curve::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Curve::CubicBezier([x1, y1, x2, y2]) => cubic_bezier(t, x1, y1, x2, y2),
        }
    }
}

fn clamp01(x: f32) -> f32 {
    x.max(0.0).min(1.0)
}

/// Evaluate a cubic Bézier easing at normalised time `u`.
///
/// Solves `x(t) = u` for the curve parameter, then returns `y(t)`.
fn cubic_bezier(u: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    // B(t) = ((a*t + b)*t + c)*t with endpoints fixed at (0,0) and (1,1).
    let cx = 3.0 * x1;
    let bx = 3.0 * (x2 - x1) - cx;
    let ax = 1.0 - cx - bx;

    let cy = 3.0 * y1;
    let by = 3.0 * (y2 - y1) - cy;
    let ay = 1.0 - cy - by;

    #[inline]
    fn sample_curve(a: f32, b: f32, c: f32, t: f32) -> f32 {
        ((a * t + b) * t + c) * t
    }

    fn solve_t_for_x(u: f32, ax: f32, bx: f32, cx: f32) -> f32 {
        // Newton-Raphson
        let mut t = u;
        for _ in 0..8 {
            let x = sample_curve(ax, bx, cx, t) - u;
            if x.abs() < 1e-6 {
                return t;
            }
            let dx = (3.0 * ax * t + 2.0 * bx) * t + cx;
            if dx.abs() < 1e-6 {
                break;
            }
            t -= x / dx;
            if !(0.0..=1.0).contains(&t) {
                break;
            }
        }

        // Bisection fallback
        let mut lo = 0.0;
        let mut hi = 1.0;
        t = u;
        for _ in 0..24 {
            let x = sample_curve(ax, bx, cx, t);
            if (x - u).abs() < 1e-7 {
                return t;
            }
            if x < u {
                lo = t;
            } else {
                hi = t;
            }
            t = 0.5 * (lo + hi);
        }
        t
    }

    // Exact endpoints regardless of solver precision.
    if u <= 0.0 {
        return 0.0;
    }
    if u >= 1.0 {
        return 1.0;
    }
    let t = solve_t_for_x(u, ax, bx, cx);
    sample_curve(ay, by, cy, t)
}
