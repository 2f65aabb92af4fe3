//! Cubic-bezier easing, as in CSS `cubic-bezier(x1, y1, x2, y2)`.

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier {
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
}

/// CSS `ease-in-out`.
pub const EASE_IN_OUT: CubicBezier = CubicBezier::new(0.42, 0.0, 0.58, 1.0);

impl CubicBezier {
    /// `x1` and `x2` must lie in `[0, 1]` so the curve is a function of x.
    pub const fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    #[inline]
    fn coord(t: f64, p1: f64, p2: f64) -> f64 {
        // B(t) with P0 = 0, P3 = 1.
        let u = 1.0 - t;
        3.0 * u * u * t * p1 + 3.0 * u * t * t * p2 + t * t * t
    }

    #[inline]
    fn coord_slope(t: f64, p1: f64, p2: f64) -> f64 {
        let u = 1.0 - t;
        3.0 * u * u * p1 + 6.0 * u * t * (p2 - p1) + 3.0 * t * t * (1.0 - p2)
    }

    /// Solve x(t) = x for t: Newton first, bisection if the slope flattens.
    fn solve_t(&self, x: f64) -> f64 {
        let mut t = x;
        for _ in 0..8 {
            let err = Self::coord(t, self.x1, self.x2) - x;
            if err.abs() < 1e-7 {
                return t;
            }
            let slope = Self::coord_slope(t, self.x1, self.x2);
            if slope.abs() < 1e-6 {
                break;
            }
            t -= err / slope;
        }

        let (mut lo, mut hi) = (0.0, 1.0);
        t = x;
        for _ in 0..40 {
            let v = Self::coord(t, self.x1, self.x2);
            if (v - x).abs() < 1e-7 {
                break;
            }
            if v < x {
                lo = t;
            } else {
                hi = t;
            }
            t = 0.5 * (lo + hi);
        }
        t
    }

    /// Eased value for normalized time `x`, clamped to `[0, 1]` at both ends.
    pub fn ease(&self, x: f64) -> f64 {
        if x.is_nan() || x <= 0.0 {
            return 0.0;
        }
        if x >= 1.0 {
            return 1.0;
        }
        Self::coord(self.solve_t(x), self.y1, self.y2)
    }
}
