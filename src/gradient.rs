use image::Rgba;

// Linear gradient
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Clone, Copy)]
pub struct ColorStop {
    pub t: f64,
    pub color: Rgba<u8>,
}

impl ColorStop {
    pub fn new(t: f64, color: Rgba<u8>) -> Self {
        Self { t, color }
    }
}

/// Linear gradient across the whole canvas.
///
/// `angle` is in degrees: 0 points right and angles grow counter-clockwise, so 90 points up on a
/// top-down pixel grid. Stops are clamped into `[0, 1]` and kept in non-decreasing order.
#[derive(Debug, PartialEq, Clone)]
pub struct LinearGradient {
    angle: f64,
    stops: Vec<ColorStop>,
}

impl LinearGradient {
    pub fn new(angle: f64, stops: impl IntoIterator<Item = ColorStop>) -> Self {
        let mut stops = stops
            .into_iter()
            .map(|s| ColorStop { t: if s.t.is_nan() { 0.0 } else { s.t.clamp(0.0, 1.0) }, ..s })
            .collect::<Vec<_>>();
        stops.sort_by(|a, b| a.t.total_cmp(&b.t));
        Self { angle, stops }
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn stops(&self) -> &[ColorStop] {
        &self.stops
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn line(&self, w: f64, h: f64) -> GradientLine {
        GradientLine::project(self.angle, w, h)
    }

    /// Colour at position `t` along the gradient line. Transparent if there are no stops.
    pub fn color_at(&self, t: f64) -> Rgba<u8> {
        let (first, last) = match (self.stops.first(), self.stops.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return Rgba([0, 0, 0, 0]),
        };
        if t <= first.t {
            return first.color;
        }
        if t >= last.t {
            return last.color;
        }

        let i = self.stops.partition_point(|s| s.t <= t);
        let (a, b) = (&self.stops[i - 1], &self.stops[i]);
        let span = b.t - a.t;
        let f = if span > 0.0 { (t - a.t) / span } else { 1.0 };
        let mut res = [0u8; 4];
        for (k, px) in res.iter_mut().enumerate() {
            let (ca, cb) = (a.color[k] as f64, b.color[k] as f64);
            *px = (ca + (cb - ca) * f).round().clamp(0.0, 255.0) as u8;
        }
        Rgba(res)
    }
}


// Gradient line
//------------------------------------------------------------------------------

/// Endpoints of a gradient line spanning a `w x h` rectangle anchored at the origin.
#[derive(Debug, PartialEq, Clone, Copy)]
pub struct GradientLine {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl GradientLine {
    /// Projects the rectangle corners onto the gradient direction and centres the line so it
    /// covers exactly the projected extent.
    pub fn project(angle: f64, w: f64, h: f64) -> Self {
        let rad = angle.to_radians();
        let (dx, dy) = (rad.cos(), -rad.sin());

        let corners = [(0.0, 0.0), (0.0, h), (w, 0.0), (w, h)];
        let (mut min_proj, mut max_proj) = (f64::INFINITY, f64::NEG_INFINITY);
        for (x, y) in corners {
            let proj = x * dx + y * dy;
            min_proj = min_proj.min(proj);
            max_proj = max_proj.max(proj);
        }

        let (cx, cy) = (w / 2.0, h / 2.0);
        let half = (max_proj - min_proj) / 2.0;
        Self { x1: cx - half * dx, y1: cy - half * dy, x2: cx + half * dx, y2: cy + half * dy }
    }

    /// Position of `(x, y)` along the line, 0 at the start and 1 at the end. Not clamped.
    pub fn t_at(&self, x: f64, y: f64) -> f64 {
        let (vx, vy) = (self.x2 - self.x1, self.y2 - self.y1);
        let len_sq = vx * vx + vy * vy;
        if len_sq == 0.0 {
            return 0.0;
        }
        ((x - self.x1) * vx + (y - self.y1) * vy) / len_sq
    }
}

#[cfg(test)]
mod projection_tests {
    use test_case::test_case;

    use super::GradientLine;

    const EPS: f64 = 1e-9;

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < EPS, "{a} != {b}");
    }

    #[test_case(100.0, 40.0)]
    #[test_case(30.0, 30.0)]
    fn test_horizontal(w: f64, h: f64) {
        let l = GradientLine::project(0.0, w, h);
        assert_close(l.x1, w / 2.0 - w / 2.0);
        assert_close(l.x2, w / 2.0 + w / 2.0);
        assert_close(l.y1, h / 2.0);
        assert_close(l.y2, h / 2.0);
    }

    #[test_case(100.0, 40.0)]
    #[test_case(30.0, 30.0)]
    fn test_vertical(w: f64, h: f64) {
        let l = GradientLine::project(90.0, w, h);
        assert_close(l.x1, w / 2.0);
        assert_close(l.x2, w / 2.0);
        // 90 degrees points up, so the line starts at the bottom edge
        assert_close(l.y1, h);
        assert_close(l.y2, 0.0);
    }

    #[test]
    fn test_diagonal_spans_corners() {
        let l = GradientLine::project(45.0, 100.0, 100.0);
        // Bottom-left corner projects to 0, top-right to 1
        assert_close(l.t_at(0.0, 100.0), 0.0);
        assert_close(l.t_at(100.0, 0.0), 1.0);
        assert_close(l.t_at(50.0, 50.0), 0.5);
    }

    #[test]
    fn test_endpoints_symmetric_about_center() {
        for angle in [0.0, 17.0, 45.0, 135.0, 200.0, 333.0] {
            let l = GradientLine::project(angle, 64.0, 48.0);
            assert_close((l.x1 + l.x2) / 2.0, 32.0);
            assert_close((l.y1 + l.y2) / 2.0, 24.0);
        }
    }
}
