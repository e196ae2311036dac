use image::{Pixel, Rgba, RgbaImage};
use tiny_skia::{Mask, Path, PathBuilder, Rect, Stroke, StrokeDash, Transform};

use super::{Canvas, FillRule, LineCap, Paint, Style};
use crate::gradient::LinearGradient;

// Conversions
//------------------------------------------------------------------------------

impl From<FillRule> for tiny_skia::FillRule {
    fn from(rule: FillRule) -> Self {
        match rule {
            FillRule::NonZero => Self::Winding,
            FillRule::EvenOdd => Self::EvenOdd,
        }
    }
}

impl From<LineCap> for tiny_skia::LineCap {
    fn from(cap: LineCap) -> Self {
        match cap {
            LineCap::Butt => Self::Butt,
            LineCap::Round => Self::Round,
            LineCap::Square => Self::Square,
        }
    }
}

/// Odd patterns repeat twice, as in SVG.
fn dash(pattern: &[f64]) -> Option<StrokeDash> {
    if pattern.is_empty() {
        return None;
    }
    let mut intervals = pattern.iter().map(|d| *d as f32).collect::<Vec<_>>();
    if intervals.len() % 2 == 1 {
        intervals.extend_from_within(..);
    }
    StrokeDash::new(intervals, 0.0)
}

// Raster canvas
//------------------------------------------------------------------------------

/// Paints commands straight into an RGBA buffer.
///
/// Paths are rasterized without anti-aliasing, so axis-aligned cells on integer coordinates fill
/// exactly the pixels they span. Strokes use round joins.
pub struct RasterCanvas<'a> {
    img: &'a mut RgbaImage,
    gradient: Option<&'a LinearGradient>,
    scale: f64,
    offset: (f64, f64),
    path: PathBuilder,
    has_point: bool,
    paint: Paint,
    style: Style,
}

impl<'a> RasterCanvas<'a> {
    pub fn new(img: &'a mut RgbaImage) -> Self {
        Self {
            img,
            gradient: None,
            scale: 1.0,
            offset: (0.0, 0.0),
            path: PathBuilder::new(),
            has_point: false,
            paint: Paint::Solid(Rgba([0, 0, 0, 255])),
            style: Style::default(),
        }
    }

    /// Resolves [`Paint::Gradient`] against `gradient`, spanning the whole drawing area.
    pub fn with_gradient(mut self, gradient: &'a LinearGradient) -> Self {
        self.gradient = Some(gradient);
        self
    }

    /// Maps drawing coordinates onto the buffer as `p * scale + offset`.
    pub fn with_view(mut self, scale: f64, offset: (f64, f64)) -> Self {
        self.scale = scale;
        self.offset = offset;
        self
    }

    fn transform(&self) -> Transform {
        let s = self.scale as f32;
        Transform::from_row(s, 0.0, 0.0, s, self.offset.0 as f32, self.offset.1 as f32)
    }

    fn take_path(&mut self) -> Option<Path> {
        self.has_point = false;
        std::mem::replace(&mut self.path, PathBuilder::new()).finish()
    }

    fn commit(&mut self) {
        self.path = PathBuilder::new();
        self.has_point = false;
        self.style = Style::default();
    }

    fn paint_path(&mut self, path: &Path, rule: FillRule) {
        if self.paint.is_invisible() {
            return;
        }
        let (w, h) = self.img.dimensions();
        let Some(mut mask) = Mask::new(w, h) else {
            return;
        };
        mask.fill_path(path, rule.into(), false, self.transform());

        // Gradient spans the drawing area, which is the buffer minus the view margins
        let line = self.gradient.map(|g| {
            let (dx, dy) = self.offset;
            let extent = ((w as f64 - 2.0 * dx) / self.scale, (h as f64 - 2.0 * dy) / self.scale);
            (g, g.line(extent.0, extent.1))
        });

        for (i, cov) in mask.data().iter().enumerate() {
            if *cov == 0 {
                continue;
            }
            let (x, y) = (i as u32 % w, i as u32 / w);
            let src = match (self.paint, line) {
                (Paint::Solid(c), _) => c,
                (Paint::Gradient { .. }, Some((g, line))) => {
                    let px = (x as f64 + 0.5 - self.offset.0) / self.scale;
                    let py = (y as f64 + 0.5 - self.offset.1) / self.scale;
                    g.color_at(line.t_at(px, py))
                }
                (Paint::Gradient { fallback }, None) => fallback,
            };
            let dst = self.img.get_pixel_mut(x, y);
            if src[3] == 255 {
                *dst = src;
            } else {
                dst.blend(&src);
            }
        }
    }
}

impl Canvas for RasterCanvas<'_> {
    fn move_to(&mut self, x: f64, y: f64) {
        self.path.move_to(x as f32, y as f32);
        self.has_point = true;
    }

    fn line_to(&mut self, x: f64, y: f64) {
        if self.has_point {
            self.path.line_to(x as f32, y as f32);
        } else {
            self.move_to(x, y);
        }
    }

    fn quadratic_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        if self.has_point {
            self.path.quad_to(cx as f32, cy as f32, x as f32, y as f32);
        } else {
            self.move_to(cx, cy);
            self.line_to(x, y);
        }
    }

    fn close_path(&mut self) {
        self.path.close();
    }

    fn draw_circle(&mut self, cx: f64, cy: f64, radius: f64) {
        self.path.push_circle(cx as f32, cy as f32, radius as f32);
        self.has_point = false;
    }

    fn draw_rectangle(&mut self, x: f64, y: f64, w: f64, h: f64) {
        if let Some(rect) = Rect::from_xywh(x as f32, y as f32, w as f32, h as f32) {
            self.path.push_rect(rect);
        }
        self.has_point = false;
    }

    fn set_color(&mut self, paint: Paint) {
        self.paint = paint;
    }

    fn set_line_width(&mut self, width: f64) {
        self.style.line_width = width;
    }

    fn set_dash(&mut self, pattern: &[f64]) {
        self.style.set_dash(pattern);
    }

    fn set_line_cap(&mut self, cap: LineCap) {
        self.style.cap = cap;
    }

    fn new_sub_path(&mut self) {
        self.has_point = false;
    }

    fn set_fill_rule(&mut self, rule: FillRule) {
        self.style.rule = rule;
    }

    fn fill(&mut self) {
        if let Some(path) = self.take_path() {
            let rule = self.style.rule;
            self.paint_path(&path, rule);
        }
        self.commit();
    }

    fn stroke(&mut self) {
        let outline = self.take_path().and_then(|path| {
            let path = match dash(&self.style.dash) {
                Some(d) => path.dash(&d, self.scale as f32)?,
                None => path,
            };
            let stroke = Stroke {
                width: self.style.line_width as f32,
                line_cap: self.style.cap.into(),
                line_join: tiny_skia::LineJoin::Round,
                ..Stroke::default()
            };
            path.stroke(&stroke, self.scale as f32)
        });
        if let Some(outline) = outline {
            self.paint_path(&outline, FillRule::NonZero);
        }
        self.commit();
    }
}
