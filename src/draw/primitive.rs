use svg::node::element::{Circle, Group, Path, Rectangle};
use svg::Node;

use super::path::{fill_attrs, num, stroke_attrs, PathData};
use super::{Canvas, FillRule, LineCap, Paint, Style};

#[derive(Debug, Clone, Copy)]
enum Primitive {
    Rect(f64, f64, f64, f64),
    Circle(f64, f64, f64),
}

/// Emits `<rect>` and `<circle>` elements for pure primitive paths and falls back to `<path>`
/// once free-form segments, an even-odd rule or a dash pattern are involved.
///
/// Several translucent primitives in one commit also become a single `<path>`, so overlaps blend
/// once as they do on the raster canvas.
pub struct PrimitiveCanvas {
    group: Group,
    prims: Vec<Primitive>,
    data: PathData,
    // Free-form segments since the last commit
    compound: bool,
    paint: Paint,
    style: Style,
    gradient_ref: Option<String>,
    elements: usize,
}

impl Default for PrimitiveCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl PrimitiveCanvas {
    pub fn new() -> Self {
        Self {
            group: Group::new(),
            prims: Vec::new(),
            data: PathData::default(),
            compound: false,
            paint: Paint::Solid(image::Rgba([0, 0, 0, 255])),
            style: Style::default(),
            gradient_ref: None,
            elements: 0,
        }
    }

    pub fn with_gradient_ref(mut self, id: impl Into<String>) -> Self {
        self.gradient_ref = Some(id.into());
        self
    }

    pub fn element_count(&self) -> usize {
        self.elements
    }

    pub fn into_group(self) -> Group {
        self.group
    }

    fn is_native(&self) -> bool {
        let opaque = self.prims.len() <= 1 || self.paint.flat()[3] == 255;
        !self.compound && opaque && self.style.rule == FillRule::NonZero && self.style.dash.is_empty()
    }

    fn push<T: Node>(&mut self, el: T, stroke: bool) {
        let gref = self.gradient_ref.as_deref();
        let el = if stroke {
            stroke_attrs(el, self.paint, &self.style, gref)
        } else {
            fill_attrs(el, self.paint, &self.style, gref)
        };
        self.group.append(el);
        self.elements += 1;
    }

    fn commit(&mut self, stroke: bool) {
        let native = self.is_native();
        let prims = std::mem::take(&mut self.prims);
        let d = self.data.take();

        if !d.is_empty() && !self.paint.is_invisible() {
            if native {
                for p in prims {
                    match p {
                        Primitive::Rect(x, y, w, h) => {
                            let rect = Rectangle::new()
                                .set("x", num(x))
                                .set("y", num(y))
                                .set("width", num(w))
                                .set("height", num(h));
                            self.push(rect, stroke);
                        }
                        Primitive::Circle(cx, cy, r) => {
                            let circle =
                                Circle::new().set("cx", num(cx)).set("cy", num(cy)).set("r", num(r));
                            self.push(circle, stroke);
                        }
                    }
                }
            } else {
                self.push(Path::new().set("d", d), stroke);
            }
        }

        self.compound = false;
        self.style = Style::default();
    }
}

impl Canvas for PrimitiveCanvas {
    fn move_to(&mut self, x: f64, y: f64) {
        self.compound = true;
        self.data.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.compound = true;
        self.data.line_to(x, y);
    }

    fn quadratic_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.compound = true;
        self.data.quadratic_to(cx, cy, x, y);
    }

    fn close_path(&mut self) {
        self.compound = true;
        self.data.close();
    }

    fn draw_circle(&mut self, cx: f64, cy: f64, radius: f64) {
        self.prims.push(Primitive::Circle(cx, cy, radius));
        self.data.circle(cx, cy, radius);
    }

    fn draw_rectangle(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.prims.push(Primitive::Rect(x, y, w, h));
        self.data.rectangle(x, y, w, h);
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

    fn new_sub_path(&mut self) {}

    fn set_fill_rule(&mut self, rule: FillRule) {
        self.style.rule = rule;
    }

    fn fill(&mut self) {
        self.commit(false);
    }

    fn stroke(&mut self) {
        self.commit(true);
    }
}
