use svg::node::element::{Group, Path};
use svg::Node;

use super::{Canvas, FillRule, LineCap, Paint, Style};
use crate::common::color::to_hex;

// Number formatting
//------------------------------------------------------------------------------

/// Two decimals at most, trailing zeros trimmed.
pub(crate) fn num(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    match s {
        "-0" | "" => "0".to_string(),
        _ => s.to_string(),
    }
}


// Path data
//------------------------------------------------------------------------------

/// Accumulates SVG path tokens between commits.
#[derive(Debug, Default, Clone)]
pub(crate) struct PathData {
    tokens: Vec<String>,
}

impl PathData {
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn move_to(&mut self, x: f64, y: f64) {
        self.tokens.push(format!("M{} {}", num(x), num(y)));
    }

    pub fn line_to(&mut self, x: f64, y: f64) {
        self.tokens.push(format!("L{} {}", num(x), num(y)));
    }

    pub fn quadratic_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.tokens.push(format!("Q{} {} {} {}", num(cx), num(cy), num(x), num(y)));
    }

    pub fn close(&mut self) {
        self.tokens.push("Z".to_string());
    }

    /// Two half-circle arcs, closed.
    pub fn circle(&mut self, cx: f64, cy: f64, r: f64) {
        let (rs, right, left, y) = (num(r), num(cx + r), num(cx - r), num(cy));
        self.tokens.push(format!(
            "M{right} {y} A{rs} {rs} 0 1 1 {left} {y} A{rs} {rs} 0 1 1 {right} {y} Z"
        ));
    }

    /// Four corners, closed.
    pub fn rectangle(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let (x0, y0, x1, y1) = (num(x), num(y), num(x + w), num(y + h));
        self.tokens.push(format!("M{x0} {y0} L{x1} {y0} L{x1} {y1} L{x0} {y1} Z"));
    }

    pub fn take(&mut self) -> String {
        let d = self.tokens.join(" ");
        self.tokens.clear();
        d
    }
}

// Style attributes
//------------------------------------------------------------------------------

/// Paint as an SVG attribute value. `None` means the enclosing gradient group supplies it.
pub(crate) fn paint_value(paint: Paint, gradient_ref: Option<&str>, is_fill: bool) -> Option<String> {
    match (paint, gradient_ref) {
        (Paint::Solid(c), _) => Some(to_hex(c)),
        (Paint::Gradient { .. }, Some(_)) if is_fill => None,
        (Paint::Gradient { .. }, Some(id)) => Some(format!("url(#{id})")),
        (Paint::Gradient { fallback }, None) => Some(to_hex(fallback)),
    }
}

fn opacity(paint: Paint) -> Option<String> {
    let a = paint.flat()[3];
    (a < 255).then(|| num(a as f64 / 255.0))
}

/// Applies fill attributes to any SVG element.
pub(crate) fn fill_attrs<T: svg::Node>(
    mut el: T,
    paint: Paint,
    style: &Style,
    gradient_ref: Option<&str>,
) -> T {
    if style.rule == FillRule::EvenOdd {
        el.assign("fill-rule", style.rule.as_svg());
    }
    if let Some(v) = paint_value(paint, gradient_ref, true) {
        el.assign("fill", v);
    }
    if let Some(o) = opacity(paint) {
        el.assign("fill-opacity", o);
    }
    el
}

/// Applies stroke attributes to any SVG element. Strokes never fill.
pub(crate) fn stroke_attrs<T: svg::Node>(
    mut el: T,
    paint: Paint,
    style: &Style,
    gradient_ref: Option<&str>,
) -> T {
    if let Some(v) = paint_value(paint, gradient_ref, false) {
        el.assign("stroke", v);
    }
    if style.line_width > 0.0 {
        el.assign("stroke-width", num(style.line_width));
    }
    if style.cap != LineCap::Butt {
        el.assign("stroke-linecap", style.cap.as_svg());
    }
    el.assign("stroke-linejoin", "round");
    if !style.dash.is_empty() {
        let dash = style.dash.iter().map(|d| num(*d)).collect::<Vec<_>>().join(" ");
        el.assign("stroke-dasharray", dash);
    }
    if let Some(o) = opacity(paint) {
        el.assign("stroke-opacity", o);
    }
    el.assign("fill", "none");
    el
}

// Path canvas
//------------------------------------------------------------------------------

/// Records every commit as one `<path>` element.
pub struct PathCanvas {
    group: Group,
    data: PathData,
    paint: Paint,
    style: Style,
    gradient_ref: Option<String>,
    elements: usize,
}

impl Default for PathCanvas {
    fn default() -> Self {
        Self::new()
    }
}

impl PathCanvas {
    pub fn new() -> Self {
        Self {
            group: Group::new(),
            data: PathData::default(),
            paint: Paint::Solid(image::Rgba([0, 0, 0, 255])),
            style: Style::default(),
            gradient_ref: None,
            elements: 0,
        }
    }

    /// Id of a `<linearGradient>` that [`Paint::Gradient`] refers to.
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

    fn commit(&mut self, stroke: bool) {
        let d = self.data.take();
        if !d.is_empty() && !self.paint.is_invisible() {
            let path = Path::new().set("d", d);
            let gref = self.gradient_ref.as_deref();
            let path = if stroke {
                stroke_attrs(path, self.paint, &self.style, gref)
            } else {
                fill_attrs(path, self.paint, &self.style, gref)
            };
            self.group.append(path);
            self.elements += 1;
        }
        self.style = Style::default();
    }
}

impl Canvas for PathCanvas {
    fn move_to(&mut self, x: f64, y: f64) {
        self.data.move_to(x, y);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        self.data.line_to(x, y);
    }

    fn quadratic_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
        self.data.quadratic_to(cx, cy, x, y);
    }

    fn close_path(&mut self) {
        self.data.close();
    }

    fn draw_circle(&mut self, cx: f64, cy: f64, radius: f64) {
        self.data.circle(cx, cy, radius);
    }

    fn draw_rectangle(&mut self, x: f64, y: f64, w: f64, h: f64) {
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

    // SVG path data continues across sub-paths
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

#[cfg(test)]
mod path_canvas_tests {
    use image::Rgba;

    use super::PathCanvas;
    use crate::draw::{Canvas, FillRule, LineCap, Paint};

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);

    fn render(f: impl FnOnce(&mut PathCanvas)) -> String {
        let mut c = PathCanvas::new().with_gradient_ref("qrGradient");
        f(&mut c);
        c.into_group().to_string()
    }

    #[test]
    fn test_rectangle_path() {
        let out = render(|c| {
            c.draw_rectangle(10.0, 20.0, 10.0, 10.0);
            c.set_color(RED.into());
            c.fill();
        });
        assert!(out.contains(r#"d="M10 20 L20 20 L20 30 L10 30 Z""#), "{out}");
        assert!(out.contains(r##"fill="#ff0000""##), "{out}");
    }

    #[test]
    fn test_circle_path() {
        let out = render(|c| {
            c.draw_circle(5.0, 5.0, 5.0);
            c.fill();
        });
        assert!(out.contains(r#"d="M10 5 A5 5 0 1 1 0 5 A5 5 0 1 1 10 5 Z""#), "{out}");
    }

    #[test]
    fn test_commands_and_fill_rule() {
        let out = render(|c| {
            c.set_fill_rule(FillRule::EvenOdd);
            c.move_to(0.0, 0.0);
            c.line_to(4.0, 0.0);
            c.quadratic_to(4.0, 4.0, 0.0, 4.0);
            c.close_path();
            c.fill();
        });
        assert!(out.contains(r#"d="M0 0 L4 0 Q4 4 0 4 Z""#), "{out}");
        assert!(out.contains(r#"fill-rule="evenodd""#), "{out}");
    }

    #[test]
    fn test_one_element_per_commit() {
        let mut c = PathCanvas::new();
        c.draw_rectangle(0.0, 0.0, 1.0, 1.0);
        c.draw_rectangle(2.0, 0.0, 1.0, 1.0);
        c.fill();
        c.draw_circle(0.0, 0.0, 1.0);
        c.stroke();
        // Nothing pending
        c.fill();
        assert_eq!(c.element_count(), 2);
        assert_eq!(c.into_group().to_string().matches("<path").count(), 2);
    }

    #[test]
    fn test_stroke_attributes_then_reset() {
        let out = render(|c| {
            c.set_line_width(2.0);
            c.set_dash(&[1.0, 0.5]);
            c.set_line_cap(LineCap::Square);
            c.move_to(0.0, 0.0);
            c.line_to(5.0, 0.0);
            c.set_color(RED.into());
            c.stroke();

            c.set_fill_rule(FillRule::EvenOdd);
            c.draw_rectangle(0.0, 0.0, 1.0, 1.0);
            c.fill();

            c.draw_rectangle(5.0, 5.0, 1.0, 1.0);
            c.fill();
        });
        assert!(out.contains(r#"stroke-width="2""#), "{out}");
        assert!(out.contains(r#"stroke-dasharray="1 0.5""#), "{out}");
        assert!(out.contains(r#"stroke-linecap="square""#), "{out}");
        assert!(out.contains(r#"fill="none""#), "{out}");
        assert_eq!(out.matches("stroke-width").count(), 1);
        assert_eq!(out.matches("evenodd").count(), 1);
    }

    #[test]
    fn test_stroke_joins_match_raster() {
        let out = render(|c| {
            c.draw_rectangle(5.0, 5.0, 10.0, 10.0);
            c.set_line_width(6.0);
            c.stroke();

            c.draw_rectangle(0.0, 0.0, 1.0, 1.0);
            c.fill();
        });
        // Raster strokes use round joins, so the SVG must not fall back to miter
        assert_eq!(out.matches(r#"stroke-linejoin="round""#).count(), 1, "{out}");
    }

    #[test]
    fn test_gradient_fill_is_omitted() {
        let out = render(|c| {
            c.draw_rectangle(0.0, 0.0, 1.0, 1.0);
            c.set_color(Paint::Gradient { fallback: RED });
            c.fill();
            c.move_to(0.0, 0.0);
            c.line_to(1.0, 1.0);
            c.stroke();
        });
        assert!(!out.contains("#ff0000"), "{out}");
        assert!(out.contains(r#"stroke="url(#qrGradient)""#), "{out}");
    }

    #[test]
    fn test_gradient_without_ref_falls_back() {
        let mut c = PathCanvas::new();
        c.draw_rectangle(0.0, 0.0, 1.0, 1.0);
        c.set_color(Paint::Gradient { fallback: RED });
        c.fill();
        assert!(c.into_group().to_string().contains(r##"fill="#ff0000""##));
    }

    #[test]
    fn test_transparent_is_skipped() {
        let mut c = PathCanvas::new();
        c.draw_rectangle(0.0, 0.0, 1.0, 1.0);
        c.set_color(Paint::Solid(Rgba([9, 9, 9, 0])));
        c.fill();
        assert_eq!(c.element_count(), 0);
    }

    #[test]
    fn test_translucent_adds_opacity() {
        let mut c = PathCanvas::new();
        c.draw_rectangle(0.0, 0.0, 1.0, 1.0);
        c.set_color(Paint::Solid(Rgba([0, 0, 0, 51])));
        c.fill();
        assert!(c.into_group().to_string().contains(r#"fill-opacity="0.2""#));
    }
}
