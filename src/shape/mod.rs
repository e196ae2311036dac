//! Module shapes. A shape turns one [`DrawContext`] into drawing commands and never learns which
//! canvas receives them.

mod custom;

pub use custom::{Assembled, DashedOutline, LiquidBlock, RingFinder};

use std::fmt;
use std::sync::Arc;

use crate::draw::DrawContext;

// Module shape
//------------------------------------------------------------------------------

/// Extension point for shapes beyond the built-in square and circle.
pub trait ModuleShape: Send + Sync {
    fn draw(&self, ctx: &mut DrawContext);

    /// Draws one of the three finder anchors. Same as [`ModuleShape::draw`] unless overridden.
    fn draw_finder(&self, ctx: &mut DrawContext) {
        self.draw(ctx);
    }
}

// Shape
//------------------------------------------------------------------------------

#[derive(Clone, Default)]
pub enum Shape {
    #[default]
    Square,
    Circle,
    Custom(Arc<dyn ModuleShape>),
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Square => f.write_str("Square"),
            Self::Circle => f.write_str("Circle"),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Shape {
    pub fn custom(shape: impl ModuleShape + 'static) -> Self {
        Self::Custom(Arc::new(shape))
    }

    pub fn draw(&self, ctx: &mut DrawContext) {
        match self {
            Self::Square => square(ctx),
            Self::Circle => circle(ctx),
            Self::Custom(s) => s.draw(ctx),
        }
    }

    pub fn draw_finder(&self, ctx: &mut DrawContext) {
        match self {
            Self::Custom(s) => s.draw_finder(ctx),
            _ => self.draw(ctx),
        }
    }
}

/// Fills the whole cell.
fn square(ctx: &mut DrawContext) {
    let (x, y) = ctx.upper_left();
    let (w, h) = ctx.edge();
    let color = ctx.color();
    ctx.draw_rectangle(x, y, w as f64, h as f64);
    ctx.set_color(color);
    ctx.fill();
}

/// Largest circle centred in the cell.
fn circle(ctx: &mut DrawContext) {
    let (x, y) = ctx.upper_left();
    let (w, h) = ctx.edge();
    let (w, h) = (w as f64, h as f64);
    let color = ctx.color();
    ctx.draw_circle(x + w / 2.0, y + h / 2.0, w.min(h) / 2.0);
    ctx.set_color(color);
    ctx.fill();
}

#[cfg(test)]
mod shape_tests {
    use image::Rgba;
    use test_case::test_case;

    use super::{ModuleShape, Shape};
    use crate::draw::recorder::{Command, Recorder};
    use crate::draw::{DrawContext, Neighbours, Paint};

    const RED: Paint = Paint::Solid(Rgba([255, 0, 0, 255]));

    fn record(shape: &Shape, finder: bool, origin: (f64, f64), edge: (u32, u32)) -> Recorder {
        let mut rec = Recorder::default();
        let mut ctx = DrawContext::new(&mut rec, origin, edge, RED, Neighbours::SELF);
        if finder {
            shape.draw_finder(&mut ctx);
        } else {
            shape.draw(&mut ctx);
        }
        rec
    }

    #[test]
    fn test_square() {
        let rec = record(&Shape::Square, false, (10.0, 20.0), (10, 10));
        assert_eq!(
            rec.commands,
            vec![Command::Rectangle(10.0, 20.0, 10.0, 10.0), Command::Color(RED), Command::Fill]
        );
    }

    #[test_case((0.0, 0.0), (10, 10), (5.0, 5.0, 5.0))]
    #[test_case((20.0, 10.0), (10, 10), (25.0, 15.0, 5.0))]
    #[test_case((0.0, 0.0), (12, 6), (6.0, 3.0, 3.0))]
    fn test_circle(origin: (f64, f64), edge: (u32, u32), exp: (f64, f64, f64)) {
        let rec = record(&Shape::Circle, false, origin, edge);
        assert_eq!(rec.circles(), vec![exp]);
        assert_eq!(rec.colors(), vec![RED]);
        assert_eq!(rec.count(|c| *c == Command::Fill), 1);
    }

    #[test_case(Shape::Square)]
    #[test_case(Shape::Circle)]
    fn test_finder_defaults_to_draw(shape: Shape) {
        let a = record(&shape, false, (3.0, 4.0), (7, 7));
        let b = record(&shape, true, (3.0, 4.0), (7, 7));
        assert_eq!(a.commands, b.commands);
    }

    struct Cross;

    impl ModuleShape for Cross {
        fn draw(&self, ctx: &mut DrawContext) {
            let (x, y) = ctx.upper_left();
            ctx.move_to(x, y);
            ctx.line_to(x + 1.0, y + 1.0);
            ctx.stroke();
        }
    }

    #[test]
    fn test_custom_dispatch() {
        let shape = Shape::custom(Cross);
        let rec = record(&shape, true, (0.0, 0.0), (1, 1));
        assert_eq!(rec.count(|c| *c == Command::Stroke), 1);
        assert_eq!(format!("{shape:?}"), "Custom(..)");
    }
}
