//! Backend-independent drawing vocabulary shared by every module shape.
//!
//! A [`Shape`](crate::shape::Shape) only ever talks to a [`Canvas`]. Three canvases implement it:
//! [`RasterCanvas`] paints pixels, [`PathCanvas`] records SVG path strings and
//! [`PrimitiveCanvas`] emits native SVG shapes where it can.
//!
//! `fill` and `stroke` are commit points. Everything built since the previous commit becomes one
//! visual primitive, after which line width, dash, line cap and fill rule return to their defaults.

mod path;
mod primitive;
mod raster;

pub(crate) use path::num;
pub use path::PathCanvas;
pub use primitive::PrimitiveCanvas;
pub use raster::RasterCanvas;

use std::ops::{Deref, DerefMut};

use image::Rgba;

pub use crate::common::matrix::Neighbours;

// Paint & stroke attributes
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Paint {
    Solid(Rgba<u8>),
    /// The gradient configured on the canvas. `fallback` is used by canvases without one.
    Gradient { fallback: Rgba<u8> },
}

impl Paint {
    pub fn flat(&self) -> Rgba<u8> {
        match *self {
            Self::Solid(c) | Self::Gradient { fallback: c } => c,
        }
    }

    pub fn is_invisible(&self) -> bool {
        matches!(self, Self::Solid(c) if c[3] == 0)
    }
}

impl From<Rgba<u8>> for Paint {
    fn from(c: Rgba<u8>) -> Self {
        Self::Solid(c)
    }
}

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum FillRule {
    #[default]
    NonZero,
    EvenOdd,
}

impl FillRule {
    pub fn as_svg(self) -> &'static str {
        match self {
            Self::NonZero => "nonzero",
            Self::EvenOdd => "evenodd",
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

impl LineCap {
    pub fn as_svg(self) -> &'static str {
        match self {
            Self::Butt => "butt",
            Self::Round => "round",
            Self::Square => "square",
        }
    }
}

/// Attributes reset after every `fill` and `stroke`.
#[derive(Debug, PartialEq, Clone)]
pub struct Style {
    pub line_width: f64,
    pub dash: Vec<f64>,
    pub cap: LineCap,
    pub rule: FillRule,
}

impl Default for Style {
    fn default() -> Self {
        Self { line_width: 1.0, dash: Vec::new(), cap: LineCap::Butt, rule: FillRule::NonZero }
    }
}

impl Style {
    pub(crate) fn set_dash(&mut self, pattern: &[f64]) {
        // All-zero or negative patterns would never advance
        if pattern.iter().any(|d| *d < 0.0) || pattern.iter().all(|d| *d == 0.0) {
            self.dash.clear();
        } else {
            self.dash = pattern.to_vec();
        }
    }
}

// Canvas
//------------------------------------------------------------------------------

pub trait Canvas {
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn quadratic_to(&mut self, cx: f64, cy: f64, x: f64, y: f64);
    fn close_path(&mut self);

    /// Adds a closed circle as its own sub-path.
    fn draw_circle(&mut self, cx: f64, cy: f64, radius: f64);

    /// Adds a closed rectangle as its own sub-path.
    fn draw_rectangle(&mut self, x: f64, y: f64, w: f64, h: f64);

    fn set_color(&mut self, paint: Paint);
    fn set_line_width(&mut self, width: f64);
    fn set_dash(&mut self, pattern: &[f64]);
    fn set_line_cap(&mut self, cap: LineCap);

    /// Ends the current sub-path without closing it.
    fn new_sub_path(&mut self);
    fn set_fill_rule(&mut self, rule: FillRule);

    fn fill(&mut self);
    fn stroke(&mut self);
}

// Draw context
//------------------------------------------------------------------------------

/// One module's cell, handed to a shape for the duration of a single draw call.
pub struct DrawContext<'a> {
    canvas: &'a mut dyn Canvas,
    x: f64,
    y: f64,
    w: u32,
    h: u32,
    color: Paint,
    neighbours: Neighbours,
}

impl<'a> DrawContext<'a> {
    pub fn new(
        canvas: &'a mut dyn Canvas,
        (x, y): (f64, f64),
        (w, h): (u32, u32),
        color: Paint,
        neighbours: Neighbours,
    ) -> Self {
        Self { canvas, x, y, w, h, color, neighbours }
    }

    pub fn upper_left(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    /// Width and height the shape may occupy at most.
    pub fn edge(&self) -> (u32, u32) {
        (self.w, self.h)
    }

    /// Paint resolved for this module. Shapes that ignore it also ignore color configuration.
    pub fn color(&self) -> Paint {
        self.color
    }

    pub fn neighbours(&self) -> Neighbours {
        self.neighbours
    }
}

impl<'a> Deref for DrawContext<'a> {
    type Target = dyn Canvas + 'a;

    fn deref(&self) -> &Self::Target {
        &*self.canvas
    }
}

impl DerefMut for DrawContext<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.canvas
    }
}

// Recorder
//------------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod recorder {
    use super::{Canvas, FillRule, LineCap, Paint};

    #[derive(Debug, PartialEq, Clone)]
    pub enum Command {
        MoveTo(f64, f64),
        LineTo(f64, f64),
        QuadraticTo(f64, f64, f64, f64),
        ClosePath,
        Circle(f64, f64, f64),
        Rectangle(f64, f64, f64, f64),
        Color(Paint),
        LineWidth(f64),
        Dash(Vec<f64>),
        LineCap(LineCap),
        NewSubPath,
        FillRule(FillRule),
        Fill,
        Stroke,
    }

    /// Logs every command verbatim.
    #[derive(Debug, Default)]
    pub struct Recorder {
        pub commands: Vec<Command>,
    }

    impl Recorder {
        pub fn count(&self, pred: impl Fn(&Command) -> bool) -> usize {
            self.commands.iter().filter(|c| pred(c)).count()
        }

        pub fn circles(&self) -> Vec<(f64, f64, f64)> {
            self.commands
                .iter()
                .filter_map(|c| match *c {
                    Command::Circle(x, y, r) => Some((x, y, r)),
                    _ => None,
                })
                .collect()
        }

        pub fn rectangles(&self) -> Vec<(f64, f64, f64, f64)> {
            self.commands
                .iter()
                .filter_map(|c| match *c {
                    Command::Rectangle(x, y, w, h) => Some((x, y, w, h)),
                    _ => None,
                })
                .collect()
        }

        pub fn colors(&self) -> Vec<Paint> {
            self.commands
                .iter()
                .filter_map(|c| match *c {
                    Command::Color(p) => Some(p),
                    _ => None,
                })
                .collect()
        }
    }

    impl Canvas for Recorder {
        fn move_to(&mut self, x: f64, y: f64) {
            self.commands.push(Command::MoveTo(x, y));
        }

        fn line_to(&mut self, x: f64, y: f64) {
            self.commands.push(Command::LineTo(x, y));
        }

        fn quadratic_to(&mut self, cx: f64, cy: f64, x: f64, y: f64) {
            self.commands.push(Command::QuadraticTo(cx, cy, x, y));
        }

        fn close_path(&mut self) {
            self.commands.push(Command::ClosePath);
        }

        fn draw_circle(&mut self, cx: f64, cy: f64, radius: f64) {
            self.commands.push(Command::Circle(cx, cy, radius));
        }

        fn draw_rectangle(&mut self, x: f64, y: f64, w: f64, h: f64) {
            self.commands.push(Command::Rectangle(x, y, w, h));
        }

        fn set_color(&mut self, paint: Paint) {
            self.commands.push(Command::Color(paint));
        }

        fn set_line_width(&mut self, width: f64) {
            self.commands.push(Command::LineWidth(width));
        }

        fn set_dash(&mut self, pattern: &[f64]) {
            self.commands.push(Command::Dash(pattern.to_vec()));
        }

        fn set_line_cap(&mut self, cap: LineCap) {
            self.commands.push(Command::LineCap(cap));
        }

        fn new_sub_path(&mut self) {
            self.commands.push(Command::NewSubPath);
        }

        fn set_fill_rule(&mut self, rule: FillRule) {
            self.commands.push(Command::FillRule(rule));
        }

        fn fill(&mut self) {
            self.commands.push(Command::Fill);
        }

        fn stroke(&mut self) {
            self.commands.push(Command::Stroke);
        }
    }
}
