use super::{ModuleShape, Shape};
use crate::draw::{DrawContext, FillRule, LineCap, Neighbours};

// Assembled
//------------------------------------------------------------------------------

/// Draws finder anchors with one shape and every other module with another.
#[derive(Debug, Clone, Default)]
pub struct Assembled {
    pub finder: Shape,
    pub block: Shape,
}

impl Assembled {
    pub fn new(finder: Shape, block: Shape) -> Self {
        Self { finder, block }
    }
}

impl ModuleShape for Assembled {
    fn draw(&self, ctx: &mut DrawContext) {
        self.block.draw(ctx);
    }

    fn draw_finder(&self, ctx: &mut DrawContext) {
        self.finder.draw_finder(ctx);
    }
}

// Liquid block
//------------------------------------------------------------------------------

/// Rounds every corner that is not shared with a set orthogonal neighbour, so adjacent modules
/// melt into one blob.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiquidBlock;

impl LiquidBlock {
    /// Corner radii as `[top_left, top_right, bot_right, bot_left]`.
    fn radii(n: Neighbours, r: f64) -> [f64; 4] {
        let free = |a: Neighbours, b: Neighbours| !n.contains(a) && !n.contains(b);
        [
            if free(Neighbours::TOP, Neighbours::LEFT) { r } else { 0.0 },
            if free(Neighbours::TOP, Neighbours::RIGHT) { r } else { 0.0 },
            if free(Neighbours::BOT, Neighbours::RIGHT) { r } else { 0.0 },
            if free(Neighbours::BOT, Neighbours::LEFT) { r } else { 0.0 },
        ]
    }
}

impl ModuleShape for LiquidBlock {
    fn draw(&self, ctx: &mut DrawContext) {
        let (x, y) = ctx.upper_left();
        let (w, h) = ctx.edge();
        let (w, h) = (w as f64, h as f64);
        let color = ctx.color();
        let [tl, tr, br, bl] = Self::radii(ctx.neighbours(), w.min(h) / 2.0);

        ctx.move_to(x + tl, y);
        ctx.line_to(x + w - tr, y);
        if tr > 0.0 {
            ctx.quadratic_to(x + w, y, x + w, y + tr);
        }
        ctx.line_to(x + w, y + h - br);
        if br > 0.0 {
            ctx.quadratic_to(x + w, y + h, x + w - br, y + h);
        }
        ctx.line_to(x + bl, y + h);
        if bl > 0.0 {
            ctx.quadratic_to(x, y + h, x, y + h - bl);
        }
        ctx.line_to(x, y + tl);
        if tl > 0.0 {
            ctx.quadratic_to(x, y, x + tl, y);
        }
        ctx.close_path();
        ctx.set_color(color);
        ctx.fill();
    }
}

// Ring finder
//------------------------------------------------------------------------------

/// Circle with a hole, filled even-odd.
#[derive(Debug, Clone, Copy)]
pub struct RingFinder {
    /// Inner radius as a fraction of the outer one.
    pub hole: f64,
}

impl Default for RingFinder {
    fn default() -> Self {
        Self { hole: 0.5 }
    }
}

impl ModuleShape for RingFinder {
    fn draw(&self, ctx: &mut DrawContext) {
        let (x, y) = ctx.upper_left();
        let (w, h) = ctx.edge();
        let (w, h) = (w as f64, h as f64);
        let (cx, cy, r) = (x + w / 2.0, y + h / 2.0, w.min(h) / 2.0);
        let color = ctx.color();

        ctx.set_fill_rule(FillRule::EvenOdd);
        ctx.draw_circle(cx, cy, r);
        ctx.new_sub_path();
        ctx.draw_circle(cx, cy, r * self.hole.clamp(0.0, 1.0));
        ctx.set_color(color);
        ctx.fill();
    }
}

// Dashed outline
//------------------------------------------------------------------------------

/// Dashed square outline inset by half the line width.
#[derive(Debug, Clone, Copy, Default)]
pub struct DashedOutline;

impl ModuleShape for DashedOutline {
    fn draw(&self, ctx: &mut DrawContext) {
        let (x, y) = ctx.upper_left();
        let (w, h) = ctx.edge();
        let (w, h) = (w as f64, h as f64);
        let edge = w.min(h);
        let lw = (edge / 10.0).max(1.0);
        let inset = lw / 2.0;
        let color = ctx.color();

        ctx.set_line_width(lw);
        ctx.set_dash(&[edge / 4.0, edge / 8.0]);
        ctx.set_line_cap(LineCap::Square);
        ctx.move_to(x + inset, y + inset);
        ctx.line_to(x + w - inset, y + inset);
        ctx.line_to(x + w - inset, y + h - inset);
        ctx.line_to(x + inset, y + h - inset);
        ctx.close_path();
        ctx.set_color(color);
        ctx.stroke();
    }
}
