use image::RgbaImage;

use crate::common::matrix::{Matrix, Module, ModuleKind, Occupancy};
use crate::draw::{Canvas, DrawContext, Paint, RasterCanvas};
use crate::halftone;
use crate::options::WriterOptions;

// Render stats
//------------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct RenderStats {
    /// Modules handed to the shape as a whole.
    pub modules: usize,
    /// Halftone sub-cells handed to the shape.
    pub sub_cells: usize,
    /// Modules hidden behind the logo safe zone.
    pub occluded: usize,
}

// Renderer
//------------------------------------------------------------------------------

/// Drives the configured shape over every module of one matrix.
///
/// The logo and the halftone source are resolved against the matrix once, in [`Renderer::new`],
/// so a render never touches the file system.
pub struct Renderer<'a, M: Matrix> {
    opts: &'a WriterOptions,
    matrix: &'a M,
    logo: Option<RgbaImage>,
    halftone: Option<RgbaImage>,
}

impl<'a, M: Matrix> Renderer<'a, M> {
    pub fn new(opts: &'a WriterOptions, matrix: &'a M) -> Self {
        let mut renderer = Self { opts, matrix, logo: None, halftone: None };

        let bw = opts.block_width;
        let qr_size = (matrix.width() as u32 * bw, matrix.height() as u32 * bw);
        renderer.logo = opts.logo_for(renderer.canvas_size(), qr_size);
        renderer.halftone = opts.halftone.as_ref().map(|src| {
            halftone::prepare(src, matrix.width(), matrix.height(), opts.halftone_threshold)
        });
        renderer
    }

    /// Pixel size of the whole output including borders.
    pub fn canvas_size(&self) -> (u32, u32) {
        let bw = self.opts.block_width;
        let border = self.opts.border;
        (
            self.matrix.width() as u32 * bw + border.horizontal(),
            self.matrix.height() as u32 * bw + border.vertical(),
        )
    }

    /// Pixel size of the produced output. Equals [`Renderer::canvas_size`] unless a resolution
    /// is configured.
    pub fn output_size(&self) -> (u32, u32) {
        match self.opts.resolution {
            Some(r) => (r, r),
            None => self.canvas_size(),
        }
    }

    /// Uniform scale and offset that fit the canvas, centred, into the output.
    pub fn view(&self) -> (f64, (f64, f64)) {
        let (w, h) = self.canvas_size();
        let Some(r) = self.opts.resolution else {
            return (1.0, (0.0, 0.0));
        };
        let r = r as f64;
        let scale = r / w.max(h).max(1) as f64;
        (scale, ((r - w as f64 * scale) / 2.0, (r - h as f64 * scale) / 2.0))
    }

    /// Logo that passed the size check, if any.
    pub fn logo(&self) -> Option<&RgbaImage> {
        self.logo.as_ref()
    }

    /// Upper-left corner of the centred logo.
    pub fn logo_origin(&self) -> Option<(u32, u32)> {
        let (w, h) = self.canvas_size();
        self.logo.as_ref().map(|l| ((w - l.width()) / 2, (h - l.height()) / 2))
    }

    fn block_origin(&self, x: usize, y: usize) -> (u32, u32) {
        let bw = self.opts.block_width;
        (x as u32 * bw + self.opts.border.left, y as u32 * bw + self.opts.border.top)
    }

    /// Whether the module's cell touches the logo box grown by two blocks on every side.
    fn is_occluded(&self, x: usize, y: usize) -> bool {
        if !self.opts.logo_safe_zone {
            return false;
        }
        let (Some(logo), Some((lx, ly))) = (&self.logo, self.logo_origin()) else {
            return false;
        };

        let bw = self.opts.block_width as i64;
        let pad = 2 * bw;
        let (zx0, zy0) = (lx as i64 - pad, ly as i64 - pad);
        let (zx1, zy1) = (lx as i64 + logo.width() as i64 + pad, ly as i64 + logo.height() as i64 + pad);

        let (bx, by) = self.block_origin(x, y);
        let (bx, by) = (bx as i64, by as i64);
        bx < zx1 && bx + bw > zx0 && by < zy1 && by + bw > zy0
    }

    fn paint(&self, module: Module) -> Paint {
        let flat = self.opts.module_color(module.is_set(), module.kind());
        match self.opts.gradient {
            Some(_) if module.is_set() => Paint::Gradient { fallback: flat },
            _ => Paint::Solid(flat),
        }
    }

    pub fn render(&self, canvas: &mut dyn Canvas) -> RenderStats {
        let mut stats = RenderStats::default();
        let bw = self.opts.block_width;

        // Occluded modules count as empty so neighbours round off towards the logo
        let mut occupancy = Occupancy::from_matrix(self.matrix);
        for (x, y, _) in self.matrix.iter() {
            if self.is_occluded(x, y) {
                occupancy.clear(x, y);
            }
        }

        for (x, y, module) in self.matrix.iter() {
            if self.is_occluded(x, y) {
                stats.occluded += 1;
                continue;
            }

            let (bx, by) = self.block_origin(x, y);
            let neighbours = occupancy.neighbours(x, y);
            let paint = self.paint(module);

            if let (Some(ht), ModuleKind::Data) = (&self.halftone, module.kind()) {
                let bounds = sub_cell_bounds(bw);
                for j in 0..3 {
                    for i in 0..3 {
                        let color = if (i, j) == (1, 1) {
                            paint
                        } else {
                            Paint::Solid(*ht.get_pixel(x as u32 * 3 + i, y as u32 * 3 + j))
                        };
                        if self.opts.elision.is_background(color.flat()) {
                            continue;
                        }

                        let (x0, x1) = (bounds[i as usize], bounds[i as usize + 1]);
                        let (y0, y1) = (bounds[j as usize], bounds[j as usize + 1]);
                        if x1 == x0 || y1 == y0 {
                            continue;
                        }
                        let origin = ((bx + x0) as f64, (by + y0) as f64);
                        let mut ctx =
                            DrawContext::new(&mut *canvas, origin, (x1 - x0, y1 - y0), color, neighbours);
                        self.opts.shape.draw(&mut ctx);
                        stats.sub_cells += 1;
                    }
                }
                continue;
            }

            if !module.is_set() {
                continue;
            }

            let origin = (bx as f64, by as f64);
            let mut ctx = DrawContext::new(&mut *canvas, origin, (bw, bw), paint, neighbours);
            match module.kind() {
                ModuleKind::Finder => self.opts.shape.draw_finder(&mut ctx),
                _ => self.opts.shape.draw(&mut ctx),
            }
            stats.modules += 1;
        }

        log::debug!(
            "Rendered {} modules, {} halftone sub-cells, {} occluded",
            stats.modules,
            stats.sub_cells,
            stats.occluded
        );
        stats
    }

    /// Background plus modules at the output size. No logo.
    pub fn rasterize(&self) -> (RgbaImage, RenderStats) {
        let (scale, offset) = self.view();
        self.rasterize_view(self.output_size(), scale, offset)
    }

    /// Background plus modules at the canvas size, one pixel per canvas unit. No logo.
    pub fn rasterize_unscaled(&self) -> (RgbaImage, RenderStats) {
        self.rasterize_view(self.canvas_size(), 1.0, (0.0, 0.0))
    }

    fn rasterize_view(
        &self,
        (w, h): (u32, u32),
        scale: f64,
        offset: (f64, f64),
    ) -> (RgbaImage, RenderStats) {
        let mut img = RgbaImage::from_pixel(w, h, self.opts.background());
        let mut canvas = RasterCanvas::new(&mut img).with_view(scale, offset);
        if let Some(g) = &self.opts.gradient {
            canvas = canvas.with_gradient(g);
        }
        let stats = self.render(&mut canvas);
        drop(canvas);
        (img, stats)
    }
}

/// Sub-cell edges along one side of a block. The outer cells give up width first, so the centre
/// keeps at least one pixel even for blocks narrower than three.
fn sub_cell_bounds(bw: u32) -> [u32; 4] {
    let outer = bw / 3;
    [0, outer, bw - outer, bw]
}

#[cfg(test)]
mod render_tests {
    use std::sync::{Arc, Mutex};

    use image::{DynamicImage, Rgba, RgbaImage};
    use test_case::test_case;

    use super::Renderer;
    use crate::common::color::{BLACK, WHITE};
    use crate::common::matrix::{Module, ModuleGrid, ModuleKind, Neighbours};
    use crate::draw::recorder::{Command, Recorder};
    use crate::draw::{DrawContext, Paint};
    use crate::gradient::{ColorStop, LinearGradient};
    use crate::options::{Border, QRColors, WriterOptions};
    use crate::shape::{ModuleShape, Shape};

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    fn opts(bw: u32, border: u32, shape: Shape) -> WriterOptions {
        WriterOptions {
            block_width: bw,
            border: Border::uniform(border),
            shape,
            ..WriterOptions::default()
        }
    }

    fn full(w: usize, h: usize) -> ModuleGrid {
        ModuleGrid::from_fn(w, h, |_, _| Module::dark(ModuleKind::Data))
    }

    #[test_case(3, 3, 10, 0, (30, 30))]
    #[test_case(21, 21, 20, 20, (460, 460))]
    #[test_case(4, 2, 5, 1, (22, 12))]
    fn test_canvas_size(w: usize, h: usize, bw: u32, border: u32, exp: (u32, u32)) {
        let o = opts(bw, border, Shape::Square);
        let m = full(w, h);
        assert_eq!(Renderer::new(&o, &m).canvas_size(), exp);
    }

    #[test_case(3, 3, None, (1.0, (0.0, 0.0)), (30, 30))]
    #[test_case(3, 3, Some(60), (2.0, (0.0, 0.0)), (60, 60))]
    #[test_case(4, 2, Some(20), (0.5, (0.0, 5.0)), (20, 20))]
    fn test_resolution_view(
        w: usize,
        h: usize,
        res: Option<u32>,
        exp_view: (f64, (f64, f64)),
        exp_size: (u32, u32),
    ) {
        let mut o = opts(10, 0, Shape::Square);
        o.resolution = res;
        let m = full(w, h);
        let r = Renderer::new(&o, &m);
        assert_eq!(r.view(), exp_view);
        assert_eq!(r.output_size(), exp_size);
    }

    #[test]
    fn test_rasterize_at_resolution() {
        let mut o = opts(10, 0, Shape::Square);
        o.resolution = Some(45);
        let m = ModuleGrid::from_debug_str("dD\nDd").unwrap();
        let r = Renderer::new(&o, &m);

        let (img, _) = r.rasterize();
        assert_eq!(img.dimensions(), (45, 45));
        assert_eq!(*img.get_pixel(10, 10), BLACK);
        assert_eq!(*img.get_pixel(30, 10), WHITE);
        assert_eq!(*img.get_pixel(30, 30), BLACK);

        let (natural, _) = r.rasterize_unscaled();
        assert_eq!(natural.dimensions(), (20, 20));
    }

    #[test]
    fn test_circles_centered() {
        let o = opts(10, 0, Shape::Circle);
        let m = full(3, 3);
        let mut rec = Recorder::default();
        let stats = Renderer::new(&o, &m).render(&mut rec);
        assert_eq!(stats.modules, 9);

        let exp = (0..3)
            .flat_map(|y| (0..3).map(move |x| (x as f64 * 10.0 + 5.0, y as f64 * 10.0 + 5.0, 5.0)))
            .collect::<Vec<_>>();
        assert_eq!(rec.circles(), exp);
    }

    #[test]
    fn test_unset_modules_skipped_and_border_offset() {
        let m = ModuleGrid::from_debug_str("dD\nDd").unwrap();
        let o = opts(4, 3, Shape::Square);
        let mut rec = Recorder::default();
        Renderer::new(&o, &m).render(&mut rec);
        assert_eq!(rec.rectangles(), vec![(3.0, 3.0, 4.0, 4.0), (7.0, 7.0, 4.0, 4.0)]);
    }

    #[test]
    fn test_per_kind_colors() {
        let m = ModuleGrid::from_debug_str("fd").unwrap();
        let mut o = opts(1, 0, Shape::Square);
        o.qr_colors = QRColors { data: Some(RED), finder: Some(BLUE) };
        let mut rec = Recorder::default();
        Renderer::new(&o, &m).render(&mut rec);
        assert_eq!(rec.colors(), vec![Paint::Solid(BLUE), Paint::Solid(RED)]);
    }

    #[test]
    fn test_gradient_paint() {
        let m = full(1, 1);
        let mut o = opts(1, 0, Shape::Square);
        o.gradient = Some(LinearGradient::new(0.0, [ColorStop::new(0.0, RED)]));
        let mut rec = Recorder::default();
        Renderer::new(&o, &m).render(&mut rec);
        assert_eq!(rec.colors(), vec![Paint::Gradient { fallback: BLACK }]);
    }

    fn halftone_opts(src: Rgba<u8>) -> WriterOptions {
        let mut o = opts(9, 0, Shape::Square);
        o.fg_color = RED;
        o.halftone = Some(DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, src)));
        o
    }

    #[test]
    fn test_halftone_nine_sub_cells() {
        let o = halftone_opts(BLACK);
        let m = full(1, 1);
        let mut rec = Recorder::default();
        let stats = Renderer::new(&o, &m).render(&mut rec);
        assert_eq!(stats.sub_cells, 9);
        assert_eq!(stats.modules, 0);
        assert_eq!(rec.count(|c| *c == Command::Fill), 9);
        assert!(rec.rectangles().iter().all(|r| r.2 == 3.0 && r.3 == 3.0));

        // Centre sub-cell is the fifth drawn and keeps the module colour
        let colors = rec.colors();
        assert_eq!(colors[4], Paint::Solid(RED));
        assert_eq!(colors.iter().filter(|c| **c == Paint::Solid(BLACK)).count(), 8);
    }

    #[test]
    fn test_halftone_white_samples_elided() {
        let o = halftone_opts(WHITE);
        let m = full(2, 1);
        let mut rec = Recorder::default();
        let stats = Renderer::new(&o, &m).render(&mut rec);
        assert_eq!(stats.sub_cells, 2);
        assert_eq!(rec.rectangles(), vec![(3.0, 3.0, 3.0, 3.0), (12.0, 3.0, 3.0, 3.0)]);
    }

    #[test]
    fn test_halftone_skips_finders() {
        let o = halftone_opts(BLACK);
        let m = ModuleGrid::from_debug_str("f").unwrap();
        let mut rec = Recorder::default();
        let stats = Renderer::new(&o, &m).render(&mut rec);
        assert_eq!((stats.modules, stats.sub_cells), (1, 0));
        assert_eq!(rec.rectangles(), vec![(0.0, 0.0, 9.0, 9.0)]);
    }

    #[test]
    fn test_halftone_uneven_block_tiles() {
        let mut o = halftone_opts(BLACK);
        o.block_width = 10;
        let m = full(1, 1);
        let mut rec = Recorder::default();
        Renderer::new(&o, &m).render(&mut rec);
        let rects = rec.rectangles();
        let area: f64 = rects.iter().map(|r| r.2 * r.3).sum();
        assert_eq!(area, 100.0);
        // Spare pixels go to the centre
        assert_eq!(rects[4], (3.0, 3.0, 4.0, 4.0));
    }

    #[test_case(1)]
    #[test_case(2)]
    fn test_halftone_narrow_blocks_keep_centre(bw: u32) {
        let mut o = halftone_opts(BLACK);
        o.block_width = bw;
        let m = full(1, 1);
        let mut rec = Recorder::default();
        let stats = Renderer::new(&o, &m).render(&mut rec);
        assert_eq!(stats.sub_cells, 1);
        assert_eq!(rec.colors(), vec![Paint::Solid(RED)]);
        assert_eq!(rec.rectangles(), vec![(0.0, 0.0, bw as f64, bw as f64)]);
    }

    #[test_case(1, [0, 0, 1, 1])]
    #[test_case(2, [0, 0, 2, 2])]
    #[test_case(3, [0, 1, 2, 3])]
    #[test_case(5, [0, 1, 4, 5])]
    #[test_case(9, [0, 3, 6, 9])]
    fn test_sub_cell_bounds(bw: u32, exp: [u32; 4]) {
        assert_eq!(super::sub_cell_bounds(bw), exp);
    }

    /// Remembers the neighbour mask of every module it draws.
    #[derive(Default)]
    struct NeighbourLog(Arc<Mutex<Vec<((f64, f64), Neighbours)>>>);

    impl ModuleShape for NeighbourLog {
        fn draw(&self, ctx: &mut DrawContext) {
            if let Ok(mut seen) = self.0.lock() {
                seen.push((ctx.upper_left(), ctx.neighbours()));
            }
        }
    }

    #[test]
    fn test_logo_safe_zone() {
        // 9x9 blocks of 10px, no border, 10x10 logo in the middle. The zone spans 20..70.
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut o = opts(10, 0, Shape::custom(NeighbourLog(seen.clone())));
        o.logo = Some(RgbaImage::new(10, 10));
        o.logo_multiplier = 9;
        o.logo_safe_zone = true;

        let m = full(9, 9);
        let renderer = Renderer::new(&o, &m);
        assert_eq!(renderer.logo_origin(), Some((40, 40)));
        let stats = renderer.render(&mut Recorder::default());

        // Columns and rows 2..=6 are touched by the zone
        assert_eq!(stats.occluded, 25);
        assert_eq!(stats.modules, 81 - 25);

        let seen = seen.lock().unwrap();
        let at = |x: f64, y: f64| seen.iter().find(|(p, _)| *p == (x, y)).map(|(_, n)| *n);
        assert_eq!(at(30.0, 30.0), None);
        // Module left of the zone lost its right-hand neighbours
        let n = at(10.0, 40.0).unwrap();
        assert!(n.contains(Neighbours::LEFT | Neighbours::SELF));
        assert!(!n.contains(Neighbours::RIGHT));
    }

    #[test]
    fn test_safe_zone_needs_flag() {
        let mut o = opts(10, 0, Shape::Square);
        o.logo = Some(RgbaImage::new(10, 10));
        o.logo_multiplier = 9;
        let m = full(9, 9);
        let stats = Renderer::new(&o, &m).render(&mut Recorder::default());
        assert_eq!(stats.occluded, 0);
        assert_eq!(stats.modules, 81);
    }
}
