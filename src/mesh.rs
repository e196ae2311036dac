use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::common::color::Elision;

// Rectangle info
//------------------------------------------------------------------------------

/// Axis-aligned run of identically coloured pixels.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct RectInfo {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub color: Rgba<u8>,
}

impl RectInfo {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        (self.x..self.x + self.width).contains(&x) && (self.y..self.y + self.height).contains(&y)
    }
}

// Greedy meshing
//------------------------------------------------------------------------------

/// Covers every non-background pixel with disjoint same-colour rectangles.
///
/// Scans row-major. At each unvisited foreground pixel the run grows right while the colour
/// matches exactly, then grows down while the whole run matches in the next row. Linear in the
/// pixel count.
pub fn decompose(img: &RgbaImage, elision: Elision) -> Vec<RectInfo> {
    let (w, h) = img.dimensions();
    let mut visited = vec![false; w as usize * h as usize];
    let idx = |x: u32, y: u32| y as usize * w as usize + x as usize;
    let mut rects = Vec::new();

    for y in 0..h {
        for x in 0..w {
            if visited[idx(x, y)] {
                continue;
            }
            let color = *img.get_pixel(x, y);
            if elision.is_background(color) {
                continue;
            }

            let open = |vx: u32, vy: u32, visited: &[bool]| {
                !visited[idx(vx, vy)] && *img.get_pixel(vx, vy) == color
            };

            let mut rw = 1;
            while x + rw < w && open(x + rw, y, &visited) {
                rw += 1;
            }

            let mut rh = 1;
            while y + rh < h && (x..x + rw).all(|k| open(k, y + rh, &visited)) {
                rh += 1;
            }

            for vy in y..y + rh {
                visited[idx(x, vy)..idx(x + rw, vy)].fill(true);
            }
            rects.push(RectInfo { x, y, width: rw, height: rh, color });
        }
    }

    rects
}

/// Paints `rects` onto `img` without blending.
pub fn paint_rects(img: &mut RgbaImage, rects: &[RectInfo]) {
    for r in rects {
        let rect = Rect::at(r.x as i32, r.y as i32).of_size(r.width, r.height);
        draw_filled_rect_mut(img, rect, r.color);
    }
}
