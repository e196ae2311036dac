use std::ops::BitOr;

// Module
//------------------------------------------------------------------------------

/// Structural role of a module within the QR symbol.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub enum ModuleKind {
    Finder,
    Separator,
    Timing,
    Alignment,
    Format,
    Version,
    Data,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Module {
    set: bool,
    kind: ModuleKind,
}

impl Module {
    pub const fn new(set: bool, kind: ModuleKind) -> Self {
        Self { set, kind }
    }

    pub const fn dark(kind: ModuleKind) -> Self {
        Self { set: true, kind }
    }

    pub const fn light(kind: ModuleKind) -> Self {
        Self { set: false, kind }
    }

    pub fn is_set(&self) -> bool {
        self.set
    }

    pub fn kind(&self) -> ModuleKind {
        self.kind
    }
}

// Matrix
//------------------------------------------------------------------------------

/// A finished QR symbol. Produced elsewhere, read-only here.
pub trait Matrix {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    /// Module at column `x`, row `y`. Callers stay within `width() x height()`.
    fn get(&self, x: usize, y: usize) -> Module;

    /// Row-major walk over every module as `(x, y, module)`.
    fn iter(&self) -> MatrixIter<'_, Self>
    where
        Self: Sized,
    {
        MatrixIter::new(self)
    }
}

pub struct MatrixIter<'a, M: Matrix + ?Sized> {
    matrix: &'a M,
    x: usize,
    y: usize,
}

impl<'a, M: Matrix + ?Sized> MatrixIter<'a, M> {
    pub fn new(matrix: &'a M) -> Self {
        Self { matrix, x: 0, y: 0 }
    }
}

impl<M: Matrix + ?Sized> Iterator for MatrixIter<'_, M> {
    type Item = (usize, usize, Module);

    fn next(&mut self) -> Option<Self::Item> {
        let (w, h) = (self.matrix.width(), self.matrix.height());
        if w == 0 || self.y >= h {
            return None;
        }

        let res = (self.x, self.y, self.matrix.get(self.x, self.y));
        self.x += 1;
        if self.x == w {
            self.x = 0;
            self.y += 1;
        }
        Some(res)
    }
}

// Module grid
//------------------------------------------------------------------------------

/// Plain owned matrix. Handy for callers whose QR type is not a [`Matrix`] yet, and for tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleGrid {
    grid: Vec<Module>,
    w: usize,
    h: usize,
}

impl ModuleGrid {
    pub fn new(w: usize, h: usize) -> Self {
        Self { grid: vec![Module::light(ModuleKind::Data); w * h], w, h }
    }

    pub fn set(&mut self, x: usize, y: usize, module: Module) {
        debug_assert!(x < self.w && y < self.h, "Module out of bounds: {x} {y}");
        self.grid[y * self.w + x] = module;
    }

    pub fn from_fn(w: usize, h: usize, f: impl Fn(usize, usize) -> Module) -> Self {
        let grid = (0..h).flat_map(|y| (0..w).map(move |x| (x, y))).map(|(x, y)| f(x, y)).collect();
        Self { grid, w, h }
    }

    /// Parses one line per row. Lowercase is dark, uppercase is light:
    /// `f` finder, `s` separator, `t` timing, `a` alignment, `m` format, `v` version, `d` data.
    pub fn from_debug_str(s: &str) -> Option<Self> {
        let rows = s.lines().map(str::trim).filter(|l| !l.is_empty()).collect::<Vec<_>>();
        let w = rows.first()?.chars().count();
        let h = rows.len();
        let mut grid = Vec::with_capacity(w * h);
        for row in rows {
            if row.chars().count() != w {
                return None;
            }
            for ch in row.chars() {
                let kind = match ch.to_ascii_lowercase() {
                    'f' => ModuleKind::Finder,
                    's' => ModuleKind::Separator,
                    't' => ModuleKind::Timing,
                    'a' => ModuleKind::Alignment,
                    'm' => ModuleKind::Format,
                    'v' => ModuleKind::Version,
                    'd' => ModuleKind::Data,
                    _ => return None,
                };
                grid.push(Module::new(ch.is_ascii_lowercase(), kind));
            }
        }
        Some(Self { grid, w, h })
    }

    pub fn to_debug_str(&self) -> String {
        let mut res = String::with_capacity(self.h * (self.w + 1) + 1);
        res.push('\n');
        for row in self.grid.chunks(self.w.max(1)) {
            for m in row {
                let c = match m.kind() {
                    ModuleKind::Finder => 'f',
                    ModuleKind::Separator => 's',
                    ModuleKind::Timing => 't',
                    ModuleKind::Alignment => 'a',
                    ModuleKind::Format => 'm',
                    ModuleKind::Version => 'v',
                    ModuleKind::Data => 'd',
                };
                res.push(if m.is_set() { c } else { c.to_ascii_uppercase() });
            }
            res.push('\n');
        }
        res
    }
}

impl Matrix for ModuleGrid {
    fn width(&self) -> usize {
        self.w
    }

    fn height(&self) -> usize {
        self.h
    }

    fn get(&self, x: usize, y: usize) -> Module {
        self.grid[y * self.w + x]
    }
}

#[cfg(test)]
mod grid_tests {
    use super::{Matrix, Module, ModuleGrid, ModuleKind};

    #[test]
    fn test_debug_str_round_trip() {
        let s = "\nfFd\nDtT\nmav\n";
        let grid = ModuleGrid::from_debug_str(s).unwrap();
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.height(), 3);
        assert_eq!(grid.get(0, 0), Module::dark(ModuleKind::Finder));
        assert_eq!(grid.get(1, 0), Module::light(ModuleKind::Finder));
        assert_eq!(grid.get(0, 1), Module::light(ModuleKind::Data));
        assert_eq!(grid.to_debug_str(), s);
    }

    #[test]
    fn test_debug_str_rejects_ragged_rows() {
        assert!(ModuleGrid::from_debug_str("dd\nd").is_none());
        assert!(ModuleGrid::from_debug_str("dx").is_none());
        assert!(ModuleGrid::from_debug_str("").is_none());
    }

    #[test]
    fn test_row_major_iter() {
        let grid = ModuleGrid::from_fn(3, 2, |x, y| Module::new((x + y) % 2 == 0, ModuleKind::Data));
        let coords = grid.iter().map(|(x, y, _)| (x, y)).collect::<Vec<_>>();
        assert_eq!(coords, vec![(0, 0), (1, 0), (2, 0), (0, 1), (1, 1), (2, 1)]);
        let set = grid.iter().filter(|(_, _, m)| m.is_set()).count();
        assert_eq!(set, 3);
    }
}

// Neighbours
//------------------------------------------------------------------------------

/// 9-bit occupancy mask over the 3x3 neighbourhood of a module.
///
/// Bit layout, lowest bit first:
/// ```text
/// TOP_LEFT  TOP   TOP_RIGHT
/// LEFT      SELF  RIGHT
/// BOT_LEFT  BOT   BOT_RIGHT
/// ```
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy, Hash)]
pub struct Neighbours(u16);

impl Neighbours {
    pub const NONE: Self = Self(0);
    pub const TOP_LEFT: Self = Self(1 << 0);
    pub const TOP: Self = Self(1 << 1);
    pub const TOP_RIGHT: Self = Self(1 << 2);
    pub const LEFT: Self = Self(1 << 3);
    pub const SELF: Self = Self(1 << 4);
    pub const RIGHT: Self = Self(1 << 5);
    pub const BOT_LEFT: Self = Self(1 << 6);
    pub const BOT: Self = Self(1 << 7);
    pub const BOT_RIGHT: Self = Self(1 << 8);

    pub const fn from_bits(bits: u16) -> Self {
        Self(bits & 0x1ff)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for Neighbours {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

// Occupancy grid
//------------------------------------------------------------------------------

/// Boolean snapshot of which modules are set, taken once before rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Occupancy {
    bits: Vec<bool>,
    w: usize,
    h: usize,
}

impl Occupancy {
    pub fn from_matrix<M: Matrix>(matrix: &M) -> Self {
        let (w, h) = (matrix.width(), matrix.height());
        let mut bits = vec![false; w * h];
        matrix.iter().for_each(|(x, y, m)| bits[y * w + x] = m.is_set());
        Self { bits, w, h }
    }

    pub fn clear(&mut self, x: usize, y: usize) {
        self.bits[y * self.w + x] = false;
    }

    pub fn is_set(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 || x >= self.w as i64 || y >= self.h as i64 {
            return false;
        }
        self.bits[y as usize * self.w + x as usize]
    }

    pub fn neighbours(&self, x: usize, y: usize) -> Neighbours {
        let (x, y) = (x as i64, y as i64);
        let mut bits = 0;
        let mut k = 0;
        for dy in -1..=1 {
            for dx in -1..=1 {
                if self.is_set(x + dx, y + dy) {
                    bits |= 1 << k;
                }
                k += 1;
            }
        }
        Neighbours(bits)
    }
}
