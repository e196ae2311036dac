//! # qrism-writer
//!
//! Styled rendering for finished QR matrices. One drawing vocabulary feeds three backends: a raster
//! canvas for PNG and JPEG, an SVG path recorder and an SVG primitive recorder. On top of that sit
//! module shapes, per-kind colors, linear gradients, halftone overlays and centred logos.
//!
//! ## Features
//!
//! - **Module Shapes**: Built-in squares and circles, plus composable custom shapes that see the
//!   3x3 neighbourhood of every module
//! - **Backends**: Raster (PNG, JPEG), SVG paths, native SVG primitives and traced SVG
//! - **Gradients**: Linear gradients that span the canvas identically in raster and vector output
//! - **Halftone**: Blend a picture into the data modules, 3x3 sub-cells per module
//! - **Logos**: Centred raster logos with an optional safe zone cleared around them
//! - **Rectangle Decomposition**: Greedy meshing of any raster into disjoint same-colour rectangles
//!
//! ## Quick Start
//!
//! ```rust
//! use qrism_writer::{Module, ModuleGrid, ModuleKind, OutputFormat, Shape, WriterBuilder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Any type implementing `Matrix` works, `ModuleGrid` is the plain owned one
//! let matrix = ModuleGrid::from_fn(21, 21, |x, y| Module::new((x + y) % 2 == 0, ModuleKind::Data));
//!
//! let writer = WriterBuilder::new()
//!     .block_width(10)              // Pixels per module - defaults to 20
//!     .border(&[20])                // Padding, CSS-like shorthand - defaults to 20 on every side
//!     .shape(Shape::Circle)         // Module shape - defaults to Shape::Square
//!     .fg_color_hex("#1a237e")      // Foreground - defaults to black
//!     .format(OutputFormat::SvgPath) // Output format - defaults to JPEG
//!     .build()?;
//!
//! let mut svg = Vec::new();
//! writer.write(&matrix, &mut svg)?;
//! # Ok(())
//! # }
//! ```
//!
//! ### Custom Shapes
//!
//! ```rust
//! use qrism_writer::shape::{Assembled, LiquidBlock, RingFinder};
//! use qrism_writer::{ModuleGrid, OutputFormat, Shape, WriterBuilder};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let matrix = ModuleGrid::from_debug_str("fdD\nDdd\nfDd").ok_or("bad matrix")?;
//!
//! // Ring finders, liquid data modules that melt into their neighbours
//! let shape = Assembled::new(Shape::custom(RingFinder::default()), Shape::custom(LiquidBlock));
//! let writer = WriterBuilder::new().shape(Shape::custom(shape)).format(OutputFormat::Png).build()?;
//!
//! let img = writer.render_image(&matrix);
//! assert_eq!(img.dimensions(), (100, 100));
//! # Ok(())
//! # }
//! ```
//!
//! ## Drawing Model
//!
//! Shapes never see a backend. They receive a [`DrawContext`](draw::DrawContext) holding the
//! module's cell, its resolved paint and its neighbour mask, and issue path commands through the
//! [`Canvas`](draw::Canvas) trait. `fill` and `stroke` commit everything built so far as one
//! primitive and reset line width, dash, line cap and fill rule.
//!
//! ## Traced SVG
//!
//! [`OutputFormat::SvgTraced`] renders a raster first and re-expresses it as the smallest set of
//! `<rect>` elements the greedy mesher finds. The mesher is also available on its own through
//! [`mesh::decompose`].

#![allow(clippy::items_after_test_module)]

pub(crate) mod common;
pub mod draw;
pub mod gradient;
pub mod halftone;
pub mod mesh;
pub mod options;
pub mod render;
pub mod shape;
pub mod writer;

pub use common::color::{parse_hex, to_hex, Elision};
pub use common::error::{WriterError, WriterResult};
pub use common::matrix::{Matrix, MatrixIter, Module, ModuleGrid, ModuleKind, Neighbours, Occupancy};
pub use gradient::{ColorStop, GradientLine, LinearGradient};
pub use options::{Border, OutputFormat, QRColors, WriterBuilder, WriterOptions};
pub use render::{RenderStats, Renderer};
pub use shape::{ModuleShape, Shape};
pub use writer::{ImageEncoder, JpegImageEncoder, PngImageEncoder, Writer};
