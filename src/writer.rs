use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::buffer::ConvertBuffer;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{ImageFormat, RgbImage, RgbaImage};
use svg::node::element::{Definitions, Image, LinearGradient as SvgGradient, Rectangle, Stop};
use svg::{Document, Node};

use crate::common::color::{to_hex, WHITE};
use crate::common::error::WriterResult;
use crate::common::matrix::Matrix;
use crate::draw::{num, PathCanvas, PrimitiveCanvas};
use crate::gradient::LinearGradient;
use crate::mesh;
use crate::options::{OutputFormat, WriterOptions};
use crate::render::Renderer;

pub const GRADIENT_ID: &str = "qrGradient";

// Image encoders
//------------------------------------------------------------------------------

/// Turns a finished raster render into bytes.
pub trait ImageEncoder: Send + Sync {
    fn encode(&self, img: &RgbaImage, sink: &mut dyn Write) -> WriterResult<()>;
}

impl fmt::Debug for dyn ImageEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ImageEncoder")
    }
}

/// Baseline JPEG. Alpha is dropped.
#[derive(Debug, Default, Clone, Copy)]
pub struct JpegImageEncoder;

impl ImageEncoder for JpegImageEncoder {
    fn encode(&self, img: &RgbaImage, sink: &mut dyn Write) -> WriterResult<()> {
        let rgb: RgbImage = img.convert();
        rgb.write_with_encoder(JpegEncoder::new(sink))?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PngImageEncoder;

impl ImageEncoder for PngImageEncoder {
    fn encode(&self, img: &RgbaImage, sink: &mut dyn Write) -> WriterResult<()> {
        img.write_with_encoder(PngEncoder::new(sink))?;
        Ok(())
    }
}

// Writer
//------------------------------------------------------------------------------

/// Renders matrices with one fixed configuration. Build it with
/// [`WriterBuilder`](crate::WriterBuilder).
#[derive(Debug, Clone)]
pub struct Writer {
    opts: WriterOptions,
}

impl Writer {
    pub fn new(opts: WriterOptions) -> Self {
        Self { opts }
    }

    pub fn options(&self) -> &WriterOptions {
        &self.opts
    }

    /// Encodes `matrix` in the configured format and writes it to `sink`.
    pub fn write<M: Matrix, W: Write>(&self, matrix: &M, mut sink: W) -> WriterResult<()> {
        let format = self.opts.format;
        let bytes = match (&self.opts.encoder, format) {
            (Some(encoder), _) => self.encode_raster(matrix, encoder.as_ref())?,
            (None, OutputFormat::Jpeg) => {
                if self.opts.bg_transparent {
                    log::warn!("JPEG has no alpha channel, transparent background turns black");
                }
                log::debug!("Encoding JPEG...");
                self.encode_raster(matrix, &JpegImageEncoder)?
            }
            (None, OutputFormat::Png) => {
                log::debug!("Encoding PNG...");
                self.encode_raster(matrix, &PngImageEncoder)?
            }
            _ => self.render_svg(matrix)?.to_string().into_bytes(),
        };
        sink.write_all(&bytes)?;
        sink.flush()?;
        log::info!("Wrote {} bytes of {format:?}", bytes.len());
        Ok(())
    }

    pub fn save<M: Matrix>(&self, matrix: &M, path: impl AsRef<Path>) -> WriterResult<()> {
        let file = File::create(path)?;
        self.write(matrix, BufWriter::new(file))
    }

    /// Raster render at the output size with the logo composited over the centre.
    pub fn render_image<M: Matrix>(&self, matrix: &M) -> RgbaImage {
        let renderer = Renderer::new(&self.opts, matrix);
        log::debug!("Rendering modules...");
        let (mut img, stats) = renderer.rasterize();
        if let (Some(logo), Some((x, y))) = (renderer.logo(), renderer.logo_origin()) {
            let (scale, (dx, dy)) = renderer.view();
            let (x, y) = ((dx + x as f64 * scale).round(), (dy + y as f64 * scale).round());
            if scale == 1.0 {
                image::imageops::overlay(&mut img, logo, x as i64, y as i64);
            } else {
                let w = ((logo.width() as f64 * scale).round() as u32).max(1);
                let h = ((logo.height() as f64 * scale).round() as u32).max(1);
                let scaled = image::imageops::resize(logo, w, h, FilterType::CatmullRom);
                image::imageops::overlay(&mut img, &scaled, x as i64, y as i64);
            }
        }
        log::info!("Rendered {} modules onto {}x{}", stats.modules, img.width(), img.height());
        img
    }

    fn encode_raster<M: Matrix>(
        &self,
        matrix: &M,
        encoder: &dyn ImageEncoder,
    ) -> WriterResult<Vec<u8>> {
        let img = self.render_image(matrix);
        let mut buf = Vec::new();
        encoder.encode(&img, &mut buf)?;
        Ok(buf)
    }

    /// SVG document for the configured vector format. Raster formats fall back to
    /// [`OutputFormat::SvgPath`].
    ///
    /// Coordinates are always canvas pixels. A configured resolution only changes the document
    /// size and adds a `viewBox`.
    pub fn render_svg<M: Matrix>(&self, matrix: &M) -> WriterResult<Document> {
        let renderer = Renderer::new(&self.opts, matrix);
        let (w, h) = renderer.canvas_size();
        let (out_w, out_h) = renderer.output_size();
        let mut doc = Document::new()
            .set("width", out_w)
            .set("height", out_h)
            .set("shape-rendering", "crispEdges");
        if self.opts.resolution.is_some() {
            doc.assign("viewBox", (0, 0, w, h));
        }

        if self.opts.format == OutputFormat::SvgTraced {
            log::debug!("Tracing raster into rectangles...");
            let (img, _) = renderer.rasterize_unscaled();
            let rects = mesh::decompose(&img, self.opts.elision);
            log::info!("Traced {w}x{h} raster into {} rectangles", rects.len());

            doc.append(Rectangle::new().set("width", w).set("height", h).set("fill", to_hex(WHITE)));
            for r in rects {
                let mut rect = Rectangle::new()
                    .set("x", r.x)
                    .set("y", r.y)
                    .set("width", r.width)
                    .set("height", r.height)
                    .set("fill", to_hex(r.color));
                if r.color[3] < 255 {
                    rect.assign("fill-opacity", num(r.color[3] as f64 / 255.0));
                }
                doc.append(rect);
            }
        } else {
            let gradient = self.opts.gradient.as_ref();
            if let Some(g) = gradient {
                doc.append(gradient_defs(g, GRADIENT_ID, w, h));
            }

            let bg = self.opts.background();
            if bg[3] != 0 {
                doc.append(Rectangle::new().set("width", w).set("height", h).set("fill", to_hex(bg)));
            }

            log::debug!("Rendering modules...");
            let (mut group, stats, elements) = match self.opts.format {
                OutputFormat::SvgPrimitive => {
                    let mut canvas = PrimitiveCanvas::new();
                    if gradient.is_some() {
                        canvas = canvas.with_gradient_ref(GRADIENT_ID);
                    }
                    let stats = renderer.render(&mut canvas);
                    let elements = canvas.element_count();
                    (canvas.into_group(), stats, elements)
                }
                _ => {
                    let mut canvas = PathCanvas::new();
                    if gradient.is_some() {
                        canvas = canvas.with_gradient_ref(GRADIENT_ID);
                    }
                    let stats = renderer.render(&mut canvas);
                    let elements = canvas.element_count();
                    (canvas.into_group(), stats, elements)
                }
            };
            if gradient.is_some() {
                group.assign("fill", format!("url(#{GRADIENT_ID})"));
            }
            doc.append(group);
            log::info!("Rendered {} modules into {elements} SVG elements", stats.modules);
        }

        if let (Some(logo), Some((x, y))) = (renderer.logo(), renderer.logo_origin()) {
            doc.append(logo_image(logo, x, y)?);
        }
        Ok(doc)
    }
}

// SVG helpers
//------------------------------------------------------------------------------

fn gradient_defs(g: &LinearGradient, id: &str, w: u32, h: u32) -> Definitions {
    let line = g.line(w as f64, h as f64);
    let mut grad = SvgGradient::new()
        .set("id", id)
        .set("gradientUnits", "userSpaceOnUse")
        .set("x1", format!("{:.3}", line.x1))
        .set("y1", format!("{:.3}", line.y1))
        .set("x2", format!("{:.3}", line.x2))
        .set("y2", format!("{:.3}", line.y2));
    for stop in g.stops() {
        grad.append(
            Stop::new().set("offset", format!("{:.3}", stop.t)).set("stop-color", to_hex(stop.color)),
        );
    }
    Definitions::new().add(grad)
}

/// Inlines the logo as a base64 PNG.
fn logo_image(logo: &RgbaImage, x: u32, y: u32) -> WriterResult<Image> {
    let mut png = Vec::new();
    logo.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    let href = format!("data:image/png;base64,{}", STANDARD.encode(&png));
    Ok(Image::new()
        .set("x", x)
        .set("y", y)
        .set("width", logo.width())
        .set("height", logo.height())
        .set("href", href))
}
