use std::path::PathBuf;
use std::sync::Arc;

use image::imageops::FilterType;
use image::{DynamicImage, Rgba, RgbaImage};

use crate::common::color::{parse_hex, Elision, BLACK, TRANSPARENT, WHITE};
use crate::common::error::{WriterError, WriterResult};
use crate::common::matrix::ModuleKind;
use crate::gradient::LinearGradient;
use crate::halftone::DEFAULT_THRESHOLD;
use crate::shape::Shape;
use crate::writer::{ImageEncoder, Writer};

pub const DEFAULT_BLOCK_WIDTH: u32 = 20;
pub const DEFAULT_PADDING: u32 = 20;
pub const DEFAULT_LOGO_MULTIPLIER: u32 = 5;

// Output format
//------------------------------------------------------------------------------

#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum OutputFormat {
    #[default]
    Jpeg,
    Png,
    /// One `<path>` per fill or stroke.
    SvgPath,
    /// Native `<rect>`/`<circle>` where possible.
    SvgPrimitive,
    /// Raster render traced back into `<rect>` elements.
    SvgTraced,
}

impl OutputFormat {
    pub fn is_vector(self) -> bool {
        matches!(self, Self::SvgPath | Self::SvgPrimitive | Self::SvgTraced)
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            _ => "svg",
        }
    }
}

// Border
//------------------------------------------------------------------------------

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Border {
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
    pub left: u32,
}

impl Default for Border {
    fn default() -> Self {
        Self::uniform(DEFAULT_PADDING)
    }
}

impl Border {
    pub const fn uniform(w: u32) -> Self {
        Self { top: w, right: w, bottom: w, left: w }
    }

    /// CSS-like shorthand: one value for all sides, two or three for vertical then horizontal,
    /// four or more for top, right, bottom, left. No values gives the default padding.
    pub fn from_shorthand(widths: &[u32]) -> Self {
        match *widths {
            [] => Self::default(),
            [all] => Self::uniform(all),
            [v, h] | [v, h, _] => Self { top: v, right: h, bottom: v, left: h },
            [top, right, bottom, left, ..] => Self { top, right, bottom, left },
        }
    }

    pub fn horizontal(&self) -> u32 {
        self.left + self.right
    }

    pub fn vertical(&self) -> u32 {
        self.top + self.bottom
    }
}

#[cfg(test)]
mod border_tests {
    use test_case::test_case;

    use super::{Border, DEFAULT_PADDING};

    #[test_case(&[], (DEFAULT_PADDING, DEFAULT_PADDING, DEFAULT_PADDING, DEFAULT_PADDING))]
    #[test_case(&[0], (0, 0, 0, 0))]
    #[test_case(&[4, 8], (4, 8, 4, 8))]
    #[test_case(&[4, 8, 99], (4, 8, 4, 8))]
    #[test_case(&[1, 2, 3, 4], (1, 2, 3, 4))]
    #[test_case(&[1, 2, 3, 4, 5], (1, 2, 3, 4))]
    fn test_shorthand(widths: &[u32], exp: (u32, u32, u32, u32)) {
        let b = Border::from_shorthand(widths);
        assert_eq!((b.top, b.right, b.bottom, b.left), exp);
    }
}

// Module colors
//------------------------------------------------------------------------------

/// Optional per-kind overrides of the foreground color.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub struct QRColors {
    pub data: Option<Rgba<u8>>,
    pub finder: Option<Rgba<u8>>,
}

impl QRColors {
    pub fn uniform(c: Rgba<u8>) -> Self {
        Self { data: Some(c), finder: Some(c) }
    }

    /// Finder modules use `finder`, everything else `data`. Missing entries fall back to `fg`.
    pub fn resolve(&self, kind: ModuleKind, fg: Rgba<u8>) -> Rgba<u8> {
        let c = match kind {
            ModuleKind::Finder => self.finder,
            _ => self.data,
        };
        c.unwrap_or(fg)
    }
}

// Image source
//------------------------------------------------------------------------------

#[derive(Debug, Clone)]
enum ImageSource {
    Image(DynamicImage),
    File(PathBuf),
}

impl ImageSource {
    fn load(&self) -> WriterResult<DynamicImage> {
        match self {
            Self::Image(img) => Ok(img.clone()),
            Self::File(path) => image::open(path)
                .map_err(|source| WriterError::ImageRead { path: path.clone(), source }),
        }
    }
}

#[derive(Debug, Clone)]
enum ColorSource {
    Rgba(Rgba<u8>),
    Hex(String),
}

impl ColorSource {
    fn resolve(&self) -> WriterResult<Rgba<u8>> {
        match self {
            Self::Rgba(c) => Ok(*c),
            Self::Hex(hex) => parse_hex(hex),
        }
    }
}

// Writer options
//------------------------------------------------------------------------------

/// Fully resolved configuration. Read-only during a render.
#[derive(Debug, Clone)]
pub struct WriterOptions {
    pub(crate) border: Border,
    pub(crate) block_width: u32,
    pub(crate) bg_color: Rgba<u8>,
    pub(crate) bg_transparent: bool,
    pub(crate) fg_color: Rgba<u8>,
    pub(crate) qr_colors: QRColors,
    pub(crate) gradient: Option<LinearGradient>,
    pub(crate) shape: Shape,
    pub(crate) logo: Option<RgbaImage>,
    pub(crate) logo_multiplier: u32,
    pub(crate) logo_safe_zone: bool,
    pub(crate) logo_fit: bool,
    pub(crate) halftone: Option<DynamicImage>,
    pub(crate) halftone_threshold: i32,
    pub(crate) format: OutputFormat,
    pub(crate) elision: Elision,
    pub(crate) resolution: Option<u32>,
    pub(crate) encoder: Option<Arc<dyn ImageEncoder>>,
}

impl Default for WriterOptions {
    fn default() -> Self {
        Self {
            border: Border::default(),
            block_width: DEFAULT_BLOCK_WIDTH,
            bg_color: WHITE,
            bg_transparent: false,
            fg_color: BLACK,
            qr_colors: QRColors::default(),
            gradient: None,
            shape: Shape::default(),
            logo: None,
            logo_multiplier: DEFAULT_LOGO_MULTIPLIER,
            logo_safe_zone: false,
            logo_fit: false,
            halftone: None,
            halftone_threshold: DEFAULT_THRESHOLD,
            format: OutputFormat::default(),
            elision: Elision::default(),
            resolution: None,
            encoder: None,
        }
    }
}

impl WriterOptions {
    pub fn border(&self) -> Border {
        self.border
    }

    pub fn block_width(&self) -> u32 {
        self.block_width
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn gradient(&self) -> Option<&LinearGradient> {
        self.gradient.as_ref()
    }

    pub fn elision(&self) -> Elision {
        self.elision
    }

    /// Side length of the square output, when fixed.
    pub fn resolution(&self) -> Option<u32> {
        self.resolution
    }

    /// Background as painted: transparent when requested.
    pub fn background(&self) -> Rgba<u8> {
        if self.bg_transparent {
            TRANSPARENT
        } else {
            self.bg_color
        }
    }

    /// Flat color of a module ignoring any gradient.
    pub fn module_color(&self, set: bool, kind: ModuleKind) -> Rgba<u8> {
        if set {
            self.qr_colors.resolve(kind, self.fg_color)
        } else {
            self.background()
        }
    }

    /// Logo prepared for a `w x h` canvas, or `None` when there is no logo or it is too large.
    ///
    /// With fitting enabled the logo is first scaled, aspect preserved, to fit the matrix area
    /// `qr_w x qr_h` divided by the multiplier.
    pub fn logo_for(&self, (w, h): (u32, u32), (qr_w, qr_h): (u32, u32)) -> Option<RgbaImage> {
        let logo = self.logo.as_ref()?;
        let mult = self.logo_multiplier;
        let logo = if self.logo_fit {
            fit_logo(logo, qr_w / mult, qr_h / mult)
        } else {
            logo.clone()
        };

        let (lw, lh) = logo.dimensions();
        if lw * mult > w || lh * mult > h {
            log::warn!("Logo {lw}x{lh} exceeds 1/{mult} of the {w}x{h} canvas, skipping it");
            return None;
        }
        Some(logo)
    }
}

fn fit_logo(logo: &RgbaImage, max_w: u32, max_h: u32) -> RgbaImage {
    let (lw, lh) = logo.dimensions();
    if lw == 0 || lh == 0 {
        return logo.clone();
    }
    let ratio = (max_w as f64 / lw as f64).min(max_h as f64 / lh as f64);
    let w = ((lw as f64 * ratio).round() as u32).max(1);
    let h = ((lh as f64 * ratio).round() as u32).max(1);
    image::imageops::resize(logo, w, h, FilterType::CatmullRom)
}


// Writer builder
//------------------------------------------------------------------------------

pub struct WriterBuilder {
    border: Border,
    block_width: u32,
    bg_color: ColorSource,
    bg_transparent: bool,
    fg_color: ColorSource,
    data_color: Option<ColorSource>,
    finder_color: Option<ColorSource>,
    gradient: Option<LinearGradient>,
    shape: Shape,
    logo: Option<ImageSource>,
    logo_multiplier: u32,
    logo_safe_zone: bool,
    logo_fit: bool,
    halftone: Option<ImageSource>,
    halftone_threshold: i32,
    format: OutputFormat,
    elision: Elision,
    resolution: Option<u32>,
    encoder: Option<Arc<dyn ImageEncoder>>,
}

impl Default for WriterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WriterBuilder {
    pub fn new() -> Self {
        Self {
            border: Border::default(),
            block_width: DEFAULT_BLOCK_WIDTH,
            bg_color: ColorSource::Rgba(WHITE),
            bg_transparent: false,
            fg_color: ColorSource::Rgba(BLACK),
            data_color: None,
            finder_color: None,
            gradient: None,
            shape: Shape::default(),
            logo: None,
            logo_multiplier: DEFAULT_LOGO_MULTIPLIER,
            logo_safe_zone: false,
            logo_fit: false,
            halftone: None,
            halftone_threshold: DEFAULT_THRESHOLD,
            format: OutputFormat::default(),
            elision: Elision::default(),
            resolution: None,
            encoder: None,
        }
    }

    pub fn border(&mut self, widths: &[u32]) -> &mut Self {
        self.border = Border::from_shorthand(widths);
        self
    }

    pub fn block_width(&mut self, width: u32) -> &mut Self {
        self.block_width = width;
        self
    }

    pub fn bg_color(&mut self, color: Rgba<u8>) -> &mut Self {
        self.bg_color = ColorSource::Rgba(color);
        self
    }

    pub fn bg_color_hex(&mut self, hex: &str) -> &mut Self {
        self.bg_color = ColorSource::Hex(hex.to_string());
        self
    }

    pub fn bg_transparent(&mut self, transparent: bool) -> &mut Self {
        self.bg_transparent = transparent;
        self
    }

    pub fn fg_color(&mut self, color: Rgba<u8>) -> &mut Self {
        self.fg_color = ColorSource::Rgba(color);
        self
    }

    pub fn fg_color_hex(&mut self, hex: &str) -> &mut Self {
        self.fg_color = ColorSource::Hex(hex.to_string());
        self
    }

    pub fn data_color(&mut self, color: Rgba<u8>) -> &mut Self {
        self.data_color = Some(ColorSource::Rgba(color));
        self
    }

    pub fn finder_color(&mut self, color: Rgba<u8>) -> &mut Self {
        self.finder_color = Some(ColorSource::Rgba(color));
        self
    }

    pub fn qr_colors(&mut self, colors: QRColors) -> &mut Self {
        self.data_color = colors.data.map(ColorSource::Rgba);
        self.finder_color = colors.finder.map(ColorSource::Rgba);
        self
    }

    pub fn gradient(&mut self, gradient: LinearGradient) -> &mut Self {
        self.gradient = Some(gradient);
        self
    }

    pub fn shape(&mut self, shape: Shape) -> &mut Self {
        self.shape = shape;
        self
    }

    pub fn logo(&mut self, logo: DynamicImage) -> &mut Self {
        self.logo = Some(ImageSource::Image(logo));
        self
    }

    pub fn logo_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.logo = Some(ImageSource::File(path.into()));
        self
    }

    pub fn logo_size_multiplier(&mut self, multiplier: u32) -> &mut Self {
        self.logo_multiplier = multiplier;
        self
    }

    pub fn logo_safe_zone(&mut self, safe_zone: bool) -> &mut Self {
        self.logo_safe_zone = safe_zone;
        self
    }

    /// Scales the logo to the largest size the multiplier allows.
    pub fn logo_fit(&mut self, fit: bool) -> &mut Self {
        self.logo_fit = fit;
        self
    }

    pub fn halftone(&mut self, src: DynamicImage) -> &mut Self {
        self.halftone = Some(ImageSource::Image(src));
        self
    }

    pub fn halftone_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.halftone = Some(ImageSource::File(path.into()));
        self
    }

    pub fn halftone_threshold(&mut self, threshold: i32) -> &mut Self {
        self.halftone_threshold = threshold;
        self
    }

    pub fn format(&mut self, format: OutputFormat) -> &mut Self {
        self.format = format;
        self
    }

    pub fn elision(&mut self, elision: Elision) -> &mut Self {
        self.elision = elision;
        self
    }

    /// Renders into a `resolution x resolution` output. Raster formats draw the geometry at that
    /// size, SVG keeps its coordinates and gains a `viewBox`.
    pub fn resolution(&mut self, resolution: u32) -> &mut Self {
        self.resolution = Some(resolution);
        self
    }

    /// Encodes the raster render with `encoder` instead of the configured format.
    pub fn encoder(&mut self, encoder: impl ImageEncoder + 'static) -> &mut Self {
        self.encoder = Some(Arc::new(encoder));
        self
    }
}

impl WriterBuilder {
    pub fn build(&self) -> WriterResult<Writer> {
        self.build_options().map(Writer::new)
    }

    pub fn build_options(&self) -> WriterResult<WriterOptions> {
        if self.block_width == 0 {
            return Err(WriterError::InvalidBlockWidth);
        }

        let qr_colors = QRColors {
            data: self.data_color.as_ref().map(ColorSource::resolve).transpose()?,
            finder: self.finder_color.as_ref().map(ColorSource::resolve).transpose()?,
        };

        let gradient = match &self.gradient {
            Some(g) if g.is_empty() => {
                log::warn!("Gradient has no color stops, using flat colors");
                None
            }
            g => g.clone(),
        };

        let logo_multiplier = if self.logo_multiplier == 0 {
            log::warn!("Logo multiplier must be positive, using {DEFAULT_LOGO_MULTIPLIER}");
            DEFAULT_LOGO_MULTIPLIER
        } else {
            self.logo_multiplier
        };

        if !(0..=255).contains(&self.halftone_threshold) {
            log::warn!("Halftone threshold {} outside 0..=255", self.halftone_threshold);
        }

        let resolution = match self.resolution {
            Some(0) => {
                log::warn!("Resolution must be positive, using the natural size");
                None
            }
            r => r,
        };

        let logo = self.logo.as_ref().map(ImageSource::load).transpose()?.map(|l| l.to_rgba8());
        let halftone = self.halftone.as_ref().map(ImageSource::load).transpose()?;

        Ok(WriterOptions {
            border: self.border,
            block_width: self.block_width,
            bg_color: self.bg_color.resolve()?,
            bg_transparent: self.bg_transparent,
            fg_color: self.fg_color.resolve()?,
            qr_colors,
            gradient,
            shape: self.shape.clone(),
            logo,
            logo_multiplier,
            logo_safe_zone: self.logo_safe_zone,
            logo_fit: self.logo_fit,
            halftone,
            halftone_threshold: self.halftone_threshold,
            format: self.format,
            elision: self.elision,
            resolution,
            encoder: self.encoder.clone(),
        })
    }
}
