use image::Rgba;

use super::error::{WriterError, WriterResult};

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

// Hex conversion
//------------------------------------------------------------------------------

/// Formats the RGB channels as `#rrggbb`. Alpha is dropped.
pub fn to_hex(c: Rgba<u8>) -> String {
    format!("#{:02x}{:02x}{:02x}", c[0], c[1], c[2])
}

/// Parses `#rgb`, `#rrggbb` or `#rrggbbaa`. The leading `#` is optional.
pub fn parse_hex(hex: &str) -> WriterResult<Rgba<u8>> {
    let err = || WriterError::InvalidColor(hex.to_string());
    let s = hex.strip_prefix('#').unwrap_or(hex);
    if !s.is_ascii() {
        return Err(err());
    }

    let channel = |i: usize, len: usize| u8::from_str_radix(&s[i..i + len], 16).map_err(|_| err());
    match s.len() {
        3 => {
            let (r, g, b) = (channel(0, 1)?, channel(1, 1)?, channel(2, 1)?);
            Ok(Rgba([r * 17, g * 17, b * 17, 255]))
        }
        6 => Ok(Rgba([channel(0, 2)?, channel(2, 2)?, channel(4, 2)?, 255])),
        8 => Ok(Rgba([channel(0, 2)?, channel(2, 2)?, channel(4, 2)?, channel(6, 2)?])),
        _ => Err(err()),
    }
}


// Background elision
//------------------------------------------------------------------------------

/// Decides which pixels count as background and may be left out of vector output.
#[derive(Debug, Default, PartialEq, Eq, Clone, Copy)]
pub enum Elision {
    /// Fully transparent pixels and opaque pure white pixels.
    #[default]
    TransparentOrWhite,
    /// Only fully transparent pixels. Keeps intentionally white foreground.
    TransparentOnly,
}

impl Elision {
    pub fn is_background(self, c: Rgba<u8>) -> bool {
        match self {
            Self::TransparentOrWhite => c[3] == 0 || (c[0] == 255 && c[1] == 255 && c[2] == 255),
            Self::TransparentOnly => c[3] == 0,
        }
    }
}
