//! Hex color parsing shared by the raster and browser surfaces.

#[cfg(test)]
#[path = "color_test.rs"]
mod color_test;

/// An sRGB color with alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }
}

/// Parse `#RGB`, `#RRGGBB`, or `#RRGGBBAA` values.
#[must_use]
pub fn parse_hex(raw: &str) -> Option<Rgba> {
    let hex = raw.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    match hex.len() {
        3 => {
            let r = channel(&hex[0..1].repeat(2))?;
            let g = channel(&hex[1..2].repeat(2))?;
            let b = channel(&hex[2..3].repeat(2))?;
            Some(Rgba::rgb(r, g, b))
        }
        6 | 8 => {
            let r = channel(&hex[0..2])?;
            let g = channel(&hex[2..4])?;
            let b = channel(&hex[4..6])?;
            let a = if hex.len() == 8 { channel(&hex[6..8])? } else { 255 };
            Some(Rgba { r, g, b, a })
        }
        _ => None,
    }
}

/// Parse a hex color, falling back to black for anything unparseable.
#[must_use]
pub fn parse_hex_or_black(raw: &str) -> Rgba {
    parse_hex(raw).unwrap_or(Rgba::BLACK)
}

/// Two hex digits as one channel. Signs, spaces and other non-digits are rejected.
fn channel(pair: &str) -> Option<u8> {
    pair.bytes().try_fold(0u8, |acc, b| acc.checked_mul(16)?.checked_add(nibble(b)?))
}

fn nibble(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}
