//! Linear RGB colours.
//!
//! Colours are authored the way artists write them (hex literals, `#rrggbb`
//! strings, CSS names) which are sRGB encoded. Shading happens in linear
//! space, so every constructor here except [`Color::linear`] converts from
//! sRGB on the way in.

use anyhow::{Context, bail};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::linear(1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::linear(0.0, 0.0, 0.0);

    /// Build a colour from components that are already linear.
    pub const fn linear(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Build a colour from sRGB encoded components in `0.0..=1.0`.
    pub fn srgb(r: f32, g: f32, b: f32) -> Self {
        Self {
            r: srgb_to_linear(r),
            g: srgb_to_linear(g),
            b: srgb_to_linear(b),
        }
    }

    /// `0xff0000` style literal, interpreted as sRGB.
    pub fn from_hex(hex: u32) -> Self {
        let r = ((hex >> 16) & 0xff) as f32 / 255.0;
        let g = ((hex >> 8) & 0xff) as f32 / 255.0;
        let b = (hex & 0xff) as f32 / 255.0;
        Self::srgb(r, g, b)
    }

    /// Parse `#rrggbb`, `#rgb` or a CSS colour keyword.
    pub fn parse(value: &str) -> anyhow::Result<Self> {
        let value = value.trim();
        if let Some(digits) = value.strip_prefix('#') {
            if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
                bail!("invalid hex colour {value}");
            }
            let hex = match digits.len() {
                6 => u32::from_str_radix(digits, 16)
                    .with_context(|| format!("invalid hex colour {value}"))?,
                3 => {
                    let short = u32::from_str_radix(digits, 16)
                        .with_context(|| format!("invalid hex colour {value}"))?;
                    let (r, g, b) = ((short >> 8) & 0xf, (short >> 4) & 0xf, short & 0xf);
                    (r * 0x11) << 16 | (g * 0x11) << 8 | (b * 0x11)
                }
                _ => bail!("hex colour {value} must have 3 or 6 digits"),
            };
            return Ok(Self::from_hex(hex));
        }
        let hex = match value.to_ascii_lowercase().as_str() {
            "black" => 0x000000,
            "white" => 0xffffff,
            "red" => 0xff0000,
            "lime" => 0x00ff00,
            "green" => 0x008000,
            "blue" => 0x0000ff,
            "yellow" => 0xffff00,
            "cyan" | "aqua" => 0x00ffff,
            "magenta" | "fuchsia" => 0xff00ff,
            "orange" => 0xffa500,
            "pink" => 0xffc0cb,
            "hotpink" => 0xff69b4,
            "purple" => 0x800080,
            "gray" | "grey" => 0x808080,
            other => bail!("unknown colour name {other}"),
        };
        Ok(Self::from_hex(hex))
    }

    pub fn to_array(self) -> [f32; 3] {
        [self.r, self.g, self.b]
    }

    pub fn scaled(self, factor: f32) -> Self {
        Self::linear(self.r * factor, self.g * factor, self.b * factor)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl From<u32> for Color {
    fn from(hex: u32) -> Self {
        Self::from_hex(hex)
    }
}

impl From<Color> for wgpu::Color {
    fn from(c: Color) -> Self {
        wgpu::Color {
            r: c.r as f64,
            g: c.g as f64,
            b: c.b as f64,
            a: 1.0,
        }
    }
}

pub fn srgb_to_linear(c: f32) -> f32 {
    if c < 0.04045 {
        c * 0.0773993808
    } else {
        (c * 0.9478672986 + 0.0521327014).powf(2.4)
    }
}
