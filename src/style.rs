use anyhow::{anyhow, Result};

pub const DEFAULT_LINE_WIDTH: f64 = 1.5;
pub const BORDER_COLOR: Color = Color::rgb(0x55, 0x55, 0x55);
pub const DEFAULT_FILL_COLOR: Color = Color::rgb(0xF6, 0xF6, 0xF6);
pub const DEFAULT_FONT_COLOR: Color = Color::rgb(0x00, 0x00, 0x00);
pub const BACKGROUND_COLOR: Color = Color::rgb(0xFF, 0xFF, 0xFF);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa`.
    pub fn from_hex(hex: &str) -> Result<Self> {
        let digits = hex.trim().trim_start_matches('#');
        let channel = |i: usize, len: usize| -> Result<u8> {
            let raw = digits
                .get(i * len..(i + 1) * len)
                .ok_or_else(|| anyhow!("Bad color {hex:?}"))?;
            let value = u8::from_str_radix(raw, 16).map_err(|_| anyhow!("Bad color {hex:?}"))?;
            Ok(if len == 1 { value * 17 } else { value })
        };
        match digits.len() {
            3 => Ok(Color::rgb(channel(0, 1)?, channel(1, 1)?, channel(2, 1)?)),
            6 => Ok(Color::rgb(channel(0, 2)?, channel(1, 2)?, channel(2, 2)?)),
            8 => Ok(Color::rgba(
                channel(0, 2)?,
                channel(1, 2)?,
                channel(2, 2)?,
                channel(3, 2)?,
            )),
            _ => Err(anyhow!("Bad color {hex:?}")),
        }
    }

    pub fn set_source(&self, ctx: &cairo::Context) {
        ctx.set_source_rgba(
            self.r as f64 / 255.0,
            self.g as f64 / 255.0,
            self.b as f64 / 255.0,
            self.a as f64 / 255.0,
        );
    }
}

/// Fill and stroke applied when painting a node outline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeStyle {
    pub fill: Option<Color>,
    pub border: Color,
    pub line_width: f64,
}

impl Default for NodeStyle {
    fn default() -> Self {
        Self {
            fill: Some(DEFAULT_FILL_COLOR),
            border: BORDER_COLOR,
            line_width: DEFAULT_LINE_WIDTH,
        }
    }
}
