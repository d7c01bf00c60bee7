//! Colours, WCAG contrast and the deck palette.

use std::fmt;
use std::str::FromStr;

/// Luminance contrast that normal-size text should reach.
const MIN_TEXT_CONTRAST: f64 = 4.5;

/// A 24-bit sRGB colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    pub const BLACK: Rgb = Rgb(0, 0, 0);

    /// Upper-case hex without `#`, as used in DrawingML `srgbClr`.
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.0, self.1, self.2)
    }

    /// WCAG relative luminance in `0.0..=1.0`.
    pub fn relative_luminance(&self) -> f64 {
        fn channel(c: u8) -> f64 {
            let c = c as f64 / 255.0;
            if c <= 0.03928 {
                c / 12.92
            } else {
                ((c + 0.055) / 1.055).powf(2.4)
            }
        }
        0.2126 * channel(self.0) + 0.7152 * channel(self.1) + 0.0722 * channel(self.2)
    }

    /// WCAG contrast ratio between two colours, `1.0..=21.0`.
    pub fn contrast_ratio(&self, other: &Rgb) -> f64 {
        let a = self.relative_luminance();
        let b = other.relative_luminance();
        let (lighter, darker) = if a > b { (a, b) } else { (b, a) };
        (lighter + 0.05) / (darker + 0.05)
    }

    /// White or black, whichever reads better on this background.
    ///
    /// White wins when it reaches 4.5:1 or beats black.
    pub fn text_color(&self) -> Rgb {
        let white = self.contrast_ratio(&Rgb::WHITE);
        let black = self.contrast_ratio(&Rgb::BLACK);
        if white >= MIN_TEXT_CONTRAST || white >= black {
            Rgb::WHITE
        } else {
            Rgb::BLACK
        }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }
}

impl FromStr for Rgb {
    type Err = String;

    /// Parse `#rrggbb` or `rrggbb`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(format!("invalid hex colour '{}'", s));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| format!("invalid hex colour '{}': {}", s, e))
        };
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// White or black text for a `background`, whichever reads better.
pub fn text_color_for(background: Rgb) -> Rgb {
    background.text_color()
}

/// The two theme colours a generated deck is drawn with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Slide background.
    pub primary: Rgb,

    /// Rules, borders and decorative dots.
    pub accent: Rgb,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            primary: Rgb(0x2c, 0x3e, 0x50),
            accent: Rgb(0x34, 0x98, 0xdb),
        }
    }
}

impl Palette {
    /// Create a palette from two colours.
    pub fn new(primary: Rgb, accent: Rgb) -> Self {
        Self { primary, accent }
    }

    /// Text colour for the primary background.
    pub fn text(&self) -> Rgb {
        self.primary.text_color()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex() {
        assert_eq!("#2c3e50".parse::<Rgb>(), Ok(Rgb(0x2c, 0x3e, 0x50)));
        assert_eq!("FFFFFF".parse::<Rgb>(), Ok(Rgb::WHITE));
        assert!("#fff".parse::<Rgb>().is_err());
        assert!("#gg0000".parse::<Rgb>().is_err());
        assert!("midnight".parse::<Rgb>().is_err());
    }

    #[test]
    fn test_hex_formatting() {
        let c = Rgb(0x34, 0x98, 0xdb);
        assert_eq!(c.to_hex(), "3498DB");
        assert_eq!(c.to_string(), "#3498db");
    }

    #[test]
    fn test_contrast_extremes() {
        let ratio = Rgb::WHITE.contrast_ratio(&Rgb::BLACK);
        assert!((ratio - 21.0).abs() < 1e-9);
        assert!((Rgb::WHITE.contrast_ratio(&Rgb::WHITE) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_text_color_for_backgrounds() {
        assert_eq!(Rgb(0x2c, 0x3e, 0x50).text_color(), Rgb::WHITE);
        assert_eq!(Rgb::BLACK.text_color(), Rgb::WHITE);
        assert_eq!(Rgb(0xf5, 0xf5, 0xdc).text_color(), Rgb::BLACK);
        assert_eq!(Rgb::WHITE.text_color(), Rgb::BLACK);
        assert_eq!(text_color_for(Rgb(0x34, 0x98, 0xdb)), Rgb::BLACK);
    }

    #[test]
    fn test_default_palette_text() {
        assert_eq!(Palette::default().text(), Rgb::WHITE);
    }
}
