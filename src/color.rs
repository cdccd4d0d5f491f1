//! Color values used for cell backgrounds, frames and cut lines.
//!
//! Colors travel as `#RRGGBB` / `#RRGGBBAA` strings at the edges (settings
//! JSON, the JS API) and as `u8` components everywhere else.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Opaque RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0);

    /// Create a new RGB color.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Parse from a hex string (with or without #). Accepts `RGB` and `RRGGBB`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        match hex.len() {
            3 => {
                let mut out = [0u8; 3];
                for (slot, ch) in out.iter_mut().zip(hex.chars()) {
                    let v = u8::try_from(ch.to_digit(16)?).ok()?;
                    *slot = v * 17;
                }
                let [r, g, b] = out;
                Some(Self { r, g, b })
            }
            6 => Some(Self {
                r: u8::from_str_radix(hex.get(0..2)?, 16).ok()?,
                g: u8::from_str_radix(hex.get(2..4)?, 16).ok()?,
                b: u8::from_str_radix(hex.get(4..6)?, 16).ok()?,
            }),
            _ => None,
        }
    }

    /// Convert to CSS hex string (#rrggbb).
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    /// Components scaled to 0.0..=1.0, the form PDF color operators take.
    pub fn to_unit(self) -> [f64; 3] {
        [
            f64::from(self.r) / 255.0,
            f64::from(self.g) / 255.0,
            f64::from(self.b) / 255.0,
        ]
    }

    pub const fn with_alpha(self, a: u8) -> Rgba {
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            a,
        }
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Rgb {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color '{s}'")))
    }
}

/// RGB color with straight (non-premultiplied) alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `#RRGGBB` (opaque) or `#RRGGBBAA`.
    pub fn from_hex(s: &str) -> Option<Self> {
        let hex = s.trim();
        let hex = hex.strip_prefix('#').unwrap_or(hex);
        if hex.len() == 8 {
            let rgb = Rgb::from_hex(hex.get(0..6)?)?;
            let a = u8::from_str_radix(hex.get(6..8)?, 16).ok()?;
            return Some(rgb.with_alpha(a));
        }
        Rgb::from_hex(hex).map(|c| c.with_alpha(255))
    }

    pub const fn rgb(self) -> Rgb {
        Rgb::new(self.r, self.g, self.b)
    }

    pub fn alpha_unit(self) -> f64 {
        f64::from(self.a) / 255.0
    }

    /// CSS color string understood by Canvas 2D.
    pub fn to_css(self) -> String {
        if self.a == 255 {
            self.rgb().to_hex()
        } else {
            format!(
                "rgba({}, {}, {}, {:.3})",
                self.r,
                self.g,
                self.b,
                self.alpha_unit()
            )
        }
    }
}

impl From<Rgb> for Rgba {
    fn from(c: Rgb) -> Self {
        c.with_alpha(255)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_short_and_long_hex() {
        assert_eq!(Rgb::from_hex("#fff"), Some(Rgb::WHITE));
        assert_eq!(Rgb::from_hex("888888"), Some(Rgb::new(0x88, 0x88, 0x88)));
        assert_eq!(Rgb::from_hex("#12345"), None);
        assert_eq!(Rgb::from_hex("#gg0000"), None);
    }

    #[test]
    fn rgba_accepts_alpha_suffix() {
        let c = Rgba::from_hex("#8b6914aa").unwrap();
        assert_eq!(c.rgb(), Rgb::new(0x8b, 0x69, 0x14));
        assert_eq!(c.a, 0xaa);
        assert_eq!(Rgba::from_hex("#d4af37").unwrap().a, 255);
    }

    #[test]
    fn css_output() {
        assert_eq!(Rgba::new(255, 0, 0, 255).to_css(), "#ff0000");
        assert_eq!(Rgba::new(0, 0, 0, 0).to_css(), "rgba(0, 0, 0, 0.000)");
    }

    #[test]
    fn serde_uses_hex_strings() {
        let json = serde_json::to_string(&Rgb::new(0x4a, 0x9e, 0xff)).unwrap();
        assert_eq!(json, "\"#4a9eff\"");
        let back: Rgb = serde_json::from_str("\"#FFFFFF\"").unwrap();
        assert_eq!(back, Rgb::WHITE);
        assert!(serde_json::from_str::<Rgb>("\"nope\"").is_err());
    }
}
