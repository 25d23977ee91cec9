//! CSS colour parsing utilities

use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Error type for color parsing failures
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ColorParseError {
    #[error("Invalid hex color format: {0}")]
    InvalidHex(String),
    #[error("Invalid color function: {0}")]
    InvalidFunction(String),
    #[error("Unknown color name: {0}")]
    UnknownName(String),
}

/// A resolved colour with 8-bit channels and a unit alpha.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

/// Parse a color from the CSS notations used in themes and palettes
pub fn parse_color(input: &str) -> Result<Rgba, ColorParseError> {
    let input = input.trim();

    if input.starts_with('#') {
        return parse_hex_color(input);
    }

    let lower = input.to_ascii_lowercase();
    if lower.starts_with("rgb(") || lower.starts_with("rgba(") {
        return parse_rgb_function(input);
    }

    parse_named_color(input)
}

/// Parse hex color in format #RGB, #RGBA, #RRGGBB or #RRGGBBAA
fn parse_hex_color(hex: &str) -> Result<Rgba, ColorParseError> {
    let invalid = || ColorParseError::InvalidHex(hex.to_string());
    let digits = &hex[1..];
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }

    let channel = |s: &str| u8::from_str_radix(s, 16).map_err(|_| invalid());
    match digits.len() {
        3 | 4 => {
            // short form, each digit doubled: 17 = 255/15
            let mut c = digits
                .chars()
                .map(|d| d.to_digit(16).map(|v| v as u8 * 17).ok_or_else(invalid));
            let r = c.next().ok_or_else(invalid)??;
            let g = c.next().ok_or_else(invalid)??;
            let b = c.next().ok_or_else(invalid)??;
            let a = c.next().transpose()?.map_or(1.0, |a| f32::from(a) / 255.0);
            Ok(Rgba { r, g, b, a })
        }
        6 | 8 => {
            let r = channel(&digits[0..2])?;
            let g = channel(&digits[2..4])?;
            let b = channel(&digits[4..6])?;
            let a = if digits.len() == 8 {
                f32::from(channel(&digits[6..8])?) / 255.0
            } else {
                1.0
            };
            Ok(Rgba { r, g, b, a })
        }
        _ => Err(invalid()),
    }
}

/// Parse `rgb(r, g, b)` and `rgba(r, g, b, a)`
fn parse_rgb_function(input: &str) -> Result<Rgba, ColorParseError> {
    let invalid = || ColorParseError::InvalidFunction(input.to_string());

    let open = input.find('(').ok_or_else(invalid)?;
    let args = input[open + 1..].strip_suffix(')').ok_or_else(invalid)?;
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(invalid());
    }

    let channel = |s: &str| s.parse::<u8>().map_err(|_| invalid());
    let r = channel(parts[0])?;
    let g = channel(parts[1])?;
    let b = channel(parts[2])?;
    let a = match parts.get(3) {
        Some(alpha) => {
            let a = alpha.parse::<f32>().map_err(|_| invalid())?;
            if !(0.0..=1.0).contains(&a) {
                return Err(invalid());
            }
            a
        }
        None => 1.0,
    };
    Ok(Rgba { r, g, b, a })
}

/// Parse named color (case-insensitive)
fn parse_named_color(name: &str) -> Result<Rgba, ColorParseError> {
    match name.to_lowercase().as_str() {
        "black" => Ok(Rgba::rgb(0, 0, 0)),
        "white" => Ok(Rgba::rgb(255, 255, 255)),
        "red" => Ok(Rgba::rgb(255, 0, 0)),
        "green" => Ok(Rgba::rgb(0, 128, 0)),
        "blue" => Ok(Rgba::rgb(0, 0, 255)),
        "yellow" => Ok(Rgba::rgb(255, 255, 0)),
        "orange" => Ok(Rgba::rgb(255, 165, 0)),
        "gray" | "grey" => Ok(Rgba::rgb(128, 128, 128)),
        "lightgray" | "lightgrey" => Ok(Rgba::rgb(211, 211, 211)),
        "darkgray" | "darkgrey" => Ok(Rgba::rgb(169, 169, 169)),
        "transparent" => Ok(Rgba {
            r: 0,
            g: 0,
            b: 0,
            a: 0.0,
        }),
        _ => Err(ColorParseError::UnknownName(name.to_string())),
    }
}

/// A CSS colour as written in configuration.
///
/// The original spelling is kept so that applying a theme writes exactly the
/// configured text; the resolved channels are available through [`CssColor::rgba`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CssColor(String);

impl CssColor {
    /// Wrap a literal from the built-in tables without validating it.
    /// Every built-in literal is covered by the config tests.
    pub(crate) fn builtin(raw: &'static str) -> Self {
        CssColor(raw.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn rgba(&self) -> Result<Rgba, ColorParseError> {
        parse_color(&self.0)
    }
}

impl FromStr for CssColor {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_color(s)?;
        Ok(CssColor(s.trim().to_string()))
    }
}

impl fmt::Display for CssColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CssColor {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for CssColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value
            .parse()
            .map_err(|e| D::Error::custom(format!("Failed to parse color: {e}")))
    }
}

impl Serialize for CssColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_colors() {
        assert_eq!(parse_color("#ff0000").unwrap(), Rgba::rgb(255, 0, 0));
        assert_eq!(parse_color("#00ff00").unwrap(), Rgba::rgb(0, 255, 0));
        assert_eq!(parse_color("#222").unwrap(), Rgba::rgb(34, 34, 34));
        assert_eq!(parse_color("#fff").unwrap(), Rgba::rgb(255, 255, 255));
        let translucent = parse_color("#ff000080").unwrap();
        assert_eq!((translucent.r, translucent.g, translucent.b), (255, 0, 0));
        assert!((translucent.a - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn test_parse_rgb_functions() {
        assert_eq!(
            parse_color("rgb(188, 207, 222)").unwrap(),
            Rgba::rgb(188, 207, 222)
        );
        let fill = parse_color("rgba(255, 192, 0, 0.65)").unwrap();
        assert_eq!((fill.r, fill.g, fill.b), (255, 192, 0));
        assert!((fill.a - 0.65).abs() < 1e-6);
    }

    #[test]
    fn test_parse_named_colors() {
        assert_eq!(parse_color("white").unwrap(), Rgba::rgb(255, 255, 255));
        assert_eq!(parse_color("GREY").unwrap(), Rgba::rgb(128, 128, 128));
        assert_eq!(parse_color("transparent").unwrap().a, 0.0);
    }

    #[test]
    fn test_invalid_colors() {
        assert!(matches!(
            parse_color("#gg0000"),
            Err(ColorParseError::InvalidHex(_))
        ));
        assert!(parse_color("#ff00f").is_err());
        assert!(parse_color("#é00").is_err());
        assert!(matches!(
            parse_color("rgb(300, 0, 0)"),
            Err(ColorParseError::InvalidFunction(_))
        ));
        assert!(parse_color("rgba(1, 2, 3, 1.5)").is_err());
        assert!(parse_color("rgb(1, 2)").is_err());
        assert!(matches!(
            parse_color("invalid_color"),
            Err(ColorParseError::UnknownName(_))
        ));
        assert!(parse_color("").is_err());
    }

    #[test]
    fn test_css_color_keeps_spelling() {
        let color: CssColor = " rgb(188, 207, 222) ".parse().unwrap();
        assert_eq!(color.as_str(), "rgb(188, 207, 222)");
        assert_eq!(serde_json::to_string(&color).unwrap(), "\"rgb(188, 207, 222)\"");
    }
}
