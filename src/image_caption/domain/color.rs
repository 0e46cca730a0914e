use serde::{Serialize, Serializer};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::new(255, 255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// `#RRGGBB` / `#RRGGBBAA` を解釈する。読めない値は白にフォールバックする。
    pub fn from_hex_or_default(hex_str: &str) -> Self {
        let hex = hex_str.trim().trim_start_matches('#');
        if !hex.is_ascii() {
            return Self::WHITE;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();

        let parsed = match hex.len() {
            6 => channel(0..2)
                .zip(channel(2..4))
                .zip(channel(4..6))
                .map(|((r, g), b)| Color::new(r, g, b, 255)),
            8 => channel(0..2)
                .zip(channel(2..4))
                .zip(channel(4..6))
                .zip(channel(6..8))
                .map(|(((r, g), b), a)| Color::new(r, g, b, a)),
            _ => None,
        };
        parsed.unwrap_or(Self::WHITE)
    }

    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_color_valid_formats() {
        assert_eq!(Color::from_hex_or_default("#FF0000"), Color::new(255, 0, 0, 255));
        assert_eq!(Color::from_hex_or_default("00FF00"), Color::new(0, 255, 0, 255));
        assert_eq!(Color::from_hex_or_default("#0000FF80"), Color::new(0, 0, 255, 128));
    }

    #[test]
    fn test_parse_hex_color_invalid_formats() {
        assert_eq!(Color::from_hex_or_default("invalid"), Color::WHITE);
        assert_eq!(Color::from_hex_or_default("#123"), Color::WHITE);
        assert_eq!(Color::from_hex_or_default(""), Color::WHITE);
        assert_eq!(Color::from_hex_or_default("#GG0000"), Color::WHITE);
        assert_eq!(Color::from_hex_or_default("#ああ"), Color::WHITE);
    }

    #[test]
    fn test_to_hex_omits_opaque_alpha() {
        assert_eq!(Color::new(255, 255, 255, 255).to_hex(), "#ffffff");
        assert_eq!(Color::new(0, 0, 255, 128).to_hex(), "#0000ff80");
    }
}
