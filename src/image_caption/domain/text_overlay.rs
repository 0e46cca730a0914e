use crate::domain::color::Color;
use crate::domain::error::DomainError;
use crate::domain::position::Position;
use serde::{Deserialize, Serialize};

/// Font size in pixels, bounded to 10..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FontSize(u32);

impl FontSize {
    pub const MIN: u32 = 10;
    pub const MAX: u32 = 100;
    pub const DEFAULT: FontSize = FontSize(32);

    pub fn new(size: u32) -> Result<Self, DomainError> {
        if (Self::MIN..=Self::MAX).contains(&size) {
            Ok(Self(size))
        } else {
            Err(DomainError::FontSizeOutOfRange(size))
        }
    }

    pub fn get(&self) -> u32 {
        self.0
    }
}

impl Default for FontSize {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TextOverlay {
    pub text: String,
    pub color: Color,
    pub font_size: FontSize,
    pub position: Position,
    pub align: TextAlign,
}

impl TextOverlay {
    pub const DEFAULT_TEXT: &'static str = "Your text here";

    pub fn new(text: String, color: Color, font_size: FontSize, position: Position) -> Self {
        Self {
            text,
            color,
            font_size,
            position,
            align: TextAlign::Center,
        }
    }

    pub fn with_align(mut self, align: TextAlign) -> Self {
        self.align = align;
        self
    }
}

impl Default for TextOverlay {
    fn default() -> Self {
        Self::new(
            Self::DEFAULT_TEXT.to_string(),
            Color::WHITE,
            FontSize::DEFAULT,
            Position::center(),
        )
    }
}
