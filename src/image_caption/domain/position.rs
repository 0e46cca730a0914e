use serde::{Deserialize, Serialize};

/// Text anchor expressed as percentages (0-100) of the container on each axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub const MIN: f32 = 0.0;
    pub const MAX: f32 = 100.0;

    const NEAR: f32 = 15.0;
    const MIDDLE: f32 = 50.0;
    const FAR: f32 = 85.0;

    /// Builds a position, clamping each axis into [0, 100].
    pub fn new(x: f32, y: f32) -> Self {
        Self { x: clamp_percentage(x), y: clamp_percentage(y) }
    }

    pub fn center() -> Self {
        Self { x: Self::MIDDLE, y: Self::MIDDLE }
    }

    // 名前付きの配置。不明な名前は中央扱い
    pub fn from_preset(name: &str) -> Self {
        let (x, y) = match name.trim().to_lowercase().as_str() {
            "top-left" => (Self::NEAR, Self::NEAR),
            "top-center" => (Self::MIDDLE, Self::NEAR),
            "top-right" => (Self::FAR, Self::NEAR),
            "center-left" => (Self::NEAR, Self::MIDDLE),
            "center-right" => (Self::FAR, Self::MIDDLE),
            "bottom-left" => (Self::NEAR, Self::FAR),
            "bottom-center" => (Self::MIDDLE, Self::FAR),
            "bottom-right" => (Self::FAR, Self::FAR),
            _ => (Self::MIDDLE, Self::MIDDLE),
        };
        Self { x, y }
    }

    /// `pixel = percentage / 100 * dimension`, per axis.
    pub fn to_pixels(&self, width: u32, height: u32) -> (f32, f32) {
        (self.x / 100.0 * width as f32, self.y / 100.0 * height as f32)
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::center()
    }
}

/// Clamps a percentage into [0, 100]. NaN collapses to 0.
pub fn clamp_percentage(value: f32) -> f32 {
    if value.is_nan() {
        return Position::MIN;
    }
    value.clamp(Position::MIN, Position::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_stays_within_bounds() {
        for value in [-1e9, -100.0, -0.5, 0.0, 12.5, 50.0, 99.9, 100.0, 100.1, 1e9] {
            let clamped = clamp_percentage(value);
            assert!((0.0..=100.0).contains(&clamped), "{} -> {}", value, clamped);
        }
        assert_eq!(clamp_percentage(f32::NAN), 0.0);
        assert_eq!(clamp_percentage(f32::INFINITY), 100.0);
        assert_eq!(clamp_percentage(f32::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_new_clamps_to_nearest_boundary() {
        assert_eq!(Position::new(-20.0, 140.0), Position { x: 0.0, y: 100.0 });
        assert_eq!(Position::new(30.0, 70.0), Position { x: 30.0, y: 70.0 });
    }

    #[test]
    fn test_to_pixels_maps_percentages() {
        assert_eq!(Position::new(50.0, 50.0).to_pixels(100, 100), (50.0, 50.0));
        assert_eq!(Position::new(25.0, 100.0).to_pixels(800, 600), (200.0, 600.0));
        assert_eq!(Position::new(0.0, 0.0).to_pixels(800, 600), (0.0, 0.0));
    }

    #[test]
    fn test_presets() {
        assert_eq!(Position::from_preset("top-left"), Position::new(15.0, 15.0));
        assert_eq!(Position::from_preset("BOTTOM-RIGHT"), Position::new(85.0, 85.0));
        assert_eq!(Position::from_preset("top-center"), Position::new(50.0, 15.0));
        assert_eq!(Position::from_preset("somewhere"), Position::center());
    }
}
