use super::error::InfrastructureError;
use rusttype::Font;
use std::path::Path;

static EMBEDDED_FONT: &[u8] = include_bytes!("../../../DejaVu_Sans/DejaVuSans-Bold.ttf");

pub fn embedded_font() -> Result<Font<'static>, InfrastructureError> {
    Font::try_from_bytes(EMBEDDED_FONT)
        .ok_or_else(|| InfrastructureError::FontError("embedded DejaVu Sans Bold is not a valid font".to_string()))
}

/// Loads the caption font once at startup. Without a configured path the
/// bundled DejaVu Sans Bold is used.
pub async fn load_font(path: Option<&Path>) -> Result<Font<'static>, InfrastructureError> {
    let Some(path) = path else {
        tracing::info!("using embedded caption font");
        return embedded_font();
    };

    let data = tokio::fs::read(path)
        .await
        .map_err(|e| InfrastructureError::FontError(format!("{}: {}", path.display(), e)))?;
    let font = Font::try_from_vec(data)
        .ok_or_else(|| InfrastructureError::FontError(format!("{} is not a TrueType/OpenType font", path.display())))?;

    tracing::info!(path = %path.display(), glyphs = font.glyph_count(), "loaded caption font");
    Ok(font)
}
