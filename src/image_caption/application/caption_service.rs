use std::sync::Arc;
use super::error::ApplicationError;
use serde::Deserialize;

use crate::domain::background::{ensure_image_mime, BackgroundSource, FALLBACK_FILENAME};
use crate::domain::catalog::Catalog;
use crate::domain::color::Color;
use crate::domain::error::DomainError;
use crate::domain::image::Image;
use crate::domain::image_loader_trait::ImageLoader;
use crate::domain::image_processor_trait::ImageProcessor;
use crate::domain::position::Position;
use crate::domain::text_overlay::{FontSize, TextAlign, TextOverlay};

/// Optional overlay fields as they arrive from a request.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(rename_all = "camelCase")]
pub struct OverlayOptions {
    pub text: Option<String>,
    pub color: Option<String>,
    pub font_size: Option<u32>,
    pub x: Option<f32>,
    pub y: Option<f32>,
    /// Named position such as `top-left`, used when `x`/`y` are absent.
    pub preset: Option<String>,
    pub align: Option<TextAlign>,
}

impl OverlayOptions {
    /// Fills gaps with defaults. Without coordinates or a preset the text is centered.
    pub fn into_overlay(self) -> Result<TextOverlay, DomainError> {
        let font_size = match self.font_size {
            Some(size) => FontSize::new(size)?,
            None => FontSize::DEFAULT,
        };
        let position = match (self.x, self.y, self.preset.as_deref()) {
            (None, None, Some(preset)) => Position::from_preset(preset),
            (None, None, None) => Position::center(),
            (x, y, _) => {
                let center = Position::center();
                Position::new(x.unwrap_or(center.x), y.unwrap_or(center.y))
            }
        };

        Ok(TextOverlay {
            text: self.text.unwrap_or_else(|| TextOverlay::DEFAULT_TEXT.to_string()),
            color: self.color.as_deref().map(Color::from_hex_or_default).unwrap_or_default(),
            font_size,
            position,
            align: self.align.unwrap_or_default(),
        })
    }
}

/// A finished export: the flattened PNG and the name to download it under.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportArtifact {
    pub filename: String,
    pub image: Image,
}

pub struct CaptionService<L> {
    image_processor: Arc<dyn ImageProcessor + Send + Sync>, // トレイトオブジェクトとして保持
    image_loader: L,
    catalog: Catalog,
}

impl<L: ImageLoader + Send + Sync> CaptionService<L> {
    pub fn new(image_processor: Arc<dyn ImageProcessor + Send + Sync>, image_loader: L, catalog: Catalog) -> Self {
        Self {
            image_processor,
            image_loader,
            catalog,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn resolve_background(&self, reference: &str) -> Result<BackgroundSource, ApplicationError> {
        Ok(BackgroundSource::parse(reference, &self.catalog)?)
    }

    /// Loads the background, paints the overlay and names the result.
    /// A load failure aborts the export without producing anything.
    pub async fn export(
        &self,
        background: &BackgroundSource,
        overlay: &TextOverlay,
    ) -> Result<ExportArtifact, ApplicationError> {
        tracing::info!(source = background.kind(), "export requested");

        let image_bytes = self
            .image_loader
            .load(background)
            .await
            .map_err(ApplicationError::ImageLoadFailed)?;
        let image = self.image_processor.render_caption(&image_bytes, overlay)?;

        let filename = background.export_filename();
        tracing::info!(%filename, width = image.width, height = image.height, bytes = image.data.len(), "export finished");
        Ok(ExportArtifact { filename, image })
    }

    /// Exports an uploaded file. Only the MIME type prefix is validated.
    pub fn export_upload(
        &self,
        image_bytes: &[u8],
        content_type: Option<&str>,
        overlay: &TextOverlay,
    ) -> Result<ExportArtifact, ApplicationError> {
        ensure_image_mime(content_type)?;
        if image_bytes.is_empty() {
            return Err(ApplicationError::InvalidRequest("uploaded file is empty".to_string()));
        }

        let image = self.image_processor.render_caption(image_bytes, overlay)?;
        tracing::info!(width = image.width, height = image.height, "upload export finished");
        Ok(ExportArtifact {
            filename: FALLBACK_FILENAME.to_string(),
            image,
        })
    }
}
