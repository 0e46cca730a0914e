use crate::domain::catalog::{Catalog, Orientation};
use crate::domain::error::DomainError;
use serde::Serialize;

/// Filename for uploads and anything without a usable name.
pub const FALLBACK_FILENAME: &str = "text-image.png";

/// The single active background. Replaced wholesale on selection or upload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum BackgroundSource {
    /// Catalog image served from the assets directory.
    Bundled {
        id: String,
        orientation: Orientation,
        src: String,
    },
    /// User-supplied `data:image/...;base64,` URL.
    DataUrl {
        #[serde(skip)]
        url: String,
    },
    Remote { url: String },
    /// Path relative to the assets directory.
    ServerPath { path: String },
}

impl BackgroundSource {
    /// Resolves a client-supplied image reference.
    ///
    /// `data:` and `http(s)://` references are taken as-is, anything with a
    /// slash is a server path, and everything else must be a catalog id.
    pub fn parse(reference: &str, catalog: &Catalog) -> Result<Self, DomainError> {
        let reference = reference.trim();
        if reference.is_empty() {
            return Err(DomainError::InvalidInput("image reference is empty".to_string()));
        }

        if let Some(rest) = reference.strip_prefix("data:") {
            if !rest.starts_with("image/") {
                let mime = rest.split([';', ',']).next().unwrap_or_default();
                return Err(DomainError::UnsupportedMediaType(mime.to_string()));
            }
            return Ok(Self::DataUrl { url: reference.to_string() });
        }

        if reference.starts_with("http://") || reference.starts_with("https://") {
            return Ok(Self::Remote { url: reference.to_string() });
        }

        if reference.contains('/') {
            return Ok(Self::ServerPath { path: reference.to_string() });
        }

        catalog
            .find(reference)
            .map(|(orientation, image)| Self::Bundled {
                id: image.id.clone(),
                orientation,
                src: image.src.clone(),
            })
            .ok_or_else(|| DomainError::UnknownBackground(reference.to_string()))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Bundled { .. } => "bundled",
            Self::DataUrl { .. } => "dataUrl",
            Self::Remote { .. } => "remote",
            Self::ServerPath { .. } => "serverPath",
        }
    }

    /// Download filename for an export of this background.
    pub fn export_filename(&self) -> String {
        match self {
            Self::Bundled { id, orientation, .. } => match sanitize(id) {
                // 英数字を含まない id は向きだけで名前を付ける
                id if id.is_empty() => format!("greeting-card-{}.png", orientation),
                id => format!("greeting-card-{}-{}.png", orientation, id),
            },
            Self::DataUrl { .. } => FALLBACK_FILENAME.to_string(),
            Self::Remote { url } => stem_filename(url),
            Self::ServerPath { path } => stem_filename(path),
        }
    }
}

fn stem_filename(location: &str) -> String {
    let without_query = location.split(['?', '#']).next().unwrap_or_default();
    let last_segment = without_query.trim_end_matches('/').rsplit('/').next().unwrap_or_default();
    let stem = match last_segment.rsplit_once('.') {
        Some((stem, _ext)) if !stem.is_empty() => stem,
        _ => last_segment,
    };

    let stem = sanitize(stem);
    if stem.is_empty() {
        FALLBACK_FILENAME.to_string()
    } else {
        format!("{}-text.png", stem)
    }
}

fn sanitize(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect()
}

/// Upload validation: only the MIME type prefix is checked.
pub fn ensure_image_mime(content_type: Option<&str>) -> Result<(), DomainError> {
    match content_type {
        Some(mime) if mime.trim().to_ascii_lowercase().starts_with("image/") => Ok(()),
        Some(mime) => Err(DomainError::UnsupportedMediaType(mime.to_string())),
        None => Err(DomainError::UnsupportedMediaType("unknown".to_string())),
    }
}
