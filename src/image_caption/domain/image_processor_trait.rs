use crate::domain::image::Image;
use crate::domain::text_overlay::TextOverlay;
use crate::infrastructure::error::InfrastructureError;

// 画像の合成処理。デコードから PNG エンコードまで同期で行う
#[cfg_attr(test, mockall::automock)]
pub trait ImageProcessor {
    /// Paints `overlay` onto the decoded `image_bytes` at their natural size
    /// and returns the flattened PNG.
    fn render_caption(&self, image_bytes: &[u8], overlay: &TextOverlay) -> Result<Image, InfrastructureError>;
}
