use crate::domain::color::Color as DomainColor;
use crate::domain::image::Image as DomainImage;
use crate::domain::image_processor_trait::ImageProcessor;
use crate::domain::text_overlay::{TextAlign, TextOverlay as DomainTextOverlay};
use super::error::InfrastructureError;
use image::{GrayImage, ImageFormat, Luma, Rgba, RgbaImage};
use imageproc::drawing::draw_text_mut;
use rusttype::{point, Font, Scale};
use std::io::Cursor;

// rusttype + imageproc による ImageProcessor の実装
pub struct DefaultImageProcessor {
    font: Font<'static>,
}

impl DefaultImageProcessor {
    pub fn new(font: Font<'static>) -> Self {
        Self { font }
    }

    /// rusttype scales by ascent-to-descent height; CSS/canvas `px` sizes
    /// are em sizes. Converts the em size into the equivalent `Scale`.
    fn em_scale(&self, font_size_px: f32) -> Scale {
        let v = self.font.v_metrics_unscaled();
        let units_per_em = self.font.units_per_em() as f32;
        if units_per_em <= 0.0 {
            return Scale::uniform(font_size_px);
        }
        Scale::uniform(font_size_px * (v.ascent - v.descent) / units_per_em)
    }

    /// Horizontal advance of `text` at `scale`, in pixels.
    fn text_width(&self, text: &str, scale: Scale) -> f32 {
        self.font
            .layout(text, scale, point(0.0, 0.0))
            .last()
            .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
            .unwrap_or(0.0)
    }

    /// Top-left origin for `draw_text_mut` so that the anchor lands where a
    /// canvas `fillText` would put it: x per alignment, y on the baseline.
    fn text_origin(&self, overlay: &DomainTextOverlay, scale: Scale, anchor: (f32, f32)) -> (i32, i32) {
        let width = self.text_width(&overlay.text, scale);
        let ascent = self.font.v_metrics(scale).ascent;

        let left = match overlay.align {
            TextAlign::Left => anchor.0,
            TextAlign::Center => anchor.0 - width / 2.0,
            TextAlign::Right => anchor.0 - width,
        };
        (left.round() as i32, (anchor.1 - ascent).round() as i32)
    }
}

impl ImageProcessor for DefaultImageProcessor {
    fn render_caption(
        &self,
        image_bytes: &[u8],
        text_overlay: &DomainTextOverlay,
    ) -> Result<DomainImage, InfrastructureError> {
        let reader = image::io::Reader::new(Cursor::new(image_bytes))
            .with_guessed_format()
            .map_err(InfrastructureError::IoError)?;
        let mut img = reader.decode().map_err(InfrastructureError::ImageLibError)?.to_rgba8();
        let (width, height) = img.dimensions();
        if width == 0 || height == 0 {
            return Err(InfrastructureError::ImageProcessingError("image has no pixels".to_string()));
        }

        // 空文字なら画像をそのまま書き出す
        if !text_overlay.text.trim().is_empty() {
            let scale = self.em_scale(text_overlay.font_size.get() as f32);
            let anchor = text_overlay.position.to_pixels(width, height);
            let (x, y) = self.text_origin(text_overlay, scale, anchor);
            tracing::debug!(width, height, x, y, "painting caption");

            // まずカバレッジをマスクに描き、文字色のアルファと合わせて合成する
            let mut mask = GrayImage::new(width, height);
            draw_text_mut(&mut mask, Luma([255u8]), x, y, scale, &self.font, &text_overlay.text);
            composite_mask(&mut img, &mask, text_overlay.color);
        }

        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png).map_err(InfrastructureError::ImageLibError)?;
        Ok(DomainImage::new(buffer.into_inner(), width, height, ImageFormat::Png))
    }
}

fn composite_mask(img: &mut RgbaImage, mask: &GrayImage, color: DomainColor) {
    for (x, y, coverage) in mask.enumerate_pixels() {
        if coverage[0] == 0 {
            continue;
        }
        let alpha = coverage[0] as f32 / 255.0 * color.a as f32 / 255.0;
        blend_over(img.get_pixel_mut(x, y), color, alpha);
    }
}

/// Source-over compositing of an opaque `color` weighted by `alpha`.
fn blend_over(dst: &mut Rgba<u8>, color: DomainColor, alpha: f32) {
    let dst_alpha = dst[3] as f32 / 255.0;
    let out_alpha = alpha + dst_alpha * (1.0 - alpha);
    if out_alpha <= 0.0 {
        return;
    }

    let mix = |src: u8, dst: u8| {
        let value = (src as f32 * alpha + dst as f32 * dst_alpha * (1.0 - alpha)) / out_alpha;
        value.round().clamp(0.0, 255.0) as u8
    };
    *dst = Rgba([
        mix(color.r, dst[0]),
        mix(color.g, dst[1]),
        mix(color.b, dst[2]),
        (out_alpha * 255.0).round().clamp(0.0, 255.0) as u8,
    ]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::position::Position as DomainPosition;
    use crate::domain::text_overlay::FontSize;
    use crate::infrastructure::font::embedded_font;

    fn processor() -> DefaultImageProcessor {
        DefaultImageProcessor::new(embedded_font().unwrap())
    }

    fn solid_png(width: u32, height: u32, pixel: Rgba<u8>) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, pixel);
        let mut buffer = Cursor::new(Vec::new());
        img.write_to(&mut buffer, ImageFormat::Png).unwrap();
        buffer.into_inner()
    }

    fn overlay(text: &str, x: f32, y: f32) -> DomainTextOverlay {
        sized_overlay(text, 32, x, y)
    }

    fn sized_overlay(text: &str, size: u32, x: f32, y: f32) -> DomainTextOverlay {
        DomainTextOverlay::new(
            text.to_string(),
            DomainColor::WHITE,
            FontSize::new(size).unwrap(),
            DomainPosition::new(x, y),
        )
    }

    /// Bounding box of every pixel that differs from `background`.
    fn painted_bounds(img: &RgbaImage, background: Rgba<u8>) -> Option<(u32, u32, u32, u32)> {
        img.enumerate_pixels()
            .filter(|(_, _, p)| **p != background)
            .fold(None, |acc, (x, y, _)| match acc {
                None => Some((x, y, x, y)),
                Some((x0, y0, x1, y1)) => Some((x0.min(x), y0.min(y), x1.max(x), y1.max(y))),
            })
    }

    #[test]
    fn test_output_keeps_natural_dimensions() {
        let black = Rgba([0, 0, 0, 255]);
        let result = processor().render_caption(&solid_png(120, 80, black), &overlay("Hi", 50.0, 50.0)).unwrap();
        assert_eq!((result.width, result.height), (120, 80));
        assert_eq!(result.format, ImageFormat::Png);

        let decoded = image::load_from_memory(&result.data).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (120, 80));
    }

    #[test]
    fn test_center_anchor_lands_on_pixel_50_50() {
        let black = Rgba([0, 0, 0, 255]);
        let result = processor().render_caption(&solid_png(100, 100, black), &overlay("H", 50.0, 50.0)).unwrap();
        let img = image::load_from_memory(&result.data).unwrap().to_rgba8();

        let (x0, _y0, x1, y1) = painted_bounds(&img, black).expect("caption was not painted");
        let center_x = (x0 + x1) as f32 / 2.0;
        assert!((center_x - 50.0).abs() <= 2.0, "text centered at x={}", center_x);
        // "H" にディセンダはないので下端がベースライン (y=50)
        assert!((48..=51).contains(&y1), "baseline at y={}", y1);
    }

    #[test]
    fn test_left_alignment_starts_at_anchor() {
        let black = Rgba([0, 0, 0, 255]);
        let text = overlay("H", 20.0, 50.0).with_align(TextAlign::Left);
        let result = processor().render_caption(&solid_png(100, 100, black), &text).unwrap();
        let img = image::load_from_memory(&result.data).unwrap().to_rgba8();

        let (x0, _, _, _) = painted_bounds(&img, black).unwrap();
        assert!((19..=24).contains(&x0), "left edge at x={}", x0);
    }

    #[test]
    fn test_right_alignment_ends_at_anchor() {
        let black = Rgba([0, 0, 0, 255]);
        let text = overlay("H", 80.0, 50.0).with_align(TextAlign::Right);
        let result = processor().render_caption(&solid_png(100, 100, black), &text).unwrap();
        let img = image::load_from_memory(&result.data).unwrap().to_rgba8();

        let (x0, _, x1, _) = painted_bounds(&img, black).unwrap();
        // 右端 (サイドベアリング分の余白を許容) がアンカー x=80
        assert!((75..=80).contains(&x1), "right edge at x={}", x1);
        assert!(x0 < 75, "glyph starts at x={}", x0);
    }

    #[test]
    fn test_font_size_is_em_size() {
        // DejaVu Sans Bold の "H" のキャップハイトは 0.729em
        let black = Rgba([0, 0, 0, 255]);
        let result = processor()
            .render_caption(&solid_png(300, 300, black), &sized_overlay("H", 100, 50.0, 50.0))
            .unwrap();
        let img = image::load_from_memory(&result.data).unwrap().to_rgba8();

        let (_, y0, _, y1) = painted_bounds(&img, black).unwrap();
        let cap_height = y1 - y0 + 1;
        assert!((70..=76).contains(&cap_height), "cap height {}px at fontSize=100", cap_height);
        assert!((148..=151).contains(&y1), "baseline at y={}", y1);
    }

    #[test]
    fn test_empty_text_leaves_image_untouched() {
        let gray = Rgba([90, 90, 90, 255]);
        let result = processor().render_caption(&solid_png(10, 10, gray), &overlay("   ", 50.0, 50.0)).unwrap();
        let img = image::load_from_memory(&result.data).unwrap().to_rgba8();
        assert!(painted_bounds(&img, gray).is_none());
    }

    #[test]
    fn test_invalid_image_data() {
        let result = processor().render_caption(&[1, 2, 3, 4], &overlay("Test", 50.0, 50.0));
        match result {
            Err(InfrastructureError::ImageLibError(_)) | Err(InfrastructureError::IoError(_)) => {}
            other => panic!("Expected ImageLibError or IoError for invalid image data, got {:?}", other),
        }
    }

    #[test]
    fn test_blend_over_respects_color_alpha() {
        let mut opaque = Rgba([0, 0, 0, 255]);
        blend_over(&mut opaque, DomainColor::new(255, 255, 255, 255), 1.0);
        assert_eq!(opaque, Rgba([255, 255, 255, 255]));

        let mut half = Rgba([0, 0, 0, 255]);
        blend_over(&mut half, DomainColor::new(255, 255, 255, 255), 0.5);
        assert_eq!(half, Rgba([128, 128, 128, 255]));

        let mut transparent = Rgba([0, 0, 0, 0]);
        blend_over(&mut transparent, DomainColor::new(255, 0, 0, 255), 0.5);
        assert_eq!(transparent, Rgba([255, 0, 0, 128]));
    }
}
