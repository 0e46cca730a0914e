use crate::domain::background::BackgroundSource;
use crate::domain::color::Color;
use crate::domain::error::DomainError;
use crate::domain::position::Position;
use crate::domain::position_tracker::{Point, PointerSource, PositionTracker, Rect};
use crate::domain::text_overlay::{FontSize, TextAlign, TextOverlay};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub source: PointerSource,
    /// Mouse events carry one point; touch events carry every active touch.
    #[serde(default)]
    pub points: Vec<Point>,
    /// Text element bounds, needed on press.
    #[serde(default)]
    pub element: Option<Rect>,
    /// Container bounds, needed on move.
    #[serde(default)]
    pub container: Option<Rect>,
}

impl PointerEvent {
    // マルチタッチは扱わない。先頭のタッチだけを見る
    fn primary_point(&self) -> Option<Point> {
        self.points.first().copied()
    }
}

/// Everything the user has chosen so far in one editing session.
#[derive(Debug, Clone, Default)]
pub struct EditorState {
    overlay: TextOverlay,
    background: Option<BackgroundSource>,
    tracker: PositionTracker,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSnapshot {
    pub text: String,
    pub color: Color,
    pub font_size: FontSize,
    pub position: Position,
    pub align: TextAlign,
    pub background: Option<BackgroundSource>,
    pub dragging: bool,
}

impl EditorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn overlay(&self) -> &TextOverlay {
        &self.overlay
    }

    pub fn background(&self) -> Option<&BackgroundSource> {
        self.background.as_ref()
    }

    pub fn set_text(&mut self, text: String) {
        self.overlay.text = text;
    }

    pub fn set_color(&mut self, hex: &str) {
        self.overlay.color = Color::from_hex_or_default(hex);
    }

    pub fn set_font_size(&mut self, size: u32) -> Result<(), DomainError> {
        self.overlay.font_size = FontSize::new(size)?;
        Ok(())
    }

    pub fn set_align(&mut self, align: TextAlign) {
        self.overlay.align = align;
    }

    /// Replaces the background and puts the text back in the center.
    pub fn select_background(&mut self, background: BackgroundSource) {
        self.background = Some(background);
        self.overlay.position = Position::center();
        self.tracker.release();
    }

    /// Applies one pointer event. Returns `true` when the position changed.
    pub fn apply_pointer(&mut self, event: &PointerEvent) -> bool {
        match event.phase {
            PointerPhase::Down => {
                let (Some(point), Some(element)) = (event.primary_point(), event.element) else {
                    tracing::debug!(source = ?event.source, "press ignored: missing point or element bounds");
                    return false;
                };
                self.tracker.press(point, element);
                false
            }
            PointerPhase::Move => {
                let (Some(point), Some(container)) = (event.primary_point(), event.container) else {
                    return false;
                };
                match self.tracker.move_to(point, container) {
                    Some(position) => {
                        self.overlay.position = position;
                        true
                    }
                    None => false,
                }
            }
            PointerPhase::Up => {
                self.tracker.release();
                false
            }
        }
    }

    pub fn snapshot(&self) -> EditorSnapshot {
        EditorSnapshot {
            text: self.overlay.text.clone(),
            color: self.overlay.color,
            font_size: self.overlay.font_size,
            position: self.overlay.position,
            align: self.overlay.align,
            background: self.background.clone(),
            dragging: self.tracker.is_dragging(),
        }
    }
}
