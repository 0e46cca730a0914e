use crate::domain::position::Position;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Bounding box in client (viewport) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self { left, top, width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerSource {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        /// Pointer position minus the text element's origin at press time.
        offset: Point,
    },
}

/// Turns press/move/release pointer events into clamped percentage positions.
#[derive(Debug, Clone, Default)]
pub struct PositionTracker {
    state: DragState,
}

impl PositionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    pub fn press(&mut self, pointer: Point, element: Rect) {
        let offset = Point::new(pointer.x - element.left, pointer.y - element.top);
        tracing::trace!(?offset, "drag started");
        self.state = DragState::Dragging { offset };
    }

    /// Returns the new position while a drag is active, `None` otherwise.
    pub fn move_to(&self, pointer: Point, container: Rect) -> Option<Position> {
        let DragState::Dragging { offset } = self.state else {
            return None;
        };
        if container.width <= 0.0 || container.height <= 0.0 {
            return None;
        }

        let x = (pointer.x - container.left - offset.x) / container.width * 100.0;
        let y = (pointer.y - container.top - offset.y) / container.height * 100.0;
        Some(Position::new(x, y))
    }

    pub fn release(&mut self) {
        if self.is_dragging() {
            tracing::trace!("drag finished");
        }
        self.state = DragState::Idle;
    }
}
