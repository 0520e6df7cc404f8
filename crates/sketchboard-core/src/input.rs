//! Pointer and pinch/pan events in screen space.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Distance in screen pixels a press may travel and still count as a tap.
pub const TAP_SLOP: f64 = 8.0;

/// Single-pointer event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up { position: Point },
}

impl PointerEvent {
    pub fn position(&self) -> Point {
        match self {
            PointerEvent::Down { position }
            | PointerEvent::Move { position }
            | PointerEvent::Up { position } => *position,
        }
    }
}

/// One step of a two-finger transform gesture.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoomPan {
    /// Screen point between the fingers.
    pub centroid: Point,
    /// Screen-space pan since the previous step.
    pub pan: Vec2,
    /// Multiplicative zoom since the previous step.
    pub zoom: f64,
}

/// Tracks the pointer across events.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Last reported screen position.
    pub pointer_position: Point,
    /// Screen position reported by the event before that.
    pub previous_pointer_position: Point,
    /// Pointer is pressed.
    pub is_dragging: bool,
    /// Where the current press went down.
    pub drag_start: Option<Point>,
    /// Whether the current press has left the tap slop.
    moved_past_slop: bool,
    /// Whether the last release ended a tap.
    tap_detected: bool,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track one event. Call before routing it.
    pub fn handle_pointer_event(&mut self, event: PointerEvent) {
        self.previous_pointer_position = self.pointer_position;
        self.pointer_position = event.position();

        match event {
            PointerEvent::Down { position } => {
                self.is_dragging = true;
                self.drag_start = Some(position);
                self.moved_past_slop = false;
                self.tap_detected = false;
            }
            PointerEvent::Move { .. } => self.track_slop(),
            PointerEvent::Up { .. } => {
                self.track_slop();
                self.tap_detected = self.is_dragging && !self.moved_past_slop;
                self.is_dragging = false;
                self.drag_start = None;
            }
        }
    }

    fn track_slop(&mut self) {
        if self.drag_delta().is_some_and(|d| d.hypot() > TAP_SLOP) {
            self.moved_past_slop = true;
        }
    }

    /// Check if the last release completed a tap.
    pub fn is_tap(&self) -> bool {
        self.tap_detected
    }

    /// Pointer movement since the previous event.
    pub fn pointer_delta(&self) -> Vec2 {
        self.pointer_position - self.previous_pointer_position
    }

    /// Offset from the press position while the pointer is down.
    pub fn drag_delta(&self) -> Option<Vec2> {
        self.drag_start.map(|start| self.pointer_position - start)
    }
}
