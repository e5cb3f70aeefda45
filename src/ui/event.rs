use crate::config::DisplayMode;
use crate::geometry::{Point, Size};
use crate::view::ElementId;
use std::time::Duration;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MouseButtons {
    pub left: bool,
    pub right: bool,
    pub middle: bool,
}

/// One pointer reading per frame, in window coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PointerSample {
    pub position: Point,
    pub buttons: MouseButtons,
}

impl PointerSample {
    pub fn new(position: Point, primary_down: bool) -> Self {
        Self {
            position,
            buttons: MouseButtons {
                left: primary_down,
                ..MouseButtons::default()
            },
        }
    }

    pub fn primary_down(&self) -> bool {
        self.buttons.left
    }
}

/// Everything the host hands the engine for one frame. `delta` is passed to
/// update callbacks untouched.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    pub pointer: PointerSample,
    pub delta: Duration,
}

impl FrameInput {
    pub fn new(pointer: PointerSample, delta: Duration) -> Self {
        Self { pointer, delta }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickEvent {
    /// Element hit by the pointer.
    pub target: ElementId,
    /// Element whose callbacks are running.
    pub current_target: ElementId,
    /// Press position in adapter coordinates.
    pub position: Point,
}

/// Fired after the window size, the render resolution or the display mode
/// changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeEvent {
    pub display_mode: DisplayMode,
    pub window_size: Size,
    pub adapter_size: Size,
}
