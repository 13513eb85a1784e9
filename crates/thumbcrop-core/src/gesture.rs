//! Pointer drag and numeric input handling.
//!
//! The drag state machine lives here, outside [`ViewState`]: it has its own
//! lifecycle (it only exists between pointer-down and pointer-up) and never
//! triggers a redraw on its own. Only the pan change a move produces does.
//!
//! ```text
//!   Idle --pointer_down--> Dragging --pointer_move--> Dragging
//!     ^                        |
//!     +--- pointer_up / pointer_leave / touch_end / touch_cancel
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::{Point, ViewState};

/// Errors from numeric/slider input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Not a number: {0:?}")]
    NotANumber(String),
}

/// Drag state between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        /// Pointer position of the previous event, in client pixels.
        last: Point,
    },
}

/// Translates pointer events into pan changes.
#[derive(Debug, Clone, Default)]
pub struct GestureController {
    state: DragState,
}

impl GestureController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> DragState {
        self.state
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// Start a drag at `at`. A second down while dragging restarts from `at`.
    pub fn pointer_down(&mut self, at: Point) {
        self.state = DragState::Dragging { last: at };
    }

    /// Continue a drag. Returns true if `view.pan` changed.
    ///
    /// The pointer delta is divided by zoom, so the image follows the pointer
    /// at the same perceived speed at every zoom level. At zoom 0 the image
    /// is a point and the delta is dropped.
    pub fn pointer_move(&mut self, at: Point, view: &mut ViewState) -> bool {
        let DragState::Dragging { last } = self.state else {
            return false;
        };
        self.state = DragState::Dragging { last: at };

        let delta = at - last;
        if view.zoom <= 0.0 || (delta.x == 0.0 && delta.y == 0.0) {
            return false;
        }

        view.pan = view.pan + Point::new(delta.x / view.zoom, delta.y / view.zoom);
        true
    }

    pub fn pointer_up(&mut self) {
        self.end_drag();
    }

    pub fn pointer_leave(&mut self) {
        self.end_drag();
    }

    pub fn touch_end(&mut self) {
        self.end_drag();
    }

    pub fn touch_cancel(&mut self) {
        self.end_drag();
    }

    /// Drop any drag in progress, e.g. when a new image replaces the old one.
    pub fn end_drag(&mut self) {
        self.state = DragState::Idle;
    }
}

/// View fields that can be set directly from a number input or slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NumericField {
    Zoom,
    PanX,
    PanY,
}

impl NumericField {
    /// Write `value` into `view`. Returns true if the view changed.
    ///
    /// No range validation: any value is rendered, except that zoom is
    /// clamped to `>= 0` to avoid mirrored output.
    pub fn apply(self, view: &mut ViewState, value: f64) -> bool {
        let before = *view;
        match self {
            NumericField::Zoom => view.set_zoom(value),
            NumericField::PanX => view.pan.x = value,
            NumericField::PanY => view.pan.y = value,
        }
        // Bitwise comparison so NaN pan values still count as a change
        !same_bits(before, *view)
    }
}

fn same_bits(a: ViewState, b: ViewState) -> bool {
    a.zoom.to_bits() == b.zoom.to_bits()
        && a.pan.x.to_bits() == b.pan.x.to_bits()
        && a.pan.y.to_bits() == b.pan.y.to_bits()
}

/// Parse the text of a number input or slider.
pub fn parse_numeric(text: &str) -> Result<f64, InputError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| InputError::NotANumber(text.to_string()))
}


// ============================================================================
// Property-Based Tests
// ============================================================================
