//! Host-facing types: the pointer event shape and the sheet shell contract.

use serde::{Deserialize, Serialize};

/// One pointer event in the host's gesture shape.
///
/// `dx`/`dy` are cumulative since the touch went down; `location_y` is
/// relative to the sheet's top edge.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureEvent {
    pub dx: f64,
    pub dy: f64,
    /// Platform-reported velocities; recorded for diagnostics only
    pub vx: f64,
    pub vy: f64,
    pub x0: f64,
    pub y0: f64,
    pub move_x: f64,
    pub move_y: f64,
    pub location_y: f64,
    pub timestamp_ms: f64,
}

impl GestureEvent {
    pub fn at(timestamp_ms: f64, dy: f64) -> Self {
        Self {
            dy,
            timestamp_ms,
            ..Default::default()
        }
    }

    pub fn with_location_y(mut self, location_y: f64) -> Self {
        self.location_y = location_y;
        self
    }

    pub fn with_vy(mut self, vy: f64) -> Self {
        self.vy = vy;
        self
    }
}

/// The component hosting the sheet: supplies geometry and scroll state, and
/// receives the dismissal.
pub trait SheetShell {
    /// Current measured sheet height in pixels
    fn sheet_height(&self) -> f64;

    /// Scroll offset of the nested content, `None` when unknown
    fn scroll_offset(&self) -> Option<f64>;

    fn haptics_enabled(&self) -> bool {
        true
    }

    /// Called exactly once per completed dismissal
    fn on_dismiss(&mut self);

    fn haptic_pulse(&mut self) {}
}
