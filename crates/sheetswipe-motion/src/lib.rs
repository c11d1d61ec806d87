//! Gesture-driven dismissal for draggable bottom sheets.
//!
//! # Layers
//!
//! ## L4 Atomic Layer
//! - `easing` - Pure easing curves for timed transitions
//! - `timing` - Frame-time progress and interpolation
//! - `spring` - Closed-form damped spring motion
//!
//! ## L3 Molecular Layer
//! - `animation` - Offset animation controller (dismiss-out, spring-back)
//!
//! ## L2 Organism Layer
//! - `arbiter` - Touch lifecycle, gesture ownership and the sheet state machine
//!
//! # Usage
//!
//! ```ignore
//! use sheetswipe_motion::{GestureArbiter, GestureEvent};
//!
//! let mut arbiter = GestureArbiter::with_defaults(shell);
//!
//! // Pointer callbacks
//! arbiter.on_touch_start(&event);
//! arbiter.on_move(&event);
//! arbiter.on_release(&event);
//!
//! // Frame callback; bind `arbiter.offset()` to the sheet translation
//! arbiter.tick(frame_time_ms);
//! ```

// L4 Atomic Layer
pub mod easing;
pub mod spring;
pub mod timing;

// L3 Molecular Layer
pub mod animation;

// L2 Organism Layer
pub mod arbiter;
pub mod event;

pub use animation::{dismiss_duration_ms, AnimationController, Completion, TransitionKind};
pub use arbiter::{
    arbitrate, AnimationState, ArbitrationInput, CaptureRule, GestureArbiter, GestureSession,
    Ownership,
};
pub use easing::{EasingType, EasingTypeExt};
pub use event::{GestureEvent, SheetShell};
pub use spring::{SpringMotion, SpringParams};
