//! Gesture arbiter: owns the touch lifecycle of one sheet.
//!
//! Decides per move event whether the sheet or its nested scroll view owns
//! the gesture, feeds samples to the velocity tracker, consults the dismissal
//! engine and drives the animation controller.
//!
//! ```text
//! Idle --touch in header / captured move--> Dragging
//! Dragging --move (fast swipe)--> AnimatingOut
//! Dragging --release (dismiss)--> AnimatingOut
//! Dragging --release (stay) | terminate--> SpringingBack
//! AnimatingOut --complete--> Idle   (on_dismiss fires once)
//! SpringingBack --complete--> Idle
//! ```

use serde_json::json;
use sheetswipe_core::{
    AppConfig, ArbitrationConfig, DebugLog, GestureMetrics, ManualClock, SheetGeometry,
    VelocityTracker,
};

use crate::animation::{dismiss_duration_ms, AnimationController, TransitionKind};
use crate::event::{GestureEvent, SheetShell};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnimationState {
    #[default]
    Idle,
    Dragging,
    AnimatingOut,
    SpringingBack,
}

/// The ownership rule that decided a move event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureRule {
    AlreadyDragging,
    UpwardMotion,
    Header,
    ContentAtTop,
    ContentScrolled,
    Ambiguous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    Sheet(CaptureRule),
    Content(CaptureRule),
}

impl Ownership {
    pub fn is_sheet(&self) -> bool {
        matches!(self, Ownership::Sheet(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArbitrationInput {
    pub is_dragging: bool,
    pub dy: f64,
    /// Where the touch went down, relative to the sheet top
    pub touch_origin_y: Option<f64>,
    pub scroll_offset: Option<f64>,
}

/// Decide who owns a move event. Rules are checked in priority order and the
/// first match wins.
pub fn arbitrate(input: &ArbitrationInput, config: &ArbitrationConfig) -> Ownership {
    if input.is_dragging {
        return Ownership::Sheet(CaptureRule::AlreadyDragging);
    }

    // Upward travel always scrolls content
    if input.dy < 0.0 {
        return Ownership::Content(CaptureRule::UpwardMotion);
    }

    let in_header = input
        .touch_origin_y
        .is_some_and(|y| y <= config.header_height_px);
    if in_header && input.dy > 0.0 {
        return Ownership::Sheet(CaptureRule::Header);
    }

    let distance = input.dy.abs();
    match input.scroll_offset {
        Some(offset) if offset <= 0.0 => {
            if distance > config.top_capture_threshold_px {
                Ownership::Sheet(CaptureRule::ContentAtTop)
            } else {
                Ownership::Content(CaptureRule::ContentAtTop)
            }
        }
        Some(_) => Ownership::Content(CaptureRule::ContentScrolled),
        None => {
            if distance > config.ambiguous_capture_threshold_px {
                Ownership::Sheet(CaptureRule::Ambiguous)
            } else {
                Ownership::Content(CaptureRule::Ambiguous)
            }
        }
    }
}

/// Per-drag bookkeeping, created when the sheet captures a gesture and
/// dropped on release, termination or reset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureSession {
    pub start_time_ms: f64,
    pub last_position: f64,
    pub last_timestamp_ms: f64,
    /// Signed; sign of the largest-magnitude sample
    pub max_velocity: f64,
    pub total_elapsed_ms: f64,
    pub captured_by: CaptureRule,
    /// Offset the sheet was at when captured; non-zero when a spring-back was interrupted
    pub base_offset: f64,
    pub geometry: SheetGeometry,
}

pub struct GestureArbiter<S: SheetShell> {
    shell: S,
    config: AppConfig,
    tracker: VelocityTracker<ManualClock>,
    animation: AnimationController,
    state: AnimationState,
    session: Option<GestureSession>,
    touch_origin_y: Option<f64>,
    dismissing: bool,
    /// Transition whose completion advances the state machine
    pending: Option<u64>,
    debug: Option<DebugLog>,
}

impl<S: SheetShell> GestureArbiter<S> {
    pub fn new(shell: S, config: AppConfig) -> Self {
        let debug = config
            .debug
            .enabled
            .then(|| DebugLog::new(config.debug.capacity));
        Self {
            tracker: VelocityTracker::with_clock(&config.tracker, ManualClock::default()),
            animation: AnimationController::new(config.animation),
            shell,
            config,
            state: AnimationState::Idle,
            session: None,
            touch_origin_y: None,
            dismissing: false,
            pending: None,
            debug,
        }
    }

    pub fn with_defaults(shell: S) -> Self {
        Self::new(shell, AppConfig::default())
    }

    #[inline]
    pub fn state(&self) -> AnimationState {
        self.state
    }

    /// True while the sheet owns the gesture; the shell should suspend its own scrolling
    #[inline]
    pub fn is_dragging(&self) -> bool {
        self.state == AnimationState::Dragging
    }

    #[inline]
    pub fn is_dismissing(&self) -> bool {
        self.dismissing
    }

    /// Live offset for the shell to bind to its translation
    #[inline]
    pub fn offset(&self) -> f64 {
        self.animation.offset()
    }

    pub fn session(&self) -> Option<&GestureSession> {
        self.session.as_ref()
    }

    pub fn debug_log(&self) -> Option<&DebugLog> {
        self.debug.as_ref()
    }

    pub fn shell(&self) -> &S {
        &self.shell
    }

    pub fn shell_mut(&mut self) -> &mut S {
        &mut self.shell
    }

    /// Back to rest: idle, offset 0, no session, guard cleared.
    pub fn reset(&mut self) {
        self.animation.set_offset(0.0);
        self.tracker.reset();
        self.state = AnimationState::Idle;
        self.session = None;
        self.touch_origin_y = None;
        self.dismissing = false;
        self.pending = None;
    }

    /// Ownership of a move event given the shell's current scroll position
    pub fn ownership(&self, event: &GestureEvent) -> Ownership {
        let input = ArbitrationInput {
            is_dragging: self.is_dragging(),
            dy: event.dy,
            touch_origin_y: self.touch_origin_y,
            scroll_offset: self.shell.scroll_offset(),
        };
        arbitrate(&input, &self.config.arbitration)
    }

    /// A finger went down. Returns whether the sheet claims the gesture immediately.
    pub fn on_touch_start(&mut self, event: &GestureEvent) -> bool {
        self.touch_origin_y = Some(event.location_y);

        if self.dismissing || self.state == AnimationState::AnimatingOut {
            tracing::debug!("touch start ignored while dismissing");
            return false;
        }

        if event.location_y > self.config.arbitration.header_height_px {
            return false;
        }

        if !self.begin_drag(event, CaptureRule::Header) {
            return false;
        }
        self.sample(event);
        true
    }

    pub fn on_move(&mut self, event: &GestureEvent) -> AnimationState {
        match self.state {
            AnimationState::AnimatingOut => return self.state,
            AnimationState::Dragging => {}
            AnimationState::Idle | AnimationState::SpringingBack => {
                let ownership = self.ownership(event);
                tracing::trace!(?ownership, dy = event.dy, "move arbitration");
                match ownership {
                    Ownership::Sheet(rule) => {
                        if !self.begin_drag(event, rule) {
                            return self.state;
                        }
                    }
                    Ownership::Content(_) => return self.state,
                }
            }
        }

        // Track the finger 1:1, never above the resting position
        self.animation.set_offset(self.drag_position(event).max(0.0));
        self.sample(event);

        let Some(geometry) = self.session.map(|s| s.geometry) else {
            return self.state;
        };
        let metrics = self.metrics();
        let verdict = self
            .config
            .dismissal
            .evaluate_mid_drag(&metrics, geometry.height_px());
        if verdict.should_dismiss {
            self.start_dismiss(verdict.effective_velocity, "fast swipe");
        }

        self.state
    }

    pub fn on_release(&mut self, event: &GestureEvent) -> AnimationState {
        self.touch_origin_y = None;
        if self.state != AnimationState::Dragging {
            return self.state;
        }

        self.animation.set_offset(self.drag_position(event).max(0.0));
        self.sample(event);

        let Some(geometry) = self.session.map(|s| s.geometry) else {
            return self.state;
        };
        let metrics = self.metrics();
        let verdict = self
            .config
            .dismissal
            .evaluate_release(&metrics, geometry.height_px());
        self.log(
            "release",
            json!({
                "dy": metrics.dy,
                "velocity": metrics.velocity,
                "vy": event.vy,
                "max_velocity": metrics.max_history_velocity,
                "consistent": metrics.has_consistent_high_velocity,
                "total_ms": metrics.total_time_ms,
                "dismiss": verdict.should_dismiss,
                "effective_velocity": verdict.effective_velocity,
            }),
        );

        if verdict.should_dismiss {
            self.start_dismiss(verdict.effective_velocity, "release");
        } else {
            self.start_spring_back("release");
        }
        self.session = None;
        self.state
    }

    /// The host took the gesture away. Always springs back: the sheet does
    /// not own the outcome of a cancelled gesture.
    pub fn on_terminate(&mut self, _event: &GestureEvent) -> AnimationState {
        self.touch_origin_y = None;
        if self.state == AnimationState::Dragging {
            self.start_spring_back("terminated");
            self.session = None;
        }
        self.state
    }

    /// Dismiss without a gesture (close button, back navigation).
    /// Returns false when a dismissal is already running.
    pub fn request_dismiss(&mut self) -> bool {
        if self.dismissing {
            return false;
        }
        self.start_dismiss(0.0, "requested");
        true
    }

    /// Advance animations to frame time `now_ms`
    pub fn tick(&mut self, now_ms: f64) -> AnimationState {
        let Some(done) = self.animation.tick(now_ms) else {
            return self.state;
        };
        if self.pending != Some(done.id) {
            return self.state;
        }
        self.pending = None;

        match done.kind {
            TransitionKind::DismissOut => {
                self.state = AnimationState::Idle;
                self.dismissing = false;
                if done.haptic {
                    self.shell.haptic_pulse();
                }
                tracing::info!("sheet dismissed");
                self.log("dismissed", json!({ "offset": self.animation.offset() }));
                self.shell.on_dismiss();
            }
            TransitionKind::SpringBack => {
                self.state = AnimationState::Idle;
                self.log("settled", json!({ "offset": self.animation.offset() }));
            }
        }

        self.state
    }

    /// Validated sheet height: the session's if one is running, else the shell's
    fn geometry(&self) -> Option<SheetGeometry> {
        if let Some(session) = self.session.as_ref() {
            return Some(session.geometry);
        }
        match SheetGeometry::new(self.shell.sheet_height()) {
            Ok(geometry) => Some(geometry),
            Err(e) => {
                tracing::warn!(error = %e, "sheet has no usable height");
                None
            }
        }
    }

    /// Returns false when the sheet cannot be dragged (no usable height).
    fn begin_drag(&mut self, event: &GestureEvent, rule: CaptureRule) -> bool {
        self.session = None;
        let Some(geometry) = self.geometry() else {
            return false;
        };

        // Re-grabbing a returning sheet continues from where it is
        let base_offset = if self.state == AnimationState::SpringingBack {
            self.animation.offset()
        } else {
            0.0
        };

        self.animation.stop();
        self.pending = None;
        self.tracker.reset();
        self.state = AnimationState::Dragging;
        self.session = Some(GestureSession {
            start_time_ms: event.timestamp_ms,
            last_position: base_offset + event.dy,
            last_timestamp_ms: event.timestamp_ms,
            max_velocity: 0.0,
            total_elapsed_ms: 0.0,
            captured_by: rule,
            base_offset,
            geometry,
        });
        tracing::debug!(?rule, dy = event.dy, base_offset, "sheet captured gesture");
        self.log(
            "capture",
            json!({ "rule": format!("{:?}", rule), "dy": event.dy, "base_offset": base_offset }),
        );
        true
    }

    /// Sheet displacement for an event's cumulative finger delta
    fn drag_position(&self, event: &GestureEvent) -> f64 {
        self.session.map_or(0.0, |s| s.base_offset) + event.dy
    }

    fn sample(&mut self, event: &GestureEvent) {
        let position = self.drag_position(event);
        self.tracker.clock_mut().set(event.timestamp_ms);
        self.tracker.add_sample(position);

        if let Some(session) = self.session.as_mut() {
            session.last_position = position;
            session.last_timestamp_ms = event.timestamp_ms;
            session.max_velocity = self.tracker.signed_max_velocity();
            session.total_elapsed_ms = self.tracker.total_time_ms();
        }
    }

    fn metrics(&self) -> GestureMetrics {
        let dy = self.tracker.last_position().unwrap_or(0.0);
        let total_time_ms = self.tracker.total_time_ms();
        let tracker = &self.config.tracker;
        GestureMetrics {
            dy,
            velocity: self.config.dismissal.blended_velocity(dy, total_time_ms),
            max_history_velocity: self.tracker.max_velocity(),
            has_consistent_high_velocity: self.tracker.has_consistent_high_velocity(
                tracker.fast_swipe_velocity,
                tracker.consistency_ratio,
            ),
            total_time_ms,
        }
    }

    fn start_dismiss(&mut self, effective_velocity: f64, reason: &str) {
        if self.dismissing {
            tracing::debug!(reason, "dismissal already in progress");
            return;
        }
        self.dismissing = true;

        let duration = dismiss_duration_ms(effective_velocity, &self.config.animation);
        let haptic = self.config.animation.haptics_enabled && self.shell.haptics_enabled();
        // Without a usable height the sheet finishes where it is
        let target = self
            .geometry()
            .map_or(self.animation.offset().max(0.0), |g| g.height_px());
        let id = self.animation.animate_dismiss_out(target, duration, haptic);

        self.pending = Some(id);
        self.state = AnimationState::AnimatingOut;
        self.session = None;
        tracing::debug!(reason, effective_velocity, duration, "dismissing sheet");
        self.log(
            "dismiss",
            json!({
                "reason": reason,
                "effective_velocity": effective_velocity,
                "duration_ms": duration,
            }),
        );
    }

    fn start_spring_back(&mut self, reason: &str) {
        let id = self.animation.animate_spring_back(0.0);
        self.pending = Some(id);
        self.state = AnimationState::SpringingBack;
        tracing::debug!(reason, offset = self.animation.offset(), "springing back");
        self.log(
            "spring back",
            json!({ "reason": reason, "offset": self.animation.offset() }),
        );
    }

    fn log(&mut self, message: &str, data: serde_json::Value) {
        if let Some(log) = self.debug.as_mut() {
            log.add_log(message, Some(data));
        }
    }
}
