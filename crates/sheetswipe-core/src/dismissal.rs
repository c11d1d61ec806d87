//! Dismissal decision engine.
//!
//! Pure, direction-aware functions: downward (positive `dy`) travel may
//! dismiss the sheet, upward travel never does. Velocities fed in here should
//! be the blended estimate from [`blended_velocity`], not raw platform `vy`,
//! which is often near zero during real swipes.

use serde::{Deserialize, Serialize};

use crate::config::DismissalConfig;
use crate::geometry::percent_dragged;

/// Outcome of evaluating one sample or release.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DismissalVerdict {
    pub should_dismiss: bool,
    /// Animation-ready velocity for the exit transition
    pub effective_velocity: f64,
}

/// Everything the engine needs to know about a gesture at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GestureMetrics {
    /// Displacement since gesture start, positive downward
    pub dy: f64,
    /// Blended velocity estimate
    pub velocity: f64,
    /// Largest velocity magnitude in the tracker history
    pub max_history_velocity: f64,
    pub has_consistent_high_velocity: bool,
    pub total_time_ms: f64,
}

#[inline]
fn sign_of(dy: f64) -> f64 {
    if dy < 0.0 {
        -1.0
    } else {
        1.0
    }
}

impl DismissalConfig {
    /// Distance-driven dismissal check.
    ///
    /// Velocity is deliberately not required: once a drag passes the small
    /// threshold with perceptible travel it counts as dismissal intent, since
    /// sensed velocity is too unreliable to gate on.
    pub fn should_dismiss_swipe(
        &self,
        dy: f64,
        _velocity: f64,
        _max_history_velocity: f64,
        _has_consistent_high_velocity: bool,
        sheet_height: f64,
    ) -> bool {
        if dy < 0.0 {
            return false;
        }

        let distance = dy.abs();
        let percent = percent_dragged(dy, sheet_height);

        if percent > self.large_drag_ratio {
            return true;
        }
        if percent > self.medium_drag_ratio && distance > self.min_swipe_distance_px {
            return true;
        }
        percent > self.small_drag_ratio && distance > self.min_swipe_distance_px
    }

    /// Catches flicks too brief to satisfy the swipe thresholds.
    pub fn should_dismiss_short_gesture(
        &self,
        dy: f64,
        velocity: f64,
        max_history_velocity: f64,
        total_time_ms: f64,
        sheet_height: f64,
    ) -> bool {
        if dy < 0.0 {
            return false;
        }

        let distance = dy.abs();
        if distance > self.short_distance_px
            && percent_dragged(dy, sheet_height) > self.short_ratio
        {
            return true;
        }

        let peak = velocity.abs().max(max_history_velocity);
        distance > self.flick_distance_px
            && (total_time_ms < self.flick_window_ms || peak > self.flick_velocity)
    }

    /// Synthesize the velocity the exit animation runs at, proportional to
    /// gesture energy rather than raw `vy`.
    pub fn calculate_effective_velocity(
        &self,
        dy: f64,
        vy: f64,
        is_fast_swipe: bool,
        max_history_velocity: f64,
        sheet_height: f64,
    ) -> f64 {
        let percent = percent_dragged(dy, sheet_height);
        let sign = sign_of(dy);

        if is_fast_swipe {
            let base = sheet_height / self.fast_exit_ms;
            let magnitude = if percent < 0.1 {
                (base * 1.5).max(max_history_velocity * 0.8)
            } else if percent < 0.2 {
                (base * 1.2).max(max_history_velocity * 0.6)
            } else {
                base
            };
            return magnitude * sign;
        }

        if percent > self.large_exit_ratio {
            let base = sheet_height / self.large_exit_ms;
            return base.max(max_history_velocity * 0.5) * sign;
        }

        let blended = 0.4 * vy.abs() + 0.6 * max_history_velocity;
        blended.max(sheet_height / self.slowest_exit_ms) * sign
    }

    /// Empirical velocity floor keyed to drag distance.
    pub fn min_velocity_floor(&self, dy: f64) -> f64 {
        let distance = dy.abs();
        self.velocity_floors
            .iter()
            .find(|floor| distance > floor.min_distance_px)
            .map(|floor| floor.velocity)
            .unwrap_or(0.0)
    }

    /// Velocity to feed the decision functions: the manual distance/time
    /// estimate when it beats the distance floor, else the floor, signed by `dy`.
    pub fn blended_velocity(&self, dy: f64, total_time_ms: f64) -> f64 {
        let manual = manual_velocity(dy, total_time_ms);
        let floor = self.min_velocity_floor(dy);

        if manual.abs() > floor {
            manual
        } else if floor > 0.0 {
            floor * sign_of(dy)
        } else {
            0.0
        }
    }

    /// Decision at release: swipe or short-gesture rules, plus the exit velocity.
    pub fn evaluate_release(
        &self,
        metrics: &GestureMetrics,
        sheet_height: f64,
    ) -> DismissalVerdict {
        let swipe = self.should_dismiss_swipe(
            metrics.dy,
            metrics.velocity,
            metrics.max_history_velocity,
            metrics.has_consistent_high_velocity,
            sheet_height,
        );
        let short = self.should_dismiss_short_gesture(
            metrics.dy,
            metrics.velocity,
            metrics.max_history_velocity,
            metrics.total_time_ms,
            sheet_height,
        );

        self.verdict(swipe || short, metrics, sheet_height)
    }

    /// Decision during a move: only a detected fast swipe that also clears the
    /// swipe thresholds dismisses before the finger lifts.
    pub fn evaluate_mid_drag(
        &self,
        metrics: &GestureMetrics,
        sheet_height: f64,
    ) -> DismissalVerdict {
        let fire = metrics.has_consistent_high_velocity
            && self.should_dismiss_swipe(
                metrics.dy,
                metrics.velocity,
                metrics.max_history_velocity,
                metrics.has_consistent_high_velocity,
                sheet_height,
            );

        self.verdict(fire, metrics, sheet_height)
    }

    fn verdict(
        &self,
        should_dismiss: bool,
        metrics: &GestureMetrics,
        sheet_height: f64,
    ) -> DismissalVerdict {
        let effective_velocity = if should_dismiss {
            self.calculate_effective_velocity(
                metrics.dy,
                metrics.velocity,
                metrics.has_consistent_high_velocity,
                metrics.max_history_velocity,
                sheet_height,
            )
        } else {
            0.0
        };

        DismissalVerdict {
            should_dismiss,
            effective_velocity,
        }
    }
}

/// `abs(dy)` over elapsed seconds, signed by `dy`. Zero elapsed time yields 0.0.
pub fn manual_velocity(dy: f64, total_time_ms: f64) -> f64 {
    if total_time_ms <= 0.0 {
        return 0.0;
    }
    dy.abs() / (total_time_ms / 1000.0) * sign_of(dy)
}

pub fn should_dismiss_swipe(
    dy: f64,
    velocity: f64,
    max_history_velocity: f64,
    has_consistent_high_velocity: bool,
    sheet_height: f64,
) -> bool {
    DismissalConfig::DEFAULT.should_dismiss_swipe(
        dy,
        velocity,
        max_history_velocity,
        has_consistent_high_velocity,
        sheet_height,
    )
}

pub fn should_dismiss_short_gesture(
    dy: f64,
    velocity: f64,
    max_history_velocity: f64,
    total_time_ms: f64,
    sheet_height: f64,
) -> bool {
    DismissalConfig::DEFAULT.should_dismiss_short_gesture(
        dy,
        velocity,
        max_history_velocity,
        total_time_ms,
        sheet_height,
    )
}

pub fn calculate_effective_velocity(
    dy: f64,
    vy: f64,
    is_fast_swipe: bool,
    max_history_velocity: f64,
    sheet_height: f64,
) -> f64 {
    DismissalConfig::DEFAULT.calculate_effective_velocity(
        dy,
        vy,
        is_fast_swipe,
        max_history_velocity,
        sheet_height,
    )
}

pub fn min_velocity_floor(dy: f64) -> f64 {
    DismissalConfig::DEFAULT.min_velocity_floor(dy)
}

pub fn blended_velocity(dy: f64, total_time_ms: f64) -> f64 {
    DismissalConfig::DEFAULT.blended_velocity(dy, total_time_ms)
}
