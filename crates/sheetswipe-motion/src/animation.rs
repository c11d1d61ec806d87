//! L3 Molecular Layer: offset animation controller
//!
//! Owns the sheet's vertical offset and runs at most one transition on it at a
//! time. The host calls `tick()` from its frame callback; completions are only
//! ever reported from `tick()`, never from the call that started the
//! transition.

use sheetswipe_core::AnimationConfig;

use super::easing::{EasingType, EasingTypeExt};
use super::spring::{SpringMotion, SpringParams};
use super::timing::{is_complete, lerp, progress};

/// Which named transition is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    DismissOut,
    SpringBack,
}

/// Reported once when a transition reaches its target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub id: u64,
    pub kind: TransitionKind,
    /// Caller should fire a light haptic pulse
    pub haptic: bool,
}

#[derive(Debug, Clone)]
enum Motion {
    Timing {
        from: f64,
        to: f64,
        duration_ms: f64,
        easing: EasingType,
    },
    Spring(SpringMotion),
}

#[derive(Debug, Clone)]
struct ActiveTransition {
    id: u64,
    kind: TransitionKind,
    motion: Motion,
    /// Set from the first frame after the transition starts
    start_ms: Option<f64>,
    haptic: bool,
}

/// Exit duration for a given effective velocity: faster swipes finish sooner,
/// bounded to `[min_dismiss_ms, max_dismiss_ms]`.
pub fn dismiss_duration_ms(effective_velocity: f64, config: &AnimationConfig) -> f64 {
    let speed = (effective_velocity.abs() / 2.0).max(0.2).min(1.0);
    let duration = (config.max_dismiss_ms * (1.0 - speed * 0.7)).max(config.min_dismiss_ms);
    duration.min(config.max_dismiss_ms)
}

/// Drives dismiss-out and spring-back transitions over a single offset value.
#[derive(Debug, Clone)]
pub struct AnimationController {
    config: AnimationConfig,
    offset: f64,
    active: Option<ActiveTransition>,
    next_id: u64,
}

impl Default for AnimationController {
    fn default() -> Self {
        Self::new(AnimationConfig::default())
    }
}

impl AnimationController {
    pub fn new(config: AnimationConfig) -> Self {
        Self {
            config,
            offset: 0.0,
            active: None,
            next_id: 1,
        }
    }

    /// Current offset, for the host to bind to a translation
    #[inline]
    pub fn offset(&self) -> f64 {
        self.offset
    }

    #[inline]
    pub fn is_animating(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_kind(&self) -> Option<TransitionKind> {
        self.active.as_ref().map(|a| a.kind)
    }

    /// Stop the running transition where it is. Its completion never fires.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::trace!(
                id = active.id,
                kind = ?active.kind,
                offset = self.offset,
                "transition stopped"
            );
        }
    }

    /// Set the offset directly, stopping any transition first (live drag).
    pub fn set_offset(&mut self, offset: f64) {
        self.stop();
        self.offset = offset;
    }

    /// Timed transition to the fully hidden position. Returns the transition id.
    pub fn animate_dismiss_out(
        &mut self,
        target_offset: f64,
        duration_ms: f64,
        haptics_enabled: bool,
    ) -> u64 {
        let motion = Motion::Timing {
            from: self.offset,
            to: target_offset,
            duration_ms,
            easing: self.config.easing,
        };
        self.start(TransitionKind::DismissOut, motion, haptics_enabled)
    }

    /// Spring back to `to_value`, gentler for short distances so near-accidental
    /// touches do not visibly overshoot.
    pub fn animate_spring_back(&mut self, to_value: f64) -> u64 {
        let distance = (to_value - self.offset).abs();
        let spring = if distance < self.config.gentle_spring_distance_px {
            &self.config.gentle_spring
        } else {
            &self.config.standard_spring
        };
        let params = SpringParams::from_config(spring);
        let motion = Motion::Spring(SpringMotion::new(params, self.offset, to_value, 0.0));
        self.start(TransitionKind::SpringBack, motion, false)
    }

    fn start(&mut self, kind: TransitionKind, motion: Motion, haptic: bool) -> u64 {
        self.stop();
        let id = self.next_id;
        self.next_id += 1;
        tracing::trace!(id, ?kind, from = self.offset, "transition started");
        self.active = Some(ActiveTransition {
            id,
            kind,
            motion,
            start_ms: None,
            haptic,
        });
        id
    }

    /// Advance to frame time `now_ms`. Returns the completion when the running
    /// transition lands exactly on its target.
    pub fn tick(&mut self, now_ms: f64) -> Option<Completion> {
        let active = self.active.as_mut()?;
        let start_ms = *active.start_ms.get_or_insert(now_ms);
        let elapsed = now_ms - start_ms;

        let (offset, done, target) = match &active.motion {
            Motion::Timing {
                from,
                to,
                duration_ms,
                easing,
            } => {
                let t = easing.apply(progress(start_ms, now_ms, *duration_ms));
                (lerp(*from, *to, t), is_complete(start_ms, now_ms, *duration_ms), *to)
            }
            Motion::Spring(spring) => {
                let (position, _) = spring.sample(elapsed);
                (position, spring.is_at_rest(elapsed), spring.to)
            }
        };

        if !done {
            self.offset = offset;
            return None;
        }

        self.offset = target;
        let finished = self.active.take()?;
        tracing::trace!(id = finished.id, kind = ?finished.kind, "transition complete");
        Some(Completion {
            id: finished.id,
            kind: finished.kind,
            haptic: finished.haptic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_completion(controller: &mut AnimationController, mut now: f64) -> (Completion, f64) {
        for _ in 0..1000 {
            if let Some(done) = controller.tick(now) {
                return (done, now);
            }
            now += 16.0;
        }
        panic!("transition never completed");
    }

    #[test]
    fn test_duration_bounds() {
        let config = AnimationConfig::default();
        for v in [0.0, 0.1, 0.4, 1.0, 1.9, 2.0, 10.0, -3.0, 1e9, -1e9, f64::INFINITY] {
            let d = dismiss_duration_ms(v, &config);
            assert!((150.0..=300.0).contains(&d), "v={} d={}", v, d);
        }
    }

    #[test]
    fn test_duration_shrinks_with_velocity() {
        let config = AnimationConfig::default();
        // speed clamps at 0.2 for slow exits
        assert!((dismiss_duration_ms(0.0, &config) - 258.0).abs() < 1e-9);
        assert!((dismiss_duration_ms(1.0, &config) - 195.0).abs() < 1e-9);
        assert_eq!(dismiss_duration_ms(2.0, &config), 150.0);
        assert!(dismiss_duration_ms(0.5, &config) > dismiss_duration_ms(1.5, &config));
    }

    #[test]
    fn test_dismiss_out_reaches_target_once() {
        let mut controller = AnimationController::default();
        controller.set_offset(120.0);
        let id = controller.animate_dismiss_out(600.0, 200.0, true);
        assert_eq!(controller.active_kind(), Some(TransitionKind::DismissOut));

        // First frame anchors the start time
        assert_eq!(controller.tick(1000.0), None);
        assert_eq!(controller.offset(), 120.0);

        assert_eq!(controller.tick(1100.0), None);
        assert!(controller.offset() > 120.0 && controller.offset() < 600.0);

        let done = controller.tick(1200.0).unwrap();
        assert_eq!(done.id, id);
        assert_eq!(done.kind, TransitionKind::DismissOut);
        assert!(done.haptic);
        assert_eq!(controller.offset(), 600.0);

        assert_eq!(controller.tick(1300.0), None);
        assert!(!controller.is_animating());
        assert_eq!(controller.active_kind(), None);
    }

    #[test]
    fn test_spring_back_lands_exactly_on_target() {
        let mut controller = AnimationController::default();
        controller.set_offset(180.0);
        let id = controller.animate_spring_back(0.0);
        let (done, _) = run_to_completion(&mut controller, 0.0);
        assert_eq!(done.id, id);
        assert_eq!(done.kind, TransitionKind::SpringBack);
        assert!(!done.haptic);
        assert_eq!(controller.offset(), 0.0);
    }

    #[test]
    fn test_short_spring_back_is_gentle() {
        let mut controller = AnimationController::default();
        controller.set_offset(12.0);
        controller.animate_spring_back(0.0);
        let mut now = 0.0;
        loop {
            let done = controller.tick(now);
            assert!(controller.offset() >= 0.0, "overshoot to {}", controller.offset());
            if done.is_some() {
                break;
            }
            now += 16.0;
        }
    }

    #[test]
    fn test_new_transition_cancels_running_one() {
        let mut controller = AnimationController::default();
        controller.set_offset(300.0);
        let first = controller.animate_spring_back(0.0);
        assert_eq!(controller.active_kind(), Some(TransitionKind::SpringBack));
        controller.tick(0.0);
        controller.tick(16.0);

        let second = controller.animate_dismiss_out(600.0, 150.0, false);
        assert_ne!(first, second);
        let (done, _) = run_to_completion(&mut controller, 32.0);
        assert_eq!(done.id, second);
        assert_eq!(controller.tick(10_000.0), None);
    }

    #[test]
    fn test_set_offset_stops_animation() {
        let mut controller = AnimationController::default();
        controller.set_offset(200.0);
        controller.animate_spring_back(0.0);
        controller.tick(0.0);
        controller.set_offset(40.0);
        assert!(!controller.is_animating());
        assert_eq!(controller.tick(5000.0), None);
        assert_eq!(controller.offset(), 40.0);
    }
}
