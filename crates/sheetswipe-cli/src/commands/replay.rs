use std::path::Path;

use anyhow::Result;
use serde::Deserialize;

use sheetswipe_core::{AppConfig, Error, SheetGeometry};
use sheetswipe_motion::{AnimationState, GestureArbiter, GestureEvent, SheetShell};

/// Animations still running this long after the last event are reported as stuck
const SETTLE_LIMIT_MS: f64 = 10_000.0;

#[derive(Debug, Deserialize)]
pub struct GestureTrace {
    pub sheet_height: f64,
    #[serde(default)]
    pub scroll_offset: Option<f64>,
    #[serde(default = "default_true")]
    pub haptics: bool,
    pub events: Vec<TraceEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    Start,
    Move,
    Release,
    Terminate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TraceEvent {
    pub kind: TraceKind,
    pub t_ms: f64,
    #[serde(default)]
    pub dy: f64,
    #[serde(default)]
    pub vy: f64,
    #[serde(default)]
    pub location_y: f64,
    /// Scroll position of the content at this event, if it changed
    #[serde(default)]
    pub scroll_offset: Option<f64>,
}

impl TraceEvent {
    fn to_gesture_event(&self) -> GestureEvent {
        GestureEvent::at(self.t_ms, self.dy)
            .with_vy(self.vy)
            .with_location_y(self.location_y)
    }
}

fn default_true() -> bool {
    true
}

pub fn parse_trace(content: &str) -> sheetswipe_core::Result<GestureTrace> {
    let trace: GestureTrace = serde_json::from_str(content)?;
    SheetGeometry::new(trace.sheet_height)?;

    if trace.events.is_empty() {
        return Err(Error::InvalidTrace("trace has no events".to_string()));
    }

    for pair in trace.events.windows(2) {
        if pair[1].t_ms < pair[0].t_ms {
            return Err(Error::InvalidTrace(format!(
                "event at {}ms comes after {}ms",
                pair[1].t_ms, pair[0].t_ms
            )));
        }
    }

    Ok(trace)
}

struct ReplayShell {
    height: f64,
    scroll_offset: Option<f64>,
    haptics: bool,
    dismissals: u32,
    pulses: u32,
}

impl SheetShell for ReplayShell {
    fn sheet_height(&self) -> f64 {
        self.height
    }

    fn scroll_offset(&self) -> Option<f64> {
        self.scroll_offset
    }

    fn haptics_enabled(&self) -> bool {
        self.haptics
    }

    fn on_dismiss(&mut self) {
        self.dismissals += 1;
    }

    fn haptic_pulse(&mut self) {
        self.pulses += 1;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transition {
    pub at_ms: f64,
    pub from: AnimationState,
    pub to: AnimationState,
    pub cause: String,
}

#[derive(Debug)]
pub struct ReplaySummary {
    pub transitions: Vec<Transition>,
    pub final_state: AnimationState,
    pub final_offset: f64,
    pub dismissals: u32,
    pub pulses: u32,
    pub logs: Vec<String>,
}

struct Recorder {
    transitions: Vec<Transition>,
    last: AnimationState,
}

impl Recorder {
    fn observe(&mut self, at_ms: f64, state: AnimationState, cause: impl Into<String>) {
        if state != self.last {
            self.transitions.push(Transition {
                at_ms,
                from: self.last,
                to: state,
                cause: cause.into(),
            });
            self.last = state;
        }
    }
}

/// Run a trace through a fresh arbiter, driving frames every `frame_ms`.
pub fn simulate(config: &AppConfig, trace: &GestureTrace, frame_ms: f64) -> ReplaySummary {
    let frame_ms = if frame_ms > 0.0 { frame_ms } else { 16.0 };
    let shell = ReplayShell {
        height: trace.sheet_height,
        scroll_offset: trace.scroll_offset,
        haptics: trace.haptics,
        dismissals: 0,
        pulses: 0,
    };
    let mut arbiter = GestureArbiter::new(shell, config.clone());
    let mut recorder = Recorder {
        transitions: Vec::new(),
        last: arbiter.state(),
    };

    // An empty trace replays as nothing happening
    let mut now = trace.events.first().map_or(0.0, |e| e.t_ms);
    for event in &trace.events {
        while now + frame_ms <= event.t_ms {
            now += frame_ms;
            let state = arbiter.tick(now);
            recorder.observe(now, state, "frame");
        }

        if let Some(offset) = event.scroll_offset {
            arbiter.shell_mut().scroll_offset = Some(offset);
        }

        let gesture = event.to_gesture_event();
        let state = match event.kind {
            TraceKind::Start => {
                arbiter.on_touch_start(&gesture);
                arbiter.state()
            }
            TraceKind::Move => {
                let ownership = arbiter.ownership(&gesture);
                tracing::debug!(
                    t_ms = event.t_ms,
                    dy = event.dy,
                    sheet = ownership.is_sheet(),
                    "move"
                );
                arbiter.on_move(&gesture)
            }
            TraceKind::Release => arbiter.on_release(&gesture),
            TraceKind::Terminate => arbiter.on_terminate(&gesture),
        };
        recorder.observe(event.t_ms, state, format!("{:?} dy={}", event.kind, event.dy));
    }

    // Frames continue from the last event until the sheet comes to rest
    let mut now = trace.events.last().map(|e| e.t_ms).unwrap_or(now);
    let deadline = now + SETTLE_LIMIT_MS;
    while arbiter.state() != AnimationState::Idle && arbiter.state() != AnimationState::Dragging {
        if now >= deadline {
            tracing::warn!(state = ?arbiter.state(), "animation did not settle");
            break;
        }
        now += frame_ms;
        let state = arbiter.tick(now);
        recorder.observe(now, state, "frame");
    }

    let logs = arbiter
        .debug_log()
        .map(|log| {
            log.logs()
                .map(|entry| match &entry.data {
                    Some(data) => format!("{} {}", entry.message, data),
                    None => entry.message.clone(),
                })
                .collect()
        })
        .unwrap_or_default();

    ReplaySummary {
        transitions: recorder.transitions,
        final_state: arbiter.state(),
        final_offset: arbiter.offset(),
        dismissals: arbiter.shell().dismissals,
        pulses: arbiter.shell().pulses,
        logs,
    }
}

pub fn run(config: &AppConfig, trace_path: &Path, frame_ms: f64, debug: bool) -> Result<()> {
    if !trace_path.exists() {
        println!("Trace not found: {}", trace_path.display());
        return Ok(());
    }

    let content = std::fs::read_to_string(trace_path)?;
    let trace = parse_trace(&content)?;

    let mut config = config.clone();
    config.debug.enabled |= debug;

    println!(
        "Replaying {} events (sheet height {}px)\n",
        trace.events.len(),
        trace.sheet_height
    );

    let summary = simulate(&config, &trace, frame_ms);

    for transition in &summary.transitions {
        println!(
            "[{:>8.1}ms] {:?} -> {:?} ({})",
            transition.at_ms, transition.from, transition.to, transition.cause
        );
    }

    println!("\nFinal state:  {:?}", summary.final_state);
    println!("Final offset: {:.1}px", summary.final_offset);
    println!("Dismissed:    {}", summary.dismissals > 0);
    if summary.pulses > 0 {
        println!("Haptics:      {} pulse(s)", summary.pulses);
    }

    if debug && !summary.logs.is_empty() {
        println!("\nDebug log:");
        for line in &summary.logs {
            println!("  {}", line);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FLICK: &str = r#"{
        "sheet_height": 600,
        "events": [
            { "kind": "start", "t_ms": 0, "location_y": 12 },
            { "kind": "move", "t_ms": 100, "dy": 50 },
            { "kind": "move", "t_ms": 200, "dy": 120 },
            { "kind": "release", "t_ms": 260, "dy": 130 }
        ]
    }"#;

    #[test]
    fn test_parse_rejects_bad_traces() {
        assert!(matches!(
            parse_trace(r#"{ "sheet_height": 0, "events": [] }"#),
            Err(Error::InvalidGeometry(_))
        ));
        assert!(matches!(
            parse_trace(r#"{ "sheet_height": 600, "events": [] }"#),
            Err(Error::InvalidTrace(_))
        ));
        assert!(matches!(
            parse_trace(
                r#"{ "sheet_height": 600, "events": [
                    { "kind": "start", "t_ms": 50 },
                    { "kind": "move", "t_ms": 10, "dy": 5 }
                ] }"#
            ),
            Err(Error::InvalidTrace(_))
        ));
        assert!(matches!(parse_trace("not json"), Err(Error::Json(_))));
    }

    #[test]
    fn test_replay_dismisses_drag() {
        let trace = parse_trace(FLICK).unwrap();
        let summary = simulate(&AppConfig::default(), &trace, 16.0);

        assert_eq!(summary.dismissals, 1);
        assert_eq!(summary.pulses, 1);
        assert_eq!(summary.final_state, AnimationState::Idle);
        assert_eq!(summary.final_offset, 600.0);

        let states: Vec<_> = summary.transitions.iter().map(|t| t.to).collect();
        assert_eq!(
            states,
            vec![
                AnimationState::Dragging,
                AnimationState::AnimatingOut,
                AnimationState::Idle
            ]
        );
    }

    #[test]
    fn test_replay_scrolled_content_never_dismisses() {
        let trace = parse_trace(
            r#"{
                "sheet_height": 600,
                "scroll_offset": 240,
                "events": [
                    { "kind": "start", "t_ms": 0, "location_y": 300 },
                    { "kind": "move", "t_ms": 16, "dy": 40 },
                    { "kind": "move", "t_ms": 32, "dy": 160 },
                    { "kind": "release", "t_ms": 48, "dy": 160 }
                ]
            }"#,
        )
        .unwrap();
        let summary = simulate(&AppConfig::default(), &trace, 16.0);
        assert_eq!(summary.dismissals, 0);
        assert!(summary.transitions.is_empty());
    }

    #[test]
    fn test_replay_debug_log() {
        let mut config = AppConfig::default();
        config.debug.enabled = true;
        let trace = parse_trace(FLICK).unwrap();
        let summary = simulate(&config, &trace, 16.0);
        assert!(summary.logs.iter().any(|line| line.starts_with("capture")));
        assert!(summary.logs.iter().any(|line| line.starts_with("dismissed")));
    }

    #[test]
    fn test_simulate_empty_trace() {
        let trace = GestureTrace {
            sheet_height: 600.0,
            scroll_offset: None,
            haptics: true,
            events: Vec::new(),
        };
        let summary = simulate(&AppConfig::default(), &trace, 16.0);
        assert!(summary.transitions.is_empty());
        assert_eq!(summary.final_state, AnimationState::Idle);
        assert_eq!(summary.final_offset, 0.0);
        assert_eq!(summary.dismissals, 0);
    }
}
