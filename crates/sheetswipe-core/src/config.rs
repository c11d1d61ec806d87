use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub tracker: TrackerConfig,
    #[serde(default)]
    pub dismissal: DismissalConfig,
    #[serde(default)]
    pub arbitration: ArbitrationConfig,
    #[serde(default)]
    pub animation: AnimationConfig,
    #[serde(default)]
    pub debug: DebugConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Number of velocity records kept per gesture
    #[serde(default = "default_history_size")]
    pub history_size: usize,
    /// Samples closer together than this are ignored for velocity (sensor jitter)
    #[serde(default = "default_min_time_delta_ms")]
    pub min_time_delta_ms: f64,
    /// Velocity (px/s) above which a sample counts as "fast"
    #[serde(default = "default_fast_swipe_velocity")]
    pub fast_swipe_velocity: f64,
    /// Fraction of fast samples needed to call the gesture a fast swipe
    #[serde(default = "default_consistency_ratio")]
    pub consistency_ratio: f64,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            history_size: default_history_size(),
            min_time_delta_ms: default_min_time_delta_ms(),
            fast_swipe_velocity: default_fast_swipe_velocity(),
            consistency_ratio: default_consistency_ratio(),
        }
    }
}

/// One tier of the empirical minimum-velocity table: drags longer than
/// `min_distance_px` are assumed to move at least `velocity`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VelocityFloor {
    pub min_distance_px: f64,
    pub velocity: f64,
}

/// Thresholds for the dismissal decision engine.
///
/// Ratios are fractions of the sheet height, distances are pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DismissalConfig {
    #[serde(default = "default_large_drag_ratio")]
    pub large_drag_ratio: f64,
    #[serde(default = "default_medium_drag_ratio")]
    pub medium_drag_ratio: f64,
    #[serde(default = "default_small_drag_ratio")]
    pub small_drag_ratio: f64,
    /// Minimum perceptible travel for the medium/small swipe branches
    #[serde(default = "default_min_swipe_distance_px")]
    pub min_swipe_distance_px: f64,
    #[serde(default = "default_short_distance_px")]
    pub short_distance_px: f64,
    #[serde(default = "default_short_ratio")]
    pub short_ratio: f64,
    #[serde(default = "default_flick_distance_px")]
    pub flick_distance_px: f64,
    /// Gestures shorter than this count as flicks
    #[serde(default = "default_flick_window_ms")]
    pub flick_window_ms: f64,
    #[serde(default = "default_flick_velocity")]
    pub flick_velocity: f64,
    /// A fast swipe exits the whole sheet in roughly this many milliseconds
    #[serde(default = "default_fast_exit_ms")]
    pub fast_exit_ms: f64,
    /// Exit time base for large drags that were not fast
    #[serde(default = "default_large_exit_ms")]
    pub large_exit_ms: f64,
    /// Slowest allowed exit; sets the effective velocity floor
    #[serde(default = "default_slowest_exit_ms")]
    pub slowest_exit_ms: f64,
    #[serde(default = "default_large_exit_ratio")]
    pub large_exit_ratio: f64,
    /// Ordered from the longest distance down
    #[serde(default = "default_velocity_floors")]
    pub velocity_floors: [VelocityFloor; 4],
}

impl DismissalConfig {
    pub const DEFAULT: DismissalConfig = DismissalConfig {
        large_drag_ratio: 0.15,
        medium_drag_ratio: 0.08,
        small_drag_ratio: 0.03,
        min_swipe_distance_px: 12.0,
        short_distance_px: 10.0,
        short_ratio: 0.03,
        flick_distance_px: 5.0,
        flick_window_ms: 300.0,
        flick_velocity: 100.0,
        fast_exit_ms: 300.0,
        large_exit_ms: 400.0,
        slowest_exit_ms: 500.0,
        large_exit_ratio: 0.25,
        velocity_floors: DEFAULT_VELOCITY_FLOORS,
    };
}

impl Default for DismissalConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

const DEFAULT_VELOCITY_FLOORS: [VelocityFloor; 4] = [
    VelocityFloor {
        min_distance_px: 30.0,
        velocity: 600.0,
    },
    VelocityFloor {
        min_distance_px: 20.0,
        velocity: 500.0,
    },
    VelocityFloor {
        min_distance_px: 10.0,
        velocity: 400.0,
    },
    VelocityFloor {
        min_distance_px: 5.0,
        velocity: 200.0,
    },
];

/// Gesture ownership thresholds against the nested scroll view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArbitrationConfig {
    /// Touches starting within this many pixels of the sheet top belong to the handle
    #[serde(default = "default_header_height_px")]
    pub header_height_px: f64,
    /// Downward travel needed to steal the gesture from content scrolled to its top
    #[serde(default = "default_top_capture_threshold_px")]
    pub top_capture_threshold_px: f64,
    /// Downward travel needed when the scroll position is unknown
    #[serde(default = "default_ambiguous_capture_threshold_px")]
    pub ambiguous_capture_threshold_px: f64,
}

impl Default for ArbitrationConfig {
    fn default() -> Self {
        Self {
            header_height_px: default_header_height_px(),
            top_capture_threshold_px: default_top_capture_threshold_px(),
            ambiguous_capture_threshold_px: default_ambiguous_capture_threshold_px(),
        }
    }
}

/// Easing curve for the timed dismiss-out transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    None,
    Linear,
    #[default]
    Cubic,
    Quintic,
    EaseOut,
}

/// Tension/friction spring parameters, in the units popular animation drivers use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpringConfig {
    pub tension: f64,
    pub friction: f64,
    pub rest_displacement_threshold: f64,
    pub rest_speed_threshold: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnimationConfig {
    #[serde(default = "default_min_dismiss_ms")]
    pub min_dismiss_ms: f64,
    #[serde(default = "default_max_dismiss_ms")]
    pub max_dismiss_ms: f64,
    #[serde(default)]
    pub easing: EasingType,
    /// Light haptic pulse once the sheet has left the screen
    #[serde(default = "default_true")]
    pub haptics_enabled: bool,
    /// Spring-backs shorter than this use the gentle spring
    #[serde(default = "default_gentle_spring_distance_px")]
    pub gentle_spring_distance_px: f64,
    #[serde(default = "default_standard_spring")]
    pub standard_spring: SpringConfig,
    #[serde(default = "default_gentle_spring")]
    pub gentle_spring: SpringConfig,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            min_dismiss_ms: default_min_dismiss_ms(),
            max_dismiss_ms: default_max_dismiss_ms(),
            easing: EasingType::default(),
            haptics_enabled: default_true(),
            gentle_spring_distance_px: default_gentle_spring_distance_px(),
            standard_spring: default_standard_spring(),
            gentle_spring: default_gentle_spring(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DebugConfig {
    /// Record arbitration and decision details into the in-memory log
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_debug_capacity")]
    pub capacity: usize,
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            capacity: default_debug_capacity(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_history_size() -> usize {
    6
}

fn default_min_time_delta_ms() -> f64 {
    10.0
}

fn default_fast_swipe_velocity() -> f64 {
    800.0
}

fn default_consistency_ratio() -> f64 {
    0.8
}

fn default_large_drag_ratio() -> f64 {
    DismissalConfig::DEFAULT.large_drag_ratio
}

fn default_medium_drag_ratio() -> f64 {
    DismissalConfig::DEFAULT.medium_drag_ratio
}

fn default_small_drag_ratio() -> f64 {
    DismissalConfig::DEFAULT.small_drag_ratio
}

fn default_min_swipe_distance_px() -> f64 {
    DismissalConfig::DEFAULT.min_swipe_distance_px
}

fn default_short_distance_px() -> f64 {
    DismissalConfig::DEFAULT.short_distance_px
}

fn default_short_ratio() -> f64 {
    DismissalConfig::DEFAULT.short_ratio
}

fn default_flick_distance_px() -> f64 {
    DismissalConfig::DEFAULT.flick_distance_px
}

fn default_flick_window_ms() -> f64 {
    DismissalConfig::DEFAULT.flick_window_ms
}

fn default_flick_velocity() -> f64 {
    DismissalConfig::DEFAULT.flick_velocity
}

fn default_fast_exit_ms() -> f64 {
    DismissalConfig::DEFAULT.fast_exit_ms
}

fn default_large_exit_ms() -> f64 {
    DismissalConfig::DEFAULT.large_exit_ms
}

fn default_slowest_exit_ms() -> f64 {
    DismissalConfig::DEFAULT.slowest_exit_ms
}

fn default_large_exit_ratio() -> f64 {
    DismissalConfig::DEFAULT.large_exit_ratio
}

fn default_velocity_floors() -> [VelocityFloor; 4] {
    DEFAULT_VELOCITY_FLOORS
}

fn default_header_height_px() -> f64 {
    50.0
}

fn default_top_capture_threshold_px() -> f64 {
    10.0
}

fn default_ambiguous_capture_threshold_px() -> f64 {
    20.0
}

fn default_min_dismiss_ms() -> f64 {
    150.0
}

fn default_max_dismiss_ms() -> f64 {
    300.0
}

fn default_gentle_spring_distance_px() -> f64 {
    20.0
}

fn default_standard_spring() -> SpringConfig {
    SpringConfig {
        tension: 40.0,
        friction: 8.0,
        rest_displacement_threshold: 0.5,
        rest_speed_threshold: 0.5,
    }
}

fn default_gentle_spring() -> SpringConfig {
    SpringConfig {
        tension: 30.0,
        friction: 12.0,
        rest_displacement_threshold: 0.1,
        rest_speed_threshold: 0.1,
    }
}

fn default_debug_capacity() -> usize {
    100
}

impl AppConfig {
    /// Load configuration from the default path or return defaults
    pub fn load() -> crate::Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load and validate configuration from a specific file
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self =
            toml::from_str(&content).map_err(|e| crate::Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> crate::Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> crate::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, self.to_toml()?)?;

        Ok(())
    }

    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Get the configuration file path
    /// Always uses ~/.config/sheetswipe/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("sheetswipe")
            .join("config.toml")
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> crate::Result<()> {
        if self.tracker.history_size == 0 {
            return Err(crate::Error::Config(
                "tracker.history_size must be at least 1".to_string(),
            ));
        }

        if self.animation.min_dismiss_ms > self.animation.max_dismiss_ms {
            return Err(crate::Error::Config(format!(
                "animation.min_dismiss_ms ({}) exceeds animation.max_dismiss_ms ({})",
                self.animation.min_dismiss_ms, self.animation.max_dismiss_ms
            )));
        }

        for (name, spring) in [
            ("standard_spring", &self.animation.standard_spring),
            ("gentle_spring", &self.animation.gentle_spring),
        ] {
            if spring.tension <= 0.0 || spring.friction <= 0.0 {
                return Err(crate::Error::Config(format!(
                    "animation.{} needs positive tension and friction",
                    name
                )));
            }
        }

        Ok(())
    }
}
