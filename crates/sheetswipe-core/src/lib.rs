pub mod config;
pub mod debug_log;
pub mod dismissal;
pub mod error;
pub mod geometry;
pub mod velocity;

pub use config::{
    AnimationConfig, AppConfig, ArbitrationConfig, DebugConfig, DismissalConfig, EasingType,
    SpringConfig, TrackerConfig,
};
pub use debug_log::{DebugLog, LogEntry};
pub use dismissal::{DismissalVerdict, GestureMetrics};
pub use error::{Error, Result};
pub use geometry::SheetGeometry;
pub use velocity::{Clock, ManualClock, SystemClock, TouchSample, VelocityRecord, VelocityTracker};
