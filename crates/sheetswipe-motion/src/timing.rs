//! L4 Atomic Layer: frame-time arithmetic for offset transitions
//!
//! Times are host frame timestamps in milliseconds.

/// Progress of a transition in [0, 1]
#[inline]
pub fn progress(start_ms: f64, now_ms: f64, duration_ms: f64) -> f64 {
    if duration_ms <= 0.0 {
        return 1.0;
    }
    ((now_ms - start_ms) / duration_ms).clamp(0.0, 1.0)
}

#[inline]
pub fn is_complete(start_ms: f64, now_ms: f64, duration_ms: f64) -> bool {
    now_ms - start_ms >= duration_ms
}

/// Linear interpolation between two offsets
#[inline]
pub fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lerp() {
        assert!((lerp(0.0, 600.0, 0.0) - 0.0).abs() < 1e-9);
        assert!((lerp(0.0, 600.0, 0.5) - 300.0).abs() < 1e-9);
        assert!((lerp(120.0, 600.0, 1.0) - 600.0).abs() < 1e-9);
    }

    #[test]
    fn test_progress() {
        assert_eq!(progress(100.0, 100.0, 200.0), 0.0);
        assert!((progress(100.0, 200.0, 200.0) - 0.5).abs() < 1e-9);
        assert_eq!(progress(100.0, 900.0, 200.0), 1.0);
        assert_eq!(progress(100.0, 50.0, 200.0), 0.0);
        assert_eq!(progress(100.0, 100.0, 0.0), 1.0);
        assert!(is_complete(0.0, 150.0, 150.0));
        assert!(!is_complete(0.0, 149.0, 150.0));
    }
}
