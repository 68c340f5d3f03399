//! Input level metering and silence tracking.
//!
//! Converts captured PCM windows to dBFS and counts consecutive quiet
//! monitor ticks to decide when a capture should stop on its own.

/// Level reported when no samples are available yet.
pub const SILENCE_FLOOR_DB: f32 = -160.0;

/// Computes the RMS level of a sample window in dBFS.
///
/// Full scale (0 dBFS) corresponds to a square wave at i16 max; speech in a
/// quiet room typically meters between -30 and -10 dBFS, silence below -50.
pub fn dbfs_from_samples(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return SILENCE_FLOOR_DB;
    }

    let sum_of_squares: i64 = samples.iter().map(|&x| (x as i64).pow(2)).sum();
    let mean_square = sum_of_squares as f64 / samples.len() as f64;
    let rms = mean_square.sqrt() as f32;

    if rms > 0.0 {
        20.0 * (rms / i16::MAX as f32).log10()
    } else {
        SILENCE_FLOOR_DB
    }
}

/// Counts consecutive monitor ticks below the silence threshold.
///
/// The counter increments on every quiet tick and resets to zero the moment
/// the level rises above the threshold, so only an unbroken run of silence
/// triggers the auto-stop.
#[derive(Debug, Clone)]
pub struct SilenceTracker {
    threshold_db: f32,
    required_ticks: u32,
    consecutive: u32,
}

impl SilenceTracker {
    /// Creates a tracker that fires after `required_ticks` consecutive ticks
    /// metered below `threshold_db`.
    pub fn new(threshold_db: f32, required_ticks: u32) -> Self {
        Self {
            threshold_db,
            required_ticks: required_ticks.max(1),
            consecutive: 0,
        }
    }

    /// Feeds one metered tick; returns true when the silence run is long
    /// enough to stop the capture.
    pub fn observe(&mut self, level_db: f32) -> bool {
        if level_db < self.threshold_db {
            self.consecutive += 1;
        } else {
            self.consecutive = 0;
        }
        self.consecutive >= self.required_ticks
    }

    /// Current run length of quiet ticks.
    pub fn consecutive(&self) -> u32 {
        self.consecutive
    }

    /// Clears the current run, e.g. when a capture restarts.
    pub fn reset(&mut self) {
        self.consecutive = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_window_meters_at_floor() {
        assert_eq!(dbfs_from_samples(&[]), SILENCE_FLOOR_DB);
        assert_eq!(dbfs_from_samples(&[0, 0, 0]), SILENCE_FLOOR_DB);
    }

    #[test]
    fn test_full_scale_meters_near_zero_dbfs() {
        let samples = vec![i16::MAX; 512];
        let db = dbfs_from_samples(&samples);
        assert!(db.abs() < 0.01, "full scale should be ~0 dBFS, got {db}");
    }

    #[test]
    fn test_half_scale_meters_around_minus_six() {
        let samples = vec![i16::MAX / 2; 512];
        let db = dbfs_from_samples(&samples);
        assert!((db - (-6.02)).abs() < 0.1, "got {db}");
    }

    #[test]
    fn test_three_consecutive_quiet_ticks_trigger() {
        let mut tracker = SilenceTracker::new(-40.0, 3);
        assert!(!tracker.observe(-55.0));
        assert!(!tracker.observe(-60.0));
        assert!(tracker.observe(-50.0));
    }

    #[test]
    fn test_sound_resets_the_run() {
        let mut tracker = SilenceTracker::new(-40.0, 3);

        // Alternate quiet and loud so no three quiet ticks line up.
        for _ in 0..10 {
            assert!(!tracker.observe(-55.0));
            assert!(!tracker.observe(-55.0));
            assert!(!tracker.observe(-20.0));
            assert_eq!(tracker.consecutive(), 0);
        }
    }

    #[test]
    fn test_level_exactly_at_threshold_counts_as_sound() {
        let mut tracker = SilenceTracker::new(-40.0, 1);
        assert!(!tracker.observe(-40.0));
        assert!(tracker.observe(-40.01));
    }

    #[test]
    fn test_reset_clears_run() {
        let mut tracker = SilenceTracker::new(-40.0, 3);
        tracker.observe(-50.0);
        tracker.observe(-50.0);
        tracker.reset();
        assert_eq!(tracker.consecutive(), 0);
        assert!(!tracker.observe(-50.0));
    }
}
