use crate::types::AudioData;

/// Mean level (0-255 scale) below which a frame counts as silent.
pub const SILENCE_THRESHOLD: f32 = 50.0;
/// Continuous silence that ends a recording.
pub const SILENCE_DURATION_MS: u64 = 2_000;
/// Hard cap on recording length.
pub const MAX_RECORDING_MS: u64 = 60_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorDecision {
    Continue,
    StopForSilence,
    StopForLimit,
}

/// Decides when a live recording should stop.
///
/// The silence timer starts on the first quiet frame and is cleared by any
/// frame at or above the threshold.
#[derive(Debug, Clone)]
pub struct SilenceMonitor {
    threshold: f32,
    silence_ms: u64,
    limit_ms: u64,
    silent_since: Option<u64>,
}

impl Default for SilenceMonitor {
    fn default() -> Self {
        Self::new(SILENCE_THRESHOLD, SILENCE_DURATION_MS, MAX_RECORDING_MS)
    }
}

impl SilenceMonitor {
    pub fn new(threshold: f32, silence_ms: u64, limit_ms: u64) -> Self {
        Self {
            threshold,
            silence_ms,
            limit_ms,
            silent_since: None,
        }
    }

    /// Feeds one level frame observed `at_ms` after the recording started.
    pub fn observe(&mut self, at_ms: u64, level: f32) -> MonitorDecision {
        if at_ms >= self.limit_ms {
            return MonitorDecision::StopForLimit;
        }
        if level < self.threshold {
            let since = *self.silent_since.get_or_insert(at_ms);
            if at_ms.saturating_sub(since) >= self.silence_ms {
                return MonitorDecision::StopForSilence;
            }
        } else {
            self.silent_since = None;
        }
        MonitorDecision::Continue
    }

    pub fn reset(&mut self) {
        self.silent_since = None;
    }
}

/// Where and why a recording would have been stopped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StopPoint {
    pub at_seconds: f64,
    pub decision: MonitorDecision,
}

/// Replays `audio` through `monitor` in `window_ms` frames.
///
/// Returns `None` when the recording ends before the monitor asks to stop.
pub fn find_stop_point(
    audio: &AudioData,
    window_ms: f64,
    monitor: &mut SilenceMonitor,
) -> Option<StopPoint> {
    if audio.samples.is_empty() || audio.sample_rate == 0 {
        return None;
    }

    let sample_rate = audio.sample_rate as f64;
    let window_size = ((window_ms / 1000.0) * sample_rate).max(1.0) as usize;

    let mut idx = 0;
    while idx < audio.samples.len() {
        let end = (idx + window_size).min(audio.samples.len());
        let level = window_level(&audio.samples[idx..end]);
        let at_ms = (idx as f64 / sample_rate * 1000.0) as u64;
        match monitor.observe(at_ms, level) {
            MonitorDecision::Continue => {}
            decision => {
                return Some(StopPoint {
                    at_seconds: idx as f64 / sample_rate,
                    decision,
                })
            }
        }
        idx += window_size;
    }
    None
}

/// Mean absolute amplitude of a window, scaled to 0-255.
fn window_level(window: &[f32]) -> f32 {
    if window.is_empty() {
        return 0.0;
    }
    let sum: f32 = window.iter().map(|sample| sample.abs().min(1.0)).sum();
    sum / window.len() as f32 * 255.0
}
