use std::time::{Duration, Instant};

const REPORT_INTERVAL_MS: u32 = 1000;

pub struct FPSCounter {
    last_tick: Option<Instant>,
    // Sub-millisecond remainder not yet handed to `record`.
    carry: Duration,
    accum_ms: u32,
    frames_since_last_report: u32,
    fps: u32,
}

impl FPSCounter {
    pub fn new() -> Self {
        FPSCounter {
            last_tick: None,
            carry: Duration::ZERO,
            accum_ms: 0,
            frames_since_last_report: 0,
            fps: 0,
        }
    }

    /// Call once per rendered frame. Measures the wall time since the previous
    /// call and feeds the whole milliseconds to [`FPSCounter::record`], keeping
    /// the fraction for the next frame. The very first tick counts the frame but
    /// contributes no elapsed time.
    pub fn tick(&mut self, now: Instant) -> Option<u32> {
        let elapsed = match self.last_tick {
            Some(prev) => self.carry + now.saturating_duration_since(prev),
            None => Duration::ZERO,
        };
        self.last_tick = Some(now);

        let whole_ms = elapsed.as_millis().min(u32::MAX as u128) as u32;
        self.carry = elapsed.saturating_sub(Duration::from_millis(whole_ms as u64));
        self.record(whole_ms)
    }

    /// Counts one frame that took `elapsed_ms`. Returns `Some(fps)` each time the
    /// accumulator crosses one second; the overshoot is carried into the next window.
    pub fn record(&mut self, elapsed_ms: u32) -> Option<u32> {
        self.frames_since_last_report += 1;
        self.accum_ms = self.accum_ms.saturating_add(elapsed_ms);

        if self.accum_ms >= REPORT_INTERVAL_MS {
            self.fps = self.frames_since_last_report;
            self.accum_ms -= REPORT_INTERVAL_MS;
            self.frames_since_last_report = 0;
            Some(self.fps)
        } else {
            None
        }
    }

    /// Last reported value; 0 until the first full second has elapsed.
    #[inline(always)]
    pub fn fps(&self) -> u32 {
        self.fps
    }

    #[cfg(test)]
    pub(crate) fn accum_ms(&self) -> u32 {
        self.accum_ms
    }
}

impl Default for FPSCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exactly_one_second_resets_accumulator_and_reports_tally() {
        let mut fps = FPSCounter::new();
        for _ in 0..9 {
            assert_eq!(fps.record(100), None);
        }
        assert_eq!(fps.record(100), Some(10));
        assert_eq!(fps.accum_ms(), 0);
        assert_eq!(fps.fps(), 10);
    }

    #[test]
    fn overshoot_carries_into_next_window() {
        let mut fps = FPSCounter::new();
        assert_eq!(fps.record(600), None);
        assert_eq!(fps.record(650), Some(2));
        assert_eq!(fps.accum_ms(), 250);
        assert_eq!(fps.record(700), None);
        assert_eq!(fps.record(50), Some(2));
        assert_eq!(fps.accum_ms(), 0);
    }

    #[test]
    fn reported_value_holds_between_windows() {
        let mut fps = FPSCounter::new();
        assert_eq!(fps.fps(), 0);
        fps.record(1000);
        assert_eq!(fps.fps(), 1);
        fps.record(16);
        fps.record(16);
        assert_eq!(fps.fps(), 1);
    }

    #[test]
    fn tick_measures_wall_time_between_calls() {
        let mut fps = FPSCounter::new();
        let start = Instant::now();
        assert_eq!(fps.tick(start), None);
        assert_eq!(fps.tick(start + Duration::from_millis(500)), None);
        assert_eq!(fps.tick(start + Duration::from_millis(1000)), Some(3));
        assert_eq!(fps.accum_ms(), 0);
    }

    #[test]
    fn sub_millisecond_frames_still_add_up() {
        let mut fps = FPSCounter::new();
        let start = Instant::now();
        fps.tick(start);
        for i in 1..2000u32 {
            assert_eq!(fps.tick(start + Duration::from_micros(500 * i as u64)), None, "tick {i}");
        }
        assert_eq!(fps.tick(start + Duration::from_secs(1)), Some(2001));
        assert_eq!(fps.fps(), 2001);
    }

    #[test]
    fn fractional_frame_times_do_not_inflate_the_count() {
        let mut fps = FPSCounter::new();
        let start = Instant::now();
        let frame = Duration::from_micros(16_667);
        let reports: Vec<u32> = (0..=120u32).filter_map(|i| fps.tick(start + frame * i)).collect();
        // The first window also counts the initial zero-length frame.
        assert_eq!(reports, vec![61, 60]);
    }
}
