use heapless::HistoryBuffer;

use crate::clock::{elapsed, Millis};
use crate::config::{PotFilterConfig, TimeRange};
use crate::io::AnalogInput;

/// Samples kept by the moving-average filter.
pub const POT_WINDOW: usize = 10;

/// Map a 16-bit pot reading onto `range` with a blended curve.
///
/// The curve mixes a quadratic term (more resolution at the short end)
/// with the linear reading, weighted by `range.curve` per mille. Integer
/// math only; the result is clamped to `[min_ms, max_ms]`.
///
/// ```
/// use neo_remote::input::map_u16_expo;
/// use neo_remote::TimeRange;
///
/// let holding = TimeRange::new(200, 5000, 350);
/// assert_eq!(map_u16_expo(0, holding), 200);
/// assert_eq!(map_u16_expo(32768, holding), 2179);
/// ```
pub fn map_u16_expo(raw: u16, range: TimeRange) -> u32 {
    let x = u64::from(raw);
    let k = u64::from(range.curve.min(1000));
    let y_quad = (x * x) >> 16;
    let y = (y_quad * k + x * (1000 - k)) / 1000;
    let span = u64::from(range.max_ms.saturating_sub(range.min_ms));
    let mapped = u64::from(range.min_ms) + (y * span) / 65535;
    (mapped as u32).clamp(range.min_ms, range.max_ms.max(range.min_ms))
}

/// Moving-average filter that rejects isolated outliers.
///
/// A reading further than `max_deviation` from the current mean is held
/// back. If `force_after` such readings arrive in a row on the same side,
/// the pot really moved: the history is re-primed from the new reading.
pub struct PotFilter {
    history: HistoryBuffer<u16, POT_WINDOW>,
    mean: u16,
    outlier_streak: u8,
    outlier_above: bool,
    cfg: PotFilterConfig,
}

impl PotFilter {
    pub fn new(cfg: PotFilterConfig) -> Self {
        Self {
            history: HistoryBuffer::new(),
            mean: 0,
            outlier_streak: 0,
            outlier_above: false,
            cfg,
        }
    }

    /// Feed one reading. Returns `true` if the mean was updated.
    pub fn update(&mut self, raw: u16) -> bool {
        if self.history.len() == 0 {
            self.prime(raw);
            return true;
        }

        let diff = i32::from(raw) - i32::from(self.mean);
        if diff.unsigned_abs() > u32::from(self.cfg.max_deviation) {
            let above = diff > 0;
            if self.outlier_streak > 0 && above == self.outlier_above {
                self.outlier_streak = self.outlier_streak.saturating_add(1);
            } else {
                self.outlier_above = above;
                self.outlier_streak = 1;
            }

            if self.outlier_streak >= self.cfg.force_after {
                self.prime(raw);
                return true;
            }
            return false;
        }

        self.outlier_streak = 0;
        self.history.write(raw);
        let sum: u32 = self.history.as_slice().iter().map(|&v| u32::from(v)).sum();
        self.mean = (sum / self.history.len() as u32) as u16;
        true
    }

    /// Current filtered reading.
    pub fn value(&self) -> u16 {
        self.mean
    }

    fn prime(&mut self, raw: u16) {
        self.history = HistoryBuffer::new();
        self.history.write(raw);
        self.mean = raw;
        self.outlier_streak = 0;
    }
}

/// Rate-limited, filtered reader for one pot.
pub struct PotSampler {
    filter: PotFilter,
    interval_ms: u32,
    last_read_at: Option<Millis>,
}

impl PotSampler {
    pub fn new(interval_ms: u32, cfg: PotFilterConfig) -> Self {
        Self {
            filter: PotFilter::new(cfg),
            interval_ms,
            last_read_at: None,
        }
    }

    /// Read `input` if the interval has elapsed since the last read.
    pub fn poll(&mut self, now: Millis, input: &mut dyn AnalogInput) {
        let due = match self.last_read_at {
            None => true,
            Some(at) => elapsed(at, now) >= self.interval_ms,
        };
        if due {
            self.last_read_at = Some(now);
            self.filter.update(input.read_u16());
        }
    }

    /// Filtered reading (0 until the first read).
    pub fn value(&self) -> u16 {
        self.filter.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixed(u16, usize);

    impl AnalogInput for Fixed {
        fn read_u16(&mut self) -> u16 {
            self.1 += 1;
            self.0
        }
    }

    // ── Curve ────────────────────────────────────────────────────────

    #[test]
    fn curve_endpoints_stay_in_range() {
        for range in [
            TimeRange::new(200, 5000, 350),
            TimeRange::new(30, 400, 550),
            TimeRange::new(60, 1000, 450),
        ] {
            assert_eq!(map_u16_expo(0, range), range.min_ms);
            let top = map_u16_expo(u16::MAX, range);
            assert!(top <= range.max_ms && top >= range.max_ms - 1);
        }
    }

    #[test]
    fn curve_midpoints() {
        assert_eq!(map_u16_expo(32768, TimeRange::new(30, 400, 550)), 164);
        assert_eq!(map_u16_expo(32768, TimeRange::new(60, 1000, 450)), 424);
    }

    #[test]
    fn curve_is_monotonic() {
        let range = TimeRange::new(200, 5000, 350);
        let mut last = 0;
        for raw in (0..=u16::MAX).step_by(257) {
            let v = map_u16_expo(raw, range);
            assert!(v >= last);
            last = v;
        }
    }

    #[test]
    fn linear_curve() {
        let range = TimeRange::new(0, 65535, 0);
        assert_eq!(map_u16_expo(1234, range), 1234);
    }

    #[test]
    fn degenerate_range() {
        assert_eq!(map_u16_expo(40000, TimeRange::new(500, 500, 450)), 500);
    }

    // ── Filter ───────────────────────────────────────────────────────

    #[test]
    fn first_reading_primes() {
        let mut f = PotFilter::new(PotFilterConfig::default());
        assert!(f.update(30000));
        assert_eq!(f.value(), 30000);
    }

    #[test]
    fn averages_small_movement() {
        let mut f = PotFilter::new(PotFilterConfig::default());
        f.update(1000);
        f.update(1100);
        assert_eq!(f.value(), 1050);
    }

    #[test]
    fn single_spike_is_rejected() {
        let mut f = PotFilter::new(PotFilterConfig::default());
        f.update(1000);
        assert!(!f.update(9000));
        assert_eq!(f.value(), 1000);
        assert!(f.update(1010));
        assert_eq!(f.value(), 1005);
    }

    #[test]
    fn sustained_jump_reprimes() {
        let mut f = PotFilter::new(PotFilterConfig::default());
        f.update(1000);
        assert!(!f.update(9000));
        assert!(!f.update(9000));
        assert!(!f.update(9000));
        assert!(f.update(9000));
        assert_eq!(f.value(), 9000);
    }

    #[test]
    fn alternating_outliers_do_not_reprime() {
        let mut f = PotFilter::new(PotFilterConfig::default());
        f.update(30000);
        for _ in 0..4 {
            assert!(!f.update(60000));
            assert!(!f.update(0));
        }
        assert_eq!(f.value(), 30000);
    }

    // ── Sampler ──────────────────────────────────────────────────────

    #[test]
    fn sampler_is_rate_limited() {
        let mut pot = Fixed(5000, 0);
        let mut s = PotSampler::new(40, PotFilterConfig::default());
        s.poll(0, &mut pot);
        s.poll(10, &mut pot);
        s.poll(39, &mut pot);
        assert_eq!(pot.1, 1);
        s.poll(40, &mut pot);
        assert_eq!(pot.1, 2);
        assert_eq!(s.value(), 5000);
    }
}
