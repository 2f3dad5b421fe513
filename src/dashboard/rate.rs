use serde::Serialize;
use std::collections::VecDeque;

pub const DEFAULT_SAMPLE_CAPACITY: usize = 60;

/// Instantaneous throughput between two consecutive counter readings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RateSample {
    pub timestamp: i64,
    pub up_bytes_per_sec: f64,
    pub down_bytes_per_sec: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct CounterReading {
    bytes_up: u64,
    bytes_down: u64,
    at_millis: i64,
}

/// Turns cumulative byte counters into a bounded throughput series.
#[derive(Debug, Clone)]
pub struct RateSampler {
    baseline: Option<CounterReading>,
    samples: VecDeque<RateSample>,
    capacity: usize,
}

impl RateSampler {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            baseline: None,
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Feed one counter reading. The first reading only establishes the
    /// baseline. A reading that is not strictly later than the baseline is
    /// dropped and the baseline kept.
    pub fn observe(&mut self, bytes_up: u64, bytes_down: u64, at_millis: i64) -> Option<RateSample> {
        let reading = CounterReading {
            bytes_up,
            bytes_down,
            at_millis,
        };

        let Some(previous) = self.baseline else {
            self.baseline = Some(reading);
            return None;
        };

        let elapsed_secs = (at_millis - previous.at_millis) as f64 / 1000.0;
        if elapsed_secs <= 0.0 {
            return None;
        }

        let sample = RateSample {
            timestamp: at_millis,
            up_bytes_per_sec: per_second(previous.bytes_up, bytes_up, elapsed_secs),
            down_bytes_per_sec: per_second(previous.bytes_down, bytes_down, elapsed_secs),
        };

        self.baseline = Some(reading);
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
        Some(sample)
    }

    pub fn samples(&self) -> impl Iterator<Item = &RateSample> {
        self.samples.iter()
    }

    pub fn latest(&self) -> Option<&RateSample> {
        self.samples.back()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for RateSampler {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_CAPACITY)
    }
}

// A counter that went backwards was reset remotely; report zero for that interval
fn per_second(previous: u64, current: u64, elapsed_secs: f64) -> f64 {
    ((current as f64 - previous as f64) / elapsed_secs).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_reading_only_sets_baseline() {
        let mut sampler = RateSampler::default();
        assert!(sampler.observe(1_000, 5_000, 0).is_none());
        assert!(sampler.is_empty());
    }

    #[test]
    fn test_rate_is_delta_over_elapsed_seconds() {
        let mut sampler = RateSampler::default();
        sampler.observe(1_000, 10_000, 0);

        let sample = sampler.observe(3_000, 14_000, 2_000).unwrap();
        assert_eq!(sample.timestamp, 2_000);
        assert_eq!(sample.up_bytes_per_sec, 1_000.0);
        assert_eq!(sample.down_bytes_per_sec, 2_000.0);
    }

    #[test]
    fn test_counter_reset_yields_zero_not_negative() {
        let mut sampler = RateSampler::default();
        sampler.observe(50_000, 80_000, 0);

        let sample = sampler.observe(100, 70_000, 1_000).unwrap();
        assert_eq!(sample.up_bytes_per_sec, 0.0);
        assert_eq!(sample.down_bytes_per_sec, 0.0);

        // The reset reading becomes the new baseline
        let next = sampler.observe(1_100, 70_500, 2_000).unwrap();
        assert_eq!(next.up_bytes_per_sec, 1_000.0);
        assert_eq!(next.down_bytes_per_sec, 500.0);
    }

    #[test]
    fn test_non_increasing_timestamp_is_discarded() {
        let mut sampler = RateSampler::default();
        sampler.observe(0, 0, 5_000);

        assert!(sampler.observe(1_000, 1_000, 5_000).is_none());
        assert!(sampler.observe(1_000, 1_000, 4_000).is_none());
        assert!(sampler.is_empty());

        // Baseline stayed at t=5000 with zero counters
        let sample = sampler.observe(2_000, 4_000, 6_000).unwrap();
        assert_eq!(sample.up_bytes_per_sec, 2_000.0);
        assert_eq!(sample.down_bytes_per_sec, 4_000.0);
    }

    #[test]
    fn test_rates_never_negative_over_noisy_counters() {
        let mut sampler = RateSampler::default();
        let readings: [(u64, u64); 8] = [
            (10, 10),
            (5, 50),
            (500, 0),
            (500, 0),
            (0, 9_000),
            (u64::MAX / 2, 1),
            (3, 3),
            (4, 4),
        ];

        for (i, (up, down)) in readings.iter().enumerate() {
            sampler.observe(*up, *down, i as i64 * 1_000);
        }

        assert!(sampler
            .samples()
            .all(|s| s.up_bytes_per_sec >= 0.0 && s.down_bytes_per_sec >= 0.0));
    }

    #[test]
    fn test_buffer_is_bounded_and_evicts_oldest() {
        let mut sampler = RateSampler::default();
        for i in 0..250u64 {
            sampler.observe(i * 100, i * 200, i as i64 * 1_000);
            assert!(sampler.len() <= DEFAULT_SAMPLE_CAPACITY);
        }

        assert_eq!(sampler.len(), DEFAULT_SAMPLE_CAPACITY);
        let oldest = sampler.samples().next().unwrap();
        assert_eq!(oldest.timestamp, 190_000);
        assert_eq!(sampler.latest().unwrap().timestamp, 249_000);
    }
}
