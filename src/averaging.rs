//! Rolling average over the most recent samples of a channel

/// Fixed capacity circular sample store.
///
/// Until the buffer has wrapped once the average is just the latest sample,
/// so there is no partially filled transient. After that it is the plain
/// mean over all `N` slots.
#[derive(Debug, Clone)]
pub struct AveragingBuffer<const N: usize> {
    /// Sample slots, oldest overwritten first
    samples: [u16; N],
    /// Slot the next sample goes into
    cursor: usize,
    /// Set once the cursor wrapped for the first time
    ready: bool,
    /// Most recently pushed sample
    latest: u16,
}

impl<const N: usize> AveragingBuffer<N> {
    /// Creates an empty buffer
    pub const fn new() -> Self {
        Self {
            samples: [0; N],
            cursor: 0,
            ready: false,
            latest: 0,
        }
    }

    /// Stores a sample, evicting the oldest one when the buffer is full
    pub const fn push(&mut self, value: u16) {
        if N == 0 {
            self.latest = value;
            return;
        }
        self.samples[self.cursor] = value;
        self.latest = value;
        self.cursor += 1;
        if self.cursor >= N {
            self.cursor = 0;
            self.ready = true;
        }
    }

    /// Whether every slot holds a real sample
    pub const fn is_ready(&self) -> bool {
        self.ready
    }

    /// Most recently pushed sample, zero if nothing was pushed yet
    pub const fn latest(&self) -> u16 {
        self.latest
    }

    /// Mean of all slots once ready, otherwise the latest sample.
    ///
    /// The sum saturates instead of wrapping, so an oversized buffer degrades
    /// to a low average rather than a plausible looking wrong one.
    pub fn average(&self) -> u16 {
        if !self.ready {
            return self.latest;
        }
        let total = self
            .samples
            .iter()
            .fold(0u32, |acc, &sample| acc.saturating_add(u32::from(sample)));
        // N > 0 when ready
        let count = u32::try_from(N).unwrap_or(u32::MAX);
        u16::try_from(total / count).unwrap_or(u16::MAX)
    }
}

impl<const N: usize> Default for AveragingBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SAMPLE_COUNT;
    use proptest::prelude::*;

    #[test]
    fn empty_buffer_averages_to_zero() {
        let buffer = AveragingBuffer::<SAMPLE_COUNT>::new();
        assert!(!buffer.is_ready());
        assert_eq!(buffer.average(), 0);
    }

    #[test]
    fn average_is_latest_sample_during_warm_up() {
        let mut buffer = AveragingBuffer::<SAMPLE_COUNT>::new();
        for value in [4000, 3000, 100, 3700, 3650, 3600, 3550, 3500, 3450] {
            buffer.push(value);
            assert!(!buffer.is_ready());
            assert_eq!(buffer.average(), value);
        }
    }

    #[test]
    fn ready_after_exactly_capacity_pushes() {
        let mut buffer = AveragingBuffer::<SAMPLE_COUNT>::new();
        for value in 1..=10u16 {
            buffer.push(value * 100);
        }
        assert!(buffer.is_ready());
        // (100 + ... + 1000) / 10
        assert_eq!(buffer.average(), 550);
    }

    #[test]
    fn push_into_full_buffer_evicts_only_the_oldest() {
        let mut buffer = AveragingBuffer::<SAMPLE_COUNT>::new();
        buffer.push(1000);
        for _ in 1..SAMPLE_COUNT {
            buffer.push(0);
        }
        assert_eq!(buffer.average(), 100);

        // the 1000 is the oldest slot and the only one that goes
        buffer.push(0);
        assert_eq!(buffer.average(), 0);
        buffer.push(500);
        assert_eq!(buffer.average(), 50);
    }

    #[test]
    fn average_truncates() {
        let mut buffer = AveragingBuffer::<SAMPLE_COUNT>::new();
        for _ in 0..9 {
            buffer.push(1);
        }
        buffer.push(0);
        assert_eq!(buffer.average(), 0);
    }

    #[test]
    fn full_scale_samples_do_not_wrap() {
        let mut buffer = AveragingBuffer::<SAMPLE_COUNT>::new();
        for _ in 0..SAMPLE_COUNT {
            buffer.push(u16::MAX);
        }
        assert_eq!(buffer.average(), u16::MAX);
    }

    #[test]
    fn oversized_buffer_saturates_instead_of_wrapping() {
        const HUGE: usize = 70_000;
        let mut buffer = AveragingBuffer::<HUGE>::new();
        for _ in 0..HUGE {
            buffer.push(u16::MAX);
        }
        // the sum is pinned at u32::MAX, which is below the true mean
        assert_eq!(buffer.average(), (u32::MAX / 70_000) as u16);
    }

    proptest! {
        #[test]
        fn ready_average_is_mean_of_last_ten(values in proptest::collection::vec(any::<u16>(), 10..40)) {
            let mut buffer = AveragingBuffer::<SAMPLE_COUNT>::new();
            for &value in &values {
                buffer.push(value);
            }
            let tail = &values[values.len() - SAMPLE_COUNT..];
            let expected = tail.iter().map(|&v| u32::from(v)).sum::<u32>() / 10;
            prop_assert!(buffer.is_ready());
            prop_assert_eq!(u32::from(buffer.average()), expected);
        }

        #[test]
        fn warm_up_average_follows_latest(values in proptest::collection::vec(any::<u16>(), 1..10)) {
            let mut buffer = AveragingBuffer::<SAMPLE_COUNT>::new();
            for &value in &values {
                buffer.push(value);
                prop_assert_eq!(buffer.average(), value);
            }
        }
    }
}
