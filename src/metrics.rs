/// Rolling mean over the last `capacity` samples.
///
/// Once full, each push overwrites the oldest sample.
#[derive(Clone, Debug)]
pub struct Average {
    samples: Vec<f64>,
    capacity: usize,
    next: usize,
    sum: f64,
}

impl Average {
    /// A zero `capacity` is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
            next: 0,
            sum: 0.0,
        }
    }

    pub fn push(&mut self, sample: f64) {
        if self.samples.len() < self.capacity {
            self.samples.push(sample);
        } else {
            self.sum -= self.samples[self.next];
            self.samples[self.next] = sample;
        }
        self.sum += sample;
        self.next = (self.next + 1) % self.capacity;
    }

    /// Mean of the stored samples, 0 when empty.
    pub fn average(&self) -> f64 {
        if self.samples.is_empty() {
            0.0
        } else {
            self.sum / self.samples.len() as f64
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
        self.next = 0;
        self.sum = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_average_is_zero() {
        let a = Average::new(4);
        assert!(a.is_empty());
        assert_eq!(a.average(), 0.0);
    }

    #[test]
    fn averages_partial_window() {
        let mut a = Average::new(4);
        a.push(1.0);
        a.push(3.0);
        assert_eq!(a.len(), 2);
        assert_eq!(a.average(), 2.0);
    }

    #[test]
    fn oldest_sample_is_overwritten() {
        let mut a = Average::new(3);
        for s in [10.0, 1.0, 2.0, 3.0] {
            a.push(s);
        }
        assert_eq!(a.len(), 3);
        assert_eq!(a.average(), 2.0);
        a.push(6.0); // drops 1.0
        assert!((a.average() - 11.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn clear_resets() {
        let mut a = Average::new(2);
        a.push(5.0);
        a.clear();
        assert!(a.is_empty());
        a.push(1.0);
        assert_eq!(a.average(), 1.0);
    }

    #[test]
    fn zero_capacity_keeps_latest() {
        let mut a = Average::new(0);
        a.push(1.0);
        a.push(7.0);
        assert_eq!(a.len(), 1);
        assert_eq!(a.average(), 7.0);
    }
}
