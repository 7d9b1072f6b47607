use num_complex::Complex;
use std::collections::VecDeque;

/// Sliding window of lateral-position samples feeding the spectral analyzer.
pub struct SampleBuffer {
    window: VecDeque<f32>,
    capacity: usize,
}

impl SampleBuffer {
    /// Create a buffer holding at most `capacity` samples (typically 64)
    pub fn new(capacity: usize) -> Self {
        SampleBuffer {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest when full.
    /// Non-finite samples are stored as zero.
    pub fn push(&mut self, sample: f32) {
        if self.window.len() == self.capacity {
            self.window.pop_front();
        }
        self.window
            .push_back(if sample.is_finite() { sample } else { 0.0 });
    }

    /// Samples placed at the front of a zero-filled complex buffer of twice the
    /// capacity. The padding doubles the frequency resolution of the transform.
    pub fn snapshot(&self) -> Vec<Complex<f64>> {
        let mut padded = vec![Complex::new(0.0, 0.0); self.capacity * 2];
        for (slot, sample) in padded.iter_mut().zip(self.window.iter()) {
            *slot = Complex::new(*sample as f64, 0.0);
        }
        padded
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &f32> {
        self.window.iter()
    }
}
