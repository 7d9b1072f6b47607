use num_complex::Complex;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Spectral summary of the current sample window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FrequencyEstimate {
    pub dominant_bin: usize,
    pub dominant_magnitude: f64,
    /// Bin converted to Hz before the cadence calibration.
    pub raw_frequency_hz: f32,
    /// Waddle cadence compared against the sprint/walk/sneak thresholds.
    pub frequency_hz: f32,
    /// Real part of bin 0: accumulated lateral bias over the window.
    pub dc_offset: f32,
}

/// Dominant-frequency estimator over a zero-padded sample window.
#[derive(Clone, Debug)]
pub struct FrequencyAnalyzer {
    sample_rate_hz: f32,
    window_capacity: usize,
}

impl FrequencyAnalyzer {
    pub fn new(sample_rate_hz: f32, window_capacity: usize) -> Self {
        Self {
            sample_rate_hz,
            window_capacity,
        }
    }

    /// Transform the padded buffer in place and pick the strongest bin in the
    /// first half of the spectrum. Ties keep the lowest bin.
    pub fn analyze(&self, buffer: &mut [Complex<f64>]) -> FrequencyEstimate {
        if buffer.is_empty() {
            return FrequencyEstimate::default();
        }

        fft(buffer);

        let mut dominant_bin = 0;
        let mut dominant_magnitude = buffer[0].norm();
        for (i, bin) in buffer.iter().enumerate().take(buffer.len() / 2).skip(1) {
            let magnitude = bin.norm();
            if magnitude > dominant_magnitude {
                dominant_bin = i;
                dominant_magnitude = magnitude;
            }
        }

        let raw_frequency_hz = self.bin_to_hz(dominant_bin);

        FrequencyEstimate {
            dominant_bin,
            dominant_magnitude,
            raw_frequency_hz,
            // Empirical halving that maps bin spacing onto perceived step cadence
            frequency_hz: raw_frequency_hz / 2.0,
            dc_offset: buffer[0].re as f32,
        }
    }

    fn bin_to_hz(&self, bin: usize) -> f32 {
        let half_window = self.window_capacity as f32 / 2.0;
        (bin as f32 * self.sample_rate_hz / 2.0) / half_window
    }
}

/// Reverse the lowest `bits` bits of `n`.
pub fn bit_reverse(n: usize, bits: u32) -> usize {
    if bits == 0 {
        return 0;
    }
    n.reverse_bits() >> (usize::BITS - bits)
}

/// Iterative in-place radix-2 decimation-in-time Cooley-Tukey FFT.
///
/// The length must be a power of two. Output is in natural frequency order.
pub fn fft(buffer: &mut [Complex<f64>]) {
    transform(buffer, -1.0);
}

/// Inverse of [`fft`], including the 1/N scaling.
pub fn ifft(buffer: &mut [Complex<f64>]) {
    transform(buffer, 1.0);
    let scale = 1.0 / buffer.len() as f64;
    for value in buffer.iter_mut() {
        *value *= scale;
    }
}

fn transform(buffer: &mut [Complex<f64>], sign: f64) {
    let n = buffer.len();
    if n <= 1 {
        return;
    }
    assert!(n.is_power_of_two(), "FFT length {} is not a power of two", n);

    let bits = n.trailing_zeros();
    for j in 1..n {
        let r = bit_reverse(j, bits);
        if r > j {
            buffer.swap(j, r);
        }
    }

    let mut size = 2;
    while size <= n {
        let half = size / 2;
        for start in (0..n).step_by(size) {
            for k in 0..half {
                let angle = sign * 2.0 * PI * k as f64 / size as f64;
                let twiddle = Complex::new(angle.cos(), angle.sin());

                let even = buffer[start + k];
                let odd = twiddle * buffer[start + k + half];

                buffer[start + k] = even + odd;
                buffer[start + k + half] = even - odd;
            }
        }
        size <<= 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample_buffer::SampleBuffer;
    use approx::assert_abs_diff_eq;

    fn naive_dft(input: &[Complex<f64>]) -> Vec<Complex<f64>> {
        let n = input.len();
        (0..n)
            .map(|k| {
                input
                    .iter()
                    .enumerate()
                    .map(|(t, x)| {
                        let angle = -2.0 * PI * (k * t) as f64 / n as f64;
                        x * Complex::new(angle.cos(), angle.sin())
                    })
                    .sum()
            })
            .collect()
    }

    #[test]
    fn test_bit_reverse() {
        assert_eq!(bit_reverse(0b011, 3), 0b110);
        assert_eq!(bit_reverse(0b001, 3), 0b100);
        assert_eq!(bit_reverse(1, 7), 64);
        assert_eq!(bit_reverse(0b1011, 4), 0b1101);
        assert_eq!(bit_reverse(5, 0), 0);
    }

    #[test]
    fn test_fft_matches_naive_dft() {
        let input: Vec<Complex<f64>> = (0..16)
            .map(|i| Complex::new((i as f64 * 0.7).sin(), (i as f64 * 0.3).cos()))
            .collect();
        let expected = naive_dft(&input);

        let mut output = input.clone();
        fft(&mut output);

        for (a, b) in output.iter().zip(expected.iter()) {
            assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-9);
            assert_abs_diff_eq!(a.im, b.im, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_fft_inverse_round_trip() {
        let original: Vec<Complex<f64>> = (0..128)
            .map(|i| {
                let t = i as f64;
                Complex::new((t * 0.37).sin() * 3.0 - 0.5, (t * 1.1).cos() + t / 128.0)
            })
            .collect();

        let mut buffer = original.clone();
        fft(&mut buffer);
        ifft(&mut buffer);

        for (a, b) in buffer.iter().zip(original.iter()) {
            assert_abs_diff_eq!(a.re, b.re, epsilon = 1e-9);
            assert_abs_diff_eq!(a.im, b.im, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_pure_sinusoid_selects_exact_bin() {
        let analyzer = FrequencyAnalyzer::new(62.5, 64);
        let mut buffer: Vec<Complex<f64>> = (0..128)
            .map(|n| Complex::new((2.0 * PI * 5.0 * n as f64 / 128.0).cos(), 0.0))
            .collect();

        let estimate = analyzer.analyze(&mut buffer);
        assert_eq!(estimate.dominant_bin, 5);
        assert_abs_diff_eq!(estimate.dominant_magnitude, 64.0, epsilon = 1e-6);
    }

    #[test]
    fn test_bin_to_hz_follows_window_capacity() {
        // 32-sample window, 64-point transform, 10 ms ticks
        let analyzer = FrequencyAnalyzer::new(100.0, 32);
        let mut samples = SampleBuffer::new(32);
        for n in 0..32 {
            samples.push((2.0 * PI * 4.0 * n as f64 / 64.0).sin() as f32);
        }

        let mut buffer = samples.snapshot();
        assert_eq!(buffer.len(), 64);
        let estimate = analyzer.analyze(&mut buffer);
        assert_eq!(estimate.dominant_bin, 4);
        // 4 * 100 / 2 / 16 = 12.5 Hz raw
        assert_abs_diff_eq!(estimate.raw_frequency_hz, 12.5, epsilon = 1e-4);
        assert_abs_diff_eq!(estimate.frequency_hz, 6.25, epsilon = 1e-4);
    }

    #[test]
    fn test_windowed_sinusoid_through_sample_buffer() {
        let analyzer = FrequencyAnalyzer::new(62.5, 64);
        let mut samples = SampleBuffer::new(64);
        for n in 0..64 {
            samples.push((2.0 * PI * 8.0 * n as f64 / 128.0).sin() as f32);
        }

        let estimate = analyzer.analyze(&mut samples.snapshot());
        assert_eq!(estimate.dominant_bin, 8);
        // 8 * 62.5 / 2 / 32 = 7.8125 Hz raw, halved for cadence
        assert_abs_diff_eq!(estimate.raw_frequency_hz, 7.8125, epsilon = 1e-4);
        assert_abs_diff_eq!(estimate.frequency_hz, 3.90625, epsilon = 1e-4);
        assert_abs_diff_eq!(estimate.dc_offset, 0.0, epsilon = 1e-4);
    }

    #[test]
    fn test_silence_reports_bin_zero() {
        let analyzer = FrequencyAnalyzer::new(62.5, 64);
        let mut buffer = vec![Complex::new(0.0, 0.0); 128];
        let estimate = analyzer.analyze(&mut buffer);
        assert_eq!(estimate.dominant_bin, 0);
        assert_eq!(estimate.raw_frequency_hz, 0.0);
        assert_eq!(estimate.frequency_hz, 0.0);
    }

    #[test]
    fn test_dc_offset_is_sum_of_samples() {
        let analyzer = FrequencyAnalyzer::new(62.5, 64);
        let mut samples = SampleBuffer::new(64);
        for _ in 0..10 {
            samples.push(0.5);
        }
        let estimate = analyzer.analyze(&mut samples.snapshot());
        assert_abs_diff_eq!(estimate.dc_offset, 5.0, epsilon = 1e-5);
        assert_eq!(estimate.dominant_bin, 0);
    }
}
