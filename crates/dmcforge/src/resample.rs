//! Nearest-neighbour resampling for repitching recorded samples.
//!
//! No interpolation and no anti-aliasing. The aliasing this introduces sits
//! well under the DMC's own quantization noise.

use thiserror::Error;

/// Error type for resampling.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ResampleError {
    /// Speed must be a positive, finite factor.
    #[error("Invalid resample speed: {0}")]
    InvalidSpeed(f64),
}

/// Resample by picking `source[floor(i * speed)]` for each output slot.
///
/// Speeds above 1 shorten the buffer (raise pitch), below 1 stretch it.
pub fn resample_nearest(source: &[f64], speed: f64) -> Result<Vec<f64>, ResampleError> {
    if !(speed.is_finite() && speed > 0.0) {
        return Err(ResampleError::InvalidSpeed(speed));
    }

    let new_length = (source.len() as f64 / speed) as usize;
    Ok((0..new_length)
        .map(|i| source[((i as f64 * speed) as usize).min(source.len() - 1)])
        .collect())
}

/// Combined speed that converts `source_rate` → `target_rate` and shifts
/// `source_freq` → `target_freq` in one pass.
pub fn repitch_speed(source_rate: f64, target_rate: f64, source_freq: f64, target_freq: f64) -> f64 {
    let conversion_speed = source_rate / target_rate;
    let repitch = target_freq / source_freq;
    conversion_speed * repitch
}

/// Resample a recording of `source_freq` at `source_rate` so it plays
/// `target_freq` at `target_rate`.
pub fn resample_note(
    source: &[f64],
    source_rate: f64,
    target_rate: f64,
    source_freq: f64,
    target_freq: f64,
) -> Result<Vec<f64>, ResampleError> {
    resample_nearest(
        source,
        repitch_speed(source_rate, target_rate, source_freq, target_freq),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimate_by_two() {
        let source: Vec<f64> = (0..10).map(|i| i as f64).collect();
        let out = resample_nearest(&source, 2.0).unwrap();
        assert_eq!(out, vec![0.0, 2.0, 4.0, 6.0, 8.0]);
    }

    #[test]
    fn test_stretch_by_half() {
        let out = resample_nearest(&[1.0, 2.0, 3.0], 0.5).unwrap();
        assert_eq!(out, vec![1.0, 1.0, 2.0, 2.0, 3.0, 3.0]);
    }

    #[test]
    fn test_empty_source() {
        assert!(resample_nearest(&[], 1.5).unwrap().is_empty());
    }

    #[test]
    fn test_invalid_speed() {
        assert!(resample_nearest(&[1.0], 0.0).is_err());
        assert!(resample_nearest(&[1.0], -2.0).is_err());
        assert!(resample_nearest(&[1.0], f64::NAN).is_err());
    }

    #[test]
    fn test_repitch_speed_combines_ratios() {
        // an octave up while halving the sample rate cancels out
        let speed = repitch_speed(22050.0, 44100.0, 220.0, 440.0);
        assert!((speed - 1.0).abs() < 1e-12);

        let source: Vec<f64> = (0..100).map(|i| i as f64).collect();
        let out = resample_note(&source, 44100.0, 44100.0, 261.63, 523.26).unwrap();
        assert_eq!(out.len(), 50);
        assert_eq!(out[1], 2.0);
    }
}
