//! Conversions at the 16-bit storage boundary.

pub fn from_pcm_i16(samples: &[i16]) -> Vec<f64> {
    samples.iter().map(|&s| f64::from(s)).collect()
}

/// Rounds (ties to even) and saturates to the `i16` range.
pub fn to_pcm_i16(signal: &[f64]) -> Vec<i16> {
    let limit_min = f64::from(i16::MIN);
    let limit_max = f64::from(i16::MAX);
    signal
        .iter()
        .map(|s| s.round_ties_even().clamp(limit_min, limit_max) as i16)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pcm() {
        assert_eq!(from_pcm_i16(&[-32768, 0, 32767]), vec![-32768.0, 0.0, 32767.0]);
    }

    #[test]
    fn test_to_pcm_rounds_and_saturates() {
        let pcm = to_pcm_i16(&[1.5, 2.5, -0.4, 40000.0, -40000.0, f64::NAN]);
        assert_eq!(pcm, vec![2, 2, 0, i16::MAX, i16::MIN, 0]);
    }
}
