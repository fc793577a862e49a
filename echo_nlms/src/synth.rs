//! Synthetic echo generation.
//!
//! The sender's voice is convolved with a room response, attenuated and mixed
//! with the attenuated listener using a soft saturating law:
//!
//! ```text
//! mixed[i] = round(echo[i] + listener[i] - echo[i] * listener[i] / C)
//! ```

use tracing::debug;

use crate::config::{SynthesizerConfig, UnderrunPolicy};
use crate::error::{EchoError, EchoResult};

/// Full linear convolution. The result has `signal.len() + kernel.len() - 1`
/// samples, or none if either input is empty.
pub fn convolve(signal: &[f64], kernel: &[f64]) -> Vec<f64> {
    if signal.is_empty() || kernel.is_empty() {
        return Vec::new();
    }

    let mut out = vec![0.0; signal.len() + kernel.len() - 1];
    for (tap, &weight) in kernel.iter().enumerate() {
        if weight == 0.0 {
            continue;
        }
        for (acc, &sample) in out[tap..].iter_mut().zip(signal) {
            *acc += weight * sample;
        }
    }
    out
}

/// Mixing law for one pair of already attenuated samples, before rounding.
#[inline]
pub fn mix_sample(echo: f64, listener: f64, mix_constant: f64) -> f64 {
    echo + listener - (echo * listener) / mix_constant
}

/// Builds the signal the sender hears: their own echo mixed with the listener.
///
/// The output has exactly `listener.len()` samples, each rounded to an
/// integer value (ties to even). Fails when the inputs or configuration
/// are unusable, or when the echo does not cover the listener and
/// [`UnderrunPolicy::Fail`] is selected.
pub fn synthesize(
    sender: &[f64],
    listener: &[f64],
    config: &SynthesizerConfig,
) -> EchoResult<Vec<f64>> {
    config.validate()?;
    if sender.is_empty() {
        return Err(EchoError::insufficient("echo convolution", 1, 0));
    }

    let mut echo = convolve(sender, &config.impulse_response);
    if echo.len() < listener.len() {
        match config.underrun {
            UnderrunPolicy::Fail => {
                return Err(EchoError::insufficient(
                    "echo synthesis",
                    listener.len(),
                    echo.len(),
                ));
            }
            UnderrunPolicy::ZeroPad => {
                debug!(
                    echo = echo.len(),
                    listener = listener.len(),
                    "zero-padding echo to listener length"
                );
                echo.resize(listener.len(), 0.0);
            }
        }
    }
    echo.truncate(listener.len());

    let gain = config.attenuation;
    let mixed: Vec<f64> = echo
        .iter()
        .zip(listener)
        .map(|(&e, &v)| mix_sample(e * gain, v * gain, config.mix_constant).round_ties_even())
        .collect();

    debug!(
        sender = sender.len(),
        listener = listener.len(),
        taps = config.impulse_response.len(),
        "synthesized echo"
    );
    Ok(mixed)
}
