//! Tunable parameters for the synthesizer and the adaptive filter.
//!
//! The defaults reproduce the reference demo: a 50 tap filter adapting with
//! a step of 0.05 against a sparse 57 tap room response, with both voices
//! attenuated by 1/20 before mixing.

use crate::error::{EchoError, EchoResult};

/// Number of adaptive filter taps.
pub const DEFAULT_TAPS: usize = 50;
/// NLMS adaptation step size.
pub const DEFAULT_STEP: f64 = 0.05;
/// Regularization added to the window energy before normalizing.
pub const DEFAULT_EPSILON: f64 = 1e-3;
/// Gain applied to both the echo and the listener before mixing.
pub const DEFAULT_ATTENUATION: f64 = 1.0 / 20.0;
/// Divisor of the cross term in the mixing law.
pub const DEFAULT_MIX_CONSTANT: f64 = 256.0;
/// Consecutive near-silent windows tolerated before a warning is logged.
pub const DEFAULT_DEGENERATE_RUN_WARNING: usize = 4096;

/// Room response used by the demo: six reflections spread over 57 taps.
pub fn demo_impulse_response() -> Vec<f64> {
    let mut response = vec![0.0; 57];
    for (tap, weight) in [(0, 0.8), (9, -0.7), (19, 0.5), (31, -0.3), (35, 0.1), (56, -0.05)] {
        response[tap] = weight;
    }
    response
}

/// What the synthesizer does when the echo ends before the listener does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnderrunPolicy {
    /// Reject the inputs with [`EchoError::InsufficientData`].
    #[default]
    Fail,
    /// Treat the missing echo samples as silence.
    ZeroPad,
}

/// Configuration of the echo synthesizer.
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizerConfig {
    /// Echo path convolved with the sender's signal.
    pub impulse_response: Vec<f64>,
    /// Gain applied to both echo and listener.
    pub attenuation: f64,
    /// Divisor of the `echo * listener` term in the mixing law.
    pub mix_constant: f64,
    pub underrun: UnderrunPolicy,
}

impl Default for SynthesizerConfig {
    fn default() -> Self {
        Self {
            impulse_response: demo_impulse_response(),
            attenuation: DEFAULT_ATTENUATION,
            mix_constant: DEFAULT_MIX_CONSTANT,
            underrun: UnderrunPolicy::Fail,
        }
    }
}

impl SynthesizerConfig {
    /// Uses `impulse_response` with the demo gains.
    pub fn with_impulse_response(impulse_response: Vec<f64>) -> Self {
        Self {
            impulse_response,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> EchoResult<()> {
        if self.impulse_response.is_empty() {
            return Err(EchoError::invalid("impulse response must have at least one tap"));
        }
        if self.impulse_response.iter().any(|w| !w.is_finite()) {
            return Err(EchoError::invalid("impulse response must be finite"));
        }
        if !self.attenuation.is_finite() {
            return Err(EchoError::invalid("attenuation must be finite"));
        }
        if !self.mix_constant.is_finite() || self.mix_constant == 0.0 {
            return Err(EchoError::invalid("mix constant must be finite and non-zero"));
        }
        Ok(())
    }
}

/// Configuration of the NLMS filter.
#[derive(Debug, Clone, PartialEq)]
pub struct NlmsConfig {
    /// Number of taps `M`.
    pub taps: usize,
    /// Step size, stable in (0, 2).
    pub step: f64,
    /// Regularization guarding the normalization against silent windows.
    pub epsilon: f64,
    /// Leakage factor in [0, 1), with `step * leak <= 1` so the weights only
    /// shrink. Zero gives plain NLMS.
    pub leak: f64,
    /// Starting coefficients. All zeros when `None`.
    pub initial_weights: Option<Vec<f64>>,
    /// Process only the first `n` windows when set.
    pub iterations: Option<usize>,
    /// Keep a copy of the weights after every update.
    pub capture_trajectory: bool,
    /// Longest tolerated run of near-silent windows before warning.
    pub degenerate_run_warning: usize,
}

impl Default for NlmsConfig {
    fn default() -> Self {
        Self {
            taps: DEFAULT_TAPS,
            step: DEFAULT_STEP,
            epsilon: DEFAULT_EPSILON,
            leak: 0.0,
            initial_weights: None,
            iterations: None,
            capture_trajectory: false,
            degenerate_run_warning: DEFAULT_DEGENERATE_RUN_WARNING,
        }
    }
}

impl NlmsConfig {
    pub fn new(taps: usize, step: f64) -> Self {
        Self {
            taps,
            step,
            ..Self::default()
        }
    }

    pub fn with_trajectory(mut self) -> Self {
        self.capture_trajectory = true;
        self
    }

    pub fn validate(&self) -> EchoResult<()> {
        if self.taps == 0 {
            return Err(EchoError::invalid("tap count must be at least 1"));
        }
        if !(self.step > 0.0 && self.step < 2.0) {
            return Err(EchoError::invalid(format!(
                "step must lie in (0, 2), got {}",
                self.step
            )));
        }
        if !(self.epsilon > 0.0 && self.epsilon.is_finite()) {
            return Err(EchoError::invalid(format!(
                "epsilon must be positive and finite, got {}",
                self.epsilon
            )));
        }
        if !(self.leak >= 0.0 && self.leak < 1.0) {
            return Err(EchoError::invalid(format!(
                "leak must lie in [0, 1), got {}",
                self.leak
            )));
        }
        if self.step * self.leak > 1.0 {
            return Err(EchoError::invalid(format!(
                "step * leak must not exceed 1, got {}",
                self.step * self.leak
            )));
        }
        if let Some(weights) = &self.initial_weights {
            if weights.len() != self.taps {
                return Err(EchoError::invalid(format!(
                    "expected {} initial weights, got {}",
                    self.taps,
                    weights.len()
                )));
            }
            if weights.iter().any(|w| !w.is_finite()) {
                return Err(EchoError::invalid("initial weights must be finite"));
            }
        }
        if self.iterations == Some(0) {
            return Err(EchoError::invalid("iteration count must be at least 1"));
        }
        Ok(())
    }
}

/// Configuration of a full synthesize, filter and analyze run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PipelineConfig {
    pub synthesizer: SynthesizerConfig,
    pub filter: NlmsConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_impulse_response() {
        let response = demo_impulse_response();
        assert_eq!(response.len(), 57);
        assert_eq!(response.iter().filter(|w| **w != 0.0).count(), 6);
        assert_eq!(response[0], 0.8);
        assert_eq!(response[56], -0.05);
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(NlmsConfig::default().validate().is_ok());
        assert!(SynthesizerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_taps() {
        let config = NlmsConfig::new(0, 0.05);
        assert!(matches!(
            config.validate(),
            Err(EchoError::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn test_rejects_unstable_step() {
        for step in [0.0, -0.1, 2.0, 3.5, f64::NAN] {
            let config = NlmsConfig::new(8, step);
            assert!(config.validate().is_err(), "step {step} accepted");
        }
        assert!(NlmsConfig::new(8, 1.99).validate().is_ok());
    }

    #[test]
    fn test_rejects_mismatched_initial_weights() {
        let config = NlmsConfig {
            initial_weights: Some(vec![0.0; 3]),
            ..NlmsConfig::new(4, 0.1)
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_leak_and_epsilon() {
        let leaky = NlmsConfig {
            leak: 1.0,
            ..NlmsConfig::default()
        };
        assert!(leaky.validate().is_err());

        let unregularized = NlmsConfig {
            epsilon: 0.0,
            ..NlmsConfig::default()
        };
        assert!(unregularized.validate().is_err());
    }

    #[test]
    fn test_rejects_negative_retention() {
        let config = NlmsConfig {
            leak: 0.9,
            ..NlmsConfig::new(1, 1.9)
        };
        assert!(matches!(
            config.validate(),
            Err(EchoError::InvalidConfiguration(_))
        ));

        let boundary = NlmsConfig {
            leak: 0.5,
            ..NlmsConfig::new(1, 1.0)
        };
        assert!(boundary.validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_impulse_response() {
        let config = SynthesizerConfig::with_impulse_response(Vec::new());
        assert!(config.validate().is_err());
    }
}
