//! Normalized least mean squares echo canceller.
//!
//! For every sample `n` with a full window of `M` past reference samples:
//!
//! ```text
//! y[n] = w · x_n
//! e[n] = d[n] - y[n]
//! w    = (1 - mu * leak) * w + mu / (eps + x_n · x_n) * e[n] * x_n
//! ```
//!
//! where `x_n = [x[n], x[n-1], ..., x[n-M+1]]`. Each update depends on the
//! previous weights, so the loop is strictly sequential.

use std::slice::ChunksExact;

use tracing::{debug, warn};

use crate::config::NlmsConfig;
use crate::error::{EchoError, EchoResult};

/// Adaptive filter state: the current weights plus the update constants.
#[derive(Debug, Clone)]
pub struct NlmsCanceller {
    weights: Vec<f64>,
    step: f64,
    epsilon: f64,
    retention: f64,
}

/// Result of a single filter update.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UpdateStep {
    /// Prediction made with the weights before the update.
    pub estimate: f64,
    pub error: f64,
    /// Energy of the input window, before regularization.
    pub energy: f64,
}

impl NlmsCanceller {
    /// Creates a canceller with `config.taps` weights, zeroed unless
    /// `config.initial_weights` is set.
    pub fn new(config: &NlmsConfig) -> EchoResult<Self> {
        config.validate()?;
        let weights = config
            .initial_weights
            .clone()
            .unwrap_or_else(|| vec![0.0; config.taps]);
        Ok(Self {
            weights,
            step: config.step,
            epsilon: config.epsilon,
            retention: 1.0 - config.step * config.leak,
        })
    }

    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    pub fn taps(&self) -> usize {
        self.weights.len()
    }

    /// Runs one prediction and weight update.
    ///
    /// `window` holds exactly [`taps`](Self::taps) reference samples in
    /// chronological order, so its last element is the newest sample.
    pub fn update(&mut self, window: &[f64], desired: f64) -> UpdateStep {
        assert_eq!(
            window.len(),
            self.weights.len(),
            "window length must match tap count"
        );

        let estimate = self.estimate_echo(window);
        let error = desired - estimate;
        let energy = window.iter().map(|x| x * x).sum::<f64>();
        self.update_taps(window, error, energy);

        UpdateStep {
            estimate,
            error,
            energy,
        }
    }

    fn estimate_echo(&self, window: &[f64]) -> f64 {
        self.weights
            .iter()
            .zip(window.iter().rev())
            .map(|(w, x)| w * x)
            .sum()
    }

    fn update_taps(&mut self, window: &[f64], error: f64, energy: f64) {
        let scale = self.step * error / (self.epsilon + energy);
        let retention = self.retention;
        for (weight, x) in self.weights.iter_mut().zip(window.iter().rev()) {
            *weight = retention * *weight + scale * x;
        }
    }
}

/// Weight vectors recorded after each update, stored row by row.
#[derive(Debug, Clone, PartialEq)]
pub struct CoefficientTrajectory {
    taps: usize,
    coeffs: Vec<f64>,
}

impl CoefficientTrajectory {
    pub fn with_capacity(taps: usize, snapshots: usize) -> Self {
        assert!(taps > 0, "taps must be positive");
        Self {
            taps,
            coeffs: Vec::with_capacity(taps * snapshots),
        }
    }

    pub fn push(&mut self, weights: &[f64]) {
        assert_eq!(weights.len(), self.taps, "snapshot length must match tap count");
        self.coeffs.extend_from_slice(weights);
    }

    /// Number of snapshots.
    pub fn len(&self) -> usize {
        self.coeffs.len() / self.taps
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    pub fn taps(&self) -> usize {
        self.taps
    }

    pub fn get(&self, index: usize) -> Option<&[f64]> {
        let start = index.checked_mul(self.taps)?;
        let end = start.checked_add(self.taps)?;
        self.coeffs.get(start..end)
    }

    pub fn last(&self) -> Option<&[f64]> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    pub fn iter(&self) -> ChunksExact<'_, f64> {
        self.coeffs.chunks_exact(self.taps)
    }
}

/// Counters for windows whose energy was too small to drive an update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NlmsDiagnostics {
    /// Windows whose energy did not exceed the regularization constant.
    pub degenerate_windows: usize,
    pub longest_degenerate_run: usize,
}

impl NlmsDiagnostics {
    pub fn is_degenerate(&self) -> bool {
        self.degenerate_windows > 0
    }
}

/// Output of a batch NLMS run.
#[derive(Debug, Clone)]
pub struct NlmsOutput {
    /// Predicted echo, one sample per processed window.
    pub estimate: Vec<f64>,
    /// `desired - estimate`, aligned with `estimate`.
    pub residual: Vec<f64>,
    /// Present when `capture_trajectory` was requested.
    pub trajectory: Option<CoefficientTrajectory>,
    pub weights: Vec<f64>,
    pub diagnostics: NlmsDiagnostics,
}

/// Filters `desired` using `reference` as the input of the unknown system.
///
/// Both signals are aligned to the shorter of the two. The outputs hold one
/// sample per full window, i.e. `len - (taps - 1)` samples, or
/// `config.iterations` if that is set.
pub fn nlms(reference: &[f64], desired: &[f64], config: &NlmsConfig) -> EchoResult<NlmsOutput> {
    let mut canceller = NlmsCanceller::new(config)?;
    let taps = config.taps;
    let len = reference.len().min(desired.len());
    if len < taps {
        return Err(EchoError::insufficient("nlms", taps, len));
    }

    let windows = len - taps + 1;
    let count = match config.iterations {
        Some(n) if n > windows => {
            return Err(EchoError::invalid(format!(
                "{n} iterations requested but only {windows} windows are available"
            )));
        }
        Some(n) => n,
        None => windows,
    };

    let mut estimate = Vec::with_capacity(count);
    let mut residual = Vec::with_capacity(count);
    let mut trajectory = config
        .capture_trajectory
        .then(|| CoefficientTrajectory::with_capacity(taps, count));
    let mut diagnostics = NlmsDiagnostics::default();
    let mut run = 0usize;

    for (window, &d) in reference[..len]
        .windows(taps)
        .zip(&desired[taps - 1..len])
        .take(count)
    {
        let step = canceller.update(window, d);
        estimate.push(step.estimate);
        residual.push(step.error);
        if let Some(trajectory) = trajectory.as_mut() {
            trajectory.push(canceller.weights());
        }

        if step.energy <= config.epsilon {
            diagnostics.degenerate_windows += 1;
            run += 1;
            diagnostics.longest_degenerate_run = diagnostics.longest_degenerate_run.max(run);
            if run == config.degenerate_run_warning {
                warn!(
                    sample = estimate.len() - 1 + taps - 1,
                    run, "reference is near silent, weight updates have stalled"
                );
            }
        } else {
            run = 0;
        }
    }

    debug!(
        taps,
        step = config.step,
        windows = count,
        degenerate = diagnostics.degenerate_windows,
        "nlms finished"
    );

    Ok(NlmsOutput {
        estimate,
        residual,
        trajectory,
        weights: canceller.weights,
        diagnostics,
    })
}
