//! End-to-end run: synthesize the echo, cancel it, measure convergence.

use tracing::debug;

use crate::config::PipelineConfig;
use crate::convergence::mean_squared_weight_error;
use crate::error::EchoResult;
use crate::nlms::{CoefficientTrajectory, NlmsDiagnostics, nlms};
use crate::synth::synthesize;

/// Every signal produced by [`run_pipeline`].
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// What the sender hears before cancellation.
    pub mixed: Vec<f64>,
    /// Echo predicted by the filter.
    pub estimate: Vec<f64>,
    /// Mixed signal with the predicted echo removed.
    pub residual: Vec<f64>,
    pub trajectory: Option<CoefficientTrajectory>,
    /// Mean squared weight error per trajectory entry, present with the trajectory.
    pub mswe: Option<Vec<f64>>,
    pub weights: Vec<f64>,
    pub diagnostics: NlmsDiagnostics,
}

impl PipelineOutput {
    /// The part of `mixed` that lines up with `estimate` and `residual`.
    pub fn aligned_mixed(&self) -> &[f64] {
        let offset = self.weights.len() - 1;
        &self.mixed[offset..offset + self.residual.len()]
    }
}

/// Runs synthesis and filtering on the sender and listener recordings.
///
/// The sender is aligned to the mixed signal before filtering. `estimate`
/// and `residual` hold one sample per full window of the aligned signals,
/// capped by `config.filter.iterations` when set.
pub fn run_pipeline(
    sender: &[f64],
    listener: &[f64],
    config: &PipelineConfig,
) -> EchoResult<PipelineOutput> {
    config.filter.validate()?;
    let mixed = synthesize(sender, listener, &config.synthesizer)?;

    let reference = &sender[..sender.len().min(mixed.len())];
    let filtered = nlms(reference, &mixed, &config.filter)?;

    let mswe = filtered
        .trajectory
        .as_ref()
        .map(|t| mean_squared_weight_error(t, &config.synthesizer.impulse_response));
    debug!(
        mixed = mixed.len(),
        residual = filtered.residual.len(),
        "pipeline finished"
    );

    Ok(PipelineOutput {
        mixed,
        estimate: filtered.estimate,
        residual: filtered.residual,
        trajectory: filtered.trajectory,
        mswe,
        weights: filtered.weights,
        diagnostics: filtered.diagnostics,
    })
}
