//! Convergence diagnostics.

use crate::nlms::CoefficientTrajectory;

/// Mean squared weight error of every snapshot in `trajectory` against
/// `true_response`.
///
/// The true response is truncated or zero-padded to the trajectory's tap
/// count, so a filter shorter than the echo path is measured on the taps
/// it can represent.
pub fn mean_squared_weight_error(
    trajectory: &CoefficientTrajectory,
    true_response: &[f64],
) -> Vec<f64> {
    let taps = trajectory.taps();
    let mut reference = true_response[..true_response.len().min(taps)].to_vec();
    reference.resize(taps, 0.0);

    trajectory
        .iter()
        .map(|weights| {
            weights
                .iter()
                .zip(&reference)
                .map(|(w, c)| (w - c) * (w - c))
                .sum::<f64>()
                / taps as f64
        })
        .collect()
}

/// Mean of the squared samples; zero for an empty signal.
pub fn mean_square(signal: &[f64]) -> f64 {
    if signal.is_empty() {
        return 0.0;
    }
    signal.iter().map(|x| x * x).sum::<f64>() / signal.len() as f64
}

/// Echo return loss enhancement in dB: energy removed from `mixed` by the
/// filter. Infinite when the residual is silent.
pub fn erle_db(mixed: &[f64], residual: &[f64]) -> f64 {
    let residual_power = mean_square(residual);
    if residual_power == 0.0 {
        return f64::INFINITY;
    }
    10.0 * (mean_square(mixed) / residual_power).log10()
}
