//! NLMS-based acoustic echo cancellation on recorded speech.
//!
//! The crate is split into the stages of the demo pipeline:
//!
//! - [`synth`] convolves the sender with a room response and mixes the echo
//!   into the listener's voice.
//! - [`nlms`] learns the echo path from the sender and the mixed signal and
//!   subtracts the predicted echo.
//! - [`convergence`] compares the learned weights with the true response.
//!
//! ```
//! use echo_nlms::{run_pipeline, NlmsConfig, PipelineConfig};
//!
//! let sender: Vec<f64> = (0..2000).map(|i| (i as f64 * 0.05).sin() * 8000.0).collect();
//! let listener = vec![0.0; 1500];
//! let config = PipelineConfig {
//!     filter: NlmsConfig::default().with_trajectory(),
//!     ..PipelineConfig::default()
//! };
//!
//! let output = run_pipeline(&sender, &listener, &config)?;
//! assert_eq!(output.mixed.len(), 1500);
//! assert_eq!(output.residual.len(), 1451);
//! # Ok::<(), echo_nlms::EchoError>(())
//! ```
//!
//! Everything runs in one batch on in-memory `f64` samples; file I/O and
//! playback belong to the caller. Use [`pcm`] to cross the 16-bit boundary.

pub mod config;
pub mod convergence;
pub mod error;
pub mod nlms;
pub mod pcm;
pub mod pipeline;
pub mod synth;

pub use config::{
    NlmsConfig, PipelineConfig, SynthesizerConfig, UnderrunPolicy, demo_impulse_response,
};
pub use convergence::{erle_db, mean_square, mean_squared_weight_error};
pub use error::{EchoError, EchoResult};
pub use nlms::{CoefficientTrajectory, NlmsCanceller, NlmsDiagnostics, NlmsOutput, nlms};
pub use pcm::{from_pcm_i16, to_pcm_i16};
pub use pipeline::{PipelineOutput, run_pipeline};
pub use synth::{convolve, mix_sample, synthesize};
