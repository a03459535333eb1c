//! Output validation.
//!
//! Confirms that the encoded output is actually silent where it should be.

pub mod silence;

pub use silence::{SilenceVerifier, VerificationResult, parse_rms_level};
