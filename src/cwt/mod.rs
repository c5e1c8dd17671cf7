//! # CWT (Continuous Wavelet Transform) Module
//!
//! FFT-based continuous wavelet transform over a geometric scale set, with
//! Morlet, Paul, and DOG mother wavelets.

pub mod wavelets;
pub mod utils;
pub mod core;
#[cfg(feature = "python")]
pub mod ffi;

// Re-export main functions
pub use self::core::{cone_of_influence, cwt, cwt_with_plans, CwtOutput, CwtParams, MIN_SIGNAL_LEN};
pub use self::wavelets::Mother;
#[cfg(feature = "python")]
pub use ffi::cwt_py;
