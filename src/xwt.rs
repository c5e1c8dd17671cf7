//! XWT module - cross wavelet transform of two equal-length signals

mod core;
#[cfg(feature = "python")]
mod ffi;

pub use self::core::*;
#[cfg(feature = "python")]
pub use ffi::xwt_py;
