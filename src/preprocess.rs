//! Preprocess module - signal conditioning and tabular cleaning

mod core;
#[cfg(feature = "python")]
mod ffi;
mod table;

pub use self::core::*;
#[cfg(feature = "python")]
pub use ffi::preprocess_py;
pub use table::{clean, normalize, segment, NormalizeMethod, SampleTable};
