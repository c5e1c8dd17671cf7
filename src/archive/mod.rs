//! # Result archive
//!
//! Named result bundles collected during a run and persisted to a single
//! `.npz` file.

pub mod bundle;
pub mod npz;

pub use bundle::{ArchiveValue, ResultBundle, KEY_SEPARATOR};
pub use npz::{load, read_bundle, save, try_load, write_bundle};
