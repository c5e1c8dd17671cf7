//! `.npz` persistence for result bundles
//!
//! One archive entry per flattened key. Numeric entries keep their dtype and
//! shape (0-d arrays for scalars); text is stored as a 1-D `uint8` array of
//! UTF-8 bytes, so raw `u8` arrays are not a supported value kind.

use ndarray::{Array1, Ix1, IxDyn, OwnedRepr};
use ndarray_npy::{NpzReader, NpzWriter};
use std::fs::File;
use std::io::{Read, Seek, Write};
use std::path::Path;
use tracing::{debug, info, warn};

use super::bundle::{ArchiveValue, ResultBundle};
use crate::error::{AnalysisError, Result};

fn archive_err(e: impl std::fmt::Display) -> AnalysisError {
    AnalysisError::Archive(e.to_string())
}

/// Write a (flattened) bundle to any seekable writer
pub fn write_bundle<W: Write + Seek>(bundle: &ResultBundle, writer: W) -> Result<W> {
    let flat = bundle.flatten();
    let mut npz = NpzWriter::new(writer);

    for (key, value) in flat.iter() {
        if key.is_empty() {
            return Err(AnalysisError::Archive("empty key".to_string()));
        }
        let written = match value {
            ArchiveValue::Float(a) => npz.add_array(key, a),
            ArchiveValue::Int(a) => npz.add_array(key, a),
            ArchiveValue::Bool(a) => npz.add_array(key, a),
            ArchiveValue::Text(s) => {
                let bytes: Array1<u8> = Array1::from_vec(s.as_bytes().to_vec());
                npz.add_array(key, &bytes)
            }
            ArchiveValue::Group(_) => {
                return Err(AnalysisError::Archive(format!("unflattened group '{}'", key)))
            }
        };
        written.map_err(archive_err)?;
        debug!(key, "archived entry");
    }

    npz.finish().map_err(archive_err)
}

/// Read every entry of an archive, trying each supported dtype in turn
pub fn read_bundle<R: Read + Seek>(reader: R) -> Result<ResultBundle> {
    let mut npz = NpzReader::new(reader).map_err(archive_err)?;
    let names = npz.names().map_err(archive_err)?;

    let mut bundle = ResultBundle::new();
    for name in names {
        let key = name.strip_suffix(".npy").unwrap_or(&name).to_string();
        let value = read_entry(&mut npz, &name)?;
        bundle.insert(key, value);
    }
    Ok(bundle)
}

fn read_entry<R: Read + Seek>(npz: &mut NpzReader<R>, name: &str) -> Result<ArchiveValue> {
    if let Ok(a) = npz.by_name::<OwnedRepr<f64>, IxDyn>(name) {
        return Ok(ArchiveValue::Float(a));
    }
    if let Ok(a) = npz.by_name::<OwnedRepr<i64>, IxDyn>(name) {
        return Ok(ArchiveValue::Int(a));
    }
    if let Ok(a) = npz.by_name::<OwnedRepr<bool>, IxDyn>(name) {
        return Ok(ArchiveValue::Bool(a));
    }
    let bytes: Array1<u8> = npz
        .by_name::<OwnedRepr<u8>, Ix1>(name)
        .map_err(|e| AnalysisError::Archive(format!("entry '{}': {}", name, e)))?;
    let text = String::from_utf8(bytes.to_vec())
        .map_err(|e| AnalysisError::Archive(format!("entry '{}': {}", name, e)))?;
    Ok(ArchiveValue::Text(text))
}

/// Save a bundle to `destination`
///
/// Nested groups are flattened to `"<group>.<field>"` keys.
pub fn save(bundle: &ResultBundle, destination: impl AsRef<Path>) -> Result<()> {
    let path = destination.as_ref();
    let file = File::create(path)?;
    write_bundle(bundle, file)?;
    info!(path = %path.display(), entries = bundle.flatten().len(), "results saved");
    Ok(())
}

/// Load a bundle, surfacing the failure reason
pub fn try_load(source: impl AsRef<Path>) -> Result<ResultBundle> {
    let file = File::open(source.as_ref())?;
    read_bundle(file)
}

/// Load a bundle from `source`
///
/// Returns `None` when the file is missing or unreadable; the bundle comes
/// back flat (see [`ResultBundle::nest`]).
pub fn load(source: impl AsRef<Path>) -> Option<ResultBundle> {
    let path = source.as_ref();
    match try_load(path) {
        Ok(bundle) => Some(bundle),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to load results");
            None
        }
    }
}
