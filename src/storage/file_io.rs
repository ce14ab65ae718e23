//! File I/O utilities with atomic writes
//!
//! Store files are whole-file JSON envelopes. Writes go to a temp file in the
//! same directory and are renamed over the target, so a crash mid-write leaves
//! the previous version intact.

use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::Path;

use serde::Serialize;

use crate::crypto::Envelope;
use crate::error::{VaultError, VaultResult};

/// Read an envelope file; `Ok(None)` means the file does not exist
///
/// A file that exists but is not a well-formed envelope is a `CorruptStore`
/// error, never `None`.
pub fn read_sealed<P: AsRef<Path>>(path: P) -> VaultResult<Option<Envelope>> {
    let path = path.as_ref();

    let contents = match fs::read(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(VaultError::Io(format!(
                "Failed to read {}: {}",
                path.display(),
                e
            )))
        }
    };

    serde_json::from_slice(&contents).map(Some).map_err(|e| {
        VaultError::CorruptStore(format!("{} is not a valid envelope: {}", path.display(), e))
    })
}

/// Write an envelope file atomically
pub fn write_sealed_atomic<P: AsRef<Path>>(path: P, envelope: &Envelope) -> VaultResult<()> {
    write_json_atomic(path, envelope)
}

/// Write JSON to a file atomically (write to temp, then rename)
pub fn write_json_atomic<T, P>(path: P, data: &T) -> VaultResult<()>
where
    T: Serialize,
    P: AsRef<Path>,
{
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            VaultError::Io(format!(
                "Failed to create directory {}: {}",
                parent.display(),
                e
            ))
        })?;
    }

    // Temp file in the same directory, so the rename stays on one filesystem
    let temp_path = path.with_extension("json.tmp");

    let result = write_and_sync(&temp_path, data).and_then(|()| {
        fs::rename(&temp_path, path)
            .map_err(|e| VaultError::Io(format!("Failed to rename temp file: {}", e)))
    });

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }

    result
}

fn write_and_sync<T: Serialize>(temp_path: &Path, data: &T) -> VaultResult<()> {
    let file = File::create(temp_path)
        .map_err(|e| VaultError::Io(format!("Failed to create temp file: {}", e)))?;

    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, data)
        .map_err(|e| VaultError::Json(format!("Failed to serialize data: {}", e)))?;

    writer
        .flush()
        .map_err(|e| VaultError::Io(format!("Failed to flush data: {}", e)))?;

    writer
        .get_ref()
        .sync_all()
        .map_err(|e| VaultError::Io(format!("Failed to sync data: {}", e)))?;

    Ok(())
}
