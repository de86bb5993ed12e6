use std::path::{Path, PathBuf};

use super::{RegisteredCredential, StoreError};

fn record_path(dir: &Path, credential_id: &[u8]) -> PathBuf {
    dir.join(format!("{}.bin", hex::encode(credential_id)))
}

/// Serialize + write registration to `dir/{credential_id_hex}.bin`.
pub(crate) fn write_registration(dir: &Path, record: &RegisteredCredential) -> Result<(), StoreError> {
    let mut buf = Vec::new();
    ciborium::into_writer(record, &mut buf)
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    std::fs::write(record_path(dir, &record.credential_id), buf)?;
    Ok(())
}

/// Read + deserialize registration from `path`.
pub(crate) fn read_registration(path: &Path) -> Result<RegisteredCredential, StoreError> {
    let bytes = std::fs::read(path)?;
    let record: RegisteredCredential = ciborium::from_reader(bytes.as_slice())
        .map_err(|e| StoreError::Serialization(e.to_string()))?;
    if record.credential_id.is_empty() {
        return Err(StoreError::Corrupt("empty credential_id".into()));
    }
    Ok(record)
}

/// Delete registration file for `credential_id`.
pub(crate) fn delete_registration(dir: &Path, credential_id: &[u8]) -> Result<(), StoreError> {
    std::fs::remove_file(record_path(dir, credential_id))?;
    Ok(())
}

/// Load all valid registration files from `dir`. Logs and skips corrupt files.
pub(crate) fn load_all(dir: &Path) -> Result<Vec<RegisteredCredential>, StoreError> {
    let mut records = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("bin") {
            continue;
        }
        match read_registration(&path) {
            Ok(record) => records.push(record),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Skipping corrupt registration file");
            }
        }
    }
    Ok(records)
}
