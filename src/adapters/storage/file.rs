use super::PersistedState;
use crate::error::StorageError;
use std::io::ErrorKind;
use std::path::Path;

pub(crate) fn load(path: &Path) -> Result<PersistedState, StorageError> {
    match std::fs::read(path) {
        Ok(bytes) if bytes.is_empty() => Ok(PersistedState::default()),
        Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(PersistedState::default()),
        Err(e) => Err(e.into()),
    }
}

/// Writes to a sibling temp file first so a crash never leaves a half-written store.
pub(crate) fn save(path: &Path, state: &PersistedState) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec_pretty(state)?;
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}
