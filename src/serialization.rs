//! Persistence of fitted transformer parameters.
//!
//! Fitted scalers and encoders expose their learned state as a plain-data
//! params struct. Anything that is `Serialize + Deserialize` gets a compact
//! bincode encoding through the blanket impl below, and [`write_params`] /
//! [`read_params`] move that encoding to and from disk. [`params_to_json`]
//! renders the same state for inspection.

use std::error::Error;
use std::fs;
use std::path::Path;

use serde::{de::DeserializeOwned, Serialize};

use crate::error::WrangleError;

/// Byte encoding of fitted parameters.
///
/// Implementors should contain only plain data (`Vec<f64>`, `String`, scalars).
pub trait SerializableParams: Sized {
    type Error: Error + Send + Sync + 'static;

    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error>;

    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error>;
}

impl<T> SerializableParams for T
where
    T: Serialize + DeserializeOwned,
{
    type Error = bincode::Error;

    fn to_bytes(&self) -> Result<Vec<u8>, Self::Error> {
        bincode::serialize(self)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self, Self::Error> {
        bincode::deserialize(bytes)
    }
}

/// Write `params` to `path` in the bincode encoding.
pub fn write_params<P, T>(path: P, params: &T) -> Result<(), WrangleError>
where
    P: AsRef<Path>,
    T: SerializableParams,
{
    let path = path.as_ref();
    let bytes = params
        .to_bytes()
        .map_err(|e| WrangleError::SerializationError(e.to_string()))?;
    fs::write(path, bytes)
        .map_err(|e| WrangleError::IoError(format!("cannot write {}: {}", path.display(), e)))?;
    tracing::debug!(path = %path.display(), "wrote fitted parameters");
    Ok(())
}

/// Read parameters previously written by [`write_params`].
pub fn read_params<P, T>(path: P) -> Result<T, WrangleError>
where
    P: AsRef<Path>,
    T: SerializableParams,
{
    let path = path.as_ref();
    let bytes = fs::read(path)
        .map_err(|e| WrangleError::IoError(format!("cannot read {}: {}", path.display(), e)))?;
    T::from_bytes(&bytes).map_err(|e| {
        WrangleError::SerializationError(format!("{}: {}", path.display(), e))
    })
}

/// Pretty JSON rendering of fitted parameters.
pub fn params_to_json<T: Serialize>(params: &T) -> Result<String, WrangleError> {
    Ok(serde_json::to_string_pretty(params)?)
}
