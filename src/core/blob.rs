//! Standalone serialized blobs
//!
//! Any serde type can opt into [`Loadable`] to get bincode persistence with
//! optional compression and encryption, plus JSON text and value loading for
//! configuration-style data. This sits beside the archive engine and shares
//! only its error type.
//!
//! ```text
//! plain      bincode(value)
//! compressed [method][compress(bincode(value))]
//! encrypted  [nonce][aes-gcm(bincode(value))][tag]
//! sealed     [nonce][aes-gcm([method][compress(bincode(value))])][tag]
//! ```

use crate::compression::{self, CompressionMethod};
use crate::encryption::{self, EncryptionKey};
use crate::error::{ArchiveError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::any::type_name;
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::debug;

/// Bincode persistence for a serde type
///
/// ```
/// use bdmp_rs::Loadable;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize, PartialEq, Debug)]
/// struct Settings {
///     volume: u8,
/// }
///
/// impl Loadable for Settings {}
///
/// let bytes = Settings { volume: 7 }.to_bytes().unwrap();
/// assert_eq!(Settings::from_bytes(&bytes).unwrap(), Settings { volume: 7 });
/// ```
pub trait Loadable: Serialize + DeserializeOwned {
    fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(invalid::<Self>)
    }

    fn to_writer<W: Write>(&self, writer: W) -> Result<()> {
        Ok(bincode::serialize_into(writer, self)?)
    }

    fn from_reader<R: Read>(reader: R) -> Result<Self> {
        bincode::deserialize_from(reader).map_err(invalid::<Self>)
    }

    fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_bytes()?)?;
        debug!("Wrote {} to {:?}", type_name::<Self>(), path);
        Ok(())
    }

    fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ArchiveError::NotFound(format!("blob file {:?}", path)),
            _ => e.into(),
        })?;
        Self::from_bytes(&bytes)
    }

    fn to_compressed_bytes(&self, method: CompressionMethod) -> Result<Vec<u8>> {
        compression::frame(&self.to_bytes()?, method)
    }

    fn from_compressed_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_bytes(&compression::unframe(bytes)?)
    }

    fn to_encrypted_bytes(&self, key: &EncryptionKey) -> Result<Vec<u8>> {
        encryption::encrypt(&self.to_bytes()?, key)
    }

    fn from_encrypted_bytes(bytes: &[u8], key: &EncryptionKey) -> Result<Self> {
        Self::from_bytes(&encryption::decrypt(bytes, key)?)
    }

    /// Compress, then encrypt
    fn to_sealed_bytes(&self, key: &EncryptionKey, method: CompressionMethod) -> Result<Vec<u8>> {
        encryption::encrypt(&self.to_compressed_bytes(method)?, key)
    }

    fn from_sealed_bytes(bytes: &[u8], key: &EncryptionKey) -> Result<Self> {
        Self::from_compressed_bytes(&encryption::decrypt(bytes, key)?)
    }

    fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(invalid_json::<Self>)
    }

    /// Build from an already parsed JSON value, e.g. one field of a larger document
    fn from_value(value: serde_json::Value) -> Result<Self> {
        serde_json::from_value(value).map_err(invalid_json::<Self>)
    }
}

fn invalid<T>(e: bincode::Error) -> ArchiveError {
    ArchiveError::InvalidBlob(format!("{}: {}", type_name::<T>(), e))
}

fn invalid_json<T>(e: serde_json::Error) -> ArchiveError {
    ArchiveError::InvalidBlob(format!("{}: {}", type_name::<T>(), e))
}
