//! AES-256-GCM encryption for standalone blobs
//!
//! Format: `[nonce: 12 bytes][ciphertext][tag: 16 bytes]`. A fresh random
//! nonce is drawn for every call, so encrypting the same data twice gives
//! different output.

use crate::error::{ArchiveError, Result};
use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Nonce,
};
use rand::RngCore;

/// Encryption key (32 bytes for AES-256)
pub type EncryptionKey = [u8; 32];

pub const NONCE_SIZE: usize = 12;

pub const TAG_SIZE: usize = 16;

/// Bytes added to every encrypted blob
pub const ENCRYPTION_OVERHEAD: usize = NONCE_SIZE + TAG_SIZE;

/// Generate a random key
pub fn generate_key() -> EncryptionKey {
    let mut key = [0u8; 32];
    OsRng.fill_bytes(&mut key);
    key
}

pub fn encrypt(data: &[u8], key: &EncryptionKey) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new(key.into());

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    let ciphertext = cipher
        .encrypt(nonce, data)
        .map_err(|e| ArchiveError::Encryption(format!("Encryption failed: {}", e)))?;

    let mut result = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    result.extend_from_slice(&nonce_bytes);
    result.extend_from_slice(&ciphertext);
    Ok(result)
}

/// Decrypt and authenticate; a wrong key or tampered data fails
pub fn decrypt(data: &[u8], key: &EncryptionKey) -> Result<Vec<u8>> {
    if data.len() < ENCRYPTION_OVERHEAD {
        return Err(ArchiveError::Encryption(
            "Encrypted data too short".to_string(),
        ));
    }

    let cipher = Aes256Gcm::new(key.into());
    let (nonce, ciphertext) = data.split_at(NONCE_SIZE);

    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map_err(|e| ArchiveError::Encryption(format!("Decryption failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_generation() {
        let key1 = generate_key();
        let key2 = generate_key();
        assert_ne!(key1, key2);
    }

    #[test]
    fn test_encryption_decryption() {
        let key = generate_key();
        let plaintext = b"Hello, World! This is a secret message.";

        let ciphertext = encrypt(plaintext, &key).unwrap();
        assert_eq!(ciphertext.len(), plaintext.len() + ENCRYPTION_OVERHEAD);
        assert_eq!(decrypt(&ciphertext, &key).unwrap(), plaintext);
    }

    #[test]
    fn test_wrong_key_fails() {
        let ciphertext = encrypt(b"Secret message", &generate_key()).unwrap();
        assert!(matches!(
            decrypt(&ciphertext, &generate_key()),
            Err(ArchiveError::Encryption(_))
        ));
    }

    #[test]
    fn test_tampered_data_fails() {
        let key = generate_key();
        let mut ciphertext = encrypt(b"Important data", &key).unwrap();
        ciphertext[NONCE_SIZE + 5] ^= 0xFF;
        assert!(decrypt(&ciphertext, &key).is_err());
    }

    #[test]
    fn test_short_input() {
        let key = generate_key();
        assert!(decrypt(&[0u8; ENCRYPTION_OVERHEAD - 1], &key).is_err());
    }

    #[test]
    fn test_nonce_uniqueness() {
        let key = generate_key();
        let a = encrypt(b"Same message", &key).unwrap();
        let b = encrypt(b"Same message", &key).unwrap();
        assert_ne!(&a[..NONCE_SIZE], &b[..NONCE_SIZE]);
        assert_eq!(decrypt(&a, &key).unwrap(), decrypt(&b, &key).unwrap());
    }
}
