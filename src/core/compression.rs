//! Compression for standalone blobs
//!
//! Framed format: `[method: u8][compressed data]`. The method byte lets the
//! reader decompress without being told how the blob was written.

use crate::error::{ArchiveError, Result};

/// Compression method recorded in a blob frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum CompressionMethod {
    /// Stored as-is
    None = 0,
    /// LZ4 (fast, moderate ratio)
    Lz4 = 1,
    /// Zstd (slower, better ratio)
    #[default]
    Zstd = 2,
}

impl CompressionMethod {
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(CompressionMethod::None),
            1 => Some(CompressionMethod::Lz4),
            2 => Some(CompressionMethod::Zstd),
            _ => None,
        }
    }
}

const ZSTD_LEVEL: i32 = 3;

pub fn compress(data: &[u8], method: CompressionMethod) -> Result<Vec<u8>> {
    match method {
        CompressionMethod::None => Ok(data.to_vec()),
        CompressionMethod::Lz4 => Ok(lz4_flex::compress_prepend_size(data)),
        CompressionMethod::Zstd => zstd::encode_all(data, ZSTD_LEVEL)
            .map_err(|e| ArchiveError::Compression(format!("Zstd compression failed: {}", e))),
    }
}

pub fn decompress(data: &[u8], method: CompressionMethod) -> Result<Vec<u8>> {
    match method {
        CompressionMethod::None => Ok(data.to_vec()),
        CompressionMethod::Lz4 => lz4_flex::decompress_size_prepended(data)
            .map_err(|e| ArchiveError::Compression(format!("LZ4 decompression failed: {}", e))),
        CompressionMethod::Zstd => zstd::decode_all(data)
            .map_err(|e| ArchiveError::Compression(format!("Zstd decompression failed: {}", e))),
    }
}

/// Compress and prepend the method byte
pub fn frame(data: &[u8], method: CompressionMethod) -> Result<Vec<u8>> {
    let body = compress(data, method)?;
    let mut framed = Vec::with_capacity(body.len() + 1);
    framed.push(method as u8);
    framed.extend_from_slice(&body);
    Ok(framed)
}

/// Read the method byte and decompress the rest
pub fn unframe(framed: &[u8]) -> Result<Vec<u8>> {
    let (&tag, body) = framed
        .split_first()
        .ok_or_else(|| ArchiveError::Compression("Empty compressed frame".to_string()))?;
    let method = CompressionMethod::from_u8(tag).ok_or_else(|| {
        ArchiveError::Compression(format!("Unknown compression method {}", tag))
    })?;
    decompress(body, method)
}
