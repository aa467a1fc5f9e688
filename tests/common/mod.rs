//! Shared test utilities for integration tests.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use zipcodec::{CodecRegistry, CompressionSettings, EntryInfo};

/// Compresses `data` with the codec registered for `method`.
pub fn compress(
    registry: &CodecRegistry,
    method: u16,
    settings: &CompressionSettings,
    data: &[u8],
) -> zipcodec::Result<Vec<u8>> {
    let mut compressed = Vec::new();
    {
        let mut encoder = registry.encoder(method, settings, Box::new(&mut compressed))?;
        encoder.write_all(data)?;
        encoder.finish()?;
    }
    Ok(compressed)
}

/// Decompresses `data` with the codec registered for `method` and closes
/// the decoder.
pub fn decompress(registry: &CodecRegistry, method: u16, data: Vec<u8>) -> zipcodec::Result<Vec<u8>> {
    let entry = EntryInfo::new(method);
    let mut decoder = registry.decoder(Box::new(Cursor::new(data)), &entry)?;
    let mut out = Vec::new();
    decoder.read_to_end(&mut out)?;
    decoder.close()?;
    Ok(out)
}

/// Highly compressible text (repeating pattern).
pub fn text(len: usize) -> Vec<u8> {
    b"The quick brown fox jumps over the lazy dog. "
        .iter()
        .copied()
        .cycle()
        .take(len)
        .collect()
}

/// Incompressible bytes, seeded for reproducibility.
pub fn random(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut data = vec![0u8; len];
    rng.fill_bytes(&mut data);
    data
}

/// Smallest settings the deflate encoder accepts, so multi-block paths
/// are exercised with small inputs.
pub fn small_blocks() -> CompressionSettings {
    CompressionSettings::default().block_size(16 * 1024 + 1).blocks(2)
}
