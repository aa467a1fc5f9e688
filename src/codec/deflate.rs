//! Deflate codec implementation.
//!
//! Encoding goes through [`ParallelDeflateEncoder`]; decoding goes through
//! pooled [`DeflateEngine`]s so that the inflate state and its input buffer
//! are allocated once and reused across entries.

use std::io::{self, Read};

use flate2::read::DeflateDecoder as FlateDecoder;

use super::{ParallelDeflateEncoder, Sink, Source, method};
use crate::pool::{Engine, PooledReader};
use crate::settings::CompressionSettings;

/// Deflate decoder handed out by the registry.
pub type DeflateDecoder = PooledReader<DeflateEngine>;

/// Reusable raw-deflate decompression engine.
pub struct DeflateEngine {
    inner: FlateDecoder<Source>,
}

impl std::fmt::Debug for DeflateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeflateEngine").finish_non_exhaustive()
    }
}

impl Read for DeflateEngine {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Engine for DeflateEngine {
    const METHOD: u16 = method::DEFLATE;

    fn open(source: Source) -> Self {
        Self {
            inner: FlateDecoder::new(source),
        }
    }

    fn reset(&mut self, source: Source) -> io::Result<()> {
        drop(self.inner.reset(source));
        Ok(())
    }

    fn close(&mut self) -> io::Result<()> {
        // Idle engines must not keep the previous entry's source alive.
        drop(self.inner.reset(Box::new(io::empty())));
        Ok(())
    }
}

/// Creates a deflate encoder configured from `settings`.
///
/// The block size and block count are best-effort tuning: if the encoder
/// rejects them it keeps its defaults and encoding proceeds.
pub fn new_deflate_encoder<'a>(
    settings: &CompressionSettings,
    sink: Sink<'a>,
) -> ParallelDeflateEncoder<'a> {
    let flate = &settings.flate;
    let mut encoder = ParallelDeflateEncoder::new(sink, flate.level);
    if let Err(e) = encoder.set_concurrency(flate.block_size, flate.blocks) {
        log::debug!("Ignoring deflate concurrency settings: {}", e);
    }
    encoder
}
