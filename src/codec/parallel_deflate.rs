//! Block-parallel deflate encoder.
//!
//! Input is cut into blocks of `block_size` bytes. Up to `blocks` of them
//! are buffered and compressed together (in parallel with the `parallel`
//! feature), then written to the sink in order.
//!
//! # Stream Layout
//!
//! ```text
//! +-----------------------------+
//! | Block 0 (sync flushed)      |  <- raw deflate, ends byte-aligned, not final
//! +-----------------------------+
//! | Block 1 (sync flushed)      |
//! +-----------------------------+
//! | ...                         |
//! +-----------------------------+
//! | Last block (finished)       |  <- carries the final-block bit
//! +-----------------------------+
//! ```
//!
//! The concatenation is a single standard raw deflate stream, so any
//! inflater (including [`DeflateDecoder`](super::DeflateDecoder)) reads it
//! without knowing how it was produced. Blocks do not share a dictionary,
//! which costs a little ratio at block boundaries.

use std::io::{self, Write};

use flate2::Compression;
use flate2::write::DeflateEncoder as FlateEncoder;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use super::{Encoder, Sink, method};
use crate::settings::{
    DEFAULT_BLOCK_SIZE, DEFAULT_BLOCKS, DEFAULT_LEVEL, HUFFMAN_ONLY_LEVEL, MIN_BLOCK_SIZE,
    SettingsError,
};

/// Maps a `[-2, 9]` level onto a flate2 compression level.
fn compression_for(level: i32) -> Compression {
    match level {
        DEFAULT_LEVEL => Compression::default(),
        // flate2 has no Huffman-only strategy; use the fastest level instead.
        HUFFMAN_ONLY_LEVEL => Compression::fast(),
        l => Compression::new(l.clamp(0, 9) as u32),
    }
}

/// Compresses one block as a standalone raw deflate segment.
///
/// Non-final blocks end with a sync flush so the next block starts on a
/// byte boundary.
fn compress_block(data: &[u8], compression: Compression, last: bool) -> io::Result<Vec<u8>> {
    let mut encoder = FlateEncoder::new(Vec::with_capacity(data.len() / 2 + 64), compression);
    encoder.write_all(data)?;
    if last {
        return encoder.finish();
    }
    encoder.flush()?;
    // Take the output before drop finishes the stream into the buffer.
    Ok(std::mem::take(encoder.get_mut()))
}

/// Deflate encoder that compresses fixed-size blocks concurrently.
///
/// Output is only guaranteed to reach the sink after
/// [`Encoder::finish`] (or [`try_finish`](Self::try_finish)).
///
/// Once the sink (or a block) has failed, the stream on the sink is
/// incomplete and every later `write`, `flush` or `finish` returns an
/// error.
pub struct ParallelDeflateEncoder<'a> {
    sink: Sink<'a>,
    compression: Compression,
    block_size: usize,
    blocks: usize,
    pending: Vec<u8>,
    failed: bool,
}

impl std::fmt::Debug for ParallelDeflateEncoder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParallelDeflateEncoder")
            .field("compression", &self.compression)
            .field("block_size", &self.block_size)
            .field("blocks", &self.blocks)
            .field("pending", &self.pending.len())
            .field("failed", &self.failed)
            .finish_non_exhaustive()
    }
}

impl<'a> ParallelDeflateEncoder<'a> {
    /// Creates an encoder with the default concurrency (256 KiB × 16).
    ///
    /// # Arguments
    ///
    /// * `sink` - The destination for compressed data
    /// * `level` - Compression level in `[-2, 9]`; out-of-range values are
    ///   clamped
    pub fn new(sink: Sink<'a>, level: i32) -> Self {
        Self {
            sink,
            compression: compression_for(level),
            block_size: DEFAULT_BLOCK_SIZE,
            blocks: DEFAULT_BLOCKS,
            pending: Vec::new(),
            failed: false,
        }
    }

    /// Changes the block size and the number of blocks compressed at once.
    ///
    /// # Errors
    ///
    /// Rejects `blocks == 0` and `block_size <= 16384`, keeping the
    /// previous configuration.
    pub fn set_concurrency(&mut self, block_size: usize, blocks: usize) -> Result<(), SettingsError> {
        if blocks == 0 {
            return Err(SettingsError::Blocks(blocks));
        }
        if block_size <= MIN_BLOCK_SIZE {
            return Err(SettingsError::BlockSize(block_size));
        }
        self.block_size = block_size;
        self.blocks = blocks;
        Ok(())
    }

    /// Returns the configured block size.
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Returns the configured number of concurrent blocks.
    pub fn blocks(&self) -> usize {
        self.blocks
    }

    /// Returns true once an earlier write to the sink has failed.
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    fn ensure_usable(&self) -> io::Result<()> {
        if self.failed {
            return Err(io::Error::other(
                "deflate encoder is unusable after an earlier error",
            ));
        }
        Ok(())
    }

    fn batch_len(&self) -> usize {
        self.block_size.saturating_mul(self.blocks)
    }

    /// Compresses `len` bytes from the front of the pending buffer and
    /// writes them to the sink. Only the very last batch sets `last`.
    ///
    /// Input leaves the pending buffer block by block as each compressed
    /// block reaches the sink. Any error marks the encoder as failed.
    fn compress_pending(&mut self, len: usize, last: bool) -> io::Result<()> {
        let result = self.compress_blocks(len, last);
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    fn flush_sink(&mut self) -> io::Result<()> {
        let result = self.sink.flush();
        if result.is_err() {
            self.failed = true;
        }
        result
    }

    fn compress_blocks(&mut self, len: usize, last: bool) -> io::Result<()> {
        let data = &self.pending[..len];
        let chunks: Vec<&[u8]> = if data.is_empty() {
            vec![data]
        } else {
            data.chunks(self.block_size).collect()
        };
        let final_index = chunks.len() - 1;
        let compression = self.compression;

        #[cfg(feature = "parallel")]
        let compressed: Vec<io::Result<Vec<u8>>> = chunks
            .par_iter()
            .enumerate()
            .map(|(i, chunk)| compress_block(chunk, compression, last && i == final_index))
            .collect();

        #[cfg(not(feature = "parallel"))]
        let compressed: Vec<io::Result<Vec<u8>>> = chunks
            .iter()
            .enumerate()
            .map(|(i, chunk)| compress_block(chunk, compression, last && i == final_index))
            .collect();

        let lens: Vec<usize> = chunks.iter().map(|chunk| chunk.len()).collect();
        let mut written = 0;
        let mut result = Ok(());
        for (block, block_len) in compressed.into_iter().zip(lens) {
            match block.and_then(|block| self.sink.write_all(&block)) {
                Ok(()) => written += block_len,
                Err(e) => {
                    result = Err(e);
                    break;
                }
            }
        }
        self.pending.drain(..written);
        result
    }

    /// Compresses all buffered input, terminates the stream and flushes the
    /// sink.
    pub fn try_finish(&mut self) -> io::Result<()> {
        self.ensure_usable()?;
        let len = self.pending.len();
        self.compress_pending(len, true)?;
        self.flush_sink()
    }
}

impl Write for ParallelDeflateEncoder<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.ensure_usable()?;
        self.pending.extend_from_slice(buf);
        let batch = self.batch_len();
        while self.pending.len() >= batch {
            self.compress_pending(batch, false)?;
        }
        Ok(buf.len())
    }

    /// Compresses everything buffered so far as sync-flushed blocks.
    ///
    /// The stream stays open; more data may follow.
    fn flush(&mut self) -> io::Result<()> {
        self.ensure_usable()?;
        if !self.pending.is_empty() {
            let len = self.pending.len();
            self.compress_pending(len, false)?;
        }
        self.flush_sink()
    }
}

impl Encoder for ParallelDeflateEncoder<'_> {
    fn method(&self) -> u16 {
        method::DEFLATE
    }

    fn finish(mut self: Box<Self>) -> io::Result<()> {
        self.try_finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::read::DeflateDecoder as FlateDecoder;
    use std::io::Read;

    fn inflate(data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        FlateDecoder::new(data).read_to_end(&mut out).unwrap();
        out
    }

    fn compress(data: &[u8], level: i32, block_size: usize, blocks: usize) -> Vec<u8> {
        let mut compressed = Vec::new();
        {
            let mut encoder = ParallelDeflateEncoder::new(Box::new(&mut compressed), level);
            encoder.set_concurrency(block_size, blocks).unwrap();
            encoder.write_all(data).unwrap();
            encoder.try_finish().unwrap();
        }
        compressed
    }

    #[test]
    fn test_empty_input_is_valid_stream() {
        let compressed = compress(b"", 6, 32 * 1024, 2);
        assert!(!compressed.is_empty());
        assert!(inflate(&compressed).is_empty());
    }

    #[test]
    fn test_single_partial_block() {
        let data = b"Hello, World! This is a test of Deflate compression.";
        let compressed = compress(data, 6, 32 * 1024, 2);
        assert_eq!(inflate(&compressed), data);
    }

    #[test]
    fn test_many_blocks_across_batches() {
        // 5.5 blocks with 2 per batch: two full batches plus a tail.
        let block = 20 * 1024;
        let data: Vec<u8> = (0..block * 11 / 2).map(|i| (i % 251) as u8).collect();
        let compressed = compress(&data, 9, block, 2);
        assert_eq!(inflate(&compressed), data);
    }

    #[test]
    fn test_exact_batch_multiple() {
        let block = 16 * 1024 + 1;
        let data = vec![b'z'; block * 4];
        let compressed = compress(&data, 1, block, 2);
        assert_eq!(inflate(&compressed), data);
        assert!(compressed.len() < data.len() / 10);
    }

    #[test]
    fn test_flush_keeps_stream_open() {
        let mut compressed = Vec::new();
        {
            let mut encoder = ParallelDeflateEncoder::new(Box::new(&mut compressed), 6);
            encoder.write_all(b"first half, ").unwrap();
            encoder.flush().unwrap();
            encoder.write_all(b"second half").unwrap();
            Box::new(encoder).finish().unwrap();
        }
        assert_eq!(inflate(&compressed), b"first half, second half");
    }

    #[test]
    fn test_special_levels() {
        let data = b"aaaaaaaaaabbbbbbbbbbaaaaaaaaaabbbbbbbbbb".repeat(100);
        for level in [-2, -1, 0, 9] {
            let compressed = compress(&data, level, 32 * 1024, 1);
            assert_eq!(inflate(&compressed), data, "level {}", level);
        }
    }

    #[test]
    fn test_set_concurrency_rejects_and_keeps_defaults() {
        let mut sink = Vec::new();
        let mut encoder = ParallelDeflateEncoder::new(Box::new(&mut sink), 6);
        assert_eq!(
            encoder.set_concurrency(16384, 4),
            Err(SettingsError::BlockSize(16384))
        );
        assert_eq!(encoder.set_concurrency(65536, 0), Err(SettingsError::Blocks(0)));
        assert_eq!(encoder.block_size(), DEFAULT_BLOCK_SIZE);
        assert_eq!(encoder.blocks(), DEFAULT_BLOCKS);

        encoder.set_concurrency(65536, 4).unwrap();
        assert_eq!(encoder.block_size(), 65536);
        assert_eq!(encoder.blocks(), 4);
    }

    /// Sink that fails its `fail_at`-th write (1-based) and accepts the rest.
    struct FailOnce<'a> {
        out: &'a mut Vec<u8>,
        writes: usize,
        fail_at: usize,
    }

    impl Write for FailOnce<'_> {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.writes += 1;
            if self.writes == self.fail_at {
                return Err(io::Error::other("transient"));
            }
            self.out.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_sink_error_mid_batch_fails_encoder() {
        let block = 16 * 1024 + 1;
        let data: Vec<u8> = (0..block * 2).map(|i| (i % 253) as u8).collect();
        let mut out = Vec::new();
        {
            let sink = FailOnce {
                out: &mut out,
                writes: 0,
                fail_at: 2,
            };
            let mut encoder = ParallelDeflateEncoder::new(Box::new(sink), 6);
            encoder.set_concurrency(block, 2).unwrap();

            // The batch fills up and is compressed; block 1 hits the failure.
            assert!(encoder.write(&data).is_err());
            assert!(encoder.is_failed());
            // Block 0 reached the sink and is no longer pending.
            assert_eq!(encoder.pending.len(), block);

            // The sink would accept writes now, but the stream is broken.
            assert!(encoder.write(b"more").is_err());
            assert!(encoder.flush().is_err());
            assert!(Box::new(encoder).finish().is_err());
        }

        // Only block 0 was written, once, and the stream is unterminated.
        let mut inflated = Vec::new();
        let _ = FlateDecoder::new(&out[..]).read_to_end(&mut inflated);
        assert!(inflated.len() <= block);
        assert_eq!(&inflated[..], &data[..inflated.len()]);
    }

    #[test]
    fn test_sink_error_on_finish_fails_encoder() {
        let mut out = Vec::new();
        {
            let sink = FailOnce {
                out: &mut out,
                writes: 0,
                fail_at: 1,
            };
            let mut encoder = ParallelDeflateEncoder::new(Box::new(sink), 6);
            encoder.write_all(b"buffered until finish").unwrap();
            assert!(encoder.try_finish().is_err());
            assert!(encoder.try_finish().is_err());
        }
        assert!(out.is_empty());
    }

    #[test]
    fn test_method_id() {
        let mut sink = Vec::new();
        let encoder = ParallelDeflateEncoder::new(Box::new(&mut sink), 6);
        assert_eq!(encoder.method(), method::DEFLATE);
    }
}
