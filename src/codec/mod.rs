//! Compression codec infrastructure for zip-style archives.
//!
//! This module provides the stream abstractions every codec produces and
//! the two codecs that are always available:
//!
//! - [`method::STORE`]: bytes pass through unchanged ([`store`])
//! - [`method::DEFLATE`]: raw deflate, with a block-parallel writer and
//!   pooled decoders ([`deflate`])
//!
//! Codecs are not called directly by the archive layer; they are reached
//! through the factories kept in a [`CodecRegistry`](crate::CodecRegistry).

pub mod deflate;
pub mod parallel_deflate;
pub mod store;

use std::io::{self, Read, Write};

pub use deflate::{DeflateDecoder, DeflateEngine};
pub use parallel_deflate::ParallelDeflateEncoder;
pub use store::{StoreDecoder, StoreEncoder};

/// Output sink handed to a compressor factory.
///
/// The lifetime lets callers compress into borrowed buffers such as
/// `&mut Vec<u8>`.
pub type Sink<'a> = Box<dyn Write + Send + 'a>;

/// Input source handed to a decompressor factory.
///
/// Sources are owned and `'static` because pooled decoder engines outlive
/// the entry they were last bound to.
pub type Source = Box<dyn Read + Send>;

/// Method ids used in zip entry headers.
pub mod method {
    /// Stored (no compression).
    pub const STORE: u16 = 0;
    /// Deflate compression.
    pub const DEFLATE: u16 = 8;
    /// Deflate64 (enhanced deflate).
    pub const DEFLATE64: u16 = 9;
    /// BZip2 compression.
    pub const BZIP2: u16 = 12;
    /// LZMA compression.
    pub const LZMA: u16 = 14;
    /// Zstandard compression.
    pub const ZSTD: u16 = 93;
    /// XZ compression.
    pub const XZ: u16 = 95;

    /// Returns a human-readable name for a method id.
    pub fn name(id: u16) -> &'static str {
        match id {
            STORE => "Store",
            DEFLATE => "Deflate",
            DEFLATE64 => "Deflate64",
            BZIP2 => "BZip2",
            LZMA => "LZMA",
            ZSTD => "Zstandard",
            XZ => "XZ",
            _ => "Unknown",
        }
    }
}

/// An encoder that compresses bytes written to it into an output sink.
pub trait Encoder: Write + Send {
    /// Returns the method id for this encoder.
    fn method(&self) -> u16;

    /// Finishes encoding and flushes any buffered data to the sink.
    ///
    /// Dropping an encoder without calling this may lose output.
    fn finish(self: Box<Self>) -> io::Result<()>;
}

/// A decoder that reads compressed data and produces uncompressed output.
pub trait Decoder: Read + Send {
    /// Returns the method id for this decoder.
    fn method(&self) -> u16;

    /// Releases the resources held by this decoder.
    ///
    /// Closing twice is a no-op.
    fn close(&mut self) -> io::Result<()>;
}

/// Per-entry metadata handed to decompressor factories.
///
/// The built-in codecs only look at [`method`](Self::method); the other
/// fields are carried for custom decompressors that need them (for example
/// codecs without an end-of-stream marker).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryInfo {
    /// Compression method id of the entry.
    pub method: u16,
    /// Size of the compressed data in bytes.
    pub compressed_size: u64,
    /// Size of the uncompressed data in bytes.
    pub uncompressed_size: u64,
    /// Entry path inside the archive, if known.
    pub name: Option<String>,
}

impl EntryInfo {
    /// Creates metadata for an entry compressed with `method`.
    pub fn new(method: u16) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    /// Sets the compressed and uncompressed sizes.
    pub fn sizes(mut self, compressed_size: u64, uncompressed_size: u64) -> Self {
        self.compressed_size = compressed_size;
        self.uncompressed_size = uncompressed_size;
        self
    }

    /// Sets the entry name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
