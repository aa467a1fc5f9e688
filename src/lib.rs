//! # zipcodec
//!
//! A pluggable compression-codec registry for zip-style archive readers and
//! writers.
//!
//! The archive layer knows entries only by a numeric compression method id.
//! This crate resolves that id to an encoder or decoder at runtime:
//!
//! - [`CodecRegistry`]: thread-safe tables of compressor and decompressor
//!   factories, preloaded with Store (`0`) and Deflate (`8`)
//! - [`CompressionSettings`]: validated deflate parameters with `default`
//!   and `best` presets
//! - [`pool::EnginePool`]: recycles expensive decompression engines across
//!   entries; [`pool::PooledReader`] is the handle that owns one
//!
//! ## Quick Start
//!
//! ```rust
//! use std::io::{Cursor, Read, Write};
//! use zipcodec::{CodecRegistry, CompressionSettings, EntryInfo, Result, method};
//!
//! fn main() -> Result<()> {
//!     let registry = CodecRegistry::new();
//!     let settings = CompressionSettings::default();
//!     settings.validate()?;
//!
//!     let original = b"hello world ".repeat(1000);
//!     let mut compressed = Vec::new();
//!     let mut encoder = registry.encoder(method::DEFLATE, &settings, Box::new(&mut compressed))?;
//!     encoder.write_all(&original)?;
//!     encoder.finish()?;
//!     assert!(compressed.len() < original.len());
//!
//!     let entry = EntryInfo::new(method::DEFLATE).sizes(compressed.len() as u64, original.len() as u64);
//!     let mut decoder = registry.decoder(Box::new(Cursor::new(compressed)), &entry)?;
//!     let mut restored = Vec::new();
//!     decoder.read_to_end(&mut restored)?;
//!     decoder.close()?;
//!
//!     assert_eq!(restored, original);
//!     Ok(())
//! }
//! ```
//!
//! ## Custom Codecs
//!
//! ```rust
//! use zipcodec::codec::{Decoder, StoreDecoder};
//! use zipcodec::{CodecRegistry, EntryInfo, Result};
//!
//! let registry = CodecRegistry::new();
//! registry.register_decompressor(99, |source, _entry: &EntryInfo| -> Result<Box<dyn Decoder>> {
//!     Ok(Box::new(StoreDecoder::new(source)))
//! });
//! assert!(registry.decompressor_for(99).is_some());
//! ```
//!
//! Registering the same method id twice is a wiring bug and panics; use
//! [`CodecRegistry::try_register_compressor`] /
//! [`CodecRegistry::try_register_decompressor`] to get an error instead.
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `parallel` | Yes | Compress deflate blocks concurrently with rayon |
//!
//! ## Error Handling
//!
//! Fallible operations return [`Result<T>`]. Stream handles report
//! [`std::io::Error`]s; reading a closed pooled decoder yields one that
//! wraps [`Error::ReadAfterClose`] (see [`Error::is_read_after_close`]).
//!
//! ## Logging
//!
//! Diagnostics go through the [`log`](https://docs.rs/log) facade. Install
//! any logger to see codec registrations and pool activity.
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_op_in_unsafe_fn)]

pub mod codec;
pub mod error;
pub mod pool;
pub mod registry;
pub mod settings;

pub use codec::{Decoder, Encoder, EntryInfo, Sink, Source, method};
pub use error::{CodecKind, Error, Result};
pub use registry::{CodecRegistry, CompressorFactory, DecompressorFactory};
pub use settings::{
    CompressionSettings, FlateSettings, SettingsError, best_compression_settings,
    default_compression_settings,
};
