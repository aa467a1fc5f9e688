//! Codec registry mapping method ids to codec factories.
//!
//! A [`CodecRegistry`] holds two independent tables: compressor factories
//! (write side) and decompressor factories (read side). Store (`0`) and
//! Deflate (`8`) are registered when the registry is constructed; custom
//! codecs are added with [`register_compressor`] and
//! [`register_decompressor`].
//!
//! Entries are inserted once and never replaced or removed. Registration
//! and lookup may happen concurrently from any number of threads, including
//! while archive readers and writers are using earlier registrations.
//! Build one registry per process (or per archive session) and share it
//! with `Arc<CodecRegistry>`.
//!
//! # Example
//!
//! ```rust
//! use std::io::{Cursor, Read, Write};
//! use zipcodec::{CodecRegistry, CompressionSettings, EntryInfo, method};
//!
//! # fn main() -> zipcodec::Result<()> {
//! let registry = CodecRegistry::new();
//! let settings = CompressionSettings::default();
//! settings.validate()?;
//!
//! let mut compressed = Vec::new();
//! let mut encoder = registry.encoder(method::DEFLATE, &settings, Box::new(&mut compressed))?;
//! encoder.write_all(b"hello zip")?;
//! encoder.finish()?;
//!
//! let entry = EntryInfo::new(method::DEFLATE);
//! let mut decoder = registry.decoder(Box::new(Cursor::new(compressed)), &entry)?;
//! let mut text = String::new();
//! decoder.read_to_string(&mut text)?;
//! decoder.close()?;
//!
//! assert_eq!(text, "hello zip");
//! # Ok(())
//! # }
//! ```
//!
//! [`register_compressor`]: CodecRegistry::register_compressor
//! [`register_decompressor`]: CodecRegistry::register_decompressor

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::codec::deflate::new_deflate_encoder;
use crate::codec::{
    Decoder, DeflateEngine, Encoder, EntryInfo, Sink, Source, StoreDecoder, StoreEncoder, method,
};
use crate::error::CodecKind;
use crate::pool::EnginePool;
use crate::settings::CompressionSettings;
use crate::{Error, Result};

/// Write-side factory: builds an encoder that compresses into `sink`.
///
/// A factory must be safe to call from many threads at once; each encoder
/// it returns is used by one thread at a time.
pub type CompressorFactory = Arc<
    dyn for<'a> Fn(&CompressionSettings, Sink<'a>) -> Result<Box<dyn Encoder + 'a>> + Send + Sync,
>;

/// Read-side factory: builds a decoder that decompresses from `source`.
///
/// Same threading contract as [`CompressorFactory`].
pub type DecompressorFactory =
    Arc<dyn Fn(Source, &EntryInfo) -> Result<Box<dyn Decoder>> + Send + Sync>;

fn store_compressor<'a>(
    _settings: &CompressionSettings,
    sink: Sink<'a>,
) -> Result<Box<dyn Encoder + 'a>> {
    Ok(Box::new(StoreEncoder::new(sink)))
}

fn store_decompressor(source: Source, _entry: &EntryInfo) -> Result<Box<dyn Decoder>> {
    Ok(Box::new(StoreDecoder::new(source)))
}

fn deflate_compressor<'a>(
    settings: &CompressionSettings,
    sink: Sink<'a>,
) -> Result<Box<dyn Encoder + 'a>> {
    Ok(Box::new(new_deflate_encoder(settings, sink)))
}

/// Thread-safe table of compression codecs keyed by method id.
///
/// Each table is a sharded map. A lookup takes a read lock on one shard, so
/// it can wait briefly while a registration inserts into that same shard;
/// it never waits on registrations into other shards or on codec use.
pub struct CodecRegistry {
    compressors: DashMap<u16, CompressorFactory>,
    decompressors: DashMap<u16, DecompressorFactory>,
    deflate_pool: Arc<EnginePool<DeflateEngine>>,
}

impl std::fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CodecRegistry")
            .field("compressors", &self.compressor_methods())
            .field("decompressors", &self.decompressor_methods())
            .field("deflate_pool", &self.deflate_pool)
            .finish()
    }
}

impl Default for CodecRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CodecRegistry {
    /// Creates a registry with the built-in Store and Deflate codecs.
    ///
    /// Deflate decoders are recycled through a pool owned by this registry.
    pub fn new() -> Self {
        Self::with_pool(Arc::new(EnginePool::new()))
    }

    /// Creates a registry whose Deflate decoders come from `pool`.
    ///
    /// Use this to share one engine pool between several registries.
    pub fn with_pool(pool: Arc<EnginePool<DeflateEngine>>) -> Self {
        let registry = Self {
            compressors: DashMap::new(),
            decompressors: DashMap::new(),
            deflate_pool: Arc::clone(&pool),
        };

        registry.register_compressor(method::STORE, store_compressor);
        registry.register_compressor(method::DEFLATE, deflate_compressor);

        registry.register_decompressor(method::STORE, store_decompressor);
        registry.register_decompressor(method::DEFLATE, move |source, _entry| {
            Ok(Box::new(pool.acquire(source)) as Box<dyn Decoder>)
        });

        registry
    }

    /// Registers a compressor for `method`.
    ///
    /// # Panics
    ///
    /// Panics if a compressor is already registered for `method`. Use
    /// [`try_register_compressor`](Self::try_register_compressor) to get
    /// an error instead.
    pub fn register_compressor<F>(&self, method: u16, factory: F)
    where
        F: for<'a> Fn(&CompressionSettings, Sink<'a>) -> Result<Box<dyn Encoder + 'a>>
            + Send
            + Sync
            + 'static,
    {
        if let Err(e) = self.try_register_compressor(method, factory) {
            panic!("{}", e);
        }
    }

    /// Registers a decompressor for `method`.
    ///
    /// # Panics
    ///
    /// Panics if a decompressor is already registered for `method`. Use
    /// [`try_register_decompressor`](Self::try_register_decompressor) to
    /// get an error instead.
    pub fn register_decompressor<F>(&self, method: u16, factory: F)
    where
        F: Fn(Source, &EntryInfo) -> Result<Box<dyn Decoder>> + Send + Sync + 'static,
    {
        if let Err(e) = self.try_register_decompressor(method, factory) {
            panic!("{}", e);
        }
    }

    /// Registers a compressor for `method` unless one already exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateRegistration`] if `method` is taken; the
    /// existing factory is kept.
    pub fn try_register_compressor<F>(&self, method: u16, factory: F) -> Result<()>
    where
        F: for<'a> Fn(&CompressionSettings, Sink<'a>) -> Result<Box<dyn Encoder + 'a>>
            + Send
            + Sync
            + 'static,
    {
        match self.compressors.entry(method) {
            Entry::Occupied(_) => Err(Error::DuplicateRegistration {
                kind: CodecKind::Compressor,
                method,
            }),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(factory));
                log::debug!(
                    "Registered compressor for method {} ({})",
                    method,
                    method::name(method)
                );
                Ok(())
            }
        }
    }

    /// Registers a decompressor for `method` unless one already exists.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateRegistration`] if `method` is taken; the
    /// existing factory is kept.
    pub fn try_register_decompressor<F>(&self, method: u16, factory: F) -> Result<()>
    where
        F: Fn(Source, &EntryInfo) -> Result<Box<dyn Decoder>> + Send + Sync + 'static,
    {
        match self.decompressors.entry(method) {
            Entry::Occupied(_) => Err(Error::DuplicateRegistration {
                kind: CodecKind::Decompressor,
                method,
            }),
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(factory));
                log::debug!(
                    "Registered decompressor for method {} ({})",
                    method,
                    method::name(method)
                );
                Ok(())
            }
        }
    }

    /// Looks up the compressor for `method`.
    ///
    /// Returns `None` if nothing is registered; the caller decides how to
    /// report that.
    pub fn compressor_for(&self, method: u16) -> Option<CompressorFactory> {
        self.compressors
            .get(&method)
            .map(|factory| Arc::clone(factory.value()))
    }

    /// Looks up the decompressor for `method`.
    ///
    /// Returns `None` if nothing is registered.
    pub fn decompressor_for(&self, method: u16) -> Option<DecompressorFactory> {
        self.decompressors
            .get(&method)
            .map(|factory| Arc::clone(factory.value()))
    }

    /// Builds an encoder for `method` writing into `sink`.
    ///
    /// `settings` are passed through as given; validate them first.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedMethod`] if no compressor is registered,
    /// or whatever the factory itself reports.
    pub fn encoder<'a>(
        &self,
        method: u16,
        settings: &CompressionSettings,
        sink: Sink<'a>,
    ) -> Result<Box<dyn Encoder + 'a>> {
        let factory = self
            .compressor_for(method)
            .ok_or(Error::UnsupportedMethod { method })?;
        (*factory)(settings, sink)
    }

    /// Builds a decoder for `entry` reading from `source`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedMethod`] if no decompressor is registered
    /// for `entry.method`, or whatever the factory itself reports.
    pub fn decoder(&self, source: Source, entry: &EntryInfo) -> Result<Box<dyn Decoder>> {
        let factory = self
            .decompressor_for(entry.method)
            .ok_or(Error::UnsupportedMethod {
                method: entry.method,
            })?;
        (*factory)(source, entry)
    }

    /// Returns the method ids with a registered compressor, sorted.
    pub fn compressor_methods(&self) -> Vec<u16> {
        let mut methods: Vec<u16> = self.compressors.iter().map(|e| *e.key()).collect();
        methods.sort_unstable();
        methods
    }

    /// Returns the method ids with a registered decompressor, sorted.
    pub fn decompressor_methods(&self) -> Vec<u16> {
        let mut methods: Vec<u16> = self.decompressors.iter().map(|e| *e.key()).collect();
        methods.sort_unstable();
        methods
    }

    /// Returns the engine pool behind the built-in Deflate decompressor.
    pub fn deflate_pool(&self) -> &Arc<EnginePool<DeflateEngine>> {
        &self.deflate_pool
    }
}
