//! Pooling of decompression engines.
//!
//! This module provides [`EnginePool`] for recycling decompression engines
//! across archive entries, and [`PooledReader`], the handle that owns a
//! checked-out engine until it is closed.
//!
//! # How It Works
//!
//! Building a decompression engine allocates its window, Huffman tables
//! and input buffer. When an archive has thousands of small entries that
//! cost dominates, so engines are recycled:
//! 1. [`EnginePool::acquire`] pops an idle engine and rebinds it to the new
//!    source, or opens a fresh one if none is idle
//! 2. The engine is wrapped in a [`PooledReader`] which owns it exclusively
//! 3. Closing (or dropping) the reader returns the engine to the pool
//!
//! The pool is a best-effort cache: with [`EnginePool::with_max_idle`] it
//! discards returned engines once enough are idle.
//!
//! # Example
//!
//! ```rust
//! use std::io::{Cursor, Read, Write};
//! use std::sync::Arc;
//! use zipcodec::codec::DeflateEngine;
//! use zipcodec::pool::EnginePool;
//!
//! # fn main() -> std::io::Result<()> {
//! let mut compressed = Vec::new();
//! {
//!     let mut enc = flate2::write::DeflateEncoder::new(&mut compressed, Default::default());
//!     enc.write_all(b"pooled")?;
//!     enc.finish()?;
//! }
//!
//! let pool: Arc<EnginePool<DeflateEngine>> = Arc::new(EnginePool::new());
//! let mut reader = pool.acquire(Box::new(Cursor::new(compressed)));
//! let mut out = String::new();
//! reader.read_to_string(&mut out)?;
//! reader.close()?;
//!
//! assert_eq!(out, "pooled");
//! assert_eq!(pool.idle(), 1);
//! # Ok(())
//! # }
//! ```

mod reader;

pub use reader::PooledReader;

use std::io::{self, Read};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::codec::Source;

/// Acquires a mutex lock, recovering from poisoned state if necessary.
///
/// Idle engines and statistics stay consistent across a panic: an engine
/// is either in the idle list or owned by exactly one reader.
pub(crate) fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        log::warn!("EnginePool mutex was poisoned, recovering");
        poisoned.into_inner()
    })
}

/// A reusable, stateful decompression engine.
pub trait Engine: Read + Send + Sized + 'static {
    /// Method id of the data this engine decodes.
    const METHOD: u16;

    /// Builds a fresh engine bound to `source`.
    fn open(source: Source) -> Self;

    /// Clears internal state and rebinds the engine to `source`.
    ///
    /// On error the engine must still be usable.
    fn reset(&mut self, source: Source) -> io::Result<()>;

    /// Releases the current source before the engine goes idle.
    fn close(&mut self) -> io::Result<()>;
}

/// Statistics for pool usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Number of acquisitions served by a recycled engine.
    pub hits: u64,
    /// Number of acquisitions that opened a new engine.
    pub misses: u64,
    /// Number of engines returned and kept idle.
    pub returned: u64,
    /// Number of engines returned but dropped because the pool was full.
    pub discarded: u64,
}

impl PoolStats {
    /// Returns the fraction of acquisitions served from the pool.
    pub fn hit_ratio(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// A thread-safe pool of idle decompression engines.
///
/// Share it with `Arc<EnginePool<E>>`; [`acquire`](Self::acquire) needs the
/// `Arc` so that readers can return their engine on close.
pub struct EnginePool<E: Engine> {
    idle: Mutex<Vec<E>>,
    max_idle: Option<usize>,
    stats: Mutex<PoolStats>,
}

impl<E: Engine> std::fmt::Debug for EnginePool<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnginePool")
            .field("idle", &self.idle())
            .field("max_idle", &self.max_idle)
            .field("stats", &self.stats())
            .finish()
    }
}

impl<E: Engine> Default for EnginePool<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Engine> EnginePool<E> {
    /// Creates a pool that keeps every returned engine.
    pub fn new() -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            max_idle: None,
            stats: Mutex::new(PoolStats::default()),
        }
    }

    /// Creates a pool that keeps at most `max_idle` engines.
    ///
    /// Engines returned beyond that are dropped. `0` disables recycling.
    pub fn with_max_idle(max_idle: usize) -> Self {
        Self {
            max_idle: Some(max_idle),
            ..Self::new()
        }
    }

    /// Checks out an engine bound to `source`.
    ///
    /// A recycled engine is reset to the new source; a reset failure is
    /// ignored and the engine is used anyway. Without an idle engine a new
    /// one is opened.
    pub fn acquire(self: &Arc<Self>, source: Source) -> PooledReader<E> {
        let recycled = lock_or_recover(&self.idle).pop();
        let engine = match recycled {
            Some(mut engine) => {
                if let Err(e) = engine.reset(source) {
                    log::debug!("Ignoring reset failure of pooled engine: {}", e);
                }
                lock_or_recover(&self.stats).hits += 1;
                log::trace!("Reusing pooled engine for method {}", E::METHOD);
                engine
            }
            None => {
                lock_or_recover(&self.stats).misses += 1;
                log::trace!("Opening new engine for method {}", E::METHOD);
                E::open(source)
            }
        };
        PooledReader::new(Arc::clone(self), engine)
    }

    /// Returns an engine to the idle list.
    pub(crate) fn release(&self, engine: E) {
        let mut idle = lock_or_recover(&self.idle);
        let mut stats = lock_or_recover(&self.stats);
        if self.max_idle.is_some_and(|max| idle.len() >= max) {
            stats.discarded += 1;
            log::trace!("Pool full, discarding engine for method {}", E::METHOD);
            return;
        }
        idle.push(engine);
        stats.returned += 1;
    }

    /// Returns the number of idle engines.
    pub fn idle(&self) -> usize {
        lock_or_recover(&self.idle).len()
    }

    /// Returns the idle limit, if any.
    pub fn max_idle(&self) -> Option<usize> {
        self.max_idle
    }

    /// Returns a snapshot of the pool statistics.
    pub fn stats(&self) -> PoolStats {
        lock_or_recover(&self.stats).clone()
    }

    /// Resets the pool statistics.
    pub fn reset_stats(&self) {
        *lock_or_recover(&self.stats) = PoolStats::default();
    }

    /// Drops all idle engines.
    pub fn clear(&self) {
        lock_or_recover(&self.idle).clear();
    }
}
