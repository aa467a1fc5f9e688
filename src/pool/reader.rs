//! Reader handle owning a checked-out engine.

use std::io::{self, Read};
use std::sync::{Arc, Mutex};

use super::{Engine, EnginePool, lock_or_recover};
use crate::Error;
use crate::codec::Decoder;

/// A decompressing reader backed by a pooled engine.
///
/// The reader is either open (it owns an engine) or closed (the engine is
/// back in the pool). Reads and closes are serialized by a lock private to
/// this reader, so a close racing an in-flight read from another thread
/// waits for that read to finish before the engine is handed back.
///
/// - Reading after close fails with [`Error::ReadAfterClose`] wrapped in an
///   `io::Error` (see [`Error::is_read_after_close`]).
/// - Closing is idempotent; the engine returns to the pool exactly once.
/// - Dropping an open reader closes it.
///
/// Both `&PooledReader` and `PooledReader` implement [`Read`], so a reader
/// shared through an `Arc` can be read from one thread and closed from
/// another.
pub struct PooledReader<E: Engine> {
    pool: Arc<EnginePool<E>>,
    engine: Mutex<Option<E>>,
}

impl<E: Engine> std::fmt::Debug for PooledReader<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledReader")
            .field("method", &E::METHOD)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

impl<E: Engine> PooledReader<E> {
    pub(crate) fn new(pool: Arc<EnginePool<E>>, engine: E) -> Self {
        Self {
            pool,
            engine: Mutex::new(Some(engine)),
        }
    }

    /// Returns true once the reader has been closed.
    pub fn is_closed(&self) -> bool {
        lock_or_recover(&self.engine).is_none()
    }

    /// Closes the engine and returns it to the pool.
    ///
    /// The engine goes back to the pool even if its own close fails; that
    /// error is still reported. Closing an already closed reader succeeds.
    pub fn close(&self) -> io::Result<()> {
        let mut slot = lock_or_recover(&self.engine);
        match slot.take() {
            Some(mut engine) => {
                let result = engine.close();
                self.pool.release(engine);
                result
            }
            None => Ok(()),
        }
    }

    fn read_engine(&self, buf: &mut [u8]) -> io::Result<usize> {
        let mut slot = lock_or_recover(&self.engine);
        match slot.as_mut() {
            Some(engine) => engine.read(buf),
            None => Err(Error::ReadAfterClose.into()),
        }
    }

    #[cfg(test)]
    pub(crate) fn with_engine<T>(&self, f: impl FnOnce(&E) -> T) -> Option<T> {
        lock_or_recover(&self.engine).as_ref().map(f)
    }
}

impl<E: Engine> Read for PooledReader<E> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_engine(buf)
    }
}

impl<E: Engine> Read for &PooledReader<E> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.read_engine(buf)
    }
}

impl<E: Engine> Decoder for PooledReader<E> {
    fn method(&self) -> u16 {
        E::METHOD
    }

    fn close(&mut self) -> io::Result<()> {
        PooledReader::close(self)
    }
}

impl<E: Engine> Drop for PooledReader<E> {
    fn drop(&mut self) {
        let slot = self
            .engine
            .get_mut()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(mut engine) = slot.take() {
            if let Err(e) = engine.close() {
                log::debug!("Ignoring close failure of dropped reader: {}", e);
            }
            self.pool.release(engine);
        }
    }
}
