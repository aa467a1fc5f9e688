//! Store codec (no compression).

use std::io::{self, Read, Write};

use super::{Decoder, Encoder, Sink, Source, method};

/// An encoder that writes data through unchanged.
pub struct StoreEncoder<'a> {
    sink: Sink<'a>,
}

impl std::fmt::Debug for StoreEncoder<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreEncoder").finish_non_exhaustive()
    }
}

impl<'a> StoreEncoder<'a> {
    /// Creates a new store encoder writing to `sink`.
    pub fn new(sink: Sink<'a>) -> Self {
        Self { sink }
    }
}

impl Write for StoreEncoder<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.sink.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.sink.flush()
    }
}

impl Encoder for StoreEncoder<'_> {
    fn method(&self) -> u16 {
        method::STORE
    }

    fn finish(mut self: Box<Self>) -> io::Result<()> {
        self.sink.flush()
    }
}

/// A decoder that reads data through unchanged.
///
/// Closing does not release the source; the source is dropped with the
/// decoder.
pub struct StoreDecoder {
    inner: Source,
}

impl std::fmt::Debug for StoreDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreDecoder").finish_non_exhaustive()
    }
}

impl StoreDecoder {
    /// Creates a new store decoder reading from `inner`.
    pub fn new(inner: Source) -> Self {
        Self { inner }
    }
}

impl Read for StoreDecoder {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl Decoder for StoreDecoder {
    fn method(&self) -> u16 {
        method::STORE
    }

    fn close(&mut self) -> io::Result<()> {
        Ok(())
    }
}
