//! Error types for codec registration, configuration and stream handling.
//!
//! This module provides the [`Error`] enum which represents all failure
//! modes of the codec layer, along with a convenient [`Result<T>`] alias.
//!
//! # Error Handling
//!
//! Fallible operations return `Result<T, Error>`. Stream handles produced by
//! codecs implement [`std::io::Read`] / [`std::io::Write`] and therefore
//! report failures as [`std::io::Error`]; when the codec layer itself is the
//! source of such a failure the `io::Error` wraps an [`Error`] that can be
//! recovered with [`std::io::Error::get_ref`] and `downcast_ref`.
//!
//! ```rust
//! use zipcodec::{CodecRegistry, Error, method};
//!
//! let registry = CodecRegistry::new();
//! let mut out = Vec::new();
//! match registry.encoder(method::ZSTD, &Default::default(), Box::new(&mut out)) {
//!     Err(Error::UnsupportedMethod { method }) => {
//!         println!("compression method {} is not available", method);
//!     }
//!     Err(e) => println!("error: {}", e),
//!     Ok(_) => unreachable!(),
//! }
//! ```

use std::io;

use crate::settings::SettingsError;

/// Which of the two independent codec tables a registration targeted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodecKind {
    /// Write side (compressors).
    Compressor,
    /// Read side (decompressors).
    Decompressor,
}

impl std::fmt::Display for CodecKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Compressor => write!(f, "compressor"),
            Self::Decompressor => write!(f, "decompressor"),
        }
    }
}

/// The main error type of the codec layer.
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | I/O | [`Io`][Self::Io] | Underlying sink/source or codec failure |
/// | Configuration | [`InvalidSettings`][Self::InvalidSettings] | Out-of-range compression parameters |
/// | Compatibility | [`UnsupportedMethod`][Self::UnsupportedMethod] | No codec registered for a method id |
/// | Wiring | [`DuplicateRegistration`][Self::DuplicateRegistration] | Same method id registered twice |
/// | Usage | [`ReadAfterClose`][Self::ReadAfterClose] | Reading a released decoder |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error from the wrapped sink, source or compression engine.
    ///
    /// These are passed through unmodified.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Compression settings failed validation.
    ///
    /// Returned by [`CompressionSettings::validate`]. Codec construction
    /// never re-validates, so callers are expected to check first.
    ///
    /// [`CompressionSettings::validate`]: crate::CompressionSettings::validate
    #[error("Invalid compression settings: {0}")]
    InvalidSettings(#[from] SettingsError),

    /// No codec is registered for the requested method id.
    ///
    /// Method `0` (Store) and `8` (Deflate) are always available; anything
    /// else has to be registered by the application first.
    #[error("Unsupported compression method: {method} ({})", crate::codec::method::name(*.method))]
    UnsupportedMethod {
        /// The method id that has no codec.
        method: u16,
    },

    /// A codec was registered twice for the same method id.
    ///
    /// This signals a wiring mistake. [`CodecRegistry::register_compressor`]
    /// and [`CodecRegistry::register_decompressor`] panic instead of
    /// returning it; only the `try_` variants surface it as a value.
    ///
    /// [`CodecRegistry::register_compressor`]: crate::CodecRegistry::register_compressor
    /// [`CodecRegistry::register_decompressor`]: crate::CodecRegistry::register_decompressor
    #[error("{kind} already registered for method {method}")]
    DuplicateRegistration {
        /// Which table already holds the method.
        kind: CodecKind,
        /// The duplicated method id.
        method: u16,
    },

    /// A pooled decoder was read after it had been closed.
    ///
    /// The engine behind the handle has already gone back to the pool, so
    /// this is a caller bug. It is distinct from end-of-stream.
    #[error("Read after close")]
    ReadAfterClose,
}

impl Error {
    /// Returns true if the caller can reasonably continue after this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::DuplicateRegistration { .. })
    }

    /// Returns true if an `io::Error` produced by a stream handle reports a
    /// read on an already closed decoder.
    pub fn is_read_after_close(err: &io::Error) -> bool {
        err.get_ref()
            .and_then(|inner| inner.downcast_ref::<Error>())
            .is_some_and(|e| matches!(e, Error::ReadAfterClose))
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(e) => e,
            Error::ReadAfterClose => io::Error::other(err),
            Error::InvalidSettings(_) => io::Error::new(io::ErrorKind::InvalidInput, err),
            Error::UnsupportedMethod { .. } => io::Error::new(io::ErrorKind::Unsupported, err),
            Error::DuplicateRegistration { .. } => io::Error::new(io::ErrorKind::AlreadyExists, err),
        }
    }
}

/// A specialized Result type for codec operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_method_display() {
        let err = Error::UnsupportedMethod { method: 14 };
        assert_eq!(err.to_string(), "Unsupported compression method: 14 (LZMA)");
    }

    #[test]
    fn test_duplicate_registration_display() {
        let err = Error::DuplicateRegistration {
            kind: CodecKind::Decompressor,
            method: 99,
        };
        assert_eq!(err.to_string(), "decompressor already registered for method 99");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_read_after_close_roundtrips_through_io_error() {
        let io_err: io::Error = Error::ReadAfterClose.into();
        assert!(Error::is_read_after_close(&io_err));
        assert_eq!(io_err.kind(), io::ErrorKind::Other);
    }

    #[test]
    fn test_plain_io_error_is_not_read_after_close() {
        let io_err = io::Error::new(io::ErrorKind::UnexpectedEof, "eof");
        assert!(!Error::is_read_after_close(&io_err));
        let wrapped: io::Error = Error::Io(io_err).into();
        assert_eq!(wrapped.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[test]
    fn test_settings_error_converts() {
        let err: Error = SettingsError::Blocks(0).into();
        assert!(matches!(err, Error::InvalidSettings(SettingsError::Blocks(0))));
        assert!(err.is_recoverable());
    }
}
