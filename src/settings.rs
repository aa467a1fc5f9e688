//! Compression settings passed to write-side codec factories.
//!
//! This module provides [`CompressionSettings`] and the deflate-specific
//! [`FlateSettings`], together with the two named presets.
//!
//! Settings are plain `Copy` values: build one, [`validate`] it, then hand
//! it to a compressor factory. Factories trust their input and do not
//! re-validate.
//!
//! # Example
//!
//! ```rust
//! use zipcodec::CompressionSettings;
//!
//! // Default preset (level -1, 256 KiB blocks, 16 blocks)
//! let settings = CompressionSettings::default();
//! assert!(settings.validate().is_ok());
//!
//! // Tuned for a memory-constrained writer
//! let settings = CompressionSettings::default()
//!     .level(4)
//!     .block_size(64 * 1024)
//!     .blocks(2);
//! assert!(settings.validate().is_ok());
//! ```
//!
//! [`validate`]: CompressionSettings::validate

/// Lowest accepted deflate level (Huffman-only mode).
pub const MIN_LEVEL: i32 = -2;

/// Highest accepted deflate level (best compression).
pub const MAX_LEVEL: i32 = 9;

/// Level selecting the algorithm's default trade-off.
pub const DEFAULT_LEVEL: i32 = -1;

/// Level selecting Huffman-only encoding.
pub const HUFFMAN_ONLY_LEVEL: i32 = -2;

/// Block sizes at or below this value are rejected.
pub const MIN_BLOCK_SIZE: usize = 16 * 1024;

/// Block size of the default preset.
pub const DEFAULT_BLOCK_SIZE: usize = 256 * 1024; // 256 KiB

/// Block count of both presets.
pub const DEFAULT_BLOCKS: usize = 16;

/// A field of [`FlateSettings`] that is out of range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// `level` is outside `[-2, 9]`.
    #[error("flate settings: level must be within [-2,9], was {0}")]
    Level(i32),
    /// `blocks` is zero.
    #[error("flate settings: blocks must be at least 1, was {0}")]
    Blocks(usize),
    /// `block_size` is not above the 16 KiB minimum.
    #[error("flate settings: block size must be greater than 16384, was {0}")]
    BlockSize(usize),
}

/// Deflate parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlateSettings {
    /// Compression level in `[-2, 9]`.
    ///
    /// `0`-`9` trade speed for ratio; `-1` is the default level and `-2`
    /// selects Huffman-only encoding.
    pub level: i32,
    /// Bytes per independently compressed block.
    pub block_size: usize,
    /// Number of blocks compressed concurrently.
    pub blocks: usize,
}

impl FlateSettings {
    /// Checks `level`, then `blocks`, then `block_size`, and reports the
    /// first field that is out of range.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(MIN_LEVEL..=MAX_LEVEL).contains(&self.level) {
            return Err(SettingsError::Level(self.level));
        }
        if self.blocks == 0 {
            return Err(SettingsError::Blocks(self.blocks));
        }
        // The minimum itself is rejected as well.
        if self.block_size <= MIN_BLOCK_SIZE {
            return Err(SettingsError::BlockSize(self.block_size));
        }
        Ok(())
    }
}

/// Settings handed to compressor factories.
///
/// Only deflate has tunables today; other codecs receive the value and may
/// ignore it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompressionSettings {
    /// Deflate parameters.
    pub flate: FlateSettings,
}

const DEFAULT_SETTINGS: CompressionSettings = CompressionSettings {
    flate: FlateSettings {
        level: DEFAULT_LEVEL,
        block_size: DEFAULT_BLOCK_SIZE,
        blocks: DEFAULT_BLOCKS,
    },
};

const BEST_SETTINGS: CompressionSettings = CompressionSettings {
    flate: FlateSettings {
        level: MAX_LEVEL,
        block_size: 16 * 1024 * 1024, // 16 MiB
        blocks: DEFAULT_BLOCKS,
    },
};

impl Default for CompressionSettings {
    /// The default preset: level -1, 256 KiB blocks, 16 blocks.
    fn default() -> Self {
        DEFAULT_SETTINGS
    }
}

impl CompressionSettings {
    /// Creates settings from the default preset.
    pub fn new() -> Self {
        Self::default()
    }

    /// The best-compression preset: level 9, 16 MiB blocks, 16 blocks.
    pub fn best() -> Self {
        BEST_SETTINGS
    }

    /// Sets the deflate level.
    pub fn level(mut self, level: i32) -> Self {
        self.flate.level = level;
        self
    }

    /// Sets the deflate block size in bytes.
    pub fn block_size(mut self, block_size: usize) -> Self {
        self.flate.block_size = block_size;
        self
    }

    /// Sets the number of concurrently compressed deflate blocks.
    pub fn blocks(mut self, blocks: usize) -> Self {
        self.flate.blocks = blocks;
        self
    }

    /// Validates every codec's parameters.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] naming the first out-of-range field.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.flate.validate()
    }
}

/// Returns a copy of the default preset.
pub fn default_compression_settings() -> CompressionSettings {
    DEFAULT_SETTINGS
}

/// Returns a copy of the best-compression preset.
pub fn best_compression_settings() -> CompressionSettings {
    BEST_SETTINGS
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_are_valid() {
        assert_eq!(default_compression_settings().validate(), Ok(()));
        assert_eq!(best_compression_settings().validate(), Ok(()));
    }

    #[test]
    fn test_preset_values() {
        let default = CompressionSettings::default();
        assert_eq!(default.flate.level, -1);
        assert_eq!(default.flate.block_size, 256 * 1024);
        assert_eq!(default.flate.blocks, 16);

        let best = CompressionSettings::best();
        assert_eq!(best.flate.level, 9);
        assert_eq!(best.flate.block_size, 16 * 1024 * 1024);
        assert_eq!(best.flate.blocks, 16);
    }

    #[test]
    fn test_preset_copies_are_independent() {
        let mut mine = default_compression_settings();
        mine.flate.level = 3;
        mine.flate.blocks = 1;
        assert_ne!(mine, default_compression_settings());
        assert_eq!(default_compression_settings(), CompressionSettings::default());
        assert_eq!(default_compression_settings().flate.level, -1);
    }

    #[test]
    fn test_validation_order() {
        // Every field is wrong; level is reported first.
        let settings = CompressionSettings::default().level(10).blocks(0).block_size(1);
        assert_eq!(settings.validate(), Err(SettingsError::Level(10)));

        let settings = settings.level(0);
        assert_eq!(settings.validate(), Err(SettingsError::Blocks(0)));

        let settings = settings.blocks(1);
        assert_eq!(settings.validate(), Err(SettingsError::BlockSize(1)));
    }

    #[test]
    fn test_block_size_boundary() {
        let settings = CompressionSettings::default();
        assert_eq!(
            settings.block_size(16384).validate(),
            Err(SettingsError::BlockSize(16384))
        );
        assert_eq!(settings.block_size(16385).validate(), Ok(()));
    }

    #[test]
    fn test_level_boundaries() {
        let settings = CompressionSettings::default();
        assert!(settings.level(-2).validate().is_ok());
        assert!(settings.level(9).validate().is_ok());
        assert_eq!(settings.level(-3).validate(), Err(SettingsError::Level(-3)));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            SettingsError::Level(12).to_string(),
            "flate settings: level must be within [-2,9], was 12"
        );
        assert_eq!(
            SettingsError::BlockSize(100).to_string(),
            "flate settings: block size must be greater than 16384, was 100"
        );
    }
}
