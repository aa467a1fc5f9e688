//! Fuzz target checking that any input survives a deflate round-trip
//! under arbitrary (validated) settings.
//!
//! Run with: cargo +nightly fuzz run deflate_roundtrip

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::{Cursor, Read, Write};

use zipcodec::{CodecRegistry, CompressionSettings, EntryInfo, method};

fuzz_target!(|input: (i8, u16, u8, &[u8])| {
    let (level, block_kib, blocks, data) = input;
    let settings = CompressionSettings::default()
        .level(i32::from(level))
        .block_size(usize::from(block_kib) * 1024)
        .blocks(usize::from(blocks));
    if settings.validate().is_err() {
        return;
    }

    let registry = CodecRegistry::new();
    let mut compressed = Vec::new();
    {
        let mut encoder = registry
            .encoder(method::DEFLATE, &settings, Box::new(&mut compressed))
            .unwrap();
        encoder.write_all(data).unwrap();
        encoder.finish().unwrap();
    }

    let entry = EntryInfo::new(method::DEFLATE);
    let mut decoder = registry
        .decoder(Box::new(Cursor::new(compressed)), &entry)
        .unwrap();
    let mut out = Vec::new();
    decoder.read_to_end(&mut out).unwrap();
    decoder.close().unwrap();
    assert_eq!(out, data);
});
