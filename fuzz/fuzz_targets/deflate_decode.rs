//! Fuzz target for the pooled deflate decoder with arbitrary byte input.
//!
//! Malformed streams must surface as I/O errors, never as panics, and a
//! recycled engine must keep working after decoding garbage.
//!
//! Run with: cargo +nightly fuzz run deflate_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use std::io::{Cursor, Read};
use std::sync::OnceLock;

use zipcodec::{CodecRegistry, EntryInfo, method};

static REGISTRY: OnceLock<CodecRegistry> = OnceLock::new();

fuzz_target!(|data: &[u8]| {
    let registry = REGISTRY.get_or_init(CodecRegistry::new);
    let entry = EntryInfo::new(method::DEFLATE);

    let Ok(mut decoder) = registry.decoder(Box::new(Cursor::new(data.to_vec())), &entry) else {
        return;
    };

    // Cap output so highly compressible inputs do not exhaust memory.
    let mut out = Vec::new();
    let _ = (&mut decoder).take(16 * 1024 * 1024).read_to_end(&mut out);
    let _ = decoder.close();
});
