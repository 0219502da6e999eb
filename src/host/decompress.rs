//! Streaming decompression of build artifacts

use std::io::{self, Read};

/// Measures the decompressed size of a compressed stream
pub trait Decompressor {
    /// Decompress `input` to completion, discarding output, and return the byte count
    fn decompressed_size(&self, input: &mut dyn Read) -> io::Result<u64>;
}

impl<D: Decompressor + ?Sized> Decompressor for &D {
    fn decompressed_size(&self, input: &mut dyn Read) -> io::Result<u64> {
        (**self).decompressed_size(input)
    }
}

/// Brotli decompressor for `.br` artifacts
#[derive(Debug, Clone, Copy, Default)]
pub struct BrotliDecompressor;

const BUFFER_SIZE: usize = 4096;

impl Decompressor for BrotliDecompressor {
    fn decompressed_size(&self, input: &mut dyn Read) -> io::Result<u64> {
        let mut reader = brotli::Decompressor::new(input, BUFFER_SIZE);
        io::copy(&mut reader, &mut io::sink())
    }
}
