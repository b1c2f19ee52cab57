//! Compression envelope around the playlist blob.
//!
//! Decompression streams in chunks and aborts the moment output would pass
//! the ceiling, so a crafted blob from the chain or a gateway cannot expand
//! into memory exhaustion.

use std::io::Read;

use crate::errors::Error;

/// Ceiling on compressed payloads accepted from the chain or a gateway.
pub const MAX_COMPRESSED_LEN: usize = 10 * 1024 * 1024;

/// Ceiling on decompressed output.
pub const MAX_DECOMPRESSED_LEN: usize = 50 * 1024 * 1024;

const ZSTD_LEVEL: i32 = 3;

const CHUNK_LEN: usize = 16 * 1024;

pub fn compress(bytes: &[u8]) -> Result<Vec<u8>, Error> {
    Ok(zstd::encode_all(bytes, ZSTD_LEVEL)?)
}

/// Decompress with a hard output bound.
///
/// Fails with a distinct oversize error rather than truncating; partial
/// output is never returned.
pub fn decompress(bytes: &[u8], max_len: usize) -> Result<Vec<u8>, Error> {
    let mut decoder = zstd::stream::read::Decoder::new(bytes)?;
    let mut output = Vec::new();
    let mut chunk = vec![0u8; CHUNK_LEN];

    loop {
        let read = decoder.read(&mut chunk)?;
        if read == 0 {
            break;
        }

        if output.len() + read > max_len {
            return Err(Error::DecompressedTooLarge(max_len));
        }

        output.extend_from_slice(&chunk[..read]);
    }

    Ok(output)
}
