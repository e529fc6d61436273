//! Hasher (C3): two-level content fingerprint over a file handle.
//!
//! `hash_quick` is a bloom-style pre-filter — size plus the first/last
//! `QUICK_SAMPLE` bytes — cheap enough to run on every candidate. `hash_full`
//! streams the entire file through the same algorithm (xxh64) so the two are
//! interchangeable for files at or below [`HashingConsts::SMALL_FILE_THRESHOLD`].

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use xxhash_rust::xxh64::Xxh64;

use crate::cancel::CancelToken;
use crate::config::HashingConsts;

const SEED: u64 = 0;

/// Size + first/last [`HashingConsts::QUICK_SAMPLE`] bytes, hashed with
/// xxh64. Returns `None` on any IO error (spec.md §4.3: absent on IO error).
///
/// For files whose length is at or below `QUICK_SAMPLE`, the "last" window
/// is empty rather than seeking past EOF — this sketch degrades gracefully
/// to "hash the whole file" for small inputs, which is exactly the property
/// [`HashingConsts::SMALL_FILE_THRESHOLD`] promotion relies on.
pub fn hash_quick(path: &Path, size: u64) -> Option<u64> {
    let mut file = File::open(path).ok()?;
    let sample = HashingConsts::QUICK_SAMPLE as u64;

    let mut hasher = Xxh64::new(SEED);
    hasher.update(size.to_string().as_bytes());

    let mut head = vec![0u8; sample.min(size) as usize];
    read_exact_or_to_eof(&mut file, &mut head).ok()?;
    hasher.update(&head);

    if size > sample {
        let tail_len = sample.min(size) as usize;
        file.seek(SeekFrom::End(-(tail_len as i64))).ok()?;
        let mut tail = vec![0u8; tail_len];
        read_exact_or_to_eof(&mut file, &mut tail).ok()?;
        hasher.update(&tail);
    }

    Some(hasher.digest())
}

/// Reads until `buf` is full or EOF; a short read (e.g. a file that shrank
/// under us between `stat` and `open`) truncates `buf` rather than erroring.
fn read_exact_or_to_eof(file: &mut File, buf: &mut [u8]) -> std::io::Result<()> {
    let mut read = 0;
    while read < buf.len() {
        let n = file.read(&mut buf[read..])?;
        if n == 0 {
            break;
        }
        read += n;
    }
    Ok(())
}

/// Streams the entire file through xxh64 in [`HashingConsts::CHUNK_SIZE`]
/// chunks. Polls `cancel` between chunks; returns `None` if cancelled
/// mid-read or on any IO error — callers must not distinguish the two, per
/// spec.md §7's `PerFileIO` swallow policy (the dedup pipeline treats a
/// cancelled hash the same as a failed one and unwinds via its own
/// phase-level cancel check).
pub fn hash_full(path: &Path, cancel: &CancelToken) -> Option<u64> {
    let mut file = File::open(path).ok()?;
    let mut hasher = Xxh64::new(SEED);
    let mut buf = vec![0u8; HashingConsts::CHUNK_SIZE];
    loop {
        if cancel.is_cancelled() {
            return None;
        }
        let n = file.read(&mut buf).ok()?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Some(hasher.digest())
}
