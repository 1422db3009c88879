//! Stateless byte-range reads over a file, with decode fallback,
//! newline normalization and line-boundary trimming.

mod cache;
mod encoding;

use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;

use tracing::debug;

use crate::error::LeapError;

pub use cache::{ChunkKey, ReadCache, CACHE_CAPACITY};
pub use encoding::{decode_chunk, normalize_newlines};

/// Where a chunk request's offset is anchored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SeekOrigin {
    /// Offset from the start of the file (must be >= 0)
    Start,
    /// Offset from the end of the file (must be <= 0)
    End,
    /// Offset relative to the current position of a fresh handle
    Current,
}

/// A chunk request: an offset relative to an origin, with an optional byte cap
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkSpec {
    pub offset: i64,
    pub origin: SeekOrigin,
    /// `None` reads to end of file
    pub len: Option<u64>,
}

impl ChunkSpec {
    pub fn start(offset: u64, len: Option<u64>) -> Self {
        Self {
            offset: offset as i64,
            origin: SeekOrigin::Start,
            len,
        }
    }

    pub fn end(offset: i64, len: Option<u64>) -> Self {
        Self {
            offset,
            origin: SeekOrigin::End,
            len,
        }
    }

    #[allow(dead_code)]
    pub fn current(offset: i64, len: Option<u64>) -> Self {
        Self {
            offset,
            origin: SeekOrigin::Current,
            len,
        }
    }
}

/// Reads bounded byte ranges from a file and memoizes the decoded text.
pub struct ChunkReader {
    cache: ReadCache,
}

impl ChunkReader {
    pub fn new() -> Self {
        Self {
            cache: ReadCache::new(),
        }
    }

    /// Forget every memoized chunk; required when the target file changes
    pub fn invalidate(&mut self) {
        self.cache.clear();
    }

    /// Read `spec` from `path`, returning decoded, newline-normalized,
    /// boundary-trimmed text. An identical repeat request is served from the
    /// cache without touching the filesystem.
    pub fn read(&mut self, path: &Path, spec: ChunkSpec) -> Result<String, LeapError> {
        let key = ChunkKey {
            path: path.to_path_buf(),
            offset: spec.offset,
            origin: spec.origin,
            len: spec.len,
        };
        if let Some(text) = self.cache.get(&key) {
            debug!(?spec, "chunk served from cache");
            return Ok(text);
        }
        let text = read_uncached(path, spec)?;
        self.cache.put(key, text.clone());
        Ok(text)
    }
}

impl Default for ChunkReader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_uncached(path: &Path, spec: ChunkSpec) -> Result<String, LeapError> {
    let seek_from = match spec.origin {
        SeekOrigin::Start if spec.offset >= 0 => SeekFrom::Start(spec.offset as u64),
        SeekOrigin::End if spec.offset <= 0 => SeekFrom::End(spec.offset),
        SeekOrigin::Current => SeekFrom::Current(spec.offset),
        origin => {
            return Err(LeapError::InvalidSeek {
                origin,
                offset: spec.offset,
            })
        }
    };

    let io_err = |source| LeapError::Io {
        source,
        path: path.to_path_buf(),
    };

    let mut file = File::open(path).map_err(io_err)?;
    file.seek(seek_from).map_err(io_err)?;

    let mut raw = Vec::new();
    match spec.len {
        Some(n) => {
            file.take(n).read_to_end(&mut raw).map_err(io_err)?;
        }
        None => {
            file.read_to_end(&mut raw).map_err(io_err)?;
        }
    }
    debug!(?spec, bytes = raw.len(), "chunk read");

    let text = normalize_newlines(decode_chunk(raw));
    Ok(trim_boundary(text, spec.origin))
}

/// Apply the boundary policy. An End-anchored read almost never lands on a
/// line boundary, so its possibly partial first line is dropped; a
/// Current-anchored read drops its possibly partial trailing line;
/// Start-anchored reads are index-aligned and kept whole.
fn trim_boundary(text: String, origin: SeekOrigin) -> String {
    match origin {
        SeekOrigin::Start => text,
        SeekOrigin::End => match text.find('\n') {
            Some(pos) => text[pos + 1..].to_string(),
            None => String::new(),
        },
        SeekOrigin::Current => match text.rfind('\n') {
            Some(pos) => text[..pos + 1].to_string(),
            None => String::new(),
        },
    }
}
