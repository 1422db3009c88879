use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use super::CancelFlag;

/// Sparse mapping from block-boundary line numbers (multiples of the
/// granularity, always including 0) to the byte offset of that line's first
/// byte. A 10M-line file at granularity 10_000 holds ~1000 entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SparseLineIndex {
    entries: BTreeMap<u64, u64>,
    line_chunk: u64,
}

impl SparseLineIndex {
    /// Byte offset of the block starting at `block_key`, if present
    #[allow(dead_code)]
    pub fn offset_of(&self, block_key: u64) -> Option<u64> {
        self.entries.get(&block_key).copied()
    }

    /// Resolve a 1-based line number to `(block_key, byte_offset)` of the
    /// block that contains it. A request past the last recorded block falls
    /// back to the nearest preceding one, since a line-count estimate can
    /// overshoot the real file.
    pub fn resolve_block(&self, line: u64) -> (u64, u64) {
        let wanted = if line < self.line_chunk {
            0
        } else {
            (line / self.line_chunk) * self.line_chunk
        };
        self.entries
            .range(..=wanted)
            .next_back()
            .map(|(k, v)| (*k, *v))
            .unwrap_or((0, 0))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[allow(dead_code)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[allow(dead_code)]
    pub fn keys(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.keys().copied()
    }

    #[allow(dead_code)]
    pub fn line_chunk(&self) -> u64 {
        self.line_chunk
    }
}

/// Scan `path` once, recording the byte offset of every line whose 0-based
/// number is a multiple of `line_chunk`. Returns `Ok(None)` when cancelled.
pub fn build_line_index(
    path: &Path,
    line_chunk: u64,
    cancel: &CancelFlag,
) -> io::Result<Option<SparseLineIndex>> {
    let line_chunk = line_chunk.max(1);
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut entries = BTreeMap::new();
    let mut buf = Vec::new();
    let mut line: u64 = 0;
    let mut offset: u64 = 0;
    loop {
        if cancel.is_cancelled() {
            debug!("line index build cancelled");
            return Ok(None);
        }
        buf.clear();
        let read = reader.read_until(b'\n', &mut buf)?;
        if read == 0 {
            break;
        }
        if line % line_chunk == 0 {
            entries.insert(line, offset);
        }
        offset += read as u64;
        line += 1;
    }
    // An empty file still gets its zero entry
    entries.entry(0).or_insert(0);

    debug!(entries = entries.len(), lines = line, "line index built");
    Ok(Some(SparseLineIndex {
        entries,
        line_chunk,
    }))
}
