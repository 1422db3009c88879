//! Session state and the navigation operations: open a file, jump to the
//! first or last chunk, go to an arbitrary line, search for a term. One
//! synchronous bounded read per operation; everything expensive happens in
//! the background builders.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::LeapError;
use crate::index::{
    build_line_index, build_search_index, count_lines, BuilderHandle, SearchIndex, SparseLineIndex,
};
use crate::reader::{ChunkReader, ChunkSpec};

/// Bytes fetched per navigation read (2 MiB)
pub const DEFAULT_CHUNK_SIZE: u64 = 2 * 1024 * 1024;

/// Line-index granularity in lines
pub const DEFAULT_LINE_CHUNK: u64 = 10_000;

/// Caller-tunable knobs for a navigation session
#[derive(Debug, Clone, Copy)]
pub struct NavConfig {
    pub chunk_size: u64,
    pub line_chunk: u64,
}

impl Default for NavConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            line_chunk: DEFAULT_LINE_CHUNK,
        }
    }
}

/// Total line count: a fast heuristic first, the scan-derived value once the
/// counter lands. Exact permanently supersedes Estimated within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineCount {
    Estimated(u64),
    Exact(u64),
}

#[allow(dead_code)]
impl LineCount {
    pub fn value(self) -> u64 {
        match self {
            LineCount::Estimated(n) | LineCount::Exact(n) => n,
        }
    }

    pub fn is_exact(self) -> bool {
        matches!(self, LineCount::Exact(_))
    }
}

/// Outcome of a `goto_line` request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GotoResult {
    pub text: String,
    /// 0-based number of the first line of the returned text
    pub start_line: u64,
    /// Lines to move down from `start_line` to land on the requested line;
    /// interactive callers use this for cursor placement. At exact block
    /// multiples this is -1 (the target sits one line above the block
    /// start); callers clamp to the top of the chunk.
    #[allow(dead_code)]
    pub cursor_offset: i64,
    /// The 1-based line actually used after clamping into range
    #[allow(dead_code)]
    pub line: u64,
}

/// Everything derived from the currently open file. Replaced wholesale on a
/// new open; dropping it cancels any still-running builders.
struct Session {
    path: PathBuf,
    file_len: u64,
    current_start_line: u64,
    estimated_lines: Option<u64>,
    exact_lines: Option<u64>,
    line_index: Option<SparseLineIndex>,
    search_index: Option<SearchIndex>,
    index_builder: Option<BuilderHandle<SparseLineIndex>>,
    count_builder: Option<BuilderHandle<u64>>,
    search_builder: Option<BuilderHandle<SearchIndex>>,
}

impl Session {
    fn total_lines(&self) -> Option<u64> {
        self.exact_lines.or(self.estimated_lines)
    }
}

/// Orchestrates the chunk reader and the three background builders to answer
/// first/last/goto/search requests in roughly constant time regardless of
/// file size.
pub struct Navigator {
    config: NavConfig,
    reader: ChunkReader,
    session: Option<Session>,
}

impl Navigator {
    pub fn new(config: NavConfig) -> Self {
        let config = NavConfig {
            chunk_size: config.chunk_size.max(1),
            line_chunk: config.line_chunk.max(1),
        };
        Self {
            config,
            reader: ChunkReader::new(),
            session: None,
        }
    }

    /// Open `path`: cancel builders for any previous file, reset all derived
    /// state, read the first chunk synchronously, estimate the line count,
    /// then launch the three background builders. Returns the first chunk.
    pub fn open(&mut self, path: &Path) -> Result<String, LeapError> {
        // Dropping the old session sets every builder's cancel flag
        self.session = None;
        self.reader.invalidate();

        let file_len = fs::metadata(path)
            .map(|m| m.len())
            .map_err(|source| LeapError::Io {
                source,
                path: path.to_path_buf(),
            })?;
        info!(path = %path.display(), file_len, "opening file");

        let spec = ChunkSpec::start(0, Some(file_len.min(self.config.chunk_size)));
        let text = self.reader.read(path, spec)?;

        let estimated_lines = estimate_lines(&text, file_len);
        match estimated_lines {
            Some(n) => debug!(estimated = n, "line count estimated"),
            None => debug!("fewer than two lines in the first chunk, no estimate"),
        }

        let line_chunk = self.config.line_chunk;
        let index_path = path.to_path_buf();
        let count_path = path.to_path_buf();
        let search_path = path.to_path_buf();
        self.session = Some(Session {
            path: path.to_path_buf(),
            file_len,
            current_start_line: 0,
            estimated_lines,
            exact_lines: None,
            line_index: None,
            search_index: None,
            index_builder: Some(BuilderHandle::spawn("line-index", move |cancel| {
                build_line_index(&index_path, line_chunk, cancel)
            })),
            count_builder: Some(BuilderHandle::spawn("line-count", move |cancel| {
                count_lines(&count_path, cancel)
            })),
            search_builder: Some(BuilderHandle::spawn("search-index", move |cancel| {
                build_search_index(&search_path, cancel)
            })),
        });
        Ok(text)
    }

    /// Re-read the first chunk and reset the viewport to the top
    pub fn load_first(&mut self) -> Result<String, LeapError> {
        let session = self.session.as_mut().ok_or(LeapError::NoFile)?;
        let spec = ChunkSpec::start(0, Some(session.file_len.min(self.config.chunk_size)));
        let text = self.reader.read(&session.path, spec)?;
        session.current_start_line = 0;
        debug!("first chunk loaded");
        Ok(text)
    }

    /// Load the chunk at the end of the file. The line number of the first
    /// returned line is derived from the best available total.
    pub fn load_last(&mut self) -> Result<String, LeapError> {
        self.poll();
        let session = self.session.as_mut().ok_or(LeapError::NoFile)?;
        let chunk = self.config.chunk_size;
        let spec = if session.file_len >= chunk {
            ChunkSpec::end(-(chunk as i64), Some(chunk))
        } else {
            ChunkSpec::start(0, None)
        };
        let text = self.reader.read(&session.path, spec)?;

        let lines_in_text = text.lines().count() as u64;
        let total = session.total_lines().unwrap_or(0);
        session.current_start_line = total.saturating_sub(lines_in_text);
        debug!(
            start_line = session.current_start_line,
            lines_in_text, "last chunk loaded"
        );
        Ok(text)
    }

    /// Jump to 1-based line `n`. Out-of-range values are clamped silently.
    /// Requires the sparse line index.
    pub fn goto_line(&mut self, n: u64) -> Result<GotoResult, LeapError> {
        self.poll();
        let session = self.session.as_mut().ok_or(LeapError::NoFile)?;
        let index = session.line_index.as_ref().ok_or(LeapError::IndexNotReady {
            what: "line index",
        })?;

        let total = session.total_lines().unwrap_or(0);
        let line = n.min(total);
        if line != n {
            debug!(requested = n, clamped = line, total, "goto out of range, clamped");
        }

        let (block_key, offset) = index.resolve_block(line);
        let spec = ChunkSpec::start(offset, Some(self.config.chunk_size));
        let text = self.reader.read(&session.path, spec)?;
        session.current_start_line = block_key;

        let cursor_offset = (line % self.config.line_chunk) as i64 - 1;
        debug!(line, block_key, cursor_offset, "goto resolved");
        Ok(GotoResult {
            text,
            start_line: block_key,
            cursor_offset,
            line,
        })
    }

    /// Exact-term lookup against the inverted index; 0-based line numbers.
    /// Requires the search index.
    pub fn search(&mut self, term: &str) -> Result<Vec<u64>, LeapError> {
        self.poll();
        let session = self.session.as_ref().ok_or(LeapError::NoFile)?;
        let index = session
            .search_index
            .as_ref()
            .ok_or(LeapError::IndexNotReady {
                what: "search index",
            })?;
        Ok(index.lookup(term).to_vec())
    }

    /// Drain any builder results that have arrived and flip the matching
    /// ready flags. Cheap; event-loop callers invoke this every tick.
    pub fn poll(&mut self) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if let Some(handle) = &session.index_builder {
            if let Some(index) = handle.try_take() {
                debug!(entries = index.len(), "line index ready");
                session.line_index = Some(index);
                session.index_builder = None;
            }
        }
        if let Some(handle) = &session.count_builder {
            if let Some(count) = handle.try_take() {
                debug!(count, "exact line count ready");
                session.exact_lines = Some(count);
                session.count_builder = None;
            }
        }
        if let Some(handle) = &session.search_builder {
            if let Some(index) = handle.try_take() {
                debug!(tokens = index.token_count(), "search index ready");
                session.search_index = Some(index);
                session.search_builder = None;
            }
        }
    }

    /// Block until the line index is ready; for callers without an event loop
    pub fn wait_for_line_index(&mut self) -> Result<(), LeapError> {
        let session = self.session.as_mut().ok_or(LeapError::NoFile)?;
        if session.line_index.is_some() {
            return Ok(());
        }
        match session.index_builder.take().and_then(|h| h.wait()) {
            Some(index) => {
                session.line_index = Some(index);
                Ok(())
            }
            None => Err(LeapError::IndexNotReady { what: "line index" }),
        }
    }

    /// Block until the exact line count is ready
    pub fn wait_for_exact_count(&mut self) -> Result<u64, LeapError> {
        let session = self.session.as_mut().ok_or(LeapError::NoFile)?;
        if let Some(count) = session.exact_lines {
            return Ok(count);
        }
        match session.count_builder.take().and_then(|h| h.wait()) {
            Some(count) => {
                session.exact_lines = Some(count);
                Ok(count)
            }
            None => Err(LeapError::IndexNotReady { what: "line count" }),
        }
    }

    /// Block until the search index is ready
    pub fn wait_for_search_index(&mut self) -> Result<(), LeapError> {
        let session = self.session.as_mut().ok_or(LeapError::NoFile)?;
        if session.search_index.is_some() {
            return Ok(());
        }
        match session.search_builder.take().and_then(|h| h.wait()) {
            Some(index) => {
                session.search_index = Some(index);
                Ok(())
            }
            None => Err(LeapError::IndexNotReady { what: "search index" }),
        }
    }

    /// Best available line count, exact preferred
    pub fn line_count(&self) -> Option<LineCount> {
        let session = self.session.as_ref()?;
        session
            .exact_lines
            .map(LineCount::Exact)
            .or(session.estimated_lines.map(LineCount::Estimated))
    }

    /// 0-based line number of the first currently displayed line
    pub fn current_start_line(&self) -> u64 {
        self.session
            .as_ref()
            .map(|s| s.current_start_line)
            .unwrap_or(0)
    }

    #[allow(dead_code)]
    pub fn file_len(&self) -> Option<u64> {
        self.session.as_ref().map(|s| s.file_len)
    }

    /// Sub-flags for event-loop callers that disable controls until the
    /// matching builder has delivered
    #[allow(dead_code)]
    pub fn index_ready(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.line_index.is_some())
    }

    #[allow(dead_code)]
    pub fn count_ready(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.exact_lines.is_some())
    }

    #[allow(dead_code)]
    pub fn search_ready(&self) -> bool {
        self.session
            .as_ref()
            .is_some_and(|s| s.search_index.is_some())
    }
}

/// Estimate the total line count from the first chunk: byte length of the
/// second line (plus two bytes for a CRLF terminator) divided into the file
/// length, floored. Unavailable for files with fewer than two lines in the
/// chunk.
fn estimate_lines(first_chunk: &str, file_len: u64) -> Option<u64> {
    let mut lines = first_chunk.split('\n');
    lines.next()?;
    let sample = lines.next()?;
    // The empty remainder after a single trailing newline is not a line
    if sample.is_empty() && lines.next().is_none() {
        return None;
    }
    Some(file_len / (sample.len() as u64 + 2))
}
