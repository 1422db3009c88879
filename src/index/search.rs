use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

use super::CancelFlag;

/// Maximum distinct lines recorded per token. On reaching the cap a token
/// joins the do-not-index set and stops growing; near-stop-words would
/// otherwise dominate the index.
pub const SEARCH_CAP: usize = 50;

/// Token characters: alphanumerics plus apostrophes and hyphens
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}'-]+").unwrap());

/// Inverted index from token to the 0-based line numbers containing it.
/// Entries hold at most [`SEARCH_CAP`] lines; a capped token keeps the lines
/// collected so far and is never indexed again for this file.
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    entries: HashMap<String, Vec<u64>>,
    capped: HashSet<String>,
}

impl SearchIndex {
    /// Case-sensitive exact lookup. A missing term yields an empty slice.
    pub fn lookup(&self, term: &str) -> &[u64] {
        self.entries.get(term).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `term` stopped being indexed after reaching the cap
    #[allow(dead_code)]
    pub fn is_capped(&self, term: &str) -> bool {
        self.capped.contains(term)
    }

    pub fn token_count(&self) -> usize {
        self.entries.len()
    }

    fn record(&mut self, token: &str, line: u64) {
        if self.capped.contains(token) {
            return;
        }
        let entry = self.entries.entry(token.to_string()).or_default();
        // The scan is line-ordered, so a duplicate can only be the last entry
        if entry.last() == Some(&line) {
            return;
        }
        entry.push(line);
        if entry.len() >= SEARCH_CAP {
            self.capped.insert(token.to_string());
        }
    }
}

/// Scan `path` once, building the inverted index. Returns `Ok(None)` when
/// cancelled.
pub fn build_search_index(path: &Path, cancel: &CancelFlag) -> io::Result<Option<SearchIndex>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut index = SearchIndex::default();
    let mut buf = Vec::new();
    let mut line: u64 = 0;
    loop {
        if cancel.is_cancelled() {
            debug!("search index build cancelled");
            return Ok(None);
        }
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let text = String::from_utf8_lossy(&buf);
        for token in TOKEN_RE.find_iter(&text) {
            index.record(token.as_str(), line);
        }
        line += 1;
    }
    debug!(
        tokens = index.entries.len(),
        capped = index.capped.len(),
        "search index built"
    );
    Ok(Some(index))
}
