use clap::Parser;
use std::path::PathBuf;

use crate::nav::{DEFAULT_CHUNK_SIZE, DEFAULT_LINE_CHUNK};

/// leap - navigate huge line-oriented text files without loading them
#[derive(Parser, Debug)]
#[command(name = "leap")]
#[command(version)]
#[command(about = "Jump around very large line-oriented text files: first/last chunk, goto line, term search")]
#[command(long_about = None)]
pub struct Args {
    /// Input file
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print the last chunk instead of the first
    #[arg(long = "last", conflicts_with_all = ["goto", "search", "count"])]
    pub last: bool,

    /// Jump to 1-based line N (waits for the line index)
    #[arg(
        short = 'g',
        long = "goto",
        value_name = "N",
        conflicts_with_all = ["search", "count"]
    )]
    pub goto: Option<u64>,

    /// Print the line numbers containing TERM (waits for the search index)
    #[arg(short = 's', long = "search", value_name = "TERM", conflicts_with = "count")]
    pub search: Option<String>,

    /// Wait for the exact line count and print it
    #[arg(short = 'c', long = "count")]
    pub count: bool,

    /// Bytes fetched per navigation read
    #[arg(long = "chunk-size", value_name = "BYTES", default_value_t = DEFAULT_CHUNK_SIZE)]
    pub chunk_size: u64,

    /// Line-index granularity in lines
    #[arg(long = "line-chunk", value_name = "N", default_value_t = DEFAULT_LINE_CHUNK)]
    pub line_chunk: u64,

    /// Prefix printed lines with their line numbers
    #[arg(short = 'n', long = "line-numbers")]
    pub line_numbers: bool,

    /// Separator between line number and text
    #[arg(long = "separator", value_name = "SEP", default_value = "│")]
    pub separator: String,

    /// Debug logging to stderr
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}
