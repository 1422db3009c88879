use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::debug;

use super::CancelFlag;

/// Count the lines in `path` with a single sequential scan. A trailing
/// newline does not produce a phantom empty final line. Returns `Ok(None)`
/// when cancelled.
pub fn count_lines(path: &Path, cancel: &CancelFlag) -> io::Result<Option<u64>> {
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);

    let mut buf = Vec::new();
    let mut count: u64 = 0;
    loop {
        if cancel.is_cancelled() {
            debug!("line count cancelled");
            return Ok(None);
        }
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        count += 1;
    }
    debug!(count, "exact line count finished");
    Ok(Some(count))
}
