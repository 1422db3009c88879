use std::io::Write;
use std::process::Command;
use tempfile::NamedTempFile;

/// Get the path to the leap binary
fn leap_binary() -> std::path::PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test binary name
    path.pop(); // Remove deps
    path.push("leap");
    path
}

/// Run leap with given args and return (stdout, stderr, exit_code)
fn run_leap(args: &[&str]) -> (String, String, i32) {
    use std::process::Stdio;

    let output = Command::new(leap_binary())
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .expect("Failed to execute leap");

    (
        String::from_utf8_lossy(&output.stdout).to_string(),
        String::from_utf8_lossy(&output.stderr).to_string(),
        output.status.code().unwrap_or(-1),
    )
}

/// A temp file holding "line 1".."line N", one per line
fn numbered_file(lines: usize) -> NamedTempFile {
    let mut temp = NamedTempFile::new().unwrap();
    for i in 1..=lines {
        writeln!(temp, "line {}", i).unwrap();
    }
    temp.flush().unwrap();
    temp
}

// ============ CLI Tests ============

#[test]
fn test_help_flag() {
    let (stdout, _, code) = run_leap(&["--help"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("--goto"));
    assert!(stdout.contains("--search"));
    assert!(stdout.contains("--chunk-size"));
}

#[test]
fn test_version_flag() {
    let (stdout, _, code) = run_leap(&["--version"]);
    assert_eq!(code, 0);
    assert!(stdout.contains("leap"));
}

#[test]
fn test_file_not_found() {
    let (_, stderr, code) = run_leap(&["nonexistent_file_12345.txt"]);
    assert_eq!(code, 1);
    assert!(stderr.contains("nonexistent") || stderr.contains("No such file"));
}

#[test]
fn test_conflicting_operations_rejected() {
    let temp = numbered_file(5);
    let (_, _, code) = run_leap(&["--last", "--goto", "3", temp.path().to_str().unwrap()]);
    assert_eq!(code, 2);
}

#[test]
fn test_zero_chunk_size_rejected() {
    let temp = numbered_file(5);
    let (_, stderr, code) = run_leap(&["--chunk-size", "0", temp.path().to_str().unwrap()]);
    assert_eq!(code, 2);
    assert!(stderr.contains("chunk-size"));
}

// ============ First / Last ============

#[test]
fn test_default_prints_first_chunk() {
    let temp = numbered_file(5);
    let (stdout, _, code) = run_leap(&[temp.path().to_str().unwrap()]);
    assert_eq!(code, 0);
    assert_eq!(stdout, "line 1\nline 2\nline 3\nline 4\nline 5\n");
}

#[test]
fn test_last_on_small_file_prints_whole_file() {
    // 50-byte file, 100-byte chunks: first and last are the same text
    let mut temp = NamedTempFile::new().unwrap();
    let content = "aaaa\nbbbb\ncccc\ndddd\neeee\nffff\ngggg\nhhhh\niiii\njjjj\n";
    write!(temp, "{}", content).unwrap();
    temp.flush().unwrap();

    let path = temp.path().to_str().unwrap().to_string();
    let (first, _, code) = run_leap(&["--chunk-size", "100", &path]);
    assert_eq!(code, 0);
    let (last, _, code) = run_leap(&["--chunk-size", "100", "--last", &path]);
    assert_eq!(code, 0);
    assert_eq!(first, content);
    assert_eq!(last, content);
}

#[test]
fn test_last_on_large_file_starts_on_line_boundary() {
    let temp = numbered_file(25);
    let (stdout, _, code) = run_leap(&[
        "--chunk-size",
        "100",
        "--last",
        temp.path().to_str().unwrap(),
    ]);
    assert_eq!(code, 0);
    // The partial first line of the end-anchored read is dropped
    assert!(stdout.starts_with("line "));
    assert!(stdout.ends_with("line 25\n"));
}

// ============ Goto ============

#[test]
fn test_goto_starts_at_block_boundary() {
    let temp = numbered_file(25);
    let (stdout, _, code) = run_leap(&[
        "--line-chunk",
        "10",
        "--goto",
        "15",
        temp.path().to_str().unwrap(),
    ]);
    assert_eq!(code, 0);
    // 1-based line 15 resolves to the block starting at 0-based line 10
    assert!(stdout.starts_with("line 11\n"));
    assert!(stdout.contains("line 15"));
}

#[test]
fn test_goto_out_of_range_clamps() {
    let temp = numbered_file(25);
    let (stdout, _, code) = run_leap(&[
        "--line-chunk",
        "10",
        "--goto",
        "30",
        temp.path().to_str().unwrap(),
    ]);
    assert_eq!(code, 0);
    // Clamped to line 25, whose block starts at 0-based line 20
    assert!(stdout.starts_with("line 21\n"));
}

#[test]
fn test_goto_with_line_numbers() {
    let temp = numbered_file(25);
    let (stdout, _, code) = run_leap(&[
        "--line-chunk",
        "10",
        "--goto",
        "15",
        "-n",
        "--separator",
        ": ",
        temp.path().to_str().unwrap(),
    ]);
    assert_eq!(code, 0);
    assert!(stdout.starts_with("11: line 11\n"));
}

// ============ Search ============

#[test]
fn test_search_prints_matching_lines() {
    let mut temp = NamedTempFile::new().unwrap();
    for i in 1..=10 {
        if i == 3 || i == 6 || i == 10 {
            writeln!(temp, "a needle appears").unwrap();
        } else {
            writeln!(temp, "just hay").unwrap();
        }
    }
    temp.flush().unwrap();

    let (stdout, _, code) = run_leap(&["--search", "needle", temp.path().to_str().unwrap()]);
    assert_eq!(code, 0);
    assert_eq!(stdout, "3\n6\n10\n");
}

#[test]
fn test_search_missing_term() {
    let temp = numbered_file(5);
    let (stdout, _, code) = run_leap(&["--search", "absent", temp.path().to_str().unwrap()]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "not found");
}

// ============ Count ============

#[test]
fn test_count_prints_exact_total() {
    let temp = numbered_file(25);
    let (stdout, _, code) = run_leap(&["--count", temp.path().to_str().unwrap()]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "25");
}

#[test]
fn test_count_file_without_trailing_newline() {
    let mut temp = NamedTempFile::new().unwrap();
    write!(temp, "a\nb\nc").unwrap();
    temp.flush().unwrap();

    let (stdout, _, code) = run_leap(&["--count", temp.path().to_str().unwrap()]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "3");
}

// ============ Encoding ============

#[test]
fn test_crlf_input_normalized() {
    let mut temp = NamedTempFile::new().unwrap();
    temp.write_all(b"first\r\nsecond\r\n").unwrap();
    temp.flush().unwrap();

    let (stdout, _, code) = run_leap(&[temp.path().to_str().unwrap()]);
    assert_eq!(code, 0);
    assert_eq!(stdout, "first\nsecond\n");
}

#[test]
fn test_latin1_file_still_readable() {
    let mut temp = NamedTempFile::new().unwrap();
    temp.write_all(&[b'f', 0xE4, b'r', b'\n']).unwrap();
    temp.flush().unwrap();

    let (stdout, _, code) = run_leap(&[temp.path().to_str().unwrap()]);
    assert_eq!(code, 0);
    assert_eq!(stdout, "fär\n");
}
