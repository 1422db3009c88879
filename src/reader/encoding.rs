/// Decode a raw chunk of bytes to text.
///
/// Tries UTF-8 first. A chunk that fails validation (legacy data, or a
/// multi-byte sequence cut at a chunk boundary) is decoded as Windows-1252
/// instead, so this never fails.
pub fn decode_chunk(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => {
            let bytes = err.into_bytes();
            let (cow, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            cow.into_owned()
        }
    }
}

/// Convert CRLF line endings to LF.
pub fn normalize_newlines(text: String) -> String {
    if text.contains("\r\n") {
        text.replace("\r\n", "\n")
    } else {
        text
    }
}
