use std::borrow::Cow;

/// NUL-terminated printable view of a datagram: the text ends at the first
/// NUL byte (or the whole buffer if there is none), invalid UTF-8 replaced.
pub fn printable(bytes: &[u8]) -> Cow<'_, str> {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end])
}
