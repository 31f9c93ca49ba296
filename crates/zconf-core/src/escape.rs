//! Label escape codec for the native browse tools.
//!
//! `avahi-browse --parsable` and the `dns-sd` zone-file output both print
//! service names with the escaping scheme of avahi's `avahi_escape_label`:
//! a backslash followed by exactly three decimal digits stands for one raw
//! byte with that decimal value, and a backslash followed by any other
//! single character stands for that literal character (used for `.` and
//! `\` themselves). Multi-byte UTF-8 sequences arrive as consecutive
//! decimal triplets, one per byte, and are reassembled as raw bytes; the
//! decoder never interprets code points.
//!
//! Escaped input is by construction 7-bit ASCII; anything outside that
//! alphabet is rejected instead of being silently mangled. A dangling
//! backslash at the end of the input is likewise rejected.

use crate::error::EscapeError;

/// Decode an escaped label into raw bytes.
///
/// ```
/// use zconf_core::escape::unescape;
///
/// assert_eq!(unescape(r"a\.c").unwrap(), b"a.c");
/// assert_eq!(unescape(r"a\032c").unwrap(), b"a c");
/// ```
pub fn unescape(input: &str) -> Result<Vec<u8>, EscapeError> {
    if let Some(index) = input.bytes().position(|b| !b.is_ascii()) {
        return Err(EscapeError::NonAscii { index });
    }

    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        let b = bytes[i];
        if b != b'\\' {
            out.push(b);
            i += 1;
            continue;
        }

        let rest = &bytes[i + 1..];
        if rest.len() >= 3 && rest[..3].iter().all(|d| d.is_ascii_digit()) {
            let value = (rest[0] - b'0') as u16 * 100
                + (rest[1] - b'0') as u16 * 10
                + (rest[2] - b'0') as u16;
            if value > 255 {
                return Err(EscapeError::ByteOutOfRange { value });
            }
            out.push(value as u8);
            i += 4;
        } else if let Some(&next) = rest.first() {
            out.push(next);
            i += 2;
        } else {
            return Err(EscapeError::TrailingBackslash);
        }
    }

    Ok(out)
}

/// Decode an escaped label into a `String`.
///
/// Same as [`unescape`] but additionally requires the decoded bytes to be
/// valid UTF-8, which holds for every name the mDNS tools emit. This is
/// the form the search path uses for map keys.
pub fn unescape_str(input: &str) -> Result<String, EscapeError> {
    String::from_utf8(unescape(input)?).map_err(|_| EscapeError::InvalidUtf8)
}

/// Escape raw label bytes the way the tools do.
///
/// `.` and `\` get single-character escapes; control bytes, space, DEL and
/// everything above 7-bit ASCII become zero-padded decimal triplets. The
/// result always round-trips through [`unescape`].
pub fn escape(label: &[u8]) -> String {
    let mut out = String::with_capacity(label.len());
    for &b in label {
        match b {
            b'.' => out.push_str("\\."),
            b'\\' => out.push_str("\\\\"),
            _ if b <= 0x20 || b >= 0x7f => out.push_str(&format!("\\{:03}", b)),
            _ => out.push(b as char),
        }
    }
    out
}
