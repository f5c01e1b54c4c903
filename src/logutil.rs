//! Logging utilities for radio-sourced byte fields so logs stay single-line.
//! Escapes control and non-ASCII bytes that otherwise break log readability.

use std::fmt::Write;

/// Escape a raw field for single-line logging:
/// - printable ASCII is kept as-is
/// - `\n`, `\r`, `\t` and backslash are escaped
/// - everything else becomes `\xNN`
///   Truncates very long input with an ellipsis to cap log noise.
pub fn escape_field(bytes: &[u8]) -> String {
    const MAX_PREVIEW: usize = 64;
    let mut out = String::with_capacity(bytes.len().min(MAX_PREVIEW) + 8);
    for (count, b) in bytes.iter().enumerate() {
        if count >= MAX_PREVIEW {
            out.push('…');
            break;
        }
        match *b {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            c if c.is_ascii_graphic() || c == b' ' => out.push(c as char),
            c => {
                let _ = write!(&mut out, "\\x{:02X}", c);
            }
        }
    }
    out
}

/// Multi-line hex dump, 16 bytes per row with an ASCII gutter.
pub fn hex_dump(title: &str, data: &[u8]) -> String {
    let mut out = format!("{} ({} bytes)", title, data.len());
    for (row, chunk) in data.chunks(16).enumerate() {
        let _ = write!(&mut out, "\n{:04X}:", row * 16);
        for b in chunk {
            let _ = write!(&mut out, " {:02X}", b);
        }
        for _ in chunk.len()..16 {
            out.push_str("   ");
        }
        out.push_str("   *");
        for b in chunk {
            out.push(if b.is_ascii_graphic() || *b == b' ' {
                *b as char
            } else {
                '.'
            });
        }
        out.push('*');
    }
    out
}
