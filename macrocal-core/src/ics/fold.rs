//! RFC 5545 content line folding.

/// Maximum octets per physical line, excluding the CRLF
pub const FOLD_LIMIT: usize = 75;

/// Fold one logical content line into physical lines.
///
/// Continuation lines start with a single space, which counts toward the
/// limit. Splits happen on character boundaries, so multi-byte UTF-8 text
/// is never cut mid-character. The returned string has no trailing CRLF.
pub fn fold_line(line: &str) -> String {
    if line.len() <= FOLD_LIMIT {
        return line.to_string();
    }

    let mut out = String::with_capacity(line.len() + 3 * (line.len() / FOLD_LIMIT + 1));
    let mut width = 0;

    for ch in line.chars() {
        let len = ch.len_utf8();
        if width + len > FOLD_LIMIT {
            out.push_str("\r\n ");
            width = 1;
        }
        out.push(ch);
        width += len;
    }

    out
}
