//! XML Text Helpers
//!
//! Low-level text conversions shared by the header and tag codecs:
//! escaping, hex blobs, and tolerant numeric parsing. Header parsing is
//! best-effort throughout: malformed numeric text yields the zero value
//! rather than an error, so every helper here has a lossy variant.

use std::borrow::Cow;

/// Escape the five XML special characters in text content or attribute values.
pub fn xml_escape(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}

/// Render bytes as uppercase hex pairs.
pub fn hex_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        out.push_str(&format!("{b:02X}"));
    }
    out
}

/// Fill a fixed-size buffer from a hex run, best-effort.
///
/// Whitespace inside the run is skipped. Parsing stops at the first
/// non-hex character or when the buffer is full; bytes not covered by
/// the text keep their current value (callers zero the buffer first).
pub fn hex_fill(dst: &mut [u8], text: &str) {
    let mut pos = 0;
    let mut hi: Option<u8> = None;
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            continue;
        }
        let Some(digit) = c.to_digit(16) else { break };
        match hi {
            None => hi = Some(digit as u8),
            Some(h) => {
                if pos >= dst.len() {
                    return;
                }
                dst[pos] = (h << 4) | digit as u8;
                pos += 1;
                hi = None;
            }
        }
    }
}

/// Parse a hex run into bytes, strict.
///
/// Whitespace between digits is allowed. Any other non-hex character,
/// or an odd digit count, is a failure.
pub fn parse_hex_body(text: &str) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(text.len() / 2);
    let mut hi: Option<u8> = None;
    for c in text.chars() {
        if c.is_ascii_whitespace() {
            continue;
        }
        let digit = c.to_digit(16)? as u8;
        match hi {
            None => hi = Some(digit),
            Some(h) => {
                out.push((h << 4) | digit);
                hi = None;
            }
        }
    }
    if hi.is_some() {
        return None;
    }
    Some(out)
}

/// Parse the leading decimal number of a string, `atof` style.
///
/// Accepts an optional sign, digits, and a single decimal point; trailing
/// garbage is ignored. No parseable number yields 0.0.
pub fn parse_f64_lossy(text: &str) -> f64 {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;
    if end < bytes.len() && (bytes[end] == b'+' || bytes[end] == b'-') {
        end += 1;
    }
    let mut seen_dot = false;
    let mut seen_digit = false;
    while end < bytes.len() {
        match bytes[end] {
            b'0'..=b'9' => {
                seen_digit = true;
                end += 1;
            }
            b'.' if !seen_dot => {
                seen_dot = true;
                end += 1;
            }
            _ => break,
        }
    }
    if !seen_digit {
        return 0.0;
    }
    s[..end].parse().unwrap_or(0.0)
}

/// Parse the leading unsigned decimal digits, `atoi` style. 0 on failure.
pub fn parse_u32_lossy(text: &str) -> u32 {
    let s = text.trim_start();
    let end = s.bytes().take_while(u8::is_ascii_digit).count();
    s[..end].parse().unwrap_or(0)
}

/// Parse the leading unsigned decimal digits into a u16. 0 on failure.
pub fn parse_u16_lossy(text: &str) -> u16 {
    let s = text.trim_start();
    let end = s.bytes().take_while(u8::is_ascii_digit).count();
    s[..end].parse().unwrap_or(0)
}

/// Parse the leading hex digits (optionally `0x`-prefixed), `%x` style.
pub fn parse_hex_u32(text: &str) -> u32 {
    let s = text.trim_start();
    let s = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    let end = s.bytes().take_while(u8::is_ascii_hexdigit).count();
    u32::from_str_radix(&s[..end], 16).unwrap_or(0)
}

/// Parse the leading hex digits into a u64. 0 on failure.
pub fn parse_hex_u64(text: &str) -> u64 {
    let s = text.trim_start();
    let s = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    let end = s.bytes().take_while(u8::is_ascii_hexdigit).count();
    u64::from_str_radix(&s[..end], 16).unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(xml_escape("plain"), "plain");
        assert_eq!(xml_escape("a<b>&\"'"), "a&lt;b&gt;&amp;&quot;&apos;");
    }

    #[test]
    fn test_hex_roundtrip() {
        let bytes = [0x00, 0xAB, 0xFF, 0x10];
        let text = hex_string(&bytes);
        assert_eq!(text, "00ABFF10");
        let back = parse_hex_body(&text).unwrap();
        assert_eq!(back, bytes);
    }

    #[test]
    fn test_hex_fill_short_run() {
        let mut buf = [0u8; 4];
        hex_fill(&mut buf, "AB CD");
        assert_eq!(buf, [0xAB, 0xCD, 0, 0]);

        // stops at the first non-hex character
        let mut buf = [0u8; 4];
        hex_fill(&mut buf, "12zz34");
        assert_eq!(buf, [0x12, 0, 0, 0]);
    }

    #[test]
    fn test_parse_hex_body_strict() {
        assert!(parse_hex_body("12 34").is_some());
        assert!(parse_hex_body("123").is_none());
        assert!(parse_hex_body("12g4").is_none());
        assert_eq!(parse_hex_body("").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn test_parse_f64_lossy() {
        assert_eq!(parse_f64_lossy("4.3"), 4.3);
        assert_eq!(parse_f64_lossy("4.3.0"), 4.3);
        assert_eq!(parse_f64_lossy("  -1.5x"), -1.5);
        assert_eq!(parse_f64_lossy("junk"), 0.0);
        assert_eq!(parse_f64_lossy(""), 0.0);
    }

    #[test]
    fn test_parse_int_lossy() {
        assert_eq!(parse_u32_lossy("42abc"), 42);
        assert_eq!(parse_u32_lossy("abc"), 0);
        assert_eq!(parse_u16_lossy("36"), 36);
        assert_eq!(parse_hex_u32("80000000"), 0x8000_0000);
        assert_eq!(parse_hex_u32("0xFF"), 0xFF);
        assert_eq!(parse_hex_u64("FFFF00000000"), 0xFFFF_0000_0000);
    }
}
