//! 4-Byte Signature Codes
//!
//! ICC profiles identify nearly everything by 4-byte big-endian ASCII
//! codes: tag purposes, tag data types, color spaces, platforms, vendors.
//! The XML form renders a signature as its 4 characters when they are all
//! printable, and as `0x%08X` otherwise. The zero signature renders as an
//! empty string so that optional header fields can round-trip as absent.

use std::fmt;

/// A 4-byte signature code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Signature(pub u32);

impl Signature {
    /// Create from 4 ASCII characters.
    pub const fn from_bytes(b: [u8; 4]) -> Self {
        Self(u32::from_be_bytes(b))
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    // Tag purpose signatures the directory codec dispatches on.
    pub const A2B0: Self = Self::from_bytes(*b"A2B0");
    pub const A2B1: Self = Self::from_bytes(*b"A2B1");
    pub const A2B2: Self = Self::from_bytes(*b"A2B2");
    pub const B2A0: Self = Self::from_bytes(*b"B2A0");
    pub const B2A1: Self = Self::from_bytes(*b"B2A1");
    pub const B2A2: Self = Self::from_bytes(*b"B2A2");
    pub const GAMUT: Self = Self::from_bytes(*b"gamt");
    pub const NAMED_COLOR2: Self = Self::from_bytes(*b"ncl2");

    // Tag type signatures with registered element names.
    pub const LUT_A2B: Self = Self::from_bytes(*b"mAB ");
    pub const LUT_B2A: Self = Self::from_bytes(*b"mBA ");
    pub const MULTI_PROCESS_ELEMENT: Self = Self::from_bytes(*b"mpet");
    pub const CURVE_TYPE: Self = Self::from_bytes(*b"curv");

    // Pseudo color space used when wiring gamut-check transforms.
    pub const GAMUT_DATA: Self = Self::from_bytes(*b"gamt");

    /// Textual form: 4 printable characters, hex fallback, empty for zero.
    pub fn to_text(&self) -> String {
        if self.0 == 0 {
            return String::new();
        }
        let bytes = self.0.to_be_bytes();
        if bytes.iter().all(|b| (0x20..=0x7e).contains(b)) {
            bytes.iter().map(|&b| b as char).collect()
        } else {
            format!("0x{:08X}", self.0)
        }
    }

    /// Parse the textual form back into a code.
    ///
    /// Accepts up to 4 characters (right-padded with spaces, matching the
    /// binary encoding of short codes like `RGB`) or the `0x` hex form.
    /// An empty string is the zero signature.
    pub fn from_text(text: &str) -> Self {
        if text.is_empty() {
            return Self(0);
        }
        if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
            if hex.len() == 8 && hex.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Self(u32::from_str_radix(hex, 16).unwrap_or(0));
            }
        }
        let mut code = [b' '; 4];
        for (slot, b) in code.iter_mut().zip(text.bytes()) {
            *slot = b;
        }
        Self(u32::from_be_bytes(code))
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_printable_roundtrip() {
        for text in ["desc", "XYZ ", "A2B0", "mAB "] {
            let sig = Signature::from_text(text);
            assert_eq!(sig.to_text(), text);
        }
    }

    #[test]
    fn test_short_code_padded() {
        let sig = Signature::from_text("RGB");
        assert_eq!(sig, Signature::from_bytes(*b"RGB "));
        assert_eq!(sig.to_text(), "RGB ");
    }

    #[test]
    fn test_hex_fallback() {
        let sig = Signature(0x0001_02FF);
        let text = sig.to_text();
        assert_eq!(text, "0x000102FF");
        assert_eq!(Signature::from_text(&text), sig);
    }

    #[test]
    fn test_zero_is_empty() {
        assert_eq!(Signature(0).to_text(), "");
        assert_eq!(Signature::from_text(""), Signature(0));
    }
}
