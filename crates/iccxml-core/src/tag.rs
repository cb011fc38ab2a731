//! Tag Payloads
//!
//! Each directory entry references a typed payload keyed by a 4-byte
//! *type* signature (distinct from the entry's *purpose* signature).
//! The set of types is a closed enumeration plus a vendor/private
//! variant carrying the raw signature; every variant implements the
//! same serialize/deserialize capability, which is all the directory
//! codec depends on. Inner content encodings are deliberately small:
//! curve points as whitespace-separated numbers, everything else as a
//! hex body.

use roxmltree::Node;
use thiserror::Error;

use crate::diag::ParseLog;
use crate::signature::Signature;
use crate::types::SpectralRange;
use crate::xml::{hex_string, parse_hex_body, xml_escape};

/// Failure inside one payload's content codec. The directory codec wraps
/// this with the tag's type and element names and aborts the conversion.
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("invalid {element} data: {detail}")]
    InvalidData { element: &'static str, detail: String },
}

/// Map a registered type signature to its XML element name.
pub fn type_element_name(sig: Signature) -> Option<&'static str> {
    match sig {
        Signature::LUT_A2B => Some("lutAtoBType"),
        Signature::LUT_B2A => Some("lutBtoAType"),
        Signature::MULTI_PROCESS_ELEMENT => Some("multiProcessElementType"),
        Signature::CURVE_TYPE => Some("curveType"),
        Signature::NAMED_COLOR2 => Some("namedColor2Type"),
        _ => None,
    }
}

/// Map an XML element name back to its type signature.
pub fn type_sig_for_name(name: &str) -> Option<Signature> {
    match name {
        "lutAtoBType" => Some(Signature::LUT_A2B),
        "lutBtoAType" => Some(Signature::LUT_B2A),
        "multiProcessElementType" => Some(Signature::MULTI_PROCESS_ELEMENT),
        "curveType" => Some(Signature::CURVE_TYPE),
        "namedColor2Type" => Some(Signature::NAMED_COLOR2),
        _ => None,
    }
}

/// Multi-bus transform chain (lutAtoB, lutBtoA, multiProcessElement).
///
/// Input/output spaces are wired from the header after parse; they are
/// in-memory context, not part of the XML form.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultiBusTag {
    pub type_sig: Signature,
    pub input: Signature,
    pub output: Signature,
    pub reserved: u32,
    pub data: Vec<u8>,
}

impl MultiBusTag {
    pub fn new(type_sig: Signature) -> Self {
        Self {
            type_sig,
            ..Default::default()
        }
    }

    pub fn set_color_spaces(&mut self, input: Signature, output: Signature) {
        self.input = input;
        self.output = output;
    }
}

/// Tone curve payload (curv).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CurveTag {
    pub reserved: u32,
    pub points: Vec<u16>,
}

/// Named color table payload (ncl2).
///
/// Carries the wiring slots for the header-derived color context,
/// including the spectral ranges used by spectrally defined colors.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedColorTag {
    pub reserved: u32,
    pub data: Vec<u8>,
    pub pcs: Signature,
    pub device: Signature,
    pub spectral_pcs: Signature,
    pub spectral_range: SpectralRange,
    pub bi_spectral_range: SpectralRange,
}

impl NamedColorTag {
    pub fn set_color_spaces(&mut self, pcs: Signature, device: Signature) {
        self.pcs = pcs;
        self.device = device;
    }

    pub fn set_spectral_context(
        &mut self,
        spectral_pcs: Signature,
        spectral_range: SpectralRange,
        bi_spectral_range: SpectralRange,
    ) {
        self.spectral_pcs = spectral_pcs;
        self.spectral_range = spectral_range;
        self.bi_spectral_range = bi_spectral_range;
    }
}

/// Vendor/private payload for type signatures outside the registry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PrivateTag {
    pub type_sig: Signature,
    pub reserved: u32,
    pub data: Vec<u8>,
}

impl PrivateTag {
    pub fn new(type_sig: Signature) -> Self {
        Self {
            type_sig,
            ..Default::default()
        }
    }
}

/// A typed tag payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Tag {
    MultiBus(MultiBusTag),
    Curve(CurveTag),
    NamedColor(NamedColorTag),
    Private(PrivateTag),
}

impl Tag {
    /// Signature-keyed factory. Unregistered non-zero signatures create a
    /// private payload; the zero signature has no payload at all.
    pub fn create(type_sig: Signature) -> Option<Self> {
        if type_sig.is_zero() {
            return None;
        }
        Some(match type_sig {
            Signature::LUT_A2B | Signature::LUT_B2A | Signature::MULTI_PROCESS_ELEMENT => {
                Tag::MultiBus(MultiBusTag::new(type_sig))
            }
            Signature::CURVE_TYPE => Tag::Curve(CurveTag::default()),
            Signature::NAMED_COLOR2 => Tag::NamedColor(NamedColorTag::default()),
            _ => Tag::Private(PrivateTag::new(type_sig)),
        })
    }

    pub fn type_sig(&self) -> Signature {
        match self {
            Tag::MultiBus(t) => t.type_sig,
            Tag::Curve(_) => Signature::CURVE_TYPE,
            Tag::NamedColor(_) => Signature::NAMED_COLOR2,
            Tag::Private(t) => t.type_sig,
        }
    }

    /// Element name for the grouping element, or `None` for private types
    /// (rendered as the generic `PrivateType` wrapper).
    pub fn element_name(&self) -> Option<&'static str> {
        type_element_name(self.type_sig())
    }

    pub fn reserved(&self) -> u32 {
        match self {
            Tag::MultiBus(t) => t.reserved,
            Tag::Curve(t) => t.reserved,
            Tag::NamedColor(t) => t.reserved,
            Tag::Private(t) => t.reserved,
        }
    }

    pub fn set_reserved(&mut self, reserved: u32) {
        match self {
            Tag::MultiBus(t) => t.reserved = reserved,
            Tag::Curve(t) => t.reserved = reserved,
            Tag::NamedColor(t) => t.reserved = reserved,
            Tag::Private(t) => t.reserved = reserved,
        }
    }

    /// Emit the payload's inner content at the given indentation.
    pub fn to_xml(&self, xml: &mut String, indent: &str) -> Result<(), PayloadError> {
        match self {
            Tag::Curve(t) => {
                let points: Vec<String> = t.points.iter().map(u16::to_string).collect();
                xml.push_str(&format!(
                    "{indent}<Curve>{}</Curve>\n",
                    xml_escape(&points.join(" "))
                ));
            }
            Tag::MultiBus(MultiBusTag { data, .. })
            | Tag::NamedColor(NamedColorTag { data, .. })
            | Tag::Private(PrivateTag { data, .. }) => {
                xml.push_str(&format!("{indent}<Data>{}</Data>\n", hex_string(data)));
            }
        }
        Ok(())
    }

    /// Parse the payload's inner content from the grouping element.
    ///
    /// `TagSignature` children and anything else this payload does not
    /// recognize are ignored; a missing content child means empty
    /// content. Malformed content is a failure.
    pub fn parse_xml(&mut self, node: Node, _log: &mut ParseLog) -> Result<(), PayloadError> {
        match self {
            Tag::Curve(t) => {
                t.points.clear();
                if let Some(curve) = node.children().find(|n| n.has_tag_name("Curve")) {
                    for token in curve.text().unwrap_or("").split_whitespace() {
                        let point =
                            token.parse::<u16>().map_err(|_| PayloadError::InvalidData {
                                element: "Curve",
                                detail: format!("bad point '{token}'"),
                            })?;
                        t.points.push(point);
                    }
                }
            }
            Tag::MultiBus(MultiBusTag { data, .. })
            | Tag::NamedColor(NamedColorTag { data, .. })
            | Tag::Private(PrivateTag { data, .. }) => {
                data.clear();
                if let Some(body) = node.children().find(|n| n.has_tag_name("Data")) {
                    let text = body.text().unwrap_or("");
                    *data = parse_hex_body(text).ok_or_else(|| PayloadError::InvalidData {
                        element: "Data",
                        detail: "not a hex run".to_string(),
                    })?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_known_types() {
        assert!(matches!(
            Tag::create(Signature::LUT_A2B),
            Some(Tag::MultiBus(_))
        ));
        assert!(matches!(
            Tag::create(Signature::MULTI_PROCESS_ELEMENT),
            Some(Tag::MultiBus(_))
        ));
        assert!(matches!(Tag::create(Signature::CURVE_TYPE), Some(Tag::Curve(_))));
        assert!(matches!(
            Tag::create(Signature::NAMED_COLOR2),
            Some(Tag::NamedColor(_))
        ));
    }

    #[test]
    fn test_factory_vendor_and_zero() {
        let vendor = Signature::from_text("vend");
        match Tag::create(vendor) {
            Some(Tag::Private(t)) => assert_eq!(t.type_sig, vendor),
            other => panic!("expected private payload, got {other:?}"),
        }
        assert!(Tag::create(Signature(0)).is_none());
    }

    #[test]
    fn test_registry_roundtrip() {
        for sig in [
            Signature::LUT_A2B,
            Signature::LUT_B2A,
            Signature::MULTI_PROCESS_ELEMENT,
            Signature::CURVE_TYPE,
            Signature::NAMED_COLOR2,
        ] {
            let name = type_element_name(sig).unwrap();
            assert_eq!(type_sig_for_name(name), Some(sig));
        }
        assert_eq!(type_element_name(Signature::from_text("vend")), None);
    }

    #[test]
    fn test_curve_content_roundtrip() {
        let tag = Tag::Curve(CurveTag {
            reserved: 0,
            points: vec![0, 32768, 65535],
        });
        let mut xml = String::from("<g>\n");
        tag.to_xml(&mut xml, "  ").unwrap();
        xml.push_str("</g>\n");

        let doc = roxmltree::Document::parse(&xml).unwrap();
        let mut log = ParseLog::new();
        let mut parsed = Tag::create(Signature::CURVE_TYPE).unwrap();
        parsed.parse_xml(doc.root_element(), &mut log).unwrap();
        assert_eq!(parsed, tag);
    }

    #[test]
    fn test_curve_bad_point_fails() {
        let doc = roxmltree::Document::parse("<g><Curve>1 two 3</Curve></g>").unwrap();
        let mut log = ParseLog::new();
        let mut tag = Tag::create(Signature::CURVE_TYPE).unwrap();
        assert!(tag.parse_xml(doc.root_element(), &mut log).is_err());
    }

    #[test]
    fn test_hex_body_roundtrip() {
        let tag = Tag::Private(PrivateTag {
            type_sig: Signature::from_text("vend"),
            reserved: 0,
            data: vec![0xDE, 0xAD, 0xBE, 0xEF],
        });
        let mut xml = String::from("<g>\n");
        tag.to_xml(&mut xml, "  ").unwrap();
        xml.push_str("</g>\n");
        assert!(xml.contains("<Data>DEADBEEF</Data>"));

        let doc = roxmltree::Document::parse(&xml).unwrap();
        let mut log = ParseLog::new();
        let mut parsed = Tag::create(Signature::from_text("vend")).unwrap();
        parsed.parse_xml(doc.root_element(), &mut log).unwrap();
        assert_eq!(parsed, tag);
    }

    #[test]
    fn test_bad_hex_fails() {
        let doc = roxmltree::Document::parse("<g><Data>XYZ</Data></g>").unwrap();
        let mut log = ParseLog::new();
        let mut tag = Tag::create(Signature::from_text("vend")).unwrap();
        assert!(tag.parse_xml(doc.root_element(), &mut log).is_err());
    }
}
