//! Profile Document Codec
//!
//! Ties the header codec and the tag payloads together into the full
//! document: one `<IccProfile>` element wrapping a `<Header>` block and
//! a `<Tags>` block of grouping elements.
//!
//! The hard part is aliasing. The binary directory may hold several
//! entries whose signatures all point at one stored payload, either by
//! sharing the object or by sharing a byte offset. Serialization groups
//! those entries into one element with several `<TagSignature>` children;
//! parsing re-attaches every listed signature to one shared payload, so
//! the grouping survives a round trip regardless of the original entry
//! order.

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::Path;
use std::rc::Rc;

use roxmltree::{Document, Node};

use crate::diag::{ParseLog, ParseOptions};
use crate::error::{Result, XmlError};
use crate::header::ProfileHeader;
use crate::schema::{SchemaError, SchemaValidator};
use crate::signature::Signature;
use crate::tag::{Tag, type_sig_for_name};
use crate::xml::{parse_u32_lossy, xml_escape};

/// One directory record. Several entries may share one payload; an entry
/// read from a binary directory may carry no payload at all until one is
/// attached.
#[derive(Debug, Clone)]
pub struct TagDirectoryEntry {
    /// Purpose signature (what the tag is for)
    pub sig: Signature,
    /// Byte offset of the stored payload, zero when never written
    pub offset: u32,
    /// Byte size of the stored payload
    pub size: u32,
    /// Shared payload reference
    pub payload: Option<Rc<RefCell<Tag>>>,
}

/// An ICC profile in its XML-convertible form.
#[derive(Debug, Default)]
pub struct IccProfileXml {
    pub header: ProfileHeader,
    /// Flat ordered tag directory
    pub tags: Vec<TagDirectoryEntry>,
}

impl IccProfileXml {
    pub fn new(header: ProfileHeader) -> Self {
        Self {
            header,
            tags: Vec::new(),
        }
    }

    /// Append a directory entry that shares ownership of `payload`.
    pub fn attach_tag(&mut self, sig: Signature, payload: Rc<RefCell<Tag>>) {
        self.tags.push(TagDirectoryEntry {
            sig,
            offset: 0,
            size: 0,
            payload: Some(payload),
        });
    }

    /// Append a payload-less entry, as a binary directory reader would.
    pub fn push_entry(&mut self, sig: Signature, offset: u32, size: u32) {
        self.tags.push(TagDirectoryEntry {
            sig,
            offset,
            size,
            payload: None,
        });
    }

    /// First payload attached under `sig`.
    pub fn find_tag(&self, sig: Signature) -> Option<Rc<RefCell<Tag>>> {
        self.tags
            .iter()
            .find(|e| e.sig == sig)
            .and_then(|e| e.payload.clone())
    }

    /// Serialize the whole profile to an XML document.
    pub fn to_xml(&self) -> Result<String> {
        let mut xml = String::with_capacity(4096);
        xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        xml.push_str("<IccProfile>\n");
        xml.push_str("  <Header>\n");
        self.header.to_xml(&mut xml);
        xml.push_str("  </Header>\n");
        xml.push_str("  <Tags>\n");
        self.tags_to_xml(&mut xml)?;
        xml.push_str("  </Tags>\n");
        xml.push_str("</IccProfile>\n");
        Ok(xml)
    }

    /// One forward pass over the directory, emitting one grouping element
    /// per distinct payload. Aliases are found by scanning the remainder
    /// of the directory for entries with the same payload object or the
    /// same non-zero byte offset.
    fn tags_to_xml(&self, xml: &mut String) -> Result<()> {
        let mut seen: HashSet<Signature> = HashSet::new();

        for (i, entry) in self.tags.iter().enumerate() {
            if seen.contains(&entry.sig) {
                continue;
            }
            let Some(payload) = &entry.payload else {
                tracing::error!(sig = %entry.sig, "unable to resolve tag payload");
                return Err(XmlError::UnresolvedTagSignature(entry.sig.to_text()));
            };
            let tag = payload.borrow();
            let type_sig = tag.type_sig();

            // PrivateType carries the raw vendor signature as an attribute
            // instead of naming the element after the type.
            let element = tag.element_name().unwrap_or("PrivateType");
            xml.push_str(&format!("    <{element}"));
            if tag.element_name().is_none() {
                xml.push_str(&format!(" type=\"{}\"", xml_escape(&type_sig.to_text())));
            }
            if tag.reserved() != 0 {
                xml.push_str(&format!(" reserved=\"{}\"", tag.reserved()));
            }
            xml.push_str(">\n");

            xml.push_str(&format!(
                "      <TagSignature>{}</TagSignature>\n",
                xml_escape(&entry.sig.to_text())
            ));
            seen.insert(entry.sig);

            for later in &self.tags[i + 1..] {
                let same_payload = later
                    .payload
                    .as_ref()
                    .is_some_and(|p| Rc::ptr_eq(p, payload));
                let same_offset = later.offset == entry.offset && entry.offset != 0;
                if same_payload || same_offset {
                    xml.push_str(&format!(
                        "      <TagSignature>{}</TagSignature>\n",
                        xml_escape(&later.sig.to_text())
                    ));
                    seen.insert(later.sig);
                }
            }

            if let Err(e) = tag.to_xml(xml, "      ") {
                tracing::error!(sig = %entry.sig, error = %e, "unable to serialize tag");
                return Err(XmlError::TagPayloadSerialize(type_sig.to_text()));
            }

            xml.push_str(&format!("    </{element}>\n"));
        }
        Ok(())
    }

    /// Parse an XML document into a profile.
    pub fn parse_xml(text: &str, log: &mut ParseLog, opts: ParseOptions) -> Result<Self> {
        let doc = Document::parse(text)?;
        let root = doc.root_element();
        if root.tag_name().name() != "IccProfile" {
            return Err(XmlError::MissingElement("IccProfile"));
        }

        let header_node = root
            .children()
            .find(|n| n.has_tag_name("Header"))
            .ok_or(XmlError::MissingElement("Header"))?;
        let header = ProfileHeader::parse_xml(header_node, log, opts);

        let mut profile = Self::new(header);

        let tags_node = root
            .children()
            .find(|n| n.has_tag_name("Tags"))
            .ok_or(XmlError::MissingElement("Tags"))?;
        for node in tags_node.children().filter(|n| n.is_element()) {
            profile.parse_tag(node, log)?;
        }

        profile.wire_color_spaces(log, opts);
        Ok(profile)
    }

    /// Load a document from disk, optionally gated by a schema validator.
    ///
    /// The document text and parsed tree are owned by this call and
    /// dropped on every exit path, including validation failure.
    pub fn load_xml(
        path: &Path,
        validator: Option<&dyn SchemaValidator>,
        log: &mut ParseLog,
        opts: ParseOptions,
    ) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;

        if let Some(validator) = validator {
            validator.validate(&text).map_err(|e| match e {
                SchemaError::Setup(msg) => XmlError::SchemaSetup(msg),
                SchemaError::Invalid(code) => XmlError::SchemaValidation {
                    file: path.display().to_string(),
                    code,
                },
            })?;
        }

        Self::parse_xml(&text, log, opts)
    }

    /// Parse one grouping element: resolve the type, create the payload,
    /// delegate inner content, then attach every `<TagSignature>` child
    /// to the shared payload. That attachment is how aliasing is rebuilt.
    fn parse_tag(&mut self, node: Node, log: &mut ParseLog) -> Result<()> {
        if !node.is_element() {
            return Err(XmlError::InvalidTagNode(node.tag_name().name().to_string()));
        }
        let element = node.tag_name().name().to_string();

        // Registered names map directly; anything else falls back to the
        // raw signature in the `type` attribute.
        let type_sig = type_sig_for_name(&element)
            .or_else(|| node.attribute("type").map(Signature::from_text))
            .unwrap_or_default();

        let Some(mut tag) = Tag::create(type_sig) else {
            tracing::error!(element = %element, "no payload for tag type");
            return Err(XmlError::InvalidTagExtension {
                type_name: type_sig.to_text(),
                element,
            });
        };
        let type_name = tag
            .element_name()
            .map(str::to_string)
            .unwrap_or_else(|| type_sig.to_text());

        if let Err(e) = tag.parse_xml(node, log) {
            tracing::error!(element = %element, error = %e, "tag payload parse failed");
            return Err(XmlError::TagPayloadParse { type_name, element });
        }

        if let Some(reserved) = node.attribute("reserved") {
            tag.set_reserved(parse_u32_lossy(reserved));
        }

        let payload = Rc::new(RefCell::new(tag));
        for sig_node in node
            .children()
            .filter(|n| n.is_element() && n.has_tag_name("TagSignature"))
        {
            let sig = Signature::from_text(sig_node.text().unwrap_or(""));
            self.attach_tag(sig, Rc::clone(&payload));
        }
        Ok(())
    }

    /// Propagate header-derived color-space context into payloads, once
    /// per directory entry. A payload whose kind does not match its
    /// entry's purpose is skipped (logged when the caller opted in).
    fn wire_color_spaces(&mut self, log: &mut ParseLog, opts: ParseOptions) {
        let device = self.header.color_space;
        let pcs = self.header.pcs;
        let spectral_pcs = self.header.spectral_pcs;
        let spectral_range = self.header.spectral_range;
        let bi_spectral_range = self.header.bi_spectral_range;

        for entry in &self.tags {
            let Some(payload) = &entry.payload else { continue };
            let mut tag = payload.borrow_mut();

            let spaces = match entry.sig {
                Signature::A2B0 | Signature::A2B1 | Signature::A2B2 => Some((device, pcs)),
                Signature::B2A0 | Signature::B2A1 | Signature::B2A2 => Some((pcs, device)),
                Signature::GAMUT => Some((pcs, Signature::GAMUT_DATA)),
                _ => None,
            };

            if let Some((input, output)) = spaces {
                if let Tag::MultiBus(mbb) = &mut *tag {
                    mbb.set_color_spaces(input, output);
                } else if opts.log_unrecognized {
                    log.warn(format!(
                        "Color space wiring skipped for tag '{}'",
                        entry.sig
                    ));
                }
            } else if entry.sig == Signature::NAMED_COLOR2 {
                if let Tag::NamedColor(nc) = &mut *tag {
                    nc.set_color_spaces(pcs, device);
                    nc.set_spectral_context(spectral_pcs, spectral_range, bi_spectral_range);
                } else if opts.log_unrecognized {
                    log.warn(format!(
                        "Color space wiring skipped for tag '{}'",
                        entry.sig
                    ));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::PROFILE_FILE_SIGNATURE;
    use crate::tag::{CurveTag, MultiBusTag};

    fn minimal_header() -> ProfileHeader {
        ProfileHeader {
            version: 0x0430_0000,
            device_class: Signature::from_text("mntr"),
            color_space: Signature::from_text("RGB "),
            pcs: Signature::from_text("XYZ "),
            magic: PROFILE_FILE_SIGNATURE,
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_directory_roundtrip() {
        let profile = IccProfileXml::new(minimal_header());
        let xml = profile.to_xml().unwrap();

        let mut log = ParseLog::new();
        let back = IccProfileXml::parse_xml(&xml, &mut log, ParseOptions::default()).unwrap();
        assert_eq!(back.header, profile.header);
        assert!(back.tags.is_empty());
        assert!(log.is_empty());
    }

    #[test]
    fn test_unresolved_entry_fails_serialize() {
        let mut profile = IccProfileXml::new(minimal_header());
        profile.push_entry(Signature::from_text("cprt"), 200, 40);
        match profile.to_xml() {
            Err(XmlError::UnresolvedTagSignature(sig)) => assert_eq!(sig, "cprt"),
            other => panic!("expected UnresolvedTagSignature, got {other:?}"),
        }
    }

    #[test]
    fn test_wiring_forward_and_inverse() {
        let mut profile = IccProfileXml::new(minimal_header());
        let a2b = Rc::new(RefCell::new(
            Tag::create(Signature::LUT_A2B).unwrap(),
        ));
        let b2a = Rc::new(RefCell::new(
            Tag::create(Signature::LUT_B2A).unwrap(),
        ));
        profile.attach_tag(Signature::A2B0, Rc::clone(&a2b));
        profile.attach_tag(Signature::B2A0, Rc::clone(&b2a));

        let mut log = ParseLog::new();
        profile.wire_color_spaces(&mut log, ParseOptions::default());

        match &*a2b.borrow() {
            Tag::MultiBus(MultiBusTag { input, output, .. }) => {
                assert_eq!(*input, Signature::from_text("RGB "));
                assert_eq!(*output, Signature::from_text("XYZ "));
            }
            other => panic!("unexpected payload {other:?}"),
        }
        match &*b2a.borrow() {
            Tag::MultiBus(MultiBusTag { input, output, .. }) => {
                assert_eq!(*input, Signature::from_text("XYZ "));
                assert_eq!(*output, Signature::from_text("RGB "));
            }
            other => panic!("unexpected payload {other:?}"),
        }
    }

    #[test]
    fn test_wiring_mismatch_is_silent_by_default() {
        let mut profile = IccProfileXml::new(minimal_header());
        let curve = Rc::new(RefCell::new(Tag::Curve(CurveTag::default())));
        profile.attach_tag(Signature::A2B0, curve);

        let mut log = ParseLog::new();
        profile.wire_color_spaces(&mut log, ParseOptions::default());
        assert!(log.is_empty());

        profile.wire_color_spaces(&mut log, ParseOptions { log_unrecognized: true });
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_reserved_attribute_roundtrip() {
        let mut profile = IccProfileXml::new(minimal_header());
        let mut tag = Tag::create(Signature::CURVE_TYPE).unwrap();
        tag.set_reserved(7);
        profile.attach_tag(Signature::from_text("rTRC"), Rc::new(RefCell::new(tag)));

        let xml = profile.to_xml().unwrap();
        assert!(xml.contains("<curveType reserved=\"7\">"));

        let mut log = ParseLog::new();
        let back = IccProfileXml::parse_xml(&xml, &mut log, ParseOptions::default()).unwrap();
        let payload = back.find_tag(Signature::from_text("rTRC")).unwrap();
        assert_eq!(payload.borrow().reserved(), 7);
    }

    #[test]
    fn test_missing_blocks_are_fatal() {
        let mut log = ParseLog::new();
        let opts = ParseOptions::default();

        let no_header = "<IccProfile><Tags/></IccProfile>";
        assert!(matches!(
            IccProfileXml::parse_xml(no_header, &mut log, opts),
            Err(XmlError::MissingElement("Header"))
        ));

        let no_tags = "<IccProfile><Header/></IccProfile>";
        assert!(matches!(
            IccProfileXml::parse_xml(no_tags, &mut log, opts),
            Err(XmlError::MissingElement("Tags"))
        ));

        let wrong_root = "<Profile/>";
        assert!(matches!(
            IccProfileXml::parse_xml(wrong_root, &mut log, opts),
            Err(XmlError::MissingElement("IccProfile"))
        ));
    }
}
