//! Profile Header Codec
//!
//! The header block serializes its scalar fields in a fixed order;
//! optional fields (platform, manufacturer, model, the spectral block,
//! MCS, device sub-class, profile ID, reserved bytes) are emitted only
//! when non-zero, and absence on parse means the zero value. Parsing is
//! tolerant: unrecognized element names are logged and skipped, and
//! malformed numeric text defaults rather than failing, so the header
//! walk always succeeds structurally.

use roxmltree::Node;

use crate::diag::{ParseLog, ParseOptions};
use crate::signature::Signature;
use crate::types::{DateTimeNumber, F16Number, S15Fixed16, SpectralRange, XyzNumber};
use crate::xml::{
    hex_fill, hex_string, parse_f64_lossy, parse_hex_u32, parse_hex_u64, parse_u16_lossy,
    xml_escape,
};

/// Profile file signature - 'acsp'. Stamped into every parsed header.
pub const PROFILE_FILE_SIGNATURE: u32 = 0x61637370;

/// Profile flag: the profile is embedded in a file.
pub const FLAG_EMBEDDED_IN_FILE: u32 = 0x0000_0001;
/// Profile flag: the profile may only be used with embedded data.
pub const FLAG_USE_WITH_EMBEDDED_DATA_ONLY: u32 = 0x0000_0002;

/// Device attribute: transparency media (bit clear means reflective).
pub const ATTR_TRANSPARENCY: u64 = 0x0000_0001;
/// Device attribute: matte media (bit clear means glossy).
pub const ATTR_MATTE: u64 = 0x0000_0002;

/// ICC Rendering Intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderingIntent {
    #[default]
    Perceptual,
    RelativeColorimetric,
    Saturation,
    AbsoluteColorimetric,
}

impl RenderingIntent {
    /// The textual form used in the XML document.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Perceptual => "Perceptual",
            Self::RelativeColorimetric => "Relative Colorimetric",
            Self::Saturation => "Saturation",
            Self::AbsoluteColorimetric => "Absolute Colorimetric",
        }
    }

    /// Closed four-way match. Anything else is `None` and the field
    /// keeps its default.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Perceptual" => Some(Self::Perceptual),
            "Relative Colorimetric" => Some(Self::RelativeColorimetric),
            "Saturation" => Some(Self::Saturation),
            "Absolute Colorimetric" => Some(Self::AbsoluteColorimetric),
            _ => None,
        }
    }
}

/// Render a packed version word as decimal `major.MB` text, where the
/// minor and bugfix digits share the fractional part.
///
/// The top four base-16 digits hold tens-of-major, major, minor and
/// bugfix: 0x04300000 is `4.30`, 0x02410000 is `2.41`, 0x10000000 is
/// `10.00`. This keeps every packed digit in a position the decimal
/// divide loop in [`version_from_text`] reads back exactly.
pub fn version_to_text(version: u32) -> String {
    let d = |i: u32| (version >> ((7 - i) * 4)) & 0xF;
    format!("{}.{}{}", d(0) * 10 + d(1), d(2), d(3))
}

/// Parse decimal version text into the packed word.
///
/// This is the exact inverse encoding: read the text as a decimal
/// number, then extract eight digits by repeated division by ten with a
/// 0.001 rounding allowance to absorb floating-point drift. Text beyond
/// the second version component is dropped by the decimal read.
pub fn version_from_text(text: &str) -> u32 {
    let mut v = parse_f64_lossy(text);
    let mut version: u32 = 0;
    let mut divisor = 10.0f64;
    for i in 0..8 {
        let units = (v / divisor + 0.001) as u32;
        v -= divisor * units as f64;
        divisor /= 10.0;
        version += units << ((7 - i) * 4);
    }
    version
}

/// The profile's fixed scalar header block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProfileHeader {
    /// Preferred CMM type signature
    pub cmm_id: Signature,
    /// Packed profile version (eight base-16 digits)
    pub version: u32,
    /// Device class (display, input, output, ...)
    pub device_class: Signature,
    /// Color space of device data
    pub color_space: Signature,
    /// Profile connection space
    pub pcs: Signature,
    /// Creation timestamp
    pub date: DateTimeNumber,
    /// Profile file signature, 'acsp' once parsed
    pub magic: u32,
    /// Primary platform signature, zero when unknown
    pub platform: Signature,
    /// Profile flags bit mask
    pub flags: u32,
    /// Device manufacturer signature
    pub manufacturer: Signature,
    /// Device model signature
    pub model: Signature,
    /// Device attributes bit mask
    pub attributes: u64,
    /// Rendering intent
    pub rendering_intent: RenderingIntent,
    /// PCS illuminant
    pub illuminant: XyzNumber,
    /// Profile creator signature
    pub creator: Signature,
    /// Profile content hash, or all zero
    pub profile_id: [u8; 16],
    /// Spectral PCS signature (zero when colorimetric only)
    pub spectral_pcs: Signature,
    /// Spectral sampling range
    pub spectral_range: SpectralRange,
    /// Bi-spectral sampling range
    pub bi_spectral_range: SpectralRange,
    /// Material connection space signature
    pub mcs: Signature,
    /// Device sub-class signature
    pub device_sub_class: Signature,
    /// Trailing reserved bytes, rendered as hex only when non-zero
    pub reserved: [u8; 4],
}

impl ProfileHeader {
    /// Serialize the header block. Field order is fixed; optional fields
    /// obey their non-zero predicates. Never fails.
    pub fn to_xml(&self, xml: &mut String) {
        let sig = |s: Signature| xml_escape(&s.to_text()).into_owned();

        xml.push_str(&format!(
            "    <PreferredCMMType>{}</PreferredCMMType>\n",
            sig(self.cmm_id)
        ));
        xml.push_str(&format!(
            "    <ProfileVersion>{}</ProfileVersion>\n",
            version_to_text(self.version)
        ));
        xml.push_str(&format!(
            "    <ProfileDeviceClass>{}</ProfileDeviceClass>\n",
            sig(self.device_class)
        ));
        xml.push_str(&format!(
            "    <DataColourSpace>{}</DataColourSpace>\n",
            sig(self.color_space)
        ));
        xml.push_str(&format!("    <PCS>{}</PCS>\n", sig(self.pcs)));
        xml.push_str(&format!(
            "    <CreationDateTime>{}</CreationDateTime>\n",
            self.date.to_text()
        ));

        if !self.platform.is_zero() {
            xml.push_str(&format!(
                "    <PrimaryPlatform>{}</PrimaryPlatform>\n",
                sig(self.platform)
            ));
        }

        self.flags_to_xml(xml);

        if !self.manufacturer.is_zero() {
            xml.push_str(&format!(
                "    <DeviceManufacturer>{}</DeviceManufacturer>\n",
                sig(self.manufacturer)
            ));
        }
        if !self.model.is_zero() {
            xml.push_str(&format!("    <DeviceModel>{}</DeviceModel>\n", sig(self.model)));
        }

        self.attributes_to_xml(xml);

        xml.push_str(&format!(
            "    <RenderingIntent>{}</RenderingIntent>\n",
            self.rendering_intent.name()
        ));
        xml.push_str(&format!(
            "    <PCSIlluminant>\n      <XYZNumber X=\"{:.8}\" Y=\"{:.8}\" Z=\"{:.8}\"/>\n    </PCSIlluminant>\n",
            self.illuminant.x.to_f64(),
            self.illuminant.y.to_f64(),
            self.illuminant.z.to_f64()
        ));
        xml.push_str(&format!(
            "    <ProfileCreator>{}</ProfileCreator>\n",
            sig(self.creator)
        ));

        if self.profile_id.iter().any(|&b| b != 0) {
            xml.push_str(&format!(
                "    <ProfileID>{}</ProfileID>\n",
                hex_string(&self.profile_id)
            ));
        }

        if !self.spectral_pcs.is_zero() {
            xml.push_str(&format!(
                "    <SpectralPCS>{}</SpectralPCS>\n",
                sig(self.spectral_pcs)
            ));
            if self.spectral_range.steps > 0 {
                range_to_xml(xml, "SpectralRange", &self.spectral_range);
            }
            if self.bi_spectral_range.steps > 0 {
                range_to_xml(xml, "BiSpectralRange", &self.bi_spectral_range);
            }
        }

        if !self.mcs.is_zero() {
            xml.push_str(&format!("    <MCS>{}</MCS>\n", sig(self.mcs)));
        }
        if !self.device_sub_class.is_zero() {
            xml.push_str(&format!(
                "    <ProfileDeviceSubClass>{}</ProfileDeviceSubClass>\n",
                sig(self.device_sub_class)
            ));
        }

        if self.reserved.iter().any(|&b| b != 0) {
            xml.push_str(&format!("    <Reserved>{}</Reserved>\n", hex_string(&self.reserved)));
        }
    }

    fn flags_to_xml(&self, xml: &mut String) {
        let named = FLAG_EMBEDDED_IN_FILE | FLAG_USE_WITH_EMBEDDED_DATA_ONLY;
        let vendor = self.flags & !named;
        xml.push_str(&format!(
            "    <ProfileFlags EmbeddedInFile=\"{}\" UseWithEmbeddedDataOnly=\"{}\"",
            bool_text(self.flags & FLAG_EMBEDDED_IN_FILE != 0),
            bool_text(self.flags & FLAG_USE_WITH_EMBEDDED_DATA_ONLY != 0)
        ));
        if vendor != 0 {
            xml.push_str(&format!(" VendorFlags=\"{vendor:08X}\""));
        }
        xml.push_str("/>\n");
    }

    fn attributes_to_xml(&self, xml: &mut String) {
        let named = ATTR_TRANSPARENCY | ATTR_MATTE;
        let vendor = self.attributes & !named;
        xml.push_str(&format!(
            "    <DeviceAttributes ReflectiveOrTransparency=\"{}\" GlossyOrMatte=\"{}\"",
            if self.attributes & ATTR_TRANSPARENCY != 0 {
                "transparency"
            } else {
                "reflective"
            },
            if self.attributes & ATTR_MATTE != 0 { "matte" } else { "glossy" }
        ));
        if vendor != 0 {
            xml.push_str(&format!(" VendorSpecific=\"{vendor:016X}\""));
        }
        xml.push_str("/>\n");
    }

    /// Parse a `Header` element's children into a header.
    ///
    /// Unrecognized element names are logged and skipped; the walk itself
    /// always succeeds. Fields absent from the document stay at their
    /// zero default.
    pub fn parse_xml(node: Node, log: &mut ParseLog, opts: ParseOptions) -> Self {
        let mut header = Self::default();

        for child in node.children().filter(|n| n.is_element()) {
            let name = child.tag_name().name();
            let text = child.text().unwrap_or("");
            match name {
                "PreferredCMMType" => header.cmm_id = Signature::from_text(text),
                "ProfileVersion" => header.version = version_from_text(text),
                "ProfileDeviceClass" => header.device_class = Signature::from_text(text),
                "DataColourSpace" => header.color_space = Signature::from_text(text),
                "PCS" => header.pcs = Signature::from_text(text),
                "CreationDateTime" => header.date = DateTimeNumber::from_text(text),
                "PrimaryPlatform" => header.platform = Signature::from_text(text),
                "ProfileFlags" => {
                    header.flags = 0;
                    if child.attribute("EmbeddedInFile") == Some("true") {
                        header.flags |= FLAG_EMBEDDED_IN_FILE;
                    }
                    if child.attribute("UseWithEmbeddedDataOnly") == Some("true") {
                        header.flags |= FLAG_USE_WITH_EMBEDDED_DATA_ONLY;
                    }
                    if let Some(vendor) = child.attribute("VendorFlags") {
                        header.flags |= parse_hex_u32(vendor);
                    }
                }
                "DeviceManufacturer" => header.manufacturer = Signature::from_text(text),
                "DeviceModel" => header.model = Signature::from_text(text),
                "DeviceAttributes" => {
                    header.attributes = 0;
                    if child.attribute("ReflectiveOrTransparency") == Some("transparency") {
                        header.attributes |= ATTR_TRANSPARENCY;
                    }
                    if child.attribute("GlossyOrMatte") == Some("matte") {
                        header.attributes |= ATTR_MATTE;
                    }
                    if let Some(vendor) = child.attribute("VendorSpecific") {
                        header.attributes |= parse_hex_u64(vendor);
                    }
                }
                "RenderingIntent" => match RenderingIntent::from_name(text) {
                    Some(intent) => header.rendering_intent = intent,
                    None => {
                        if opts.log_unrecognized {
                            log.warn(format!("Unknown rendering intent: \"{text}\""));
                        }
                    }
                },
                "PCSIlluminant" => {
                    if let Some(xyz) = child.children().find(|n| n.has_tag_name("XYZNumber")) {
                        if let (Some(x), Some(y), Some(z)) =
                            (xyz.attribute("X"), xyz.attribute("Y"), xyz.attribute("Z"))
                        {
                            header.illuminant = XyzNumber {
                                x: S15Fixed16::from_f64(parse_f64_lossy(x)),
                                y: S15Fixed16::from_f64(parse_f64_lossy(y)),
                                z: S15Fixed16::from_f64(parse_f64_lossy(z)),
                            };
                        }
                    }
                }
                "ProfileCreator" => header.creator = Signature::from_text(text),
                "ProfileID" => {
                    header.profile_id = [0; 16];
                    hex_fill(&mut header.profile_id, text);
                }
                "SpectralPCS" => header.spectral_pcs = Signature::from_text(text),
                "SpectralRange" => header.spectral_range = range_from_xml(child),
                "BiSpectralRange" => header.bi_spectral_range = range_from_xml(child),
                "MCS" => header.mcs = Signature::from_text(text),
                "ProfileDeviceSubClass" => header.device_sub_class = Signature::from_text(text),
                "Reserved" => {
                    header.reserved = [0; 4];
                    hex_fill(&mut header.reserved, text);
                }
                _ => log.warn_unknown_header_attr(name, text),
            }
        }

        header.magic = PROFILE_FILE_SIGNATURE;
        header
    }
}

fn bool_text(v: bool) -> &'static str {
    if v { "true" } else { "false" }
}

fn range_to_xml(xml: &mut String, element: &str, range: &SpectralRange) {
    xml.push_str(&format!(
        "    <{element}>\n      <Wavelengths start=\"{:.8}\" end=\"{:.8}\" steps=\"{}\"/>\n    </{element}>\n",
        range.start.to_f32(),
        range.end.to_f32(),
        range.steps
    ));
}

fn range_from_xml(node: Node) -> SpectralRange {
    let Some(w) = node.children().find(|n| n.has_tag_name("Wavelengths")) else {
        return SpectralRange::default();
    };
    match (w.attribute("start"), w.attribute("end"), w.attribute("steps")) {
        (Some(start), Some(end), Some(steps)) => SpectralRange {
            start: F16Number::from_f32(parse_f64_lossy(start) as f32),
            end: F16Number::from_f32(parse_f64_lossy(end) as f32),
            steps: parse_u16_lossy(steps),
        },
        _ => SpectralRange::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_text() {
        assert_eq!(version_to_text(0x0430_0000), "4.30");
        assert_eq!(version_to_text(0x0210_0000), "2.10");
        assert_eq!(version_to_text(0x0241_0000), "2.41");
        assert_eq!(version_to_text(0), "0.00");
        assert_eq!(version_to_text(0x1000_0000), "10.00");
    }

    #[test]
    fn test_version_parse() {
        assert_eq!(version_from_text("4.3.0"), 0x0430_0000);
        assert_eq!(version_from_text("4.30"), 0x0430_0000);
        assert_eq!(version_from_text("2.41"), 0x0241_0000);
        assert_eq!(version_from_text("2.1.0"), 0x0210_0000);
        assert_eq!(version_from_text("0.0.0"), 0);
        assert_eq!(version_from_text(""), 0);
        // two-digit majors land in the top packed digit
        assert_eq!(version_from_text("10.0.0"), 0x1000_0000);
    }

    #[test]
    fn test_version_roundtrip() {
        for packed in [0u32, 0x0430_0000, 0x0210_0000, 0x0241_0000, 0x1000_0000] {
            assert_eq!(version_from_text(&version_to_text(packed)), packed);
        }
    }

    #[test]
    fn test_rendering_intent_names() {
        for intent in [
            RenderingIntent::Perceptual,
            RenderingIntent::RelativeColorimetric,
            RenderingIntent::Saturation,
            RenderingIntent::AbsoluteColorimetric,
        ] {
            assert_eq!(RenderingIntent::from_name(intent.name()), Some(intent));
        }
        assert_eq!(RenderingIntent::from_name("Vivid"), None);
    }

    #[test]
    fn test_flags_render() {
        let mut header = ProfileHeader {
            flags: FLAG_EMBEDDED_IN_FILE | 0x0001_0000,
            ..Default::default()
        };
        let mut xml = String::new();
        header.flags_to_xml(&mut xml);
        assert_eq!(
            xml,
            "    <ProfileFlags EmbeddedInFile=\"true\" UseWithEmbeddedDataOnly=\"false\" VendorFlags=\"00010000\"/>\n"
        );

        header.flags = 0;
        xml.clear();
        header.flags_to_xml(&mut xml);
        assert!(!xml.contains("VendorFlags"));
    }

    #[test]
    fn test_attributes_render() {
        let header = ProfileHeader {
            attributes: ATTR_MATTE,
            ..Default::default()
        };
        let mut xml = String::new();
        header.attributes_to_xml(&mut xml);
        assert_eq!(
            xml,
            "    <DeviceAttributes ReflectiveOrTransparency=\"reflective\" GlossyOrMatte=\"matte\"/>\n"
        );
    }
}
