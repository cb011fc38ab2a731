//! # iccxml - ICC Profile XML Conversion
//!
//! Converts the fixed-layout binary descriptor of an ICC color profile
//! (scalar header plus a directory of typed, variable-length tags) to a
//! hierarchical XML document and back, preserving the bit-level details
//! needed to regenerate an equivalent profile: zero-suppressed optional
//! header fields, bit-flag names, and shared tag payloads.
//!
//! ## Structure
//!
//! The document wraps two blocks:
//! 1. `<Header>` - scalar fields in a fixed order
//! 2. `<Tags>` - one grouping element per distinct payload, each holding
//!    one or more `<TagSignature>` children followed by type content
//!
//! ## Quick Start
//!
//! ```
//! use iccxml_core::{IccProfileXml, ParseLog, ParseOptions};
//!
//! let doc = "<IccProfile><Header>\
//!   <ProfileVersion>4.30</ProfileVersion>\
//!   <DataColourSpace>RGB </DataColourSpace>\
//!   <PCS>XYZ </PCS>\
//! </Header><Tags/></IccProfile>";
//!
//! let mut log = ParseLog::new();
//! let profile = IccProfileXml::parse_xml(doc, &mut log, ParseOptions::default()).unwrap();
//! assert_eq!(profile.header.version, 0x0430_0000);
//!
//! let xml = profile.to_xml().unwrap();
//! assert!(xml.contains("<ProfileVersion>4.30</ProfileVersion>"));
//! ```
//!
//! ## Error model
//!
//! Two tiers. Structural failures (missing blocks, unresolvable or
//! non-parseable tags, schema rejection) abort the conversion with an
//! [`XmlError`]. Everything else is tolerated: unrecognized header
//! elements and malformed numeric subfields are recorded in a
//! [`ParseLog`] and parsing continues.

pub mod diag;
pub mod error;
pub mod header;
pub mod profile;
pub mod schema;
pub mod signature;
pub mod tag;
pub mod types;
pub mod xml;

pub use diag::{ParseLog, ParseOptions};
pub use error::{Result, XmlError};
pub use header::{ProfileHeader, RenderingIntent};
pub use profile::{IccProfileXml, TagDirectoryEntry};
pub use schema::{SchemaError, SchemaValidator};
pub use signature::Signature;
pub use tag::{CurveTag, MultiBusTag, NamedColorTag, PrivateTag, Tag};
pub use types::{DateTimeNumber, F16Number, S15Fixed16, SpectralRange, XyzNumber};

/// Version of iccxml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
