//! Error types for iccxml
//!
//! Only the fatal tier lives here: failures that abort the whole
//! conversion. Non-fatal anomalies go to [`crate::diag::ParseLog`] and
//! parsing continues.

use thiserror::Error;

/// Result type for iccxml operations
pub type Result<T> = std::result::Result<T, XmlError>;

/// Fatal conversion errors
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum XmlError {
    /// The document is not well-formed XML
    #[error("XML parse error: {0}")]
    Malformed(#[from] roxmltree::Error),

    /// A structurally required element is absent
    #[error("missing required element: {0}")]
    MissingElement(&'static str),

    /// A node in the tag list is not an element
    #[error("invalid tag node: {0}")]
    InvalidTagNode(String),

    /// A directory entry has no payload to serialize
    #[error("unable to resolve tag with signature '{0}'")]
    UnresolvedTagSignature(String),

    /// No payload could be created for the tag's type signature
    #[error("invalid tag extension for \"{type_name}\" ({element}) tag")]
    InvalidTagExtension { type_name: String, element: String },

    /// The payload codec rejected the tag's inner content
    #[error("unable to parse \"{type_name}\" ({element}) tag")]
    TagPayloadParse { type_name: String, element: String },

    /// The payload codec failed to emit the tag's inner content
    #[error("unable to serialize tag with type '{0}'")]
    TagPayloadSerialize(String),

    /// The schema gate could not be set up
    #[error("schema setup failed: {0}")]
    SchemaSetup(String),

    /// The document failed schema validation
    #[error("'{file}' is an invalid XML file: result {code}")]
    SchemaValidation { file: String, code: i32 },

    /// I/O error reading the document
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
