//! Closed model of library semantics.
//!
//! Semantics arrive as JSON arrays of field definitions keyed by a `type`
//! string. They are parsed once into [`SemanticsNode`] trees so traversal
//! dispatches on [`FieldKind`] instead of comparing strings.

use folio_types::LibraryName;
use serde::Deserialize;
use serde_json::Value;

use crate::{Result, ScanError};

/// Kinds of fields that hold uploaded binary assets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    File,
    Image,
    Video,
    Audio,
}

impl AssetKind {
    fn from_type(type_name: &str) -> Option<Self> {
        match type_name {
            "file" => Some(AssetKind::File),
            "image" => Some(AssetKind::Image),
            "video" => Some(AssetKind::Video),
            "audio" => Some(AssetKind::Audio),
            _ => None,
        }
    }
}

/// What a semantics field contains.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// A named set of child fields.
    Group(Vec<SemanticsNode>),
    /// A homogeneous array of one item schema.
    List(Box<SemanticsNode>),
    /// An embedded library instance; `options` lists the allowed libraries.
    Library(Vec<LibraryName>),
    /// An uploaded asset.
    Asset(AssetKind),
    /// Anything that cannot contain file references (text, number, select, ...).
    Scalar,
}

/// A single field definition.
#[derive(Debug, Clone, PartialEq)]
pub struct SemanticsNode {
    pub name: String,
    pub kind: FieldKind,
    pub optional: bool,
}

impl SemanticsNode {
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            optional: false,
        }
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// The top-level semantics of a library: its ordered root fields.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Semantics {
    pub fields: Vec<SemanticsNode>,
}

#[derive(Debug, Deserialize)]
struct RawField {
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    field_type: String,
    #[serde(default)]
    optional: bool,
    #[serde(default)]
    fields: Vec<RawField>,
    field: Option<Box<RawField>>,
    #[serde(default)]
    options: Vec<Value>,
}

impl Semantics {
    pub fn new(fields: Vec<SemanticsNode>) -> Self {
        Self { fields }
    }

    /// Parse semantics from their JSON representation.
    pub fn from_json(value: &Value) -> Result<Self> {
        let raw: Vec<RawField> = serde_json::from_value(value.clone())?;
        let fields = raw.into_iter().map(convert).collect::<Result<Vec<_>>>()?;
        Ok(Self { fields })
    }

    /// Parse semantics from raw `semantics.json` bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_json::from_slice(bytes)?;
        Self::from_json(&value)
    }
}

fn convert(raw: RawField) -> Result<SemanticsNode> {
    let kind = match raw.field_type.as_str() {
        "group" => FieldKind::Group(
            raw.fields
                .into_iter()
                .map(convert)
                .collect::<Result<Vec<_>>>()?,
        ),
        "list" => {
            let item = raw.field.ok_or_else(|| {
                ScanError::InvalidSemantics(format!("list field '{}' has no item field", raw.name))
            })?;
            FieldKind::List(Box::new(convert(*item)?))
        }
        "library" => FieldKind::Library(
            raw.options
                .iter()
                .filter_map(Value::as_str)
                .filter_map(|s| s.parse().ok())
                .collect(),
        ),
        other => match AssetKind::from_type(other) {
            Some(asset) => FieldKind::Asset(asset),
            None => FieldKind::Scalar,
        },
    };

    Ok(SemanticsNode {
        name: raw.name,
        kind,
        optional: raw.optional,
    })
}
