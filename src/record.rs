//! Record-to-field mapping.
//!
//! A [`RecordSchema`] is a static table of `(field name, accessor, policy)`
//! entries built once per record type. Binding a record against it yields
//! the ordered [`RecordField`] list the populator consumes.
//!
//! ```
//! use pdf_filler::policy::FieldPolicy;
//! use pdf_filler::record::RecordSchema;
//!
//! struct Invoice {
//!     number: u32,
//!     notes: Option<String>,
//! }
//!
//! let schema = RecordSchema::new()
//!     .field("Invoice.Number", |r: &Invoice| Some(r.number.to_string()), FieldPolicy::required())
//!     .field("Invoice.Notes", |r: &Invoice| r.notes.clone(), FieldPolicy::optional().multi_line());
//!
//! let fields = schema.bind(&Invoice { number: 42, notes: None });
//! assert_eq!(fields[0].present_value(), Some("42"));
//! assert_eq!(fields[1].present_value(), None);
//! ```

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::Result;
use crate::policy::FieldPolicy;

/// One field of one record, ready to populate.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordField {
    /// Full AcroForm field name
    pub name: String,
    /// Stringified value or file path
    pub value: Option<String>,
    /// Rule for the field
    pub policy: FieldPolicy,
}

impl RecordField {
    /// Create a record field.
    pub fn new(name: impl Into<String>, value: Option<String>, policy: FieldPolicy) -> Self {
        Self {
            name: name.into(),
            value,
            policy,
        }
    }

    /// The value, unless it is missing or blank.
    pub fn present_value(&self) -> Option<&str> {
        self.value.as_deref().filter(|v| !v.trim().is_empty())
    }
}

type Accessor<T> = Box<dyn Fn(&T) -> Option<String> + Send + Sync>;

struct SchemaEntry<T> {
    name: String,
    accessor: Accessor<T>,
    policy: FieldPolicy,
}

/// Ordered field table for records of type `T`.
pub struct RecordSchema<T> {
    entries: Vec<SchemaEntry<T>>,
}

impl<T> RecordSchema<T> {
    /// Empty schema.
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Append a field.
    pub fn field<F>(mut self, name: impl Into<String>, accessor: F, policy: FieldPolicy) -> Self
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        self.entries.push(SchemaEntry {
            name: name.into(),
            accessor: Box::new(accessor),
            policy,
        });
        self
    }

    /// Extract every field of `record`, in declaration order.
    pub fn bind(&self, record: &T) -> Vec<RecordField> {
        self.entries
            .iter()
            .map(|entry| RecordField::new(entry.name.clone(), (entry.accessor)(record), entry.policy.clone()))
            .collect()
    }

    /// Number of declared fields.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if no fields are declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Declared field names, in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }
}

impl<T> Default for RecordSchema<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for RecordSchema<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordSchema")
            .field("fields", &self.field_names().collect::<Vec<_>>())
            .finish()
    }
}

/// A record type that owns its field table.
pub trait FormRecord: Sized {
    /// The field table for this type.
    fn schema() -> RecordSchema<Self>;
}

/// One manifest entry.
#[derive(Debug, Clone, Deserialize)]
pub struct ManifestEntry {
    /// Full field name, also the key looked up in the data object
    pub name: String,
    /// Rule for the field
    #[serde(default)]
    pub policy: FieldPolicy,
}

/// Field table loaded from JSON, for records that arrive as JSON objects.
///
/// ```json
/// [
///   {"name": "Customer", "policy": {"presence": "Required"}},
///   {"name": "Photo", "policy": {"presence": "Optional", "content": "Image"}}
/// ]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct FieldManifest {
    entries: Vec<ManifestEntry>,
}

impl FieldManifest {
    /// Parse a manifest.
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read and parse a manifest file.
    pub fn from_json_file(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Entries in order.
    pub fn entries(&self) -> &[ManifestEntry] {
        &self.entries
    }

    /// Pair every entry with its value from `data`.
    ///
    /// Missing keys and `null` are absent; strings are taken verbatim;
    /// numbers and booleans are stringified; arrays and objects are kept as JSON text.
    pub fn bind(&self, data: &Map<String, Value>) -> Vec<RecordField> {
        self.entries
            .iter()
            .map(|entry| {
                let value = data.get(&entry.name).and_then(json_to_text);
                RecordField::new(entry.name.clone(), value, entry.policy.clone())
            })
            .collect()
    }
}

fn json_to_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        other => Some(other.to_string()),
    }
}
