use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Identifier of one of the fixed target layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutId {
    Member,
    ServiceProvider,
    BillCustomDetail,
}

impl LayoutId {
    /// Every supported layout, in catalog order.
    pub const ALL: [LayoutId; 3] = [
        LayoutId::Member,
        LayoutId::ServiceProvider,
        LayoutId::BillCustomDetail,
    ];

    /// Machine identifier, also the stem of the layout's reference file.
    pub const fn as_str(&self) -> &'static str {
        match self {
            LayoutId::Member => "member",
            LayoutId::ServiceProvider => "service_provider",
            LayoutId::BillCustomDetail => "bill_custom_detail",
        }
    }

    /// Human-readable layout name.
    pub const fn display_name(&self) -> &'static str {
        match self {
            LayoutId::Member => "Member",
            LayoutId::ServiceProvider => "Service Provider",
            LayoutId::BillCustomDetail => "Bill Custom Detail",
        }
    }

    /// Documented number of fields in the layout.
    pub const fn expected_field_count(&self) -> usize {
        match self {
            LayoutId::Member => 52,
            LayoutId::ServiceProvider => 38,
            LayoutId::BillCustomDetail => 124,
        }
    }
}

impl fmt::Display for LayoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LayoutId {
    type Err = ModelError;

    /// Accepts the machine id (`bill_custom_detail`) or the display name
    /// (`Bill Custom Detail`), case-insensitive, with `-` or space separators.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");
        LayoutId::ALL
            .into_iter()
            .find(|id| id.as_str() == normalized)
            .ok_or_else(|| ModelError::UnknownLayout(s.trim().to_string()))
    }
}

/// Semantic type tag of a layout field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    String,
    Date,
    Numeric,
    Code,
}

impl FieldType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Date => "date",
            FieldType::Numeric => "numeric",
            FieldType::Code => "code",
        }
    }

    /// Parse a type tag as written in layout reference files.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "string" | "str" | "char" | "character" | "varchar" | "text" => Some(FieldType::String),
            "date" | "datetime" | "timestamp" => Some(FieldType::Date),
            "numeric" | "number" | "num" | "integer" | "int" | "decimal" | "amount" => {
                Some(FieldType::Numeric)
            }
            "code" => Some(FieldType::Code),
            _ => None,
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub data_type: FieldType,
    pub description: String,
}

/// A fixed target schema. Built once by the catalog and never mutated.
#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    id: LayoutId,
    fields: Vec<FieldSpec>,
    #[serde(skip)]
    index: BTreeMap<String, usize>,
}

impl Layout {
    /// Build a layout, rejecting empty and duplicate (case-insensitive) field names.
    pub fn new(id: LayoutId, fields: Vec<FieldSpec>) -> Result<Self> {
        let mut index = BTreeMap::new();
        for (position, field) in fields.iter().enumerate() {
            let key = field.name.trim().to_ascii_uppercase();
            if key.is_empty() {
                return Err(ModelError::EmptyFieldName {
                    layout: id.to_string(),
                });
            }
            if index.insert(key, position).is_some() {
                return Err(ModelError::DuplicateField {
                    layout: id.to_string(),
                    field: field.name.clone(),
                });
            }
        }
        Ok(Self { id, fields, index })
    }

    pub fn id(&self) -> LayoutId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.id.display_name()
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Look up a field by name, ignoring ASCII case and surrounding whitespace.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.index
            .get(&name.trim().to_ascii_uppercase())
            .map(|&position| &self.fields[position])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    pub fn summary(&self) -> LayoutSummary {
        LayoutSummary {
            id: self.id,
            name: self.name().to_string(),
            field_count: self.fields.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSummary {
    pub id: LayoutId,
    pub name: String,
    pub field_count: usize,
}

/// First fields of a layout, for rendering before a mapping is requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutPreview {
    pub id: LayoutId,
    pub name: String,
    pub total_fields: usize,
    pub preview: Vec<FieldSpec>,
}
