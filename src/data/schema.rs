use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::model::{Dataset, FieldType, FieldValue};

// ---------------------------------------------------------------------------
// FieldSchema – field path → type tag
// ---------------------------------------------------------------------------

/// Type metadata of a dataset: the primitive type of every field path, plus
/// the element type of `list` fields.
///
/// Every predicate is total: an unknown path has no type and matches nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    #[serde(default)]
    pub primitives: BTreeMap<String, FieldType>,
    #[serde(default)]
    pub subfields: BTreeMap<String, FieldType>,
}

impl FieldSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion of a scalar field.
    pub fn with_field(mut self, path: &str, ty: FieldType) -> Self {
        self.primitives.insert(path.to_string(), ty);
        self
    }

    /// Builder-style insertion of a `list` field with element type `element`.
    pub fn with_list(mut self, path: &str, element: FieldType) -> Self {
        self.primitives.insert(path.to_string(), FieldType::List);
        self.subfields.insert(path.to_string(), element);
        self
    }

    pub fn primitive(&self, path: &str) -> Option<FieldType> {
        self.primitives.get(path).copied()
    }

    pub fn subfield(&self, path: &str) -> Option<FieldType> {
        self.subfields.get(path).copied()
    }

    /// The type a filter on `path` compares against: lists resolve through
    /// the subfield map, frame supports hold ints.
    pub fn element_type(&self, path: &str) -> Option<FieldType> {
        match self.primitive(path)? {
            FieldType::List => self.subfield(path),
            FieldType::FrameSupport => Some(FieldType::Int),
            other => Some(other),
        }
    }

    /// Whether `path` is of type `ty`, directly or as the element type of a
    /// `list` field.
    pub fn meets_type(&self, path: &str, ty: FieldType) -> bool {
        match self.primitive(path) {
            Some(p) if p == ty => true,
            Some(FieldType::List) => self.subfield(path) == Some(ty),
            _ => false,
        }
    }

    pub fn is_list_field(&self, path: &str) -> bool {
        self.primitive(path).is_some_and(FieldType::is_list_like)
    }

    pub fn is_date_field(&self, path: &str) -> bool {
        self.meets_type(path, FieldType::Date)
    }

    pub fn is_date_time_field(&self, path: &str) -> bool {
        self.meets_type(path, FieldType::DateTime)
    }

    pub fn is_date_or_date_time_field(&self, path: &str) -> bool {
        self.element_type(path).is_some_and(FieldType::is_date_like)
    }

    pub fn is_int_field(&self, path: &str) -> bool {
        self.element_type(path) == Some(FieldType::Int)
    }

    pub fn is_numeric_field(&self, path: &str) -> bool {
        self.element_type(path).is_some_and(FieldType::is_numeric)
    }

    /// Field paths whose element type can carry a range filter.
    pub fn numeric_paths(&self) -> impl Iterator<Item = &str> {
        self.primitives
            .keys()
            .map(String::as_str)
            .filter(|p| self.is_numeric_field(p))
    }

    /// Derive a schema from loaded samples.
    ///
    /// The first non-null value decides the type, except that ints seen next
    /// to floats widen to `float`. Fields with only nulls are left out.
    pub fn infer(dataset: &Dataset) -> Self {
        let mut schema = FieldSchema::new();
        for path in &dataset.field_paths {
            let mut primitive: Option<FieldType> = None;
            let mut element: Option<FieldType> = None;
            for value in dataset.values(path) {
                primitive = widen(primitive, value.field_type());
                if let FieldValue::List(items) = value {
                    for item in items {
                        element = widen(element, item.field_type());
                    }
                }
            }
            let Some(primitive) = primitive else {
                continue;
            };
            schema.primitives.insert(path.clone(), primitive);
            if primitive == FieldType::List {
                if let Some(element) = element {
                    schema.subfields.insert(path.clone(), element);
                }
            }
        }
        schema
    }
}

fn widen(seen: Option<FieldType>, next: Option<FieldType>) -> Option<FieldType> {
    match (seen, next) {
        (None, next) => next,
        (Some(FieldType::Int), Some(FieldType::Float)) => Some(FieldType::Float),
        (seen, _) => seen,
    }
}
