use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// FieldType – primitive type tag of a dataset field
// ---------------------------------------------------------------------------

/// Primitive type tag attached to every field path of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Boolean,
    Int,
    Float,
    FrameNumber,
    /// A `[first, last]` pair of frame numbers.
    FrameSupport,
    Date,
    DateTime,
    ObjectId,
    String,
    List,
    Dict,
    EmbeddedDocument,
    Vector,
    GeoPoint,
}

impl FieldType {
    /// Types whose values can be compared against a numeric range.
    pub fn is_numeric(self) -> bool {
        matches!(
            self,
            FieldType::Int
                | FieldType::Float
                | FieldType::FrameNumber
                | FieldType::Date
                | FieldType::DateTime
        )
    }

    /// Types holding a sequence of values rather than a single one.
    pub fn is_list_like(self) -> bool {
        matches!(self, FieldType::List | FieldType::FrameSupport)
    }

    pub fn is_date_like(self) -> bool {
        matches!(self, FieldType::Date | FieldType::DateTime)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldType::Boolean => "boolean",
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::FrameNumber => "frame_number",
            FieldType::FrameSupport => "frame_support",
            FieldType::Date => "date",
            FieldType::DateTime => "date_time",
            FieldType::ObjectId => "object_id",
            FieldType::String => "string",
            FieldType::List => "list",
            FieldType::Dict => "dict",
            FieldType::EmbeddedDocument => "embedded_document",
            FieldType::Vector => "vector",
            FieldType::GeoPoint => "geo_point",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// FieldValue – a single cell of a sample
// ---------------------------------------------------------------------------

/// A dynamically-typed field value.
///
/// Dates and date-times are kept as milliseconds since the Unix epoch, which
/// is also the unit used for their range bounds.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    String(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    Date(f64),
    DateTime(f64),
    List(Vec<FieldValue>),
    Null,
}

impl FieldValue {
    /// Interpret the value as an `f64` for range comparisons.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Float(v) | FieldValue::Date(v) | FieldValue::DateTime(v) => Some(*v),
            FieldValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    /// The type tag this value would carry in an inferred schema.
    /// `None` for nulls, which carry no type information.
    pub fn field_type(&self) -> Option<FieldType> {
        match self {
            FieldValue::String(_) => Some(FieldType::String),
            FieldValue::Integer(_) => Some(FieldType::Int),
            FieldValue::Float(_) => Some(FieldType::Float),
            FieldValue::Bool(_) => Some(FieldType::Boolean),
            FieldValue::Date(_) => Some(FieldType::Date),
            FieldValue::DateTime(_) => Some(FieldType::DateTime),
            FieldValue::List(_) => Some(FieldType::List),
            FieldValue::Null => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::String(s) => write!(f, "{s}"),
            FieldValue::Integer(i) => write!(f, "{i}"),
            FieldValue::Float(v) => write!(f, "{v:.4}"),
            FieldValue::Bool(b) => write!(f, "{b}"),
            FieldValue::Date(ms) => write!(f, "date({ms})"),
            FieldValue::DateTime(ms) => write!(f, "datetime({ms})"),
            FieldValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            FieldValue::Null => write!(f, "<null>"),
        }
    }
}

// ---------------------------------------------------------------------------
// Sample – one row of the dataset
// ---------------------------------------------------------------------------

static NULL: FieldValue = FieldValue::Null;

/// A single sample: field path → value.
#[derive(Debug, Clone, Default)]
pub struct Sample {
    pub fields: BTreeMap<String, FieldValue>,
}

impl Sample {
    pub fn get(&self, path: &str) -> Option<&FieldValue> {
        self.fields.get(path)
    }

    /// Like [`Sample::get`], reading a missing path as null.
    pub fn value(&self, path: &str) -> &FieldValue {
        self.fields.get(path).unwrap_or(&NULL)
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded collection
// ---------------------------------------------------------------------------

/// The loaded samples with the ordered list of field paths seen across them.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub samples: Vec<Sample>,
    pub field_paths: Vec<String>,
}

impl Dataset {
    /// Build the field index from the loaded samples.
    pub fn from_samples(samples: Vec<Sample>) -> Self {
        let paths: BTreeSet<String> = samples
            .iter()
            .flat_map(|s| s.fields.keys().cloned())
            .collect();
        Dataset {
            samples,
            field_paths: paths.into_iter().collect(),
        }
    }

    /// Iterate over the values of one field, yielding null for samples that
    /// lack it.
    pub fn values<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a FieldValue> + 'a {
        self.samples
            .iter()
            .map(move |s| s.value(path))
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_values_convert_to_f64() {
        assert_eq!(FieldValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(FieldValue::DateTime(1_000.0).as_f64(), Some(1_000.0));
        assert_eq!(FieldValue::String("3".into()).as_f64(), None);
        assert_eq!(FieldValue::Null.as_f64(), None);
    }

    #[test]
    fn missing_fields_read_as_null() {
        let mut a = Sample::default();
        a.fields.insert("x".into(), FieldValue::Integer(1));
        let ds = Dataset::from_samples(vec![a, Sample::default()]);

        let values: Vec<_> = ds.values("x").cloned().collect();
        assert_eq!(values, vec![FieldValue::Integer(1), FieldValue::Null]);
        assert_eq!(ds.field_paths, vec!["x".to_string()]);
    }

    #[test]
    fn list_like_types() {
        assert!(FieldType::List.is_list_like());
        assert!(FieldType::FrameSupport.is_list_like());
        assert!(!FieldType::Int.is_list_like());
        assert!(FieldType::DateTime.is_numeric());
        assert!(!FieldType::String.is_numeric());
    }
}
