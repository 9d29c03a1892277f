use crate::error::{Error, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// A canonical, owned value tree.
///
/// Object entries keep their original insertion order, which is significant
/// for the flattened output. The tree is built either from parsed JSON text
/// or from any `Serialize` record; it never contains cycles.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueNode {
    /// The null scalar
    Null,
    /// A boolean scalar
    Bool(bool),
    /// A numeric scalar, rendered in its canonical textual form
    Number(serde_json::Number),
    /// A string scalar
    String(String),
    /// An ordered sequence of values
    Array(Vec<ValueNode>),
    /// An ordered sequence of unique key/value entries
    Object(Vec<(String, ValueNode)>),
}

impl ValueNode {
    /// Converts a parsed JSON value into a tree, preserving object order.
    #[must_use]
    pub fn from_json(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => Self::Number(n),
            Value::String(s) => Self::String(s),
            Value::Array(items) => Self::Array(items.into_iter().map(Self::from_json).collect()),
            Value::Object(map) => Self::Object(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from_json(value)))
                    .collect(),
            ),
        }
    }

    /// Returns true for non-container nodes.
    #[must_use]
    pub const fn is_scalar(&self) -> bool {
        !matches!(self, Self::Array(_) | Self::Object(_))
    }

    /// Renders a scalar node to its canonical text; `None` for containers.
    #[must_use]
    pub fn render_scalar(&self) -> Option<String> {
        match self {
            Self::Null => Some("null".to_string()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Number(n) => Some(n.to_string()),
            Self::String(s) => Some(s.clone()),
            Self::Array(_) | Self::Object(_) => None,
        }
    }

    /// Renders the tree as compact JSON with no embedded whitespace.
    #[must_use]
    pub fn to_compact_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

impl Serialize for ValueNode {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Number(n) => n.serialize(serializer),
            Self::String(s) => serializer.serialize_str(s),
            Self::Array(items) => items.serialize(serializer),
            Self::Object(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (key, value) in entries {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

/// The shape of an array, re-derived wherever it is needed.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum ArrayShape<'a> {
    /// All elements are objects sharing one key set; keys are in the
    /// first element's original order.
    Uniform {
        /// Column keys for the tabular rendering
        keys: Vec<&'a str>,
    },
    /// All elements are scalars.
    Primitive,
    /// Anything else; elements are rendered per index.
    Mixed,
    /// Length zero; neither uniform nor primitive.
    Empty,
}

/// Classifies an array as uniform, primitive, or mixed.
///
/// Key-set comparison is order-independent; differing cardinality or any
/// non-object element disqualifies uniformity.
pub(crate) fn array_shape(items: &[ValueNode]) -> ArrayShape<'_> {
    if items.is_empty() {
        return ArrayShape::Empty;
    }

    if items.iter().all(ValueNode::is_scalar) {
        return ArrayShape::Primitive;
    }

    let ValueNode::Object(first) = &items[0] else {
        return ArrayShape::Mixed;
    };
    let keys: Vec<&str> = first.iter().map(|(key, _)| key.as_str()).collect();

    for item in &items[1..] {
        let ValueNode::Object(entries) = item else {
            return ArrayShape::Mixed;
        };
        if entries.len() != keys.len()
            || !keys
                .iter()
                .all(|key| entries.iter().any(|(name, _)| name == key))
        {
            return ArrayShape::Mixed;
        }
    }

    ArrayShape::Uniform { keys }
}

/// What a caller hands to the optimizer.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    /// Plain or JSON-shaped text
    Text(String),
    /// An opaque binary blob
    Bytes(Vec<u8>),
    /// An already-structured value
    Value(Value),
}

impl Source {
    /// Wraps text input.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text(text.into())
    }

    /// Wraps binary input.
    pub fn bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Serializes any structured record into a source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] naming the record's declared type
    /// when the conversion fails; the optimizer recovers this into a
    /// diagnostic line rather than propagating it.
    pub fn record<T: serde::Serialize>(record: &T) -> Result<Self> {
        serde_json::to_value(record)
            .map(Self::Value)
            .map_err(|e| Error::serialization(std::any::type_name::<T>(), e))
    }
}

/// Result of normalizing a [`Source`] against the configured threshold.
#[derive(Debug, Clone)]
pub(crate) enum Classified {
    /// A parsed or converted value tree
    Tree(ValueNode),
    /// Text at or below the long-text threshold
    Text(String),
    /// Text above the long-text threshold
    LongText(String),
    /// An opaque binary blob
    Binary(Vec<u8>),
    /// JSON-shaped text that failed to parse
    Malformed(Error),
}

/// Normalizes a source into its classified form.
///
/// Text is JSON-like when, after trimming, it is brace- or
/// bracket-delimited; such text is parsed rather than measured against the
/// threshold.
pub(crate) fn classify(source: Source, long_text_threshold: usize) -> Classified {
    match source {
        Source::Text(text) => {
            if looks_like_json(&text) {
                match serde_json::from_str::<Value>(text.trim()) {
                    Ok(value) => Classified::Tree(ValueNode::from_json(value)),
                    Err(e) => Classified::Malformed(e.into()),
                }
            } else if text.chars().count() > long_text_threshold {
                Classified::LongText(text)
            } else {
                Classified::Text(text)
            }
        }
        Source::Bytes(bytes) => Classified::Binary(bytes),
        Source::Value(value) => Classified::Tree(ValueNode::from_json(value)),
    }
}

/// Returns true when trimmed text is brace- or bracket-delimited.
fn looks_like_json(text: &str) -> bool {
    let trimmed = text.trim();
    (trimmed.starts_with('{') && trimmed.ends_with('}'))
        || (trimmed.starts_with('[') && trimmed.ends_with(']'))
}
