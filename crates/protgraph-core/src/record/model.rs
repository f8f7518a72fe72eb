//! Attribute tree models.

use std::collections::BTreeMap;

/// Key under which an element's character data is stored when the element
/// also carries attributes or children.
pub const TEXT_KEY: &str = "#text";

/// A value in the attribute tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// An element with no attributes and no children.
    Text(String),
    /// An element with attributes and/or children.
    Record(Record),
    /// Repeated sibling elements sharing a name, in document order.
    List(Vec<Value>),
}

impl Value {
    /// View this value as a field, the same way `Record::field` would.
    pub fn as_field(&self) -> Field<'_> {
        match self {
            Value::Text(text) => Field::Scalar(text),
            Value::Record(record) => Field::Record(record),
            Value::List(items) => Field::Sequence(items),
        }
    }

    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Value::Record(record) => Some(record),
            _ => None,
        }
    }
}

/// One element of the source document: attributes are keyed `@name`,
/// children by their element name and text content by `#text`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record {
    fields: BTreeMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a field. Absence is a variant, not an error.
    pub fn field(&self, key: &str) -> Field<'_> {
        match self.fields.get(key) {
            Some(value) => value.as_field(),
            None => Field::Absent,
        }
    }

    /// Follow a `/`-separated path of single-valued fields.
    ///
    /// A sequence encountered mid-path is entered at its first element.
    pub fn path(&self, path: &str) -> Field<'_> {
        let mut current = Field::Record(self);
        for key in path.split('/') {
            current = match current.first() {
                Field::Record(record) => record.field(key),
                _ => return Field::Absent,
            };
        }
        current
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Insert a field, folding repeated keys into a `Value::List`.
    pub fn push(&mut self, key: impl Into<String>, value: Value) {
        use std::collections::btree_map::Entry;

        match self.fields.entry(key.into()) {
            Entry::Vacant(slot) => {
                slot.insert(value);
            }
            Entry::Occupied(mut slot) => match slot.get_mut() {
                Value::List(items) => items.push(value),
                existing => {
                    let first = std::mem::replace(existing, Value::List(Vec::with_capacity(2)));
                    if let Value::List(items) = existing {
                        items.push(first);
                        items.push(value);
                    }
                }
            },
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }
}

/// The presence state of one field in the attribute tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field<'a> {
    Absent,
    Scalar(&'a str),
    Record(&'a Record),
    Sequence(&'a [Value]),
}

impl<'a> Field<'a> {
    pub fn is_present(&self) -> bool {
        !matches!(self, Field::Absent)
    }

    /// Scalar text, or the `#text` of a record (an element that carries
    /// attributes alongside its content).
    pub fn text(&self) -> Option<&'a str> {
        match *self {
            Field::Scalar(text) => Some(text),
            Field::Record(record) => match record.field(TEXT_KEY) {
                Field::Scalar(text) => Some(text),
                _ => None,
            },
            Field::Absent | Field::Sequence(_) => None,
        }
    }

    pub fn record(&self) -> Option<&'a Record> {
        match *self {
            Field::Record(record) => Some(record),
            _ => None,
        }
    }

    /// Normalize a field that may hold one value or many into a sequence.
    pub fn items(&self) -> Vec<Field<'a>> {
        match *self {
            Field::Absent => Vec::new(),
            Field::Sequence(items) => items.iter().map(Value::as_field).collect(),
            single => vec![single],
        }
    }

    /// The field itself, or the first element when it is a sequence.
    pub fn first(&self) -> Field<'a> {
        match *self {
            Field::Sequence(items) => items.first().map(Value::as_field).unwrap_or(Field::Absent),
            other => other,
        }
    }
}
