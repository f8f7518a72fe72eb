//! XML document to attribute tree.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::model::{Record, Value, TEXT_KEY};
use crate::error::ParseError;

const ROOT_ELEMENT: &str = "uniprot";
const ENTRY_ELEMENT: &str = "entry";

/// An element still being read.
struct Open {
    name: String,
    record: Record,
    has_attributes: bool,
    text: String,
}

impl Open {
    fn new(start: &BytesStart<'_>, position: u64) -> Result<Self, ParseError> {
        let name = local_name(start.local_name().as_ref(), position)?;
        let mut record = Record::new();
        let mut has_attributes = false;

        for attr in start.attributes() {
            let attr = attr.map_err(|e| malformed(position, e))?;
            // Namespace declarations are not data.
            let raw_key = attr.key.as_ref();
            if raw_key == b"xmlns" || raw_key.starts_with(b"xmlns:") {
                continue;
            }
            let key = local_name(attr.key.local_name().as_ref(), position)?;
            let value = attr.unescape_value().map_err(|e| malformed(position, e))?;
            record.push(format!("@{}", key), Value::Text(value.into_owned()));
            has_attributes = true;
        }

        Ok(Self {
            name,
            record,
            has_attributes,
            text: String::new(),
        })
    }

    fn finish(mut self) -> (String, Value) {
        let text = self.text.trim();
        let value = if !self.has_attributes && self.record.is_empty() {
            Value::Text(text.to_string())
        } else {
            if !text.is_empty() {
                self.record.push(TEXT_KEY, Value::Text(text.to_string()));
            }
            Value::Record(self.record)
        };
        (self.name, value)
    }
}

/// Parse a UniProt XML document and return the attribute tree of its entry.
///
/// When the document carries several entries, the first one is returned.
pub fn parse_document(xml: &str) -> Result<Record, ParseError> {
    let (root_name, root) = parse_tree(xml)?;
    if root_name != ROOT_ELEMENT {
        return Err(ParseError::MissingRoot(root_name));
    }

    match root.as_field().record().map(|r| r.field(ENTRY_ELEMENT).first()) {
        Some(entry) => entry.record().cloned().ok_or(ParseError::MissingEntry),
        None => Err(ParseError::MissingEntry),
    }
}

/// Parse any XML document into `(root element name, root value)`.
pub fn parse_tree(xml: &str) -> Result<(String, Value), ParseError> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<Open> = Vec::new();
    let mut root: Option<(String, Value)> = None;

    loop {
        let position = reader.buffer_position() as u64;
        let event = reader.read_event().map_err(|e| malformed(position, e))?;

        match event {
            Event::Start(start) => {
                if root.is_some() {
                    return Err(malformed(position, "content after the root element"));
                }
                stack.push(Open::new(&start, position)?);
            }
            Event::Empty(start) => {
                let open = Open::new(&start, position)?;
                close(open, &mut stack, &mut root, position)?;
            }
            Event::End(_) => {
                let open = stack
                    .pop()
                    .ok_or_else(|| malformed(position, "unbalanced closing tag"))?;
                close(open, &mut stack, &mut root, position)?;
            }
            Event::Text(text) => {
                if let Some(open) = stack.last_mut() {
                    let text = text.unescape().map_err(|e| malformed(position, e))?;
                    open.text.push_str(&text);
                }
            }
            Event::CData(data) => {
                if let Some(open) = stack.last_mut() {
                    let data = std::str::from_utf8(&data).map_err(|e| malformed(position, e))?;
                    open.text.push_str(data);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(malformed(
            reader.buffer_position() as u64,
            format!("unclosed element '{}'", open.name),
        ));
    }

    root.ok_or(ParseError::Empty)
}

fn close(
    open: Open,
    stack: &mut [Open],
    root: &mut Option<(String, Value)>,
    position: u64,
) -> Result<(), ParseError> {
    let (name, value) = open.finish();
    match stack.last_mut() {
        Some(parent) => parent.record.push(name, value),
        None if root.is_none() => *root = Some((name, value)),
        None => return Err(malformed(position, "multiple root elements")),
    }
    Ok(())
}

fn local_name(bytes: &[u8], position: u64) -> Result<String, ParseError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| malformed(position, e))
}

fn malformed(position: u64, message: impl ToString) -> ParseError {
    ParseError::Malformed {
        position,
        message: message.to_string(),
    }
}
