//! XML to compact object tree.
//!
//! Elements become keyed entries, attributes are prefixed with `@`, text
//! content lands under `#text`, and duplicate sibling tags collapse into an
//! array. The output is a [`serde_json::Value`] so callers get one uniform
//! structured type out of both JSON and XML bodies.

use quick_xml::Reader;
use quick_xml::events::attributes::Attributes;
use quick_xml::events::Event;
use serde_json::{Map, Value, json};
use thiserror::Error;

const ATTR_PREFIX: &str = "@";
const TEXT_KEY: &str = "#text";

#[derive(Debug, Error)]
#[error("{0}")]
pub(crate) struct XmlError(String);

/// Converts an XML document into a compact `Value` tree.
///
/// An empty document yields an empty object. Markup errors and unclosed
/// elements are reported as [`XmlError`].
pub(crate) fn to_value(text: &str) -> Result<Value, XmlError> {
    let mut reader = Reader::from_str(text);
    let mut stack: Vec<(String, Map<String, Value>)> = Vec::new();
    let mut current_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let mut obj = Map::new();
                collect_attributes(e.attributes(), &mut obj)?;
                stack.push((name, obj));
                current_text.clear();
            }

            Ok(Event::End(_)) => {
                let Some((name, mut obj)) = stack.pop() else { continue };
                if !current_text.is_empty() {
                    obj.insert(TEXT_KEY.to_owned(), Value::String(current_text.clone()));
                    current_text.clear();
                }
                let value = Value::Object(obj);
                match stack.last_mut() {
                    Some((_, parent)) => add_to_parent(parent, &name, value),
                    None => return Ok(json!({ name: value })),
                }
            }

            Ok(Event::Text(e)) => {
                let text = e
                    .xml_content()
                    .map_err(|e| XmlError(format!("text decode error: {e}")))?;
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    current_text.push_str(trimmed);
                }
            }

            Ok(Event::CData(e)) => {
                current_text.push_str(&String::from_utf8_lossy(e.into_inner().as_ref()));
            }

            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                let mut obj = Map::new();
                collect_attributes(e.attributes(), &mut obj)?;
                let value = if obj.is_empty() { Value::Null } else { Value::Object(obj) };
                match stack.last_mut() {
                    Some((_, parent)) => add_to_parent(parent, &name, value),
                    None => return Ok(json!({ name: value })),
                }
            }

            Ok(Event::Eof) => break,

            Ok(_) => {}

            Err(e) => return Err(XmlError(format!("markup error: {e}"))),
        }
    }

    if let Some((name, _)) = stack.last() {
        return Err(XmlError(format!("unclosed element <{name}>")));
    }
    Ok(Value::Object(Map::new()))
}

fn collect_attributes(attrs: Attributes, obj: &mut Map<String, Value>) -> Result<(), XmlError> {
    for attr in attrs {
        let attr = attr.map_err(|e| XmlError(format!("attribute error: {e}")))?;
        let key = format!("{ATTR_PREFIX}{}", String::from_utf8_lossy(attr.key.as_ref()));
        let value = String::from_utf8_lossy(&attr.value).into_owned();
        obj.insert(key, Value::String(value));
    }
    Ok(())
}

/// Duplicate sibling tags become a sequence: the second occurrence promotes
/// the existing entry to an array, later ones append.
fn add_to_parent(parent: &mut Map<String, Value>, name: &str, value: Value) {
    match parent.get_mut(name) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            parent.insert(name.to_owned(), Value::Array(vec![first, value]));
        }
        None => {
            parent.insert(name.to_owned(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simple_document() {
        let value = to_value("<user><name>alice</name></user>").unwrap();
        assert_eq!(value["user"]["name"]["#text"], "alice");
    }

    #[test]
    fn attributes_are_prefixed() {
        let value = to_value(r#"<user id="42"><name>alice</name></user>"#).unwrap();
        assert_eq!(value["user"]["@id"], "42");
    }

    #[test]
    fn duplicate_siblings_become_a_sequence() {
        let value = to_value("<list><item>a</item><item>b</item><item>c</item></list>").unwrap();
        let items = value["list"]["item"].as_array().unwrap();
        assert_eq!(items.len(), 3);
        assert_eq!(items[0]["#text"], "a");
        assert_eq!(items[2]["#text"], "c");
    }

    #[test]
    fn self_closing_element() {
        let value = to_value(r#"<ping to="pong"/>"#).unwrap();
        assert_eq!(value["ping"]["@to"], "pong");
        let value = to_value("<ping/>").unwrap();
        assert!(value["ping"].is_null());
    }

    #[test]
    fn unclosed_element_is_an_error() {
        assert!(to_value("<a><b></b>").is_err());
    }

    #[test]
    fn empty_document_is_an_empty_object() {
        assert_eq!(to_value("").unwrap(), Value::Object(Map::new()));
    }
}
