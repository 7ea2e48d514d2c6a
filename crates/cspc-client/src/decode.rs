//! XML to structured data
//!
//! Converts appliance responses into plain `serde_json` values so callers
//! never hold live XML handles. Key order follows document order.
//!
//! Conventions:
//! - `<Tag>...</Tag>` becomes `{"Tag": content}`
//! - an element with no attributes, children or text becomes `null`
//! - an element with text only becomes a string (trimmed, CDATA included)
//! - attributes become `"@name"` keys, a namespace change `"@xmlns"`
//! - text next to attributes or children goes under `"#text"`
//! - repeated sibling tags collapse into an array at the first tag's position

use crate::error::CspcError;
use serde_json::{Map, Value};
use xmltree::{Element, XMLNode};

/// Input accepted by [`decode_one`]
#[derive(Debug, Clone, Copy)]
pub enum XmlSource<'a> {
    /// Already parsed element
    Element(&'a Element),
    /// Raw XML text
    Raw(&'a str),
}

impl<'a> From<&'a Element> for XmlSource<'a> {
    fn from(element: &'a Element) -> Self {
        XmlSource::Element(element)
    }
}

impl<'a> From<&'a str> for XmlSource<'a> {
    fn from(raw: &'a str) -> Self {
        XmlSource::Raw(raw)
    }
}

/// Parse raw XML into its root element
pub fn parse_document(raw: &str) -> Result<Element, CspcError> {
    Element::parse(raw.as_bytes()).map_err(CspcError::MalformedResponse)
}

/// Decode a single element or XML string
pub fn decode_one<'a>(source: impl Into<XmlSource<'a>>) -> Result<Value, CspcError> {
    match source.into() {
        XmlSource::Element(element) => Ok(wrap(element)),
        XmlSource::Raw(raw) => Ok(wrap(&parse_document(raw)?)),
    }
}

/// Decode each element, preserving input order
pub fn decode_many(elements: &[Element]) -> Vec<Value> {
    elements.iter().map(wrap).collect()
}

fn wrap(element: &Element) -> Value {
    let mut map = Map::new();
    map.insert(key_of(element), content_of(element, None));
    Value::Object(map)
}

fn key_of(element: &Element) -> String {
    match &element.prefix {
        Some(prefix) => format!("{}:{}", prefix, element.name),
        None => element.name.clone(),
    }
}

fn content_of(element: &Element, parent_namespace: Option<&str>) -> Value {
    let mut map = Map::new();

    let namespace = element.namespace.as_deref();
    if let Some(uri) = namespace {
        if namespace != parent_namespace {
            let key = match &element.prefix {
                Some(prefix) => format!("@xmlns:{}", prefix),
                None => "@xmlns".to_string(),
            };
            map.insert(key, Value::String(uri.to_string()));
        }
    }

    for (name, value) in &element.attributes {
        map.insert(format!("@{}", name), Value::String(value.clone()));
    }

    let mut text = String::new();
    for node in &element.children {
        match node {
            XMLNode::Element(child) => {
                let value = content_of(child, namespace);
                push_child(&mut map, key_of(child), value);
            }
            XMLNode::Text(t) | XMLNode::CData(t) => text.push_str(t),
            XMLNode::Comment(_) | XMLNode::ProcessingInstruction(..) => {}
        }
    }

    let text = text.trim();
    if map.is_empty() {
        if text.is_empty() {
            Value::Null
        } else {
            Value::String(text.to_string())
        }
    } else {
        if !text.is_empty() {
            map.insert("#text".to_string(), Value::String(text.to_string()));
        }
        Value::Object(map)
    }
}

fn push_child(map: &mut Map<String, Value>, key: String, value: Value) {
    match map.get_mut(&key) {
        Some(Value::Array(items)) => items.push(value),
        Some(existing) => {
            let first = existing.take();
            *existing = Value::Array(vec![first, value]);
        }
        None => {
            map.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_simple_device() {
        let value = decode_one("<Device><Id>1</Id><HostName>x</HostName></Device>").unwrap();
        assert_eq!(value, json!({"Device": {"Id": "1", "HostName": "x"}}));
    }

    #[test]
    fn test_decode_keeps_document_order() {
        let value = decode_one("<Device><Status>s</Status><Id>1</Id><Model>m</Model></Device>").unwrap();
        let keys: Vec<_> = value["Device"].as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["Status", "Id", "Model"]);
    }

    #[test]
    fn test_repeated_siblings_collapse_into_array() {
        let value = decode_one(
            "<IPAddressList><IPAddress>a</IPAddress><Other>o</Other><IPAddress>b</IPAddress><IPAddress>c</IPAddress></IPAddressList>",
        )
        .unwrap();
        assert_eq!(
            value,
            json!({"IPAddressList": {"IPAddress": ["a", "b", "c"], "Other": "o"}})
        );
    }

    #[test]
    fn test_single_child_is_not_an_array() {
        let value = decode_one("<IPAddressList><IPAddress>a</IPAddress></IPAddressList>").unwrap();
        assert_eq!(value, json!({"IPAddressList": {"IPAddress": "a"}}));
    }

    #[test]
    fn test_empty_element_is_null() {
        let value = decode_one("<Device><Image></Image><Vendor/></Device>").unwrap();
        assert_eq!(value, json!({"Device": {"Image": null, "Vendor": null}}));
    }

    #[test]
    fn test_attributes_and_text() {
        let value = decode_one(r#"<Status code="0" severity="info">OK</Status>"#).unwrap();
        assert_eq!(
            value,
            json!({"Status": {"@code": "0", "@severity": "info", "#text": "OK"}})
        );
    }

    #[test]
    fn test_cdata_is_text() {
        let value =
            decode_one("<Device><SysLocation><![CDATA[Company1 3rd Floor]]></SysLocation></Device>")
                .unwrap();
        assert_eq!(value, json!({"Device": {"SysLocation": "Company1 3rd Floor"}}));
    }

    #[test]
    fn test_default_namespace_reported_once() {
        let value = decode_one(
            r#"<Response xmlns="http://www.parinetworks.com/api/schemas/1.1" requestId="1"><Status>ok</Status></Response>"#,
        )
        .unwrap();
        assert_eq!(
            value,
            json!({"Response": {
                "@xmlns": "http://www.parinetworks.com/api/schemas/1.1",
                "@requestId": "1",
                "Status": "ok"
            }})
        );
    }

    #[test]
    fn test_decode_parsed_element() {
        let element = parse_document("<Device><Id>7</Id></Device>").unwrap();
        assert_eq!(
            decode_one(&element).unwrap(),
            decode_one("<Device><Id>7</Id></Device>").unwrap()
        );
    }

    #[test]
    fn test_decode_many_preserves_order() {
        let elements: Vec<Element> = ["<Device><Id>2</Id></Device>", "<Device><Id>1</Id></Device>"]
            .iter()
            .map(|raw| parse_document(raw).unwrap())
            .collect();
        assert_eq!(
            decode_many(&elements),
            vec![json!({"Device": {"Id": "2"}}), json!({"Device": {"Id": "1"}})]
        );
    }

    #[test]
    fn test_malformed_input() {
        let err = decode_one("<Device><Id>1</Device>").unwrap_err();
        assert!(matches!(err, CspcError::MalformedResponse(_)));
    }
}
