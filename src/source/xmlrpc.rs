// src/source/xmlrpc.rs

//! Minimal XML-RPC encoding and decoding for Koji hubs
//!
//! Covers the value types Koji actually sends: strings, integers (including
//! the `i8` and `ex:`-prefixed extensions), booleans, doubles, nil, arrays,
//! structs, dates and base64 (both kept as strings).

use crate::error::{Error, Result};
use quick_xml::escape::escape;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::BTreeMap;

/// An XML-RPC value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Nil,
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    DateTime(String),
    Base64(String),
    Array(Vec<Value>),
    Struct(BTreeMap<String, Value>),
}

impl Value {
    /// Keyword arguments in Koji's `__starstar` convention
    pub fn kwargs<I, K>(args: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut map: BTreeMap<String, Value> =
            args.into_iter().map(|(k, v)| (k.into(), v)).collect();
        map.insert("__starstar".to_string(), Value::Bool(true));
        Value::Struct(map)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::DateTime(s) | Value::Base64(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Struct(map) => map.get(key),
            _ => None,
        }
    }

    fn write_xml(&self, out: &mut String) {
        out.push_str("<value>");
        match self {
            Value::Nil => out.push_str("<nil/>"),
            Value::Bool(b) => {
                out.push_str(if *b { "<boolean>1</boolean>" } else { "<boolean>0</boolean>" })
            }
            Value::Int(i) => {
                if i32::try_from(*i).is_ok() {
                    out.push_str(&format!("<int>{i}</int>"));
                } else {
                    out.push_str(&format!("<i8>{i}</i8>"));
                }
            }
            Value::Double(d) => out.push_str(&format!("<double>{d}</double>")),
            Value::String(s) => {
                out.push_str("<string>");
                out.push_str(&escape(s.as_str()));
                out.push_str("</string>");
            }
            Value::DateTime(s) => {
                out.push_str("<dateTime.iso8601>");
                out.push_str(&escape(s.as_str()));
                out.push_str("</dateTime.iso8601>");
            }
            Value::Base64(s) => {
                out.push_str("<base64>");
                out.push_str(s);
                out.push_str("</base64>");
            }
            Value::Array(items) => {
                out.push_str("<array><data>");
                for item in items {
                    item.write_xml(out);
                }
                out.push_str("</data></array>");
            }
            Value::Struct(map) => {
                out.push_str("<struct>");
                for (name, value) in map {
                    out.push_str("<member><name>");
                    out.push_str(&escape(name.as_str()));
                    out.push_str("</name>");
                    value.write_xml(out);
                    out.push_str("</member>");
                }
                out.push_str("</struct>");
            }
        }
        out.push_str("</value>");
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Value> for serde_json::Value {
    fn from(value: Value) -> Self {
        match value {
            Value::Nil => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(b),
            Value::Int(i) => serde_json::Value::from(i),
            Value::Double(d) => serde_json::Number::from_f64(d)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::String(s) | Value::DateTime(s) | Value::Base64(s) => {
                serde_json::Value::String(s)
            }
            Value::Array(items) => {
                serde_json::Value::Array(items.into_iter().map(Into::into).collect())
            }
            Value::Struct(map) => serde_json::Value::Object(
                map.into_iter().map(|(k, v)| (k, v.into())).collect(),
            ),
        }
    }
}

/// Serialize a method call document
pub fn encode_call(method: &str, params: &[Value]) -> String {
    let mut out = String::from("<?xml version=\"1.0\"?>\n<methodCall><methodName>");
    out.push_str(&escape(method));
    out.push_str("</methodName><params>");
    for param in params {
        out.push_str("<param>");
        param.write_xml(&mut out);
        out.push_str("</param>");
    }
    out.push_str("</params></methodCall>");
    out
}

/// Parse a method response, turning a `<fault>` into [`Error::Fault`]
pub fn decode_response(body: &str) -> Result<Value> {
    let root = parse_tree(body)?;
    if root.name != "methodResponse" {
        return Err(Error::Protocol(format!(
            "expected methodResponse, found <{}>",
            root.name
        )));
    }

    if let Some(fault) = root.child("fault") {
        let value = parse_value(fault.child("value").ok_or_else(|| missing("fault value"))?)?;
        let code = match value.get("faultCode") {
            Some(Value::Int(code)) => *code,
            _ => 0,
        };
        let message = value
            .get("faultString")
            .and_then(Value::as_str)
            .unwrap_or("unknown fault")
            .to_string();
        return Err(Error::Fault { code, message });
    }

    let value = root
        .child("params")
        .and_then(|p| p.child("param"))
        .and_then(|p| p.child("value"))
        .ok_or_else(|| missing("params/param/value"))?;
    parse_value(value)
}

fn missing(what: &str) -> Error {
    Error::Protocol(format!("response is missing {what}"))
}

#[derive(Debug, Default)]
struct Element {
    name: String,
    children: Vec<Element>,
    text: String,
}

impl Element {
    fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }
}

/// Local tag name without a namespace prefix (`ex:nil` -> `nil`)
fn local_name(raw: &[u8]) -> String {
    let name = String::from_utf8_lossy(raw);
    match name.rsplit_once(':') {
        Some((_, local)) => local.to_string(),
        None => name.into_owned(),
    }
}

fn parse_tree(body: &str) -> Result<Element> {
    let mut reader = Reader::from_str(body);
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => stack.push(Element {
                name: local_name(e.name().as_ref()),
                ..Default::default()
            }),
            Ok(Event::Empty(e)) => {
                let element = Element {
                    name: local_name(e.name().as_ref()),
                    ..Default::default()
                };
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| Error::Protocol("unbalanced closing tag".to_string()))?;
                match stack.last_mut() {
                    Some(parent) => parent.children.push(element),
                    None => root = Some(element),
                }
            }
            Ok(Event::Text(t)) => {
                if let Some(current) = stack.last_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| Error::Protocol(format!("bad text: {e}")))?;
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(Error::Protocol(format!(
                    "XML error at position {}: {e}",
                    reader.buffer_position()
                )));
            }
        }
    }

    root.ok_or_else(|| Error::Protocol("empty response".to_string()))
}

fn parse_value(value: &Element) -> Result<Value> {
    // <value>text</value> without a type element is a string
    let Some(typed) = value.children.first() else {
        return Ok(Value::String(value.text.clone()));
    };
    let text = typed.text.trim();

    match typed.name.as_str() {
        "string" => Ok(Value::String(typed.text.clone())),
        "int" | "i4" | "i8" => text
            .parse()
            .map(Value::Int)
            .map_err(|e| Error::Protocol(format!("bad integer '{text}': {e}"))),
        "boolean" => match text {
            "1" => Ok(Value::Bool(true)),
            "0" => Ok(Value::Bool(false)),
            other => Err(Error::Protocol(format!("bad boolean '{other}'"))),
        },
        "double" => text
            .parse()
            .map(Value::Double)
            .map_err(|e| Error::Protocol(format!("bad double '{text}': {e}"))),
        "nil" => Ok(Value::Nil),
        "dateTime.iso8601" => Ok(Value::DateTime(text.to_string())),
        "base64" => Ok(Value::Base64(text.to_string())),
        "array" => {
            let data = typed.child("data").ok_or_else(|| missing("array data"))?;
            data.children
                .iter()
                .filter(|c| c.name == "value")
                .map(parse_value)
                .collect::<Result<Vec<_>>>()
                .map(Value::Array)
        }
        "struct" => {
            let mut map = BTreeMap::new();
            for member in typed.children.iter().filter(|c| c.name == "member") {
                let name = member.child("name").ok_or_else(|| missing("member name"))?;
                let value = member.child("value").ok_or_else(|| missing("member value"))?;
                map.insert(name.text.clone(), parse_value(value)?);
            }
            Ok(Value::Struct(map))
        }
        other => Err(Error::Protocol(format!("unsupported value type <{other}>"))),
    }
}
