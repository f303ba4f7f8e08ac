//! Response extraction
//!
//! Structured decoding of the remote schema is unreliable, so the extractor
//! only needs well-formed markup: it finds the procedure's result element
//! and flattens it into element-name → text maps. Missing elements yield
//! empty results; only malformed syntax is an error.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use practicebridge_domain::{BridgeError, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;

use super::schema::Procedure;
use crate::errors::InfraError;

static APPOINTMENT_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"AppointmentI[dD]>\s*(\d+)\s*<")
        .expect("appointment id regex should compile - this is a bug")
});

/// One flattened record: local element name (or dotted path) to text.
pub type FlatRecord = HashMap<String, String>;

/// Minimal element tree. Namespace prefixes are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    pub name: String,
    pub text: String,
    pub children: Vec<XmlNode>,
}

impl XmlNode {
    /// Parse a whole document.
    ///
    /// # Errors
    /// `BridgeError::Parse` on malformed markup or unclosed elements.
    pub fn parse(body: &str) -> Result<XmlNode> {
        let mut reader = Reader::from_str(body);
        reader.config_mut().trim_text(true);

        let mut stack = vec![XmlNode { name: String::from("#document"), ..Default::default() }];

        loop {
            match reader.read_event() {
                Ok(Event::Start(start)) => {
                    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
                    stack.push(XmlNode { name, ..Default::default() });
                }
                Ok(Event::Empty(empty)) => {
                    let name = String::from_utf8_lossy(empty.local_name().as_ref()).into_owned();
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(XmlNode { name, ..Default::default() });
                    }
                }
                Ok(Event::Text(text)) => {
                    let decoded = text.unescape().map_err(|err| BridgeError::from(InfraError::from(err)))?;
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&decoded);
                    }
                }
                Ok(Event::CData(data)) => {
                    if let Some(current) = stack.last_mut() {
                        current.text.push_str(&String::from_utf8_lossy(&data));
                    }
                }
                Ok(Event::End(_)) => {
                    let finished = stack
                        .pop()
                        .ok_or_else(|| BridgeError::Parse("unbalanced closing tag".into()))?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(finished),
                        None => return Err(BridgeError::Parse("unbalanced closing tag".into())),
                    }
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(err) => {
                    return Err(BridgeError::Parse(format!(
                        "malformed response at byte {}: {err}",
                        reader.buffer_position()
                    )))
                }
            }
        }

        if stack.len() != 1 {
            let open = stack.last().map(|node| node.name.clone()).unwrap_or_default();
            return Err(BridgeError::Parse(format!("unexpected end of document inside <{open}>")));
        }

        stack.pop().ok_or_else(|| BridgeError::Parse("empty document".into()))
    }

    /// First descendant (depth-first, self excluded) with this local name.
    pub fn find(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find_map(|child| {
            if child.name == name {
                Some(child)
            } else {
                child.find(name)
            }
        })
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Flatten into one map.
    ///
    /// Direct leaves keep their bare names and win any collision. Nested
    /// leaves appear under their dotted path (`Address.City`) and, when the
    /// bare name is still free, under the bare name too. Repeated leaves keep
    /// the first value.
    pub fn flatten(&self) -> FlatRecord {
        let mut record = FlatRecord::new();
        for child in self.children.iter().filter(|child| child.is_leaf()) {
            record.entry(child.name.clone()).or_insert_with(|| child.text.trim().to_string());
        }

        let mut nested = Vec::new();
        for child in self.children.iter().filter(|child| !child.is_leaf()) {
            child.collect_leaves(&child.name, &mut nested);
        }

        for (path, bare, value) in nested {
            record.entry(path).or_insert_with(|| value.clone());
            record.entry(bare).or_insert(value);
        }
        record
    }

    fn collect_leaves(&self, prefix: &str, out: &mut Vec<(String, String, String)>) {
        for child in &self.children {
            let path = format!("{prefix}.{}", child.name);
            if child.is_leaf() {
                out.push((path, child.name.clone(), child.text.trim().to_string()));
            } else {
                child.collect_leaves(&path, out);
            }
        }
    }
}

/// What the extractor recovered from one response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedResponse {
    /// The flattened single record (or the whole result element).
    pub result: FlatRecord,
    /// One map per collection item, in document order.
    pub records: Vec<FlatRecord>,
}

impl ExtractedResponse {
    /// Case-sensitive lookup across the given names.
    pub fn first(&self, names: &[&str]) -> Option<&str> {
        names
            .iter()
            .filter_map(|name| self.result.get(*name))
            .map(String::as_str)
            .find(|value| !value.is_empty())
    }
}

/// Locate `procedure`'s result element and flatten it.
///
/// # Errors
/// `BridgeError::Parse` only for malformed markup.
pub fn extract(body: &str, procedure: Procedure) -> Result<ExtractedResponse> {
    let document = XmlNode::parse(body)?;
    let schema = procedure.schema();

    let Some(result) = document.find(&procedure.result_element()) else {
        return Ok(ExtractedResponse::default());
    };

    let records = match schema.collection {
        Some(collection) => result
            .find(collection.container)
            .map(|container| {
                container
                    .children
                    .iter()
                    .filter(|item| item.name == collection.item)
                    .map(XmlNode::flatten)
                    .collect()
            })
            .unwrap_or_default(),
        None => Vec::new(),
    };

    let single = schema.record.and_then(|name| result.find(name)).unwrap_or(result);

    Ok(ExtractedResponse { result: single.flatten(), records })
}

/// Numeric appointment id from a creation response: structured lookup
/// first, then a pattern search over the raw body.
pub fn appointment_id(extracted: &ExtractedResponse, body: &str) -> Option<String> {
    extracted
        .first(&["AppointmentId", "AppointmentID", "Appointment.AppointmentId", "ID", "Id"])
        .filter(|value| value.chars().all(|c| c.is_ascii_digit()))
        .map(str::to_string)
        .or_else(|| {
            APPOINTMENT_ID.captures(body).and_then(|caps| caps.get(1)).map(|m| m.as_str().to_string())
        })
}
