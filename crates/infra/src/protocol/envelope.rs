//! Request envelope construction
//!
//! One document per call: fixed outer envelope, credential header, then the
//! procedure body laid out and ordered according to its [`ProcedureSchema`].

use chrono_tz::Tz;
use practicebridge_domain::constants::{ARRAYS_NAMESPACE, SOAP_ENVELOPE_NAMESPACE};
use practicebridge_domain::{BridgeError, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use tracing::debug;

use super::credentials::Credential;
use super::datetime::{coerce, looks_temporal};
use super::schema::{BodyLayout, FieldKind, FieldSpec, IdSuffix, Procedure};
use super::values::{FieldMap, FieldValue};
use crate::errors::InfraError;

const SCH: &str = "sch";
const ARR: &str = "arr";

/// Builds request envelopes for one endpoint namespace.
#[derive(Debug, Clone)]
pub struct EnvelopeBuilder<'a> {
    namespace: &'a str,
    credential: &'a Credential,
    timezone: Tz,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Node {
    prefix: &'static str,
    name: String,
    content: Content,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Content {
    Text(String),
    Children(Vec<Node>),
}

impl Node {
    fn text(prefix: &'static str, name: impl Into<String>, text: String) -> Self {
        Self { prefix, name: name.into(), content: Content::Text(text) }
    }

    fn children(name: impl Into<String>, children: Vec<Node>) -> Option<Self> {
        if children.is_empty() {
            None
        } else {
            Some(Self { prefix: SCH, name: name.into(), content: Content::Children(children) })
        }
    }
}

impl<'a> EnvelopeBuilder<'a> {
    pub fn new(namespace: &'a str, credential: &'a Credential, timezone: Tz) -> Self {
        Self { namespace, credential, timezone }
    }

    /// Serialize one procedure request.
    ///
    /// Null and blank values are pruned before anything is written; empty
    /// date/time values are omitted rather than sent empty.
    ///
    /// # Errors
    /// `BridgeError::InvalidInput` for a missing credential, a missing
    /// required field, a non-numeric identifier or an unparseable date.
    pub fn build(&self, procedure: Procedure, fields: &FieldMap, filters: &FieldMap) -> Result<String> {
        self.credential.validate()?;

        let schema = procedure.schema();
        let fields = self.order(procedure, fields.clone().pruned(), schema.fields, schema.id_suffix)?;
        let filters = self.order(procedure, filters.clone().pruned(), schema.filters, schema.id_suffix)?;

        let body = match schema.layout {
            BodyLayout::FieldsAndFilter => Node::children("Fields", fields)
                .into_iter()
                .chain(Node::children("Filter", filters))
                .collect(),
            BodyLayout::Record(element) => {
                let mut children = fields;
                children.extend(filters);
                Node::children(element, children).into_iter().collect()
            }
            BodyLayout::Inline => {
                let mut children = fields;
                children.extend(filters);
                children
            }
        };

        self.write(procedure, &body)
    }

    fn order(
        &self,
        procedure: Procedure,
        map: FieldMap,
        specs: &'static [FieldSpec],
        id_suffix: IdSuffix,
    ) -> Result<Vec<Node>> {
        // Keys that collide after the suffix rewrite keep the first value.
        let mut entries: Vec<(String, FieldValue)> = Vec::new();
        for (key, value) in map.iter() {
            let key = id_suffix.apply(key);
            if entries.iter().any(|(seen, _)| *seen == key) {
                debug!(procedure = %procedure, field = %key, "dropping duplicate field");
                continue;
            }
            entries.push((key, value.clone()));
        }
        let mut nodes = Vec::with_capacity(entries.len());

        for spec in specs {
            match entries.iter().position(|(key, _)| key == spec.name) {
                Some(index) => {
                    let (key, value) = entries.remove(index);
                    nodes.extend(self.convert(procedure, key, value, Some(spec), id_suffix)?);
                }
                None if spec.required => {
                    return Err(BridgeError::InvalidInput(format!(
                        "{procedure} requires field {}",
                        spec.name
                    )));
                }
                None => {}
            }
        }

        for (key, value) in entries {
            nodes.extend(self.convert(procedure, key, value, None, id_suffix)?);
        }

        Ok(nodes)
    }

    fn convert(
        &self,
        procedure: Procedure,
        name: String,
        value: FieldValue,
        spec: Option<&FieldSpec>,
        id_suffix: IdSuffix,
    ) -> Result<Option<Node>> {
        let kind = spec.map(|spec| spec.kind);

        match (kind, value) {
            (Some(FieldKind::Record(sub)), FieldValue::Map(map)) => {
                Ok(Node::children(name, self.order(procedure, map, sub, id_suffix)?))
            }
            (Some(FieldKind::Records { item, fields }), FieldValue::List(items)) => {
                let mut children = Vec::with_capacity(items.len());
                for entry in items {
                    children.extend(self.collection_item(procedure, item, entry, fields, id_suffix)?);
                }
                Ok(Node::children(name, children))
            }
            (Some(FieldKind::Records { item, fields }), FieldValue::Map(map)) => {
                let child = self.collection_item(procedure, item, FieldValue::Map(map), fields, id_suffix)?;
                Ok(Node::children(name, child.into_iter().collect()))
            }
            (Some(FieldKind::Scalars(scalar)), value) => {
                let items = match value {
                    FieldValue::List(items) => items,
                    single => vec![single],
                };
                let children = items
                    .into_iter()
                    .filter_map(|item| item.as_text())
                    .map(|text| Node::text(ARR, scalar.element(), text.trim().to_string()))
                    .collect();
                Ok(Node::children(name, children))
            }
            (_, FieldValue::Map(map)) => Ok(Node::children(name, self.order(procedure, map, &[], id_suffix)?)),
            (_, FieldValue::List(items)) => {
                let item_name = singular(&name);
                let mut children = Vec::with_capacity(items.len());
                for entry in items {
                    match entry {
                        FieldValue::Map(map) => children
                            .extend(Node::children(item_name.clone(), self.order(procedure, map, &[], id_suffix)?)),
                        scalar => children.extend(scalar.as_text().map(|text| Node::text(ARR, "string", text))),
                    }
                }
                Ok(Node::children(name, children))
            }
            (Some(FieldKind::DateTime), value) => self.temporal(name, value),
            (None, value @ FieldValue::Text(_)) if looks_temporal(&name) => self.temporal(name, value),
            (Some(FieldKind::Integer), value) => {
                let text = value.as_text().unwrap_or_default();
                let trimmed = text.trim();
                if trimmed.parse::<i64>().is_err() {
                    return Err(BridgeError::InvalidInput(format!(
                        "{procedure} field {name} must be numeric, got {trimmed:?}"
                    )));
                }
                Ok(Some(Node::text(SCH, name, trimmed.to_string())))
            }
            (Some(FieldKind::Bool), value) => {
                let flag = match &value {
                    FieldValue::Bool(flag) => *flag,
                    other => parse_flag(&other.as_text().unwrap_or_default()).ok_or_else(|| {
                        BridgeError::InvalidInput(format!("{procedure} field {name} must be true or false"))
                    })?,
                };
                Ok(Some(Node::text(SCH, name, flag.to_string())))
            }
            (_, value) => Ok(value.as_text().map(|text| Node::text(SCH, name, text))),
        }
    }

    fn collection_item(
        &self,
        procedure: Procedure,
        item: &'static str,
        entry: FieldValue,
        fields: &'static [FieldSpec],
        id_suffix: IdSuffix,
    ) -> Result<Option<Node>> {
        match entry {
            FieldValue::Map(map) => Ok(Node::children(item, self.order(procedure, map, fields, id_suffix)?)),
            scalar => Ok(scalar.as_text().map(|text| Node::text(SCH, item, text))),
        }
    }

    fn temporal(&self, name: String, value: FieldValue) -> Result<Option<Node>> {
        let text = value.as_text().unwrap_or_default();
        Ok(coerce(&name, &text, self.timezone)?.map(|wire| Node::text(SCH, name, wire)))
    }

    fn write(&self, procedure: Procedure, body: &[Node]) -> Result<String> {
        let mut writer = Writer::new(Vec::new());

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))
            .map_err(write_failed)?;

        let envelope = BytesStart::new("soapenv:Envelope").with_attributes([
            ("xmlns:soapenv", SOAP_ENVELOPE_NAMESPACE),
            ("xmlns:sch", self.namespace),
            ("xmlns:arr", ARRAYS_NAMESPACE),
        ]);
        writer.write_event(Event::Start(envelope)).map_err(write_failed)?;
        writer.write_event(Event::Empty(BytesStart::new("soapenv:Header"))).map_err(write_failed)?;
        start(&mut writer, "soapenv:Body")?;

        let procedure_tag = format!("{SCH}:{procedure}");
        start(&mut writer, &procedure_tag)?;
        start(&mut writer, "sch:request")?;

        start(&mut writer, "sch:RequestHeader")?;
        for (name, value) in self.credential.header_fields() {
            leaf(&mut writer, &format!("{SCH}:{name}"), value)?;
        }
        end(&mut writer, "sch:RequestHeader")?;

        for node in body {
            write_node(&mut writer, node)?;
        }

        end(&mut writer, "sch:request")?;
        end(&mut writer, &procedure_tag)?;
        end(&mut writer, "soapenv:Body")?;
        end(&mut writer, "soapenv:Envelope")?;

        String::from_utf8(writer.into_inner())
            .map_err(|err| BridgeError::Internal(format!("envelope is not valid UTF-8: {err}")))
    }
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<()> {
    let tag = format!("{}:{}", node.prefix, node.name);
    match &node.content {
        Content::Text(text) => leaf(writer, &tag, text),
        Content::Children(children) => {
            start(writer, &tag)?;
            for child in children {
                write_node(writer, child)?;
            }
            end(writer, &tag)
        }
    }
}

fn start(writer: &mut Writer<Vec<u8>>, tag: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(tag))).map_err(write_failed)
}

fn end(writer: &mut Writer<Vec<u8>>, tag: &str) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new(tag))).map_err(write_failed)
}

/// Text content is always escaped.
fn leaf(writer: &mut Writer<Vec<u8>>, tag: &str, text: &str) -> Result<()> {
    start(writer, tag)?;
    writer.write_event(Event::Text(BytesText::new(text))).map_err(write_failed)?;
    end(writer, tag)
}

fn write_failed<E: Into<InfraError>>(err: E) -> BridgeError {
    let infra: InfraError = err.into();
    infra.into()
}

fn parse_flag(text: &str) -> Option<bool> {
    match text.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Some(true),
        "false" | "0" | "no" => Some(false),
        _ => None,
    }
}

fn singular(name: &str) -> String {
    name.strip_suffix('s').filter(|stem| !stem.is_empty()).unwrap_or(name).to_string()
}
