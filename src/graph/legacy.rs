//! Reading persisted graph records, including data written before payloads
//! carried an explicit `type` discriminant.
//!
//! Older records only hold loose payload fields (`elements_code`, `skill_code`,
//! `t`/`n`, `coordinate`/`rgb`) and sometimes nothing but a label. The payload
//! kind is inferred in a fixed order:
//!
//! 1. key element when an element code is present,
//! 2. skill when a skill code is present,
//! 3. time event when a kind field is present or the label starts with a time keyword,
//! 4. color sample when a coordinate or rgb is present, or the label is the color template label,
//! 5. otherwise a key element named after the label.
//!
//! This is the only place where label text is ever read for meaning.

use super::model::{Edge, Endpoint, Node, Position, Size, DEFAULT_SHAPE};
use super::payload::{
    COLOR_TEMPLATE_LABEL, ColorSample, KeyElement, Payload, Rgb, Skill, TimeEvent, TimeKind,
};
use super::ports::PortId;
use crate::error::ConversionError;
use crate::ids::random_id;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::warn;

const TAGGED_KINDS: [&str; 4] = ["keyElement", "skill", "colorSample", "timeEvent"];

/// A node as found in storage, before its payload kind is resolved.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedNode {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    shape: Option<String>,
    #[serde(default)]
    position: Option<Position>,
    #[serde(default)]
    x: Option<f64>,
    #[serde(default)]
    y: Option<f64>,
    #[serde(default)]
    size: Option<Size>,
    #[serde(default)]
    width: Option<f64>,
    #[serde(default)]
    height: Option<f64>,
    #[serde(default)]
    label: Option<String>,
    #[serde(default)]
    attrs: Option<Value>,
    #[serde(default, alias = "payload")]
    data: Option<Value>,
}

impl TryFrom<PersistedNode> for Node {
    type Error = ConversionError;

    fn try_from(raw: PersistedNode) -> Result<Self, Self::Error> {
        let id = raw.id.unwrap_or_else(random_id);
        let label = raw
            .label
            .or_else(|| attr_label(raw.attrs.as_ref()))
            .unwrap_or_default();
        let payload = resolve_payload(&id, &label, raw.data)?;

        let position = raw.position.unwrap_or(Position {
            x: raw.x.unwrap_or_default(),
            y: raw.y.unwrap_or_default(),
        });
        let default_size = Size::default();
        let size = raw.size.unwrap_or(Size {
            width: raw.width.unwrap_or(default_size.width),
            height: raw.height.unwrap_or(default_size.height),
        });

        let mut node = Node::new(id, payload, position, size);
        node.shape = raw.shape.unwrap_or_else(|| DEFAULT_SHAPE.to_string());
        Ok(node)
    }
}

/// An endpoint either as `{nodeId, portId}` / `{cell, port}` or as a bare node id.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PersistedEndpoint {
    Node(String),
    Full {
        #[serde(alias = "nodeId")]
        cell: String,
        #[serde(default, alias = "portId")]
        port: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedEdge {
    #[serde(default)]
    id: Option<String>,
    source: PersistedEndpoint,
    target: PersistedEndpoint,
    #[serde(default)]
    source_port: Option<String>,
    #[serde(default)]
    target_port: Option<String>,
    #[serde(default)]
    label: Option<String>,
}

impl TryFrom<PersistedEdge> for Edge {
    type Error = ConversionError;

    fn try_from(raw: PersistedEdge) -> Result<Self, Self::Error> {
        let id = raw.id.unwrap_or_else(random_id);
        let source = resolve_endpoint(&id, "source", raw.source, raw.source_port)?;
        let target = resolve_endpoint(&id, "target", raw.target, raw.target_port)?;
        Ok(Edge {
            id,
            source,
            target,
            label: raw.label.filter(|l| !l.is_empty()),
        })
    }
}

fn resolve_endpoint(
    edge_id: &str,
    side: &str,
    endpoint: PersistedEndpoint,
    fallback_port: Option<String>,
) -> Result<Endpoint, ConversionError> {
    let (node_id, port) = match endpoint {
        PersistedEndpoint::Node(node_id) => (node_id, fallback_port),
        PersistedEndpoint::Full { cell, port } => (cell, port.or(fallback_port)),
    };
    let port = port.ok_or_else(|| ConversionError::InvalidEdge {
        edge_id: edge_id.to_string(),
        message: format!("{} has no port", side),
    })?;
    let port_id = port
        .parse::<PortId>()
        .map_err(|message| ConversionError::InvalidEdge {
            edge_id: edge_id.to_string(),
            message,
        })?;
    Ok(Endpoint::new(node_id, port_id))
}

fn attr_label(attrs: Option<&Value>) -> Option<String> {
    attrs?
        .get("label")?
        .get("text")?
        .as_str()
        .map(str::to_string)
}

/// Resolves a node payload from tagged data, or infers it from legacy fields and the label.
pub fn resolve_payload(
    node_id: &str,
    label: &str,
    data: Option<Value>,
) -> Result<Payload, ConversionError> {
    let fields = match data {
        Some(Value::Object(map)) => map,
        Some(Value::Null) | None => Map::new(),
        Some(other) => {
            return Err(ConversionError::InvalidPayload {
                node_id: node_id.to_string(),
                message: format!("expected an object, found {}", other),
            });
        }
    };

    let is_tagged = fields
        .get("type")
        .and_then(Value::as_str)
        .is_some_and(|t| TAGGED_KINDS.contains(&t));
    if is_tagged {
        return serde_json::from_value(Value::Object(fields)).map_err(|e| {
            ConversionError::InvalidPayload {
                node_id: node_id.to_string(),
                message: e.to_string(),
            }
        });
    }

    Ok(infer_payload(node_id, label, &fields))
}

/// Applies the legacy inference order to untagged payload fields.
pub fn infer_payload(node_id: &str, label: &str, data: &Map<String, Value>) -> Payload {
    if let Some(code) = present(data, "elements_code") {
        return Payload::KeyElement(KeyElement {
            code: lenient_i64(code).unwrap_or_default(),
            key: string_field(data, "elements_key")
                .unwrap_or_else(|| strip_delay_suffix(label).to_string()),
            key_up_delay: present(data, "key_up_delay")
                .and_then(lenient_i64)
                .and_then(|v| u32::try_from(v).ok())
                .unwrap_or_default(),
        });
    }

    if let Some(code) = present(data, "skill_code") {
        let code = match code {
            Value::Array(items) => items.iter().filter_map(lenient_i64).collect(),
            single => lenient_i64(single).into_iter().collect(),
        };
        return Payload::Skill(Skill {
            name: string_field(data, "skill_name").unwrap_or_else(|| label.to_string()),
            code,
            skill_type: present(data, "skill_type")
                .and_then(lenient_i64)
                .unwrap_or_default(),
            offset: present(data, "skill_offset")
                .and_then(lenient_i64)
                .unwrap_or_default(),
        });
    }

    if let Some(kind) = time_kind(data, label) {
        return Payload::TimeEvent(legacy_time_event(kind, label, data));
    }

    let has_sample = present(data, "coordinate").is_some() || present(data, "rgb").is_some();
    if has_sample || label == COLOR_TEMPLATE_LABEL {
        // An unreadable color only loses the sample, never the record.
        let rgb = string_field(data, "rgb")
            .filter(|s| !s.is_empty())
            .and_then(|s| match s.parse::<Rgb>() {
                Ok(rgb) => Some(rgb),
                Err(e) => {
                    warn!(node = node_id, rgb = %s, error = %e, "Dropping unreadable legacy color");
                    None
                }
            });
        let saved_id = present(data, "id").and_then(lenient_i64);
        return Payload::ColorSample(ColorSample {
            coordinate: string_field(data, "coordinate").filter(|s| !s.is_empty()),
            rgb,
            saved_id,
            name: saved_id
                .map(|_| label.to_string())
                .filter(|name| !name.is_empty() && name != COLOR_TEMPLATE_LABEL),
        });
    }

    Payload::KeyElement(KeyElement {
        code: 0,
        key: strip_delay_suffix(label).to_string(),
        key_up_delay: 0,
    })
}

fn time_kind(data: &Map<String, Value>, label: &str) -> Option<TimeKind> {
    let explicit = present(data, "t")
        .or_else(|| data.get("timeOrNama").and_then(|t| t.get("t")))
        .and_then(lenient_i64)
        .and_then(|code| u64::try_from(code).ok())
        .and_then(TimeKind::from_engine_code);

    if let Some(kind) = explicit {
        // Some records stored reset nodes under the stamina code; the label disambiguates.
        if kind == TimeKind::Stamina && label.starts_with(TimeKind::ResetTimer.keyword()) {
            return Some(TimeKind::ResetTimer);
        }
        return Some(kind);
    }

    match data.get("type").and_then(Value::as_str) {
        Some("timer") => return Some(TimeKind::Timer),
        Some("resetTimer") => return Some(TimeKind::ResetTimer),
        _ => {}
    }

    label_time_kind(label)
}

fn label_time_kind(label: &str) -> Option<TimeKind> {
    if label.starts_with(TimeKind::Delay.keyword()) {
        Some(TimeKind::Delay)
    } else if label.starts_with(TimeKind::Stamina.keyword()) {
        Some(TimeKind::Stamina)
    } else if label.starts_with(TimeKind::ResetTimer.keyword()) {
        Some(TimeKind::ResetTimer)
    } else if label.starts_with(TimeKind::Timer.keyword()) {
        Some(TimeKind::Timer)
    } else {
        None
    }
}

fn legacy_time_event(kind: TimeKind, label: &str, data: &Map<String, Value>) -> TimeEvent {
    let amount = present(data, "n")
        .or_else(|| data.get("timeOrNama").and_then(|t| t.get("n")))
        .and_then(lenient_i64)
        .and_then(|v| u32::try_from(v).ok())
        .or_else(|| match kind {
            TimeKind::Delay | TimeKind::Stamina => first_number(label),
            TimeKind::Timer | TimeKind::ResetTimer => None,
        });

    let mut event = TimeEvent::template(kind);
    match kind {
        TimeKind::Delay | TimeKind::Stamina => event.amount = amount,
        TimeKind::Timer => {
            event.amount = amount;
            event.timer_name = string_field(data, "name").filter(|n| !n.is_empty());
            event.timer_id = string_field(data, "id").filter(|n| !n.is_empty());
            event.initializes = data.get("init").and_then(Value::as_bool);
        }
        TimeKind::ResetTimer => {
            event.timer_name = string_field(data, "name").filter(|n| !n.is_empty());
            event.timer_id = string_field(data, "id").filter(|n| !n.is_empty());
        }
    }
    event
}

/// A field that exists and is not `null`.
fn present<'a>(data: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    data.get(key).filter(|v| !v.is_null())
}

fn string_field(data: &Map<String, Value>, key: &str) -> Option<String> {
    match present(data, key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Accepts integers, integral floats and numeric strings.
fn lenient_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0).map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Removes a trailing `" (120ms)"` key-up delay suffix from a legacy key label.
fn strip_delay_suffix(label: &str) -> &str {
    match label.rfind(" (") {
        Some(idx) if label.ends_with("ms)") => &label[..idx],
        _ => label,
    }
}

fn first_number(label: &str) -> Option<u32> {
    let digits: String = label
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}
