use crate::error::ConversionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label shown on an unsampled color node.
pub const COLOR_TEMPLATE_LABEL: &str = "取色";
/// Label shown on a key element with an empty key name.
pub const KEY_TEMPLATE_LABEL: &str = "按键";
/// Label shown on a skill with an empty name.
pub const SKILL_TEMPLATE_LABEL: &str = "技能";

/// Element codes that address mouse buttons rather than keyboard keys.
/// Such elements can only start an action, so they expose no trigger input.
pub const POINTER_ELEMENT_CODES: [i64; 2] = [4, 5];

/// The action a node stands for. Persisted with an explicit `type` discriminant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Payload {
    KeyElement(KeyElement),
    Skill(Skill),
    ColorSample(ColorSample),
    TimeEvent(TimeEvent),
}

/// Coarse payload discriminant, used in diagnostics and menu selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadTag {
    KeyElement,
    Skill,
    ColorSample,
    TimeEvent(TimeKind),
}

impl fmt::Display for PayloadTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadTag::KeyElement => write!(f, "key element"),
            PayloadTag::Skill => write!(f, "skill"),
            PayloadTag::ColorSample => write!(f, "color sample"),
            PayloadTag::TimeEvent(kind) => write!(f, "{} time event", kind.name()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyElement {
    pub code: i64,
    pub key: String,
    #[serde(default)]
    pub key_up_delay: u32,
}

impl KeyElement {
    pub fn is_pointer(&self) -> bool {
        POINTER_ELEMENT_CODES.contains(&self.code)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub name: String,
    #[serde(default)]
    pub code: Vec<i64>,
    #[serde(rename = "skillType", default)]
    pub skill_type: i64,
    #[serde(default)]
    pub offset: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColorSample {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coordinate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rgb: Option<Rgb>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saved_id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl ColorSample {
    /// True once coordinate and color have both been captured.
    pub fn is_sampled(&self) -> bool {
        self.coordinate.is_some() && self.rgb.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimeKind {
    Delay,
    Timer,
    ResetTimer,
    Stamina,
}

impl TimeKind {
    pub const ALL: [TimeKind; 4] = [
        TimeKind::Delay,
        TimeKind::Timer,
        TimeKind::ResetTimer,
        TimeKind::Stamina,
    ];

    /// The display keyword, also the bare label of an unconfigured node.
    pub fn keyword(self) -> &'static str {
        match self {
            TimeKind::Delay => "延迟",
            TimeKind::Timer => "定时",
            TimeKind::ResetTimer => "重置定时",
            TimeKind::Stamina => "内力",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TimeKind::Delay => "delay",
            TimeKind::Timer => "timer",
            TimeKind::ResetTimer => "reset-timer",
            TimeKind::Stamina => "stamina",
        }
    }

    /// Numeric kind understood by the automation engine (`t` on the wire).
    pub fn engine_code(self) -> u32 {
        match self {
            TimeKind::Delay => 1,
            TimeKind::Timer => 2,
            TimeKind::Stamina => 3,
            TimeKind::ResetTimer => 4,
        }
    }

    pub fn from_engine_code(code: u64) -> Option<Self> {
        match code {
            1 => Some(TimeKind::Delay),
            2 => Some(TimeKind::Timer),
            3 => Some(TimeKind::Stamina),
            4 => Some(TimeKind::ResetTimer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeEvent {
    pub kind: TimeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initializes: Option<bool>,
}

impl TimeEvent {
    /// An unconfigured time event of the given kind, as placed from the palette.
    pub fn template(kind: TimeKind) -> Self {
        Self {
            kind,
            amount: None,
            timer_name: None,
            timer_id: None,
            initializes: None,
        }
    }

    /// A node qualifies as a resettable timer once it has both an identity and a duration.
    pub fn is_configured_timer(&self) -> bool {
        self.timer_id.is_some() && self.amount.is_some()
    }
}

impl Payload {
    pub fn tag(&self) -> PayloadTag {
        match self {
            Payload::KeyElement(_) => PayloadTag::KeyElement,
            Payload::Skill(_) => PayloadTag::Skill,
            Payload::ColorSample(_) => PayloadTag::ColorSample,
            Payload::TimeEvent(t) => PayloadTag::TimeEvent(t.kind),
        }
    }

    /// Renders the node label. The label is a projection of the payload and is never parsed back.
    pub fn label(&self) -> String {
        match self {
            Payload::KeyElement(k) => {
                let base = if k.key.is_empty() {
                    KEY_TEMPLATE_LABEL
                } else {
                    k.key.as_str()
                };
                if k.key_up_delay > 0 {
                    format!("{} ({}ms)", base, k.key_up_delay)
                } else {
                    base.to_string()
                }
            }
            Payload::Skill(s) if s.name.is_empty() => SKILL_TEMPLATE_LABEL.to_string(),
            Payload::Skill(s) => s.name.clone(),
            Payload::ColorSample(c) => c
                .name
                .clone()
                .unwrap_or_else(|| COLOR_TEMPLATE_LABEL.to_string()),
            Payload::TimeEvent(t) => time_label(t),
        }
    }

    /// Fill color for a sampled color node, as `#rrggbb`.
    pub fn swatch(&self) -> Option<String> {
        match self {
            Payload::ColorSample(ColorSample { rgb: Some(rgb), .. }) => Some(rgb.hex()),
            _ => None,
        }
    }

    pub fn as_key_element(&self) -> Option<&KeyElement> {
        match self {
            Payload::KeyElement(k) => Some(k),
            _ => None,
        }
    }

    pub fn as_time_event(&self) -> Option<&TimeEvent> {
        match self {
            Payload::TimeEvent(t) => Some(t),
            _ => None,
        }
    }
}

fn time_label(t: &TimeEvent) -> String {
    let keyword = t.kind.keyword();
    match t.kind {
        TimeKind::Delay => match t.amount {
            Some(ms) => format!("{} {}ms", keyword, ms),
            None => keyword.to_string(),
        },
        TimeKind::Stamina => match t.amount {
            Some(points) => format!("{} <= {}", keyword, points),
            None => keyword.to_string(),
        },
        TimeKind::Timer => match (&t.timer_name, t.amount) {
            (Some(name), Some(ms)) => format!("{}({}ms)", name, ms),
            _ => keyword.to_string(),
        },
        TimeKind::ResetTimer => match &t.timer_name {
            Some(name) => format!("{}: {}", keyword, name),
            None => keyword.to_string(),
        },
    }
}

/// An RGB triple, written as `r,g,b` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let channels = s
            .split(',')
            .map(|c| c.trim().parse::<u8>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| ConversionError::InvalidRgb(s.to_string()))?;
        match channels.as_slice() {
            [r, g, b] => Ok(Rgb::new(*r, *g, *b)),
            _ => Err(ConversionError::InvalidRgb(s.to_string())),
        }
    }
}

impl TryFrom<String> for Rgb {
    type Error = ConversionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(rgb: Rgb) -> Self {
        rgb.to_string()
    }
}
