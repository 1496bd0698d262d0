use crate::catalog::records::one_or_many;
use crate::graph::payload::{ColorSample, KeyElement, Payload, Skill, TimeEvent};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;

/// Which output of the parent a child hangs off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Branch {
    #[serde(rename = "y")]
    Yes,
    #[serde(rename = "n")]
    No,
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Branch::Yes => write!(f, "y"),
            Branch::No => write!(f, "n"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAction {
    pub elements_key: String,
    pub elements_code: i64,
    pub key_up_delay: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillAction {
    pub skill_name: String,
    /// A single code goes on the wire as a bare number, several as a list.
    #[serde(serialize_with = "codes_to_wire", deserialize_with = "one_or_many")]
    pub skill_code: Vec<i64>,
    pub skill_type: i64,
    pub skill_offset: i64,
}

/// The engine requires `id` and `n` on every time action; unset values go out as `""` and `0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeAction {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub t: u32,
    #[serde(default)]
    pub n: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorAction {
    pub coordinate: String,
    pub rgb: String,
}

/// One executable step, in the record shape the automation engine reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionElement {
    Key(KeyAction),
    Skill(SkillAction),
    Time(TimeAction),
    Color(ColorAction),
}

impl From<&KeyElement> for KeyAction {
    fn from(k: &KeyElement) -> Self {
        Self {
            elements_key: k.key.clone(),
            elements_code: k.code,
            key_up_delay: k.key_up_delay,
        }
    }
}

impl From<&Skill> for SkillAction {
    fn from(s: &Skill) -> Self {
        Self {
            skill_name: s.name.clone(),
            skill_code: s.code.clone(),
            skill_type: s.skill_type,
            skill_offset: s.offset,
        }
    }
}

impl From<&TimeEvent> for TimeAction {
    fn from(t: &TimeEvent) -> Self {
        Self {
            id: t.timer_id.clone().unwrap_or_default(),
            name: t.timer_name.clone(),
            t: t.kind.engine_code(),
            n: t.amount.unwrap_or_default(),
            init: t.initializes,
        }
    }
}

impl From<&ColorSample> for ColorAction {
    fn from(c: &ColorSample) -> Self {
        Self {
            coordinate: c.coordinate.clone().unwrap_or_default(),
            rgb: c.rgb.map(|rgb| rgb.to_string()).unwrap_or_default(),
        }
    }
}

impl From<&Payload> for ActionElement {
    fn from(payload: &Payload) -> Self {
        match payload {
            Payload::KeyElement(k) => ActionElement::Key(k.into()),
            Payload::Skill(s) => ActionElement::Skill(s.into()),
            Payload::TimeEvent(t) => ActionElement::Time(t.into()),
            Payload::ColorSample(c) => ActionElement::Color(c.into()),
        }
    }
}

impl fmt::Display for ActionElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionElement::Key(k) if k.key_up_delay > 0 => write!(
                f,
                "Key: {} (code {}, up {}ms)",
                k.elements_key, k.elements_code, k.key_up_delay
            ),
            ActionElement::Key(k) => {
                write!(f, "Key: {} (code {})", k.elements_key, k.elements_code)
            }
            ActionElement::Skill(s) => write!(f, "Skill: {} {:?}", s.skill_name, s.skill_code),
            ActionElement::Time(t) => {
                write!(f, "Time t={} n={}", t.t, t.n)?;
                if let Some(name) = &t.name {
                    write!(f, " timer={}", name)?;
                }
                Ok(())
            }
            ActionElement::Color(c) => write!(f, "Color: {} @ {}", c.rgb, c.coordinate),
        }
    }
}

fn codes_to_wire<S: Serializer>(codes: &[i64], serializer: S) -> Result<S::Ok, S::Error> {
    match codes {
        [single] => serializer.serialize_i64(*single),
        many => many.serialize(serializer),
    }
}

/// A node of the compiled tree below the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionChild {
    pub element: ActionElement,
    #[serde(rename = "iyn")]
    pub branch: Branch,
    pub children: Option<Vec<ActionChild>>,
}

/// The compiled, rooted, branch-aware form of a graph. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionTree {
    pub header: KeyAction,
    pub children: Option<Vec<ActionChild>>,
}

impl ActionTree {
    /// Total number of actions, header included.
    pub fn len(&self) -> usize {
        1 + self.levels().map(|(_, level)| level.len()).sum::<usize>()
    }

    /// Always false; a tree has at least its header.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Depth of the deepest path, counting the header as 1.
    pub fn depth(&self) -> usize {
        self.levels().map(|(depth, _)| depth).max().unwrap_or(1)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Every non-empty child list with the depth of its members, depth first.
    fn levels(&self) -> impl Iterator<Item = (usize, &[ActionChild])> {
        let mut pending: Vec<(usize, &[ActionChild])> = self
            .children
            .as_deref()
            .filter(|children| !children.is_empty())
            .map(|children| (1, children))
            .into_iter()
            .collect();
        std::iter::from_fn(move || {
            let (depth, level) = pending.pop()?;
            pending.extend(
                level
                    .iter()
                    .filter_map(|c| c.children.as_deref())
                    .filter(|children| !children.is_empty())
                    .map(|children| (depth + 1, children)),
            );
            Some((depth + 1, level))
        })
    }
}
