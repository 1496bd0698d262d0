use super::records::{CatalogElement, CatalogSkill, SavedColor};
use crate::graph::payload::{ColorSample, KeyElement, Payload, Rgb, Skill, TimeEvent, TimeKind};
use crate::graph::{ports_for, PortSet};
use tracing::warn;

/// A node ready to be placed on the canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeTemplate {
    pub payload: Payload,
}

impl NodeTemplate {
    pub fn new(payload: Payload) -> Self {
        Self { payload }
    }

    pub fn label(&self) -> String {
        self.payload.label()
    }

    pub fn ports(&self) -> PortSet {
        ports_for(&self.payload)
    }

    pub fn swatch(&self) -> Option<String> {
        self.payload.swatch()
    }
}

impl From<&CatalogElement> for NodeTemplate {
    fn from(element: &CatalogElement) -> Self {
        NodeTemplate::new(Payload::KeyElement(KeyElement {
            code: element.elements_code,
            key: element.elements_key.clone(),
            key_up_delay: 0,
        }))
    }
}

impl From<&CatalogSkill> for NodeTemplate {
    fn from(skill: &CatalogSkill) -> Self {
        NodeTemplate::new(Payload::Skill(Skill {
            name: skill.skill_name.clone(),
            code: skill.skill_code.clone(),
            skill_type: skill.skill_type,
            offset: skill.skill_offset,
        }))
    }
}

/// The unsampled color node that always leads the color section.
pub fn color_template() -> NodeTemplate {
    NodeTemplate::new(Payload::ColorSample(ColorSample::default()))
}

/// A template for a saved color, or `None` if its stored rgb is unreadable.
pub fn saved_color_template(color: &SavedColor) -> Option<NodeTemplate> {
    let rgb = match color.rgb.parse::<Rgb>() {
        Ok(rgb) => rgb,
        Err(e) => {
            warn!(id = color.id, error = %e, "Skipping saved color with unreadable rgb");
            return None;
        }
    };
    Some(NodeTemplate::new(Payload::ColorSample(ColorSample {
        coordinate: Some(color.coordinate.clone()),
        rgb: Some(rgb),
        saved_id: Some(color.id),
        name: Some(color.name.clone()).filter(|n| !n.is_empty()),
    })))
}

pub fn time_templates() -> Vec<NodeTemplate> {
    TimeKind::ALL
        .into_iter()
        .map(|kind| NodeTemplate::new(Payload::TimeEvent(TimeEvent::template(kind))))
        .collect()
}
