//! Common test utilities: payload and graph builders plus in-memory service mocks.
use async_trait::async_trait;
use keyweave::action::ActionTree;
use keyweave::catalog::{CatalogElement, CatalogSkill, NodeTemplate, SavedColor};
use keyweave::error::ServiceError;
use keyweave::graph::{Edge, Endpoint, GraphSnapshot, Node, Position, Size};
use keyweave::graph::payload::{ColorSample, KeyElement, Payload, Rgb, Skill, TimeEvent, TimeKind};
use keyweave::graph::PortId;
use keyweave::services::{
    AutomationEngine, CatalogSource, ColorSampler, ColorStore, NewSavedColor, Notice, Notifier,
    OperationRecord, OperationStore,
};
use keyweave::session::RunMode;
use std::cell::{Cell, RefCell};

#[allow(dead_code)]
pub fn key(code: i64, name: &str) -> Payload {
    Payload::KeyElement(KeyElement {
        code,
        key: name.to_string(),
        key_up_delay: 0,
    })
}

#[allow(dead_code)]
pub fn skill(name: &str) -> Payload {
    Payload::Skill(Skill {
        name: name.to_string(),
        code: vec![1, 2],
        skill_type: 1,
        offset: 0,
    })
}

#[allow(dead_code)]
pub fn time(kind: TimeKind, amount: Option<u32>) -> Payload {
    let mut event = TimeEvent::template(kind);
    event.amount = amount;
    Payload::TimeEvent(event)
}

#[allow(dead_code)]
pub fn configured_timer(name: &str, id: &str, duration: u32) -> Payload {
    Payload::TimeEvent(TimeEvent {
        kind: TimeKind::Timer,
        amount: Some(duration),
        timer_name: Some(name.to_string()),
        timer_id: Some(id.to_string()),
        initializes: Some(false),
    })
}

#[allow(dead_code)]
pub fn color_template() -> Payload {
    Payload::ColorSample(ColorSample::default())
}

#[allow(dead_code)]
pub fn sampled_color(coordinate: &str, rgb: Rgb) -> Payload {
    Payload::ColorSample(ColorSample {
        coordinate: Some(coordinate.to_string()),
        rgb: Some(rgb),
        saved_id: None,
        name: None,
    })
}

#[allow(dead_code)]
pub fn saved_color(id: i64, name: &str) -> Payload {
    Payload::ColorSample(ColorSample {
        coordinate: Some("10,20".to_string()),
        rgb: Some(Rgb::new(255, 0, 0)),
        saved_id: Some(id),
        name: Some(name.to_string()),
    })
}

#[allow(dead_code)]
pub fn template(payload: Payload) -> NodeTemplate {
    NodeTemplate::new(payload)
}

#[allow(dead_code)]
pub fn node(id: &str, payload: Payload) -> Node {
    Node::new(id, payload, Position::default(), Size::default())
}

#[allow(dead_code)]
pub fn edge(id: &str, source: &str, source_port: PortId, target: &str, target_port: PortId) -> Edge {
    Edge {
        id: id.to_string(),
        source: Endpoint::new(source, source_port),
        target: Endpoint::new(target, target_port),
        label: None,
    }
}

/// `from --y--> to`
#[allow(dead_code)]
pub fn yes(id: &str, from: &str, to: &str) -> Edge {
    edge(id, from, PortId::Yes, to, PortId::In)
}

/// `from --n--> to`
#[allow(dead_code)]
pub fn no(id: &str, from: &str, to: &str) -> Edge {
    edge(id, from, PortId::No, to, PortId::In)
}

#[allow(dead_code)]
pub fn snapshot(nodes: Vec<Node>, edges: Vec<Edge>) -> GraphSnapshot {
    GraphSnapshot::new(nodes, edges)
}

/// A key element `A` followed by a one second delay.
#[allow(dead_code)]
pub fn create_simple_snapshot() -> GraphSnapshot {
    snapshot(
        vec![node("a", key(65, "A")), node("d", time(TimeKind::Delay, Some(1000)))],
        vec![yes("e1", "a", "d")],
    )
}

#[allow(dead_code)]
pub fn to_service_error(message: &str) -> ServiceError {
    ServiceError::Transport(message.to_string())
}

// --- Service mocks ---

#[allow(dead_code)]
pub struct MockSampler {
    pub response: RefCell<Result<String, ServiceError>>,
    pub calls: Cell<u32>,
}

#[allow(dead_code)]
impl MockSampler {
    pub fn returning(raw: &str) -> Self {
        Self {
            response: RefCell::new(Ok(raw.to_string())),
            calls: Cell::new(0),
        }
    }

    pub fn failing() -> Self {
        Self {
            response: RefCell::new(Err(to_service_error("sampler offline"))),
            calls: Cell::new(0),
        }
    }
}

#[async_trait(?Send)]
impl ColorSampler for MockSampler {
    async fn sample(&self) -> Result<String, ServiceError> {
        self.calls.set(self.calls.get() + 1);
        self.response.borrow().clone()
    }
}

#[allow(dead_code)]
#[derive(Default)]
pub struct MockColorStore {
    pub next_id: Cell<i64>,
    pub fail: Cell<bool>,
    pub created: RefCell<Vec<NewSavedColor>>,
    pub deleted: RefCell<Vec<i64>>,
}

#[async_trait(?Send)]
impl ColorStore for MockColorStore {
    async fn create(&self, color: NewSavedColor) -> Result<SavedColor, ServiceError> {
        if self.fail.get() {
            return Err(to_service_error("color store offline"));
        }
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        self.created.borrow_mut().push(color.clone());
        Ok(SavedColor {
            id,
            coordinate: color.coordinate,
            rgb: color.rgb,
            name: color.name,
        })
    }

    async fn delete(&self, id: i64) -> Result<(), ServiceError> {
        if self.fail.get() {
            return Err(to_service_error("color store offline"));
        }
        self.deleted.borrow_mut().push(id);
        Ok(())
    }
}

#[allow(dead_code)]
#[derive(Default)]
pub struct MockOperationStore {
    pub fail: Cell<bool>,
    pub created: RefCell<Vec<OperationRecord>>,
    pub updated: RefCell<Vec<OperationRecord>>,
}

#[async_trait(?Send)]
impl OperationStore for MockOperationStore {
    async fn create(&self, record: &OperationRecord) -> Result<i64, ServiceError> {
        if self.fail.get() {
            return Err(to_service_error("store offline"));
        }
        self.created.borrow_mut().push(record.clone());
        Ok(self.created.borrow().len() as i64 + 100)
    }

    async fn update(&self, record: &OperationRecord) -> Result<(), ServiceError> {
        if self.fail.get() {
            return Err(to_service_error("store offline"));
        }
        self.updated.borrow_mut().push(record.clone());
        Ok(())
    }

    async fn delete(&self, _id: i64) -> Result<(), ServiceError> {
        Ok(())
    }

    async fn list_by_owner(&self, owner: i64) -> Result<Vec<OperationRecord>, ServiceError> {
        Ok(self
            .created
            .borrow()
            .iter()
            .filter(|r| r.owner == owner)
            .cloned()
            .collect())
    }
}

#[allow(dead_code)]
#[derive(Debug, Clone, PartialEq)]
pub enum EngineCall {
    Run { headers: Vec<String>, start: bool },
    SetMode(RunMode),
}

#[allow(dead_code)]
#[derive(Default)]
pub struct MockEngine {
    pub calls: RefCell<Vec<EngineCall>>,
    pub fail_runs: Cell<bool>,
}

#[async_trait(?Send)]
impl AutomationEngine for MockEngine {
    async fn run(&self, trees: Vec<ActionTree>, start: bool) -> Result<(), ServiceError> {
        if self.fail_runs.get() {
            return Err(to_service_error("engine unavailable"));
        }
        self.calls.borrow_mut().push(EngineCall::Run {
            headers: trees.iter().map(|t| t.header.elements_key.clone()).collect(),
            start,
        });
        Ok(())
    }

    async fn set_mode(&self, mode: RunMode) -> Result<(), ServiceError> {
        self.calls.borrow_mut().push(EngineCall::SetMode(mode));
        Ok(())
    }
}

#[allow(dead_code)]
#[derive(Default)]
pub struct MockCatalog {
    pub elements: RefCell<Vec<CatalogElement>>,
    pub skills: RefCell<Vec<CatalogSkill>>,
    pub colors: RefCell<Vec<SavedColor>>,
    pub color_requests: RefCell<Vec<i64>>,
}

#[allow(dead_code)]
impl MockCatalog {
    pub fn standard() -> Self {
        let catalog = Self::default();
        *catalog.elements.borrow_mut() = vec![
            CatalogElement {
                elements_code: 65,
                elements_key: "A".to_string(),
            },
            CatalogElement {
                elements_code: 4,
                elements_key: "Mouse4".to_string(),
            },
        ];
        *catalog.skills.borrow_mut() = vec![CatalogSkill {
            skill_name: "Fireball".to_string(),
            skill_code: vec![49, 50],
            skill_type: 1,
            skill_offset: 0,
        }];
        catalog
    }
}

#[async_trait(?Send)]
impl CatalogSource for MockCatalog {
    async fn elements(&self) -> Result<Vec<CatalogElement>, ServiceError> {
        Ok(self.elements.borrow().clone())
    }

    async fn skills(&self) -> Result<Vec<CatalogSkill>, ServiceError> {
        Ok(self.skills.borrow().clone())
    }

    async fn saved_colors(&self, user_id: i64) -> Result<Vec<SavedColor>, ServiceError> {
        self.color_requests.borrow_mut().push(user_id);
        Ok(self.colors.borrow().clone())
    }
}

#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: RefCell<Vec<Notice>>,
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.borrow_mut().push(notice);
    }
}
