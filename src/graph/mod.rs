//! The typed node/port graph: payloads, ports, nodes, edges and snapshots.

pub mod conversion;
pub mod legacy;
pub mod model;
pub mod payload;
pub mod ports;

pub use conversion::IntoSnapshot;
pub use model::{Edge, EdgeId, Endpoint, GraphSnapshot, Node, NodeId, Position, Size};
pub use payload::{
    ColorSample, KeyElement, Payload, PayloadTag, Rgb, Skill, TimeEvent, TimeKind,
};
pub use ports::{Port, PortGroup, PortId, PortSet, ports_for};
