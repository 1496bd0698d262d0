//! The compiled action tree handed to the automation engine.

pub mod display;
pub mod tree;

pub use display::DisplayTree;
pub use tree::{
    ActionChild, ActionElement, ActionTree, Branch, ColorAction, KeyAction, SkillAction,
    TimeAction,
};
