use crate::canvas::TimerRef;
use crate::config::DialogLimits;
use crate::error::EditError;
use crate::graph::payload::{Rgb, TimeKind};

/// A dialog opened from a menu, carrying its pre-filled values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialog {
    KeyUpDelay {
        current: u32,
        max: u32,
    },
    Value {
        kind: TimeKind,
        current: u32,
    },
    SaveColor {
        coordinate: String,
        rgb: Rgb,
    },
    ConfirmDelete {
        saved_id: i64,
    },
    Timer {
        name: String,
        duration: Option<u32>,
        initializes: bool,
        max: u32,
    },
    ResetTimer {
        options: Vec<TimerRef>,
        selected: Option<String>,
    },
}

impl Dialog {
    pub fn name(&self) -> &'static str {
        match self {
            Dialog::KeyUpDelay { .. } => "key-up delay",
            Dialog::Value { .. } => "value",
            Dialog::SaveColor { .. } => "save color",
            Dialog::ConfirmDelete { .. } => "confirm delete",
            Dialog::Timer { .. } => "timer",
            Dialog::ResetTimer { .. } => "reset timer",
        }
    }
}

/// What the user submitted. Numbers arrive unchecked and are validated on commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialogInput {
    KeyUpDelay(i64),
    Value(i64),
    ColorName(String),
    Confirm,
    Timer {
        name: String,
        duration: i64,
        initializes: bool,
    },
    ResetTimer {
        timer_id: String,
    },
}

impl DialogInput {
    pub(super) fn fits(&self, dialog: &Dialog) -> bool {
        matches!(
            (self, dialog),
            (DialogInput::KeyUpDelay(_), Dialog::KeyUpDelay { .. })
                | (DialogInput::Value(_), Dialog::Value { .. })
                | (DialogInput::ColorName(_), Dialog::SaveColor { .. })
                | (DialogInput::Confirm, Dialog::ConfirmDelete { .. })
                | (DialogInput::Timer { .. }, Dialog::Timer { .. })
                | (DialogInput::ResetTimer { .. }, Dialog::ResetTimer { .. })
        )
    }
}

pub(super) fn bounded(field: &str, value: i64, min: u32, max: u32) -> Result<u32, EditError> {
    u32::try_from(value)
        .ok()
        .filter(|v| (min..=max).contains(v))
        .ok_or_else(|| EditError::InvalidInput {
            field: field.to_string(),
            message: format!("must be between {} and {}, got {}", min, max, value),
        })
}

pub(super) fn non_empty(field: &str, value: &str) -> Result<String, EditError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EditError::InvalidInput {
            field: field.to_string(),
            message: "must not be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

pub(super) fn key_up_delay(value: i64, limits: &DialogLimits) -> Result<u32, EditError> {
    bounded("key-up delay", value, 0, limits.key_up_delay_max)
}

pub(super) fn timer_duration(value: i64, limits: &DialogLimits) -> Result<u32, EditError> {
    bounded("duration", value, 1, limits.timer_duration_max)
}

pub(super) fn amount(kind: TimeKind, value: i64) -> Result<u32, EditError> {
    bounded(kind.name(), value, 0, u32::MAX)
}
