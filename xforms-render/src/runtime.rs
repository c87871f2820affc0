//! Read-only view of the live control tree.
//!
//! The renderer never mutates live controls; it only queries them by effective
//! id. [`ControlSnapshot`] is a serialisable tree used by the CLI and tests.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::RenderResult;

/// Lookup of live controls by effective id.
pub trait ControlTree {
    fn control(&self, effective_id: &str) -> Option<&LiveControl>;
}

/// One entry of a selection control's item set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepeatState {
    pub size: u32,
    /// 1-based selected iteration, 0 when empty.
    pub index: u32,
    /// Relevance of each iteration; missing entries are relevant.
    pub relevant: Vec<bool>,
}

impl RepeatState {
    pub fn is_iteration_relevant(&self, iteration: u32) -> bool {
        iteration
            .checked_sub(1)
            .and_then(|i| self.relevant.get(i as usize))
            .copied()
            .unwrap_or(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiveControl {
    /// Control kind name, e.g. `input` or `repeat`.
    pub kind: String,
    /// Effective id of the parent control.
    pub parent: Option<String>,
    pub relevant: bool,
    pub readonly: bool,
    pub required: bool,
    pub valid: bool,
    pub value: Option<String>,
    pub label: Option<String>,
    pub hint: Option<String>,
    pub help: Option<String>,
    pub alert: Option<String>,
    pub items: Vec<Item>,
    pub repeat: Option<RepeatState>,
    /// For cases: whether this case is the selected one of its switch.
    pub selected: bool,
}

impl Default for LiveControl {
    fn default() -> Self {
        LiveControl {
            kind: String::new(),
            parent: None,
            relevant: true,
            readonly: false,
            required: false,
            valid: true,
            value: None,
            label: None,
            hint: None,
            help: None,
            alert: None,
            items: Vec::new(),
            repeat: None,
            selected: false,
        }
    }
}

impl LiveControl {
    pub fn new(kind: &str) -> Self {
        LiveControl {
            kind: kind.to_string(),
            ..LiveControl::default()
        }
    }

    pub fn with_parent(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    pub fn with_value(mut self, value: &str) -> Self {
        self.value = Some(value.to_string());
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn with_repeat(mut self, size: u32, index: u32) -> Self {
        self.repeat = Some(RepeatState {
            size,
            index,
            relevant: Vec::new(),
        });
        self
    }

    pub fn with_selected(mut self, selected: bool) -> Self {
        self.selected = selected;
        self
    }

    pub fn value(&self) -> &str {
        self.value.as_deref().unwrap_or("")
    }

    pub fn is_empty(&self) -> bool {
        self.value().is_empty()
    }

    pub fn repeat_state(&self) -> RepeatState {
        self.repeat.clone().unwrap_or_default()
    }
}

/// A complete live control tree, keyed by effective id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlSnapshot {
    #[serde(default)]
    pub controls: BTreeMap<String, LiveControl>,
}

impl ControlSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_yaml(yaml: &str) -> RenderResult<ControlSnapshot> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn insert(&mut self, effective_id: &str, control: LiveControl) {
        self.controls.insert(effective_id.to_string(), control);
    }

    /// Builder form of [`ControlSnapshot::insert`].
    pub fn with(mut self, effective_id: &str, control: LiveControl) -> Self {
        self.insert(effective_id, control);
        self
    }
}

impl ControlTree for ControlSnapshot {
    fn control(&self, effective_id: &str) -> Option<&LiveControl> {
        self.controls.get(effective_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_from_yaml_defaults() {
        let yaml = r#"
controls:
  name:
    kind: input
    value: Ada
    required: true
  rows:
    kind: repeat
    repeat: { size: 3, index: 2, relevant: [true, false] }
"#;
        let snapshot = ControlSnapshot::from_yaml(yaml).unwrap();
        let name = snapshot.control("name").unwrap();
        assert!(name.relevant);
        assert!(name.valid);
        assert!(name.required);
        assert_eq!(name.value(), "Ada");

        let rows = snapshot.control("rows").unwrap().repeat_state();
        assert_eq!(rows.size, 3);
        assert!(rows.is_iteration_relevant(1));
        assert!(!rows.is_iteration_relevant(2));
        assert!(rows.is_iteration_relevant(3));
        assert!(snapshot.control("missing").is_none());
    }
}
