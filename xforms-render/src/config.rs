use serde::{Deserialize, Serialize};

use crate::error::{RenderError, RenderResult};
use crate::names::QName;

pub const DEFAULT_ORDER: &str = "label control help alert hint";

/// One of the five parts a control renders: the control itself and its LHHA.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Part {
    Label,
    Control,
    Help,
    Alert,
    Hint,
}

impl Part {
    pub fn from_token(token: &str) -> Option<Part> {
        match token {
            "label" => Some(Part::Label),
            "control" => Some(Part::Control),
            "help" => Some(Part::Help),
            "alert" => Some(Part::Alert),
            "hint" => Some(Part::Hint),
            _ => None,
        }
    }

    pub fn token(self) -> &'static str {
        match self {
            Part::Label => "label",
            Part::Control => "control",
            Part::Help => "help",
            Part::Alert => "alert",
            Part::Hint => "hint",
        }
    }

    /// Code used in sub-ids, e.g. `name≡≡l`.
    pub fn code(self) -> &'static str {
        match self {
            Part::Label => "l",
            Part::Control => "c",
            Part::Help => "p",
            Part::Alert => "a",
            Part::Hint => "t",
        }
    }
}

/// A permutation of the five parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartOrder(Vec<Part>);

impl PartOrder {
    pub fn parse(order: &str) -> RenderResult<PartOrder> {
        let invalid = || RenderError::InvalidPartOrder {
            order: order.to_string(),
        };
        let mut parts = Vec::with_capacity(5);
        for token in order.split_whitespace() {
            let part = Part::from_token(token).ok_or_else(invalid)?;
            if parts.contains(&part) {
                return Err(invalid());
            }
            parts.push(part);
        }
        if parts.len() != 5 {
            return Err(invalid());
        }
        Ok(PartOrder(parts))
    }

    pub fn parts(&self) -> &[Part] {
        &self.0
    }
}

impl Default for PartOrder {
    fn default() -> Self {
        PartOrder(vec![
            Part::Label,
            Part::Control,
            Part::Help,
            Part::Alert,
            Part::Hint,
        ])
    }
}

/// Rendering options, usually loaded from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Default part order for all controls.
    pub order: String,
    /// Render for clients without scripting: no delimiters, no templates.
    pub noscript: bool,
    /// Whether repeat templates may be generated for dynamic row insertion.
    pub generate_templates: bool,
    /// Read-only controls use the static appearance.
    pub static_readonly: bool,
    /// Element names bound to custom components.
    pub components: Vec<QName>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            order: DEFAULT_ORDER.to_string(),
            noscript: false,
            generate_templates: true,
            static_readonly: false,
            components: Vec::new(),
        }
    }
}

impl RenderConfig {
    pub fn from_yaml(yaml: &str) -> RenderResult<RenderConfig> {
        let config: RenderConfig = serde_yaml::from_str(yaml)?;
        config.document_order()?;
        Ok(config)
    }

    pub fn document_order(&self) -> RenderResult<PartOrder> {
        PartOrder::parse(&self.order)
    }

    pub fn is_component(&self, name: &QName) -> bool {
        self.components
            .iter()
            .any(|c| c.namespace == name.namespace && c.name == name.name)
    }
}
