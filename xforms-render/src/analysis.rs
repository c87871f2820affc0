//! Static analysis of a parsed template.
//!
//! Produces one [`StaticControlNode`] per control element, indexed by prefixed
//! id. The index is built once per template and never mutated afterwards.

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::config::{Part, PartOrder, RenderConfig};
use crate::error::{LocationData, RenderError, RenderResult};
use crate::names::{QName, COMPONENT_SEPARATOR, XFORMS_NAMESPACE, XXFORMS_NAMESPACE};
use crate::template::{TemplateDocument, TemplateElement};

// ─── Control kinds ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ControlKind {
    Input,
    Secret,
    Textarea,
    Upload,
    Range,
    Output,
    Select,
    Select1,
    Trigger,
    Submit,
    Group,
    Switch,
    Case,
    Repeat,
    Component,
}

impl ControlKind {
    /// Kind of an element in the XForms namespace, by local name.
    pub fn from_name(name: &str) -> Option<ControlKind> {
        let kind = match name {
            "input" => ControlKind::Input,
            "secret" => ControlKind::Secret,
            "textarea" => ControlKind::Textarea,
            "upload" => ControlKind::Upload,
            "range" => ControlKind::Range,
            "output" => ControlKind::Output,
            "select" => ControlKind::Select,
            "select1" => ControlKind::Select1,
            "trigger" => ControlKind::Trigger,
            "submit" => ControlKind::Submit,
            "group" => ControlKind::Group,
            "switch" => ControlKind::Switch,
            "case" => ControlKind::Case,
            "repeat" => ControlKind::Repeat,
            _ => return None,
        };
        Some(kind)
    }

    pub fn name(self) -> &'static str {
        match self {
            ControlKind::Input => "input",
            ControlKind::Secret => "secret",
            ControlKind::Textarea => "textarea",
            ControlKind::Upload => "upload",
            ControlKind::Range => "range",
            ControlKind::Output => "output",
            ControlKind::Select => "select",
            ControlKind::Select1 => "select1",
            ControlKind::Trigger => "trigger",
            ControlKind::Submit => "submit",
            ControlKind::Group => "group",
            ControlKind::Switch => "switch",
            ControlKind::Case => "case",
            ControlKind::Repeat => "repeat",
            ControlKind::Component => "component",
        }
    }

    /// Containers render their own children between start and end.
    pub fn is_container(self) -> bool {
        matches!(
            self,
            ControlKind::Group
                | ControlKind::Switch
                | ControlKind::Case
                | ControlKind::Repeat
                | ControlKind::Component
        )
    }

    /// Controls holding a value, for which "required" can be empty or filled.
    pub fn is_value_control(self) -> bool {
        matches!(
            self,
            ControlKind::Input
                | ControlKind::Secret
                | ControlKind::Textarea
                | ControlKind::Upload
                | ControlKind::Range
                | ControlKind::Output
                | ControlKind::Select
                | ControlKind::Select1
        )
    }
}

/// XForms elements that are never controls themselves. Their subtrees are
/// consumed by the control that contains them.
const AUXILIARY_ELEMENTS: &[&str] = &[
    "label", "hint", "help", "alert", "item", "itemset", "choices", "value", "copy", "filename",
    "mediatype",
];

/// Model elements and actions. They run on the server and render nothing.
const NON_RENDERING_ELEMENTS: &[&str] = &[
    "model", "instance", "bind", "submission", "schema", "action", "setvalue", "insert", "delete",
    "setindex", "toggle", "setfocus", "dispatch", "send", "message", "load", "reset", "refresh",
    "rebuild", "recalculate", "revalidate", "var", "variable",
];

/// Whether an element produces no markup of its own and is skipped, with its
/// subtree, by the traversal.
pub fn is_auxiliary(name: &QName) -> bool {
    name.namespace == XFORMS_NAMESPACE
        && (AUXILIARY_ELEMENTS.contains(&name.name.as_str())
            || NON_RENDERING_ELEMENTS.contains(&name.name.as_str()))
}

/// The LHHA part an element stands for, if it is one.
pub fn lhha_part(name: &QName) -> Option<Part> {
    if name.namespace != XFORMS_NAMESPACE {
        return None;
    }
    match name.name.as_str() {
        "label" => Some(Part::Label),
        "hint" => Some(Part::Hint),
        "help" => Some(Part::Help),
        "alert" => Some(Part::Alert),
        _ => None,
    }
}

/// Control kind of a template element, if it is a control.
pub fn classify(element: &TemplateElement, config: &RenderConfig) -> Option<ControlKind> {
    if config.is_component(&element.name) {
        Some(ControlKind::Component)
    } else if element.is_xforms() {
        ControlKind::from_name(&element.name.name)
    } else {
        None
    }
}

// ─── Appearance ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Appearance {
    /// `minimal`, `compact`, `full`, ...
    Standard(String),
    /// `xxf:fieldset`, `xxforms:internal`, ...
    Extension(String),
}

impl Appearance {
    pub fn parse(value: &str, location: &LocationData) -> RenderResult<Appearance> {
        match value.split_once(':') {
            None => Ok(Appearance::Standard(value.to_string())),
            Some(("xxf", name)) | Some(("xxforms", name)) if !name.is_empty() => {
                Ok(Appearance::Extension(name.to_string()))
            }
            Some(_) => Err(RenderError::InvalidAppearance {
                appearance: value.to_string(),
                location: location.clone(),
            }),
        }
    }

    pub fn is_standard(&self, name: &str) -> bool {
        matches!(self, Appearance::Standard(n) if n == name)
    }

    pub fn is_extension(&self, name: &str) -> bool {
        matches!(self, Appearance::Extension(n) if n == name)
    }

    /// Segment used in `xforms-<kind>-appearance-<segment>`.
    pub fn class_segment(&self) -> String {
        match self {
            Appearance::Standard(name) => name.clone(),
            Appearance::Extension(name) => format!("xxforms-{}", name),
        }
    }
}

// ─── Mediatype ────────────────────────────────────────────────────────────────

pub fn validate_mediatype(value: &str, location: &LocationData) -> RenderResult<String> {
    static MEDIATYPE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = MEDIATYPE_REGEX
        .get_or_init(|| Regex::new(r"^[A-Za-z0-9][\w.+-]*/(\*|[A-Za-z0-9][\w.+-]*)$").unwrap());
    if regex.is_match(value) {
        Ok(value.to_string())
    } else {
        Err(RenderError::InvalidMediatype {
            value: value.to_string(),
            location: location.clone(),
        })
    }
}

/// `image/*` gives `xforms-mediatype-image`; `text/html` gives
/// `xforms-mediatype-text-html xforms-mediatype-text`.
pub fn mediatype_classes(mediatype: &str) -> String {
    match mediatype.split_once('/') {
        Some((kind, "*")) => format!("xforms-mediatype-{}", kind),
        Some((kind, subtype)) => format!(
            "xforms-mediatype-{}-{} xforms-mediatype-{}",
            kind, subtype, kind
        ),
        None => String::new(),
    }
}

// ─── Static nodes ─────────────────────────────────────────────────────────────

/// Static information about a label, hint, help or alert child element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LhhaStatic {
    pub class: Option<String>,
    /// Inline text, used when no live control provides a value.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StaticControlNode {
    pub kind: ControlKind,
    pub element: QName,
    pub static_id: String,
    pub prefixed_id: String,
    pub appearance: Option<Appearance>,
    pub mediatype: Option<String>,
    /// Per-control `xxf:order` override.
    pub order: Option<PartOrder>,
    pub has_binding: bool,
    pub label: Option<LhhaStatic>,
    pub hint: Option<LhhaStatic>,
    pub help: Option<LhhaStatic>,
    pub alert: Option<LhhaStatic>,
    pub location: LocationData,
}

impl StaticControlNode {
    fn from_element(
        element: &TemplateElement,
        kind: ControlKind,
        prefix: &str,
    ) -> RenderResult<StaticControlNode> {
        let location = element.location.clone();
        let static_id = element.id().ok_or_else(|| RenderError::MissingId {
            element: element.name.qualified(),
            location: location.clone(),
        })?;

        let appearance = element
            .attribute("appearance")
            .map(|value| Appearance::parse(value, &location))
            .transpose()?;
        let mediatype = element
            .attribute("mediatype")
            .map(|value| validate_mediatype(value, &location))
            .transpose()?;
        let order = element
            .attribute_ns(XXFORMS_NAMESPACE, "order")
            .map(PartOrder::parse)
            .transpose()?;
        let has_binding = ["ref", "bind", "nodeset"]
            .iter()
            .any(|name| element.attribute(name).is_some());

        let mut node = StaticControlNode {
            kind,
            element: element.name.clone(),
            static_id: static_id.to_string(),
            prefixed_id: format!("{}{}", prefix, static_id),
            appearance,
            mediatype,
            order,
            has_binding,
            label: None,
            hint: None,
            help: None,
            alert: None,
            location,
        };

        for child in element.element_children() {
            let Some(part) = lhha_part(&child.name) else {
                continue;
            };
            let lhha = LhhaStatic {
                class: child.attribute("class").map(str::to_string),
                text: child.text().trim().to_string(),
            };
            let slot = match part {
                Part::Label => &mut node.label,
                Part::Hint => &mut node.hint,
                Part::Help => &mut node.help,
                Part::Alert => &mut node.alert,
                Part::Control => continue,
            };
            // First occurrence wins
            if slot.is_none() {
                *slot = Some(lhha);
            }
        }

        Ok(node)
    }

    pub fn lhha(&self, part: Part) -> Option<&LhhaStatic> {
        match part {
            Part::Label => self.label.as_ref(),
            Part::Hint => self.hint.as_ref(),
            Part::Help => self.help.as_ref(),
            Part::Alert => self.alert.as_ref(),
            Part::Control => None,
        }
    }

    pub fn has_lhha(&self, part: Part) -> bool {
        self.lhha(part).is_some()
    }
}

// ─── Index ────────────────────────────────────────────────────────────────────

/// All controls of a template, by prefixed id.
#[derive(Debug, Clone, Default)]
pub struct StaticIndex {
    controls: HashMap<String, StaticControlNode>,
    document_order: Vec<String>,
}

impl StaticIndex {
    pub fn analyze(document: &TemplateDocument, config: &RenderConfig) -> RenderResult<StaticIndex> {
        let mut index = StaticIndex::default();
        index.visit(&document.root, "", config)?;
        log::debug!("static analysis found {} controls", index.len());
        Ok(index)
    }

    fn visit(&mut self, element: &TemplateElement, prefix: &str, config: &RenderConfig) -> RenderResult<()> {
        if is_auxiliary(&element.name) {
            return Ok(());
        }

        let Some(kind) = classify(element, config) else {
            for child in element.element_children() {
                self.visit(child, prefix, config)?;
            }
            return Ok(());
        };

        let node = StaticControlNode::from_element(element, kind, prefix)?;
        if self.controls.contains_key(&node.prefixed_id) {
            return Err(RenderError::DuplicateId {
                id: node.prefixed_id,
            });
        }

        let child_prefix = if kind == ControlKind::Component {
            format!("{}{}", node.prefixed_id, COMPONENT_SEPARATOR)
        } else {
            prefix.to_string()
        };

        let prefixed_id = node.prefixed_id.clone();
        self.document_order.push(prefixed_id.clone());
        self.controls.insert(prefixed_id, node);

        for child in element.element_children() {
            self.visit(child, &child_prefix, config)?;
        }
        Ok(())
    }

    pub fn get(&self, prefixed_id: &str) -> Option<&StaticControlNode> {
        self.controls.get(prefixed_id)
    }

    /// Controls in document order.
    pub fn iter(&self) -> impl Iterator<Item = &StaticControlNode> {
        self.document_order
            .iter()
            .filter_map(|id| self.controls.get(id))
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}
