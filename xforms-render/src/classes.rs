//! Class lists of rendered controls.

use crate::analysis::{mediatype_classes, ControlKind};
use crate::context::{ControlContext, RenderCx};
use crate::event::Attributes;
use crate::handlers::ControlRenderer;
use crate::names::{DISABLED_CLASS, INVALID_CLASS, READONLY_CLASS, REQUIRED_CLASS, STATIC_CLASS};

/// Space-separated class list; empty entries are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassList(String);

impl ClassList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, classes: &str) {
        let classes = classes.trim();
        if classes.is_empty() {
            return;
        }
        if !self.0.is_empty() {
            self.0.push(' ');
        }
        self.0.push_str(classes);
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

/// `xforms-control xforms-<kind>`, incremental, appearance, mediatype and
/// static read-only classes.
pub fn initial_classes(
    cx: &RenderCx,
    ctl: &ControlContext,
    handler: &dyn ControlRenderer,
    classes: &mut ClassList,
) {
    let kind = ctl.node.kind;
    let name = kind.name();
    match kind {
        ControlKind::Component => {}
        _ if kind.is_container() => classes.push(&format!("xforms-{}", name)),
        _ => classes.push(&format!("xforms-control xforms-{}", name)),
    }

    let incremental = ctl.element.attribute("incremental");
    let is_incremental = if handler.is_default_incremental() {
        incremental != Some("false")
    } else {
        incremental == Some("true")
    };
    if is_incremental {
        classes.push("xforms-incremental");
    }

    if let Some(appearance) = &ctl.appearance {
        classes.push(&format!(
            "xforms-{}-appearance-{}",
            name,
            appearance.class_segment()
        ));
    }

    if let Some(mediatype) = &ctl.node.mediatype {
        classes.push(&mediatype_classes(mediatype));
    }

    if ctl.is_static_readonly(cx.config) {
        classes.push(STATIC_CLASS);
    }
}

/// Classes reflecting relevance, validity, read-only and required state.
pub fn mip_classes(ctl: &ControlContext, classes: &mut ClassList) {
    match ctl.control {
        Some(control) => {
            if !control.relevant {
                classes.push(DISABLED_CLASS);
            }
            if !control.valid {
                classes.push(INVALID_CLASS);
            }
            if control.readonly {
                classes.push(READONLY_CLASS);
            }
            if control.required {
                classes.push(REQUIRED_CLASS);
                if ctl.node.kind.is_value_control() {
                    classes.push(if control.is_empty() {
                        "xforms-required-empty"
                    } else {
                        "xforms-required-filled"
                    });
                }
            }
        }
        // A bound control missing from the tree is not relevant
        None if ctl.node.has_binding && !ctl.is_template => classes.push(DISABLED_CLASS),
        None => {}
    }
}

/// Full class list of a control element: user classes first.
pub fn control_classes(cx: &RenderCx, ctl: &ControlContext, handler: &dyn ControlRenderer) -> String {
    let mut classes = ClassList::new();
    if let Some(user) = ctl.element.attribute("class") {
        classes.push(user);
    }
    initial_classes(cx, ctl, handler, &mut classes);
    mip_classes(ctl, &mut classes);
    handler.add_custom_classes(cx, ctl, &mut classes);
    classes.into_string()
}

/// `id`, `class` and accessibility attributes of a control element.
pub fn control_attributes(cx: &RenderCx, ctl: &ControlContext, handler: &dyn ControlRenderer) -> Attributes {
    let mut attributes = Attributes::new().with("id", &ctl.effective_id);
    attributes.append_class(&control_classes(cx, ctl, handler));
    copy_accessibility(ctl, &mut attributes);
    attributes
}

/// Copy `tabindex` (or XForms `navindex`) and `accesskey`.
pub fn copy_accessibility(ctl: &ControlContext, attributes: &mut Attributes) {
    let element = ctl.element;
    if let Some(tabindex) = element.attribute("navindex").or_else(|| element.attribute("tabindex")) {
        attributes.set("tabindex", tabindex);
    }
    if let Some(accesskey) = element.attribute("accesskey") {
        attributes.set("accesskey", accesskey);
    }
}
