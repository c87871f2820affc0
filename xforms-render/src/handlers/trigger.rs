use crate::analysis::{Appearance, ControlKind};
use crate::classes::{self, ClassList};
use crate::config::Part;
use crate::context::{ControlContext, RenderCx};
use crate::error::{RenderError, RenderResult};
use crate::event::{Attributes, MarkupSink};
use crate::handlers::{extension_attribute, has_extension_appearance, ControlRenderer};
use crate::lhha;
use crate::names::TEMPLATE_LABEL_PLACEHOLDER;
use crate::template::TemplateElement;

/// Links need script, so without it every trigger is a button. `xxf:link` is
/// the legacy name of the minimal appearance.
pub fn is_link(cx: &RenderCx, element: &TemplateElement) -> bool {
    !cx.is_noscript()
        && (element.attribute("appearance") == Some("minimal") || has_extension_appearance(element, "link"))
}

fn label<'c>(ctl: &'c ControlContext) -> RenderResult<&'c str> {
    if ctl.is_template {
        return Ok(TEMPLATE_LABEL_PLACEHOLDER);
    }
    let static_label = ctl.node.label.as_ref().map(|label| label.text.as_str());
    match (lhha::lhha_text(ctl, Part::Label), ctl.is_concrete()) {
        (Some(label), _) => Ok(label),
        (None, false) => Ok(static_label.unwrap_or("")),
        (None, true) => Err(RenderError::MissingLabel {
            control: ctl.node.kind.name().to_string(),
            id: ctl.effective_id.clone(),
            location: ctl.node.location.clone(),
        }),
    }
}

fn trigger_attributes(cx: &RenderCx, ctl: &ControlContext, handler: &dyn ControlRenderer) -> Attributes {
    let mut attributes = classes::control_attributes(cx, ctl, handler);
    if let Some(hint) = lhha::lhha_text(ctl, Part::Hint).filter(|h| !h.is_empty()) {
        attributes.set("title", hint);
    }
    attributes
}

fn modal_class(ctl: &ControlContext, classes: &mut ClassList) {
    if extension_attribute(ctl.element, "modal") == Some("true") {
        classes.push("xforms-trigger-appearance-modal");
    }
}

// The label is the content and the hint the title
fn render_trigger_lhha(
    cx: &RenderCx,
    ctl: &ControlContext,
    part: Part,
    for_id: &str,
    sink: &mut dyn MarkupSink,
) -> RenderResult<()> {
    match part {
        Part::Label | Part::Hint => Ok(()),
        _ => lhha::render_lhha(cx, ctl, part, for_id, sink),
    }
}

/// `xf:trigger` and `xf:submit` as a `button`.
pub struct TriggerRenderer;

impl ControlRenderer for TriggerRenderer {
    fn must_render(&self, cx: &RenderCx, ctl: &ControlContext) -> bool {
        !ctl.is_static_readonly(cx.config)
    }

    fn appearance_override(&self, cx: &RenderCx, appearance: Option<&Appearance>) -> Option<Appearance> {
        match appearance {
            Some(a) if cx.is_noscript() && (a.is_standard("minimal") || a.is_extension("link")) => {
                Some(Appearance::Extension("minimal".to_string()))
            }
            other => other.cloned(),
        }
    }

    fn add_custom_classes(&self, _cx: &RenderCx, ctl: &ControlContext, classes: &mut ClassList) {
        modal_class(ctl, classes);
    }

    fn render_lhha(&self, cx: &RenderCx, ctl: &ControlContext, part: Part, sink: &mut dyn MarkupSink) -> RenderResult<()> {
        render_trigger_lhha(cx, ctl, part, &self.for_id(ctl), sink)
    }

    fn render_start<'a>(
        &self,
        cx: &mut RenderCx<'a>,
        ctl: &ControlContext<'a>,
        sink: &mut dyn MarkupSink,
    ) -> RenderResult<()> {
        let label = label(ctl)?;
        let mut attributes = trigger_attributes(cx, ctl, self);
        let button_type = if ctl.node.kind == ControlKind::Submit {
            "submit"
        } else {
            "button"
        };
        attributes.set("type", button_type);
        if ctl.is_readonly() {
            attributes.set("disabled", "disabled");
        }
        sink.element(&cx.xhtml("button"), &attributes, Some(label))
    }
}

/// Minimal `xf:trigger` and `xf:submit`: a link activated by client script.
pub struct LinkTriggerRenderer;

impl ControlRenderer for LinkTriggerRenderer {
    fn must_render(&self, cx: &RenderCx, ctl: &ControlContext) -> bool {
        !ctl.is_static_readonly(cx.config)
    }

    fn add_custom_classes(&self, _cx: &RenderCx, ctl: &ControlContext, classes: &mut ClassList) {
        modal_class(ctl, classes);
    }

    fn render_lhha(&self, cx: &RenderCx, ctl: &ControlContext, part: Part, sink: &mut dyn MarkupSink) -> RenderResult<()> {
        render_trigger_lhha(cx, ctl, part, &self.for_id(ctl), sink)
    }

    fn render_start<'a>(
        &self,
        cx: &mut RenderCx<'a>,
        ctl: &ControlContext<'a>,
        sink: &mut dyn MarkupSink,
    ) -> RenderResult<()> {
        let label = label(ctl)?;
        let mut attributes = trigger_attributes(cx, ctl, self);
        attributes.set("href", "#");
        sink.element(&cx.xhtml("a"), &attributes, Some(label))
    }
}
