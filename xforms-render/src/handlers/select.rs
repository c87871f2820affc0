use crate::analysis::ControlKind;
use crate::classes;
use crate::context::{ControlContext, RenderCx};
use crate::error::RenderResult;
use crate::event::{Attributes, MarkupSink};
use crate::handlers::{has_extension_appearance, ControlRenderer};
use crate::runtime::Item;
use crate::template::TemplateElement;

pub fn is_internal(_cx: &RenderCx, element: &TemplateElement) -> bool {
    has_extension_appearance(element, "internal")
}

/// `appearance="xxf:internal"`: a selection used only by other controls or by
/// script. Nothing is rendered.
pub struct InternalSelectRenderer;

impl ControlRenderer for InternalSelectRenderer {
    fn must_render(&self, _cx: &RenderCx, _ctl: &ControlContext) -> bool {
        false
    }

    fn render_start<'a>(
        &self,
        _cx: &mut RenderCx<'a>,
        _ctl: &ControlContext<'a>,
        _sink: &mut dyn MarkupSink,
    ) -> RenderResult<()> {
        Ok(())
    }
}

/// `xf:select` and `xf:select1`.
///
/// The `full` appearance renders a list of checkboxes or radio buttons; the
/// other appearances render an HTML `select`.
pub struct SelectRenderer;

fn is_multiple(ctl: &ControlContext) -> bool {
    ctl.node.kind == ControlKind::Select
}

fn is_selected(ctl: &ControlContext, item: &Item) -> bool {
    if is_multiple(ctl) {
        ctl.value().split_whitespace().any(|v| v == item.value)
    } else {
        ctl.value() == item.value
    }
}

fn items<'c>(ctl: &ControlContext<'c>) -> &'c [Item] {
    ctl.control.map(|control| control.items.as_slice()).unwrap_or(&[])
}

impl ControlRenderer for SelectRenderer {
    fn is_default_incremental(&self) -> bool {
        true
    }

    fn for_id(&self, ctl: &ControlContext) -> String {
        ctl.lhhac_id("c")
    }

    fn render_start<'a>(
        &self,
        cx: &mut RenderCx<'a>,
        ctl: &ControlContext<'a>,
        sink: &mut dyn MarkupSink,
    ) -> RenderResult<()> {
        let container = cx.xhtml("span");
        sink.start_element(&container, &classes::control_attributes(cx, ctl, self))?;

        if ctl.is_static_readonly(cx.config) {
            let labels: Vec<&str> = items(ctl)
                .iter()
                .filter(|item| is_selected(ctl, item))
                .map(|item| item.label.as_str())
                .collect();
            let text = labels.join(", ");
            sink.element(&cx.xhtml("span"), &Attributes::new().with("class", "xforms-field"), Some(text.as_str()))?;
            return sink.end_element(&container);
        }

        if ctl.is_appearance("full") {
            render_full(cx, ctl, sink)?;
        } else {
            render_dropdown(cx, ctl, sink)?;
        }
        sink.end_element(&container)
    }
}

fn render_full(cx: &RenderCx, ctl: &ControlContext, sink: &mut dyn MarkupSink) -> RenderResult<()> {
    let span = cx.xhtml("span");
    let input_type = if is_multiple(ctl) { "checkbox" } else { "radio" };

    for (i, item) in items(ctl).iter().enumerate() {
        let selected = is_selected(ctl, item);
        let item_id = ctl.lhhac_id(&format!("e{}", i));
        let class = if selected { "xforms-selected" } else { "xforms-deselected" };

        sink.start_element(&span, &Attributes::new().with("class", class))?;
        let mut input = Attributes::new()
            .with("id", &item_id)
            .with("type", input_type)
            .with("name", &ctl.effective_id)
            .with("value", &item.value);
        if selected {
            input.set("checked", "checked");
        }
        if ctl.is_readonly() {
            input.set("disabled", "disabled");
        }
        sink.element(&cx.xhtml("input"), &input, None)?;
        sink.element(&cx.xhtml("label"), &Attributes::new().with("for", &item_id), Some(item.label.as_str()))?;
        sink.end_element(&span)?;
    }
    Ok(())
}

fn render_dropdown(cx: &RenderCx, ctl: &ControlContext, sink: &mut dyn MarkupSink) -> RenderResult<()> {
    let select = cx.xhtml("select");
    let mut attributes = Attributes::new()
        .with("id", &ctl.lhhac_id("c"))
        .with("name", &ctl.effective_id);
    if is_multiple(ctl) {
        attributes.set("multiple", "multiple");
    }
    if ctl.is_readonly() {
        attributes.set("disabled", "disabled");
    }

    sink.start_element(&select, &attributes)?;
    for item in items(ctl) {
        let mut option = Attributes::new().with("value", &item.value);
        if is_selected(ctl, item) {
            option.set("selected", "selected");
        }
        sink.element(&cx.xhtml("option"), &option, Some(item.label.as_str()))?;
    }
    sink.end_element(&select)
}
