use crate::analysis::ControlKind;
use crate::classes;
use crate::context::{ControlContext, RenderCx};
use crate::error::RenderResult;
use crate::event::{Attributes, MarkupSink};
use crate::handlers::ControlRenderer;

/// `xf:input`, `xf:secret`, `xf:textarea` and `xf:upload`.
pub struct InputRenderer;

impl ControlRenderer for InputRenderer {
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
            let attributes = Attributes::new()
                .with("id", &ctl.lhhac_id("c"))
                .with("class", "xforms-field");
            sink.element(&cx.xhtml("span"), &attributes, Some(ctl.value()))?;
            return sink.end_element(&container);
        }

        let mut attributes = Attributes::new()
            .with("id", &ctl.lhhac_id("c"))
            .with("name", &ctl.effective_id);
        if ctl.is_readonly() {
            attributes.set("disabled", "disabled");
        }

        match ctl.node.kind {
            ControlKind::Textarea => {
                sink.element(&cx.xhtml("textarea"), &attributes, Some(ctl.value()))?;
            }
            kind => {
                let input_type = match kind {
                    ControlKind::Secret => "password",
                    ControlKind::Upload => "file",
                    _ => "text",
                };
                attributes.set("type", input_type);
                if kind != ControlKind::Upload {
                    attributes.set("value", ctl.value());
                }
                attributes.set("class", "xforms-input-input");
                sink.element(&cx.xhtml("input"), &attributes, None)?;
            }
        }

        sink.end_element(&container)
    }
}

/// `xf:range`: a track with a slider, positioned by client script.
pub struct RangeRenderer;

impl ControlRenderer for RangeRenderer {
    fn render_start<'a>(
        &self,
        cx: &mut RenderCx<'a>,
        ctl: &ControlContext<'a>,
        sink: &mut dyn MarkupSink,
    ) -> RenderResult<()> {
        let container = cx.xhtml("span");
        let div = cx.xhtml("div");
        sink.start_element(&container, &classes::control_attributes(cx, ctl, self))?;
        sink.start_element(&div, &Attributes::new().with("class", "xforms-range-track"))?;
        sink.element(&div, &Attributes::new().with("class", "xforms-range-slider"), None)?;
        sink.end_element(&div)?;
        sink.end_element(&container)
    }
}
