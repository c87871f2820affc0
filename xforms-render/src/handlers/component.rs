use crate::classes::{self, ClassList};
use crate::context::{Body, ControlContext, RenderCx};
use crate::error::RenderResult;
use crate::event::MarkupSink;
use crate::handlers::ControlRenderer;
use crate::scope::ScopeFrame;

/// Custom components: a `span` whose content is rendered in the component's
/// own id scope.
pub struct ComponentRenderer;

impl ControlRenderer for ComponentRenderer {
    fn add_custom_classes(&self, _cx: &RenderCx, ctl: &ControlContext, classes: &mut ClassList) {
        let name = &ctl.element.name;
        classes.push("xbl-component");
        if name.prefix.is_empty() {
            classes.push(&format!("xbl-{}", name.name));
        } else {
            classes.push(&format!("xbl-{}-{}", name.prefix, name.name));
        }
    }

    fn render_start<'a>(
        &self,
        cx: &mut RenderCx<'a>,
        ctl: &ControlContext<'a>,
        sink: &mut dyn MarkupSink,
    ) -> RenderResult<()> {
        sink.start_element(&cx.xhtml("span"), &classes::control_attributes(cx, ctl, self))
    }

    fn render_body<'a>(
        &self,
        cx: &mut RenderCx<'a>,
        ctl: &ControlContext<'a>,
        sink: &mut dyn MarkupSink,
        body: Body<'_, 'a>,
    ) -> RenderResult<()> {
        let frame = ScopeFrame::Component {
            id: ctl.node.static_id.clone(),
        };
        cx.with_scope(frame, |cx| body(cx, sink))
    }

    fn render_end<'a>(
        &self,
        cx: &mut RenderCx<'a>,
        _ctl: &ControlContext<'a>,
        sink: &mut dyn MarkupSink,
    ) -> RenderResult<()> {
        sink.end_element(&cx.xhtml("span"))
    }
}
