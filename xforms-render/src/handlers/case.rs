use crate::config::Part;
use crate::context::{Body, ControlContext, RenderCx};
use crate::error::RenderResult;
use crate::event::MarkupSink;
use crate::handlers::ControlRenderer;
use crate::interceptor::{write_delimiter, DelimiterShape, OutputInterceptor};
use crate::names::{CASE_BEGIN_END_CLASS, CASE_DESELECTED_CLASS, CASE_SELECTED_CLASS};
use crate::scope::ScopeFrame;

/// `xf:case`.
///
/// With scripting, every case is rendered and its first-level elements are
/// shown or hidden, so the client can switch cases without a round trip. In
/// no-script mode only visible cases are rendered.
pub struct CaseRenderer;

fn is_selected(ctl: &ControlContext) -> bool {
    ctl.control.is_some_and(|control| control.selected)
}

impl ControlRenderer for CaseRenderer {
    fn must_render(&self, cx: &RenderCx, ctl: &ControlContext) -> bool {
        !cx.is_noscript() || (cx.scope.case_visibility() && is_selected(ctl))
    }

    fn render_lhha(&self, _cx: &RenderCx, _ctl: &ControlContext, _part: Part, _sink: &mut dyn MarkupSink) -> RenderResult<()> {
        Ok(())
    }

    fn render_start<'a>(
        &self,
        _cx: &mut RenderCx<'a>,
        _ctl: &ControlContext<'a>,
        _sink: &mut dyn MarkupSink,
    ) -> RenderResult<()> {
        Ok(())
    }

    fn render_body<'a>(
        &self,
        cx: &mut RenderCx<'a>,
        ctl: &ControlContext<'a>,
        sink: &mut dyn MarkupSink,
        body: Body<'_, 'a>,
    ) -> RenderResult<()> {
        let frame = ScopeFrame::Case {
            visible: is_selected(ctl),
        };
        cx.with_scope(frame, |cx| {
            if cx.is_noscript() {
                return body(cx, sink);
            }

            let visible = cx.scope.case_visibility();
            let begin_id = format!("xforms-case-begin-{}", ctl.effective_id);
            let mut interceptor = OutputInterceptor::new(&mut *sink, cx.xhtml("span")).on_first_delimiter(Box::new(
                move |sink: &mut dyn MarkupSink, shape: &DelimiterShape| {
                    write_delimiter(sink, shape, CASE_BEGIN_END_CLASS, Some(&begin_id))
                },
            ));
            if visible {
                interceptor.set_added_classes(CASE_SELECTED_CLASS);
                interceptor.set_added_style("display:block");
            } else {
                interceptor.set_added_classes(CASE_DESELECTED_CLASS);
                interceptor.set_added_style("display:none");
            }
            body(cx, &mut interceptor)?;
            interceptor.flush_characters(true)?;
            let shape = interceptor.finish();

            let end_id = format!("xforms-case-end-{}", ctl.effective_id);
            write_delimiter(sink, &shape, CASE_BEGIN_END_CLASS, Some(&end_id))
        })
    }
}
