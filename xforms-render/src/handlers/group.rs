use crate::classes;
use crate::config::Part;
use crate::context::{Body, ControlContext, RenderCx};
use crate::error::RenderResult;
use crate::event::{Attributes, MarkupSink};
use crate::handlers::{has_extension_appearance, ControlRenderer};
use crate::interceptor::{write_delimiter, DelimiterShape, OutputInterceptor};
use crate::lhha;
use crate::names::GROUP_BEGIN_END_CLASS;
use crate::template::TemplateElement;

pub fn is_internal(_cx: &RenderCx, element: &TemplateElement) -> bool {
    has_extension_appearance(element, "internal")
}

pub fn is_fieldset(_cx: &RenderCx, element: &TemplateElement) -> bool {
    has_extension_appearance(element, "fieldset")
}

pub fn is_in_table(cx: &RenderCx, _element: &TemplateElement) -> bool {
    cx.in_table()
}

/// Default group, also used for `xf:switch`: a `span` around the content.
pub struct GroupRenderer;

impl ControlRenderer for GroupRenderer {
    fn render_start<'a>(
        &self,
        cx: &mut RenderCx<'a>,
        ctl: &ControlContext<'a>,
        sink: &mut dyn MarkupSink,
    ) -> RenderResult<()> {
        sink.start_element(&cx.xhtml("span"), &classes::control_attributes(cx, ctl, self))
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

/// `appearance="xxf:internal"`: no markup of its own.
pub struct InternalGroupRenderer;

impl ControlRenderer for InternalGroupRenderer {
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
}

/// `appearance="xxf:fieldset"`: a `fieldset` whose `legend` is the label.
pub struct FieldsetGroupRenderer;

impl ControlRenderer for FieldsetGroupRenderer {
    fn render_lhha(&self, cx: &RenderCx, ctl: &ControlContext, part: Part, sink: &mut dyn MarkupSink) -> RenderResult<()> {
        // The label is the legend
        if part == Part::Label {
            return Ok(());
        }
        lhha::render_lhha(cx, ctl, part, &self.for_id(ctl), sink)
    }

    fn render_start<'a>(
        &self,
        cx: &mut RenderCx<'a>,
        ctl: &ControlContext<'a>,
        sink: &mut dyn MarkupSink,
    ) -> RenderResult<()> {
        sink.start_element(&cx.xhtml("fieldset"), &classes::control_attributes(cx, ctl, self))?;
        if ctl.node.has_lhha(Part::Label) {
            let text = lhha::lhha_text(ctl, Part::Label);
            let legend = Attributes::new().with("id", &ctl.lhhac_id(Part::Label.code()));
            sink.element(&cx.xhtml("legend"), &legend, text)?;
        }
        Ok(())
    }

    fn render_end<'a>(
        &self,
        cx: &mut RenderCx<'a>,
        _ctl: &ControlContext<'a>,
        sink: &mut dyn MarkupSink,
    ) -> RenderResult<()> {
        sink.end_element(&cx.xhtml("fieldset"))
    }
}

/// A group directly inside a table structure, which cannot contain a `span`.
///
/// Rows of the group receive the group's classes and the group is bounded by
/// begin/end markers shaped like its first row.
pub struct TableGroupRenderer;

impl ControlRenderer for TableGroupRenderer {
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
        let group_classes = classes::control_classes(cx, ctl, self);
        let begin_id = format!("group-begin-{}", ctl.effective_id);

        let mut interceptor = OutputInterceptor::new(sink, cx.xhtml("span")).on_first_delimiter(Box::new(
            move |sink: &mut dyn MarkupSink, shape: &DelimiterShape| {
                write_delimiter(sink, shape, GROUP_BEGIN_END_CLASS, Some(&begin_id))
            },
        ));
        interceptor.set_added_classes(&group_classes);
        body(cx, &mut interceptor)?;
        interceptor.flush_characters(true)?;
        let shape = interceptor.finish();

        let end_id = format!("group-end-{}", ctl.effective_id);
        write_delimiter(sink, &shape, GROUP_BEGIN_END_CLASS, Some(&end_id))
    }
}
