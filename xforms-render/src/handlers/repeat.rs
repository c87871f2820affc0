//! `xf:repeat`: unrolls the repeat body once per iteration.
//!
//! With scripting the output of a repeat of size 2 looks like
//!
//! ```text
//! begin-marker  iteration-1  delimiter  iteration-2  delimiter  template  end-marker
//! ```
//!
//! where the markers and delimiters are empty elements shaped like the first
//! element of the body, so that they are valid wherever the body is (table
//! rows, list items, ...). The template is a copy of the body rendered with no
//! live controls, which the client clones to insert iterations.

use crate::classes::ClassList;
use crate::config::Part;
use crate::context::{Body, ControlContext, RenderCx};
use crate::error::RenderResult;
use crate::event::MarkupSink;
use crate::handlers::{extension_attribute, ControlRenderer};
use crate::interceptor::{write_delimiter, DelimiterShape, OutputInterceptor};
use crate::names::{
    DISABLED_CLASS, REPEAT_BEGIN_END_CLASS, REPEAT_DELIMITER_CLASS, REPEAT_SELECTED_ITEM_CLASS,
    REPEAT_TEMPLATE_CLASS,
};
use crate::scope::ScopeFrame;

pub struct RepeatRenderer;

/// Drag-and-drop classes added to every iteration.
pub fn dnd_classes(ctl: &ControlContext) -> ClassList {
    let mut classes = ClassList::new();
    let Some(dnd) = extension_attribute(ctl.element, "dnd").filter(|dnd| *dnd != "none") else {
        return classes;
    };
    classes.push("xforms-dnd");
    match dnd {
        "vertical" => classes.push("xforms-dnd-vertical"),
        "horizontal" => classes.push("xforms-dnd-horizontal"),
        _ => {}
    }
    if extension_attribute(ctl.element, "dnd-over").is_some() {
        classes.push("xforms-dnd-over");
    }
    classes
}

/// Class of the selected iteration; it cycles with the nesting depth so that
/// nested selections can be styled apart.
pub fn selected_item_class(parent_repeats: usize) -> String {
    format!("{}{}", REPEAT_SELECTED_ITEM_CLASS, (parent_repeats % 4) + 1)
}

impl ControlRenderer for RepeatRenderer {
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
        let state = ctl.control.map(|control| control.repeat_state()).unwrap_or_default();
        let parent_repeats = cx.scope.parent_repeat_count();
        let top_level = parent_repeats == 0;
        let is_repeat_selected = cx.scope.is_repeat_selected() || top_level;
        let location = ctl.element.location.describe("unrolling repeat control");

        if cx.is_noscript() {
            if ctl.is_concrete() {
                for i in 1..=state.size {
                    let frame = ScopeFrame::Repeat {
                        is_template: false,
                        iteration: i,
                        is_selected: is_repeat_selected && i == state.index,
                    };
                    cx.with_scope(frame, |cx| body(cx, &mut *sink))
                        .map_err(|e| e.located(location.clone()))?;
                }
            }
            log::debug!("unrolled repeat '{}' without script: {} iteration(s)", ctl.effective_id, state.size);
            return Ok(());
        }

        let must_generate_template = (cx.scope.is_template() || top_level) && cx.config.generate_templates;
        let with_markers = !cx.is_full_update_top_level(&ctl.effective_id);
        let user_classes = ctl.element.attribute("class").unwrap_or("");
        let dnd = dnd_classes(ctl);
        let static_readonly = ctl.is_static_readonly(cx.config);

        let mut interceptor = OutputInterceptor::new(&mut *sink, cx.xhtml("span"));
        if with_markers {
            let begin_id = format!("repeat-begin-{}", ctl.effective_id);
            let begin_classes = begin_end_classes(user_classes);
            interceptor = interceptor.on_first_delimiter(Box::new(
                move |sink: &mut dyn MarkupSink, shape: &DelimiterShape| {
                    write_delimiter(sink, shape, &begin_classes, Some(&begin_id))
                },
            ));
        }

        let mut rendered = 0;
        if ctl.is_concrete() {
            for i in 1..=state.size {
                if i > 1 {
                    interceptor.output_delimiter(REPEAT_DELIMITER_CLASS, None)?;
                }
                let selected = is_repeat_selected && i == state.index;

                let mut classes = ClassList::new();
                if selected && !static_readonly {
                    classes.push(&selected_item_class(parent_repeats));
                }
                classes.push(user_classes);
                if !state.is_iteration_relevant(i) {
                    classes.push(DISABLED_CLASS);
                }
                classes.push(dnd.as_str());
                interceptor.set_added_classes(classes.as_str());

                let frame = ScopeFrame::Repeat {
                    is_template: false,
                    iteration: i,
                    is_selected: selected,
                };
                cx.with_scope(frame, |cx| body(cx, &mut interceptor))
                    .map_err(|e| e.located(location.clone()))?;
                interceptor.flush_characters(true)?;
                rendered += 1;
            }
        }

        if must_generate_template {
            if interceptor.shape().is_some() {
                interceptor.output_delimiter(REPEAT_DELIMITER_CLASS, None)?;
            }
            let mut classes = ClassList::new();
            if top_level {
                classes.push(REPEAT_TEMPLATE_CLASS);
            }
            classes.push(dnd.as_str());
            interceptor.set_added_classes(classes.as_str());

            cx.with_scope(template_frame(), |cx| body(cx, &mut interceptor))
                .map_err(|e| e.located(location.clone()))?;
            interceptor.flush_characters(true)?;
        }

        if interceptor.shape().is_none() {
            // Nothing rendered: run the body once, silently, to learn the shape
            // of the markers
            interceptor.set_forward(false);
            cx.with_scope(template_frame(), |cx| body(cx, &mut interceptor))
                .map_err(|e| e.located(location.clone()))?;
            interceptor.flush_characters(true)?;
        }

        let shape = interceptor.finish();
        if with_markers {
            let end_id = format!("repeat-end-{}", ctl.effective_id);
            write_delimiter(sink, &shape, &begin_end_classes(user_classes), Some(&end_id))?;
        }

        log::debug!(
            "unrolled repeat '{}': {} iteration(s), template: {}, delimiter <{}>",
            ctl.effective_id,
            rendered,
            must_generate_template,
            shape.name.qualified()
        );
        Ok(())
    }
}

fn template_frame() -> ScopeFrame {
    ScopeFrame::Repeat {
        is_template: true,
        iteration: 0,
        is_selected: false,
    }
}

fn begin_end_classes(user_classes: &str) -> String {
    let mut classes = ClassList::new();
    classes.push(REPEAT_BEGIN_END_CLASS);
    classes.push(user_classes);
    classes.into_string()
}
