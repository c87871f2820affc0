//! Start/end state machine of a single control.
//!
//! A control goes `Idle → AwaitingEnd → Idle`. [`start`] prepares the control
//! and renders the parts up to and including the control itself; when nothing
//! is left to do it stays `Idle`. Otherwise the parts that come after the
//! control in its order, and the end of containers, are rendered by [`end`]
//! once the control's children have been rendered.

use crate::config::Part;
use crate::context::{ControlContext, RenderCx};
use crate::error::{RenderError, RenderResult};
use crate::event::MarkupSink;
use crate::handlers::ControlRenderer;
use crate::template::TemplateElement;

#[derive(Debug)]
pub enum Lifecycle<'a> {
    Idle,
    AwaitingEnd {
        ctl: ControlContext<'a>,
        /// Parts still to render, starting with the control itself.
        remaining: Vec<Part>,
    },
}

/// Resolve a control element into a fresh [`ControlContext`].
pub fn control_context<'a>(
    cx: &RenderCx<'a>,
    handler: &dyn ControlRenderer,
    element: &'a TemplateElement,
) -> RenderResult<ControlContext<'a>> {
    let static_id = element.id().ok_or_else(|| RenderError::MissingId {
        element: element.name.qualified(),
        location: element.location.clone(),
    })?;
    let prefixed_id = cx.scope.prefixed_id(static_id);
    let node = cx
        .index
        .get(&prefixed_id)
        .ok_or_else(|| RenderError::UnknownControl {
            id: prefixed_id.clone(),
        })?;

    let effective_id = format!("{}{}", prefixed_id, cx.scope.id_postfix());
    let is_template = cx.scope.is_template();
    let control = if is_template {
        None
    } else {
        cx.tree.control(&effective_id)
    };

    if let Some(control) = control {
        if control.kind != node.kind.name() {
            return Err(RenderError::ControlTypeMismatch {
                id: effective_id,
                expected: node.kind.name().to_string(),
                actual: control.kind.clone(),
                location: element.location.clone(),
            });
        }
    }

    Ok(ControlContext {
        node,
        element,
        prefixed_id,
        effective_id,
        control,
        appearance: handler.appearance_override(cx, node.appearance.as_ref()),
        is_template,
    })
}

fn render_part(
    cx: &RenderCx,
    handler: &dyn ControlRenderer,
    ctl: &ControlContext,
    part: Part,
    sink: &mut dyn MarkupSink,
) -> RenderResult<()> {
    if ctl.node.has_lhha(part) {
        handler.render_lhha(cx, ctl, part, sink)?;
    }
    Ok(())
}

/// Handle the start of a control element.
pub fn start<'a>(
    cx: &mut RenderCx<'a>,
    handler: &dyn ControlRenderer,
    element: &'a TemplateElement,
    sink: &mut dyn MarkupSink,
) -> RenderResult<Lifecycle<'a>> {
    let mut ctl = control_context(cx, handler, element)?;
    handler.prepare(cx, &mut ctl)?;
    if !handler.must_render(cx, &ctl) {
        return Ok(Lifecycle::Idle);
    }

    let order = ctl
        .node
        .order
        .clone()
        .unwrap_or_else(|| cx.document_order.clone());
    let parts = order.parts();

    for (i, &part) in parts.iter().enumerate() {
        if part != Part::Control {
            render_part(cx, handler, &ctl, part, sink)?;
            continue;
        }

        handler.render_start(cx, &ctl, sink)?;
        let is_last = i + 1 == parts.len();
        if is_last && !ctl.node.kind.is_container() {
            return Ok(Lifecycle::Idle);
        }
        return Ok(Lifecycle::AwaitingEnd {
            ctl,
            remaining: parts[i..].to_vec(),
        });
    }

    // Orders always contain the control
    Ok(Lifecycle::Idle)
}

/// Handle the end of a control element.
pub fn end<'a>(
    cx: &mut RenderCx<'a>,
    handler: &dyn ControlRenderer,
    state: Lifecycle<'a>,
    sink: &mut dyn MarkupSink,
) -> RenderResult<()> {
    let Lifecycle::AwaitingEnd { ctl, remaining } = state else {
        return Ok(());
    };
    for part in remaining {
        if part == Part::Control {
            handler.render_end(cx, &ctl, sink)?;
        } else {
            render_part(cx, handler, &ctl, part, sink)?;
        }
    }
    Ok(())
}
