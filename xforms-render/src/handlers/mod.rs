//! Per-kind control renderers and the table that selects them.

pub mod case;
pub mod component;
pub mod group;
pub mod input;
pub mod output;
pub mod repeat;
pub mod select;
pub mod trigger;

use std::sync::OnceLock;

use crate::analysis::Appearance;
use crate::classes::ClassList;
use crate::config::Part;
use crate::context::{Body, ControlContext, RenderCx};
use crate::error::{RenderError, RenderResult};
use crate::event::MarkupSink;
use crate::lhha;
use crate::names::{XFORMS_NAMESPACE, XXFORMS_NAMESPACE};
use crate::template::TemplateElement;

/// Hooks implemented by each control kind.
///
/// Only `render_start` is required. The lifecycle calls `prepare`, then
/// `must_render`, then renders the parts in order, with `render_start` for the
/// control itself. For containers, `render_body` runs between `render_start`
/// and `render_end`.
pub trait ControlRenderer: Sync {
    fn prepare(&self, _cx: &RenderCx, _ctl: &mut ControlContext) -> RenderResult<()> {
        Ok(())
    }

    fn must_render(&self, _cx: &RenderCx, _ctl: &ControlContext) -> bool {
        true
    }

    fn is_default_incremental(&self) -> bool {
        false
    }

    fn appearance_override(&self, _cx: &RenderCx, appearance: Option<&Appearance>) -> Option<Appearance> {
        appearance.cloned()
    }

    fn add_custom_classes(&self, _cx: &RenderCx, _ctl: &ControlContext, _classes: &mut ClassList) {}

    /// Id the control's label points to.
    fn for_id(&self, ctl: &ControlContext) -> String {
        ctl.effective_id.clone()
    }

    fn render_start<'a>(
        &self,
        cx: &mut RenderCx<'a>,
        ctl: &ControlContext<'a>,
        sink: &mut dyn MarkupSink,
    ) -> RenderResult<()>;

    fn render_end<'a>(
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
        _ctl: &ControlContext<'a>,
        sink: &mut dyn MarkupSink,
        body: Body<'_, 'a>,
    ) -> RenderResult<()> {
        body(cx, sink)
    }

    fn render_lhha(
        &self,
        cx: &RenderCx,
        ctl: &ControlContext,
        part: Part,
        sink: &mut dyn MarkupSink,
    ) -> RenderResult<()> {
        lhha::render_lhha(cx, ctl, part, &self.for_id(ctl), sink)
    }
}

// ─── Dispatch table ───────────────────────────────────────────────────────────

/// Extra condition on an element, beyond its name.
pub type Matcher = fn(&RenderCx, &TemplateElement) -> bool;

struct Registration {
    namespace: &'static str,
    name: &'static str,
    matcher: Matcher,
    renderer: &'static dyn ControlRenderer,
}

fn any(_cx: &RenderCx, _element: &TemplateElement) -> bool {
    true
}

fn registration(name: &'static str, matcher: Matcher, renderer: &'static dyn ControlRenderer) -> Registration {
    Registration {
        namespace: XFORMS_NAMESPACE,
        name,
        matcher,
        renderer,
    }
}

/// Whether the element's appearance is the given extension appearance.
pub fn has_extension_appearance(element: &TemplateElement, name: &str) -> bool {
    match element.attribute("appearance").and_then(|a| a.split_once(':')) {
        Some((prefix, local)) => (prefix == "xxf" || prefix == "xxforms") && local == name,
        None => false,
    }
}

fn registrations() -> &'static [Registration] {
    static TABLE: OnceLock<Vec<Registration>> = OnceLock::new();
    TABLE.get_or_init(|| {
        vec![
            registration("input", any, &input::InputRenderer),
            registration("secret", any, &input::InputRenderer),
            registration("textarea", any, &input::InputRenderer),
            registration("upload", any, &input::InputRenderer),
            registration("range", any, &input::RangeRenderer),
            registration("output", output::is_text, &output::TextOutputRenderer),
            registration("output", output::is_download, &output::DownloadOutputRenderer),
            registration("output", output::is_image, &output::ImageOutputRenderer),
            registration("output", output::is_html, &output::HtmlOutputRenderer),
            registration("output", any, &output::OutputRenderer),
            registration("select", select::is_internal, &select::InternalSelectRenderer),
            registration("select", any, &select::SelectRenderer),
            registration("select1", select::is_internal, &select::InternalSelectRenderer),
            registration("select1", any, &select::SelectRenderer),
            registration("trigger", trigger::is_link, &trigger::LinkTriggerRenderer),
            registration("trigger", any, &trigger::TriggerRenderer),
            registration("submit", trigger::is_link, &trigger::LinkTriggerRenderer),
            registration("submit", any, &trigger::TriggerRenderer),
            registration("group", group::is_internal, &group::InternalGroupRenderer),
            registration("group", group::is_fieldset, &group::FieldsetGroupRenderer),
            registration("group", group::is_in_table, &group::TableGroupRenderer),
            registration("group", any, &group::GroupRenderer),
            registration("switch", any, &group::GroupRenderer),
            registration("case", any, &case::CaseRenderer),
            registration("repeat", any, &repeat::RepeatRenderer),
        ]
    })
}

/// Renderer for a control element: the first registration whose name and
/// matcher accept it. Elements bound to components use the component renderer.
pub fn resolve(cx: &RenderCx, element: &TemplateElement) -> RenderResult<&'static dyn ControlRenderer> {
    if cx.config.is_component(&element.name) {
        return Ok(&component::ComponentRenderer);
    }
    let name = &element.name;
    let found = registrations()
        .iter()
        .filter(|r| name.namespace == r.namespace && name.name == r.name)
        .find(|r| (r.matcher)(cx, element))
        .map(|r| r.renderer);

    match found {
        Some(renderer) => {
            log::trace!("resolved renderer for <{}>", name.qualified());
            Ok(renderer)
        }
        None => Err(RenderError::NoHandler {
            element: name.qualified(),
            location: element.location.clone(),
        }),
    }
}

/// Value of an `xxf:` attribute on a control element.
pub fn extension_attribute<'e>(element: &'e TemplateElement, name: &str) -> Option<&'e str> {
    element.attribute_ns(XXFORMS_NAMESPACE, name)
}
