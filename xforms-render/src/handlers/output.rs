use roxmltree::Node;

use crate::classes;
use crate::config::Part;
use crate::context::{ControlContext, RenderCx};
use crate::error::RenderResult;
use crate::event::{Attributes, MarkupSink};
use crate::handlers::{has_extension_appearance, ControlRenderer};
use crate::lhha;
use crate::template::TemplateElement;

pub fn is_image(_cx: &RenderCx, element: &TemplateElement) -> bool {
    element
        .attribute("mediatype")
        .is_some_and(|m| m.starts_with("image/"))
}

pub fn is_download(_cx: &RenderCx, element: &TemplateElement) -> bool {
    has_extension_appearance(element, "download")
}

pub fn is_text(_cx: &RenderCx, element: &TemplateElement) -> bool {
    has_extension_appearance(element, "text")
}

pub fn is_html(_cx: &RenderCx, element: &TemplateElement) -> bool {
    element.attribute("mediatype") == Some("text/html") || has_extension_appearance(element, "html")
}

/// Default `xf:output`: the value as text.
pub struct OutputRenderer;

impl ControlRenderer for OutputRenderer {
    fn render_start<'a>(
        &self,
        cx: &mut RenderCx<'a>,
        ctl: &ControlContext<'a>,
        sink: &mut dyn MarkupSink,
    ) -> RenderResult<()> {
        let container = cx.xhtml("span");
        sink.start_element(&container, &classes::control_attributes(cx, ctl, self))?;
        let inner = Attributes::new()
            .with("id", &ctl.lhhac_id("c"))
            .with("class", "xforms-output-output");
        sink.element(&cx.xhtml("span"), &inner, Some(ctl.value()))?;
        sink.end_element(&container)
    }
}

/// `xf:output` with an image mediatype: the value is the image URI.
pub struct ImageOutputRenderer;

impl ControlRenderer for ImageOutputRenderer {
    fn render_start<'a>(
        &self,
        cx: &mut RenderCx<'a>,
        ctl: &ControlContext<'a>,
        sink: &mut dyn MarkupSink,
    ) -> RenderResult<()> {
        let container = cx.xhtml("span");
        sink.start_element(&container, &classes::control_attributes(cx, ctl, self))?;
        let image = Attributes::new()
            .with("id", &ctl.lhhac_id("c"))
            .with("src", ctl.value())
            .with("alt", "");
        sink.element(&cx.xhtml("img"), &image, None)?;
        sink.end_element(&container)
    }
}

/// `xf:output appearance="xxf:download"`: a link to the value, labelled with
/// the control's label.
pub struct DownloadOutputRenderer;

impl ControlRenderer for DownloadOutputRenderer {
    fn render_lhha(
        &self,
        cx: &RenderCx,
        ctl: &ControlContext,
        part: Part,
        sink: &mut dyn MarkupSink,
    ) -> RenderResult<()> {
        // The label is the link text
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
        let container = cx.xhtml("span");
        sink.start_element(&container, &classes::control_attributes(cx, ctl, self))?;
        let mut link = Attributes::new().with("id", &ctl.lhhac_id("c"));
        if ctl.is_concrete() && !ctl.value().is_empty() {
            link.set("href", ctl.value());
        }
        let text = lhha::lhha_text(ctl, Part::Label)
            .or_else(|| ctl.node.label.as_ref().map(|label| label.text.as_str()));
        sink.element(&cx.xhtml("a"), &link, text)?;
        sink.end_element(&container)
    }
}

/// `xf:output appearance="xxf:text"`: the bare value, for places where no
/// markup is allowed such as the page title.
pub struct TextOutputRenderer;

impl ControlRenderer for TextOutputRenderer {
    fn render_lhha(&self, _cx: &RenderCx, _ctl: &ControlContext, _part: Part, _sink: &mut dyn MarkupSink) -> RenderResult<()> {
        Ok(())
    }

    fn render_start<'a>(
        &self,
        _cx: &mut RenderCx<'a>,
        ctl: &ControlContext<'a>,
        sink: &mut dyn MarkupSink,
    ) -> RenderResult<()> {
        if ctl.value().is_empty() {
            return Ok(());
        }
        sink.characters(ctl.value())
    }
}

/// `xf:output` with `mediatype="text/html"`: the value is markup, copied into
/// the page as XHTML inside a `div`.
pub struct HtmlOutputRenderer;

impl ControlRenderer for HtmlOutputRenderer {
    fn render_start<'a>(
        &self,
        cx: &mut RenderCx<'a>,
        ctl: &ControlContext<'a>,
        sink: &mut dyn MarkupSink,
    ) -> RenderResult<()> {
        let container = cx.xhtml("div");
        sink.start_element(&container, &classes::control_attributes(cx, ctl, self))?;
        let inner = Attributes::new()
            .with("id", &ctl.lhhac_id("c"))
            .with("class", "xforms-output-output");
        sink.start_element(&container, &inner)?;
        if !ctl.value().is_empty() {
            write_markup(cx, ctl, sink)?;
        }
        sink.end_element(&container)?;
        sink.end_element(&container)
    }
}

fn write_markup(cx: &RenderCx, ctl: &ControlContext, sink: &mut dyn MarkupSink) -> RenderResult<()> {
    let wrapped = format!("<div>{}</div>", ctl.value());
    match roxmltree::Document::parse(&wrapped) {
        Ok(fragment) => {
            for child in fragment.root_element().children() {
                write_node(cx, child, sink)?;
            }
            Ok(())
        }
        Err(e) => {
            log::warn!("output '{}' is not well-formed markup, writing it as text: {}", ctl.effective_id, e);
            sink.characters(ctl.value())
        }
    }
}

fn write_node(cx: &RenderCx, node: Node, sink: &mut dyn MarkupSink) -> RenderResult<()> {
    if node.is_text() {
        return sink.characters(node.text().unwrap_or_default());
    }
    if !node.is_element() {
        return Ok(());
    }

    let name = cx.xhtml(node.tag_name().name());
    let mut attributes = Attributes::new();
    for attribute in node.attributes().filter(|a| a.namespace().is_none()) {
        attributes.set(attribute.name(), attribute.value());
    }
    sink.start_element(&name, &attributes)?;
    for child in node.children() {
        write_node(cx, child, sink)?;
    }
    sink.end_element(&name)
}
