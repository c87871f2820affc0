//! Document traversal: walks the template and hands control elements to
//! their renderers.

use crate::analysis::{self, ControlKind, StaticIndex};
use crate::config::RenderConfig;
use crate::context::RenderCx;
use crate::error::{RenderError, RenderResult};
use crate::event::MarkupSink;
use crate::handlers;
use crate::ids;
use crate::lifecycle::{self, Lifecycle};
use crate::names::{QName, COMPONENT_SEPARATOR, XHTML_NAMESPACE, XXFORMS_NAMESPACE};
use crate::runtime::ControlTree;
use crate::scope;
use crate::template::{TemplateDocument, TemplateElement, TemplateNode};

/// Prefix the document root declares for the XHTML namespace (`""` for the
/// default namespace).
pub fn xhtml_prefix(document: &TemplateDocument) -> RenderResult<String> {
    document
        .root
        .namespaces
        .iter()
        .find(|(_, uri)| uri == XHTML_NAMESPACE)
        .map(|(prefix, _)| prefix.clone())
        .ok_or_else(|| RenderError::NoXhtmlPrefix {
            location: document.root.location.clone(),
        })
}

/// Render a whole document.
pub fn render_document<'a>(
    document: &'a TemplateDocument,
    index: &'a StaticIndex,
    tree: &'a dyn ControlTree,
    config: &'a RenderConfig,
    sink: &mut dyn MarkupSink,
) -> RenderResult<()> {
    let prefix = xhtml_prefix(document)?;
    let mut cx = RenderCx::new(config, index, tree, &prefix)?;
    log::debug!("rendering document with {} controls", index.len());
    render_element(&mut cx, &document.root, sink)
}

/// Render the live control `target` alone, as for a full update of that
/// control: the scope it lives in is rebuilt from the control tree first.
pub fn render_subtree<'a>(
    document: &'a TemplateDocument,
    index: &'a StaticIndex,
    tree: &'a dyn ControlTree,
    config: &'a RenderConfig,
    target: &str,
    sink: &mut dyn MarkupSink,
) -> RenderResult<()> {
    let prefix = xhtml_prefix(document)?;
    let restored = scope::restore_context(tree, target)?;

    let prefixed_id = ids::prefixed_id(target);
    let mut path = Vec::new();
    let element = find_control(&document.root, "", prefixed_id, config, &mut path).ok_or_else(|| {
        RenderError::UnknownControl {
            id: prefixed_id.to_string(),
        }
    })?;

    let mut cx = RenderCx::new(config, index, tree, &prefix)?;
    cx.scope = restored;
    cx.element_path = path;
    cx.full_update_target = Some(target.to_string());
    log::debug!("rendering subtree of '{}' from <{}>", target, element.name.qualified());
    render_element(&mut cx, element, sink)
}

/// Find the template element of a control by prefixed id, collecting the
/// non-control elements on the way into `path`.
fn find_control<'a>(
    element: &'a TemplateElement,
    prefix: &str,
    target: &str,
    config: &RenderConfig,
    path: &mut Vec<QName>,
) -> Option<&'a TemplateElement> {
    if analysis::is_auxiliary(&element.name) {
        return None;
    }

    let Some(kind) = analysis::classify(element, config) else {
        path.push(element.name.clone());
        for child in element.element_children() {
            if let Some(found) = find_control(child, prefix, target, config, path) {
                return Some(found);
            }
        }
        path.pop();
        return None;
    };

    let prefixed_id = format!("{}{}", prefix, element.id().unwrap_or_default());
    if prefixed_id == target {
        return Some(element);
    }
    let child_prefix = if kind == ControlKind::Component {
        format!("{}{}", prefixed_id, COMPONENT_SEPARATOR)
    } else {
        prefix.to_string()
    };
    element
        .element_children()
        .find_map(|child| find_control(child, &child_prefix, target, config, path))
}

pub fn render_element<'a>(
    cx: &mut RenderCx<'a>,
    element: &'a TemplateElement,
    sink: &mut dyn MarkupSink,
) -> RenderResult<()> {
    if analysis::is_auxiliary(&element.name) {
        return Ok(());
    }
    if element.is_xforms() || analysis::classify(element, cx.config).is_some() {
        return render_control(cx, element, sink);
    }
    if element.name.namespace == XXFORMS_NAMESPACE {
        return Ok(());
    }

    for (prefix, uri) in &element.namespaces {
        sink.start_prefix_mapping(prefix, uri)?;
    }
    sink.start_element(&element.name, &element.attributes)?;
    cx.element_path.push(element.name.clone());
    let result = render_children(cx, element, sink);
    cx.element_path.pop();
    result?;
    sink.end_element(&element.name)?;
    for (prefix, _) in element.namespaces.iter().rev() {
        sink.end_prefix_mapping(prefix)?;
    }
    Ok(())
}

fn render_children<'a>(
    cx: &mut RenderCx<'a>,
    element: &'a TemplateElement,
    sink: &mut dyn MarkupSink,
) -> RenderResult<()> {
    for child in &element.children {
        match child {
            TemplateNode::Text(text) => sink.characters(text)?,
            TemplateNode::Element(child) => render_element(cx, child, sink)?,
        }
    }
    Ok(())
}

fn render_control<'a>(
    cx: &mut RenderCx<'a>,
    element: &'a TemplateElement,
    sink: &mut dyn MarkupSink,
) -> RenderResult<()> {
    let handler = handlers::resolve(cx, element)?;
    let state = lifecycle::start(cx, handler, element, sink)?;

    if let Lifecycle::AwaitingEnd { ctl, .. } = &state {
        if ctl.node.kind.is_container() {
            handler.render_body(
                cx,
                ctl,
                sink,
                &mut |cx: &mut RenderCx<'a>, sink: &mut dyn MarkupSink| render_children(cx, element, sink),
            )?;
        }
    }

    lifecycle::end(cx, handler, state, sink)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventRecorder, MarkupEvent};
    use crate::runtime::{ControlSnapshot, LiveControl};
    use crate::template::parse_template;

    #[test]
    fn test_xhtml_prefix() {
        let doc = parse_template(r#"<xh:html xmlns:xh="http://www.w3.org/1999/xhtml"/>"#).unwrap();
        assert_eq!(xhtml_prefix(&doc).unwrap(), "xh");

        let doc = parse_template(r#"<html xmlns="http://www.w3.org/1999/xhtml"/>"#).unwrap();
        assert_eq!(xhtml_prefix(&doc).unwrap(), "");

        let doc = parse_template(r#"<html/>"#).unwrap();
        assert!(matches!(xhtml_prefix(&doc), Err(RenderError::NoXhtmlPrefix { .. })));
    }

    #[test]
    fn test_find_control_in_component() {
        let doc = parse_template(
            r#"<html xmlns="http://www.w3.org/1999/xhtml" xmlns:xf="http://www.w3.org/2002/xforms" xmlns:fr="urn:fr">
<body><fr:card id="card"><table><tr><xf:input id="name" ref="n"/></tr></table></fr:card></body>
</html>"#,
        )
        .unwrap();
        let config = RenderConfig::from_yaml("components:\n  - namespace: urn:fr\n    name: card\n").unwrap();

        let mut path = Vec::new();
        let found = find_control(&doc.root, "", "card≡name", &config, &mut path).unwrap();
        assert_eq!(found.id(), Some("name"));
        let names: Vec<&str> = path.iter().map(|name| name.name.as_str()).collect();
        assert_eq!(names, vec!["html", "body", "table", "tr"]);

        assert!(find_control(&doc.root, "", "name", &config, &mut Vec::new()).is_none());
    }

    #[test]
    fn test_unknown_xforms_element_has_no_handler() {
        let doc = parse_template(
            r#"<html xmlns="http://www.w3.org/1999/xhtml" xmlns:xf="http://www.w3.org/2002/xforms"><xf:dialog id="d"/></html>"#,
        )
        .unwrap();
        let config = RenderConfig::default();
        let index = StaticIndex::analyze(&doc, &config).unwrap();
        let snapshot = ControlSnapshot::new();
        let result = render_document(&doc, &index, &snapshot, &config, &mut EventRecorder::new());
        assert!(matches!(result, Err(RenderError::NoHandler { .. })));
    }

    #[test]
    fn test_actions_inside_controls_render_nothing() {
        let doc = parse_template(
            r#"<html xmlns="http://www.w3.org/1999/xhtml" xmlns:xf="http://www.w3.org/2002/xforms" xmlns:ev="http://www.w3.org/2001/xml-events">
<xf:group id="g">
  <xf:setvalue ev:event="DOMActivate" ref="a" value="1"/>
  <xf:insert ev:event="DOMActivate" ref="b"/>
  <xf:action ev:event="xforms-ready"><xf:dispatch name="go" targetid="g"/></xf:action>
  <xf:message ev:event="DOMFocusIn">Hello</xf:message>
  <xf:var name="v" value="1"/>
  <p>ok</p>
</xf:group>
</html>"#,
        )
        .unwrap();
        let config = RenderConfig::default();
        let index = StaticIndex::analyze(&doc, &config).unwrap();
        let snapshot = ControlSnapshot::new().with("g", LiveControl::new("group"));
        let mut recorder = EventRecorder::new();
        render_document(&doc, &index, &snapshot, &config, &mut recorder).unwrap();

        let started: Vec<&str> = recorder
            .events()
            .iter()
            .filter_map(|e| match e {
                MarkupEvent::StartElement { name, .. } => Some(name.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(started, vec!["html", "span", "p"]);
        assert!(!recorder
            .events()
            .iter()
            .any(|e| matches!(e, MarkupEvent::Characters(text) if text.contains("Hello"))));
    }

    #[test]
    fn test_auxiliary_and_extension_elements_are_dropped() {
        let doc = parse_template(
            r#"<html xmlns="http://www.w3.org/1999/xhtml" xmlns:xf="http://www.w3.org/2002/xforms" xmlns:xxf="http://orbeon.org/oxf/xml/xforms"><xf:model id="m"/><xxf:script/><p>hi</p></html>"#,
        )
        .unwrap();
        let config = RenderConfig::default();
        let index = StaticIndex::analyze(&doc, &config).unwrap();
        let snapshot = ControlSnapshot::new().with("x", LiveControl::new("input"));
        let mut recorder = EventRecorder::new();
        render_document(&doc, &index, &snapshot, &config, &mut recorder).unwrap();

        let started: Vec<&str> = recorder
            .events()
            .iter()
            .filter_map(|e| match e {
                MarkupEvent::StartElement { name, .. } => Some(name.name.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(started, vec!["html", "p"]);
    }
}
