use roxmltree::Node;

use crate::error::{LocationData, RenderResult};
use crate::event::Attributes;
use crate::names::{QName, XFORMS_NAMESPACE};

/// A parsed template document: XHTML with embedded XForms controls.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateDocument {
    pub root: TemplateElement,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplateNode {
    Element(TemplateElement),
    Text(String),
}

/// An element of the template, owned and immutable once parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateElement {
    pub name: QName,
    pub attributes: Attributes,
    /// Namespace declarations made on this element, as `(prefix, uri)`.
    pub namespaces: Vec<(String, String)>,
    pub children: Vec<TemplateNode>,
    pub location: LocationData,
}

impl TemplateElement {
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name)
    }

    pub fn attribute_ns(&self, namespace: &str, name: &str) -> Option<&str> {
        self.attributes.get_ns(namespace, name)
    }

    pub fn id(&self) -> Option<&str> {
        self.attribute("id")
    }

    pub fn is_xforms(&self) -> bool {
        self.name.namespace == XFORMS_NAMESPACE
    }

    /// Iterator over element children (skips text).
    pub fn element_children(&self) -> impl Iterator<Item = &TemplateElement> {
        self.children.iter().filter_map(|child| match child {
            TemplateNode::Element(element) => Some(element),
            TemplateNode::Text(_) => None,
        })
    }

    /// Concatenated text of all descendants.
    pub fn text(&self) -> String {
        let mut text = String::new();
        collect_text(self, &mut text);
        text
    }
}

fn collect_text(element: &TemplateElement, out: &mut String) {
    for child in &element.children {
        match child {
            TemplateNode::Text(text) => out.push_str(text),
            TemplateNode::Element(element) => collect_text(element, out),
        }
    }
}

// ─── Parsing ──────────────────────────────────────────────────────────────────

const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// Parse a template document.
pub fn parse_template(xml: &str) -> RenderResult<TemplateDocument> {
    let doc = roxmltree::Document::parse(xml)?;
    let root = convert_element(&doc, xml, doc.root_element(), &[]);
    Ok(TemplateDocument { root })
}

fn convert_element<'a>(
    doc: &roxmltree::Document<'a>,
    xml: &str,
    node: Node<'a, 'a>,
    inherited: &[(String, String)],
) -> TemplateElement {
    let in_scope: Vec<(String, String)> = node
        .namespaces()
        .filter(|ns| ns.uri() != XML_NAMESPACE)
        .map(|ns| (ns.name().unwrap_or("").to_string(), ns.uri().to_string()))
        .collect();
    let namespaces: Vec<(String, String)> = in_scope
        .iter()
        .filter(|ns| !inherited.contains(ns))
        .cloned()
        .collect();

    let name = QName::new(
        node.tag_name().namespace().unwrap_or(""),
        element_prefix(xml, node),
        node.tag_name().name(),
    );

    let mut attributes = Attributes::new();
    for attr in node.attributes() {
        let namespace = attr.namespace().unwrap_or("");
        let prefix = if namespace.is_empty() {
            ""
        } else {
            in_scope
                .iter()
                .find(|(prefix, uri)| !prefix.is_empty() && uri == namespace)
                .map(|(prefix, _)| prefix.as_str())
                .unwrap_or("")
        };
        attributes.push(QName::new(namespace, prefix, attr.name()), attr.value());
    }

    let pos = doc.text_pos_at(node.range().start);
    let location = LocationData::new(pos.row, pos.col);

    let mut children = Vec::new();
    for child in node.children() {
        if child.is_element() {
            children.push(TemplateNode::Element(convert_element(
                doc, xml, child, &in_scope,
            )));
        } else if child.is_text() {
            if let Some(text) = child.text() {
                children.push(TemplateNode::Text(text.to_string()));
            }
        }
    }

    TemplateElement {
        name,
        attributes,
        namespaces,
        children,
        location,
    }
}

/// Prefix the element name was written with, read back from the source text.
fn element_prefix<'a>(xml: &'a str, node: Node) -> &'a str {
    let start = node.range().start + 1;
    let qname = xml[start..]
        .split(|c: char| c.is_whitespace() || c == '>' || c == '/')
        .next()
        .unwrap_or("");
    match qname.find(':') {
        Some(colon) => &qname[..colon],
        None => "",
    }
}
