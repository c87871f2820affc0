//! The markup event stream: attributes, the sink trait and a few sinks.

use crate::error::RenderResult;
use crate::names::QName;
use std::fmt::Write;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

/// Ordered attribute list of a start element.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<Attribute>);

impl Attributes {
    pub fn new() -> Self {
        Attributes(Vec::new())
    }

    /// Builder form of [`Attributes::set`].
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.set(name, value);
        self
    }

    pub fn push(&mut self, name: QName, value: &str) {
        self.0.push(Attribute {
            name,
            value: value.to_string(),
        });
    }

    /// Value of an attribute in no namespace.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|a| a.name.namespace.is_empty() && a.name.name == name)
            .map(|a| a.value.as_str())
    }

    /// Value of an attribute in the given namespace.
    pub fn get_ns(&self, namespace: &str, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|a| a.name.is(namespace, name))
            .map(|a| a.value.as_str())
    }

    /// Add or replace an attribute in no namespace.
    pub fn set(&mut self, name: &str, value: &str) {
        match self
            .0
            .iter_mut()
            .find(|a| a.name.namespace.is_empty() && a.name.name == name)
        {
            Some(existing) => existing.value = value.to_string(),
            None => self.push(QName::local(name), value),
        }
    }

    /// Append classes to the `class` attribute, adding it if absent.
    pub fn append_class(&mut self, classes: &str) {
        if classes.is_empty() {
            return;
        }
        let merged = match self.get("class") {
            Some(existing) if !existing.is_empty() => format!("{} {}", existing, classes),
            _ => classes.to_string(),
        };
        self.set("class", &merged);
    }

    /// Append declarations to the `style` attribute, adding it if absent.
    pub fn append_style(&mut self, style: &str) {
        if style.is_empty() {
            return;
        }
        let merged = match self.get("style") {
            Some(existing) if !existing.trim().is_empty() => {
                format!("{}; {}", existing.trim().trim_end_matches(';'), style)
            }
            _ => style.to_string(),
        };
        self.set("style", &merged);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.0.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Consumer of the rendered markup.
///
/// Events must be balanced: every `start_element` is matched by an
/// `end_element` with the same name.
pub trait MarkupSink {
    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> RenderResult<()>;
    fn end_prefix_mapping(&mut self, prefix: &str) -> RenderResult<()>;
    fn start_element(&mut self, name: &QName, attributes: &Attributes) -> RenderResult<()>;
    fn end_element(&mut self, name: &QName) -> RenderResult<()>;
    fn characters(&mut self, text: &str) -> RenderResult<()>;

    /// Output a complete element with optional text content.
    fn element(&mut self, name: &QName, attributes: &Attributes, text: Option<&str>) -> RenderResult<()> {
        self.start_element(name, attributes)?;
        if let Some(text) = text.filter(|t| !t.is_empty()) {
            self.characters(text)?;
        }
        self.end_element(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent {
    StartPrefixMapping { prefix: String, uri: String },
    EndPrefixMapping { prefix: String },
    StartElement { name: QName, attributes: Attributes },
    EndElement { name: QName },
    Characters(String),
}

impl MarkupEvent {
    /// Start element with the given local name, if this is one.
    pub fn start_named(&self, local: &str) -> Option<&Attributes> {
        match self {
            MarkupEvent::StartElement { name, attributes } if name.name == local => {
                Some(attributes)
            }
            _ => None,
        }
    }
}

/// Records every event, for inspection.
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Vec<MarkupEvent>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[MarkupEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<MarkupEvent> {
        self.events
    }
}

impl MarkupSink for EventRecorder {
    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> RenderResult<()> {
        self.events.push(MarkupEvent::StartPrefixMapping {
            prefix: prefix.to_string(),
            uri: uri.to_string(),
        });
        Ok(())
    }

    fn end_prefix_mapping(&mut self, prefix: &str) -> RenderResult<()> {
        self.events.push(MarkupEvent::EndPrefixMapping {
            prefix: prefix.to_string(),
        });
        Ok(())
    }

    fn start_element(&mut self, name: &QName, attributes: &Attributes) -> RenderResult<()> {
        self.events.push(MarkupEvent::StartElement {
            name: name.clone(),
            attributes: attributes.clone(),
        });
        Ok(())
    }

    fn end_element(&mut self, name: &QName) -> RenderResult<()> {
        self.events.push(MarkupEvent::EndElement { name: name.clone() });
        Ok(())
    }

    fn characters(&mut self, text: &str) -> RenderResult<()> {
        // Adjacent character events are merged so that recordings compare equal
        // regardless of how text was chunked.
        if let Some(MarkupEvent::Characters(previous)) = self.events.last_mut() {
            previous.push_str(text);
        } else {
            self.events.push(MarkupEvent::Characters(text.to_string()));
        }
        Ok(())
    }
}

/// Serialises the event stream to XML text.
///
/// Prefix mappings started before an element are declared on that element.
/// Elements without content are written as empty-element tags.
#[derive(Debug, Default)]
pub struct XmlWriter {
    out: String,
    open_tag: bool,
    pending_mappings: Vec<(String, String)>,
}

impl XmlWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_str(&self) -> &str {
        &self.out
    }

    pub fn finish(mut self) -> String {
        self.close_open_tag();
        self.out
    }

    fn close_open_tag(&mut self) {
        if self.open_tag {
            self.out.push('>');
            self.open_tag = false;
        }
    }
}

impl MarkupSink for XmlWriter {
    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> RenderResult<()> {
        self.pending_mappings
            .push((prefix.to_string(), uri.to_string()));
        Ok(())
    }

    fn end_prefix_mapping(&mut self, _prefix: &str) -> RenderResult<()> {
        Ok(())
    }

    fn start_element(&mut self, name: &QName, attributes: &Attributes) -> RenderResult<()> {
        self.close_open_tag();
        write!(self.out, "<{}", name.qualified())?;
        for (prefix, uri) in self.pending_mappings.drain(..) {
            if prefix.is_empty() {
                write!(self.out, " xmlns=\"{}\"", escape_attribute(&uri))?;
            } else {
                write!(self.out, " xmlns:{}=\"{}\"", prefix, escape_attribute(&uri))?;
            }
        }
        for attribute in attributes.iter() {
            write!(
                self.out,
                " {}=\"{}\"",
                attribute.name.qualified(),
                escape_attribute(&attribute.value)
            )?;
        }
        self.open_tag = true;
        Ok(())
    }

    fn end_element(&mut self, name: &QName) -> RenderResult<()> {
        if self.open_tag {
            self.out.push_str("/>");
            self.open_tag = false;
        } else {
            write!(self.out, "</{}>", name.qualified())?;
        }
        Ok(())
    }

    fn characters(&mut self, text: &str) -> RenderResult<()> {
        if text.is_empty() {
            return Ok(());
        }
        self.close_open_tag();
        self.out.push_str(&escape_xml(text));
        Ok(())
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Like [`escape_xml`], with line breaks and tabs written as character
/// references so that they survive attribute value normalisation.
fn escape_attribute(s: &str) -> String {
    escape_xml(s)
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
        .replace('\t', "&#9;")
}
