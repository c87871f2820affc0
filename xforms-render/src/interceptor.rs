//! Sink decorator for dynamic regions (repeat iterations, cases, groups in
//! tables).
//!
//! The interceptor annotates the first-level elements of a region with extra
//! classes, wraps bare first-level text in a span, and learns the shape of the
//! region's begin/end markers from the first element it sees.

use crate::error::RenderResult;
use crate::event::{Attributes, MarkupSink};
use crate::names::QName;

/// Element name used for a region's delimiters, frozen from its first element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimiterShape {
    pub name: QName,
}

impl DelimiterShape {
    pub fn new(name: QName) -> Self {
        DelimiterShape { name }
    }
}

/// Called once, when the shape is frozen, with the downstream sink.
pub type DelimiterCallback<'s> =
    Box<dyn FnMut(&mut dyn MarkupSink, &DelimiterShape) -> RenderResult<()> + 's>;

/// Write an empty delimiter element.
pub fn write_delimiter(
    sink: &mut dyn MarkupSink,
    shape: &DelimiterShape,
    classes: &str,
    id: Option<&str>,
) -> RenderResult<()> {
    let mut attributes = Attributes::new();
    if let Some(id) = id {
        attributes.set("id", id);
    }
    attributes.set("class", classes);
    sink.start_element(&shape.name, &attributes)?;
    sink.end_element(&shape.name)
}

pub struct OutputInterceptor<'s> {
    downstream: &'s mut dyn MarkupSink,
    first_delimiter: Option<DelimiterCallback<'s>>,
    /// Wrapper for bare text, also the shape used when no element shows up.
    wrapper: QName,
    shape: Option<DelimiterShape>,
    /// Open elements inside the region.
    level: usize,
    buffer: String,
    added_classes: String,
    added_style: String,
    forward: bool,
}

impl<'s> OutputInterceptor<'s> {
    pub fn new(downstream: &'s mut dyn MarkupSink, wrapper: QName) -> Self {
        OutputInterceptor {
            downstream,
            first_delimiter: None,
            wrapper,
            shape: None,
            level: 0,
            buffer: String::new(),
            added_classes: String::new(),
            added_style: String::new(),
            forward: true,
        }
    }

    /// Install the callback fired when the delimiter shape is frozen.
    pub fn on_first_delimiter(mut self, callback: DelimiterCallback<'s>) -> Self {
        self.first_delimiter = Some(callback);
        self
    }

    pub fn set_added_classes(&mut self, classes: &str) {
        self.added_classes = classes.to_string();
    }

    pub fn set_added_style(&mut self, style: &str) {
        self.added_style = style.to_string();
    }

    /// Disable to observe a region without letting its content through.
    /// Delimiters are still written.
    pub fn set_forward(&mut self, forward: bool) {
        self.forward = forward;
    }

    pub fn shape(&self) -> Option<&DelimiterShape> {
        self.shape.as_ref()
    }

    /// Write a delimiter straight to the downstream sink.
    pub fn output_delimiter(&mut self, classes: &str, id: Option<&str>) -> RenderResult<()> {
        let shape = self
            .shape
            .clone()
            .unwrap_or_else(|| DelimiterShape::new(self.wrapper.clone()));
        write_delimiter(&mut *self.downstream, &shape, classes, id)
    }

    /// Handle buffered text. Must be called with `final_flush` when the region
    /// (or one pass over it) ends, so that the shape is always known afterwards.
    pub fn flush_characters(&mut self, final_flush: bool) -> RenderResult<()> {
        if !self.buffer.is_empty() {
            let text = std::mem::take(&mut self.buffer);
            if self.level == 0 && !text.trim().is_empty() {
                let wrapper = self.wrapper.clone();
                self.freeze_shape(&wrapper)?;
                if self.forward {
                    let mut attributes = Attributes::new();
                    attributes.append_class(&self.added_classes);
                    attributes.append_style(&self.added_style);
                    self.downstream.start_element(&wrapper, &attributes)?;
                    self.downstream.characters(&text)?;
                    self.downstream.end_element(&wrapper)?;
                }
            } else if self.forward {
                self.downstream.characters(&text)?;
            }
        }
        if final_flush {
            let wrapper = self.wrapper.clone();
            self.freeze_shape(&wrapper)?;
        }
        Ok(())
    }

    /// The frozen shape, or the wrapper shape if nothing was ever flushed.
    pub fn finish(self) -> DelimiterShape {
        self.shape
            .unwrap_or_else(|| DelimiterShape::new(self.wrapper))
    }

    fn freeze_shape(&mut self, name: &QName) -> RenderResult<()> {
        if self.shape.is_some() {
            return Ok(());
        }
        let shape = DelimiterShape::new(name.clone());
        if let Some(mut callback) = self.first_delimiter.take() {
            callback(&mut *self.downstream, &shape)?;
        }
        self.shape = Some(shape);
        Ok(())
    }
}

impl MarkupSink for OutputInterceptor<'_> {
    fn start_prefix_mapping(&mut self, prefix: &str, uri: &str) -> RenderResult<()> {
        if self.forward {
            self.downstream.start_prefix_mapping(prefix, uri)?;
        }
        Ok(())
    }

    fn end_prefix_mapping(&mut self, prefix: &str) -> RenderResult<()> {
        if self.forward {
            self.downstream.end_prefix_mapping(prefix)?;
        }
        Ok(())
    }

    fn start_element(&mut self, name: &QName, attributes: &Attributes) -> RenderResult<()> {
        self.flush_characters(false)?;
        if self.level == 0 {
            self.freeze_shape(name)?;
            if self.forward {
                let mut attributes = attributes.clone();
                attributes.append_class(&self.added_classes);
                attributes.append_style(&self.added_style);
                self.downstream.start_element(name, &attributes)?;
            }
        } else if self.forward {
            self.downstream.start_element(name, attributes)?;
        }
        self.level += 1;
        Ok(())
    }

    fn end_element(&mut self, name: &QName) -> RenderResult<()> {
        self.flush_characters(false)?;
        self.level = self.level.saturating_sub(1);
        if self.forward {
            self.downstream.end_element(name)?;
        }
        Ok(())
    }

    fn characters(&mut self, text: &str) -> RenderResult<()> {
        self.buffer.push_str(text);
        Ok(())
    }
}
