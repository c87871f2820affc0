//! State threaded through a rendering pass.

use crate::analysis::{Appearance, StaticControlNode, StaticIndex};
use crate::config::{PartOrder, RenderConfig};
use crate::error::RenderResult;
use crate::event::MarkupSink;
use crate::ids;
use crate::names::{QName, XHTML_NAMESPACE};
use crate::runtime::{ControlTree, LiveControl};
use crate::scope::{ScopeFrame, ScopeStack};
use crate::template::TemplateElement;

/// Re-entry point into the traversal: renders the children of the control
/// being handled to the given sink.
pub type Body<'b, 'a> = &'b mut dyn FnMut(&mut RenderCx<'a>, &mut dyn MarkupSink) -> RenderResult<()>;

const TABLE_ELEMENTS: &[&str] = &["table", "tbody", "thead", "tfoot", "tr"];

/// Shared state of one rendering pass.
pub struct RenderCx<'a> {
    pub config: &'a RenderConfig,
    pub document_order: PartOrder,
    pub index: &'a StaticIndex,
    pub tree: &'a dyn ControlTree,
    pub scope: ScopeStack,
    pub xhtml_prefix: String,
    /// Enclosing XHTML elements copied from the template.
    pub element_path: Vec<QName>,
    /// Effective id of the control a full update starts from.
    pub full_update_target: Option<String>,
}

impl<'a> RenderCx<'a> {
    pub fn new(
        config: &'a RenderConfig,
        index: &'a StaticIndex,
        tree: &'a dyn ControlTree,
        xhtml_prefix: &str,
    ) -> RenderResult<Self> {
        Ok(RenderCx {
            config,
            document_order: config.document_order()?,
            index,
            tree,
            scope: ScopeStack::new(),
            xhtml_prefix: xhtml_prefix.to_string(),
            element_path: Vec::new(),
            full_update_target: None,
        })
    }

    /// An XHTML element name with the document's XHTML prefix.
    pub fn xhtml(&self, name: &str) -> QName {
        QName::xhtml(&self.xhtml_prefix, name)
    }

    pub fn is_noscript(&self) -> bool {
        self.config.noscript
    }

    pub fn is_full_update_top_level(&self, effective_id: &str) -> bool {
        self.full_update_target.as_deref() == Some(effective_id)
    }

    /// Whether the closest enclosing XHTML element is a table structure element.
    pub fn in_table(&self) -> bool {
        self.element_path.last().is_some_and(|name| {
            name.namespace == XHTML_NAMESPACE && TABLE_ELEMENTS.contains(&name.name.as_str())
        })
    }

    /// Run `f` with `frame` pushed on the scope stack. The frame is popped on
    /// every exit path.
    pub fn with_scope<T>(
        &mut self,
        frame: ScopeFrame,
        f: impl FnOnce(&mut RenderCx<'a>) -> RenderResult<T>,
    ) -> RenderResult<T> {
        self.scope.push(&frame);
        let result = f(self);
        self.scope.pop(&frame);
        result
    }
}

/// Per-invocation state of one control, built when its start event is handled.
#[derive(Debug, Clone)]
pub struct ControlContext<'a> {
    pub node: &'a StaticControlNode,
    pub element: &'a TemplateElement,
    pub prefixed_id: String,
    pub effective_id: String,
    /// `None` in template mode or when the control is absent from the tree.
    pub control: Option<&'a LiveControl>,
    pub appearance: Option<Appearance>,
    pub is_template: bool,
}

impl<'a> ControlContext<'a> {
    pub fn postfix(&self) -> &str {
        ids::postfix(&self.effective_id)
    }

    /// Id of one of the control's parts, by code.
    pub fn lhhac_id(&self, code: &str) -> String {
        ids::lhhac_id(&self.prefixed_id, self.postfix(), code)
    }

    pub fn is_concrete(&self) -> bool {
        self.control.is_some()
    }

    pub fn is_static_readonly(&self, config: &RenderConfig) -> bool {
        config.static_readonly && self.control.is_some_and(|control| control.readonly)
    }

    pub fn is_readonly(&self) -> bool {
        self.control.is_some_and(|control| control.readonly)
    }

    pub fn value(&self) -> &str {
        self.control.map(|control| control.value()).unwrap_or("")
    }

    pub fn is_appearance(&self, name: &str) -> bool {
        self.appearance
            .as_ref()
            .is_some_and(|appearance| appearance.is_standard(name))
    }
}
