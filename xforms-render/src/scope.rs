//! Nested naming and visibility scopes.
//!
//! Component frames contribute to the id prefix, repeat frames to the id
//! postfix, case frames to visibility. The three kinds are kept on independent
//! stacks, each strictly LIFO.

use crate::error::{RenderError, RenderResult};
use crate::ids;
use crate::names::{COMPONENT_SEPARATOR, REPEAT_INDEX_SEPARATOR, REPEAT_SEPARATOR};
use crate::runtime::ControlTree;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeFrame {
    /// A component instance, by its id.
    Component { id: String },
    Repeat {
        is_template: bool,
        iteration: u32,
        is_selected: bool,
    },
    Case { visible: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct RepeatFrame {
    iteration: u32,
    /// Full postfix at this depth, e.g. `⊙2-3`.
    postfix: String,
    is_template: bool,
    is_selected: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeStack {
    components: Vec<String>,
    repeats: Vec<RepeatFrame>,
    cases: Vec<bool>,
}

impl ScopeStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_component(&mut self, id: &str) {
        self.components.push(id.to_string());
    }

    pub fn pop_component(&mut self) {
        self.components.pop();
    }

    pub fn push_repeat(&mut self, is_template: bool, iteration: u32, is_selected: bool) {
        let postfix = if is_template {
            String::new()
        } else {
            let current = self.id_postfix();
            if current.is_empty() {
                format!("{}{}", REPEAT_SEPARATOR, iteration)
            } else {
                format!("{}{}{}", current, REPEAT_INDEX_SEPARATOR, iteration)
            }
        };
        self.repeats.push(RepeatFrame {
            iteration,
            postfix,
            is_template,
            is_selected,
        });
    }

    pub fn pop_repeat(&mut self) {
        self.repeats.pop();
    }

    /// Push a case; its stored visibility is ANDed with the enclosing case's.
    pub fn push_case(&mut self, visible: bool) {
        let combined = self.case_visibility() && visible;
        self.cases.push(combined);
    }

    pub fn pop_case(&mut self) {
        self.cases.pop();
    }

    pub fn push(&mut self, frame: &ScopeFrame) {
        match frame {
            ScopeFrame::Component { id } => self.push_component(id),
            ScopeFrame::Repeat {
                is_template,
                iteration,
                is_selected,
            } => self.push_repeat(*is_template, *iteration, *is_selected),
            ScopeFrame::Case { visible } => self.push_case(*visible),
        }
    }

    pub fn pop(&mut self, frame: &ScopeFrame) {
        match frame {
            ScopeFrame::Component { .. } => self.pop_component(),
            ScopeFrame::Repeat { .. } => self.pop_repeat(),
            ScopeFrame::Case { .. } => self.pop_case(),
        }
    }

    // ─── Queries ─────────────────────────────────────────────────────────────

    pub fn id_prefix(&self) -> String {
        let mut prefix = String::new();
        for id in &self.components {
            prefix.push_str(id);
            prefix.push(COMPONENT_SEPARATOR);
        }
        prefix
    }

    pub fn id_postfix(&self) -> &str {
        self.repeats
            .last()
            .map(|frame| frame.postfix.as_str())
            .unwrap_or("")
    }

    pub fn effective_id(&self, static_id: &str) -> String {
        format!("{}{}{}", self.id_prefix(), static_id, self.id_postfix())
    }

    pub fn prefixed_id(&self, static_id: &str) -> String {
        format!("{}{}", self.id_prefix(), static_id)
    }

    pub fn is_template(&self) -> bool {
        self.repeats.last().is_some_and(|frame| frame.is_template)
    }

    pub fn is_repeat_selected(&self) -> bool {
        self.repeats.last().is_some_and(|frame| frame.is_selected)
    }

    /// Iteration of the innermost repeat, 0 outside repeats and in templates.
    pub fn current_iteration(&self) -> u32 {
        self.repeats.last().map(|frame| frame.iteration).unwrap_or(0)
    }

    pub fn parent_repeat_count(&self) -> usize {
        self.repeats.len()
    }

    pub fn case_visibility(&self) -> bool {
        self.cases.last().copied().unwrap_or(true)
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty() && self.repeats.is_empty() && self.cases.is_empty()
    }
}

/// Rebuild the scope stack in effect just outside the live control
/// `effective_id`, as if rendering had started from the document root.
pub fn restore_context(tree: &dyn ControlTree, effective_id: &str) -> RenderResult<ScopeStack> {
    let unknown = |id: &str| RenderError::UnknownControl { id: id.to_string() };

    let control = tree.control(effective_id).ok_or_else(|| unknown(effective_id))?;

    let mut ancestors = Vec::new();
    let mut current = control.parent.as_deref();
    while let Some(parent_id) = current {
        let parent = tree.control(parent_id).ok_or_else(|| unknown(parent_id))?;
        ancestors.push((parent_id, parent));
        current = parent.parent.as_deref();
    }
    ancestors.reverse();

    let iterations = ids::iterations(effective_id);
    let mut stack = ScopeStack::new();
    for (id, ancestor) in ancestors {
        match ancestor.kind.as_str() {
            "repeat" => {
                let depth = stack.parent_repeat_count();
                let iteration = iterations.get(depth).copied().ok_or_else(|| unknown(effective_id))?;
                let is_top_level = depth == 0;
                let selected = (stack.is_repeat_selected() || is_top_level)
                    && iteration == ancestor.repeat_state().index;
                stack.push_repeat(false, iteration, selected);
            }
            "component" => stack.push_component(ids::static_id(id)),
            "case" => stack.push_case(ancestor.selected),
            _ => {}
        }
    }

    log::debug!(
        "restored context for '{}': prefix '{}', postfix '{}'",
        effective_id,
        stack.id_prefix(),
        stack.id_postfix()
    );
    Ok(stack)
}
