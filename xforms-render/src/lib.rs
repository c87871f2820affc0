//! # XForms control rendering
//!
//! Streams an XHTML page out of a template with embedded XForms controls and
//! the live state of those controls.
//!
//! ## Features
//! - Single-pass, event-based traversal: output goes to a [`MarkupSink`] as it is produced
//! - Repeats unrolled per iteration, with begin/end markers, delimiters and a client template
//! - Switch cases rendered with visibility classes, or dropped without scripting
//! - Label, hint, help and alert parts in a configurable order
//! - Full updates of a single control via [`render_subtree`]
//!
//! ## Example
//! ```ignore
//! use xforms_render::{render_to_string, ControlSnapshot, LiveControl, RenderConfig};
//!
//! let template = r#"
//! <html xmlns="http://www.w3.org/1999/xhtml" xmlns:xf="http://www.w3.org/2002/xforms">
//!   <body>
//!     <xf:input id="name" ref="name"><xf:label>Name</xf:label></xf:input>
//!   </body>
//! </html>
//! "#;
//!
//! let snapshot = ControlSnapshot::new().with("name", LiveControl::new("input").with_value("Ada"));
//! let xhtml = render_to_string(template, &snapshot, &RenderConfig::default()).expect("render failed");
//! ```

pub mod analysis;
pub mod classes;
pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod handlers;
pub mod ids;
pub mod interceptor;
pub mod lhha;
pub mod lifecycle;
pub mod names;
pub mod render;
pub mod runtime;
pub mod scope;
pub mod template;

// --- Core types ---
pub use analysis::{ControlKind, StaticIndex};
pub use config::{Part, PartOrder, RenderConfig};
pub use error::{LocationData, RenderError, RenderResult};
pub use event::{Attributes, EventRecorder, MarkupEvent, MarkupSink, XmlWriter};
pub use interceptor::{DelimiterShape, OutputInterceptor};
pub use names::QName;
pub use runtime::{ControlSnapshot, ControlTree, Item, LiveControl, RepeatState};
pub use scope::{restore_context, ScopeFrame, ScopeStack};
pub use template::{parse_template, TemplateDocument, TemplateElement};

// --- Rendering ---
pub use render::{render_document, render_subtree};

/// Parse a template, analyse it and render it against `tree` to XML text.
pub fn render_to_string(template: &str, tree: &dyn ControlTree, config: &RenderConfig) -> RenderResult<String> {
    let document = parse_template(template)?;
    let index = StaticIndex::analyze(&document, config)?;
    let mut writer = XmlWriter::new();
    render_document(&document, &index, tree, config, &mut writer)?;
    Ok(writer.finish())
}

/// Render the control `target` alone, for a full update, to XML text.
pub fn render_subtree_to_string(
    template: &str,
    tree: &dyn ControlTree,
    config: &RenderConfig,
    target: &str,
) -> RenderResult<String> {
    let document = parse_template(template)?;
    let index = StaticIndex::analyze(&document, config)?;
    let mut writer = XmlWriter::new();
    render_subtree(&document, &index, tree, config, target, &mut writer)?;
    Ok(writer.finish())
}
