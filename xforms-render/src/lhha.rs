//! Rendering of label, hint, help and alert parts.

use crate::classes::ClassList;
use crate::config::Part;
use crate::context::{ControlContext, RenderCx};
use crate::error::RenderResult;
use crate::event::{Attributes, MarkupSink};
use crate::names::DISABLED_CLASS;

/// Text of a part: the live value if the control provides one, the inline
/// template text otherwise. `None` when the control is not concrete.
pub fn lhha_text<'c>(ctl: &'c ControlContext, part: Part) -> Option<&'c str> {
    let control = ctl.control?;
    let live = match part {
        Part::Label => control.label.as_deref(),
        Part::Hint => control.hint.as_deref(),
        Part::Help => control.help.as_deref(),
        Part::Alert => control.alert.as_deref(),
        Part::Control => None,
    };
    live.or_else(|| ctl.node.lhha(part).map(|lhha| lhha.text.as_str()))
}

fn lhha_classes(ctl: &ControlContext, part: Part, text: Option<&str>) -> ClassList {
    let mut classes = ClassList::new();
    if let Some(class) = ctl.node.lhha(part).and_then(|lhha| lhha.class.as_deref()) {
        classes.push(class);
    }

    if part == Part::Alert && ctl.control.is_some_and(|control| !control.valid) {
        classes.push("xforms-active");
    }

    match ctl.control {
        Some(control) => {
            let relevant = match part {
                // Empty labels and alerts are allowed
                Part::Label | Part::Alert => control.relevant,
                _ => control.relevant && text.is_some_and(|t| !t.is_empty()),
            };
            if !relevant {
                classes.push(DISABLED_CLASS);
            }
        }
        None if !ctl.is_template || part == Part::Help => classes.push(DISABLED_CLASS),
        None => {}
    }

    classes.push(&format!("xforms-{}", part.token()));
    classes
}

/// Render one LHHA part of a control.
///
/// Labels become `label` elements pointing at `for_id`; the other parts are
/// `span`s. Help also gets an image placeholder, wrapped in an anchor to the
/// help text in no-script mode where the help text itself is not rendered.
pub fn render_lhha(
    cx: &RenderCx,
    ctl: &ControlContext,
    part: Part,
    for_id: &str,
    sink: &mut dyn MarkupSink,
) -> RenderResult<()> {
    if part == Part::Control || !ctl.node.has_lhha(part) {
        return Ok(());
    }
    let static_readonly = ctl.is_static_readonly(cx.config);
    if static_readonly && part == Part::Alert {
        return Ok(());
    }

    let text = lhha_text(ctl, part);
    let classes = lhha_classes(ctl, part, text);

    if part == Part::Help {
        let anchor = cx.xhtml("a");
        let with_anchor = cx.is_noscript() && ctl.is_concrete();
        if with_anchor {
            let attributes = Attributes::new()
                .with("href", &format!("#{}", ctl.lhhac_id(part.code())))
                .with("class", "xforms-help-anchor");
            sink.start_element(&anchor, &attributes)?;
        }
        let image = Attributes::new()
            .with("class", &format!("{}-image", classes.as_str()))
            .with("title", "")
            .with("alt", "");
        sink.element(&cx.xhtml("span"), &image, None)?;
        if with_anchor {
            sink.end_element(&anchor)?;
        }
        if cx.is_noscript() {
            return Ok(());
        }
    }

    let local = if part == Part::Label && !static_readonly {
        "label"
    } else {
        "span"
    };
    let mut attributes = Attributes::new()
        .with("id", &ctl.lhhac_id(part.code()))
        .with("class", classes.as_str());
    if local == "label" {
        attributes.set("for", for_id);
    }
    sink.element(&cx.xhtml(local), &attributes, text)
}
