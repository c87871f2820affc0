//! Namespaces, separators and the literal class names clients depend on.

use serde::{Deserialize, Serialize};
use std::fmt;

pub const XHTML_NAMESPACE: &str = "http://www.w3.org/1999/xhtml";
pub const XFORMS_NAMESPACE: &str = "http://www.w3.org/2002/xforms";
pub const XXFORMS_NAMESPACE: &str = "http://orbeon.org/oxf/xml/xforms";

/// Appended to each component id in an id prefix.
pub const COMPONENT_SEPARATOR: char = '\u{2261}';
/// Separates the static id from the first repeat iteration.
pub const REPEAT_SEPARATOR: char = '\u{2299}';
/// Separates nested repeat iterations.
pub const REPEAT_INDEX_SEPARATOR: char = '-';
/// Separates a control id from the code of one of its parts.
pub const LHHAC_SEPARATOR: &str = "\u{2261}\u{2261}";

pub const DISABLED_CLASS: &str = "xforms-disabled";
pub const READONLY_CLASS: &str = "xforms-readonly";
pub const REQUIRED_CLASS: &str = "xforms-required";
pub const INVALID_CLASS: &str = "xforms-invalid";
pub const STATIC_CLASS: &str = "xforms-static";

pub const REPEAT_BEGIN_END_CLASS: &str = "xforms-repeat-begin-end";
pub const REPEAT_DELIMITER_CLASS: &str = "xforms-repeat-delimiter";
pub const REPEAT_TEMPLATE_CLASS: &str = "xforms-repeat-template";
pub const REPEAT_SELECTED_ITEM_CLASS: &str = "xforms-repeat-selected-item-";

pub const CASE_SELECTED_CLASS: &str = "xforms-case-selected";
pub const CASE_DESELECTED_CLASS: &str = "xforms-case-deselected";
pub const CASE_BEGIN_END_CLASS: &str = "xforms-case-begin-end";

pub const GROUP_BEGIN_END_CLASS: &str = "xforms-group-begin-end";

pub const TEMPLATE_LABEL_PLACEHOLDER: &str = "$xforms-template-label$";

/// An expanded element or attribute name, keeping the prefix it was written with.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct QName {
    #[serde(default)]
    pub namespace: String,
    #[serde(default)]
    pub prefix: String,
    pub name: String,
}

impl QName {
    pub fn new(namespace: &str, prefix: &str, name: &str) -> Self {
        QName {
            namespace: namespace.to_string(),
            prefix: prefix.to_string(),
            name: name.to_string(),
        }
    }

    /// A name in no namespace, as used by most attributes.
    pub fn local(name: &str) -> Self {
        QName::new("", "", name)
    }

    /// An XHTML element name written with the given prefix.
    pub fn xhtml(prefix: &str, name: &str) -> Self {
        QName::new(XHTML_NAMESPACE, prefix, name)
    }

    pub fn is(&self, namespace: &str, name: &str) -> bool {
        self.namespace == namespace && self.name == name
    }

    pub fn qualified(&self) -> String {
        if self.prefix.is_empty() {
            self.name.clone()
        } else {
            format!("{}:{}", self.prefix, self.name)
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified())
    }
}
