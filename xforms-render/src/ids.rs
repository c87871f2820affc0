//! Splitting and composing effective ids.
//!
//! An effective id has the shape `a≡b≡static⊙2-3`: component prefixes, the
//! static id, then the repeat postfix.

use crate::names::{COMPONENT_SEPARATOR, LHHAC_SEPARATOR, REPEAT_INDEX_SEPARATOR, REPEAT_SEPARATOR};

/// The effective id without its repeat postfix.
pub fn prefixed_id(effective_id: &str) -> &str {
    match effective_id.find(REPEAT_SEPARATOR) {
        Some(index) => &effective_id[..index],
        None => effective_id,
    }
}

/// The repeat postfix, including its leading separator, or `""`.
pub fn postfix(effective_id: &str) -> &str {
    match effective_id.find(REPEAT_SEPARATOR) {
        Some(index) => &effective_id[index..],
        None => "",
    }
}

/// The static id: no component prefix, no repeat postfix.
pub fn static_id(effective_id: &str) -> &str {
    let prefixed = prefixed_id(effective_id);
    match prefixed.rfind(COMPONENT_SEPARATOR) {
        Some(index) => &prefixed[index + COMPONENT_SEPARATOR.len_utf8()..],
        None => prefixed,
    }
}

/// Id of a part (label, hint, control, ...) of the control `prefixed_id` + `postfix`.
pub fn lhhac_id(prefixed_id: &str, postfix: &str, code: &str) -> String {
    format!("{}{}{}{}", prefixed_id, LHHAC_SEPARATOR, code, postfix)
}

/// Decode a repeat postfix such as `⊙2-3` into `[2, 3]`.
///
/// Returns `None` if the postfix is not well formed. The empty postfix decodes
/// to no iterations.
pub fn decode_postfix(postfix: &str) -> Option<Vec<u32>> {
    if postfix.is_empty() {
        return Some(Vec::new());
    }
    let rest = postfix.strip_prefix(REPEAT_SEPARATOR)?;
    rest.split(REPEAT_INDEX_SEPARATOR)
        .map(|part| part.parse::<u32>().ok())
        .collect()
}

/// Iteration numbers of all the repeats an effective id is nested in.
pub fn iterations(effective_id: &str) -> Vec<u32> {
    decode_postfix(postfix(effective_id)).unwrap_or_default()
}
