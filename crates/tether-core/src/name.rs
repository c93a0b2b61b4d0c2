//! Qualified type name helpers.
//!
//! Host types are registered under a fully-qualified dotted name such as
//! `tether._native.FieldDescriptor`, but are exposed on the module under
//! their rightmost segment.

use crate::kind::WrapperKind;

/// Build the fully-qualified name of `kind` inside `module`.
pub fn qualified_name(module: &str, kind: WrapperKind) -> String {
    format!("{module}.{}", kind.class_name())
}

/// The class name of a fully-qualified type name: the text after the
/// rightmost `.`.
///
/// Returns `None` if the name has no module prefix or the class segment
/// is empty.
pub fn class_name(qualified: &str) -> Option<&str> {
    let (module, class) = qualified.rsplit_once('.')?;
    if module.is_empty() || class.is_empty() {
        return None;
    }
    Some(class)
}
