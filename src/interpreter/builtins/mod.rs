//! Builtin function implementations
//!
//! One module per global. Each exposes a `NATIVE_IMPLS` table consumed by
//! the registry at startup, plus an `init` hook that binds its root object
//! before the dotted tags are resolved.

pub mod object;

use crate::interpreter::registry::Registry;
use crate::interpreter::Interpreter;

/// Populate the registry with every builtin implementation.
pub(crate) fn register_all(registry: &mut Registry) {
    for ni in object::NATIVE_IMPLS {
        registry.register(*ni);
    }
}

/// Bind the root constructor objects. Runs after registration and before
/// the dotted tags are bound to function objects.
pub(crate) fn init_roots(interp: &mut Interpreter) {
    object::init(interp);
}
