//! Built-in registry
//!
//! A table mapping canonical dotted tags ("Object.getPrototypeOf") to
//! native implementations. The table is populated once during interpreter
//! startup, before any user code can run, and is read-only afterwards;
//! startup enumerates it in registration order to bind each tag to a
//! function object at the matching global path.

use crate::object::{FxIndexMap, NativeFn};

/// One registered native implementation: the user-visible dotted tag, the
/// function, and its declared arity.
#[derive(Clone, Copy)]
pub struct NativeImpl {
    pub tag: &'static str,
    pub func: NativeFn,
    pub arity: usize,
}

/// The registry of native implementations, in registration order.
#[derive(Default)]
pub struct Registry {
    impls: FxIndexMap<&'static str, NativeImpl>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an implementation. Idempotent: re-registering a tag keeps
    /// the first registration.
    pub fn register(&mut self, ni: NativeImpl) {
        self.impls.entry(ni.tag).or_insert(ni);
    }

    pub fn get(&self, tag: &str) -> Option<&NativeImpl> {
        self.impls.get(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NativeImpl> {
        self.impls.values()
    }

    pub fn len(&self) -> usize {
        self.impls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.impls.is_empty()
    }
}
