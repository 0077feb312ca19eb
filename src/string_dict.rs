//! String dictionary for deduplicating JsString instances.
//!
//! Property keys repeat constantly (every descriptor object carries the
//! same six field names), so identical strings share one `Rc<str>`.

use rustc_hash::FxHashMap;

use crate::value::JsString;

/// Strings the core touches on nearly every operation.
const COMMON_STRINGS: &[&str] = &[
    "length",
    "value",
    "writable",
    "get",
    "set",
    "enumerable",
    "configurable",
    "prototype",
    "constructor",
    "toString",
    "valueOf",
    "Object",
];

/// A dictionary for deduplicating JsString instances.
///
/// Strings inserted into the dictionary are stored once and subsequent
/// requests for the same string return a cheap clone of the existing
/// instance.
pub struct StringDict {
    /// Map from string content to shared JsString instance.
    /// Using Box<str> as key to avoid double-indirection through Rc.
    strings: FxHashMap<Box<str>, JsString>,
}

impl StringDict {
    /// Create an empty dictionary.
    pub fn new() -> Self {
        Self {
            strings: FxHashMap::default(),
        }
    }

    /// Create a dictionary pre-populated with common strings.
    pub fn with_common_strings() -> Self {
        let mut dict = Self::new();
        for s in COMMON_STRINGS {
            dict.get_or_insert(s);
        }
        dict
    }

    /// Get an existing string or insert a new one.
    /// Returns a cheap clone of the shared JsString instance.
    pub fn get_or_insert(&mut self, s: &str) -> JsString {
        if let Some(existing) = self.strings.get(s) {
            return existing.clone();
        }
        let js_str = JsString::from(s);
        self.strings.insert(s.into(), js_str.clone());
        js_str
    }

    /// Number of unique strings in the dictionary.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if dictionary is empty.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl Default for StringDict {
    fn default() -> Self {
        Self::new()
    }
}
