//! Heap objects
//!
//! An object is a prototype link, an owner tag, and an insertion-ordered
//! table of named properties. Arrays and native functions are ordinary
//! objects with a class marker and a seeded `length` property; primitive
//! wrappers carry their `[[PrimitiveValue]]` in the class. Chain-walking
//! reads and writes live on the interpreter (they may run accessors); the
//! operations here touch a single object.

use std::cell::RefCell;
use std::fmt;
use std::hash::BuildHasherDefault;
use std::rc::Rc;

use indexmap::IndexMap;
use rustc_hash::FxHasher;

use crate::error::JsError;
use crate::interpreter::Interpreter;
use crate::property::{Property, PropertyDescriptor, PropertyKind};
use crate::value::{JsString, JsValue, OwnerId};

/// Insertion-ordered map with the fast hasher, per the project convention.
pub type FxIndexMap<K, V> = IndexMap<K, V, BuildHasherDefault<FxHasher>>;

/// Reference to a heap-allocated object.
/// Clone is cheap - just increments the reference count.
pub type JsObjectRef = Rc<RefCell<JsObject>>;

/// Native function signature: the uniform built-in calling convention.
/// The `Err` arm carries a thrown completion; implementations propagate it
/// with `?` and never convert it to a panic.
pub type NativeFn = fn(&mut Interpreter, JsValue, &[JsValue]) -> Result<JsValue, JsError>;

/// Native function wrapper
#[derive(Clone)]
pub struct NativeFunction {
    pub name: &'static str,
    pub func: NativeFn,
    pub arity: usize,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

/// What kind of object this is. Ordinary objects carry no extra state;
/// the wrapper classes hold the boxed primitive.
#[derive(Debug)]
pub enum ObjectClass {
    Ordinary,
    Array,
    Function(NativeFunction),
    Boolean(bool),
    Number(f64),
    String(JsString),
}

/// A heap object.
#[derive(Debug)]
pub struct JsObject {
    /// Internal prototype. `None` is a null prototype - an ordinary state,
    /// reachable through `Object.create(null)`.
    pub proto: Option<JsObjectRef>,
    /// Owner tag; semantics belong to the surrounding system.
    pub owner: Option<OwnerId>,
    /// Whether new own properties may be added.
    pub extensible: bool,
    pub class: ObjectClass,
    /// Own properties in insertion order. Updates keep their slot and
    /// deletes shift, so enumeration order is stable under redefinition.
    pub properties: FxIndexMap<JsString, Property>,
}

impl JsObject {
    pub fn new(owner: Option<OwnerId>, proto: Option<JsObjectRef>) -> Self {
        Self {
            proto,
            owner,
            extensible: true,
            class: ObjectClass::Ordinary,
            properties: FxIndexMap::default(),
        }
    }

    pub fn is_callable(&self) -> bool {
        matches!(self.class, ObjectClass::Function(_))
    }

    pub fn native(&self) -> Option<&NativeFunction> {
        match &self.class {
            ObjectClass::Function(nf) => Some(nf),
            _ => None,
        }
    }

    /// The boxed primitive of a wrapper object, if this is one.
    pub fn primitive_value(&self) -> Option<JsValue> {
        match &self.class {
            ObjectClass::Boolean(b) => Some(JsValue::Boolean(*b)),
            ObjectClass::Number(n) => Some(JsValue::Number(*n)),
            ObjectClass::String(s) => Some(JsValue::String(s.clone())),
            _ => None,
        }
    }

    /// The `[[Class]]` name used by `Object.prototype.toString`.
    pub fn class_name(&self) -> &'static str {
        match self.class {
            ObjectClass::Ordinary => "Object",
            ObjectClass::Array => "Array",
            ObjectClass::Function(_) => "Function",
            ObjectClass::Boolean(_) => "Boolean",
            ObjectClass::Number(_) => "Number",
            ObjectClass::String(_) => "String",
        }
    }

    /// Look up an own property. No prototype walk.
    pub fn get_own_property(&self, key: &str) -> Option<&Property> {
        self.properties.get(key)
    }

    pub fn has_own_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// Own property keys in insertion order. Integer-like keys are not
    /// reordered; consumers rely on this.
    pub fn own_property_keys(&self) -> Vec<JsString> {
        self.properties.keys().cloned().collect()
    }

    /// The current value of an array's `length` property.
    pub fn array_length(&self) -> u32 {
        self.get_own_property("length")
            .and_then(|p| p.value())
            .and_then(|v| v.as_number())
            .map(|n| n as u32)
            .unwrap_or(0)
    }

    /// Full ES5 8.12.9 [[DefineOwnProperty]], plus the array `length` and
    /// index magic of 15.4.5.1 when this object is an array.
    pub fn define_own_property(
        &mut self,
        key: JsString,
        desc: PropertyDescriptor,
    ) -> Result<(), JsError> {
        if matches!(self.class, ObjectClass::Array) {
            if key == "length" {
                return self.define_array_length(desc);
            }
            if let Some(index) = array_index(key.as_str()) {
                let old_len = self.array_length();
                if index >= old_len && !self.length_writable() {
                    return Err(JsError::type_error(format!(
                        "Cannot add property {}, array length is not writable",
                        key
                    )));
                }
                self.define_ordinary(key, desc)?;
                if index >= old_len {
                    self.set_length_value(index + 1);
                }
                return Ok(());
            }
        }
        self.define_ordinary(key, desc)
    }

    fn define_ordinary(&mut self, key: JsString, desc: PropertyDescriptor) -> Result<(), JsError> {
        // ToPropertyDescriptor never produces a mixed descriptor.
        debug_assert!(!(desc.is_data_descriptor() && desc.is_accessor_descriptor()));

        let Some(current) = self.properties.get(&key) else {
            if !self.extensible {
                return Err(JsError::type_error(format!(
                    "Cannot add property {}, object is not extensible",
                    key
                )));
            }
            let kind = if desc.is_accessor_descriptor() {
                PropertyKind::Accessor {
                    get: desc.get.as_ref().and_then(accessor_slot),
                    set: desc.set.as_ref().and_then(accessor_slot),
                }
            } else {
                PropertyKind::Data {
                    value: desc.value.clone().unwrap_or(JsValue::Undefined),
                    writable: desc.writable.unwrap_or(false),
                }
            };
            self.properties.insert(
                key,
                Property {
                    enumerable: desc.enumerable.unwrap_or(false),
                    configurable: desc.configurable.unwrap_or(false),
                    kind,
                },
            );
            return Ok(());
        };

        if desc.is_empty() {
            return Ok(());
        }

        if !current.configurable {
            let rejected = Err(JsError::type_error(format!(
                "Cannot redefine property: {}",
                key
            )));
            if desc.configurable == Some(true) {
                return rejected;
            }
            if let Some(e) = desc.enumerable {
                if e != current.enumerable {
                    return rejected;
                }
            }
            if !desc.is_generic() {
                if desc.is_accessor_descriptor() != current.is_accessor() {
                    return rejected;
                }
                match &current.kind {
                    PropertyKind::Data { value, writable } => {
                        if !writable {
                            if desc.writable == Some(true) {
                                return rejected;
                            }
                            if let Some(v) = &desc.value {
                                if !v.same_value(value) {
                                    return rejected;
                                }
                            }
                        }
                    }
                    PropertyKind::Accessor { get, set } => {
                        if let Some(g) = &desc.get {
                            if !same_accessor(g, get) {
                                return rejected;
                            }
                        }
                        if let Some(s) = &desc.set {
                            if !same_accessor(s, set) {
                                return rejected;
                            }
                        }
                    }
                }
            }
        }

        let mut prop = current.clone();
        if let Some(e) = desc.enumerable {
            prop.enumerable = e;
        }
        if let Some(c) = desc.configurable {
            prop.configurable = c;
        }
        if desc.is_accessor_descriptor() {
            let (mut get, mut set) = match prop.kind {
                PropertyKind::Accessor { get, set } => (get, set),
                PropertyKind::Data { .. } => (None, None),
            };
            if let Some(g) = &desc.get {
                get = accessor_slot(g);
            }
            if let Some(s) = &desc.set {
                set = accessor_slot(s);
            }
            prop.kind = PropertyKind::Accessor { get, set };
        } else if desc.is_data_descriptor() {
            let (mut value, mut writable) = match prop.kind {
                PropertyKind::Data { value, writable } => (value, writable),
                PropertyKind::Accessor { .. } => (JsValue::Undefined, false),
            };
            if let Some(v) = &desc.value {
                value = v.clone();
            }
            if let Some(w) = desc.writable {
                writable = w;
            }
            prop.kind = PropertyKind::Data { value, writable };
        }
        // Inserting over an existing key keeps its position in the table.
        self.properties.insert(key, prop);
        Ok(())
    }

    /// ES5 15.4.5.1: defining `length` with a value truncates elements at
    /// or above the new length. The new length must round-trip through
    /// ToUint32 or the define fails with a RangeError.
    fn define_array_length(&mut self, desc: PropertyDescriptor) -> Result<(), JsError> {
        let Some(value) = desc.value.clone() else {
            // Attribute-only change (e.g. narrowing writable).
            return self.define_ordinary("length".into(), desc);
        };
        let n = value.to_number();
        let new_len = n as u32;
        if f64::from(new_len) != n {
            return Err(JsError::range_error("Invalid array length"));
        }
        if desc.configurable == Some(true) || desc.enumerable == Some(true) {
            return Err(JsError::type_error("Cannot redefine property: length"));
        }
        let old_len = self.array_length();
        if !self.length_writable() && (new_len != old_len || desc.writable == Some(true)) {
            return Err(JsError::type_error(
                "Cannot assign to read only property 'length' of object",
            ));
        }
        if new_len < old_len {
            self.properties.retain(|k, _| match array_index(k.as_str()) {
                Some(i) => i < new_len,
                None => true,
            });
        }
        self.set_length_value(new_len);
        if desc.writable == Some(false) {
            if let Some(prop) = self.properties.get_mut("length") {
                if let PropertyKind::Data { writable, .. } = &mut prop.kind {
                    *writable = false;
                }
            }
        }
        Ok(())
    }

    fn length_writable(&self) -> bool {
        self.get_own_property("length").map_or(true, |p| p.writable())
    }

    fn set_length_value(&mut self, len: u32) {
        if let Some(prop) = self.properties.get_mut("length") {
            if let PropertyKind::Data { value, .. } = &mut prop.kind {
                *value = JsValue::Number(f64::from(len));
            }
        }
    }

    /// Remove an own property. Fails only when the property exists and is
    /// non-configurable; deleting a missing property succeeds.
    pub fn delete_property(&mut self, key: &str) -> Result<(), JsError> {
        match self.properties.get(key) {
            Some(prop) if !prop.configurable => Err(JsError::type_error(format!(
                "Cannot delete property '{}' of #<{}>",
                key,
                self.class_name()
            ))),
            Some(_) => {
                // shift_remove keeps the survivors in insertion order.
                self.properties.shift_remove(key);
                Ok(())
            }
            None => Ok(()),
        }
    }
}

fn accessor_slot(v: &JsValue) -> Option<JsObjectRef> {
    match v {
        JsValue::Object(obj) => Some(obj.clone()),
        _ => None,
    }
}

fn same_accessor(v: &JsValue, current: &Option<JsObjectRef>) -> bool {
    match (v, current) {
        (JsValue::Object(a), Some(b)) => Rc::ptr_eq(a, b),
        (JsValue::Undefined, None) => true,
        _ => false,
    }
}

/// Parse a property key as an array index: the canonical base-10 form of a
/// uint32 strictly below 2^32 - 1. Leading zeros disqualify ("01" is a
/// plain key).
pub fn array_index(key: &str) -> Option<u32> {
    if key.is_empty() || (key.len() > 1 && key.starts_with('0')) {
        return None;
    }
    if !key.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match key.parse::<u32>() {
        Ok(n) if n != u32::MAX => Some(n),
        _ => None,
    }
}

/// Create a new ordinary object.
pub fn new_object(owner: Option<OwnerId>, proto: Option<JsObjectRef>) -> JsObjectRef {
    Rc::new(RefCell::new(JsObject::new(owner, proto)))
}

/// Create a new empty array. `length` starts at 0 as a writable,
/// non-enumerable, non-configurable data property.
pub fn new_array(owner: Option<OwnerId>, proto: Option<JsObjectRef>) -> JsObjectRef {
    let mut obj = JsObject::new(owner, proto);
    obj.class = ObjectClass::Array;
    obj.properties.insert(
        "length".into(),
        Property::with_attributes(JsValue::Number(0.0), true, false, false),
    );
    Rc::new(RefCell::new(obj))
}

/// Create a native function object. Its `length` reflects the declared
/// arity and is not writable, enumerable or configurable.
pub fn new_function(
    native: NativeFunction,
    owner: Option<OwnerId>,
    proto: Option<JsObjectRef>,
) -> JsObjectRef {
    let mut obj = JsObject::new(owner, proto);
    obj.properties.insert(
        "length".into(),
        Property::with_attributes(JsValue::Number(native.arity as f64), false, false, false),
    );
    obj.class = ObjectClass::Function(native);
    Rc::new(RefCell::new(obj))
}
