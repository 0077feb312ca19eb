//! The interpreter core
//!
//! Owns the prototype roots, the global object, the builtin registry and
//! the string dictionary, and implements every operation that may run
//! user-visible code: chain-walking property access (accessors), the
//! object side of the coercions (ToPrimitive, ToObject), and the native
//! call convention.

// Builtin function implementations
pub mod builtins;

// Builtin registry
pub mod registry;

use crate::error::JsError;
use crate::object::{
    array_index, new_array, new_function, new_object, JsObjectRef, NativeFunction, ObjectClass,
};
use crate::property::{Property, PropertyDescriptor, PropertyKind};
use crate::string_dict::StringDict;
use crate::value::{JsString, JsValue, OwnerId};

use self::registry::{NativeImpl, Registry};

/// The prototype roots. Process-wide singletons: created once during
/// startup, never replaced, though user code may mutate their property
/// tables.
pub struct Protos {
    pub object_proto: JsObjectRef,
    pub boolean_proto: JsObjectRef,
    pub number_proto: JsObjectRef,
    pub string_proto: JsObjectRef,
    pub array_proto: JsObjectRef,
    pub function_proto: JsObjectRef,
}

/// Hint for ToPrimitive: which conversion method to try first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToPrimitiveHint {
    Default,
    Number,
    String,
}

/// The interpreter state
pub struct Interpreter {
    /// Prototype roots, initialized before anything else.
    pub protos: Protos,

    /// Global object. Builtins are bound here by dotted path.
    pub global: JsObjectRef,

    /// Builtin registry: write-once at startup, read-only after.
    registry: Registry,

    /// String dictionary for interning property keys.
    pub string_dict: StringDict,
}

impl Interpreter {
    /// Create an interpreter with the prototype roots wired and every
    /// registered builtin bound at its global path.
    ///
    /// Order matters: ObjectProto must exist before the other roots (they
    /// inherit from it), and the registry must be fully populated before
    /// binding so the dotted paths resolve.
    pub fn new() -> Self {
        let object_proto = new_object(None, None);
        let boolean_proto = new_object(None, Some(object_proto.clone()));
        let number_proto = new_object(None, Some(object_proto.clone()));
        let string_proto = new_object(None, Some(object_proto.clone()));
        let array_proto = new_object(None, Some(object_proto.clone()));
        let function_proto = new_object(None, Some(object_proto.clone()));
        let global = new_object(None, Some(object_proto.clone()));

        let mut interp = Self {
            protos: Protos {
                object_proto,
                boolean_proto,
                number_proto,
                string_proto,
                array_proto,
                function_proto,
            },
            global,
            registry: Registry::new(),
            string_dict: StringDict::with_common_strings(),
        };
        builtins::register_all(&mut interp.registry);
        builtins::init_roots(&mut interp);
        interp.bind_registered();
        interp
    }

    /// The builtin registry (read-only).
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Intern a string through the dictionary.
    pub fn intern(&mut self, s: &str) -> JsString {
        self.string_dict.get_or_insert(s)
    }

    // ═══════════════════════════════════════════════════════════════════
    // Startup binding
    // ═══════════════════════════════════════════════════════════════════

    fn bind_registered(&mut self) {
        let impls: Vec<NativeImpl> = self.registry.iter().copied().collect();
        for ni in &impls {
            // Root objects ("Object") are bound by their module's init.
            if ni.tag.contains('.') {
                self.bind_native(ni);
            }
        }
    }

    /// Bind one registered implementation at its dotted global path. A
    /// missing path segment is a startup-order bug and aborts.
    fn bind_native(&mut self, ni: &NativeImpl) {
        let mut segments: Vec<&str> = ni.tag.split('.').collect();
        let name = match segments.pop() {
            Some(name) if !segments.is_empty() => name,
            _ => panic!("builtin tag {:?} is not a dotted path", ni.tag),
        };
        let mut target = self.global.clone();
        for seg in &segments {
            let next = target
                .borrow()
                .get_own_property(seg)
                .and_then(|p| p.value().cloned());
            match next {
                Some(JsValue::Object(obj)) => target = obj,
                _ => panic!("builtin tag {:?}: no object bound at {:?}", ni.tag, seg),
            }
        }
        let func = self.create_function(
            NativeFunction {
                name: ni.tag,
                func: ni.func,
                arity: ni.arity,
            },
            None,
        );
        self.define_builtin(&target, name, JsValue::Object(func), true, false, true);
    }

    /// Install a builtin-owned property directly, bypassing the define
    /// checks (the targets are always fresh, extensible objects).
    pub(crate) fn define_builtin(
        &mut self,
        obj: &JsObjectRef,
        name: &str,
        value: JsValue,
        writable: bool,
        enumerable: bool,
        configurable: bool,
    ) {
        let key = self.intern(name);
        obj.borrow_mut().properties.insert(
            key,
            Property::with_attributes(value, writable, enumerable, configurable),
        );
    }

    // ═══════════════════════════════════════════════════════════════════
    // Object factories
    // ═══════════════════════════════════════════════════════════════════

    /// Create a plain object inheriting from ObjectProto.
    pub fn create_object(&self, owner: Option<OwnerId>) -> JsObjectRef {
        new_object(owner, Some(self.protos.object_proto.clone()))
    }

    /// Create an array from elements, inheriting from ArrayProto.
    pub fn create_array(&self, owner: Option<OwnerId>, elements: Vec<JsValue>) -> JsObjectRef {
        let arr = new_array(owner, Some(self.protos.array_proto.clone()));
        {
            let mut a = arr.borrow_mut();
            let len = elements.len();
            for (i, element) in elements.into_iter().enumerate() {
                a.properties
                    .insert(JsString::from(i.to_string()), Property::data(element));
            }
            if let Some(prop) = a.properties.get_mut("length") {
                if let PropertyKind::Data { value, .. } = &mut prop.kind {
                    *value = JsValue::Number(len as f64);
                }
            }
        }
        arr
    }

    /// Create a native function object inheriting from FunctionProto. Its
    /// `length` property reflects the declared arity.
    pub fn create_function(&self, native: NativeFunction, owner: Option<OwnerId>) -> JsObjectRef {
        new_function(native, owner, Some(self.protos.function_proto.clone()))
    }

    // ═══════════════════════════════════════════════════════════════════
    // Coercions that may run user-visible code
    // ═══════════════════════════════════════════════════════════════════

    /// ToObject: box primitives, pass objects through, throw for
    /// undefined and null.
    pub fn to_object(
        &mut self,
        value: &JsValue,
        owner: Option<OwnerId>,
    ) -> Result<JsObjectRef, JsError> {
        match value {
            JsValue::Undefined => Err(JsError::type_error("Cannot convert undefined to object")),
            JsValue::Null => Err(JsError::type_error("Cannot convert null to object")),
            JsValue::Boolean(b) => {
                let proto = self.protos.boolean_proto.clone();
                Ok(wrap(ObjectClass::Boolean(*b), owner, proto))
            }
            JsValue::Number(n) => {
                let proto = self.protos.number_proto.clone();
                Ok(wrap(ObjectClass::Number(*n), owner, proto))
            }
            JsValue::String(s) => {
                let proto = self.protos.string_proto.clone();
                let obj = wrap(ObjectClass::String(s.clone()), owner, proto);
                let key = self.intern("length");
                obj.borrow_mut().properties.insert(
                    key,
                    Property::with_attributes(
                        JsValue::Number(s.utf16_len() as f64),
                        false,
                        false,
                        false,
                    ),
                );
                Ok(obj)
            }
            JsValue::Object(obj) => Ok(obj.clone()),
        }
    }

    /// ToPrimitive. Primitives return themselves. Objects try `valueOf`
    /// then `toString` (reversed under the string hint), taking the first
    /// primitive result; if neither yields one the conversion throws.
    pub fn to_primitive(
        &mut self,
        value: &JsValue,
        hint: ToPrimitiveHint,
    ) -> Result<JsValue, JsError> {
        let JsValue::Object(obj) = value else {
            return Ok(value.clone());
        };
        // Wrapper objects shortcut to their boxed primitive; the per-type
        // valueOf builtins live outside this crate.
        let boxed = obj.borrow().primitive_value();
        if let Some(p) = boxed {
            return Ok(p);
        }
        let methods = match hint {
            ToPrimitiveHint::String => ["toString", "valueOf"],
            ToPrimitiveHint::Default | ToPrimitiveHint::Number => ["valueOf", "toString"],
        };
        for name in methods {
            let method = self.get_object_property(obj, name, value.clone())?;
            if method.is_callable() {
                let result = self.call(&method, value.clone(), &[])?;
                if result.is_primitive() {
                    return Ok(result);
                }
            }
        }
        Err(JsError::type_error("Cannot convert object to primitive value"))
    }

    /// ToNumber, including the object route through ToPrimitive.
    pub fn to_number(&mut self, value: &JsValue) -> Result<f64, JsError> {
        let prim = self.to_primitive(value, ToPrimitiveHint::Number)?;
        Ok(prim.to_number())
    }

    /// ToString, including the object route through ToPrimitive.
    pub fn to_string(&mut self, value: &JsValue) -> Result<JsString, JsError> {
        let prim = self.to_primitive(value, ToPrimitiveHint::String)?;
        Ok(prim.to_js_string())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Native calls
    // ═══════════════════════════════════════════════════════════════════

    /// Invoke a callable value. Non-functions throw.
    pub fn call(
        &mut self,
        callee: &JsValue,
        this: JsValue,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        match callee {
            JsValue::Object(obj) => self.call_object(obj, this, args),
            _ => Err(JsError::type_error(format!(
                "{} is not a function",
                callee.to_js_string()
            ))),
        }
    }

    /// Invoke a callable object.
    pub fn call_object(
        &mut self,
        obj: &JsObjectRef,
        this: JsValue,
        args: &[JsValue],
    ) -> Result<JsValue, JsError> {
        let func = obj.borrow().native().map(|nf| nf.func);
        match func {
            Some(func) => func(self, this, args),
            None => Err(JsError::type_error("object is not a function")),
        }
    }

    // ═══════════════════════════════════════════════════════════════════
    // Value-level property operations
    // ═══════════════════════════════════════════════════════════════════

    /// GetProperty on any value. Undefined and null throw; booleans and
    /// numbers delegate to their prototype; strings answer the magic
    /// `length` themselves and delegate the rest; objects walk the chain.
    pub fn get_property(&mut self, target: &JsValue, key: &str) -> Result<JsValue, JsError> {
        match target {
            JsValue::Undefined => Err(JsError::type_error(format!(
                "Cannot read property '{}' of undefined",
                key
            ))),
            JsValue::Null => Err(JsError::type_error(format!(
                "Cannot read property '{}' of null",
                key
            ))),
            JsValue::Boolean(_) => {
                let proto = self.protos.boolean_proto.clone();
                self.get_object_property(&proto, key, target.clone())
            }
            JsValue::Number(_) => {
                let proto = self.protos.number_proto.clone();
                self.get_object_property(&proto, key, target.clone())
            }
            JsValue::String(s) => {
                if key == "length" {
                    return Ok(JsValue::Number(s.utf16_len() as f64));
                }
                let proto = self.protos.string_proto.clone();
                self.get_object_property(&proto, key, target.clone())
            }
            JsValue::Object(obj) => {
                let obj = obj.clone();
                self.get_object_property(&obj, key, target.clone())
            }
        }
    }

    /// GetProperty starting at an object, walking the prototype chain and
    /// invoking getters against `receiver`. A missing key is Undefined.
    pub fn get_object_property(
        &mut self,
        obj: &JsObjectRef,
        key: &str,
        receiver: JsValue,
    ) -> Result<JsValue, JsError> {
        enum Found {
            Value(JsValue),
            Getter(Option<JsObjectRef>),
        }
        let mut current = Some(obj.clone());
        while let Some(o) = current {
            let found = {
                let b = o.borrow();
                b.get_own_property(key).map(|p| match &p.kind {
                    PropertyKind::Data { value, .. } => Found::Value(value.clone()),
                    PropertyKind::Accessor { get, .. } => Found::Getter(get.clone()),
                })
            };
            match found {
                Some(Found::Value(v)) => return Ok(v),
                Some(Found::Getter(Some(getter))) => {
                    return self.call_object(&getter, receiver, &[])
                }
                Some(Found::Getter(None)) => return Ok(JsValue::Undefined),
                None => {}
            }
            let next = o.borrow().proto.clone();
            current = next;
        }
        Ok(JsValue::Undefined)
    }

    /// SetProperty on any value. Undefined and null throw; the other
    /// primitives silently ignore the write; objects get the full ES5
    /// semantics.
    pub fn set_property(
        &mut self,
        target: &JsValue,
        key: &str,
        value: JsValue,
    ) -> Result<(), JsError> {
        match target {
            JsValue::Undefined => Err(JsError::type_error(format!(
                "Cannot set property '{}' of undefined",
                key
            ))),
            JsValue::Null => Err(JsError::type_error(format!(
                "Cannot set property '{}' of null",
                key
            ))),
            JsValue::Boolean(_) | JsValue::Number(_) | JsValue::String(_) => Ok(()),
            JsValue::Object(obj) => {
                let obj = obj.clone();
                self.set_object_property(&obj, key, value)
            }
        }
    }

    /// SetProperty on an object (ES5 8.12.4/8.12.5): setters anywhere on
    /// the chain win; read-only data properties, own or inherited, reject;
    /// a new own property requires the receiver to be extensible.
    pub fn set_object_property(
        &mut self,
        obj: &JsObjectRef,
        key: &str,
        value: JsValue,
    ) -> Result<(), JsError> {
        enum Slot {
            Writable,
            ReadOnly,
            Setter(Option<JsObjectRef>),
        }
        let own = {
            let b = obj.borrow();
            b.get_own_property(key).map(|p| match &p.kind {
                PropertyKind::Data { writable: true, .. } => Slot::Writable,
                PropertyKind::Data { writable: false, .. } => Slot::ReadOnly,
                PropertyKind::Accessor { set, .. } => Slot::Setter(set.clone()),
            })
        };
        match own {
            Some(Slot::Writable) => {
                let array_length = {
                    let b = obj.borrow();
                    matches!(b.class, ObjectClass::Array) && key == "length"
                };
                if array_length {
                    return obj
                        .borrow_mut()
                        .define_own_property("length".into(), PropertyDescriptor::from_value(value));
                }
                if let Some(p) = obj.borrow_mut().properties.get_mut(key) {
                    if let PropertyKind::Data { value: slot, .. } = &mut p.kind {
                        *slot = value;
                    }
                }
                Ok(())
            }
            Some(Slot::ReadOnly) => Err(JsError::type_error(format!(
                "Cannot assign to read only property '{}' of object",
                key
            ))),
            Some(Slot::Setter(Some(setter))) => {
                self.call_object(&setter, JsValue::Object(obj.clone()), &[value])?;
                Ok(())
            }
            Some(Slot::Setter(None)) => Err(JsError::type_error(format!(
                "Cannot set property {} of object which has only a getter",
                key
            ))),
            None => {
                // Consult the chain: an inherited setter or read-only data
                // property decides the outcome.
                let mut current = obj.borrow().proto.clone();
                while let Some(o) = current {
                    let slot = {
                        let b = o.borrow();
                        b.get_own_property(key).map(|p| match &p.kind {
                            PropertyKind::Data { writable: true, .. } => Slot::Writable,
                            PropertyKind::Data { writable: false, .. } => Slot::ReadOnly,
                            PropertyKind::Accessor { set, .. } => Slot::Setter(set.clone()),
                        })
                    };
                    match slot {
                        Some(Slot::Setter(Some(setter))) => {
                            self.call_object(&setter, JsValue::Object(obj.clone()), &[value])?;
                            return Ok(());
                        }
                        Some(Slot::Setter(None)) => {
                            return Err(JsError::type_error(format!(
                                "Cannot set property {} of object which has only a getter",
                                key
                            )))
                        }
                        Some(Slot::ReadOnly) => {
                            return Err(JsError::type_error(format!(
                                "Cannot assign to read only property '{}' of object",
                                key
                            )))
                        }
                        Some(Slot::Writable) => break,
                        None => {}
                    }
                    let next = o.borrow().proto.clone();
                    current = next;
                }
                if !obj.borrow().extensible {
                    return Err(JsError::type_error(format!(
                        "Cannot add property {}, object is not extensible",
                        key
                    )));
                }
                let is_array_index = {
                    let b = obj.borrow();
                    matches!(b.class, ObjectClass::Array) && array_index(key).is_some()
                };
                if is_array_index {
                    // Route through define so length gets bumped.
                    return obj.borrow_mut().define_own_property(
                        key.into(),
                        PropertyDescriptor {
                            value: Some(value),
                            writable: Some(true),
                            enumerable: Some(true),
                            configurable: Some(true),
                            ..Default::default()
                        },
                    );
                }
                let interned = self.intern(key);
                obj.borrow_mut()
                    .properties
                    .insert(interned, Property::data(value));
                Ok(())
            }
        }
    }

    /// DeleteProperty on any value. Unreachable for undefined and null
    /// (the evaluator throws before getting here), so those abort.
    pub fn delete_property(&mut self, target: &JsValue, key: &str) -> Result<(), JsError> {
        match target {
            JsValue::Undefined | JsValue::Null => {
                panic!("DeleteProperty on {}", target.to_js_string())
            }
            JsValue::Boolean(_) | JsValue::Number(_) => Ok(()),
            JsValue::String(s) => {
                if key == "length" {
                    return Err(JsError::type_error(format!(
                        "Cannot delete property 'length' of {}",
                        s
                    )));
                }
                Ok(())
            }
            JsValue::Object(obj) => obj.borrow_mut().delete_property(key),
        }
    }

    /// HasOwnProperty on any value. Undefined and null are not
    /// object-coercible and throw.
    pub fn has_own_property(&mut self, target: &JsValue, key: &str) -> Result<bool, JsError> {
        match target {
            JsValue::Undefined => Err(JsError::type_error("Cannot convert undefined to object")),
            JsValue::Null => Err(JsError::type_error("Cannot convert null to object")),
            JsValue::Boolean(_) | JsValue::Number(_) => Ok(false),
            JsValue::String(_) => Ok(key == "length"),
            JsValue::Object(obj) => Ok(obj.borrow().has_own_property(key)),
        }
    }

    /// Own property keys of any value, in insertion order. Strings own
    /// only `length`; the other primitives own nothing.
    pub fn own_property_keys(&mut self, target: &JsValue) -> Vec<JsString> {
        match target {
            JsValue::String(_) => vec![self.intern("length")],
            JsValue::Object(obj) => obj.borrow().own_property_keys(),
            _ => Vec::new(),
        }
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

fn wrap(class: ObjectClass, owner: Option<OwnerId>, proto: JsObjectRef) -> JsObjectRef {
    let obj = new_object(owner, Some(proto));
    obj.borrow_mut().class = class;
    obj
}
