//! Object built-in methods
//!
//! The Object constructor and the native methods on it and on
//! Object.prototype. Every function here follows the uniform calling
//! convention and returns any thrown completion unchanged to its caller.

use crate::error::JsError;
use crate::interpreter::registry::NativeImpl;
use crate::interpreter::Interpreter;
use crate::object::{new_object, NativeFunction};
use crate::property::{from_property_descriptor, to_property_descriptor, PropertyDescriptor, PropertyKind};
use crate::value::{JsString, JsValue};

/// Native implementations registered at startup, keyed by their
/// user-visible dotted tag. The Object constructor itself is bound
/// separately by [`init`], which also wires `Object.prototype` and
/// `Object.prototype.constructor`.
// TODO(es5): the rest of the 15.2.3 statics (seal, freeze,
// preventExtensions, isSealed, isFrozen, isExtensible, keys) once
// extensibility semantics are settled.
pub const NATIVE_IMPLS: &[NativeImpl] = &[
    NativeImpl {
        tag: "Object.getPrototypeOf",
        func: object_get_prototype_of,
        arity: 1,
    },
    NativeImpl {
        tag: "Object.getOwnPropertyDescriptor",
        func: object_get_own_property_descriptor,
        arity: 2,
    },
    NativeImpl {
        tag: "Object.getOwnPropertyNames",
        func: object_get_own_property_names,
        arity: 1,
    },
    NativeImpl {
        tag: "Object.create",
        func: object_create,
        arity: 2,
    },
    NativeImpl {
        tag: "Object.defineProperty",
        func: object_define_property,
        arity: 3,
    },
    NativeImpl {
        tag: "Object.defineProperties",
        func: object_define_properties,
        arity: 2,
    },
    NativeImpl {
        tag: "Object.prototype.toString",
        func: object_prototype_to_string,
        arity: 0,
    },
    NativeImpl {
        tag: "Object.prototype.hasOwnProperty",
        func: object_prototype_has_own_property,
        arity: 1,
    },
    NativeImpl {
        tag: "Object.prototype.valueOf",
        func: object_prototype_value_of,
        arity: 0,
    },
];

/// Bind the Object constructor on the global object and wire it to
/// ObjectProto. Runs before the dotted tags are bound, so the
/// "Object.xxx" paths resolve.
pub(crate) fn init(interp: &mut Interpreter) {
    let object = interp.create_function(
        NativeFunction {
            name: "Object",
            func: object_constructor,
            arity: 1,
        },
        None,
    );
    let global = interp.global.clone();
    let object_proto = interp.protos.object_proto.clone();
    interp.define_builtin(&global, "Object", JsValue::Object(object.clone()), true, false, true);
    interp.define_builtin(
        &object,
        "prototype",
        JsValue::Object(object_proto.clone()),
        false,
        false,
        false,
    );
    interp.define_builtin(
        &object_proto,
        "constructor",
        JsValue::Object(object),
        true,
        false,
        true,
    );
}

/// Object(value) - conversion function: undefined and null give a fresh
/// object, objects pass through, primitives are boxed.
pub fn object_constructor(
    interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let value = args.first().cloned().unwrap_or(JsValue::Undefined);
    match value {
        JsValue::Undefined | JsValue::Null => Ok(JsValue::Object(interp.create_object(None))),
        JsValue::Object(_) => Ok(value),
        _ => Ok(JsValue::Object(interp.to_object(&value, None)?)),
    }
}

pub fn object_get_prototype_of(
    _interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let arg = args.first().cloned().unwrap_or(JsValue::Undefined);
    let JsValue::Object(obj) = arg else {
        return Err(JsError::type_error(format!(
            "Cannot get prototype of {}",
            arg.to_js_string()
        )));
    };
    let proto = obj.borrow().proto.clone();
    Ok(match proto {
        Some(p) => JsValue::Object(p),
        None => JsValue::Null,
    })
}

pub fn object_get_own_property_descriptor(
    interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let arg = args.first().cloned().unwrap_or(JsValue::Undefined);
    let JsValue::Object(obj) = arg else {
        return Err(JsError::type_error(format!(
            "Cannot get property descriptor from {}",
            arg.to_js_string()
        )));
    };
    let key_arg = args.get(1).cloned().unwrap_or(JsValue::Undefined);
    let key = interp.to_string(&key_arg)?;
    let prop = obj.borrow().get_own_property(key.as_str()).cloned();
    match prop {
        Some(prop) => {
            let object_proto = interp.protos.object_proto.clone();
            Ok(JsValue::Object(from_property_descriptor(
                &prop,
                None,
                &object_proto,
            )))
        }
        None => Ok(JsValue::Undefined),
    }
}

pub fn object_get_own_property_names(
    interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let arg = args.first().cloned().unwrap_or(JsValue::Undefined);
    let JsValue::Object(obj) = arg else {
        return Err(JsError::type_error(format!(
            "Cannot get property names of {}",
            arg.to_js_string()
        )));
    };
    let names: Vec<JsValue> = obj
        .borrow()
        .own_property_keys()
        .into_iter()
        .map(JsValue::String)
        .collect();
    Ok(JsValue::Object(interp.create_array(None, names)))
}

pub fn object_create(
    interp: &mut Interpreter,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let proto_arg = args.first().cloned().unwrap_or(JsValue::Undefined);
    let obj = match &proto_arg {
        JsValue::Null => new_object(None, None),
        JsValue::Object(proto) => new_object(None, Some(proto.clone())),
        _ => {
            return Err(JsError::type_error(
                "Object prototype may only be an Object or null",
            ))
        }
    };
    if let Some(props) = args.get(1) {
        if !matches!(props, JsValue::Undefined) {
            object_define_properties(
                interp,
                this,
                &[JsValue::Object(obj.clone()), props.clone()],
            )?;
        }
    }
    Ok(JsValue::Object(obj))
}

pub fn object_define_property(
    interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let arg = args.first().cloned().unwrap_or(JsValue::Undefined);
    let JsValue::Object(obj) = arg else {
        return Err(JsError::type_error(format!(
            "Cannot define property on {}",
            arg.to_js_string()
        )));
    };
    let key_arg = args.get(1).cloned().unwrap_or(JsValue::Undefined);
    let key = interp.to_string(&key_arg)?;
    let desc_arg = args.get(2).cloned().unwrap_or(JsValue::Undefined);
    let JsValue::Object(desc_obj) = desc_arg else {
        return Err(JsError::type_error("Property descriptor must be an object"));
    };
    let desc = to_property_descriptor(interp, &desc_obj)?;
    obj.borrow_mut().define_own_property(key, desc)?;
    Ok(JsValue::Object(obj))
}

pub fn object_define_properties(
    interp: &mut Interpreter,
    _this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let arg = args.first().cloned().unwrap_or(JsValue::Undefined);
    let JsValue::Object(obj) = arg else {
        return Err(JsError::type_error(format!(
            "Cannot define property on {}",
            arg.to_js_string()
        )));
    };
    let props_arg = args.get(1).cloned().unwrap_or(JsValue::Undefined);
    let props = interp.to_object(&props_arg, None)?;

    // First pass: convert every enumerable own property to a descriptor.
    let mut pending: Vec<(JsString, PropertyDescriptor)> = Vec::new();
    for key in props.borrow().own_property_keys() {
        let Some(prop) = props.borrow().get_own_property(key.as_str()).cloned() else {
            continue;
        };
        if !prop.enumerable {
            continue;
        }
        let desc_value = match &prop.kind {
            PropertyKind::Data { value, .. } => value.clone(),
            PropertyKind::Accessor { get: Some(g), .. } => {
                interp.call_object(g, JsValue::Object(props.clone()), &[])?
            }
            PropertyKind::Accessor { get: None, .. } => JsValue::Undefined,
        };
        let JsValue::Object(desc_obj) = desc_value else {
            return Err(JsError::type_error("Property descriptor must be an object"));
        };
        pending.push((key, to_property_descriptor(interp, &desc_obj)?));
    }

    // Second pass: apply. A malformed descriptor fails in the first pass,
    // so either every property is defined or none are.
    for (key, desc) in pending {
        obj.borrow_mut().define_own_property(key, desc)?;
    }
    Ok(JsValue::Object(obj))
}

/// Object.prototype.toString(): the "[object Class]" tag (ES5 15.2.4.2).
pub fn object_prototype_to_string(
    _interp: &mut Interpreter,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    let class = match &this {
        JsValue::Undefined => "Undefined",
        JsValue::Null => "Null",
        JsValue::Boolean(_) => "Boolean",
        JsValue::Number(_) => "Number",
        JsValue::String(_) => "String",
        JsValue::Object(obj) => obj.borrow().class_name(),
    };
    Ok(JsValue::from(format!("[object {}]", class)))
}

pub fn object_prototype_has_own_property(
    interp: &mut Interpreter,
    this: JsValue,
    args: &[JsValue],
) -> Result<JsValue, JsError> {
    let key_arg = args.first().cloned().unwrap_or(JsValue::Undefined);
    let key = interp.to_string(&key_arg)?;
    // ToObject throws for undefined and null receivers.
    let obj = interp.to_object(&this, None)?;
    let has = obj.borrow().has_own_property(key.as_str());
    Ok(JsValue::Boolean(has))
}

pub fn object_prototype_value_of(
    interp: &mut Interpreter,
    this: JsValue,
    _args: &[JsValue],
) -> Result<JsValue, JsError> {
    interp.to_object(&this, None).map(JsValue::Object)
}
