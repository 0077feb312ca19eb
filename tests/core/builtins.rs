//! Object builtin tests, end to end through the bound function objects

use jscore::{Interpreter, JsError, JsValue, NativeFunction, ObjectClass};

use super::{call_builtin, global_get, make_obj};

fn noop(_: &mut Interpreter, _: JsValue, _: &[JsValue]) -> Result<JsValue, JsError> {
    Ok(JsValue::Undefined)
}

#[test]
fn test_get_prototype_of_created_null_is_null() {
    let mut interp = Interpreter::new();
    let bare = call_builtin(
        &mut interp,
        "Object.create",
        JsValue::Undefined,
        &[JsValue::Null],
    )
    .unwrap();
    let proto = call_builtin(
        &mut interp,
        "Object.getPrototypeOf",
        JsValue::Undefined,
        &[bare],
    )
    .unwrap();
    assert_eq!(proto, JsValue::Null);
}

#[test]
fn test_get_prototype_of_primitive_throws() {
    let mut interp = Interpreter::new();
    let err = call_builtin(
        &mut interp,
        "Object.getPrototypeOf",
        JsValue::Undefined,
        &[JsValue::Number(42.0)],
    )
    .unwrap_err();
    assert_eq!(err.message(), "Cannot get prototype of 42");
}

#[test]
fn test_get_prototype_of_plain_object() {
    let mut interp = Interpreter::new();
    let obj = make_obj(&mut interp, &[]);
    let proto = call_builtin(
        &mut interp,
        "Object.getPrototypeOf",
        JsValue::Undefined,
        &[obj],
    )
    .unwrap();
    let object_proto = JsValue::Object(interp.protos.object_proto.clone());
    assert_eq!(proto, object_proto);
}

#[test]
fn test_create_with_object_prototype() {
    let mut interp = Interpreter::new();
    let proto = make_obj(&mut interp, &[("x", JsValue::Number(1.0))]);
    let child = call_builtin(
        &mut interp,
        "Object.create",
        JsValue::Undefined,
        &[proto.clone()],
    )
    .unwrap();
    // inherits through the chain
    assert_eq!(interp.get_property(&child, "x").unwrap(), JsValue::Number(1.0));
    let back = call_builtin(
        &mut interp,
        "Object.getPrototypeOf",
        JsValue::Undefined,
        &[child],
    )
    .unwrap();
    assert_eq!(back, proto);
}

#[test]
fn test_create_rejects_primitive_prototype() {
    let mut interp = Interpreter::new();
    let err = call_builtin(
        &mut interp,
        "Object.create",
        JsValue::Undefined,
        &[JsValue::from("hello")],
    )
    .unwrap_err();
    assert_eq!(
        err.message(),
        "Object prototype may only be an Object or null"
    );
}

#[test]
fn test_create_applies_properties() {
    let mut interp = Interpreter::new();
    let a_desc = make_obj(
        &mut interp,
        &[
            ("value", JsValue::Number(1.0)),
            ("enumerable", JsValue::Boolean(true)),
        ],
    );
    let props = make_obj(&mut interp, &[("a", a_desc)]);
    let obj = call_builtin(
        &mut interp,
        "Object.create",
        JsValue::Undefined,
        &[JsValue::Null, props],
    )
    .unwrap();
    assert_eq!(interp.get_property(&obj, "a").unwrap(), JsValue::Number(1.0));
}

#[test]
fn test_define_properties_two_phase_atomicity() {
    let mut interp = Interpreter::new();
    let getter = interp.create_function(
        NativeFunction {
            name: "get b",
            func: noop,
            arity: 0,
        },
        None,
    );
    let target = make_obj(&mut interp, &[]);
    let a_desc = make_obj(
        &mut interp,
        &[
            ("value", JsValue::Number(1.0)),
            ("enumerable", JsValue::Boolean(true)),
        ],
    );
    // "b" mixes a value with a getter: malformed.
    let b_desc = make_obj(
        &mut interp,
        &[
            ("value", JsValue::Number(2.0)),
            ("get", JsValue::Object(getter)),
        ],
    );
    let props = make_obj(&mut interp, &[("a", a_desc), ("b", b_desc)]);
    let err = call_builtin(
        &mut interp,
        "Object.defineProperties",
        JsValue::Undefined,
        &[target.clone(), props],
    )
    .unwrap_err();
    assert_eq!(err.name(), "TypeError");
    // The malformed "b" descriptor failed in the conversion pass, so "a"
    // was never applied either: the target is untouched.
    assert!(interp.own_property_keys(&target).is_empty());
}

#[test]
fn test_define_properties_applies_all() {
    let mut interp = Interpreter::new();
    let target = make_obj(&mut interp, &[]);
    let a_desc = make_obj(&mut interp, &[("value", JsValue::Number(1.0))]);
    let b_desc = make_obj(&mut interp, &[("value", JsValue::Number(2.0))]);
    let props = make_obj(&mut interp, &[("a", a_desc), ("b", b_desc)]);
    call_builtin(
        &mut interp,
        "Object.defineProperties",
        JsValue::Undefined,
        &[target.clone(), props],
    )
    .unwrap();
    assert_eq!(interp.get_property(&target, "a").unwrap(), JsValue::Number(1.0));
    assert_eq!(interp.get_property(&target, "b").unwrap(), JsValue::Number(2.0));
}

#[test]
fn test_define_properties_skips_non_enumerable() {
    let mut interp = Interpreter::new();
    let target = make_obj(&mut interp, &[]);
    let hidden_desc = make_obj(&mut interp, &[("value", JsValue::Number(1.0))]);
    let props = make_obj(&mut interp, &[]);
    // Define "hidden" on the props object as non-enumerable; it must be
    // ignored by defineProperties.
    let non_enum = make_obj(
        &mut interp,
        &[
            ("value", hidden_desc),
            ("enumerable", JsValue::Boolean(false)),
        ],
    );
    call_builtin(
        &mut interp,
        "Object.defineProperty",
        JsValue::Undefined,
        &[props.clone(), JsValue::from("hidden"), non_enum],
    )
    .unwrap();
    call_builtin(
        &mut interp,
        "Object.defineProperties",
        JsValue::Undefined,
        &[target.clone(), props],
    )
    .unwrap();
    assert!(interp.own_property_keys(&target).is_empty());
}

#[test]
fn test_get_own_property_names_returns_array() {
    let mut interp = Interpreter::new();
    let obj = make_obj(
        &mut interp,
        &[("x", JsValue::Number(1.0)), ("y", JsValue::Number(2.0))],
    );
    let names = call_builtin(
        &mut interp,
        "Object.getOwnPropertyNames",
        JsValue::Undefined,
        &[obj],
    )
    .unwrap();
    let arr = names.as_object().unwrap().clone();
    assert!(matches!(arr.borrow().class, ObjectClass::Array));
    assert_eq!(
        interp.get_property(&names, "length").unwrap(),
        JsValue::Number(2.0)
    );
    assert_eq!(interp.get_property(&names, "0").unwrap(), JsValue::from("x"));
    assert_eq!(interp.get_property(&names, "1").unwrap(), JsValue::from("y"));
}

#[test]
fn test_object_prototype_to_string_class_tags() {
    let mut interp = Interpreter::new();
    let cases: Vec<(JsValue, &str)> = vec![
        (JsValue::Undefined, "[object Undefined]"),
        (JsValue::Null, "[object Null]"),
        (JsValue::Boolean(true), "[object Boolean]"),
        (JsValue::Number(42.0), "[object Number]"),
        (JsValue::from("s"), "[object String]"),
        (JsValue::Object(interp.create_object(None)), "[object Object]"),
        (
            JsValue::Object(interp.create_array(None, vec![])),
            "[object Array]",
        ),
        (global_get(&mut interp, "Object"), "[object Function]"),
    ];
    for (this, expected) in cases {
        let out = call_builtin(&mut interp, "Object.prototype.toString", this, &[]).unwrap();
        assert_eq!(out, JsValue::from(expected));
    }
}

#[test]
fn test_has_own_property_builtin() {
    let mut interp = Interpreter::new();
    let obj = make_obj(&mut interp, &[("a", JsValue::Number(1.0))]);
    let yes = call_builtin(
        &mut interp,
        "Object.prototype.hasOwnProperty",
        obj.clone(),
        &[JsValue::from("a")],
    )
    .unwrap();
    assert_eq!(yes, JsValue::Boolean(true));
    let no = call_builtin(
        &mut interp,
        "Object.prototype.hasOwnProperty",
        obj.clone(),
        &[JsValue::from("b")],
    )
    .unwrap();
    assert_eq!(no, JsValue::Boolean(false));
    // inherited properties do not count
    let inherited = call_builtin(
        &mut interp,
        "Object.prototype.hasOwnProperty",
        obj,
        &[JsValue::from("hasOwnProperty")],
    )
    .unwrap();
    assert_eq!(inherited, JsValue::Boolean(false));
}

#[test]
fn test_has_own_property_on_nullish_receiver_throws() {
    let mut interp = Interpreter::new();
    let err = call_builtin(
        &mut interp,
        "Object.prototype.hasOwnProperty",
        JsValue::Undefined,
        &[JsValue::from("x")],
    )
    .unwrap_err();
    assert_eq!(err.message(), "Cannot convert undefined to object");
    let err = call_builtin(
        &mut interp,
        "Object.prototype.hasOwnProperty",
        JsValue::Null,
        &[JsValue::from("x")],
    )
    .unwrap_err();
    assert_eq!(err.message(), "Cannot convert null to object");
}

#[test]
fn test_value_of_boxes_primitives() {
    let mut interp = Interpreter::new();
    let out = call_builtin(
        &mut interp,
        "Object.prototype.valueOf",
        JsValue::Number(5.0),
        &[],
    )
    .unwrap();
    let obj = out.as_object().unwrap();
    assert_eq!(obj.borrow().primitive_value(), Some(JsValue::Number(5.0)));

    // an object receiver comes back unchanged
    let plain = make_obj(&mut interp, &[]);
    let out = call_builtin(&mut interp, "Object.prototype.valueOf", plain.clone(), &[]).unwrap();
    assert_eq!(out, plain);
}

#[test]
fn test_object_as_conversion_function() {
    let mut interp = Interpreter::new();
    // Object() and Object(null) make a fresh object
    let fresh = call_builtin(&mut interp, "Object", JsValue::Undefined, &[]).unwrap();
    assert_eq!(fresh.type_of(), "object");
    // Object(obj) returns the argument
    let obj = make_obj(&mut interp, &[]);
    let same = call_builtin(&mut interp, "Object", JsValue::Undefined, &[obj.clone()]).unwrap();
    assert_eq!(same, obj);
    // Object(primitive) boxes
    let boxed = call_builtin(
        &mut interp,
        "Object",
        JsValue::Undefined,
        &[JsValue::Boolean(true)],
    )
    .unwrap();
    assert_eq!(
        boxed.as_object().unwrap().borrow().primitive_value(),
        Some(JsValue::Boolean(true))
    );
}

#[test]
fn test_registry_surface() {
    let interp = Interpreter::new();
    let registry = interp.registry();
    assert!(!registry.is_empty());
    assert!(registry.get("Object.create").is_some());
    assert_eq!(registry.get("Object.defineProperty").unwrap().arity, 3);
    assert!(registry.get("Object.seal").is_none());
    // every registered tag resolves to a callable on the global
    let mut interp = Interpreter::new();
    let tags: Vec<&str> = interp.registry().iter().map(|ni| ni.tag).collect();
    for tag in tags {
        if tag.contains('.') {
            let func = global_get(&mut interp, tag);
            assert!(func.is_callable(), "{} is not bound", tag);
        }
    }
}
