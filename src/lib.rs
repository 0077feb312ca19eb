//! ES5 interpreter core: values, objects and the Object built-ins
//!
//! This crate is the value and object model a full interpreter is built
//! on: the six-variant value domain with its coercion rules, heap objects
//! with prototype chains and ES5 property descriptors, and the native
//! implementations behind `Object` and `Object.prototype`. The parser,
//! evaluator and host integration are separate subsystems that consume
//! this API.
//!
//! # Example
//!
//! ```
//! use jscore::{Interpreter, JsValue};
//!
//! let mut interp = Interpreter::new();
//! let obj = JsValue::Object(interp.create_object(None));
//! interp.set_property(&obj, "answer", JsValue::Number(42.0)).unwrap();
//! assert_eq!(
//!     interp.get_property(&obj, "answer").unwrap(),
//!     JsValue::Number(42.0)
//! );
//! ```

pub mod error;
pub mod interpreter;
pub mod object;
pub mod property;
pub mod string_dict;
pub mod value;

pub use error::JsError;
pub use interpreter::registry::{NativeImpl, Registry};
pub use interpreter::{Interpreter, Protos, ToPrimitiveHint};
pub use object::{
    new_array, new_function, new_object, JsObject, JsObjectRef, NativeFn, NativeFunction,
    ObjectClass,
};
pub use property::{Property, PropertyDescriptor, PropertyKind};
pub use string_dict::StringDict;
pub use value::{JsString, JsValue, OwnerId};
