//! Property descriptor model
//!
//! Two shapes live here. [`Property`] is the stored form: attributes are
//! concrete and the data/accessor split is encoded in [`PropertyKind`], so
//! a property can never be both. [`PropertyDescriptor`] is the partial form
//! used for definition and redefinition: every field is optional, and an
//! absent field means "keep the current value when redefining, use the
//! default when creating".

use crate::error::JsError;
use crate::interpreter::Interpreter;
use crate::object::{new_object, JsObjectRef};
use crate::value::{JsValue, OwnerId};

/// A property as stored in an object's table.
#[derive(Debug, Clone)]
pub struct Property {
    pub enumerable: bool,
    pub configurable: bool,
    pub kind: PropertyKind,
}

/// The two property shapes: data (value + writable) or accessor (get + set).
#[derive(Debug, Clone)]
pub enum PropertyKind {
    Data { value: JsValue, writable: bool },
    Accessor {
        get: Option<JsObjectRef>,
        set: Option<JsObjectRef>,
    },
}

impl Property {
    /// A plain data property: writable, enumerable, configurable.
    pub fn data(value: JsValue) -> Self {
        Self {
            enumerable: true,
            configurable: true,
            kind: PropertyKind::Data {
                value,
                writable: true,
            },
        }
    }

    /// A data property with explicit attributes.
    pub fn with_attributes(
        value: JsValue,
        writable: bool,
        enumerable: bool,
        configurable: bool,
    ) -> Self {
        Self {
            enumerable,
            configurable,
            kind: PropertyKind::Data { value, writable },
        }
    }

    /// An accessor property: enumerable and configurable by default.
    pub fn accessor(get: Option<JsObjectRef>, set: Option<JsObjectRef>) -> Self {
        Self {
            enumerable: true,
            configurable: true,
            kind: PropertyKind::Accessor { get, set },
        }
    }

    pub fn is_data(&self) -> bool {
        matches!(self.kind, PropertyKind::Data { .. })
    }

    pub fn is_accessor(&self) -> bool {
        matches!(self.kind, PropertyKind::Accessor { .. })
    }

    /// The stored value of a data property.
    pub fn value(&self) -> Option<&JsValue> {
        match &self.kind {
            PropertyKind::Data { value, .. } => Some(value),
            PropertyKind::Accessor { .. } => None,
        }
    }

    pub fn writable(&self) -> bool {
        matches!(self.kind, PropertyKind::Data { writable: true, .. })
    }
}

/// A partial descriptor: the user-visible `{value, writable, get, set,
/// enumerable, configurable}` record with three-valued field presence.
///
/// `get` and `set` hold values, not object references, because "present and
/// undefined" (clears the accessor) is distinct from "absent" (keeps it).
#[derive(Debug, Clone, Default)]
pub struct PropertyDescriptor {
    pub value: Option<JsValue>,
    pub writable: Option<bool>,
    pub get: Option<JsValue>,
    pub set: Option<JsValue>,
    pub enumerable: Option<bool>,
    pub configurable: Option<bool>,
}

impl PropertyDescriptor {
    /// A descriptor carrying only a value, as produced by assignment.
    pub fn from_value(value: JsValue) -> Self {
        Self {
            value: Some(value),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_none()
            && self.writable.is_none()
            && self.get.is_none()
            && self.set.is_none()
            && self.enumerable.is_none()
            && self.configurable.is_none()
    }

    pub fn is_data_descriptor(&self) -> bool {
        self.value.is_some() || self.writable.is_some()
    }

    pub fn is_accessor_descriptor(&self) -> bool {
        self.get.is_some() || self.set.is_some()
    }

    /// Neither data nor accessor: only attribute changes.
    pub fn is_generic(&self) -> bool {
        !self.is_data_descriptor() && !self.is_accessor_descriptor()
    }
}

/// Read a user-supplied descriptor object into a [`PropertyDescriptor`]
/// (ES5 8.10.5). Only own properties of `desc_obj` are consulted. Mixing
/// data fields with accessor fields is a TypeError, as is a getter or
/// setter that is neither callable nor undefined.
pub fn to_property_descriptor(
    interp: &mut Interpreter,
    desc_obj: &JsObjectRef,
) -> Result<PropertyDescriptor, JsError> {
    let mut desc = PropertyDescriptor::default();

    if let Some(v) = read_own_field(interp, desc_obj, "enumerable")? {
        desc.enumerable = Some(v.to_boolean());
    }
    if let Some(v) = read_own_field(interp, desc_obj, "configurable")? {
        desc.configurable = Some(v.to_boolean());
    }
    if let Some(v) = read_own_field(interp, desc_obj, "value")? {
        desc.value = Some(v);
    }
    if let Some(v) = read_own_field(interp, desc_obj, "writable")? {
        desc.writable = Some(v.to_boolean());
    }
    if let Some(v) = read_own_field(interp, desc_obj, "get")? {
        if !v.is_callable() && !matches!(v, JsValue::Undefined) {
            return Err(JsError::type_error(format!(
                "Getter must be a function: {}",
                v.to_js_string()
            )));
        }
        desc.get = Some(v);
    }
    if let Some(v) = read_own_field(interp, desc_obj, "set")? {
        if !v.is_callable() && !matches!(v, JsValue::Undefined) {
            return Err(JsError::type_error(format!(
                "Setter must be a function: {}",
                v.to_js_string()
            )));
        }
        desc.set = Some(v);
    }

    if desc.is_data_descriptor() && desc.is_accessor_descriptor() {
        return Err(JsError::type_error(
            "Invalid property descriptor. Cannot both specify accessors and a value or writable attribute",
        ));
    }
    Ok(desc)
}

fn read_own_field(
    interp: &mut Interpreter,
    obj: &JsObjectRef,
    key: &str,
) -> Result<Option<JsValue>, JsError> {
    if !obj.borrow().has_own_property(key) {
        return Ok(None);
    }
    // The own property may itself be an accessor, so read through the
    // interpreter to run its getter.
    interp
        .get_object_property(obj, key, JsValue::Object(obj.clone()))
        .map(Some)
}

/// Build the user-visible descriptor object for a stored property
/// (ES5 8.10.4): a fresh plain object with `value`/`writable` or
/// `get`/`set` plus `enumerable`/`configurable`, each of the four created
/// writable, enumerable and configurable.
pub fn from_property_descriptor(
    prop: &Property,
    owner: Option<OwnerId>,
    object_proto: &JsObjectRef,
) -> JsObjectRef {
    let obj = new_object(owner, Some(object_proto.clone()));
    {
        let mut o = obj.borrow_mut();
        match &prop.kind {
            PropertyKind::Data { value, writable } => {
                o.properties
                    .insert("value".into(), Property::data(value.clone()));
                o.properties
                    .insert("writable".into(), Property::data(JsValue::Boolean(*writable)));
            }
            PropertyKind::Accessor { get, set } => {
                let as_value = |f: &Option<JsObjectRef>| match f {
                    Some(f) => JsValue::Object(f.clone()),
                    None => JsValue::Undefined,
                };
                o.properties.insert("get".into(), Property::data(as_value(get)));
                o.properties.insert("set".into(), Property::data(as_value(set)));
            }
        }
        o.properties.insert(
            "enumerable".into(),
            Property::data(JsValue::Boolean(prop.enumerable)),
        );
        o.properties.insert(
            "configurable".into(),
            Property::data(JsValue::Boolean(prop.configurable)),
        );
    }
    obj
}
