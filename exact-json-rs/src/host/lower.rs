//! Validation and lowering of host values.
//!
//! [`to_value`] accepts exactly the host values that are indistinguishable
//! from what parsing their encoding would produce, and rejects everything
//! else with the first violation found:
//!
//! - `undefined`, symbols, bigints and functions have no encoding;
//! - NaN and the infinities have no exact decimal;
//! - objects must be extensible and have no symbol-keyed properties;
//! - an object with `Array.prototype` must really be an array, with no
//!   holes, no extra properties and only plain data elements;
//! - an object with `Object.prototype` must be a plain object whose
//!   properties are all plain data properties;
//! - any other prototype is rejected.
//!
//! Every check on a container runs before any of its children is visited.
//! Traversal uses an explicit stack bounded by
//! [`Limits::max_nesting_depth`], so a cyclic graph fails with
//! [`Error::NestingTooDeep`].

use std::vec;

use super::classify::is_plain_object;
use super::{Brand, HostObject, HostValue, Property, PropertyKey, Prototype};
use crate::error::{Error, Result};
use crate::json::limits::Limits;
use crate::json::stringify::stringify_with_limits as stringify_value;
use crate::json::types::{Map, Number, Value};

/// A container whose children are being lowered.
enum Pending {
    Array {
        items: Vec<Value>,
        children: vec::IntoIter<HostValue>,
    },
    Object {
        entries: Map,
        children: vec::IntoIter<(String, HostValue)>,
        key: Option<String>,
    },
}

impl Pending {
    fn next_child(&mut self) -> Option<HostValue> {
        match self {
            Pending::Array { children, .. } => children.next(),
            Pending::Object { children, key, .. } => {
                let (name, child) = children.next()?;
                *key = Some(name);
                Some(child)
            }
        }
    }

    fn accept(&mut self, value: Value) {
        match self {
            Pending::Array { items, .. } => items.push(value),
            Pending::Object { entries, key, .. } => {
                if let Some(key) = key.take() {
                    entries.insert(key, value);
                }
            }
        }
    }

    fn finish(self) -> Value {
        match self {
            Pending::Array { items, .. } => Value::Array(items),
            Pending::Object { entries, .. } => Value::Object(entries),
        }
    }
}

/// Outcome of inspecting one host value.
enum Opened {
    Leaf(Value),
    Container(Pending),
}

enum Step {
    Visit(HostValue),
    Resume(Pending),
    Return(Value),
}

/// Validate a host value and convert it with default limits.
pub fn to_value(value: &HostValue) -> Result<Value> {
    to_value_with_limits(value, Limits::default())
}

/// Validate a host value and convert it with custom limits.
pub fn to_value_with_limits(value: &HostValue, limits: Limits) -> Result<Value> {
    let max_depth = limits.max_nesting_depth;
    let mut stack: Vec<Pending> = Vec::new();
    let mut step = Step::Visit(value.clone());

    loop {
        step = match step {
            Step::Visit(host) => match open(&host)? {
                Opened::Leaf(value) => Step::Return(value),
                Opened::Container(pending) => {
                    let depth = stack.len() as u64 + 1;
                    if depth > max_depth {
                        return Err(Error::NestingTooDeep(depth, max_depth));
                    }
                    Step::Resume(pending)
                }
            },
            Step::Resume(mut pending) => match pending.next_child() {
                Some(child) => {
                    stack.push(pending);
                    Step::Visit(child)
                }
                None => Step::Return(pending.finish()),
            },
            Step::Return(value) => match stack.pop() {
                Some(mut parent) => {
                    parent.accept(value);
                    Step::Resume(parent)
                }
                None => return Ok(value),
            },
        };
    }
}

/// Validate and encode a host value with default limits.
pub fn stringify(value: &HostValue) -> Result<String> {
    stringify_with_limits(value, Limits::default())
}

/// Validate and encode a host value with custom limits.
pub fn stringify_with_limits(value: &HostValue, limits: Limits) -> Result<String> {
    let lowered = to_value_with_limits(value, limits)
        .inspect_err(|error| tracing::debug!(%error, "host value rejected"))?;
    stringify_value(&lowered, limits)
}

fn open(value: &HostValue) -> Result<Opened> {
    match value {
        HostValue::Undefined => Err(Error::Unstringifiable("`undefined`".to_string())),
        HostValue::Null => Ok(Opened::Leaf(Value::Null)),
        HostValue::Bool(b) => Ok(Opened::Leaf(Value::Bool(*b))),
        HostValue::Number(n) => open_number(*n),
        HostValue::BigInt(_) => Err(Error::Unstringifiable("a BigInt".to_string())),
        HostValue::String(s) => Ok(Opened::Leaf(Value::String(s.clone()))),
        HostValue::Symbol(_) => Err(Error::Unstringifiable("a Symbol".to_string())),
        HostValue::Object(object) => open_object(object),
    }
}

fn open_number(n: f64) -> Result<Opened> {
    if n.is_nan() {
        return Err(Error::NonFinite("NaN".to_string()));
    }
    if n.is_infinite() {
        let name = if n > 0.0 { "Infinity" } else { "-Infinity" };
        return Err(Error::NonFinite(name.to_string()));
    }
    Ok(Opened::Leaf(Value::Number(Number::new(n)?)))
}

fn open_object(object: &HostObject) -> Result<Opened> {
    if object.brand() == Brand::Function {
        return Err(Error::Unstringifiable("a Function".to_string()));
    }
    if !object.is_extensible() {
        return Err(Error::NonExtensible);
    }

    let entries = object.own_entries();
    if let Some((PropertyKey::Symbol(symbol), _)) = entries
        .iter()
        .find(|(key, _)| matches!(key, PropertyKey::Symbol(_)))
    {
        return Err(Error::SymbolProperty(symbol.to_string()));
    }

    match object.prototype() {
        Prototype::Array => {
            let children = array_children(object, &entries)?;
            Ok(Opened::Container(Pending::Array {
                items: Vec::with_capacity(children.len()),
                children: children.into_iter(),
            }))
        }
        Prototype::Object => {
            if !is_plain_object(object) {
                return Err(Error::ImitationObject);
            }
            let children = entries
                .into_iter()
                .filter_map(|(key, property)| match key {
                    PropertyKey::String(name) => Some((name, property)),
                    PropertyKey::Symbol(_) => None,
                })
                .map(|(name, property)| {
                    let value = data_value(&name, property)?;
                    Ok((name, value))
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(Opened::Container(Pending::Object {
                entries: Map::with_capacity(children.len()),
                children: children.into_iter(),
                key: None,
            }))
        }
        other => Err(Error::Unstringifiable(format!(
            "object with prototype {other}"
        ))),
    }
}

/// Elements of a genuine array, in index order.
fn array_children(
    object: &HostObject,
    entries: &[(PropertyKey, Property)],
) -> Result<Vec<HostValue>> {
    if object.brand() != Brand::Array {
        return Err(Error::ImitationArray);
    }
    let length = object.length().unwrap_or(0);

    let mut children = Vec::new();
    let mut extra = None;
    for (key, property) in entries {
        let PropertyKey::String(name) = key else {
            continue;
        };
        match key.array_index() {
            Some(index) if u64::from(index) < length => {
                let expected = children.len() as u64;
                if u64::from(index) != expected {
                    return Err(Error::MissingEntry(expected));
                }
                children.push(data_value(name, property.clone())?);
            }
            _ if name == "length" => {}
            _ => {
                extra.get_or_insert_with(|| name.clone());
            }
        }
    }

    let found = children.len() as u64;
    if found < length {
        return Err(Error::MissingEntry(found));
    }
    if let Some(name) = extra {
        return Err(Error::ExtraProperty(name));
    }
    Ok(children)
}

/// Value of a plain data property, or the first constraint it violates.
fn data_value(name: &str, property: Property) -> Result<HostValue> {
    match property {
        Property::Accessor { .. } => Err(Error::AccessorProperty(name.to_string())),
        Property::Data { enumerable: false, .. } => {
            Err(Error::NonEnumerableProperty(name.to_string()))
        }
        Property::Data { writable: false, .. } => Err(Error::ReadOnlyProperty(name.to_string())),
        Property::Data {
            configurable: false,
            ..
        } => Err(Error::NonConfigurableProperty(name.to_string())),
        Property::Data { value, .. } => Ok(value),
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::host::Symbol;

    fn object(value: Rc<HostObject>) -> HostValue {
        HostValue::Object(value)
    }

    #[test]
    fn test_primitives() {
        assert_eq!(stringify(&HostValue::Null).unwrap(), "null");
        assert_eq!(stringify(&HostValue::Bool(true)).unwrap(), "true");
        assert_eq!(stringify(&HostValue::from("a")).unwrap(), "\"a\"");
        assert_eq!(stringify(&HostValue::Number(-0.0)).unwrap(), "-0");
        assert_eq!(
            stringify(&HostValue::Number(0.1)).unwrap(),
            "0.1000000000000000055511151231257827021181583404541015625"
        );
    }

    #[test]
    fn test_unstringifiable() {
        assert_eq!(
            to_value(&HostValue::Undefined).unwrap_err().to_string(),
            "Cannot stringify `undefined`"
        );
        assert!(matches!(
            to_value(&HostValue::BigInt(1)),
            Err(Error::Unstringifiable(_))
        ));
        assert!(matches!(
            to_value(&HostValue::Symbol(Symbol::new(None))),
            Err(Error::Unstringifiable(_))
        ));
        assert!(matches!(
            to_value(&object(HostObject::function())),
            Err(Error::Unstringifiable(_))
        ));
    }

    #[test]
    fn test_non_finite() {
        assert_eq!(
            to_value(&HostValue::Number(f64::NAN)).unwrap_err(),
            Error::NonFinite("NaN".to_string())
        );
        assert_eq!(
            to_value(&HostValue::Number(f64::NEG_INFINITY)).unwrap_err(),
            Error::NonFinite("-Infinity".to_string())
        );
    }

    #[test]
    fn test_plain_containers() {
        let inner = HostObject::array([HostValue::from(1.0), HostValue::Null]);
        let outer = HostObject::plain_from([("b", object(inner)), ("a", HostValue::from("x"))]);
        assert_eq!(
            stringify(&object(outer)).unwrap(),
            r#"{"b":[1,null],"a":"x"}"#
        );
    }

    #[test]
    fn test_array_holes() {
        let array = HostObject::array([
            HostValue::from(9.0),
            HostValue::from(10.0),
            HostValue::from(0.0),
            HostValue::from(11.0),
        ]);
        array.delete(2u32);
        assert_eq!(to_value(&object(array)).unwrap_err(), Error::MissingEntry(2));

        let trailing = HostObject::array([]);
        trailing.set(3u32, "asdf");
        assert_eq!(to_value(&object(trailing)).unwrap_err(), Error::MissingEntry(0));
    }

    #[test]
    fn test_array_extra_property() {
        let array = HostObject::array([HostValue::from(1.0)]);
        array.set("baz", 2.0);
        assert_eq!(
            to_value(&object(array)).unwrap_err(),
            Error::ExtraProperty("baz".to_string())
        );
    }

    #[test]
    fn test_imitations() {
        let array = HostObject::plain();
        array.set_prototype(Prototype::Array);
        assert_eq!(to_value(&object(array)).unwrap_err(), Error::ImitationArray);

        let date = HostObject::with_brand(Brand::Date, Prototype::Object);
        assert_eq!(to_value(&object(date)).unwrap_err(), Error::ImitationObject);
    }

    #[test]
    fn test_other_prototype() {
        let orphan = HostObject::with_brand(Brand::Ordinary, Prototype::Null);
        assert_eq!(
            to_value(&object(orphan)).unwrap_err().to_string(),
            "Cannot stringify object with prototype null"
        );
    }

    #[test]
    fn test_check_order_on_object() {
        let value = HostObject::plain();
        value.define(
            "x",
            Property::Data {
                value: HostValue::Null,
                writable: false,
                enumerable: false,
                configurable: false,
            },
        );
        assert_eq!(
            to_value(&object(value.clone())).unwrap_err(),
            Error::NonEnumerableProperty("x".to_string())
        );
        value.prevent_extensions();
        assert_eq!(to_value(&object(value)).unwrap_err(), Error::NonExtensible);
    }

    #[test]
    fn test_container_checked_before_children() {
        let bad_child = HostObject::plain();
        bad_child.prevent_extensions();
        let parent = HostObject::plain_from([("child", object(bad_child))]);
        parent.define(Symbol::new(Some("late")), Property::data(1.0));
        assert_eq!(
            to_value(&object(parent)).unwrap_err(),
            Error::SymbolProperty("Symbol(late)".to_string())
        );
    }

    #[test]
    fn test_cycle_hits_depth_limit() {
        let cyclic = HostObject::plain();
        cyclic.set("self", cyclic.clone());
        let limits = Limits {
            max_nesting_depth: 16,
            ..Limits::standard()
        };
        assert_eq!(
            to_value_with_limits(&object(cyclic.clone()), limits).unwrap_err(),
            Error::NestingTooDeep(17, 16)
        );
        cyclic.delete("self");
    }
}
