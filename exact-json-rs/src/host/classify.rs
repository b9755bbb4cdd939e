//! Plain object detection.
//!
//! An object whose prototype is `Object.prototype` is not necessarily a
//! plain object: the prototype of an array, a date, a map or an arguments
//! object can be reassigned, yet the object stays detectably what it was.
//! Encoding such an object as a mapping would lose that identity, so the
//! encoder only accepts objects that pass [`is_plain_object`].

use super::{Brand, HostObject, HostValue, Property, PropertyKey, Symbol};

/// The `Object.prototype.toString` tag: an own string-valued
/// `Symbol.toStringTag` data property if present, otherwise the brand's
/// builtin tag.
pub fn to_string_tag(object: &HostObject) -> String {
    match object.get_own(&PropertyKey::Symbol(Symbol::ToStringTag)) {
        Some(Property::Data {
            value: HostValue::String(tag),
            ..
        }) => tag,
        _ => object.brand().builtin_tag().to_string(),
    }
}

/// True if `object` is a genuine plain object.
///
/// Rejects anything with internal slots (arrays, arguments, functions,
/// errors, boxed primitives, dates, regular expressions, maps, sets, weak
/// collections, typed arrays) and anything tagged other than `Object`.
/// Only the intrinsic brand and own properties are consulted, never the
/// prototype link.
pub fn is_plain_object(object: &HostObject) -> bool {
    object.brand() == Brand::Ordinary && to_string_tag(object) == "Object"
}
