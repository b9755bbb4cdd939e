//! Host value encoding tests.
//!
//! Host objects that only look like arrays or plain objects, and properties
//! that a decoded document could never have, must be rejected.

use exact_json::host::{
    self, is_plain_object, Brand, HostObject, HostValue, Property, Prototype, Symbol,
    TypedArrayKind,
};
use exact_json::{Error, ErrorKind, Limits};
use std::rc::Rc;
use test_case::test_case;

fn object(value: Rc<HostObject>) -> HostValue {
    HostValue::Object(value)
}

fn rejection(value: Rc<HostObject>) -> Error {
    host::to_value(&object(value)).unwrap_err()
}

// ============================================================================
// Genuine values
// ============================================================================

#[test]
fn nested_plain_values_encode() {
    let list = HostObject::array([
        HostValue::from(1.0),
        HostValue::from(-0.0),
        HostValue::from("two"),
        HostValue::Null,
        HostValue::Bool(true),
    ]);
    let root = HostObject::plain_from([
        ("list", object(list)),
        ("empty", object(HostObject::plain())),
        ("half", HostValue::from(0.5)),
    ]);
    assert_eq!(
        host::stringify(&object(root)).unwrap(),
        r#"{"list":[1,-0,"two",null,true],"empty":{},"half":0.5}"#
    );
}

#[test]
fn encoding_matches_decoding() {
    let root = HostObject::plain_from([("x", 0.1)]);
    let text = host::stringify(&object(root.clone())).unwrap();
    let decoded = exact_json::parse(&text).unwrap();
    assert_eq!(decoded, host::to_value(&object(root)).unwrap());
}

#[test]
fn rewritten_elements_still_encode() {
    let array = HostObject::array([HostValue::from(1.0)]);
    assert!(array.set(0u32, "changed"));
    assert!(array.set(1u32, 2.0));
    assert_eq!(
        host::stringify(&object(array)).unwrap(),
        r#"["changed",2]"#
    );
}

// ============================================================================
// Structural fraud
// ============================================================================

#[test_case(Brand::Array ; "array")]
#[test_case(Brand::Error ; "error")]
#[test_case(Brand::Boolean ; "boxed boolean")]
#[test_case(Brand::Number ; "boxed number")]
#[test_case(Brand::String ; "boxed string")]
#[test_case(Brand::Symbol ; "boxed symbol")]
#[test_case(Brand::BigInt ; "boxed bigint")]
#[test_case(Brand::Date ; "date")]
#[test_case(Brand::RegExp ; "regexp")]
#[test_case(Brand::Map ; "map")]
#[test_case(Brand::Set ; "set")]
#[test_case(Brand::WeakMap ; "weak map")]
#[test_case(Brand::WeakSet ; "weak set")]
#[test_case(Brand::TypedArray(TypedArrayKind::Uint8) ; "uint8 array")]
#[test_case(Brand::TypedArray(TypedArrayKind::Float64) ; "float64 array")]
fn imitation_plain_objects_rejected(brand: Brand) {
    let value = HostObject::with_brand(brand, Prototype::Object);
    assert!(!is_plain_object(&value));
    assert_eq!(rejection(value), Error::ImitationObject);
}

#[test_case(Brand::Ordinary ; "plain object")]
#[test_case(Brand::Arguments ; "arguments")]
#[test_case(Brand::Date ; "date")]
#[test_case(Brand::TypedArray(TypedArrayKind::Int32) ; "int32 array")]
fn imitation_arrays_rejected(brand: Brand) {
    let value = HostObject::with_brand(brand, Prototype::Array);
    assert_eq!(rejection(value), Error::ImitationArray);
}

#[test]
fn array_with_object_prototype_rejected() {
    let array = HostObject::array([HostValue::from(1.0)]);
    array.set_prototype(Prototype::Object);
    assert_eq!(rejection(array).kind(), ErrorKind::StructuralFraud);
}

#[test]
fn tagged_object_rejected() {
    let value = HostObject::plain_from([("a", 1.0)]);
    // A tag keyed by a symbol is itself a symbol property.
    value.define(Symbol::ToStringTag, Property::hidden("Custom"));
    assert_eq!(
        rejection(value),
        Error::SymbolProperty("Symbol(Symbol.toStringTag)".to_string())
    );
}

#[test_case(Prototype::Null, "Cannot stringify object with prototype null" ; "null prototype")]
#[test_case(Prototype::Other("Foo.prototype".to_string()), "Cannot stringify object with prototype Foo.prototype" ; "class instance")]
fn other_prototypes_rejected(prototype: Prototype, message: &str) {
    let value = HostObject::with_brand(Brand::Ordinary, prototype);
    assert_eq!(rejection(value).to_string(), message);
}

// ============================================================================
// Property descriptors
// ============================================================================

#[test]
fn arguments_object_rejected_for_iterator_symbol() {
    let args = HostObject::arguments([HostValue::from(1.0), HostValue::from(2.0)]);
    assert_eq!(
        rejection(args),
        Error::SymbolProperty("Symbol(Symbol.iterator)".to_string())
    );
}

#[test]
fn local_symbol_key_rejected() {
    let value = HostObject::plain();
    value.define(Symbol::new(Some("secret")), Property::data(1.0));
    assert_eq!(
        rejection(value),
        Error::SymbolProperty("Symbol(secret)".to_string())
    );
}

#[test]
fn symbol_on_array_rejected() {
    let array = HostObject::array([HostValue::from(1.0)]);
    array.define(Symbol::new(None), Property::data(true));
    assert_eq!(
        rejection(array),
        Error::SymbolProperty("Symbol()".to_string())
    );
}

#[test]
fn non_configurable_element_rejected() {
    let array = HostObject::array([
        HostValue::from(1.0),
        HostValue::from(2.0),
        HostValue::from(3.0),
    ]);
    assert!(array.define(
        1u32,
        Property::Data {
            value: HostValue::from(2.0),
            writable: true,
            enumerable: true,
            configurable: false,
        },
    ));
    let error = rejection(array);
    assert_eq!(error, Error::NonConfigurableProperty("1".to_string()));
    assert_eq!(
        error.to_string(),
        "Can't stringify a value with non-configurable property 1"
    );
}

#[test]
fn accessor_rejected() {
    let value = HostObject::plain();
    value.define("computed", Property::getter(HostObject::function()));
    assert_eq!(
        rejection(value),
        Error::AccessorProperty("computed".to_string())
    );
}

#[test]
fn hidden_property_rejected() {
    let value = HostObject::plain_from([("shown", 1.0)]);
    value.define("hidden", Property::hidden(2.0));
    assert_eq!(
        rejection(value),
        Error::NonEnumerableProperty("hidden".to_string())
    );
}

#[test]
fn read_only_property_rejected() {
    let value = HostObject::plain();
    value.define(
        "fixed",
        Property::Data {
            value: HostValue::from(1.0),
            writable: false,
            enumerable: true,
            configurable: true,
        },
    );
    assert_eq!(
        rejection(value),
        Error::ReadOnlyProperty("fixed".to_string())
    );
}

#[test]
fn frozen_and_non_extensible_rejected() {
    let frozen = HostObject::plain_from([("a", 1.0)]);
    frozen.freeze();
    assert_eq!(rejection(frozen), Error::NonExtensible);

    let sealed_array = HostObject::array([HostValue::from(1.0)]);
    sealed_array.prevent_extensions();
    assert_eq!(rejection(sealed_array), Error::NonExtensible);
}

#[test]
fn holes_and_extras_in_arrays() {
    let sparse = HostObject::array([]);
    sparse.set(2u32, 1.0);
    assert_eq!(rejection(sparse), Error::MissingEntry(0));

    let gap = HostObject::array([HostValue::from(0.0)]);
    gap.set(3u32, 3.0);
    assert_eq!(rejection(gap), Error::MissingEntry(1));

    let named = HostObject::array([HostValue::Null]);
    named.set("label", "x");
    assert_eq!(
        rejection(named),
        Error::ExtraProperty("label".to_string())
    );
}

// ============================================================================
// Leaves and traversal
// ============================================================================

#[test_case(HostValue::Undefined, "Cannot stringify `undefined`" ; "undefined")]
#[test_case(HostValue::BigInt(12), "Cannot stringify a BigInt" ; "bigint")]
#[test_case(HostValue::Symbol(Symbol::Iterator), "Cannot stringify a Symbol" ; "symbol")]
#[test_case(HostValue::Number(f64::NAN), "Cannot get an exact decimal for non-finite number NaN" ; "nan")]
#[test_case(HostValue::Number(f64::INFINITY), "Cannot get an exact decimal for non-finite number Infinity" ; "infinity")]
fn unencodable_leaves(value: HostValue, message: &str) {
    let error = host::to_value(&value).unwrap_err();
    assert_eq!(error.kind(), ErrorKind::InputType);
    assert_eq!(error.to_string(), message);
}

#[test]
fn bad_leaf_inside_container() {
    let array = HostObject::array([HostValue::from(1.0), HostValue::Undefined]);
    let root = HostObject::plain_from([("items", object(array))]);
    assert!(matches!(
        rejection(root),
        Error::Unstringifiable(ref what) if what == "`undefined`"
    ));
}

#[test]
fn self_reference_stops_at_depth_limit() {
    let array = HostObject::array([]);
    array.set(0u32, array.clone());
    let result = host::to_value_with_limits(&object(array.clone()), Limits::default());
    assert_eq!(result.unwrap_err(), Error::NestingTooDeep(129, 128));
    // Break the cycle so the objects are freed.
    array.set(0u32, HostValue::Null);
}
