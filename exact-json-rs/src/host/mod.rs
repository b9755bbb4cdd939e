//! Dynamically shaped host values.
//!
//! Values handed over by an embedding scripting runtime are untrusted: an
//! array can have its prototype swapped, a date can pose as a plain object,
//! properties can be getters, read-only, hidden from enumeration or keyed by
//! symbols, and objects can reference themselves. This module models such
//! values so they can be checked before encoding.
//!
//! - [`classify`] - genuine plain object detection
//! - [`lower`] - validation and conversion into [`Value`](crate::json::Value)
//!
//! An object carries two kinds of identity. Its [`Brand`] is intrinsic and
//! fixed at creation; its [`Prototype`] is an outward link that user code may
//! reassign. Checks that must not be fooled only look at the brand.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

pub mod classify;
pub mod lower;

pub use classify::is_plain_object;
pub use lower::{stringify, stringify_with_limits, to_value, to_value_with_limits};

/// A symbol.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Symbol {
    /// `Symbol.iterator`
    Iterator,
    /// `Symbol.toStringTag`
    ToStringTag,
    /// A symbol created by user code; each one is unique.
    Local {
        /// Identity
        id: u64,
        /// Optional description
        description: Option<String>,
    },
}

impl Symbol {
    /// Create a fresh symbol, distinct from every other.
    pub fn new(description: Option<&str>) -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);
        Symbol::Local {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            description: description.map(str::to_string),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Iterator => f.write_str("Symbol(Symbol.iterator)"),
            Symbol::ToStringTag => f.write_str("Symbol(Symbol.toStringTag)"),
            Symbol::Local { description, .. } => {
                write!(f, "Symbol({})", description.as_deref().unwrap_or(""))
            }
        }
    }
}

/// Element type of a typed array.
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypedArrayKind {
    Int8,
    Uint8,
    Uint8Clamped,
    Int16,
    Uint16,
    Int32,
    Uint32,
    Float32,
    Float64,
    BigInt64,
    BigUint64,
}

impl TypedArrayKind {
    /// Constructor name, e.g. `Uint8Array`.
    pub fn name(&self) -> &'static str {
        match self {
            TypedArrayKind::Int8 => "Int8Array",
            TypedArrayKind::Uint8 => "Uint8Array",
            TypedArrayKind::Uint8Clamped => "Uint8ClampedArray",
            TypedArrayKind::Int16 => "Int16Array",
            TypedArrayKind::Uint16 => "Uint16Array",
            TypedArrayKind::Int32 => "Int32Array",
            TypedArrayKind::Uint32 => "Uint32Array",
            TypedArrayKind::Float32 => "Float32Array",
            TypedArrayKind::Float64 => "Float64Array",
            TypedArrayKind::BigInt64 => "BigInt64Array",
            TypedArrayKind::BigUint64 => "BigUint64Array",
        }
    }
}

/// Intrinsic kind of an object, fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Brand {
    /// Ordinary object with no internal slots
    Ordinary,
    /// Array exotic object
    Array,
    /// Arguments object
    Arguments,
    /// Callable
    Function,
    /// Error instance
    Error,
    /// Boxed boolean
    Boolean,
    /// Boxed number
    Number,
    /// Boxed string
    String,
    /// Boxed symbol
    Symbol,
    /// Boxed bigint
    BigInt,
    /// Date instance
    Date,
    /// Regular expression
    RegExp,
    /// Map
    Map,
    /// Set
    Set,
    /// WeakMap
    WeakMap,
    /// WeakSet
    WeakSet,
    /// Typed array view
    TypedArray(TypedArrayKind),
}

impl Brand {
    /// Tag reported by `Object.prototype.toString` when the object has no
    /// `Symbol.toStringTag` of its own.
    ///
    /// Kinds whose tag normally comes from their own prototype (maps, sets,
    /// typed arrays, ...) report `Object` here, since the prototype may have
    /// been swapped.
    pub fn builtin_tag(&self) -> &'static str {
        match self {
            Brand::Array => "Array",
            Brand::Arguments => "Arguments",
            Brand::Function => "Function",
            Brand::Error => "Error",
            Brand::Boolean => "Boolean",
            Brand::Number => "Number",
            Brand::String => "String",
            Brand::Date => "Date",
            Brand::RegExp => "RegExp",
            Brand::Ordinary
            | Brand::Symbol
            | Brand::BigInt
            | Brand::Map
            | Brand::Set
            | Brand::WeakMap
            | Brand::WeakSet
            | Brand::TypedArray(_) => "Object",
        }
    }
}

/// Outward prototype link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Prototype {
    /// `Object.prototype`
    Object,
    /// `Array.prototype`
    Array,
    /// No prototype
    Null,
    /// Any other prototype, by name
    Other(String),
}

impl fmt::Display for Prototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prototype::Object => f.write_str("Object.prototype"),
            Prototype::Array => f.write_str("Array.prototype"),
            Prototype::Null => f.write_str("null"),
            Prototype::Other(name) => f.write_str(name),
        }
    }
}

/// Own property key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// String key
    String(String),
    /// Symbol key
    Symbol(Symbol),
}

impl PropertyKey {
    /// Array index denoted by this key, if it is a canonical decimal below
    /// 2^32 - 1.
    pub fn array_index(&self) -> Option<u32> {
        let PropertyKey::String(name) = self else {
            return None;
        };
        let canonical = name == "0"
            || (!name.is_empty()
                && !name.starts_with('0')
                && name.bytes().all(|b| b.is_ascii_digit()));
        if !canonical {
            return None;
        }
        name.parse::<u32>().ok().filter(|&index| index != u32::MAX)
    }

    /// Enumeration class: indices ascending, then strings, then symbols.
    fn order(&self) -> (u8, u32) {
        match (self, self.array_index()) {
            (_, Some(index)) => (0, index),
            (PropertyKey::String(_), None) => (1, 0),
            (PropertyKey::Symbol(_), None) => (2, 0),
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::String(name) => f.write_str(name),
            PropertyKey::Symbol(symbol) => symbol.fmt(f),
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(name: &str) -> Self {
        PropertyKey::String(name.to_string())
    }
}

impl From<String> for PropertyKey {
    fn from(name: String) -> Self {
        PropertyKey::String(name)
    }
}

impl From<u32> for PropertyKey {
    fn from(index: u32) -> Self {
        PropertyKey::String(index.to_string())
    }
}

impl From<Symbol> for PropertyKey {
    fn from(symbol: Symbol) -> Self {
        PropertyKey::Symbol(symbol)
    }
}

/// Own property descriptor.
#[derive(Debug, Clone)]
pub enum Property {
    /// Property holding a value
    Data {
        /// Stored value
        value: HostValue,
        /// Assignable
        writable: bool,
        /// Visible to enumeration
        enumerable: bool,
        /// Deletable and redefinable
        configurable: bool,
    },
    /// Getter/setter pair
    Accessor {
        /// Getter function, if any
        get: Option<HostValue>,
        /// Setter function, if any
        set: Option<HostValue>,
        /// Visible to enumeration
        enumerable: bool,
        /// Deletable and redefinable
        configurable: bool,
    },
}

impl Property {
    /// Writable, enumerable, configurable data property.
    pub fn data(value: impl Into<HostValue>) -> Self {
        Property::Data {
            value: value.into(),
            writable: true,
            enumerable: true,
            configurable: true,
        }
    }

    /// Data property hidden from enumeration.
    pub fn hidden(value: impl Into<HostValue>) -> Self {
        Property::Data {
            value: value.into(),
            writable: true,
            enumerable: false,
            configurable: true,
        }
    }

    /// Enumerable, configurable property with a getter.
    pub fn getter(get: impl Into<HostValue>) -> Self {
        Property::Accessor {
            get: Some(get.into()),
            set: None,
            enumerable: true,
            configurable: true,
        }
    }

    /// Whether the property is configurable.
    pub fn is_configurable(&self) -> bool {
        match self {
            Property::Data { configurable, .. } | Property::Accessor { configurable, .. } => {
                *configurable
            }
        }
    }
}

/// A host value.
#[derive(Debug, Clone)]
pub enum HostValue {
    /// `undefined`
    Undefined,
    /// `null`
    Null,
    /// Boolean primitive
    Bool(bool),
    /// Number primitive (any binary64, including NaN)
    Number(f64),
    /// BigInt primitive
    BigInt(i128),
    /// String primitive
    String(String),
    /// Symbol primitive
    Symbol(Symbol),
    /// Reference to an object
    Object(Rc<HostObject>),
}

impl From<bool> for HostValue {
    fn from(value: bool) -> Self {
        HostValue::Bool(value)
    }
}

impl From<f64> for HostValue {
    fn from(value: f64) -> Self {
        HostValue::Number(value)
    }
}

impl From<&str> for HostValue {
    fn from(value: &str) -> Self {
        HostValue::String(value.to_string())
    }
}

impl From<String> for HostValue {
    fn from(value: String) -> Self {
        HostValue::String(value)
    }
}

impl From<Symbol> for HostValue {
    fn from(value: Symbol) -> Self {
        HostValue::Symbol(value)
    }
}

impl From<Rc<HostObject>> for HostValue {
    fn from(value: Rc<HostObject>) -> Self {
        HostValue::Object(value)
    }
}

/// A host object.
///
/// Objects are shared through `Rc` and mutated through `&self`, so graphs
/// (including cycles) can be built after creation.
pub struct HostObject {
    brand: Brand,
    prototype: RefCell<Prototype>,
    extensible: Cell<bool>,
    properties: RefCell<Vec<(PropertyKey, Property)>>,
}

impl HostObject {
    /// Empty extensible object.
    pub fn with_brand(brand: Brand, prototype: Prototype) -> Rc<Self> {
        Rc::new(Self {
            brand,
            prototype: RefCell::new(prototype),
            extensible: Cell::new(true),
            properties: RefCell::new(Vec::new()),
        })
    }

    /// `{}`
    pub fn plain() -> Rc<Self> {
        Self::with_brand(Brand::Ordinary, Prototype::Object)
    }

    /// Plain object with the given enumerable data properties.
    pub fn plain_from<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Rc<Self>
    where
        K: Into<PropertyKey>,
        V: Into<HostValue>,
    {
        let object = Self::plain();
        for (key, value) in entries {
            object.set(key, value);
        }
        object
    }

    /// Array literal.
    pub fn array(items: impl IntoIterator<Item = HostValue>) -> Rc<Self> {
        let object = Self::with_brand(Brand::Array, Prototype::Array);
        object.define_unchecked(
            "length".into(),
            Property::Data {
                value: HostValue::Number(0.0),
                writable: true,
                enumerable: false,
                configurable: false,
            },
        );
        for (index, item) in (0u32..).zip(items) {
            object.set(index, item);
        }
        object
    }

    /// Arguments object of a non-strict function call.
    pub fn arguments(items: impl IntoIterator<Item = HostValue>) -> Rc<Self> {
        let object = Self::with_brand(Brand::Arguments, Prototype::Object);
        let mut length = 0u32;
        for (index, item) in (0u32..).zip(items) {
            object.set(index, item);
            length = index + 1;
        }
        object.define_unchecked("length".into(), Property::hidden(f64::from(length)));
        object.define_unchecked(
            Symbol::Iterator.into(),
            Property::hidden(HostValue::Object(Self::function())),
        );
        object
    }

    /// A function object.
    pub fn function() -> Rc<Self> {
        Self::with_brand(Brand::Function, Prototype::Other("Function.prototype".to_string()))
    }

    /// Intrinsic kind.
    pub fn brand(&self) -> Brand {
        self.brand
    }

    /// Current prototype link.
    pub fn prototype(&self) -> Prototype {
        self.prototype.borrow().clone()
    }

    /// Reassign the prototype link. The brand is unaffected.
    pub fn set_prototype(&self, prototype: Prototype) {
        *self.prototype.borrow_mut() = prototype;
    }

    /// Whether new properties may be added.
    pub fn is_extensible(&self) -> bool {
        self.extensible.get()
    }

    /// Forbid adding properties.
    pub fn prevent_extensions(&self) {
        self.extensible.set(false);
    }

    /// Make every property read-only and non-configurable and forbid
    /// adding properties.
    pub fn freeze(&self) {
        for (_, property) in self.properties.borrow_mut().iter_mut() {
            match property {
                Property::Data {
                    writable,
                    configurable,
                    ..
                } => {
                    *writable = false;
                    *configurable = false;
                }
                Property::Accessor { configurable, .. } => *configurable = false,
            }
        }
        self.prevent_extensions();
    }

    /// Assign a property.
    ///
    /// Updates a writable data property in place or adds an enumerable,
    /// writable, configurable one. Assigning an array index at or past the
    /// length grows an array. Returns false if the assignment was refused.
    pub fn set(&self, key: impl Into<PropertyKey>, value: impl Into<HostValue>) -> bool {
        let key = key.into();
        let value = value.into();
        let index = key.array_index();

        let mut properties = self.properties.borrow_mut();
        match properties.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, Property::Data { value: slot, writable: true, .. })) => *slot = value,
            Some(_) => return false,
            None if !self.is_extensible() => return false,
            None => properties.push((key, Property::data(value))),
        }
        drop(properties);

        if let (Brand::Array, Some(index)) = (self.brand, index) {
            self.grow_length(index);
        }
        true
    }

    /// Define or redefine a property. Returns false if the property exists
    /// and is not configurable, or is absent and the object is not
    /// extensible.
    pub fn define(&self, key: impl Into<PropertyKey>, property: Property) -> bool {
        let key = key.into();
        let existing = self.get_own(&key);
        match existing {
            Some(existing) if !existing.is_configurable() => false,
            None if !self.is_extensible() => false,
            _ => {
                let index = key.array_index();
                self.define_unchecked(key, property);
                if let (Brand::Array, Some(index)) = (self.brand, index) {
                    self.grow_length(index);
                }
                true
            }
        }
    }

    fn define_unchecked(&self, key: PropertyKey, property: Property) {
        let mut properties = self.properties.borrow_mut();
        match properties.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = property,
            None => properties.push((key, property)),
        }
    }

    fn grow_length(&self, index: u32) {
        let length = self.length().unwrap_or(0);
        if u64::from(index) >= length {
            if let Some((_, Property::Data { value, .. })) = self
                .properties
                .borrow_mut()
                .iter_mut()
                .find(|(key, _)| *key == PropertyKey::from("length"))
            {
                *value = HostValue::Number(f64::from(index) + 1.0);
            }
        }
    }

    /// Remove a configurable property. Returns false if it is not
    /// configurable.
    pub fn delete(&self, key: impl Into<PropertyKey>) -> bool {
        let key = key.into();
        let mut properties = self.properties.borrow_mut();
        match properties.iter().position(|(existing, _)| *existing == key) {
            Some(position) if !properties[position].1.is_configurable() => false,
            Some(position) => {
                properties.remove(position);
                true
            }
            None => true,
        }
    }

    /// Own property by key.
    pub fn get_own(&self, key: &PropertyKey) -> Option<Property> {
        self.properties
            .borrow()
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, property)| property.clone())
    }

    /// Value of an own `length` data property holding a non-negative
    /// integer.
    pub fn length(&self) -> Option<u64> {
        match self.get_own(&PropertyKey::from("length"))? {
            Property::Data {
                value: HostValue::Number(length),
                ..
            } if length >= 0.0 && length.fract() == 0.0 && length <= u32::MAX as f64 => {
                Some(length as u64)
            }
            _ => None,
        }
    }

    /// Own keys in enumeration order: array indices ascending, then other
    /// strings in insertion order, then symbols in insertion order.
    pub fn own_keys(&self) -> Vec<PropertyKey> {
        self.own_entries().into_iter().map(|(key, _)| key).collect()
    }

    /// Own properties in [`own_keys`](Self::own_keys) order.
    pub fn own_entries(&self) -> Vec<(PropertyKey, Property)> {
        let mut entries = self.properties.borrow().clone();
        entries.sort_by_key(|(key, _)| key.order());
        entries
    }
}

impl fmt::Debug for HostObject {
    // Objects can be cyclic; print the shape, not the contents.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostObject")
            .field("brand", &self.brand)
            .field("prototype", &self.prototype.borrow())
            .field("extensible", &self.extensible.get())
            .field("keys", &self.own_keys())
            .finish()
    }
}
