use alloc::string::String;

use crate::{JsonString, ObjectKey, Number, Array, Object};

/// The type of a value.
///
/// https://datatracker.ietf.org/doc/html/rfc8259#section-3 defines all possible values, with
/// `Undefined` additionally representing the absence of a value.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Type {
  /// The `null` unit value.
  Null,
  /// A boolean.
  Bool,
  /// A RFC-8259 number.
  ///
  /// Integers are also reported as doubles.
  Double,
  /// A string.
  String,
  /// An array.
  Array,
  /// An object.
  Object,
  /// No value, such as the result of looking up a missing key.
  Undefined,
}

/// A JSON value.
///
/// Arrays and objects are shared with the containers they were read from, so values are cheap to
/// clone and mutating an array or object read out of a container does not affect the container.
#[derive(Clone, Default, Debug)]
pub enum Value {
  /// The `null` unit value.
  #[default]
  Null,
  /// A boolean.
  Bool(bool),
  /// A number.
  Number(Number),
  /// A string.
  String(JsonString),
  /// An array.
  Array(Array),
  /// An object.
  Object(Object),
  /// No value.
  ///
  /// Storing this into an array stores `null`. Storing this into an object removes the key.
  Undefined,
}

impl Value {
  /// The type of this value.
  pub fn kind(&self) -> Type {
    match self {
      Value::Null => Type::Null,
      Value::Bool(_) => Type::Bool,
      Value::Number(_) => Type::Double,
      Value::String(_) => Type::String,
      Value::Array(_) => Type::Array,
      Value::Object(_) => Type::Object,
      Value::Undefined => Type::Undefined,
    }
  }

  /// If this value is `null`.
  #[inline(always)]
  pub fn is_null(&self) -> bool {
    matches!(self, Value::Null)
  }
  /// If this value is a boolean.
  #[inline(always)]
  pub fn is_bool(&self) -> bool {
    matches!(self, Value::Bool(_))
  }
  /// If this value is a number.
  #[inline(always)]
  pub fn is_double(&self) -> bool {
    matches!(self, Value::Number(_))
  }
  /// If this value is a string.
  #[inline(always)]
  pub fn is_string(&self) -> bool {
    matches!(self, Value::String(_))
  }
  /// If this value is an array.
  #[inline(always)]
  pub fn is_array(&self) -> bool {
    matches!(self, Value::Array(_))
  }
  /// If this value is an object.
  #[inline(always)]
  pub fn is_object(&self) -> bool {
    matches!(self, Value::Object(_))
  }
  /// If this value is undefined.
  #[inline(always)]
  pub fn is_undefined(&self) -> bool {
    matches!(self, Value::Undefined)
  }

  /// This value as a boolean, if it is one.
  pub fn as_bool(&self) -> Option<bool> {
    match self {
      Value::Bool(b) => Some(*b),
      _ => None,
    }
  }
  /// This value as a number, if it is one.
  pub fn as_number(&self) -> Option<Number> {
    match self {
      Value::Number(n) => Some(*n),
      _ => None,
    }
  }
  /// This value as an `f64`, if it is a number.
  pub fn as_f64(&self) -> Option<f64> {
    self.as_number().map(Number::to_f64)
  }
  /// This value as an `i64`, if it is a number with an integral value within range.
  pub fn as_i64(&self) -> Option<i64> {
    self.as_number().and_then(Number::as_i64)
  }
  /// This value as a string, if it is one.
  pub fn as_json_string(&self) -> Option<&JsonString> {
    match self {
      Value::String(s) => Some(s),
      _ => None,
    }
  }
  /// This value as an array, if it is one.
  pub fn as_array(&self) -> Option<&Array> {
    match self {
      Value::Array(array) => Some(array),
      _ => None,
    }
  }
  /// This value as a mutable array, if it is one.
  pub fn as_array_mut(&mut self) -> Option<&mut Array> {
    match self {
      Value::Array(array) => Some(array),
      _ => None,
    }
  }
  /// This value as an object, if it is one.
  pub fn as_object(&self) -> Option<&Object> {
    match self {
      Value::Object(object) => Some(object),
      _ => None,
    }
  }
  /// This value as a mutable object, if it is one.
  pub fn as_object_mut(&mut self) -> Option<&mut Object> {
    match self {
      Value::Object(object) => Some(object),
      _ => None,
    }
  }

  /// This value as a boolean, or `default` if it isn't one.
  pub fn to_bool(&self, default: bool) -> bool {
    self.as_bool().unwrap_or(default)
  }

  /// This value as an `i32`, or `default` if it isn't a finite number.
  ///
  /// Fractional parts are truncated and out-of-range values are clamped.
  pub fn to_int(&self, default: i32) -> i32 {
    self.as_number().and_then(Number::clamped_i32).unwrap_or(default)
  }

  /// This value as an `i64`, or `default` if it isn't a finite number.
  ///
  /// Fractional parts are truncated and out-of-range values are clamped.
  pub fn to_integer(&self, default: i64) -> i64 {
    self.as_number().and_then(Number::clamped_i64).unwrap_or(default)
  }

  /// This value as an `f64`, or `default` if it isn't a number.
  pub fn to_double(&self, default: f64) -> f64 {
    self.as_f64().unwrap_or(default)
  }

  /// This value as a `String`, or `default` if it isn't a string.
  ///
  /// Unpaired surrogates are replaced with U+FFFD.
  pub fn to_string(&self, default: &str) -> String {
    match self {
      Value::String(s) => s.to_string_lossy(),
      _ => String::from(default),
    }
  }

  /// This value as a `JsonString`, or `default` if it isn't a string.
  pub fn to_json_string(&self, default: JsonString) -> JsonString {
    self.as_json_string().cloned().unwrap_or(default)
  }

  /// This value as an array, or an empty array if it isn't one.
  pub fn to_array(&self) -> Array {
    self.to_array_or(Array::new())
  }

  /// This value as an array, or `default` if it isn't one.
  pub fn to_array_or(&self, default: Array) -> Array {
    self.as_array().cloned().unwrap_or(default)
  }

  /// This value as an object, or an empty object if it isn't one.
  pub fn to_object(&self) -> Object {
    self.to_object_or(Object::new())
  }

  /// This value as an object, or `default` if it isn't one.
  pub fn to_object_or(&self, default: Object) -> Object {
    self.as_object().cloned().unwrap_or(default)
  }

  /// The value of a field, if this is an object with this key.
  ///
  /// Returns `Value::Undefined` otherwise.
  pub fn get(&self, key: &(impl ObjectKey + ?Sized)) -> Value {
    match self {
      Value::Object(object) => object.value(key),
      _ => Value::Undefined,
    }
  }

  /// The `i`-th value, if this is an array with such an index.
  ///
  /// Returns `Value::Undefined` otherwise.
  pub fn at(&self, i: usize) -> Value {
    match self {
      Value::Array(array) => array.at(i),
      _ => Value::Undefined,
    }
  }
}

/// Values are equal if their types and contents are.
///
/// Numbers are compared by numeric value, so `1` and `1.0` are equal.
impl PartialEq for Value {
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Value::Null, Value::Null) | (Value::Undefined, Value::Undefined) => true,
      (Value::Bool(a), Value::Bool(b)) => a == b,
      (Value::Number(a), Value::Number(b)) => a == b,
      (Value::String(a), Value::String(b)) => a == b,
      (Value::Array(a), Value::Array(b)) => a == b,
      (Value::Object(a), Value::Object(b)) => a == b,
      _ => false,
    }
  }
}

impl From<bool> for Value {
  fn from(b: bool) -> Self {
    Value::Bool(b)
  }
}
impl From<i32> for Value {
  fn from(i: i32) -> Self {
    Value::Number(Number::Integer(i64::from(i)))
  }
}
impl From<u32> for Value {
  fn from(i: u32) -> Self {
    Value::Number(Number::Integer(i64::from(i)))
  }
}
impl From<i64> for Value {
  fn from(i: i64) -> Self {
    Value::Number(Number::Integer(i))
  }
}
impl From<u64> for Value {
  /// Values exceeding `i64::MAX` are stored as doubles.
  #[allow(clippy::cast_precision_loss)]
  fn from(i: u64) -> Self {
    Value::Number(match i64::try_from(i) {
      Ok(i) => Number::Integer(i),
      Err(_) => Number::Double(i as f64),
    })
  }
}
impl From<f64> for Value {
  fn from(d: f64) -> Self {
    Value::Number(Number::Double(d))
  }
}
impl From<Number> for Value {
  fn from(n: Number) -> Self {
    Value::Number(n)
  }
}
impl From<&str> for Value {
  fn from(s: &str) -> Self {
    Value::String(JsonString::from(s))
  }
}
impl From<String> for Value {
  fn from(s: String) -> Self {
    Value::String(JsonString::from(s))
  }
}
impl From<JsonString> for Value {
  fn from(s: JsonString) -> Self {
    Value::String(s)
  }
}
impl From<Array> for Value {
  fn from(array: Array) -> Self {
    Value::Array(array)
  }
}
impl From<Object> for Value {
  fn from(object: Object) -> Self {
    Value::Object(object)
  }
}
impl<T: Into<Value>> From<Option<T>> for Value {
  /// `None` is converted to `null`.
  fn from(value: Option<T>) -> Self {
    value.map_or(Value::Null, Into::into)
  }
}

#[test]
#[allow(clippy::float_cmp)]
fn conversions() {
  assert_eq!(Value::from(2.9).to_int(0), 2);
  assert_eq!(Value::from(-2.9).to_int(0), -2);
  assert_eq!(Value::from(1e10).to_int(0), i32::MAX);
  assert_eq!(Value::from(i64::MIN).to_int(0), i32::MIN);
  assert_eq!(Value::from(f64::NAN).to_int(7), 7);
  assert_eq!(Value::from(f64::INFINITY).to_integer(7), 7);
  assert_eq!(Value::from(1e300).to_integer(0), i64::MAX);
  assert_eq!(Value::from("1").to_int(3), 3);
  assert_eq!(Value::from(5).to_double(0.0), 5.0);
  assert_eq!(Value::Null.to_double(1.5), 1.5);
  assert!(Value::from(true).to_bool(false));
  assert!(Value::from(0).to_bool(true));
  assert_eq!(Value::from("x").to_string(""), "x");
  assert_eq!(Value::from(1).to_string("default"), "default");
  assert_eq!(Value::String(JsonString::from_utf16(&[0xd800])).to_string(""), "\u{fffd}");
  assert_eq!(Value::from(u64::MAX).as_f64(), Some(18_446_744_073_709_551_615.0));
  assert_eq!(Value::from(None::<bool>), Value::Null);
  assert!(Value::from(1).to_array().is_empty());
  assert!(Value::from(1).to_object().is_empty());
}

#[test]
fn equality() {
  assert_eq!(Value::from(1), Value::from(1.0));
  assert_ne!(Value::from(1), Value::from(true));
  assert_ne!(Value::Null, Value::Undefined);
  assert_ne!(Value::from(f64::NAN), Value::from(f64::NAN));
  assert_ne!(Value::Array(Array::new()), Value::Object(Object::new()));
  assert_eq!(Value::from(1).kind(), Type::Double);
  assert_eq!(Value::default().kind(), Type::Null);
}
