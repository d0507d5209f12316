//! Conversions to and from `serde_json` values.
//!
//! Strings are converted lossily, replacing unpaired surrogates with U+FFFD. Non-finite numbers and
//! `Value::Undefined` become `null`.

use alloc::{string::String, vec::Vec};

use serde_json::{Map, Number as JsonNumber, Value as Variant};

use crate::{JsonString, Number, Value, Array, Object, Document};

impl Value {
  /// Convert a `serde_json` value.
  #[allow(clippy::cast_precision_loss)]
  pub fn from_variant(variant: &Variant) -> Value {
    match variant {
      Variant::Null => Value::Null,
      Variant::Bool(b) => Value::Bool(*b),
      Variant::Number(n) => {
        if let Some(i) = n.as_i64() {
          Value::Number(Number::Integer(i))
        } else if let Some(u) = n.as_u64() {
          Value::Number(Number::Double(u as f64))
        } else {
          n.as_f64().map_or(Value::Null, |d| Value::Number(Number::Double(d)))
        }
      }
      Variant::String(s) => Value::from(s.as_str()),
      Variant::Array(values) => Value::Array(Array::from_variant_list(values)),
      Variant::Object(fields) => Value::Object(Object::from_variant_map(fields)),
    }
  }

  /// Convert to a `serde_json` value.
  pub fn to_variant(&self) -> Variant {
    match self {
      Value::Null | Value::Undefined => Variant::Null,
      Value::Bool(b) => Variant::Bool(*b),
      Value::Number(Number::Integer(i)) => Variant::Number(JsonNumber::from(*i)),
      Value::Number(Number::Double(d)) => {
        JsonNumber::from_f64(*d).map_or(Variant::Null, Variant::Number)
      }
      Value::String(s) => Variant::String(s.to_string_lossy()),
      Value::Array(array) => Variant::Array(array.to_variant_list()),
      Value::Object(object) => Variant::Object(object.to_variant_map()),
    }
  }
}

impl Array {
  /// Convert a list of `serde_json` values.
  pub fn from_variant_list(variants: &[Variant]) -> Array {
    variants.iter().map(Value::from_variant).collect()
  }

  /// Convert to a list of `serde_json` values.
  pub fn to_variant_list(&self) -> Vec<Variant> {
    self.iter().map(|value| value.to_variant()).collect()
  }
}

impl Object {
  /// Convert a map of `serde_json` values.
  pub fn from_variant_map<'a>(
    fields: impl IntoIterator<Item = (&'a String, &'a Variant)>,
  ) -> Object {
    fields
      .into_iter()
      .map(|(key, value)| (JsonString::from(key), Value::from_variant(value)))
      .collect()
  }

  /// Convert to a map of `serde_json` values.
  ///
  /// Keys which only differ by unpaired surrogates collapse into one, keeping the last in order.
  pub fn to_variant_map(&self) -> Map<String, Variant> {
    self.iter().map(|(key, value)| (key.to_string_lossy(), value.to_variant())).collect()
  }
}

impl Document {
  /// Convert a `serde_json` value.
  ///
  /// Returns a null document unless the value is an array or an object.
  pub fn from_variant(variant: &Variant) -> Document {
    match Value::from_variant(variant) {
      Value::Array(array) => Document::from(array),
      Value::Object(object) => Document::from(object),
      _ => Document::new(),
    }
  }

  /// Convert to a `serde_json` value.
  ///
  /// A null document converts to `null`.
  pub fn to_variant(&self) -> Variant {
    match self.clone().take() {
      Value::Null => Variant::Null,
      root => root.to_variant(),
    }
  }
}

impl From<&Variant> for Value {
  fn from(variant: &Variant) -> Self {
    Value::from_variant(variant)
  }
}

impl From<&Value> for Variant {
  fn from(value: &Value) -> Self {
    value.to_variant()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn conversions() {
    let variant = json!({
      "null": null,
      "bool": true,
      "int": -5,
      "big": 18_446_744_073_709_551_615u64,
      "double": 1.5,
      "string": "\u{e9}",
      "array": [1, [2]],
      "object": { "x": {} },
    });
    let value = Value::from_variant(&variant);
    assert_eq!(value.get("int"), Value::from(-5));
    assert!(matches!(value.get("big"), Value::Number(Number::Double(_))));
    assert_eq!(value.get("array").at(1).at(0), Value::from(2));
    // `u64::MAX` doesn't survive the conversion to a double
    let mut expected = variant.clone();
    expected["big"] = json!(18_446_744_073_709_551_615f64);
    assert_eq!(value.to_variant(), expected);
  }

  #[test]
  fn lossy() {
    assert_eq!(Value::Undefined.to_variant(), Variant::Null);
    assert_eq!(Value::from(f64::NAN).to_variant(), Variant::Null);
    assert_eq!(
      Value::String(JsonString::from_utf16(&[0xd800])).to_variant(),
      Variant::String(String::from("\u{fffd}"))
    );
    assert_eq!(Document::from_variant(&json!(1)), Document::new());
    assert_eq!(Document::new().to_variant(), Variant::Null);
  }
}
