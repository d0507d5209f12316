use alloc::{string::String, vec::Vec};

use crate::{
  ObjectKey, Value, Array, Object, Stack, DefaultStack, JsonFormat, ParseError,
  binary::{self, DataValidation},
  container::Container,
  parser, writer,
};

#[derive(Clone, Default, PartialEq, Debug)]
enum Root {
  #[default]
  Null,
  Array(Array),
  Object(Object),
}

/// A JSON document, whose root is an array or an object.
///
/// A document may also be null, which is distinct from a document holding an empty array or an
/// empty object.
#[derive(Clone, Default, PartialEq, Debug)]
pub struct Document {
  root: Root,
}

impl Document {
  /// Create a null document.
  pub fn new() -> Self {
    Self::default()
  }

  pub(crate) fn container(&self) -> Option<&Container> {
    match &self.root {
      Root::Null => None,
      Root::Array(array) => Some(array.container().as_ref()),
      Root::Object(object) => Some(object.container().as_ref()),
    }
  }

  /// Parse a document from JSON, bounding the depth to `DEFAULT_MAX_DEPTH`.
  ///
  /// The root must be an array or an object. A leading UTF-8 byte-order mark is skipped. Duplicate
  /// keys within an object keep the value of their last occurrence.
  pub fn from_json(json: &[u8]) -> Result<Self, ParseError> {
    Self::from_json_with_stack::<DefaultStack>(json)
  }

  /// Parse a document from JSON, using `S` to bound the depth.
  pub fn from_json_with_stack<S: Stack>(json: &[u8]) -> Result<Self, ParseError> {
    parser::parse::<S>(json)
  }

  /// Write this document as JSON.
  ///
  /// A null document is written as an empty string.
  pub fn to_json(&self, format: JsonFormat) -> String {
    self.container().map(|container| writer::to_json(container, format)).unwrap_or_default()
  }

  /// Encode this document with the binary format.
  ///
  /// Returns an empty `Vec` for null documents and documents too large to be encoded. Use
  /// `binary::encode` to distinguish the two.
  pub fn to_binary_data(&self) -> Vec<u8> {
    binary::encode(self).unwrap_or_default()
  }

  /// Decode a document from the binary format.
  ///
  /// Returns a null document if the data is invalid. Use `binary::decode` to learn why.
  pub fn from_binary_data(data: &[u8]) -> Self {
    Self::from_raw_data(data, DataValidation::Validate)
  }

  /// Decode a document from the binary format, with the specified validation.
  ///
  /// The data is only borrowed while decoding. Returns a null document if the data is invalid.
  pub fn from_raw_data(data: &[u8], validation: DataValidation) -> Self {
    binary::decode(data, validation).unwrap_or_default()
  }

  /// If this document's root is an array.
  pub fn is_array(&self) -> bool {
    matches!(self.root, Root::Array(_))
  }

  /// If this document's root is an object.
  pub fn is_object(&self) -> bool {
    matches!(self.root, Root::Object(_))
  }

  /// If this document is null.
  pub fn is_null(&self) -> bool {
    matches!(self.root, Root::Null)
  }

  /// If this document is null.
  ///
  /// A document holding an empty array or object is not empty.
  pub fn is_empty(&self) -> bool {
    self.is_null()
  }

  /// The root array, or an empty array if the root isn't an array.
  pub fn array(&self) -> Array {
    match &self.root {
      Root::Array(array) => array.clone(),
      _ => Array::new(),
    }
  }

  /// The root object, or an empty object if the root isn't an object.
  pub fn object(&self) -> Object {
    match &self.root {
      Root::Object(object) => object.clone(),
      _ => Object::new(),
    }
  }

  /// Set the root to an array.
  pub fn set_array(&mut self, array: Array) {
    self.root = Root::Array(array);
  }

  /// Set the root to an object.
  pub fn set_object(&mut self, object: Object) {
    self.root = Root::Object(object);
  }

  /// Take the root as a value, leaving this document null.
  ///
  /// Returns `Value::Null` if this document was null.
  pub fn take(&mut self) -> Value {
    match core::mem::take(&mut self.root) {
      Root::Null => Value::Null,
      Root::Array(array) => Value::Array(array),
      Root::Object(object) => Value::Object(object),
    }
  }

  /// The value of a field within the root object.
  ///
  /// Returns `Value::Undefined` if the root isn't an object or lacks this key.
  pub fn get(&self, key: &(impl ObjectKey + ?Sized)) -> Value {
    match &self.root {
      Root::Object(object) => object.value(key),
      _ => Value::Undefined,
    }
  }

  /// The `i`-th value within the root array.
  ///
  /// Returns `Value::Undefined` if the root isn't an array or `i` is out of bounds.
  pub fn at(&self, i: usize) -> Value {
    match &self.root {
      Root::Array(array) => array.at(i),
      _ => Value::Undefined,
    }
  }
}

impl From<Array> for Document {
  fn from(array: Array) -> Self {
    Document { root: Root::Array(array) }
  }
}

impl From<Object> for Document {
  fn from(object: Object) -> Self {
    Document { root: Root::Object(object) }
  }
}

#[test]
fn roots() {
  let mut document = Document::new();
  assert!(document.is_null() && document.is_empty());
  assert_eq!(document.to_json(JsonFormat::Compact), "");
  assert_eq!(document.take(), Value::Null);

  document.set_array(Array::new());
  assert!(document.is_array() && !document.is_empty());
  assert_ne!(document, Document::new());
  assert_ne!(document, Document::from(Object::new()));
  assert_eq!(document.to_json(JsonFormat::Compact), "[]");
  assert_eq!(document.get("key"), Value::Undefined);

  document.set_object(Object::from_iter([("key", 1)]));
  assert!(document.is_object());
  assert!(document.array().is_empty());
  assert_eq!(document.get("key"), Value::from(1));
  assert_eq!(document.at(0), Value::Undefined);
  assert_eq!(document.take(), Value::Object(Object::from_iter([("key", 1)])));
  assert!(document.is_null());
}
