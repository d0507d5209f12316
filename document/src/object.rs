use core::{fmt, iter::FusedIterator};
use alloc::{sync::Arc, vec::Vec};

use crate::{
  JsonString, ObjectKey, Value, ValueRef,
  container::{Container, make_mut},
};

/// A JSON object.
///
/// Fields are kept sorted by key, shorter keys first and keys of equal length by their UTF-16 code
/// units. Keys are unique. Objects share their storage until mutated, so cloning is cheap.
#[derive(Clone)]
pub struct Object {
  container: Arc<Container>,
}

impl Object {
  /// Create an empty object.
  pub fn new() -> Self {
    Object { container: Arc::new(Container::new(true)) }
  }

  pub(crate) fn from_container(container: Arc<Container>) -> Self {
    Object { container }
  }

  pub(crate) fn container(&self) -> &Arc<Container> {
    &self.container
  }

  /// The amount of fields within this object.
  pub fn len(&self) -> usize {
    self.container.len()
  }

  /// If this object is empty.
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// The keys, in order.
  pub fn keys(&self) -> Vec<JsonString> {
    (0 .. self.len()).filter_map(|i| self.container.key_at(i)).collect()
  }

  /// The index of the field with this key.
  pub fn index_of(&self, key: &(impl ObjectKey + ?Sized)) -> Option<usize> {
    self.container.find_key(key).ok()
  }

  /// If this object has a field with this key.
  pub fn contains(&self, key: &(impl ObjectKey + ?Sized)) -> bool {
    self.index_of(key).is_some()
  }

  /// The value of the field with this key, or `Value::Undefined` if there is none.
  pub fn value(&self, key: &(impl ObjectKey + ?Sized)) -> Value {
    self.value_or(key, Value::Undefined)
  }

  /// The value of the field with this key, or `default` if there is none.
  pub fn value_or(&self, key: &(impl ObjectKey + ?Sized), default: Value) -> Value {
    match self.index_of(key) {
      Some(i) => self.container.value_at(i),
      None => default,
    }
  }

  /// The key of the `i`-th field.
  pub fn key_at(&self, i: usize) -> Option<JsonString> {
    self.container.key_at(i)
  }

  /// The value of the `i`-th field, or `Value::Undefined` if out of bounds.
  pub fn value_at(&self, i: usize) -> Value {
    self.container.value_at(i)
  }

  /// A mutable reference to the field with this key.
  ///
  /// If the key is missing, the reference reads as `Value::Undefined` and assigning a defined
  /// value to it inserts the field.
  pub fn entry(&mut self, key: impl Into<JsonString>) -> ValueRef<'_> {
    ValueRef::key(&mut self.container, key.into())
  }

  /// A mutable reference to the field with this key, if present.
  pub fn find_mut(&mut self, key: &(impl ObjectKey + ?Sized)) -> Option<ValueRef<'_>> {
    let i = self.index_of(key)?;
    Some(ValueRef::index(&mut self.container, i))
  }

  /// Insert a field, replacing the value of any existing field with this key.
  ///
  /// Inserting `Value::Undefined` removes the field.
  pub fn insert(&mut self, key: impl Into<JsonString>, value: impl Into<Value>) {
    let key = key.into();
    let value = value.into();
    if value.is_undefined() {
      self.remove(&key);
      return;
    }
    match self.container.find_key(&key) {
      Ok(i) => make_mut(&mut self.container, 0).replace(i, &value),
      Err(i) => make_mut(&mut self.container, 1).insert_field(i, key.as_utf16(), &value),
    }
  }

  /// Remove the field with this key, returning its value.
  ///
  /// Returns `Value::Undefined` if there is no such field.
  pub fn take(&mut self, key: &(impl ObjectKey + ?Sized)) -> Value {
    match self.index_of(key) {
      Some(i) => make_mut(&mut self.container, 0).remove(i),
      None => Value::Undefined,
    }
  }

  /// Remove the field with this key.
  pub fn remove(&mut self, key: &(impl ObjectKey + ?Sized)) {
    self.take(key);
  }

  /// Remove the `i`-th field.
  ///
  /// Does nothing if `i` is out of bounds.
  pub fn remove_at(&mut self, i: usize) {
    if i < self.len() {
      make_mut(&mut self.container, 0).remove(i);
    }
  }

  /// Retain only the fields for which the predicate returns true.
  pub fn retain(&mut self, mut f: impl FnMut(&JsonString, &Value) -> bool) {
    let mut i = 0;
    while i < self.len() {
      let key = self.key_at(i).unwrap_or_default();
      if f(&key, &self.value_at(i)) {
        i += 1;
      } else {
        self.remove_at(i);
      }
    }
  }

  /// Iterate over the fields, in order.
  pub fn iter(&self) -> Iter<'_> {
    Iter { container: &self.container, front: 0, back: self.len() }
  }

  /// Iterate over the values, in the order of their keys.
  pub fn values(&self) -> impl DoubleEndedIterator<Item = Value> + ExactSizeIterator + '_ {
    self.iter().map(|(_, value)| value)
  }
}

impl Default for Object {
  fn default() -> Self {
    Self::new()
  }
}

/// Objects are equal if they have the same keys with equal values.
impl PartialEq for Object {
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.container, &other.container) || (*self.container == *other.container)
  }
}

impl fmt::Debug for Object {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_map().entries(self.iter()).finish()
  }
}

/// Collect fields into an object.
///
/// If a key occurs multiple times, the last occurrence is kept.
impl<K: Into<JsonString>, V: Into<Value>> FromIterator<(K, V)> for Object {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    let pairs = iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect();
    Object::from_container(Arc::new(Container::object_from_pairs(pairs)))
  }
}

impl<'a> IntoIterator for &'a Object {
  type Item = (JsonString, Value);
  type IntoIter = Iter<'a>;
  fn into_iter(self) -> Iter<'a> {
    self.iter()
  }
}

/// An iterator over the fields within an object.
#[derive(Clone, Debug)]
pub struct Iter<'a> {
  container: &'a Container,
  front: usize,
  back: usize,
}

impl Iter<'_> {
  fn field(&self, i: usize) -> (JsonString, Value) {
    (self.container.key_at(i).unwrap_or_default(), self.container.value_at(i))
  }
}

impl Iterator for Iter<'_> {
  type Item = (JsonString, Value);

  fn next(&mut self) -> Option<Self::Item> {
    if self.front == self.back {
      None?;
    }
    let field = self.field(self.front);
    self.front += 1;
    Some(field)
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    let len = self.back - self.front;
    (len, Some(len))
  }

  fn nth(&mut self, n: usize) -> Option<Self::Item> {
    self.front = self.front.saturating_add(n).min(self.back);
    self.next()
  }
}

impl DoubleEndedIterator for Iter<'_> {
  fn next_back(&mut self) -> Option<Self::Item> {
    if self.front == self.back {
      None?;
    }
    self.back -= 1;
    Some(self.field(self.back))
  }
}

impl ExactSizeIterator for Iter<'_> {}
impl FusedIterator for Iter<'_> {}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn sorted_unique_keys() {
    let mut object = Object::new();
    object.insert("b", 1);
    object.insert("aa", 2);
    object.insert("a", 3);
    object.insert("b", 4);
    assert_eq!(object.len(), 3);
    assert_eq!(object.keys(), [JsonString::from("a"), JsonString::from("b"), JsonString::from("aa")]);
    assert_eq!(object.value("b"), Value::from(4));
    assert_eq!(object.value("missing"), Value::Undefined);
    assert_eq!(object.value_or("missing", Value::from(5)), Value::from(5));
    assert_eq!(object.index_of("aa"), Some(2));

    object.insert("a", Value::Undefined);
    assert!(!object.contains("a"));
    assert_eq!(object.take("b"), Value::from(4));
    assert_eq!(object.take("b"), Value::Undefined);
    object.remove_at(5);
    assert_eq!(object.len(), 1);
  }

  #[test]
  fn entries() {
    let mut object = Object::new();
    let mut entry = object.entry("key");
    assert!(entry.is_phantom());
    assert_eq!(entry.get(), Value::Undefined);
    // Assigning undefined to a phantom is a no-op
    entry.set(Value::Undefined);
    assert!(entry.is_phantom());
    entry.set(1);
    assert!(!entry.is_phantom());
    assert_eq!(entry.get(), Value::from(1));
    entry.set("one");
    assert_eq!(object.value("key"), Value::from("one"));

    let mut found = object.find_mut("key").expect("key was inserted");
    assert_eq!(found.key_name(), Some(JsonString::from("key")));
    found.set(Value::Undefined);
    assert!(found.is_phantom());
    assert!(object.is_empty());
    assert!(object.find_mut("key").is_none());
  }

  #[test]
  fn copies_are_independent() {
    let mut a: Object = [("x", 1), ("y", 2)].into_iter().collect();
    let b = a.clone();
    a.entry("x").set(10);
    a.remove("y");
    assert_eq!(b.value("x"), Value::from(1));
    assert_eq!(b.len(), 2);
    assert_eq!(a.iter().collect::<Vec<_>>(), [(JsonString::from("x"), Value::from(10))]);
  }

  #[test]
  fn equality_ignores_insertion_order() {
    let mut a = Object::new();
    a.insert("a", 1);
    a.insert("b", Object::new());
    let mut b = Object::new();
    b.insert("b", Object::new());
    b.insert("a", 1.0);
    assert_eq!(a, b);
    b.insert("c", Value::Null);
    assert_ne!(a, b);
  }

  #[test]
  fn retain() {
    let mut object: Object = (0 .. 10).map(|i| (alloc::format!("{i}"), i)).collect();
    object.retain(|_, value| (value.to_int(0) % 2) == 0);
    assert_eq!(object.len(), 5);
    assert_eq!(object.values().map(|value| value.to_int(-1)).collect::<Vec<_>>(), [0, 2, 4, 6, 8]);
  }
}
