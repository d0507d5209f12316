use core::{fmt, iter::FusedIterator};
use alloc::{sync::Arc, vec::Vec};

use crate::{
  Value, ValueRef,
  container::{Container, make_mut},
};

/// A JSON array.
///
/// Arrays share their storage until mutated, so cloning is cheap.
#[derive(Clone)]
pub struct Array {
  container: Arc<Container>,
}

impl Array {
  /// Create an empty array.
  pub fn new() -> Self {
    Array { container: Arc::new(Container::new(false)) }
  }

  pub(crate) fn from_container(container: Arc<Container>) -> Self {
    Array { container }
  }

  pub(crate) fn container(&self) -> &Arc<Container> {
    &self.container
  }

  /// Create an array of strings.
  pub fn from_strings<S: AsRef<str>>(strings: impl IntoIterator<Item = S>) -> Self {
    strings.into_iter().map(|s| Value::from(s.as_ref())).collect()
  }

  /// The amount of values within this array.
  pub fn len(&self) -> usize {
    self.container.len()
  }

  /// If this array is empty.
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// The `i`-th value, or `Value::Undefined` if out of bounds.
  pub fn at(&self, i: usize) -> Value {
    self.container.value_at(i)
  }

  /// The first value, or `Value::Undefined` if empty.
  pub fn first(&self) -> Value {
    self.at(0)
  }

  /// The last value, or `Value::Undefined` if empty.
  pub fn last(&self) -> Value {
    self.len().checked_sub(1).map_or(Value::Undefined, |i| self.at(i))
  }

  /// If this array contains a value equal to `value`.
  pub fn contains(&self, value: &Value) -> bool {
    self.iter().any(|existing| existing == *value)
  }

  /// A mutable reference to the `i`-th value.
  ///
  /// If `i` is out of bounds, the reference reads as `Value::Undefined` and ignores assignments.
  pub fn get_mut(&mut self, i: usize) -> ValueRef<'_> {
    ValueRef::index(&mut self.container, i)
  }

  /// Append a value.
  ///
  /// `Value::Undefined` is appended as `null`.
  pub fn append(&mut self, value: impl Into<Value>) {
    make_mut(&mut self.container, 1).append(&value.into());
  }

  /// Insert a value at the start of the array.
  pub fn prepend(&mut self, value: impl Into<Value>) {
    self.insert(0, value);
  }

  /// Insert a value at the specified index, shifting later values up.
  ///
  /// If `i > len`, the value is appended.
  pub fn insert(&mut self, i: usize, value: impl Into<Value>) {
    let i = i.min(self.len());
    make_mut(&mut self.container, 1).insert(i, &value.into());
  }

  /// Replace the `i`-th value.
  ///
  /// Does nothing if `i` is out of bounds.
  pub fn replace(&mut self, i: usize, value: impl Into<Value>) {
    if i >= self.len() {
      return;
    }
    make_mut(&mut self.container, 0).replace(i, &value.into());
  }

  /// Remove the `i`-th value, returning it.
  ///
  /// Returns `Value::Undefined` if `i` is out of bounds.
  pub fn take_at(&mut self, i: usize) -> Value {
    if i >= self.len() {
      return Value::Undefined;
    }
    make_mut(&mut self.container, 0).remove(i)
  }

  /// Remove the `i`-th value.
  ///
  /// Does nothing if `i` is out of bounds.
  pub fn remove_at(&mut self, i: usize) {
    self.take_at(i);
  }

  /// Remove the first value, returning it.
  ///
  /// Returns `Value::Undefined` if empty.
  pub fn take_first(&mut self) -> Value {
    self.take_at(0)
  }

  /// Remove the last value, returning it.
  ///
  /// Returns `Value::Undefined` if empty.
  pub fn take_last(&mut self) -> Value {
    self.len().checked_sub(1).map_or(Value::Undefined, |i| self.take_at(i))
  }

  /// Remove the first value.
  pub fn remove_first(&mut self) {
    self.remove_at(0);
  }

  /// Remove the last value.
  pub fn remove_last(&mut self) {
    self.take_last();
  }

  /// Remove every value.
  pub fn clear(&mut self) {
    if self.is_empty() {
      return;
    }
    match Arc::get_mut(&mut self.container) {
      Some(container) => container.clear(),
      None => self.container = Arc::new(Container::new(false)),
    }
  }

  /// Retain only the values for which the predicate returns true.
  pub fn retain(&mut self, mut f: impl FnMut(&Value) -> bool) {
    let mut i = 0;
    while i < self.len() {
      if f(&self.at(i)) {
        i += 1;
      } else {
        self.remove_at(i);
      }
    }
  }

  /// Iterate over the values.
  pub fn iter(&self) -> Iter<'_> {
    Iter { container: &self.container, front: 0, back: self.len() }
  }

  /// A cursor over the values, starting at the first, which may mutate the array as it moves.
  pub fn cursor_mut(&mut self) -> CursorMut<'_> {
    CursorMut { array: self, position: 0 }
  }

  /// Collect the values into a `Vec`.
  pub fn to_vec(&self) -> Vec<Value> {
    self.iter().collect()
  }
}

impl Default for Array {
  fn default() -> Self {
    Self::new()
  }
}

/// Arrays are equal if their values are.
impl PartialEq for Array {
  fn eq(&self, other: &Self) -> bool {
    Arc::ptr_eq(&self.container, &other.container) || (*self.container == *other.container)
  }
}

impl fmt::Debug for Array {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_list().entries(self.iter()).finish()
  }
}

impl<V: Into<Value>> FromIterator<V> for Array {
  fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
    Array::from_container(Arc::new(Container::array_from_values(iter.into_iter().map(Into::into))))
  }
}

impl<V: Into<Value>> Extend<V> for Array {
  fn extend<I: IntoIterator<Item = V>>(&mut self, iter: I) {
    let iter = iter.into_iter();
    let container = make_mut(&mut self.container, iter.size_hint().0);
    for value in iter {
      container.append(&value.into());
    }
  }
}

impl<'a> IntoIterator for &'a Array {
  type Item = Value;
  type IntoIter = Iter<'a>;
  fn into_iter(self) -> Iter<'a> {
    self.iter()
  }
}

/// An iterator over the values within an array.
#[derive(Clone, Debug)]
pub struct Iter<'a> {
  container: &'a Container,
  front: usize,
  back: usize,
}

impl Iterator for Iter<'_> {
  type Item = Value;

  fn next(&mut self) -> Option<Value> {
    if self.front == self.back {
      None?;
    }
    let value = self.container.value_at(self.front);
    self.front += 1;
    Some(value)
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    let len = self.back - self.front;
    (len, Some(len))
  }

  fn nth(&mut self, n: usize) -> Option<Value> {
    self.front = self.front.saturating_add(n).min(self.back);
    self.next()
  }
}

impl DoubleEndedIterator for Iter<'_> {
  fn next_back(&mut self) -> Option<Value> {
    if self.front == self.back {
      None?;
    }
    self.back -= 1;
    Some(self.container.value_at(self.back))
  }
}

impl ExactSizeIterator for Iter<'_> {}
impl FusedIterator for Iter<'_> {}

/// A cursor over the values within an array, able to mutate the array as it moves.
///
/// The cursor is positioned at a value, or at the end, past the last value.
#[derive(Debug)]
pub struct CursorMut<'a> {
  array: &'a mut Array,
  position: usize,
}

impl CursorMut<'_> {
  /// The index of the value the cursor is at.
  pub fn position(&self) -> usize {
    self.position
  }

  /// If the cursor is past the last value.
  pub fn is_end(&self) -> bool {
    self.position >= self.array.len()
  }

  /// The current value, or `Value::Undefined` at the end.
  pub fn get(&self) -> Value {
    self.array.at(self.position)
  }

  /// A mutable reference to the current value.
  ///
  /// At the end, the reference reads as `Value::Undefined` and ignores assignments.
  pub fn value_mut(&mut self) -> ValueRef<'_> {
    self.array.get_mut(self.position)
  }

  /// Replace the current value. Does nothing at the end.
  pub fn set(&mut self, value: impl Into<Value>) {
    self.array.replace(self.position, value);
  }

  /// Move to the next value, stopping at the end.
  pub fn move_next(&mut self) {
    self.position = (self.position + 1).min(self.array.len());
  }

  /// Move to the previous value, stopping at the first.
  pub fn move_prev(&mut self) {
    self.position = self.position.saturating_sub(1);
  }

  /// Move to the `i`-th value, or the end if `i` is out of bounds.
  pub fn seek(&mut self, i: usize) {
    self.position = i.min(self.array.len());
  }

  /// Insert a value before the current value, keeping the cursor at the current value.
  pub fn insert_before(&mut self, value: impl Into<Value>) {
    self.array.insert(self.position, value);
    self.position += 1;
  }

  /// Remove the current value, returning it and moving to the value which followed it.
  ///
  /// Returns `Value::Undefined` at the end.
  pub fn take(&mut self) -> Value {
    self.array.take_at(self.position)
  }

  /// A mutable reference to the current value, then moving to the next value.
  ///
  /// Returns `None` at the end.
  pub fn next_mut(&mut self) -> Option<ValueRef<'_>> {
    if self.is_end() {
      None?;
    }
    self.position += 1;
    Some(self.array.get_mut(self.position - 1))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn mutation() {
    let mut array = Array::new();
    array.append(1);
    array.append("two");
    array.prepend(0);
    array.insert(100, 3.5);
    array.append(Value::Undefined);
    assert_eq!(
      array.to_vec(),
      [Value::from(0), Value::from(1), Value::from("two"), Value::from(3.5), Value::Null]
    );

    array.replace(4, false);
    array.replace(5, true);
    assert_eq!(array.len(), 5);
    assert_eq!(array.last(), Value::from(false));

    assert_eq!(array.take_at(2), Value::from("two"));
    assert_eq!(array.take_at(9), Value::Undefined);
    array.remove_first();
    assert_eq!(array.take_last(), Value::from(false));
    assert_eq!(array.to_vec(), [Value::from(1), Value::from(3.5)]);
    assert!(array.contains(&Value::from(1.0)));

    array.retain(|value| value.as_i64().is_some());
    assert_eq!(array.len(), 1);
    array.clear();
    assert!(array.is_empty());
    assert_eq!(array.first(), Value::Undefined);
  }

  #[test]
  fn copies_are_independent() {
    let mut a = Array::from_strings(["x", "y"]);
    let b = a.clone();
    a.append("z");
    a.get_mut(0).set("changed");
    assert_eq!(b, Array::from_strings(["x", "y"]));
    assert_eq!(a, Array::from_strings(["changed", "y", "z"]));

    // Nested values read out are independent of their parent
    let mut outer = Array::new();
    outer.append(b.clone());
    let mut inner = outer.at(0).to_array();
    inner.append("w");
    assert_eq!(outer.at(0), Value::Array(b));
  }

  #[test]
  fn references() {
    let mut array: Array = [1, 2].into_iter().collect();
    let mut reference = array.get_mut(1);
    assert_eq!(reference.get(), Value::from(2));
    reference.set(Value::Undefined);
    assert_eq!(reference.get(), Value::Null);

    let mut out_of_bounds = array.get_mut(2);
    assert_eq!(out_of_bounds.get(), Value::Undefined);
    out_of_bounds.set(3);
    assert_eq!(array.len(), 2);
  }

  #[test]
  fn cursor() {
    let mut array: Array = (0 .. 5).collect();
    let shared = array.clone();

    let mut cursor = array.cursor_mut();
    while let Some(mut value) = cursor.next_mut() {
      let doubled = value.get().to_int(0) * 2;
      value.set(doubled);
    }
    assert!(cursor.is_end());
    assert_eq!(cursor.get(), Value::Undefined);
    assert!(cursor.next_mut().is_none());
    cursor.set(10);

    cursor.seek(1);
    assert_eq!(cursor.take(), Value::from(2));
    assert_eq!(cursor.get(), Value::from(4));
    cursor.insert_before("inserted");
    assert_eq!(cursor.position(), 2);
    cursor.value_mut().set(Value::Undefined);
    cursor.move_prev();
    cursor.move_prev();
    cursor.move_prev();
    assert_eq!(cursor.position(), 0);
    cursor.set(true);

    assert_eq!(
      array.to_vec(),
      [Value::from(true), Value::from("inserted"), Value::Null, Value::from(6), Value::from(8)]
    );
    // Copies taken before the cursor was created are unaffected
    assert_eq!(shared, (0 .. 5).collect::<Array>());
  }

  #[test]
  fn iteration() {
    let array: Array = (0 .. 5).collect();
    assert_eq!(array.iter().len(), 5);
    assert_eq!(array.iter().rev().next(), Some(Value::from(4)));
    assert_eq!(array.iter().nth(3), Some(Value::from(3)));
    assert_eq!(array.iter().nth(5), None);
    let mut iter = array.iter();
    iter.next();
    iter.next_back();
    assert_eq!(iter.collect::<Vec<_>>(), [Value::from(1), Value::from(2), Value::from(3)]);
  }
}
