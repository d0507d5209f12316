use core::fmt;
use alloc::sync::Arc;

use crate::{
  JsonString, Type, Value,
  container::{Container, make_mut},
};

#[derive(Clone, Debug)]
enum Slot {
  /// The `i`-th entry of the container.
  Index(usize),
  /// A key not present within the object.
  Phantom(JsonString),
}

/// A mutable reference to a slot within an array or object.
///
/// Assigning through this reference writes into the container, copying the container first if it's
/// shared. A reference to a missing key reads as `Value::Undefined` and inserts the key when a
/// defined value is assigned.
pub struct ValueRef<'a> {
  container: &'a mut Arc<Container>,
  slot: Slot,
}

impl<'a> ValueRef<'a> {
  pub(crate) fn index(container: &'a mut Arc<Container>, i: usize) -> Self {
    ValueRef { container, slot: Slot::Index(i) }
  }

  /// A reference to the field with this key, which is a phantom if the key is missing.
  pub(crate) fn key(container: &'a mut Arc<Container>, key: JsonString) -> Self {
    let slot = match container.find_key(&key) {
      Ok(i) => Slot::Index(i),
      Err(_) => Slot::Phantom(key),
    };
    ValueRef { container, slot }
  }

  /// If this references a key not present within the object.
  pub fn is_phantom(&self) -> bool {
    matches!(self.slot, Slot::Phantom(_))
  }

  /// The key of the referenced field, if this references a field within an object.
  pub fn key_name(&self) -> Option<JsonString> {
    match &self.slot {
      Slot::Index(i) => self.container.key_at(*i),
      Slot::Phantom(key) => Some(key.clone()),
    }
  }

  /// The current value.
  ///
  /// Phantoms and out-of-bounds indexes read as `Value::Undefined`.
  pub fn get(&self) -> Value {
    match &self.slot {
      Slot::Index(i) => self.container.value_at(*i),
      Slot::Phantom(_) => Value::Undefined,
    }
  }

  /// The type of the current value.
  pub fn kind(&self) -> Type {
    self.get().kind()
  }

  /// Assign a value.
  ///
  /// Within an array, an undefined value stores `null` and an out-of-bounds index is ignored. Within
  /// an object, an undefined value removes the field (leaving this a phantom) while assigning to a
  /// phantom inserts the field.
  pub fn set(&mut self, value: impl Into<Value>) {
    let value = value.into();
    let is_object = self.container.is_object();
    match &self.slot {
      Slot::Index(i) => {
        let i = *i;
        if i >= self.container.len() {
          return;
        }
        if is_object && value.is_undefined() {
          let key = self.container.key_at(i).unwrap_or_default();
          make_mut(self.container, 0).remove(i);
          self.slot = Slot::Phantom(key);
          return;
        }
        make_mut(self.container, 0).replace(i, &value);
      }
      Slot::Phantom(key) => {
        if value.is_undefined() {
          return;
        }
        let slot = match self.container.find_key(key) {
          Ok(i) => {
            make_mut(self.container, 0).replace(i, &value);
            i
          }
          Err(i) => {
            make_mut(self.container, 1).insert_field(i, key.as_utf16(), &value);
            i
          }
        };
        self.slot = Slot::Index(slot);
      }
    }
  }

  /// Remove the referenced entry, returning its value.
  ///
  /// Removing a field from an object leaves this reference as a phantom for its key. Removing a
  /// value from an array shifts the following values down, leaving this referencing the next one.
  pub fn take(&mut self) -> Value {
    let Slot::Index(i) = self.slot else { return Value::Undefined };
    if i >= self.container.len() {
      return Value::Undefined;
    }
    let key = self.container.key_at(i);
    let value = make_mut(self.container, 0).remove(i);
    if let Some(key) = key {
      self.slot = Slot::Phantom(key);
    }
    value
  }
}

impl fmt::Debug for ValueRef<'_> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("ValueRef").field("slot", &self.slot).field("value", &self.get()).finish()
  }
}

impl PartialEq<Value> for ValueRef<'_> {
  fn eq(&self, other: &Value) -> bool {
    self.get() == *other
  }
}
