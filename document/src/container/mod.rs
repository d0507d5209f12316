use core::cmp::Ordering;
use alloc::{sync::Arc, vec::Vec};

use crate::{JsonString, ObjectKey, Number, Value, Array, Object, string::compare_keys};

mod element;
pub(crate) use element::{Element, StrView, INLINE_STRING_CAPACITY};

/// The minimum amount of unreferenced bytes within a data region before it's compacted.
pub(crate) const COMPACTION_MIN_WASTE: usize = 256;

/// The storage shared by arrays, objects, and documents.
///
/// Elements are kept within a table. Objects interleave their keys and values, the key for the
/// `i`-th field being at `2 * i` and its value at `2 * i + 1`, with the fields sorted by their key
/// (per `compare_keys`) and without duplicates. Strings which can't be stored inline are kept
/// within a byte region, which is only appended to. Bytes no longer referenced by any element are
/// tracked so the region can be compacted once they're a sufficient portion of it.
///
/// Containers are shared behind an `Arc`. Mutations first call `make_mut`, copying the container
/// if it's shared, so mutations never affect other holders. Nested containers are held by `Arc`,
/// so copying a container does not copy its descendants.
#[derive(Debug, Default)]
pub(crate) struct Container {
  is_object: bool,
  elements: Vec<Element>,
  data: Vec<u8>,
  wasted: usize,
}

/// Ensure the container is exclusively owned, copying it if it's shared.
///
/// `reserve` is the amount of elements the caller is about to add. Returns if a copy was made.
pub(crate) fn detach(container: &mut Arc<Container>, reserve: usize) -> bool {
  if let Some(container) = Arc::get_mut(container) {
    container.elements.reserve(reserve);
    return false;
  }
  *container = Arc::new(container.compacted(reserve));
  true
}

/// Obtain a mutable reference to the container, copying it if it's shared.
#[inline(always)]
pub(crate) fn make_mut(container: &mut Arc<Container>, reserve: usize) -> &mut Container {
  detach(container, reserve);
  // Having just been detached, this will not clone
  Arc::make_mut(container)
}

impl Clone for Container {
  fn clone(&self) -> Self {
    self.compacted(0)
  }
}

impl Container {
  /// Create an empty container.
  pub(crate) fn new(is_object: bool) -> Self {
    Container { is_object, elements: Vec::new(), data: Vec::new(), wasted: 0 }
  }

  /// Create an array from its values.
  pub(crate) fn array_from_values(values: impl IntoIterator<Item = Value>) -> Self {
    let values = values.into_iter();
    let mut container = Container::new(false);
    container.elements.reserve(values.size_hint().0);
    for value in values {
      let element = container.store(&value);
      container.elements.push(element);
    }
    container
  }

  /// Create an object from its fields.
  ///
  /// The fields do not have to be sorted. If a key occurs multiple times, the last occurrence is
  /// kept. Fields with undefined values are omitted.
  pub(crate) fn object_from_pairs(mut pairs: Vec<(JsonString, Value)>) -> Self {
    // This sort is stable, so the last occurrence of a key is also last within its run
    pairs.sort_by(|(a, _), (b, _)| compare_keys(a, b));

    let mut container = Container::new(true);
    container.elements.reserve(2 * pairs.len());
    let mut pairs = pairs.into_iter().peekable();
    while let Some((key, value)) = pairs.next() {
      if pairs.peek().is_some_and(|(next, _)| *next == key) {
        continue;
      }
      if value.is_undefined() {
        continue;
      }
      let key = container.store_string(key.as_utf16());
      let value = container.store(&value);
      container.elements.push(key);
      container.elements.push(value);
    }
    container
  }

  /// A copy of this container, with a freshly compacted data region.
  fn compacted(&self, reserve: usize) -> Self {
    let mut copy = Container {
      is_object: self.is_object,
      elements: Vec::with_capacity(self.elements.len() + reserve),
      data: Vec::with_capacity(self.data.len() - self.wasted),
      wasted: 0,
    };
    for element in &self.elements {
      let element = match element {
        Element::Data { offset, len, utf16 } => {
          let start = copy.data.len();
          copy.data.extend_from_slice(&self.data[*offset .. (*offset + element.data_len())]);
          Element::Data { offset: start, len: *len, utf16: *utf16 }
        }
        element => element.clone(),
      };
      copy.elements.push(element);
    }
    copy
  }

  /// Compact the data region if enough of it is unreferenced.
  fn maybe_compact(&mut self) {
    if (self.wasted >= COMPACTION_MIN_WASTE) && ((2 * self.wasted) >= self.data.len()) {
      *self = self.compacted(0);
    }
  }

  /// If this container is an object.
  #[inline(always)]
  pub(crate) fn is_object(&self) -> bool {
    self.is_object
  }

  /// The amount of elements per entry.
  #[inline(always)]
  fn stride(&self) -> usize {
    if self.is_object { 2 } else { 1 }
  }

  /// The amount of entries within this container (values for arrays, fields for objects).
  #[inline(always)]
  pub(crate) fn len(&self) -> usize {
    self.elements.len() / self.stride()
  }

  /// The raw elements, interleaved for objects.
  #[inline(always)]
  pub(crate) fn elements(&self) -> &[Element] {
    &self.elements
  }

  /// The index of the element holding the value for the `i`-th entry.
  #[inline(always)]
  fn value_slot(&self, i: usize) -> usize {
    if self.is_object { (2 * i) + 1 } else { i }
  }

  /// View the string held by an element of this container.
  pub(crate) fn string_view<'a>(&'a self, element: &'a Element) -> Option<StrView<'a>> {
    match element {
      Element::Inline { len, bytes } => Some(StrView::Ascii(&bytes[.. usize::from(*len)])),
      Element::Data { offset, utf16, .. } => {
        let bytes = &self.data[*offset .. (*offset + element.data_len())];
        Some(if *utf16 { StrView::Utf16Le(bytes) } else { StrView::Ascii(bytes) })
      }
      _ => None,
    }
  }

  /// Materialize an element of this container as a value.
  pub(crate) fn load(&self, element: &Element) -> Value {
    match element {
      Element::Null => Value::Null,
      Element::Bool(b) => Value::Bool(*b),
      Element::Integer(i) => Value::Number(Number::Integer(*i)),
      Element::Double(d) => Value::Number(Number::Double(*d)),
      Element::Inline { .. } | Element::Data { .. } => {
        Value::String(self.string_view(element).map(StrView::to_json_string).unwrap_or_default())
      }
      Element::Container(container) => {
        if container.is_object {
          Value::Object(Object::from_container(container.clone()))
        } else {
          Value::Array(Array::from_container(container.clone()))
        }
      }
    }
  }

  /// Store a string, appending it to the data region if it can't be stored inline.
  pub(crate) fn store_string(&mut self, units: &[u16]) -> Element {
    let ascii = units.iter().all(|unit| *unit < 0x80);
    if ascii && (units.len() <= INLINE_STRING_CAPACITY) {
      let mut bytes = [0; INLINE_STRING_CAPACITY];
      for (byte, unit) in bytes.iter_mut().zip(units) {
        // ASCII, so this is lossless
        *byte = unit.to_le_bytes()[0];
      }
      // `INLINE_STRING_CAPACITY` fits within a `u8`
      return Element::Inline { len: u8::try_from(units.len()).unwrap_or(0), bytes };
    }

    let offset = self.data.len();
    if ascii {
      self.data.extend(units.iter().map(|unit| unit.to_le_bytes()[0]));
    } else {
      self.data.extend(units.iter().flat_map(|unit| unit.to_le_bytes()));
    }
    Element::Data { offset, len: units.len(), utf16: !ascii }
  }

  /// Store a value as an element.
  ///
  /// Undefined values are stored as null.
  pub(crate) fn store(&mut self, value: &Value) -> Element {
    match value {
      Value::Null | Value::Undefined => Element::Null,
      Value::Bool(b) => Element::Bool(*b),
      Value::Number(Number::Integer(i)) => Element::Integer(*i),
      Value::Number(Number::Double(d)) => Element::Double(*d),
      Value::String(s) => self.store_string(s.as_utf16()),
      Value::Array(array) => Element::Container(array.container().clone()),
      Value::Object(object) => Element::Container(object.container().clone()),
    }
  }

  /// Note an element is no longer referenced.
  fn release(&mut self, element: &Element) {
    if let Element::Data { .. } = element {
      self.wasted += element.data_len();
    }
  }

  /// The value of the `i`-th entry, or `Value::Undefined` if out of bounds.
  pub(crate) fn value_at(&self, i: usize) -> Value {
    if i >= self.len() {
      return Value::Undefined;
    }
    self.load(&self.elements[self.value_slot(i)])
  }

  /// A view of the key of the `i`-th field.
  pub(crate) fn key_view_at(&self, i: usize) -> Option<StrView<'_>> {
    if !self.is_object {
      None?;
    }
    self.string_view(self.elements.get(2 * i)?)
  }

  /// The key of the `i`-th field.
  pub(crate) fn key_at(&self, i: usize) -> Option<JsonString> {
    self.key_view_at(i).map(StrView::to_json_string)
  }

  /// Find the field with the specified key.
  ///
  /// Returns `Ok` with the index of the field if present, or `Err` with the index a field with
  /// this key would be inserted at.
  pub(crate) fn find_key(&self, key: &(impl ObjectKey + ?Sized)) -> Result<usize, usize> {
    let mut low = 0;
    let mut high = self.len();
    while low < high {
      let mid = low + ((high - low) / 2);
      let Some(existing) = self.key_view_at(mid) else { return Err(low) };
      match compare_keys(&existing, key) {
        Ordering::Less => low = mid + 1,
        Ordering::Greater => high = mid,
        Ordering::Equal => return Ok(mid),
      }
    }
    Err(low)
  }

  /// Insert a value into an array at the specified index.
  ///
  /// The index must be `<= len`.
  pub(crate) fn insert(&mut self, i: usize, value: &Value) {
    let element = self.store(value);
    self.elements.insert(i, element);
  }

  /// Insert a field into an object at the specified index.
  ///
  /// The index must be the one returned by `find_key` for this key.
  pub(crate) fn insert_field(&mut self, i: usize, key: &[u16], value: &Value) {
    let key = self.store_string(key);
    let value = self.store(value);
    self.elements.splice((2 * i) .. (2 * i), [key, value]);
  }

  /// Append a value to an array.
  pub(crate) fn append(&mut self, value: &Value) {
    let element = self.store(value);
    self.elements.push(element);
  }

  /// Replace the value of the `i`-th entry.
  ///
  /// The index must be in bounds.
  pub(crate) fn replace(&mut self, i: usize, value: &Value) {
    let element = self.store(value);
    let slot = self.value_slot(i);
    let previous = core::mem::replace(&mut self.elements[slot], element);
    self.release(&previous);
    self.maybe_compact();
  }

  /// Remove the `i`-th entry, returning its value.
  ///
  /// The index must be in bounds.
  pub(crate) fn remove(&mut self, i: usize) -> Value {
    let value = self.value_at(i);
    let stride = self.stride();
    let start = stride * i;
    let removed = self.elements.drain(start .. (start + stride)).collect::<Vec<_>>();
    for element in &removed {
      self.release(element);
    }
    self.maybe_compact();
    value
  }

  /// Remove every entry.
  pub(crate) fn clear(&mut self) {
    self.elements.clear();
    self.data.clear();
    self.wasted = 0;
  }

  /// The amount of bytes within the data region no longer referenced.
  #[cfg(test)]
  pub(crate) fn wasted(&self) -> usize {
    self.wasted
  }
}

/// Containers are compared without recursing, so arbitrarily deep containers may be compared.
impl PartialEq for Container {
  fn eq(&self, other: &Self) -> bool {
    let mut pending = Vec::from([(self, other)]);
    while let Some((a, b)) = pending.pop() {
      if (a.is_object != b.is_object) || (a.elements.len() != b.elements.len()) {
        return false;
      }
      for (x, y) in a.elements.iter().zip(&b.elements) {
        let equal = match (x, y) {
          (Element::Container(x), Element::Container(y)) => {
            if !Arc::ptr_eq(x, y) {
              pending.push((&**x, &**y));
            }
            true
          }
          _ => match (a.string_view(x), b.string_view(y)) {
            (Some(x), Some(y)) => compare_keys(&x, &y) == Ordering::Equal,
            _ => a.load(x) == b.load(y),
          },
        };
        if !equal {
          return false;
        }
      }
    }
    true
  }
}

/// Nested containers are released without recursing, so arbitrarily deep containers may be
/// dropped.
impl Drop for Container {
  fn drop(&mut self) {
    fn release_nested(elements: &mut Vec<Element>, pending: &mut Vec<Container>) {
      for element in elements.drain(..) {
        if let Element::Container(nested) = element {
          // Shared containers are solely decremented
          if let Ok(nested) = Arc::try_unwrap(nested) {
            pending.push(nested);
          }
        }
      }
    }

    if !self.elements.iter().any(|element| matches!(element, Element::Container(_))) {
      return;
    }
    let mut pending = Vec::new();
    release_nested(&mut self.elements, &mut pending);
    while let Some(mut container) = pending.pop() {
      // Emptied here, so its own drop has nothing left to release
      release_nested(&mut container.elements, &mut pending);
    }
  }
}
