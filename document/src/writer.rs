use alloc::{string::String, vec::Vec};

use crate::{
  ObjectKey,
  number::{Number, write_double},
  string::push_unicode_escape,
  container::{Container, Element},
};

/// The format to write JSON with.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub enum JsonFormat {
  /// Four spaces of indentation per level, with one value or field per line.
  #[default]
  Indented,
  /// No whitespace.
  Compact,
}

struct Writer {
  out: String,
  compact: bool,
}

impl Writer {
  fn indent(&mut self, depth: usize) {
    if !self.compact {
      for _ in 0 .. (4 * depth) {
        self.out.push(' ');
      }
    }
  }

  fn newline(&mut self) {
    if !self.compact {
      self.out.push('\n');
    }
  }

  /// Write a string, escaping as needed.
  ///
  /// Non-ASCII characters are written as-is. Unpaired surrogates are escaped as `\uXXXX`.
  fn string(&mut self, units: impl Iterator<Item = u16>) {
    self.out.push('"');
    for c in char::decode_utf16(units) {
      match c {
        Ok('"') => self.out.push_str("\\\""),
        Ok('\\') => self.out.push_str("\\\\"),
        Ok('\u{8}') => self.out.push_str("\\b"),
        Ok('\u{c}') => self.out.push_str("\\f"),
        Ok('\n') => self.out.push_str("\\n"),
        Ok('\r') => self.out.push_str("\\r"),
        Ok('\t') => self.out.push_str("\\t"),
        // Control characters, which fit within a unit
        Ok(c @ '\u{0}' ..= '\u{1f}') => {
          push_unicode_escape(&mut self.out, u16::from(u8::try_from(c).unwrap_or(0)))
        }
        Ok(c) => self.out.push(c),
        Err(e) => push_unicode_escape(&mut self.out, e.unpaired_surrogate()),
      }
    }
    self.out.push('"');
  }

  /// Write an element which isn't a container.
  fn scalar(&mut self, container: &Container, element: &Element) {
    match element {
      Element::Null | Element::Container(_) => self.out.push_str("null"),
      Element::Bool(true) => self.out.push_str("true"),
      Element::Bool(false) => self.out.push_str("false"),
      Element::Integer(i) => Number::Integer(*i).write(&mut self.out),
      Element::Double(d) => write_double(&mut self.out, *d),
      Element::Inline { .. } | Element::Data { .. } => {
        if let Some(view) = container.string_view(element) {
          self.string(view.utf16_units());
        }
      }
    }
  }

  fn open(&mut self, container: &Container) {
    self.out.push(if container.is_object() { '{' } else { '[' });
    self.newline();
  }

  /// Close a container whose opening bracket is at `depth`.
  fn close(&mut self, container: &Container, depth: usize) {
    if container.len() != 0 {
      self.newline();
    }
    self.indent(depth);
    self.out.push(if container.is_object() { '}' } else { ']' });
  }
}

/// A container being written, and the index of the next entry to write.
struct Level<'a> {
  container: &'a Container,
  next: usize,
}

/// Write a container as the root of a document.
///
/// Nested containers are tracked with an explicit stack, so any depth may be written.
pub(crate) fn to_json(root: &Container, format: JsonFormat) -> String {
  let compact = format == JsonFormat::Compact;
  let mut writer = Writer { out: String::new(), compact };
  let separator = if compact { ":" } else { ": " };

  writer.open(root);
  let mut levels = Vec::from([Level { container: root, next: 0 }]);
  loop {
    // The entries of the innermost container are at this depth
    let depth = levels.len();
    let Some(level) = levels.last_mut() else { break };
    let container = level.container;
    let i = level.next;
    if i == container.len() {
      levels.pop();
      writer.close(container, depth - 1);
      continue;
    }
    level.next += 1;

    if i != 0 {
      writer.out.push(',');
      writer.newline();
    }
    writer.indent(depth);
    let elements = container.elements();
    let value = if container.is_object() {
      writer.scalar(container, &elements[2 * i]);
      writer.out.push_str(separator);
      &elements[(2 * i) + 1]
    } else {
      &elements[i]
    };
    match value {
      Element::Container(nested) => {
        writer.open(nested);
        levels.push(Level { container: nested, next: 0 });
      }
      scalar => writer.scalar(container, scalar),
    }
  }
  writer.newline();
  writer.out
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{Array, Object, Value, JsonString};

  fn write(value: impl Into<Value>, format: JsonFormat) -> String {
    match value.into() {
      Value::Array(array) => to_json(array.container(), format),
      Value::Object(object) => to_json(object.container(), format),
      _ => panic!("documents only have arrays or objects as their roots"),
    }
  }

  #[test]
  fn compact() {
    let mut object = Object::new();
    object.insert("b", Array::from_strings(["x"]));
    object.insert("a", 1);
    object.insert("c", Object::new());
    object.insert("dd", Array::new());
    assert_eq!(write(object, JsonFormat::Compact), r#"{"a":1,"b":["x"],"c":{},"dd":[]}"#);
  }

  #[test]
  fn indented() {
    assert_eq!(write(Array::new(), JsonFormat::Indented), "[\n]\n");
    assert_eq!(write(Object::new(), JsonFormat::Indented), "{\n}\n");

    let mut object = Object::new();
    object.insert("a", Array::from_iter([Value::from(1), Value::Array(Array::new())]));
    object.insert("b", Value::Null);
    assert_eq!(
      write(object, JsonFormat::Indented),
      "{\n    \"a\": [\n        1,\n        [\n        ]\n    ],\n    \"b\": null\n}\n"
    );
  }

  #[test]
  fn escapes() {
    let mut units =
      "\"\\/\u{8}\u{c}\n\r\t\u{1}\u{1f}\u{7f}\u{e9}\u{1f600}".encode_utf16().collect::<Vec<_>>();
    units.push(0xdc00);
    units.push(0xd800);
    let array = Array::from_iter([JsonString::from(units)]);
    assert_eq!(
      write(array, JsonFormat::Compact),
      "[\"\\\"\\\\/\\b\\f\\n\\r\\t\\u0001\\u001f\u{7f}\u{e9}\u{1f600}\\udc00\\ud800\"]"
    );
  }

  #[test]
  fn deep() {
    let mut array = Array::new();
    for _ in 0 .. 100_000 {
      array = Array::from_iter([array]);
    }
    let json = write(array, JsonFormat::Compact);
    assert_eq!(json.len(), 2 * 100_001);
    assert!(json.starts_with("[[[") && json.ends_with("]]]"));
  }

  #[test]
  fn numbers() {
    let array = Array::from_iter([
      Value::from(1),
      Value::from(-1.5),
      Value::from(f64::NAN),
      Value::from(i64::MIN),
      Value::from(1e-7),
    ]);
    assert_eq!(write(array, JsonFormat::Compact), "[1,-1.5,null,-9223372036854775808,1e-07]");
  }
}
