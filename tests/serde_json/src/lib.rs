use core_json_document::{Document, Type};
use serde_json::Value;

/*
  Differential tests between `serde_json` and `core-json-document`. We iterate over every value
  within the `serde_json::Value`, descending to the corresponding value within the `Document` by
  its path, and compare the two.
*/

#[derive(Clone, Debug)]
enum PathElement {
  Field(String),
  Array(usize),
}

fn descend(document: &Document, path: &[PathElement]) -> core_json_document::Value {
  let mut value = match &path[0] {
    PathElement::Field(field) => document.get(field.as_str()),
    PathElement::Array(i) => document.at(*i),
  };
  for element in &path[1 ..] {
    value = match element {
      PathElement::Field(field) => value.get(field.as_str()),
      PathElement::Array(i) => value.at(*i),
    };
  }
  value
}

/// Check two floats are within 0.1% of the smaller number.
pub fn check_float(number: f64, expected: f64) {
  let allowed_deviation = number.abs().min(expected.abs()) / 1000.0;
  assert!((number - expected).abs() <= allowed_deviation, "{number} != {expected}");
}

fn check_number(found: &core_json_document::Value, expected: &serde_json::Number) {
  assert_eq!(found.kind(), Type::Double);
  if let Some(expected) = expected.as_i64() {
    assert_eq!(found.as_i64(), Some(expected));
  } else if let Some(expected) = expected.as_f64() {
    check_float(found.to_double(f64::NAN), expected);
  }
}

fn check_value_internal(document: &Document, value: &Value, path: &mut Vec<PathElement>) {
  let found = descend(document, path);
  match value {
    Value::Null => assert_eq!(found.kind(), Type::Null),
    Value::Bool(b) => assert_eq!(found.as_bool(), Some(*b)),
    Value::Number(number) => check_number(&found, number),
    Value::String(string) => {
      assert_eq!(found.as_json_string().and_then(|s| s.to_string_checked()).as_ref(), Some(string))
    }
    Value::Array(array) => {
      assert_eq!(found.kind(), Type::Array);
      assert_eq!(found.to_array().len(), array.len());
      for (i, value) in array.iter().enumerate() {
        path.push(PathElement::Array(i));
        check_value_internal(document, value, path);
        path.pop();
      }
    }
    Value::Object(object) => {
      assert_eq!(found.kind(), Type::Object);
      assert_eq!(found.to_object().len(), object.len());
      for (field, value) in object {
        path.push(PathElement::Field(field.clone()));
        check_value_internal(document, value, path);
        path.pop();
      }
    }
  }
}

/// Check a document is equivalent to a `serde_json::Value`.
pub fn check_value(document: &Document, value: &Value) {
  match value {
    Value::Array(array) => {
      assert!(document.is_array());
      assert_eq!(document.array().len(), array.len());
      for (i, value) in array.iter().enumerate() {
        check_value_internal(document, value, &mut vec![PathElement::Array(i)]);
      }
    }
    Value::Object(object) => {
      assert!(document.is_object());
      assert_eq!(document.object().len(), object.len());
      for (field, value) in object {
        check_value_internal(document, value, &mut vec![PathElement::Field(field.clone())]);
      }
    }
    _ => assert!(document.is_null()),
  }
}

#[cfg(test)]
mod tests {
  use rand_core::{RngCore, OsRng};
  use core_json_document::{JsonFormat, binary};
  use super::*;

  #[allow(clippy::cast_possible_truncation)]
  fn random_string() -> String {
    let mut res = String::new();
    for _ in 0 .. (OsRng.next_u64() % 128) {
      if (OsRng.next_u64() % 2) == 1 {
        // ASCII
        res.push(char::from_u32((OsRng.next_u64() % 128) as u32).unwrap());
      } else {
        // Unicode
        res.push(loop {
          if let Some(char) = char::from_u32(OsRng.next_u64() as u32) {
            // Skip ASCII as those are intended to be included by the other branch
            // Skip the byte-order mark as implementations are allowed to ignore/reject it
            if char.is_ascii() || (char == '\u{feff}') {
              continue;
            }
            break char;
          }
        });
      }
    }
    res
  }

  fn random_value(depth: usize) -> Value {
    let modulus = if depth == 8 { 4 } else { 6 };
    match OsRng.next_u64() % modulus {
      0 => Value::Null,
      1 => Value::Bool((OsRng.next_u64() % 2) == 1),
      2 => Value::Number(match OsRng.next_u64() % 3 {
        0 => serde_json::Number::from(OsRng.next_u64() >> 1),
        #[allow(clippy::cast_possible_wrap)]
        1 => serde_json::Number::from((OsRng.next_u64() as i64).min(-1)),
        2 => loop {
          if let Some(float) = serde_json::Number::from_f64(f64::from_bits(OsRng.next_u64())) {
            break float;
          }
        },
        _ => unreachable!(),
      }),
      3 => Value::String(random_string()),
      4 => Value::Array({
        let mut res = vec![];
        for _ in 0 .. (OsRng.next_u64() % 8) {
          res.push(random_value(depth + 1));
        }
        res
      }),
      5 => Value::Object({
        let mut res = serde_json::Map::new();
        for _ in 0 .. (OsRng.next_u64() % 8) {
          res.insert(random_string(), random_value(depth + 1));
        }
        res
      }),
      _ => unreachable!(),
    }
  }

  fn random_document_value() -> Value {
    loop {
      let value = random_value(0);
      if matches!(value, Value::Object(_) | Value::Array(_)) {
        break value;
      }
    }
  }

  fn check_values_equivalent(a: &Value, b: &Value) {
    match a {
      Value::Null | Value::Bool(_) | Value::String(_) => assert_eq!(a, b),
      Value::Number(number) => {
        check_float(number.as_f64().unwrap(), b.as_number().unwrap().as_f64().unwrap());
      }
      Value::Array(array) => {
        let b = b.as_array().unwrap();
        assert_eq!(array.len(), b.len());
        for (a, b) in array.iter().zip(b) {
          check_values_equivalent(a, b);
        }
      }
      Value::Object(object) => {
        let b = b.as_object().unwrap();
        assert_eq!(object.len(), b.len());
        for (key, value) in object {
          check_values_equivalent(value, &b[key]);
        }
      }
    }
  }

  #[test]
  fn fuzz() {
    for i in 0 .. 100 {
      dbg!(i);
      let value = dbg!(random_document_value());
      let bytes = value.to_string().into_bytes();

      // Parse what `serde_json` wrote
      let document = Document::from_json(&bytes).unwrap();
      check_value(&document, &value);

      // Have `serde_json` parse what we wrote, in both formats
      for format in [JsonFormat::Compact, JsonFormat::Indented] {
        let written = document.to_json(format);
        check_values_equivalent(&value, &serde_json::from_str(&written).unwrap());
        assert_eq!(Document::from_json(written.as_bytes()).unwrap(), document);
      }

      // The variant boundary agrees with parsing
      assert_eq!(Document::from_variant(&value), document);
      check_values_equivalent(&value, &document.to_variant());

      // And the binary format round-trips
      let binary = document.to_binary_data();
      assert_eq!(Document::from_binary_data(&binary), document);
    }
  }

  #[test]
  fn binary_corruption() {
    for _ in 0 .. 10 {
      let document = Document::from_variant(&random_document_value());
      let binary = document.to_binary_data();
      for _ in 0 .. 1000 {
        let mut corrupted = binary.clone();
        let i = usize::try_from(OsRng.next_u64()).unwrap() % corrupted.len();
        corrupted[i] ^= u8::try_from((OsRng.next_u64() % 255) + 1).unwrap();
        // This must not panic, nor take time disproportionate to the length
        if let Ok(decoded) =
          binary::decode(&corrupted, core_json_document::DataValidation::Validate)
        {
          let json = decoded.to_json(JsonFormat::Compact);
          let reencoded = Document::from_binary_data(&decoded.to_binary_data());
          assert_eq!(reencoded.to_json(JsonFormat::Compact), json);
        }
      }
    }
  }
}
