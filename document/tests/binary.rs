use core_json_document::{
  Array, Document, JsonFormat, Object, Value, JsonString,
  binary::{self, BinaryError, DataValidation},
};

use test_case::test_case;

fn document() -> Document {
  Document::from_json(
    br#"{
      "name": "a reasonably long string which is stored out-of-line",
      "short": "abc",
      "unicode": "\u00e9\ud83d\ude00",
      "lone": "\udc00",
      "numbers": [0, -1, 134217727, 134217728, -134217728, -134217729, 9223372036854775807, 0.25],
      "flags": [true, false, null],
      "nested": { "deeper": { "deepest": [[], {}] } }
    }"#,
  )
  .unwrap()
}

#[test]
fn round_trip() {
  let document = document();
  let binary = document.to_binary_data();
  assert!(!binary.is_empty());
  let decoded = Document::from_binary_data(&binary);
  assert_eq!(decoded, document);
  assert_eq!(decoded.to_json(JsonFormat::Compact), document.to_json(JsonFormat::Compact));
  assert_eq!(decoded.get("lone").as_json_string(), Some(&JsonString::from_utf16(&[0xdc00])));
  assert_eq!(Document::from_raw_data(&binary, DataValidation::BypassValidation), document);
}

#[test_case(Document::new(); "null")]
#[test_case(Document::from(Array::new()); "empty array")]
#[test_case(Document::from(Object::new()); "empty object")]
fn trivial_documents(document: Document) {
  let binary = document.to_binary_data();
  assert_eq!(binary.is_empty(), document.is_null());
  assert_eq!(Document::from_binary_data(&binary), document);
}

#[test]
fn truncation() {
  let binary = document().to_binary_data();
  for len in 0 .. binary.len() {
    assert!(binary::decode(&binary[.. len], DataValidation::Validate).is_err());
    assert!(Document::from_binary_data(&binary[.. len]).is_null());
  }
}

#[test]
fn single_byte_corruption() {
  let document = document();
  let binary = document.to_binary_data();
  for i in 0 .. binary.len() {
    for flip in [0x01, 0x10, 0x80, 0xff] {
      let mut corrupted = binary.clone();
      corrupted[i] ^= flip;
      // Either rejected or decoded into some document, without panicking
      if let Ok(decoded) = binary::decode(&corrupted, DataValidation::Validate) {
        let json = decoded.to_json(JsonFormat::Compact);
        let reencoded = Document::from_binary_data(&decoded.to_binary_data());
        assert_eq!(reencoded.to_json(JsonFormat::Compact), json);
      }
    }
  }
}

#[test]
fn depth() {
  let mut value = Value::Array(Array::new());
  for _ in 0 .. binary::MAX_DEPTH {
    value = Value::Array(Array::from_iter([value]));
  }
  let document = Document::from(value.to_array());
  assert_eq!(binary::encode(&document), Err(BinaryError::TooDeep));
  assert!(document.to_binary_data().is_empty());
}

/// Binary data for `levels` nested arrays, each holding the next, the innermost being empty.
fn nested_arrays(levels: usize) -> Vec<u8> {
  const ARRAY_AT_DATA_START: u32 = 4 | ((12 / 4) << 4);
  let size = |level: usize| 12 + (16 * (levels - 1 - level));

  let mut data = Vec::from(*b"cjdb");
  data.extend_from_slice(&1u32.to_le_bytes());
  for level in 0 .. levels {
    let innermost = level == (levels - 1);
    let (header, table_offset) = if innermost { (0, 12) } else { (1 << 1, 12 + size(level + 1)) };
    for field in [size(level), header, table_offset] {
      data.extend_from_slice(&u32::try_from(field).unwrap().to_le_bytes());
    }
  }
  for _ in 1 .. levels {
    data.extend_from_slice(&ARRAY_AT_DATA_START.to_le_bytes());
  }
  data
}

#[test]
fn deepest_document() {
  let deepest = nested_arrays(binary::MAX_DEPTH);
  let document = binary::decode(&deepest, DataValidation::Validate).unwrap();
  let json = document.to_json(JsonFormat::Compact);
  assert_eq!(json.len(), 2 * binary::MAX_DEPTH);
  assert!(json.starts_with("[[[") && json.ends_with("]]]"));
  assert_eq!(binary::encode(&document).unwrap(), deepest);
  assert_eq!(Document::from_json(json.as_bytes()).unwrap(), document);

  assert_eq!(
    binary::decode(&nested_arrays(binary::MAX_DEPTH + 1), DataValidation::Validate),
    Err(BinaryError::TooDeep)
  );
}
