use core_json_document::{
  Document, JsonFormat, ParseError, ParseErrorKind, State, Value, JsonString, BinaryError,
};

use test_case::test_case;

fn error(json: &str) -> ParseError {
  Document::from_json(json.as_bytes()).expect_err("parsed invalid JSON")
}

#[test_case("{\n    \n\n", ParseErrorKind::UnterminatedObject, 8; "unterminated object")]
#[test_case("[ false, ]", ParseErrorKind::MissingObject, 10; "trailing comma in array")]
#[test_case("{},", ParseErrorKind::GarbageAtEnd, 2; "garbage after document")]
#[test_case("\"string\"", ParseErrorKind::IllegalValue, 1; "scalar root")]
#[test_case("[1,,2]", ParseErrorKind::IllegalValue, 4; "empty array element")]
#[test_case("{\"a\":}", ParseErrorKind::MissingObject, 6; "missing field value")]
#[test_case("{1:2}", ParseErrorKind::UnterminatedObject, 2; "non-string key")]
#[test_case("[\"\\ud800", ParseErrorKind::UnterminatedString, 8; "unterminated string")]
#[test_case("[-]", ParseErrorKind::IllegalNumber, 2; "sign without digits")]
#[test_case("[1e]", ParseErrorKind::IllegalNumber, 3; "exponent without digits")]
#[test_case("[+1]", ParseErrorKind::IllegalValue, 2; "leading plus")]
fn errors(json: &str, kind: ParseErrorKind, offset: usize) {
  assert_eq!(error(json), ParseError { kind, offset });
}

#[test_case("{}    "; "trailing whitespace")]
#[test_case(" \t\r\n[ ] "; "surrounding whitespace")]
#[test_case("\u{feff}{}"; "byte-order mark")]
#[test_case("[[[[]]]]"; "nested arrays")]
#[test_case("{\"a\":{\"b\":{\"c\":[]}}}"; "nested objects")]
fn accepted(json: &str) {
  assert!(Document::from_json(json.as_bytes()).is_ok());
}

#[test]
fn duplicate_keys() {
  let document = Document::from_json(br#"{ "B": true, "A": null, "B": false }"#).unwrap();
  let object = document.object();
  assert_eq!(object.len(), 2);
  assert_eq!(object.value("A"), Value::Null);
  assert_eq!(object.value("B"), Value::Bool(false));
  assert_eq!(object.keys(), [JsonString::from("A"), JsonString::from("B")]);
}

#[test]
fn invalid_utf8() {
  assert_eq!(
    Document::from_json(b"[\"\xff\"]"),
    Err(ParseError { kind: ParseErrorKind::IllegalUTF8String, offset: 2 })
  );
  assert_eq!(
    Document::from_json(b"[\"\xed\xa0\x80\"]"),
    Err(ParseError { kind: ParseErrorKind::IllegalUTF8String, offset: 2 })
  );
}

#[test]
fn error_display() {
  assert_eq!(error("[1 2]").to_string(), "missing value separator (at offset 4)");
  assert_eq!(ParseError::default().kind, ParseErrorKind::NoError);
}

#[test]
fn round_trip() {
  // Shorter keys sort first
  let json = r#"{"key":"\ud83d","array":[true,false,null,-1,0.5,1e+100,"\u0000\"\\"],"nested":{"":[]}}"#;
  let document = Document::from_json(json.as_bytes()).unwrap();
  let compact = document.to_json(JsonFormat::Compact);
  assert_eq!(compact, json);
  assert_eq!(Document::from_json(compact.as_bytes()).unwrap(), document);

  let indented = document.to_json(JsonFormat::Indented);
  assert_eq!(Document::from_json(indented.as_bytes()).unwrap(), document);
}

#[test]
fn unbounded_depth() {
  let depth = 1_000_000;
  let mut json = "[".repeat(depth);
  json.push_str(&"]".repeat(depth));

  assert_eq!(
    Document::from_json(json.as_bytes()).unwrap_err().kind,
    ParseErrorKind::DeepNesting
  );
  let document = Document::from_json_with_stack::<Vec<State>>(json.as_bytes()).unwrap();
  assert_eq!(document.to_json(JsonFormat::Compact), json);
  let other = Document::from_json_with_stack::<Vec<State>>(json.as_bytes()).unwrap();
  assert!(document == other);
  assert_eq!(document.to_binary_data(), Vec::<u8>::new());
  assert_eq!(core_json_document::binary::encode(&document), Err(BinaryError::TooDeep));
  drop(document);
  drop(other);
}
