use core_json_document::{Array, Document, JsonFormat, Object, Type, Value};

#[test]
fn documents_are_values() {
  let mut document = Document::from_json(br#"{"list": [1, 2], "flag": true}"#).unwrap();
  assert_eq!(document.get("list").kind(), Type::Array);
  assert_eq!(document.get("missing").kind(), Type::Undefined);

  // Mutating a copy leaves the document untouched
  let mut list = document.get("list").to_array();
  list.append(3);
  assert_eq!(document.get("list").to_array().len(), 2);

  let mut object = document.object();
  object.insert("list", list);
  object.entry("flag").set(Value::Undefined);
  assert_eq!(document.get("flag"), Value::Bool(true));
  document.set_object(object);
  assert_eq!(document.to_json(JsonFormat::Compact), r#"{"list":[1,2,3]}"#);
}

#[test]
fn nested_mutation() {
  let mut root = Object::new();
  root.insert("inner", Object::from_iter([("x", 1)]));

  let mut inner = root.value("inner").to_object();
  inner.entry("y").set(2);
  root.entry("inner").set(inner);

  assert_eq!(
    Document::from(root).to_json(JsonFormat::Indented),
    "{\n    \"inner\": {\n        \"x\": 1,\n        \"y\": 2\n    }\n}\n"
  );
}

#[test]
fn values_outlive_their_documents() {
  let value = {
    let document = Document::from_json(br#"[{"key": "value"}]"#).unwrap();
    document.at(0)
  };
  assert_eq!(value.get("key"), Value::from("value"));
}

#[test]
fn array_of_everything() {
  let array = Array::from_iter([
    Value::Null,
    Value::from(true),
    Value::from(1),
    Value::from(1.25),
    Value::from("s"),
    Value::from(Array::new()),
    Value::from(Object::new()),
    Value::Undefined,
  ]);
  let kinds = array.iter().map(|value| value.kind()).collect::<Vec<_>>();
  assert_eq!(
    kinds,
    [
      Type::Null,
      Type::Bool,
      Type::Double,
      Type::Double,
      Type::String,
      Type::Array,
      Type::Object,
      Type::Null
    ]
  );
  assert_eq!(
    Document::from(array).to_json(JsonFormat::Compact),
    r#"[null,true,1,1.25,"s",[],{},null]"#
  );
}
