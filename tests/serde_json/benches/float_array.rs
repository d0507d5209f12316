#[cfg(not(debug_assertions))]
use rand_core::{RngCore, OsRng};

#[cfg(not(debug_assertions))]
use core_json_document::{Array, Document, JsonFormat};

#[cfg(debug_assertions)]
fn main() {}
#[cfg(not(debug_assertions))]
fn main() {
  // Generate a 256 MB array
  let mut array = vec![0f64; 256 * 1024 * 1024 / 8];
  for e in &mut array {
    *e = loop {
      if let Some(float) = serde_json::Number::from_f64(f64::from_bits(OsRng.next_u64())) {
        break float.as_f64().unwrap();
      }
    };
  }

  {
    let start = std::time::Instant::now();
    let mut serialization = vec![];
    serde_json::to_writer(&mut serialization, &array).unwrap();
    let _ = core::hint::black_box(serialization);
    println!("serde_json took {}ms to serialize a 256 MB f64 array", start.elapsed().as_millis());
  }

  let document = Document::from(array.iter().copied().collect::<Array>());
  {
    let start = std::time::Instant::now();
    let _ = core::hint::black_box(document.to_json(JsonFormat::Compact));
    println!(
      "core-json-document took {}ms to serialize a 256 MB f64 array",
      start.elapsed().as_millis()
    );
  }

  let serialization = serde_json::to_string(&array).unwrap();

  {
    let start = std::time::Instant::now();
    let _ = core::hint::black_box(
      serde_json::from_reader::<&[u8], serde_json::Value>(serialization.as_bytes()).unwrap(),
    );
    println!("serde_json took {}ms to deserialize a 256 MB f64 array", start.elapsed().as_millis());
  }

  {
    let start = std::time::Instant::now();
    let document = Document::from_json(serialization.as_bytes()).unwrap();
    println!(
      "core-json-document took {}ms to deserialize a 256 MB f64 array",
      start.elapsed().as_millis()
    );
    // Every double was written with its shortest representation, so this is exact
    for (i, float) in array.iter().enumerate() {
      assert_eq!(document.at(i).to_double(f64::NAN).to_bits(), float.to_bits());
    }
  }
}
