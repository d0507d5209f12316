use rand_core::{RngCore, OsRng};

use core_json_document::{Array, Document, JsonFormat};

fn main() {
  // Generate a array which will be ~256 MB once serialized
  const LEN: usize = 256 * 1024 * 1024 / 6;
  let mut array = Vec::with_capacity(LEN);
  while array.len() < LEN {
    let mut bits = OsRng.next_u64();
    for _ in 0 .. 64 {
      array.push((bits & 1) == 1);
      bits >>= 1;
    }
  }

  {
    let start = std::time::Instant::now();
    let mut serialization = vec![];
    serde_json::to_writer(&mut serialization, &array).unwrap();
    let _ = core::hint::black_box(serialization);
    println!("serde_json took {}ms to serialize a 256 MB bool array", start.elapsed().as_millis());
  }

  let document = Document::from(array.iter().copied().collect::<Array>());
  {
    let start = std::time::Instant::now();
    let _ = core::hint::black_box(document.to_json(JsonFormat::Compact));
    println!(
      "core-json-document took {}ms to serialize a 256 MB bool array",
      start.elapsed().as_millis()
    );
  }

  let serialization = serde_json::to_string(&array).unwrap();

  {
    let start = std::time::Instant::now();
    let _ = core::hint::black_box(
      serde_json::from_reader::<&[u8], serde_json::Value>(serialization.as_bytes()).unwrap(),
    );
    println!("serde_json took {}ms to deserialize a 256 MB bool array", start.elapsed().as_millis());
  }

  {
    let start = std::time::Instant::now();
    let _ = core::hint::black_box(Document::from_json(serialization.as_bytes()).unwrap());
    println!(
      "core-json-document took {}ms to deserialize a 256 MB bool array",
      start.elapsed().as_millis()
    );
  }

  {
    let start = std::time::Instant::now();
    let binary = document.to_binary_data();
    println!(
      "core-json-document took {}ms to encode a 256 MB bool array as {} MB of binary",
      start.elapsed().as_millis(),
      binary.len() / (1024 * 1024)
    );

    let start = std::time::Instant::now();
    let _ = core::hint::black_box(Document::from_binary_data(&binary));
    println!(
      "core-json-document took {}ms to decode a 256 MB bool array from binary",
      start.elapsed().as_millis()
    );
  }
}
