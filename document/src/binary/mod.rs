//! A binary format for documents.
//!
//! Documents are encoded as a tree of blocks, each holding a container's table and its data. The
//! format is designed to be read back without trusting it: every offset, length, and key is
//! validated while decoding, and the amount of work done is bounded by the length of the input.

use core::cmp::Ordering;
use alloc::{sync::Arc, vec::Vec};

use thiserror::Error;

use crate::{
  JsonString, Number, Value, Array, Object, Document,
  string::compare_keys,
  container::{Container, Element, StrView},
};

mod layout;
use layout::*;

/// The maximum depth of nested containers within a binary document.
pub const MAX_DEPTH: usize = 1024;

/// An error encountered with binary data.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Error)]
pub enum BinaryError {
  /// The data was shorter than any valid document.
  #[error("binary data was too short")]
  TooShort,
  /// The data didn't start with the expected magic.
  #[error("binary data had an invalid magic")]
  BadMagic,
  /// The data was of a version this library doesn't support.
  #[error("binary data was of an unsupported version ({0})")]
  UnsupportedVersion(u32),
  /// A size or offset referenced bytes outside of its block.
  #[error("binary data referenced bytes out of bounds")]
  OutOfBounds,
  /// A size or offset wasn't a multiple of four.
  #[error("binary data had a misaligned size or offset")]
  Misaligned,
  /// A word had an invalid type or payload.
  #[error("binary data had an invalid element")]
  BadType,
  /// An object's key wasn't a string.
  #[error("binary data had a key which wasn't a string")]
  BadKey,
  /// An object's keys weren't sorted, or were duplicated.
  #[error("binary data had unsorted or duplicated keys")]
  UnsortedKeys,
  /// Containers nested beyond `MAX_DEPTH`.
  #[error("binary data nested too deeply")]
  TooDeep,
  /// The document was too large to be represented.
  #[error("document was too large for the binary format")]
  TooLarge,
  /// The data referenced the same bytes more times than its length allows.
  #[error("binary data had overlapping elements")]
  Overlapping,
}

/// How thoroughly to validate binary data.
///
/// Bounds are always checked. Bypassing validation only skips checks which don't affect memory
/// safety nor the bounds on the work done.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub enum DataValidation {
  /// Reject data which wasn't produced by the encoder.
  #[default]
  Validate,
  /// Accept objects whose keys aren't sorted or are duplicated, keeping the last occurrence of
  /// each key.
  BypassValidation,
}

/// Encode a document.
///
/// Null documents encode to an empty `Vec`.
pub fn encode(document: &Document) -> Result<Vec<u8>, BinaryError> {
  let Some(root) = document.container() else { return Ok(Vec::new()) };
  let mut out = Vec::with_capacity(HEADER_LEN + BLOCK_HEADER_LEN);
  out.extend_from_slice(&MAGIC);
  out.extend_from_slice(&VERSION.to_le_bytes());

  // The blocks of the innermost container's ancestors, whose tables are still being built
  let mut ancestors = Vec::new();
  let mut current = EncodedBlock::open(&mut out, root);
  loop {
    let container = current.container;
    let Some(element) = container.elements().get(current.table.len()) else {
      current.close(&mut out)?;
      let Some(parent) = ancestors.pop() else { break };
      current = parent;
      continue;
    };

    let offset = out.len() - current.start;
    let data_word = |kind| Word::offset(kind, offset).ok_or(BinaryError::TooLarge);
    let word = match element {
      Element::Null => Word::null(),
      Element::Bool(b) => Word::inline(TYPE_BOOL, i64::from(*b)),
      Element::Integer(i) if (INLINE_MIN ..= INLINE_MAX).contains(i) => {
        Word::inline(TYPE_INTEGER, *i)
      }
      Element::Integer(i) => {
        out.extend_from_slice(&i.to_le_bytes());
        data_word(TYPE_INTEGER)?
      }
      Element::Double(d) => match Number::Double(*d).as_i64() {
        // Negative zero is kept out-of-line to preserve its sign
        Some(i)
          if (INLINE_MIN ..= INLINE_MAX).contains(&i) && !((i == 0) && d.is_sign_negative()) =>
        {
          Word::inline(TYPE_DOUBLE, i)
        }
        _ => {
          out.extend_from_slice(&d.to_le_bytes());
          data_word(TYPE_DOUBLE)?
        }
      },
      Element::Inline { .. } | Element::Data { .. } => {
        let view = container.string_view(element).ok_or(BinaryError::BadType)?;
        encode_string(&mut out, view)?;
        data_word(TYPE_STRING)?
      }
      Element::Container(nested) => {
        // The root is at depth 0
        if (ancestors.len() + 1) >= MAX_DEPTH {
          Err(BinaryError::TooDeep)?;
        }
        // The nested block starts here, so its word can be written before its contents are
        current.table.push(data_word(if nested.is_object() { TYPE_OBJECT } else { TYPE_ARRAY })?);
        let nested = EncodedBlock::open(&mut out, nested);
        ancestors.push(core::mem::replace(&mut current, nested));
        continue;
      }
    };
    current.table.push(word);
  }
  Ok(out)
}

fn to_u32(value: usize) -> Result<u32, BinaryError> {
  u32::try_from(value).map_err(|_| BinaryError::TooLarge)
}

fn encode_string(out: &mut Vec<u8>, view: StrView<'_>) -> Result<(), BinaryError> {
  let (bytes, utf16) = match view {
    StrView::Ascii(bytes) => (bytes, false),
    StrView::Utf16Le(bytes) => (bytes, true),
  };
  let units = if utf16 { bytes.len() / 2 } else { bytes.len() };
  let header = to_u32(units)?.checked_mul(2).ok_or(BinaryError::TooLarge)? | u32::from(utf16);
  out.extend_from_slice(&header.to_le_bytes());
  out.extend_from_slice(bytes);
  let padding = padded(bytes.len()).ok_or(BinaryError::TooLarge)? - bytes.len();
  out.extend(core::iter::repeat_n(0, padding));
  Ok(())
}

/// A block being encoded.
///
/// The block's data region is written as its elements are, with its table and header written once
/// all of its elements have been.
struct EncodedBlock<'a> {
  container: &'a Container,
  /// The offset of the block within the output.
  start: usize,
  /// The words for the elements encoded so far.
  table: Vec<Word>,
}

impl<'a> EncodedBlock<'a> {
  fn open(out: &mut Vec<u8>, container: &'a Container) -> Self {
    let start = out.len();
    out.extend_from_slice(&[0; BLOCK_HEADER_LEN]);
    EncodedBlock { container, start, table: Vec::with_capacity(container.elements().len()) }
  }

  fn close(&self, out: &mut Vec<u8>) -> Result<(), BinaryError> {
    let start = self.start;
    let table_offset = out.len() - start;
    for word in &self.table {
      out.extend_from_slice(&word.0.to_le_bytes());
    }
    let size = out.len() - start;

    let header = to_u32(self.container.len())?.checked_mul(2).ok_or(BinaryError::TooLarge)? |
      u32::from(self.container.is_object());
    out[start .. (start + 4)].copy_from_slice(&to_u32(size)?.to_le_bytes());
    out[(start + 4) .. (start + 8)].copy_from_slice(&header.to_le_bytes());
    out[(start + 8) .. (start + 12)].copy_from_slice(&to_u32(table_offset)?.to_le_bytes());
    Ok(())
  }
}

/// Decode a document.
///
/// The data is only borrowed for the duration of this call.
pub fn decode(data: &[u8], validation: DataValidation) -> Result<Document, BinaryError> {
  if data.len() < (HEADER_LEN + BLOCK_HEADER_LEN) {
    Err(BinaryError::TooShort)?;
  }
  if data[.. 4] != MAGIC {
    Err(BinaryError::BadMagic)?;
  }
  let version = read_u32(data, 4).ok_or(BinaryError::TooShort)?;
  if version != VERSION {
    Err(BinaryError::UnsupportedVersion(version))?;
  }

  let block = &data[HEADER_LEN ..];
  // The root block must span the remainder of the data
  if usize::try_from(read_u32(block, 0).ok_or(BinaryError::TooShort)?).ok() != Some(block.len()) {
    Err(BinaryError::OutOfBounds)?;
  }

  let mut decoder = Decoder { validation, budget: data.len() / 4 };
  Ok(match decoder.document(block)? {
    Value::Array(array) => Document::from(array),
    Value::Object(object) => Document::from(object),
    _ => Err(BinaryError::BadType)?,
  })
}

/// The entries decoded so far for a block.
enum Entries {
  Array(Vec<Value>),
  /// The fields decoded so far, and the key for the value currently being decoded.
  Object { fields: Vec<(JsonString, Value)>, key: JsonString },
}

/// A block being decoded.
struct DecodedBlock<'a> {
  /// The block's bytes, bounded to its size.
  block: &'a [u8],
  table_offset: usize,
  /// The amount of entries within the block.
  len: usize,
  /// The index of the next entry to decode.
  next: usize,
  entries: Entries,
}

impl<'a> DecodedBlock<'a> {
  /// The data region, which every offset within the block's table is bounded to.
  fn data(&self) -> &'a [u8] {
    let block: &'a [u8] = self.block;
    &block[.. self.table_offset]
  }

  fn word(&self, i: usize) -> Word {
    Word(read_u32(self.block, self.table_offset + (4 * i)).unwrap_or(0))
  }

  fn is_object(&self) -> bool {
    matches!(self.entries, Entries::Object { .. })
  }

  fn push(&mut self, value: Value) {
    match &mut self.entries {
      Entries::Array(values) => values.push(value),
      Entries::Object { fields, key } => fields.push((core::mem::take(key), value)),
    }
  }

  fn finish(self) -> Value {
    match self.entries {
      Entries::Array(values) => {
        Value::Array(Array::from_container(Arc::new(Container::array_from_values(values))))
      }
      Entries::Object { fields, .. } => {
        Value::Object(Object::from_container(Arc::new(Container::object_from_pairs(fields))))
      }
    }
  }
}

struct Decoder {
  validation: DataValidation,
  /// The amount of four-byte units which may still be read.
  ///
  /// A valid document never reads the same bytes twice, so this bounds the work done on
  /// documents whose offsets alias.
  budget: usize,
}

impl Decoder {
  fn charge(&mut self, units: usize) -> Result<(), BinaryError> {
    self.budget = self.budget.checked_sub(units).ok_or(BinaryError::Overlapping)?;
    Ok(())
  }

  /// Decode the root block, spanning `bytes`.
  ///
  /// Nested blocks are decoded with an explicit stack, so the call stack doesn't grow with depth.
  fn document(&mut self, bytes: &[u8]) -> Result<Value, BinaryError> {
    let mut ancestors: Vec<DecodedBlock<'_>> = Vec::new();
    let mut current = self.open(bytes, 0)?;
    loop {
      if current.next == current.len {
        let value = current.finish();
        let Some(parent) = ancestors.pop() else { return Ok(value) };
        current = parent;
        current.push(value);
        continue;
      }
      let i = current.next;
      current.next += 1;

      let data = current.data();
      let value_word = if current.is_object() {
        let key = self.key(data, current.word(2 * i))?;
        if let Entries::Object { fields, key: pending } = &mut current.entries {
          if self.validation == DataValidation::Validate {
            if let Some((previous, _)) = fields.last() {
              if compare_keys(previous, &key) != Ordering::Less {
                Err(BinaryError::UnsortedKeys)?;
              }
            }
          }
          *pending = key;
        }
        current.word((2 * i) + 1)
      } else {
        current.word(i)
      };

      match value_word.kind() {
        kind @ (TYPE_ARRAY | TYPE_OBJECT) => {
          let offset = Self::data_offset(data, value_word, BLOCK_HEADER_LEN)?;
          let nested = self.open(&data[offset ..], ancestors.len() + 1)?;
          if nested.is_object() != (kind == TYPE_OBJECT) {
            Err(BinaryError::BadType)?;
          }
          ancestors.push(core::mem::replace(&mut current, nested));
        }
        _ => {
          let value = self.scalar(data, value_word)?;
          current.push(value);
        }
      }
    }
  }

  /// Validate the header of the block at the start of `bytes`.
  fn open<'a>(&mut self, bytes: &'a [u8], depth: usize) -> Result<DecodedBlock<'a>, BinaryError> {
    if depth >= MAX_DEPTH {
      Err(BinaryError::TooDeep)?;
    }

    let field = |offset| {
      read_u32(bytes, offset)
        .and_then(|value| usize::try_from(value).ok())
        .ok_or(BinaryError::OutOfBounds)
    };
    let size = field(0)?;
    let header = field(4)?;
    let table_offset = field(8)?;

    if (size % 4 != 0) || (table_offset % 4 != 0) {
      Err(BinaryError::Misaligned)?;
    }
    if (size > bytes.len()) || (table_offset < BLOCK_HEADER_LEN) || (table_offset > size) {
      Err(BinaryError::OutOfBounds)?;
    }

    let is_object = (header & 1) == 1;
    let len = header >> 1;
    let words =
      (if is_object { len.checked_mul(2) } else { Some(len) }).ok_or(BinaryError::OutOfBounds)?;
    if words.checked_mul(4).and_then(|table_len| table_len.checked_add(table_offset)) != Some(size) {
      Err(BinaryError::OutOfBounds)?;
    }
    self.charge((BLOCK_HEADER_LEN / 4) + words)?;

    let entries = if is_object {
      Entries::Object { fields: Vec::with_capacity(len), key: JsonString::new() }
    } else {
      Entries::Array(Vec::with_capacity(len))
    };
    Ok(DecodedBlock { block: &bytes[.. size], table_offset, len, next: 0, entries })
  }

  /// The offset referenced by a word, checked to have `len` bytes available within the data region.
  fn data_offset(data: &[u8], word: Word, len: usize) -> Result<usize, BinaryError> {
    if word.is_inline() {
      Err(BinaryError::BadType)?;
    }
    let offset = word.data_offset();
    if (offset < BLOCK_HEADER_LEN) || (offset.checked_add(len).is_none_or(|end| end > data.len())) {
      Err(BinaryError::OutOfBounds)?;
    }
    Ok(offset)
  }

  fn key(&mut self, data: &[u8], word: Word) -> Result<JsonString, BinaryError> {
    if word.kind() != TYPE_STRING {
      Err(BinaryError::BadKey)?;
    }
    self.string(data, word)
  }

  fn string(&mut self, data: &[u8], word: Word) -> Result<JsonString, BinaryError> {
    let offset = Self::data_offset(data, word, 4)?;
    let header = read_u32(data, offset).ok_or(BinaryError::OutOfBounds)?;
    let utf16 = (header & 1) == 1;
    let units = usize::try_from(header >> 1).map_err(|_| BinaryError::OutOfBounds)?;
    let len = if utf16 { units.checked_mul(2).ok_or(BinaryError::OutOfBounds)? } else { units };

    let start = offset + 4;
    let bytes = start
      .checked_add(len)
      .and_then(|end| data.get(start .. end))
      .ok_or(BinaryError::OutOfBounds)?;
    self.charge(1 + (padded(len).ok_or(BinaryError::OutOfBounds)? / 4))?;

    if utf16 {
      Ok(JsonString::from(
        bytes.chunks_exact(2).map(|unit| u16::from_le_bytes([unit[0], unit[1]])).collect::<Vec<_>>(),
      ))
    } else {
      if !bytes.is_ascii() {
        Err(BinaryError::BadType)?;
      }
      Ok(JsonString::from(bytes.iter().map(|byte| u16::from(*byte)).collect::<Vec<_>>()))
    }
  }

  fn number(&mut self, data: &[u8], word: Word) -> Result<[u8; 8], BinaryError> {
    let offset = Self::data_offset(data, word, 8)?;
    self.charge(2)?;
    read_u64(data, offset).ok_or(BinaryError::OutOfBounds)
  }

  /// Decode a value which isn't a container.
  #[allow(clippy::cast_precision_loss)]
  fn scalar(&mut self, data: &[u8], word: Word) -> Result<Value, BinaryError> {
    Ok(match word.kind() {
      TYPE_NULL => {
        if word != Word::null() {
          Err(BinaryError::BadType)?;
        }
        Value::Null
      }
      TYPE_BOOL => {
        if !word.is_inline() {
          Err(BinaryError::BadType)?;
        }
        match word.inline_value() {
          0 => Value::Bool(false),
          1 => Value::Bool(true),
          _ => Err(BinaryError::BadType)?,
        }
      }
      TYPE_INTEGER if word.is_inline() => Value::from(word.inline_value()),
      TYPE_INTEGER => Value::from(i64::from_le_bytes(self.number(data, word)?)),
      TYPE_DOUBLE if word.is_inline() => Value::from(word.inline_value() as f64),
      TYPE_DOUBLE => Value::from(f64::from_le_bytes(self.number(data, word)?)),
      TYPE_STRING => Value::String(self.string(data, word)?),
      _ => Err(BinaryError::BadType)?,
    })
  }
}
