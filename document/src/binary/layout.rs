//! The layout of the binary format.
//!
//! A document is an 8-byte header (the magic and a little-endian `u32` version) followed by the
//! root container's block. All integers are little-endian. A block is:
//!
//! - `u32` size of the block in bytes, a multiple of four.
//! - `u32` with bit 0 set for objects, and the amount of entries within the remaining bits.
//! - `u32` offset of the table, relative to the start of the block.
//! - The data region, from offset 12 until the table.
//! - The table, one word per element (a key word and then a value word per field for objects),
//!   extending to the end of the block.
//!
//! A word's low three bits are its type. Bit 3 flags the payload, the remaining 28 bits, as inline.
//! Inline payloads are booleans or two's-complement 28-bit integers. Other payloads are the offset
//! of the element's data divided by four, relative to the start of the block. Data is either a
//! string (a `u32` with bit 0 set for UTF-16LE, otherwise ASCII, and the length in code units
//! within the remaining bits, followed by the string padded to a multiple of four bytes), an
//! eight-byte number, or a nested block. Object keys are always strings, sorted by `compare_keys`
//! without duplicates.

pub(super) const MAGIC: [u8; 4] = *b"cjdb";
pub(super) const VERSION: u32 = 1;
pub(super) const HEADER_LEN: usize = 8;
pub(super) const BLOCK_HEADER_LEN: usize = 12;

pub(super) const TYPE_NULL: u32 = 0;
pub(super) const TYPE_BOOL: u32 = 1;
pub(super) const TYPE_DOUBLE: u32 = 2;
pub(super) const TYPE_STRING: u32 = 3;
pub(super) const TYPE_ARRAY: u32 = 4;
pub(super) const TYPE_OBJECT: u32 = 5;
pub(super) const TYPE_INTEGER: u32 = 6;

const TYPE_MASK: u32 = 0b111;
const INLINE_FLAG: u32 = 1 << 3;
const PAYLOAD_SHIFT: u32 = 4;

/// The range of integers which may be inlined within a word.
pub(super) const INLINE_MIN: i64 = -(1 << 27);
pub(super) const INLINE_MAX: i64 = (1 << 27) - 1;
/// The largest offset, in bytes, a word may reference.
pub(super) const MAX_OFFSET: usize = ((1 << 28) - 1) * 4;

/// A word within a block's table.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(super) struct Word(pub(super) u32);

impl Word {
  pub(super) fn null() -> Self {
    Word(TYPE_NULL)
  }

  pub(super) fn inline(kind: u32, value: i64) -> Self {
    // Truncation to the 28-bit payload is intended, with `INLINE_MIN ..= INLINE_MAX` preserved
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let payload = (value as u32) << PAYLOAD_SHIFT;
    Word(kind | INLINE_FLAG | payload)
  }

  /// A word referencing data at `offset`, which must be four-byte aligned and `<= MAX_OFFSET`.
  pub(super) fn offset(kind: u32, offset: usize) -> Option<Self> {
    if (offset % 4 != 0) || (offset > MAX_OFFSET) {
      None?;
    }
    let payload = u32::try_from(offset / 4).ok()?;
    Some(Word(kind | (payload << PAYLOAD_SHIFT)))
  }

  pub(super) fn kind(self) -> u32 {
    self.0 & TYPE_MASK
  }

  pub(super) fn is_inline(self) -> bool {
    (self.0 & INLINE_FLAG) != 0
  }

  /// The inline payload, sign-extended.
  pub(super) fn inline_value(self) -> i64 {
    // Arithmetic shift to sign-extend
    #[allow(clippy::cast_possible_wrap)]
    let value = (self.0 as i32) >> PAYLOAD_SHIFT;
    i64::from(value)
  }

  /// The referenced offset, in bytes.
  pub(super) fn data_offset(self) -> usize {
    // A `u32` fits within a `usize` on every platform with an allocator worth targeting
    ((self.0 >> PAYLOAD_SHIFT) as usize) * 4
  }
}

/// Read a little-endian `u32` at `offset`.
pub(super) fn read_u32(bytes: &[u8], offset: usize) -> Option<u32> {
  let bytes = bytes.get(offset .. offset.checked_add(4)?)?;
  Some(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
}

/// Read eight little-endian bytes at `offset`.
pub(super) fn read_u64(bytes: &[u8], offset: usize) -> Option<[u8; 8]> {
  let bytes = bytes.get(offset .. offset.checked_add(8)?)?;
  let mut result = [0; 8];
  result.copy_from_slice(bytes);
  Some(result)
}

/// Round up to a multiple of four.
pub(super) fn padded(len: usize) -> Option<usize> {
  len.checked_add(3).map(|len| len & !3)
}

#[test]
fn words() {
  for value in [0, 1, -1, INLINE_MIN, INLINE_MAX, 12345, -12345] {
    let word = Word::inline(TYPE_INTEGER, value);
    assert_eq!(word.kind(), TYPE_INTEGER);
    assert!(word.is_inline());
    assert_eq!(word.inline_value(), value);
  }

  let word = Word::offset(TYPE_STRING, 16).expect("aligned, in-range offset");
  assert_eq!(word.kind(), TYPE_STRING);
  assert!(!word.is_inline());
  assert_eq!(word.data_offset(), 16);
  assert_eq!(Word::offset(TYPE_STRING, MAX_OFFSET).map(Word::data_offset), Some(MAX_OFFSET));
  assert_eq!(Word::offset(TYPE_STRING, 17), None);
  assert_eq!(Word::offset(TYPE_STRING, MAX_OFFSET + 4), None);

  assert_eq!(padded(0), Some(0));
  assert_eq!(padded(5), Some(8));
  assert_eq!(padded(8), Some(8));
}
