use alloc::{sync::Arc, vec::Vec};

use crate::{JsonString, ObjectKey};
use super::Container;

/// Strings of ASCII characters up to this length are stored within their element.
pub(crate) const INLINE_STRING_CAPACITY: usize = 14;

/// An entry within a container's table.
#[derive(Clone, Debug)]
pub(crate) enum Element {
  Null,
  Bool(bool),
  Integer(i64),
  Double(f64),
  /// An ASCII string stored inline.
  Inline { len: u8, bytes: [u8; INLINE_STRING_CAPACITY] },
  /// A string within the data region, `len` being its length in UTF-16 code units.
  ///
  /// ASCII strings are stored with one byte per unit, other strings as UTF-16LE.
  Data { offset: usize, len: usize, utf16: bool },
  Container(Arc<Container>),
}

impl Element {
  /// The amount of bytes this element occupies within the data region.
  #[inline(always)]
  pub(crate) fn data_len(&self) -> usize {
    match self {
      Element::Data { len, utf16, .. } => {
        if *utf16 {
          2 * len
        } else {
          *len
        }
      }
      _ => 0,
    }
  }
}

/// A borrowed view of a string stored within a container.
#[derive(Clone, Copy, Debug)]
pub(crate) enum StrView<'a> {
  /// ASCII, one byte per code unit.
  Ascii(&'a [u8]),
  /// UTF-16LE, two bytes per code unit.
  Utf16Le(&'a [u8]),
}

impl StrView<'_> {
  /// Copy this string out of its container.
  pub(crate) fn to_json_string(self) -> JsonString {
    JsonString::from(self.utf16_units().collect::<Vec<_>>())
  }
}

impl ObjectKey for StrView<'_> {
  #[inline(always)]
  fn utf16_len(&self) -> usize {
    match self {
      StrView::Ascii(bytes) => bytes.len(),
      StrView::Utf16Le(bytes) => bytes.len() / 2,
    }
  }

  fn utf16_units(&self) -> impl Iterator<Item = u16> + '_ {
    let (ascii, utf16) = match self {
      StrView::Ascii(bytes) => (*bytes, &[][..]),
      StrView::Utf16Le(bytes) => (&[][..], *bytes),
    };
    ascii
      .iter()
      .map(|byte| u16::from(*byte))
      .chain(utf16.chunks_exact(2).map(|unit| u16::from_le_bytes([unit[0], unit[1]])))
  }
}
