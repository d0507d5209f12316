use core::{cmp::Ordering, fmt};
use alloc::{sync::Arc, vec::Vec, string::String};

mod unicode;
mod hex;

pub(crate) use unicode::read_non_ascii_utf8;
pub(crate) use hex::{hex_digit, push_unicode_escape};

/// A string held by a JSON value.
///
/// JSON strings may carry escaped UTF-16 surrogates which don't pair up into a Unicode scalar
/// value (`"\ud800"`). Such strings can't be represented by a Rust `String`, yet have to survive a
/// round trip through this library, so strings are kept as UTF-16 code units. Cloning is cheap as
/// the units are shared.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct JsonString(Arc<[u16]>);

impl JsonString {
  /// Create an empty string.
  pub fn new() -> Self {
    Self(Arc::from(Vec::new()))
  }

  /// Create a string from UTF-16 code units.
  ///
  /// The units are taken as-is. Unpaired surrogates are preserved.
  pub fn from_utf16(units: &[u16]) -> Self {
    Self(Arc::from(units))
  }

  /// The UTF-16 code units of this string.
  #[inline(always)]
  pub fn as_utf16(&self) -> &[u16] {
    &self.0
  }

  /// The length of this string, in UTF-16 code units.
  #[inline(always)]
  pub fn len(&self) -> usize {
    self.0.len()
  }

  /// If this string is empty.
  #[inline(always)]
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  /// If this string solely consists of ASCII characters.
  pub fn is_ascii(&self) -> bool {
    self.0.iter().all(|unit| *unit < 0x80)
  }

  /// If this string is well-formed UTF-16, and accordingly representable as a `String`.
  pub fn is_well_formed(&self) -> bool {
    char::decode_utf16(self.0.iter().copied()).all(|c| c.is_ok())
  }

  /// Convert this string to a `String`, if it's well-formed.
  pub fn to_string_checked(&self) -> Option<String> {
    char::decode_utf16(self.0.iter().copied()).collect::<Result<String, _>>().ok()
  }

  /// Convert this string to a `String`, replacing unpaired surrogates with U+FFFD.
  pub fn to_string_lossy(&self) -> String {
    char::decode_utf16(self.0.iter().copied())
      .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
      .collect()
  }
}

impl Default for JsonString {
  fn default() -> Self {
    Self::new()
  }
}

impl From<&str> for JsonString {
  fn from(value: &str) -> Self {
    Self(value.encode_utf16().collect::<Vec<_>>().into())
  }
}
impl From<&String> for JsonString {
  fn from(value: &String) -> Self {
    Self::from(value.as_str())
  }
}
impl From<String> for JsonString {
  fn from(value: String) -> Self {
    Self::from(value.as_str())
  }
}
impl From<Vec<u16>> for JsonString {
  fn from(units: Vec<u16>) -> Self {
    Self(units.into())
  }
}

impl PartialEq<str> for JsonString {
  fn eq(&self, other: &str) -> bool {
    self.0.iter().copied().eq(other.encode_utf16())
  }
}
impl PartialEq<&str> for JsonString {
  fn eq(&self, other: &&str) -> bool {
    *self == **other
  }
}
impl PartialEq<JsonString> for str {
  fn eq(&self, other: &JsonString) -> bool {
    *other == *self
  }
}
impl PartialEq<JsonString> for &str {
  fn eq(&self, other: &JsonString) -> bool {
    *other == **self
  }
}

/// Strings are ordered as object keys are: by length, then by code unit.
impl Ord for JsonString {
  fn cmp(&self, other: &Self) -> Ordering {
    compare_keys(self, other)
  }
}
impl PartialOrd for JsonString {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl fmt::Display for JsonString {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    use fmt::Write;
    for c in char::decode_utf16(self.0.iter().copied()) {
      f.write_char(c.unwrap_or(char::REPLACEMENT_CHARACTER))?;
    }
    Ok(())
  }
}

impl fmt::Debug for JsonString {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    use fmt::Write;
    f.write_char('"')?;
    for c in char::decode_utf16(self.0.iter().copied()) {
      match c {
        Ok(c) => {
          for escaped in c.escape_debug() {
            f.write_char(escaped)?;
          }
        }
        Err(e) => write!(f, "\\u{{{:x}}}", e.unpaired_surrogate())?,
      }
    }
    f.write_char('"')
  }
}

/// A key which may be used to look up a field within an object.
///
/// Keys are compared as sequences of UTF-16 code units, allowing `&str` to be used to look up keys
/// without first converting it.
pub trait ObjectKey {
  /// The length of this key, in UTF-16 code units.
  fn utf16_len(&self) -> usize;

  /// The UTF-16 code units of this key.
  fn utf16_units(&self) -> impl Iterator<Item = u16> + '_;
}

impl ObjectKey for str {
  #[inline(always)]
  fn utf16_len(&self) -> usize {
    // Every byte of ASCII is one unit, allowing us to skip decoding the common case
    if self.is_ascii() {
      return self.len();
    }
    self.chars().map(char::len_utf16).sum()
  }

  #[inline(always)]
  fn utf16_units(&self) -> impl Iterator<Item = u16> + '_ {
    self.encode_utf16()
  }
}

impl ObjectKey for String {
  #[inline(always)]
  fn utf16_len(&self) -> usize {
    self.as_str().utf16_len()
  }

  #[inline(always)]
  fn utf16_units(&self) -> impl Iterator<Item = u16> + '_ {
    self.encode_utf16()
  }
}

impl ObjectKey for JsonString {
  #[inline(always)]
  fn utf16_len(&self) -> usize {
    self.len()
  }

  #[inline(always)]
  fn utf16_units(&self) -> impl Iterator<Item = u16> + '_ {
    self.0.iter().copied()
  }
}

impl<K: ObjectKey + ?Sized> ObjectKey for &K {
  #[inline(always)]
  fn utf16_len(&self) -> usize {
    (**self).utf16_len()
  }

  #[inline(always)]
  fn utf16_units(&self) -> impl Iterator<Item = u16> + '_ {
    (**self).utf16_units()
  }
}

/// Compare two keys by the order objects keep their fields in.
///
/// Shorter keys sort first. Keys of equal length are compared by their UTF-16 code units. This is
/// neither the order of `str` nor of Unicode scalar values, and MUST NOT be changed as the binary
/// format relies on it.
#[inline(always)]
pub(crate) fn compare_keys(a: &(impl ObjectKey + ?Sized), b: &(impl ObjectKey + ?Sized)) -> Ordering {
  a.utf16_len().cmp(&b.utf16_len()).then_with(|| a.utf16_units().cmp(b.utf16_units()))
}

#[test]
fn key_order() {
  assert_eq!(compare_keys("A", "B"), Ordering::Less);
  assert_eq!(compare_keys("B", "AA"), Ordering::Less);
  assert_eq!(compare_keys("abc", "abc"), Ordering::Equal);
  // U+FF61 is a single unit while U+10000 is a surrogate pair, so U+10000 sorts last
  assert_eq!(compare_keys("\u{10000}", "\u{ff61}"), Ordering::Greater);
  // Within a length, units are compared, placing surrogates before U+E000 ..= U+FFFF
  assert_eq!(compare_keys("a\u{10000}", "\u{ff61}\u{ff61}\u{ff61}"), Ordering::Less);
  assert_eq!(compare_keys("\u{10000}", "\u{e000}\u{e000}"), Ordering::Less);
  assert_eq!(compare_keys(&JsonString::from("x"), "x"), Ordering::Equal);
}

#[test]
fn lone_surrogates() {
  let lone = JsonString::from_utf16(&[0x61, 0xd800]);
  assert_eq!(lone.len(), 2);
  assert!(!lone.is_well_formed());
  assert_eq!(lone.to_string_checked(), None);
  assert_eq!(lone.to_string_lossy(), "a\u{fffd}");
  assert_eq!(alloc::format!("{lone:?}"), "\"a\\u{d800}\"");

  let paired = JsonString::from("a\u{1f600}");
  assert_eq!(paired.len(), 3);
  assert!(paired.is_well_formed());
  assert_eq!(paired.to_string_checked().as_deref(), Some("a\u{1f600}"));
  assert_eq!(paired, "a\u{1f600}");
  assert_eq!("a\u{1f600}".utf16_len(), 3);
}
