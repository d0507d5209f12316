/// Calculate the length of a non-ASCII UTF-8 codepoint from its first byte.
///
/// Returns `None` if this byte cannot start a non-ASCII codepoint.
#[inline(always)]
fn non_ascii_utf8_codepoint_len(b: u8) -> Option<usize> {
  // `0x80 ..= 0xBF` are continuation bytes, `0xC0` and `0xC1` may only start overlong encodings,
  // and `0xF5 ..` may only start codepoints exceeding `U+10FFFF`
  if !(0xC2 ..= 0xF4).contains(&b) {
    None?;
  }
  // The amount of zeroes in a `u8` will be positive and fit within a `usize`
  Some(((!(b | 0b0100_0000)) | 0b1111).leading_zeros() as usize)
}

/// Convert a UTF-8 codepoint, whose first byte has already been validated, to a `char`.
#[inline(always)]
fn utf8_codepoint_to_char(c: &[u8]) -> Option<char> {
  // https://en.wikipedia.org/wiki/UTF-8#Description
  const SIX_BITS: u8 = 0b0011_1111;
  if c[1 ..].iter().any(|byte| (byte & 0b1100_0000) != 0b1000_0000) {
    None?;
  }
  let (codepoint, minimum) = match c.len() {
    2 => ((u32::from(c[0] & 0b0001_1111) << 6) | u32::from(c[1] & SIX_BITS), 0x80),
    3 => (
      (((u32::from(c[0] & 0b0000_1111) << 6) | u32::from(c[1] & SIX_BITS)) << 6) |
        u32::from(c[2] & SIX_BITS),
      0x800,
    ),
    4 => (
      (((((u32::from(c[0] & 0b0000_0111) << 6) | u32::from(c[1] & SIX_BITS)) << 6) |
        u32::from(c[2] & SIX_BITS)) <<
        6) |
        u32::from(c[3] & SIX_BITS),
      0x1_0000,
    ),
    _ => None?,
  };
  // Reject overlong encodings. `char::from_u32` rejects surrogates and out-of-range values.
  if codepoint < minimum {
    None?;
  }
  char::from_u32(codepoint)
}

/// Read a non-ASCII UTF-8 character from the start of `bytes`.
///
/// Returns the character and the amount of bytes it was encoded with, or `None` if the bytes are
/// not a well-formed UTF-8 codepoint.
#[inline(always)]
pub(crate) fn read_non_ascii_utf8(bytes: &[u8]) -> Option<(char, usize)> {
  let len = non_ascii_utf8_codepoint_len(*bytes.first()?)?;
  let codepoint = bytes.get(.. len)?;
  Some((utf8_codepoint_to_char(codepoint)?, len))
}

#[test]
fn test_non_ascii_utf8_codepoint_len() {
  for (c, len) in [('\u{80}', 2), ('\u{7ff}', 2), ('\u{800}', 3), ('\u{ffff}', 3), ('\u{10000}', 4)]
  {
    assert_eq!(non_ascii_utf8_codepoint_len(c.to_string().as_bytes()[0]), Some(len));
  }
  assert_eq!(non_ascii_utf8_codepoint_len(0x80), None);
  assert_eq!(non_ascii_utf8_codepoint_len(0xC0), None);
  assert_eq!(non_ascii_utf8_codepoint_len(0xF8), None);
}

#[test]
fn test_read_non_ascii_utf8() {
  for c in ['\u{80}', '\u{e9}', '\u{7ff}', '\u{800}', '\u{fffd}', '\u{10000}', '\u{10ffff}'] {
    let mut encoded = c.to_string().into_bytes();
    let len = encoded.len();
    encoded.push(b'"');
    assert_eq!(read_non_ascii_utf8(&encoded), Some((c, len)));
    // Truncated
    assert_eq!(read_non_ascii_utf8(&encoded[.. len - 1]), None);
  }

  // Overlong encoding of '/'
  assert_eq!(read_non_ascii_utf8(&[0xE0, 0x80, 0xAF]), None);
  // Encoded surrogate
  assert_eq!(read_non_ascii_utf8(&[0xED, 0xA0, 0x80]), None);
  // Exceeds U+10FFFF
  assert_eq!(read_non_ascii_utf8(&[0xF4, 0x90, 0x80, 0x80]), None);
  // Missing continuation byte
  assert_eq!(read_non_ascii_utf8(&[0xC3, b'a']), None);
}
