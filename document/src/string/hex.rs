use alloc::string::String;

/// The value of a single hex digit.
#[inline(always)]
pub(crate) fn hex_digit(b: u8) -> Option<u16> {
  // `to_digit` accepts both cases, as JSON does
  char::from(b).to_digit(16).and_then(|digit| u16::try_from(digit).ok())
}

/// Write a `\uXXXX` escape for a UTF-16 code unit, with lowercase hex digits.
#[inline(always)]
pub(crate) fn push_unicode_escape(out: &mut String, unit: u16) {
  out.push_str("\\u");
  for shift in [12, 8, 4, 0] {
    out.push(char::from_digit(u32::from((unit >> shift) & 0xf), 16).unwrap_or('0'));
  }
}

#[test]
fn hex() {
  for (b, expected) in [(b'0', Some(0)), (b'9', Some(9)), (b'a', Some(10)), (b'F', Some(15))] {
    assert_eq!(hex_digit(b), expected);
  }
  for b in [b'g', b'G', b'/', b':', b'@', b'`', 0xff] {
    assert_eq!(hex_digit(b), None);
  }

  let mut out = String::new();
  push_unicode_escape(&mut out, 0x1f);
  push_unicode_escape(&mut out, 0xdabc);
  assert_eq!(out, "\\u001f\\udabc");
}
