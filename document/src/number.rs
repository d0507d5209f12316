use core::fmt;
use alloc::string::String;

/// 2**64, the bound under which integral doubles are written without an exponent.
const TWO_POW_64: f64 = 18_446_744_073_709_551_616.0;

/// The digits required for the shortest representation which round-trips any `f64`.
const F64_SHORTEST_DIGITS: usize = 17;

/// A JSON number.
///
/// Numbers which were written as integers, and fit within an `i64`, are kept as integers to avoid
/// losing precision. All numbers are presented as doubles to the type system however, and two
/// numbers are equal if their numeric values are.
#[derive(Clone, Copy, Debug)]
pub enum Number {
  /// An integer.
  Integer(i64),
  /// A double.
  Double(f64),
}

impl Number {
  /// This number as a double.
  #[allow(clippy::cast_precision_loss)]
  #[inline(always)]
  pub fn to_f64(self) -> f64 {
    match self {
      Number::Integer(i) => i as f64,
      Number::Double(d) => d,
    }
  }

  /// This number as an `i64`, if it is an integer (or a double with an integral value) which fits
  /// within an `i64`.
  #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::float_cmp)]
  pub fn as_i64(self) -> Option<i64> {
    match self {
      Number::Integer(i) => Some(i),
      Number::Double(d) => {
        // `i64::MAX as f64` rounds up to 2**63, which is out of range
        if !((-TWO_POW_64 / 2.0) ..= (TWO_POW_64 / 2.0)).contains(&d) || (d == TWO_POW_64 / 2.0) {
          None?;
        }
        let i = d as i64;
        ((i as f64) == d).then_some(i)
      }
    }
  }

  /// This number as an `i64`, truncated towards zero and clamped into range.
  ///
  /// Returns `None` for non-finite doubles.
  #[allow(clippy::cast_possible_truncation)]
  #[inline(always)]
  pub(crate) fn clamped_i64(self) -> Option<i64> {
    match self {
      Number::Integer(i) => Some(i),
      // `as` saturates
      Number::Double(d) => d.is_finite().then_some(d as i64),
    }
  }

  /// This number as an `i32`, truncated towards zero and clamped into range.
  ///
  /// Returns `None` for non-finite doubles.
  #[allow(clippy::cast_possible_truncation)]
  #[inline(always)]
  pub(crate) fn clamped_i32(self) -> Option<i32> {
    match self {
      Number::Integer(i) => {
        Some(i32::try_from(i).unwrap_or(if i < 0 { i32::MIN } else { i32::MAX }))
      }
      Number::Double(d) => d.is_finite().then_some(d as i32),
    }
  }

  /// Write this number as JSON.
  pub(crate) fn write(self, out: &mut String) {
    match self {
      Number::Integer(i) => out.push_str(itoa::Buffer::new().format(i)),
      Number::Double(d) => write_double(out, d),
    }
  }
}

impl PartialEq for Number {
  #[allow(clippy::float_cmp)]
  fn eq(&self, other: &Self) -> bool {
    match (self, other) {
      (Number::Integer(a), Number::Integer(b)) => a == b,
      _ => self.to_f64() == other.to_f64(),
    }
  }
}

impl From<i64> for Number {
  fn from(i: i64) -> Self {
    Number::Integer(i)
  }
}
impl From<f64> for Number {
  fn from(d: f64) -> Self {
    Number::Double(d)
  }
}

impl fmt::Display for Number {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut out = String::new();
    self.write(&mut out);
    f.write_str(&out)
  }
}

/// The shortest decimal digits which round-trip a double.
///
/// The value represented is `0.{digits} * 10**point`, with the sign applied.
struct ShortestDigits {
  negative: bool,
  /// The significant digits, without leading or trailing zeroes.
  ///
  /// These will be ASCII characters in the range '0' ..= '9'.
  digits: [u8; F64_SHORTEST_DIGITS],
  /// The amount of digits accumulated.
  len: usize,
  /// The position of the decimal point relative to the start of the digits.
  point: i32,
}

impl ShortestDigits {
  /// Accumulate the digits from the string for a finite double.
  ///
  /// This accepts any string of the form `-?[0-9]*(\.[0-9]*)?([eE][+-]?[0-9]+)?`, so we don't rely
  /// on how the formatter chooses between fixed and scientific notation.
  fn new(d: f64) -> Self {
    let mut buffer = zmij::Buffer::new();
    let printed = buffer.format_finite(d);

    let mut result =
      ShortestDigits { negative: false, digits: [b'0'; F64_SHORTEST_DIGITS], len: 0, point: 0 };
    let mut before_decimal = true;
    let mut bytes = printed.bytes();
    while let Some(c) = bytes.next() {
      match c {
        b'-' => result.negative = true,
        b'.' => before_decimal = false,
        b'0' ..= b'9' => {
          // Drop leading zeroes
          if (result.len == 0) && (c == b'0') {
            // If we're after the decimal point, this effectively shifts the number up
            if !before_decimal {
              result.point -= 1;
            }
            continue;
          }
          if before_decimal {
            result.point += 1;
          }
          // The shortest representation never exceeds `F64_SHORTEST_DIGITS`
          if result.len < result.digits.len() {
            result.digits[result.len] = c;
            result.len += 1;
          }
        }
        b'e' | b'E' => {
          let mut negative_exponent = false;
          let mut exponent = 0i32;
          for c in bytes.by_ref() {
            match c {
              b'-' => negative_exponent = true,
              b'0' ..= b'9' => {
                exponent = exponent.saturating_mul(10).saturating_add(i32::from(c - b'0'))
              }
              _ => {}
            }
          }
          result.point = result
            .point
            .saturating_add(if negative_exponent { -exponent } else { exponent });
        }
        _ => {}
      }
    }

    // Drop trailing zeroes
    while (result.len > 0) && (result.digits[result.len - 1] == b'0') {
      result.len -= 1;
    }
    if result.len == 0 {
      result.point = 0;
    }

    result
  }

  fn digits(&self) -> &[u8] {
    &self.digits[.. self.len]
  }

  fn push_digits(out: &mut String, digits: &[u8]) {
    out.extend(digits.iter().copied().map(char::from));
  }

  fn push_zeroes(out: &mut String, count: i32) {
    for _ in 0 .. count {
      out.push('0');
    }
  }
}

/// Write a double as JSON.
///
/// Non-finite values are written as `null`. Integral values whose magnitude is less than 2**64
/// are written as integers, with any digits past the shortest representation written as zeroes.
/// Other values are written with the shortest representation which round-trips, in scientific
/// notation if more than four zeroes would be needed for padding (`1e-05`, `1.5e+20`).
#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss, clippy::float_cmp)]
pub(crate) fn write_double(out: &mut String, d: f64) {
  if !d.is_finite() {
    out.push_str("null");
    return;
  }

  let shortest = ShortestDigits::new(d);
  if shortest.negative {
    out.push('-');
  }
  let digits = shortest.digits();
  // This is lossless as `digits.len() <= F64_SHORTEST_DIGITS`
  let len = digits.len() as i32;
  let point = shortest.point;

  if digits.is_empty() {
    out.push('0');
    return;
  }

  let magnitude = if d < 0.0 { -d } else { d };
  let integral = (magnitude < TWO_POW_64) && (((magnitude as u64) as f64) == magnitude);
  if integral {
    ShortestDigits::push_digits(out, digits);
    ShortestDigits::push_zeroes(out, point - len);
    return;
  }

  let padding = if point <= 0 { 1 - point } else { point - len };
  if padding > 4 {
    out.push(char::from(digits[0]));
    if digits.len() > 1 {
      out.push('.');
      ShortestDigits::push_digits(out, &digits[1 ..]);
    }
    out.push('e');
    let exponent = point - 1;
    out.push(if exponent < 0 { '-' } else { '+' });
    let exponent = exponent.unsigned_abs();
    if exponent < 10 {
      out.push('0');
    }
    out.push_str(itoa::Buffer::new().format(exponent));
    return;
  }

  if point <= 0 {
    out.push_str("0.");
    ShortestDigits::push_zeroes(out, -point);
    ShortestDigits::push_digits(out, digits);
  } else if point < len {
    // `0 < point < len`, so this is lossless
    let point = point as usize;
    ShortestDigits::push_digits(out, &digits[.. point]);
    out.push('.');
    ShortestDigits::push_digits(out, &digits[point ..]);
  } else {
    ShortestDigits::push_digits(out, digits);
    ShortestDigits::push_zeroes(out, point - len);
  }
}

#[test]
fn doubles() {
  let format = |d: f64| {
    let mut out = String::new();
    write_double(&mut out, d);
    out
  };

  assert_eq!(format(0.0), "0");
  assert_eq!(format(-0.0), "-0");
  assert_eq!(format(1.0), "1");
  assert_eq!(format(-25.0), "-25");
  assert_eq!(format(1.5), "1.5");
  assert_eq!(format(-123.456), "-123.456");
  assert_eq!(format(0.1), "0.1");
  assert_eq!(format(0.0001), "0.0001");
  assert_eq!(format(0.00001), "1e-05");
  assert_eq!(format(0.000_012_5), "1.25e-05");
  assert_eq!(format(1e15), "1000000000000000");
  assert_eq!(format(9_223_372_036_854_775_808.0), "9223372036854776000");
  assert_eq!(format(1e20), "1e+20");
  assert_eq!(format(1.5e300), "1.5e+300");
  assert_eq!(format(123_456.5), "123456.5");
  assert_eq!(format(f64::MAX), "1.7976931348623157e+308");
  assert_eq!(format(f64::MIN_POSITIVE), "2.2250738585072014e-308");
  assert_eq!(format(5e-324), "5e-324");
  assert_eq!(format(f64::NAN), "null");
  assert_eq!(format(f64::INFINITY), "null");
  assert_eq!(format(f64::NEG_INFINITY), "null");
}

#[test]
fn clamping() {
  assert_eq!(Number::Double(2.9).clamped_i32(), Some(2));
  assert_eq!(Number::Double(-2.9).clamped_i32(), Some(-2));
  assert_eq!(Number::Double(1e10).clamped_i32(), Some(i32::MAX));
  assert_eq!(Number::Double(-1e10).clamped_i32(), Some(i32::MIN));
  assert_eq!(Number::Integer(i64::MAX).clamped_i32(), Some(i32::MAX));
  assert_eq!(Number::Integer(i64::MIN).clamped_i32(), Some(i32::MIN));
  assert_eq!(Number::Double(f64::NAN).clamped_i32(), None);
  assert_eq!(Number::Double(1e30).clamped_i64(), Some(i64::MAX));
  assert_eq!(Number::Double(f64::NEG_INFINITY).clamped_i64(), None);

  assert_eq!(Number::Double(3.0).as_i64(), Some(3));
  assert_eq!(Number::Double(3.5).as_i64(), None);
  assert_eq!(Number::Double(9_223_372_036_854_775_808.0).as_i64(), None);
  assert_eq!(Number::Double(-9_223_372_036_854_775_808.0).as_i64(), Some(i64::MIN));

  assert_eq!(Number::Integer(1), Number::Double(1.0));
  assert_ne!(Number::Integer(1), Number::Double(1.5));
  assert_ne!(Number::Double(f64::NAN), Number::Double(f64::NAN));
}
