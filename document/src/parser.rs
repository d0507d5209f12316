use alloc::{sync::Arc, vec::Vec};

use thiserror::Error;

use crate::{
  JsonString, Number, Value, Array, Object, Document, State, Stack,
  string::{read_non_ascii_utf8, hex_digit},
  container::Container,
};

/// The kind of error encountered while parsing JSON.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug, Error)]
pub enum ParseErrorKind {
  /// No error occurred.
  #[default]
  #[error("no error occurred")]
  NoError,
  /// An object wasn't terminated with `}`.
  #[error("unterminated object")]
  UnterminatedObject,
  /// A field's key wasn't followed by `:`.
  #[error("missing name separator")]
  MissingNameSeparator,
  /// An array wasn't terminated with `]`.
  #[error("unterminated array")]
  UnterminatedArray,
  /// Values within an array weren't separated by `,`.
  #[error("missing value separator")]
  MissingValueSeparator,
  /// A value was malformed, or the document's root wasn't an array or object.
  #[error("illegal value")]
  IllegalValue,
  /// The input ended while reading a number.
  #[error("invalid termination by number")]
  TerminationByNumber,
  /// A number was malformed or out of range.
  #[error("illegal number")]
  IllegalNumber,
  /// An escape sequence within a string was malformed.
  #[error("invalid escape sequence")]
  IllegalEscapeSequence,
  /// A string contained invalid UTF-8 or an unescaped control character.
  #[error("invalid UTF8 string")]
  IllegalUTF8String,
  /// A string wasn't terminated with `"`.
  #[error("unterminated string")]
  UnterminatedString,
  /// A value was expected after a `,`, or an object field was expected after a `,`.
  #[error("object is missing after a comma")]
  MissingObject,
  /// The document nested too deeply.
  #[error("too deeply nested document")]
  DeepNesting,
  /// Non-whitespace data followed the document.
  #[error("garbage at the end of the document")]
  GarbageAtEnd,
}

/// An error encountered while parsing JSON, with the byte offset it was detected at.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug, Error)]
#[error("{kind} (at offset {offset})")]
pub struct ParseError {
  /// The kind of error.
  pub kind: ParseErrorKind,
  /// The offset within the input, in bytes.
  pub offset: usize,
}

/// A container being parsed.
enum Frame {
  Array(Vec<Value>),
  Object { fields: Vec<(JsonString, Value)>, key: JsonString },
}

/// The next step for the parser.
enum Step {
  /// A container was just opened.
  Opened,
  /// A value is expected at the current position, which is not whitespace nor the end.
  Value,
  /// A value was completed and should be added to the innermost container.
  Completed(Value),
}

/// An iterative parser for JSON documents.
///
/// The stack bounds the depth. The frames carry the contents of the containers being parsed.
struct Parser<'a, S: Stack> {
  json: &'a [u8],
  pos: usize,
  stack: S,
  frames: Vec<Frame>,
}

/// Parse a JSON document, using `S` to bound the depth.
pub(crate) fn parse<S: Stack>(json: &[u8]) -> Result<Document, ParseError> {
  let mut parser = Parser { json, pos: 0, stack: S::empty(), frames: Vec::new() };

  // Skip a UTF-8 byte-order mark
  if json.starts_with(&[0xEF, 0xBB, 0xBF]) {
    parser.pos = 3;
  }

  let state = match parser.next_token() {
    Some(b'[') => State::Array,
    Some(b'{') => State::Object,
    _ => Err(parser.error(ParseErrorKind::IllegalValue))?,
  };
  parser.open(state)?;
  let root = parser.run()?;

  if parser.eat_space() {
    Err(parser.error(ParseErrorKind::GarbageAtEnd))?;
  }

  Ok(match root {
    Value::Array(array) => Document::from(array),
    Value::Object(object) => Document::from(object),
    _ => Err(parser.error(ParseErrorKind::IllegalValue))?,
  })
}

impl<S: Stack> Parser<'_, S> {
  #[inline(always)]
  fn error(&self, kind: ParseErrorKind) -> ParseError {
    ParseError { kind, offset: self.pos }
  }

  /// Skip whitespace, returning if any input remains.
  #[inline(always)]
  fn eat_space(&mut self) -> bool {
    while let Some(b' ' | b'\t' | b'\n' | b'\r') = self.json.get(self.pos) {
      self.pos += 1;
    }
    self.pos < self.json.len()
  }

  /// Skip whitespace and consume the following byte.
  #[inline(always)]
  fn next_token(&mut self) -> Option<u8> {
    if !self.eat_space() {
      None?;
    }
    let token = self.json[self.pos];
    self.pos += 1;
    Some(token)
  }

  fn open(&mut self, state: State) -> Result<(), ParseError> {
    self
      .stack
      .push(state)
      .map_err(|_| self.error(ParseErrorKind::DeepNesting))?;
    self.frames.push(match state {
      State::Array => Frame::Array(Vec::new()),
      State::Object => Frame::Object { fields: Vec::new(), key: JsonString::new() },
    });
    Ok(())
  }

  fn close(&mut self) -> Result<Value, ParseError> {
    self.stack.pop();
    Ok(match self.frames.pop() {
      Some(Frame::Array(values)) => {
        Value::Array(Array::from_container(Arc::new(Container::array_from_values(values))))
      }
      Some(Frame::Object { fields, .. }) => {
        Value::Object(Object::from_container(Arc::new(Container::object_from_pairs(fields))))
      }
      None => Err(self.error(ParseErrorKind::IllegalValue))?,
    })
  }

  /// Parse a field's key and the following `:`, given the opening quote was consumed.
  fn member(&mut self) -> Result<Step, ParseError> {
    let key = self.string()?;
    if self.next_token() != Some(b':') {
      Err(self.error(ParseErrorKind::MissingNameSeparator))?;
    }
    if !self.eat_space() {
      Err(self.error(ParseErrorKind::UnterminatedObject))?;
    }
    if let Some(Frame::Object { key: pending, .. }) = self.frames.last_mut() {
      *pending = key;
    }
    Ok(Step::Value)
  }

  fn run(&mut self) -> Result<Value, ParseError> {
    let mut step = Step::Opened;
    loop {
      step = match step {
        Step::Opened => match self.stack.peek() {
          Some(State::Array) => {
            if !self.eat_space() {
              Err(self.error(ParseErrorKind::UnterminatedArray))?;
            }
            if self.json[self.pos] == b']' {
              self.pos += 1;
              Step::Completed(self.close()?)
            } else {
              Step::Value
            }
          }
          Some(State::Object) => match self.next_token() {
            Some(b'"') => self.member()?,
            Some(b'}') => Step::Completed(self.close()?),
            _ => Err(self.error(ParseErrorKind::UnterminatedObject))?,
          },
          None => Err(self.error(ParseErrorKind::IllegalValue))?,
        },

        Step::Value => self.value()?,

        Step::Completed(value) => match self.frames.last_mut() {
          None => return Ok(value),
          Some(Frame::Array(values)) => {
            values.push(value);
            match self.next_token() {
              Some(b']') => Step::Completed(self.close()?),
              Some(b',') => {
                if !self.eat_space() {
                  Err(self.error(ParseErrorKind::UnterminatedArray))?;
                }
                Step::Value
              }
              _ => {
                if !self.eat_space() {
                  Err(self.error(ParseErrorKind::UnterminatedArray))?;
                }
                Err(self.error(ParseErrorKind::MissingValueSeparator))?
              }
            }
          }
          Some(Frame::Object { fields, key }) => {
            fields.push((core::mem::take(key), value));
            match self.next_token() {
              Some(b',') => match self.next_token() {
                Some(b'"') => self.member()?,
                Some(b'}') => Err(self.error(ParseErrorKind::MissingObject))?,
                _ => Err(self.error(ParseErrorKind::UnterminatedObject))?,
              },
              Some(b'}') => Step::Completed(self.close()?),
              _ => Err(self.error(ParseErrorKind::UnterminatedObject))?,
            }
          }
        },
      };
    }
  }

  /// Parse a value, consuming its first byte.
  fn value(&mut self) -> Result<Step, ParseError> {
    let Some(&first) = self.json.get(self.pos) else {
      return Err(self.error(ParseErrorKind::IllegalValue));
    };
    self.pos += 1;
    Ok(match first {
      b'n' => Step::Completed(self.literal(b"ull", Value::Null)?),
      b't' => Step::Completed(self.literal(b"rue", Value::Bool(true))?),
      b'f' => Step::Completed(self.literal(b"alse", Value::Bool(false))?),
      b'"' => Step::Completed(Value::String(self.string()?)),
      b'[' => {
        self.open(State::Array)?;
        Step::Opened
      }
      b'{' => {
        self.open(State::Object)?;
        Step::Opened
      }
      b']' | b'}' => Err(self.error(ParseErrorKind::MissingObject))?,
      b'-' | b'0' ..= b'9' => {
        self.pos -= 1;
        Step::Completed(Value::Number(self.number()?))
      }
      _ => Err(self.error(ParseErrorKind::IllegalValue))?,
    })
  }

  /// Parse the remainder of a literal, given its first byte was consumed.
  fn literal(&mut self, rest: &[u8], value: Value) -> Result<Value, ParseError> {
    if (self.json.len() - self.pos) < rest.len() {
      Err(self.error(ParseErrorKind::IllegalValue))?;
    }
    for expected in rest {
      let byte = self.json[self.pos];
      self.pos += 1;
      if byte != *expected {
        Err(self.error(ParseErrorKind::IllegalValue))?;
      }
    }
    Ok(value)
  }

  fn skip_digits(&mut self) -> usize {
    let start = self.pos;
    while self.json.get(self.pos).is_some_and(u8::is_ascii_digit) {
      self.pos += 1;
    }
    self.pos - start
  }

  /// Parse a number.
  /*
    The syntax accepted is `[ minus ] int [ decimal-point 1*DIGIT ] [ e [ minus / plus ] 1*DIGIT ]`
    per RFC-8259. Integers within the range of an `i64` are kept as integers.
  */
  fn number(&mut self) -> Result<Number, ParseError> {
    let start = self.pos;
    if self.json.get(self.pos) == Some(&b'-') {
      self.pos += 1;
    }
    // Leading zeroes are not allowed, so a zero ends the integer part
    let int_digits = if self.json.get(self.pos) == Some(&b'0') {
      self.pos += 1;
      1
    } else {
      self.skip_digits()
    };

    let mut valid = int_digits != 0;
    let mut integer = true;
    if self.json.get(self.pos) == Some(&b'.') {
      self.pos += 1;
      integer = false;
      valid &= self.skip_digits() != 0;
    }
    if let Some(b'e' | b'E') = self.json.get(self.pos) {
      self.pos += 1;
      integer = false;
      if let Some(b'+' | b'-') = self.json.get(self.pos) {
        self.pos += 1;
      }
      valid &= self.skip_digits() != 0;
    }

    if self.pos >= self.json.len() {
      Err(self.error(ParseErrorKind::TerminationByNumber))?;
    }
    if !valid {
      Err(self.error(ParseErrorKind::IllegalNumber))?;
    }

    let number = core::str::from_utf8(&self.json[start .. self.pos])
      .map_err(|_| self.error(ParseErrorKind::IllegalNumber))?;
    if integer {
      if let Ok(i) = number.parse::<i64>() {
        return Ok(Number::Integer(i));
      }
    }
    match number.parse::<f64>() {
      Ok(d) if d.is_finite() => Ok(Number::Double(d)),
      _ => Err(self.error(ParseErrorKind::IllegalNumber)),
    }
  }

  /// Parse a string, given its opening quote was consumed.
  fn string(&mut self) -> Result<JsonString, ParseError> {
    let mut units = Vec::new();
    loop {
      let Some(&byte) = self.json.get(self.pos) else {
        return Err(self.error(ParseErrorKind::UnterminatedString));
      };
      match byte {
        b'"' => {
          self.pos += 1;
          break;
        }
        b'\\' => {
          self.pos += 1;
          units.push(self.escape()?);
        }
        0x00 ..= 0x1f => Err(self.error(ParseErrorKind::IllegalUTF8String))?,
        0x20 ..= 0x7f => {
          units.push(u16::from(byte));
          self.pos += 1;
        }
        _ => {
          let Some((c, len)) = read_non_ascii_utf8(&self.json[self.pos ..]) else {
            return Err(self.error(ParseErrorKind::IllegalUTF8String));
          };
          let mut encoded = [0; 2];
          units.extend_from_slice(c.encode_utf16(&mut encoded));
          self.pos += len;
        }
      }
    }
    Ok(JsonString::from(units))
  }

  /// Parse an escape sequence, given the backslash was consumed.
  ///
  /// `\u` escapes are taken as a UTF-16 code unit, so surrogates need not be paired.
  fn escape(&mut self) -> Result<u16, ParseError> {
    let Some(&escaped) = self.json.get(self.pos) else {
      return Err(self.error(ParseErrorKind::IllegalEscapeSequence));
    };
    self.pos += 1;
    Ok(match escaped {
      b'"' => u16::from(b'"'),
      b'\\' => u16::from(b'\\'),
      b'/' => u16::from(b'/'),
      b'b' => 0x08,
      b'f' => 0x0c,
      b'n' => u16::from(b'\n'),
      b'r' => u16::from(b'\r'),
      b't' => u16::from(b'\t'),
      b'u' => {
        if (self.json.len() - self.pos) < 4 {
          Err(self.error(ParseErrorKind::IllegalEscapeSequence))?;
        }
        let mut unit = 0;
        for _ in 0 .. 4 {
          let Some(digit) = hex_digit(self.json[self.pos]) else {
            return Err(self.error(ParseErrorKind::IllegalEscapeSequence));
          };
          unit = (unit << 4) | digit;
          self.pos += 1;
        }
        unit
      }
      _ => Err(self.error(ParseErrorKind::IllegalEscapeSequence))?,
    })
  }
}
