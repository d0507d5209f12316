use crate::{State, Stack};

/// An array of `State`, using a single bit for each value.
#[derive(Debug)]
struct PackedStates<const ONE_EIGHTH_OF_MAX_DEPTH: usize>([u8; ONE_EIGHTH_OF_MAX_DEPTH]);
impl<const ONE_EIGHTH_OF_MAX_DEPTH: usize> PackedStates<ONE_EIGHTH_OF_MAX_DEPTH> {
  #[inline(always)]
  fn get(&self, i: usize) -> State {
    if ((self.0[i / 8] >> (i & 0b111)) & 1) == 1 { State::Array } else { State::Object }
  }

  #[inline(always)]
  fn set(&mut self, i: usize, state: State) {
    let bit = 1 << (i & 0b111);
    match state {
      State::Object => self.0[i / 8] &= !bit,
      State::Array => self.0[i / 8] |= bit,
    }
  }
}

/// An error with the stack.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum StackError {
  /// The stack's depth limit was exceeded.
  StackTooDeep,
}

/// A non-allocating `Stack`, bounded to `8 * ONE_EIGHTH_OF_MAX_DEPTH` items.
#[derive(Debug)]
pub struct ConstStack<const ONE_EIGHTH_OF_MAX_DEPTH: usize> {
  /// The current items on the stack.
  items: PackedStates<{ ONE_EIGHTH_OF_MAX_DEPTH }>,

  /// The current depth of the stack.
  ///
  /// This is analogous to the length of a `Vec`.
  depth: usize,
}

impl<const ONE_EIGHTH_OF_MAX_DEPTH: usize> ConstStack<ONE_EIGHTH_OF_MAX_DEPTH> {
  /// The maximum depth this stack supports.
  pub const MAX_DEPTH: usize = 8 * ONE_EIGHTH_OF_MAX_DEPTH;
}

impl<const ONE_EIGHTH_OF_MAX_DEPTH: usize> Stack for ConstStack<ONE_EIGHTH_OF_MAX_DEPTH> {
  type Error = StackError;

  #[inline(always)]
  fn empty() -> Self {
    Self { items: PackedStates([0; ONE_EIGHTH_OF_MAX_DEPTH]), depth: 0 }
  }

  #[inline(always)]
  fn depth(&self) -> usize {
    self.depth
  }

  #[inline(always)]
  fn peek(&self) -> Option<State> {
    let i = self.depth.checked_sub(1)?;
    Some(self.items.get(i))
  }

  #[inline(always)]
  fn pop(&mut self) -> Option<State> {
    let i = self.depth.checked_sub(1)?;
    // This will not panic as we know depth can have `1` subtracted.
    self.depth -= 1;

    Some(self.items.get(i))
  }

  #[inline(always)]
  fn push(&mut self, state: State) -> Result<(), StackError> {
    if self.depth == Self::MAX_DEPTH {
      Err(StackError::StackTooDeep)?;
    }
    self.items.set(self.depth, state);
    self.depth += 1;
    Ok(())
  }
}

#[test]
fn const_stack() {
  let mut stack = ConstStack::<2>::empty();
  assert_eq!(stack.peek(), None);
  assert_eq!(stack.pop(), None);

  let pattern = |i: usize| if (i % 3) == 1 { State::Array } else { State::Object };
  for i in 0 .. ConstStack::<2>::MAX_DEPTH {
    stack.push(pattern(i)).unwrap();
    assert_eq!(stack.peek(), Some(pattern(i)));
  }
  assert_eq!(stack.push(State::Array), Err(StackError::StackTooDeep));

  for i in (0 .. ConstStack::<2>::MAX_DEPTH).rev() {
    assert_eq!(stack.pop(), Some(pattern(i)));
  }
  assert_eq!(stack.depth(), 0);

  // Overwriting a slot must clear the bit previously set within it
  stack.push(State::Array).unwrap();
  stack.pop().unwrap();
  stack.push(State::Object).unwrap();
  assert_eq!(stack.peek(), Some(State::Object));
}
