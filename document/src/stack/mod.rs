use core::fmt::Debug;

mod r#const;
pub use r#const::{ConstStack, StackError};

/// The default bound on how deeply arrays and objects may nest within a text document.
pub const DEFAULT_MAX_DEPTH: usize = 1024;

/// The stack used by [`crate::Document::from_json`], bounded to [`DEFAULT_MAX_DEPTH`].
pub type DefaultStack = ConstStack<{ DEFAULT_MAX_DEPTH / 8 }>;

/// An item within the stack, representing which container is open during parsing.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum State {
  /// Corresponds to `{`, used for representing objects
  Object,
  /// Corresponds to `[`, used for representing arrays
  Array,
}

/// A trait representing a stack.
///
/// The parser never recurses. How deep a document may nest is solely decided by how many items the
/// stack accepts before `push` errors.
pub trait Stack: Debug {
  /// This stack's error type.
  type Error: Sized + Copy + Debug;

  /// Create an empty stack.
  fn empty() -> Self;

  /// The current stack depth.
  fn depth(&self) -> usize;

  /// Peek at the current item on the stack.
  fn peek(&self) -> Option<State>;

  /// Pop the next item from the stack.
  fn pop(&mut self) -> Option<State>;

  /// Push an item onto the stack.
  fn push(&mut self, item: State) -> Result<(), Self::Error>;
}

use alloc::vec::Vec;
/// An unbounded `Stack` premised on the allocating `Vec`.
///
/// This SHOULD NOT be used for untrusted input. It allows documents to use an unbounded amount of
/// memory to represent containers of arbitrary depth. Parsing, writing, comparing, and dropping
/// such documents don't recurse, so they won't overflow the call stack, yet the binary format still
/// rejects documents nested beyond [`crate::binary::MAX_DEPTH`].
impl Stack for Vec<State> {
  type Error = core::convert::Infallible;

  #[inline(always)]
  fn empty() -> Self {
    Vec::with_capacity(1)
  }

  #[inline(always)]
  fn depth(&self) -> usize {
    self.len()
  }

  #[inline(always)]
  fn peek(&self) -> Option<State> {
    self.last().copied()
  }

  #[inline(always)]
  fn pop(&mut self) -> Option<State> {
    Vec::<State>::pop(self)
  }

  #[inline(always)]
  fn push(&mut self, item: State) -> Result<(), Self::Error> {
    Vec::<State>::push(self, item);
    Ok(())
  }
}

#[test]
fn vec_stack() {
  let mut stack = <Vec<State> as Stack>::empty();
  assert_eq!(Stack::peek(&stack), None);
  for i in 0 .. 5000 {
    Stack::push(&mut stack, if (i % 3) == 0 { State::Object } else { State::Array }).unwrap();
  }
  assert_eq!(Stack::depth(&stack), 5000);
  assert_eq!(Stack::pop(&mut stack), Some(State::Array));
  assert_eq!(Stack::depth(&stack), 4999);
}
