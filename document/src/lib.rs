#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]
#![deny(missing_docs)]
#![cfg_attr(not(test), no_std)]

extern crate alloc;

mod stack;
mod string;
mod number;
mod container;
mod value;
mod value_ref;
mod array;
mod object;
mod document;
mod parser;
mod writer;
pub mod binary;
mod impls;

pub use stack::*;
pub use string::{JsonString, ObjectKey};
pub use number::Number;
pub use value::{Type, Value};
pub use value_ref::ValueRef;
pub use array::{Array, Iter as ArrayIter, CursorMut as ArrayCursorMut};
pub use object::{Object, Iter as ObjectIter};
pub use document::Document;
pub use parser::{ParseError, ParseErrorKind};
pub use writer::JsonFormat;
pub use binary::{BinaryError, DataValidation};
